mod common;

use std::fs;

use filelog::logging::{ArchiveManager, RotationPolicy, Sink};
use filelog::{FileLogger, LogLevel, LoggerConfig};
use tempfile::TempDir;

use common::{message_of, read_archive, read_lines};

#[test]
fn test_round_trip_without_rotation() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 2, 1024 * 1024).unwrap();

    for i in 0..20 {
        filelog::info!(log, "request {} done", i);
    }

    let lines = read_lines(&log.path());
    assert_eq!(lines.len(), 20);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(message_of(line), format!("request {} done", i));
    }
    assert_eq!(log.stats().rotations(), 0);
    assert!(log.archives().is_empty());
}

#[test]
fn test_ten_fifteen_byte_records_rotate_once() {
    let temp_dir = TempDir::new().unwrap();
    let sink = Sink::new(
        ArchiveManager::new(temp_dir.path(), "app.log", 2),
        RotationPolicy::new(100),
    );
    let records: Vec<String> = (0..10).map(|i| format!("record-{:07}\n", i)).collect();
    assert!(records.iter().all(|r| r.len() == 15));

    for record in &records {
        sink.write(record.as_bytes()).unwrap();
    }

    // 7 records (105 bytes) exceed the limit, the 8th write rotates first
    assert_eq!(sink.stats().rotations(), 1);
    let (entry, head) = read_archive(&temp_dir.path().join("app.log.1.zip"));
    assert_eq!(entry, "app.log");
    assert_eq!(head, records[..7].concat());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("app.log")).unwrap(),
        records[7..].concat()
    );
    assert!(!temp_dir.path().join("app.log.2.zip").exists());
}

#[test]
fn test_retention_bound_and_shift() {
    let temp_dir = TempDir::new().unwrap();
    // A zero limit rotates the previous record out before every later write
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 3, 0).unwrap();

    for i in 0..4 {
        log.info(format!("generation {}", i));
    }
    assert_eq!(log.stats().rotations(), 3);
    let slots: Vec<usize> = log.archives().iter().map(|(n, _)| *n).collect();
    assert_eq!(slots, vec![1, 2, 3]);
    for (slot, generation) in [(1, 2), (2, 1), (3, 0)] {
        let (_, content) = read_archive(&log.archive_path(slot));
        assert_eq!(message_of(content.trim_end()), format!("generation {}", generation));
    }

    log.info("generation 4");

    let slots: Vec<usize> = log.archives().iter().map(|(n, _)| *n).collect();
    assert_eq!(slots, vec![1, 2, 3]);
    for (slot, generation) in [(1, 3), (2, 2), (3, 1)] {
        let (_, content) = read_archive(&log.archive_path(slot));
        assert_eq!(message_of(content.trim_end()), format!("generation {}", generation));
    }
    assert!(!log.archive_path(4).exists());
}

#[test]
fn test_level_gate_on_logger() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), LogLevel::Warn.index(), 2, 4096).unwrap();

    filelog::debug!(log, "debug {}", 1);
    filelog::info!(log, "info");
    filelog::warn!(log, "warn {}", 2);
    filelog::crit!(log, "crit");

    let lines = read_lines(&log.path());
    let messages: Vec<&str> = lines.iter().map(|l| message_of(l)).collect();
    assert_eq!(messages, vec!["warn 2", "crit"]);
}

#[test]
fn test_macro_records_invocation_site() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 2, 4096).unwrap();

    let line = line!() + 1;
    filelog::trace!(log, "x = {}", 5);

    let lines = read_lines(&log.path());
    assert!(lines[0].contains(&format!("][TRACE][rotation.rs,{}]x = 5", line)));
}

#[test]
fn test_verbatim_message_is_not_formatted() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 2, 4096).unwrap();

    filelog::info!(log, "100% {} %d");
    let owned = String::from("owned {0}");
    filelog::info!(log, owned);

    let lines = read_lines(&log.path());
    assert_eq!(message_of(&lines[0]), "100% {} %d");
    assert_eq!(message_of(&lines[1]), "owned {0}");
}

#[test]
fn test_line_prefix_layout() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 2, 4096).unwrap();

    log.crit("boom");

    let line = &read_lines(&log.path())[0];
    let bytes = line.as_bytes();
    assert_eq!(bytes[0], b'[');
    assert_eq!(&line[24..26], " ]");
    assert_eq!(bytes[5], b'/');
    assert_eq!(bytes[8], b'/');
    assert_eq!(bytes[11], b' ');
    assert_eq!(bytes[20], b'.');
    assert!(line[26..].starts_with("[CRIT][rotation.rs,"));
    assert!(line.ends_with("]boom"));
}

#[test]
fn test_init_prunes_archives_beyond_retention() {
    let temp_dir = TempDir::new().unwrap();
    for n in 1..=6 {
        fs::write(temp_dir.path().join(format!("app.log.{}.zip", n)), b"old").unwrap();
    }

    let log = FileLogger::new("app.log", temp_dir.path(), 2, 2, 4096).unwrap();

    let slots: Vec<usize> = log.archives().iter().map(|(n, _)| *n).collect();
    assert_eq!(slots, vec![1, 2]);
}

#[test]
fn test_reopen_after_file_removed_externally() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::init(LoggerConfig {
        file_name: "app.log".to_string(),
        file_path: temp_dir.path().to_path_buf(),
        level: LogLevel::Trace,
        retention: 1,
        max_size: 4096,
    })
    .unwrap();

    log.close();
    fs::remove_file(log.path()).unwrap();
    log.info("fresh");

    let lines = read_lines(&log.path());
    assert_eq!(lines.len(), 1);
    assert_eq!(message_of(&lines[0]), "fresh");
}

#[test]
fn test_failed_rotation_keeps_active_file_intact() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 1, 10).unwrap();
    // Slot 1 is occupied by a directory, so the new archive cannot be committed
    fs::create_dir(log.archive_path(1)).unwrap();

    for i in 0..5 {
        log.info(format!("kept {}", i));
    }

    assert_eq!(log.stats().rotations(), 0);
    assert_eq!(log.stats().failed_rotations(), 4);
    let lines = read_lines(&log.path());
    let messages: Vec<&str> = lines.iter().map(|l| message_of(l)).collect();
    assert_eq!(messages, vec!["kept 0", "kept 1", "kept 2", "kept 3", "kept 4"]);
    assert!(!temp_dir.path().join("app.log.zip.tmp").exists());
}

#[test]
fn test_blocked_archive_does_not_crash() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 2, 64).unwrap();
    // The temporary archive cannot be created over a directory, whoever runs this
    fs::create_dir(temp_dir.path().join("app.log.zip.tmp")).unwrap();

    let mut expected = Vec::new();
    for i in 0..6 {
        let message = format!("archive blocked, record {}", i);
        log.info(&message);
        expected.push(message);
    }

    assert_eq!(log.stats().rotations(), 0);
    assert!(log.stats().failed_rotations() > 0);
    assert_eq!(log.stats().write_errors(), 0);
    assert!(log.archives().is_empty());
    let lines = read_lines(&log.path());
    let messages: Vec<&str> = lines.iter().map(|l| message_of(l)).collect();
    assert_eq!(messages, expected);
}
