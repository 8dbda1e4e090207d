mod common;

use std::collections::HashSet;
use std::thread;

use filelog::FileLogger;
use tempfile::TempDir;

use common::{message_of, read_archive, read_lines};

const THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 200;
const MAX_SIZE: i64 = 4096;
// Upper bound on one rendered record
const LINE_SLACK: usize = 128;

#[test]
fn test_concurrent_writers_across_rotations() {
    let temp_dir = TempDir::new().unwrap();
    // Retention large enough that nothing is evicted during the run
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 256, MAX_SIZE).unwrap();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let log = log.clone();
            scope.spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    filelog::info!(log, "thread-{} record-{:04}", t, i);
                }
            });
        }
    });

    assert!(log.stats().rotations() > 0);
    assert_eq!(log.stats().failed_rotations(), 0);
    assert_eq!(log.stats().write_errors(), 0);

    let archives = log.archives();
    assert_eq!(archives.len() as u64, log.stats().rotations());

    let mut lines = read_lines(&log.path());
    for (_, path) in &archives {
        let (_, content) = read_archive(path);
        // Rotation runs before the write that would push past the limit
        assert!(content.len() <= MAX_SIZE as usize + LINE_SLACK);
        lines.extend(content.lines().map(str::to_string));
    }

    let mut seen = HashSet::new();
    for line in &lines {
        assert!(line.starts_with('['), "malformed line {:?}", line);
        let message = message_of(line);
        assert!(message.starts_with("thread-"), "malformed line {:?}", line);
        assert!(seen.insert(message.to_string()), "duplicate {:?}", message);
    }
    assert_eq!(seen.len(), THREADS * RECORDS_PER_THREAD);
}

#[test]
fn test_per_thread_order_is_preserved() {
    let temp_dir = TempDir::new().unwrap();
    let log = FileLogger::new("app.log", temp_dir.path(), 0, 2, 1024 * 1024).unwrap();

    thread::scope(|scope| {
        for t in 0..4 {
            let log = &log;
            scope.spawn(move || {
                for i in 0..100 {
                    log.info(format!("{} {}", t, i));
                }
            });
        }
    });

    let mut next = [0usize; 4];
    for line in read_lines(&log.path()) {
        let mut parts = message_of(&line).split(' ');
        let t: usize = parts.next().unwrap().parse().unwrap();
        let i: usize = parts.next().unwrap().parse().unwrap();
        assert_eq!(i, next[t]);
        next[t] += 1;
    }
    assert_eq!(next, [100; 4]);
    assert!(!log.archive_path(1).exists());
}
