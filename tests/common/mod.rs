#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Name and content of the single entry in an archive
pub fn read_archive(path: &Path) -> (String, String) {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    assert_eq!(archive.len(), 1, "archive {} has one entry", path.display());
    let mut entry = archive.by_index(0).unwrap();
    let name = entry.name().to_string();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    (name, content)
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Message part of a rendered line (everything after the call-site bracket)
pub fn message_of(line: &str) -> &str {
    let end = line
        .match_indices(']')
        .nth(2)
        .map(|(i, _)| i + 1)
        .expect("line has three bracketed fields");
    &line[end..]
}
