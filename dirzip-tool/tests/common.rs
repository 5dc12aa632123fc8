#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub use assert_cmd::Command;

pub fn dirzip_cmd() -> Command {
    let mut cmd = Command::cargo_bin("dirzip").expect("Failed to find dirzip binary for testing");
    // Keep stray DIRZIP_* settings from the caller's shell out of the tests.
    for (key, _) in std::env::vars() {
        if key.starts_with("DIRZIP_") {
            cmd.env_remove(key);
        }
    }
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Writes `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}
