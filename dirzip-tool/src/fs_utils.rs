use std::path::{Component, Path};

use futures::Stream;
use glob::Pattern;
use tokio::sync::mpsc;
use tokio::task;
use tokio_stream::wrappers::ReceiverStream;
use walkdir::{DirEntry, WalkDir};

use crate::error::ArchiveError;

/// Walks `dir` depth-first on the blocking pool, siblings ordered by file
/// name and every directory yielded before its contents.
///
/// Entries arrive through a small bounded channel. Dropping the returned
/// stream closes the channel, which stops the walker at its next send.
pub fn walk_sorted(dir: &Path) -> impl Stream<Item = walkdir::Result<DirEntry>> + use<> {
    let (tx, rx) = mpsc::channel(16);
    let dir = dir.to_path_buf();

    task::spawn_blocking(move || {
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            // Receiver gone: the archive task has stopped reading.
            if tx.blocking_send(entry).is_err() {
                break;
            }
        }
    });

    ReceiverStream::new(rx)
}

/// Compiles glob skip patterns, naming the first invalid one.
pub fn compile_skip_patterns(patterns: &[String]) -> Result<Vec<Pattern>, ArchiveError> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| ArchiveError::Config(format!("invalid skip pattern {p}: {e}")))
        })
        .collect()
}

/// Returns the first pattern matching `entry_name`.
pub fn matching_pattern<'a>(entry_name: &str, patterns: &'a [Pattern]) -> Option<&'a Pattern> {
    patterns.iter().find(|p| p.matches(entry_name))
}

/// True when the base name of `path` starts with `marker`.
pub fn is_hidden(path: &Path, marker: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with(marker))
        .unwrap_or(false)
}

/// Name of `path` inside an archive: relative to `root`, `/`-separated.
/// Paths outside `root` keep their normal components as-is. `None` when a
/// component is not valid UTF-8, since a lossy conversion could map two
/// distinct files onto one entry name.
pub fn entry_name(path: &Path, root: &Path) -> Option<String> {
    let parts = path
        .strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_str()),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

/// Convert bytes into a human-friendly string using binary (KiB, MiB, GiB...) units.
pub fn encode_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    // 1.0 MiB prints as 1 MiB
    if (size * 10.0) % 10.0 == 0.0 {
        format!("{:.0} {}", size, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}
