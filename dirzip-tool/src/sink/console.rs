use tracing::{debug, error, info, warn};

use super::{ArchiveEvent, EventSink};
use crate::fs_utils::encode_size;

/// Prints human-readable progress to stdout and errors to stderr, and
/// mirrors every event as a `tracing` record.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&self, event: ArchiveEvent) {
        match event {
            ArchiveEvent::ScanStarted { root } => {
                info!(root = %root.display(), "scanning root");
                println!("Zipping each subdirectory in {}...", root.display());
            }
            ArchiveEvent::SkippedNonDirectory { name } => {
                debug!(%name, "not a directory");
                println!("{name} is not directory; Skipping...");
            }
            ArchiveEvent::DirectoryDiscovered { name } => {
                debug!(%name, "directory discovered");
                println!("Zipping {name}...");
            }
            ArchiveEvent::WouldArchive { dir, archive } => {
                println!("  {} -> {}", dir.display(), archive.display());
            }
            ArchiveEvent::ArchiveStarted { dir, archive } => {
                info!(dir = %dir.display(), archive = %archive.display(), "archive started");
                println!("Zipping {} to {}...", dir.display(), archive.display());
            }
            ArchiveEvent::SkippedDirectory { path } => {
                debug!(path = %path.display(), "descending");
                println!("{} is directory; Skipping...", path.display());
            }
            ArchiveEvent::SkippedHidden { path } => {
                debug!(path = %path.display(), "hidden file");
                println!("{} is dot file; Skipping...", path.display());
            }
            ArchiveEvent::SkippedByPattern { path, pattern } => {
                debug!(path = %path.display(), %pattern, "skip pattern matched");
                println!("{} matches {pattern}; Skipping...", path.display());
            }
            ArchiveEvent::EntryAdded { path, entry_name } => {
                debug!(path = %path.display(), %entry_name, "adding entry");
                println!("Adding {}", path.display());
            }
            ArchiveEvent::ArchiveFinished {
                dir,
                archive,
                entries,
                bytes,
            } => {
                info!(dir = %dir.display(), entries, bytes, "archive finished");
                println!(
                    "Wrote {} ({entries} files, {})",
                    archive.display(),
                    encode_size(bytes)
                );
            }
            ArchiveEvent::ArchiveFailed { dir, error } => {
                error!(dir = %dir.display(), %error, "archive failed");
                eprintln!("{error}");
            }
            ArchiveEvent::PartialRemoved { archive, .. } => {
                warn!(archive = %archive.display(), "partial archive removed");
                eprintln!("Removed incomplete {}", archive.display());
            }
        }
    }
}
