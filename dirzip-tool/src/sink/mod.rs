use std::path::PathBuf;

pub mod console;
#[cfg(test)]
pub mod memory;

pub use console::ConsoleSink;
#[cfg(test)]
pub use memory::MemorySink;

/// Progress and diagnostic events produced while archiving a root.
///
/// Events from concurrent archive tasks interleave; only the order within
/// a single task is meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEvent {
    /// Root enumeration is starting.
    ScanStarted { root: PathBuf },
    /// A top-level entry is not a directory and gets no archive.
    SkippedNonDirectory { name: String },
    /// A top-level directory was found and an archive task started for it.
    DirectoryDiscovered { name: String },
    /// Dry run: the archive that would be written for a directory.
    WouldArchive { dir: PathBuf, archive: PathBuf },
    /// An archive task is about to create its destination and walk `dir`.
    ArchiveStarted { dir: PathBuf, archive: PathBuf },
    /// A directory inside the walk; no entry is written but it is descended.
    SkippedDirectory { path: PathBuf },
    /// A file whose base name carries the hidden marker.
    SkippedHidden { path: PathBuf },
    /// A file whose entry name matched a configured skip pattern.
    SkippedByPattern { path: PathBuf, pattern: String },
    /// A file is being added under `entry_name`.
    EntryAdded { path: PathBuf, entry_name: String },
    /// The archive was finalized without errors.
    ArchiveFinished {
        dir: PathBuf,
        archive: PathBuf,
        entries: usize,
        bytes: u64,
    },
    /// The task was abandoned; any archive written so far is left finalized.
    ArchiveFailed { dir: PathBuf, error: String },
    /// A partially written archive was deleted after a failure.
    PartialRemoved { dir: PathBuf, archive: PathBuf },
}

/// Receives archive events. Shared by every concurrent task, so
/// implementations must tolerate calls from several threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ArchiveEvent);
}
