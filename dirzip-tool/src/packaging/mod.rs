use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use glob::Pattern;
use tracing::warn;

use crate::error::ArchiveError;
use crate::fs_utils::{entry_name, is_hidden, matching_pattern, walk_sorted};
use crate::naming::archive_path;
use crate::sink::{ArchiveEvent, EventSink};

pub mod zip;

use zip::{ArchiveStats, ZipSession};

/// Read-only settings shared by every archive task of a run.
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Root the subdirectories were found in; entry names are relative to it.
    pub root: PathBuf,
    pub extension: String,
    pub hidden_marker: String,
    pub skip: Vec<Pattern>,
    pub remove_partial: bool,
}

/// How one archive task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Written(ArchiveStats),
    Failed,
}

/// Archives one subdirectory into `<dir><extension>`.
///
/// Never returns an error: failures are reported to `sink` and the task
/// simply stops. The archive session is finished on every path once the
/// destination exists, so an aborted walk still leaves an openable
/// archive holding the entries written so far (unless `remove_partial`).
pub async fn archive_directory(
    dir: PathBuf,
    options: Arc<ArchiveOptions>,
    sink: Arc<dyn EventSink>,
) -> TaskOutcome {
    let archive = archive_path(&dir, &options.extension);
    sink.emit(ArchiveEvent::ArchiveStarted {
        dir: dir.clone(),
        archive: archive.clone(),
    });

    let mut session = match ZipSession::create(&archive).await {
        Ok(session) => session,
        Err(e) => {
            sink.emit(ArchiveEvent::ArchiveFailed {
                dir,
                error: e.to_string(),
            });
            return TaskOutcome::Failed;
        }
    };

    let walked = add_tree(&mut session, &dir, &options, sink.as_ref()).await;
    let finished = session.finish().await;

    let error = match (walked, finished) {
        (Ok(()), Ok(stats)) => {
            sink.emit(ArchiveEvent::ArchiveFinished {
                dir,
                archive,
                entries: stats.entries,
                bytes: stats.bytes,
            });
            return TaskOutcome::Written(stats);
        }
        (Err(e), finished) => {
            if let Err(close_err) = finished {
                warn!(archive = %archive.display(), error = %close_err, "finalizing aborted archive failed");
            }
            e
        }
        (Ok(()), Err(e)) => e,
    };

    sink.emit(ArchiveEvent::ArchiveFailed {
        dir: dir.clone(),
        error: error.to_string(),
    });

    if options.remove_partial {
        match tokio::fs::remove_file(&archive).await {
            Ok(()) => sink.emit(ArchiveEvent::PartialRemoved { dir, archive }),
            Err(e) => warn!(archive = %archive.display(), error = %e, "could not remove partial archive"),
        }
    }

    TaskOutcome::Failed
}

/// Walks `dir` and adds every qualifying file to `session`, stopping at
/// the first error.
async fn add_tree(
    session: &mut ZipSession,
    dir: &Path,
    options: &ArchiveOptions,
    sink: &dyn EventSink,
) -> Result<(), ArchiveError> {
    let mut walk = pin!(walk_sorted(dir));

    while let Some(entry) = walk.next().await {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            sink.emit(ArchiveEvent::SkippedDirectory {
                path: path.to_path_buf(),
            });
            continue;
        }

        if is_hidden(path, &options.hidden_marker) {
            sink.emit(ArchiveEvent::SkippedHidden {
                path: path.to_path_buf(),
            });
            continue;
        }

        let name = entry_name(path, &options.root).ok_or_else(|| ArchiveError::NonUtf8Name {
            path: path.to_path_buf(),
        })?;
        if let Some(pattern) = matching_pattern(&name, &options.skip) {
            sink.emit(ArchiveEvent::SkippedByPattern {
                path: path.to_path_buf(),
                pattern: pattern.as_str().to_string(),
            });
            continue;
        }

        sink.emit(ArchiveEvent::EntryAdded {
            path: path.to_path_buf(),
            entry_name: name.clone(),
        });
        session.add_file(path, name).await?;
    }

    Ok(())
}
