use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dirzip_lib::{Config, DEFAULT_EXTENSION, HIDDEN_MARKER};
use futures::FutureExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::error::ArchiveError;
use crate::fs_utils::compile_skip_patterns;
use crate::naming::archive_path;
use crate::packaging::{ArchiveOptions, TaskOutcome, archive_directory};
use crate::sink::{ArchiveEvent, EventSink};

/// Run settings resolved from a merged [`Config`].
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub options: ArchiveOptions,
    /// Upper bound on concurrently running archive tasks; 0 means one task
    /// per subdirectory with no bound.
    pub max_tasks: usize,
    pub dry: bool,
}

impl RunSettings {
    /// Validates `config` and fills in the root (`cwd` when unset).
    pub fn from_config(config: &Config, cwd: &Path) -> Result<Self, ArchiveError> {
        let root = config
            .root
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| cwd.to_path_buf());

        let extension = config.extension.as_deref().unwrap_or(DEFAULT_EXTENSION);
        if extension.is_empty() {
            return Err(ArchiveError::Config("extension must not be empty".into()));
        }

        let skip = compile_skip_patterns(config.skip.as_deref().unwrap_or_default())?;

        Ok(Self {
            options: ArchiveOptions {
                root,
                extension: extension.to_string(),
                hidden_marker: HIDDEN_MARKER.to_string(),
                skip,
                remove_partial: config.remove_partial.unwrap_or(false),
            },
            max_tasks: config.max_tasks.unwrap_or(0),
            dry: config.dry.unwrap_or(false),
        })
    }
}

/// Aggregate result of a run. Per-directory detail only goes to the sink.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub archived: usize,
    pub failed: usize,
    pub skipped: usize,
}

pub fn process_root_within_tokio(
    settings: RunSettings,
    sink: Arc<dyn EventSink>,
) -> Result<RunSummary, ArchiveError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all() // Enables both IO and time drivers
        .build()?;
    runtime.block_on(archive_root(settings, sink))
}

/// Archives every immediate subdirectory of the root concurrently and
/// waits for all of them.
///
/// Only a root that cannot be listed is an error; individual archive
/// failures are reported to `sink` and counted in the summary.
pub async fn archive_root(
    settings: RunSettings,
    sink: Arc<dyn EventSink>,
) -> Result<RunSummary, ArchiveError> {
    let RunSettings {
        options,
        max_tasks,
        dry,
    } = settings;
    let root = options.root.clone();

    sink.emit(ArchiveEvent::ScanStarted { root: root.clone() });

    let listing = list_root(&root).await?;

    let options = Arc::new(options);
    let limit = (max_tasks > 0).then(|| Arc::new(Semaphore::new(max_tasks)));
    let mut tasks = JoinSet::new();
    let mut summary = RunSummary::default();

    for RootEntry { name, path: dir, is_dir } in listing {
        if !is_dir {
            summary.skipped += 1;
            sink.emit(ArchiveEvent::SkippedNonDirectory { name });
            continue;
        }

        if dry {
            let archive = archive_path(&dir, &options.extension);
            sink.emit(ArchiveEvent::WouldArchive { dir, archive });
            continue;
        }

        sink.emit(ArchiveEvent::DirectoryDiscovered { name });

        let options = options.clone();
        let sink = sink.clone();
        let limit = limit.clone();
        tasks.spawn(async move {
            let _permit = match limit {
                Some(sem) => sem.acquire_owned().await.ok(),
                None => None,
            };
            run_task(dir, options, sink).await
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(TaskOutcome::Written(stats)) => {
                debug!(entries = stats.entries, bytes = stats.bytes, "task done");
                summary.archived += 1;
            }
            Ok(TaskOutcome::Failed) => summary.failed += 1,
            Err(e) => {
                error!(error = %e, "archive task did not complete");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// One immediate child of the root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RootEntry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Reads the whole root listing before any archive is created, so archives
/// written by early tasks never show up as entries of the same run.
async fn list_root(root: &Path) -> Result<Vec<RootEntry>, ArchiveError> {
    let unreadable = |source: std::io::Error| ArchiveError::RootUnreadable {
        path: root.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(root).await.map_err(unreadable)?;
    let mut listing = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let is_dir = entry.file_type().await.map_err(unreadable)?.is_dir();
        listing.push(RootEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
            is_dir,
        });
    }
    Ok(listing)
}

/// Runs one archive task, turning a panic into an `ArchiveFailed` event.
async fn run_task(dir: PathBuf, options: Arc<ArchiveOptions>, sink: Arc<dyn EventSink>) -> TaskOutcome {
    let task = archive_directory(dir.clone(), options, sink.clone());
    match AssertUnwindSafe(task).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(dir = %dir.display(), %reason, "archive task panicked");
            sink.emit(ArchiveEvent::ArchiveFailed {
                dir,
                error: format!("archive task panicked: {reason}"),
            });
            TaskOutcome::Failed
        }
    }
}
