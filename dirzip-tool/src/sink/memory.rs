use std::path::Path;
use std::sync::Mutex;

use super::{ArchiveEvent, EventSink};

/// Records events in memory so callers can inspect them afterwards.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ArchiveEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in arrival order.
    pub fn events(&self) -> Vec<ArchiveEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted by the task archiving `dir`, in the order it emitted them.
    pub fn events_for(&self, dir: &Path) -> Vec<ArchiveEvent> {
        self.events()
            .into_iter()
            .filter(|event| match event {
                ArchiveEvent::ArchiveStarted { dir: d, .. }
                | ArchiveEvent::ArchiveFinished { dir: d, .. }
                | ArchiveEvent::ArchiveFailed { dir: d, .. }
                | ArchiveEvent::PartialRemoved { dir: d, .. } => d == dir,
                ArchiveEvent::SkippedDirectory { path }
                | ArchiveEvent::SkippedHidden { path }
                | ArchiveEvent::SkippedByPattern { path, .. }
                | ArchiveEvent::EntryAdded { path, .. } => path.starts_with(dir),
                _ => false,
            })
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ArchiveEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
