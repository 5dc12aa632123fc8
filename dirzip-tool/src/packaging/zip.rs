use std::path::Path;

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipDateTime, ZipEntryBuilder};
use chrono::{DateTime, Utc};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::compat::TokioAsyncReadCompatExt;

use crate::error::ArchiveError;

/// Totals for a finalized archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub entries: usize,
    pub bytes: u64,
}

/// An open zip archive bound to one destination file.
///
/// Entries are Deflate-compressed and stamped with the source file's
/// modification time. Call [`ZipSession::finish`] on every path out of a
/// task; an unfinished archive has no central directory and cannot be
/// opened.
pub struct ZipSession {
    writer: ZipFileWriter<File>,
    stats: ArchiveStats,
}

impl ZipSession {
    /// Creates (or truncates) `path` and starts an empty archive in it.
    pub async fn create(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::create(path)
            .await
            .map_err(|source| ArchiveError::CreateArchive {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            writer: ZipFileWriter::with_tokio(file),
            stats: ArchiveStats::default(),
        })
    }

    /// Streams the contents of `source` into a new entry named `entry_name`.
    /// The source file is closed before this returns.
    pub async fn add_file(&mut self, source: &Path, entry_name: String) -> Result<u64, ArchiveError> {
        let file = File::open(source)
            .await
            .map_err(|e| ArchiveError::OpenSource {
                path: source.to_path_buf(),
                source: e,
            })?;

        let read_failed = |e: std::io::Error| ArchiveError::ReadSource {
            path: source.to_path_buf(),
            source: e,
        };

        let mut builder = ZipEntryBuilder::new(entry_name.into(), Compression::Deflate);
        if let Ok(modified) = file.metadata().await.map_err(read_failed)?.modified() {
            let modified: DateTime<Utc> = modified.into();
            builder = builder.last_modification_date(ZipDateTime::from_chrono(&modified));
        }

        let mut entry = self.writer.write_entry_stream(builder).await?;
        let copied = futures::io::copy(file.compat(), &mut entry)
            .await
            .map_err(read_failed)?;
        entry.close().await?;

        self.stats.entries += 1;
        self.stats.bytes += copied;
        Ok(copied)
    }

    /// Writes the central directory and flushes the file to disk.
    pub async fn finish(self) -> Result<ArchiveStats, ArchiveError> {
        let mut file = self.writer.close().await?.into_inner();
        file.flush().await?;
        Ok(self.stats)
    }
}
