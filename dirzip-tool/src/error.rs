use std::path::PathBuf;

use thiserror::Error;

/// Failures while archiving a root directory.
///
/// `RootUnreadable` and `Config` stop the whole run before any archive task
/// starts. Everything else is scoped to a single subdirectory's task.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("cannot list root directory {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot create archive {}: {source}", path.display())]
    CreateArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error walking directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("error opening file {}: {source}", path.display())]
    OpenSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading file {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file name is not valid UTF-8: {}", path.display())]
    NonUtf8Name { path: PathBuf },

    #[error("error writing archive entry: {0}")]
    Zip(#[from] async_zip::error::ZipError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn messages_name_the_offending_path() {
        let err = ArchiveError::CreateArchive {
            path: PathBuf::from("photos/B.zip"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "cannot create archive photos/B.zip: denied");

        let err = ArchiveError::RootUnreadable {
            path: PathBuf::from("/missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "cannot list root directory /missing: not found");
    }

    #[test]
    fn read_failures_name_the_source() {
        let err = ArchiveError::ReadSource {
            path: PathBuf::from("A/b_link"),
            source: io::Error::other("Is a directory"),
        };
        assert_eq!(err.to_string(), "error reading file A/b_link: Is a directory");
    }

    #[test]
    fn io_errors_pass_through() {
        let err: ArchiveError = io::Error::other("disk full").into();
        assert_eq!(err.to_string(), "disk full");
    }
}
