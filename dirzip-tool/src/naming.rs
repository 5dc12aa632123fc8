use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Destination archive for `dir`: the directory path with `extension`
/// appended verbatim, so `photos/2019` becomes `photos/2019.zip`, a
/// sibling of the directory itself.
pub fn archive_path(dir: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(dir.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}
