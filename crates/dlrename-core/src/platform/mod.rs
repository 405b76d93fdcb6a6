#[cfg(target_os = "windows")]
mod windows;

use std::path::Path;

/// Whether `a` and `b` name the same directory, e.g. a case-only rename on a
/// case-insensitive filesystem.
#[cfg(unix)]
pub fn is_same_folder(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (a.metadata(), b.metadata()) {
        (Ok(x), Ok(y)) => x.dev() == y.dev() && x.ino() == y.ino(),
        _ => false,
    }
}

#[cfg(target_os = "windows")]
pub fn is_same_folder(a: &Path, b: &Path) -> bool {
    windows::paths_equal_ignore_case(a, b)
}

#[cfg(not(any(unix, target_os = "windows")))]
pub fn is_same_folder(a: &Path, b: &Path) -> bool {
    a == b
}
