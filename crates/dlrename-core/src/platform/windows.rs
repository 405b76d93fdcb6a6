use std::path::Path;

// NTFS compares names case-insensitively.
pub fn paths_equal_ignore_case(a: &Path, b: &Path) -> bool {
    let a = a.to_string_lossy().to_lowercase();
    let b = b.to_string_lossy().to_lowercase();
    a == b
}
