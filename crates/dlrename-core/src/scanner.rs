use crate::error::Error;
use crate::matcher::IdentifierMatcher;
use crate::model::FolderEntry;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, error, warn};

/// List the immediate child directories of `root`, sorted by name.
/// Files and symlinks are ignored.
pub fn scan_folders(root: &Path, matcher: &IdentifierMatcher) -> Result<Vec<FolderEntry>, Error> {
    if !root.exists() {
        return Err(Error::InvalidInput(format!(
            "Directory not found: {}",
            root.display()
        )));
    }
    if !root.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Not a directory: {}",
            root.display()
        )));
    }

    let entries = fs::read_dir(root).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("Error reading directory {}: {}", root.display(), err),
        )
    })?;

    let mut folders = Vec::new();
    for entry_result in entries {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                error!("Error reading entry in directory {}: {}", root.display(), err);
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                error!("Error getting file type for {}: {}", entry.path().display(), err);
                continue;
            }
        };
        if !file_type.is_dir() {
            continue;
        }

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!("Skipping folder with non UTF-8 name: {:?}", raw);
                continue;
            }
        };

        let parsed = matcher.parse(&name);
        folders.push(FolderEntry {
            path: entry.path(),
            name,
            identifier: parsed.identifier,
            base_part: parsed.base_part,
            suffix: parsed.suffix,
        });
    }

    folders.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(
        "Scanned {}: {} folders, {} with identifiers",
        root.display(),
        folders.len(),
        folders.iter().filter(|f| f.identifier.is_some()).count()
    );
    Ok(folders)
}
