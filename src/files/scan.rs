use std::path::Path;

use tracing::warn;
use walkdir::WalkDir;

use crate::files::codec;
use crate::model::local_file::LocalFile;

/// Walk `dir` and decode every `.yt` file found. A file that fails to decode
/// is logged and skipped, never aborting the rest of the scan. A missing
/// directory yields no files; it is created lazily on first materialization.
pub fn scan_dir(dir: &Path) -> Vec<LocalFile> {
    if !dir.exists() {
        return Vec::new();
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("skipping unreadable entry under {}: {e}", dir.display());
                continue;
            }
        };
        if !entry.file_type().is_file() || !is_tracked_path(entry.path()) {
            continue;
        }
        match read_file(entry.path()) {
            Ok(file) => files.push(file),
            Err(e) => warn!("skipping {}: {e}", entry.path().display()),
        }
    }
    files
}

pub fn is_tracked_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(codec::FILE_EXTENSION)
}

fn read_file(path: &Path) -> anyhow::Result<LocalFile> {
    let text = std::fs::read_to_string(path)?;
    Ok(codec::decode(path, &text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GOOD: &str = "---\nidReadable: TEST-1\nsummary: Bug\noriginalHash: aa\n---\ndesc\n";
    const NO_SUMMARY: &str = "---\nidReadable: TEST-2\noriginalHash: bb\n---\ndesc\n";

    #[test]
    fn scan_collects_well_formed_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("TEST-1.yt"), GOOD).unwrap();

        let files = scan_dir(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].key.as_str(), "TEST-1");
        assert_eq!(files[0].content, "desc");
    }

    #[test]
    fn scan_skips_malformed_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("TEST-1.yt"), GOOD).unwrap();
        std::fs::write(dir.path().join("TEST-2.yt"), NO_SUMMARY).unwrap();

        let files = scan_dir(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].key.as_str(), "TEST-1");
    }

    #[test]
    fn scan_ignores_other_extensions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("notes.md"), "not ours").unwrap();
        std::fs::write(dir.path().join("TEST-1.yt"), GOOD).unwrap();

        assert_eq!(scan_dir(dir.path()).len(), 1);
    }

    #[test]
    fn scan_descends_into_subdirectories() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("archive");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("TEST-1.yt"), GOOD).unwrap();

        assert_eq!(scan_dir(dir.path()).len(), 1);
    }

    #[test]
    fn scan_of_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let gone = dir.path().join("never-created");
        assert!(scan_dir(&gone).is_empty());
    }
}
