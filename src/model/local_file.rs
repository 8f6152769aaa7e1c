use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::entity::EntityKey;

/// Frontmatter block of a `.yt` file. Field names follow the on-disk YAML
/// keys; any keys beyond the required three are carried through `extra`
/// untouched so hand-added metadata survives rewrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(rename = "idReadable")]
    pub id_readable: String,
    pub summary: String,
    /// Content hash captured at create / last successful fetch or save. The
    /// sync baseline: local edits never touch it.
    #[serde(rename = "originalHash")]
    pub original_hash: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// One on-disk mirror of a remote entity.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalFile {
    pub path: PathBuf,
    /// Parsed from the frontmatter's `idReadable` when the file is decoded;
    /// carries the entity kind so nobody re-derives it from the string.
    pub key: EntityKey,
    pub metadata: FileMetadata,
    pub content: String,
}

impl LocalFile {
    /// Hash of the file as it stands now. Diverges from
    /// `metadata.original_hash` as soon as summary or body is edited.
    pub fn current_hash(&self) -> String {
        crate::files::hash::content_hash(&self.metadata.summary, &self.content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    Modified,
    Outdated,
    Conflict,
}

impl SyncStatus {
    /// Classify from the three hashes. Pure; recomputed on every inspection,
    /// never stored. The local/remote equality check runs first so convergent
    /// edits land on Synced.
    pub fn classify(baseline: &str, local: &str, remote: &str) -> SyncStatus {
        if local == remote {
            SyncStatus::Synced
        } else if baseline == remote {
            SyncStatus::Modified
        } else if baseline == local {
            SyncStatus::Outdated
        } else {
            SyncStatus::Conflict
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "synced",
            SyncStatus::Modified => "modified",
            SyncStatus::Outdated => "outdated",
            SyncStatus::Conflict => "conflict",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_file_is_synced() {
        assert_eq!(SyncStatus::classify("h1", "h1", "h1"), SyncStatus::Synced);
    }

    #[test]
    fn local_edit_is_modified() {
        assert_eq!(SyncStatus::classify("h1", "h2", "h1"), SyncStatus::Modified);
    }

    #[test]
    fn remote_change_is_outdated() {
        assert_eq!(SyncStatus::classify("h1", "h1", "h2"), SyncStatus::Outdated);
    }

    #[test]
    fn both_sides_changed_is_conflict() {
        assert_eq!(SyncStatus::classify("h1", "h2", "h3"), SyncStatus::Conflict);
    }

    #[test]
    fn convergent_edits_are_synced() {
        // Local and remote independently reached the same content.
        assert_eq!(SyncStatus::classify("h1", "h2", "h2"), SyncStatus::Synced);
    }

    #[test]
    fn classifier_is_total() {
        // Every combination of the three hashes maps to exactly one status.
        let hashes = ["a", "b", "c"];
        for baseline in hashes {
            for local in hashes {
                for remote in hashes {
                    let status = SyncStatus::classify(baseline, local, remote);
                    assert!(matches!(
                        status,
                        SyncStatus::Synced
                            | SyncStatus::Modified
                            | SyncStatus::Outdated
                            | SyncStatus::Conflict
                    ));
                }
            }
        }
    }
}
