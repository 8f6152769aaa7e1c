use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::files::codec::{self, DecodeError};
use crate::files::hash::content_hash;
use crate::files::scan;
use crate::model::entity::{EntityKey, RemoteEntity};
use crate::model::local_file::{FileMetadata, LocalFile, SyncStatus};
use crate::remote::Tracker;

/// Emitted on the change channel after every registry mutation, so the UI
/// can redraw without polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryChanged;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("not connected to YouTrack (add [youtrack] base_url and token to the config)")]
    NotConnected,
    #[error("{0} was not found on the server")]
    NotFound(EntityKey),
    #[error("{0} is not tracked locally")]
    NotTracked(String),
    #[error("{}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("remote call failed: {0:#}")]
    Remote(anyhow::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode frontmatter: {0}")]
    Encode(#[from] serde_yaml::Error),
}

/// Owns the mirror directory and the in-memory registry of tracked files.
///
/// All mutations happen through this type and end with a `RegistryChanged`
/// notification. Remote writes come first: the local file is only rewritten
/// after the server accepted the change, so a failed save leaves the file
/// byte-identical.
pub struct FileService {
    dir: PathBuf,
    tracker: Option<Arc<dyn Tracker>>,
    registry: HashMap<String, LocalFile>,
    changes: mpsc::UnboundedSender<RegistryChanged>,
}

impl FileService {
    pub fn new(
        dir: PathBuf,
        tracker: Option<Arc<dyn Tracker>>,
        changes: mpsc::UnboundedSender<RegistryChanged>,
    ) -> Self {
        Self { dir, tracker, registry: HashMap::new(), changes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_connected(&self) -> bool {
        self.tracker.is_some()
    }

    /// Name of the configured backend, if any.
    pub fn tracker_name(&self) -> Option<&str> {
        self.tracker.as_deref().map(|t| t.name())
    }

    /// Rebuild the registry from the files on disk. Returns how many files
    /// are tracked afterwards.
    pub fn rescan(&mut self) -> usize {
        let files = scan::scan_dir(&self.dir);
        self.registry = files.into_iter().map(|f| (f.key.to_string(), f)).collect();
        self.notify_changed();
        self.registry.len()
    }

    pub fn tracked(&self) -> Vec<&LocalFile> {
        let mut files: Vec<&LocalFile> = self.registry.values().collect();
        files.sort_by(|a, b| a.key.as_str().cmp(b.key.as_str()));
        files
    }

    pub fn get(&self, key: &str) -> Option<&LocalFile> {
        self.registry.get(key)
    }

    /// Return the path of the local file for `key`, materializing it from
    /// the remote entity first if it is not tracked yet. An already tracked
    /// key is returned as-is, without touching the server.
    pub async fn open_for_edit(&mut self, key: &EntityKey) -> Result<PathBuf, ServiceError> {
        if let Some(file) = self.registry.get(key.as_str()) {
            return Ok(file.path.clone());
        }
        let entity = self.fetch_remote(key).await?;
        let path = self.dir.join(format!("{key}.{}", codec::FILE_EXTENSION));
        self.write_entity(path.clone(), &entity)?;
        Ok(path)
    }

    /// Overwrite the local file with the current remote state, discarding
    /// any local edits and resetting the baseline.
    pub async fn fetch(&mut self, key: &str) -> Result<(), ServiceError> {
        let file = self
            .registry
            .get(key)
            .ok_or_else(|| ServiceError::NotTracked(key.to_string()))?;
        let (path, entity_key) = (file.path.clone(), file.key.clone());
        let entity = self.fetch_remote(&entity_key).await?;
        self.write_entity(path, &entity)
    }

    /// Push the local summary and body to the server, then rewrite the file
    /// with what the server stored and rebase the baseline hash on it.
    pub async fn save(&mut self, key: &str) -> Result<(), ServiceError> {
        let path = self
            .registry
            .get(key)
            .map(|f| f.path.clone())
            .ok_or_else(|| ServiceError::NotTracked(key.to_string()))?;
        // Read fresh from disk so edits the watcher has not delivered yet
        // are still included.
        let text = std::fs::read_to_string(&path)?;
        let mut file = codec::decode(&path, &text)
            .map_err(|source| ServiceError::Malformed { path: path.clone(), source })?;

        let tracker = self.tracker()?.clone();
        let stored = tracker
            .update_entity(&file.key, &file.content, Some(&file.metadata.summary))
            .await
            .map_err(ServiceError::Remote)?;

        let body = stored.body.trim();
        file.metadata.summary = stored.summary.clone();
        file.metadata.original_hash = content_hash(&stored.summary, body);
        file.content = body.to_string();
        apply_remote_extras(&mut file.metadata, &stored)?;

        let text = codec::encode(&file.metadata, &file.content)?;
        std::fs::write(&path, text)?;
        if file.key.as_str() != key {
            self.registry.remove(key);
        }
        self.registry.insert(file.key.to_string(), file);
        self.notify_changed();
        Ok(())
    }

    /// Delete the local file and drop the registry entry. Unlinking a key
    /// that is not tracked is a no-op; the remote entity is never touched.
    pub fn unlink(&mut self, key: &str) -> Result<(), ServiceError> {
        let Some(file) = self.registry.remove(key) else {
            return Ok(());
        };
        match std::fs::remove_file(&file.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                self.registry.insert(key.to_string(), file);
                return Err(e.into());
            }
        }
        self.notify_changed();
        Ok(())
    }

    pub async fn remote_hash(&self, key: &EntityKey) -> Result<String, ServiceError> {
        let entity = self.fetch_remote(key).await?;
        Ok(content_hash(&entity.summary, entity.body.trim()))
    }

    pub async fn status_of(&self, file: &LocalFile) -> Result<SyncStatus, ServiceError> {
        let remote = self.remote_hash(&file.key).await?;
        Ok(SyncStatus::classify(
            &file.metadata.original_hash,
            &file.current_hash(),
            &remote,
        ))
    }

    /// Absorb an on-disk change reported by the watcher. A file that no
    /// longer decodes is untracked rather than left stale; a file whose key
    /// changed is re-registered under the new key.
    pub fn apply_change(&mut self, path: &Path) {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return self.apply_removal(path);
            }
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
                return;
            }
        };
        let stale = self.keys_at(path);
        match codec::decode(path, &text) {
            Ok(file) => {
                for key in stale.iter().filter(|k| k.as_str() != file.key.as_str()) {
                    self.registry.remove(key);
                }
                self.registry.insert(file.key.to_string(), file);
                self.notify_changed();
            }
            Err(e) => {
                warn!("untracking {}: {e}", path.display());
                let mut removed = false;
                for key in &stale {
                    removed |= self.registry.remove(key).is_some();
                }
                if removed {
                    self.notify_changed();
                }
            }
        }
    }

    /// Absorb an on-disk deletion reported by the watcher.
    pub fn apply_removal(&mut self, path: &Path) {
        let stale = self.keys_at(path);
        if stale.is_empty() {
            return;
        }
        for key in &stale {
            self.registry.remove(key);
        }
        self.notify_changed();
    }

    fn keys_at(&self, path: &Path) -> Vec<String> {
        self.registry
            .iter()
            .filter(|(_, f)| f.path == path)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn tracker(&self) -> Result<&Arc<dyn Tracker>, ServiceError> {
        self.tracker.as_ref().ok_or(ServiceError::NotConnected)
    }

    async fn fetch_remote(&self, key: &EntityKey) -> Result<RemoteEntity, ServiceError> {
        let tracker = self.tracker()?.clone();
        let entity = tracker.get_entity(key).await.map_err(ServiceError::Remote)?;
        entity.ok_or_else(|| ServiceError::NotFound(key.clone()))
    }

    fn write_entity(&mut self, path: PathBuf, entity: &RemoteEntity) -> Result<(), ServiceError> {
        let body = entity.body.trim();
        let mut metadata = FileMetadata {
            id_readable: entity.key.to_string(),
            summary: entity.summary.clone(),
            original_hash: content_hash(&entity.summary, body),
            extra: Default::default(),
        };
        apply_remote_extras(&mut metadata, entity)?;
        let file = LocalFile {
            path: path.clone(),
            key: entity.key.clone(),
            metadata,
            content: body.to_string(),
        };
        let text = codec::encode(&file.metadata, &file.content)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, text)?;
        self.registry.insert(file.key.to_string(), file);
        self.notify_changed();
        Ok(())
    }

    fn notify_changed(&self) {
        let _ = self.changes.send(RegistryChanged);
    }
}

/// Mirror server-side metadata (attachment list, last-updated stamp) into
/// the frontmatter's extra keys. Keys the user added by hand are left alone.
fn apply_remote_extras(
    metadata: &mut FileMetadata,
    entity: &RemoteEntity,
) -> Result<(), serde_yaml::Error> {
    if entity.attachments.is_empty() {
        metadata.extra.remove("attachments");
    } else {
        let value = serde_yaml::to_value(&entity.attachments)?;
        metadata.extra.insert("attachments".to_string(), value);
    }
    match entity.updated {
        Some(updated) => {
            let value = serde_yaml::Value::String(updated.to_rfc3339());
            metadata.extra.insert("updated".to_string(), value);
        }
        None => {
            metadata.extra.remove("updated");
        }
    }
    Ok(())
}
