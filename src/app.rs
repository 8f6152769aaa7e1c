use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::event::KeyAction;
use crate::files::service::FileService;
use crate::files::watcher::WatchEvent;
use crate::model::entity::EntityKey;
use crate::model::local_file::{LocalFile, SyncStatus};

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Tick,
    FileChanged(WatchEvent),
    RegistryChanged,
    Quit,
}

pub struct App {
    pub service: FileService,
    pub selected: usize,
    pub input_active: bool,
    pub input_buffer: String,
    pub flash_message: Option<(String, Instant)>,
    pub should_quit: bool,
    // Last known remote content hash per key. Only refreshed on demand:
    // at startup, on 'r', and after tracking or syncing a file.
    remote_hashes: HashMap<String, String>,
    pending_edit: Option<PathBuf>,
}

impl App {
    pub fn new(service: FileService) -> Self {
        Self {
            service,
            selected: 0,
            input_active: false,
            input_buffer: String::new(),
            flash_message: None,
            should_quit: false,
            remote_hashes: HashMap::new(),
            pending_edit: None,
        }
    }

    pub async fn update(&mut self, action: Action) {
        // Clear flash message after 3 seconds
        if let Some((_, t)) = &self.flash_message {
            if t.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }

        match action {
            Action::Key(key) => self.handle_key(key).await,
            Action::Tick => {}
            Action::FileChanged(WatchEvent::Changed(path)) => self.service.apply_change(&path),
            Action::FileChanged(WatchEvent::Removed(path)) => self.service.apply_removal(&path),
            Action::RegistryChanged => self.clamp_selection(),
            Action::Quit => {
                self.should_quit = true;
            }
        }
    }

    async fn handle_key(&mut self, key: KeyAction) {
        if self.input_active {
            self.handle_input_key(key).await;
            return;
        }
        match key {
            KeyAction::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyAction::Down => {
                let len = self.service.tracked().len();
                if len > 0 && self.selected < len - 1 {
                    self.selected += 1;
                }
            }
            KeyAction::Select => self.edit_selected(),
            KeyAction::Escape | KeyAction::Backspace => {}
            KeyAction::Char(c) => match c {
                'q' => self.should_quit = true,
                'a' => {
                    self.input_active = true;
                    self.input_buffer.clear();
                }
                'e' => self.edit_selected(),
                'f' => self.fetch_selected().await,
                's' => self.save_selected().await,
                'u' => self.unlink_selected(),
                'r' => self.refresh().await,
                _ => {}
            },
        }
    }

    async fn handle_input_key(&mut self, key: KeyAction) {
        match key {
            KeyAction::Escape => {
                self.input_active = false;
                self.input_buffer.clear();
            }
            KeyAction::Select => self.submit_track().await,
            KeyAction::Backspace => {
                self.input_buffer.pop();
            }
            KeyAction::Char(c) if c.is_ascii_graphic() => self.input_buffer.push(c),
            _ => {}
        }
    }

    async fn submit_track(&mut self) {
        let raw = self.input_buffer.trim().to_string();
        self.input_active = false;
        self.input_buffer.clear();

        let key = match raw.parse::<EntityKey>() {
            Ok(key) => key,
            Err(e) => {
                self.flash(format!("{e:#}"));
                return;
            }
        };
        match self.service.open_for_edit(&key).await {
            Ok(_) => {
                self.refresh_remote(&key).await;
                self.select_key(key.as_str());
                self.flash(format!("Tracking {key}"));
            }
            Err(e) => self.flash(format!("Could not track {key}: {e}")),
        }
    }

    pub fn flash(&mut self, message: impl Into<String>) {
        self.flash_message = Some((message.into(), Instant::now()));
    }

    /// Status badge from the cached remote hash. None until the remote side
    /// has been seen at least once.
    pub fn status_for(&self, file: &LocalFile) -> Option<SyncStatus> {
        let remote = self.remote_hashes.get(file.key.as_str())?;
        Some(SyncStatus::classify(
            &file.metadata.original_hash,
            &file.current_hash(),
            remote,
        ))
    }

    pub async fn refresh(&mut self) {
        self.service.rescan();
        self.clamp_selection();

        if self.service.is_connected() {
            let keys: Vec<EntityKey> =
                self.service.tracked().iter().map(|f| f.key.clone()).collect();
            let mut errors = Vec::new();
            for key in keys {
                match self.service.remote_hash(&key).await {
                    Ok(hash) => {
                        self.remote_hashes.insert(key.to_string(), hash);
                    }
                    Err(e) => errors.push(format!("{key}: {e}")),
                }
            }
            if !errors.is_empty() {
                self.flash(format!("Refresh errors: {}", errors.join("; ")));
            }
        }
    }

    async fn refresh_remote(&mut self, key: &EntityKey) {
        if let Ok(hash) = self.service.remote_hash(key).await {
            self.remote_hashes.insert(key.to_string(), hash);
        }
    }

    async fn fetch_selected(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        match self.service.fetch(&key).await {
            Ok(()) => {
                self.rebase_cached_hash(&key);
                self.flash(format!("{key} refreshed from remote"));
            }
            Err(e) => self.flash(format!("Fetch failed: {e}")),
        }
    }

    async fn save_selected(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        match self.service.save(&key).await {
            Ok(()) => {
                self.rebase_cached_hash(&key);
                self.flash(format!("{key} saved to remote"));
            }
            Err(e) => self.flash(format!("Save failed: {e}")),
        }
    }

    fn unlink_selected(&mut self) {
        let Some(key) = self.selected_key() else {
            return;
        };
        match self.service.unlink(&key) {
            Ok(()) => {
                self.remote_hashes.remove(&key);
                self.clamp_selection();
                self.flash(format!("{key} unlinked"));
            }
            Err(e) => self.flash(format!("Unlink failed: {e}")),
        }
    }

    fn edit_selected(&mut self) {
        let path = self.selected_file().map(|f| f.path.clone());
        if let Some(path) = path {
            self.pending_edit = Some(path);
        }
    }

    /// A file the main loop should hand to the external editor, set by
    /// enter/'e' and consumed once per frame.
    pub fn take_pending_edit(&mut self) -> Option<PathBuf> {
        self.pending_edit.take()
    }

    pub fn selected_file(&self) -> Option<&LocalFile> {
        self.service.tracked().into_iter().nth(self.selected)
    }

    fn selected_key(&self) -> Option<String> {
        self.selected_file().map(|f| f.key.to_string())
    }

    // After a fetch or save the baseline equals the remote state.
    fn rebase_cached_hash(&mut self, key: &str) {
        if let Some(file) = self.service.get(key) {
            let hash = file.metadata.original_hash.clone();
            self.remote_hashes.insert(key.to_string(), hash);
        }
    }

    fn select_key(&mut self, key: &str) {
        let pos = self.service.tracked().iter().position(|f| f.key.as_str() == key);
        if let Some(pos) = pos {
            self.selected = pos;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.service.tracked().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}
