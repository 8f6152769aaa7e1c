use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::warn;

use crate::files::scan::is_tracked_path;

/// A change to a tracked file on disk, as seen by the OS watcher.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Changed(PathBuf),
    Removed(PathBuf),
}

/// Watches the mirror directory and surfaces `.yt` changes as an async
/// stream. The notify watcher runs on its own thread; dropping the
/// `MirrorWatcher` stops it.
pub struct MirrorWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<WatchEvent>,
}

impl MirrorWatcher {
    pub fn start(dir: &Path) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    warn!("file watcher error: {e}");
                    return;
                }
            };
            let relevant = matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            );
            if !relevant {
                return;
            }
            let is_remove = matches!(event.kind, EventKind::Remove(_));
            for path in event.paths {
                if !is_tracked_path(&path) {
                    continue;
                }
                let msg = if is_remove {
                    WatchEvent::Removed(path)
                } else {
                    WatchEvent::Changed(path)
                };
                let _ = tx.send(msg);
            }
        })?;
        watcher.watch(dir, RecursiveMode::Recursive)?;

        Ok(Self { _watcher: watcher, rx })
    }

    pub async fn recv(&mut self) -> Option<WatchEvent> {
        self.rx.recv().await
    }
}
