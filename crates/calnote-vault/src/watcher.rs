//! Vault watcher that tells note indexes when to rebuild.
//!
//! Uses the `notify` crate for cross-platform file system events. Only
//! markdown files outside hidden directories (such as `.calnote`) are
//! reported.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use calnote_core::error::VaultError;

/// Change notifications for notes in the vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A note was created or modified.
    Changed(PathBuf),
    /// A note was deleted.
    Removed(PathBuf),
}

impl VaultEvent {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Changed(path) | Self::Removed(path) => path,
        }
    }
}

/// Any hidden segment below the root hides the path, matching what
/// [`crate::Vault::list_markdown`] skips.
fn in_hidden_dir(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root).is_ok_and(|rel| {
        rel.components()
            .filter_map(|c| c.as_os_str().to_str())
            .any(|s| s.starts_with('.'))
    })
}

/// Watches a vault directory and queues [`VaultEvent`]s.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    receiver: mpsc::Receiver<VaultEvent>,
}

impl VaultWatcher {
    /// Start watching `vault_root` recursively.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the watcher cannot be created.
    pub fn start(vault_root: &Path) -> Result<Self, VaultError> {
        let (tx, rx) = mpsc::channel();
        let root = vault_root.to_path_buf();
        let canonical_root = vault_root
            .canonicalize()
            .unwrap_or_else(|_| root.clone());
        let watch_error = |e: notify::Error| VaultError::Io {
            path: vault_root.display().to_string(),
            source: std::io::Error::other(e),
        };

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else { return };
            for path in &event.paths {
                if path.extension().and_then(|e| e.to_str()) != Some("md")
                    || in_hidden_dir(&root, path)
                    || in_hidden_dir(&canonical_root, path)
                {
                    continue;
                }
                let vault_event = match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) => {
                        VaultEvent::Changed(path.clone())
                    }
                    EventKind::Remove(_) => VaultEvent::Removed(path.clone()),
                    _ => continue,
                };
                let _ = tx.send(vault_event);
            }
        })
        .map_err(watch_error)?;

        watcher
            .watch(vault_root, RecursiveMode::Recursive)
            .map_err(watch_error)?;

        tracing::debug!(root = %vault_root.display(), "watching vault");
        Ok(Self {
            _watcher: watcher,
            receiver: rx,
        })
    }

    /// Wait up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<VaultEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Wait up to `timeout` for an event, then collect whatever else
    /// arrives within `settle`. Editors often emit several events per save;
    /// one batch means one index rebuild.
    pub fn next_batch(&self, timeout: Duration, settle: Duration) -> Vec<VaultEvent> {
        let Some(first) = self.recv_timeout(timeout) else {
            return Vec::new();
        };
        let mut batch = vec![first];
        while let Some(event) = self.recv_timeout(settle) {
            if !batch.contains(&event) {
                batch.push(event);
            }
        }
        batch
    }
}
