//! Storage-change notification channel.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

const CHANNEL_CAPACITY: usize = 256;

/// Which storage area a change happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaKind {
    Sync,
    Local,
}

impl AreaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Sync => "sync",
            AreaKind::Local => "local",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            AreaKind::Sync => "sync.json",
            AreaKind::Local => "local.json",
        }
    }
}

/// A storage-change event: which keys changed in which area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub area: AreaKind,
    pub keys: Vec<String>,
}

impl StorageChange {
    pub fn touches(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

/// Fan-out hub for storage changes
///
/// Every subscriber gets every change published after it subscribed.
#[derive(Debug, Clone)]
pub struct ChangeHub {
    sender: broadcast::Sender<StorageChange>,
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.sender.subscribe()
    }

    /// Publish a change; having no subscribers is not an error.
    pub fn publish(&self, change: StorageChange) {
        if change.keys.is_empty() {
            return;
        }
        debug!(area = change.area.as_str(), keys = ?change.keys, "Storage change");
        let _ = self.sender.send(change);
    }
}
