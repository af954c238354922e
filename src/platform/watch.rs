//! Cross-process change detection for storage areas.
//!
//! Another process (a second document context) writing an area file surfaces here as a
//! filesystem event; the affected area diffs itself against its last-known content and
//! publishes the differing keys on the change hub.

use super::area::StorageArea;
use crate::error::StorageError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keeps the filesystem watcher alive; dropping it stops change detection.
pub struct ExternalChangeWatcher {
    _watcher: RecommendedWatcher,
}

impl std::fmt::Debug for ExternalChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalChangeWatcher").finish_non_exhaustive()
    }
}

impl ExternalChangeWatcher {
    pub fn start(dir: &Path, areas: Vec<Arc<StorageArea>>) -> Result<Self, StorageError> {
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => handle_event(&event, &areas),
            Err(e) => warn!("Storage watch error: {}", e),
        })
        .map_err(|e| watch_error("create watcher", e))?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| watch_error("watch data directory", e))?;

        info!(dir = %dir.display(), "Watching storage areas for external changes");
        Ok(Self { _watcher: watcher })
    }
}

fn handle_event(event: &Event, areas: &[Arc<StorageArea>]) {
    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
        return;
    }
    for area in areas {
        if !event.paths.iter().any(|p| p.file_name() == area.path().file_name()) {
            continue;
        }
        match area.refresh_from_disk() {
            Ok(changed) if !changed.is_empty() => {
                debug!(area = area.kind().as_str(), keys = ?changed, "External storage change");
            }
            Ok(_) => {}
            // A half-written file from another process; the next event re-reads it.
            Err(e) => debug!(area = area.kind().as_str(), error = %e, "Skipped unreadable area"),
        }
    }
}

fn watch_error(action: &str, err: notify::Error) -> StorageError {
    StorageError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Failed to {}: {}", action, err),
    ))
}
