//! Host platform storage
//!
//! Two persistent key/value areas (a small synchronized one and a larger local one) plus
//! the storage-change channel the localization engine listens to.

mod area;
mod changes;
mod watch;

pub use area::StorageArea;
pub use changes::{AreaKind, ChangeHub, StorageChange};
pub use watch::ExternalChangeWatcher;

use crate::error::StorageError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Room in each area for the JSON object wrapper and the metadata keys stored beside the
/// dictionary (backend selector, language pair, settings).
pub const AREA_HEADROOM_BYTES: u64 = 16 * 1024;
/// Platform quota of the synchronized area (whole area)
pub const SYNC_AREA_QUOTA_BYTES: u64 = 100 * 1024 + AREA_HEADROOM_BYTES;
/// Platform quota of the local area (whole area)
pub const LOCAL_AREA_QUOTA_BYTES: u64 = 10 * 1024 * 1024 + AREA_HEADROOM_BYTES;

/// Both storage areas and their shared change hub
#[derive(Debug, Clone)]
pub struct Platform {
    data_dir: PathBuf,
    sync: Arc<StorageArea>,
    local: Arc<StorageArea>,
    hub: ChangeHub,
}

impl Platform {
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        let hub = ChangeHub::new();
        let sync = StorageArea::open(AreaKind::Sync, data_dir, SYNC_AREA_QUOTA_BYTES, hub.clone())?;
        let local =
            StorageArea::open(AreaKind::Local, data_dir, LOCAL_AREA_QUOTA_BYTES, hub.clone())?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            sync: Arc::new(sync),
            local: Arc::new(local),
            hub,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn sync_area(&self) -> &StorageArea {
        &self.sync
    }

    /// The always-available area; also holds metadata (backend selector, settings).
    pub fn local_area(&self) -> &StorageArea {
        &self.local
    }

    pub fn changes(&self) -> &ChangeHub {
        &self.hub
    }

    /// Start publishing changes made to the area files by other processes.
    pub fn watch_external_changes(&self) -> Result<ExternalChangeWatcher, StorageError> {
        ExternalChangeWatcher::start(
            &self.data_dir,
            vec![Arc::clone(&self.sync), Arc::clone(&self.local)],
        )
    }
}
