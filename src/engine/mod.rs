//! Localization Engine
//!
//! Walks the text nodes of a live document and replaces every node whose whole trimmed
//! content is a dictionary key. Matched nodes are memoized per dictionary version so a
//! pass never re-translates them; non-matches stay eligible for later passes.
//!
//! Passes are non-reentrant: a request arriving while a pass runs is dropped, since the
//! next mutation, tick or dictionary change covers whatever it would have found.

mod matching;
mod processed;
mod runtime;
mod triggers;

pub use matching::{is_skipped_container, localize};
pub use processed::ProcessedSet;
pub use runtime::{EngineRuntime, RuntimeConfig, RuntimeStats, StopHandle};
pub use triggers::{MutationBatch, Trigger};

use crate::defaults::{load_default_dictionary, DefaultSource};
use crate::dom::{NodeId, SharedDocument};
use crate::error::{ApiError, DomError};
use crate::platform::StorageChange;
use crate::store::{DictionaryStore, BACKEND_KEY, TRANSLATIONS_KEY};
use crate::types::{trim_text, TranslationMap};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Bootstrapping,
    Steady,
}

/// Result of one full-document pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Non-empty text nodes outside script/style
    pub examined: usize,
    pub translated: usize,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(PassReport),
    /// Another pass was in progress
    Skipped,
    Failed(String),
}

impl PassOutcome {
    pub fn translated(&self) -> usize {
        match self {
            PassOutcome::Completed(report) => report.translated,
            _ => 0,
        }
    }
}

/// Clears the in-pass flag on every exit path.
struct PassGuard<'a>(&'a AtomicBool);

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard(flag))
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Localization engine bound to one document and one dictionary store
pub struct LocalizationEngine {
    store: Arc<DictionaryStore>,
    document: SharedDocument,
    defaults: DefaultSource,
    dictionary: RwLock<Arc<TranslationMap>>,
    processed: Mutex<ProcessedSet>,
    in_pass: AtomicBool,
    state: RwLock<EngineState>,
    #[cfg(test)]
    fail_next_pass: AtomicBool,
}

impl std::fmt::Debug for LocalizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalizationEngine")
            .field("state", &*self.state.read())
            .field("entries", &self.dictionary.read().len())
            .field("processed", &self.processed.lock().len())
            .finish()
    }
}

impl LocalizationEngine {
    pub fn new(store: Arc<DictionaryStore>, document: SharedDocument, defaults: DefaultSource) -> Self {
        Self {
            store,
            document,
            defaults,
            dictionary: RwLock::new(Arc::new(TranslationMap::new())),
            processed: Mutex::new(ProcessedSet::new()),
            in_pass: AtomicBool::new(false),
            state: RwLock::new(EngineState::Bootstrapping),
            #[cfg(test)]
            fail_next_pass: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> EngineState {
        *self.state.read()
    }

    pub fn store(&self) -> &Arc<DictionaryStore> {
        &self.store
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// The effective in-memory dictionary
    pub fn dictionary(&self) -> Arc<TranslationMap> {
        Arc::clone(&self.dictionary.read())
    }

    pub fn dictionary_version(&self) -> u64 {
        self.processed.lock().version()
    }

    pub fn is_processed(&self, node: NodeId) -> bool {
        self.processed.lock().contains(node)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.lock().len()
    }

    /// Load the effective dictionary and run the first pass.
    ///
    /// Never fails: storage problems fall back to the default dictionary (empty if the
    /// default asset could not be read either).
    pub fn bootstrap(&self) -> PassOutcome {
        *self.state.write() = EngineState::Bootstrapping;
        let defaults = load_default_dictionary(&self.defaults);

        let effective = match self.load_or_seed(&defaults) {
            Ok(map) => map,
            Err(e) => {
                error!(error = %e, fallback_entries = defaults.len(), "Dictionary bootstrap failed, using defaults");
                defaults
            }
        };
        self.install_dictionary(effective);

        match self.store.info() {
            Ok(info) => info!(
                backend = %info.backend,
                entries = info.count,
                size = %info.size_formatted,
                percent_used = info.percent_used,
                "Dictionary ready"
            ),
            Err(e) => warn!(error = %e, "Storage info unavailable"),
        }

        *self.state.write() = EngineState::Steady;
        self.translate_document()
    }

    fn load_or_seed(&self, defaults: &TranslationMap) -> Result<TranslationMap, ApiError> {
        self.store.init()?;
        let loaded = self.store.load()?;
        if !loaded.is_empty() {
            return Ok(loaded);
        }
        info!(entries = defaults.len(), "Store is empty, seeding default dictionary");
        self.store.save(defaults)?;
        Ok(defaults.clone())
    }

    /// Replace the in-memory dictionary; every node becomes eligible again.
    pub fn install_dictionary(&self, map: TranslationMap) {
        let entries = map.len();
        *self.dictionary.write() = Arc::new(map);
        let mut processed = self.processed.lock();
        processed.reset();
        debug!(entries, version = processed.version(), "Installed dictionary");
    }

    /// Re-read the selector and dictionary from the store.
    ///
    /// On failure the last known dictionary stays in effect.
    pub fn reload_dictionary(&self) -> Result<usize, ApiError> {
        self.store.init()?;
        let map = self.store.load()?;
        let entries = map.len();
        self.install_dictionary(map);
        Ok(entries)
    }

    /// React to a storage change notification. Returns the pass outcome when the change
    /// concerned the dictionary.
    pub fn handle_storage_change(&self, change: &StorageChange) -> Option<PassOutcome> {
        if !(change.touches(TRANSLATIONS_KEY) || change.touches(BACKEND_KEY)) {
            return None;
        }
        info!(area = change.area.as_str(), keys = ?change.keys, "Dictionary change detected");
        match self.reload_dictionary() {
            Ok(entries) => {
                info!(entries, "Dictionary reloaded");
                Some(self.translate_document())
            }
            Err(e) => {
                error!(error = %e, "Dictionary reload failed, keeping last known dictionary");
                None
            }
        }
    }

    /// Forget which nodes were translated without changing the dictionary.
    pub fn clear_cache(&self) {
        self.processed.lock().reset();
        info!("Processed-node cache cleared");
    }

    /// Run one full-document pass unless one is already running.
    pub fn translate_document(&self) -> PassOutcome {
        let Some(_guard) = PassGuard::acquire(&self.in_pass) else {
            debug!("Pass already in progress, request dropped");
            return PassOutcome::Skipped;
        };

        let started = Instant::now();
        match self.run_pass() {
            Ok(mut report) => {
                report.duration = started.elapsed();
                if report.translated > 0 {
                    info!(
                        translated = report.translated,
                        examined = report.examined,
                        duration_ms = report.duration.as_secs_f64() * 1000.0,
                        "Localization pass"
                    );
                }
                PassOutcome::Completed(report)
            }
            Err(e) => {
                error!(error = %e, "Localization pass failed");
                PassOutcome::Failed(e.to_string())
            }
        }
    }

    #[cfg(test)]
    fn forced_failure(&self) -> Result<(), DomError> {
        if self.fail_next_pass.swap(false, Ordering::AcqRel) {
            return Err(DomError::StaleNode("forced".to_string()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn forced_failure(&self) -> Result<(), DomError> {
        Ok(())
    }

    fn run_pass(&self) -> Result<PassReport, DomError> {
        self.forced_failure()?;
        let dictionary = self.dictionary();
        let mut document = self.document.lock();
        let mut processed = self.processed.lock();

        if !processed.is_empty() {
            let pruned = processed.prune(|node| document.is_alive(node));
            if pruned > 0 {
                debug!(pruned, "Dropped processed entries for removed nodes");
            }
        }

        let mut report = PassReport::default();
        let candidates = document.text_nodes_depth_first(document.body())?;
        for node in candidates {
            if let Some(parent) = document.parent(node)? {
                if is_skipped_container(document.tag(parent)?) {
                    continue;
                }
            }
            let content = document.text(node)?;
            if trim_text(content).is_empty() {
                continue;
            }
            report.examined += 1;
            if processed.contains(node) {
                continue;
            }
            if let Some(replacement) = localize(content, &dictionary) {
                document.set_text(node, &replacement)?;
                processed.mark(node);
                report.translated += 1;
                debug!(node = %node, text = %replacement.trim(), "Translated");
            }
        }
        Ok(report)
    }
}
