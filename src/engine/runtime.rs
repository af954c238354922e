//! Engine runtime loop.
//!
//! A single consumer task multiplexes the four pass triggers: document mutations, storage
//! changes, a periodic tick and a stop signal. Passes run inline on the task, so two passes
//! started by this loop never overlap; the engine's in-pass flag covers callers outside it.

use super::triggers::{MutationBatch, Trigger};
use super::{LocalizationEngine, PassOutcome};
use crate::dom::MutationRecord;
use crate::platform::StorageChange;
use crate::settings::Settings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, Notify};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Period of the safety-net pass
    pub update_interval: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RuntimeConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        let settings = settings.clone().clamped();
        Self {
            update_interval: Duration::from_millis(settings.update_interval_ms),
        }
    }
}

/// Counters accumulated over one `run`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub passes: usize,
    pub skipped: usize,
    pub failed: usize,
    pub translated: usize,
    pub reloads: usize,
}

impl RuntimeStats {
    fn record(&mut self, trigger: &Trigger, outcome: &PassOutcome) {
        match outcome {
            PassOutcome::Completed(report) => {
                self.passes += 1;
                self.translated += report.translated;
            }
            PassOutcome::Skipped => self.skipped += 1,
            PassOutcome::Failed(_) => self.failed += 1,
        }
        debug!(trigger = trigger.label(), outcome = ?outcome, "Pass finished");
    }
}

/// Requests a running loop to exit
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<Notify>);

impl StopHandle {
    /// Takes effect even if the loop is not currently waiting.
    pub fn stop(&self) {
        self.0.notify_one();
    }
}

/// Drives a `LocalizationEngine` from its trigger sources
pub struct EngineRuntime {
    engine: Arc<LocalizationEngine>,
    config: RuntimeConfig,
    stop: Arc<Notify>,
}

impl EngineRuntime {
    pub fn new(engine: Arc<LocalizationEngine>, config: RuntimeConfig) -> Self {
        Self {
            engine,
            config,
            stop: Arc::new(Notify::new()),
        }
    }

    pub fn engine(&self) -> &Arc<LocalizationEngine> {
        &self.engine
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.stop))
    }

    /// Bootstrap the engine, then serve triggers until stopped.
    pub async fn run(
        &self,
        mut mutations: mpsc::UnboundedReceiver<MutationRecord>,
        mut changes: broadcast::Receiver<StorageChange>,
    ) -> RuntimeStats {
        let mut stats = RuntimeStats::default();
        let outcome = self.engine.bootstrap();
        stats.record(&Trigger::Bootstrap, &outcome);

        let period = self.config.update_interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(interval_ms = period.as_millis() as u64, "Engine runtime started");

        let mut batch = MutationBatch::new();
        let mut mutations_open = true;
        let mut changes_open = true;

        loop {
            tokio::select! {
                _ = self.stop.notified() => break,
                record = mutations.recv(), if mutations_open => {
                    let Some(record) = record else {
                        debug!("Document observer closed");
                        mutations_open = false;
                        continue;
                    };
                    batch.add(&record);
                    while let Ok(record) = mutations.try_recv() {
                        batch.add(&record);
                    }
                    let records = batch.seen();
                    if let Some(trigger) = batch.take() {
                        debug!(records, trigger = trigger.label(), "Mutation batch ready");
                        let outcome = self.engine.translate_document();
                        stats.record(&trigger, &outcome);
                    }
                }
                change = changes.recv(), if changes_open => match change {
                    Ok(change) => {
                        if let Some(outcome) = self.engine.handle_storage_change(&change) {
                            stats.reloads += 1;
                            stats.record(&Trigger::StorageChanged(change), &outcome);
                        }
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "Storage change notifications lagged, reloading");
                        match self.engine.reload_dictionary() {
                            Ok(_) => {
                                stats.reloads += 1;
                                let outcome = self.engine.translate_document();
                                stats.record(&Trigger::Resync, &outcome);
                            }
                            Err(e) => warn!(error = %e, "Reload after lag failed"),
                        }
                    }
                    Err(RecvError::Closed) => {
                        debug!("Storage change channel closed");
                        changes_open = false;
                    }
                },
                _ = ticker.tick() => {
                    let outcome = self.engine.translate_document();
                    stats.record(&Trigger::Tick, &outcome);
                }
            }
        }

        info!(
            passes = stats.passes,
            translated = stats.translated,
            reloads = stats.reloads,
            "Engine runtime stopped"
        );
        stats
    }
}
