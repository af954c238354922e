//! Pass triggers and mutation batching.

use crate::dom::MutationRecord;
use crate::platform::StorageChange;

/// Why a pass was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Bootstrap,
    /// Document mutations that introduced content
    Mutations(usize),
    StorageChanged(StorageChange),
    /// Change notifications were missed; everything is re-read
    Resync,
    /// Periodic safety-net pass
    Tick,
}

impl Trigger {
    pub fn label(&self) -> &'static str {
        match self {
            Trigger::Bootstrap => "bootstrap",
            Trigger::Mutations(_) => "mutation",
            Trigger::StorageChanged(_) => "storage_change",
            Trigger::Resync => "resync",
            Trigger::Tick => "tick",
        }
    }
}

/// Coalesces a burst of mutation records into one pass request.
///
/// Records that only remove nodes are counted but never make the batch ready.
#[derive(Debug, Default)]
pub struct MutationBatch {
    relevant: usize,
    seen: usize,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; returns true if it introduced content.
    pub fn add(&mut self, record: &MutationRecord) -> bool {
        self.seen += 1;
        if record.introduces_content() {
            self.relevant += 1;
            true
        } else {
            false
        }
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    /// Drain the batch into a trigger, if any record warrants a pass.
    pub fn take(&mut self) -> Option<Trigger> {
        let relevant = self.relevant;
        self.relevant = 0;
        self.seen = 0;
        (relevant > 0).then_some(Trigger::Mutations(relevant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    #[test]
    fn test_removals_alone_do_not_trigger() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.append_text(body, "x").unwrap();

        let mut batch = MutationBatch::new();
        let removal = MutationRecord::ChildList {
            target: body,
            added: Vec::new(),
            removed: vec![node],
        };
        assert!(!batch.add(&removal));
        assert_eq!(batch.seen(), 1);
        assert_eq!(batch.take(), None);
    }

    #[test]
    fn test_burst_coalesces_into_one_trigger() {
        let mut doc = Document::new();
        let body = doc.body();
        let node = doc.append_text(body, "x").unwrap();

        let mut batch = MutationBatch::new();
        batch.add(&MutationRecord::ChildList {
            target: body,
            added: vec![node],
            removed: Vec::new(),
        });
        batch.add(&MutationRecord::CharacterData { target: node });
        assert_eq!(batch.seen(), 2);
        assert_eq!(batch.take(), Some(Trigger::Mutations(2)));
        assert_eq!(batch.take(), None);
    }
}
