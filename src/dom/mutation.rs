//! Mutation records and observer fan-out

use super::node::NodeId;
use tokio::sync::mpsc;

/// A change under the document body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    CharacterData {
        target: NodeId,
    },
}

impl MutationRecord {
    /// Whether the record may have introduced text worth a localization pass.
    pub fn introduces_content(&self) -> bool {
        match self {
            MutationRecord::ChildList { added, .. } => !added.is_empty(),
            MutationRecord::CharacterData { .. } => true,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Observers {
    senders: Vec<mpsc::UnboundedSender<MutationRecord>>,
}

impl Observers {
    pub(crate) fn register(&mut self) -> mpsc::UnboundedReceiver<MutationRecord> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.senders.push(tx);
        rx
    }

    /// Deliver to every live observer, dropping observers whose receiver is gone.
    pub(crate) fn notify(&mut self, record: MutationRecord) {
        self.senders.retain(|tx| tx.send(record.clone()).is_ok());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}
