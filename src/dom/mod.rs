//! Live document tree
//!
//! A minimal element/text tree with generation-tagged node ids and mutation
//! observation, standing in for the host page the engine localizes.

mod document;
mod mutation;
mod node;

pub use document::Document;
pub use mutation::MutationRecord;
pub use node::{ElementNode, NodeId, NodeKind, TextNode};

use parking_lot::Mutex;
use std::sync::Arc;

/// The document as shared between the host and the engine
pub type SharedDocument = Arc<Mutex<Document>>;

pub fn shared(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}
