//! Document node types and generation-tagged node identity

use std::fmt;

/// Stable identity of a node: arena slot plus the slot's generation at allocation.
///
/// A removed node's slot is reused under a new generation, so an old `NodeId` never
/// resolves to the node that replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Element node representation
#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Lowercased tag name
    pub tag: String,
    pub children: Vec<NodeId>,
}

/// Text node representation
#[derive(Debug, Clone)]
pub struct TextNode {
    pub content: String,
}

/// Document node type
#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(ElementNode),
    Text(TextNode),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Slot {
    pub(crate) generation: u32,
    pub(crate) data: Option<NodeData>,
}
