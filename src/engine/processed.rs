//! Processed-node memo
//!
//! Records which text nodes were already translated against the current dictionary
//! version. Node ids are generation-tagged, so a removed node's entry can never match
//! a later node; `prune` drops such entries so the set does not grow with churn.

use crate::dom::NodeId;
use std::collections::HashSet;

/// Set of nodes translated under the current dictionary version
#[derive(Debug, Default)]
pub struct ProcessedSet {
    nodes: HashSet<NodeId>,
    version: u64,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    pub fn mark(&mut self, node: NodeId) {
        self.nodes.insert(node);
    }

    /// Forget everything and start a new dictionary version.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.version += 1;
    }

    /// Drop entries for nodes that no longer exist. Returns how many were dropped.
    pub fn prune<F>(&mut self, is_alive: F) -> usize
    where
        F: Fn(NodeId) -> bool,
    {
        let before = self.nodes.len();
        self.nodes.retain(|node| is_alive(*node));
        before - self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dictionary version the entries belong to
    pub fn version(&self) -> u64 {
        self.version
    }
}
