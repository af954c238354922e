//! Arena-backed document tree

use super::mutation::{MutationRecord, Observers};
use super::node::{ElementNode, NodeData, NodeId, NodeKind, Slot, TextNode};
use crate::error::DomError;
use tokio::sync::mpsc;

/// A live document: a `body` element and everything attached beneath it.
///
/// Mutations of connected nodes are reported to every observer.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body: NodeId,
    observers: Observers,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            observers: Observers::default(),
        };
        document.body = document.allocate(NodeKind::Element(ElementNode {
            tag: "body".to_string(),
            children: Vec::new(),
        }));
        document
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Register an observer for mutations under the body.
    pub fn observe(&mut self) -> mpsc::UnboundedReceiver<MutationRecord> {
        self.observers.register()
    }

    fn allocate(&mut self, kind: NodeKind) -> NodeId {
        let data = Some(NodeData { kind, parent: None });
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = data;
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                data,
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
            .ok_or_else(|| DomError::StaleNode(id.to_string()))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or_else(|| DomError::StaleNode(id.to_string()))
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.data(id).is_ok()
    }

    /// Whether the node is attached under the body.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.body {
                return true;
            }
            current = match self.data(node) {
                Ok(data) => data.parent,
                Err(_) => return false,
            };
        }
        false
    }

    /// Number of live nodes, body included
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.data.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.allocate(NodeKind::Element(ElementNode {
            tag: tag.to_ascii_lowercase(),
            children: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.allocate(NodeKind::Text(TextNode {
            content: content.to_string(),
        }))
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, DomError> {
        Ok(self.data(id)?.parent)
    }

    /// Tag of an element, `None` for text nodes
    pub fn tag(&self, id: NodeId) -> Result<Option<&str>, DomError> {
        Ok(match &self.data(id)?.kind {
            NodeKind::Element(element) => Some(element.tag.as_str()),
            NodeKind::Text(_) => None,
        })
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], DomError> {
        match &self.data(id)?.kind {
            NodeKind::Element(element) => Ok(&element.children),
            NodeKind::Text(_) => Ok(&[]),
        }
    }

    pub fn text(&self, id: NodeId) -> Result<&str, DomError> {
        match &self.data(id)?.kind {
            NodeKind::Text(text) => Ok(&text.content),
            NodeKind::Element(_) => Err(DomError::NotText(id.to_string())),
        }
    }

    /// Replace a text node's content.
    pub fn set_text(&mut self, id: NodeId, content: &str) -> Result<(), DomError> {
        match &mut self.data_mut(id)?.kind {
            NodeKind::Text(text) => text.content = content.to_string(),
            NodeKind::Element(_) => return Err(DomError::NotText(id.to_string())),
        }
        if self.is_connected(id) {
            self.observers
                .notify(MutationRecord::CharacterData { target: id });
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, moving it if already attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if !matches!(self.data(parent)?.kind, NodeKind::Element(_)) {
            return Err(DomError::NotElement(parent.to_string()));
        }
        if child == self.body || self.is_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest(child.to_string()));
        }
        if self.data(child)?.parent.is_some() {
            self.detach(child)?;
        }

        if let NodeKind::Element(element) = &mut self.data_mut(parent)?.kind {
            element.children.push(child);
        }
        self.data_mut(child)?.parent = Some(parent);

        if self.is_connected(parent) {
            self.observers.notify(MutationRecord::ChildList {
                target: parent,
                added: vec![child],
                removed: Vec::new(),
            });
        }
        Ok(())
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let id = self.create_element(tag);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, content: &str) -> Result<NodeId, DomError> {
        let id = self.create_text(content);
        self.append_child(parent, id)?;
        Ok(id)
    }

    /// Detach a node and free it together with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        if id == self.body {
            return Err(DomError::RemoveBody);
        }
        self.data(id)?;
        self.detach(id)?;

        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let slot = &mut self.slots[node.index as usize];
            if let Some(NodeData {
                kind: NodeKind::Element(element),
                ..
            }) = slot.data.take()
            {
                stack.extend(element.children);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(node.index);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let Some(parent) = self.data(id)?.parent else {
            return Ok(());
        };
        let was_connected = self.is_connected(parent);
        if let NodeKind::Element(element) = &mut self.data_mut(parent)?.kind {
            element.children.retain(|c| *c != id);
        }
        self.data_mut(id)?.parent = None;
        if was_connected {
            self.observers.notify(MutationRecord::ChildList {
                target: parent,
                added: Vec::new(),
                removed: vec![id],
            });
        }
        Ok(())
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = Some(of);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.data(node).ok().and_then(|d| d.parent);
        }
        false
    }

    /// Text nodes under `root` in document order (depth-first, pre-order).
    pub fn text_nodes_depth_first(&self, root: NodeId) -> Result<Vec<NodeId>, DomError> {
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            match &self.data(node)?.kind {
                NodeKind::Text(_) => found.push(node),
                NodeKind::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
        Ok(found)
    }

    pub fn has_observers(&self) -> bool {
        !self.observers.is_empty()
    }
}
