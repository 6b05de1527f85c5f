//! Memory host - A host tree that lives in plain memory.
//!
//! `MemoryHost` implements [`HostTree`] over a slotmap of nodes and records
//! every mutation it receives. It backs the test suite and small headless
//! embeddings.
//!
//! Detached nodes are kept until `prune_detached` frees them: removed
//! subtrees and nodes created by discarded renders both linger. The log grows
//! until drained with `take_mutations` or `clear_mutations`.
//!
//! # Mutation log
//!
//! Each primitive call appends one [`Mutation`]. Mutations are classified by
//! [`MutationKinds`] so callers can count, say, only attribute and listener
//! changes:
//!
//! ```ignore
//! let n = host.count(MutationKinds::ATTRIBUTE | MutationKinds::LISTENER);
//! ```

use std::fmt::Write as _;

use bitflags::bitflags;
use slotmap::{new_key_type, SlotMap};

use crate::error::HostError;
use crate::types::{Attributes, Event, EventHandler, TEXT_VALUE_KEY, Value};

use super::HostTree;

new_key_type! {
    /// Handle to a node in a [`MemoryHost`].
    pub struct NodeId;
}

// =============================================================================
// Mutation Kinds (bitflags)
// =============================================================================

bitflags! {
    /// Mutation categories as a bitfield for filtering the log.
    ///
    /// Combine with bitwise OR: `MutationKinds::ATTRIBUTE | MutationKinds::LISTENER`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MutationKinds: u8 {
        const NONE = 0;
        const CREATE = 1 << 0;
        const ATTRIBUTE = 1 << 1;
        const STYLE = 1 << 2;
        const LISTENER = 1 << 3;
        const STRUCTURE = 1 << 4;
    }
}

/// One recorded host mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    CreateNode { node: NodeId, tag: String },
    CreateText { node: NodeId },
    SetAttribute { node: NodeId, key: String, value: Value },
    ClearAttribute { node: NodeId, key: String },
    SetStyle { node: NodeId, key: String, value: Value },
    AddListener { node: NodeId, event: String },
    RemoveListener { node: NodeId, event: String },
    AppendChild { parent: NodeId, child: NodeId },
    InsertBefore { parent: NodeId, child: NodeId, before: NodeId },
    RemoveChild { parent: NodeId, child: NodeId },
}

impl Mutation {
    /// Category of this mutation.
    pub fn kind(&self) -> MutationKinds {
        match self {
            Mutation::CreateNode { .. } | Mutation::CreateText { .. } => MutationKinds::CREATE,
            Mutation::SetAttribute { .. } | Mutation::ClearAttribute { .. } => MutationKinds::ATTRIBUTE,
            Mutation::SetStyle { .. } => MutationKinds::STYLE,
            Mutation::AddListener { .. } | Mutation::RemoveListener { .. } => MutationKinds::LISTENER,
            Mutation::AppendChild { .. }
            | Mutation::InsertBefore { .. }
            | Mutation::RemoveChild { .. } => MutationKinds::STRUCTURE,
        }
    }
}

// =============================================================================
// Nodes
// =============================================================================

/// What a memory node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Caller-owned mount point, never created by the runtime.
    Container(String),
    Element(String),
    Text,
}

/// A node in the memory host.
#[derive(Debug, Clone)]
pub struct HostNode {
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub style: Attributes,
    pub listeners: Vec<(String, EventHandler)>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl HostNode {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Attributes::new(),
            style: Attributes::new(),
            listeners: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }
}

// =============================================================================
// Memory Host
// =============================================================================

/// In-memory host tree with a mutation log.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: SlotMap<NodeId, HostNode>,
    log: Vec<Mutation>,
}

impl MemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mount point for `render`. Not recorded in the log.
    pub fn create_container(&mut self, name: &str) -> NodeId {
        self.nodes.insert(HostNode::new(NodeKind::Container(name.to_string())))
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Get a node.
    pub fn node(&self, id: NodeId) -> Option<&HostNode> {
        self.nodes.get(id)
    }

    /// Children of a node, in order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Parent of a node, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Attribute value.
    pub fn attribute(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.nodes.get(id).and_then(|n| n.attributes.get(key))
    }

    /// Style property value.
    pub fn style(&self, id: NodeId, key: &str) -> Option<&Value> {
        self.nodes.get(id).and_then(|n| n.style.get(key))
    }

    /// Text content of a text node.
    pub fn text(&self, id: NodeId) -> Option<String> {
        self.attribute(id, TEXT_VALUE_KEY).map(|v| v.to_string())
    }

    /// Number of listeners registered for an event on a node.
    pub fn listener_count(&self, id: NodeId, event: &str) -> usize {
        self.nodes
            .get(id)
            .map(|n| n.listeners.iter().filter(|(name, _)| name == event).count())
            .unwrap_or(0)
    }

    /// Check if `id` is `root` or hangs below it.
    pub fn is_attached_to(&self, id: NodeId, root: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Total nodes ever created (attached or not), containers included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // Mutation Log
    // =========================================================================

    /// All recorded mutations, oldest first.
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Drain the log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    /// Forget recorded mutations.
    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    /// Free every node that does not hang below a container.
    ///
    /// Returns the number of nodes freed. Handles to freed nodes stop
    /// resolving.
    pub fn prune_detached(&mut self) -> usize {
        let detached: Vec<NodeId> = self
            .nodes
            .keys()
            .filter(|&id| !self.is_under_container(id))
            .collect();
        for &id in &detached {
            self.nodes.remove(id);
        }
        detached.len()
    }

    fn is_under_container(&self, id: NodeId) -> bool {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        matches!(self.nodes.get(current).map(|n| &n.kind), Some(NodeKind::Container(_)))
    }

    /// Count mutations of the given kinds.
    pub fn count(&self, kinds: MutationKinds) -> usize {
        self.log.iter().filter(|m| kinds.intersects(m.kind())).count()
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Invoke every listener for `event.name` on `id`.
    ///
    /// No bubbling. Returns the number of listeners invoked.
    pub fn dispatch(&self, id: NodeId, event: &Event) -> usize {
        let handlers: Vec<EventHandler> = self
            .nodes
            .get(id)
            .map(|n| {
                n.listeners
                    .iter()
                    .filter(|(name, _)| *name == event.name)
                    .map(|(_, handler)| handler.clone())
                    .collect()
            })
            .unwrap_or_default();

        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Markup-like snapshot of a subtree, for structural assertions.
    ///
    /// Text nodes print their content; elements print attributes in insertion
    /// order and style as `style="k:v;"`. Listeners are not shown.
    pub fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, id);
        out
    }

    fn write_node(&self, out: &mut String, id: NodeId) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let tag = match &node.kind {
            NodeKind::Text => {
                if let Some(text) = node.attributes.get(TEXT_VALUE_KEY) {
                    let _ = write!(out, "{text}");
                }
                return;
            }
            NodeKind::Element(tag) | NodeKind::Container(tag) => tag,
        };

        let _ = write!(out, "<{tag}");
        for (key, value) in &node.attributes {
            let _ = write!(out, " {key}=\"{value}\"");
        }
        if !node.style.is_empty() {
            out.push_str(" style=\"");
            for (key, value) in &node.style {
                let _ = write!(out, "{key}:{value};");
            }
            out.push('"');
        }
        out.push('>');
        for &child in &node.children {
            self.write_node(out, child);
        }
        let _ = write!(out, "</{tag}>");
    }

    /// Check that `parent` can hold children, then unlink `child` from
    /// wherever it hangs now. Inserting an attached node moves it.
    fn detach_for_insert(&mut self, parent: NodeId, child: NodeId, operation: &'static str) -> Result<(), HostError> {
        if self.get_mut(parent)?.kind == NodeKind::Text {
            return Err(HostError::Unsupported {
                operation,
                node: format!("{parent:?}"),
            });
        }
        if let Some(old_parent) = self.get_mut(child)?.parent.take() {
            if let Some(old) = self.nodes.get_mut(old_parent) {
                old.children.retain(|&c| c != child);
            }
        }
        Ok(())
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut HostNode, HostError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| HostError::UnknownNode(format!("{id:?}")))
    }
}

// =============================================================================
// HostTree
// =============================================================================

impl HostTree for MemoryHost {
    type Node = NodeId;

    fn create_node(&mut self, tag: &str) -> Result<NodeId, HostError> {
        let node = self.nodes.insert(HostNode::new(NodeKind::Element(tag.to_string())));
        self.log.push(Mutation::CreateNode {
            node,
            tag: tag.to_string(),
        });
        Ok(node)
    }

    fn create_text_node(&mut self) -> Result<NodeId, HostError> {
        let node = self.nodes.insert(HostNode::new(NodeKind::Text));
        self.log.push(Mutation::CreateText { node });
        Ok(node)
    }

    fn set_attribute(&mut self, node: NodeId, key: &str, value: &Value) -> Result<(), HostError> {
        self.get_mut(node)?.attributes.insert(key.to_string(), value.clone());
        self.log.push(Mutation::SetAttribute {
            node,
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn clear_attribute(&mut self, node: NodeId, key: &str) -> Result<(), HostError> {
        self.get_mut(node)?.attributes.shift_remove(key);
        self.log.push(Mutation::ClearAttribute {
            node,
            key: key.to_string(),
        });
        Ok(())
    }

    fn set_style(&mut self, node: NodeId, key: &str, value: &Value) -> Result<(), HostError> {
        let host_node = self.get_mut(node)?;
        if host_node.kind == NodeKind::Text {
            return Err(HostError::Unsupported {
                operation: "set style",
                node: format!("{node:?}"),
            });
        }
        host_node.style.insert(key.to_string(), value.clone());
        self.log.push(Mutation::SetStyle {
            node,
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        self.get_mut(node)?
            .listeners
            .push((event.to_string(), handler.clone()));
        self.log.push(Mutation::AddListener {
            node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        // Removing a listener that was never added is a no-op, like the DOM.
        self.get_mut(node)?
            .listeners
            .retain(|(name, h)| !(name == event && h.ptr_eq(handler)));
        self.log.push(Mutation::RemoveListener {
            node,
            event: event.to_string(),
        });
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.detach_for_insert(parent, child, "append child")?;
        self.get_mut(child)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(child);
        self.log.push(Mutation::AppendChild { parent, child });
        Ok(())
    }

    fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<(), HostError> {
        if self.parent(before) != Some(parent) {
            return Err(HostError::NotAChild {
                parent: format!("{parent:?}"),
                child: format!("{before:?}"),
            });
        }
        self.detach_for_insert(parent, child, "insert child")?;

        let siblings = &mut self.get_mut(parent)?.children;
        let position = siblings.iter().position(|&c| c == before).unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.get_mut(child)?.parent = Some(parent);
        self.log.push(Mutation::InsertBefore { parent, child, before });
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        let parent_node = self.get_mut(parent)?;
        let Some(position) = parent_node.children.iter().position(|&c| c == child) else {
            return Err(HostError::NotAChild {
                parent: format!("{parent:?}"),
                child: format!("{child:?}"),
            });
        };
        parent_node.children.remove(position);
        self.get_mut(child)?.parent = None;
        self.log.push(Mutation::RemoveChild { parent, child });
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_append_and_serialize() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let div = host.create_node("div").unwrap();
        let text = host.create_text_node().unwrap();

        host.set_attribute(div, "id", &Value::from("a")).unwrap();
        host.set_style(div, "color", &Value::from("red")).unwrap();
        host.set_attribute(text, TEXT_VALUE_KEY, &Value::from("hi")).unwrap();
        host.append_child(root, div).unwrap();
        host.append_child(div, text).unwrap();

        assert_eq!(
            host.serialize(root),
            "<root><div id=\"a\" style=\"color:red;\">hi</div></root>"
        );
        assert!(host.is_attached_to(text, root));
        assert_eq!(host.text(text).as_deref(), Some("hi"));
    }

    #[test]
    fn test_remove_child() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let div = host.create_node("div").unwrap();
        host.append_child(root, div).unwrap();

        host.remove_child(root, div).unwrap();
        assert!(host.children(root).is_empty());
        assert_eq!(host.parent(div), None);

        let err = host.remove_child(root, div).unwrap_err();
        assert!(matches!(err, HostError::NotAChild { .. }));
    }

    #[test]
    fn test_text_nodes_have_no_children() {
        let mut host = MemoryHost::new();
        let text = host.create_text_node().unwrap();
        let div = host.create_node("div").unwrap();

        assert!(host.append_child(text, div).is_err());
        assert!(host.set_style(text, "color", &Value::from("red")).is_err());
    }

    #[test]
    fn test_append_moves_node() {
        let mut host = MemoryHost::new();
        let a = host.create_container("a");
        let b = host.create_container("b");
        let div = host.create_node("div").unwrap();

        host.append_child(a, div).unwrap();
        host.append_child(b, div).unwrap();

        assert!(host.children(a).is_empty());
        assert_eq!(host.children(b), &[div]);
    }

    #[test]
    fn test_dispatch_and_log_kinds() {
        let mut host = MemoryHost::new();
        let button = host.create_node("button").unwrap();
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        let handler = EventHandler::new(move |_| hits_clone.set(hits_clone.get() + 1));

        host.add_event_listener(button, "click", &handler).unwrap();
        assert_eq!(host.dispatch(button, &Event::new("click")), 1);
        assert_eq!(host.dispatch(button, &Event::new("keydown")), 0);
        assert_eq!(hits.get(), 1);

        host.remove_event_listener(button, "click", &handler).unwrap();
        assert_eq!(host.dispatch(button, &Event::new("click")), 0);

        assert_eq!(host.count(MutationKinds::CREATE), 1);
        assert_eq!(host.count(MutationKinds::LISTENER), 2);
        assert_eq!(host.count(MutationKinds::ATTRIBUTE | MutationKinds::STRUCTURE), 0);
    }

    #[test]
    fn test_unknown_node() {
        let mut host = MemoryHost::new();
        let node = host.create_node("div").unwrap();
        let mut other = MemoryHost::new();

        // Handle from another host does not resolve.
        let err = other.set_attribute(node, "id", &Value::from("x")).unwrap_err();
        assert!(matches!(err, HostError::UnknownNode(_)));
    }

    #[test]
    fn test_insert_before() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let [a, b, c] = ["a", "b", "c"].map(|tag| host.create_node(tag).unwrap());
        host.append_child(root, a).unwrap();
        host.append_child(root, c).unwrap();

        host.insert_before(root, b, c).unwrap();

        assert_eq!(host.children(root), &[a, b, c]);
        assert_eq!(host.parent(b), Some(root));
        assert_eq!(host.serialize(root), "<root><a></a><b></b><c></c></root>");
        assert_eq!(host.count(MutationKinds::STRUCTURE), 3);
    }

    #[test]
    fn test_insert_before_requires_sibling_anchor() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let stray = host.create_node("p").unwrap();
        let child = host.create_node("q").unwrap();

        let err = host.insert_before(root, child, stray).unwrap_err();
        assert!(matches!(err, HostError::NotAChild { .. }));
        assert_eq!(host.parent(child), None);
    }

    #[test]
    fn test_prune_detached() {
        let mut host = MemoryHost::new();
        let root = host.create_container("root");
        let kept = host.create_node("div").unwrap();
        let removed = host.create_node("span").unwrap();
        let removed_text = host.create_text_node().unwrap();
        let orphan = host.create_node("em").unwrap();
        host.append_child(root, kept).unwrap();
        host.append_child(root, removed).unwrap();
        host.append_child(removed, removed_text).unwrap();
        host.remove_child(root, removed).unwrap();

        assert_eq!(host.prune_detached(), 3);

        assert_eq!(host.node_count(), 2);
        assert!(host.node(kept).is_some());
        assert!(host.node(orphan).is_none());
        assert!(host.node(removed_text).is_none());
        assert_eq!(host.prune_detached(), 0);
    }
}
