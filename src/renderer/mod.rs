//! Host Renderer - Adapter contract, prop diff, in-memory host.
//!
//! The runtime never touches a concrete host tree directly. Everything goes
//! through [`HostTree`], a small set of mutation primitives:
//!
//! - create a node for a tag, create a text node
//! - set / clear a plain attribute, set a style property
//! - add / remove an event listener
//! - append a child, insert a child before a sibling, remove a child
//!
//! # Modules
//!
//! - [`diff`] - `update_dom`, the minimal prop diff applied on create and update
//! - [`memory`] - `MemoryHost`, a host tree in plain memory with a mutation log

pub mod diff;
pub mod memory;

use std::fmt;
use std::hash::Hash;

use crate::error::HostError;
use crate::types::{EventHandler, Value};

pub use diff::{classify_prop, event_name, update_dom, DiffStats, PropClass};
pub use memory::{MemoryHost, Mutation, MutationKinds, NodeId, NodeKind};

/// Host-tree adapter.
///
/// `Node` is a cheap handle; the runtime stores it in fibers and compares it
/// but never looks inside. Every method may fail; failures propagate out of
/// the commit unchanged, with no retry and no rollback.
pub trait HostTree {
    /// Handle to a host node.
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// Create a detached node for a tag.
    fn create_node(&mut self, tag: &str) -> Result<Self::Node, HostError>;

    /// Create a detached, empty text node.
    fn create_text_node(&mut self) -> Result<Self::Node, HostError>;

    /// Set a plain attribute.
    fn set_attribute(&mut self, node: Self::Node, key: &str, value: &Value) -> Result<(), HostError>;

    /// Reset a plain attribute to empty.
    fn clear_attribute(&mut self, node: Self::Node, key: &str) -> Result<(), HostError>;

    /// Set one property of the node's style.
    fn set_style(&mut self, node: Self::Node, key: &str, value: &Value) -> Result<(), HostError>;

    /// Register a listener for a host event name (e.g., "click").
    fn add_event_listener(
        &mut self,
        node: Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Unregister a listener previously added with the same handler.
    fn remove_event_listener(
        &mut self,
        node: Self::Node,
        event: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), HostError>;

    /// Insert `child` into `parent` right before `before`, an existing child
    /// of `parent`.
    fn insert_before(
        &mut self,
        parent: Self::Node,
        child: Self::Node,
        before: Self::Node,
    ) -> Result<(), HostError>;

    /// Detach `child` (and its subtree) from `parent`.
    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), HostError>;
}
