//! Commit Phase - Apply a finished pending tree to the host in one pass.
//!
//! Runs synchronously once the last unit of work is done. Order:
//!
//! 1. Remove the host nodes of every fiber queued for deletion
//! 2. Walk the pending tree in pre-order from the root's first child:
//!    - `Insert` + host node: attach it under the nearest host ancestor,
//!      before the first later sibling that is already attached, else last
//!    - `Update` + host node: apply the prop diff against the alternate
//!    - no host node (components): nothing to apply
//! 3. Promote the pending root to current and retire the previous generation
//!
//! A host failure stops the commit where it is. Mutations already applied
//! stay applied; the pending tree is dropped and the previous tree stays
//! current.

use tracing::{debug, trace, warn};

use crate::engine::{Effect, FiberId};
use crate::error::{RenderError, Result};
use crate::renderer::{update_dom, DiffStats, HostTree};

use super::mount::Runtime;

/// What one commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    /// Fibers with an `Insert` effect, components included.
    pub inserted: usize,
    /// Fibers with an `Update` effect, components included.
    pub updated: usize,
    /// Fibers from the previous tree queued for deletion.
    pub deleted: usize,
    /// Host nodes detached while processing deletions.
    pub nodes_removed: usize,
    /// Prop diff mutations applied to updated host nodes.
    pub host: DiffStats,
}

impl<H: HostTree> Runtime<H> {
    /// Commit the pending tree.
    pub(crate) fn commit_root(&mut self) -> Result<CommitSummary> {
        let Some(root) = self.pending_root else {
            return Ok(CommitSummary::default());
        };

        match self.commit_mutations(root) {
            Ok(summary) => {
                self.promote(root);
                debug!(
                    inserted = summary.inserted,
                    updated = summary.updated,
                    deleted = summary.deleted,
                    mutations = summary.host.total(),
                    "committed"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(%err, "commit failed, pending tree dropped");
                self.discard_pending();
                Err(err)
            }
        }
    }

    fn commit_mutations(&mut self, root: FiberId) -> Result<CommitSummary> {
        let mut summary = CommitSummary::default();

        let deletions = self.deletions.clone();
        for fiber in deletions {
            summary.nodes_removed += self.commit_deletion(fiber)?;
            summary.deleted += 1;
        }

        for id in self.fibers.subtree(root).into_iter().skip(1) {
            let fiber = &self.fibers[id];
            match (fiber.effect, fiber.host) {
                (Effect::Insert, Some(node)) => {
                    let parent = self
                        .fibers
                        .host_parent(id)
                        .ok_or(RenderError::MissingHostParent(id))?;
                    match self.insertion_anchor(id) {
                        Some(before) => {
                            trace!(?parent, ?node, ?before, "insert");
                            self.host.insert_before(parent, node, before)?;
                        }
                        None => {
                            trace!(?parent, ?node, "append");
                            self.host.append_child(parent, node)?;
                        }
                    }
                    summary.inserted += 1;
                }
                (Effect::Update, Some(node)) => {
                    let new = fiber.props.clone();
                    let old = fiber
                        .alternate
                        .and_then(|alt| self.fibers.get(alt))
                        .map(|alt| alt.props.clone())
                        .ok_or(RenderError::StaleFiber(id))?;
                    let stats = update_dom(&mut self.host, node, &old, &new)?;
                    summary.host.merge(stats);
                    summary.updated += 1;
                }
                (Effect::Insert, None) => summary.inserted += 1,
                (Effect::Update, None) => summary.updated += 1,
                (Effect::None | Effect::Delete, _) => {}
            }
        }

        Ok(summary)
    }

    /// Attached host node the new node of `id` must precede.
    ///
    /// Looks through later siblings, descending into components and climbing
    /// out of them while the parent owns no host node. Only `Update` fibers
    /// count: their nodes already sit in the host parent. `None` means the
    /// node goes last.
    fn insertion_anchor(&self, id: FiberId) -> Option<H::Node> {
        let mut current = id;
        loop {
            let mut sibling = self.fibers.get(current)?.sibling;
            while let Some(next) = sibling {
                if let Some(node) = self.first_attached_host(next) {
                    return Some(node);
                }
                sibling = self.fibers.get(next)?.sibling;
            }

            let parent = self.fibers.get(current)?.parent?;
            if self.fibers.get(parent)?.host.is_some() {
                return None;
            }
            current = parent;
        }
    }

    /// First host node in the subtree of `id` that is already attached.
    fn first_attached_host(&self, id: FiberId) -> Option<H::Node> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let fiber = self.fibers.get(current)?;
            match fiber.host {
                Some(node) if fiber.effect == Effect::Update => return Some(node),
                Some(_) => {}
                None => stack.extend(self.fibers.children(current).into_iter().rev()),
            }
        }
        None
    }

    /// Detach the host node(s) of a deleted fiber.
    ///
    /// A fiber without a host node (a component) stands for the host nodes of
    /// its descendants, so every child is visited until one owns a node.
    /// Returns the number of host nodes removed.
    fn commit_deletion(&mut self, id: FiberId) -> Result<usize> {
        let parent = self
            .fibers
            .host_parent(id)
            .ok_or(RenderError::MissingHostParent(id))?;

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let host = self
                .fibers
                .get(current)
                .ok_or(RenderError::StaleFiber(current))?
                .host;
            match host {
                Some(node) => {
                    trace!(?parent, ?node, "remove");
                    self.host.remove_child(parent, node)?;
                    removed += 1;
                }
                None => stack.extend(self.fibers.children(current).into_iter().rev()),
            }
        }
        Ok(removed)
    }

    /// Make `root` current and free the generation it replaces.
    fn promote(&mut self, root: FiberId) {
        self.deletions.clear();
        self.pending_root = None;

        if let Some(previous) = self.current_root.replace(root) {
            let freed = self.fibers.release_subtree(previous);
            trace!(freed, "retired previous generation");
        }

        for id in self.fibers.subtree(root) {
            let fiber = &mut self.fibers[id];
            fiber.alternate = None;
            fiber.effect = Effect::None;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::HostError;
    use crate::primitives::{create_element, Element};
    use crate::props;
    use crate::renderer::{HostTree, MemoryHost, NodeId};
    use crate::types::{EventHandler, Value};

    use super::*;

    fn mounted(element: Element) -> (Runtime<MemoryHost>, NodeId) {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        let mut runtime = Runtime::new(host);
        runtime.render(element, container);
        runtime.flush_sync().unwrap();
        (runtime, container)
    }

    #[test]
    fn test_first_commit_builds_tree() {
        let (runtime, container) = mounted(create_element(
            "div",
            props! { "id" => "a", "style" => props! { "color" => "red" } },
            ["hi"],
        ));

        assert_eq!(
            runtime.host().serialize(container),
            r#"<root><div id="a" style="color:red;">hi</div></root>"#
        );
    }

    #[test]
    fn test_update_applies_prop_diff() {
        let (mut runtime, container) = mounted(create_element("div", props! { "id" => "a" }, ["x"]));
        runtime.host_mut().clear_mutations();

        runtime.render(create_element("div", props! { "id" => "b" }, ["x"]), container);
        let summary = runtime.flush_sync().unwrap().unwrap();

        assert_eq!(summary.updated, 2);
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.host.attributes_set, 1);
        assert_eq!(runtime.host().mutations().len(), 1);
        assert_eq!(runtime.host().serialize(container), r#"<root><div id="b">x</div></root>"#);
    }

    #[test]
    fn test_deletion_removes_host_nodes() {
        let (mut runtime, container) = mounted(create_element("ul", props! {}, [
            create_element("li", props! {}, ["1"]),
            create_element("li", props! {}, ["2"]),
        ]));

        runtime.render(create_element("ul", props! {}, [create_element("li", props! {}, ["1"])]), container);
        let summary = runtime.flush_sync().unwrap().unwrap();

        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.nodes_removed, 1);
        assert_eq!(runtime.host().serialize(container), "<root><ul><li>1</li></ul></root>");
    }

    #[test]
    fn test_previous_generation_is_retired() {
        let element = || create_element("div", props! {}, ["a", "b"]);
        let (mut runtime, container) = mounted(element());
        let live = runtime.fibers().len();

        for _ in 0..3 {
            runtime.render(element(), container);
            runtime.flush_sync().unwrap();
        }

        assert_eq!(runtime.fibers().len(), live);
        let root = runtime.current_root().unwrap();
        for id in runtime.fibers().subtree(root) {
            let fiber = runtime.fiber(id).unwrap();
            assert_eq!(fiber.alternate, None);
            assert_eq!(fiber.effect, Effect::None);
        }
    }

    /// Host that refuses to attach anything under a chosen parent.
    struct FailingHost {
        inner: MemoryHost,
    }

    impl HostTree for FailingHost {
        type Node = NodeId;

        fn create_node(&mut self, tag: &str) -> Result<NodeId, HostError> {
            self.inner.create_node(tag)
        }
        fn create_text_node(&mut self) -> Result<NodeId, HostError> {
            self.inner.create_text_node()
        }
        fn set_attribute(&mut self, node: NodeId, key: &str, value: &Value) -> Result<(), HostError> {
            self.inner.set_attribute(node, key, value)
        }
        fn clear_attribute(&mut self, node: NodeId, key: &str) -> Result<(), HostError> {
            self.inner.clear_attribute(node, key)
        }
        fn set_style(&mut self, node: NodeId, key: &str, value: &Value) -> Result<(), HostError> {
            self.inner.set_style(node, key, value)
        }
        fn add_event_listener(&mut self, node: NodeId, event: &str, handler: &EventHandler) -> Result<(), HostError> {
            self.inner.add_event_listener(node, event, handler)
        }
        fn remove_event_listener(&mut self, node: NodeId, event: &str, handler: &EventHandler) -> Result<(), HostError> {
            self.inner.remove_event_listener(node, event, handler)
        }
        fn append_child(&mut self, _parent: NodeId, _child: NodeId) -> Result<(), HostError> {
            Err(HostError::Adapter("append refused".into()))
        }
        fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) -> Result<(), HostError> {
            self.inner.insert_before(parent, child, before)
        }
        fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
            self.inner.remove_child(parent, child)
        }
    }

    #[test]
    fn test_host_failure_drops_pending_tree() {
        let mut inner = MemoryHost::new();
        let container = inner.create_container("root");
        let mut runtime = Runtime::new(FailingHost { inner });

        runtime.render(create_element("div", props! {}, ["x"]), container);
        let err = runtime.flush_sync().unwrap_err();

        assert!(matches!(err, RenderError::Host(HostError::Adapter(_))));
        assert_eq!(runtime.current_root(), None);
        assert_eq!(runtime.pending_root(), None);
        assert!(runtime.fibers().is_empty());
        assert!(runtime.is_idle());
    }
}
