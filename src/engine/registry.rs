//! Fiber Registry - Arena of fibers addressed by stable handles.
//!
//! Manages the lifecycle of fibers across render generations:
//! - Handle allocation for new fibers
//! - Link-following traversal in unit-of-work order
//! - Release of whole subtrees when a generation is retired or discarded
//!
//! The arena replaces the call stack: traversal state is just "which fiber
//! is next", so a render pass can stop after any fiber and resume later.

use std::ops::{Index, IndexMut};

use slotmap::SlotMap;

use super::fiber::{Fiber, FiberId};

/// Arena owning every live fiber of every generation.
#[derive(Debug)]
pub struct FiberTree<N> {
    fibers: SlotMap<FiberId, Fiber<N>>,
}

impl<N> Default for FiberTree<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> FiberTree<N> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            fibers: SlotMap::with_key(),
        }
    }

    // =========================================================================
    // Allocation
    // =========================================================================

    /// Allocate a fiber and return its handle.
    pub fn allocate(&mut self, fiber: Fiber<N>) -> FiberId {
        self.fibers.insert(fiber)
    }

    /// Release a fiber and everything below it.
    ///
    /// Siblings of `id` are left alone. Returns the number of fibers freed.
    pub fn release_subtree(&mut self, id: FiberId) -> usize {
        let mut released = 0;
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            let Some(fiber) = self.fibers.remove(current) else {
                continue;
            };
            released += 1;

            let mut child = fiber.child;
            while let Some(child_id) = child {
                stack.push(child_id);
                child = self.fibers.get(child_id).and_then(|f| f.sibling);
            }
        }

        released
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Get a fiber.
    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.fibers.get(id)
    }

    /// Get a fiber mutably.
    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.fibers.get_mut(id)
    }

    /// Check if a handle still resolves.
    pub fn contains(&self, id: FiberId) -> bool {
        self.fibers.contains_key(id)
    }

    /// Number of live fibers across all generations.
    pub fn len(&self) -> usize {
        self.fibers.len()
    }

    /// Check if the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.fibers.is_empty()
    }

    /// Direct children of a fiber, in sibling order.
    pub fn children(&self, id: FiberId) -> Vec<FiberId> {
        let mut children = Vec::new();
        let mut child = self.get(id).and_then(|f| f.child);
        while let Some(child_id) = child {
            children.push(child_id);
            child = self.get(child_id).and_then(|f| f.sibling);
        }
        children
    }

    /// Every fiber of the subtree rooted at `id`, in pre-order.
    pub fn subtree(&self, id: FiberId) -> Vec<FiberId> {
        let mut ids = Vec::new();
        if !self.contains(id) {
            return ids;
        }
        let mut next = Some(id);
        while let Some(current) = next {
            ids.push(current);
            next = self.next_in_preorder_within(current, id);
        }
        ids
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Next fiber in unit-of-work order: child, else sibling, else the first
    /// sibling found walking up through parents.
    ///
    /// Returns `None` once the walk reaches a fiber with no parent.
    pub fn next_in_preorder(&self, id: FiberId) -> Option<FiberId> {
        if let Some(child) = self.get(id).and_then(|f| f.child) {
            return Some(child);
        }
        self.next_skipping_children(id)
    }

    /// Next fiber after the subtree of `id`: its sibling, or the nearest
    /// ancestor's sibling.
    pub fn next_skipping_children(&self, id: FiberId) -> Option<FiberId> {
        let mut current = Some(id);
        while let Some(current_id) = current {
            let fiber = self.get(current_id)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            current = fiber.parent;
        }
        None
    }

    /// Like `next_in_preorder`, but never leaves the subtree of `bound`.
    fn next_in_preorder_within(&self, id: FiberId, bound: FiberId) -> Option<FiberId> {
        if let Some(child) = self.get(id).and_then(|f| f.child) {
            return Some(child);
        }
        let mut current = id;
        loop {
            if current == bound {
                return None;
            }
            let fiber = self.get(current)?;
            if let Some(sibling) = fiber.sibling {
                return Some(sibling);
            }
            current = fiber.parent?;
        }
    }
}

impl<N: Copy> FiberTree<N> {
    /// Nearest host node at or above `id`.
    ///
    /// Component fibers own no host node, so this may climb several levels.
    pub fn nearest_host(&self, id: FiberId) -> Option<N> {
        let mut current = Some(id);
        while let Some(current_id) = current {
            let fiber = self.get(current_id)?;
            if let Some(host) = fiber.host {
                return Some(host);
            }
            current = fiber.parent;
        }
        None
    }

    /// Host node of the nearest ancestor that owns one (excluding `id` itself).
    pub fn host_parent(&self, id: FiberId) -> Option<N> {
        let parent = self.get(id)?.parent?;
        self.nearest_host(parent)
    }
}

impl<N> Index<FiberId> for FiberTree<N> {
    type Output = Fiber<N>;

    fn index(&self, id: FiberId) -> &Self::Output {
        &self.fibers[id]
    }
}

impl<N> IndexMut<FiberId> for FiberTree<N> {
    fn index_mut(&mut self, id: FiberId) -> &mut Self::Output {
        &mut self.fibers[id]
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::Props;
    use crate::types::NodeType;
    use std::rc::Rc;

    fn node(tree: &mut FiberTree<u32>, tag: &str, parent: Option<FiberId>) -> FiberId {
        let mut fiber = Fiber::new(NodeType::host(tag), Rc::new(Props::new()));
        fiber.parent = parent;
        let id = tree.allocate(fiber);
        if let Some(parent) = parent {
            match tree.children(parent).last().copied() {
                Some(last) => tree[last].sibling = Some(id),
                None => tree[parent].child = Some(id),
            }
        }
        id
    }

    /// root
    /// ├── a
    /// │   └── a1
    /// └── b
    fn sample() -> (FiberTree<u32>, [FiberId; 4]) {
        let mut tree = FiberTree::new();
        let root = node(&mut tree, "root", None);
        let a = node(&mut tree, "a", Some(root));
        let a1 = node(&mut tree, "a1", Some(a));
        let b = node(&mut tree, "b", Some(root));
        (tree, [root, a, a1, b])
    }

    #[test]
    fn test_preorder_walk() {
        let (tree, [root, a, a1, b]) = sample();

        assert_eq!(tree.next_in_preorder(root), Some(a));
        assert_eq!(tree.next_in_preorder(a), Some(a1));
        assert_eq!(tree.next_in_preorder(a1), Some(b));
        assert_eq!(tree.next_in_preorder(b), None);
    }

    #[test]
    fn test_skip_children() {
        let (tree, [_, a, _, b]) = sample();
        assert_eq!(tree.next_skipping_children(a), Some(b));
    }

    #[test]
    fn test_subtree_is_bounded() {
        let (tree, [root, a, a1, b]) = sample();

        assert_eq!(tree.subtree(root), vec![root, a, a1, b]);
        assert_eq!(tree.subtree(a), vec![a, a1]);
        assert_eq!(tree.children(root), vec![a, b]);
    }

    #[test]
    fn test_release_subtree_keeps_siblings() {
        let (mut tree, [root, a, a1, b]) = sample();

        assert_eq!(tree.release_subtree(a), 2);
        assert!(!tree.contains(a));
        assert!(!tree.contains(a1));
        assert!(tree.contains(b));
        assert!(tree.contains(root));
    }

    #[test]
    fn test_nearest_host() {
        let (mut tree, [root, a, a1, _]) = sample();
        tree[root].host = Some(7);

        assert_eq!(tree.nearest_host(a1), Some(7));
        assert_eq!(tree.host_parent(a), Some(7));

        tree[a].host = Some(9);
        assert_eq!(tree.host_parent(a1), Some(9));
        assert_eq!(tree.host_parent(root), None);
    }
}
