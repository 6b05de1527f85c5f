//! Reconciler - Diff a fiber's previous children against new child elements.
//!
//! # Algorithm
//!
//! Walk the new elements (index 0..n) and the previous child chain
//! (`parent.alternate.child`, then siblings) in lockstep. At each position:
//!
//! 1. Same node type on both sides: new fiber, old host node, `Update`.
//! 2. New element with no same-typed old fiber: new fiber, no host node, `Insert`.
//! 3. Old fiber with no same-typed new element: old fiber marked `Delete` and
//!    queued for deletion. It is never linked into the new chain.
//!
//! Steps 2 and 3 both fire when the type at a position changes.
//!
//! # Sharp edge: positional identity
//!
//! Node type at a position is the only identity signal. There are no keys,
//! and no move detection: reordering same-typed children reuses host nodes by
//! position and applies each new element's props to whatever node used to
//! sit there. State held by component children follows the position too.
//!
//! A type change at a position yields an `Insert` there; the commit places the
//! new host node before the next attached sibling, so it stays at that
//! position.

use tracing::trace;

use crate::primitives::Element;

use super::fiber::{Effect, Fiber, FiberId};
use super::registry::FiberTree;

/// Counts of effects assigned during one `reconcile_children` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
}

/// Build `parent`'s new child chain from `elements`.
///
/// Deleted fibers from the previous generation are appended to `deletions`.
pub fn reconcile_children<N: Copy>(
    tree: &mut FiberTree<N>,
    parent: FiberId,
    elements: &[Element],
    deletions: &mut Vec<FiberId>,
) -> ReconcileStats {
    let mut stats = ReconcileStats::default();
    let mut old_fiber = tree[parent].alternate.and_then(|alt| tree.get(alt)).and_then(|f| f.child);
    let mut prev_sibling: Option<FiberId> = None;
    let mut index = 0;

    while index < elements.len() || old_fiber.is_some() {
        let element = elements.get(index);

        let same_type = match (old_fiber, element) {
            (Some(old), Some(element)) => tree[old].node_type == element.node_type,
            _ => false,
        };

        let new_fiber = match (element, old_fiber) {
            (Some(element), Some(old)) if same_type => {
                let host = tree[old].host;
                let mut fiber = Fiber::new(element.node_type.clone(), element.props.clone());
                fiber.host = host;
                fiber.parent = Some(parent);
                fiber.alternate = Some(old);
                fiber.effect = Effect::Update;
                stats.updated += 1;
                Some(tree.allocate(fiber))
            }
            (Some(element), _) => {
                let mut fiber = Fiber::new(element.node_type.clone(), element.props.clone());
                fiber.parent = Some(parent);
                fiber.effect = Effect::Insert;
                stats.inserted += 1;
                Some(tree.allocate(fiber))
            }
            (None, _) => None,
        };

        if let Some(old) = old_fiber {
            if !same_type {
                tree[old].effect = Effect::Delete;
                deletions.push(old);
                stats.deleted += 1;
            }
            old_fiber = tree[old].sibling;
        }

        if index == 0 {
            tree[parent].child = new_fiber;
        } else if element.is_some() {
            if let Some(prev) = prev_sibling {
                tree[prev].sibling = new_fiber;
            }
        }

        prev_sibling = new_fiber;
        index += 1;
    }

    trace!(
        node = tree[parent].node_type.label(),
        inserted = stats.inserted,
        updated = stats.updated,
        deleted = stats.deleted,
        "reconciled children"
    );

    stats
}

// =============================================================================
// Tests
// =============================================================================
