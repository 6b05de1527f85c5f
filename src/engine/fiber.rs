//! Fiber - Mutable per-node work record.
//!
//! One fiber exists per rendered node per generation. Fibers link to each
//! other through handles into the fiber arena rather than through pointers:
//!
//! ```text
//! parent ──child──▶ first ──sibling──▶ second ──sibling──▶ third
//!    ▲                │                  │                  │
//!    └────parent──────┴──────────────────┴──────────────────┘
//! ```
//!
//! `child` is the owning link; `sibling` and `parent` are lateral and
//! backward links. `alternate` pairs a fiber with the fiber for the same
//! logical node in the other generation (pending ↔ current).

use std::rc::Rc;

use slotmap::new_key_type;

use crate::primitives::Props;
use crate::state::HookCell;
use crate::types::NodeType;

new_key_type! {
    /// Stable handle to a fiber in a [`FiberTree`](super::FiberTree).
    pub struct FiberId;
}

/// Pending mutation classification, valid only during the current render cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Effect {
    #[default]
    None,
    /// Host node must be attached under the nearest host ancestor.
    Insert,
    /// Host node is reused; changed props must be applied.
    Update,
    /// Fiber belongs to the previous generation and its host node(s) must go.
    Delete,
}

/// Mutable work record for one node of one render generation.
///
/// `N` is the host adapter's node handle.
#[derive(Debug, Clone)]
pub struct Fiber<N> {
    pub node_type: NodeType,
    pub props: Rc<Props>,
    /// Host node owned by this fiber. Absent for components and the
    /// not-yet-visited inserts.
    pub host: Option<N>,
    pub parent: Option<FiberId>,
    pub child: Option<FiberId>,
    pub sibling: Option<FiberId>,
    pub alternate: Option<FiberId>,
    pub effect: Effect,
    /// Hook cells, rebuilt on every render of a component fiber.
    pub hooks: Vec<HookCell>,
}

impl<N> Fiber<N> {
    /// Create an unlinked fiber with no host node and no effect.
    pub fn new(node_type: NodeType, props: Rc<Props>) -> Self {
        Self {
            node_type,
            props,
            host: None,
            parent: None,
            child: None,
            sibling: None,
            alternate: None,
            effect: Effect::None,
            hooks: Vec::new(),
        }
    }

    /// Root fiber for a render pass over `container`.
    pub fn root(container: N, props: Rc<Props>, alternate: Option<FiberId>) -> Self {
        Self {
            host: Some(container),
            alternate,
            ..Self::new(NodeType::Root, props)
        }
    }

    /// Check if this fiber renders through a component function.
    #[inline]
    pub fn is_component(&self) -> bool {
        self.node_type.is_component()
    }
}
