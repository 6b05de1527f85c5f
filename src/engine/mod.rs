//! Fiber Engine - Fiber arena and reconciler.
//!
//! The engine manages the core data structures:
//! - Fiber: mutable per-node record with child/sibling/parent/alternate links
//! - Registry: arena of fibers addressed by stable `FiberId` handles
//! - Reconcile: positional diff of a fiber's children against new elements
//!
//! # Architecture
//!
//! Fibers are NOT boxed nodes pointing at each other. They are entries in one
//! arena and link through handles:
//!
//! ```text
//! #root  (child=App)
//! App    (parent=#root, child=div,  alternate=App')
//! div    (parent=App,   child=text, alternate=div', host=Some(n1))
//! text   (parent=div,               alternate=text', host=Some(n2))
//! ```
//!
//! Two generations live in the arena while a render is pending: the committed
//! one and the one being built. Commit retires the old generation.

mod fiber;
mod reconcile;
mod registry;

pub use fiber::{Effect, Fiber, FiberId};
pub use reconcile::{reconcile_children, ReconcileStats};
pub use registry::FiberTree;
