//! # spark-fiber
//!
//! Incremental, interruptible UI reconciler for Rust.
//!
//! Declarative element trees are diffed against the previously committed
//! tree one fiber at a time. Work can pause whenever the scheduling deadline
//! runs low and resumes where it left off; the host tree only changes in a
//! single commit pass once the whole tree is done.
//!
//! ## Architecture
//!
//! ```text
//! Element tree → Fiber units of work → Reconciler (effects) → Commit → HostTree
//!                       ▲                                         │
//!                       └──────── Hook Store (use_state) ◀────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (NodeType, ComponentFn, Value, EventHandler)
//! - [`primitives`] - Element Model (Element, Props, create_element)
//! - [`engine`] - Fiber tree arena and the child reconciler
//! - [`state`] - Hook Store (use_state, Setter)
//! - [`pipeline`] - Runtime, work loop, commit phase
//! - [`renderer`] - HostTree adapter contract, prop diff, in-memory host
//! - [`error`] - HostError, RenderError
//!
//! ## Example
//!
//! ```ignore
//! use spark_fiber::{create_element, props, ComponentFn, Element, EventHandler, MemoryHost, Runtime};
//!
//! let counter = ComponentFn::new("Counter", |_props, hooks| {
//!     let (count, set_count) = hooks.use_state(0i64);
//!     let click = EventHandler::new(move |_| set_count.update(|n| n + 1));
//!     create_element("button", props! { "onClick" => click }, [count])
//! });
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut runtime = Runtime::new(host);
//! runtime.render(create_element(counter, props! {}, Vec::<Element>::new()), container);
//! runtime.flush_sync()?;
//! ```

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod primitives;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{HostError, RenderError, Result};

pub use engine::{reconcile_children, Effect, Fiber, FiberId, FiberTree, ReconcileStats};

pub use primitives::{create_element, create_text_element, Child, Element, Props};

pub use state::{HookCell, Hooks, Setter, StateUpdate, UpdateRequests};

pub use pipeline::{
    CommitSummary, Deadline, IdleDeadline, Runtime, SchedulerConfig, Unbounded, UnitBudget,
    WorkStatus,
};

pub use renderer::{
    classify_prop, event_name, update_dom, DiffStats, HostTree, MemoryHost, Mutation,
    MutationKinds, NodeId, NodeKind, PropClass,
};
