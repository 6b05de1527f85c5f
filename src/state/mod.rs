//! State Module - Hook store
//!
//! Persistent state for component fibers:
//!
//! - **Hooks** - Per-invocation cursor handing out positional state cells
//! - **Setter** - Queues updates and requests a new render pass
//! - **UpdateRequests** - Shared flag the runtime polls between units of work

mod hooks;

pub use hooks::*;
