//! Render Pipeline
//!
//! This module drives a render from request to host mutation.
//!
//! # Pipeline Architecture
//!
//! ```text
//! render / setter → pending root → units of work (yieldable) → commit → current root
//! ```
//!
//! ## Data Flow
//!
//! 1. **mount** - `Runtime::render` allocates a pending root over the container
//! 2. **scheduler** - `work_loop` renders one fiber per unit, checking the deadline between units
//! 3. **commit** - once no unit is left, deletions, inserts and updates reach the host in one pass
//!
//! ## Key Design Principles
//!
//! - **Interruptible Render**: the render phase only builds fibers and detached host nodes
//! - **Atomic Commit**: attached host nodes change only inside `commit_root`
//! - **Two Generations**: the pending tree pairs with the committed one through `alternate`

pub mod commit;
pub mod config;
pub mod mount;
pub mod scheduler;

// Re-exports
pub use commit::CommitSummary;
pub use config::{SchedulerConfig, DEFAULT_FRAME_BUDGET, DEFAULT_YIELD_THRESHOLD};
pub use mount::Runtime;
pub use scheduler::{Deadline, IdleDeadline, Unbounded, UnitBudget, WorkStatus};
