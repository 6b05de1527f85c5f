//! Work Scheduler - Cooperative, interruptible render loop.
//!
//! Rendering is split into units of work, one per fiber. The loop processes
//! units until the deadline says the slice is nearly used up, then hands
//! control back. Nothing touches the host tree's attached nodes until the
//! last unit is done and the whole pending tree commits at once.
//!
//! # Unit of work
//!
//! 1. Component fiber: call the component with a fresh hook cursor, store
//!    the new hook cells, reconcile its single child element.
//! 2. Host fiber: create the detached host node if there is none yet, apply
//!    its initial props, reconcile its child elements.
//! 3. Pick the next fiber: child, else sibling, else the nearest ancestor's
//!    sibling. The walk ends back at the root.
//!
//! # Example
//!
//! ```ignore
//! // Yield after every two units
//! loop {
//!     match runtime.work_loop(&UnitBudget::new(2))? {
//!         WorkStatus::Yielded { .. } => continue,
//!         WorkStatus::Committed(summary) => println!("{summary:?}"),
//!         WorkStatus::Idle => break,
//!     }
//! }
//! ```

use std::cell::Cell;
use std::slice;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::engine::{reconcile_children, FiberId};
use crate::error::{RenderError, Result};
use crate::primitives::Props;
use crate::renderer::{update_dom, HostTree};
use crate::state::Hooks;
use crate::types::{ComponentFn, NodeType};

use super::commit::CommitSummary;
use super::mount::Runtime;

// =============================================================================
// Deadlines
// =============================================================================

/// Source of "how much time is left in this slice".
pub trait Deadline {
    fn time_remaining(&self) -> Duration;
}

impl<F: Fn() -> Duration> Deadline for F {
    fn time_remaining(&self) -> Duration {
        self()
    }
}

/// Wall-clock slice starting now.
#[derive(Debug, Clone, Copy)]
pub struct IdleDeadline {
    start: Instant,
    budget: Duration,
}

impl IdleDeadline {
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }
}

impl Deadline for IdleDeadline {
    fn time_remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }
}

/// Slice that never runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> Duration {
        Duration::MAX
    }
}

/// Slice that runs out after a fixed number of units.
///
/// Each query counts as one finished unit. Deterministic, so it is what
/// tests use to interrupt a render at an exact point.
#[derive(Debug)]
pub struct UnitBudget(Cell<usize>);

impl UnitBudget {
    pub fn new(units: usize) -> Self {
        Self(Cell::new(units))
    }

    /// Units left before the budget reports zero.
    pub fn remaining(&self) -> usize {
        self.0.get()
    }
}

impl Deadline for UnitBudget {
    fn time_remaining(&self) -> Duration {
        let left = self.0.get().saturating_sub(1);
        self.0.set(left);
        if left == 0 { Duration::ZERO } else { Duration::MAX }
    }
}

// =============================================================================
// Work Loop
// =============================================================================

/// Outcome of one `work_loop` slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkStatus {
    /// Nothing to do.
    Idle,
    /// The slice ran out with work left.
    Yielded { units: usize },
    /// The pending tree finished and was committed.
    Committed(CommitSummary),
}

impl WorkStatus {
    /// Check if this slice committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, WorkStatus::Committed(_))
    }
}

impl<H: HostTree> Runtime<H> {
    /// Run one slice of work.
    ///
    /// At least one unit runs per call when work exists; the deadline is
    /// checked after each unit. A pending state update restarts the render
    /// from the committed tree before the next unit. When the last unit
    /// finishes, the commit runs in the same call regardless of the deadline.
    pub fn work_loop(&mut self, deadline: &impl Deadline) -> Result<WorkStatus> {
        let mut units = 0;
        let mut should_yield = false;

        loop {
            if self.requests.take() {
                self.schedule_update();
            }
            let Some(unit) = self.next_unit_of_work else {
                break;
            };
            if should_yield {
                debug!(units, "slice exhausted, yielding");
                return Ok(WorkStatus::Yielded { units });
            }

            match self.perform_unit_of_work(unit) {
                Ok(next) => self.next_unit_of_work = next,
                Err(err) => {
                    self.discard_pending();
                    return Err(err);
                }
            }
            units += 1;
            should_yield = deadline.time_remaining() < self.config.yield_threshold;
        }

        if self.pending_root.is_some() {
            return self.commit_root().map(WorkStatus::Committed);
        }
        Ok(WorkStatus::Idle)
    }

    /// One slice with the configured frame budget.
    pub fn tick(&mut self) -> Result<WorkStatus> {
        let deadline = IdleDeadline::new(self.config.frame_budget);
        self.work_loop(&deadline)
    }

    /// Drive work to idle without yielding.
    ///
    /// Returns the summary of the last commit, if any happened.
    pub fn flush_sync(&mut self) -> Result<Option<CommitSummary>> {
        let mut last = None;
        loop {
            match self.work_loop(&Unbounded)? {
                WorkStatus::Idle => return Ok(last),
                WorkStatus::Committed(summary) => last = Some(summary),
                WorkStatus::Yielded { .. } => {}
            }
        }
    }

    // =========================================================================
    // Units
    // =========================================================================

    /// Process one fiber and return the next one to process.
    pub(crate) fn perform_unit_of_work(&mut self, id: FiberId) -> Result<Option<FiberId>> {
        let fiber = self.fibers.get(id).ok_or(RenderError::StaleFiber(id))?;
        match fiber.node_type.clone() {
            NodeType::Component(component) => self.update_function_component(id, &component),
            _ => self.update_host_component(id)?,
        }
        Ok(self.fibers.next_in_preorder(id))
    }

    fn update_function_component(&mut self, id: FiberId, component: &ComponentFn) {
        let fiber = &self.fibers[id];
        let props = fiber.props.clone();
        let previous = fiber
            .alternate
            .and_then(|alt| self.fibers.get(alt))
            .map(|alt| alt.hooks.clone())
            .unwrap_or_default();

        let mut hooks = Hooks::new(&previous, &self.requests, component.name());
        let child = component.render(&props, &mut hooks);
        let cells = hooks.finish();

        trace!(component = component.name(), hooks = cells.len(), "rendered component");
        self.fibers[id].hooks = cells;
        reconcile_children(&mut self.fibers, id, slice::from_ref(&child), &mut self.deletions);
    }

    fn update_host_component(&mut self, id: FiberId) -> Result<()> {
        let fiber = &self.fibers[id];
        let props = fiber.props.clone();

        if fiber.host.is_none() {
            let node = match &fiber.node_type {
                NodeType::Text => Some(self.host.create_text_node()?),
                NodeType::Host(tag) => Some(self.host.create_node(tag)?),
                NodeType::Root | NodeType::Component(_) => None,
            };
            if let Some(node) = node {
                update_dom(&mut self.host, node, &Props::default(), &props)?;
                trace!(?node, "created host node");
                self.fibers[id].host = Some(node);
            }
        }

        reconcile_children(&mut self.fibers, id, &props.children, &mut self.deletions);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::create_element;
    use crate::props;
    use crate::renderer::{MemoryHost, MutationKinds};

    fn runtime() -> (Runtime<MemoryHost>, crate::renderer::NodeId) {
        let mut host = MemoryHost::new();
        let container = host.create_container("root");
        (Runtime::new(host), container)
    }

    #[test]
    fn test_unit_budget_counts_down() {
        let budget = UnitBudget::new(2);
        assert_eq!(budget.time_remaining(), Duration::MAX);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.time_remaining(), Duration::ZERO);
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_idle_deadline_and_closure() {
        let deadline = IdleDeadline::new(Duration::from_secs(60));
        assert!(deadline.time_remaining() > Duration::from_secs(1));
        assert_eq!(IdleDeadline::new(Duration::ZERO).time_remaining(), Duration::ZERO);

        let fixed = || Duration::from_millis(5);
        assert_eq!(fixed.time_remaining(), Duration::from_millis(5));
    }

    #[test]
    fn test_idle_when_nothing_scheduled() {
        let (mut runtime, _) = runtime();
        assert!(runtime.is_idle());
        assert_eq!(runtime.work_loop(&Unbounded).unwrap(), WorkStatus::Idle);
    }

    #[test]
    fn test_yields_between_units() {
        let (mut runtime, container) = runtime();
        let element = create_element("div", props! {}, ["a", "b"]);
        runtime.render(element, container);

        // root, div, "a", "b": four units
        let status = runtime.work_loop(&UnitBudget::new(1)).unwrap();
        assert_eq!(status, WorkStatus::Yielded { units: 1 });
        assert!(!runtime.is_idle());
        assert!(runtime.host().children(container).is_empty());

        let status = runtime.work_loop(&UnitBudget::new(2)).unwrap();
        assert_eq!(status, WorkStatus::Yielded { units: 2 });
        assert!(runtime.host().children(container).is_empty());

        let status = runtime.work_loop(&UnitBudget::new(2)).unwrap();
        assert!(status.is_committed());
        assert_eq!(runtime.host().children(container).len(), 1);
        assert!(runtime.is_idle());
    }

    #[test]
    fn test_host_nodes_created_detached_during_render() {
        let (mut runtime, container) = runtime();
        runtime.render(create_element("p", props! { "id" => "x" }, ["hi"]), container);

        runtime.work_loop(&UnitBudget::new(3)).unwrap();

        assert_eq!(runtime.host().count(MutationKinds::CREATE), 2);
        assert_eq!(runtime.host().count(MutationKinds::STRUCTURE), 0);
        assert_eq!(runtime.host().serialize(container), "<root></root>");
    }

    #[test]
    fn test_tick_and_flush_sync() {
        let (mut runtime, container) = runtime();
        runtime.render(create_element("span", props! {}, ["x"]), container);

        let summary = runtime.flush_sync().unwrap().unwrap();
        assert_eq!(summary.inserted, 2);
        assert!(runtime.is_idle());
        assert_eq!(runtime.tick().unwrap(), WorkStatus::Idle);
        assert_eq!(runtime.flush_sync().unwrap(), None);
    }
}
