//! Mount API - Runtime context and render entry point.
//!
//! All scheduler state lives in one [`Runtime`] value instead of ambient
//! globals: the committed root, the root being built, the next unit of work,
//! and the deletion list. Several runtimes can coexist, each owning its own
//! host adapter.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{Runtime, MemoryHost, create_element, props};
//!
//! let mut host = MemoryHost::new();
//! let container = host.create_container("root");
//! let mut runtime = Runtime::new(host);
//!
//! runtime.render(create_element("h1", props! {}, ["hello"]), container);
//!
//! // Option 1: drive from the environment's idle callback
//! runtime.work_loop(&idle_deadline)?;
//!
//! // Option 2: one slice with the configured frame budget
//! while !runtime.is_idle() {
//!     runtime.tick()?;
//! }
//!
//! // Option 3: run to completion
//! runtime.flush_sync()?;
//! ```

use std::rc::Rc;

use tracing::{debug, warn};

use crate::engine::{Effect, Fiber, FiberId, FiberTree};
use crate::primitives::{Element, Props};
use crate::renderer::HostTree;
use crate::state::UpdateRequests;

use super::config::SchedulerConfig;

// =============================================================================
// Runtime
// =============================================================================

/// Render runtime for one host tree.
///
/// Single-threaded by construction: every field is touched only from the
/// thread driving `work_loop`, so nothing here needs a lock.
pub struct Runtime<H: HostTree> {
    pub(crate) host: H,
    pub(crate) fibers: FiberTree<H::Node>,
    pub(crate) config: SchedulerConfig,
    pub(crate) next_unit_of_work: Option<FiberId>,
    pub(crate) pending_root: Option<FiberId>,
    pub(crate) current_root: Option<FiberId>,
    pub(crate) deletions: Vec<FiberId>,
    pub(crate) requests: UpdateRequests,
}

impl<H: HostTree> Runtime<H> {
    /// Create a runtime with the default scheduler configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, SchedulerConfig::default())
    }

    /// Create a runtime with a custom configuration.
    pub fn with_config(host: H, config: SchedulerConfig) -> Self {
        Self {
            host,
            fibers: FiberTree::new(),
            config,
            next_unit_of_work: None,
            pending_root: None,
            current_root: None,
            deletions: Vec::new(),
            requests: UpdateRequests::new(),
        }
    }

    // =========================================================================
    // Render Requests
    // =========================================================================

    /// Request a render of `element` into `container`.
    ///
    /// Nothing happens to the host until the work loop has processed the whole
    /// tree and committed it. A render already in flight is discarded.
    pub fn render(&mut self, element: Element, container: H::Node) {
        debug!(root = element.node_type.label(), "render requested");
        let props = Rc::new(Props::new().with_child(element));
        self.start_render(container, props);
    }

    /// Start a new pass over the committed tree, as a state setter does.
    ///
    /// Does nothing (with a warning) if nothing has been committed yet.
    pub(crate) fn schedule_update(&mut self) {
        let Some(current) = self.current_root else {
            warn!("state update requested before the first commit, ignored");
            return;
        };
        let Some(root) = self.fibers.get(current) else {
            warn!("committed root is gone, update ignored");
            return;
        };
        let (container, props) = (root.host, root.props.clone());
        match container {
            Some(container) => {
                debug!("update render scheduled");
                self.start_render(container, props);
            }
            None => warn!("committed root has no container, update ignored"),
        }
    }

    fn start_render(&mut self, container: H::Node, props: Rc<Props>) {
        self.discard_pending();
        let root = self
            .fibers
            .allocate(Fiber::root(container, props, self.current_root));
        self.pending_root = Some(root);
        self.next_unit_of_work = Some(root);
    }

    /// Drop the partially built pending tree, if any.
    ///
    /// The host was never touched for it, apart from detached nodes created
    /// along the way.
    pub(super) fn discard_pending(&mut self) {
        for &old in &self.deletions {
            if let Some(fiber) = self.fibers.get_mut(old) {
                fiber.effect = Effect::None;
            }
        }
        self.deletions.clear();
        self.next_unit_of_work = None;

        if let Some(pending) = self.pending_root.take() {
            let freed = self.fibers.release_subtree(pending);
            debug!(freed, "discarded in-flight render");
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The host adapter.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host adapter, mutably (e.g., to create containers or clear logs).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the runtime and return the host adapter.
    pub fn into_host(self) -> H {
        self.host
    }

    /// The fiber arena.
    pub fn fibers(&self) -> &FiberTree<H::Node> {
        &self.fibers
    }

    /// Get a fiber.
    pub fn fiber(&self, id: FiberId) -> Option<&Fiber<H::Node>> {
        self.fibers.get(id)
    }

    /// Root of the committed tree.
    pub fn current_root(&self) -> Option<FiberId> {
        self.current_root
    }

    /// Root of the tree being built.
    pub fn pending_root(&self) -> Option<FiberId> {
        self.pending_root
    }

    /// Fiber the work loop will process next.
    pub fn next_unit_of_work(&self) -> Option<FiberId> {
        self.next_unit_of_work
    }

    /// Handle setters use to request renders.
    pub fn update_requests(&self) -> &UpdateRequests {
        &self.requests
    }

    /// Scheduler configuration.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Check if there is neither work in flight nor a pending request.
    pub fn is_idle(&self) -> bool {
        self.next_unit_of_work.is_none()
            && self.pending_root.is_none()
            && !self.requests.is_pending()
    }

    /// Host nodes owned by the committed tree's fibers, in pre-order.
    pub fn committed_host_nodes(&self) -> Vec<H::Node> {
        let Some(root) = self.current_root else {
            return Vec::new();
        };
        self.fibers
            .subtree(root)
            .into_iter()
            .skip(1)
            .filter_map(|id| self.fibers[id].host)
            .collect()
    }
}
