//! Hooks - Persistent per-fiber state indexed by call order.
//!
//! A component fiber carries an ordered list of hook cells. Each render of
//! the component builds a fresh list: the Nth `use_state` call reads the Nth
//! cell of the previous generation (the fiber's alternate), applies the
//! updates queued there, and appends a new cell.
//!
//! # Call-order contract
//!
//! Hook identity is strictly positional. The Nth `use_state` call in one
//! render must be the Nth call in every render of that component: no hooks
//! inside conditionals or loops with varying trip counts. Violations are not
//! detected, except that a cell whose stored type differs from the requested
//! type is logged and restarted from `initial`.
//!
//! # Example
//!
//! ```ignore
//! let counter = ComponentFn::new("Counter", |_props, hooks| {
//!     let (count, set_count) = hooks.use_state(0);
//!     let (step, _) = hooks.use_state(5);
//!     let on_click = EventHandler::new(move |_| set_count.update(move |n| n + step));
//!     create_element("button", props! { "onClick" => on_click }, [count])
//! });
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use tracing::{debug, warn};

// =============================================================================
// Update Requests
// =============================================================================

/// Shared flag raised by setters to ask the runtime for a new render pass.
///
/// The runtime owns one of these and hands clones to every hook cursor.
#[derive(Clone, Default)]
pub struct UpdateRequests(Rc<Cell<usize>>);

impl UpdateRequests {
    /// Create a flag with no pending requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for a render pass.
    pub fn request(&self) {
        self.0.set(self.0.get() + 1);
    }

    /// Check for pending requests without consuming them.
    pub fn is_pending(&self) -> bool {
        self.0.get() > 0
    }

    /// Consume all pending requests. Returns true if there were any.
    ///
    /// Several setter calls between two slices collapse into one render.
    pub fn take(&self) -> bool {
        self.0.replace(0) > 0
    }
}

impl fmt::Debug for UpdateRequests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UpdateRequests").field(&self.0.get()).finish()
    }
}

// =============================================================================
// State Updates
// =============================================================================

/// One queued state change.
pub enum StateUpdate<T> {
    /// Replace the state with a value.
    Replace(T),
    /// Compute the next state from the current one.
    Apply(Rc<dyn Fn(&T) -> T>),
}

impl<T: Clone> StateUpdate<T> {
    /// Apply this update to `current`.
    pub fn apply(&self, current: &T) -> T {
        match self {
            StateUpdate::Replace(value) => value.clone(),
            StateUpdate::Apply(f) => f(current),
        }
    }
}

// =============================================================================
// Hook Cell
// =============================================================================

type Queue = Rc<RefCell<Vec<Rc<dyn Any>>>>;

/// A persistent state slot on a component fiber.
///
/// `queue` collects updates from setter calls made after this cell's render;
/// the next render of the component reads and applies them. The queue is
/// never drained, so a render that is discarded and restarted from the same
/// committed tree sees the same updates again.
#[derive(Clone)]
pub struct HookCell {
    state: Rc<dyn Any>,
    queue: Queue,
}

impl HookCell {
    fn new(state: Rc<dyn Any>) -> Self {
        Self {
            state,
            queue: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Stored state, if it has type `T`.
    pub fn state<T: 'static>(&self) -> Option<&T> {
        self.state.downcast_ref::<T>()
    }

    /// Number of updates queued on this cell.
    pub fn pending_updates(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl fmt::Debug for HookCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCell")
            .field("pending_updates", &self.pending_updates())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Setter
// =============================================================================

/// Handle returned by `use_state` for changing that state.
///
/// Every call enqueues an update on the hook cell it came from and asks the
/// runtime for a new render pass rooted at the committed tree. Nothing is
/// applied synchronously. A setter fired before anything is committed only
/// queues: the runtime logs a warning and the next render picks it up.
pub struct Setter<T> {
    queue: Queue,
    requests: UpdateRequests,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            requests: self.requests.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + 'static> Setter<T> {
    /// Replace the state.
    pub fn set(&self, value: T) {
        self.enqueue(StateUpdate::Replace(value));
    }

    /// Derive the next state from the current one.
    pub fn update(&self, f: impl Fn(&T) -> T + 'static) {
        self.enqueue(StateUpdate::Apply(Rc::new(f)));
    }

    /// Queue an update and request a render.
    pub fn enqueue(&self, update: StateUpdate<T>) {
        self.queue.borrow_mut().push(Rc::new(update));
        self.requests.request();
        debug!(queued = self.queue.borrow().len(), "state update queued");
    }
}

impl<T> fmt::Debug for Setter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setter")
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

// =============================================================================
// Hooks Cursor
// =============================================================================

/// Hook cursor for one invocation of one component.
///
/// Created fresh (index 0, no cells) before each component call, so the
/// cursor can never leak from one component to the next.
pub struct Hooks<'a> {
    previous: &'a [HookCell],
    cells: Vec<HookCell>,
    index: usize,
    requests: &'a UpdateRequests,
    component: &'a str,
}

impl<'a> Hooks<'a> {
    /// Create a cursor reading from the alternate's cells.
    pub fn new(previous: &'a [HookCell], requests: &'a UpdateRequests, component: &'a str) -> Self {
        Self {
            previous,
            cells: Vec::with_capacity(previous.len()),
            index: 0,
            requests,
            component,
        }
    }

    /// Persistent state.
    ///
    /// Returns the current value and a setter. On the first render the value
    /// is `initial`; afterwards it is the previous render's value with every
    /// queued update applied in FIFO order.
    pub fn use_state<T: Clone + 'static>(&mut self, initial: T) -> (T, Setter<T>) {
        let old = self.previous.get(self.index);

        let mut state = match old {
            Some(old) => match old.state::<T>() {
                Some(state) => state.clone(),
                None => {
                    warn!(
                        component = self.component,
                        hook = self.index,
                        "hook state type changed between renders (hook order violated?)"
                    );
                    initial
                }
            },
            None => initial,
        };

        if let Some(old) = old {
            for update in old.queue.borrow().iter() {
                match update.downcast_ref::<StateUpdate<T>>() {
                    Some(update) => state = update.apply(&state),
                    None => warn!(
                        component = self.component,
                        hook = self.index,
                        "queued update has the wrong state type, skipped"
                    ),
                }
            }
        }

        let cell = HookCell::new(Rc::new(state.clone()));
        let setter = Setter {
            queue: cell.queue.clone(),
            requests: self.requests.clone(),
            _marker: PhantomData,
        };

        self.cells.push(cell);
        self.index += 1;

        (state, setter)
    }

    /// Number of hooks called so far in this render.
    pub fn len(&self) -> usize {
        self.index
    }

    /// Check if no hook has been called yet.
    pub fn is_empty(&self) -> bool {
        self.index == 0
    }

    /// Finish the render and hand back the new cells.
    pub fn finish(self) -> Vec<HookCell> {
        self.cells
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn render<R>(previous: &[HookCell], requests: &UpdateRequests, f: impl FnOnce(&mut Hooks<'_>) -> R) -> (R, Vec<HookCell>) {
        let mut hooks = Hooks::new(previous, requests, "Test");
        let result = f(&mut hooks);
        (result, hooks.finish())
    }

    #[test]
    fn test_initial_state() {
        let requests = UpdateRequests::new();
        let ((value, _), cells) = render(&[], &requests, |h| h.use_state(7));

        assert_eq!(value, 7);
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].state::<i32>(), Some(&7));
        assert_eq!(cells[0].pending_updates(), 0);
    }

    #[test]
    fn test_updates_apply_in_order() {
        let requests = UpdateRequests::new();
        let ((_, set), first) = render(&[], &requests, |h| h.use_state(1));

        set.update(|n| n + 1);
        set.set(10);
        set.update(|n| n * 3);
        assert!(requests.take());

        let ((value, _), second) = render(&first, &requests, |h| h.use_state(1));
        assert_eq!(value, 30);
        assert_eq!(second[0].pending_updates(), 0);
    }

    #[test]
    fn test_queue_survives_restart() {
        let requests = UpdateRequests::new();
        let ((_, set), first) = render(&[], &requests, |h| h.use_state(0));
        set.update(|n| n + 1);

        // Two renders from the same committed cells see the same result.
        let ((a, _), _) = render(&first, &requests, |h| h.use_state(0));
        let ((b, _), _) = render(&first, &requests, |h| h.use_state(0));
        assert_eq!(a, 1);
        assert_eq!(b, 1);
    }

    #[test]
    fn test_positional_independence() {
        let requests = UpdateRequests::new();
        let ((setters, _), first) = render(&[], &requests, |h| {
            let (a, set_a) = h.use_state(1);
            let (b, set_b) = h.use_state(2);
            ((set_a, set_b), (a, b))
        });

        setters.1.set(20);

        let (values, _) = render(&first, &requests, |h| {
            (h.use_state(1).0, h.use_state(2).0)
        });
        assert_eq!(values, (1, 20));
    }

    #[test]
    fn test_type_mismatch_falls_back_to_initial() {
        let requests = UpdateRequests::new();
        let (_, first) = render(&[], &requests, |h| h.use_state(5_i32));

        let ((value, _), _) = render(&first, &requests, |h| h.use_state(String::from("x")));
        assert_eq!(value, "x");
    }

    #[test]
    fn test_requests_collapse() {
        let requests = UpdateRequests::new();
        let ((_, set), _) = render(&[], &requests, |h| h.use_state(0));

        assert!(!requests.is_pending());
        set.set(1);
        set.set(2);
        assert!(requests.is_pending());
        assert!(requests.take());
        assert!(!requests.take());
    }
}
