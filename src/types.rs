//! Core types for spark-fiber.
//!
//! These types define the foundation that everything builds on.
//! They flow from element construction through reconciliation into the
//! host adapter, and define what the commit phase understands.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::primitives::{Element, Props};
use crate::state::Hooks;

// =============================================================================
// Reserved Names
// =============================================================================

/// Prop keys starting with this prefix are event handlers (`onClick` → `click`).
pub const EVENT_PREFIX: &str = "on";

/// Prop key holding the nested style map.
pub const STYLE_KEY: &str = "style";

/// Prop key holding the text of a text element.
pub const TEXT_VALUE_KEY: &str = "nodeValue";

/// Reserved type marker for text elements.
pub const TEXT_ELEMENT: &str = "TEXT_ELEMENT";

// =============================================================================
// Attributes
// =============================================================================

/// Ordered property map. Iteration order is insertion order.
pub type Attributes = IndexMap<String, Value>;

// =============================================================================
// Events
// =============================================================================

/// An event delivered by the host to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Host event name (e.g., "click").
    pub name: String,
    /// Optional payload supplied by the host.
    pub value: Value,
}

impl Event {
    /// Create an event with no payload.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Value::Null,
        }
    }

    /// Create an event carrying a payload.
    pub fn with_value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Event handler stored in props.
///
/// Handlers compare by identity, not by behavior: two handlers are equal only
/// if they are clones of the same `Rc`. A component that builds a new closure
/// on every render therefore replaces its listener on every commit.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    /// Wrap a closure as an event handler.
    pub fn new(handler: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

// =============================================================================
// Value
// =============================================================================

/// A property value.
///
/// Plain attribute values, event handlers, and the nested style map all share
/// this type so that a single ordered map can describe an element's props.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Handler(EventHandler),
    Map(Rc<Attributes>),
}

impl Value {
    /// Get the string content, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the handler, if this is an event handler.
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Value::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Get the nested map, if this is a map.
    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Check for `Value::Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Handler(a), Value::Handler(b)) => a.ptr_eq(b),
            // Maps compare by reference, like any object-valued prop
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Handler(_) => f.write_str("[handler]"),
            Value::Map(_) => f.write_str("[map]"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

impl From<EventHandler> for Value {
    fn from(value: EventHandler) -> Self {
        Value::Handler(value)
    }
}

impl From<Attributes> for Value {
    fn from(value: Attributes) -> Self {
        Value::Map(Rc::new(value))
    }
}

// =============================================================================
// Node Type
// =============================================================================

/// Render function of a component.
///
/// Receives the element's props and the hook cursor for this invocation,
/// and returns exactly one child element.
pub type RenderFn = dyn Fn(&Props, &mut Hooks<'_>) -> Element;

/// A named component function.
///
/// Identity is the `Rc` pointer: keep one `ComponentFn` and clone it into every
/// element that should reconcile as the same component.
#[derive(Clone)]
pub struct ComponentFn {
    name: &'static str,
    render: Rc<RenderFn>,
}

impl ComponentFn {
    /// Create a component from a render function.
    pub fn new(
        name: &'static str,
        render: impl Fn(&Props, &mut Hooks<'_>) -> Element + 'static,
    ) -> Self {
        Self {
            name,
            render: Rc::new(render),
        }
    }

    /// Component name (diagnostics only).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Invoke the render function.
    pub fn render(&self, props: &Props, hooks: &mut Hooks<'_>) -> Element {
        (self.render)(props, hooks)
    }
}

impl PartialEq for ComponentFn {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.render, &other.render)
    }
}

impl fmt::Debug for ComponentFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentFn({})", self.name)
    }
}

/// What a fiber renders as.
///
/// Type equality at a child position is the only identity signal the
/// reconciler uses.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Host element with a tag name (e.g., "div").
    Host(Rc<str>),
    /// Component function producing a single child element.
    Component(ComponentFn),
    /// Text leaf; its content is the `nodeValue` prop.
    Text,
    /// Top-level fiber owning the caller-supplied container node.
    Root,
}

impl NodeType {
    /// Host element type for a tag.
    pub fn host(tag: &str) -> Self {
        NodeType::Host(tag.into())
    }

    /// Check if this is a component.
    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(self, NodeType::Component(_))
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            NodeType::Host(tag) => tag,
            NodeType::Component(c) => c.name(),
            NodeType::Text => TEXT_ELEMENT,
            NodeType::Root => "#root",
        }
    }
}

impl From<ComponentFn> for NodeType {
    fn from(value: ComponentFn) -> Self {
        NodeType::Component(value)
    }
}

impl From<&str> for NodeType {
    fn from(tag: &str) -> Self {
        NodeType::host(tag)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_identity() {
        let a = EventHandler::new(|_| {});
        let b = a.clone();
        let c = EventHandler::new(|_| {});

        assert_eq!(Value::from(a.clone()), Value::from(b));
        assert_ne!(Value::from(a), Value::from(c));
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::from(1), Value::Int(1));
        assert_eq!(Value::from("x"), Value::from(String::from("x")));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn test_node_type_equality() {
        let render = |_: &Props, _: &mut Hooks<'_>| Element::text("x");
        let app = ComponentFn::new("App", render);
        let other = ComponentFn::new("App", render);

        assert_eq!(NodeType::from(app.clone()), NodeType::from(app));
        assert_ne!(NodeType::from(other), NodeType::host("App"));
        assert_eq!(NodeType::host("div"), NodeType::from("div"));
        assert_ne!(NodeType::host("div"), NodeType::host("span"));
        assert_ne!(NodeType::Text, NodeType::Root);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from("a").to_string(), "a");
        assert_eq!(Value::Null.to_string(), "");
    }
}
