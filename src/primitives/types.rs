//! Primitive types - Props and children.
//!
//! These types define what an element carries: an ordered attribute map and
//! an ordered list of child elements. `children` is always present, possibly
//! empty.

use crate::types::{Attributes, STYLE_KEY, TEXT_VALUE_KEY, Value};

use super::element::Element;

// =============================================================================
// Props
// =============================================================================

/// Properties of an element.
///
/// Attribute keys fall into three classes when diffed against the host:
/// - event handlers (`on` prefix)
/// - the nested `style` map
/// - plain attributes (everything else)
///
/// `children` is kept out of the attribute map so it can never be mistaken
/// for a plain attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    pub attributes: Attributes,
    pub children: Vec<Element>,
}

impl Props {
    /// Create empty props (no attributes, no children).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create props from an attribute map with no children.
    pub fn from_attributes(attributes: Attributes) -> Self {
        Self {
            attributes,
            children: Vec::new(),
        }
    }

    /// Builder: set an attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into().into_element());
        self
    }

    /// Get an attribute value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Check if an attribute key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// The nested style map, if any.
    pub fn style(&self) -> Option<&Attributes> {
        self.get(STYLE_KEY).and_then(Value::as_map)
    }

    /// The text of a text element.
    pub fn text(&self) -> Option<&Value> {
        self.get(TEXT_VALUE_KEY)
    }
}

// =============================================================================
// Child
// =============================================================================

/// A child passed to `create_element`.
///
/// Anything that is not already an element is wrapped in a text element.
#[derive(Debug, Clone)]
pub enum Child {
    Element(Element),
    Text(Value),
}

impl Child {
    /// Resolve to an element, wrapping raw values as text.
    pub fn into_element(self) -> Element {
        match self {
            Child::Element(element) => element,
            Child::Text(value) => super::element::create_text_element(value),
        }
    }
}

impl From<Element> for Child {
    fn from(value: Element) -> Self {
        Child::Element(value)
    }
}

impl From<&str> for Child {
    fn from(value: &str) -> Self {
        Child::Text(value.into())
    }
}

impl From<String> for Child {
    fn from(value: String) -> Self {
        Child::Text(value.into())
    }
}

impl From<i32> for Child {
    fn from(value: i32) -> Self {
        Child::Text(value.into())
    }
}

impl From<i64> for Child {
    fn from(value: i64) -> Self {
        Child::Text(value.into())
    }
}

impl From<f64> for Child {
    fn from(value: f64) -> Self {
        Child::Text(value.into())
    }
}

impl From<bool> for Child {
    fn from(value: bool) -> Self {
        Child::Text(value.into())
    }
}

impl From<Value> for Child {
    fn from(value: Value) -> Self {
        Child::Text(value)
    }
}
