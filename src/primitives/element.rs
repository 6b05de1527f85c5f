//! Element - Immutable description of what should exist.
//!
//! An element is a node type plus props. Elements are cheap to clone: props
//! sit behind an `Rc` and are shared with every fiber rendered from them.
//!
//! # Example
//!
//! ```ignore
//! use spark_fiber::{create_element, props};
//!
//! let el = create_element(
//!     "div",
//!     props! { "className" => "box", "style" => props! { "color" => "red" } },
//!     ["Hello ", "world"],
//! );
//! assert_eq!(el.props.children.len(), 2);
//! ```

use std::rc::Rc;

use crate::types::{Attributes, NodeType, TEXT_VALUE_KEY, Value};

use super::types::{Child, Props};

/// Immutable element description.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub node_type: NodeType,
    pub props: Rc<Props>,
}

impl Element {
    /// Create an element from already-built props.
    pub fn new(node_type: impl Into<NodeType>, props: Props) -> Self {
        Self {
            node_type: node_type.into(),
            props: Rc::new(props),
        }
    }

    /// Shorthand for `create_text_element`.
    pub fn text(value: impl Into<Value>) -> Self {
        create_text_element(value)
    }

    /// Children of this element.
    pub fn children(&self) -> &[Element] {
        &self.props.children
    }
}

/// Construct an element.
///
/// Each child that is not already an element is wrapped with
/// `create_text_element`. No validation beyond that.
pub fn create_element<C>(
    node_type: impl Into<NodeType>,
    attributes: Attributes,
    children: impl IntoIterator<Item = C>,
) -> Element
where
    C: Into<Child>,
{
    let children = children
        .into_iter()
        .map(|child| Into::<Child>::into(child).into_element())
        .collect();

    Element::new(node_type, Props {
        attributes,
        children,
    })
}

/// Construct a text element.
///
/// Its type is the reserved text marker and its props carry the literal value
/// under `nodeValue`, with no children.
pub fn create_text_element(value: impl Into<Value>) -> Element {
    Element::new(NodeType::Text, Props::new().with(TEXT_VALUE_KEY, value))
}

// =============================================================================
// Tests
// =============================================================================
