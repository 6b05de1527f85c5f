//! Element Model - Declarative tree building blocks.
//!
//! This module provides the construction surface exposed to tree authors:
//! - [`create_element`] - Host or component element with props and children
//! - [`create_text_element`] - Text leaf
//! - [`props!`](crate::props) - Ordered attribute map literal
//!
//! # Architecture
//!
//! Elements are immutable. A render pass never modifies them; the reconciler
//! copies the `Rc<Props>` into fibers and compares node types only.
//!
//! ```ignore
//! let counter = ComponentFn::new("Counter", |props, hooks| {
//!     let (count, set_count) = hooks.use_state(0);
//!     let on_click = EventHandler::new(move |_| set_count.update(|n| n + 1));
//!     create_element("button", props! { "onClick" => on_click }, [count])
//! });
//!
//! let root = create_element(counter, props! {}, Vec::<Child>::new());
//! ```

mod element;
mod types;

pub use element::{create_element, create_text_element, Element};
pub use types::{Child, Props};

/// Build an ordered attribute map.
///
/// ```ignore
/// let attrs = props! { "className" => "box", "tabIndex" => 0 };
/// ```
#[macro_export]
macro_rules! props {
    () => {
        $crate::types::Attributes::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut attributes = $crate::types::Attributes::new();
        $(
            attributes.insert(::std::string::String::from($key), $crate::types::Value::from($value));
        )+
        attributes
    }};
}
