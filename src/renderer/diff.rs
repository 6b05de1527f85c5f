//! Prop diff - Apply only what changed between two prop maps.
//!
//! Keys are partitioned into three disjoint classes:
//!
//! | Class | Keys | Rule |
//! |---|---|---|
//! | Event | `on*` | removed if gone or changed, added if new or changed |
//! | Structural | `style` (children live outside the map) | every new style key is set |
//! | Attribute | everything else | cleared if gone, set if new or changed |
//!
//! # Algorithm
//!
//! 1. Remove old listeners whose key is gone or whose handler changed
//! 2. Add new listeners whose key is new or whose handler changed
//! 3. Clear attributes present only in the old props
//! 4. Set attributes that are new or changed
//! 5. Set every key of the new style map
//!
//! Handlers are replaced wholesale, never merged. Style keys are set
//! unconditionally, and style keys dropped from the new map are left on the
//! node: stale style is a known gap.

use crate::error::HostError;
use crate::primitives::Props;
use crate::types::{EVENT_PREFIX, STYLE_KEY};

use super::HostTree;

/// Classification of a prop key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropClass {
    Event,
    Structural,
    Attribute,
}

/// Classify a prop key.
#[inline]
pub fn classify_prop(key: &str) -> PropClass {
    if key.starts_with(EVENT_PREFIX) {
        PropClass::Event
    } else if key == STYLE_KEY || key == "children" {
        PropClass::Structural
    } else {
        PropClass::Attribute
    }
}

/// Host event name for an event key: `onClick` → `click`.
pub fn event_name(key: &str) -> String {
    key[EVENT_PREFIX.len()..].to_lowercase()
}

/// Counts of host mutations applied by one `update_dom` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffStats {
    pub listeners_removed: usize,
    pub listeners_added: usize,
    pub attributes_cleared: usize,
    pub attributes_set: usize,
    pub styles_set: usize,
}

impl DiffStats {
    /// Attribute and listener mutations (style excluded).
    pub fn attribute_and_listener_mutations(&self) -> usize {
        self.listeners_removed + self.listeners_added + self.attributes_cleared + self.attributes_set
    }

    /// All mutations.
    pub fn total(&self) -> usize {
        self.attribute_and_listener_mutations() + self.styles_set
    }

    /// Accumulate another diff into this one.
    pub fn merge(&mut self, other: DiffStats) {
        self.listeners_removed += other.listeners_removed;
        self.listeners_added += other.listeners_added;
        self.attributes_cleared += other.attributes_cleared;
        self.attributes_set += other.attributes_set;
        self.styles_set += other.styles_set;
    }
}

/// Apply the difference between `old` and `new` props to `node`.
///
/// Called with empty `old` props right after a node is created.
pub fn update_dom<H: HostTree>(
    host: &mut H,
    node: H::Node,
    old: &Props,
    new: &Props,
) -> Result<DiffStats, HostError> {
    let mut stats = DiffStats::default();
    let changed = |key: &str| old.get(key) != new.get(key);

    // Events: remove stale handlers
    for (key, value) in &old.attributes {
        if classify_prop(key) != PropClass::Event {
            continue;
        }
        if !new.contains(key) || changed(key) {
            if let Some(handler) = value.as_handler() {
                host.remove_event_listener(node, &event_name(key), handler)?;
                stats.listeners_removed += 1;
            }
        }
    }

    // Events: add new or changed handlers
    for (key, value) in &new.attributes {
        if classify_prop(key) != PropClass::Event || !changed(key) {
            continue;
        }
        if let Some(handler) = value.as_handler() {
            host.add_event_listener(node, &event_name(key), handler)?;
            stats.listeners_added += 1;
        }
    }

    // Attributes: clear the ones that are gone
    for key in old.attributes.keys() {
        if classify_prop(key) == PropClass::Attribute && !new.contains(key) {
            host.clear_attribute(node, key)?;
            stats.attributes_cleared += 1;
        }
    }

    // Attributes: set new or changed
    for (key, value) in &new.attributes {
        if classify_prop(key) == PropClass::Attribute && changed(key) {
            host.set_attribute(node, key, value)?;
            stats.attributes_set += 1;
        }
    }

    // Style: every key of the new map, unconditionally
    if let Some(style) = new.style() {
        for (key, value) in style {
            host.set_style(node, key, value)?;
            stats.styles_set += 1;
        }
    }

    Ok(stats)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;
    use crate::renderer::{MemoryHost, Mutation, MutationKinds};
    use crate::types::{EventHandler, Value};

    fn setup() -> (MemoryHost, crate::renderer::NodeId) {
        let mut host = MemoryHost::new();
        let node = host.create_node("div").unwrap();
        host.clear_mutations();
        (host, node)
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify_prop("onClick"), PropClass::Event);
        assert_eq!(classify_prop("style"), PropClass::Structural);
        assert_eq!(classify_prop("children"), PropClass::Structural);
        assert_eq!(classify_prop("className"), PropClass::Attribute);
        assert_eq!(event_name("onClick"), "click");
        assert_eq!(event_name("onMouseDown"), "mousedown");
    }

    #[test]
    fn test_minimal_attribute_diff() {
        let (mut host, node) = setup();
        let old = Props::from_attributes(props! { "a" => 1, "b" => 2 });
        let new = Props::from_attributes(props! { "a" => 1, "c" => 3 });

        let stats = update_dom(&mut host, node, &old, &new).unwrap();

        assert_eq!(
            host.mutations(),
            &[
                Mutation::ClearAttribute { node, key: "b".into() },
                Mutation::SetAttribute { node, key: "c".into(), value: Value::Int(3) },
            ]
        );
        assert_eq!(stats.attributes_cleared, 1);
        assert_eq!(stats.attributes_set, 1);
    }

    #[test]
    fn test_identical_props_are_noop() {
        let (mut host, node) = setup();
        let click = EventHandler::new(|_| {});
        let props = Props::from_attributes(props! { "id" => "x", "onClick" => click });

        let stats = update_dom(&mut host, node, &props, &props.clone()).unwrap();

        assert_eq!(stats.total(), 0);
        assert!(host.mutations().is_empty());
    }

    #[test]
    fn test_changed_handler_is_replaced() {
        let (mut host, node) = setup();
        let first = EventHandler::new(|_| {});
        let second = EventHandler::new(|_| {});
        let old = Props::from_attributes(props! { "onClick" => first });
        let new = Props::from_attributes(props! { "onClick" => second });

        let stats = update_dom(&mut host, node, &old, &new).unwrap();

        assert_eq!(stats.listeners_removed, 1);
        assert_eq!(stats.listeners_added, 1);
        assert_eq!(host.listener_count(node, "click"), 1);
        assert_eq!(host.count(MutationKinds::LISTENER), 2);
    }

    #[test]
    fn test_removed_handler() {
        let (mut host, node) = setup();
        let click = EventHandler::new(|_| {});
        let empty = Props::new();
        let with = Props::from_attributes(props! { "onClick" => click });

        update_dom(&mut host, node, &empty, &with).unwrap();
        assert_eq!(host.listener_count(node, "click"), 1);

        let stats = update_dom(&mut host, node, &with, &empty).unwrap();
        assert_eq!(stats.listeners_removed, 1);
        assert_eq!(host.listener_count(node, "click"), 0);
    }

    #[test]
    fn test_style_is_set_unconditionally_and_never_cleared() {
        let (mut host, node) = setup();
        let old = Props::from_attributes(props! {
            "style" => props! { "color" => "red", "margin" => "1px" },
        });
        let new = Props::from_attributes(props! {
            "style" => props! { "color" => "red" },
        });

        update_dom(&mut host, node, &Props::new(), &old).unwrap();
        host.clear_mutations();

        let stats = update_dom(&mut host, node, &old, &new).unwrap();

        assert_eq!(stats.styles_set, 1);
        assert_eq!(stats.attribute_and_listener_mutations(), 0);
        // Stale key stays on the node.
        assert_eq!(host.style(node, "margin"), Some(&Value::from("1px")));
    }
}
