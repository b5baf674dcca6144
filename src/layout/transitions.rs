// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::layout::types::{
    AnimationTransition, CalculatedLayout, PropertyChange, TransitionKind, TransitionOptions,
};
use indexmap::IndexMap;

/// Diff two layout snapshots into animations.
///
/// Components in both snapshots get a `move` carrying only the geometry
/// properties that differ (exact comparison). New components `appear` and
/// removed ones `disappear`, each with a synthetic opacity change. Order:
/// moves and appearances in `new` order, then disappearances in `old` order.
pub fn generate_layout_transitions(
    old: &IndexMap<String, CalculatedLayout>,
    new: &IndexMap<String, CalculatedLayout>,
    options: &TransitionOptions,
) -> Vec<AnimationTransition> {
    let transition = |component_id: &str, kind, properties| AnimationTransition {
        component_id: component_id.to_string(),
        kind,
        properties,
        duration: options.duration,
        easing: options.easing.clone(),
    };

    let mut transitions = Vec::new();

    for (id, to) in new {
        match old.get(id) {
            Some(from) => {
                let properties = changed_properties(from, to);
                if !properties.is_empty() {
                    transitions.push(transition(id, TransitionKind::Move, properties));
                }
            }
            None => transitions.push(transition(id, TransitionKind::Appear, opacity(0.0, 1.0))),
        }
    }

    for id in old.keys() {
        if !new.contains_key(id) {
            transitions.push(transition(id, TransitionKind::Disappear, opacity(1.0, 0.0)));
        }
    }

    transitions
}

fn changed_properties(
    from: &CalculatedLayout,
    to: &CalculatedLayout,
) -> IndexMap<String, PropertyChange> {
    [
        ("x", from.x, to.x),
        ("y", from.y, to.y),
        ("width", from.width, to.width),
        ("height", from.height, to.height),
    ]
    .into_iter()
    .filter(|(_, from, to)| from != to)
    .map(|(name, from, to)| (name.to_string(), PropertyChange { from, to }))
    .collect()
}

fn opacity(from: f64, to: f64) -> IndexMap<String, PropertyChange> {
    IndexMap::from([("opacity".to_string(), PropertyChange { from, to })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options() -> TransitionOptions {
        TransitionOptions {
            duration: Duration::from_millis(250),
            easing: "linear".to_string(),
        }
    }

    fn snapshot(entries: &[(&str, CalculatedLayout)]) -> IndexMap<String, CalculatedLayout> {
        entries
            .iter()
            .map(|(id, layout)| (id.to_string(), *layout))
            .collect()
    }

    #[test]
    fn test_identical_snapshots_produce_nothing() {
        let layout = snapshot(&[
            ("a", CalculatedLayout::new(0.0, 0.0, 100.0, 50.0)),
            ("b", CalculatedLayout::new(0.1, 0.2, 0.3, 0.4)),
        ]);

        assert!(generate_layout_transitions(&layout, &layout.clone(), &options()).is_empty());
    }

    #[test]
    fn test_move_includes_only_changed_properties() {
        let old = snapshot(&[("a", CalculatedLayout::new(0.0, 0.0, 100.0, 50.0))]);
        let new = snapshot(&[("a", CalculatedLayout::new(20.0, 0.0, 100.0, 80.0))]);

        let transitions = generate_layout_transitions(&old, &new, &options());

        assert_eq!(transitions.len(), 1);
        let mv = &transitions[0];
        assert_eq!(mv.kind, TransitionKind::Move);
        assert_eq!(mv.properties.keys().collect::<Vec<_>>(), vec!["x", "height"]);
        assert_eq!(mv.properties["x"], PropertyChange { from: 0.0, to: 20.0 });
        assert_eq!(mv.duration, Duration::from_millis(250));
        assert_eq!(mv.easing, "linear");
    }

    #[test]
    fn test_appear_and_disappear() {
        let old = snapshot(&[("gone", CalculatedLayout::default())]);
        let new = snapshot(&[("fresh", CalculatedLayout::default())]);

        let transitions = generate_layout_transitions(&old, &new, &options());

        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].component_id, "fresh");
        assert_eq!(transitions[0].kind, TransitionKind::Appear);
        assert_eq!(
            transitions[0].properties["opacity"],
            PropertyChange { from: 0.0, to: 1.0 }
        );
        assert_eq!(transitions[1].component_id, "gone");
        assert_eq!(transitions[1].kind, TransitionKind::Disappear);
        assert_eq!(
            transitions[1].properties["opacity"],
            PropertyChange { from: 1.0, to: 0.0 }
        );
    }
}
