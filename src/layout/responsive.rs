// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{MOBILE_MAX_WIDTH, TABLET_MAX_WIDTH};
use crate::layout::types::{BreakpointRange, ComponentLayout, LayoutDefinition, LayoutKind};
use indexmap::IndexMap;

/// Built-in `mobile`, `tablet` and `desktop` ranges.
pub fn default_breakpoints() -> IndexMap<String, BreakpointRange> {
    IndexMap::from([
        (
            "mobile".to_string(),
            BreakpointRange::new(None, Some(MOBILE_MAX_WIDTH)),
        ),
        (
            "tablet".to_string(),
            BreakpointRange::new(Some(MOBILE_MAX_WIDTH + 1.0), Some(TABLET_MAX_WIDTH)),
        ),
        (
            "desktop".to_string(),
            BreakpointRange::new(Some(TABLET_MAX_WIDTH + 1.0), None),
        ),
    ])
}

/// Every breakpoint named by a responsive component, in encounter order.
///
/// Explicit bounds win. A breakpoint declared without bounds, or named only in
/// a visibility map, takes its range from `known`. Names with no range
/// anywhere are dropped.
pub fn collect_breakpoints(
    components: &[ComponentLayout],
    known: &IndexMap<String, BreakpointRange>,
) -> IndexMap<String, BreakpointRange> {
    let mut found = IndexMap::new();

    for component in components {
        let LayoutKind::Responsive(responsive) = &component.layout.kind else {
            continue;
        };

        for (name, breakpoint) in &responsive.breakpoints {
            if found.contains_key(name) {
                continue;
            }
            let declared = BreakpointRange::new(breakpoint.min_width, breakpoint.max_width);
            let range = if declared.is_unbounded() {
                known.get(name).copied()
            } else {
                Some(declared)
            };
            if let Some(range) = range {
                found.insert(name.clone(), range);
            }
        }

        for name in responsive.visibility.keys() {
            if found.contains_key(name) {
                continue;
            }
            if let Some(range) = known.get(name) {
                found.insert(name.clone(), *range);
            }
        }
    }

    found
}

/// The first collected breakpoint whose range contains `width`.
pub fn active_breakpoint(
    components: &[ComponentLayout],
    known: &IndexMap<String, BreakpointRange>,
    width: f64,
) -> Option<String> {
    collect_breakpoints(components, known)
        .into_iter()
        .find(|(_, range)| range.contains(width))
        .map(|(name, _)| name)
}

/// Substitute a responsive component's layout for the active breakpoint.
///
/// Returns the definition to lay out and whether the component is visible.
/// Non-responsive definitions pass through unchanged and are always visible.
pub fn resolve<'a>(
    definition: &'a LayoutDefinition,
    active: Option<&str>,
) -> (&'a LayoutDefinition, bool) {
    let LayoutKind::Responsive(responsive) = &definition.kind else {
        return (definition, true);
    };

    let breakpoint_layout = active
        .and_then(|name| responsive.breakpoints.get(name))
        .and_then(|breakpoint| breakpoint.layout.as_deref());
    let effective = breakpoint_layout
        .or(responsive.layout.as_deref())
        .unwrap_or(definition);

    let visible = active
        .and_then(|name| responsive.visibility.get(name))
        .copied()
        .unwrap_or(true);

    (effective, visible)
}
