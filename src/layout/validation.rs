// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural checks over a component list, independent of the hierarchy pass.
//!
//! Three checks run, all against the raw definitions:
//!
//! 1. **Overlap**: absolute components, positioned against the container,
//!    must not intersect. Touching edges do not count.
//! 2. **Bounds**: absolute components must fit inside the container.
//! 3. **Cycles**: `relativeTo` chains must not loop. Found with a DFS that
//!    tracks the current path, so the error names the whole loop.
//! 4. **Grid size**: templates, including those under responsive
//!    breakpoints, must not expand past [`MAX_TRACKS`] tracks.

use crate::errors::LayoutIssue;
use crate::layout::grid::{requested_tracks, MAX_TRACKS};
use crate::layout::types::{CalculatedLayout, ComponentLayout, Container, GridLayout, LayoutKind};
use std::collections::{HashMap, HashSet};

pub fn validate_components(components: &[ComponentLayout], container: Container) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();
    issues.extend(find_duplicate_ids(components));
    issues.extend(find_overlaps_and_overflow(components, container));
    issues.extend(find_relative_cycles(components));
    issues.extend(find_oversized_grids(components));
    issues
}

fn find_oversized_grids(components: &[ComponentLayout]) -> Vec<LayoutIssue> {
    let mut issues = Vec::new();

    for component in components {
        for grid in grid_layouts(&component.layout.kind) {
            for (axis, template) in [("columns", &grid.template_columns), ("rows", &grid.template_rows)] {
                let requested = requested_tracks(template);
                if requested > MAX_TRACKS {
                    issues.push(LayoutIssue::TooManyTracks {
                        component_id: component.id.clone(),
                        axis,
                        requested,
                        limit: MAX_TRACKS,
                    });
                }
            }
        }
    }

    issues
}

/// The grid definitions a component can be laid out with.
fn grid_layouts(kind: &LayoutKind) -> Vec<&GridLayout> {
    match kind {
        LayoutKind::Grid(grid) => vec![grid],
        LayoutKind::Responsive(responsive) => responsive
            .layout
            .iter()
            .chain(responsive.breakpoints.values().filter_map(|b| b.layout.as_ref()))
            .filter_map(|definition| match &definition.kind {
                LayoutKind::Grid(grid) => Some(grid),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn find_duplicate_ids(components: &[ComponentLayout]) -> Vec<LayoutIssue> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut issues = Vec::new();

    for component in components {
        if !seen.insert(component.id.as_str()) && reported.insert(component.id.as_str()) {
            issues.push(LayoutIssue::DuplicateComponentId {
                component_id: component.id.clone(),
            });
        }
    }

    issues
}

fn find_overlaps_and_overflow(
    components: &[ComponentLayout],
    container: Container,
) -> Vec<LayoutIssue> {
    let frame = CalculatedLayout::from(container);
    let boxes: Vec<(&str, CalculatedLayout)> = components
        .iter()
        .filter_map(|component| match &component.layout.kind {
            LayoutKind::Absolute(absolute) => {
                Some((component.id.as_str(), absolute.resolve(frame)))
            }
            _ => None,
        })
        .collect();

    let mut issues = Vec::new();

    for (i, (first, a)) in boxes.iter().enumerate() {
        for (second, b) in &boxes[i + 1..] {
            if a.intersects(b) {
                issues.push(LayoutIssue::Overlap {
                    first: first.to_string(),
                    second: second.to_string(),
                });
            }
        }
    }

    for (id, rect) in &boxes {
        if rect.x < 0.0
            || rect.y < 0.0
            || rect.x + rect.width > container.width
            || rect.y + rect.height > container.height
        {
            issues.push(LayoutIssue::OutOfBounds {
                component_id: id.to_string(),
            });
        }
    }

    issues
}

fn find_relative_cycles(components: &[ComponentLayout]) -> Vec<LayoutIssue> {
    let ids: HashSet<&str> = components.iter().map(|c| c.id.as_str()).collect();
    let mut graph: HashMap<&str, &str> = HashMap::new();
    let mut issues = Vec::new();

    for component in components {
        let LayoutKind::Relative(relative) = &component.layout.kind else {
            continue;
        };
        let Some(target) = relative.relative_to.as_deref() else {
            continue;
        };
        if ids.contains(target) {
            graph.insert(component.id.as_str(), target);
        } else {
            issues.push(LayoutIssue::UnknownRelativeTarget {
                component_id: component.id.clone(),
                target: target.to_string(),
            });
        }
    }

    let mut visited = HashSet::new();
    for component in components {
        if visited.contains(component.id.as_str()) {
            continue;
        }
        let mut visiting = HashSet::new();
        let mut path = Vec::new();
        if let Some(cycle) = dfs_cycle_detection(
            component.id.as_str(),
            &graph,
            &mut visited,
            &mut visiting,
            &mut path,
        ) {
            issues.push(LayoutIssue::CircularDependency { cycle });
        }
    }

    issues
}

/// Follow `relativeTo` edges from `node`, returning the closed loop if one is found.
///
/// `visiting` holds the ids on the current path; reaching one of them again is
/// a cycle. Fully explored ids go to `visited` and are never re-entered, so
/// each loop is reported once.
fn dfs_cycle_detection<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, &'a str>,
    visited: &mut HashSet<&'a str>,
    visiting: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    visited.insert(node);
    visiting.insert(node);
    path.push(node);

    if let Some(&next) = graph.get(node) {
        if visiting.contains(next) {
            let start = path.iter().position(|id| *id == next).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|id| id.to_string()).collect();
            cycle.push(next.to_string());
            return Some(cycle);
        }
        if !visited.contains(next) {
            if let Some(cycle) = dfs_cycle_detection(next, graph, visited, visiting, path) {
                return Some(cycle);
            }
        }
    }

    visiting.remove(node);
    path.pop();
    None
}
