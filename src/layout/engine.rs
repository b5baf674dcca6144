// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Layout calculation over a forest of components.
//!
//! `calculate_layout` is pure: the same components and container always
//! produce the same geometry, and nothing is cached between calls.
//!
//! ## Pass structure
//!
//! 1. Pick the active breakpoint from the responsive components.
//! 2. Find the roots: components no other component lists as a child.
//! 3. Walk each root depth first. A responsive component is swapped for its
//!    breakpoint layout; an invisible component gets a zero rect and its
//!    subtree is skipped. Flex and grid containers compute their children's
//!    bounds up front; every other component places its children against
//!    its own bounds.
//! 4. Apply constraints to each component once its primary geometry is known.
//! 5. Run [`validate_components`](crate::layout::validation::validate_components)
//!    and merge its findings without discarding geometry.

use crate::config::LayoutConfig;
use crate::errors::LayoutIssue;
use crate::layout::constraints::apply_constraints;
use crate::layout::types::{
    BreakpointRange, CalculatedLayout, ComponentLayout, Container, LayoutDefinition, LayoutKind,
    LayoutResult, LayoutValidation,
};
use crate::layout::{flex, grid, responsive, validation};
use crate::observability::messages::layout::{LayoutCalculated, LayoutIssueFound};
use crate::observability::messages::StructuredLog;
use indexmap::IndexMap;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    breakpoints: IndexMap<String, BreakpointRange>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            breakpoints: responsive::default_breakpoints(),
        }
    }
}

impl LayoutEngine {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            breakpoints: config
                .breakpoints
                .clone()
                .unwrap_or_else(responsive::default_breakpoints),
        }
    }

    /// Named ranges used when a responsive component gives a breakpoint name without bounds.
    pub fn breakpoints(&self) -> &IndexMap<String, BreakpointRange> {
        &self.breakpoints
    }

    pub fn calculate_layout(
        &self,
        components: &[ComponentLayout],
        container: Container,
    ) -> LayoutResult {
        let active =
            responsive::active_breakpoint(components, &self.breakpoints, container.width);

        let mut pass = LayoutPass::new(components, active.as_deref());
        let frame = CalculatedLayout::from(container);
        let roots = find_roots(components);
        if roots.is_empty() {
            // every component is someone's child; walking from the first one reports the loop
            if let Some(first) = components.first() {
                pass.place(&first.id, frame, None);
            }
        }
        for root in roots {
            pass.place(root, frame, None);
        }

        let mut issues = pass.issues;
        issues.extend(validation::validate_components(components, container));

        let mut result = LayoutResult {
            layouts: pass.layouts,
            visibility: pass.visibility,
            active_breakpoint: active,
            ..Default::default()
        };
        for issue in &issues {
            LayoutIssueFound {
                issue: &issue.to_string(),
            }
            .log();
            if issue.is_warning() {
                result.warnings.push(issue.to_string());
            } else {
                result.errors.push(issue.to_string());
            }
        }
        result.is_valid = result.errors.is_empty();

        LayoutCalculated {
            component_count: components.len(),
            container_width: container.width,
            container_height: container.height,
            active_breakpoint: result.active_breakpoint.as_deref(),
            error_count: result.errors.len(),
        }
        .log();

        result
    }

    /// Overlap, bounds and `relativeTo` cycle checks on their own.
    pub fn validate_layout(
        &self,
        components: &[ComponentLayout],
        container: Container,
    ) -> LayoutValidation {
        let (warnings, errors): (Vec<LayoutIssue>, Vec<LayoutIssue>) =
            validation::validate_components(components, container)
                .into_iter()
                .partition(LayoutIssue::is_warning);

        LayoutValidation {
            is_valid: errors.is_empty(),
            errors: errors.iter().map(ToString::to_string).collect(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn find_roots(components: &[ComponentLayout]) -> Vec<&str> {
    let children: HashSet<&str> = components
        .iter()
        .flat_map(|c| c.children.iter().map(String::as_str))
        .collect();
    let mut seen = HashSet::new();

    components
        .iter()
        .map(|c| c.id.as_str())
        .filter(|id| !children.contains(id) && seen.insert(*id))
        .collect()
}

/// State for one `calculate_layout` call.
struct LayoutPass<'a> {
    index: IndexMap<&'a str, &'a ComponentLayout>,
    active: Option<&'a str>,
    path: Vec<String>,
    layouts: IndexMap<String, CalculatedLayout>,
    visibility: IndexMap<String, bool>,
    issues: Vec<LayoutIssue>,
}

impl<'a> LayoutPass<'a> {
    fn new(components: &'a [ComponentLayout], active: Option<&'a str>) -> Self {
        let mut index = IndexMap::new();
        for component in components {
            index.entry(component.id.as_str()).or_insert(component);
        }

        Self {
            index,
            active,
            path: Vec::new(),
            layouts: IndexMap::new(),
            visibility: IndexMap::new(),
            issues: Vec::new(),
        }
    }

    /// Lay out `id` and its subtree. `assigned` is the slot a flex or grid parent computed.
    fn place(&mut self, id: &str, parent: CalculatedLayout, assigned: Option<CalculatedLayout>) {
        let Some(component) = self.index.get(id).copied() else {
            return;
        };

        if let Some(start) = self.path.iter().position(|p| p == id) {
            let mut cycle = self.path[start..].to_vec();
            cycle.push(id.to_string());
            self.issues.push(LayoutIssue::CircularChildren { cycle });
            return;
        }
        if self.layouts.contains_key(id) {
            return;
        }

        let (definition, visible) = responsive::resolve(&component.layout, self.active);
        self.visibility.insert(id.to_string(), visible);
        if !visible {
            self.layouts.insert(id.to_string(), CalculatedLayout::default());
            return;
        }

        let bounds = match assigned {
            Some(slot) => slot,
            None => self.geometry(id, &definition.kind, parent),
        };
        let bounds = apply_constraints(bounds, definition.constraints.as_ref());
        self.layouts.insert(id.to_string(), bounds);

        self.path.push(id.to_string());
        self.place_children(component, definition, bounds);
        self.path.pop();
    }

    fn place_children(
        &mut self,
        component: &'a ComponentLayout,
        definition: &'a LayoutDefinition,
        bounds: CalculatedLayout,
    ) {
        let mut shown: Vec<(&'a str, &'a LayoutKind)> = Vec::new();

        for child_id in &component.children {
            let Some(child) = self.index.get(child_id.as_str()).copied() else {
                self.issues.push(LayoutIssue::UnknownChild {
                    parent: component.id.clone(),
                    child: child_id.clone(),
                });
                continue;
            };
            let (child_definition, visible) = responsive::resolve(&child.layout, self.active);
            if visible {
                shown.push((child.id.as_str(), &child_definition.kind));
            } else {
                self.place(child_id, bounds, None);
            }
        }

        let kinds: Vec<&LayoutKind> = shown.iter().map(|(_, kind)| *kind).collect();
        let slots = match &definition.kind {
            LayoutKind::Flex(flex) => Some(flex::arrange(flex, &kinds, bounds)),
            LayoutKind::Grid(grid) => Some(grid::arrange(grid, &kinds, bounds)),
            _ => None,
        };

        match slots {
            Some(slots) => {
                for ((child_id, _), slot) in shown.iter().zip(slots) {
                    self.place(child_id, bounds, Some(slot));
                }
            }
            None => {
                for (child_id, _) in &shown {
                    self.place(child_id, bounds, None);
                }
            }
        }
    }

    /// Geometry of a component that no flex or grid parent has placed.
    fn geometry(&mut self, id: &str, kind: &LayoutKind, parent: CalculatedLayout) -> CalculatedLayout {
        match kind {
            LayoutKind::Absolute(absolute) => absolute.resolve(parent),
            LayoutKind::FlexItem(_) | LayoutKind::GridItem(_) => {
                self.issues.push(LayoutIssue::StandaloneItem {
                    component_id: id.to_string(),
                    layout_type: kind.type_name(),
                    container_type: if matches!(kind, LayoutKind::FlexItem(_)) {
                        "flex"
                    } else {
                        "grid"
                    },
                });
                let (width, height) = kind.declared_size();
                CalculatedLayout::new(
                    parent.x,
                    parent.y,
                    width.unwrap_or(parent.width),
                    height.unwrap_or(parent.height),
                )
            }
            LayoutKind::Relative(relative) => CalculatedLayout::new(
                parent.x + relative.offset.x,
                parent.y + relative.offset.y,
                parent.width,
                parent.height,
            ),
            LayoutKind::Flex(_) | LayoutKind::Grid(_) | LayoutKind::Responsive(_) => parent,
        }
    }
}
