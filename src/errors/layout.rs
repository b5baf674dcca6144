// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Problems found in a component tree during layout calculation or validation.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutIssue {
    /// Two absolutely positioned components intersect
    Overlap { first: String, second: String },
    /// An absolutely positioned component extends past the container
    OutOfBounds { component_id: String },
    /// A `relativeTo` chain leads back to a component already on the chain
    CircularDependency {
        /// The chain, closed with the repeated id
        cycle: Vec<String>,
    },
    /// A `relativeTo` target that does not exist
    UnknownRelativeTarget {
        component_id: String,
        target: String,
    },
    /// A `children` entry that names no component
    UnknownChild { parent: String, child: String },
    /// The `children` lists form a loop
    CircularChildren { cycle: Vec<String> },
    /// Two components share an id
    DuplicateComponentId { component_id: String },
    /// A grid template expands to more tracks than are laid out
    TooManyTracks {
        component_id: String,
        axis: &'static str,
        requested: usize,
        limit: usize,
    },
    /// A `flex-item` or `grid-item` laid out without a matching container
    StandaloneItem {
        component_id: String,
        layout_type: &'static str,
        container_type: &'static str,
    },
}

impl LayoutIssue {
    /// Warnings are reported but do not make the layout invalid.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            LayoutIssue::StandaloneItem { .. } | LayoutIssue::UnknownRelativeTarget { .. }
        )
    }
}

impl fmt::Display for LayoutIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutIssue::Overlap { first, second } => {
                write!(f, "Components \"{}\" and \"{}\" overlap", first, second)
            }
            LayoutIssue::OutOfBounds { component_id } => {
                write!(f, "Component \"{}\" exceeds container bounds", component_id)
            }
            LayoutIssue::CircularDependency { cycle } => {
                write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
            }
            LayoutIssue::UnknownRelativeTarget {
                component_id,
                target,
            } => write!(
                f,
                "Component \"{}\" is relative to \"{}\" which does not exist",
                component_id, target
            ),
            LayoutIssue::UnknownChild { parent, child } => write!(
                f,
                "Component \"{}\" references unknown child \"{}\"",
                parent, child
            ),
            LayoutIssue::CircularChildren { cycle } => {
                write!(f, "Circular child reference: {}", cycle.join(" -> "))
            }
            LayoutIssue::DuplicateComponentId { component_id } => {
                write!(f, "Duplicate component id: \"{}\"", component_id)
            }
            LayoutIssue::TooManyTracks {
                component_id,
                axis,
                requested,
                limit,
            } => write!(
                f,
                "Component \"{}\" requests {} grid {}, limit is {}",
                component_id, requested, axis, limit
            ),
            LayoutIssue::StandaloneItem {
                component_id,
                layout_type,
                container_type,
            } => write!(
                f,
                "Component \"{}\" uses {} layout outside a {} container; using parent bounds",
                component_id, layout_type, container_type
            ),
        }
    }
}

impl std::error::Error for LayoutIssue {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_display() {
        let issue = LayoutIssue::CircularDependency {
            cycle: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(issue.to_string(), "Circular dependency detected: A -> B -> A");
        assert!(!issue.is_warning());
    }

    #[test]
    fn test_standalone_item_is_warning() {
        let issue = LayoutIssue::StandaloneItem {
            component_id: "cell".into(),
            layout_type: "grid-item",
            container_type: "grid",
        };
        assert!(issue.is_warning());
        assert!(issue.to_string().contains("outside a grid container"));
    }
}
