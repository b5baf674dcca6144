// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Constraint-based layout for assembly components.
//!
//! Components form a forest referenced by id. [`LayoutEngine::calculate_layout`]
//! resolves absolute, flex, grid, relative and responsive positioning into
//! absolute rectangles, and [`generate_layout_transitions`] diffs two results
//! into animations.
//!
//! ```
//! use hashlinks::layout::{ComponentLayout, Container, FlexItemLayout, FlexLayout, LayoutEngine, LayoutKind};
//!
//! let components = vec![
//!     ComponentLayout::new("row", LayoutKind::Flex(FlexLayout { gap: 16.0, ..Default::default() }))
//!         .with_children(["left", "right"]),
//!     ComponentLayout::new("left", LayoutKind::FlexItem(FlexItemLayout { flex: Some(1.0), ..Default::default() })),
//!     ComponentLayout::new("right", LayoutKind::FlexItem(FlexItemLayout { flex: Some(1.0), ..Default::default() })),
//! ];
//!
//! let result = LayoutEngine::default().calculate_layout(&components, Container::new(416.0, 100.0));
//! assert!(result.is_valid);
//! assert_eq!(result.layouts["right"].x, 216.0);
//! ```

pub mod constraints;
mod engine;
pub mod flex;
pub mod grid;
pub mod responsive;
mod transitions;
mod types;
pub mod validation;

pub use engine::LayoutEngine;
pub use transitions::generate_layout_transitions;
pub use types::{
    AbsoluteLayout, Align, AnimationTransition, BreakpointRange, CalculatedLayout,
    ComponentLayout, Container, FlexDirection, FlexItemLayout, FlexLayout, GridItemLayout,
    GridLayout, Justify, LayoutConstraints, LayoutDefinition, LayoutKind, LayoutResult,
    LayoutValidation, Offset, PropertyChange, RelativeLayout, ResponsiveBreakpoint,
    ResponsiveLayout, TransitionKind, TransitionOptions, Unit,
};
