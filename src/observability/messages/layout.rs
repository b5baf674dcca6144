// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for layout calculation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Layout calculation finished.
///
/// # Log Level
/// `debug!`
///
/// # Example
/// ```
/// use hashlinks::observability::messages::layout::LayoutCalculated;
///
/// let msg = LayoutCalculated {
///     component_count: 4,
///     container_width: 1200.0,
///     container_height: 800.0,
///     active_breakpoint: Some("desktop"),
///     error_count: 0,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct LayoutCalculated<'a> {
    pub component_count: usize,
    pub container_width: f64,
    pub container_height: f64,
    pub active_breakpoint: Option<&'a str>,
    pub error_count: usize,
}

impl Display for LayoutCalculated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calculated layout for {} components in {}x{} container (breakpoint: {}, {} errors)",
            self.component_count,
            self.container_width,
            self.container_height,
            self.active_breakpoint.unwrap_or("none"),
            self.error_count
        )
    }
}

impl StructuredLog for LayoutCalculated<'_> {
    fn log(&self) {
        tracing::debug!(
            component_count = self.component_count,
            container_width = self.container_width,
            container_height = self.container_height,
            active_breakpoint = self.active_breakpoint.unwrap_or("none"),
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "layout",
            span_name = name,
            component_count = self.component_count,
        )
    }
}

/// Validation reported a problem with the component tree.
///
/// # Log Level
/// `warn!`
pub struct LayoutIssueFound<'a> {
    pub issue: &'a str,
}

impl Display for LayoutIssueFound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Layout issue: {}", self.issue)
    }
}

impl StructuredLog for LayoutIssueFound<'_> {
    fn log(&self) {
        tracing::warn!(issue = self.issue, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("layout_issue", span_name = name, issue = self.issue)
    }
}
