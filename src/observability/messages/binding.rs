// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for binding mapping and execution.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A binding condition could not be evaluated and was treated as false.
///
/// # Log Level
/// `warn!` - Fail-closed evaluation
///
/// # Example
/// ```
/// use hashlinks::observability::messages::binding::ConditionRejected;
///
/// let msg = ConditionRejected {
///     condition: "{{attributes.name}} > 5",
///     substituted: "alice > 5",
///     reason: "unexpected identifier 'alice'",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ConditionRejected<'a> {
    pub condition: &'a str,
    pub substituted: &'a str,
    pub reason: &'a str,
}

impl Display for ConditionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Condition '{}' (evaluated as '{}') treated as false: {}",
            self.condition, self.substituted, self.reason
        )
    }
}

impl StructuredLog for ConditionRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            condition = self.condition,
            substituted = self.substituted,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("condition_rejected", span_name = name, condition = self.condition)
    }
}

/// A binding was skipped because its condition evaluated to false.
///
/// # Log Level
/// `debug!`
pub struct BindingSkipped<'a> {
    pub action: &'a str,
    pub condition: &'a str,
}

impl Display for BindingSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Skipped binding for action '{}': condition '{}' not met",
            self.action, self.condition
        )
    }
}

/// The action executor reported a failure.
///
/// # Log Level
/// `error!`
pub struct BindingExecutionFailed<'a> {
    pub action: &'a str,
    pub error: &'a str,
}

impl Display for BindingExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Binding execution for action '{}' failed: {}",
            self.action, self.error
        )
    }
}

impl StructuredLog for BindingExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(action = self.action, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("binding_failed", span_name = name, action = self.action)
    }
}

/// Parameter mapping was created for a block/action pair.
///
/// # Log Level
/// `debug!`
pub struct MappingCreated<'a> {
    pub block: &'a str,
    pub action: &'a str,
    pub mapped: usize,
    pub error_count: usize,
}

impl Display for MappingCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mapped {} parameters from block '{}' to action '{}' ({} errors)",
            self.mapped, self.block, self.action, self.error_count
        )
    }
}
