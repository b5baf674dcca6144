// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for assembly lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Assembly state transitions
//! * Single-flight rejections and cleanup waits
//! * Dependency and component initialization/cleanup failures
//! * Retry attempts and event listener failures

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Assembly moved from one lifecycle state to another.
///
/// # Log Level
/// `debug!` - Emitted for every transition
///
/// # Example
/// ```
/// use hashlinks::observability::messages::lifecycle::StateTransition;
///
/// let msg = StateTransition {
///     assembly_id: "0.0.12345",
///     old_state: "uninitialized",
///     new_state: "initializing",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct StateTransition<'a> {
    pub assembly_id: &'a str,
    pub old_state: &'a str,
    pub new_state: &'a str,
}

impl Display for StateTransition<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Assembly '{}' transitioned {} -> {}",
            self.assembly_id, self.old_state, self.new_state
        )
    }
}

impl StructuredLog for StateTransition<'_> {
    fn log(&self) {
        tracing::debug!(
            assembly_id = self.assembly_id,
            old_state = self.old_state,
            new_state = self.new_state,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "state_transition",
            span_name = name,
            assembly_id = self.assembly_id,
            old_state = self.old_state,
            new_state = self.new_state,
        )
    }
}

/// A second initialize/update arrived while one was in flight.
///
/// # Log Level
/// `warn!` - Caller error, surfaced in the result
pub struct OperationRejected<'a> {
    pub assembly_id: &'a str,
    pub operation: &'a str,
}

impl Display for OperationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected {} for assembly '{}': another operation is in flight",
            self.operation, self.assembly_id
        )
    }
}

impl StructuredLog for OperationRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            assembly_id = self.assembly_id,
            operation = self.operation,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "operation_rejected",
            span_name = name,
            assembly_id = self.assembly_id,
            operation = self.operation,
        )
    }
}

/// Cleanup is waiting for an in-flight operation to finish.
///
/// # Log Level
/// `debug!`
pub struct CleanupWaiting<'a> {
    pub assembly_id: &'a str,
}

impl Display for CleanupWaiting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cleanup of assembly '{}' waiting for in-flight operation",
            self.assembly_id
        )
    }
}

/// A lifecycle step (dependency or component) failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use hashlinks::observability::messages::lifecycle::StepFailed;
///
/// let msg = StepFailed {
///     assembly_id: "0.0.12345",
///     step: "dependency",
///     target_id: "wallet",
///     error: "connection refused",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct StepFailed<'a> {
    pub assembly_id: &'a str,
    pub step: &'a str,
    pub target_id: &'a str,
    pub error: &'a str,
}

impl Display for StepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Assembly '{}': {} '{}' failed: {}",
            self.assembly_id, self.step, self.target_id, self.error
        )
    }
}

impl StructuredLog for StepFailed<'_> {
    fn log(&self) {
        tracing::error!(
            assembly_id = self.assembly_id,
            step = self.step,
            target_id = self.target_id,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "step_failed",
            span_name = name,
            assembly_id = self.assembly_id,
            step = self.step,
            target_id = self.target_id,
        )
    }
}

/// An attempt of a retried operation failed; another attempt follows.
///
/// # Log Level
/// `warn!`
pub struct RetryAttemptFailed<'a> {
    pub attempt: u32,
    pub max_retries: u32,
    pub delay: Duration,
    pub error: &'a str,
}

impl Display for RetryAttemptFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Attempt {}/{} failed, retrying in {:?}: {}",
            self.attempt, self.max_retries, self.delay, self.error
        )
    }
}

impl StructuredLog for RetryAttemptFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            attempt = self.attempt,
            max_retries = self.max_retries,
            delay_ms = self.delay.as_millis() as u64,
            error = self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "retry_attempt",
            span_name = name,
            attempt = self.attempt,
            max_retries = self.max_retries,
        )
    }
}

/// An event listener returned an error or panicked. The error is swallowed.
///
/// # Log Level
/// `warn!`
pub struct ListenerFailed<'a> {
    pub event: &'a str,
    pub error: &'a str,
}

impl Display for ListenerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Listener for '{}' failed: {}", self.event, self.error)
    }
}

impl StructuredLog for ListenerFailed<'_> {
    fn log(&self) {
        tracing::warn!(event = self.event, error = self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("listener_failed", span_name = name, event = self.event)
    }
}

/// Initialization finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct InitializationCompleted<'a> {
    pub assembly_id: &'a str,
    pub success: bool,
    pub partial_failure: bool,
    pub ready_components: usize,
    pub duration: Duration,
}

impl Display for InitializationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Assembly '{}' initialization finished: success={}, partial_failure={}, {} components ready in {:?}",
            self.assembly_id, self.success, self.partial_failure, self.ready_components, self.duration
        )
    }
}

impl StructuredLog for InitializationCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            assembly_id = self.assembly_id,
            success = self.success,
            partial_failure = self.partial_failure,
            ready_components = self.ready_components,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "initialization",
            span_name = name,
            assembly_id = self.assembly_id,
            success = self.success,
        )
    }
}
