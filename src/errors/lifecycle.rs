// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for assembly lifecycle operations.
//!
//! The lifecycle manager never returns these to its callers directly; they
//! are rendered into the `errors` list of the operation's result record.

use crate::errors::CollaboratorError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LifecycleError {
    /// Another initialize/update is in flight for the same assembly.
    #[error("Assembly {0} is already being processed")]
    AlreadyProcessing(String),

    #[error("Assembly {0} not found")]
    NotFound(String),

    #[error("Component {component_id} not found in assembly {assembly_id}")]
    ComponentNotFound {
        assembly_id: String,
        component_id: String,
    },

    #[error("Failed to initialize dependency {dependency_id}: {reason}")]
    DependencyFailed {
        dependency_id: String,
        reason: String,
    },

    #[error("Failed to clean up dependency {dependency_id}: {reason}")]
    DependencyCleanupFailed {
        dependency_id: String,
        reason: String,
    },

    #[error("Failed to initialize {component_type} {component_id}: {reason}")]
    ComponentFailed {
        component_type: String,
        component_id: String,
        reason: String,
    },

    #[error("Failed to clean up component {component_id}: {reason}")]
    ComponentCleanupFailed {
        component_id: String,
        reason: String,
    },

    #[error("Operation failed after {attempts} attempts: {last_error}")]
    RetryExhausted {
        attempts: u32,
        last_error: CollaboratorError,
    },
}
