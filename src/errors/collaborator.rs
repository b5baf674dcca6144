// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failure reported by an injected collaborator (dependency initializer,
/// cleanup hook, retryable operation or action executor).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct CollaboratorError {
    pub message: String,
}

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CollaboratorError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for CollaboratorError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
