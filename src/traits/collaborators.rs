// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Injected lifecycle and binding collaborators.
//!
//! Every trait has a blanket implementation for async closures so tests and
//! callers can install a plain `|id: String| async move { ... }`.

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

use crate::binding::{ExecutionResult, ResolvedParameters};
use crate::errors::CollaboratorError;

/// Brings up an external dependency before an assembly's components.
#[async_trait]
pub trait DependencyInitializer: Send + Sync {
    async fn initialize(&self, dependency_id: &str) -> Result<(), CollaboratorError>;
}

/// Tears down an external dependency during assembly cleanup.
#[async_trait]
pub trait DependencyCleanup: Send + Sync {
    async fn cleanup(&self, dependency_id: &str) -> Result<(), CollaboratorError>;
}

/// Releases whatever a block or action component holds.
#[async_trait]
pub trait ComponentCleanup: Send + Sync {
    async fn cleanup(&self, component_id: &str) -> Result<(), CollaboratorError>;
}

/// Final initialization gate, run under retry-with-backoff.
#[async_trait]
pub trait RetryableOperation: Send + Sync {
    async fn run(&self) -> Result<Value, CollaboratorError>;
}

/// Invokes an action with its resolved parameters.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute(
        &self,
        action_id: &str,
        parameters: &ResolvedParameters,
    ) -> Result<ExecutionResult, CollaboratorError>;
}

#[async_trait]
impl<F, Fut> DependencyInitializer for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CollaboratorError>> + Send,
{
    async fn initialize(&self, dependency_id: &str) -> Result<(), CollaboratorError> {
        (self)(dependency_id.to_string()).await
    }
}

#[async_trait]
impl<F, Fut> DependencyCleanup for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CollaboratorError>> + Send,
{
    async fn cleanup(&self, dependency_id: &str) -> Result<(), CollaboratorError> {
        (self)(dependency_id.to_string()).await
    }
}

#[async_trait]
impl<F, Fut> ComponentCleanup for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), CollaboratorError>> + Send,
{
    async fn cleanup(&self, component_id: &str) -> Result<(), CollaboratorError> {
        (self)(component_id.to_string()).await
    }
}

#[async_trait]
impl<F, Fut> RetryableOperation for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, CollaboratorError>> + Send,
{
    async fn run(&self) -> Result<Value, CollaboratorError> {
        (self)().await
    }
}

#[async_trait]
impl<F, Fut> ActionExecutor for F
where
    F: Fn(String, ResolvedParameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ExecutionResult, CollaboratorError>> + Send,
{
    async fn execute(
        &self,
        action_id: &str,
        parameters: &ResolvedParameters,
    ) -> Result<ExecutionResult, CollaboratorError> {
        (self)(action_id.to_string(), parameters.clone()).await
    }
}
