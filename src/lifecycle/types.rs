// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::LifecycleConfig;
use crate::lifecycle::retry::RetryOptions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assembly state machine.
///
/// `uninitialized -> initializing -> {initialized | error}`,
/// `initialized -> updating -> {updated | error}`,
/// any state `-> destroying -> {destroyed | error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyState {
    Uninitialized,
    Initializing,
    Initialized,
    Updating,
    Updated,
    Destroying,
    Destroyed,
    Error,
}

impl AssemblyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssemblyState::Uninitialized => "uninitialized",
            AssemblyState::Initializing => "initializing",
            AssemblyState::Initialized => "initialized",
            AssemblyState::Updating => "updating",
            AssemblyState::Updated => "updated",
            AssemblyState::Destroying => "destroying",
            AssemblyState::Destroyed => "destroyed",
            AssemblyState::Error => "error",
        }
    }
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Action,
    Block,
    Dependency,
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ComponentType::Action => "action",
            ComponentType::Block => "block",
            ComponentType::Dependency => "dependency",
        })
    }
}

/// `pending -> initializing -> {ready | error}`, `ready -> updating -> {ready | error}`,
/// any `-> destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Pending,
    Initializing,
    Ready,
    Updating,
    Error,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub id: String,
    #[serde(rename = "type")]
    pub component_type: ComponentType,
    pub state: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// SHA-256 of the action's WASM module, when it carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl ComponentStatus {
    pub fn pending(id: impl Into<String>, component_type: ComponentType) -> Self {
        Self {
            id: id.into(),
            component_type,
            state: ComponentState::Pending,
            version: None,
            error: None,
            hash: None,
        }
    }

    pub fn with_version(mut self, version: Option<&str>) -> Self {
        self.version = version.map(str::to_string);
        self
    }
}

/// Snapshot of an assembly as tracked by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssemblyStatus {
    pub id: String,
    pub name: String,
    pub version: String,
    pub state: AssemblyState,
    pub components: Vec<ComponentStatus>,
    /// Creation time, epoch milliseconds.
    pub uptime: i64,
    /// Epoch milliseconds of the last update or hot reload.
    pub last_update: Option<i64>,
    pub dependencies: Vec<String>,
}

impl AssemblyStatus {
    pub fn component(&self, id: &str) -> Option<&ComponentStatus> {
        self.components.iter().find(|c| c.id == id)
    }

    pub fn ready_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.state == ComponentState::Ready)
            .count()
    }
}

/// What happens when one dependency or component fails during initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialFailureMode {
    /// Abort the whole initialization.
    #[default]
    Fail,
    /// Record the failure and carry on with the next component.
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitializationOptions {
    pub partial_failure_mode: PartialFailureMode,
    /// Runs the installed retryable operation as a final gate when set.
    pub retry_options: Option<RetryOptions>,
}

impl From<&LifecycleConfig> for InitializationOptions {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            partial_failure_mode: config.partial_failure_mode,
            retry_options: config.retry.as_ref().map(RetryOptions::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializationResult {
    pub success: bool,
    pub partial_failure: bool,
    pub state: AssemblyState,
    pub ready_components: Vec<String>,
    pub errors: Vec<String>,
}

impl InitializationResult {
    pub(crate) fn rejected(state: AssemblyState, error: String) -> Self {
        Self {
            success: false,
            partial_failure: false,
            state,
            ready_components: Vec::new(),
            errors: vec![error],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOptions {
    /// Keep component states and errors for components present before and after.
    pub preserve_state: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            preserve_state: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateResult {
    pub success: bool,
    pub changes: Vec<String>,
    pub errors: Vec<String>,
}

impl UpdateResult {
    pub(crate) fn failed(error: String) -> Self {
        Self {
            success: false,
            changes: Vec::new(),
            errors: vec![error],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanupResult {
    pub success: bool,
    pub errors: Vec<String>,
}

/// A targeted reload that skips the full diff of `update_assembly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadUpdate {
    Component {
        component_id: String,
        version: Option<String>,
    },
    Assembly {
        version: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StateChangedEvent {
    pub assembly_id: String,
    pub old_state: AssemblyState,
    pub new_state: AssemblyState,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentUpdateKind {
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComponentUpdatedEvent {
    pub assembly_id: String,
    pub component_id: String,
    pub kind: ComponentUpdateKind,
    pub timestamp: DateTime<Utc>,
}
