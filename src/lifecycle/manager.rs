// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assembly lifecycle orchestration.
//!
//! The manager owns two tables: assembly statuses keyed by id, and the
//! single-flight locks for in-flight operations. Neither is exposed by
//! reference; `get_assembly_status` hands out clones.
//!
//! ## Initialization order
//!
//! Dependencies first, then blocks, then actions, each strictly in
//! declaration order and one at a time. In `fail` mode the first failure
//! stops everything after it. In `continue` mode failures are recorded, the
//! result is marked `partial_failure`, and processing moves on.
//!
//! ## Locking
//!
//! Initialize, update and hot reload reject a second call for an id that is
//! busy. Cleanup waits for the busy operation and then runs; it is never
//! skipped.

use crate::assembly::{Assembly, AssemblyAction};
use crate::config::EngineConfig;
use crate::errors::LifecycleError;
use crate::lifecycle::events::{LifecycleEvents, ListenerResult};
use crate::lifecycle::operations::OperationLocks;
use crate::lifecycle::retry::retry_with_backoff;
use crate::lifecycle::types::{
    AssemblyState, AssemblyStatus, CleanupResult, ComponentState, ComponentStatus, ComponentType,
    ComponentUpdateKind, ComponentUpdatedEvent, HotReloadUpdate, InitializationOptions,
    InitializationResult, PartialFailureMode, StateChangedEvent, UpdateOptions, UpdateResult,
};
use crate::observability::messages::lifecycle::{
    InitializationCompleted, OperationRejected, StateTransition, StepFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{ComponentCleanup, DependencyCleanup, DependencyInitializer, RetryableOperation};
use crate::wasm::WasmValidator;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::Mutex;

/// A block or action waiting to be brought up.
struct PlannedComponent<'a> {
    component_type: ComponentType,
    id: &'a str,
    failure: Option<String>,
    hash: Option<String>,
}

pub struct LifecycleManager {
    statuses: Mutex<HashMap<String, AssemblyStatus>>,
    operations: OperationLocks,
    events: LifecycleEvents,
    validator: WasmValidator,
    defaults: InitializationOptions,
    dependency_initializer: Option<Box<dyn DependencyInitializer>>,
    dependency_cleanup: Option<Box<dyn DependencyCleanup>>,
    component_cleanup: Option<Box<dyn ComponentCleanup>>,
    retryable_operation: Option<Box<dyn RetryableOperation>>,
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl LifecycleManager {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            statuses: Mutex::new(HashMap::new()),
            operations: OperationLocks::default(),
            events: LifecycleEvents::default(),
            validator: WasmValidator::new(&config.wasm),
            defaults: InitializationOptions::from(&config.lifecycle),
            dependency_initializer: None,
            dependency_cleanup: None,
            component_cleanup: None,
            retryable_operation: None,
        }
    }

    pub fn set_dependency_initializer(&mut self, initializer: impl DependencyInitializer + 'static) {
        self.dependency_initializer = Some(Box::new(initializer));
    }

    pub fn set_dependency_cleanup(&mut self, cleanup: impl DependencyCleanup + 'static) {
        self.dependency_cleanup = Some(Box::new(cleanup));
    }

    pub fn set_component_cleanup(&mut self, cleanup: impl ComponentCleanup + 'static) {
        self.component_cleanup = Some(Box::new(cleanup));
    }

    pub fn set_retryable_operation(&mut self, operation: impl RetryableOperation + 'static) {
        self.retryable_operation = Some(Box::new(operation));
    }

    pub fn on_state_changed<F>(&self, listener: F)
    where
        F: Fn(&StateChangedEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.events.state_changed.subscribe(listener);
    }

    pub fn on_component_updated<F>(&self, listener: F)
    where
        F: Fn(&ComponentUpdatedEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.events.component_updated.subscribe(listener);
    }

    /// Snapshot of a tracked assembly.
    pub async fn get_assembly_status(&self, assembly_id: &str) -> Option<AssemblyStatus> {
        self.statuses.lock().await.get(assembly_id).cloned()
    }

    /// Bring up an assembly's dependencies, blocks and actions.
    ///
    /// Falls back to the configured defaults when `options` is `None`.
    pub async fn initialize_assembly(
        &self,
        assembly: &Assembly,
        options: Option<InitializationOptions>,
    ) -> InitializationResult {
        let Some(_guard) = self.operations.try_acquire(&assembly.id) else {
            let state = self.current_state(&assembly.id).await;
            return InitializationResult::rejected(state, self.reject(&assembly.id, "initialize"));
        };

        let started = Instant::now();
        let options = options.unwrap_or_else(|| self.defaults.clone());
        let continue_on_failure = options.partial_failure_mode == PartialFailureMode::Continue;

        {
            let mut statuses = self.statuses.lock().await;
            let previous = statuses
                .get(&assembly.id)
                .map(|status| status.state)
                .unwrap_or(AssemblyState::Uninitialized);
            statuses.insert(assembly.id.clone(), new_status(assembly, previous));
        }
        self.transition(&assembly.id, AssemblyState::Initializing).await;

        let mut result = InitializationResult {
            success: true,
            partial_failure: false,
            state: AssemblyState::Initializing,
            ready_components: Vec::new(),
            errors: Vec::new(),
        };

        for dependency in &assembly.dependencies {
            self.set_component_state(&assembly.id, ComponentType::Dependency, dependency, ComponentState::Initializing)
                .await;

            let outcome = match &self.dependency_initializer {
                Some(initializer) => initializer.initialize(dependency).await,
                None => Ok(()),
            };

            match outcome {
                Ok(()) => {
                    self.set_component_state(&assembly.id, ComponentType::Dependency, dependency, ComponentState::Ready)
                        .await;
                    result.ready_components.push(dependency.clone());
                }
                Err(e) => {
                    let error = LifecycleError::DependencyFailed {
                        dependency_id: dependency.clone(),
                        reason: e.to_string(),
                    };
                    self.record_failure(&assembly.id, ComponentType::Dependency, dependency, error, &mut result)
                        .await;
                    if !continue_on_failure {
                        result.success = false;
                        return self.finish_initialization(&assembly.id, result, started).await;
                    }
                    result.partial_failure = true;
                }
            }
        }

        for component in self.plan_components(assembly) {
            self.set_component_state(&assembly.id, component.component_type, component.id, ComponentState::Initializing)
                .await;

            match component.failure {
                None => {
                    let hash = component.hash;
                    self.update_component(&assembly.id, component.component_type, component.id, |status| {
                        status.state = ComponentState::Ready;
                        status.hash = hash;
                    })
                    .await;
                    result.ready_components.push(component.id.to_string());
                }
                Some(reason) => {
                    let error = LifecycleError::ComponentFailed {
                        component_type: component.component_type.to_string(),
                        component_id: component.id.to_string(),
                        reason,
                    };
                    self.record_failure(&assembly.id, component.component_type, component.id, error, &mut result)
                        .await;
                    if !continue_on_failure {
                        result.success = false;
                        return self.finish_initialization(&assembly.id, result, started).await;
                    }
                    result.partial_failure = true;
                }
            }
        }

        if let (Some(operation), Some(retry)) = (&self.retryable_operation, &options.retry_options) {
            if let Err(e) = retry_with_backoff(retry, move || operation.run()).await {
                let message = e.to_string();
                StepFailed {
                    assembly_id: &assembly.id,
                    step: "retryable operation",
                    target_id: &assembly.id,
                    error: &message,
                }
                .log();
                result.errors.push(message);
                result.success = false;
            }
        }

        self.finish_initialization(&assembly.id, result, started).await
    }

    /// Reconcile a tracked assembly with a new description of it.
    ///
    /// Blocks, actions and dependencies are diffed by id: removed ids are
    /// dropped, new ids are added as `ready`, and ids whose definition version
    /// changed are bumped in place.
    pub async fn update_assembly(
        &self,
        assembly_id: &str,
        assembly: &Assembly,
        options: Option<UpdateOptions>,
    ) -> UpdateResult {
        let Some(_guard) = self.operations.try_acquire(assembly_id) else {
            return UpdateResult::failed(self.reject(assembly_id, "update"));
        };
        if self.get_assembly_status(assembly_id).await.is_none() {
            return UpdateResult::failed(LifecycleError::NotFound(assembly_id.to_string()).to_string());
        }

        let options = options.unwrap_or_default();
        self.transition(assembly_id, AssemblyState::Updating).await;

        let changes = {
            let mut statuses = self.statuses.lock().await;
            match statuses.get_mut(assembly_id) {
                Some(status) => apply_update(status, assembly, &options),
                None => Vec::new(),
            }
        };

        self.transition(assembly_id, AssemblyState::Updated).await;

        UpdateResult {
            success: true,
            changes,
            errors: Vec::new(),
        }
    }

    /// Tear down every component and dependency, then forget the assembly.
    ///
    /// Waits for any in-flight operation on the same id first. Failures are
    /// collected and do not stop the remaining cleanups; the assembly is
    /// removed either way.
    pub async fn cleanup_assembly(&self, assembly_id: &str) -> CleanupResult {
        let _guard = self.operations.acquire(assembly_id).await;

        let Some(snapshot) = self.get_assembly_status(assembly_id).await else {
            return CleanupResult {
                success: false,
                errors: vec![LifecycleError::NotFound(assembly_id.to_string()).to_string()],
            };
        };

        self.transition(assembly_id, AssemblyState::Destroying).await;
        let mut result = CleanupResult {
            success: true,
            errors: Vec::new(),
        };

        let components = snapshot
            .components
            .iter()
            .filter(|c| c.component_type != ComponentType::Dependency);
        for component in components {
            let outcome = match &self.component_cleanup {
                Some(cleanup) => ComponentCleanup::cleanup(&**cleanup, &component.id).await,
                None => Ok(()),
            };
            let error = outcome.err().map(|e| LifecycleError::ComponentCleanupFailed {
                component_id: component.id.clone(),
                reason: e.to_string(),
            });
            self.record_cleanup(assembly_id, component.component_type, &component.id, error, &mut result)
                .await;
        }

        for dependency in &snapshot.dependencies {
            let outcome = match &self.dependency_cleanup {
                Some(cleanup) => DependencyCleanup::cleanup(&**cleanup, dependency).await,
                None => Ok(()),
            };
            let error = outcome.err().map(|e| LifecycleError::DependencyCleanupFailed {
                dependency_id: dependency.clone(),
                reason: e.to_string(),
            });
            self.record_cleanup(assembly_id, ComponentType::Dependency, dependency, error, &mut result)
                .await;
        }

        self.transition(assembly_id, AssemblyState::Destroyed).await;
        self.statuses.lock().await.remove(assembly_id);

        result
    }

    /// Apply a single component or assembly version change without a full diff.
    pub async fn hot_reload(&self, assembly_id: &str, update: HotReloadUpdate) -> UpdateResult {
        let Some(_guard) = self.operations.try_acquire(assembly_id) else {
            return UpdateResult::failed(self.reject(assembly_id, "hot reload"));
        };
        {
            let statuses = self.statuses.lock().await;
            let Some(status) = statuses.get(assembly_id) else {
                return UpdateResult::failed(LifecycleError::NotFound(assembly_id.to_string()).to_string());
            };
            if let HotReloadUpdate::Component { component_id, .. } = &update {
                if status.component(component_id).is_none() {
                    return UpdateResult::failed(
                        LifecycleError::ComponentNotFound {
                            assembly_id: assembly_id.to_string(),
                            component_id: component_id.clone(),
                        }
                        .to_string(),
                    );
                }
            }
        }

        self.transition(assembly_id, AssemblyState::Updating).await;

        let mut result = UpdateResult {
            success: true,
            ..Default::default()
        };
        {
            let mut statuses = self.statuses.lock().await;
            if let Some(status) = statuses.get_mut(assembly_id) {
                match &update {
                    HotReloadUpdate::Component {
                        component_id,
                        version,
                    } => {
                        if let Some(component) = status.components.iter_mut().find(|c| &c.id == component_id) {
                            if let Some(version) = version {
                                result.changes.push(format!(
                                    "Reloaded {} {} from {} to {}",
                                    component.component_type,
                                    component_id,
                                    component.version.as_deref().unwrap_or("none"),
                                    version
                                ));
                                component.version = Some(version.clone());
                            } else {
                                result.changes.push(format!(
                                    "Reloaded {} {}",
                                    component.component_type, component_id
                                ));
                            }
                            component.state = ComponentState::Ready;
                            component.error = None;
                        }
                    }
                    HotReloadUpdate::Assembly { version } => {
                        if &status.version != version {
                            result.changes.push(format!(
                                "Assembly version changed from {} to {}",
                                status.version, version
                            ));
                            status.version = version.clone();
                        }
                    }
                }
                status.last_update = Some(now_millis());
            }
        }

        self.transition(assembly_id, AssemblyState::Updated).await;
        if let HotReloadUpdate::Component { component_id, .. } = update {
            self.events.component_updated.emit(&ComponentUpdatedEvent {
                assembly_id: assembly_id.to_string(),
                component_id,
                kind: ComponentUpdateKind::Updated,
                timestamp: Utc::now(),
            });
        }

        result
    }

    fn plan_components<'a>(&self, assembly: &'a Assembly) -> Vec<PlannedComponent<'a>> {
        let blocks = assembly.blocks.iter().map(|block| PlannedComponent {
            component_type: ComponentType::Block,
            id: block.id.as_str(),
            failure: block.error.clone(),
            hash: None,
        });
        let actions = assembly.actions.iter().map(|action| PlannedComponent {
            component_type: ComponentType::Action,
            id: action.id.as_str(),
            failure: self.action_failure(action),
            hash: action.module.as_deref().map(WasmValidator::calculate_hash),
        });
        blocks.chain(actions).collect()
    }

    /// An upstream error, or the validator's verdict on the action's module.
    fn action_failure(&self, action: &AssemblyAction) -> Option<String> {
        if let Some(error) = &action.error {
            return Some(error.clone());
        }
        let module = action.module.as_ref()?;
        let validation = self.validator.validate(module);
        if validation.is_valid {
            None
        } else {
            Some(format!("Invalid WASM module: {}", validation.errors.join("; ")))
        }
    }

    async fn finish_initialization(
        &self,
        assembly_id: &str,
        mut result: InitializationResult,
        started: Instant,
    ) -> InitializationResult {
        let state = if result.success {
            AssemblyState::Initialized
        } else {
            AssemblyState::Error
        };
        self.transition(assembly_id, state).await;
        result.state = state;

        InitializationCompleted {
            assembly_id,
            success: result.success,
            partial_failure: result.partial_failure,
            ready_components: result.ready_components.len(),
            duration: started.elapsed(),
        }
        .log();

        result
    }

    async fn record_failure(
        &self,
        assembly_id: &str,
        component_type: ComponentType,
        component_id: &str,
        error: LifecycleError,
        result: &mut InitializationResult,
    ) {
        let message = error.to_string();
        StepFailed {
            assembly_id,
            step: &format!("initialize {component_type}"),
            target_id: component_id,
            error: &message,
        }
        .log();

        let component_error = message.clone();
        self.update_component(assembly_id, component_type, component_id, |status| {
            status.state = ComponentState::Error;
            status.error = Some(component_error);
        })
        .await;
        result.errors.push(message);
    }

    async fn record_cleanup(
        &self,
        assembly_id: &str,
        component_type: ComponentType,
        component_id: &str,
        error: Option<LifecycleError>,
        result: &mut CleanupResult,
    ) {
        let Some(error) = error else {
            self.set_component_state(assembly_id, component_type, component_id, ComponentState::Destroyed)
                .await;
            return;
        };

        let message = error.to_string();
        StepFailed {
            assembly_id,
            step: &format!("clean up {component_type}"),
            target_id: component_id,
            error: &message,
        }
        .log();

        let component_error = message.clone();
        self.update_component(assembly_id, component_type, component_id, |status| {
            status.state = ComponentState::Error;
            status.error = Some(component_error);
        })
        .await;
        result.errors.push(message);
        result.success = false;
    }

    async fn set_component_state(
        &self,
        assembly_id: &str,
        component_type: ComponentType,
        component_id: &str,
        state: ComponentState,
    ) {
        self.update_component(assembly_id, component_type, component_id, |status| {
            status.state = state;
        })
        .await;
    }

    async fn update_component<F>(
        &self,
        assembly_id: &str,
        component_type: ComponentType,
        component_id: &str,
        apply: F,
    ) where
        F: FnOnce(&mut ComponentStatus),
    {
        let mut statuses = self.statuses.lock().await;
        let component = statuses.get_mut(assembly_id).and_then(|status| {
            status
                .components
                .iter_mut()
                .find(|c| c.component_type == component_type && c.id == component_id)
        });
        if let Some(component) = component {
            apply(component);
        }
    }

    async fn transition(&self, assembly_id: &str, new_state: AssemblyState) {
        let old_state = {
            let mut statuses = self.statuses.lock().await;
            match statuses.get_mut(assembly_id) {
                Some(status) => std::mem::replace(&mut status.state, new_state),
                None => AssemblyState::Uninitialized,
            }
        };

        StateTransition {
            assembly_id,
            old_state: old_state.as_str(),
            new_state: new_state.as_str(),
        }
        .log();

        self.events.state_changed.emit(&StateChangedEvent {
            assembly_id: assembly_id.to_string(),
            old_state,
            new_state,
            timestamp: Utc::now(),
        });
    }

    async fn current_state(&self, assembly_id: &str) -> AssemblyState {
        self.statuses
            .lock()
            .await
            .get(assembly_id)
            .map(|status| status.state)
            .unwrap_or(AssemblyState::Uninitialized)
    }

    fn reject(&self, assembly_id: &str, operation: &str) -> String {
        OperationRejected {
            assembly_id,
            operation,
        }
        .log();
        LifecycleError::AlreadyProcessing(assembly_id.to_string()).to_string()
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn new_status(assembly: &Assembly, state: AssemblyState) -> AssemblyStatus {
    let dependencies = assembly
        .dependencies
        .iter()
        .map(|id| ComponentStatus::pending(id, ComponentType::Dependency));
    let blocks = assembly
        .blocks
        .iter()
        .map(|block| ComponentStatus::pending(&block.id, ComponentType::Block).with_version(block.version()));
    let actions = assembly
        .actions
        .iter()
        .map(|action| ComponentStatus::pending(&action.id, ComponentType::Action).with_version(action.version()));

    AssemblyStatus {
        id: assembly.id.clone(),
        name: assembly.name.clone(),
        version: assembly.version.clone(),
        state,
        components: dependencies.chain(blocks).chain(actions).collect(),
        uptime: now_millis(),
        last_update: None,
        dependencies: assembly.dependencies.clone(),
    }
}

/// Diff `assembly` into `status` and describe every change made.
fn apply_update(status: &mut AssemblyStatus, assembly: &Assembly, options: &UpdateOptions) -> Vec<String> {
    let mut changes = Vec::new();

    let blocks: Vec<(&str, Option<&str>)> = assembly
        .blocks
        .iter()
        .map(|block| (block.id.as_str(), block.version()))
        .collect();
    let actions: Vec<(&str, Option<&str>)> = assembly
        .actions
        .iter()
        .map(|action| (action.id.as_str(), action.version()))
        .collect();
    let dependencies: Vec<(&str, Option<&str>)> = assembly
        .dependencies
        .iter()
        .map(|id| (id.as_str(), None))
        .collect();

    let retained: Vec<String> = status.components.iter().map(|c| c.id.clone()).collect();

    diff_components(status, ComponentType::Block, &blocks, &mut changes);
    diff_components(status, ComponentType::Action, &actions, &mut changes);
    diff_components(status, ComponentType::Dependency, &dependencies, &mut changes);

    if status.version != assembly.version {
        changes.push(format!(
            "Assembly version changed from {} to {}",
            status.version, assembly.version
        ));
        status.version = assembly.version.clone();
    }

    if !options.preserve_state {
        for component in status
            .components
            .iter_mut()
            .filter(|c| retained.contains(&c.id))
        {
            component.state = ComponentState::Ready;
            component.error = None;
        }
    }

    status.name = assembly.name.clone();
    status.dependencies = assembly.dependencies.clone();
    status.last_update = Some(now_millis());

    changes
}

fn diff_components(
    status: &mut AssemblyStatus,
    component_type: ComponentType,
    declared: &[(&str, Option<&str>)],
    changes: &mut Vec<String>,
) {
    status.components.retain(|component| {
        if component.component_type != component_type
            || declared.iter().any(|(id, _)| *id == component.id)
        {
            return true;
        }
        changes.push(format!("Removed {} {}", component_type, component.id));
        false
    });

    for (id, version) in declared {
        let existing = status
            .components
            .iter_mut()
            .find(|c| c.component_type == component_type && c.id == *id);

        match existing {
            Some(component) if component.version.as_deref() != *version => {
                changes.push(format!(
                    "Updated {} {} from {} to {}",
                    component_type,
                    id,
                    component.version.as_deref().unwrap_or("none"),
                    version.unwrap_or("none")
                ));
                component.version = version.map(str::to_string);
            }
            Some(_) => {}
            None => {
                changes.push(format!("Added {} {}", component_type, id));
                let mut component = ComponentStatus::pending(*id, component_type).with_version(*version);
                component.state = ComponentState::Ready;
                status.components.push(component);
            }
        }
    }
}
