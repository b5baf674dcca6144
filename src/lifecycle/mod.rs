// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assembly lifecycle: initialization, diff-based update, hot reload and
//! cleanup, with per-assembly single-flight locking and state-change events.

mod events;
mod manager;
mod operations;
mod retry;
mod types;

pub use events::{LifecycleEvents, ListenerResult, Listeners};
pub use manager::LifecycleManager;
pub use retry::{retry_with_backoff, RetryOptions};
pub use types::{
    AssemblyState, AssemblyStatus, CleanupResult, ComponentState, ComponentStatus, ComponentType,
    ComponentUpdateKind, ComponentUpdatedEvent, HotReloadUpdate, InitializationOptions,
    InitializationResult, PartialFailureMode, StateChangedEvent, UpdateOptions, UpdateResult,
};
