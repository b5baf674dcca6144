// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ports through which the core talks to the outside world.

pub mod channel;
pub mod collaborators;

pub use channel::{MessageChannel, OrderedMessage, QueryOptions, SortOrder, SubmitReceipt};
pub use collaborators::{
    ActionExecutor, ComponentCleanup, DependencyCleanup, DependencyInitializer, RetryableOperation,
};
