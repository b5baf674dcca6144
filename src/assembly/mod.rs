// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assembly data model and the channel-backed assembly registry.

pub mod registry;
mod types;

pub use registry::{AssemblyOperation, AssemblyRegistry, PROTOCOL};
pub use types::{
    ActionDefinition, Assembly, AssemblyAction, AssemblyBlock, AttributeDefinition,
    BlockDefinition, ParameterDefinition, ValueType,
};
