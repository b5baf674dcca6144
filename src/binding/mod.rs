// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wiring block attributes to action parameters.
//!
//! [`BindingManager::create_parameter_mapping`] type-checks a binding against
//! the block and action schemas; [`BindingManager::execute_binding`] resolves
//! the mapping against live block state and calls an [`ActionExecutor`].
//!
//! [`ActionExecutor`]: crate::traits::ActionExecutor

pub mod coercion;
pub mod expression;
mod manager;
mod types;

pub use manager::BindingManager;
pub use types::{
    Binding, BindingValidation, BlockState, ExecutionResult, MappingResult, MappingSource,
    ParameterMapping, ParameterMappings, ResolvedParameters, CONDITION_NOT_MET, TRIGGERS,
};
