// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod assembly;      // assembly model + channel registry
pub mod binding;       // block -> action parameter wiring
pub mod channel;       // message channel implementations
pub mod config;        // engine config loading
pub mod errors;        // error handling
pub mod layout;        // layout engine
pub mod lifecycle;     // assembly state machine
pub mod observability;
pub mod traits;        // collaborator ports
pub mod wasm;          // module validation

#[cfg(test)]
mod integration_tests;
