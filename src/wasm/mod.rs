// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Static validation of untrusted WASM modules.
//!
//! Blocks and actions ship their logic as WASM modules fetched from public
//! channels. Nothing here executes a module; the validator only inspects the
//! binary (header, imports, exports, memory, size) before a component is
//! allowed to become ready.

mod error;
mod validator;

pub use error::{WasmError, WasmResult};
pub use validator::{
    WasmModuleInfo, WasmValidationResult, WasmValidator, ALLOWED_IMPORTS, REQUIRED_EXPORTS,
    SUSPICIOUS_PATTERNS, WASM_MAGIC, WASM_VERSION,
};
