// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for WASM inspection.
//!
//! These errors stay internal to the validator: every one of them ends up as
//! a string in `WasmValidationResult::errors` rather than being returned to
//! the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WasmError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// WASM binary parsing error from wasmparser.
    #[error("Failed to parse WASM module: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),

    /// Module payload was not valid base64.
    #[error("Invalid base64 module payload: {0}")]
    Base64Error(#[from] base64::DecodeError),
}

/// Result type alias for WASM operations.
pub type WasmResult<T> = Result<T, WasmError>;
