// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `lifecycle` - assembly state transitions, dependency and component steps
//! * `binding` - parameter mapping and binding execution
//! * `layout` - layout calculation and validation
//! * `wasm` - WASM module validation
//! * `channel` - assembly registry traffic over message channels
//!
//! # Usage Pattern
//!
//! ```rust
//! use hashlinks::observability::messages::wasm::ModuleValidated;
//!
//! let msg = ModuleValidated {
//!     size_bytes: 4096,
//!     error_count: 0,
//!     warning_count: 1,
//! };
//!
//! tracing::info!("{}", msg);
//! ```

use tracing::Span;

pub mod binding;
pub mod channel;
pub mod layout;
pub mod lifecycle;
pub mod wasm;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its documented level, with structured fields.
    fn log(&self);

    /// Build a span carrying the same fields.
    fn span(&self, name: &str) -> Span;
}
