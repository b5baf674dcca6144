// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for WASM module validation.
//!
//! This module contains message types for logging events related to:
//! * Structural validation of untrusted modules
//! * Non-fatal findings (size, start function, suspicious patterns)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// WASM module validation finished.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use hashlinks::observability::messages::wasm::ModuleValidated;
///
/// let msg = ModuleValidated {
///     size_bytes: 4096,
///     error_count: 0,
///     warning_count: 0,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleValidated {
    pub size_bytes: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

impl Display for ModuleValidated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Validated WASM module ({} bytes): {} errors, {} warnings",
            self.size_bytes, self.error_count, self.warning_count
        )
    }
}

impl StructuredLog for ModuleValidated {
    fn log(&self) {
        tracing::info!(
            size_bytes = self.size_bytes,
            error_count = self.error_count,
            warning_count = self.warning_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("wasm_validation", span_name = name, size_bytes = self.size_bytes)
    }
}

/// Non-fatal validation finding.
///
/// # Log Level
/// `warn!`
pub struct ValidationWarning<'a> {
    pub warning: &'a str,
}

impl Display for ValidationWarning<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "WASM validation warning: {}", self.warning)
    }
}
