// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic output in the crate goes through the message types in
//! [`messages`]. Each message is a small struct implementing `Display`, so log
//! text lives in one place instead of being scattered through the engines as
//! format strings.
//!
//! # Usage
//!
//! ```rust
//! use hashlinks::observability::messages::lifecycle::StateTransition;
//! use hashlinks::observability::messages::StructuredLog;
//!
//! let msg = StateTransition {
//!     assembly_id: "0.0.12345",
//!     old_state: "initializing",
//!     new_state: "initialized",
//! };
//!
//! msg.log();
//! ```

pub mod messages;

/// Install a `tracing-subscriber` formatter honouring `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset or invalid. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
