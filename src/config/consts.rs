// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Modules above this size validate with a warning (1 MiB)
pub const DEFAULT_WASM_WARN_SIZE: usize = 1024 * 1024;
/// Modules above this size fail validation (5 MiB)
pub const DEFAULT_WASM_MAX_SIZE: usize = 5 * 1024 * 1024;
/// Ceiling on declared initial memory, in 64 KiB pages (16 MiB)
pub const DEFAULT_WASM_MAX_MEMORY_PAGES: u64 = 256;
/// Function counts above this produce a warning
pub const DEFAULT_WASM_MAX_FUNCTION_COUNT: u32 = 10_000;

/// Default transition duration in milliseconds
pub const DEFAULT_TRANSITION_DURATION_MS: u64 = 300;
pub const DEFAULT_TRANSITION_EASING: &str = "ease-in-out";

/// Upper bound of the built-in `mobile` breakpoint
pub const MOBILE_MAX_WIDTH: f64 = 768.0;
/// Upper bound of the built-in `tablet` breakpoint
pub const TABLET_MAX_WIDTH: f64 = 1024.0;
