// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WASM module validator.
//!
//! Validation runs in a fixed order. Size checks are independent and always
//! run. Structural checks short-circuit on the first fatal header problem:
//!
//! 1. Magic number `00 61 73 6D`
//! 2. Binary version (only `1`)
//! 3. Section walk with `wasmparser`, collecting imports, exports, memory,
//!    start function and function count
//!
//! After a successful walk every remaining check runs and contributes to the
//! same result: required exports, import allow-list, memory ceiling, start
//! function and function count warnings, and a byte-level scan for
//! suspicious substrings. Warnings never affect `is_valid`.

use base64::Engine as _;
use serde::Serialize;
use sha2::{Digest, Sha256};
use wasmparser::{Parser, Payload, TypeRef};

use crate::config::WasmConfig;
use crate::observability::messages::wasm::{ModuleValidated, ValidationWarning};
use crate::observability::messages::StructuredLog;
use crate::wasm::error::{WasmError, WasmResult};

pub const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6d];
pub const WASM_VERSION: u32 = 1;

/// Exports every HashLinks module must provide.
pub const REQUIRED_EXPORTS: [&str; 3] = ["INFO", "POST", "GET"];

/// Host imports a module may request, as `module.name`.
pub const ALLOWED_IMPORTS: [&str; 4] = [
    "env.console_log",
    "env.get_network",
    "env.submit_hcs_message",
    "env.memory",
];

pub const SUSPICIOUS_PATTERNS: [&str; 3] = ["eval", "__proto__", "constructor"];

/// What the section walk found in a module.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WasmModuleInfo {
    pub size_bytes: usize,
    pub exports: Vec<String>,
    /// Imports as `module.name`.
    pub imports: Vec<String>,
    /// Largest declared initial memory, in 64 KiB pages.
    pub memory_pages: Option<u64>,
    pub function_count: u32,
    pub has_start_function: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WasmValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Present when the section walk succeeded.
    pub info: Option<WasmModuleInfo>,
}

/// Structural validator for untrusted modules.
#[derive(Debug, Clone)]
pub struct WasmValidator {
    warn_size: usize,
    max_size: usize,
    max_memory_pages: u64,
    max_function_count: u32,
}

impl Default for WasmValidator {
    fn default() -> Self {
        Self::new(&WasmConfig::default())
    }
}

impl WasmValidator {
    pub fn new(config: &WasmConfig) -> Self {
        Self {
            warn_size: config.get_warn_size(),
            max_size: config.get_max_size(),
            max_memory_pages: config.get_max_memory_pages(),
            max_function_count: config.get_max_function_count(),
        }
    }

    /// Validate a module. Never fails; every problem is reported in the result.
    pub fn validate(&self, module: &[u8]) -> WasmValidationResult {
        let mut result = WasmValidationResult::default();

        if module.len() > self.max_size {
            result.errors.push(format!(
                "Module size {} bytes exceeds maximum of {} bytes",
                module.len(),
                self.max_size
            ));
        } else if module.len() > self.warn_size {
            result.warnings.push(format!(
                "Module size {} bytes is larger than recommended {} bytes",
                module.len(),
                self.warn_size
            ));
        }

        if let Err(header_error) = check_header(module) {
            result.errors.push(header_error);
            return self.finish(module, result);
        }

        let info = match inspect(module) {
            Ok(info) => info,
            Err(e) => {
                result.errors.push(e.to_string());
                return self.finish(module, result);
            }
        };

        for required in REQUIRED_EXPORTS {
            if !info.exports.iter().any(|e| e == required) {
                result
                    .errors
                    .push(format!("Missing required export: {required}"));
            }
        }

        for import in &info.imports {
            if !ALLOWED_IMPORTS.contains(&import.as_str()) {
                result.errors.push(format!("Import not allowed: {import}"));
            }
        }

        if let Some(pages) = info.memory_pages {
            if pages > self.max_memory_pages {
                result.errors.push(format!(
                    "Initial memory of {} pages exceeds maximum of {} pages",
                    pages, self.max_memory_pages
                ));
            }
        }

        if info.has_start_function {
            result
                .warnings
                .push("Module declares a start function".to_string());
        }

        if info.function_count > self.max_function_count {
            result.warnings.push(format!(
                "Module declares {} functions (more than {})",
                info.function_count, self.max_function_count
            ));
        }

        for pattern in SUSPICIOUS_PATTERNS {
            if contains_bytes(module, pattern.as_bytes()) {
                result
                    .warnings
                    .push(format!("Suspicious pattern found: {pattern}"));
            }
        }

        result.info = Some(info);
        self.finish(module, result)
    }

    /// Decode a base64 payload and validate the module it carries.
    pub fn validate_base64(&self, encoded: &str) -> WasmValidationResult {
        match decode_base64(encoded) {
            Ok(bytes) => self.validate(&bytes),
            Err(e) => {
                let result = WasmValidationResult {
                    errors: vec![e.to_string()],
                    ..Default::default()
                };
                self.finish(&[], result)
            }
        }
    }

    /// SHA-256 of the module bytes, hex encoded.
    pub fn calculate_hash(module: &[u8]) -> String {
        hex::encode(Sha256::digest(module))
    }

    fn finish(&self, module: &[u8], mut result: WasmValidationResult) -> WasmValidationResult {
        result.is_valid = result.errors.is_empty();

        for warning in &result.warnings {
            tracing::warn!("{}", ValidationWarning { warning });
        }
        ModuleValidated {
            size_bytes: module.len(),
            error_count: result.errors.len(),
            warning_count: result.warnings.len(),
        }
        .log();

        result
    }
}

fn check_header(module: &[u8]) -> Result<(), String> {
    if module.len() < 8 {
        return Err(format!(
            "Module too small to be a valid WASM binary ({} bytes)",
            module.len()
        ));
    }
    if module[0..4] != WASM_MAGIC {
        return Err("Invalid WASM magic number".to_string());
    }
    let version = u32::from_le_bytes([module[4], module[5], module[6], module[7]]);
    if version != WASM_VERSION {
        return Err(format!("Unsupported WASM version: {version}"));
    }
    Ok(())
}

fn inspect(module: &[u8]) -> WasmResult<WasmModuleInfo> {
    let mut info = WasmModuleInfo {
        size_bytes: module.len(),
        ..Default::default()
    };
    let mut saw_version = false;

    for payload in Parser::new(0).parse_all(module) {
        match payload? {
            Payload::Version { .. } => saw_version = true,
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import?;
                    if let TypeRef::Memory(memory) = import.ty {
                        track_memory(&mut info, memory.initial);
                    }
                    info.imports.push(format!("{}.{}", import.module, import.name));
                }
            }
            Payload::ExportSection(reader) => {
                for export in reader {
                    info.exports.push(export?.name.to_string());
                }
            }
            Payload::MemorySection(reader) => {
                for memory in reader {
                    track_memory(&mut info, memory?.initial);
                }
            }
            Payload::FunctionSection(reader) => info.function_count = reader.count(),
            Payload::StartSection { .. } => info.has_start_function = true,
            _ => {}
        }
    }

    if !saw_version {
        return Err(WasmError::InvalidWasmBinary("missing version header".to_string()));
    }

    Ok(info)
}

fn track_memory(info: &mut WasmModuleInfo, initial: u64) {
    info.memory_pages = Some(info.memory_pages.map_or(initial, |pages| pages.max(initial)));
}

fn decode_base64(encoded: &str) -> WasmResult<Vec<u8>> {
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}

fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    !needle.is_empty() && haystack.windows(needle.len()).any(|w| w == needle)
}
