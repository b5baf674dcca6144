// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message channel implementations.

mod memory;

pub use memory::InMemoryChannel;
