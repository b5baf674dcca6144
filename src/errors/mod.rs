// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod channel;
mod collaborator;
mod config;
mod expression;
mod layout;
mod lifecycle;
mod registry;

pub use channel::ChannelError;
pub use collaborator::CollaboratorError;
pub use config::ConfigError;
pub use expression::ExpressionError;
pub use layout::LayoutIssue;
pub use lifecycle::LifecycleError;
pub use registry::RegistryError;
