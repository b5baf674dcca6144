// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Assemblies stored as an operation log on a message channel.
//!
//! Each message is a JSON object tagged with the protocol and an `op`:
//!
//! ```json
//! {"p": "hcs-12", "op": "register", "name": "Counter", "version": "1.0.0"}
//! {"p": "hcs-12", "op": "add-block", "block": {"id": "display"}}
//! {"p": "hcs-12", "op": "add-action", "action": {"id": "increment"}}
//! {"p": "hcs-12", "op": "update", "version": "1.1.0"}
//! ```
//!
//! Loading replays the log in sequence order. The channel id becomes the
//! assembly id.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assembly::types::{Assembly, AssemblyAction, AssemblyBlock};
use crate::errors::RegistryError;
use crate::observability::messages::channel::{MessageSkipped, OperationPublished};
use crate::traits::{MessageChannel, QueryOptions, SortOrder, SubmitReceipt};

pub const PROTOCOL: &str = "hcs-12";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum AssemblyOperation {
    Register {
        name: String,
        version: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dependencies: Vec<String>,
    },
    AddBlock {
        block: AssemblyBlock,
    },
    AddAction {
        action: AssemblyAction,
    },
    Update {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        version: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        dependencies: Option<Vec<String>>,
    },
}

impl AssemblyOperation {
    pub fn name(&self) -> &'static str {
        match self {
            AssemblyOperation::Register { .. } => "register",
            AssemblyOperation::AddBlock { .. } => "add-block",
            AssemblyOperation::AddAction { .. } => "add-action",
            AssemblyOperation::Update { .. } => "update",
        }
    }

    /// Apply this operation to a registered assembly.
    fn apply(self, assembly: &mut Assembly) -> Result<(), &'static str> {
        match self {
            AssemblyOperation::Register { .. } => return Err("assembly is already registered"),
            AssemblyOperation::AddBlock { block } => {
                match assembly.blocks.iter_mut().find(|b| b.id == block.id) {
                    Some(existing) => *existing = block,
                    None => assembly.blocks.push(block),
                }
            }
            AssemblyOperation::AddAction { action } => {
                match assembly.actions.iter_mut().find(|a| a.id == action.id) {
                    Some(existing) => *existing = action,
                    None => assembly.actions.push(action),
                }
            }
            AssemblyOperation::Update {
                name,
                version,
                dependencies,
            } => {
                if let Some(name) = name {
                    assembly.name = name;
                }
                if let Some(version) = version {
                    assembly.version = version;
                }
                if let Some(dependencies) = dependencies {
                    assembly.dependencies = dependencies;
                }
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    p: &'static str,
    #[serde(flatten)]
    operation: &'a AssemblyOperation,
}

pub struct AssemblyRegistry<C: MessageChannel> {
    channel: C,
}

impl<C: MessageChannel> AssemblyRegistry<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub async fn publish(
        &self,
        channel_id: &str,
        operation: &AssemblyOperation,
    ) -> Result<SubmitReceipt, RegistryError> {
        let payload = serde_json::to_string(&Envelope {
            p: PROTOCOL,
            operation,
        })?;
        let receipt = self.channel.submit(channel_id, &payload).await?;

        tracing::info!(
            "{}",
            OperationPublished {
                channel_id,
                op: operation.name(),
                sequence_number: receipt.sequence_number,
            }
        );
        Ok(receipt)
    }

    /// Publish `assembly` as a register operation followed by one operation
    /// per block and action.
    pub async fn publish_assembly(
        &self,
        channel_id: &str,
        assembly: &Assembly,
    ) -> Result<Vec<SubmitReceipt>, RegistryError> {
        let register = AssemblyOperation::Register {
            name: assembly.name.clone(),
            version: assembly.version.clone(),
            dependencies: assembly.dependencies.clone(),
        };
        let blocks = assembly
            .blocks
            .iter()
            .map(|block| AssemblyOperation::AddBlock { block: block.clone() });
        let actions = assembly
            .actions
            .iter()
            .map(|action| AssemblyOperation::AddAction { action: action.clone() });

        let mut receipts = Vec::new();
        for operation in std::iter::once(register).chain(blocks).chain(actions) {
            receipts.push(self.publish(channel_id, &operation).await?);
        }
        Ok(receipts)
    }

    /// Rebuild the assembly stored on `channel_id`.
    ///
    /// Messages that are not protocol operations, or that cannot be applied,
    /// are logged and skipped.
    pub async fn load(&self, channel_id: &str) -> Result<Assembly, RegistryError> {
        let messages = self
            .channel
            .query(
                channel_id,
                QueryOptions {
                    order: SortOrder::Asc,
                    ..Default::default()
                },
            )
            .await?;

        let mut assembly: Option<Assembly> = None;
        for message in messages {
            let outcome = parse_operation(&message.payload)
                .and_then(|operation| replay(&mut assembly, channel_id, operation));

            if let Err(reason) = outcome {
                tracing::warn!(
                    channel_id,
                    sequence_number = message.sequence_number,
                    "{}",
                    MessageSkipped {
                        channel_id,
                        sequence_number: message.sequence_number,
                        reason: &reason,
                    }
                );
            }
        }

        assembly.ok_or_else(|| RegistryError::NotRegistered(channel_id.to_string()))
    }
}

fn replay(
    assembly: &mut Option<Assembly>,
    channel_id: &str,
    operation: AssemblyOperation,
) -> Result<(), String> {
    if let Some(existing) = assembly.as_mut() {
        return operation.apply(existing).map_err(str::to_string);
    }
    match operation {
        AssemblyOperation::Register {
            name,
            version,
            dependencies,
        } => {
            let mut registered = Assembly::new(channel_id, name, version);
            registered.dependencies = dependencies;
            *assembly = Some(registered);
            Ok(())
        }
        _ => Err("operation precedes register".to_string()),
    }
}

fn parse_operation(payload: &str) -> Result<AssemblyOperation, String> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| format!("payload is not JSON: {e}"))?;
    if value.get("p").and_then(Value::as_str) != Some(PROTOCOL) {
        return Err(format!("not an {PROTOCOL} message"));
    }
    serde_json::from_value(value).map_err(|e| format!("invalid operation: {e}"))
}
