// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use base64::Engine as _;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Declared type of a block attribute or action parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Any => "any",
        };
        f.write_str(name)
    }
}

/// Schema for one block attribute. Object attributes nest their children
/// under `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, AttributeDefinition>>,
}

impl AttributeDefinition {
    pub fn of(value_type: ValueType) -> Self {
        Self {
            value_type,
            default: None,
            description: None,
            properties: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

impl ActionDefinition {
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// A block slot inside an assembly. `error` is set when the block could not
/// be resolved upstream; such a block never becomes ready.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyBlock {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<BlockDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssemblyBlock {
    pub fn version(&self) -> Option<&str> {
        self.definition.as_ref().and_then(|d| d.version.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyAction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<ActionDefinition>,
    /// Compiled WASM module. Serialized as base64.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_module",
        deserialize_with = "deserialize_module"
    )]
    pub module: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssemblyAction {
    pub fn version(&self) -> Option<&str> {
        self.definition.as_ref().and_then(|d| d.version.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assembly {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub blocks: Vec<AssemblyBlock>,
    #[serde(default)]
    pub actions: Vec<AssemblyAction>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Assembly {
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn block(&self, id: &str) -> Option<&AssemblyBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn action(&self, id: &str) -> Option<&AssemblyAction> {
        self.actions.iter().find(|a| a.id == id)
    }
}

fn serialize_module<S>(module: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match module {
        Some(bytes) => {
            serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
        }
        None => serializer.serialize_none(),
    }
}

fn deserialize_module<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded: Option<String> = Option::deserialize(deserializer)?;
    encoded
        .map(|s| {
            base64::engine::general_purpose::STANDARD
                .decode(s.trim())
                .map_err(serde::de::Error::custom)
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_module_round_trips_through_base64() {
        let action = AssemblyAction {
            id: "counter-actions".to_string(),
            module: Some(vec![0x00, 0x61, 0x73, 0x6d]),
            ..Default::default()
        };

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["module"], "AGFzbQ==");

        let decoded: AssemblyAction = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.module, Some(vec![0x00, 0x61, 0x73, 0x6d]));
    }

    #[test]
    fn test_assembly_from_yaml() {
        let yaml = r#"
id: demo
name: Counter Demo
version: 1.0.0
dependencies: [wallet]
blocks:
  - id: counter
    definition:
      name: counter
      version: "1.0.0"
      attributes:
        count: { type: number, default: 0 }
        settings:
          type: object
          properties:
            step: { type: number }
actions:
  - id: counter-actions
    definition:
      name: counter-actions
      parameters:
        - { name: amount, type: number, default: 1 }
        - { name: count, type: number, required: true }
"#;
        let assembly: Assembly = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(assembly.dependencies, vec!["wallet"]);
        assert_eq!(assembly.block("counter").unwrap().version(), Some("1.0.0"));

        let action = assembly.action("counter-actions").unwrap();
        let count = action.definition.as_ref().unwrap().parameter("count").unwrap();
        assert!(count.required);
        assert_eq!(count.value_type, ValueType::Number);
        assert!(action.module.is_none());
    }
}
