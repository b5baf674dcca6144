// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::assembly::ValueType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events a binding may be attached to.
pub const TRIGGERS: [&str; 4] = ["onClick", "onSubmit", "onChange", "onLoad"];

/// Reason reported when a binding's condition evaluates to false.
pub const CONDITION_NOT_MET: &str = "Condition not met";

/// Where a parameter's value comes from at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum MappingSource {
    /// Dotted path into the block's attributes.
    Attributes { field: String },
    /// Dotted path into results of earlier actions. Not checked until execution.
    ActionResults { field: String },
    /// The action parameter's declared default.
    Default { value: Value },
    /// A value written directly in the binding.
    Literal { value: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterMapping {
    #[serde(flatten)]
    pub source: MappingSource,
    /// Target type; resolved values are coerced to it.
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl ParameterMapping {
    pub fn new(source: MappingSource, value_type: ValueType) -> Self {
        Self { source, value_type }
    }
}

pub type ParameterMappings = IndexMap<String, ParameterMapping>;

/// Resolved action parameters. Every mapped key is present; `None` means the
/// source path did not resolve.
pub type ResolvedParameters = IndexMap<String, Option<Value>>;

/// Wiring from a block to an action.
///
/// Parameter values of the form `{{attributes.path}}` or
/// `{{actionResults.path}}` are templates; anything else is a literal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub action: String,
    #[serde(default)]
    pub parameters: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_as: Option<String>,
}

impl Binding {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingResult {
    pub is_valid: bool,
    pub mapping: ParameterMappings,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub conditional_execution: bool,
}

/// Live state of a block instance that bindings read from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockState {
    #[serde(default)]
    pub attributes: Value,
    #[serde(default)]
    pub action_results: Value,
}

impl BlockState {
    pub fn new(attributes: Value) -> Self {
        Self {
            attributes,
            action_results: Value::Null,
        }
    }

    pub fn with_action_results(mut self, action_results: Value) -> Self {
        self.action_results = action_results;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            ..Default::default()
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            success: true,
            skipped: true,
            reason: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
