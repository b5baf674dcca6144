// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Block-to-action parameter mapping and binding execution.
//!
//! Mapping is checked once, when a binding is attached: every template must
//! point at a declared attribute whose type matches the parameter. Execution
//! then only has to look values up in live block state and coerce them.

use crate::assembly::{ActionDefinition, AttributeDefinition, BlockDefinition, ValueType};
use crate::binding::coercion::{coerce, to_display_string};
use crate::binding::expression;
use crate::binding::types::{
    Binding, BindingValidation, BlockState, ExecutionResult, MappingResult, MappingSource,
    ParameterMapping, ParameterMappings, ResolvedParameters, CONDITION_NOT_MET, TRIGGERS,
};
use crate::observability::messages::binding::{
    BindingExecutionFailed, BindingSkipped, ConditionRejected, MappingCreated,
};
use crate::observability::messages::StructuredLog;
use crate::traits::ActionExecutor;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const ATTRIBUTES: &str = "attributes";
const ACTION_RESULTS: &str = "actionResults";

/// A whole parameter value of the form `{{source.path}}`.
fn template_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\{\{\s*([^{}]+?)\s*\}\}$").expect("valid template regex"))
}

/// State references embedded in a condition.
fn condition_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*(attributes|actionResults)\.([^{}]+?)\s*\}\}")
            .expect("valid condition regex")
    })
}

#[derive(Debug, Default, Clone)]
pub struct BindingManager;

impl BindingManager {
    pub fn new() -> Self {
        Self
    }

    /// Check `binding` against both schemas and build the parameter mapping.
    ///
    /// Every problem is collected; the result is valid only when none were found.
    pub fn create_parameter_mapping(
        &self,
        block: &BlockDefinition,
        action: &ActionDefinition,
        binding: &Binding,
    ) -> MappingResult {
        let attributes = flatten_attributes(&block.attributes);
        let mut mapping = ParameterMappings::new();
        let mut errors = Vec::new();

        for (name, value) in &binding.parameters {
            let Some(parameter) = action.parameter(name) else {
                errors.push(format!("Parameter \"{name}\" does not exist in action definition"));
                continue;
            };

            let Some(expression) = template_expression(value) else {
                mapping.insert(
                    name.clone(),
                    ParameterMapping::new(
                        MappingSource::Literal {
                            value: value.clone(),
                        },
                        parameter.value_type,
                    ),
                );
                continue;
            };

            let (source, path) = expression.split_once('.').unwrap_or((expression, ""));
            let source = match source {
                ATTRIBUTES => {
                    let Some(attribute) = attributes.get(path) else {
                        errors.push(format!("Attribute \"{path}\" not found in block definition"));
                        continue;
                    };
                    if !is_compatible(attribute.value_type, parameter.value_type) {
                        errors.push(format!(
                            "Parameter \"{}\" expects {} but receives {} from \"{}\"",
                            name, parameter.value_type, attribute.value_type, expression
                        ));
                        continue;
                    }
                    MappingSource::Attributes {
                        field: path.to_string(),
                    }
                }
                ACTION_RESULTS => MappingSource::ActionResults {
                    field: path.to_string(),
                },
                other => {
                    errors.push(format!(
                        "Unknown binding source \"{other}\" in \"{expression}\""
                    ));
                    continue;
                }
            };
            mapping.insert(
                name.clone(),
                ParameterMapping::new(source, parameter.value_type),
            );
        }

        for parameter in &action.parameters {
            if mapping.contains_key(&parameter.name) || binding.parameters.contains_key(&parameter.name) {
                continue;
            }
            if parameter.required {
                errors.push(format!("Required parameter \"{}\" is not mapped", parameter.name));
            } else if let Some(default) = &parameter.default {
                mapping.insert(
                    parameter.name.clone(),
                    ParameterMapping::new(
                        MappingSource::Default {
                            value: default.clone(),
                        },
                        parameter.value_type,
                    ),
                );
            }
        }

        tracing::debug!(
            "{}",
            MappingCreated {
                block: &block.name,
                action: &action.name,
                mapped: mapping.len(),
                error_count: errors.len(),
            }
        );

        MappingResult {
            is_valid: errors.is_empty(),
            mapping,
            errors,
        }
    }

    /// Structural check of a binding against its action, independent of any block.
    pub fn validate_binding(&self, action: &ActionDefinition, binding: &Binding) -> BindingValidation {
        let mut errors: Vec<String> = binding
            .parameters
            .keys()
            .filter(|name| action.parameter(name).is_none())
            .map(|name| format!("Parameter \"{name}\" does not exist in action definition"))
            .collect();

        if let Some(trigger) = &binding.trigger {
            if !TRIGGERS.contains(&trigger.as_str()) {
                errors.push(format!(
                    "Invalid trigger \"{}\". Must be one of: {}",
                    trigger,
                    TRIGGERS.join(", ")
                ));
            }
        }

        BindingValidation {
            is_valid: errors.is_empty(),
            errors,
            conditional_execution: binding.condition.is_some(),
        }
    }

    /// Look every mapped parameter up in `state` and coerce it to its declared type.
    ///
    /// Keys whose source path is missing are kept with a `None` value.
    pub fn resolve_parameters(&self, state: &BlockState, mapping: &ParameterMappings) -> ResolvedParameters {
        mapping
            .iter()
            .map(|(name, entry)| {
                let raw = match &entry.source {
                    MappingSource::Attributes { field } => lookup(&state.attributes, field).cloned(),
                    MappingSource::ActionResults { field } => lookup(&state.action_results, field).cloned(),
                    MappingSource::Default { value } | MappingSource::Literal { value } => Some(value.clone()),
                };
                (name.clone(), coerce(raw, entry.value_type))
            })
            .collect()
    }

    /// Evaluate the binding's condition, then invoke `executor` with resolved parameters.
    ///
    /// Never fails: a false condition yields a skipped result and an executor
    /// error becomes `success: false`.
    pub async fn execute_binding<E>(
        &self,
        binding: &Binding,
        state: &BlockState,
        mapping: &ParameterMappings,
        executor: &E,
    ) -> ExecutionResult
    where
        E: ActionExecutor + ?Sized,
    {
        if let Some(condition) = &binding.condition {
            if !self.evaluate_condition(condition, state) {
                tracing::debug!(
                    "{}",
                    BindingSkipped {
                        action: &binding.action,
                        condition,
                    }
                );
                return ExecutionResult::skipped(CONDITION_NOT_MET);
            }
        }

        let parameters = self.resolve_parameters(state, mapping);
        match executor.execute(&binding.action, &parameters).await {
            Ok(result) => result,
            Err(e) => {
                let error = e.to_string();
                BindingExecutionFailed {
                    action: &binding.action,
                    error: &error,
                }
                .log();
                ExecutionResult::failed(error)
            }
        }
    }

    /// Substitute state references into `condition` and evaluate it.
    ///
    /// Anything that does not evaluate cleanly counts as false.
    pub fn evaluate_condition(&self, condition: &str, state: &BlockState) -> bool {
        let substituted = condition_reference_pattern().replace_all(condition, |captures: &regex::Captures| {
            let root = if &captures[1] == ATTRIBUTES {
                &state.attributes
            } else {
                &state.action_results
            };
            lookup(root, &captures[2]).map_or_else(|| "undefined".to_string(), to_display_string)
        });

        match expression::evaluate(&substituted) {
            Ok(result) => result,
            Err(e) => {
                ConditionRejected {
                    condition,
                    substituted: &substituted,
                    reason: &e.to_string(),
                }
                .log();
                false
            }
        }
    }
}

/// The inner `source.path` of a template value, if `value` is one.
fn template_expression(value: &Value) -> Option<&str> {
    let text = value.as_str()?;
    template_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Attribute schema keyed by dotted path; object attributes appear alongside
/// their nested properties.
fn flatten_attributes(attributes: &IndexMap<String, AttributeDefinition>) -> IndexMap<String, &AttributeDefinition> {
    let mut flat = IndexMap::new();
    flatten_into(attributes, "", &mut flat);
    flat
}

fn flatten_into<'a>(
    attributes: &'a IndexMap<String, AttributeDefinition>,
    prefix: &str,
    flat: &mut IndexMap<String, &'a AttributeDefinition>,
) {
    for (name, attribute) in attributes {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        if let Some(properties) = &attribute.properties {
            flatten_into(properties, &key, flat);
        }
        flat.insert(key, attribute);
    }
}

fn is_compatible(source: ValueType, target: ValueType) -> bool {
    source == target || target == ValueType::Any
}

/// Walk a dotted path through objects and arrays; `None` as soon as a segment is missing.
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::ParameterDefinition;
    use crate::errors::CollaboratorError;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn parameter(name: &str, value_type: ValueType, required: bool, default: Option<Value>) -> ParameterDefinition {
        ParameterDefinition {
            name: name.to_string(),
            value_type,
            required,
            default,
            description: None,
        }
    }

    fn transfer_block() -> BlockDefinition {
        let mut recipient = AttributeDefinition::of(ValueType::Object);
        recipient.properties = Some(IndexMap::from([
            ("account".to_string(), AttributeDefinition::of(ValueType::String)),
            ("memo".to_string(), AttributeDefinition::of(ValueType::String)),
        ]));

        BlockDefinition {
            name: "transfer-form".to_string(),
            attributes: IndexMap::from([
                ("amount".to_string(), AttributeDefinition::of(ValueType::String)),
                ("limit".to_string(), AttributeDefinition::of(ValueType::Number)),
                ("recipient".to_string(), recipient),
            ]),
            ..Default::default()
        }
    }

    fn transfer_action() -> ActionDefinition {
        ActionDefinition {
            name: "transfer".to_string(),
            version: Some("1.0.0".to_string()),
            parameters: vec![
                parameter("value", ValueType::Number, true, None),
                parameter("to", ValueType::String, true, None),
                parameter("memo", ValueType::String, false, None),
                parameter("fee", ValueType::Number, false, Some(json!(1))),
            ],
        }
    }

    #[test]
    fn test_type_mismatch_is_rejected_at_mapping_time() {
        let binding = Binding::new("transfer")
            .with_parameter("value", "{{attributes.amount}}")
            .with_parameter("to", "{{attributes.recipient.account}}");

        let result = BindingManager::new().create_parameter_mapping(&transfer_block(), &transfer_action(), &binding);

        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec![r#"Parameter "value" expects number but receives string from "attributes.amount""#]
        );
        assert_eq!(
            result.mapping["to"].source,
            MappingSource::Attributes {
                field: "recipient.account".to_string()
            }
        );
    }

    #[test]
    fn test_mapping_sources() {
        let binding = Binding::new("transfer")
            .with_parameter("value", "{{ attributes.limit }}")
            .with_parameter("to", "0.0.1234")
            .with_parameter("memo", "{{actionResults.lookup.memo}}");

        let result = BindingManager::new().create_parameter_mapping(&transfer_block(), &transfer_action(), &binding);

        assert!(result.is_valid, "{:?}", result.errors);
        let keys: Vec<&str> = result.mapping.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["value", "to", "memo", "fee"]);
        assert_eq!(
            result.mapping["to"],
            ParameterMapping::new(MappingSource::Literal { value: json!("0.0.1234") }, ValueType::String)
        );
        assert_eq!(
            result.mapping["memo"].source,
            MappingSource::ActionResults {
                field: "lookup.memo".to_string()
            }
        );
        assert_eq!(
            result.mapping["fee"],
            ParameterMapping::new(MappingSource::Default { value: json!(1) }, ValueType::Number)
        );
    }

    #[test]
    fn test_mapping_reports_every_problem() {
        let binding = Binding::new("transfer")
            .with_parameter("amount", 5)
            .with_parameter("to", "{{attributes.recipient.iban}}")
            .with_parameter("memo", "{{state.memo}}");

        let result = BindingManager::new().create_parameter_mapping(&transfer_block(), &transfer_action(), &binding);

        assert_eq!(
            result.errors,
            vec![
                r#"Parameter "amount" does not exist in action definition"#,
                r#"Attribute "recipient.iban" not found in block definition"#,
                r#"Unknown binding source "state" in "state.memo""#,
                r#"Required parameter "value" is not mapped"#,
            ]
        );
    }

    #[test]
    fn test_validate_binding() {
        let manager = BindingManager::new();
        let action = transfer_action();

        let ok = manager.validate_binding(
            &action,
            &Binding::new("transfer").with_parameter("value", 1).with_trigger("onSubmit"),
        );
        assert_eq!(
            ok,
            BindingValidation {
                is_valid: true,
                errors: vec![],
                conditional_execution: false
            }
        );

        let bad = manager.validate_binding(
            &action,
            &Binding::new("transfer")
                .with_parameter("speed", 1)
                .with_trigger("onHover")
                .with_condition("{{attributes.limit}} > 0"),
        );
        assert!(!bad.is_valid);
        assert!(bad.conditional_execution);
        assert_eq!(
            bad.errors,
            vec![
                r#"Parameter "speed" does not exist in action definition"#,
                r#"Invalid trigger "onHover". Must be one of: onClick, onSubmit, onChange, onLoad"#,
            ]
        );
    }

    #[test]
    fn test_resolve_parameters_coerces_and_keeps_missing_keys() {
        let mapping = ParameterMappings::from([
            (
                "value".to_string(),
                ParameterMapping::new(MappingSource::Attributes { field: "amount".to_string() }, ValueType::Number),
            ),
            (
                "to".to_string(),
                ParameterMapping::new(
                    MappingSource::Attributes { field: "recipient.account".to_string() },
                    ValueType::String,
                ),
            ),
            (
                "memo".to_string(),
                ParameterMapping::new(
                    MappingSource::ActionResults { field: "lookup.memo".to_string() },
                    ValueType::String,
                ),
            ),
            (
                "first".to_string(),
                ParameterMapping::new(
                    MappingSource::Attributes { field: "history.0".to_string() },
                    ValueType::Number,
                ),
            ),
            (
                "fee".to_string(),
                ParameterMapping::new(MappingSource::Default { value: json!("2") }, ValueType::Number),
            ),
        ]);
        let state = BlockState::new(json!({
            "amount": "250",
            "recipient": {"account": 12345},
            "history": [7, 8]
        }));

        let resolved = BindingManager::new().resolve_parameters(&state, &mapping);

        assert_eq!(resolved["value"], Some(json!(250)));
        assert_eq!(resolved["to"], Some(json!("12345")));
        assert_eq!(resolved["memo"], None);
        assert_eq!(resolved["first"], Some(json!(7)));
        assert_eq!(resolved["fee"], Some(json!(2)));
        assert_eq!(resolved.len(), 5);
    }

    #[test]
    fn test_condition_evaluation() {
        let manager = BindingManager::new();
        let state = BlockState::new(json!({"amount": 100, "enabled": true, "name": "alice"}))
            .with_action_results(json!({"check": {"passed": false}}));

        assert!(manager.evaluate_condition("{{attributes.amount}} > 50", &state));
        assert!(manager.evaluate_condition("{{attributes.enabled}} && {{attributes.amount}} % 2 == 0", &state));
        assert!(!manager.evaluate_condition("{{actionResults.check.passed}}", &state));
        assert!(manager.evaluate_condition("{{attributes.missing}} == null", &state));
        // strings do not evaluate, so the condition fails closed
        assert!(!manager.evaluate_condition("{{attributes.name}} == {{attributes.name}}", &state));
        assert!(!manager.evaluate_condition("{{attributes.amount}} > ", &state));
    }

    #[tokio::test]
    async fn test_conditional_binding_gates_the_executor() {
        let manager = BindingManager::new();
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let executor = move |action: String, parameters: ResolvedParameters| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CollaboratorError>(ExecutionResult::ok(json!({"action": action, "value": parameters["value"]})))
        };
        let binding = Binding::new("transfer")
            .with_parameter("value", "{{attributes.amount}}")
            .with_condition("{{attributes.amount}} > 50");
        let mapping = ParameterMappings::from([(
            "value".to_string(),
            ParameterMapping::new(MappingSource::Attributes { field: "amount".to_string() }, ValueType::Number),
        )]);

        let executed = manager
            .execute_binding(&binding, &BlockState::new(json!({"amount": 100})), &mapping, &executor)
            .await;
        assert_eq!(executed, ExecutionResult::ok(json!({"action": "transfer", "value": 100})));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let skipped = manager
            .execute_binding(&binding, &BlockState::new(json!({"amount": 10})), &mapping, &executor)
            .await;
        assert_eq!(skipped, ExecutionResult::skipped("Condition not met"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hostile_conditions_fail_closed() {
        let manager = BindingManager::new();
        let state = BlockState::new(json!({"x": "process.exit()", "amount": 100}));

        assert!(!manager.evaluate_condition(&format!("{}1", "!".repeat(5_000)), &state));
        assert!(!manager.evaluate_condition(
            &format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000)),
            &state
        ));
        assert!(!manager.evaluate_condition(&format!("{} > 0", "1".repeat(10_000)), &state));
        assert!(!manager.evaluate_condition("{{attributes.x}}", &state));
        assert!(!manager.evaluate_condition("{{attributes.amount}} > 50 || {{attributes.x}}", &state));
    }

    #[tokio::test]
    async fn test_injected_condition_skips_the_executor() {
        let manager = BindingManager::new();
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let executor = move |_action: String, _parameters: ResolvedParameters| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, CollaboratorError>(ExecutionResult::ok(json!(null)))
        };
        let state = BlockState::new(json!({"x": "process.exit()"}));

        for condition in [
            "{{attributes.x}}".to_string(),
            format!("{}1", "!".repeat(5_000)),
            format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000)),
        ] {
            let binding = Binding::new("transfer").with_condition(condition);
            let result = manager
                .execute_binding(&binding, &state, &ParameterMappings::new(), &executor)
                .await;
            assert!(result.skipped);
            assert_eq!(result, ExecutionResult::skipped("Condition not met"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_executor_failure_becomes_result() {
        let manager = BindingManager::new();
        let executor = |_action: String, _parameters: ResolvedParameters| async {
            Err::<ExecutionResult, _>(CollaboratorError::new("insufficient balance"))
        };

        let result = manager
            .execute_binding(
                &Binding::new("transfer"),
                &BlockState::default(),
                &ParameterMappings::new(),
                &executor,
            )
            .await;

        assert_eq!(result, ExecutionResult::failed("insufficient balance"));
    }
}
