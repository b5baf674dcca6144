// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! End-to-end checks across the registry, lifecycle, layout and binding layers.

use crate::assembly::{Assembly, AssemblyAction, AssemblyOperation, AssemblyRegistry};
use crate::binding::{Binding, BindingManager, BlockState, ExecutionResult, ResolvedParameters};
use crate::channel::InMemoryChannel;
use crate::config::load_and_validate_config;
use crate::errors::CollaboratorError;
use crate::layout::{ComponentLayout, Container, LayoutEngine};
use crate::lifecycle::{AssemblyState, ComponentState, LifecycleManager, PartialFailureMode};
use crate::traits::{MessageChannel, QueryOptions};
use crate::wasm::WasmValidator;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const ENGINE_CONFIG: &str = "configs/engine.yaml";
const COUNTER_ASSEMBLY: &str = "configs/counter-assembly.yaml";

#[derive(Deserialize)]
struct CounterDescription {
    channel: String,
    assembly: Assembly,
    layout: Vec<ComponentLayout>,
    bindings: Vec<CounterBinding>,
}

#[derive(Deserialize)]
struct CounterBinding {
    block: String,
    #[serde(default)]
    state: BlockState,
    #[serde(flatten)]
    binding: Binding,
}

fn counter_description() -> CounterDescription {
    let source = std::fs::read_to_string(COUNTER_ASSEMBLY).unwrap();
    serde_yaml::from_str(&source).unwrap()
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 0.01, "expected {expected}, got {actual}");
}

async fn counter_executor(
    action: String,
    parameters: ResolvedParameters,
) -> Result<ExecutionResult, CollaboratorError> {
    let number = |name: &str| parameters.get(name).cloned().flatten().and_then(|v| v.as_f64());
    let count = number("count").unwrap_or(0.0);
    let amount = number("amount").unwrap_or(1.0);
    match action.as_str() {
        "increment" => Ok(ExecutionResult::ok(json!({ "count": count + amount }))),
        "decrement" => Ok(ExecutionResult::ok(json!({ "count": count - amount }))),
        other => Err(CollaboratorError::new(format!("unknown action '{other}'"))),
    }
}

#[test]
fn test_engine_config_file_loads() {
    let config = load_and_validate_config(ENGINE_CONFIG).unwrap();

    assert_eq!(config.lifecycle.partial_failure_mode, PartialFailureMode::Continue);
    assert_eq!(config.lifecycle.retry.as_ref().unwrap().max_retries, 3);
    assert_eq!(config.wasm.get_max_memory_pages(), 256);

    let engine = LayoutEngine::new(&config.layout);
    let names: Vec<&str> = engine.breakpoints().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["mobile", "tablet", "desktop"]);
}

#[tokio::test]
async fn test_counter_assembly_end_to_end() {
    let config = load_and_validate_config(ENGINE_CONFIG).unwrap();
    let description = counter_description();

    let registry = AssemblyRegistry::new(InMemoryChannel::new());
    registry
        .publish_assembly(&description.channel, &description.assembly)
        .await
        .unwrap();
    let assembly = registry.load(&description.channel).await.unwrap();
    assert_eq!(assembly.id, "0.0.4821");
    assert_eq!(assembly.blocks, description.assembly.blocks);
    assert_eq!(assembly.actions, description.assembly.actions);

    let lifecycle = LifecycleManager::new(&config);
    let initialized = lifecycle.initialize_assembly(&assembly, None).await;
    assert!(initialized.success, "{:?}", initialized.errors);
    assert_eq!(
        initialized.ready_components,
        vec!["wallet", "display", "button", "increment", "decrement", "reset"]
    );
    let status = lifecycle.get_assembly_status(&assembly.id).await.unwrap();
    assert_eq!(status.state, AssemblyState::Initialized);
    assert_eq!(status.ready_count(), 6);

    let engine = LayoutEngine::new(&config.layout);
    let layout = engine.calculate_layout(&description.layout, Container::new(1024.0, 768.0));
    assert!(layout.is_valid, "{:?}", layout.errors);
    assert_eq!(layout.active_breakpoint.as_deref(), Some("tablet"));

    let header = layout.layouts["header"];
    assert_close(header.height, 80.0);
    assert_close(header.width, 1024.0);
    let body = layout.layouts["body"];
    assert_close(body.y, 96.0);
    assert_close(body.height, 672.0);
    let sidebar = layout.layouts["sidebar"];
    assert_close(sidebar.width, 240.0);
    assert_close(sidebar.y, 96.0);
    let counter = layout.layouts["counter"];
    assert_close(counter.x, 256.0);
    assert_close(counter.width, 640.0);

    let manager = BindingManager::new();
    let mut outcomes = Vec::new();
    for entry in &description.bindings {
        let block = assembly.block(&entry.block).unwrap().definition.as_ref().unwrap();
        let action = assembly.action(&entry.binding.action).unwrap().definition.as_ref().unwrap();

        let validation = manager.validate_binding(action, &entry.binding);
        if !validation.is_valid {
            outcomes.push(ExecutionResult::failed(validation.errors.join("; ")));
            continue;
        }
        let mapping = manager.create_parameter_mapping(block, action, &entry.binding);
        assert!(mapping.is_valid, "{:?}", mapping.errors);
        outcomes.push(
            manager
                .execute_binding(&entry.binding, &entry.state, &mapping.mapping, &counter_executor)
                .await,
        );
    }

    assert_eq!(
        outcomes,
        vec![
            ExecutionResult::ok(json!({"count": 6.0})),
            ExecutionResult::skipped("Condition not met"),
            ExecutionResult::ok(json!({"count": 6.0})),
            ExecutionResult::failed(
                r#"Invalid trigger "onHover". Must be one of: onClick, onSubmit, onChange, onLoad"#
            ),
        ]
    );

    let cleanup = lifecycle.cleanup_assembly(&assembly.id).await;
    assert!(cleanup.success);
    assert!(lifecycle.get_assembly_status(&assembly.id).await.is_none());
}

#[test]
fn test_sidebar_hidden_on_mobile() {
    let config = load_and_validate_config(ENGINE_CONFIG).unwrap();
    let description = counter_description();

    let layout = LayoutEngine::new(&config.layout)
        .calculate_layout(&description.layout, Container::new(600.0, 900.0));

    assert_eq!(layout.active_breakpoint.as_deref(), Some("mobile"));
    assert!(!layout.visibility["sidebar"]);
    assert_eq!(layout.layouts["sidebar"].width, 0.0);
    assert!(layout.visibility["counter"]);
}

#[tokio::test]
async fn test_channel_update_drives_lifecycle_update() {
    let description = counter_description();
    let registry = AssemblyRegistry::new(InMemoryChannel::new());
    registry
        .publish_assembly(&description.channel, &description.assembly)
        .await
        .unwrap();

    let lifecycle = LifecycleManager::default();
    let states = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&states);
    lifecycle.on_state_changed(move |event| {
        sink.lock().unwrap().push(event.new_state);
        Ok(())
    });

    let original = registry.load(&description.channel).await.unwrap();
    assert!(lifecycle.initialize_assembly(&original, None).await.success);

    registry
        .publish(
            &description.channel,
            &AssemblyOperation::Update {
                name: None,
                version: Some("1.1.0".to_string()),
                dependencies: None,
            },
        )
        .await
        .unwrap();
    let updated = registry.load(&description.channel).await.unwrap();
    let result = lifecycle.update_assembly(&original.id, &updated, None).await;
    assert!(result.success);
    assert_eq!(result.changes, vec!["Assembly version changed from 1.0.0 to 1.1.0"]);

    assert!(lifecycle.cleanup_assembly(&original.id).await.success);
    assert_eq!(
        *states.lock().unwrap(),
        vec![
            AssemblyState::Initializing,
            AssemblyState::Initialized,
            AssemblyState::Updating,
            AssemblyState::Updated,
            AssemblyState::Destroying,
            AssemblyState::Destroyed,
        ]
    );
}

#[tokio::test]
async fn test_wasm_module_travels_as_base64_and_is_hashed() {
    let module = wat::parse_str(
        r#"(module
            (memory (export "memory") 1)
            (func (export "INFO") (result i32) i32.const 0)
            (func (export "POST") (result i32) i32.const 0)
            (func (export "GET") (result i32) i32.const 0))"#,
    )
    .unwrap();

    let mut assembly = Assembly::new("local", "Wasm Counter", "1.0.0");
    assembly.actions.push(AssemblyAction {
        id: "counter-module".to_string(),
        module: Some(module.clone()),
        ..Default::default()
    });

    let registry = AssemblyRegistry::new(InMemoryChannel::new());
    registry.publish_assembly("0.0.9000", &assembly).await.unwrap();

    let messages = registry
        .channel()
        .query("0.0.9000", QueryOptions::default())
        .await
        .unwrap();
    let payload: Value = serde_json::from_str(&messages[1].payload).unwrap();
    let encoded = payload["action"]["module"].as_str().unwrap();
    assert!(WasmValidator::default().validate_base64(encoded).is_valid);

    let loaded = registry.load("0.0.9000").await.unwrap();
    let lifecycle = LifecycleManager::default();
    let result = lifecycle.initialize_assembly(&loaded, None).await;
    assert!(result.success, "{:?}", result.errors);

    let status = lifecycle.get_assembly_status("0.0.9000").await.unwrap();
    let component = status.component("counter-module").unwrap();
    assert_eq!(component.state, ComponentState::Ready);
    assert_eq!(component.hash, Some(WasmValidator::calculate_hash(&module)));
}
