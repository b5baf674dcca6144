// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use hashlinks::assembly::{Assembly, AssemblyRegistry};
use hashlinks::binding::{Binding, BindingManager, BlockState, ExecutionResult, ResolvedParameters};
use hashlinks::channel::InMemoryChannel;
use hashlinks::config::load_and_validate_config;
use hashlinks::errors::CollaboratorError;
use hashlinks::layout::{ComponentLayout, Container, LayoutEngine};
use hashlinks::lifecycle::LifecycleManager;
use hashlinks::observability::init_tracing;
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::time::Instant;

const DEFAULT_CONTAINER: (f64, f64) = (1024.0, 768.0);

/// Everything the demo needs to run one assembly end to end.
#[derive(Debug, Deserialize)]
struct AssemblyDescription {
    /// Channel the assembly is published to and reloaded from.
    channel: String,
    assembly: Assembly,
    #[serde(default)]
    layout: Vec<ComponentLayout>,
    #[serde(default)]
    bindings: Vec<BlockBinding>,
}

/// A binding plus the block it reads from and that block's current state.
#[derive(Debug, Deserialize)]
struct BlockBinding {
    block: String,
    #[serde(default)]
    state: BlockState,
    #[serde(flatten)]
    binding: Binding,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 && args.len() != 5 {
        eprintln!("Usage: {} <engine-config> <assembly.yaml> [container-width container-height]", args[0]);
        eprintln!("Example: {} configs/engine.yaml configs/counter-assembly.yaml 1280 800", args[0]);
        std::process::exit(1);
    }

    if let Err(e) = run(&args[1], &args[2], args.get(3..5)).await {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config_file: &str, assembly_file: &str, size: Option<&[String]>) -> Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading engine config {config_file}"))?;
    let description: AssemblyDescription = serde_yaml::from_str(
        &std::fs::read_to_string(assembly_file)
            .with_context(|| format!("reading {assembly_file}"))?,
    )
    .with_context(|| format!("parsing {assembly_file}"))?;
    let container = parse_container(size)?;

    println!("🔗 HashLinks Assembly Demo");
    println!("═══════════════════════════");
    println!("Config:    {}", config_file);
    println!("Assembly:  {} ({})", description.assembly.name, assembly_file);
    println!("Container: {}x{}", container.width, container.height);

    // Round trip through the channel so the demo runs what a reader would see
    let registry = AssemblyRegistry::new(InMemoryChannel::new());
    let receipts = registry
        .publish_assembly(&description.channel, &description.assembly)
        .await?;
    let assembly = registry.load(&description.channel).await?;
    println!(
        "\n📨 Published {} operations to {}, reloaded '{}' v{}",
        receipts.len(),
        description.channel,
        assembly.id,
        assembly.version
    );

    let mut lifecycle = LifecycleManager::new(&config);
    lifecycle.set_dependency_initializer(|id: String| async move {
        tracing::info!("Connecting dependency {}", id);
        Ok::<(), CollaboratorError>(())
    });
    lifecycle.on_state_changed(|event| {
        println!("   • {} → {}", event.old_state, event.new_state);
        Ok(())
    });

    println!("\n🚦 Lifecycle:");
    let initialized = lifecycle.initialize_assembly(&assembly, None).await;
    println!(
        "   Ready: {:?} (success: {}, partial: {})",
        initialized.ready_components, initialized.success, initialized.partial_failure
    );
    for error in &initialized.errors {
        println!("   ⚠️  {}", error);
    }

    let engine = LayoutEngine::new(&config.layout);
    let layout = engine.calculate_layout(&description.layout, container);
    println!(
        "\n📐 Layout (breakpoint: {}):",
        layout.active_breakpoint.as_deref().unwrap_or("none")
    );
    for (id, rect) in &layout.layouts {
        let visible = layout.visibility.get(id).copied().unwrap_or(true);
        println!(
            "   {:<12} x={:<8.1} y={:<8.1} w={:<8.1} h={:<8.1}{}",
            id,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            if visible { "" } else { " (hidden)" }
        );
    }
    for issue in layout.errors.iter().chain(&layout.warnings) {
        println!("   ⚠️  {}", issue);
    }

    println!("\n⚡ Bindings:");
    let bindings = BindingManager::new();
    for entry in &description.bindings {
        let result = run_binding(&bindings, &assembly, entry).await;
        let outcome = match (&result.data, &result.error, &result.reason) {
            (_, Some(error), _) => format!("failed: {error}"),
            (_, _, Some(reason)) if result.skipped => format!("skipped: {reason}"),
            (Some(data), _, _) => data.to_string(),
            _ => "ok".to_string(),
        };
        println!("   {} → {}: {}", entry.block, entry.binding.action, outcome);
    }

    let cleanup = lifecycle.cleanup_assembly(&assembly.id).await;
    println!("\n🧹 Cleanup success: {}", cleanup.success);
    println!("\n⏱️  Total Time: {:?}", start_time.elapsed());
    Ok(())
}

async fn run_binding(manager: &BindingManager, assembly: &Assembly, entry: &BlockBinding) -> ExecutionResult {
    let block = assembly.block(&entry.block).and_then(|b| b.definition.as_ref());
    let action = assembly
        .action(&entry.binding.action)
        .and_then(|a| a.definition.as_ref());
    let (Some(block), Some(action)) = (block, action) else {
        return ExecutionResult::failed(format!(
            "block '{}' or action '{}' has no definition",
            entry.block, entry.binding.action
        ));
    };

    let validation = manager.validate_binding(action, &entry.binding);
    let mapping = manager.create_parameter_mapping(block, action, &entry.binding);
    let errors: Vec<String> = validation.errors.into_iter().chain(mapping.errors).collect();
    if !errors.is_empty() {
        return ExecutionResult::failed(errors.join("; "));
    }

    manager
        .execute_binding(&entry.binding, &entry.state, &mapping.mapping, &counter_executor)
        .await
}

/// Stand-in for running the action's WASM module: a small counter.
async fn counter_executor(
    action: String,
    parameters: ResolvedParameters,
) -> Result<ExecutionResult, CollaboratorError> {
    let number = |name: &str| {
        parameters
            .get(name)
            .and_then(|v| v.as_ref())
            .and_then(Value::as_f64)
    };

    let count = number("count").unwrap_or(0.0);
    let amount = number("amount").unwrap_or(1.0);
    let next = match action.as_str() {
        "increment" => count + amount,
        "decrement" => count - amount,
        "reset" => 0.0,
        other => return Err(CollaboratorError::new(format!("unknown action '{other}'"))),
    };
    Ok(ExecutionResult::ok(json!({ "count": next })))
}

fn parse_container(size: Option<&[String]>) -> Result<Container> {
    let Some([width, height]) = size else {
        return Ok(Container::new(DEFAULT_CONTAINER.0, DEFAULT_CONTAINER.1));
    };
    let width: f64 = width.parse().with_context(|| format!("invalid width '{width}'"))?;
    let height: f64 = height.parse().with_context(|| format!("invalid height '{height}'"))?;
    if width <= 0.0 || height <= 0.0 {
        bail!("container size must be positive, got {width}x{height}");
    }
    Ok(Container::new(width, height))
}
