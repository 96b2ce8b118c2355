//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::FabricBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    settle_ms: u64,
    queue_capacity: usize,
    roles: Vec<String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{json}");
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    settle_ms: blueprint.transport.settle_ms,
                    queue_capacity: blueprint.transport.queue_capacity,
                    roles: describe_roles(&blueprint),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// One line per configured role
fn describe_roles(blueprint: &FabricBlueprint) -> Vec<String> {
    let mut roles = Vec::new();

    if let Some(stream) = &blueprint.stream {
        let trace = stream
            .trace_path()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        roles.push(format!(
            "stream {} @ {} Hz on {} from {}",
            stream.kind,
            stream.rate_hz,
            stream.bind_addr(),
            trace
        ));
    }
    if let Some(generator) = &blueprint.generator {
        roles.push(format!(
            "generate {} @ {} Hz on {}",
            generator.kind,
            generator.rate_hz,
            generator.bind_addr()
        ));
    }
    if let Some(relay) = &blueprint.relay {
        roles.push(format!(
            "relay {} {} -> {} ({:?})",
            relay.kind,
            relay.inbound(),
            relay.outbound(),
            relay.filter
        ));
    }
    if let Some(monitor) = &blueprint.monitor {
        roles.push(format!("monitor {} {}", monitor.kind, monitor.addr()));
    }

    roles
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &FabricBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.stream.is_none()
        && blueprint.generator.is_none()
        && blueprint.relay.is_none()
        && blueprint.monitor.is_none()
    {
        warnings.push("No role configured - every setting must come from flags".to_string());
    }

    if let Some(path) = blueprint.stream.as_ref().and_then(|s| s.trace_path()) {
        if !path.is_file() {
            warnings.push(format!(
                "Trace file {} does not exist on this host",
                path.display()
            ));
        }
    }

    if blueprint.transport.settle_ms == 0 {
        warnings.push(
            "transport.settle_ms is 0 - the first samples may reach no subscriber".to_string(),
        );
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Settle delay (ms): {}", summary.settle_ms);
            println!("  Queue capacity: {}", summary.queue_capacity);
            for role in &summary.roles {
                println!("  - {role}");
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {warning}");
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {error}");
        }
    }
}
