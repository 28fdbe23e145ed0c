//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{RouterConfig, TargetKind};
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
    severity_filter: String,
    deferred: bool,
    target_count: usize,
    seed_pool_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
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

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", config.version),
                    severity_filter: config.severity_filter.0.to_string(),
                    deferred: config.deferred,
                    target_count: config.targets.len(),
                    seed_pool_count: config.seed_pools.len(),
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

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &RouterConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.targets.is_empty() {
        warnings.push("No targets configured - dispatched records reach nobody".to_string());
    }

    if !config.targets.is_empty() && config.targets.iter().all(|t| !t.log_by_default) {
        warnings.push(
            "No target has log_by_default - only dispatch_to will deliver records".to_string(),
        );
    }

    for target in &config.targets {
        if target.include_call_stack && config.max_call_stack_frames == 0 {
            warnings.push(format!(
                "Target '{}' wants call stacks but max_call_stack_frames is 0",
                target.id
            ));
        }
        if target.kind != TargetKind::File && !target.params.is_empty() {
            warnings.push(format!(
                "Target '{}' ({:?}) ignores its params",
                target.id, target.kind
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Severity filter: {}", summary.severity_filter);
            println!("  Deferred: {}", summary.deferred);
            println!("  Targets: {}", summary.target_count);
            println!("  Seed pools: {}", summary.seed_pool_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
