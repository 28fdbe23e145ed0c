//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RouterConfig;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    router: RouterInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    seed_pools: Vec<SeedPoolInfo>,
    targets: Vec<TargetInfo>,
}

#[derive(Serialize)]
struct RouterInfo {
    severity_filter: String,
    max_call_stack_frames: usize,
    deferred: bool,
    drain_batch_size: usize,
    default_pool_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pool_cap: Option<usize>,
}

#[derive(Serialize)]
struct SeedPoolInfo {
    kind: String,
    size: usize,
}

#[derive(Serialize)]
struct TargetInfo {
    id: String,
    kind: String,
    log_by_default: bool,
    include_call_stack: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    params: HashMap<String, String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config);
    }

    Ok(())
}

fn build_config_info(config: &RouterConfig) -> ConfigInfo {
    ConfigInfo {
        version: format!("{:?}", config.version),
        router: RouterInfo {
            severity_filter: config.severity_filter.0.to_string(),
            max_call_stack_frames: config.max_call_stack_frames,
            deferred: config.deferred,
            drain_batch_size: config.drain_batch_size,
            default_pool_size: config.default_pool_size,
            pool_cap: config.pool_cap,
        },
        seed_pools: config
            .seed_pools
            .iter()
            .map(|s| SeedPoolInfo {
                kind: s.kind.to_string(),
                size: s.size,
            })
            .collect(),
        targets: config
            .targets
            .iter()
            .map(|t| TargetInfo {
                id: t.id.to_string(),
                kind: format!("{:?}", t.kind),
                log_by_default: t.log_by_default,
                include_call_stack: t.include_call_stack,
                params: t.params.clone(),
            })
            .collect(),
    }
}

fn print_config_info(config: &RouterConfig) {
    println!("=== logrouter configuration ===\n");

    println!("Router");
    println!("   ├─ Version: {:?}", config.version);
    println!("   ├─ Severity filter: {}", config.severity_filter.0);
    println!("   ├─ Max call-stack frames: {}", config.max_call_stack_frames);
    println!("   ├─ Deferred: {}", config.deferred);
    println!("   ├─ Drain batch size: {}", config.drain_batch_size);
    println!("   ├─ Default pool size: {}", config.default_pool_size);
    match config.pool_cap {
        Some(cap) => println!("   └─ Pool cap: {}", cap),
        None => println!("   └─ Pool cap: unbounded"),
    }

    if !config.seed_pools.is_empty() {
        println!("\nSeed pools ({})", config.seed_pools.len());
        for (i, seed) in config.seed_pools.iter().enumerate() {
            let prefix = if i == config.seed_pools.len() - 1 { "└─" } else { "├─" };
            println!("   {} {} x{}", prefix, seed.kind, seed.size);
        }
    }

    println!("\nTargets ({})", config.targets.len());
    for (i, target) in config.targets.iter().enumerate() {
        let prefix = if i == config.targets.len() - 1 { "└─" } else { "├─" };
        let mut flags = Vec::new();
        if target.log_by_default {
            flags.push("default");
        }
        if target.include_call_stack {
            flags.push("call-stack");
        }
        println!(
            "   {} {} ({:?}) [{}]",
            prefix,
            target.id,
            target.kind,
            flags.join(", ")
        );
        for (key, value) in &target.params {
            println!("   {}     {} = {}", if i == config.targets.len() - 1 { " " } else { "│" }, key, value);
        }
    }

    println!();
}
