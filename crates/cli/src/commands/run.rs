//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::RouterConfig;
use router::Router;
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::host::{Host, HostConfig};

/// Execute the `run` command
pub async fn run_host(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            info!(config = %path.display(), "Loading configuration");
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            config_loader::ConfigLoader::load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => {
            info!("No configuration file given, using defaults");
            RouterConfig::default()
        }
    };

    // Apply CLI overrides
    if args.deferred {
        info!("Enabling deferred dispatch from CLI");
        config.deferred = true;
    }
    if let Some(level) = args.severity_filter {
        info!(severity_filter = %level, "Overriding severity filter from CLI");
        config.severity_filter.0 = level;
    }

    info!(
        severity_filter = %config.severity_filter.0,
        deferred = config.deferred,
        drain_batch_size = config.drain_batch_size,
        targets = config.targets.len(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let router = Router::from_config(&config).context("Failed to build router")?;
    let host = Host::new(
        router.clone(),
        HostConfig {
            producers: args.producers,
            messages_per_producer: args.messages,
            tick: Duration::from_millis(args.tick_ms.max(1)),
            max_ticks: (args.max_ticks != 0).then_some(args.max_ticks),
        },
    );

    let shutdown_signal = setup_shutdown_signal();

    info!("Starting host loop...");

    tokio::select! {
        result = host.run() => {
            let stats = result.context("Host loop failed")?;
            info!(
                records = stats.records_produced,
                duration_secs = stats.duration.as_secs_f64(),
                throughput = format!("{:.2}", stats.throughput()),
                "Host loop completed"
            );
            stats.print_summary();
        }
        signal = shutdown_signal => {
            signal?;
            warn!("Received shutdown signal, flushing router...");
            router.shutdown();
        }
    }

    info!("logrouter finished");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn setup_shutdown_signal() -> Result<()> {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to install Ctrl+C handler")
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<(), anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        result = ctrl_c => result,
        result = terminate => result,
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &RouterConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Router:");
    println!("  Severity filter: {}", config.severity_filter.0);
    println!("  Deferred: {}", config.deferred);
    println!("  Drain batch size: {}", config.drain_batch_size);
    println!("  Max call-stack frames: {}", config.max_call_stack_frames);
    println!("\nTargets ({}):", config.targets.len());
    for target in &config.targets {
        println!(
            "  - {} ({:?}) default={} call_stack={}",
            target.id, target.kind, target.log_by_default, target.include_call_stack
        );
    }
    println!();
}
