//! XR input resolver CLI
//!
//! Lists the device mappings usable on a system, or replays a scripted
//! session against the simulated runtime and prints per-frame device state.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use xr_input_resolver::config::ResolverConfig;
use xr_input_resolver::mapping::{MappingCatalog, SystemProperties};
use xr_input_resolver::session::InputSession;
use xr_input_resolver::sim::{RecordingDelegate, Replay, ReplayScript, SimulatedRuntime};

/// XR Input Resolver - resolve XR actions and tracked hands into controller state
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when absent)
    #[arg(short, long)]
    config: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the mappings usable on the configured system
    #[arg(long)]
    list_mappings: bool,

    /// Replay a scripted session against the simulated runtime
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Replay frame rate in Hz
    #[arg(long, default_value = "90")]
    frame_rate: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!("Starting XR input resolver v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            ResolverConfig::load(path).await?
        }
        None => {
            debug!("No configuration file, using defaults");
            ResolverConfig::default()
        }
    };

    let catalog = config.build_catalog()?;

    if args.list_mappings {
        list_mappings(&catalog, &config.system);
        return Ok(());
    }

    if let Some(script) = &args.replay {
        run_replay(script, &catalog, &config, args.frame_rate).await?;
        return Ok(());
    }

    warn!("Nothing to do: pass --list-mappings or --replay <script>");
    Ok(())
}

fn list_mappings(catalog: &MappingCatalog, system: &SystemProperties) {
    let mappings = catalog.filter(system);
    println!(
        "{} of {} mappings usable on '{}' ({})",
        mappings.len(),
        catalog.len(),
        system.name,
        if system.position_tracking { "6DoF" } else { "3DoF" }
    );

    for mapping in &mappings {
        println!("\n{} [{}]", mapping.profile, mapping.controller_type);
        for button in &mapping.buttons {
            println!(
                "  button {:<10} {:<12} {:?} {:?}",
                button.button_type.name(),
                button.path,
                button.flags,
                button.hand
            );
        }
        for axis in &mapping.axes {
            println!("  axis   {:<10} {:<12} {:?}", axis.axis_type.name(), axis.path, axis.hand);
        }
        for haptic in &mapping.haptics {
            println!("  haptic {:<23} {:?}", haptic.path, haptic.hand);
        }
    }
}

async fn run_replay(
    path: &Path,
    catalog: &MappingCatalog,
    config: &ResolverConfig,
    frame_rate: u32,
) -> Result<()> {
    if frame_rate == 0 {
        anyhow::bail!("Frame rate must be positive");
    }

    let script = ReplayScript::load(path)?;
    info!(
        "Replaying {} frames from {} at {} Hz",
        script.frames.len(),
        path.display(),
        frame_rate
    );

    let runtime = SimulatedRuntime::new();
    script.configure_runtime(&runtime);

    let mut session = InputSession::new(&runtime, catalog, &script.system, config)
        .context("Failed to create input session")?;
    let mut delegate = RecordingDelegate::new();
    session
        .update_interaction_profiles(&runtime, &mut delegate)
        .context("Failed to read initial interaction profiles")?;

    let mut replay = Replay::new(script, config.render_mode);
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / frame_rate as f64));

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(report) = replay.step(&runtime, &mut session, &mut delegate)? else {
                    break;
                };
                println!("{}", serde_json::to_string(&report)?);
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping replay");
                break;
            }
        }
    }

    info!(
        "Replay finished: {} haptic calls",
        runtime.haptic_calls().len()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays pure JSON snapshots
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    Ok(())
}
