// Syncprof Exporter - Prometheus exporter for sync profile statistics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Syncprof Exporter
//!
//! ## Usage
//!
//! ```bash
//! # Profile two sources fed through POST /events
//! syncprof-exporter bpm1 bpm2
//!
//! # Poll files listed in a config, every 500 ms
//! syncprof-exporter --config sources.json --poll-interval-ms 500
//!
//! # Replay a recorded event log at 10x
//! syncprof-exporter bpm1 bpm2 --csv events.csv --speed 10
//!
//! # Simulate a preset scenario
//! syncprof-exporter --simulate skewed
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use syncprof::Aggregator;
use syncprof_exporter::{
    metrics, router, AppState, CliOverrides, ExporterConfig, FileSource, Poller,
    ReplayConfig, ReplayEngine, Result, Worker,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// Syncprof Prometheus Exporter
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source names; each is read from an address equal to its name
    sources: Vec<String>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<String>,

    /// Port to listen on [default: 9100]
    #[arg(short, long)]
    port: Option<u16>,

    /// Samples kept per source
    #[arg(long)]
    capacity: Option<usize>,

    /// Drop arrivals whose timestamp does not advance instead of recording 0 Hz
    #[arg(long)]
    drop_non_positive: bool,

    /// Poll every source at this interval (file modification times)
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// CSV event log to replay
    #[arg(short, long)]
    csv: Option<String>,

    /// Replay or simulation speed multiplier (1.0 = real-time)
    #[arg(short, long, default_value = "1.0")]
    speed: f64,

    /// Loop the replay when it reaches the end
    #[arg(short, long)]
    loop_replay: bool,

    /// Simulate a scenario: preset name or JSON scenario file
    #[arg(long)]
    simulate: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            sources: self.sources.clone(),
            port: self.port,
            capacity: self.capacity,
            drop_non_positive: self.drop_non_positive,
            poll_interval_ms: self.poll_interval_ms,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Syncprof Exporter v{}", syncprof_exporter::VERSION);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => ExporterConfig::load(path)?,
        None => ExporterConfig::default(),
    };
    config.apply(&args.overrides());

    #[cfg(feature = "simulate")]
    let simulator = match &args.simulate {
        Some(spec) => {
            let scenario = syncprof_exporter::simulate::load_scenario(spec)?;
            if config.sources.is_empty() {
                config.sources = scenario
                    .source_names()
                    .into_iter()
                    .map(syncprof::SourceSpec::named)
                    .collect();
            }
            Some(syncprof_exporter::simulate::Simulator::new(scenario, args.speed))
        }
        None => None,
    };
    #[cfg(not(feature = "simulate"))]
    if args.simulate.is_some() {
        tracing::warn!("Simulate feature not enabled, ignoring --simulate argument");
    }

    config.validate()?;
    let registry = config.registry()?;
    metrics::set_sources_configured(registry.len());
    info!(
        "Profiling {} sources ({} pairs), window capacity {}",
        registry.len(),
        registry.pair_count(),
        config.engine.window_capacity
    );

    let aggregator = Aggregator::new(registry.clone(), config.engine.clone())?;
    let (mut worker, ingest, view) = Worker::new(aggregator, config.queue_depth);
    worker.prime().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker_task = tokio::spawn(worker.run(shutdown_rx.clone()));

    if let Some(csv_path) = args.csv.clone() {
        let engine = ReplayEngine::from_csv(ReplayConfig {
            csv_path,
            speed: args.speed,
            loop_replay: args.loop_replay,
        })?;
        let handle = ingest.clone();
        tokio::spawn(async move { engine.run(handle).await });
    }

    if let Some(period_ms) = config.poll_interval_ms {
        let specs = registry.iter().map(|(_, spec)| spec.clone()).collect();
        let poller = Poller::new(FileSource::new(), specs, Duration::from_millis(period_ms));
        tokio::spawn(poller.run(ingest.clone(), shutdown_rx.clone()));
    }

    #[cfg(feature = "simulate")]
    if let Some(simulator) = simulator {
        tokio::spawn(simulator.run(ingest.clone(), shutdown_rx.clone()));
    }

    let state = Arc::new(AppState::new(&registry, ingest, view));
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    info!("Starting server on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    shutdown_tx.send_replace(true);
    let aggregator = worker_task.await?;
    info!(
        "Engine {}: {} events recorded, {} rejected",
        aggregator.state().as_str(),
        aggregator.events_recorded(),
        aggregator.events_rejected()
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
