//! Trace federation server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │               TRACE FEDERATION               │
//!   Client Request       │  ┌────────┐   ┌─────────┐   ┌────────────┐   │
//!   ─────────────────────┼─▶│  http  │──▶│ querier │──▶│  client[0] │───┼──▶ Instance A
//!                        │  │handlers│   │ fan-out │──▶│  client[1] │───┼──▶ Instance B
//!                        │  └────────┘   └────┬────┘──▶│  client[n] │───┼──▶ Instance N
//!                        │       ▲            │        └────────────┘   │
//!   Client Response      │  ┌────┴─────┐      ▼                         │
//!   ◀────────────────────┼──│ response │◀─ combiner                     │
//!                        │  └──────────┘                                │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use trace_federation::config::load_config;
use trace_federation::lifecycle::{wait_for_signal, Shutdown};
use trace_federation::observability::{logging, metrics};
use trace_federation::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "trace-federation", version, about = "Federated query API over several tracing backends")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "trace-federation starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        instances = config.instances.len(),
        query_timeout_secs = config.query.timeout_secs,
        fail_on_partial = config.query.fail_on_partial,
        "Configuration loaded"
    );
    for instance in &config.instances {
        tracing::info!(
            name = %instance.name,
            endpoint = %instance.endpoint,
            tenant = instance.tenant_id.as_deref().unwrap_or("-"),
            "Instance configured"
        );
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown.run_until(server_task, wait_for_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
