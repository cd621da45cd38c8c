//! csv2bufr conversion service.
//!
//! HTTP wrapper around the csv2bufr library: converts intermediate DAYCLI
//! CSV files on the shared exports volume into BUFR edition 4 messages.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use bufr_conversion::CommandEngine;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use csv2bufr_service::{start_server, ServerState, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "csv2bufr-service")]
#[command(about = "CSV to BUFR conversion service")]
struct Args {
    /// Port to listen on (overrides CSV2BUFR_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (ignored in debug mode)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Enable debug mode (same as CSV2BUFR_DEBUG=true)
    #[arg(long)]
    debug: bool,

    /// Interpreter for the bridge script (overrides CSV2BUFR_ENGINE_PROGRAM)
    #[arg(long)]
    engine_program: Option<String>,

    /// Bridge script path (overrides CSV2BUFR_BRIDGE_SCRIPT)
    #[arg(long)]
    bridge_script: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = ServiceConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(program) = args.engine_program {
        config.engine_program = program;
    }
    if let Some(script) = args.bridge_script {
        config.bridge_script = script;
    }
    config.debug |= args.debug;

    init_tracing(&args.log_level, config.debug)?;

    info!(
        port = config.port,
        debug = config.debug,
        engine_program = %config.engine_program,
        bridge_script = %config.bridge_script.display(),
        "Starting csv2bufr service"
    );

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let engine = Arc::new(CommandEngine::new(config.engine_config()));
    let state = Arc::new(ServerState::new(engine, prometheus_handle));

    start_server(state, config.port).await
}

fn init_tracing(log_level: &str, debug: bool) -> Result<()> {
    if debug {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(());
    }

    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
