//! proc-gateway - serve configured command-line tools over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use proc_gateway::{server, GatewayConfig};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "proc-gateway", version, about)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "PROC_GATEWAY_CONFIG", default_value = "gateway.toml")]
    config: PathBuf,

    /// Address to listen on (overrides the config file)
    #[arg(short, long, env = "PROC_GATEWAY_LISTEN")]
    listen: Option<SocketAddr>,

    /// Maximum characters of stdout returned per call
    #[arg(long, env = "OUTPUT_CHARACTER_LIMIT", value_parser = clap::value_parser!(u64).range(1..))]
    output_character_limit: Option<u64>,

    /// Stdout lines longer than this many characters are dropped
    #[arg(long, env = "OUTPUT_DROP_LINE_LIMIT", value_parser = clap::value_parser!(u64).range(1..))]
    output_drop_line_limit: Option<u64>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        return;
    }
    info!("shutting down");
}

fn to_limit(value: Option<u64>) -> Result<Option<usize>> {
    value
        .map(|v| usize::try_from(v).context("limit does not fit in usize"))
        .transpose()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = GatewayConfig::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?
        .with_listen(args.listen)
        .with_max_output_chars(to_limit(args.output_character_limit)?)
        .with_drop_line_chars(to_limit(args.output_drop_line_limit)?);

    let gateway = Arc::new(config.to_gateway().context("invalid configuration")?);
    info!(
        roots = gateway.resolver().roots().len(),
        default_root = %gateway.resolver().default_root(),
        max_output_chars = gateway.limits().max_output_chars,
        drop_line_chars = gateway.limits().drop_line_chars,
        "configuration loaded"
    );

    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.listen))?;

    server::serve(listener, gateway, config.public_url.clone(), shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}
