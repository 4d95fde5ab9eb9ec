use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use sitesmith_server::{get_configuration, run};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug, Parser)]
#[command(name = "sitesmith-server", version, about = "HTTP API for building and publishing sites")]
struct Args {
    #[arg(
        long,
        short,
        env = "SITESMITH_CONFIG",
        help = "Settings file. Defaults to sitesmith.toml in the current directory"
    )]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("sitesmith-server v{}", env!("CARGO_PKG_VERSION"));

    let configuration =
        get_configuration(args.config.as_deref()).context("unable to load configuration")?;

    run(configuration).await
}
