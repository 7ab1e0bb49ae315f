mod cli;
mod core;
mod qr;
mod utils;
mod web;
mod wifi;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `encode`/`decode` output stays pipeable
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();

    let cli = Cli::parse();
    cli.run().await
}
