use clap::Parser;
use stacyolo::{Cli, Config, ViewerServer};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from(Cli::parse());
    let server = ViewerServer::new(config)?;
    server.start().await
}
