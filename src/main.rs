use clap::Parser;
use rawhttp::config::{Args, Config};
use rawhttp::handlers;
use rawhttp::http::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cfg = Config::from_args(Args::parse())?;
    info!(directory = %cfg.directory.display(), "serving files");

    let router = handlers::routes(cfg.directory)?;
    Server::bind(&cfg.address, router)?.run()
}
