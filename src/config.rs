use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_ADDRESS: &str = "localhost:4221";

#[derive(Parser, Debug)]
#[command(name = "rawhttp", about = "Minimal HTTP/1.1 server", long_about = None)]
pub struct Args {
    /// Directory served by the /files endpoints (defaults to the working directory)
    #[arg(long)]
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub directory: PathBuf,
    pub address: String,
}

impl Config {
    pub fn from_args(args: Args) -> anyhow::Result<Config> {
        let directory = match args.directory {
            Some(dir) => dir,
            None => std::env::current_dir().context("Can't determine working directory")?,
        };

        Ok(Config {
            directory,
            address: DEFAULT_ADDRESS.to_string(),
        })
    }
}
