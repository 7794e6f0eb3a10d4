use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use trafficcore::lifecycle::cancel_pair;
use workflow::config::ConsoleConfig;
use workflow::runner::{RunOptions, Workflow};

mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Headless driver for the traffic-analysis dashboard")]
struct Args {
    /// Backend base URL
    #[arg(long, default_value = "http://127.0.0.1:3015")]
    base_url: String,
    /// Load run settings from YAML instead of flags
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seconds between status polls
    #[arg(long, default_value_t = 2)]
    interval: u64,
    /// Directory for downloaded artifacts
    #[arg(long, default_value = "downloads")]
    output: PathBuf,
    /// Poll and print results without downloading artifacts
    #[arg(long, default_value_t = false)]
    skip_downloads: bool,
    /// Print raw statistics JSON instead of formatted rows
    #[arg(long, default_value_t = false)]
    raw_stats: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = if let Some(path) = args.config {
        ConsoleConfig::load(path)?
    } else {
        ConsoleConfig::from_args(args.base_url, args.interval, args.output)
    };

    let workflow = Workflow::new(config)?;
    let options = RunOptions {
        skip_downloads: args.skip_downloads,
        raw_stats: args.raw_stats,
    };

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime")?;
    runtime.block_on(async {
        let (handle, token) = cancel_pair();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                handle.cancel();
            }
        });
        workflow.execute(token, options).await
    })
}
