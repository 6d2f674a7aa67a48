use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hotelwatch::app::{self, AppCfg};
use hotelwatch::shared::config::ConfigLoader;

#[derive(Parser, Debug)]
#[command(version, about = "Hotel availability price monitor with webhook alerts")]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "Config.toml")]
    config: String,

    /// Run a single check cycle and exit
    #[arg(long)]
    once: bool,

    /// Log notifications instead of posting them
    #[arg(long)]
    dry_run: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Config errors never abort: the loader falls back to defaults
    let config = ConfigLoader::load(&args.config);

    app::run(AppCfg::from_config(config, args.dry_run, args.once)).await
}
