mod args;
mod commands;

use clap::Parser;
use larder_core::{application::create_service, domain::common::LarderConfig};
use tracing_subscriber::EnvFilter;

use crate::args::Args;

fn init_logger(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logger(args.log_json);

    let service = create_service(LarderConfig::from(&args))?;
    commands::run(&service, args.command).await
}
