mod classifier;
mod config;
mod driver;
mod engine;
mod generator;
mod model;

use crate::config::Config;
use crate::driver::Driver;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Run {
        /// Arguments passed through to the simulation engine.
        #[arg(last = true)]
        engine_args: Vec<String>,
    },

    Check,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to construct cfg")?;
    log::info!("{cfg:#?}");

    match args.command {
        Command::Run { engine_args } => {
            let mut driver =
                Driver::new(cfg, engine_args).context("failed to construct driver")?;
            let summary = driver.run()?;
            log::info!(
                "seeded {} agents, {} infected by proximity",
                summary.n_agents,
                summary.infected.len()
            );
        }
        Command::Check => log::info!("config is valid"),
    }

    Ok(())
}
