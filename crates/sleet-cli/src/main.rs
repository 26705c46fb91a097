#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use clap::Parser;

use crate::{
    config::{CliArgs, CliConfig},
    telemetry::init_telemetry,
};

fn main() -> anyhow::Result<()> {
    // A missing `.env` is fine; flags and the process environment still apply.
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    init_telemetry()?;

    let config = CliConfig::try_from(args)?;
    run_command(config)
}

fn run_command(config: CliConfig) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    command::run(config, &mut out)
}
