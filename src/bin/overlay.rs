//! Overlay CLI Binary

use anyhow::Context;
use clap::Parser;
use overlay::logging::init_logging;
use overlay::tooling::cli::{load_config, Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<String> {
    let config = load_config(cli).context("loading configuration")?;
    init_logging(Some(&config.logging)).context("initializing logging")?;
    let context = CliContext::new(config).context("opening dictionary store")?;
    Ok(context.execute(&cli.command)?)
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
