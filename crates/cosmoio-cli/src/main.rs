mod cli;
mod commands;
mod config;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::Result;
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("cosmo CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            commands::convert::run(args, config_path)
        }
        Commands::Show(args) => {
            info!("Dispatching to 'show' command.");
            commands::show::run(args, config_path)
        }
        Commands::Formats(args) => {
            info!("Dispatching to 'formats' command.");
            commands::formats::run(args)
        }
    };

    match &result {
        Ok(()) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
