mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::error;

use ccqo::logging::init_logging;
use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match cli::commands::execute(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            // Validation messages were already logged one by one.
            match e.downcast_ref::<ccqo::Error>() {
                Some(ccqo::Error::Validation(v)) => {
                    error!("Invalid parameters ({} errors)", v.errors.len())
                }
                _ => error!("{e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
