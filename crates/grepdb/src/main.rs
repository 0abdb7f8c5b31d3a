use clap::Parser;
use grepdb::cli::{self, Cli};
use grepdb_logging::{init_logging, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "grepdb",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: {:#}", err);
    }

    match cli::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}
