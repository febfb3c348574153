use clap::Parser;
use log::info;
use pql::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    info!("PQL starting up");
    let cli = Cli::parse();
    if let Err(err) = cli.run() {
        eprintln!("ERROR: {err:#}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
