//! The main entry point for the `sar` command-line application.
//!
//! Parses arguments, then hands the run to the orchestrator with stdin as the
//! confirmation source and stdout as the output channel.

use sar::{cli, logging, orchestrator};
use std::io;
use std::process;

fn main() {
    let args = cli::parse_args();
    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: cli::Args) -> sar::Result<()> {
    let (config, format) = args.into_run_config()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut out = stdout.lock();
    orchestrator::run(&config, format, &mut input, &mut out)?;
    Ok(())
}
