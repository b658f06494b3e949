mod app;
mod cli;
mod effects;
mod render;

use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use paper_logging::{paper_error, LogDestination};

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(&cli);

    match app::run(cli) {
        Ok(code) => code,
        Err(err) => {
            paper_error!("{:#}", err);
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &cli::Cli) {
    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let destination = match &cli.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    paper_logging::initialize(destination, level);
}
