use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use rill::{root_environment, run_source};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to a source file to interpret. Without this, Rill starts an
    /// interactive REPL instead.
    #[arg(long)]
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Error).expect("logger is only initialized once");

    let cli = Cli::parse();

    match cli.file {
        Some(path) => run_file(&path),
        None => run_repl(),
    }
}

fn run_file(path: &std::path::Path) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            error!("could not read {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    };

    let env = root_environment();
    match run_source(&source, &env) {
        Ok(value) if value.is_error() => {
            error!("{value}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(parse_errors) => {
            for parse_error in parse_errors {
                error!("{parse_error}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run_repl() -> ExitCode {
    let stdin = io::stdin();
    match rill::repl::start(stdin.lock(), io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("repl I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
