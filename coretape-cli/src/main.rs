//! # coretape CLI
//!
//! Command-line interface for running tape programs standalone.
//!
//! Usage:
//!   coretape run <file> [--input 1,2,3] [--patch NOUN,VERB] [--result-cell N]
//!   coretape check <file>
//!
//! Examples:
//!   coretape run program.txt --input 5
//!   coretape run program.txt --patch 12,2 --result-cell 0
//!   coretape check program.txt
//!   RUST_LOG=coretape_vm=trace coretape run program.txt
//!
//! A run with no queued input falls back to a line-oriented prompt when the
//! program asks for one, so interactive programs work out of the box.

use clap::{Parser, Subcommand};
use coretape_vm::{Error, ErrorKind, Interpreter, IoQueue, Tape};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "coretape")]
#[command(author, version, about = "Run integer tape programs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Raise log verbosity (-v engine states, -vv every instruction)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a program and run it to completion
    Run {
        /// Program file: one line of comma-separated signed integers
        file: PathBuf,

        /// Input values queued before the run
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        input: Vec<i64>,

        /// Overwrite cells 1 and 2 before the run
        #[arg(short, long, value_name = "NOUN,VERB")]
        patch: Option<String>,

        /// Also print the value of this tape cell after the run
        #[arg(short, long, value_name = "ADDR")]
        result_cell: Option<i64>,
    },
    /// Parse a program file and report its size without running it
    Check {
        /// Program file to validate
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            file,
            input,
            patch,
            result_cell,
        } => run(&file, &input, patch.as_deref(), result_cell),
        Commands::Check { file } => check(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_module("coretape_vm", log::LevelFilter::Debug);
        }
        _ => {
            builder.filter_module("coretape_vm", log::LevelFilter::Trace);
        }
    }
    builder.init();
}

fn run(
    file: &Path,
    input: &[i64],
    patch: Option<&str>,
    result_cell: Option<i64>,
) -> coretape_vm::Result<()> {
    let mut tape = Tape::from_file(file)?;
    if let Some(patch) = patch {
        let (noun, verb) = parse_patch(patch)?;
        tape.patch(noun, verb);
    }

    let outputs = IoQueue::new();
    let mut engine = Interpreter::new(tape)
        .with_inputs(input.iter().copied())
        .with_output(outputs.clone())
        .named(engine_name(file));

    engine.execute()?;

    for value in outputs.drain() {
        println!("{}", value);
    }
    if let Some(addr) = result_cell {
        println!("cell {} = {}", addr, engine.tape_mut().read(addr)?);
    }
    Ok(())
}

fn check(file: &Path) -> coretape_vm::Result<()> {
    let tape = Tape::from_file(file)?;
    println!("{}: {} cells", file.display(), tape.len());
    Ok(())
}

/// Parse a `NOUN,VERB` pair for the legacy cell 1/2 patch
fn parse_patch(patch: &str) -> coretape_vm::Result<(i64, i64)> {
    let bad = || {
        Error::new(
            ErrorKind::ConfigInvalid,
            format!("--patch expects NOUN,VERB, got '{}'", patch),
        )
    };

    let (noun, verb) = patch.split_once(',').ok_or_else(bad)?;
    let noun = noun.trim().parse().map_err(|_| bad())?;
    let verb = verb.trim().parse().map_err(|_| bad())?;
    Ok((noun, verb))
}

fn engine_name(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "engine".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patch() {
        assert_eq!(parse_patch("12,2").unwrap(), (12, 2));
        assert_eq!(parse_patch(" 4 , 5 ").unwrap(), (4, 5));
    }

    #[test]
    fn test_parse_patch_rejects_garbage() {
        assert!(parse_patch("12").is_err());
        assert!(parse_patch("a,b").is_err());
        assert!(parse_patch("1,2,3").is_err());
    }
}
