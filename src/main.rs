// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Binary entry point — CLI parsing, logging setup, I/O wiring
//! OWNERS: @runtime
//! DEPENDS_ON: distsim::{parser, driver, trace, error}

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::info;

use distsim::error::SimError;
use distsim::trace::{NullTraceSink, WriteTraceSink};

/// Discrete-event simulator for a small distributed OS.
#[derive(Parser, Debug)]
#[command(name = "distsim")]
#[command(author = "Open Nexus OS Contributors")]
#[command(version)]
#[command(about = "Simulates round-robin scheduling over synchronous cross-node rendezvous")]
struct Cli {
    /// Program source; reads stdin if omitted.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Where to write the trace and summary; writes stdout if omitted.
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Suppress the per-event trace; emit only the final summary table.
    #[arg(long)]
    quiet: bool,

    /// Raise host-side diagnostic log verbosity (repeatable).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn read_input(path: &Option<PathBuf>) -> Result<String, SimError> {
    match path {
        Some(p) => Ok(fs::read_to_string(p)?),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run(cli: &Cli) -> Result<(), SimError> {
    let text = read_input(&cli.input)?;
    let sim = distsim::parser::parse(&text)?;

    let mut output: Box<dyn Write> = match &cli.output {
        Some(p) => Box::new(fs::File::create(p)?),
        None => Box::new(io::stdout()),
    };

    let rows = if cli.quiet {
        let mut sink = NullTraceSink;
        sim.run(&mut sink)
    } else {
        let mut sink = WriteTraceSink::new(&mut output);
        sim.run(&mut sink)
    };

    for row in &rows {
        writeln!(output, "{}", row.render())?;
    }
    info!("run complete: {} process(es) finished", rows.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("distsim: {err}");
            ExitCode::FAILURE
        }
    }
}
