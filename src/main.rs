#[macro_use]
extern crate log;

mod config;
mod output;

use clap::Parser;
use config::{Config, ConfigError, OutputFormat};
use thiserror::Error;

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "gbasm", version, about = "Assembler for the Game Boy CPU")]
struct Cli {
    /// Assembly source, or a binary image with --disassemble.
    input: PathBuf,

    /// Output file. Defaults to the input with the configured extension for binaries, and to
    /// stdout for listings.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write a listing instead of the binary image.
    #[arg(short, long)]
    listing: bool,

    /// Report every failing statement instead of stopping at the first.
    #[arg(long)]
    keep_going: bool,

    /// Address of the first instruction, fx. '0x150'.
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    base: Option<u16>,

    /// Config file to use instead of the one in the config directory.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List the instructions of a binary image.
    #[arg(long, conflicts_with_all = ["listing", "keep_going"])]
    disassemble: bool,
}

fn parse_address(text: &str) -> Result<u16, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|err| format!("invalid address '{text}': {err}"))
}

#[derive(Error, Debug)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read '{}': {err}", path.display())]
    Read { path: PathBuf, err: io::Error },

    #[error("failed to write '{}': {err}", path.display())]
    Write { path: PathBuf, err: io::Error },

    #[error("failed to write listing: {0}")]
    Stdout(io::Error),

    #[error("output '{}' would overwrite the input", .0.display())]
    Overwrite(PathBuf),

    #[error("{count} error(s) in '{}'", path.display())]
    Assemble { count: usize, path: PathBuf },
}

/// Write `text` to `path`, or stdout if there is no path.
fn emit(path: Option<PathBuf>, text: &str) -> Result<(), Error> {
    match path {
        Some(path) => fs::write(&path, text).map_err(|err| Error::Write { path, err }),
        None => io::stdout().lock().write_all(text.as_bytes()).map_err(Error::Stdout),
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_default_file(),
    };

    let base = cli.base.unwrap_or(config.assembler.base);

    if cli.disassemble {
        let bytes = fs::read(&cli.input).map_err(|err| {
            Error::Read { path: cli.input.clone(), err }
        })?;
        return emit(cli.output, &output::disassemble(&bytes, base));
    }

    let source = fs::read_to_string(&cli.input).map_err(|err| {
        Error::Read { path: cli.input.clone(), err }
    })?;

    let result = if cli.keep_going || config.assembler.keep_going {
        gbasm_asm::assemble_all(&source, base)
    } else {
        gbasm_asm::assemble(&source, base).map_err(|diagnostic| vec![diagnostic])
    };

    let program = match result {
        Ok(program) => program,
        Err(diagnostics) => {
            for diagnostic in &diagnostics {
                eprintln!("{diagnostic}\n");
            }
            return Err(Error::Assemble { count: diagnostics.len(), path: cli.input });
        }
    };

    info!(
        "assembled {} instructions and {} symbols from '{}'",
        program.instructions().len(),
        program.symbols().len(),
        cli.input.display(),
    );

    let format = if cli.listing {
        OutputFormat::Listing
    } else {
        config.output.format
    };

    match format {
        OutputFormat::Listing => emit(cli.output, &output::listing(&program)),
        OutputFormat::Binary => {
            let path = cli
                .output
                .unwrap_or_else(|| cli.input.with_extension(&config.output.extension));
            if path == cli.input {
                return Err(Error::Overwrite(path));
            }
            fs::write(&path, program.image()).map_err(|err| Error::Write { path, err })
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[test]
fn address_argument() {
    assert_eq!(parse_address("0x150"), Ok(0x150));
    assert_eq!(parse_address("336"), Ok(336));
    assert!(parse_address("0x10000").is_err());
    assert!(parse_address("-1").is_err());
}

#[test]
fn cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert();

    let cli = Cli::parse_from(["gbasm", "game.asm", "-l", "--base", "0x100"]);
    assert!(cli.listing);
    assert_eq!(cli.base, Some(0x100));
    assert!(Cli::try_parse_from(["gbasm", "game.gb", "--disassemble", "-l"]).is_err());
}
