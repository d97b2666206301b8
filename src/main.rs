//! `jswsfmt` CLI driver.
//!
//! Composes the lexer, parser, transpiler, and (optionally) the formatter
//! overlay for a single run. File I/O, argument parsing, and diagnostic
//! glue live here; the library crate itself never touches a filesystem
//! path or a CLI flag.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use jswsfmt::error::Result;
use jswsfmt::{formatter, lexer, parser, transpiler};

/// Transpiles a small expression language to Whitespace, with an optional
/// host-file overlay.
#[derive(Parser, Debug)]
#[command(name = "jswsfmt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Transpiles a small expression language to Whitespace", long_about = None)]
struct Cli {
    /// Source file to compile.
    #[arg(long)]
    source_file: PathBuf,

    /// Host file to overlay the compiled program onto. If omitted, the raw
    /// Whitespace program is written to the sink.
    #[arg(long)]
    format_file: Option<PathBuf>,

    /// Output sink. Defaults to standard output.
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Raise the tracing filter to `debug`.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();
}

/// Runs lex → parse → transpile → (format | serialize), aborting on the
/// first error per the crate's all-or-nothing compilation contract.
fn run(cli: &Cli) -> Result<()> {
    let source = std::fs::read_to_string(&cli.source_file)?;
    debug!(bytes = source.len(), "read source file");

    let tokens = lexer::tokenize(&source)?;
    debug!(count = tokens.len(), "lexed tokens");

    let program = parser::parse(tokens)?;
    debug!(statements = program.len(), "parsed program");

    let instructions = transpiler::transpile(&program)?;
    debug!(count = instructions.len(), "emitted instructions");

    let mut sink: Box<dyn Write> = match &cli.output_file {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    match &cli.format_file {
        Some(path) => {
            let host = File::open(path)?;
            formatter::format(host, &instructions, &mut sink)?;
            info!(format_file = %path.display(), "overlaid program onto host file");
        }
        None => {
            let raw: String = instructions.iter().map(ToString::to_string).collect();
            sink.write_all(raw.as_bytes())?;
            sink.flush()?;
            info!(instructions = instructions.len(), "wrote raw Whitespace program");
        }
    }

    Ok(())
}
