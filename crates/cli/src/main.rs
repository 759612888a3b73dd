//! availdb CLI — drive the replicated-store simulator from scripts or
//! a prompt.
//!
//! Three modes:
//! - **Script mode**: `availdb script.txt` — run a file, exit
//! - **REPL mode**: `availdb` — interactive prompt (if stdin is a TTY)
//! - **Pipe mode**: `cat script.txt | availdb` — line-by-line from stdin

mod format;
mod parse;
mod repl;

use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use avail_core::{ClusterConfig, DEFAULT_SITE_COUNT, DEFAULT_VARIABLE_COUNT};
use avail_executor::Executor;

use format::OutputMode;

#[derive(Parser, Debug)]
#[command(name = "availdb", version, about = "Replicated-store concurrency simulator")]
struct Cli {
    /// Script file to run; reads stdin when omitted.
    script: Option<PathBuf>,

    /// Emit one JSON document per output instead of text.
    #[arg(long)]
    json: bool,

    /// Number of sites in the cluster.
    #[arg(long, default_value_t = DEFAULT_SITE_COUNT)]
    sites: u32,

    /// Number of variables in the cluster.
    #[arg(long, default_value_t = DEFAULT_VARIABLE_COUNT)]
    variables: u32,

    /// Log engine decisions (lock grants, wait-die verdicts, retries)
    /// to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "avail=debug" } else { "warn" }));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let config = match ClusterConfig::new(cli.sites, cli.variables) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("(error) {error}");
            process::exit(2);
        }
    };
    let mut executor = Executor::new(config);

    let status = match cli.script {
        Some(path) => match File::open(&path) {
            Ok(file) => repl::run_reader(&mut executor, BufReader::new(file), mode),
            Err(error) => {
                eprintln!("(error) cannot open {}: {error}", path.display());
                2
            }
        },
        None if io::stdin().is_terminal() => repl::run_repl(&mut executor, mode),
        None => repl::run_reader(&mut executor, io::stdin().lock(), mode),
    };

    process::exit(status);
}
