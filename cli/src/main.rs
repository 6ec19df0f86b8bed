//! pairgraph - adjacency lists and reachability closures from pair records.
//!
//! # Commands
//!
//! - `pairgraph build <INPUT>` - write the adjacency report (`.adj`)
//! - `pairgraph solve <INPUT>` - also compute closures and write `.cnt`
//! - `pairgraph verify <INPUT>` - check closures against plain BFS
//!
//! `INPUT` is a path, or a bare number `N` meaning `pairsN.bin`.
//!
//! ```bash
//! pairgraph solve 3 --input-dir data/
//! PAIRGRAPH_FORMAT=json pairgraph build graph.bin
//! ```

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pairgraph_cli::{commands, Settings};

#[derive(Parser)]
#[command(name = "pairgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Pair record file, or a file number N for pairsN.bin
    input: String,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the adjacency list and write the .adj report
    Build(InputArgs),

    /// Build, compute closures, write .adj and .cnt reports
    Solve(InputArgs),

    /// Compare computed closures with a plain BFS reference
    Verify(InputArgs),
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Commands::Build(args) => commands::build(&args.settings, &args.input).map(|adj| {
            println!("Wrote {}", adj.display());
        }),
        Commands::Solve(args) => {
            commands::solve(&args.settings, &args.input).map(|(adj, cnt)| {
                println!("Wrote {} and {}", adj.display(), cnt.display());
            })
        }
        Commands::Verify(args) => commands::verify(&args.settings, &args.input),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
