//! arbor: command-line access to the inventory path pipeline and the
//! structured data codec.
//!
//! Results go to stdout; failures go to stderr with exit code 1.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Arbor inventory path and data tool.
#[derive(Parser)]
#[command(name = "arbor", version, about = "Arbor inventory path and data tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a possibly partially-typed path and print its
    /// fully-typed form
    Canon {
        /// The path string; a leading '/' selects the canonical flavor
        path: String,
        /// Canonical origin prepended to reduced absolute paths
        #[arg(long)]
        origin: Option<String>,
        /// Origin that relative paths pop their up-hops against
        #[arg(long)]
        relative_origin: Option<String>,
        /// Expected leaf kind (e.g. Resource, Metric)
        #[arg(long)]
        expect: Option<String>,
    },

    /// Resolve a relative path string against a canonical origin
    Resolve {
        /// Fully-typed canonical origin
        origin: String,
        /// Relative path string, possibly partially typed
        path: String,
        /// Expected leaf kind
        #[arg(long)]
        expect: Option<String>,
    },

    /// Print the relative path from one canonical path to another
    Relativize {
        /// Fully-typed canonical origin
        origin: String,
        /// Fully-typed canonical target
        target: String,
    },

    /// Print the minimal partially-typed form of a path under a context
    Detype {
        /// Fully-typed canonical or relative path string
        path: String,
        /// Canonical origin the reduced form may omit
        #[arg(long)]
        origin: Option<String>,
        /// Origin for reducing relative paths
        #[arg(long)]
        relative_origin: Option<String>,
        /// Expected leaf kind
        #[arg(long)]
        expect: Option<String>,
    },

    /// Normalize a structured-data JSON document (file or stdin)
    Data {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Canon {
            path,
            origin,
            relative_origin,
            expect,
        } => commands::paths::cmd_canon(
            &path,
            origin.as_deref(),
            relative_origin.as_deref(),
            expect.as_deref(),
        ),
        Commands::Resolve {
            origin,
            path,
            expect,
        } => commands::paths::cmd_resolve(&origin, &path, expect.as_deref()),
        Commands::Relativize { origin, target } => {
            commands::paths::cmd_relativize(&origin, &target)
        }
        Commands::Detype {
            path,
            origin,
            relative_origin,
            expect,
        } => commands::paths::cmd_detype(
            &path,
            origin.as_deref(),
            relative_origin.as_deref(),
            expect.as_deref(),
        ),
        Commands::Data { file } => commands::data::cmd_data(file.as_deref()),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(1);
        }
    }
}
