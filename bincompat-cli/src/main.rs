//! bincompat CLI - binary compatibility checks between two builds of a library
//!
//! Compares module metadata graphs, prints what changed in the API surface and
//! decides whether the change breaks previously compiled consumers.

use std::path::Path;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::*;
use config::BincompatConfig;
use output::OutputFormat;

/// Detect binary-breaking API changes between two builds.
#[derive(Parser)]
#[command(name = "bincompat")]
#[command(version)]
#[command(about = "Detect binary-breaking API changes between two builds")]
#[command(propagate_version = true)]
#[command(after_help = "Examples:
  bincompat diff old/ new/                    Report API changes
  bincompat check old/ new/ --proposed-version 1.4.0 --fail-on-breaking
  bincompat query Lib.json --methods \"public virtual * *(*)\"")]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Config file (defaults to ./.bincompat.toml)
    #[arg(long, global = true, env = "BINCOMPAT_CONFIG")]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    // ==================== Comparison ====================
    /// Show API surface changes between old and new modules
    #[command(visible_alias = "d")]
    Diff {
        /// Old module file or directory
        old: String,

        /// New module file or directory
        new: String,
    },

    /// Decide whether the change is breaking and which version to release
    #[command(visible_alias = "c")]
    Check {
        /// Old module file or directory
        old: String,

        /// New module file or directory
        new: String,

        /// Version you intend to release (bumped to the next major when breaking)
        #[arg(long)]
        proposed_version: Option<String>,

        /// Exit with status 1 when a breaking change is found
        #[arg(long)]
        fail_on_breaking: bool,
    },

    // ==================== Exploration ====================
    /// Run query strings against a single module
    #[command(visible_alias = "q")]
    Query {
        /// Module file
        module: String,

        /// `;`-separated type queries (default: configured type queries)
        #[arg(long)]
        types: Option<String>,

        /// Method query, e.g. "public virtual * *(*)"
        #[arg(long)]
        methods: Option<String>,

        /// Field query, e.g. "public const * *"
        #[arg(long)]
        fields: Option<String>,

        /// Event query, e.g. "public * *"
        #[arg(long)]
        events: Option<String>,
    },

    // ==================== Utilities ====================
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,

        /// Print where to install the script instead of the script
        #[arg(long)]
        instructions: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => BincompatConfig::load_file(Path::new(path)),
        None => BincompatConfig::load(Path::new(".")),
    };

    // Resolve output format: CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    if let Some(use_color) = config.use_color() {
        colored::control::set_override(use_color);
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            let _ = Cli::command().print_help();
            println!();
            return Ok(());
        }
    };

    match command {
        Commands::Diff { old, new } => diff::run(&old, &new, &config, format).await,
        Commands::Check {
            old,
            new,
            proposed_version,
            fail_on_breaking,
        } => {
            let breaking = check::run(&old, &new, proposed_version.as_deref(), &config, format).await?;
            if breaking && fail_on_breaking {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Query {
            module,
            types,
            methods,
            fields,
            events,
        } => {
            let args = query::QueryArgs {
                types,
                methods,
                fields,
                events,
            };
            query::run(&module, args, &config, format).await
        }
        Commands::Completions {
            shell,
            instructions,
        } => completions::run(shell, instructions, &mut Cli::command()),
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}
