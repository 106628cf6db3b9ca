//! kitbuild CLI - validate build configs and render CSP headers

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use kitbuild_cli::commands;
use kitbuild_cli::commands::csp::InlineContent;

/// kitbuild - build contracts for adapters, CSP and prerendering
#[derive(Parser)]
#[command(name = "kitbuild")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a build config file
    Validate {
        /// Path to the config file (JSON)
        #[arg(short, long)]
        config: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the CSP headers a config produces
    Csp {
        /// Path to the config file (JSON)
        #[arg(short, long)]
        config: String,

        /// Render headers for a prerendered page (hashes in auto mode, plus a meta tag)
        #[arg(long)]
        prerender: bool,

        /// File holding an inline script body (repeatable)
        #[arg(long = "script")]
        scripts: Vec<String>,

        /// File holding an inline style body (repeatable)
        #[arg(long = "style")]
        styles: Vec<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr so JSON output stays parseable
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let result = match cli.command {
        Commands::Validate { config, json } => commands::validate::run(&config, json),
        Commands::Csp {
            config,
            prerender,
            scripts,
            styles,
            json,
        } => commands::csp::run(
            &config,
            prerender,
            &InlineContent { scripts, styles },
            json,
        ),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
