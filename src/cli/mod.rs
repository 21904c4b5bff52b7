//! Command-line interface for autofmt-hook.
//!
//! This module provides the `autofmt` CLI with subcommands for:
//! - `run`: Format staged sources (what the git hook calls)
//! - `install`: Install the git hook
//! - `uninstall`: Remove the git hook
//! - `init`: Write a configuration file
//! - `list`: List configured formatters

mod commands;

use crate::core::error::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Pre-commit hook that formats staged Python and Rust sources.
#[derive(Debug, Parser)]
#[command(
    name = "autofmt",
    author,
    version,
    about = "Pre-commit hook that formats staged Python and Rust sources",
    long_about = r#"
autofmt formats your sources right before git records a commit.

If any staged file is Python, `black .` runs over the working tree.
If any staged file is Rust, `cargo fmt` runs over the working tree.
Staged files are then re-added so the commit contains the formatted code.

Quick start:
  autofmt install   # Install git hook
  # Done! Commits are now formatted.

Environment variables:
  AUTOFMT_SKIP=1    Skip formatting for this commit
"#,
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use color output.
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Always use color.
    Always,
    /// Auto-detect color support.
    #[default]
    Auto,
    /// Never use color.
    Never,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Format staged sources and re-stage them (run by the git hook).
    #[command(
        visible_alias = "r",
        long_about = "Format staged sources and re-stage them.\n\n\
            Formatters run over the whole working tree, not only the staged \
            files, and staged files are re-added in full. Unstaged edits in a \
            staged file are therefore included in the commit."
    )]
    Run,

    /// Install the git pre-commit hook.
    Install {
        /// Overwrite an existing hook without asking.
        #[arg(short, long)]
        force: bool,

        /// Install this hook script instead of the built-in one.
        #[arg(short, long, value_name = "PATH")]
        source: Option<PathBuf>,
    },

    /// Remove the git pre-commit hook.
    Uninstall,

    /// Write an autofmt.toml with the default formatters.
    #[command(visible_alias = "i")]
    Init {
        /// Overwrite existing configuration.
        #[arg(short, long)]
        force: bool,
    },

    /// List configured formatters.
    #[command(visible_alias = "l")]
    List,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);
    setup_color(cli.color);

    // If no subcommand, run the hook (same as `autofmt run`)
    match cli.command {
        Some(Commands::Run) | None => commands::run(),
        Some(Commands::Install { force, source }) => commands::install(force, source),
        Some(Commands::Uninstall) => commands::uninstall(),
        Some(Commands::Init { force }) => commands::init(force),
        Some(Commands::List) => commands::list(),
        Some(Commands::Completions { shell }) => {
            commands::completions(shell);
            Ok(ExitCode::SUCCESS)
        },
    }
}

/// Sets up logging based on verbosity flags.
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Sets up color output.
fn setup_color(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        },
        ColorChoice::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        },
        ColorChoice::Auto => {
            // Let console crate auto-detect
        },
    }
}
