//! # Slate CLI Module
//!
//! This module implements the CLI interface for Slate.
//!
//! ## Available Commands
//!
//! - `ladder` - Show the stage ladder of a format
//! - `pipeline` - Show current stage and next steps of a project
//! - `gates` - Evaluate the readiness gates of a project
//! - `readiness` - Compute the readiness score and blockers
//! - `unit` - Judge the latest unit of a metric history
//! - `check` - Run every engine and report whether the project may proceed

mod commands;

use clap::{Parser, Subcommand};
use slate_core::SlateError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Slate - production pipeline gate
///
/// Decides where a project sits on its format's ladder, how ready it is for
/// unit generation, and whether the latest unit may hand off to the next.
#[derive(Parser, Debug)]
#[command(name = "slate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a TOML file overriding weights and thresholds
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the stage ladder of a format
    Ladder {
        /// Format key or alias (e.g. "vertical", "tv-series")
        #[arg(short, long, default_value = "feature_film")]
        format: String,
    },

    /// Show current stage, progress and next steps
    Pipeline {
        /// Path to the project JSON file
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Evaluate readiness gates
    Gates {
        /// Path to the project JSON file
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Compute the readiness score, gates and blockers
    Readiness {
        /// Path to the project JSON file
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Judge the latest unit against the preceding history
    Unit {
        /// Path to the metrics JSON file
        #[arg(short, long)]
        metrics: PathBuf,

        /// Planned number of units in the season
        #[arg(short, long)]
        total_units: Option<u32>,
    },

    /// Run every engine and report whether the project may proceed
    Check {
        /// Path to the project JSON file
        #[arg(short, long)]
        project: PathBuf,

        /// Path to the metrics JSON file
        #[arg(short, long)]
        metrics: Option<PathBuf>,

        /// Planned number of units in the season
        #[arg(short, long)]
        total_units: Option<u32>,
    },
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Informational command, or every gate passed.
    Passed,
    /// A gating command found the project or unit blocked.
    Blocked,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<Outcome, SlateError> {
    let config = crate::project::load_config(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Ladder { format } => cmd_ladder(&format, json_mode),
        Commands::Pipeline { project } => cmd_pipeline(&project, &config, json_mode),
        Commands::Gates { project } => cmd_gates(&project, &config, json_mode),
        Commands::Readiness { project } => cmd_readiness(&project, &config, json_mode),
        Commands::Unit {
            metrics,
            total_units,
        } => cmd_unit(&metrics, total_units, &config, json_mode),
        Commands::Check {
            project,
            metrics,
            total_units,
        } => cmd_check(
            &project,
            metrics.as_deref(),
            total_units,
            &config,
            json_mode,
        ),
    }
}
