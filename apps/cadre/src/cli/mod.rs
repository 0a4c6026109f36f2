//! # Cadre CLI Module
//!
//! This module implements the CLI interface for Cadre.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `status` - Show store status
//! - `init` - Initialize a new database
//! - `create-cycle` - Create a review cycle (DRAFT)
//! - `activate` / `calibrate` / `complete` - Advance a cycle's lifecycle
//! - `show` - Show one cycle
//! - `nominate` - Nominate a reviewer for a reviewee
//! - `submit` - Submit peer feedback from a JSON file
//! - `summary` - Print the anonymized aggregate for a reviewee
//! - `export` / `import` - Snapshot the store to/from a file
//! - `checksum` - Print the snapshot checksum of the store

mod commands;

use cadre_core::ReviewError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Cadre - Performance Review Server
///
/// Review cycles, peer nominations, and de-identified feedback
/// aggregation behind one binary.
#[derive(Parser, Debug)]
#[command(name = "cadre")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the review database (default: from config, else cadre.db)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "file" (snapshot file)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Path to a TOML config file (default: cadre.toml if present)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (default: from config, else 127.0.0.1)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default: from config, else 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show store status
    Status,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Create a review cycle (starts in DRAFT)
    CreateCycle {
        /// Cycle name, e.g. "H1 2026"
        #[arg(short, long)]
        name: String,

        /// Review year
        #[arg(short, long)]
        year: i32,

        /// Cycle start date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Self-review deadline
        #[arg(long)]
        self_review: String,

        /// Peer-feedback deadline
        #[arg(long)]
        peer_feedback: String,

        /// Manager-evaluation deadline
        #[arg(long)]
        manager_evaluation: String,

        /// Calibration deadline
        #[arg(long)]
        calibration: String,

        /// Feedback-delivery deadline
        #[arg(long)]
        feedback_delivery: String,
    },

    /// Activate a DRAFT cycle
    Activate {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,
    },

    /// Move an ACTIVE cycle into CALIBRATION
    Calibrate {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,
    },

    /// Complete a cycle in CALIBRATION
    Complete {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,
    },

    /// Show one cycle
    Show {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,
    },

    /// Nominate a reviewer to give feedback about a reviewee
    Nominate {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,

        /// Reviewer employee id
        #[arg(long)]
        reviewer: Uuid,

        /// Reviewee employee id
        #[arg(long)]
        reviewee: Uuid,
    },

    /// Submit peer feedback from a JSON file
    Submit {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,

        /// Path to the submission file (JSON)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Print the anonymized aggregate for a reviewee
    Summary {
        /// Cycle id
        #[arg(short = 'C', long)]
        cycle: Uuid,

        /// Reviewee employee id
        #[arg(long)]
        reviewee: Uuid,
    },

    /// Export the store snapshot to a file
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Import a store snapshot from a file
    Import {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Print the snapshot checksum of the store
    Checksum,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ReviewError> {
    let config = crate::config::AppConfig::load(cli.config.as_deref())?;
    let database = cli.database.clone().unwrap_or_else(|| config.database.clone());
    let backend = cli.backend.clone().unwrap_or_else(|| config.backend.clone());
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            cmd_server(&database, &backend, &host, port).await
        }
        Some(Commands::Status) => cmd_status(&database, &backend, json_mode),
        Some(Commands::Init { force }) => cmd_init(&database, &backend, force),
        Some(Commands::CreateCycle {
            name,
            year,
            start,
            self_review,
            peer_feedback,
            manager_evaluation,
            calibration,
            feedback_delivery,
        }) => cmd_create_cycle(
            &database,
            &backend,
            json_mode,
            CycleArgs {
                name,
                year,
                start,
                self_review,
                peer_feedback,
                manager_evaluation,
                calibration,
                feedback_delivery,
            },
        ),
        Some(Commands::Activate { cycle }) => {
            cmd_transition(&database, &backend, json_mode, cycle, Transition::Activate)
        }
        Some(Commands::Calibrate { cycle }) => {
            cmd_transition(&database, &backend, json_mode, cycle, Transition::Calibrate)
        }
        Some(Commands::Complete { cycle }) => {
            cmd_transition(&database, &backend, json_mode, cycle, Transition::Complete)
        }
        Some(Commands::Show { cycle }) => cmd_show(&database, &backend, json_mode, cycle),
        Some(Commands::Nominate {
            cycle,
            reviewer,
            reviewee,
        }) => cmd_nominate(&database, &backend, cycle, reviewer, reviewee),
        Some(Commands::Submit { cycle, file }) => cmd_submit(&database, &backend, cycle, &file),
        Some(Commands::Summary { cycle, reviewee }) => {
            cmd_summary(&database, &backend, json_mode, cycle, reviewee)
        }
        Some(Commands::Export { output }) => cmd_export(&database, &backend, &output),
        Some(Commands::Import { input }) => cmd_import(&database, &backend, &input),
        Some(Commands::Checksum) => cmd_checksum(&database, &backend, json_mode),
        None => {
            // No subcommand - show status by default
            cmd_status(&database, &backend, json_mode)
        }
    }
}
