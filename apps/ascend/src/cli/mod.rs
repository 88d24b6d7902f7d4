//! # Ascend CLI Module
//!
//! This module implements the CLI interface for Ascend.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `init` - Initialize a new database
//! - `stages` - List the stage catalog
//! - `check` - Resolve a snapshot without storing anything
//! - `start` - Record a user's baseline assessment
//! - `log` - Log a workout
//! - `status` - Show a user's stage, bests and next-stage gaps
//! - `history` - List a user's workouts, newest first
//! - `profile` - Set a user's display name

mod commands;

use crate::config::AppConfig;
use ascend_core::{AscendError, WorkoutForm, primitives::DEFAULT_HISTORY_LIMIT};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Ascend - fitness stage progression
///
/// Places users on a ladder of fitness stages from five measured metrics
/// and keeps their personal bests.
#[derive(Parser, Debug)]
#[command(name = "ascend")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the progress database
    #[arg(short = 'D', long, global = true, default_value = "ascend.redb")]
    pub database: PathBuf,

    /// Storage backend: "redb" (ACID database) or "memory" (volatile)
    #[arg(short = 'B', long, global = true, default_value = "redb")]
    pub backend: String,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Workout values as typed. Unparseable or negative entries count as zero.
#[derive(Args, Debug, Clone, Default)]
pub struct SnapshotArgs {
    /// Push-ups completed
    #[arg(long, default_value = "")]
    pub pushups: String,

    /// Sit-ups completed
    #[arg(long, default_value = "")]
    pub situps: String,

    /// Squats completed
    #[arg(long, default_value = "")]
    pub squats: String,

    /// Pull-ups completed
    #[arg(long, default_value = "")]
    pub pullups: String,

    /// 5K run time, minutes part (leave empty if not attempted)
    #[arg(long, default_value = "")]
    pub run_minutes: String,

    /// 5K run time, seconds part
    #[arg(long, default_value = "")]
    pub run_seconds: String,
}

impl SnapshotArgs {
    #[must_use]
    pub fn to_form(&self) -> WorkoutForm {
        WorkoutForm {
            pushups: self.pushups.clone(),
            situps: self.situps.clone(),
            squats: self.squats.clone(),
            pullups: self.pullups.clone(),
            run_minutes: self.run_minutes.clone(),
            run_seconds: self.run_seconds.clone(),
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// List the stage catalog
    Stages,

    /// Resolve the stage for a snapshot without storing it
    Check {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Record a user's baseline assessment
    Start {
        /// User identifier
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Log a workout
    Log {
        /// User identifier
        #[arg(short, long)]
        user: String,

        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Show a user's stage, personal bests and next-stage gaps
    Status {
        /// User identifier
        #[arg(short, long)]
        user: String,
    },

    /// List a user's workouts, newest first
    History {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Maximum number of entries
        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Set a user's display name
    Profile {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Display name
        #[arg(short = 'n', long)]
        username: String,
    },

    /// List users with a started journey
    Users,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AscendError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let ctx = CommandContext {
        database: cli.database,
        backend: cli.backend,
        config,
        json_mode: cli.json_mode,
        verbose: cli.verbose,
    };

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(&ctx, &host, port).await,
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Stages) | None => cmd_stages(&ctx),
        Some(Commands::Check { snapshot }) => cmd_check(&ctx, &snapshot),
        Some(Commands::Start { user, snapshot }) => cmd_start(&ctx, &user, &snapshot),
        Some(Commands::Log { user, snapshot }) => cmd_log(&ctx, &user, &snapshot),
        Some(Commands::Status { user }) => cmd_status(&ctx, &user),
        Some(Commands::History { user, limit }) => cmd_history(&ctx, &user, limit),
        Some(Commands::Profile { user, username }) => cmd_profile(&ctx, &user, &username),
        Some(Commands::Users) => cmd_users(&ctx),
    }
}

// =============================================================================
// TESTS
// =============================================================================
