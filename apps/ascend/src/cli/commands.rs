//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::SnapshotArgs;
use crate::{api, config::AppConfig, now};
use ascend_core::{
    AscendError, Journey, PerformanceSnapshot, RunGap, StageProgress, StorageBackend, UserId,
    UserProgress, WorkoutEntry,
};
use std::path::PathBuf;

/// Settings shared by every command.
#[derive(Debug)]
pub struct CommandContext {
    pub database: PathBuf,
    pub backend: String,
    pub config: AppConfig,
    pub json_mode: bool,
    pub verbose: bool,
}

impl CommandContext {
    fn open_journey(&self) -> Result<Journey<StorageBackend>, AscendError> {
        self.config.open_journey(&self.database, &self.backend)
    }
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(ctx: &CommandContext, host: &str, port: u16) -> Result<(), AscendError> {
    let journey = ctx.open_journey()?;

    println!("Ascend Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", ctx.backend);
    println!("  Database: {:?}", ctx.database);
    println!("  Policy:   {}", journey.policy());
    println!("  Stages:   {}", journey.catalog().len());
    println!();
    println!("Endpoints:");
    println!("  GET  /health   - Health check");
    println!("  GET  /stages   - Stage catalog");
    println!("  POST /resolve  - Resolve a snapshot");
    println!("  POST /journey  - Record baseline");
    println!("  GET  /progress - Current stage and bests");
    println!("  POST /workouts - Log a workout");
    println!("  GET  /workouts - Workout history");
    println!("  PUT  /profile  - Set display name");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, journey).await
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(ctx: &CommandContext, force: bool) -> Result<(), AscendError> {
    if ctx.backend != "redb" {
        println!("Backend '{}' keeps nothing on disk; nothing to initialize", ctx.backend);
        return Ok(());
    }

    if ctx.database.exists() {
        if !force {
            return Err(AscendError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(&ctx.database)
            .map_err(|e| AscendError::IoError(format!("Remove existing database: {}", e)))?;
    }

    let _journey = ctx.open_journey()?;
    println!("Initialized new redb database at {:?}", ctx.database);
    Ok(())
}

// =============================================================================
// STAGES COMMAND
// =============================================================================

/// List the stage catalog.
pub fn cmd_stages(ctx: &CommandContext) -> Result<(), AscendError> {
    let catalog = ctx.config.catalog()?;

    if ctx.json_mode {
        let stages: Vec<&ascend_core::StageDefinition> = catalog.iter().collect();
        print_json(&serde_json::json!({
            "policy": ctx.config.journey.stage_policy,
            "stages": stages,
        }));
        return Ok(());
    }

    println!("Ascend Stages");
    println!("=============");
    println!(
        "{:<4} {:<24} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "Rank", "Title", "Push-ups", "Sit-ups", "Squats", "Pull-ups", "5K (max)"
    );
    for stage in catalog.iter() {
        let t = &stage.thresholds;
        println!(
            "{:<4} {:<24} {:>8} {:>8} {:>8} {:>8} {:>10}",
            stage.rank,
            stage.title,
            t.pushups,
            t.situps,
            t.squats,
            t.pullups,
            t.max_run_5k.to_string()
        );
    }
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Resolve a snapshot without touching storage.
pub fn cmd_check(ctx: &CommandContext, args: &SnapshotArgs) -> Result<(), AscendError> {
    let snapshot = args.to_form().to_snapshot();
    snapshot.validate()?;

    let resolver = ascend_core::StageResolver::new(ctx.config.catalog()?);
    let stage = resolver.resolve(&snapshot).clone();
    let progress = resolver.progress_to_next(&snapshot, stage.rank);

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "snapshot": snapshot,
            "stage": stage,
            "progress": progress,
        }));
        return Ok(());
    }

    print_snapshot("Snapshot", &snapshot);
    println!();
    println!("Stage: {}", stage);
    print_progress(&progress);
    Ok(())
}

// =============================================================================
// JOURNEY COMMANDS
// =============================================================================

/// Record the baseline assessment.
pub fn cmd_start(ctx: &CommandContext, user: &str, args: &SnapshotArgs) -> Result<(), AscendError> {
    let user = UserId::parse(user)?;
    let baseline = args.to_form().to_snapshot();
    let mut journey = ctx.open_journey()?;

    let progress = journey.start(&user, baseline, now())?;
    tracing::info!(
        event = "journey_started",
        user = %user,
        stage = progress.current_stage.rank,
        "Baseline recorded"
    );

    if ctx.json_mode {
        print_json(&serde_json::json!({ "progress": progress }));
        return Ok(());
    }

    println!("Journey started for {}", user);
    print_snapshot("Baseline", &progress.baseline);
    println!();
    println!("Starting stage: {}", progress.current_stage);
    Ok(())
}

/// Log a workout.
pub fn cmd_log(ctx: &CommandContext, user: &str, args: &SnapshotArgs) -> Result<(), AscendError> {
    let user = UserId::parse(user)?;
    let snapshot = args.to_form().to_snapshot();
    let mut journey = ctx.open_journey()?;

    let outcome = journey.log_workout(&user, snapshot, now())?;
    tracing::info!(
        event = "workout_logged",
        user = %user,
        seq = outcome.entry.seq,
        stage = outcome.stage.rank,
        change = ?outcome.change,
        improved = outcome.merge.improved(),
        "Workout logged"
    );

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "headline": outcome.headline(),
            "outcome": outcome,
        }));
        return Ok(());
    }

    println!("{}", outcome.headline());
    println!();
    println!("Stage: {}", outcome.stage);
    if outcome.stage != outcome.previous_stage {
        println!("  (was {})", outcome.previous_stage);
    }
    let records = outcome.merge.records();
    if !records.is_empty() {
        let names: Vec<&str> = records.iter().map(|m| m.label()).collect();
        println!("New records: {}", names.join(", "));
    }
    if ctx.verbose {
        println!();
        print_snapshot("Personal bests", outcome.merge.best());
    }
    Ok(())
}

/// Show current stage, personal bests and the gaps to the next stage.
pub fn cmd_status(ctx: &CommandContext, user: &str) -> Result<(), AscendError> {
    let user = UserId::parse(user)?;
    let journey = ctx.open_journey()?;

    let progress = journey.progress(&user)?;
    let next = journey.progress_to_next(&user)?;
    let workouts = journey.workout_count(&user)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({
            "progress": progress,
            "next": next,
            "workout_count": workouts,
        }));
        return Ok(());
    }

    println!("Ascend Status");
    println!("=============");
    println!("User:     {}", progress.user);
    if let Some(name) = &progress.username {
        println!("Name:     {}", name);
    }
    println!("Workouts: {}", workouts);
    println!();
    println!("Current Stage: {}", progress.current_stage);
    print_progress(&next);
    println!();
    print_snapshot("Personal bests", &progress.best);
    if ctx.verbose {
        println!();
        print_snapshot("Baseline", &progress.baseline);
    }
    Ok(())
}

/// List workouts, newest first.
pub fn cmd_history(ctx: &CommandContext, user: &str, limit: usize) -> Result<(), AscendError> {
    let user = UserId::parse(user)?;
    let journey = ctx.open_journey()?;
    let entries = journey.history(&user, limit)?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "workouts": entries }));
        return Ok(());
    }

    if entries.is_empty() {
        println!("No workouts logged yet");
        return Ok(());
    }

    println!(
        "{:>5} {:>12} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "#", "Recorded", "Push-ups", "Sit-ups", "Squats", "Pull-ups", "5K"
    );
    for entry in &entries {
        print_entry(entry);
    }
    Ok(())
}

/// Set the display name.
pub fn cmd_profile(ctx: &CommandContext, user: &str, username: &str) -> Result<(), AscendError> {
    let user = UserId::parse(user)?;
    let mut journey = ctx.open_journey()?;
    let progress = journey.set_username(&user, username, now())?;

    if ctx.json_mode {
        print_json(&serde_json::json!({ "progress": progress }));
        return Ok(());
    }

    println!(
        "Display name for {} set to '{}'",
        progress.user,
        progress.username.as_deref().unwrap_or_default()
    );
    Ok(())
}

/// List every user with a started journey and their current stage.
pub fn cmd_users(ctx: &CommandContext) -> Result<(), AscendError> {
    let journey = ctx.open_journey()?;
    let records = started_journeys(&journey)?;

    if ctx.json_mode {
        let users: Vec<serde_json::Value> = records
            .iter()
            .map(|p| {
                serde_json::json!({
                    "user": p.user,
                    "username": p.username,
                    "stage": p.current_stage.rank,
                    "title": p.current_stage.title,
                })
            })
            .collect();
        print_json(&serde_json::json!({ "users": users }));
        return Ok(());
    }

    if records.is_empty() {
        println!("No journeys started yet");
        return Ok(());
    }

    println!("{:<24} {:<20} {:>5}  Title", "User", "Name", "Stage");
    for progress in &records {
        println!(
            "{:<24} {:<20} {:>5}  {}",
            progress.user,
            progress.username.as_deref().unwrap_or("-"),
            progress.current_stage.rank,
            progress.current_stage.title
        );
    }
    Ok(())
}

fn started_journeys(journey: &Journey<StorageBackend>) -> Result<Vec<UserProgress>, AscendError> {
    journey
        .users()?
        .iter()
        .map(|user| journey.progress(user))
        .collect()
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn format_run(snapshot: &PerformanceSnapshot) -> String {
    if snapshot.run_5k.is_recorded() {
        snapshot.run_5k.to_string()
    } else {
        "-".to_string()
    }
}

fn print_snapshot(heading: &str, snapshot: &PerformanceSnapshot) {
    println!("{}:", heading);
    println!("  Push-ups: {}", snapshot.pushups);
    println!("  Sit-ups:  {}", snapshot.situps);
    println!("  Squats:   {}", snapshot.squats);
    println!("  Pull-ups: {}", snapshot.pullups);
    println!("  5K run:   {}", format_run(snapshot));
}

fn print_entry(entry: &WorkoutEntry) {
    let s = &entry.snapshot;
    println!(
        "{:>5} {:>12} {:>8} {:>8} {:>8} {:>8} {:>10}",
        entry.seq,
        entry.recorded_at.as_secs(),
        s.pushups,
        s.situps,
        s.squats,
        s.pullups,
        format_run(s)
    );
}

fn print_progress(progress: &StageProgress) {
    let Some(next) = &progress.next else {
        println!("Final stage reached");
        return;
    };

    println!("Next Stage: {}", next);
    println!("Progress:   {}%", progress.percent);
    for gap in &progress.rep_gaps {
        println!(
            "  {:<8} {} / {} ({} to go)",
            gap.metric.label(),
            gap.current,
            gap.required,
            gap.remaining
        );
    }
    match progress.run_gap {
        RunGap::Met => {}
        RunGap::Faster(by) => println!("  5K run   {} faster needed", by),
        RunGap::NotRecorded => println!(
            "  5K run   not recorded (limit {})",
            next.thresholds.max_run_5k
        ),
    }
}

// =============================================================================
// TESTS
// =============================================================================
