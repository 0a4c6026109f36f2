//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::api;
use cadre_core::{
    CycleId, DeadlineSchedule, EmployeeId, NewReviewCycle, ReviewCycle, ReviewError,
    ReviewRepository, snapshot_checksum, snapshot_from_bytes, snapshot_to_bytes,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;
use uuid::Uuid;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for a feedback submission file (1 MB).
const MAX_SUBMIT_FILE_SIZE: u64 = 1024 * 1024;

/// Maximum file size for snapshot import (64 MB, matching the snapshot
/// payload cap).
const MAX_IMPORT_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &PathBuf, max_size: u64) -> Result<(), ReviewError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ReviewError::Storage(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ReviewError::InvalidInput(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and ensures it
/// is an existing regular file, preventing path-traversal input like
/// "../../../etc/passwd".
fn validate_file_path(path: &std::path::Path) -> Result<PathBuf, ReviewError> {
    let canonical = path.canonicalize().map_err(|e| {
        ReviewError::Storage(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ReviewError::Storage(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output file path: the parent directory must exist.
fn validate_output_path(path: &std::path::Path) -> Result<PathBuf, ReviewError> {
    let parent = path.parent().unwrap_or(std::path::Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| {
        ReviewError::Storage(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(ReviewError::Storage(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| ReviewError::Storage("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// DATE PARSING
// =============================================================================

/// Parse a CLI date argument: RFC 3339, or a plain YYYY-MM-DD taken as
/// midnight UTC.
fn parse_date(field: &str, input: &str) -> Result<DateTime<Utc>, ReviewError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(ReviewError::InvalidInput(format!(
        "{field}: cannot parse '{input}' (use RFC 3339 or YYYY-MM-DD)"
    )))
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    db_path: &PathBuf,
    backend: &str,
    host: &str,
    port: u16,
) -> Result<(), ReviewError> {
    let repo = load_or_create_repository(db_path, backend)?;

    println!("Cadre Performance Review Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", backend);
    println!("  Database: {:?}", db_path);
    println!();
    println!("Endpoints:");
    println!("  POST /cycles                    - Create a review cycle");
    println!("  GET  /cycles                    - List cycles");
    println!("  POST /cycles/{{id}}/activate     - Activate a cycle");
    println!("  POST /cycles/{{id}}/nominations  - Nominate a reviewer");
    println!("  POST /cycles/{{id}}/feedback     - Submit peer feedback");
    println!("  GET  /cycles/{{id}}/reviewees/{{employee}}/summary - Aggregate");
    println!("  GET  /status                    - Store status");
    println!("  GET  /health                    - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, repo).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store status.
pub fn cmd_status(db_path: &PathBuf, backend: &str, json_mode: bool) -> Result<(), ReviewError> {
    let repo = load_or_create_repository(db_path, backend)?;

    let cycle_count = repo.cycle_count()?;
    let nomination_count = repo.nomination_count()?;
    let feedback_count = repo.feedback_count()?;

    if json_mode {
        let output = serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": backend,
            "cycleCount": cycle_count,
            "nominationCount": nomination_count,
            "feedbackCount": feedback_count,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Cadre Store Status");
    println!("==================");
    println!("Database: {:?}", db_path);
    println!("Backend:  {}", backend);
    println!();
    println!("Cycles:      {}", cycle_count);
    println!("Nominations: {}", nomination_count);
    println!("Feedback:    {}", feedback_count);

    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(db_path: &PathBuf, backend: &str, force: bool) -> Result<(), ReviewError> {
    if db_path.exists() && !force {
        return Err(ReviewError::Storage(
            "Database already exists. Use --force to overwrite.".to_string(),
        ));
    }

    match backend {
        "redb" => {
            let _repo = ReviewRepository::with_redb(db_path)?;
            println!("Initialized new redb database at {:?}", db_path);
        }
        _ => {
            let repo = ReviewRepository::new();
            save_repository(&repo, db_path)?;
            println!("Initialized new file database at {:?}", db_path);
        }
    }

    Ok(())
}

// =============================================================================
// CYCLE COMMANDS
// =============================================================================

/// Raw cycle-creation arguments from the CLI.
#[derive(Debug)]
pub struct CycleArgs {
    pub name: String,
    pub year: i32,
    pub start: String,
    pub self_review: String,
    pub peer_feedback: String,
    pub manager_evaluation: String,
    pub calibration: String,
    pub feedback_delivery: String,
}

/// Create a review cycle.
pub fn cmd_create_cycle(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    args: CycleArgs,
) -> Result<(), ReviewError> {
    let params = NewReviewCycle {
        name: args.name,
        year: args.year,
        start_date: parse_date("start", &args.start)?,
        deadlines: DeadlineSchedule {
            self_review: parse_date("self-review", &args.self_review)?,
            peer_feedback: parse_date("peer-feedback", &args.peer_feedback)?,
            manager_evaluation: parse_date("manager-evaluation", &args.manager_evaluation)?,
            calibration: parse_date("calibration", &args.calibration)?,
            feedback_delivery: parse_date("feedback-delivery", &args.feedback_delivery)?,
        },
        id: None,
    };

    let mut repo = load_or_create_repository(db_path, backend)?;
    let cycle = repo.create_cycle(params)?;
    save_repository(&repo, db_path)?;

    if json_mode {
        print_cycle_json(&cycle);
        return Ok(());
    }

    println!("Created cycle {} ({})", cycle.id(), cycle.name());
    println!("Status: {}", cycle.status());
    Ok(())
}

/// Which lifecycle step to run.
#[derive(Debug, Clone, Copy)]
pub enum Transition {
    Activate,
    Calibrate,
    Complete,
}

/// Advance a cycle's lifecycle.
pub fn cmd_transition(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    cycle: Uuid,
    transition: Transition,
) -> Result<(), ReviewError> {
    let mut repo = load_or_create_repository(db_path, backend)?;
    let id = CycleId(cycle);

    let cycle = match transition {
        Transition::Activate => repo.activate_cycle(id)?,
        Transition::Calibrate => repo.enter_calibration(id)?,
        Transition::Complete => repo.complete_cycle(id, Utc::now())?,
    };
    save_repository(&repo, db_path)?;

    if json_mode {
        print_cycle_json(&cycle);
        return Ok(());
    }

    println!("Cycle {} is now {}", cycle.id(), cycle.status());
    if let Some(end) = cycle.end_date() {
        println!("Ended at {}", end.to_rfc3339());
    }
    Ok(())
}

/// Show one cycle.
pub fn cmd_show(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    cycle: Uuid,
) -> Result<(), ReviewError> {
    let repo = load_or_create_repository(db_path, backend)?;
    let cycle = repo.cycle(CycleId(cycle))?;

    if json_mode {
        print_cycle_json(&cycle);
        return Ok(());
    }

    let schedule = cycle.deadlines().to_schedule();
    println!("Cycle {}", cycle.id());
    println!("  Name:   {}", cycle.name());
    println!("  Year:   {}", cycle.year());
    println!("  Status: {}", cycle.status());
    println!("  Start:  {}", cycle.start_date().to_rfc3339());
    if let Some(end) = cycle.end_date() {
        println!("  End:    {}", end.to_rfc3339());
    }
    println!("  Deadlines:");
    println!("    self-review:        {}", schedule.self_review.to_rfc3339());
    println!("    peer-feedback:      {}", schedule.peer_feedback.to_rfc3339());
    println!(
        "    manager-evaluation: {}",
        schedule.manager_evaluation.to_rfc3339()
    );
    println!("    calibration:        {}", schedule.calibration.to_rfc3339());
    println!(
        "    feedback-delivery:  {}",
        schedule.feedback_delivery.to_rfc3339()
    );
    Ok(())
}

fn print_cycle_json(cycle: &ReviewCycle) {
    let json = api::CycleJson::from(cycle);
    println!(
        "{}",
        serde_json::to_string_pretty(&json).unwrap_or_default()
    );
}

// =============================================================================
// NOMINATE COMMAND
// =============================================================================

/// Nominate a reviewer for a reviewee.
pub fn cmd_nominate(
    db_path: &PathBuf,
    backend: &str,
    cycle: Uuid,
    reviewer: Uuid,
    reviewee: Uuid,
) -> Result<(), ReviewError> {
    let mut repo = load_or_create_repository(db_path, backend)?;
    let nomination = repo.nominate(
        CycleId(cycle),
        EmployeeId(reviewer),
        EmployeeId(reviewee),
        Utc::now(),
    )?;
    save_repository(&repo, db_path)?;

    println!(
        "Nominated {} to review {} in cycle {}",
        nomination.reviewer_id, nomination.reviewee_id, nomination.cycle_id
    );
    Ok(())
}

// =============================================================================
// SUBMIT COMMAND
// =============================================================================

/// Submit peer feedback from a JSON file.
///
/// The file carries the same shape as the HTTP feedback request:
/// `{"reviewerId": ..., "revieweeId": ..., "scores": {...}, "strengths": ...}`
pub fn cmd_submit(
    db_path: &PathBuf,
    backend: &str,
    cycle: Uuid,
    file: &PathBuf,
) -> Result<(), ReviewError> {
    let validated_path = validate_file_path(file)?;
    validate_file_size(&validated_path, MAX_SUBMIT_FILE_SIZE)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| ReviewError::Storage(format!("Read file: {}", e)))?;
    let request: api::FeedbackRequest = serde_json::from_slice(&contents)
        .map_err(|e| ReviewError::InvalidInput(format!("Parse submission: {}", e)))?;

    let mut repo = load_or_create_repository(db_path, backend)?;
    let feedback = repo.submit_feedback(request.into_submission(CycleId(cycle)), Utc::now())?;
    save_repository(&repo, db_path)?;

    println!("Submitted feedback {}", feedback.id());
    println!("Submitted at {}", feedback.submitted_at().to_rfc3339());
    Ok(())
}

// =============================================================================
// SUMMARY COMMAND
// =============================================================================

/// Print the anonymized aggregate for a reviewee.
pub fn cmd_summary(
    db_path: &PathBuf,
    backend: &str,
    json_mode: bool,
    cycle: Uuid,
    reviewee: Uuid,
) -> Result<(), ReviewError> {
    let repo = load_or_create_repository(db_path, backend)?;
    let summary = repo.aggregate_for(CycleId(cycle), EmployeeId(reviewee))?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Peer Feedback Summary");
    println!("=====================");
    println!("Submissions: {}", summary.feedback_count);
    println!();
    println!("Scores:");
    println!("  Project Impact:         {}", summary.project_impact);
    println!("  Direction:              {}", summary.direction);
    println!("  Engineering Excellence: {}", summary.engineering_excellence);
    println!("  Operational Ownership:  {}", summary.operational_ownership);
    println!("  People Impact:          {}", summary.people_impact);

    let comments = &summary.anonymized_comments;
    if !comments.strengths.is_empty() {
        println!();
        println!("Strengths:");
        for text in &comments.strengths {
            println!("  - {}", text);
        }
    }
    if !comments.growth_areas.is_empty() {
        println!();
        println!("Growth Areas:");
        for text in &comments.growth_areas {
            println!("  - {}", text);
        }
    }
    if !comments.general.is_empty() {
        println!();
        println!("General:");
        for text in &comments.general {
            println!("  - {}", text);
        }
    }

    Ok(())
}

// =============================================================================
// EXPORT / IMPORT COMMANDS
// =============================================================================

/// Export the store snapshot to a file.
pub fn cmd_export(
    db_path: &PathBuf,
    backend: &str,
    output: &std::path::Path,
) -> Result<(), ReviewError> {
    let validated_output = validate_output_path(output)?;

    let repo = load_or_create_repository(db_path, backend)?;
    let snapshot = repo.export_snapshot()?;
    let checksum = snapshot_checksum(&snapshot)?;
    let data = snapshot_to_bytes(&snapshot)?;

    std::fs::write(&validated_output, &data)
        .map_err(|e| ReviewError::Storage(format!("Write file: {}", e)))?;

    println!("Checksum: {}", checksum);
    println!("Exported {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

/// Import a store snapshot from a file.
pub fn cmd_import(
    db_path: &PathBuf,
    backend: &str,
    input: &std::path::Path,
) -> Result<(), ReviewError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| ReviewError::Storage(format!("Read file: {}", e)))?;
    let snapshot = snapshot_from_bytes(&data)?;

    let mut repo = load_or_create_repository(db_path, backend)?;
    repo.import_snapshot(&snapshot)?;
    save_repository(&repo, db_path)?;

    println!(
        "Imported {} cycles, {} nominations, {} feedback submissions",
        snapshot.cycles.len(),
        snapshot.nominations.len(),
        snapshot.feedback.len()
    );
    Ok(())
}

// =============================================================================
// CHECKSUM COMMAND
// =============================================================================

/// Print the snapshot checksum of the store.
pub fn cmd_checksum(db_path: &PathBuf, backend: &str, json_mode: bool) -> Result<(), ReviewError> {
    let repo = load_or_create_repository(db_path, backend)?;
    let snapshot = repo.export_snapshot()?;
    let checksum = snapshot_checksum(&snapshot)?;

    if json_mode {
        println!("{}", serde_json::json!({ "checksum": checksum }));
        return Ok(());
    }

    println!("Checksum: {}", checksum);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Load or create a repository from a database path with the specified
/// backend.
pub fn load_or_create_repository(
    db_path: &PathBuf,
    backend: &str,
) -> Result<ReviewRepository, ReviewError> {
    match backend {
        "redb" => ReviewRepository::with_redb(db_path),
        _ => {
            if db_path.exists() {
                let data = std::fs::read(db_path)
                    .map_err(|e| ReviewError::Storage(format!("Read db: {}", e)))?;
                let snapshot = snapshot_from_bytes(&data)?;

                let mut repo = ReviewRepository::new();
                repo.import_snapshot(&snapshot)?;
                Ok(repo)
            } else {
                Ok(ReviewRepository::new())
            }
        }
    }
}

/// Save a repository to a database path.
pub fn save_repository(repo: &ReviewRepository, db_path: &PathBuf) -> Result<(), ReviewError> {
    if repo.is_persistent() {
        // Redb backend - already persisted, nothing to do
        Ok(())
    } else {
        // File backend - write the full snapshot
        let snapshot = repo.export_snapshot()?;
        let data = snapshot_to_bytes(&snapshot)?;
        std::fs::write(db_path, &data)
            .map_err(|e| ReviewError::Storage(format!("Write db: {}", e)))?;
        Ok(())
    }
}
