//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Every handler reads "now" from the system clock exactly once and
//! passes it into the core explicitly.

use super::{
    AppState,
    types::{
        CreateCycleRequest, CycleListResponse, CycleResponse, ExportResponse, FeedbackRequest,
        FeedbackResponse, HealthResponse, NominationRequest, NominationResponse, StatusResponse,
        SummaryResponse,
    },
};
use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use cadre_core::{
    CycleId, EmployeeId, ReviewError, snapshot_checksum, snapshot_to_bytes,
};
use chrono::Utc;
use uuid::Uuid;

/// Map a domain error to the HTTP status it should surface as.
///
/// Validation problems are client errors; state conflicts (wrong cycle
/// phase, missed deadline, duplicate submission) are 409s so callers
/// can distinguish "fix your payload" from "you are too late".
fn error_status(err: &ReviewError) -> StatusCode {
    match err {
        ReviewError::InvalidScore { .. }
        | ReviewError::InvalidDeadlineOrder { .. }
        | ReviewError::InvalidInput(_)
        | ReviewError::SelfFeedback => StatusCode::BAD_REQUEST,

        ReviewError::CycleNotFound(_) | ReviewError::NoFeedback => StatusCode::NOT_FOUND,

        ReviewError::InvalidCycleTransition { .. }
        | ReviewError::CycleNotActive(_)
        | ReviewError::DeadlinePassed(_)
        | ReviewError::NotNominated { .. }
        | ReviewError::DuplicateFeedback => StatusCode::CONFLICT,

        ReviewError::Serialization(_) | ReviewError::Storage(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get store status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let repo = state.repo.read().await;

    let counts = (|| -> Result<(usize, usize, usize), ReviewError> {
        Ok((
            repo.cycle_count()?,
            repo.nomination_count()?,
            repo.feedback_count()?,
        ))
    })();

    match counts {
        Ok((cycle_count, nomination_count, feedback_count)) => (
            StatusCode::OK,
            Json(StatusResponse {
                cycle_count,
                nomination_count,
                feedback_count,
                persistent: repo.is_persistent(),
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Status failed: {}", e),
        )
            .into_response(),
    }
}

// =============================================================================
// CYCLE HANDLERS
// =============================================================================

/// Create a review cycle (in DRAFT).
pub async fn create_cycle_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateCycleRequest>,
) -> impl IntoResponse {
    let mut repo = state.repo.write().await;
    match repo.create_cycle(request.into_params()) {
        Ok(cycle) => (StatusCode::CREATED, Json(CycleResponse::success(&cycle))),
        Err(e) => (error_status(&e), Json(CycleResponse::error(e.to_string()))),
    }
}

/// List all cycles.
pub async fn list_cycles_handler(State(state): State<AppState>) -> impl IntoResponse {
    let repo = state.repo.read().await;
    match repo.cycles() {
        Ok(cycles) => (StatusCode::OK, Json(CycleListResponse::success(&cycles))),
        Err(e) => (error_status(&e), Json(CycleListResponse::error(e.to_string()))),
    }
}

/// Get one cycle.
pub async fn get_cycle_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = state.repo.read().await;
    match repo.cycle(CycleId(id)) {
        Ok(cycle) => (StatusCode::OK, Json(CycleResponse::success(&cycle))),
        Err(e) => (error_status(&e), Json(CycleResponse::error(e.to_string()))),
    }
}

/// DRAFT → ACTIVE.
pub async fn activate_cycle_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut repo = state.repo.write().await;
    match repo.activate_cycle(CycleId(id)) {
        Ok(cycle) => (StatusCode::OK, Json(CycleResponse::success(&cycle))),
        Err(e) => (error_status(&e), Json(CycleResponse::error(e.to_string()))),
    }
}

/// ACTIVE → CALIBRATION.
pub async fn calibrate_cycle_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut repo = state.repo.write().await;
    match repo.enter_calibration(CycleId(id)) {
        Ok(cycle) => (StatusCode::OK, Json(CycleResponse::success(&cycle))),
        Err(e) => (error_status(&e), Json(CycleResponse::error(e.to_string()))),
    }
}

/// CALIBRATION → COMPLETED.
pub async fn complete_cycle_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let mut repo = state.repo.write().await;
    match repo.complete_cycle(CycleId(id), Utc::now()) {
        Ok(cycle) => (StatusCode::OK, Json(CycleResponse::success(&cycle))),
        Err(e) => (error_status(&e), Json(CycleResponse::error(e.to_string()))),
    }
}

// =============================================================================
// NOMINATION HANDLER
// =============================================================================

/// Nominate a reviewer for a reviewee in this cycle.
pub async fn nominate_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NominationRequest>,
) -> impl IntoResponse {
    let mut repo = state.repo.write().await;
    match repo.nominate(
        CycleId(id),
        EmployeeId(request.reviewer_id),
        EmployeeId(request.reviewee_id),
        Utc::now(),
    ) {
        Ok(nomination) => (
            StatusCode::CREATED,
            Json(NominationResponse::success(nomination.nominated_at)),
        ),
        Err(e) => (error_status(&e), Json(NominationResponse::error(e.to_string()))),
    }
}

// =============================================================================
// FEEDBACK HANDLER
// =============================================================================

/// Submit peer feedback for this cycle.
pub async fn submit_feedback_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<FeedbackRequest>,
) -> impl IntoResponse {
    let mut repo = state.repo.write().await;
    match repo.submit_feedback(request.into_submission(CycleId(id)), Utc::now()) {
        Ok(feedback) => (StatusCode::CREATED, Json(FeedbackResponse::success(&feedback))),
        Err(e) => (error_status(&e), Json(FeedbackResponse::error(e.to_string()))),
    }
}

// =============================================================================
// SUMMARY HANDLER
// =============================================================================

/// Anonymized aggregate feedback for one reviewee in this cycle.
pub async fn summary_handler(
    State(state): State<AppState>,
    Path((id, employee_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = state.repo.read().await;
    match repo.aggregate_for(CycleId(id), EmployeeId(employee_id)) {
        Ok(summary) => (StatusCode::OK, Json(SummaryResponse::success(summary))),
        Err(e) => (error_status(&e), Json(SummaryResponse::error(e.to_string()))),
    }
}

// =============================================================================
// EXPORT HANDLER
// =============================================================================

/// Export the full store as a base64-encoded snapshot.
pub async fn export_handler(State(state): State<AppState>) -> impl IntoResponse {
    let repo = state.repo.read().await;

    let snapshot = match repo.export_snapshot() {
        Ok(s) => s,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ExportResponse::error(format!(
                    "Failed to build snapshot: {}",
                    e
                ))),
            );
        }
    };

    match (snapshot_to_bytes(&snapshot), snapshot_checksum(&snapshot)) {
        (Ok(data), Ok(checksum)) => (StatusCode::OK, Json(ExportResponse::success(data, checksum))),
        (Err(e), _) | (_, Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ExportResponse::error(format!("Export failed: {}", e))),
        ),
    }
}
