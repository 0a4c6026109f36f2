//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.
//!
//! All wire shapes use camelCase field names, matching the serialized
//! form of the core's own data structures (`PillarValues`,
//! `AnonymizedPeerFeedback`, ...), so responses can embed those
//! structures directly.

use cadre_core::{
    AnonymizedPeerFeedback, CycleId, DeadlineSchedule, EmployeeId, FeedbackSubmission,
    PeerFeedback, PillarValues, ReviewCycle,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Store status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub cycle_count: usize,
    pub nomination_count: usize,
    pub feedback_count: usize,
    pub persistent: bool,
}

// =============================================================================
// CYCLE REQUEST/RESPONSE
// =============================================================================

/// Cycle creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCycleRequest {
    pub name: String,
    pub year: i32,
    pub start_date: DateTime<Utc>,
    pub deadlines: DeadlineSchedule,
}

impl CreateCycleRequest {
    /// Convert to core creation parameters.
    #[must_use]
    pub fn into_params(self) -> cadre_core::NewReviewCycle {
        cadre_core::NewReviewCycle {
            name: self.name,
            year: self.year,
            start_date: self.start_date,
            deadlines: self.deadlines,
            id: None,
        }
    }
}

/// Wire representation of one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleJson {
    pub id: Uuid,
    pub name: String,
    pub year: i32,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub deadlines: DeadlineSchedule,
}

impl From<&ReviewCycle> for CycleJson {
    fn from(cycle: &ReviewCycle) -> Self {
        Self {
            id: cycle.id().0,
            name: cycle.name().to_string(),
            year: cycle.year(),
            status: cycle.status().name().to_string(),
            start_date: cycle.start_date(),
            end_date: cycle.end_date(),
            deadlines: cycle.deadlines().to_schedule(),
        }
    }
}

/// Single-cycle response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResponse {
    pub success: bool,
    pub cycle: Option<CycleJson>,
    pub error: Option<String>,
}

impl CycleResponse {
    pub fn success(cycle: &ReviewCycle) -> Self {
        Self {
            success: true,
            cycle: Some(CycleJson::from(cycle)),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            cycle: None,
            error: Some(msg.into()),
        }
    }
}

/// Cycle listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleListResponse {
    pub success: bool,
    pub cycles: Vec<CycleJson>,
    pub error: Option<String>,
}

impl CycleListResponse {
    pub fn success(cycles: &[ReviewCycle]) -> Self {
        Self {
            success: true,
            cycles: cycles.iter().map(CycleJson::from).collect(),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            cycles: vec![],
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// NOMINATION REQUEST/RESPONSE
// =============================================================================

/// Nomination request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationRequest {
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
}

/// Nomination response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationResponse {
    pub success: bool,
    pub nominated_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl NominationResponse {
    pub fn success(nominated_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            nominated_at: Some(nominated_at),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            nominated_at: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// FEEDBACK REQUEST/RESPONSE
// =============================================================================

/// Peer-feedback submission request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub reviewer_id: Uuid,
    pub reviewee_id: Uuid,
    pub scores: PillarValues,
    #[serde(default)]
    pub strengths: Option<String>,
    #[serde(default)]
    pub growth_areas: Option<String>,
    #[serde(default)]
    pub general_comments: Option<String>,
}

impl FeedbackRequest {
    /// Convert to a core submission for the cycle named in the path.
    #[must_use]
    pub fn into_submission(self, cycle: CycleId) -> FeedbackSubmission {
        FeedbackSubmission {
            cycle_id: cycle,
            reviewee_id: EmployeeId(self.reviewee_id),
            reviewer_id: EmployeeId(self.reviewer_id),
            scores: self.scores,
            strengths: self.strengths,
            growth_areas: self.growth_areas,
            general_comments: self.general_comments,
            id: None,
        }
    }
}

/// Feedback submission response.
///
/// Echoes only the submission id and time; never the reviewer, so a
/// response body is safe to log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub success: bool,
    pub feedback_id: Option<Uuid>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl FeedbackResponse {
    pub fn success(feedback: &PeerFeedback) -> Self {
        Self {
            success: true,
            feedback_id: Some(feedback.id().0),
            submitted_at: Some(feedback.submitted_at()),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            feedback_id: None,
            submitted_at: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// SUMMARY RESPONSE
// =============================================================================

/// Anonymized aggregate response for one reviewee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: Option<AnonymizedPeerFeedback>,
    pub error: Option<String>,
}

impl SummaryResponse {
    pub fn success(summary: AnonymizedPeerFeedback) -> Self {
        Self {
            success: true,
            summary: Some(summary),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// EXPORT RESPONSE
// =============================================================================

/// Export response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResponse {
    pub success: bool,
    pub data: Option<String>, // Base64 encoded snapshot
    pub checksum: Option<u64>,
    pub error: Option<String>,
}

impl ExportResponse {
    pub fn success(data: Vec<u8>, checksum: u64) -> Self {
        Self {
            success: true,
            data: Some(base64::Engine::encode(
                &base64::engine::general_purpose::STANDARD,
                &data,
            )),
            checksum: Some(checksum),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            checksum: None,
            error: Some(msg.into()),
        }
    }
}
