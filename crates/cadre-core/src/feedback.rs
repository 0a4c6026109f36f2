//! # Peer Feedback
//!
//! A single anonymized feedback submission from one reviewer about one
//! reviewee, and the nomination record that authorizes it.
//!
//! The entity validates only what it can see in isolation: score range
//! and free-text limits. Workflow-level rules (the peer-feedback
//! deadline, the reviewer→reviewee nomination, duplicate-submission
//! prevention) are enforced by the repository use-cases, which query
//! storage before constructing a new submission.

use crate::primitives::MAX_COMMENT_LENGTH;
use crate::score::{PillarScores, PillarValues};
use crate::types::{CycleId, EmployeeId, FeedbackId, ReviewError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// SUBMISSION PARAMETERS
// =============================================================================

/// Parameters for one peer-feedback submission.
///
/// `id` is optional; a fresh one is generated when absent. Scores arrive
/// as a raw record and are validated during construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    pub cycle_id: CycleId,
    pub reviewee_id: EmployeeId,
    pub reviewer_id: EmployeeId,
    pub scores: PillarValues,
    #[serde(default)]
    pub strengths: Option<String>,
    #[serde(default)]
    pub growth_areas: Option<String>,
    #[serde(default)]
    pub general_comments: Option<String>,
    #[serde(default)]
    pub id: Option<FeedbackId>,
}

// =============================================================================
// PEER FEEDBACK
// =============================================================================

/// One peer-feedback submission. Immutable after creation; a
/// resubmission is a new instance with a new identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerFeedback {
    id: FeedbackId,
    cycle_id: CycleId,
    reviewee_id: EmployeeId,
    reviewer_id: EmployeeId,
    scores: PillarScores,
    strengths: Option<String>,
    growth_areas: Option<String>,
    general_comments: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl PeerFeedback {
    /// Construct a submission, validating scores and free-text limits.
    ///
    /// The submission timestamp is stamped from the supplied `now`.
    pub fn new(submission: FeedbackSubmission, now: DateTime<Utc>) -> Result<Self, ReviewError> {
        let scores = PillarScores::from_values(submission.scores)?;

        check_comment("strengths", submission.strengths.as_deref())?;
        check_comment("growthAreas", submission.growth_areas.as_deref())?;
        check_comment("generalComments", submission.general_comments.as_deref())?;

        Ok(Self {
            id: submission.id.unwrap_or_else(FeedbackId::generate),
            cycle_id: submission.cycle_id,
            reviewee_id: submission.reviewee_id,
            reviewer_id: submission.reviewer_id,
            scores,
            strengths: submission.strengths,
            growth_areas: submission.growth_areas,
            general_comments: submission.general_comments,
            submitted_at: now,
        })
    }

    /// The submission identifier.
    #[must_use]
    pub fn id(&self) -> FeedbackId {
        self.id
    }

    /// The cycle this submission belongs to.
    #[must_use]
    pub fn cycle_id(&self) -> CycleId {
        self.cycle_id
    }

    /// The employee being reviewed.
    #[must_use]
    pub fn reviewee_id(&self) -> EmployeeId {
        self.reviewee_id
    }

    /// The peer who gave the feedback.
    ///
    /// Needed for duplicate-submission checks; aggregated outputs never
    /// carry this field.
    #[must_use]
    pub fn reviewer_id(&self) -> EmployeeId {
        self.reviewer_id
    }

    /// The validated pillar scores.
    #[must_use]
    pub fn scores(&self) -> &PillarScores {
        &self.scores
    }

    /// Free-text strengths, if given.
    #[must_use]
    pub fn strengths(&self) -> Option<&str> {
        self.strengths.as_deref()
    }

    /// Free-text growth areas, if given.
    #[must_use]
    pub fn growth_areas(&self) -> Option<&str> {
        self.growth_areas.as_deref()
    }

    /// Free-text general comments, if given.
    #[must_use]
    pub fn general_comments(&self) -> Option<&str> {
        self.general_comments.as_deref()
    }

    /// When the feedback was submitted.
    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// Peer feedback is anonymized by construction: aggregate outputs
    /// are built by omitting reviewer identity, so there is no flag to
    /// toggle and nothing to redact.
    #[must_use]
    pub const fn is_anonymized(&self) -> bool {
        true
    }
}

fn check_comment(field: &str, text: Option<&str>) -> Result<(), ReviewError> {
    if let Some(text) = text {
        if text.len() > MAX_COMMENT_LENGTH {
            return Err(ReviewError::InvalidInput(format!(
                "{field} length {} exceeds maximum {} bytes",
                text.len(),
                MAX_COMMENT_LENGTH
            )));
        }
    }
    Ok(())
}

// =============================================================================
// NOMINATION
// =============================================================================

/// A reviewer→reviewee nomination scoped to one cycle.
///
/// Peer feedback is only accepted from nominated reviewers; the
/// repository checks this record before constructing a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nomination {
    pub cycle_id: CycleId,
    pub reviewer_id: EmployeeId,
    pub reviewee_id: EmployeeId,
    pub nominated_at: DateTime<Utc>,
}

impl Nomination {
    /// Create a nomination. Reviewers cannot be nominated to review
    /// themselves.
    pub fn new(
        cycle_id: CycleId,
        reviewer_id: EmployeeId,
        reviewee_id: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Self, ReviewError> {
        if reviewer_id == reviewee_id {
            return Err(ReviewError::SelfFeedback);
        }
        Ok(Self {
            cycle_id,
            reviewer_id,
            reviewee_id,
            nominated_at: now,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
