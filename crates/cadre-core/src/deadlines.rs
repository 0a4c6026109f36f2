//! # Cycle Deadlines
//!
//! The five chronologically-ordered phase deadlines of a review cycle.
//!
//! ## Ordering Invariant
//!
//! | Order | Phase | Deadline gates |
//! |-------|-------|----------------|
//! | 1 | self-review | employees writing their own review |
//! | 2 | peer-feedback | peers submitting feedback |
//! | 3 | manager-evaluation | managers writing evaluations |
//! | 4 | calibration | cross-team score calibration |
//! | 5 | feedback-delivery | delivering results to employees |
//!
//! Each deadline must be strictly later than the previous one. The
//! invariant is checked once, at construction; a `CycleDeadlines` value
//! is immutable afterwards and owned exclusively by its cycle.

use crate::types::ReviewError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// CYCLE PHASE
// =============================================================================

/// The five deadline-bearing phases of a review cycle, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CyclePhase {
    SelfReview,
    PeerFeedback,
    ManagerEvaluation,
    Calibration,
    FeedbackDelivery,
}

impl CyclePhase {
    /// All phases in canonical chronological order.
    pub const ALL: [CyclePhase; 5] = [
        CyclePhase::SelfReview,
        CyclePhase::PeerFeedback,
        CyclePhase::ManagerEvaluation,
        CyclePhase::Calibration,
        CyclePhase::FeedbackDelivery,
    ];

    /// Get the phase name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CyclePhase::SelfReview => "self-review",
            CyclePhase::PeerFeedback => "peer-feedback",
            CyclePhase::ManagerEvaluation => "manager-evaluation",
            CyclePhase::Calibration => "calibration",
            CyclePhase::FeedbackDelivery => "feedback-delivery",
        }
    }
}

impl std::fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// DEADLINE SCHEDULE (unvalidated record)
// =============================================================================

/// A plain record of the five phase deadlines.
///
/// This is the unvalidated input shape; it becomes a [`CycleDeadlines`]
/// only by passing the strict-ordering check in [`CycleDeadlines::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadlineSchedule {
    pub self_review: DateTime<Utc>,
    pub peer_feedback: DateTime<Utc>,
    pub manager_evaluation: DateTime<Utc>,
    pub calibration: DateTime<Utc>,
    pub feedback_delivery: DateTime<Utc>,
}

impl DeadlineSchedule {
    fn deadline_for(&self, phase: CyclePhase) -> DateTime<Utc> {
        match phase {
            CyclePhase::SelfReview => self.self_review,
            CyclePhase::PeerFeedback => self.peer_feedback,
            CyclePhase::ManagerEvaluation => self.manager_evaluation,
            CyclePhase::Calibration => self.calibration,
            CyclePhase::FeedbackDelivery => self.feedback_delivery,
        }
    }
}

// =============================================================================
// CYCLE DEADLINES (validated)
// =============================================================================

/// The validated, strictly-ordered deadline set of one review cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleDeadlines(DeadlineSchedule);

impl CycleDeadlines {
    /// Validate a schedule into a deadline set.
    ///
    /// Fails with [`ReviewError::InvalidDeadlineOrder`] on the first
    /// adjacent pair that is equal or reversed, naming both phases.
    pub fn new(schedule: DeadlineSchedule) -> Result<Self, ReviewError> {
        for pair in CyclePhase::ALL.windows(2) {
            let (earlier, later) = (pair[0], pair[1]);
            if schedule.deadline_for(later) <= schedule.deadline_for(earlier) {
                return Err(ReviewError::InvalidDeadlineOrder { earlier, later });
            }
        }
        Ok(Self(schedule))
    }

    /// Get the deadline for one phase.
    #[must_use]
    pub fn deadline_for(&self, phase: CyclePhase) -> DateTime<Utc> {
        self.0.deadline_for(phase)
    }

    /// Check whether the named phase deadline has passed at `now`.
    ///
    /// This is the sole query other components use to gate operations.
    /// `now` is always supplied by the caller; the core never reads the
    /// system clock.
    #[must_use]
    pub fn has_passed(&self, phase: CyclePhase, now: DateTime<Utc>) -> bool {
        now > self.deadline_for(phase)
    }

    /// Export the deadline set as a plain schedule record.
    #[must_use]
    pub fn to_schedule(&self) -> DeadlineSchedule {
        self.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
