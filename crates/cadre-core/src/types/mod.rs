//! # Core Type Definitions
//!
//! Identifiers and the error type shared across the cadre domain:
//! - Entity identifiers (`CycleId`, `EmployeeId`, `FeedbackId`)
//! - Error type (`ReviewError`)
//!
//! ## Determinism Guarantees
//!
//! All identifiers implement `Ord` for deterministic ordering in
//! `BTreeMap`/`BTreeSet`. Identifier generation (UUID v4) is the only
//! non-deterministic operation in the crate, and it runs only when the
//! caller does not supply an id of its own.

use crate::cycle::CycleStatus;
use crate::deadlines::CyclePhase;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// ENTITY IDENTIFIERS
// =============================================================================

/// Unique identifier for a review cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CycleId(pub Uuid);

impl CycleId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an employee.
///
/// Used for both roles in a feedback relationship: the reviewer giving
/// feedback and the reviewee receiving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub Uuid);

impl std::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single peer-feedback submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the cadre domain.
///
/// - No silent failures: every invalid score, ordering, or transition is
///   rejected at the point of violation
/// - No clamping or default substitution: an out-of-range score is an
///   error, never coerced to the nearest bound
/// - Use `Result<T, ReviewError>` for fallible operations; the core never
///   panics
#[derive(Debug, Error)]
pub enum ReviewError {
    /// A pillar score outside the valid range, or otherwise not a valid
    /// integer score.
    #[error("invalid pillar score {value}: must be an integer between 0 and 4")]
    InvalidScore { value: i64 },

    /// Two cycle deadlines violate the required chronological sequence.
    #[error("cycle deadlines out of order: {later} must be strictly after {earlier}")]
    InvalidDeadlineOrder {
        earlier: CyclePhase,
        later: CyclePhase,
    },

    /// A state-machine transition attempted from a state that does not
    /// permit it.
    #[error("invalid cycle transition: cycle is {current}, operation requires {required}")]
    InvalidCycleTransition {
        current: CycleStatus,
        required: CycleStatus,
    },

    /// Aggregation attempted over an empty feedback collection.
    #[error("cannot aggregate peer feedback: no submissions provided")]
    NoFeedback,

    /// A free-text or name field failed the ingestion limits.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested cycle does not exist in the store.
    #[error("review cycle not found: {0}")]
    CycleNotFound(CycleId),

    /// A nomination or submission reached a cycle whose state does not
    /// accept it.
    #[error("cycle is {0}: not accepting peer-feedback activity in this state")]
    CycleNotActive(CycleStatus),

    /// The named phase deadline has already passed.
    #[error("the {0} deadline for this cycle has passed")]
    DeadlinePassed(CyclePhase),

    /// A reviewer attempted to nominate or review themselves.
    #[error("reviewers cannot give peer feedback about themselves")]
    SelfFeedback,

    /// No active nomination links the reviewer to the reviewee.
    #[error("reviewer {reviewer} is not nominated to review {reviewee} in this cycle")]
    NotNominated {
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    },

    /// Feedback already exists for this (reviewer, reviewee, cycle) triple.
    #[error("feedback for this reviewee was already submitted by this reviewer in this cycle")]
    DuplicateFeedback,

    /// A serialization or deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A storage backend error occurred.
    #[error("storage error: {0}")]
    Storage(String),
}

// =============================================================================
// TESTS
// =============================================================================
