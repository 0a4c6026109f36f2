//! # Review Cycle
//!
//! The lifecycle state machine governing one review period.
//!
//! ## Status Definitions
//!
//! | Status | Meaning |
//! |--------|---------|
//! | DRAFT | Cycle is being set up; nothing is open yet |
//! | ACTIVE | Reviews and peer feedback are being collected |
//! | CALIBRATION | Scores are cross-checked across teams |
//! | COMPLETED | Terminal; end date recorded |
//!
//! The only legal path is DRAFT → ACTIVE → CALIBRATION → COMPLETED.
//! No transition skips a state and no backward transition exists; every
//! transition site matches exhaustively on the current status.

use crate::deadlines::{CycleDeadlines, CyclePhase, DeadlineSchedule};
use crate::primitives::{MAX_CYCLE_YEAR, MAX_NAME_LENGTH, MIN_CYCLE_YEAR};
use crate::types::{CycleId, ReviewError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// CYCLE STATUS
// =============================================================================

/// Lifecycle status of a review cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleStatus {
    Draft,
    Active,
    Calibration,
    Completed,
}

impl CycleStatus {
    /// Get the status name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CycleStatus::Draft => "DRAFT",
            CycleStatus::Active => "ACTIVE",
            CycleStatus::Calibration => "CALIBRATION",
            CycleStatus::Completed => "COMPLETED",
        }
    }

    /// Get the next status in the lifecycle, if any.
    #[must_use]
    pub fn next(&self) -> Option<CycleStatus> {
        match self {
            CycleStatus::Draft => Some(CycleStatus::Active),
            CycleStatus::Active => Some(CycleStatus::Calibration),
            CycleStatus::Calibration => Some(CycleStatus::Completed),
            CycleStatus::Completed => None,
        }
    }

    /// Check if this status is terminal (COMPLETED).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, CycleStatus::Completed)
    }
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// CREATION PARAMETERS
// =============================================================================

/// Parameters for creating a review cycle.
///
/// `id` is optional; a fresh one is generated when absent. The supplied
/// deadline schedule is validated during creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReviewCycle {
    pub name: String,
    pub year: i32,
    pub start_date: DateTime<Utc>,
    pub deadlines: DeadlineSchedule,
    #[serde(default)]
    pub id: Option<CycleId>,
}

// =============================================================================
// REVIEW CYCLE
// =============================================================================

/// One review period and its lifecycle state.
///
/// Mutated only through its own transition methods; name, year, start
/// date, and deadlines are fixed for the life of the cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCycle {
    id: CycleId,
    name: String,
    year: i32,
    status: CycleStatus,
    deadlines: CycleDeadlines,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
}

impl ReviewCycle {
    /// Create a cycle in DRAFT.
    ///
    /// A cycle always starts in DRAFT regardless of where "now" falls
    /// relative to the supplied deadlines; activation is a separate,
    /// explicit step.
    pub fn create(params: NewReviewCycle) -> Result<Self, ReviewError> {
        if params.name.trim().is_empty() {
            return Err(ReviewError::InvalidInput(
                "cycle name must not be empty".to_string(),
            ));
        }
        if params.name.len() > MAX_NAME_LENGTH {
            return Err(ReviewError::InvalidInput(format!(
                "cycle name length {} exceeds maximum {} bytes",
                params.name.len(),
                MAX_NAME_LENGTH
            )));
        }
        if params.year < MIN_CYCLE_YEAR || params.year > MAX_CYCLE_YEAR {
            return Err(ReviewError::InvalidInput(format!(
                "cycle year {} outside supported range {}..={}",
                params.year, MIN_CYCLE_YEAR, MAX_CYCLE_YEAR
            )));
        }

        let deadlines = CycleDeadlines::new(params.deadlines)?;

        Ok(Self {
            id: params.id.unwrap_or_else(CycleId::generate),
            name: params.name,
            year: params.year,
            status: CycleStatus::Draft,
            deadlines,
            start_date: params.start_date,
            end_date: None,
        })
    }

    /// The cycle identifier.
    #[must_use]
    pub fn id(&self) -> CycleId {
        self.id
    }

    /// The cycle name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The review year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// The current lifecycle status.
    #[must_use]
    pub fn status(&self) -> CycleStatus {
        self.status
    }

    /// The validated deadline set.
    #[must_use]
    pub fn deadlines(&self) -> &CycleDeadlines {
        &self.deadlines
    }

    /// The cycle start date.
    #[must_use]
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// The end date, set only when the cycle completes.
    #[must_use]
    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// DRAFT → ACTIVE. Opens the cycle for reviews and peer feedback.
    pub fn activate(&mut self) -> Result<(), ReviewError> {
        match self.status {
            CycleStatus::Draft => {
                self.status = CycleStatus::Active;
                Ok(())
            }
            current @ (CycleStatus::Active | CycleStatus::Calibration | CycleStatus::Completed) => {
                Err(ReviewError::InvalidCycleTransition {
                    current,
                    required: CycleStatus::Draft,
                })
            }
        }
    }

    /// ACTIVE → CALIBRATION. Closes collection and opens cross-team
    /// score calibration.
    pub fn enter_calibration(&mut self) -> Result<(), ReviewError> {
        match self.status {
            CycleStatus::Active => {
                self.status = CycleStatus::Calibration;
                Ok(())
            }
            current @ (CycleStatus::Draft | CycleStatus::Calibration | CycleStatus::Completed) => {
                Err(ReviewError::InvalidCycleTransition {
                    current,
                    required: CycleStatus::Active,
                })
            }
        }
    }

    /// CALIBRATION → COMPLETED. Terminal; records `now` as the end date.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), ReviewError> {
        match self.status {
            CycleStatus::Calibration => {
                self.status = CycleStatus::Completed;
                self.end_date = Some(now);
                Ok(())
            }
            current @ (CycleStatus::Draft | CycleStatus::Active | CycleStatus::Completed) => {
                Err(ReviewError::InvalidCycleTransition {
                    current,
                    required: CycleStatus::Calibration,
                })
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Check whether the named phase deadline has passed at `now`.
    ///
    /// This is the integration point feedback-submission workflows use to
    /// reject late submissions. It is a query, not a transition: cycle
    /// state never changes here.
    #[must_use]
    pub fn has_deadline_passed(&self, phase: CyclePhase, now: DateTime<Utc>) -> bool {
        self.deadlines.has_passed(phase, now)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 9, 0, 0).single().expect("valid date")
    }

    fn params() -> NewReviewCycle {
        NewReviewCycle {
            name: "H1 2026".to_string(),
            year: 2026,
            start_date: day(1),
            deadlines: DeadlineSchedule {
                self_review: day(5),
                peer_feedback: day(10),
                manager_evaluation: day(15),
                calibration: day(20),
                feedback_delivery: day(25),
            },
            id: None,
        }
    }

    fn new_cycle() -> ReviewCycle {
        ReviewCycle::create(params()).expect("valid cycle")
    }

    #[test]
    fn fresh_cycle_is_draft() {
        let cycle = new_cycle();
        assert_eq!(cycle.status(), CycleStatus::Draft);
        assert!(cycle.end_date().is_none());
    }

    #[test]
    fn full_lifecycle_in_order() {
        let mut cycle = new_cycle();

        cycle.activate().expect("draft -> active");
        assert_eq!(cycle.status(), CycleStatus::Active);

        cycle.enter_calibration().expect("active -> calibration");
        assert_eq!(cycle.status(), CycleStatus::Calibration);

        cycle.complete(day(26)).expect("calibration -> completed");
        assert_eq!(cycle.status(), CycleStatus::Completed);
        assert_eq!(cycle.end_date(), Some(day(26)));
    }

    #[test]
    fn draft_cycle_rejects_calibration_and_complete() {
        let mut cycle = new_cycle();

        assert!(matches!(
            cycle.enter_calibration().expect_err("skip"),
            ReviewError::InvalidCycleTransition {
                current: CycleStatus::Draft,
                required: CycleStatus::Active,
            }
        ));
        assert!(matches!(
            cycle.complete(day(26)).expect_err("skip"),
            ReviewError::InvalidCycleTransition {
                current: CycleStatus::Draft,
                required: CycleStatus::Calibration,
            }
        ));
    }

    #[test]
    fn transitions_fail_on_second_invocation() {
        let mut cycle = new_cycle();

        cycle.activate().expect("first activate");
        assert!(cycle.activate().is_err());

        cycle.enter_calibration().expect("first calibration");
        assert!(cycle.enter_calibration().is_err());

        cycle.complete(day(26)).expect("first complete");
        assert!(cycle.complete(day(27)).is_err());
        // End date keeps the first completion time
        assert_eq!(cycle.end_date(), Some(day(26)));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(CycleStatus::Completed.is_terminal());
        assert_eq!(CycleStatus::Completed.next(), None);
        assert_eq!(CycleStatus::Draft.next(), Some(CycleStatus::Active));
    }

    #[test]
    fn create_rejects_empty_name_and_wild_year() {
        let mut blank = params();
        blank.name = "  ".to_string();
        assert!(ReviewCycle::create(blank).is_err());

        let mut wild = params();
        wild.name = "H1 1999".to_string();
        wild.year = 1999;
        assert!(ReviewCycle::create(wild).is_err());
    }

    #[test]
    fn create_rejects_unordered_deadlines() {
        let mut unordered = params();
        unordered.deadlines.self_review = day(10);
        unordered.deadlines.peer_feedback = day(5);
        assert!(matches!(
            ReviewCycle::create(unordered).expect_err("unordered"),
            ReviewError::InvalidDeadlineOrder { .. }
        ));
    }

    #[test]
    fn supplied_id_is_preserved() {
        let id = CycleId::generate();
        let mut with_id = params();
        with_id.id = Some(id);
        let cycle = ReviewCycle::create(with_id).expect("valid cycle");
        assert_eq!(cycle.id(), id);
    }

    #[test]
    fn deadline_query_does_not_change_state() {
        let cycle = new_cycle();
        assert!(cycle.has_deadline_passed(CyclePhase::SelfReview, day(6)));
        assert!(!cycle.has_deadline_passed(CyclePhase::PeerFeedback, day(6)));
        assert_eq!(cycle.status(), CycleStatus::Draft);
    }

    #[test]
    fn status_display() {
        assert_eq!(CycleStatus::Draft.to_string(), "DRAFT");
        assert_eq!(CycleStatus::Calibration.to_string(), "CALIBRATION");
    }
}
