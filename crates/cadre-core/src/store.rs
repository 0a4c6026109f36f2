//! # Review Store
//!
//! Storage for cycles, nominations, and feedback submissions.
//!
//! This module defines the `ReviewStore` trait and the in-memory
//! implementation. All data structures use `BTreeMap`/`BTreeSet` for
//! deterministic ordering; feedback carries a monotonic sequence number
//! so listings preserve submission order without consulting wall-clock
//! timestamps.

use crate::cycle::ReviewCycle;
use crate::feedback::{Nomination, PeerFeedback};
use crate::types::{CycleId, EmployeeId, ReviewError};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// REVIEWSTORE TRAIT
// =============================================================================

/// The ReviewStore trait defines the storage operations the repository
/// layer needs.
///
/// All fallible operations return `Result<T, ReviewError>` to support
/// both in-memory and persistent storage backends uniformly. Writes are
/// whole-record: a cycle transition is persisted by re-putting the
/// cycle, never by mutating a stored row in place.
pub trait ReviewStore {
    /// Insert or replace a cycle, keyed by its id.
    fn put_cycle(&mut self, cycle: &ReviewCycle) -> Result<(), ReviewError>;

    /// Lookup a cycle by id. Returns an owned copy for storage
    /// compatibility.
    fn cycle(&self, id: CycleId) -> Result<Option<ReviewCycle>, ReviewError>;

    /// All cycles in deterministic (id) order.
    fn cycles(&self) -> Result<Vec<ReviewCycle>, ReviewError>;

    /// Record a nomination. Re-recording the same reviewer→reviewee
    /// pair for a cycle is idempotent (set semantics).
    fn put_nomination(&mut self, nomination: &Nomination) -> Result<(), ReviewError>;

    /// Check whether a nomination links `reviewer` to `reviewee` in the
    /// given cycle.
    fn has_nomination(
        &self,
        cycle: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    ) -> Result<bool, ReviewError>;

    /// All nominations in deterministic (cycle, reviewer, reviewee) order.
    fn nominations(&self) -> Result<Vec<Nomination>, ReviewError>;

    /// Append a feedback submission, assigning it the next sequence
    /// number.
    fn append_feedback(&mut self, feedback: &PeerFeedback) -> Result<(), ReviewError>;

    /// Check whether feedback already exists for the
    /// (cycle, reviewer, reviewee) triple.
    fn has_feedback(
        &self,
        cycle: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    ) -> Result<bool, ReviewError>;

    /// All feedback about one reviewee in one cycle, in submission order.
    fn feedback_for_reviewee(
        &self,
        cycle: CycleId,
        reviewee: EmployeeId,
    ) -> Result<Vec<PeerFeedback>, ReviewError>;

    /// All feedback in submission order.
    fn feedback(&self) -> Result<Vec<PeerFeedback>, ReviewError>;

    /// Get the total number of cycles.
    fn cycle_count(&self) -> Result<usize, ReviewError>;

    /// Get the total number of nominations.
    fn nomination_count(&self) -> Result<usize, ReviewError>;

    /// Get the total number of feedback submissions.
    fn feedback_count(&self) -> Result<usize, ReviewError>;
}

// =============================================================================
// IN-MEMORY IMPLEMENTATION
// =============================================================================

/// The in-memory review store.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
/// No `HashMap` allowed.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    /// Cycle storage: CycleId -> ReviewCycle
    cycles: BTreeMap<CycleId, ReviewCycle>,

    /// Nominations: (cycle, reviewer, reviewee) -> Nomination
    nominations: BTreeMap<(CycleId, EmployeeId, EmployeeId), Nomination>,

    /// Feedback in submission order: sequence -> PeerFeedback
    feedback: BTreeMap<u64, PeerFeedback>,

    /// Duplicate-submission index: (cycle, reviewer, reviewee)
    submissions: BTreeSet<(CycleId, EmployeeId, EmployeeId)>,

    /// Next feedback sequence number
    next_feedback_seq: u64,
}

impl MemStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReviewStore for MemStore {
    fn put_cycle(&mut self, cycle: &ReviewCycle) -> Result<(), ReviewError> {
        self.cycles.insert(cycle.id(), cycle.clone());
        Ok(())
    }

    fn cycle(&self, id: CycleId) -> Result<Option<ReviewCycle>, ReviewError> {
        Ok(self.cycles.get(&id).cloned())
    }

    fn cycles(&self) -> Result<Vec<ReviewCycle>, ReviewError> {
        Ok(self.cycles.values().cloned().collect())
    }

    fn put_nomination(&mut self, nomination: &Nomination) -> Result<(), ReviewError> {
        let key = (
            nomination.cycle_id,
            nomination.reviewer_id,
            nomination.reviewee_id,
        );
        self.nominations.entry(key).or_insert_with(|| nomination.clone());
        Ok(())
    }

    fn has_nomination(
        &self,
        cycle: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    ) -> Result<bool, ReviewError> {
        Ok(self.nominations.contains_key(&(cycle, reviewer, reviewee)))
    }

    fn nominations(&self) -> Result<Vec<Nomination>, ReviewError> {
        Ok(self.nominations.values().cloned().collect())
    }

    fn append_feedback(&mut self, feedback: &PeerFeedback) -> Result<(), ReviewError> {
        self.feedback.insert(self.next_feedback_seq, feedback.clone());
        self.next_feedback_seq = self.next_feedback_seq.saturating_add(1);
        self.submissions.insert((
            feedback.cycle_id(),
            feedback.reviewer_id(),
            feedback.reviewee_id(),
        ));
        Ok(())
    }

    fn has_feedback(
        &self,
        cycle: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    ) -> Result<bool, ReviewError> {
        Ok(self.submissions.contains(&(cycle, reviewer, reviewee)))
    }

    fn feedback_for_reviewee(
        &self,
        cycle: CycleId,
        reviewee: EmployeeId,
    ) -> Result<Vec<PeerFeedback>, ReviewError> {
        Ok(self
            .feedback
            .values()
            .filter(|f| f.cycle_id() == cycle && f.reviewee_id() == reviewee)
            .cloned()
            .collect())
    }

    fn feedback(&self) -> Result<Vec<PeerFeedback>, ReviewError> {
        Ok(self.feedback.values().cloned().collect())
    }

    fn cycle_count(&self) -> Result<usize, ReviewError> {
        Ok(self.cycles.len())
    }

    fn nomination_count(&self) -> Result<usize, ReviewError> {
        Ok(self.nominations.len())
    }

    fn feedback_count(&self) -> Result<usize, ReviewError> {
        Ok(self.feedback.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::NewReviewCycle;
    use crate::deadlines::DeadlineSchedule;
    use crate::feedback::FeedbackSubmission;
    use crate::score::PillarValues;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 9, 0, 0).single().expect("valid date")
    }

    fn employee(n: u128) -> EmployeeId {
        EmployeeId(Uuid::from_u128(n))
    }

    fn cycle() -> ReviewCycle {
        ReviewCycle::create(NewReviewCycle {
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
        })
        .expect("valid cycle")
    }

    fn feedback(cycle: CycleId, reviewer: u128, reviewee: u128) -> PeerFeedback {
        PeerFeedback::new(
            FeedbackSubmission {
                cycle_id: cycle,
                reviewee_id: employee(reviewee),
                reviewer_id: employee(reviewer),
                scores: PillarValues {
                    project_impact: 3,
                    direction: 3,
                    engineering_excellence: 3,
                    operational_ownership: 3,
                    people_impact: 3,
                },
                strengths: None,
                growth_areas: None,
                general_comments: None,
                id: None,
            },
            day(7),
        )
        .expect("valid feedback")
    }

    #[test]
    fn put_cycle_then_lookup() {
        let mut store = MemStore::new();
        let cycle = cycle();

        store.put_cycle(&cycle).expect("put");
        let loaded = store.cycle(cycle.id()).expect("get").expect("present");
        assert_eq!(loaded, cycle);
        assert_eq!(store.cycle_count().expect("count"), 1);
    }

    #[test]
    fn put_cycle_replaces_by_id() {
        let mut store = MemStore::new();
        let mut cycle = cycle();

        store.put_cycle(&cycle).expect("put");
        cycle.activate().expect("activate");
        store.put_cycle(&cycle).expect("re-put");

        assert_eq!(store.cycle_count().expect("count"), 1);
        let loaded = store.cycle(cycle.id()).expect("get").expect("present");
        assert_eq!(loaded.status(), cycle.status());
    }

    #[test]
    fn nominations_are_idempotent() {
        let mut store = MemStore::new();
        let cycle = cycle();
        let nomination = Nomination::new(cycle.id(), employee(1), employee(2), day(2))
            .expect("valid nomination");

        store.put_nomination(&nomination).expect("put");
        store.put_nomination(&nomination).expect("re-put");

        assert_eq!(store.nomination_count().expect("count"), 1);
        assert!(store
            .has_nomination(cycle.id(), employee(1), employee(2))
            .expect("check"));
        assert!(!store
            .has_nomination(cycle.id(), employee(2), employee(1))
            .expect("check"));
    }

    #[test]
    fn feedback_listing_preserves_submission_order() {
        let mut store = MemStore::new();
        let cycle = cycle();

        let first = feedback(cycle.id(), 1, 100);
        let second = feedback(cycle.id(), 2, 100);
        let third = feedback(cycle.id(), 3, 100);

        store.append_feedback(&first).expect("append");
        store.append_feedback(&second).expect("append");
        store.append_feedback(&third).expect("append");

        let listed = store
            .feedback_for_reviewee(cycle.id(), employee(100))
            .expect("list");
        let ids: Vec<_> = listed.iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![first.id(), second.id(), third.id()]);
    }

    #[test]
    fn feedback_listing_is_scoped_to_reviewee_and_cycle() {
        let mut store = MemStore::new();
        let cycle_a = cycle();
        let cycle_b = cycle();

        store.append_feedback(&feedback(cycle_a.id(), 1, 100)).expect("append");
        store.append_feedback(&feedback(cycle_a.id(), 1, 200)).expect("append");
        store.append_feedback(&feedback(cycle_b.id(), 1, 100)).expect("append");

        let listed = store
            .feedback_for_reviewee(cycle_a.id(), employee(100))
            .expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(store.feedback_count().expect("count"), 3);
    }

    #[test]
    fn duplicate_index_tracks_the_triple() {
        let mut store = MemStore::new();
        let cycle = cycle();

        store.append_feedback(&feedback(cycle.id(), 1, 100)).expect("append");

        assert!(store
            .has_feedback(cycle.id(), employee(1), employee(100))
            .expect("check"));
        assert!(!store
            .has_feedback(cycle.id(), employee(1), employee(200))
            .expect("check"));
        assert!(!store
            .has_feedback(cycle.id(), employee(100), employee(1))
            .expect("check"));
    }
}
