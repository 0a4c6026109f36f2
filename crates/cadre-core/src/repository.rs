//! # Repository Module
//!
//! The high-level facade over a review store, carrying the workflow
//! rules that individual entities deliberately do not enforce:
//!
//! - Peer feedback is accepted only for ACTIVE cycles whose
//!   peer-feedback deadline has not passed
//! - Only nominated reviewers may submit, and never about themselves
//! - One submission per (reviewer, reviewee, cycle) triple
//!
//! These checks query storage before a new entity is constructed, so
//! the entities themselves stay pure value objects. Serialization of
//! racing writers is the caller's concern; the app layer wraps the
//! repository in a lock.
//!
//! ## Storage Backends
//!
//! The repository supports two storage backends:
//! - `InMemory`: fast, volatile unless explicitly exported
//! - `Persistent`: disk-backed ACID storage via redb

use crate::aggregation::{AnonymizedPeerFeedback, anonymize_feedback};
use crate::cycle::{CycleStatus, NewReviewCycle, ReviewCycle};
use crate::deadlines::CyclePhase;
use crate::feedback::{FeedbackSubmission, Nomination, PeerFeedback};
use crate::formats::Snapshot;
use crate::storage::RedbStore;
use crate::store::{MemStore, ReviewStore};
use crate::types::{CycleId, EmployeeId, ReviewError};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Storage backend for a repository.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemStore::new())
    }
}

// NOTE: StorageBackend does NOT implement Clone.
// RedbStore (database handle) cannot be safely cloned.

/// The review repository: one storage backend plus the submission
/// workflow.
#[derive(Debug, Default)]
pub struct ReviewRepository {
    backend: StorageBackend,
}

impl ReviewRepository {
    /// Create a new empty repository with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository over an existing in-memory store.
    #[must_use]
    pub fn with_mem_store(store: MemStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// Create a repository with persistent redb storage.
    ///
    /// Opens or creates a redb database at the given path. All changes
    /// are automatically persisted to disk.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, ReviewError> {
        let store = RedbStore::open(path)?;
        Ok(Self {
            backend: StorageBackend::Persistent(store),
        })
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    fn store(&self) -> &dyn ReviewStore {
        match &self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn ReviewStore {
        match &mut self.backend {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    // =========================================================================
    // CYCLE LIFECYCLE
    // =========================================================================

    /// Create a cycle (in DRAFT) and persist it.
    pub fn create_cycle(&mut self, params: NewReviewCycle) -> Result<ReviewCycle, ReviewError> {
        let cycle = ReviewCycle::create(params)?;
        self.store_mut().put_cycle(&cycle)?;
        Ok(cycle)
    }

    /// Load a cycle or fail with `CycleNotFound`.
    pub fn cycle(&self, id: CycleId) -> Result<ReviewCycle, ReviewError> {
        self.store()
            .cycle(id)?
            .ok_or(ReviewError::CycleNotFound(id))
    }

    /// All cycles in deterministic order.
    pub fn cycles(&self) -> Result<Vec<ReviewCycle>, ReviewError> {
        self.store().cycles()
    }

    /// DRAFT → ACTIVE, persisted.
    pub fn activate_cycle(&mut self, id: CycleId) -> Result<ReviewCycle, ReviewError> {
        let mut cycle = self.cycle(id)?;
        cycle.activate()?;
        self.store_mut().put_cycle(&cycle)?;
        Ok(cycle)
    }

    /// ACTIVE → CALIBRATION, persisted.
    pub fn enter_calibration(&mut self, id: CycleId) -> Result<ReviewCycle, ReviewError> {
        let mut cycle = self.cycle(id)?;
        cycle.enter_calibration()?;
        self.store_mut().put_cycle(&cycle)?;
        Ok(cycle)
    }

    /// CALIBRATION → COMPLETED, persisted; records `now` as end date.
    pub fn complete_cycle(
        &mut self,
        id: CycleId,
        now: DateTime<Utc>,
    ) -> Result<ReviewCycle, ReviewError> {
        let mut cycle = self.cycle(id)?;
        cycle.complete(now)?;
        self.store_mut().put_cycle(&cycle)?;
        Ok(cycle)
    }

    // =========================================================================
    // NOMINATIONS
    // =========================================================================

    /// Nominate a reviewer to give feedback about a reviewee.
    ///
    /// Allowed while the cycle is DRAFT or ACTIVE; once calibration
    /// starts the reviewer set is frozen. Re-nominating the same pair
    /// is idempotent.
    pub fn nominate(
        &mut self,
        cycle_id: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<Nomination, ReviewError> {
        let cycle = self.cycle(cycle_id)?;
        match cycle.status() {
            CycleStatus::Draft | CycleStatus::Active => {}
            status @ (CycleStatus::Calibration | CycleStatus::Completed) => {
                return Err(ReviewError::CycleNotActive(status));
            }
        }

        let nomination = Nomination::new(cycle_id, reviewer, reviewee, now)?;
        self.store_mut().put_nomination(&nomination)?;
        Ok(nomination)
    }

    // =========================================================================
    // FEEDBACK SUBMISSION
    // =========================================================================

    /// Submit peer feedback, enforcing the full workflow:
    ///
    /// 1. the cycle exists and is ACTIVE
    /// 2. the peer-feedback deadline has not passed at `now`
    /// 3. the reviewer is not the reviewee
    /// 4. an active nomination links reviewer → reviewee for the cycle
    /// 5. no feedback exists yet for the (reviewer, reviewee, cycle) triple
    pub fn submit_feedback(
        &mut self,
        submission: FeedbackSubmission,
        now: DateTime<Utc>,
    ) -> Result<PeerFeedback, ReviewError> {
        let cycle = self.cycle(submission.cycle_id)?;

        match cycle.status() {
            CycleStatus::Active => {}
            status @ (CycleStatus::Draft | CycleStatus::Calibration | CycleStatus::Completed) => {
                return Err(ReviewError::CycleNotActive(status));
            }
        }

        if cycle.has_deadline_passed(CyclePhase::PeerFeedback, now) {
            return Err(ReviewError::DeadlinePassed(CyclePhase::PeerFeedback));
        }

        if submission.reviewer_id == submission.reviewee_id {
            return Err(ReviewError::SelfFeedback);
        }

        if !self.store().has_nomination(
            submission.cycle_id,
            submission.reviewer_id,
            submission.reviewee_id,
        )? {
            return Err(ReviewError::NotNominated {
                reviewer: submission.reviewer_id,
                reviewee: submission.reviewee_id,
            });
        }

        if self.store().has_feedback(
            submission.cycle_id,
            submission.reviewer_id,
            submission.reviewee_id,
        )? {
            return Err(ReviewError::DuplicateFeedback);
        }

        let feedback = PeerFeedback::new(submission, now)?;
        self.store_mut().append_feedback(&feedback)?;
        Ok(feedback)
    }

    // =========================================================================
    // AGGREGATION
    // =========================================================================

    /// All feedback about one reviewee in one cycle, in submission order.
    pub fn feedback_for(
        &self,
        cycle_id: CycleId,
        reviewee: EmployeeId,
    ) -> Result<Vec<PeerFeedback>, ReviewError> {
        // Surface a missing cycle as such rather than an empty list
        let _ = self.cycle(cycle_id)?;
        self.store().feedback_for_reviewee(cycle_id, reviewee)
    }

    /// The anonymized aggregate report for one reviewee in one cycle.
    ///
    /// Fails with `NoFeedback` when nothing has been submitted yet.
    pub fn aggregate_for(
        &self,
        cycle_id: CycleId,
        reviewee: EmployeeId,
    ) -> Result<AnonymizedPeerFeedback, ReviewError> {
        let feedback = self.feedback_for(cycle_id, reviewee)?;
        anonymize_feedback(&feedback)
    }

    // =========================================================================
    // METRICS
    // =========================================================================

    /// Get the number of cycles.
    pub fn cycle_count(&self) -> Result<usize, ReviewError> {
        self.store().cycle_count()
    }

    /// Get the number of nominations.
    pub fn nomination_count(&self) -> Result<usize, ReviewError> {
        self.store().nomination_count()
    }

    /// Get the number of feedback submissions.
    pub fn feedback_count(&self) -> Result<usize, ReviewError> {
        self.store().feedback_count()
    }

    // =========================================================================
    // EXPORT / IMPORT
    // =========================================================================

    /// Build a full snapshot of the store, for export.
    ///
    /// Works with both backends; the snapshot is an ordered copy, not a
    /// live view.
    pub fn export_snapshot(&self) -> Result<Snapshot, ReviewError> {
        Ok(Snapshot {
            cycles: self.store().cycles()?,
            nominations: self.store().nominations()?,
            feedback: self.store().feedback()?,
        })
    }

    /// Import a snapshot into this repository.
    ///
    /// Records are upserted in snapshot order; feedback keeps its
    /// original submission order.
    pub fn import_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), ReviewError> {
        for cycle in &snapshot.cycles {
            self.store_mut().put_cycle(cycle)?;
        }
        for nomination in &snapshot.nominations {
            self.store_mut().put_nomination(nomination)?;
        }
        for feedback in &snapshot.feedback {
            self.store_mut().append_feedback(feedback)?;
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadlines::DeadlineSchedule;
    use crate::score::PillarValues;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 9, 0, 0).single().expect("valid date")
    }

    fn employee(n: u128) -> EmployeeId {
        EmployeeId(Uuid::from_u128(n))
    }

    fn cycle_params() -> NewReviewCycle {
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

    fn submission(cycle: CycleId, reviewer: u128, reviewee: u128) -> FeedbackSubmission {
        FeedbackSubmission {
            cycle_id: cycle,
            reviewee_id: employee(reviewee),
            reviewer_id: employee(reviewer),
            scores: PillarValues {
                project_impact: 3,
                direction: 3,
                engineering_excellence: 4,
                operational_ownership: 3,
                people_impact: 4,
            },
            strengths: Some("thorough reviews".to_string()),
            growth_areas: None,
            general_comments: None,
            id: None,
        }
    }

    /// Repository with an ACTIVE cycle and reviewer 1 nominated for
    /// reviewee 100.
    fn active_repo() -> (ReviewRepository, CycleId) {
        let mut repo = ReviewRepository::new();
        let cycle = repo.create_cycle(cycle_params()).expect("create");
        let id = cycle.id();
        repo.activate_cycle(id).expect("activate");
        repo.nominate(id, employee(1), employee(100), day(2)).expect("nominate");
        (repo, id)
    }

    #[test]
    fn full_submission_workflow() {
        let (mut repo, cycle_id) = active_repo();

        let feedback = repo
            .submit_feedback(submission(cycle_id, 1, 100), day(8))
            .expect("submit");
        assert!(feedback.is_anonymized());
        assert_eq!(repo.feedback_count().expect("count"), 1);

        let report = repo.aggregate_for(cycle_id, employee(100)).expect("aggregate");
        assert_eq!(report.feedback_count, 1);
        assert_eq!(report.project_impact, 3);
        assert_eq!(report.anonymized_comments.strengths, vec!["thorough reviews"]);
    }

    #[test]
    fn submission_requires_active_cycle() {
        let mut repo = ReviewRepository::new();
        let cycle = repo.create_cycle(cycle_params()).expect("create");
        repo.nominate(cycle.id(), employee(1), employee(100), day(2)).expect("nominate");

        let err = repo
            .submit_feedback(submission(cycle.id(), 1, 100), day(8))
            .expect_err("draft cycle");
        assert!(matches!(err, ReviewError::CycleNotActive(CycleStatus::Draft)));
    }

    #[test]
    fn submission_rejected_after_deadline() {
        let (mut repo, cycle_id) = active_repo();

        let err = repo
            .submit_feedback(submission(cycle_id, 1, 100), day(11))
            .expect_err("late");
        assert!(matches!(
            err,
            ReviewError::DeadlinePassed(CyclePhase::PeerFeedback)
        ));
    }

    #[test]
    fn submission_requires_nomination() {
        let (mut repo, cycle_id) = active_repo();

        let err = repo
            .submit_feedback(submission(cycle_id, 2, 100), day(8))
            .expect_err("not nominated");
        assert!(matches!(err, ReviewError::NotNominated { .. }));
    }

    #[test]
    fn self_feedback_is_rejected_before_nomination_lookup() {
        let (mut repo, cycle_id) = active_repo();

        let err = repo
            .submit_feedback(submission(cycle_id, 100, 100), day(8))
            .expect_err("self feedback");
        assert!(matches!(err, ReviewError::SelfFeedback));
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let (mut repo, cycle_id) = active_repo();

        repo.submit_feedback(submission(cycle_id, 1, 100), day(8)).expect("first");
        let err = repo
            .submit_feedback(submission(cycle_id, 1, 100), day(9))
            .expect_err("second");
        assert!(matches!(err, ReviewError::DuplicateFeedback));
    }

    #[test]
    fn unknown_cycle_is_not_found() {
        let repo = ReviewRepository::new();
        let missing = CycleId::generate();
        assert!(matches!(
            repo.cycle(missing).expect_err("missing"),
            ReviewError::CycleNotFound(id) if id == missing
        ));
    }

    #[test]
    fn nomination_frozen_after_calibration_starts() {
        let (mut repo, cycle_id) = active_repo();
        repo.enter_calibration(cycle_id).expect("calibration");

        let err = repo
            .nominate(cycle_id, employee(2), employee(100), day(12))
            .expect_err("frozen");
        assert!(matches!(
            err,
            ReviewError::CycleNotActive(CycleStatus::Calibration)
        ));
    }

    #[test]
    fn lifecycle_transitions_persist() {
        let mut repo = ReviewRepository::new();
        let cycle = repo.create_cycle(cycle_params()).expect("create");
        let id = cycle.id();

        repo.activate_cycle(id).expect("activate");
        repo.enter_calibration(id).expect("calibration");
        let completed = repo.complete_cycle(id, day(26)).expect("complete");

        assert_eq!(completed.status(), CycleStatus::Completed);
        let loaded = repo.cycle(id).expect("reload");
        assert_eq!(loaded.status(), CycleStatus::Completed);
        assert_eq!(loaded.end_date(), Some(day(26)));
    }

    #[test]
    fn aggregate_over_multiple_reviewers() {
        let (mut repo, cycle_id) = active_repo();
        repo.nominate(cycle_id, employee(2), employee(100), day(2)).expect("nominate");

        let mut high = submission(cycle_id, 2, 100);
        high.scores = PillarValues {
            project_impact: 4,
            direction: 4,
            engineering_excellence: 4,
            operational_ownership: 4,
            people_impact: 4,
        };

        repo.submit_feedback(submission(cycle_id, 1, 100), day(8)).expect("first");
        repo.submit_feedback(high, day(9)).expect("second");

        let report = repo.aggregate_for(cycle_id, employee(100)).expect("aggregate");
        assert_eq!(report.feedback_count, 2);
        // (3+4)/2 = 3.5 rounds up
        assert_eq!(report.project_impact, 4);
        assert_eq!(report.direction, 4);
    }

    #[test]
    fn aggregate_without_submissions_is_no_feedback() {
        let (repo, cycle_id) = active_repo();
        assert!(matches!(
            repo.aggregate_for(cycle_id, employee(100)).expect_err("none"),
            ReviewError::NoFeedback
        ));
    }

    #[test]
    fn snapshot_round_trips_between_repositories() {
        let (mut repo, cycle_id) = active_repo();
        repo.submit_feedback(submission(cycle_id, 1, 100), day(8)).expect("submit");

        let snapshot = repo.export_snapshot().expect("export");

        let mut restored = ReviewRepository::new();
        restored.import_snapshot(&snapshot).expect("import");

        assert_eq!(restored.cycle_count().expect("count"), 1);
        assert_eq!(restored.nomination_count().expect("count"), 1);
        assert_eq!(restored.feedback_count().expect("count"), 1);

        let report = restored
            .aggregate_for(cycle_id, employee(100))
            .expect("aggregate");
        assert_eq!(report.feedback_count, 1);
    }

    #[test]
    fn persistent_backend_runs_the_same_workflow() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cadre.db");

        let cycle_id = {
            let mut repo = ReviewRepository::with_redb(&path).expect("open");
            assert!(repo.is_persistent());

            let cycle = repo.create_cycle(cycle_params()).expect("create");
            repo.activate_cycle(cycle.id()).expect("activate");
            repo.nominate(cycle.id(), employee(1), employee(100), day(2)).expect("nominate");
            repo.submit_feedback(submission(cycle.id(), 1, 100), day(8)).expect("submit");
            cycle.id()
        };

        // Reopen from disk and aggregate
        let repo = ReviewRepository::with_redb(&path).expect("reopen");
        let report = repo.aggregate_for(cycle_id, employee(100)).expect("aggregate");
        assert_eq!(report.feedback_count, 1);
    }
}
