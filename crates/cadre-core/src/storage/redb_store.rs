//! # redb-backed Review Store
//!
//! A disk-backed review store using the redb embedded database.
//!
//! Provides:
//! - ACID transactions (a feedback append and its duplicate-index entry
//!   commit together or not at all)
//! - Crash safety (copy-on-write B-trees)
//! - Zero configuration
//!
//! ## Layout
//!
//! Records are postcard-serialized; identifiers are stored as the raw
//! `u128` of their UUID so keys stay fixed-width and ordered.

use crate::cycle::ReviewCycle;
use crate::feedback::{Nomination, PeerFeedback};
use crate::store::ReviewStore;
use crate::types::{CycleId, EmployeeId, ReviewError};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for cycles: CycleId(u128) -> serialized ReviewCycle bytes
const CYCLES: TableDefinition<u128, &[u8]> = TableDefinition::new("cycles");

/// Table for nominations: (cycle, reviewer, reviewee) -> serialized Nomination bytes
const NOMINATIONS: TableDefinition<(u128, u128, u128), &[u8]> = TableDefinition::new("nominations");

/// Table for feedback: sequence number -> serialized PeerFeedback bytes.
/// The sequence key preserves submission order across restarts.
const FEEDBACK: TableDefinition<u64, &[u8]> = TableDefinition::new("feedback");

/// Duplicate-submission index: (cycle, reviewer, reviewee) -> sequence number
const SUBMISSION_INDEX: TableDefinition<(u128, u128, u128), u64> =
    TableDefinition::new("submission_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

fn storage_err(e: impl std::fmt::Display) -> ReviewError {
    ReviewError::Storage(e.to_string())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, ReviewError> {
    postcard::to_allocvec(value).map_err(|e| ReviewError::Serialization(e.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, ReviewError> {
    postcard::from_bytes(bytes).map_err(|e| ReviewError::Serialization(e.to_string()))
}

/// A disk-backed review store using redb.
pub struct RedbStore {
    /// The redb database handle.
    db: Database,
    /// Next feedback sequence number, mirrored from the metadata table.
    next_feedback_seq: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_feedback_seq", &self.next_feedback_seq)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a review database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReviewError> {
        let db = Database::create(path.as_ref()).map_err(storage_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(storage_err)?;
            let _ = write_txn.open_table(CYCLES).map_err(storage_err)?;
            let _ = write_txn.open_table(NOMINATIONS).map_err(storage_err)?;
            let _ = write_txn.open_table(FEEDBACK).map_err(storage_err)?;
            let _ = write_txn.open_table(SUBMISSION_INDEX).map_err(storage_err)?;
            let _ = write_txn.open_table(METADATA).map_err(storage_err)?;
            write_txn.commit().map_err(storage_err)?;
        }

        // Load metadata
        let read_txn = db.begin_read().map_err(storage_err)?;
        let next_feedback_seq = {
            let table = read_txn.open_table(METADATA).map_err(storage_err)?;
            table
                .get("next_feedback_seq")
                .map_err(storage_err)?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        Ok(Self {
            db,
            next_feedback_seq,
        })
    }

    /// Compact the database (optional optimization).
    pub fn compact(&mut self) -> Result<(), ReviewError> {
        self.db.compact().map_err(storage_err)?;
        Ok(())
    }
}

impl ReviewStore for RedbStore {
    fn put_cycle(&mut self, cycle: &ReviewCycle) -> Result<(), ReviewError> {
        let bytes = encode(cycle)?;
        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(CYCLES).map_err(storage_err)?;
            table
                .insert(cycle.id().0.as_u128(), bytes.as_slice())
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn cycle(&self, id: CycleId) -> Result<Option<ReviewCycle>, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(CYCLES).map_err(storage_err)?;
        table
            .get(id.0.as_u128())
            .map_err(storage_err)?
            .map(|guard| decode(guard.value()))
            .transpose()
    }

    fn cycles(&self) -> Result<Vec<ReviewCycle>, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(CYCLES).map_err(storage_err)?;

        let mut cycles = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            cycles.push(decode(value.value())?);
        }
        Ok(cycles)
    }

    fn put_nomination(&mut self, nomination: &Nomination) -> Result<(), ReviewError> {
        let key = (
            nomination.cycle_id.0.as_u128(),
            nomination.reviewer_id.0.as_u128(),
            nomination.reviewee_id.0.as_u128(),
        );
        let bytes = encode(nomination)?;

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = write_txn.open_table(NOMINATIONS).map_err(storage_err)?;
            // Keep the first nomination time on re-nomination
            let already = table.get(key).map_err(storage_err)?.is_some();
            if !already {
                table.insert(key, bytes.as_slice()).map_err(storage_err)?;
            }
        }
        write_txn.commit().map_err(storage_err)?;
        Ok(())
    }

    fn has_nomination(
        &self,
        cycle: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    ) -> Result<bool, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(NOMINATIONS).map_err(storage_err)?;
        Ok(table
            .get((cycle.0.as_u128(), reviewer.0.as_u128(), reviewee.0.as_u128()))
            .map_err(storage_err)?
            .is_some())
    }

    fn nominations(&self) -> Result<Vec<Nomination>, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(NOMINATIONS).map_err(storage_err)?;

        let mut nominations = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            nominations.push(decode(value.value())?);
        }
        Ok(nominations)
    }

    fn append_feedback(&mut self, feedback: &PeerFeedback) -> Result<(), ReviewError> {
        let seq = self.next_feedback_seq;
        let next = seq.saturating_add(1);
        let bytes = encode(feedback)?;
        let index_key = (
            feedback.cycle_id().0.as_u128(),
            feedback.reviewer_id().0.as_u128(),
            feedback.reviewee_id().0.as_u128(),
        );

        let write_txn = self.db.begin_write().map_err(storage_err)?;
        {
            let mut feedback_table = write_txn.open_table(FEEDBACK).map_err(storage_err)?;
            let mut index_table = write_txn.open_table(SUBMISSION_INDEX).map_err(storage_err)?;
            let mut meta_table = write_txn.open_table(METADATA).map_err(storage_err)?;

            feedback_table
                .insert(seq, bytes.as_slice())
                .map_err(storage_err)?;
            index_table.insert(index_key, seq).map_err(storage_err)?;
            meta_table
                .insert("next_feedback_seq", next)
                .map_err(storage_err)?;
        }
        write_txn.commit().map_err(storage_err)?;

        // Update in-memory state only after successful commit.
        self.next_feedback_seq = next;
        Ok(())
    }

    fn has_feedback(
        &self,
        cycle: CycleId,
        reviewer: EmployeeId,
        reviewee: EmployeeId,
    ) -> Result<bool, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(SUBMISSION_INDEX).map_err(storage_err)?;
        Ok(table
            .get((cycle.0.as_u128(), reviewer.0.as_u128(), reviewee.0.as_u128()))
            .map_err(storage_err)?
            .is_some())
    }

    fn feedback_for_reviewee(
        &self,
        cycle: CycleId,
        reviewee: EmployeeId,
    ) -> Result<Vec<PeerFeedback>, ReviewError> {
        // The sequence key makes iteration submission-ordered.
        let mut matching = Vec::new();
        for feedback in self.feedback()? {
            if feedback.cycle_id() == cycle && feedback.reviewee_id() == reviewee {
                matching.push(feedback);
            }
        }
        Ok(matching)
    }

    fn feedback(&self) -> Result<Vec<PeerFeedback>, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(FEEDBACK).map_err(storage_err)?;

        let mut feedback = Vec::new();
        for entry in table.iter().map_err(storage_err)? {
            let (_, value) = entry.map_err(storage_err)?;
            feedback.push(decode(value.value())?);
        }
        Ok(feedback)
    }

    fn cycle_count(&self) -> Result<usize, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(CYCLES).map_err(storage_err)?;
        Ok(table.len().map_err(storage_err)? as usize)
    }

    fn nomination_count(&self) -> Result<usize, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(NOMINATIONS).map_err(storage_err)?;
        Ok(table.len().map_err(storage_err)? as usize)
    }

    fn feedback_count(&self) -> Result<usize, ReviewError> {
        let read_txn = self.db.begin_read().map_err(storage_err)?;
        let table = read_txn.open_table(FEEDBACK).map_err(storage_err)?;
        Ok(table.len().map_err(storage_err)? as usize)
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
                    project_impact: 2,
                    direction: 3,
                    engineering_excellence: 4,
                    operational_ownership: 2,
                    people_impact: 3,
                },
                strengths: Some("steady reviewer".to_string()),
                growth_areas: None,
                general_comments: None,
                id: None,
            },
            day(7),
        )
        .expect("valid feedback")
    }

    #[test]
    fn cycle_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cadre.db");

        let cycle = cycle();
        {
            let mut store = RedbStore::open(&path).expect("open");
            store.put_cycle(&cycle).expect("put");
        }

        let store = RedbStore::open(&path).expect("reopen");
        let loaded = store.cycle(cycle.id()).expect("get").expect("present");
        assert_eq!(loaded, cycle);
    }

    #[test]
    fn feedback_sequence_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cadre.db");
        let cycle = cycle();

        let first = feedback(cycle.id(), 1, 100);
        let second = feedback(cycle.id(), 2, 100);

        {
            let mut store = RedbStore::open(&path).expect("open");
            store.append_feedback(&first).expect("append");
        }
        {
            let mut store = RedbStore::open(&path).expect("reopen");
            store.append_feedback(&second).expect("append");

            let listed = store
                .feedback_for_reviewee(cycle.id(), employee(100))
                .expect("list");
            let ids: Vec<_> = listed.iter().map(|f| f.id()).collect();
            assert_eq!(ids, vec![first.id(), second.id()]);
            assert_eq!(store.feedback_count().expect("count"), 2);
        }
    }

    #[test]
    fn submission_index_answers_duplicate_checks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cadre.db");
        let cycle = cycle();

        let mut store = RedbStore::open(&path).expect("open");
        store.append_feedback(&feedback(cycle.id(), 1, 100)).expect("append");

        assert!(store
            .has_feedback(cycle.id(), employee(1), employee(100))
            .expect("check"));
        assert!(!store
            .has_feedback(cycle.id(), employee(1), employee(200))
            .expect("check"));
    }

    #[test]
    fn renomination_keeps_first_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cadre.db");
        let cycle = cycle();

        let mut store = RedbStore::open(&path).expect("open");
        let first = Nomination::new(cycle.id(), employee(1), employee(2), day(2))
            .expect("valid nomination");
        let again = Nomination::new(cycle.id(), employee(1), employee(2), day(3))
            .expect("valid nomination");

        store.put_nomination(&first).expect("put");
        store.put_nomination(&again).expect("re-put");

        assert_eq!(store.nomination_count().expect("count"), 1);
        let stored = store.nominations().expect("list");
        assert_eq!(stored[0].nominated_at, day(2));
    }
}
