//! # Snapshot Format
//!
//! Binary serialization for a full review store: every cycle,
//! nomination, and feedback submission, in deterministic order.
//!
//! Format: Header (5 bytes) + postcard-serialized snapshot data.
//! - 4 bytes: Magic ("CADR")
//! - 1 byte: Version
//!
//! File I/O lives in the app layer; this module is pure byte
//! transforms. Payload size is validated before deserialization so a
//! corrupted or malicious file cannot trigger unbounded allocation.

use crate::cycle::ReviewCycle;
use crate::feedback::{Nomination, PeerFeedback};
use crate::primitives;
use crate::types::ReviewError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;

/// Maximum allowed payload size for the snapshot format.
///
/// Validated BEFORE attempting deserialization to prevent
/// allocation-based DoS from corrupted input. 64 MB comfortably holds
/// decades of review data.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

/// Minimum valid file size (header only).
const MIN_FILE_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The snapshot header precedes all review data.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(ReviewError::Serialization(
                "invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(ReviewError::Serialization(format!(
                "unsupported snapshot version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReviewError> {
        if bytes.len() < MIN_FILE_SIZE {
            return Err(ReviewError::Serialization("header too short".to_string()));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// A full, ordered copy of one review store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cycles: Vec<ReviewCycle>,
    pub nominations: Vec<Nomination>,
    pub feedback: Vec<PeerFeedback>,
}

impl Snapshot {
    /// Check if the snapshot holds no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty() && self.nominations.is_empty() && self.feedback.is_empty()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a snapshot to bytes (header + payload).
///
/// This is a pure transformation - no file I/O.
pub fn snapshot_to_bytes(snapshot: &Snapshot) -> Result<Vec<u8>, ReviewError> {
    let header = SnapshotHeader::new();
    let payload =
        postcard::to_allocvec(snapshot).map_err(|e| ReviewError::Serialization(e.to_string()))?;

    let mut bytes = Vec::with_capacity(MIN_FILE_SIZE + payload.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Deserialize a snapshot from bytes, validating header and payload
/// size first.
pub fn snapshot_from_bytes(bytes: &[u8]) -> Result<Snapshot, ReviewError> {
    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = &bytes[MIN_FILE_SIZE..];
    if payload.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(ReviewError::Serialization(format!(
            "snapshot payload {} bytes exceeds maximum {}",
            payload.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    postcard::from_bytes(payload).map_err(|e| ReviewError::Serialization(e.to_string()))
}

/// Compute a transfer checksum over the snapshot payload.
///
/// This is an integrity check for export/import round-trips, not a
/// cryptographic signature.
pub fn snapshot_checksum(snapshot: &Snapshot) -> Result<u64, ReviewError> {
    let payload =
        postcard::to_allocvec(snapshot).map_err(|e| ReviewError::Serialization(e.to_string()))?;
    let mut hasher = DefaultHasher::new();
    hasher.write(&payload);
    Ok(hasher.finish())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::NewReviewCycle;
    use crate::deadlines::DeadlineSchedule;
    use chrono::{DateTime, TimeZone, Utc};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, d, 9, 0, 0).single().expect("valid date")
    }

    fn snapshot_with_cycle() -> Snapshot {
        let cycle = ReviewCycle::create(NewReviewCycle {
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
        .expect("valid cycle");

        Snapshot {
            cycles: vec![cycle],
            nominations: vec![],
            feedback: vec![],
        }
    }

    #[test]
    fn snapshot_round_trips() {
        let snapshot = snapshot_with_cycle();
        let bytes = snapshot_to_bytes(&snapshot).expect("serialize");
        let restored = snapshot_from_bytes(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn header_leads_the_encoding() {
        let bytes = snapshot_to_bytes(&Snapshot::default()).expect("serialize");
        assert_eq!(&bytes[0..4], primitives::MAGIC_BYTES);
        assert_eq!(bytes[4], primitives::FORMAT_VERSION);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut bytes = snapshot_to_bytes(&Snapshot::default()).expect("serialize");
        bytes[0] = b'X';
        assert!(matches!(
            snapshot_from_bytes(&bytes).expect_err("bad magic"),
            ReviewError::Serialization(_)
        ));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = snapshot_to_bytes(&Snapshot::default()).expect("serialize");
        bytes[4] = primitives::FORMAT_VERSION + 1;
        assert!(snapshot_from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncated_input_is_rejected() {
        assert!(snapshot_from_bytes(&[b'C', b'A']).is_err());
    }

    #[test]
    fn checksum_tracks_content() {
        let snapshot = snapshot_with_cycle();
        let empty = snapshot_checksum(&Snapshot::default()).expect("checksum");
        let full = snapshot_checksum(&snapshot).expect("checksum");
        assert_ne!(empty, full);

        // Deterministic over identical content
        let again = snapshot_checksum(&snapshot.clone()).expect("checksum");
        assert_eq!(full, again);
    }
}
