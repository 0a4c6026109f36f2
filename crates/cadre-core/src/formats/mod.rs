//! # Formats
//!
//! Binary serialization formats for review data.

pub mod snapshot;

pub use snapshot::{
    MAX_SNAPSHOT_PAYLOAD_SIZE, Snapshot, SnapshotHeader, snapshot_checksum, snapshot_from_bytes,
    snapshot_to_bytes,
};
