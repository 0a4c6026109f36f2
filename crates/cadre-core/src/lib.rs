//! # cadre-core
//!
//! The review-cycle domain engine for Cadre - THE DOMAIN.
//!
//! This crate implements the core of a performance-review backend: the
//! validated five-pillar scoring model, the review-cycle lifecycle
//! state machine, and the peer-feedback aggregation engine that
//! produces de-identified aggregate reports.
//!
//! ## Architectural Constraints
//!
//! The core:
//! - Has NO async, NO network dependencies (pure Rust)
//! - Uses integer arithmetic for all score aggregation (no floats)
//! - Never reads the system clock; "now" is always an explicit parameter
//! - Validates at construction: an invalid score, deadline ordering, or
//!   cycle transition is rejected at the point of violation, never
//!   clamped or deferred
//! - Keeps anonymity structural: aggregate outputs are built without
//!   reviewer identity rather than redacting it afterwards

// =============================================================================
// MODULES
// =============================================================================

pub mod aggregation;
pub mod cycle;
pub mod deadlines;
pub mod feedback;
pub mod formats;
pub mod primitives;
pub mod repository;
pub mod score;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CycleId, EmployeeId, FeedbackId, ReviewError};

// =============================================================================
// RE-EXPORTS: Domain
// =============================================================================

pub use cycle::{CycleStatus, NewReviewCycle, ReviewCycle};
pub use deadlines::{CycleDeadlines, CyclePhase, DeadlineSchedule};
pub use feedback::{FeedbackSubmission, Nomination, PeerFeedback};
pub use score::{Pillar, PillarScore, PillarScores, PillarValues};

// =============================================================================
// RE-EXPORTS: Aggregation Engine
// =============================================================================

pub use aggregation::{
    AnonymizedComments, AnonymizedPeerFeedback, CommentSection, FlattenedComment,
    aggregate_peer_scores, anonymize_feedback, anonymize_feedback as aggregate_feedback,
};

// =============================================================================
// RE-EXPORTS: Storage
// =============================================================================

pub use repository::{ReviewRepository, StorageBackend};
pub use storage::RedbStore;
pub use store::{MemStore, ReviewStore};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{Snapshot, snapshot_checksum, snapshot_from_bytes, snapshot_to_bytes};
