//! # Peer Feedback Aggregation
//!
//! De-identified aggregation over a set of peer-feedback submissions.
//!
//! - Per-pillar averages use integer arithmetic only, with round-half-up
//!   semantics (an average of 2.5 rounds to 3)
//! - Anonymity is achieved purely by omission: reviewer identity is
//!   never copied into any output structure, so there is nothing to
//!   redact and no flag to check
//! - Both entry points are pure functions over an immutable snapshot;
//!   they never mutate or re-fetch the input set

use crate::feedback::PeerFeedback;
use crate::score::{Pillar, PillarScores, PillarValues};
use crate::types::ReviewError;
use serde::{Deserialize, Serialize};

// =============================================================================
// ROUNDING
// =============================================================================

/// Round-half-up integer average: `floor(sum/count + 1/2)`.
///
/// Computed as `(2*sum + count) / (2*count)` so the half-point always
/// rounds toward the higher integer (3.5 → 4, 2.5 → 3). Inputs are
/// non-negative, so flooring division gives exactly that.
fn round_half_up(sum: u64, count: u64) -> i64 {
    ((2 * sum + count) / (2 * count)) as i64
}

// =============================================================================
// SCORE AGGREGATION
// =============================================================================

/// Aggregate per-pillar rounded averages across a set of submissions.
///
/// Fails with [`ReviewError::NoFeedback`] on an empty collection. The
/// rounded averages are re-validated through
/// [`PillarScores::from_values`]; sums of valid scores divided by a
/// positive count cannot leave the valid range, but the construction is
/// still modeled as fallible.
pub fn aggregate_peer_scores(feedbacks: &[PeerFeedback]) -> Result<PillarScores, ReviewError> {
    if feedbacks.is_empty() {
        return Err(ReviewError::NoFeedback);
    }

    let count = feedbacks.len() as u64;
    let average = |pillar: Pillar| -> i64 {
        let sum: u64 = feedbacks
            .iter()
            .map(|f| u64::from(f.scores().get(pillar).value()))
            .sum();
        round_half_up(sum, count)
    };

    PillarScores::from_values(PillarValues {
        project_impact: average(Pillar::ProjectImpact),
        direction: average(Pillar::Direction),
        engineering_excellence: average(Pillar::EngineeringExcellence),
        operational_ownership: average(Pillar::OperationalOwnership),
        people_impact: average(Pillar::PeopleImpact),
    })
}

// =============================================================================
// COMMENT SECTIONS
// =============================================================================

/// Which free-text section a flattened comment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommentSection {
    Strengths,
    GrowthAreas,
    General,
}

impl CommentSection {
    /// Get the section tag as it appears in serialized output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentSection::Strengths => "strengths",
            CommentSection::GrowthAreas => "growthAreas",
            CommentSection::General => "general",
        }
    }
}

/// One de-identified comment with its section tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedComment {
    /// Section tag; serialized as `pillar` for presentation-layer
    /// compatibility with the grouped comment shape.
    #[serde(rename = "pillar")]
    pub section: CommentSection,
    pub comment: String,
}

/// Comments grouped by section, each list in original submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizedComments {
    pub strengths: Vec<String>,
    pub growth_areas: Vec<String>,
    pub general: Vec<String>,
}

// =============================================================================
// ANONYMIZED AGGREGATE
// =============================================================================

/// The consolidated, de-identified feedback report for one reviewee.
///
/// Exposes the five rounded pillar averages as top-level numeric fields,
/// the grouped comment lists, the flattened tagged comment sequence
/// (all strengths first, then growth areas, then general), and the
/// number of submissions that went into the aggregate. Reviewer
/// identity appears nowhere, at any nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymizedPeerFeedback {
    pub project_impact: u8,
    pub direction: u8,
    pub engineering_excellence: u8,
    pub operational_ownership: u8,
    pub people_impact: u8,
    pub anonymized_comments: AnonymizedComments,
    pub comments: Vec<FlattenedComment>,
    pub feedback_count: usize,
}

/// Produce the anonymized aggregate report for a set of submissions.
///
/// Fails with [`ReviewError::NoFeedback`] on an empty collection.
/// Comment collection skips absent and empty-string fields uniformly
/// and preserves the submission order of the input within each section.
pub fn anonymize_feedback(
    feedbacks: &[PeerFeedback],
) -> Result<AnonymizedPeerFeedback, ReviewError> {
    if feedbacks.is_empty() {
        return Err(ReviewError::NoFeedback);
    }

    let scores = aggregate_peer_scores(feedbacks)?;

    let grouped = AnonymizedComments {
        strengths: collect_section(feedbacks, PeerFeedback::strengths),
        growth_areas: collect_section(feedbacks, PeerFeedback::growth_areas),
        general: collect_section(feedbacks, PeerFeedback::general_comments),
    };

    let comments = flatten_sections(&grouped);

    Ok(AnonymizedPeerFeedback {
        project_impact: scores.get(Pillar::ProjectImpact).value(),
        direction: scores.get(Pillar::Direction).value(),
        engineering_excellence: scores.get(Pillar::EngineeringExcellence).value(),
        operational_ownership: scores.get(Pillar::OperationalOwnership).value(),
        people_impact: scores.get(Pillar::PeopleImpact).value(),
        anonymized_comments: grouped,
        comments,
        feedback_count: feedbacks.len(),
    })
}

/// Collect one free-text section across submissions, in submission
/// order, skipping absent and empty entries.
fn collect_section<'a>(
    feedbacks: &'a [PeerFeedback],
    section: impl Fn(&'a PeerFeedback) -> Option<&'a str>,
) -> Vec<String> {
    feedbacks
        .iter()
        .filter_map(|f| section(f))
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Flatten grouped comments into a tagged sequence: all strengths,
/// then all growth areas, then all general comments (not interleaved
/// by source submission).
fn flatten_sections(grouped: &AnonymizedComments) -> Vec<FlattenedComment> {
    let tagged = |section: CommentSection, texts: &[String]| {
        texts
            .iter()
            .map(move |comment| FlattenedComment {
                section,
                comment: comment.clone(),
            })
            .collect::<Vec<_>>()
    };

    let mut comments = tagged(CommentSection::Strengths, &grouped.strengths);
    comments.extend(tagged(CommentSection::GrowthAreas, &grouped.growth_areas));
    comments.extend(tagged(CommentSection::General, &grouped.general));
    comments
}

// =============================================================================
// TESTS
// =============================================================================
