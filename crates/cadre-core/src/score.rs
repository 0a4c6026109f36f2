//! # Pillar Scores
//!
//! Validated scoring for the fixed five-pillar performance model.
//!
//! - Every score entering the system passes through [`PillarScore::from_value`]
//! - Integer scoring (0-4) to maintain determinism; no floating-point
//! - Invalid values are rejected outright, never clamped

use crate::primitives::{SCORE_MAX, SCORE_MIN};
use crate::types::ReviewError;
use serde::{Deserialize, Serialize};

// =============================================================================
// PILLAR ENUM
// =============================================================================

/// The five fixed performance pillars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pillar {
    /// Impact delivered through project work.
    ProjectImpact,
    /// Setting and communicating technical direction.
    Direction,
    /// Quality and craft of engineering output.
    EngineeringExcellence,
    /// Ownership of operational health.
    OperationalOwnership,
    /// Impact on the people around the engineer.
    PeopleImpact,
}

impl Pillar {
    /// All pillars in canonical order.
    pub const ALL: [Pillar; 5] = [
        Pillar::ProjectImpact,
        Pillar::Direction,
        Pillar::EngineeringExcellence,
        Pillar::OperationalOwnership,
        Pillar::PeopleImpact,
    ];

    /// Get the pillar's display name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Pillar::ProjectImpact => "Project Impact",
            Pillar::Direction => "Direction",
            Pillar::EngineeringExcellence => "Engineering Excellence",
            Pillar::OperationalOwnership => "Operational Ownership",
            Pillar::PeopleImpact => "People Impact",
        }
    }
}

impl std::fmt::Display for Pillar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// =============================================================================
// PILLAR SCORE
// =============================================================================

/// A single validated score for one performance pillar.
///
/// The only way to obtain a `PillarScore` is through
/// [`PillarScore::from_value`], so a value of this type is always within
/// `[SCORE_MIN, SCORE_MAX]`. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PillarScore(u8);

impl PillarScore {
    /// Validate a raw integer into a pillar score.
    ///
    /// Fails with [`ReviewError::InvalidScore`] for any value outside
    /// `[SCORE_MIN, SCORE_MAX]`. The raw value is carried in the error
    /// for diagnostics; it is never clamped into range.
    pub fn from_value(value: i64) -> Result<Self, ReviewError> {
        if value < i64::from(SCORE_MIN) || value > i64::from(SCORE_MAX) {
            return Err(ReviewError::InvalidScore { value });
        }
        Ok(Self(value as u8))
    }

    /// Get the validated score value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

// =============================================================================
// PILLAR VALUES (unvalidated record)
// =============================================================================

/// A plain five-field integer record of pillar values.
///
/// This is the unvalidated wire/input shape: anything an API request or
/// a stored row hands over lands here first, then passes through
/// [`PillarScores::from_values`]. `i64` fields keep out-of-range values
/// representable so they can be rejected with their original value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PillarValues {
    pub project_impact: i64,
    pub direction: i64,
    pub engineering_excellence: i64,
    pub operational_ownership: i64,
    pub people_impact: i64,
}

// =============================================================================
// PILLAR SCORES (validated bundle)
// =============================================================================

/// An immutable bundle of the five validated pillar scores.
///
/// Created once per submission and never mutated; a new instance
/// replaces an old one if scores must change. Equality compares all
/// five component scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarScores {
    project_impact: PillarScore,
    direction: PillarScore,
    engineering_excellence: PillarScore,
    operational_ownership: PillarScore,
    people_impact: PillarScore,
}

impl PillarScores {
    /// Validate a raw record into a score bundle.
    ///
    /// Each field is validated independently through
    /// [`PillarScore::from_value`] in canonical pillar order; the first
    /// invalid field fails the whole construction (no partial bundle).
    pub fn from_values(values: PillarValues) -> Result<Self, ReviewError> {
        Ok(Self {
            project_impact: PillarScore::from_value(values.project_impact)?,
            direction: PillarScore::from_value(values.direction)?,
            engineering_excellence: PillarScore::from_value(values.engineering_excellence)?,
            operational_ownership: PillarScore::from_value(values.operational_ownership)?,
            people_impact: PillarScore::from_value(values.people_impact)?,
        })
    }

    /// Get the score for one pillar.
    #[must_use]
    pub const fn get(&self, pillar: Pillar) -> PillarScore {
        match pillar {
            Pillar::ProjectImpact => self.project_impact,
            Pillar::Direction => self.direction,
            Pillar::EngineeringExcellence => self.engineering_excellence,
            Pillar::OperationalOwnership => self.operational_ownership,
            Pillar::PeopleImpact => self.people_impact,
        }
    }

    /// Export the bundle as a plain numeric record.
    ///
    /// Round-trips exactly with [`PillarScores::from_values`].
    #[must_use]
    pub fn to_values(&self) -> PillarValues {
        PillarValues {
            project_impact: i64::from(self.project_impact.value()),
            direction: i64::from(self.direction.value()),
            engineering_excellence: i64::from(self.engineering_excellence.value()),
            operational_ownership: i64::from(self.operational_ownership.value()),
            people_impact: i64::from(self.people_impact.value()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
