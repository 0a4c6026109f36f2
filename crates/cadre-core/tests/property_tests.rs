//! # Property-Based Tests
//!
//! Verification tests for the scoring and aggregation invariants.
//!
//! These tests ensure determinism and correctness of score validation,
//! deadline ordering, and round-half-up averaging.

use cadre_core::{
    CycleDeadlines, CycleId, DeadlineSchedule, EmployeeId, FeedbackSubmission, PeerFeedback,
    Pillar, PillarScore, PillarScores, PillarValues, aggregate_peer_scores, anonymize_feedback,
};
use chrono::{DateTime, TimeZone, Utc};
use proptest::collection::vec;
use proptest::prelude::*;
use uuid::Uuid;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("valid date")
}

fn feedback_from(scores: [i64; 5], reviewer: u128) -> PeerFeedback {
    PeerFeedback::new(
        FeedbackSubmission {
            cycle_id: CycleId(Uuid::from_u128(1)),
            reviewee_id: EmployeeId(Uuid::from_u128(10)),
            reviewer_id: EmployeeId(Uuid::from_u128(100 + reviewer)),
            scores: PillarValues {
                project_impact: scores[0],
                direction: scores[1],
                engineering_excellence: scores[2],
                operational_ownership: scores[3],
                people_impact: scores[4],
            },
            strengths: None,
            growth_areas: None,
            general_comments: None,
            id: None,
        },
        base_time(),
    )
    .expect("valid feedback")
}

/// Reference round-half-up over integers: round(sum/count) with the
/// half-point going up.
fn reference_round(sum: u64, count: u64) -> u8 {
    let quotient = sum / count;
    let remainder = sum % count;
    if remainder * 2 >= count {
        (quotient + 1) as u8
    } else {
        quotient as u8
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Every integer in [0,4] validates and round-trips its value.
    #[test]
    fn in_range_scores_validate(value in 0i64..=4) {
        let score = PillarScore::from_value(value).expect("in range");
        prop_assert_eq!(i64::from(score.value()), value);
    }

    /// Every integer outside [0,4] is rejected.
    #[test]
    fn out_of_range_scores_fail(value in prop_oneof![i64::MIN..0, 5..i64::MAX]) {
        prop_assert!(PillarScore::from_value(value).is_err());
    }

    /// Valid five-field records round-trip exactly through the bundle.
    #[test]
    fn score_bundles_round_trip(
        p in 0i64..=4, d in 0i64..=4, e in 0i64..=4, o in 0i64..=4, pe in 0i64..=4
    ) {
        let values = PillarValues {
            project_impact: p,
            direction: d,
            engineering_excellence: e,
            operational_ownership: o,
            people_impact: pe,
        };
        let scores = PillarScores::from_values(values).expect("valid bundle");
        prop_assert_eq!(scores.to_values(), values);
    }

    /// Aggregated averages always land inside the valid score range,
    /// and match the reference round-half-up computation per pillar.
    #[test]
    fn aggregation_matches_reference_rounding(
        score_rows in vec([0i64..=4, 0i64..=4, 0i64..=4, 0i64..=4, 0i64..=4], 1..40)
    ) {
        let feedbacks: Vec<PeerFeedback> = score_rows
            .iter()
            .enumerate()
            .map(|(i, row)| feedback_from(*row, i as u128))
            .collect();

        let aggregated = aggregate_peer_scores(&feedbacks).expect("non-empty");
        let count = feedbacks.len() as u64;

        for (index, pillar) in Pillar::ALL.iter().enumerate() {
            let sum: u64 = score_rows.iter().map(|row| row[index] as u64).sum();
            let expected = reference_round(sum, count);
            let actual = aggregated.get(*pillar).value();

            prop_assert_eq!(actual, expected);
            prop_assert!(actual <= 4);
        }
    }

    /// Aggregation is deterministic: identical input produces identical
    /// output, and never alters the input set.
    #[test]
    fn aggregation_deterministic(
        score_rows in vec([0i64..=4, 0i64..=4, 0i64..=4, 0i64..=4, 0i64..=4], 1..20)
    ) {
        let feedbacks: Vec<PeerFeedback> = score_rows
            .iter()
            .enumerate()
            .map(|(i, row)| feedback_from(*row, i as u128))
            .collect();

        let first = anonymize_feedback(&feedbacks).expect("non-empty");
        let second = anonymize_feedback(&feedbacks).expect("non-empty");

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.feedback_count, feedbacks.len());
    }

    /// A deadline schedule is accepted iff the five dates are strictly
    /// increasing in phase order.
    #[test]
    fn deadline_ordering_is_strict(offsets in vec(0i64..10_000, 5)) {
        let base = base_time();
        let dates: Vec<DateTime<Utc>> = offsets
            .iter()
            .map(|o| base + chrono::Duration::minutes(*o))
            .collect();

        let schedule = DeadlineSchedule {
            self_review: dates[0],
            peer_feedback: dates[1],
            manager_evaluation: dates[2],
            calibration: dates[3],
            feedback_delivery: dates[4],
        };

        let strictly_increasing = dates.windows(2).all(|pair| pair[0] < pair[1]);
        prop_assert_eq!(CycleDeadlines::new(schedule).is_ok(), strictly_increasing);
    }
}
