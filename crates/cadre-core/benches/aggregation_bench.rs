//! # Aggregation Benchmarks
//!
//! Performance benchmarks for the peer-feedback aggregation path.
//!
//! Run with: `cargo bench -p cadre-core`

use cadre_core::{
    CycleId, EmployeeId, FeedbackSubmission, PeerFeedback, PillarValues, aggregate_peer_scores,
    anonymize_feedback,
};
use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use uuid::Uuid;

/// Create N submissions about one reviewee, scores cycling through the
/// valid range, every third one carrying comments.
fn create_feedback_set(size: usize) -> Vec<PeerFeedback> {
    let now = Utc
        .with_ymd_and_hms(2026, 6, 8, 12, 0, 0)
        .single()
        .expect("valid date");
    let cycle_id = CycleId(Uuid::from_u128(1));

    (0..size)
        .map(|i| {
            let score = (i % 5) as i64;
            PeerFeedback::new(
                FeedbackSubmission {
                    cycle_id,
                    reviewee_id: EmployeeId(Uuid::from_u128(10)),
                    reviewer_id: EmployeeId(Uuid::from_u128(100 + i as u128)),
                    scores: PillarValues {
                        project_impact: score,
                        direction: (score + 1) % 5,
                        engineering_excellence: (score + 2) % 5,
                        operational_ownership: (score + 3) % 5,
                        people_impact: (score + 4) % 5,
                    },
                    strengths: (i % 3 == 0).then(|| format!("strength {i}")),
                    growth_areas: (i % 3 == 1).then(|| format!("growth {i}")),
                    general_comments: None,
                    id: None,
                },
                now,
            )
            .expect("valid feedback")
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_score_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_aggregation");

    for size in [10, 100, 1000].iter() {
        let feedback = create_feedback_set(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &feedback, |b, feedback| {
            b.iter(|| black_box(aggregate_peer_scores(feedback)));
        });
    }

    group.finish();
}

fn bench_anonymized_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("anonymized_report");

    for size in [10, 100, 1000].iter() {
        let feedback = create_feedback_set(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &feedback, |b, feedback| {
            b.iter(|| black_box(anonymize_feedback(feedback)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_score_aggregation, bench_anonymized_report);
criterion_main!(benches);
