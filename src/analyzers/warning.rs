//! Pollution warning ranking and the recent-samples feed.

use std::cmp::Ordering;

use crate::analyzers::aggregate::UNKNOWN_LEVEL;
use crate::analyzers::types::{RecentRecord, WarningRecord};
use crate::normalize::normalize_method;
use crate::quality::{Grade, WarningLevel};
use crate::sample::Sample;
use crate::store::Snapshot;

/// Samples whose composite grade is V or worse, most severe first.
///
/// Within a tier the most recent sampling date comes first; exact ties fall
/// back to ascending id. The warning level comes from the stored composite
/// grade, never from the raw readings.
pub fn warnings(snapshot: &Snapshot, limit: usize) -> Vec<WarningRecord> {
    let mut flagged: Vec<(&Sample, Grade, WarningLevel)> = snapshot
        .samples()
        .iter()
        .filter_map(|s| {
            let grade = s.composite_grade?;
            Some((s, grade, grade.warning_level()?))
        })
        .collect();

    flagged.sort_by(|(a, ga, _), (b, gb, _)| gb.cmp(ga).then_with(|| by_recency(a, b)));

    flagged
        .into_iter()
        .take(limit)
        .map(|(s, grade, warning_level)| WarningRecord {
            id: s.id,
            river_name: s.river_name.clone(),
            method: normalize_method(s.method.as_deref()),
            sampling_date: s.sampling_date,
            composite_grade: grade,
            warning_level,
            cod: s.cod,
            ammonia_nitrogen: s.ammonia_nitrogen,
            total_phosphorus: s.total_phosphorus,
            permanganate: s.permanganate,
        })
        .collect()
}

/// The latest samples regardless of grade.
pub fn recent(snapshot: &Snapshot, limit: usize) -> Vec<RecentRecord> {
    let mut rows: Vec<&Sample> = snapshot.samples().iter().collect();
    rows.sort_by(|a, b| by_recency(a, b));

    rows.into_iter()
        .take(limit)
        .map(|s| RecentRecord {
            id: s.id,
            river_name: s.river_name.clone(),
            sampling_date: s.sampling_date,
            composite_level: s
                .composite_grade
                .map(|g| g.label().to_string())
                .unwrap_or_else(|| UNKNOWN_LEVEL.to_string()),
            cod: s.cod,
            ammonia_nitrogen: s.ammonia_nitrogen,
            total_phosphorus: s.total_phosphorus,
            permanganate: s.permanganate,
        })
        .collect()
}

fn by_recency(a: &Sample, b: &Sample) -> Ordering {
    b.sampling_date
        .cmp(&a.sampling_date)
        .then_with(|| a.id.cmp(&b.id))
}
