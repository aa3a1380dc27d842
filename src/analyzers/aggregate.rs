//! Pure reductions from a [`Snapshot`] to report views.

use chrono::{DateTime, Datelike, Utc};
use std::collections::{BTreeMap, HashMap};

use crate::analyzers::types::{
    BucketCounts, DimensionStats, DistributionBucket, IndicatorLevelStats, IndicatorProfile,
    LevelStatistics, OverviewStats, TrendPoint,
};
use crate::analyzers::utility::{rate, round2};
use crate::normalize::Dimension;
use crate::quality::grade::ALL_GRADES;
use crate::quality::{ALL_INDICATORS, Grade, QualityBucket};
use crate::sample::Sample;
use crate::store::Snapshot;

/// Label used for samples or indicators without a grade.
pub const UNKNOWN_LEVEL: &str = "Unknown";

impl BucketCounts {
    fn add(&mut self, grade: Option<Grade>) {
        self.total_count += 1;
        match grade.map(Grade::bucket) {
            Some(QualityBucket::Excellent) => self.excellent_count += 1,
            Some(QualityBucket::Good) => self.good_count += 1,
            Some(QualityBucket::Poor) => self.poor_count += 1,
            Some(QualityBucket::VeryPoor) => self.very_poor_count += 1,
            Some(QualityBucket::Polluted) => self.polluted_count += 1,
            None => {}
        }
    }

    fn excellent_rate(&self) -> f64 {
        rate(self.excellent_count, self.total_count)
    }
}

/// Overall bucket counts and excellent rate. `now` stands in for the latest
/// sampling date when the snapshot is empty.
pub fn overview(snapshot: &Snapshot, now: DateTime<Utc>) -> OverviewStats {
    let mut counts = BucketCounts::default();
    for s in snapshot.samples() {
        counts.add(s.composite_grade);
    }

    OverviewStats {
        excellent_rate: counts.excellent_rate(),
        counts,
        latest_update: snapshot.max_timestamp().unwrap_or(now),
    }
}

/// Per-river or per-method bucket counts, largest groups first.
///
/// Groups with equal totals are ordered by key so the output is stable.
pub fn dimension_stats(snapshot: &Snapshot, dimension: Dimension, limit: usize) -> Vec<DimensionStats> {
    let mut groups: HashMap<String, (BucketCounts, DateTime<Utc>)> = HashMap::new();

    for s in snapshot.samples() {
        let (counts, latest) = groups
            .entry(dimension.key_of(s))
            .or_insert_with(|| (BucketCounts::default(), s.sampling_date));
        counts.add(s.composite_grade);
        if s.sampling_date > *latest {
            *latest = s.sampling_date;
        }
    }

    let mut stats: Vec<DimensionStats> = groups
        .into_iter()
        .map(|(value, (counts, latest))| DimensionStats {
            dimension,
            value,
            excellent_rate: counts.excellent_rate(),
            counts,
            latest_sampling_date: latest,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.counts
            .total_count
            .cmp(&a.counts.total_count)
            .then_with(|| a.value.cmp(&b.value))
    });
    stats.truncate(limit);
    stats
}

/// Count and share of each composite grade, best grade first and
/// [`UNKNOWN_LEVEL`] last.
pub fn distribution(snapshot: &Snapshot) -> Vec<DistributionBucket> {
    grade_distribution(snapshot.samples().iter().map(|s| s.composite_grade))
}

fn grade_distribution<I>(grades: I) -> Vec<DistributionBucket>
where
    I: IntoIterator<Item = Option<Grade>>,
{
    let mut counts: BTreeMap<Option<Grade>, usize> = BTreeMap::new();
    let mut total = 0;
    for grade in grades {
        *counts.entry(grade).or_insert(0) += 1;
        total += 1;
    }

    // `None` sorts first in a BTreeMap; move it to the end.
    let unknown = counts.remove(&None);
    counts
        .into_iter()
        .map(|(grade, count)| (grade.map(Grade::label).unwrap_or(UNKNOWN_LEVEL), count))
        .chain(unknown.map(|count| (UNKNOWN_LEVEL, count)))
        .map(|(level, count)| DistributionBucket {
            level: level.to_string(),
            count,
            percentage: rate(count, total),
        })
        .collect()
}

/// Monthly totals and excellent rate, most recent month first.
pub fn monthly_trend(snapshot: &Snapshot, limit: usize) -> Vec<TrendPoint> {
    let mut months: BTreeMap<(i32, u32), BucketCounts> = BTreeMap::new();
    for s in snapshot.samples() {
        let key = (s.sampling_date.year(), s.sampling_date.month());
        months.entry(key).or_default().add(s.composite_grade);
    }

    months
        .into_iter()
        .rev()
        .take(limit)
        .map(|((year, month), counts)| TrendPoint {
            month: format!("{year:04}-{month:02}"),
            total_count: counts.total_count,
            excellent_count: counts.excellent_count,
            excellent_rate: counts.excellent_rate(),
        })
        .collect()
}

/// Average, extremes and exceedance rate for every indicator that has at
/// least one reading in the snapshot.
pub fn indicator_profile(snapshot: &Snapshot) -> Vec<IndicatorProfile> {
    ALL_INDICATORS
        .iter()
        .filter_map(|&indicator| {
            let agg = snapshot.aggregate(indicator)?;
            let spec = indicator.spec();
            let exceed_count = snapshot
                .readings(indicator)
                .filter(|v| *v > spec.standard_value)
                .count();

            Some(IndicatorProfile {
                indicator,
                indicator_name: spec.label,
                unit: spec.unit,
                standard_value: spec.standard_value,
                avg_value: round2(agg.avg),
                max_value: round2(agg.max),
                min_value: round2(agg.min),
                present_count: agg.present_count,
                exceed_count,
                exceed_rate: rate(exceed_count, agg.present_count),
            })
        })
        .collect()
}

/// Grade breakdown per indicator plus overall qualification rates over
/// composite grades.
///
/// Rates are taken over graded entries only; ungraded samples count toward
/// `total_count` but not toward any rate.
pub fn level_statistics(snapshot: &Snapshot) -> LevelStatistics {
    let indicators = ALL_INDICATORS
        .iter()
        .map(|&indicator| {
            let grades: Vec<Grade> = snapshot
                .samples()
                .iter()
                .filter_map(|s| s.grade(indicator))
                .collect();
            let spec = indicator.spec();
            let total = grades.len();
            let level_distribution = grade_distribution(grades.iter().copied().map(Some));
            let (most_common_level, most_common_count) = most_common(&grades);
            let qualified = grades.iter().filter(|g| g.is_qualified()).count();
            let warning = grades.iter().filter(|g| g.is_warning()).count();

            IndicatorLevelStats {
                indicator,
                indicator_name: spec.label,
                total_count: total,
                level_distribution,
                most_common_level,
                most_common_count,
                most_common_percentage: rate(most_common_count, total),
                qualified_rate: rate(qualified, total),
                unqualified_rate: rate(total - qualified, total),
                warning_rate: rate(warning, total),
            }
        })
        .collect();

    let composites: Vec<Grade> = snapshot
        .samples()
        .iter()
        .filter_map(|s: &Sample| s.composite_grade)
        .collect();
    let graded = composites.len();
    let qualified = composites.iter().filter(|g| g.is_qualified()).count();
    let warning = composites.iter().filter(|g| g.is_warning()).count();

    LevelStatistics {
        indicators,
        total_count: snapshot.len(),
        graded_count: graded,
        qualified_rate: rate(qualified, graded),
        unqualified_rate: rate(graded - qualified, graded),
        warning_rate: rate(warning, graded),
    }
}

/// The most frequent grade; ties go to the better grade.
fn most_common(grades: &[Grade]) -> (String, usize) {
    ALL_GRADES
        .iter()
        .map(|g| (*g, grades.iter().filter(|x| *x == g).count()))
        .filter(|(_, count)| *count > 0)
        .fold(None, |best: Option<(Grade, usize)>, (g, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((g, count)),
        })
        .map(|(g, count)| (g.label().to_string(), count))
        .unwrap_or_else(|| (UNKNOWN_LEVEL.to_string(), 0))
}
