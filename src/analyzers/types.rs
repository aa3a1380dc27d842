//! View types produced by the aggregation engine. Transient: built per
//! request from a snapshot and serialized straight into reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::normalize::{Dimension, DimensionFilter};
use crate::quality::{Grade, Indicator, WarningLevel};

/// Sample counts per coarse quality bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BucketCounts {
    pub total_count: usize,
    pub excellent_count: usize,
    pub good_count: usize,
    pub poor_count: usize,
    pub very_poor_count: usize,
    pub polluted_count: usize,
}

/// Headline numbers for a whole snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewStats {
    #[serde(flatten)]
    pub counts: BucketCounts,
    /// Share of bands I-III, in percent.
    pub excellent_rate: f64,
    pub latest_update: DateTime<Utc>,
}

/// Bucket counts for one river or one collection method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionStats {
    pub dimension: Dimension,
    pub value: String,
    #[serde(flatten)]
    pub counts: BucketCounts,
    pub excellent_rate: f64,
    pub latest_sampling_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBucket {
    pub level: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub month: String,
    pub total_count: usize,
    pub excellent_count: usize,
    pub excellent_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorProfile {
    pub indicator: Indicator,
    pub indicator_name: &'static str,
    pub unit: &'static str,
    pub standard_value: f64,
    pub avg_value: f64,
    pub max_value: f64,
    pub min_value: f64,
    pub present_count: usize,
    pub exceed_count: usize,
    pub exceed_rate: f64,
}

/// Grade breakdown of one indicator's own grades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorLevelStats {
    pub indicator: Indicator,
    pub indicator_name: &'static str,
    pub total_count: usize,
    pub level_distribution: Vec<DistributionBucket>,
    pub most_common_level: String,
    pub most_common_count: usize,
    pub most_common_percentage: f64,
    pub qualified_rate: f64,
    pub unqualified_rate: f64,
    pub warning_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelStatistics {
    pub indicators: Vec<IndicatorLevelStats>,
    pub total_count: usize,
    pub graded_count: usize,
    pub qualified_rate: f64,
    pub unqualified_rate: f64,
    pub warning_rate: f64,
}

/// A sample whose composite grade warrants a pollution warning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WarningRecord {
    pub id: u64,
    pub river_name: String,
    pub method: String,
    pub sampling_date: DateTime<Utc>,
    pub composite_grade: Grade,
    pub warning_level: WarningLevel,
    pub cod: Option<f64>,
    pub ammonia_nitrogen: Option<f64>,
    pub total_phosphorus: Option<f64>,
    pub permanganate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentRecord {
    pub id: u64,
    pub river_name: String,
    pub sampling_date: DateTime<Utc>,
    pub composite_level: String,
    pub cod: Option<f64>,
    pub ammonia_nitrogen: Option<f64>,
    pub total_phosphorus: Option<f64>,
    pub permanganate: Option<f64>,
}

/// Known values of a dimension, for caller-side existence checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionList {
    pub dimension: Dimension,
    pub values: Vec<String>,
    pub total_count: usize,
}

/// Every view derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub filter: DimensionFilter,
    pub overview: OverviewStats,
    pub river_stats: Vec<DimensionStats>,
    pub method_stats: Vec<DimensionStats>,
    pub quality_distribution: Vec<DistributionBucket>,
    pub monthly_trend: Vec<TrendPoint>,
    pub indicator_stats: Vec<IndicatorProfile>,
    pub level_stats: LevelStatistics,
    pub recent_data: Vec<RecentRecord>,
    pub warning_data: Vec<WarningRecord>,
}
