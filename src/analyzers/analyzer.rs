use chrono::Utc;
use tracing::debug;

use crate::analyzers::aggregate::{
    dimension_stats, distribution, indicator_profile, level_statistics, monthly_trend, overview,
};
use crate::analyzers::types::{
    DashboardReport, DimensionList, DimensionStats, DistributionBucket, IndicatorProfile,
    LevelStatistics, OverviewStats, RecentRecord, TrendPoint, WarningRecord,
};
use crate::analyzers::warning::{recent, warnings};
use crate::config::ReportConfig;
use crate::error::StoreError;
use crate::normalize::{Dimension, DimensionFilter};
use crate::store::{SampleStore, Snapshot};

/// Reporting entry point over a [`SampleStore`].
///
/// Every call reads exactly one snapshot and derives its views from it, so
/// the parts of a [`DashboardReport`] always agree with each other. Store
/// errors are returned unchanged; nothing is retried.
pub struct Dashboard<S> {
    store: S,
    limits: ReportConfig,
}

impl<S: SampleStore> Dashboard<S> {
    pub fn new(store: S) -> Self {
        Self::with_limits(store, ReportConfig::default())
    }

    pub fn with_limits(store: S, limits: ReportConfig) -> Self {
        Self { store, limits }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn snapshot(&self, filter: &DimensionFilter) -> Result<Snapshot, StoreError> {
        let snapshot = self.store.query(filter).await?;
        debug!(?filter, samples = snapshot.len(), "Loaded snapshot");
        Ok(snapshot)
    }

    pub async fn compute_overview(&self, filter: &DimensionFilter) -> Result<OverviewStats, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(overview(&snapshot, Utc::now()))
    }

    /// Breakdown along `dimension`, optionally restricted by `filter` (for
    /// example rivers within one collection method).
    pub async fn compute_dimension_stats(
        &self,
        dimension: Dimension,
        filter: &DimensionFilter,
        limit: usize,
    ) -> Result<Vec<DimensionStats>, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(dimension_stats(&snapshot, dimension, limit))
    }

    pub async fn compute_distribution(
        &self,
        filter: &DimensionFilter,
    ) -> Result<Vec<DistributionBucket>, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(distribution(&snapshot))
    }

    pub async fn compute_trend(
        &self,
        limit: usize,
        filter: &DimensionFilter,
    ) -> Result<Vec<TrendPoint>, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(monthly_trend(&snapshot, limit))
    }

    pub async fn compute_indicator_profile(
        &self,
        filter: &DimensionFilter,
    ) -> Result<Vec<IndicatorProfile>, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(indicator_profile(&snapshot))
    }

    pub async fn compute_level_statistics(
        &self,
        filter: &DimensionFilter,
    ) -> Result<LevelStatistics, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(level_statistics(&snapshot))
    }

    pub async fn compute_recent(
        &self,
        limit: usize,
        filter: &DimensionFilter,
    ) -> Result<Vec<RecentRecord>, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(recent(&snapshot, limit))
    }

    pub async fn compute_warnings(
        &self,
        limit: usize,
        filter: &DimensionFilter,
    ) -> Result<Vec<WarningRecord>, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        Ok(warnings(&snapshot, limit))
    }

    /// All views for one filter, computed from a single snapshot with the
    /// configured limits.
    pub async fn compute_dashboard(&self, filter: &DimensionFilter) -> Result<DashboardReport, StoreError> {
        let snapshot = self.snapshot(filter).await?;
        let now = Utc::now();
        let limits = &self.limits;

        Ok(DashboardReport {
            schema_version: 1,
            generated_at: now,
            filter: filter.clone(),
            overview: overview(&snapshot, now),
            river_stats: dimension_stats(&snapshot, Dimension::River, limits.river_limit),
            method_stats: dimension_stats(&snapshot, Dimension::Method, limits.method_limit),
            quality_distribution: distribution(&snapshot),
            monthly_trend: monthly_trend(&snapshot, limits.trend_limit),
            indicator_stats: indicator_profile(&snapshot),
            level_stats: level_statistics(&snapshot),
            recent_data: recent(&snapshot, limits.recent_limit),
            warning_data: warnings(&snapshot, limits.warning_limit),
        })
    }

    /// Known values of `dimension` across the whole store. Callers use this
    /// to report unknown filter values; the aggregations themselves simply
    /// return empty results for them.
    pub async fn list_values(&self, dimension: Dimension) -> Result<DimensionList, StoreError> {
        let snapshot = self.snapshot(&DimensionFilter::All).await?;
        let values = snapshot.distinct(dimension);
        Ok(DimensionList {
            dimension,
            total_count: values.len(),
            values,
        })
    }

    /// Whether `filter` names a value present in the store. `All` always is.
    pub async fn is_known(&self, filter: &DimensionFilter) -> Result<bool, StoreError> {
        match filter.selection() {
            None => Ok(true),
            Some((dimension, value)) => {
                let list = self.list_values(dimension).await?;
                Ok(list.values.iter().any(|v| v == value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::Grade;
    use crate::sample::{NewSample, Sample, SampleUpdate};
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn row(river: &str, method: Option<&str>, month: u32, cod: f64) -> NewSample {
        NewSample {
            river_name: river.to_string(),
            method: method.map(String::from),
            sampling_date: Utc.with_ymd_and_hms(2024, month, 10, 0, 0, 0).unwrap(),
            detection_date: Utc.with_ymd_and_hms(2024, month, 11, 0, 0, 0).unwrap(),
            cod: Some(cod),
            ..Default::default()
        }
    }

    fn dashboard() -> Dashboard<MemoryStore> {
        let store = MemoryStore::from_rows(vec![
            row("A", Some("grab"), 1, 10.0),
            row("A", Some("grab"), 2, 35.0),
            row("A", None, 3, 50.0),
            row("B", Some("auto"), 3, 18.0),
        ])
        .unwrap();
        Dashboard::new(store)
    }

    struct FailingStore;

    #[async_trait::async_trait]
    impl SampleStore for FailingStore {
        async fn query(&self, _: &DimensionFilter) -> Result<Snapshot, StoreError> {
            Err(StoreError::Poisoned)
        }

        async fn insert(&self, _: NewSample) -> Result<Sample, StoreError> {
            Err(StoreError::Poisoned)
        }

        async fn update(&self, id: u64, _: SampleUpdate) -> Result<Sample, StoreError> {
            Err(StoreError::NotFound(id))
        }
    }

    #[tokio::test]
    async fn test_overview_with_filter() {
        let d = dashboard();
        let all = d.compute_overview(&DimensionFilter::All).await.unwrap();
        assert_eq!(all.counts.total_count, 4);
        assert_eq!(all.excellent_rate, 50.0);

        let a = d.compute_overview(&DimensionFilter::river("A")).await.unwrap();
        assert_eq!(a.counts.total_count, 3);
        assert_eq!(a.counts.very_poor_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_filter_gives_empty_results() {
        let d = dashboard();
        let filter = DimensionFilter::river("Nowhere");

        let o = d.compute_overview(&filter).await.unwrap();
        assert_eq!(o.counts.total_count, 0);
        assert!(d.compute_distribution(&filter).await.unwrap().is_empty());
        assert!(d.compute_warnings(10, &filter).await.unwrap().is_empty());
        assert!(!d.is_known(&filter).await.unwrap());
        assert!(d.is_known(&DimensionFilter::river("A")).await.unwrap());
        assert!(d.is_known(&DimensionFilter::method(None)).await.unwrap());
    }

    #[tokio::test]
    async fn test_rivers_within_method() {
        let d = dashboard();
        let stats = d
            .compute_dimension_stats(Dimension::River, &DimensionFilter::method(Some("grab")), 20)
            .await
            .unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].value, "A");
        assert_eq!(stats[0].counts.total_count, 2);
    }

    #[tokio::test]
    async fn test_full_dashboard_is_consistent() {
        let d = dashboard();
        let report = d.compute_dashboard(&DimensionFilter::All).await.unwrap();

        let dist_total: usize = report.quality_distribution.iter().map(|b| b.count).sum();
        assert_eq!(dist_total, report.overview.counts.total_count);

        let trend_total: usize = report.monthly_trend.iter().map(|t| t.total_count).sum();
        assert_eq!(trend_total, report.overview.counts.total_count);

        assert_eq!(report.warning_data.len(), 2);
        assert_eq!(report.warning_data[0].composite_grade, Grade::WorseThanV);
        assert_eq!(report.method_stats.len(), 3);
        assert_eq!(report.recent_data.len(), 4);
    }

    #[tokio::test]
    async fn test_list_values() {
        let d = dashboard();
        let methods = d.list_values(Dimension::Method).await.unwrap();
        assert_eq!(methods.values, vec!["Other", "auto", "grab"]);
        assert_eq!(methods.total_count, 3);
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let d = Dashboard::new(FailingStore);
        let err = d.compute_overview(&DimensionFilter::All).await.unwrap_err();
        assert!(matches!(err, StoreError::Poisoned));
        assert!(d.compute_dashboard(&DimensionFilter::All).await.is_err());
    }
}
