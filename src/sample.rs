use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::parser::{deserialize_reading, deserialize_timestamp};
use crate::quality::{Grade, Indicator, classify, resolve_composite};

/// A sample as it arrives at the ingestion hook, before grading.
///
/// Grade fields are explicit overrides: when present they are kept as-is
/// instead of being derived from the indicator value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSample {
    #[serde(default)]
    pub code: Option<String>,
    pub river_name: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub sampling_date: DateTime<Utc>,
    #[serde(default)]
    pub sampling_time: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub detection_date: DateTime<Utc>,

    #[serde(default, deserialize_with = "deserialize_reading")]
    pub cod: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_reading")]
    pub ammonia_nitrogen: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_reading")]
    pub total_phosphorus: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_reading")]
    pub permanganate: Option<f64>,

    #[serde(default)]
    pub cod_grade: Option<Grade>,
    #[serde(default)]
    pub ammonia_nitrogen_grade: Option<Grade>,
    #[serde(default)]
    pub total_phosphorus_grade: Option<Grade>,
    #[serde(default)]
    pub permanganate_grade: Option<Grade>,
    #[serde(default)]
    pub composite_grade: Option<Grade>,

    #[serde(default)]
    pub remarks: Option<String>,
}

/// A committed, graded measurement event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: u64,
    pub code: Option<String>,
    pub river_name: String,
    pub method: Option<String>,
    pub sampling_date: DateTime<Utc>,
    pub sampling_time: Option<String>,
    pub detection_date: DateTime<Utc>,

    pub cod: Option<f64>,
    pub ammonia_nitrogen: Option<f64>,
    pub total_phosphorus: Option<f64>,
    pub permanganate: Option<f64>,

    pub cod_grade: Option<Grade>,
    pub ammonia_nitrogen_grade: Option<Grade>,
    pub total_phosphorus_grade: Option<Grade>,
    pub permanganate_grade: Option<Grade>,
    pub composite_grade: Option<Grade>,
    pub composite_rank: Option<u8>,

    pub remarks: Option<String>,
}

/// A partial mutation of a committed sample.
///
/// Readings listed in `readings` replace the stored value (with `None`
/// clearing it). A changed value re-grades that indicator unless an override
/// for the same indicator is present in `grade_overrides`; an unchanged value
/// leaves the stored grade alone.
#[derive(Debug, Clone, Default)]
pub struct SampleUpdate {
    pub river_name: Option<String>,
    pub method: Option<Option<String>>,
    pub sampling_date: Option<DateTime<Utc>>,
    pub detection_date: Option<DateTime<Utc>>,
    pub readings: Vec<(Indicator, Option<f64>)>,
    pub grade_overrides: Vec<(Indicator, Grade)>,
    pub composite_override: Option<Grade>,
    pub remarks: Option<Option<String>>,
}

impl SampleUpdate {
    pub fn with_reading(mut self, indicator: Indicator, value: Option<f64>) -> Self {
        self.readings.push((indicator, value));
        self
    }

    pub fn with_grade_override(mut self, indicator: Indicator, grade: Grade) -> Self {
        self.grade_overrides.push((indicator, grade));
        self
    }

    pub fn with_composite_override(mut self, grade: Grade) -> Self {
        self.composite_override = Some(grade);
        self
    }

    fn override_for(&self, indicator: Indicator) -> Option<Grade> {
        self.grade_overrides
            .iter()
            .rev()
            .find(|(i, _)| *i == indicator)
            .map(|(_, g)| *g)
    }
}

impl NewSample {
    fn reading(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Cod => self.cod,
            Indicator::AmmoniaNitrogen => self.ammonia_nitrogen,
            Indicator::TotalPhosphorus => self.total_phosphorus,
            Indicator::Permanganate => self.permanganate,
        }
    }

    fn grade_override(&self, indicator: Indicator) -> Option<Grade> {
        match indicator {
            Indicator::Cod => self.cod_grade,
            Indicator::AmmoniaNitrogen => self.ammonia_nitrogen_grade,
            Indicator::TotalPhosphorus => self.total_phosphorus_grade,
            Indicator::Permanganate => self.permanganate_grade,
        }
    }
}

impl Sample {
    /// Runs the ingestion hook: grades every reading without an override and
    /// resolves the composite. The returned sample has `id == 0` until a
    /// store assigns one.
    pub fn ingest(new: NewSample) -> Self {
        let mut s = Sample {
            id: 0,
            code: new.code.clone(),
            river_name: new.river_name.clone(),
            method: new.method.clone(),
            sampling_date: new.sampling_date,
            sampling_time: new.sampling_time.clone(),
            detection_date: new.detection_date,
            cod: new.cod,
            ammonia_nitrogen: new.ammonia_nitrogen,
            total_phosphorus: new.total_phosphorus,
            permanganate: new.permanganate,
            cod_grade: None,
            ammonia_nitrogen_grade: None,
            total_phosphorus_grade: None,
            permanganate_grade: None,
            composite_grade: None,
            composite_rank: None,
            remarks: new.remarks.clone(),
        };

        for indicator in crate::quality::ALL_INDICATORS {
            let grade = new
                .grade_override(indicator)
                .or_else(|| classify(indicator, new.reading(indicator)));
            s.set_grade(indicator, grade);
        }

        s.set_composite(new.composite_grade);
        s
    }

    /// Applies a mutation in place, re-grading what the mutation touched.
    pub fn apply_update(&mut self, update: SampleUpdate) {
        if let Some(river_name) = &update.river_name {
            self.river_name = river_name.clone();
        }
        if let Some(method) = &update.method {
            self.method = method.clone();
        }
        if let Some(sampling_date) = update.sampling_date {
            self.sampling_date = sampling_date;
        }
        if let Some(detection_date) = update.detection_date {
            self.detection_date = detection_date;
        }
        if let Some(remarks) = &update.remarks {
            self.remarks = remarks.clone();
        }

        let mut regraded = false;

        for (indicator, value) in &update.readings {
            if self.reading(*indicator) == *value {
                continue;
            }
            self.set_reading(*indicator, *value);
            let grade = update
                .override_for(*indicator)
                .or_else(|| classify(*indicator, *value));
            self.set_grade(*indicator, grade);
            regraded = true;
        }

        for (indicator, grade) in &update.grade_overrides {
            self.set_grade(*indicator, Some(*grade));
            regraded = true;
        }

        if update.composite_override.is_some() {
            self.set_composite(update.composite_override);
        } else if regraded {
            self.set_composite(None);
        }
    }

    pub fn reading(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::Cod => self.cod,
            Indicator::AmmoniaNitrogen => self.ammonia_nitrogen,
            Indicator::TotalPhosphorus => self.total_phosphorus,
            Indicator::Permanganate => self.permanganate,
        }
    }

    pub fn grade(&self, indicator: Indicator) -> Option<Grade> {
        match indicator {
            Indicator::Cod => self.cod_grade,
            Indicator::AmmoniaNitrogen => self.ammonia_nitrogen_grade,
            Indicator::TotalPhosphorus => self.total_phosphorus_grade,
            Indicator::Permanganate => self.permanganate_grade,
        }
    }

    pub fn indicator_grades(&self) -> [Option<Grade>; 4] {
        [
            self.cod_grade,
            self.ammonia_nitrogen_grade,
            self.total_phosphorus_grade,
            self.permanganate_grade,
        ]
    }

    fn set_reading(&mut self, indicator: Indicator, value: Option<f64>) {
        match indicator {
            Indicator::Cod => self.cod = value,
            Indicator::AmmoniaNitrogen => self.ammonia_nitrogen = value,
            Indicator::TotalPhosphorus => self.total_phosphorus = value,
            Indicator::Permanganate => self.permanganate = value,
        }
    }

    fn set_grade(&mut self, indicator: Indicator, grade: Option<Grade>) {
        match indicator {
            Indicator::Cod => self.cod_grade = grade,
            Indicator::AmmoniaNitrogen => self.ammonia_nitrogen_grade = grade,
            Indicator::TotalPhosphorus => self.total_phosphorus_grade = grade,
            Indicator::Permanganate => self.permanganate_grade = grade,
        }
    }

    /// An explicit composite wins; otherwise worst-of the indicator grades.
    /// The rank always follows the final composite.
    fn set_composite(&mut self, explicit: Option<Grade>) {
        let composite = match explicit {
            Some(grade) => Some(grade),
            None => resolve_composite(self.indicator_grades()).0,
        };
        self.composite_grade = composite;
        self.composite_rank = composite.map(Grade::rank);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_sample() -> NewSample {
        NewSample {
            river_name: "Qinhuai".to_string(),
            method: Some("grab".to_string()),
            sampling_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            detection_date: Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_ingest_grades_every_reading() {
        let s = Sample::ingest(NewSample {
            cod: Some(15.0),
            ammonia_nitrogen: Some(0.1),
            total_phosphorus: Some(0.01),
            permanganate: Some(1.0),
            ..new_sample()
        });

        assert_eq!(s.cod_grade, Some(Grade::II));
        assert_eq!(s.ammonia_nitrogen_grade, Some(Grade::I));
        assert_eq!(s.total_phosphorus_grade, Some(Grade::I));
        assert_eq!(s.permanganate_grade, Some(Grade::I));
        assert_eq!(s.composite_grade, Some(Grade::II));
        assert_eq!(s.composite_rank, Some(2));
        assert_eq!(s.id, 0);
    }

    #[test]
    fn test_ingest_without_readings_has_no_composite() {
        let s = Sample::ingest(new_sample());
        assert_eq!(s.composite_grade, None);
        assert_eq!(s.composite_rank, None);
    }

    #[test]
    fn test_ingest_keeps_grade_override() {
        let s = Sample::ingest(NewSample {
            cod: Some(10.0),
            cod_grade: Some(Grade::IV),
            ammonia_nitrogen: Some(0.1),
            ..new_sample()
        });

        assert_eq!(s.cod_grade, Some(Grade::IV));
        assert_eq!(s.ammonia_nitrogen_grade, Some(Grade::I));
        assert_eq!(s.composite_grade, Some(Grade::IV));
    }

    #[test]
    fn test_ingest_keeps_composite_override() {
        let s = Sample::ingest(NewSample {
            cod: Some(10.0),
            composite_grade: Some(Grade::MildBlackOdor),
            ..new_sample()
        });

        assert_eq!(s.cod_grade, Some(Grade::I));
        assert_eq!(s.composite_grade, Some(Grade::MildBlackOdor));
        assert_eq!(s.composite_rank, Some(7));
    }

    #[test]
    fn test_update_regrades_changed_reading() {
        let mut s = Sample::ingest(NewSample {
            cod: Some(10.0),
            permanganate: Some(3.0),
            ..new_sample()
        });
        assert_eq!(s.composite_grade, Some(Grade::II));

        s.apply_update(SampleUpdate::default().with_reading(Indicator::Cod, Some(50.0)));

        assert_eq!(s.cod, Some(50.0));
        assert_eq!(s.cod_grade, Some(Grade::WorseThanV));
        assert_eq!(s.permanganate_grade, Some(Grade::II));
        assert_eq!(s.composite_grade, Some(Grade::WorseThanV));
        assert_eq!(s.composite_rank, Some(6));
    }

    #[test]
    fn test_update_clearing_reading_drops_grade() {
        let mut s = Sample::ingest(NewSample {
            cod: Some(50.0),
            permanganate: Some(3.0),
            ..new_sample()
        });

        s.apply_update(SampleUpdate::default().with_reading(Indicator::Cod, None));

        assert_eq!(s.cod_grade, None);
        assert_eq!(s.composite_grade, Some(Grade::II));
    }

    #[test]
    fn test_update_override_in_same_mutation_wins() {
        let mut s = Sample::ingest(NewSample {
            cod: Some(10.0),
            ..new_sample()
        });

        s.apply_update(
            SampleUpdate::default()
                .with_reading(Indicator::Cod, Some(50.0))
                .with_grade_override(Indicator::Cod, Grade::III)
                .with_composite_override(Grade::SevereBlackOdor),
        );

        assert_eq!(s.cod_grade, Some(Grade::III));
        assert_eq!(s.composite_grade, Some(Grade::SevereBlackOdor));
        assert_eq!(s.composite_rank, Some(8));
    }

    #[test]
    fn test_update_without_readings_keeps_grades() {
        let mut s = Sample::ingest(NewSample {
            cod: Some(10.0),
            composite_grade: Some(Grade::MildBlackOdor),
            ..new_sample()
        });

        s.apply_update(SampleUpdate {
            river_name: Some("Yangtze".to_string()),
            ..Default::default()
        });

        assert_eq!(s.river_name, "Yangtze");
        assert_eq!(s.composite_grade, Some(Grade::MildBlackOdor));
    }

    #[test]
    fn test_update_with_unchanged_reading_keeps_override() {
        let mut s = Sample::ingest(NewSample {
            cod: Some(10.0),
            cod_grade: Some(Grade::IV),
            ..new_sample()
        });
        assert_eq!(s.composite_grade, Some(Grade::IV));

        s.apply_update(SampleUpdate::default().with_reading(Indicator::Cod, Some(10.0)));

        assert_eq!(s.cod_grade, Some(Grade::IV));
        assert_eq!(s.composite_grade, Some(Grade::IV));
        assert_eq!(s.composite_rank, Some(4));
    }
}
