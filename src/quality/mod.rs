//! Water quality classification against the GB 3838-2002 surface water bands.
//!
//! [`indicator`] holds the fixed threshold table, [`grade`] the severity
//! order, and [`classify`] the classifier and worst-of resolver that the
//! ingestion path runs before a sample is committed.

pub mod classify;
pub mod grade;
pub mod indicator;

pub use classify::{classify, is_valid_reading, resolve_composite};
pub use grade::{Grade, QualityBucket, WarningLevel};
pub use indicator::{ALL_INDICATORS, Indicator, IndicatorSpec};
