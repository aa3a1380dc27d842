//! Dimension values and filters used to slice a snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sample::Sample;

/// Canonical label for a blank or missing collection method.
pub const OTHER_METHOD: &str = "Other";

/// Canonicalizes a collection-method label.
///
/// Surrounding whitespace is trimmed and blank or absent labels collapse to
/// [`OTHER_METHOD`]. Applying it twice gives the same result as once.
pub fn normalize_method(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => OTHER_METHOD.to_string(),
    }
}

/// Grouping axis for breakdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    River,
    Method,
}

impl Dimension {
    /// The value of this dimension for a sample. Rivers are taken verbatim.
    pub fn key_of(self, sample: &Sample) -> String {
        match self {
            Dimension::River => sample.river_name.clone(),
            Dimension::Method => normalize_method(sample.method.as_deref()),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::River => write!(f, "river"),
            Dimension::Method => write!(f, "method"),
        }
    }
}

/// Restricts a snapshot to one river or one normalized method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "dimension", content = "value", rename_all = "snake_case")]
pub enum DimensionFilter {
    #[default]
    All,
    River(String),
    Method(String),
}

impl DimensionFilter {
    /// Builds a method filter, normalizing the requested value.
    pub fn method(raw: Option<&str>) -> Self {
        DimensionFilter::Method(normalize_method(raw))
    }

    pub fn river(name: impl Into<String>) -> Self {
        DimensionFilter::River(name.into())
    }

    /// Picks a filter from optional CLI-style arguments; a river wins if both
    /// are given.
    pub fn from_options(river: Option<String>, method: Option<String>) -> Self {
        match (river, method) {
            (Some(r), _) => DimensionFilter::River(r),
            (None, Some(m)) => DimensionFilter::method(Some(&m)),
            (None, None) => DimensionFilter::All,
        }
    }

    pub fn matches(&self, sample: &Sample) -> bool {
        match self {
            DimensionFilter::All => true,
            DimensionFilter::River(name) => sample.river_name == *name,
            DimensionFilter::Method(label) => {
                normalize_method(sample.method.as_deref()) == normalize_method(Some(label))
            }
        }
    }

    /// The dimension and value this filter selects, if any.
    pub fn selection(&self) -> Option<(Dimension, &str)> {
        match self {
            DimensionFilter::All => None,
            DimensionFilter::River(name) => Some((Dimension::River, name)),
            DimensionFilter::Method(label) => Some((Dimension::Method, label)),
        }
    }
}
