//! Indicator kinds and their fixed descriptor table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four measured indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Cod,
    AmmoniaNitrogen,
    TotalPhosphorus,
    Permanganate,
}

pub const ALL_INDICATORS: [Indicator; 4] = [
    Indicator::Cod,
    Indicator::AmmoniaNitrogen,
    Indicator::TotalPhosphorus,
    Indicator::Permanganate,
];

/// Static description of one indicator.
///
/// `breakpoints` are the inclusive upper bounds of bands I..=V, in mg/L.
/// `standard_value` is the single reference used for exceedance rates; it is
/// the band III bound and is independent of the band walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSpec {
    pub label: &'static str,
    pub code: &'static str,
    pub unit: &'static str,
    pub standard_value: f64,
    pub breakpoints: [f64; 5],
}

const COD: IndicatorSpec = IndicatorSpec {
    label: "COD",
    code: "cod",
    unit: "mg/L",
    standard_value: 20.0,
    breakpoints: [15.0, 15.0, 20.0, 30.0, 40.0],
};

const AMMONIA_NITROGEN: IndicatorSpec = IndicatorSpec {
    label: "Ammonia Nitrogen",
    code: "ammonia_nitrogen",
    unit: "mg/L",
    standard_value: 1.0,
    breakpoints: [0.15, 0.5, 1.0, 1.5, 2.0],
};

const TOTAL_PHOSPHORUS: IndicatorSpec = IndicatorSpec {
    label: "Total Phosphorus",
    code: "total_phosphorus",
    unit: "mg/L",
    standard_value: 0.2,
    breakpoints: [0.02, 0.1, 0.2, 0.3, 0.4],
};

const PERMANGANATE: IndicatorSpec = IndicatorSpec {
    label: "Permanganate Index",
    code: "permanganate",
    unit: "mg/L",
    standard_value: 6.0,
    breakpoints: [2.0, 4.0, 6.0, 10.0, 15.0],
};

impl Indicator {
    pub fn spec(self) -> &'static IndicatorSpec {
        match self {
            Indicator::Cod => &COD,
            Indicator::AmmoniaNitrogen => &AMMONIA_NITROGEN,
            Indicator::TotalPhosphorus => &TOTAL_PHOSPHORUS,
            Indicator::Permanganate => &PERMANGANATE,
        }
    }

    /// Upper breakpoint of band V; anything above is worse than V.
    pub fn band_v_limit(self) -> f64 {
        self.spec().breakpoints[4]
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().label)
    }
}
