//! Grade vocabulary and the single severity order shared by composite
//! resolution and warning ranking.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Water quality grade, declared best → worst.
///
/// The declaration order *is* the severity order: `Ord` is derived, so
/// `max()` over a set of grades yields the most severe one.
///
/// | Grade            | Rank | Bucket     | Warning level    |
/// |------------------|------|------------|------------------|
/// | I                | 1    | excellent  | -                |
/// | II               | 2    | excellent  | -                |
/// | III              | 3    | excellent  | -                |
/// | IV               | 4    | good       | -                |
/// | V                | 5    | poor       | `poor`           |
/// | worse than V     | 6    | very poor  | `very_poor`      |
/// | mild black-odor  | 7    | polluted   | `light_polluted` |
/// | severe black-odor| 8    | polluted   | `polluted`       |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "I", alias = "Ⅰ类", alias = "1")]
    I,
    #[serde(rename = "II", alias = "Ⅱ类", alias = "2")]
    II,
    #[serde(rename = "III", alias = "Ⅲ类", alias = "3")]
    III,
    #[serde(rename = "IV", alias = "Ⅳ类", alias = "4")]
    IV,
    #[serde(rename = "V", alias = "Ⅴ类", alias = "5")]
    V,
    #[serde(rename = "worse-than-V", alias = "劣Ⅴ类")]
    WorseThanV,
    #[serde(rename = "mild-black-odor", alias = "轻度黑臭")]
    MildBlackOdor,
    #[serde(rename = "severe-black-odor", alias = "重度黑臭")]
    SevereBlackOdor,
}

/// The five standard bands in increasing severity, as walked by the classifier.
pub const STANDARD_BANDS: [Grade; 5] = [Grade::I, Grade::II, Grade::III, Grade::IV, Grade::V];

/// Every grade, best first.
pub const ALL_GRADES: [Grade; 8] = [
    Grade::I,
    Grade::II,
    Grade::III,
    Grade::IV,
    Grade::V,
    Grade::WorseThanV,
    Grade::MildBlackOdor,
    Grade::SevereBlackOdor,
];

/// Coarse reporting bucket a composite grade falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBucket {
    Excellent,
    Good,
    Poor,
    VeryPoor,
    Polluted,
}

/// Pollution warning tier attached to warning records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    Poor,
    VeryPoor,
    LightPolluted,
    Polluted,
}

impl Grade {
    /// Ordinal encoding of the severity order. Lower is better.
    pub fn rank(self) -> u8 {
        match self {
            Grade::I => 1,
            Grade::II => 2,
            Grade::III => 3,
            Grade::IV => 4,
            Grade::V => 5,
            Grade::WorseThanV => 6,
            Grade::MildBlackOdor => 7,
            Grade::SevereBlackOdor => 8,
        }
    }

    /// Canonical label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Grade::I => "I",
            Grade::II => "II",
            Grade::III => "III",
            Grade::IV => "IV",
            Grade::V => "V",
            Grade::WorseThanV => "worse-than-V",
            Grade::MildBlackOdor => "mild-black-odor",
            Grade::SevereBlackOdor => "severe-black-odor",
        }
    }

    pub fn bucket(self) -> QualityBucket {
        match self {
            Grade::I | Grade::II | Grade::III => QualityBucket::Excellent,
            Grade::IV => QualityBucket::Good,
            Grade::V => QualityBucket::Poor,
            Grade::WorseThanV => QualityBucket::VeryPoor,
            Grade::MildBlackOdor | Grade::SevereBlackOdor => QualityBucket::Polluted,
        }
    }

    /// Bands I through III meet the standard.
    pub fn is_qualified(self) -> bool {
        self.bucket() == QualityBucket::Excellent
    }

    /// `None` for grades that do not warrant a pollution warning.
    pub fn warning_level(self) -> Option<WarningLevel> {
        match self {
            Grade::V => Some(WarningLevel::Poor),
            Grade::WorseThanV => Some(WarningLevel::VeryPoor),
            Grade::MildBlackOdor => Some(WarningLevel::LightPolluted),
            Grade::SevereBlackOdor => Some(WarningLevel::Polluted),
            _ => None,
        }
    }

    pub fn is_warning(self) -> bool {
        self.warning_level().is_some()
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
