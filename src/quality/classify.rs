//! Per-indicator classification and worst-of composite resolution.

use crate::quality::grade::{Grade, STANDARD_BANDS};
use crate::quality::indicator::Indicator;

/// Whether `value` is a usable concentration: finite and non-negative.
pub fn is_valid_reading(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Maps one indicator reading to its grade.
///
/// | Input                                   | Result          |
/// |-----------------------------------------|-----------------|
/// | `None`, negative, NaN or infinite        | `None`          |
/// | `> band V bound`                         | worse than V    |
/// | COD exactly at the shared I/II bound     | II              |
/// | otherwise                                | first band I..V whose bound is `>= value` |
pub fn classify(indicator: Indicator, value: Option<f64>) -> Option<Grade> {
    let value = value.filter(|v| is_valid_reading(*v))?;

    let spec = indicator.spec();
    if value > indicator.band_v_limit() {
        return Some(Grade::WorseThanV);
    }

    // Bands I and II share one COD bound; equality lands in II.
    if indicator == Indicator::Cod && value == spec.breakpoints[0] {
        return Some(Grade::II);
    }

    STANDARD_BANDS
        .iter()
        .zip(spec.breakpoints.iter())
        .find(|(_, bound)| value <= **bound)
        .map(|(grade, _)| *grade)
        .or(Some(Grade::WorseThanV))
}

/// Resolves the composite grade as the most severe present grade, together
/// with its rank. All-absent input yields `(None, None)`.
pub fn resolve_composite<I>(grades: I) -> (Option<Grade>, Option<u8>)
where
    I: IntoIterator<Item = Option<Grade>>,
{
    let worst = grades.into_iter().flatten().max();
    (worst, worst.map(Grade::rank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::indicator::ALL_INDICATORS;

    #[test]
    fn test_absent_value_has_no_grade() {
        for indicator in ALL_INDICATORS {
            assert_eq!(classify(indicator, None), None);
        }
    }

    #[test]
    fn test_invalid_values_have_no_grade() {
        assert_eq!(classify(Indicator::Cod, Some(-1.0)), None);
        assert_eq!(classify(Indicator::Cod, Some(f64::NAN)), None);
        assert_eq!(classify(Indicator::AmmoniaNitrogen, Some(f64::INFINITY)), None);
    }

    #[test]
    fn test_breakpoint_equality_stays_in_band() {
        for indicator in ALL_INDICATORS {
            let bp = indicator.spec().breakpoints;
            for (i, bound) in bp.iter().enumerate() {
                let expected = if indicator == Indicator::Cod && i == 0 {
                    Grade::II
                } else {
                    STANDARD_BANDS[i]
                };
                // COD's II bound equals its I bound, so index 1 also maps to II.
                assert_eq!(
                    classify(indicator, Some(*bound)),
                    Some(expected),
                    "{indicator} at {bound}"
                );
            }
        }
    }

    #[test]
    fn test_cod_bands() {
        assert_eq!(classify(Indicator::Cod, Some(0.0)), Some(Grade::I));
        assert_eq!(classify(Indicator::Cod, Some(14.9)), Some(Grade::I));
        assert_eq!(classify(Indicator::Cod, Some(15.0)), Some(Grade::II));
        assert_eq!(classify(Indicator::Cod, Some(15.1)), Some(Grade::III));
        assert_eq!(classify(Indicator::Cod, Some(20.0)), Some(Grade::III));
        assert_eq!(classify(Indicator::Cod, Some(30.0)), Some(Grade::IV));
        assert_eq!(classify(Indicator::Cod, Some(40.0)), Some(Grade::V));
        assert_eq!(classify(Indicator::Cod, Some(40.01)), Some(Grade::WorseThanV));
    }

    #[test]
    fn test_above_band_v_is_worse_than_v() {
        for indicator in ALL_INDICATORS {
            let limit = indicator.band_v_limit();
            assert_eq!(
                classify(indicator, Some(limit * 1.5)),
                Some(Grade::WorseThanV)
            );
        }
    }

    #[test]
    fn test_resolve_composite_all_absent() {
        assert_eq!(resolve_composite([None, None, None, None]), (None, None));
        assert_eq!(resolve_composite(Vec::<Option<Grade>>::new()), (None, None));
    }

    #[test]
    fn test_resolve_composite_picks_worst() {
        assert_eq!(
            resolve_composite([Some(Grade::II), Some(Grade::I), None, Some(Grade::IV)]),
            (Some(Grade::IV), Some(4))
        );
        assert_eq!(
            resolve_composite([Some(Grade::WorseThanV), Some(Grade::MildBlackOdor), None, None]),
            (Some(Grade::MildBlackOdor), Some(7))
        );
        assert_eq!(
            resolve_composite([None, None, Some(Grade::III), None]),
            (Some(Grade::III), Some(3))
        );
    }

    #[test]
    fn test_resolve_composite_is_idempotent() {
        let grades = [Some(Grade::V), Some(Grade::I), Some(Grade::V), None];
        let first = resolve_composite(grades);
        let second = resolve_composite(grades);
        assert_eq!(first, second);

        let (again, _) = resolve_composite([first.0]);
        assert_eq!(again, first.0);
    }

    #[test]
    fn test_clean_sample_scenario() {
        let grades = [
            classify(Indicator::Cod, Some(15.0)),
            classify(Indicator::AmmoniaNitrogen, Some(0.1)),
            classify(Indicator::TotalPhosphorus, Some(0.01)),
            classify(Indicator::Permanganate, Some(1.0)),
        ];
        assert_eq!(
            grades,
            [Some(Grade::II), Some(Grade::I), Some(Grade::I), Some(Grade::I)]
        );
        assert_eq!(resolve_composite(grades), (Some(Grade::II), Some(2)));
    }

    #[test]
    fn test_cod_only_above_band_v() {
        let grades = [classify(Indicator::Cod, Some(50.0)), None, None, None];
        assert_eq!(
            resolve_composite(grades),
            (Some(Grade::WorseThanV), Some(6))
        );
    }
}
