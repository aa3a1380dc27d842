/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// `part / total * 100`, or 0.0 when `total` is zero.
pub fn pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Rounds to two decimal places, as every reported rate and value is.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// [`pct`] rounded for reporting.
pub fn rate(part: usize, total: usize) -> f64 {
    round2(pct(part, total))
}
