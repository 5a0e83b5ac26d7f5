/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rounds to two decimals, the precision grades are stored and shown with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
