/// Computes a quantile from sorted data using linear interpolation.
///
/// The quantile `q` (0.0 to 1.0) is located at the fractional rank
/// `(n - 1) * q`. When the rank falls between two order statistics the result
/// is interpolated linearly between them. This is the same convention as the
/// "linear" method of common numerical libraries.
///
/// # Arguments
///
/// * `sorted_values` - Values sorted in ascending order
/// * `q` - The quantile to compute (0.0 to 1.0). Values outside the range are clamped.
///
/// # Returns
///
/// The interpolated quantile value. Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use geodigest_stats::percentiles::compute_quantile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_quantile(&values, 0.5), 3.0);
/// assert_eq!(compute_quantile(&values, 0.25), 2.0);
///
/// let values = [10.0, 20.0];
/// assert_eq!(compute_quantile(&values, 0.25), 12.5);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_quantile(sorted_values: &[f64], q: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let q = q.clamp(0.0, 1.0);
    let rank = (sorted_values.len() - 1) as f64 * q;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let lower_value = sorted_values[lower];
    if lower == upper {
        return lower_value;
    }
    let upper_value = sorted_values[upper];
    let fraction = rank - lower as f64;
    // Rounding must not push the result outside the bracketing order statistics.
    (lower_value + (upper_value - lower_value) * fraction).clamp(lower_value, upper_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_nan() {
        assert!(compute_quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn test_single_value() {
        assert_eq!(compute_quantile(&[7.0], 0.0), 7.0);
        assert_eq!(compute_quantile(&[7.0], 0.5), 7.0);
        assert_eq!(compute_quantile(&[7.0], 1.0), 7.0);
    }

    #[test]
    fn test_interpolates_between_order_statistics() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // rank = 3 * 0.5 = 1.5
        assert!((compute_quantile(&values, 0.5) - 2.5).abs() < 1e-12);
        // rank = 3 * 0.25 = 0.75
        assert!((compute_quantile(&values, 0.25) - 1.75).abs() < 1e-12);
        // rank = 3 * 0.75 = 2.25
        assert!((compute_quantile(&values, 0.75) - 3.25).abs() < 1e-12);
    }

    #[test]
    fn test_extremes() {
        let values = [-3.0, 0.0, 8.0];
        assert_eq!(compute_quantile(&values, 0.0), -3.0);
        assert_eq!(compute_quantile(&values, 1.0), 8.0);
        assert_eq!(compute_quantile(&values, 1.5), 8.0);
        assert_eq!(compute_quantile(&values, -0.5), -3.0);
    }

    #[test]
    fn test_median_of_one_to_hundred() {
        let values = (1..=100).map(f64::from).collect::<Vec<_>>();
        assert!((compute_quantile(&values, 0.5) - 50.5).abs() < 1e-12);
        assert!((compute_quantile(&values, 0.25) - 25.75).abs() < 1e-12);
    }
}
