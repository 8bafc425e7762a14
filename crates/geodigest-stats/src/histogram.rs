/// A histogram representation of a dataset's distribution.
///
/// The histogram divides the observed value range `[min, max]` into
/// equal-width, non-overlapping bins and counts the values falling into each
/// bin. When every value is identical the histogram degenerates to a single
/// bin covering `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// The bins comprising the histogram, ordered from left to right.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
///
/// Each bin covers `[start, end)`, except the last bin which also includes
/// `end` (the maximum of the data).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    /// Inclusive lower bound of the bin.
    pub start: f64,
    /// Upper bound of the bin.
    pub end: f64,
    /// The number of values that fall within this bin.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram from unsorted values.
    ///
    /// The range is taken from the minimum and maximum of `values`.
    ///
    /// # Arguments
    ///
    /// * `values` - The finite data points to bin.
    /// * `num_bins` - The number of equal-width bins to create.
    ///
    /// # Returns
    ///
    /// A `Histogram` with `num_bins` bins, a single bin when all values are
    /// equal, or no bins when `values` is empty or `num_bins` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use geodigest_stats::histogram::Histogram;
    /// let values = [5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 6.0, 10.0];
    /// let histogram = Histogram::new(&values, 3);
    /// assert_eq!(histogram.bins.len(), 3);
    /// assert_eq!(histogram.bins[0].start, 1.0);
    /// assert_eq!(histogram.bins[2].end, 10.0);
    /// ```
    #[must_use]
    pub fn new(values: &[f64], num_bins: usize) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self::with_range(values, min, max, num_bins)
    }

    /// Creates a histogram from pre-sorted values.
    ///
    /// This is an optimized version that reads the range from the ends of the
    /// slice instead of scanning for it.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use geodigest_stats::histogram::Histogram;
    /// let histogram = Histogram::from_sorted(&[4.0, 4.0, 4.0], 10);
    /// assert_eq!(histogram.bins.len(), 1);
    /// assert_eq!(histogram.bins[0].count, 3);
    /// ```
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], num_bins: usize) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );
        match (sorted_values.first(), sorted_values.last()) {
            (Some(&min), Some(&max)) => Self::with_range(sorted_values, min, max, num_bins),
            _ => Self { bins: vec![] },
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    fn with_range(values: &[f64], min: f64, max: f64, num_bins: usize) -> Self {
        if values.is_empty() || num_bins == 0 {
            return Self { bins: vec![] };
        }

        let width = (max - min) / num_bins as f64;
        if !(width.is_finite() && width > 0.0) {
            // Constant data, or a range too narrow to split
            return Self {
                bins: vec![HistogramBin {
                    start: min,
                    end: max,
                    count: values.len() as u64,
                }],
            };
        }

        let mut bins = (0..num_bins)
            .map(|bin_idx| HistogramBin {
                start: min + bin_idx as f64 * width,
                end: if bin_idx == num_bins - 1 {
                    max
                } else {
                    min + (bin_idx + 1) as f64 * width
                },
                count: 0,
            })
            .collect::<Vec<_>>();

        for &val in values {
            let position = ((val - min) / width).floor();
            // Values equal to `max` land at position `num_bins`
            let idx = if position <= 0.0 {
                0
            } else {
                (position as usize).min(num_bins - 1)
            };
            bins[idx].count += 1;
        }

        Self { bins }
    }

    /// Returns the total number of values counted across all bins.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}
