use crate::{descriptive::DescriptiveStats, histogram::Histogram};

/// Comprehensive statistical analysis combining multiple measures.
///
/// This structure provides a complete numeric overview of a dataset by combining:
/// - Descriptive statistics (min, max, mean, quartiles, standard deviation)
/// - An equal-width histogram for distribution visualization
///
/// Both are computed from a single sorted copy of the data.
///
/// # Examples
///
/// ```
/// use geodigest_stats::comprehensive::ComprehensiveStats;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let stats = ComprehensiveStats::new(values, 5).unwrap();
///
/// assert_eq!(stats.stats.mean, 5.5);
/// assert_eq!(stats.histogram.bins.len(), 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensiveStats {
    /// Basic descriptive statistics for the dataset.
    pub stats: DescriptiveStats,
    /// Histogram showing the distribution of values across bins.
    pub histogram: Histogram,
}

impl ComprehensiveStats {
    /// Computes comprehensive statistics from unsorted values.
    ///
    /// # Arguments
    ///
    /// * `values` - The data points to analyze
    /// * `hist_num_bins` - The number of equal-width histogram bins
    ///
    /// # Returns
    ///
    /// * `Some(ComprehensiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    #[must_use]
    pub fn new<I>(values: I, hist_num_bins: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, hist_num_bins)
    }

    /// Computes comprehensive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], hist_num_bins: usize) -> Option<Self> {
        let stats = DescriptiveStats::from_sorted(sorted_values)?;
        let histogram = Histogram::from_sorted(sorted_values, hist_num_bins);
        Some(Self { stats, histogram })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(ComprehensiveStats::new(Vec::new(), 10).is_none());
    }

    #[test]
    fn test_histogram_conserves_count() {
        let values = [0.5, 0.5, 1.0, 3.0, 8.0, 13.0, 21.0];
        let stats = ComprehensiveStats::new(values, 10).unwrap();
        assert_eq!(stats.stats.count, values.len());
        assert_eq!(stats.histogram.total_count(), values.len() as u64);
        assert_eq!(stats.histogram.bins[0].start, stats.stats.min);
        assert_eq!(stats.histogram.bins[9].end, stats.stats.max);
    }
}
