//! Stratified sampling of ranked records
//!
//! The sampler picks a small, deduplicated subset of a layer's ranked records
//! that represents the whole value distribution rather than only its head.
//! Candidates are drawn from a fixed sequence of tiers:
//!
//! ```text
//! top_performer        first topCount ranked items
//! bottom_performer     last bottomCount ranked items
//! quartile_k_rep       evenly spaced picks inside each quartile   (N >= 4)
//! median_area          the five items around the midpoint          (N >= 4)
//! statistical_outlier  |value - mean| > 2 std                      (N >= 10)
//! decile_k             landmark at rank floor(N * k / 10)          (N >= 10)
//! ```
//!
//! A candidate is admitted only while the sample is below its budget and its
//! `(id, value)` pair has not been admitted by an earlier tier. Because of the
//! second rule, the tier order decides which tier gets credited for an item
//! and must not change.

use std::collections::HashSet;

use geodigest_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize, Serializer};

use crate::rank::RankedItem;

/// The tier that admitted a sampled record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SampleType {
    #[display("top_performer")]
    TopPerformer,
    #[display("bottom_performer")]
    BottomPerformer,
    /// Representative of quartile `1..=4`, counted from the highest values
    #[display("quartile_{_0}_rep")]
    QuartileRep(u8),
    #[display("median_area")]
    MedianArea,
    #[display("statistical_outlier")]
    StatisticalOutlier,
    /// Decile landmark `1..=10`
    #[display("decile_{_0}")]
    Decile(u8),
}

impl Serialize for SampleType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Size of one tier (or of the whole sample) as a function of the feature count.
///
/// Resolves to `min(max(floor, ceil(fraction * n)), cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierBudget {
    pub floor: usize,
    pub fraction: f64,
    pub cap: usize,
}

impl TierBudget {
    #[must_use]
    pub const fn new(floor: usize, fraction: f64, cap: usize) -> Self {
        Self {
            floor,
            fraction,
            cap,
        }
    }

    /// Resolves the budget for `n` features.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodigest_summary::sampler::TierBudget;
    ///
    /// let budget = TierBudget::new(30, 0.02, 100);
    /// assert_eq!(budget.resolve(100), 30);
    /// assert_eq!(budget.resolve(2_000), 40);
    /// assert_eq!(budget.resolve(10_000), 100);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn resolve(&self, n: usize) -> usize {
        let proportional = (self.fraction * n as f64).ceil().max(0.0) as usize;
        proportional.max(self.floor).min(self.cap)
    }
}

/// Tunables of the stratified sampler.
///
/// The defaults reproduce the reference behavior exactly; the minimum sizes
/// are kept configurable since they are tuned rather than derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Total sample budget
    pub sample_budget: TierBudget,
    /// Size of the `top_performer` tier
    pub top_budget: TierBudget,
    /// Size of the `bottom_performer` tier
    pub bottom_budget: TierBudget,
    /// Upper bound of representatives taken from each quartile
    pub max_reps_per_quartile: usize,
    /// One representative per this many items of a quartile
    pub quartile_rep_stride: usize,
    /// Items on each side of the midpoint in the `median_area` tier
    pub median_half_window: usize,
    /// Minimum ranked items for the quartile and median tiers
    pub min_items_for_quartiles: usize,
    /// Minimum ranked items for the outlier and decile tiers
    pub min_items_for_outliers: usize,
    /// Outlier threshold in population standard deviations
    pub outlier_sigma: f64,
    /// Cap of the legacy `top` view
    pub top_view_cap: usize,
    /// Cap of the legacy `bottom` view
    pub bottom_view_cap: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_budget: TierBudget::new(30, 0.02, 100),
            top_budget: TierBudget::new(15, 0.005, 20),
            bottom_budget: TierBudget::new(8, 0.003, 12),
            max_reps_per_quartile: 3,
            quartile_rep_stride: 10,
            median_half_window: 2,
            min_items_for_quartiles: 4,
            min_items_for_outliers: 10,
            outlier_sigma: 2.0,
            top_view_cap: 15,
            bottom_view_cap: 10,
        }
    }
}

/// A ranked item together with the tier that admitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub item: RankedItem,
    pub sample_type: SampleType,
}

/// Result of sampling one layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    /// Admitted samples in admission order.
    pub samples: Vec<Sample>,
    /// `top_performer` samples, highest value first.
    pub top: Vec<RankedItem>,
    /// `bottom_performer` samples, lowest value first.
    pub bottom: Vec<RankedItem>,
}

/// Dedup key: identifier plus the bit pattern of the value.
type SampleKey = (String, Option<u64>);

fn sample_key(item: &RankedItem) -> SampleKey {
    // +0.0 and -0.0 are the same value
    let bits = item.value.map(|v| if v == 0.0 { 0 } else { v.to_bits() });
    (item.id.clone(), bits)
}

#[derive(Debug)]
struct SampleCollector {
    budget: usize,
    seen: HashSet<SampleKey>,
    samples: Vec<Sample>,
}

impl SampleCollector {
    fn new(budget: usize) -> Self {
        Self {
            budget,
            seen: HashSet::new(),
            samples: Vec::with_capacity(budget),
        }
    }

    fn is_full(&self) -> bool {
        self.samples.len() >= self.budget
    }

    /// Offers every candidate of one tier; returns how many were admitted.
    fn offer_tier<'a, I>(&mut self, sample_type: SampleType, candidates: I) -> usize
    where
        I: IntoIterator<Item = &'a RankedItem>,
    {
        let mut admitted = 0;
        for item in candidates {
            if self.is_full() {
                break;
            }
            if self.seen.insert(sample_key(item)) {
                self.samples.push(Sample {
                    item: item.clone(),
                    sample_type,
                });
                admitted += 1;
            }
        }
        admitted
    }
}

/// Selects a bounded, deduplicated, multi-tier sample of ranked records.
#[derive(Debug, Clone, Default)]
pub struct StratifiedSampler {
    config: SamplerConfig,
}

impl StratifiedSampler {
    #[must_use]
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Samples `ranked`, which must be sorted by value in descending order.
    ///
    /// `feature_count` is the size of the whole layer and determines the
    /// budgets; it is at least `ranked.len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodigest_summary::{rank::RankedItem, sampler::StratifiedSampler};
    ///
    /// let ranked = (0..100)
    ///     .rev()
    ///     .map(|i| RankedItem {
    ///         id: i.to_string(),
    ///         name: format!("area {i}"),
    ///         value: Some(f64::from(i)),
    ///         source_index: i as usize,
    ///     })
    ///     .collect::<Vec<_>>();
    /// let set = StratifiedSampler::default().sample(&ranked, ranked.len());
    /// assert_eq!(set.samples.len(), 30);
    /// assert_eq!(set.top.len(), 15);
    /// assert_eq!(set.bottom.len(), 8);
    /// ```
    #[must_use]
    pub fn sample(&self, ranked: &[RankedItem], feature_count: usize) -> SampleSet {
        let n = ranked.len();
        if n == 0 {
            return SampleSet::default();
        }
        let config = &self.config;
        let feature_count = feature_count.max(n);
        let budget = config.sample_budget.resolve(feature_count);
        let mut collector = SampleCollector::new(budget);

        let top_count = config.top_budget.resolve(feature_count).min(n);
        let admitted = collector.offer_tier(SampleType::TopPerformer, &ranked[..top_count]);
        tracing::debug!(tier = "top_performer", admitted);

        // Lowest value first, so the bottom view reads in ascending order
        let bottom_count = config.bottom_budget.resolve(feature_count).min(n);
        let admitted =
            collector.offer_tier(SampleType::BottomPerformer, ranked[n - bottom_count..].iter().rev());
        tracing::debug!(tier = "bottom_performer", admitted);

        // Without values the ranking is input order, so only the extreme tiers apply
        let quantitative = ranked.iter().any(|item| item.value.is_some());

        if quantitative && n >= config.min_items_for_quartiles {
            for (quartile, indices) in self.quartile_representatives(n).into_iter().enumerate() {
                let sample_type = SampleType::QuartileRep(tier_number(quartile));
                let admitted = collector.offer_tier(sample_type, indices.iter().map(|&i| &ranked[i]));
                tracing::debug!(tier = %sample_type, admitted);
            }

            let admitted =
                collector.offer_tier(SampleType::MedianArea, self.median_window(n).map(|i| &ranked[i]));
            tracing::debug!(tier = "median_area", admitted);
        }

        if quantitative && n >= config.min_items_for_outliers {
            let admitted =
                collector.offer_tier(SampleType::StatisticalOutlier, self.outliers(ranked));
            tracing::debug!(tier = "statistical_outlier", admitted);

            let mut admitted = 0;
            for decile in 1..=10 {
                if collector.is_full() {
                    break;
                }
                let idx = (n * decile / 10).min(n - 1);
                admitted +=
                    collector.offer_tier(SampleType::Decile(tier_number(decile - 1)), [&ranked[idx]]);
            }
            tracing::debug!(tier = "decile", admitted);
        }

        tracing::debug!(
            feature_count,
            ranked = n,
            budget,
            sampled = collector.samples.len(),
            "stratified sample selected"
        );
        self.finish(collector.samples)
    }

    /// Evenly spaced indices inside each of the four contiguous quartiles.
    fn quartile_representatives(&self, n: usize) -> [Vec<usize>; 4] {
        std::array::from_fn(|quartile| {
            let start = quartile * n / 4;
            let end = (quartile + 1) * n / 4;
            let size = end - start;
            if size == 0 {
                return vec![];
            }
            let reps = size
                .div_ceil(self.config.quartile_rep_stride.max(1))
                .min(self.config.max_reps_per_quartile);
            // Center of each of `reps` equal slices of the quartile
            (0..reps)
                .map(|rep| start + (2 * rep + 1) * size / (2 * reps))
                .collect()
        })
    }

    fn median_window(&self, n: usize) -> impl Iterator<Item = usize> {
        let mid = n / 2;
        let half = self.config.median_half_window;
        mid.saturating_sub(half)..(mid + half + 1).min(n)
    }

    fn outliers<'a>(&self, ranked: &'a [RankedItem]) -> impl Iterator<Item = &'a RankedItem> {
        let stats = DescriptiveStats::new(ranked.iter().filter_map(|item| item.value));
        let threshold = stats
            .as_ref()
            .filter(|stats| stats.std_dev > 0.0)
            .map(|stats| (stats.mean, self.config.outlier_sigma * stats.std_dev));
        ranked.iter().filter(move |item| match (threshold, item.value) {
            (Some((mean, limit)), Some(value)) => (value - mean).abs() > limit,
            _ => false,
        })
    }

    fn finish(&self, samples: Vec<Sample>) -> SampleSet {
        let top = samples
            .iter()
            .filter(|s| s.sample_type == SampleType::TopPerformer)
            .take(self.config.top_view_cap)
            .map(|s| s.item.clone())
            .collect();
        let bottom = samples
            .iter()
            .filter(|s| s.sample_type == SampleType::BottomPerformer)
            .take(self.config.bottom_view_cap)
            .map(|s| s.item.clone())
            .collect();
        SampleSet {
            samples,
            top,
            bottom,
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
fn tier_number(zero_based: usize) -> u8 {
    (zero_based + 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_desc(values: &[f64]) -> Vec<RankedItem> {
        let mut items = values
            .iter()
            .enumerate()
            .map(|(idx, &value)| RankedItem {
                id: format!("r{idx}"),
                name: format!("Record {idx}"),
                value: Some(value),
                source_index: idx,
            })
            .collect::<Vec<_>>();
        items.sort_by(|a, b| b.value.unwrap().total_cmp(&a.value.unwrap()));
        items
    }

    fn uniform(n: usize) -> Vec<RankedItem> {
        ranked_desc(&(1..=n).map(|v| v as f64).collect::<Vec<_>>())
    }

    fn count_of(set: &SampleSet, sample_type: SampleType) -> usize {
        set.samples
            .iter()
            .filter(|s| s.sample_type == sample_type)
            .count()
    }

    #[test]
    fn test_sample_type_names() {
        assert_eq!(SampleType::TopPerformer.to_string(), "top_performer");
        assert_eq!(SampleType::QuartileRep(3).to_string(), "quartile_3_rep");
        assert_eq!(SampleType::Decile(10).to_string(), "decile_10");
        assert_eq!(
            serde_json::to_value(SampleType::StatisticalOutlier).unwrap(),
            serde_json::json!("statistical_outlier")
        );
    }

    #[test]
    fn test_budget_formulas() {
        let config = SamplerConfig::default();
        assert_eq!(config.sample_budget.resolve(0), 30);
        assert_eq!(config.sample_budget.resolve(1_501), 31);
        assert_eq!(config.sample_budget.resolve(10_000), 100);
        assert_eq!(config.top_budget.resolve(100), 15);
        assert_eq!(config.top_budget.resolve(3_801), 20);
        assert_eq!(config.bottom_budget.resolve(3_500), 11);
        assert_eq!(config.bottom_budget.resolve(1_000_000), 12);
    }

    #[test]
    fn test_empty_input() {
        let set = StratifiedSampler::default().sample(&[], 0);
        assert!(set.samples.is_empty());
        assert!(set.top.is_empty());
        assert!(set.bottom.is_empty());
    }

    #[test]
    fn test_small_layers_only_use_extreme_tiers() {
        for n in 1..=3 {
            let set = StratifiedSampler::default().sample(&uniform(n), n);
            assert_eq!(set.samples.len(), n);
            assert!(set.samples.iter().all(|s| matches!(
                s.sample_type,
                SampleType::TopPerformer | SampleType::BottomPerformer
            )));
        }
    }

    #[test]
    fn test_hundred_uniform_values() {
        let ranked = uniform(100);
        let set = StratifiedSampler::default().sample(&ranked, 100);
        assert_eq!(set.samples.len(), 30);
        assert_eq!(count_of(&set, SampleType::TopPerformer), 15);
        assert_eq!(count_of(&set, SampleType::BottomPerformer), 8);
        // 25 per quartile -> 3 reps each at offsets 4, 12 and 20; 7 slots left
        // after the extremes. Ranks 4 and 12 are top performers already.
        assert_eq!(count_of(&set, SampleType::QuartileRep(1)), 1);
        assert_eq!(count_of(&set, SampleType::QuartileRep(2)), 3);
        assert_eq!(count_of(&set, SampleType::QuartileRep(3)), 3);
        assert_eq!(count_of(&set, SampleType::QuartileRep(4)), 0);
        let quartile_values = set
            .samples
            .iter()
            .filter(|s| matches!(s.sample_type, SampleType::QuartileRep(_)))
            .map(|s| s.item.value.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(quartile_values, [80.0, 71.0, 63.0, 55.0, 46.0, 38.0, 30.0]);

        assert_eq!(set.top.len(), 15);
        assert_eq!(set.top[0].value, Some(100.0));
        assert_eq!(set.bottom.len(), 8);
        assert_eq!(set.bottom[0].value, Some(1.0));
    }

    #[test]
    fn test_budget_caps_at_hundred() {
        let ranked = uniform(10_000);
        let sampler = StratifiedSampler::default();
        assert_eq!(sampler.config().sample_budget.resolve(10_000), 100);
        let set = sampler.sample(&ranked, 10_000);
        // The tiers offer fewer distinct candidates than the budget allows:
        // 20 top + 12 bottom + 12 quartile + 5 median + 8 new deciles
        assert!(set.samples.len() <= 100);
        assert_eq!(set.samples.len(), 57);
        assert_eq!(count_of(&set, SampleType::TopPerformer), 20);
        assert_eq!(count_of(&set, SampleType::BottomPerformer), 12);
        let quartile_reps = (1..=4)
            .map(|q| count_of(&set, SampleType::QuartileRep(q)))
            .collect::<Vec<_>>();
        assert_eq!(quartile_reps, [3, 3, 3, 3]);
        assert_eq!(count_of(&set, SampleType::MedianArea), 5);
        assert_eq!(count_of(&set, SampleType::StatisticalOutlier), 0);
        // Decile 5 lands in the median window and decile 10 on the last bottom performer
        let deciles = (1..=10)
            .map(|d| count_of(&set, SampleType::Decile(d)))
            .collect::<Vec<_>>();
        assert_eq!(deciles, [1, 1, 1, 1, 0, 1, 1, 1, 1, 0]);
        assert_eq!(set.top.len(), 15);
        assert_eq!(set.bottom.len(), 10);
    }

    #[test]
    fn test_budget_is_filled_when_tiers_allow() {
        // A tight budget is reached before the later tiers are offered
        let config = SamplerConfig {
            sample_budget: TierBudget::new(25, 0.0, 25),
            ..SamplerConfig::default()
        };
        let set = StratifiedSampler::new(config).sample(&uniform(10_000), 10_000);
        assert_eq!(set.samples.len(), 25);
        assert_eq!(count_of(&set, SampleType::TopPerformer), 20);
        assert_eq!(count_of(&set, SampleType::BottomPerformer), 5);
    }

    #[test]
    fn test_unvalued_items_only_use_extreme_tiers() {
        let ranked = (0..50)
            .map(|idx| RankedItem {
                id: format!("r{idx}"),
                name: format!("Record {idx}"),
                value: None,
                source_index: idx,
            })
            .collect::<Vec<_>>();
        let set = StratifiedSampler::default().sample(&ranked, 50);
        assert_eq!(set.samples.len(), 23);
        assert_eq!(count_of(&set, SampleType::TopPerformer), 15);
        assert_eq!(count_of(&set, SampleType::BottomPerformer), 8);
        assert_eq!(set.samples[0].item.id, "r0");
        assert_eq!(set.samples[15].item.id, "r49");
    }

    #[test]
    fn test_views_are_sorted() {
        let set = StratifiedSampler::default().sample(&uniform(500), 500);
        assert!(set.top.windows(2).all(|w| w[0].value >= w[1].value));
        assert!(set.bottom.windows(2).all(|w| w[0].value <= w[1].value));
    }

    #[test]
    fn test_no_duplicate_keys() {
        let set = StratifiedSampler::default().sample(&uniform(40), 40);
        let keys = set.samples.iter().map(|s| sample_key(&s.item)).collect::<HashSet<_>>();
        assert_eq!(keys.len(), set.samples.len());
        assert_eq!(set.samples.len(), 30);
    }

    #[test]
    fn test_same_id_with_different_value_is_distinct() {
        let ranked = vec![
            RankedItem {
                id: "dup".into(),
                name: "a".into(),
                value: Some(2.0),
                source_index: 0,
            },
            RankedItem {
                id: "dup".into(),
                name: "b".into(),
                value: Some(1.0),
                source_index: 1,
            },
        ];
        let set = StratifiedSampler::default().sample(&ranked, 2);
        assert_eq!(set.samples.len(), 2);
    }

    #[test]
    fn test_outliers_are_detected() {
        // 60 values around 50 plus two far outliers in the middle of the ranking
        let mut values = (0..60).map(|i| 45.0 + f64::from(i % 10)).collect::<Vec<_>>();
        values.push(400.0);
        values.push(-300.0);
        let ranked = ranked_desc(&values);
        let config = SamplerConfig {
            top_budget: TierBudget::new(1, 0.0, 1),
            bottom_budget: TierBudget::new(1, 0.0, 1),
            ..SamplerConfig::default()
        };
        let set = StratifiedSampler::new(config).sample(&ranked, ranked.len());
        // Both outliers sit at the extremes, so the extreme tiers claim them first
        assert_eq!(set.samples[0].item.value, Some(400.0));
        assert_eq!(set.samples[1].item.value, Some(-300.0));
        assert_eq!(count_of(&set, SampleType::StatisticalOutlier), 0);
    }

    #[test]
    fn test_outlier_tier_admits_unclaimed_outliers() {
        let mut values = vec![10.0; 40];
        values.extend([1000.0, 900.0]);
        let ranked = ranked_desc(&values);
        let config = SamplerConfig {
            top_budget: TierBudget::new(0, 0.0, 0),
            bottom_budget: TierBudget::new(0, 0.0, 0),
            ..SamplerConfig::default()
        };
        let set = StratifiedSampler::new(config).sample(&ranked, ranked.len());
        let outliers = set
            .samples
            .iter()
            .filter(|s| s.sample_type == SampleType::StatisticalOutlier)
            .map(|s| s.item.value.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(outliers, [1000.0, 900.0]);
    }

    #[test]
    fn test_constant_values_have_no_outliers() {
        let ranked = ranked_desc(&[0.1; 50]);
        let set = StratifiedSampler::default().sample(&ranked, 50);
        assert_eq!(count_of(&set, SampleType::StatisticalOutlier), 0);
        assert_eq!(set.samples.len(), 30);
    }

    #[test]
    fn test_values_absent() {
        let ranked = (0..2)
            .map(|i| RankedItem {
                id: format!("id{i}"),
                name: format!("n{i}"),
                value: None,
                source_index: i,
            })
            .collect::<Vec<_>>();
        let set = StratifiedSampler::default().sample(&ranked, 2);
        assert_eq!(set.samples.len(), 2);
        assert!(set
            .samples
            .iter()
            .all(|s| s.sample_type == SampleType::TopPerformer));
    }

    #[test]
    fn test_decile_tier_fills_remaining_budget() {
        let config = SamplerConfig {
            top_budget: TierBudget::new(0, 0.0, 0),
            bottom_budget: TierBudget::new(0, 0.0, 0),
            max_reps_per_quartile: 0,
            median_half_window: 0,
            ..SamplerConfig::default()
        };
        let ranked = uniform(20);
        let set = StratifiedSampler::new(config).sample(&ranked, 20);
        // median window of 0 still contributes the midpoint itself (rank 10)
        assert_eq!(count_of(&set, SampleType::MedianArea), 1);
        // ranks 2, 4, ..., 18 and the clamped rank 19; rank 10 is taken
        assert_eq!(set.samples.len(), 10);
        assert_eq!(set.samples.last().unwrap().sample_type, SampleType::Decile(10));
        assert_eq!(set.samples.last().unwrap().item.value, Some(1.0));
    }

    #[test]
    fn test_samples_never_exceed_ranked_items() {
        for n in [4, 9, 10, 11, 29, 31] {
            let set = StratifiedSampler::default().sample(&uniform(n), n);
            assert!(set.samples.len() <= n);
        }
    }
}
