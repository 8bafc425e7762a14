//! Property-based tests for layer summaries.
//!
//! Layers are generated as lists of optional metric values. Records without a
//! value carry only an id, and ids repeat so that `(id, value)` collisions are
//! exercised. The metric field is pinned so discovery does not depend on the
//! first generated record.
//!
//! ## Properties
//!
//! - The sample never exceeds its budget or the number of records
//! - No two samples share an `(id, value)` pair
//! - The top view is non-increasing and the bottom view is non-decreasing
//! - Histogram counts add up to the number of valued records
//! - `min <= p25 <= median <= p75 <= max`
//! - Summaries are deterministic

use std::collections::HashSet;

use geodigest_summary::{
    record::Record,
    summary::{LayerInput, LayerSummary, Summarizer},
};
use proptest::prelude::*;
use serde_json::json;

const ID_MODULUS: usize = 7;

fn build_layer(values: &[Option<f64>]) -> LayerInput {
    let features = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let id = i % ID_MODULUS;
            match value {
                Some(v) => Record::from(json!({ "ID": id, "value": v })),
                None => Record::from(json!({ "ID": id })),
            }
        })
        .collect();
    LayerInput::new("generated", "Generated", features).with_field("value")
}

fn summarize(values: &[Option<f64>]) -> LayerSummary {
    Summarizer::default()
        .summarize(&[build_layer(values)])
        .unwrap()
        .layers
        .remove(0)
}

fn expected_budget(feature_count: usize) -> usize {
    let scaled = (feature_count * 2).div_ceil(100);
    scaled.clamp(30, 100)
}

fn values_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop::option::weighted(0.9, -1.0e6..1.0e6_f64),
        0..400,
    )
}

proptest! {
    #[test]
    fn prop_sample_respects_budget(values in values_strategy()) {
        let summary = summarize(&values);
        prop_assert!(summary.samples.len() <= expected_budget(values.len()));
        prop_assert!(summary.samples.len() <= values.len());
        prop_assert_eq!(summary.feature_count, values.len());
    }

    #[test]
    fn prop_samples_are_unique(values in values_strategy()) {
        let summary = summarize(&values);
        let keys = summary
            .samples
            .iter()
            .map(|s| (s.id.clone(), s.value.map(f64::to_bits)))
            .collect::<HashSet<_>>();
        prop_assert_eq!(keys.len(), summary.samples.len());
    }

    #[test]
    fn prop_views_are_ordered(values in values_strategy()) {
        let summary = summarize(&values);
        prop_assert!(summary.top.len() <= 15);
        prop_assert!(summary.bottom.len() <= 10);
        for pair in summary.top.windows(2) {
            prop_assert!(pair[0].value >= pair[1].value);
        }
        for pair in summary.bottom.windows(2) {
            prop_assert!(pair[0].value <= pair[1].value);
        }
    }

    #[test]
    fn prop_histogram_conserves_counts(values in values_strategy()) {
        let summary = summarize(&values);
        let valued = values.iter().filter(|v| v.is_some()).count();
        match summary.histogram {
            Some(bins) => {
                prop_assert!(!bins.is_empty() && bins.len() <= 10);
                let total = bins.iter().map(|b| b.count).sum::<u64>();
                prop_assert_eq!(total, valued as u64);
            }
            None => prop_assert_eq!(valued, 0),
        }
    }

    #[test]
    fn prop_quantiles_are_ordered(values in values_strategy()) {
        let summary = summarize(&values);
        if let Some(stats) = summary.stats {
            prop_assert!(stats.min <= stats.p25);
            prop_assert!(stats.p25 <= stats.median);
            prop_assert!(stats.median <= stats.p75);
            prop_assert!(stats.p75 <= stats.max);
            prop_assert!(stats.std >= 0.0);
            for sample in &summary.samples {
                let value = sample.value.unwrap();
                prop_assert!(stats.min <= value && value <= stats.max);
            }
        }
    }

    #[test]
    fn prop_summary_is_deterministic(values in values_strategy()) {
        let layers = [build_layer(&values)];
        let a = serde_json::to_string(&Summarizer::default().summarize(&layers)).unwrap();
        let b = serde_json::to_string(&Summarizer::default().summarize(&layers)).unwrap();
        prop_assert_eq!(a, b);
    }
}
