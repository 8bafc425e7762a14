//! Layer and client summaries
//!
//! [`Summarizer`] runs the whole pipeline for every input layer and packages
//! the results into a [`ClientSummary`]:
//!
//! ```text
//! LayerInput
//!     ↓
//! Select metric field (FieldSelector)
//!     ↓
//! Rank records by value (rank_records)
//!     ↓
//! Statistics + histogram over all values (geodigest-stats)
//!     ↓
//! Stratified sample of ranked records (StratifiedSampler)
//!     ↓
//! Project sampled records (RecordProjector)
//!     ↓
//! LayerSummary ──→ ClientSummary (+ approxBytes)
//! ```
//!
//! Layers are independent of each other; [`Summarizer::summarize_parallel`]
//! processes them on the rayon pool and yields the same output as
//! [`Summarizer::summarize`].

use geodigest_stats::{comprehensive::ComprehensiveStats, descriptive::DescriptiveStats, histogram};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::{ConfigError, SummarizerConfig},
    field::FieldSelector,
    projection::RecordProjector,
    rank::{RankedItem, rank_records},
    record::{Attributes, Record},
    sampler::{Sample, SampleType, StratifiedSampler},
    size::estimate_serialized_size,
};

/// Attribute names owned by [`SampledRecord`] itself.
const RESERVED_SAMPLE_KEYS: &[&str] = &["id", "name", "sampleType", "value"];

/// One input layer: records sharing a schema and a metric field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInput {
    pub layer_id: String,
    pub layer_name: String,
    /// Pins the metric field instead of discovering it.
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub features: Vec<Record>,
}

impl LayerInput {
    #[must_use]
    pub fn new(
        layer_id: impl Into<String>,
        layer_name: impl Into<String>,
        features: Vec<Record>,
    ) -> Self {
        Self {
            layer_id: layer_id.into(),
            layer_name: layer_name.into(),
            field: None,
            features,
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Numeric summary of a layer's metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub std: f64,
}

impl From<&DescriptiveStats> for Stats {
    fn from(stats: &DescriptiveStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            median: stats.median,
            p25: stats.p25,
            p75: stats.p75,
            std: stats.std_dev,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

impl From<&histogram::HistogramBin> for HistogramBin {
    fn from(bin: &histogram::HistogramBin) -> Self {
        Self {
            start: bin.start,
            end: bin.end,
            count: bin.count,
        }
    }
}

/// A sampled record: its ranking data, the tier that selected it and its
/// projected attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampledRecord {
    pub id: String,
    pub name: String,
    pub sample_type: SampleType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(flatten)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub layer_id: String,
    pub layer_name: String,
    /// Pinned or discovered metric field; empty when there is none.
    pub field: String,
    pub feature_count: usize,
    /// Metric field actually summarized; absent for non-quantitative layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub histogram: Option<Vec<HistogramBin>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top: Vec<RankedItem>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bottom: Vec<RankedItem>,
    pub samples: Vec<SampledRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub total_layers: usize,
    pub total_features: usize,
    pub layers: Vec<LayerSummary>,
    /// Compact JSON size of the summary, when it could be computed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approx_bytes: Option<usize>,
}

/// Layer metadata handed to the payload assembler alongside the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureShadow {
    pub layer_id: String,
    pub layer_name: String,
    pub feature_count: usize,
    pub field: String,
}

impl ClientSummary {
    #[must_use]
    pub fn feature_shadows(&self) -> Vec<FeatureShadow> {
        self.layers
            .iter()
            .map(|layer| FeatureShadow {
                layer_id: layer.layer_id.clone(),
                layer_name: layer.layer_name.clone(),
                feature_count: layer.feature_count,
                field: layer.field.clone(),
            })
            .collect()
    }
}

/// Turns feature layers into a [`ClientSummary`].
#[derive(Debug, Clone)]
pub struct Summarizer {
    config: SummarizerConfig,
    selector: FieldSelector,
    sampler: StratifiedSampler,
    projector: RecordProjector,
}

impl Summarizer {
    /// Creates a summarizer after validating `config`.
    pub fn new(config: SummarizerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: SummarizerConfig) -> Self {
        Self {
            selector: FieldSelector::new(config.schema_probe_depth),
            sampler: StratifiedSampler::new(config.sampler.clone()),
            projector: RecordProjector::new(&config.projection),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarizes `layers` in order.
    ///
    /// Returns `None` when there is nothing to summarize.
    #[must_use]
    pub fn summarize(&self, layers: &[LayerInput]) -> Option<ClientSummary> {
        if layers.is_empty() {
            return None;
        }
        let summaries = layers
            .iter()
            .map(|layer| self.summarize_layer(layer))
            .collect();
        Some(self.assemble(summaries))
    }

    /// Summarizes `layers` with one rayon task per layer.
    ///
    /// The output is identical to [`Summarizer::summarize`].
    #[must_use]
    pub fn summarize_parallel(&self, layers: &[LayerInput]) -> Option<ClientSummary> {
        if layers.is_empty() {
            return None;
        }
        let summaries = layers
            .par_iter()
            .map(|layer| self.summarize_layer(layer))
            .collect();
        Some(self.assemble(summaries))
    }

    /// Summarizes untyped JSON input.
    ///
    /// Returns `None` when `input` is not an array or holds no valid layer.
    /// Array elements that are not valid layers are skipped.
    #[must_use]
    pub fn summarize_value(&self, input: &Value) -> Option<ClientSummary> {
        let Value::Array(items) = input else {
            tracing::debug!("summary input is not a list");
            return None;
        };
        let layers = items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| match LayerInput::deserialize(item) {
                Ok(layer) => Some(layer),
                Err(err) => {
                    tracing::warn!(index = idx, error = %err, "skipping malformed layer");
                    None
                }
            })
            .collect::<Vec<_>>();
        self.summarize(&layers)
    }

    /// Summarizes a single layer.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(layer_id = %layer.layer_id, features = layer.features.len())
    )]
    #[must_use]
    pub fn summarize_layer(&self, layer: &LayerInput) -> LayerSummary {
        let features = &layer.features;
        let feature_count = features.len();
        let pinned = layer.field.as_deref().filter(|f| !f.trim().is_empty());
        let selected = self.selector.select(pinned, features);

        let (numeric_field, ranked) = match selected.as_deref() {
            Some(field) => {
                let ranked = rank_records(features, Some(field));
                if ranked.is_empty() {
                    // The field holds no finite value anywhere in the layer
                    (None, rank_records(features, None))
                } else {
                    (Some(field.to_owned()), ranked)
                }
            }
            None => (None, rank_records(features, None)),
        };

        let mut values = ranked.iter().filter_map(|item| item.value).collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        let comprehensive = ComprehensiveStats::from_sorted(&values, self.config.histogram_bins);

        let sample_set = self.sampler.sample(&ranked, feature_count);
        let samples = sample_set
            .samples
            .iter()
            .map(|sample| self.sampled_record(features, sample))
            .collect::<Vec<_>>();
        let (top, bottom) = if numeric_field.is_some() {
            (sample_set.top, sample_set.bottom)
        } else {
            (vec![], vec![])
        };

        tracing::debug!(
            numeric_field = numeric_field.as_deref(),
            values = values.len(),
            samples = samples.len(),
            "layer summarized"
        );

        LayerSummary {
            layer_id: layer.layer_id.clone(),
            layer_name: layer.layer_name.clone(),
            field: selected.unwrap_or_default(),
            feature_count,
            numeric_field,
            stats: comprehensive.as_ref().map(|c| Stats::from(&c.stats)),
            histogram: comprehensive
                .as_ref()
                .map(|c| c.histogram.bins.iter().map(HistogramBin::from).collect()),
            top,
            bottom,
            samples,
        }
    }

    fn sampled_record(&self, features: &[Record], sample: &Sample) -> SampledRecord {
        let mut attributes = features
            .get(sample.item.source_index)
            .map(|record| self.projector.project(record.attributes()))
            .unwrap_or_default();
        attributes.retain(|key, _| !RESERVED_SAMPLE_KEYS.contains(&key.as_str()));
        SampledRecord {
            id: sample.item.id.clone(),
            name: sample.item.name.clone(),
            sample_type: sample.sample_type,
            value: sample.item.value,
            attributes,
        }
    }

    fn assemble(&self, layers: Vec<LayerSummary>) -> ClientSummary {
        let mut summary = ClientSummary {
            total_layers: layers.len(),
            total_features: layers.iter().map(|layer| layer.feature_count).sum(),
            layers,
            approx_bytes: None,
        };
        summary.approx_bytes = match estimate_serialized_size(&summary) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(error = %err, "could not estimate summary size");
                None
            }
        };
        tracing::info!(
            layers = summary.total_layers,
            features = summary.total_features,
            approx_bytes = summary.approx_bytes,
            projection_rules = self.config.projection.version,
            "feature summary assembled"
        );
        summary
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::from_valid_config(SummarizerConfig::default())
    }
}
