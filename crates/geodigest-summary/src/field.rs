//! Metric field discovery
//!
//! Every layer is summarized over exactly one numeric attribute, the *metric
//! field*. When a layer does not pin the field explicitly, it is discovered by
//! scanning [`METRIC_FIELD_CANDIDATES`] in priority order and falling back to
//! the first finite numeric attribute of the record.

use crate::record::{Attributes, Record, finite_number, parse_finite};

/// A known metric field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricFieldCandidate(pub &'static str);

/// Metric field names in priority order.
pub const METRIC_FIELD_CANDIDATES: &[MetricFieldCandidate] = &[
    // domain scores computed by upstream analysis
    MetricFieldCandidate("strategic_value_score"),
    MetricFieldCandidate("opportunity_score"),
    MetricFieldCandidate("composite_score"),
    MetricFieldCandidate("market_share_score"),
    MetricFieldCandidate("demographic_score"),
    MetricFieldCandidate("competitive_score"),
    MetricFieldCandidate("thematic_value"),
    // generic
    MetricFieldCandidate("value"),
    MetricFieldCandidate("target_value"),
    // legacy exports
    MetricFieldCandidate("score"),
    MetricFieldCandidate("SCORE"),
    MetricFieldCandidate("VALUE"),
    MetricFieldCandidate("expansion_opportunity_score"),
];

/// Picks the metric field of a single record's attributes.
///
/// Returns the first candidate present with a finite numeric value, then
/// falls back to the first attribute (in mapping order) holding a finite JSON
/// number. Returns `None` if the record has no numeric attribute at all.
///
/// # Examples
///
/// ```
/// use geodigest_summary::field::select_metric_field;
/// use serde_json::{Map, Value, json};
///
/// let attrs = json!({ "population": 1200, "value": "n/a", "target_value": 8.5 });
/// let attrs: Map<String, Value> = serde_json::from_value(attrs).unwrap();
/// assert_eq!(select_metric_field(&attrs).as_deref(), Some("target_value"));
/// ```
#[must_use]
pub fn select_metric_field(attributes: &Attributes) -> Option<String> {
    METRIC_FIELD_CANDIDATES
        .iter()
        .find(|c| attributes.get(c.0).and_then(parse_finite).is_some())
        .map(|c| c.0.to_owned())
        .or_else(|| {
            attributes
                .iter()
                .find(|(_, value)| finite_number(value).is_some())
                .map(|(name, _)| name.clone())
        })
}

/// Chooses the metric field for a whole layer.
#[derive(Debug, Clone, Copy)]
pub struct FieldSelector {
    probe_depth: usize,
}

impl FieldSelector {
    /// Creates a selector inspecting at most `probe_depth` leading records.
    #[must_use]
    pub fn new(probe_depth: usize) -> Self {
        Self {
            probe_depth: probe_depth.max(1),
        }
    }

    /// Returns the pinned field if given, otherwise the field discovered from
    /// the first records of the layer.
    #[must_use]
    pub fn select(&self, pinned: Option<&str>, records: &[Record]) -> Option<String> {
        if let Some(field) = pinned.filter(|f| !f.trim().is_empty()) {
            return Some(field.to_owned());
        }
        records
            .iter()
            .take(self.probe_depth)
            .find_map(|record| select_metric_field(record.attributes()))
    }
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self::new(1)
    }
}
