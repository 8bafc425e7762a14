//! Ranked views of a layer's records
//!
//! Before sampling, every record of a layer is reduced to a [`RankedItem`]:
//! its metric value plus an identifier and a display name taken from fixed
//! priority lists of attribute names. Ranked items are ordered by value in
//! descending order (highest value first), which is the order the stratified
//! sampler expects.

use serde::Serialize;
use serde_json::Value;

use crate::record::Record;

/// Attribute names probed, in order, for a record identifier.
pub const ID_FIELD_CANDIDATES: &[&str] = &[
    "OBJECTID", "ObjectID", "objectid", "FID", "ID", "id", "GEOID", "ZIP", "ZIP_CODE",
    "area_id",
];

/// Attribute names probed, in order, for a human-readable record name.
pub const NAME_FIELD_CANDIDATES: &[&str] = &[
    "DESCRIPTION",
    "description",
    "NAME",
    "name",
    "area_name",
    "display_name",
    "LABEL",
];

/// A record reduced to what ranking and sampling need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedItem {
    /// Stable identifier of the record.
    pub id: String,
    /// Human-readable name of the record.
    pub name: String,
    /// Metric value, absent for non-quantitative layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Position of the source record in the layer input.
    #[serde(skip)]
    pub source_index: usize,
}

impl RankedItem {
    /// Builds a ranked item from the record at `source_index`.
    ///
    /// Records without any identifier attribute are identified by their
    /// position in the layer; records without a name fall back to the id.
    #[must_use]
    pub fn from_record(record: &Record, source_index: usize, field: Option<&str>) -> Self {
        let id = first_text(record, ID_FIELD_CANDIDATES)
            .unwrap_or_else(|| format!("feature-{source_index}"));
        let name = first_text(record, NAME_FIELD_CANDIDATES).unwrap_or_else(|| id.clone());
        let value = field.and_then(|field| record.metric_value(field));
        Self {
            id,
            name,
            value,
            source_index,
        }
    }
}

fn first_text(record: &Record, candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|&name| match record.get(name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Ranks the records of a layer by their metric value.
///
/// With a metric field, only records holding a finite value are ranked, in
/// descending order of value; ties keep their input order. Without a metric
/// field every record is ranked, in input order, with no value.
///
/// # Examples
///
/// ```
/// use geodigest_summary::{rank::rank_records, record::Record};
/// use serde_json::json;
///
/// let records = [
///     Record::from(json!({ "ID": "a", "value": 1 })),
///     Record::from(json!({ "ID": "b", "value": 5 })),
///     Record::from(json!({ "ID": "c" })),
/// ];
/// let ranked = rank_records(&records, Some("value"));
/// let ids = ranked.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
/// assert_eq!(ids, ["b", "a"]);
/// ```
#[must_use]
pub fn rank_records(records: &[Record], field: Option<&str>) -> Vec<RankedItem> {
    let mut items = records
        .iter()
        .enumerate()
        .map(|(idx, record)| RankedItem::from_record(record, idx, field))
        .collect::<Vec<_>>();

    if field.is_some() {
        items.retain(|item| item.value.is_some());
        // sort_by is stable: equal values keep their input order
        items.sort_by(|a, b| match (a.value, b.value) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            _ => std::cmp::Ordering::Equal,
        });
    }
    items
}
