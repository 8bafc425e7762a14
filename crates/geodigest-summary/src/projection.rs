//! Record projection
//!
//! Sampled records are shipped to a consumer with a tight payload budget, so
//! each one is reduced to a minimal set of scalar attributes. The reduction is
//! driven by [`ProjectionRules`], a named and versioned set of field lists that
//! can be loaded from configuration and tested on its own.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Attributes;

/// System and audit fields that never carry information for the consumer.
pub const SYSTEM_FIELDS_V1: &[&str] = &[
    "CreationDate",
    "Creator",
    "EditDate",
    "Editor",
    "created_date",
    "created_user",
    "last_edited_date",
    "last_edited_user",
    "GlobalID",
    "Shape__Area",
    "Shape__Length",
    "Shape_Area",
    "Shape_Length",
    "Shape.STArea()",
    "Shape.STLength()",
    "hierarchy_level",
    "parent_id",
    "symbol",
    "symbol_id",
    "site_metadata",
    "site_meta",
];

/// Fields where zero means "not populated" rather than a measurement.
pub const ZERO_MEANS_MISSING_FIELDS_V1: &[&str] = &[
    "thematic_value",
    "target_value",
    "TOTPOP_CY",
    "TOTHH_CY",
    "MEDHINC_CY",
    "AVGHINC_CY",
    "DIVINDX_CY",
    "market_share",
];

/// Placeholder strings emitted by upstream exports for missing text.
pub const PLACEHOLDER_VALUES_V1: &[&str] = &["Unknown"];

/// Display fields where a placeholder is still a meaningful label.
pub const PLACEHOLDER_ALLOWED_FIELDS_V1: &[&str] = &[
    "DESCRIPTION",
    "description",
    "NAME",
    "name",
    "area_name",
    "display_name",
];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|&name| name.to_owned()).collect()
}

/// Field lists used by [`RecordProjector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionRules {
    /// Version tag of the rule set, reported in logs.
    pub version: u32,
    /// Fields dropped unconditionally (matched case-insensitively).
    pub system_fields: Vec<String>,
    /// Fields dropped when their value is exactly zero.
    pub zero_means_missing_fields: Vec<String>,
    /// String values treated as placeholders.
    pub placeholder_values: Vec<String>,
    /// Fields whose placeholder values are kept.
    pub placeholder_allowed_fields: Vec<String>,
    /// Maximum number of attributes kept per record, unlimited when `None`.
    pub max_fields: Option<usize>,
}

impl ProjectionRules {
    /// The first published rule set.
    #[must_use]
    pub fn v1() -> Self {
        Self {
            version: 1,
            system_fields: owned(SYSTEM_FIELDS_V1),
            zero_means_missing_fields: owned(ZERO_MEANS_MISSING_FIELDS_V1),
            placeholder_values: owned(PLACEHOLDER_VALUES_V1),
            placeholder_allowed_fields: owned(PLACEHOLDER_ALLOWED_FIELDS_V1),
            max_fields: None,
        }
    }
}

impl Default for ProjectionRules {
    fn default() -> Self {
        Self::v1()
    }
}

/// Why an attribute was left out of a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exclusion {
    System,
    Nested,
    Null,
    Placeholder,
    ZeroMeansMissing,
}

/// Reduces raw records to their safe, scalar attributes.
#[derive(Debug, Clone)]
pub struct RecordProjector {
    system_fields: HashSet<String>,
    zero_means_missing_fields: HashSet<String>,
    placeholder_values: HashSet<String>,
    placeholder_allowed_fields: HashSet<String>,
    max_fields: Option<usize>,
}

impl RecordProjector {
    #[must_use]
    pub fn new(rules: &ProjectionRules) -> Self {
        Self {
            system_fields: rules
                .system_fields
                .iter()
                .map(|name| name.to_ascii_lowercase())
                .collect(),
            zero_means_missing_fields: rules.zero_means_missing_fields.iter().cloned().collect(),
            placeholder_values: rules.placeholder_values.iter().cloned().collect(),
            placeholder_allowed_fields: rules.placeholder_allowed_fields.iter().cloned().collect(),
            max_fields: rules.max_fields,
        }
    }

    /// Returns the attributes that survive projection, in their original order.
    ///
    /// # Examples
    ///
    /// ```
    /// use geodigest_summary::projection::{ProjectionRules, RecordProjector};
    /// use serde_json::{Map, Value, json};
    ///
    /// let attrs: Map<String, Value> = serde_json::from_value(json!({
    ///     "NAME": "Unknown",
    ///     "county": "Unknown",
    ///     "EditDate": 1700000000000_i64,
    ///     "geometry_parts": [1, 2],
    ///     "thematic_value": 0,
    ///     "households": 0,
    /// }))
    /// .unwrap();
    ///
    /// let projected = RecordProjector::new(&ProjectionRules::v1()).project(&attrs);
    /// let keys = projected.keys().map(String::as_str).collect::<Vec<_>>();
    /// assert_eq!(keys, ["NAME", "households"]);
    /// ```
    #[must_use]
    pub fn project(&self, attributes: &Attributes) -> Attributes {
        let kept = attributes
            .iter()
            .filter(|(name, value)| match self.exclusion(name, value) {
                Some(reason) => {
                    tracing::trace!(field = %name, ?reason, "attribute excluded");
                    false
                }
                None => true,
            })
            .map(|(name, value)| (name.clone(), value.clone()));
        match self.max_fields {
            Some(max) => kept.take(max).collect(),
            None => kept.collect(),
        }
    }

    fn exclusion(&self, name: &str, value: &Value) -> Option<Exclusion> {
        if self.system_fields.contains(&name.to_ascii_lowercase()) {
            return Some(Exclusion::System);
        }
        match value {
            Value::Object(_) | Value::Array(_) => Some(Exclusion::Nested),
            Value::Null => Some(Exclusion::Null),
            Value::String(s)
                if self.placeholder_values.contains(s)
                    && !self.placeholder_allowed_fields.contains(name) =>
            {
                Some(Exclusion::Placeholder)
            }
            Value::Number(n)
                if n.as_f64() == Some(0.0) && self.zero_means_missing_fields.contains(name) =>
            {
                Some(Exclusion::ZeroMeansMissing)
            }
            _ => None,
        }
    }
}

impl Default for RecordProjector {
    fn default() -> Self {
        Self::new(&ProjectionRules::default())
    }
}
