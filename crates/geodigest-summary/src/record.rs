//! Record normalization
//!
//! Input records arrive in two shapes: flat attribute mappings, and
//! GeoJSON-style features exposing their attributes under a `properties` key.
//! [`Record`] unwraps both into a single insertion-ordered [`Attributes`] map
//! before any field inspection happens, so the rest of the engine never has
//! to care which shape it was given.
//!
//! ```
//! use geodigest_summary::record::Record;
//! use serde_json::json;
//!
//! let flat = Record::from(json!({ "ID": "a", "score": 4.5 }));
//! let wrapped = Record::from(json!({
//!     "type": "Feature",
//!     "geometry": null,
//!     "properties": { "ID": "a", "score": 4.5 }
//! }));
//! assert_eq!(flat, wrapped);
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

/// Insertion-ordered attribute mapping of a single record.
pub type Attributes = Map<String, Value>;

const PROPERTIES_KEY: &str = "properties";

/// A single input record with its attributes normalized to one flat map.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Record {
    attributes: Attributes,
}

impl Record {
    /// Creates a record from an already-flat attribute map.
    #[must_use]
    pub fn new(attributes: Attributes) -> Self {
        Self { attributes }
    }

    /// The record's attributes.
    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Looks up a single attribute by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Reads `field` as a finite number.
    ///
    /// JSON numbers and strings holding a finite decimal number are accepted.
    #[must_use]
    pub fn metric_value(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(parse_finite)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => {
                if matches!(map.get(PROPERTIES_KEY), Some(Value::Object(_)))
                    && let Some(Value::Object(properties)) = map.remove(PROPERTIES_KEY)
                {
                    return Self::new(properties);
                }
                Self::new(map)
            }
            // Scalars and arrays carry no named attributes
            _ => Self::default(),
        }
    }
}

impl From<Attributes> for Record {
    fn from(attributes: Attributes) -> Self {
        Self::new(attributes)
    }
}

/// Returns the value as `f64` if it is a finite JSON number.
#[must_use]
pub fn finite_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}

/// Returns the value as `f64` if it is a finite JSON number or a string
/// holding one.
#[must_use]
pub fn parse_finite(value: &Value) -> Option<f64> {
    match value {
        Value::Number(_) => finite_number(value),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}
