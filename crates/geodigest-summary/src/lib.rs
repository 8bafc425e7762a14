//! Compact, representative summaries of geospatial feature layers
//!
//! A consumer with a tight payload budget (such as a language model prompt)
//! cannot receive thousands of raw records per layer. This crate reduces each
//! layer to numeric statistics, a histogram and a small stratified sample of
//! projected records, and packages the result as a [`summary::ClientSummary`].
//!
//! # Overview
//!
//! 1. **Record Access** ([`record::Record`]): Flatten wrapped attribute maps
//! 2. **Field Selection** ([`field::FieldSelector`]): Pin or discover the metric field
//! 3. **Ranking** ([`rank::rank_records`]): Order records by metric value with id/name resolution
//! 4. **Statistics** (`geodigest-stats`): Descriptive statistics and a 10-bin histogram
//! 5. **Sampling** ([`sampler::StratifiedSampler`]): Bounded, deduplicated, multi-tier sample
//! 6. **Projection** ([`projection::RecordProjector`]): Strip system, nested and placeholder fields
//! 7. **Assembly** ([`summary::Summarizer`]): Per-layer summaries, totals and size estimate
//!
//! # Example
//!
//! ```
//! use geodigest_summary::summary::{LayerInput, Summarizer};
//! use serde_json::json;
//!
//! let layers: Vec<LayerInput> = serde_json::from_value(json!([{
//!     "layerId": "stores",
//!     "layerName": "Store Opportunity",
//!     "features": [
//!         { "properties": { "OBJECTID": 1, "NAME": "Downtown", "opportunity_score": 82.5 } },
//!         { "properties": { "OBJECTID": 2, "NAME": "Airport", "opportunity_score": 41.0 } }
//!     ]
//! }]))
//! .unwrap();
//!
//! let summary = Summarizer::default().summarize(&layers).unwrap();
//! let layer = &summary.layers[0];
//! assert_eq!(layer.numeric_field.as_deref(), Some("opportunity_score"));
//! assert_eq!(layer.samples[0].name, "Downtown");
//! assert!(summary.approx_bytes.is_some());
//! ```
//!
//! # Modules
//!
//! - [`config`]: Summarizer configuration and validation
//! - [`record`]: Input records and numeric value parsing
//! - [`field`]: Metric field selection
//! - [`rank`]: Record ranking and identity resolution
//! - [`sampler`]: Stratified sampling
//! - [`projection`]: Record projection rules
//! - [`size`]: Serialized size estimation
//! - [`summary`]: Layer and client summaries

pub mod config;
pub mod field;
pub mod projection;
pub mod rank;
pub mod record;
pub mod sampler;
pub mod size;
pub mod summary;
