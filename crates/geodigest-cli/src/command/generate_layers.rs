use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, TimeZone as _, Utc};
use rand::{Rng as _, SeedableRng as _};
use rand_distr::{Distribution as _, Normal};
use rand_pcg::Pcg32;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::util::Output;

/// Metric field, layer title, mean and standard deviation of each generated layer kind.
const LAYER_KINDS: &[(&str, &str, f64, f64)] = &[
    ("opportunity_score", "Store Opportunity", 55.0, 12.0),
    ("thematic_value", "Median Household Income", 68_000.0, 15_000.0),
    ("market_share_score", "Market Share", 0.18, 0.05),
    ("demographic_score", "Demographic Fit", 40.0, 9.0),
];
const COUNTIES: &[&str] = &["Ingham", "Eaton", "Clinton", "Unknown"];

const OUTLIER_PROBABILITY: f64 = 0.02;
const OUTLIER_SCALE: f64 = 6.0;
const MISSING_POPULATION_PROBABILITY: f64 = 0.1;
const SECONDS_PER_YEAR: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateLayersArg {
    /// Number of layers to generate
    #[arg(long, default_value_t = 3)]
    layers: usize,
    /// Number of features per layer
    #[arg(long, default_value_t = 1000)]
    features: usize,
    /// Random seed
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedLayer {
    layer_id: String,
    layer_name: String,
    features: Vec<Value>,
}

pub(crate) fn run(arg: &GenerateLayersArg) -> anyhow::Result<()> {
    let GenerateLayersArg {
        layers,
        features,
        seed,
        output,
    } = arg;

    let generated = generate_layers(*layers, *features, *seed)?;
    tracing::info!(
        layers = generated.len(),
        features_per_layer = features,
        seed,
        "synthetic layers generated"
    );
    Output::save_json(&generated, output.clone())?;
    Ok(())
}

fn generate_layers(
    num_layers: usize,
    num_features: usize,
    seed: u64,
) -> anyhow::Result<Vec<GeneratedLayer>> {
    let mut rng = Pcg32::seed_from_u64(seed);
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .context("Invalid base timestamp")?;

    (0..num_layers)
        .map(|k| {
            let (field, title, mean, std_dev) = LAYER_KINDS[k % LAYER_KINDS.len()];
            let normal = Normal::new(mean, std_dev)
                .map_err(|err| anyhow::anyhow!("Invalid distribution for {field}: {err}"))?;
            let features = (0..num_features)
                .map(|index| generate_feature(&mut rng, &normal, field, base, index))
                .collect();
            Ok(GeneratedLayer {
                layer_id: format!("layer-{k}"),
                layer_name: format!("{title} {}", k + 1),
                features,
            })
        })
        .collect()
}

fn generate_feature(
    rng: &mut Pcg32,
    normal: &Normal<f64>,
    field: &str,
    base: DateTime<Utc>,
    index: usize,
) -> Value {
    let mean = normal.mean();
    let mut value = normal.sample(rng);
    if rng.random_bool(OUTLIER_PROBABILITY) {
        value = mean + (value - mean) * OUTLIER_SCALE;
    }
    let population = if rng.random_bool(MISSING_POPULATION_PROBABILITY) {
        0
    } else {
        rng.random_range(500..25_000)
    };
    let created = base + TimeDelta::seconds(rng.random_range(0..SECONDS_PER_YEAR));
    let edited = created + TimeDelta::seconds(rng.random_range(0..SECONDS_PER_YEAR));

    let mut properties = Map::new();
    properties.insert("OBJECTID".into(), json!(index + 1));
    properties.insert("NAME".into(), json!(format!("Area {}", index + 1)));
    properties.insert(field.into(), json!(round_to_cents(value)));
    properties.insert("TOTPOP_CY".into(), json!(population));
    properties.insert(
        "county".into(),
        json!(COUNTIES[rng.random_range(0..COUNTIES.len())]),
    );
    properties.insert("CreationDate".into(), json!(created.to_rfc3339()));
    properties.insert("EditDate".into(), json!(edited.timestamp_millis()));
    properties.insert(
        "Shape__Area".into(),
        json!(round_to_cents(rng.random_range(1.0e5..5.0e6))),
    );

    json!({
        "type": "Feature",
        "properties": properties,
        "geometry": null
    })
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use geodigest_summary::summary::{LayerInput, Summarizer};

    use super::*;

    #[test]
    fn test_same_seed_is_deterministic() {
        let a = generate_layers(2, 50, 42).unwrap();
        let b = generate_layers(2, 50, 42).unwrap();
        assert_eq!(a, b);
        let c = generate_layers(2, 50, 43).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_layer_shape() {
        let layers = generate_layers(5, 10, 0).unwrap();
        assert_eq!(layers.len(), 5);
        assert_eq!(layers[0].layer_id, "layer-0");
        assert_eq!(layers[4].layer_name, "Store Opportunity 5");
        for layer in &layers {
            assert_eq!(layer.features.len(), 10);
        }
        let properties = &layers[1].features[0]["properties"];
        assert_eq!(properties["OBJECTID"], json!(1));
        assert!(properties["thematic_value"].is_f64());
    }

    #[test]
    fn test_generated_layers_summarize() {
        let generated = generate_layers(4, 300, 7).unwrap();
        let layers: Vec<LayerInput> =
            serde_json::from_value(serde_json::to_value(&generated).unwrap()).unwrap();
        let summary = Summarizer::default().summarize(&layers).unwrap();

        assert_eq!(summary.total_layers, 4);
        assert_eq!(summary.total_features, 1200);
        for (layer, (field, ..)) in summary.layers.iter().zip(LAYER_KINDS) {
            assert_eq!(layer.numeric_field.as_deref(), Some(*field));
            assert_eq!(layer.samples.len(), 30);
            for sample in &layer.samples {
                assert!(!sample.attributes.contains_key("CreationDate"));
                assert!(!sample.attributes.contains_key("EditDate"));
                assert!(!sample.attributes.contains_key("Shape__Area"));
                assert!(sample.attributes.contains_key("OBJECTID"));
            }
        }
    }
}
