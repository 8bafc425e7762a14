use std::path::PathBuf;

use anyhow::Context;
use geodigest_summary::{
    config::SummarizerConfig,
    summary::{ClientSummary, FeatureShadow, Summarizer},
};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SummarizeArg {
    /// Path to a JSON file holding an array of layers
    layers_path: PathBuf,
    /// Summarizer configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Summarize layers in parallel
    #[arg(long)]
    parallel: bool,
    /// Also emit per-layer feature shadows
    #[arg(long)]
    shadows: bool,
}

#[derive(Debug, Serialize)]
struct SummaryWithShadows<'a> {
    summary: &'a ClientSummary,
    shadows: Vec<FeatureShadow>,
}

pub(crate) fn run(arg: &SummarizeArg) -> anyhow::Result<()> {
    let SummarizeArg {
        layers_path,
        config,
        output,
        parallel,
        shadows,
    } = arg;

    let config = match config {
        Some(path) => util::read_config_file(path)?,
        None => SummarizerConfig::default(),
    };

    let layers = util::read_layers_file(layers_path)?;
    tracing::info!(
        layers = layers.len(),
        path = %layers_path.display(),
        "layers loaded"
    );

    let summarizer = Summarizer::new(config).context("Invalid summarizer configuration")?;
    let summary = if *parallel {
        summarizer.summarize_parallel(&layers)
    } else {
        summarizer.summarize(&layers)
    }
    .with_context(|| format!("No layers to summarize in {}", layers_path.display()))?;

    if *shadows {
        let shadows = summary.feature_shadows();
        Output::save_json(
            &SummaryWithShadows {
                summary: &summary,
                shadows,
            },
            output.clone(),
        )?;
    } else {
        Output::save_json(&summary, output.clone())?;
    }
    Ok(())
}
