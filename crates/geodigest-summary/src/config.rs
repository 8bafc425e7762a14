//! Summarizer configuration
//!
//! All fields have defaults reproducing the reference behavior, so an empty
//! JSON object (`{}`) is a valid configuration:
//!
//! ```json
//! {
//!   "histogram_bins": 10,
//!   "schema_probe_depth": 1,
//!   "sampler": { "outlier_sigma": 2.0 },
//!   "projection": { "max_fields": null }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::{projection::ProjectionRules, sampler::SamplerConfig};

/// Number of equal-width histogram bins per layer.
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Number of equal-width histogram bins
    pub histogram_bins: usize,
    /// Leading records inspected when discovering the metric field
    pub schema_probe_depth: usize,
    pub sampler: SamplerConfig,
    pub projection: ProjectionRules,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            schema_probe_depth: 1,
            sampler: SamplerConfig::default(),
            projection: ProjectionRules::default(),
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("histogram_bins must be at least 1")]
    NoHistogramBins,
    #[display("schema_probe_depth must be at least 1")]
    NoSchemaProbe,
    #[display("{name}: floor {floor} exceeds cap {cap}")]
    InvertedBudget {
        name: &'static str,
        floor: usize,
        cap: usize,
    },
    #[display("{name}: fraction {fraction} must be finite and non-negative")]
    InvalidFraction { name: &'static str, fraction: f64 },
    #[display("sampler.outlier_sigma must be finite and positive, got {sigma}")]
    InvalidOutlierSigma { sigma: f64 },
}

impl SummarizerConfig {
    /// Checks the configuration for values that would make summaries meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.histogram_bins == 0 {
            return Err(ConfigError::NoHistogramBins);
        }
        if self.schema_probe_depth == 0 {
            return Err(ConfigError::NoSchemaProbe);
        }
        let budgets = [
            ("sampler.sample_budget", &self.sampler.sample_budget),
            ("sampler.top_budget", &self.sampler.top_budget),
            ("sampler.bottom_budget", &self.sampler.bottom_budget),
        ];
        for (name, budget) in budgets {
            if budget.floor > budget.cap {
                return Err(ConfigError::InvertedBudget {
                    name,
                    floor: budget.floor,
                    cap: budget.cap,
                });
            }
            if !(budget.fraction.is_finite() && budget.fraction >= 0.0) {
                return Err(ConfigError::InvalidFraction {
                    name,
                    fraction: budget.fraction,
                });
            }
        }
        let sigma = self.sampler.outlier_sigma;
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(ConfigError::InvalidOutlierSigma { sigma });
        }
        Ok(())
    }
}
