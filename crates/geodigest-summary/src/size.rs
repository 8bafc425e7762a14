//! Best-effort estimate of a summary's serialized size
//!
//! The estimate is the byte length of the compact JSON encoding. It is a
//! diagnostic only: callers treat any error as "no estimate available".

use std::io;

use serde::Serialize;

use crate::summary::{ClientSummary, LayerSummary};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SizeEstimationError {
    #[display("failed to encode summary as JSON: {source}")]
    Encode { source: serde_json::Error },
}

/// Returns the compact JSON byte length of `summary`.
///
/// The whole summary is encoded first; if that fails, the envelope and each
/// layer are streamed through a byte counter separately and the lengths are
/// added up. Both strategies produce the same number when they succeed.
pub fn estimate_serialized_size(summary: &ClientSummary) -> Result<usize, SizeEstimationError> {
    encode_whole(summary)
        .or_else(|err| {
            tracing::debug!(error = %err, "whole-summary encoding failed, counting per layer");
            count_per_layer(summary)
        })
        .map_err(|source| SizeEstimationError::Encode { source })
}

fn encode_whole(summary: &ClientSummary) -> Result<usize, serde_json::Error> {
    serde_json::to_vec(summary).map(|bytes| bytes.len())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a> {
    total_layers: usize,
    total_features: usize,
    layers: &'a [LayerSummary],
    #[serde(skip_serializing_if = "Option::is_none")]
    approx_bytes: Option<usize>,
}

fn count_per_layer(summary: &ClientSummary) -> Result<usize, serde_json::Error> {
    let envelope = Envelope {
        total_layers: summary.total_layers,
        total_features: summary.total_features,
        layers: &[],
        approx_bytes: summary.approx_bytes,
    };
    let mut total = count_bytes(&envelope)?;
    for layer in &summary.layers {
        total += count_bytes(layer)?;
    }
    // separators between array elements
    total += summary.layers.len().saturating_sub(1);
    Ok(total)
}

fn count_bytes<T>(value: &T) -> Result<usize, serde_json::Error>
where
    T: Serialize,
{
    let mut counter = ByteCounter::default();
    serde_json::to_writer(&mut counter, value)?;
    Ok(counter.0)
}

#[derive(Debug, Default)]
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
