// ============================================================
// Layer 6 — Pretrained Weights
// ============================================================
// Restores pretrained parameters into a freshly initialised
// classifier using Burn's CompactRecorder.
//
// The record must come from a model with the same architecture
// (vocab_size, d_model, num_layers, ...); loading fails if the
// shapes do not match.
//
// Nothing is ever written back: fine-tuned weights live only in
// process memory.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use std::path::Path;

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};

use crate::ml::model::TransformerClassifier;

/// Load `path` (CompactRecorder format, extension optional) into `model`.
pub fn load_pretrained<B: Backend>(
    model:  TransformerClassifier<B>,
    path:   &Path,
    device: &B::Device,
) -> Result<TransformerClassifier<B>> {
    tracing::info!("Loading pretrained weights from '{}'", path.display());

    let record = CompactRecorder::new()
        .load(path.to_path_buf(), device)
        .with_context(|| {
            format!(
                "Cannot load pretrained weights '{}'. Does the architecture match?",
                path.display()
            )
        })?;

    Ok(model.load_record(record))
}
