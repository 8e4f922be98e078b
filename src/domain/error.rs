// ============================================================
// Layer 3 — Error Taxonomy
// ============================================================
// Every failure the pipeline can raise below the application
// layer. None of these are recovered locally: a failure aborts
// the current run and surfaces to the console through anyhow.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FinetuneError {
    /// Input file missing, unreadable, or malformed
    #[error("cannot load '{}': {reason}", path.display())]
    DataLoad { path: PathBuf, reason: String },

    /// Tokenizer failure or a sequence the encoder refuses
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Compute target unavailable or the model broke its output contract
    #[error("compute device error: {0}")]
    Device(String),

    /// Evaluation could not produce an accuracy figure
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// Settings that can never produce a valid run
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FinetuneError {
    pub fn data_load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::DataLoad {
            path:   path.into(),
            reason: reason.to_string(),
        }
    }
}
