// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The tokenizer, the model and the optimizer are external
// collaborators. The loops only ever see them through these
// narrow traits, so the same loop code drives the burn model in
// production and small mock models in unit tests.
//
// Mode split:
//   TrainableClassifier — training mode, owns gradients and the
//                         optimizer, the only thing that mutates
//                         weights
//   Classifier          — inference mode, `&self` only, so the
//                         evaluation loop cannot mutate anything
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use crate::domain::batch::EncodedBatch;
use crate::domain::error::FinetuneError;
use crate::domain::report::ProgressReport;

// ─── Tokenize ─────────────────────────────────────────────────────────────────
/// Turns text into subword ids, deterministic for a given vocabulary.
///
/// Implementations:
///   - TextTokenizer → HuggingFace `tokenizers` (file or corpus-built)
pub trait Tokenize: Send + Sync {
    /// Encode one text, including any special start/end markers.
    fn encode(&self, text: &str) -> Result<Vec<u32>, FinetuneError>;

    /// Smallest embedding table size that covers every id produced.
    fn vocab_size(&self) -> usize;
}

// ─── ForwardOutput ────────────────────────────────────────────────────────────
/// Result of one forward pass over an encoded batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardOutput {
    /// Mean loss over the batch
    pub loss: f64,

    /// Unnormalised per-class scores, one row per batch row
    pub scores: Vec<Vec<f32>>,
}

// ─── Classifier ───────────────────────────────────────────────────────────────
/// A sequence classifier in inference mode.
pub trait Classifier {
    fn forward(&self, batch: &EncodedBatch) -> Result<ForwardOutput, FinetuneError>;
}

// ─── TrainableClassifier ──────────────────────────────────────────────────────
/// A sequence classifier in training mode, bundled with its optimizer.
///
/// One training step is always:
///   zero_grad → forward_train → step
pub trait TrainableClassifier {
    /// The model after switching to inference mode
    type Inference: Classifier;

    /// Drop gradients left over from the previous step.
    fn zero_grad(&mut self);

    /// Forward pass that records what `step` needs for backprop.
    fn forward_train(&mut self, batch: &EncodedBatch) -> Result<ForwardOutput, FinetuneError>;

    /// Backward pass, then apply the gradients through the optimizer.
    fn step(&mut self) -> Result<(), FinetuneError>;

    /// Snapshot of the current weights in inference mode.
    fn to_inference(&self) -> Result<Self::Inference, FinetuneError>;
}

// ─── ProgressSink ─────────────────────────────────────────────────────────────
/// Receives the periodic training progress reports.
///
/// Implementations:
///   - ConsoleReporter → stdout + optional metrics CSV
///   - Vec<ProgressReport> → collects reports (tests)
pub trait ProgressSink {
    fn emit(&mut self, report: &ProgressReport);
}

impl ProgressSink for Vec<ProgressReport> {
    fn emit(&mut self, report: &ProgressReport) {
        self.push(report.clone());
    }
}
