// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn tensor and module code lives here, behind the
// domain traits the loops are written against.
//
// What's in this layer:
//
//   model.rs       — Transformer encoder sequence classifier
//                    • Token + positional embeddings
//                    • Padding-masked multi-head self-attention
//                    • Feed-forward networks (GELU)
//                    • Leading-token pooling + linear head
//                    • Cross-entropy loss
//
//   learner.rs     — Burn model + Adam behind the
//                    TrainableClassifier / Classifier traits
//
//   accumulator.rs — Window totals, softmax / argmax rules
//
//   trainer.rs     — The training loop (epochs, steps,
//                    periodic progress reports)
//
//   evaluator.rs   — The evaluation loop (one inference pass,
//                    aggregate accuracy)
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need

/// Transformer encoder classifier architecture
pub mod model;

/// Burn-backed implementations of the model traits
pub mod learner;

/// Metrics accumulator and prediction helpers
pub mod accumulator;

/// Training loop
pub mod trainer;

/// Evaluation loop
pub mod evaluator;

#[cfg(test)]
pub mod testing;
