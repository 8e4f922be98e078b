// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong to any one business
// layer:
//
//   tokenizer_store.rs — Loads a pretrained tokenizer.json or
//                        builds a word-level vocabulary from
//                        the training corpus
//
//   weights.rs         — Restores pretrained model weights with
//                        Burn's CompactRecorder
//
//   metrics.rs         — Console progress lines and the
//                        optional metrics CSV
//
//   config_store.rs    — Run configuration as JSON
//
//   device.rs          — cpu / accelerator backend selection
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Tokenizer loading and corpus vocabulary building
pub mod tokenizer_store;

/// Pretrained weight loading
pub mod weights;

/// Progress reporting (console + CSV)
pub mod metrics;

/// Run configuration persistence
pub mod config_store;

/// Compute target and backend aliases
pub mod device;
