// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits that define the core concepts
// of a fine-tuning run.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// A labelled review record
pub mod review;

// Raw and token-encoded mini-batches
pub mod batch;

// Progress and evaluation results
pub mod report;

// Error taxonomy shared by every layer below the CLI
pub mod error;

// Collaborator abstractions: tokenizer, model, progress sink
pub mod traits;
