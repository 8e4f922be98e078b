// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the delimited review files to encoded,
// fixed-width token batches.
//
// The pipeline flows in this order:
//
//   ratings_*.txt
//       │
//       ▼
//   RecordStore       → parses rows, drops incomplete ones,
//       │               optional seeded subsample
//       ▼
//   ReviewDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   BatchSource       → Burn DataLoader over ReviewBatcher,
//       │               one fresh (shuffled) pass per epoch
//       ▼
//   BatchEncoder      → token ids, truncated and right-padded
//       │
//       ▼
//   training / evaluation loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads delimited review files using the csv crate
pub mod loader;

/// Implements Burn's Dataset trait for reviews
pub mod dataset;

/// Implements Burn's Batcher trait and wraps the DataLoader
pub mod batcher;

/// Tokenizes, truncates and pads text batches
pub mod encoder;
