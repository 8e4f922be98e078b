// ============================================================
// Layer 4 — Batch Source
// ============================================================
// Groups reviews into fixed-size TextBatches using Burn's
// Dataset / Batcher / DataLoader machinery.
//
// How it fits together:
//   ReviewDataset  → Burn Dataset, random access by index
//   ReviewBatcher  → Burn Batcher, Vec<Review> → TextBatch
//   BatchSource    → owns the built DataLoader; every call to
//                    iterate() is one fresh epoch
//
// Worker lanes:
//   num_workers > 0 hands batching to Burn's multi-threaded
//   loader, which prefetches the next batches while the loop
//   consumes the current one. num_workers = 0 is synchronous.
//
// Shuffling:
//   With a shuffle seed the loader draws a new permutation for
//   each epoch from an RNG seeded once at build time, so a run
//   is reproducible but consecutive epochs differ.
//
// No I/O happens here — every review is already in memory.
//
// Reference: Burn Book §4 (Batcher, DataLoader)

use std::sync::Arc;

use burn::data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder};

use crate::data::dataset::ReviewDataset;
use crate::domain::batch::TextBatch;
use crate::domain::error::FinetuneError;
use crate::domain::review::Review;

// ─── ReviewBatcher ────────────────────────────────────────────────────────────
/// Splits a group of reviews into parallel text / label columns.
#[derive(Clone, Debug, Default)]
pub struct ReviewBatcher;

impl Batcher<Review, TextBatch> for ReviewBatcher {
    fn batch(&self, items: Vec<Review>) -> TextBatch {
        let (texts, labels) = items
            .into_iter()
            .map(|r| (r.text, r.label))
            .unzip();
        TextBatch { texts, labels }
    }
}

// ─── BatchOptions ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Rows per batch (the last batch of an epoch may be smaller)
    pub batch_size:   usize,
    /// Some(seed) reshuffles every epoch, None keeps file order
    pub shuffle_seed: Option<u64>,
    /// Background worker lanes; 0 batches on the calling thread
    pub num_workers:  usize,
}

// ─── BatchSource ──────────────────────────────────────────────────────────────
pub struct BatchSource {
    loader:     Arc<dyn DataLoader<TextBatch>>,
    batch_size: usize,
}

impl BatchSource {
    pub fn new(dataset: ReviewDataset, options: &BatchOptions) -> Result<Self, FinetuneError> {
        if options.batch_size == 0 {
            return Err(FinetuneError::Config("batch size must be at least 1".into()));
        }

        let mut builder = DataLoaderBuilder::new(ReviewBatcher).batch_size(options.batch_size);
        if let Some(seed) = options.shuffle_seed {
            builder = builder.shuffle(seed);
        }
        if options.num_workers > 0 {
            builder = builder.num_workers(options.num_workers);
        }

        Ok(Self {
            loader:     builder.build(dataset),
            batch_size: options.batch_size,
        })
    }

    /// One complete pass over the dataset.
    pub fn iterate(&self) -> impl Iterator<Item = TextBatch> + '_ {
        self.loader.iter()
    }

    /// Number of reviews behind this source
    pub fn num_items(&self) -> usize {
        self.loader.num_items()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batches per epoch
    pub fn steps_per_epoch(&self) -> usize {
        self.num_items().div_ceil(self.batch_size)
    }
}
