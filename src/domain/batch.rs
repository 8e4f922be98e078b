// ============================================================
// Layer 3 — Batch Types
// ============================================================
// Two shapes of the same mini-batch:
//
//   TextBatch     — raw texts and labels, as grouped by the
//                   data loader
//   EncodedBatch  — the same rows as a rectangular matrix of
//                   token ids, ready to be turned into tensors
//
// Both are ephemeral: built for one step, dropped after it.

/// A group of raw reviews handed out by the batch source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBatch {
    pub texts:  Vec<String>,
    pub labels: Vec<usize>,
}

impl TextBatch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

/// Token ids for a whole batch, stored row-major.
///
/// Invariant: `ids.len() == lengths.len() * width`, every row is
/// exactly `width` long and positions at or beyond `lengths[i]`
/// hold the padding id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    /// Flattened [rows, width] token matrix
    pub ids: Vec<u32>,

    /// Number of real (non-padding) tokens per row
    pub lengths: Vec<usize>,

    /// True class id per row
    pub labels: Vec<usize>,

    /// Fixed row width (the configured maximum length)
    pub width: usize,

    /// Id used to right-pad every row
    pub pad_id: u32,
}

impl EncodedBatch {
    pub fn rows(&self) -> usize {
        self.lengths.len()
    }

    /// 1 for real tokens, 0 for padding, in the same layout as `ids`
    pub fn attention_mask(&self) -> Vec<u32> {
        self.lengths
            .iter()
            .flat_map(|&len| (0..self.width).map(move |pos| u32::from(pos < len)))
            .collect()
    }
}

#[cfg(test)]
impl EncodedBatch {
    pub fn row(&self, i: usize) -> &[u32] {
        &self.ids[i * self.width..(i + 1) * self.width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        self.ids.chunks(self.width.max(1))
    }
}
