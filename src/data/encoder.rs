// ============================================================
// Layer 4 — Encoder Adapter
// ============================================================
// Converts a TextBatch into an EncodedBatch: a rectangular
// matrix of token ids, one row per review.
//
// For each text:
//   1. Tokenize (special markers included by the tokenizer)
//   2. If longer than max_length, apply the truncation policy;
//      truncation keeps the closing marker as the last token
//   3. Right-pad with the padding id up to max_length
//
// Example with max_length = 6, pad_id = 0:
//   "good movie" → [101, 734, 215, 102]       (4 tokens)
//                → [101, 734, 215, 102, 0, 0]
//
// Every row ends up exactly max_length long, so the batch can be
// reshaped to [batch_size, max_length] without further work.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::batch::{EncodedBatch, TextBatch};
use crate::domain::error::FinetuneError;
use crate::domain::traits::Tokenize;

/// What to do with a sequence longer than the maximum length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Keep the first max_length - 1 tokens plus the closing
    /// marker, and log a warning
    #[default]
    Truncate,
    /// Fail the batch with an encoding error
    Reject,
}

pub struct BatchEncoder {
    tokenizer:  Arc<dyn Tokenize>,
    max_length: usize,
    pad_id:     u32,
    policy:     TruncationPolicy,
}

impl BatchEncoder {
    pub fn new(
        tokenizer:  Arc<dyn Tokenize>,
        max_length: usize,
        pad_id:     u32,
        policy:     TruncationPolicy,
    ) -> Result<Self, FinetuneError> {
        if max_length == 0 {
            return Err(FinetuneError::Config("max sequence length must be at least 1".into()));
        }
        Ok(Self { tokenizer, max_length, pad_id, policy })
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.vocab_size()
    }

    pub fn encode(&self, batch: &TextBatch) -> Result<EncodedBatch, FinetuneError> {
        let rows        = batch.len();
        let mut ids     = Vec::with_capacity(rows * self.max_length);
        let mut lengths = Vec::with_capacity(rows);

        for text in &batch.texts {
            let mut tokens = self.tokenizer.encode(text)?;

            if tokens.len() > self.max_length {
                match self.policy {
                    TruncationPolicy::Truncate => {
                        tracing::warn!(
                            "Truncating sequence of {} tokens to {}",
                            tokens.len(),
                            self.max_length
                        );
                        truncate_keeping_last(&mut tokens, self.max_length);
                    }
                    TruncationPolicy::Reject => {
                        return Err(FinetuneError::Encoding(format!(
                            "sequence of {} tokens exceeds maximum length {}",
                            tokens.len(),
                            self.max_length
                        )));
                    }
                }
            }

            lengths.push(tokens.len());
            ids.extend_from_slice(&tokens);
            ids.resize(ids.len() + self.max_length - tokens.len(), self.pad_id);
        }

        Ok(EncodedBatch {
            ids,
            lengths,
            labels: batch.labels.clone(),
            width:  self.max_length,
            pad_id: self.pad_id,
        })
    }
}

/// Cut `tokens` to `max_length`, keeping the final id (the
/// tokenizer's closing marker) in the last slot.
fn truncate_keeping_last(tokens: &mut Vec<u32>, max_length: usize) {
    let Some(&last) = tokens.last() else { return };
    if max_length < 2 {
        tokens.truncate(max_length);
        return;
    }
    tokens.truncate(max_length - 1);
    tokens.push(last);
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// One id per whitespace word (word length + 10), wrapped in 1 … 2
    struct WordLenTokenizer;

    impl Tokenize for WordLenTokenizer {
        fn encode(&self, text: &str) -> Result<Vec<u32>, FinetuneError> {
            if text.contains('\u{FFFD}') {
                return Err(FinetuneError::Encoding("unsupported character".into()));
            }
            let mut ids = vec![1];
            ids.extend(text.split_whitespace().map(|w| w.len() as u32 + 10));
            ids.push(2);
            Ok(ids)
        }

        fn vocab_size(&self) -> usize { 64 }
    }

    fn encoder(max_length: usize, policy: TruncationPolicy) -> BatchEncoder {
        BatchEncoder::new(Arc::new(WordLenTokenizer), max_length, 0, policy).unwrap()
    }

    fn batch(texts: &[&str]) -> TextBatch {
        TextBatch {
            texts:  texts.iter().map(|t| t.to_string()).collect(),
            labels: (0..texts.len()).map(|i| i % 2).collect(),
        }
    }

    #[test]
    fn test_rows_are_padded_to_fixed_width() {
        let enc = encoder(8, TruncationPolicy::Truncate)
            .encode(&batch(&["good movie", "ok", "a rather long review text"]))
            .unwrap();

        assert_eq!(enc.rows(), 3);
        for (i, row) in enc.iter_rows().enumerate() {
            assert_eq!(row.len(), 8);
            // nothing but padding after the real tokens
            assert!(row[enc.lengths[i]..].iter().all(|&id| id == 0));
        }
        assert_eq!(enc.row(0), &[1, 14, 15, 2, 0, 0, 0, 0]);
    }

    #[test]
    fn test_long_sequence_truncated() {
        let enc = encoder(3, TruncationPolicy::Truncate)
            .encode(&batch(&["one two three four"]))
            .unwrap();
        assert_eq!(enc.row(0), &[1, 13, 2]);
        assert_eq!(enc.lengths, vec![3]);
    }

    #[test]
    fn test_truncation_keeps_closing_marker() {
        let enc = encoder(5, TruncationPolicy::Truncate)
            .encode(&batch(&["one two three four five six", "ok"]))
            .unwrap();
        assert_eq!(enc.row(0), &[1, 13, 13, 15, 2]);
        assert_eq!(enc.row(1), &[1, 12, 2, 0, 0]);
        assert_eq!(enc.lengths, vec![5, 3]);
    }

    #[test]
    fn test_single_slot_keeps_first_token() {
        let mut tokens = vec![1, 13, 2];
        truncate_keeping_last(&mut tokens, 1);
        assert_eq!(tokens, vec![1]);
    }

    #[test]
    fn test_long_sequence_rejected() {
        let err = encoder(3, TruncationPolicy::Reject)
            .encode(&batch(&["one two three four"]))
            .unwrap_err();
        assert!(matches!(err, FinetuneError::Encoding(_)));
    }

    #[test]
    fn test_tokenizer_failure_propagates() {
        let err = encoder(8, TruncationPolicy::Truncate)
            .encode(&batch(&["bad \u{FFFD} char"]))
            .unwrap_err();
        assert!(matches!(err, FinetuneError::Encoding(_)));
    }

    #[test]
    fn test_labels_carried_through() {
        let enc = encoder(4, TruncationPolicy::Truncate)
            .encode(&batch(&["a", "b", "c"]))
            .unwrap();
        assert_eq!(enc.labels, vec![0, 1, 0]);
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(BatchEncoder::new(Arc::new(WordLenTokenizer), 0, 0, TruncationPolicy::Truncate).is_err());
    }
}
