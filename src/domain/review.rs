// ============================================================
// Layer 3 — Review Domain Type
// ============================================================
// A single labelled record from the sentiment corpus.
//
// Each row of the source file is (id, text, label). Only the
// text and the integer class id survive loading; the id column
// exists purely for the file's own bookkeeping.
//
// Example (NSMC, tab separated):
//   9976970	아 더빙.. 진짜 짜증나네요 목소리	0
//   → Review { text: "아 더빙.. 진짜 짜증나네요 목소리", label: 0 }

use serde::{Deserialize, Serialize};

/// A labelled review. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// The raw review text, never empty after loading
    pub text: String,

    /// Class id, e.g. 0 = negative, 1 = positive
    pub label: usize,
}

impl Review {
    pub fn new(text: impl Into<String>, label: usize) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}
