// ============================================================
// Layer 5 — Metrics Accumulator
// ============================================================
// Running totals for one reporting window: loss sum, steps,
// correct predictions and rows seen.
//
// The accumulator is a plain value: each step takes the current
// window and returns the updated one. The loop that owns it
// swaps in a fresh `Accumulator::default()` after every report.

/// Window totals. `Copy`, so every update yields a new value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub loss_sum: f64,
    pub steps:    usize,
    pub correct:  usize,
    pub seen:     usize,
}

impl Accumulator {
    /// Fold one step's results into the window.
    #[must_use]
    pub fn record(self, loss: f64, correct: usize, seen: usize) -> Self {
        Self {
            loss_sum: self.loss_sum + loss,
            steps:    self.steps + 1,
            correct:  self.correct + correct,
            seen:     self.seen + seen,
        }
    }

    /// Combine two windows (e.g. into whole-run totals).
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            loss_sum: self.loss_sum + other.loss_sum,
            steps:    self.steps + other.steps,
            correct:  self.correct + other.correct,
            seen:     self.seen + other.seen,
        }
    }

    /// Loss sum / steps, NaN for an empty window
    pub fn mean_loss(&self) -> f64 {
        if self.steps == 0 { f64::NAN } else { self.loss_sum / self.steps as f64 }
    }

    /// correct / seen, None when nothing was seen
    pub fn accuracy(&self) -> Option<f64> {
        (self.seen > 0).then(|| self.correct as f64 / self.seen as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }
}

// ─── Predictions ──────────────────────────────────────────────────────────────

/// Numerically stable softmax over one score row.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max  = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one wins ties.
pub fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best), (i, &v)| {
            if v > best { (i, v) } else { (best_i, best) }
        })
        .0
}

/// Predicted class per row: argmax of the softmax-normalised scores.
pub fn predict_classes(scores: &[Vec<f32>]) -> Vec<usize> {
    scores.iter().map(|row| argmax(&softmax(row))).collect()
}

/// How many predictions equal their label.
pub fn count_correct(predictions: &[usize], labels: &[usize]) -> usize {
    predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p == l)
        .count()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_returns_updated_window() {
        let acc = Accumulator::default().record(0.5, 1, 2).record(1.5, 2, 2);
        assert_eq!(acc.steps, 2);
        assert_eq!(acc.correct, 3);
        assert_eq!(acc.seen, 4);
        assert!((acc.mean_loss() - 1.0).abs() < 1e-12);
        assert_eq!(acc.accuracy(), Some(0.75));
    }

    #[test]
    fn test_empty_window() {
        let acc = Accumulator::default();
        assert!(acc.is_empty());
        assert!(acc.mean_loss().is_nan());
        assert_eq!(acc.accuracy(), None);
    }

    #[test]
    fn test_merge_adds_totals() {
        let a = Accumulator::default().record(1.0, 1, 1);
        let b = Accumulator::default().record(3.0, 0, 1);
        let m = a.merge(b);
        assert_eq!((m.steps, m.correct, m.seen), (2, 1, 2));
        assert_eq!(m.loss_sum, 4.0);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);
    }

    #[test]
    fn test_softmax_handles_large_scores() {
        let p = softmax(&[1000.0, 0.0]);
        assert!(p.iter().all(|v| v.is_finite()));
        assert_eq!(argmax(&p), 0);
    }

    #[test]
    fn test_predict_and_count() {
        let scores = vec![vec![0.1, 2.0], vec![3.0, -1.0], vec![0.0, 0.0]];
        let preds  = predict_classes(&scores);
        assert_eq!(preds, vec![1, 0, 0]);
        assert_eq!(count_correct(&preds, &[1, 1, 0]), 2);
    }
}
