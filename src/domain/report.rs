// ============================================================
// Layer 3 — Run Reports
// ============================================================
// Plain values produced by the training and evaluation loops.
// The Display impls are the exact console formats of a run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One periodic training progress emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// 1-based epoch the window closed in
    pub epoch:     usize,
    /// Total number of epochs in the run
    pub epochs:    usize,
    /// Global 1-based step counter (does not restart per epoch)
    pub step:      usize,
    /// Loss sum divided by steps in the window
    pub mean_loss: f64,
    /// Correct predictions divided by rows seen in the window
    pub accuracy:  f64,
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[Epoch {}/{}] Iteration {} -> Train Loss: {:.4}, Accuracy: {:.3}",
            self.epoch, self.epochs, self.step, self.mean_loss, self.accuracy,
        )
    }
}

/// Aggregate result of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub correct:   usize,
    pub seen:      usize,
    /// correct / seen, always within [0, 1]
    pub accuracy:  f64,
    pub mean_loss: f64,
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Test accuracy:  {}", self.accuracy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line_format() {
        let r = ProgressReport {
            epoch: 1, epochs: 2, step: 500, mean_loss: 0.693147, accuracy: 0.5,
        };
        assert_eq!(
            r.to_string(),
            "[Epoch 1/2] Iteration 500 -> Train Loss: 0.6931, Accuracy: 0.500"
        );
    }
}
