//! Mock collaborators for exercising the loops without a real model.

use crate::domain::batch::EncodedBatch;
use crate::domain::error::FinetuneError;
use crate::domain::traits::{Classifier, ForwardOutput, Tokenize, TrainableClassifier};

/// [CLS]=1, one id per word, [SEP]=2
pub struct MockTokenizer;

impl Tokenize for MockTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>, FinetuneError> {
        let mut ids = vec![1];
        ids.extend(text.split_whitespace().map(|w| 3 + (w.len() as u32 % 20)));
        ids.push(2);
        Ok(ids)
    }

    fn vocab_size(&self) -> usize { 23 }
}

/// Scores the true label (or a wrong one) highest, reading labels
/// straight off the encoded batch.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    num_classes:  usize,
    correct:      bool,
    loss:         f64,
    fail_after:   Option<usize>,
    pub steps_taken: usize,
}

impl MockClassifier {
    pub fn always_correct(num_classes: usize) -> Self {
        Self { num_classes, correct: true, loss: 0.0, fail_after: None, steps_taken: 0 }
    }

    pub fn always_wrong(num_classes: usize) -> Self {
        Self { correct: false, ..Self::always_correct(num_classes) }
    }

    pub fn with_loss(self, loss: f64) -> Self {
        Self { loss, ..self }
    }

    /// Forward passes fail once `steps` optimizer steps have been taken.
    pub fn failing_after(self, steps: usize) -> Self {
        Self { fail_after: Some(steps), ..self }
    }

    fn scores(&self, batch: &EncodedBatch) -> ForwardOutput {
        let scores = batch
            .labels
            .iter()
            .map(|&label| {
                let hot = if self.correct { label } else { (label + 1) % self.num_classes };
                (0..self.num_classes)
                    .map(|c| if c == hot { 5.0 } else { -5.0 })
                    .collect()
            })
            .collect();
        ForwardOutput { loss: self.loss, scores }
    }
}

impl Classifier for MockClassifier {
    fn forward(&self, batch: &EncodedBatch) -> Result<ForwardOutput, FinetuneError> {
        Ok(self.scores(batch))
    }
}

impl TrainableClassifier for MockClassifier {
    type Inference = MockClassifier;

    fn zero_grad(&mut self) {}

    fn forward_train(&mut self, batch: &EncodedBatch) -> Result<ForwardOutput, FinetuneError> {
        if self.fail_after.is_some_and(|n| self.steps_taken >= n) {
            return Err(FinetuneError::Device("out of memory".into()));
        }
        Ok(self.scores(batch))
    }

    fn step(&mut self) -> Result<(), FinetuneError> {
        self.steps_taken += 1;
        Ok(())
    }

    fn to_inference(&self) -> Result<Self::Inference, FinetuneError> {
        Ok(self.clone())
    }
}
