// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Drives forward/backward passes over the training batches.
//
// Per step:
//   1. zero_grad
//   2. encode the batch (truncate + pad to max_length)
//   3. forward pass → loss + class scores
//   4. prediction = argmax(softmax(scores)) per row
//   5. fold loss / correct / seen into the window accumulator
//   6. backward pass + optimizer step
//   7. every `report_every` steps: emit a progress report and
//      start a new window
//
// The step counter is global: it keeps counting across epochs,
// so with report_every = 500 the reports land on steps 500,
// 1000, 1500, ... regardless of epoch boundaries.
//
// States: Idle → Running → Completed, or Running → Failed when a
// step errors (the open window is discarded, nothing is retried).

use crate::data::{batcher::BatchSource, encoder::BatchEncoder};
use crate::domain::batch::TextBatch;
use crate::domain::error::FinetuneError;
use crate::domain::report::ProgressReport;
use crate::domain::traits::{ProgressSink, TrainableClassifier};
use crate::ml::accumulator::{count_correct, predict_classes, Accumulator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// What a completed run leaves behind.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainSummary {
    /// Total optimizer steps taken
    pub steps:   usize,
    /// Every report emitted, in order
    pub reports: Vec<ProgressReport>,
    /// The window still open when training ended (not reported)
    pub window:  Accumulator,
    /// Whole-run totals across every window
    pub total:   Accumulator,
}

pub struct TrainingLoop {
    epochs:       usize,
    report_every: usize,
    state:        LoopState,
}

impl TrainingLoop {
    pub fn new(epochs: usize, report_every: usize) -> Result<Self, FinetuneError> {
        if epochs == 0 {
            return Err(FinetuneError::Config("epochs must be at least 1".into()));
        }
        if report_every == 0 {
            return Err(FinetuneError::Config("report interval must be at least 1".into()));
        }
        Ok(Self { epochs, report_every, state: LoopState::Idle })
    }

    pub fn run<M, S>(
        &mut self,
        model:   &mut M,
        source:  &BatchSource,
        encoder: &BatchEncoder,
        sink:    &mut S,
    ) -> Result<TrainSummary, FinetuneError>
    where
        M: TrainableClassifier,
        S: ProgressSink + ?Sized,
    {
        if self.state != LoopState::Idle {
            return Err(FinetuneError::Config(format!(
                "training loop cannot start from state {:?}",
                self.state
            )));
        }

        self.state = LoopState::Running;
        match self.run_epochs(model, source, encoder, sink) {
            Ok(summary) => {
                self.state = LoopState::Completed;
                Ok(summary)
            }
            Err(e) => {
                self.state = LoopState::Failed;
                Err(e)
            }
        }
    }

    fn run_epochs<M, S>(
        &self,
        model:   &mut M,
        source:  &BatchSource,
        encoder: &BatchEncoder,
        sink:    &mut S,
    ) -> Result<TrainSummary, FinetuneError>
    where
        M: TrainableClassifier,
        S: ProgressSink + ?Sized,
    {
        let mut step    = 1usize;
        let mut window  = Accumulator::default();
        let mut total   = Accumulator::default();
        let mut reports = Vec::new();

        for epoch in 1..=self.epochs {
            tracing::info!(
                "Epoch {}/{}: {} batches of up to {} reviews",
                epoch,
                self.epochs,
                source.steps_per_epoch(),
                source.batch_size()
            );

            for batch in source.iterate() {
                window = train_step(model, encoder, &batch, window)?;

                if step % self.report_every == 0 {
                    let report = ProgressReport {
                        epoch,
                        epochs:    self.epochs,
                        step,
                        mean_loss: window.mean_loss(),
                        accuracy:  window.accuracy().unwrap_or(0.0),
                    };
                    sink.emit(&report);
                    reports.push(report);

                    total  = total.merge(window);
                    window = Accumulator::default();
                }
                step += 1;
            }
        }

        let steps = step - 1;
        tracing::info!("Training complete after {} steps", steps);
        if !window.is_empty() {
            tracing::debug!(
                "Unreported window: {} steps, loss={:.4}, accuracy={:.3}",
                window.steps,
                window.mean_loss(),
                window.accuracy().unwrap_or(0.0)
            );
        }

        Ok(TrainSummary {
            steps,
            reports,
            window,
            total: total.merge(window),
        })
    }
}

/// One optimisation step; returns the updated window.
fn train_step<M: TrainableClassifier>(
    model:   &mut M,
    encoder: &BatchEncoder,
    batch:   &TextBatch,
    window:  Accumulator,
) -> Result<Accumulator, FinetuneError> {
    model.zero_grad();

    let encoded = encoder.encode(batch)?;
    let output  = model.forward_train(&encoded)?;

    if output.scores.len() != encoded.rows() {
        return Err(FinetuneError::Device(format!(
            "model returned {} score rows for a batch of {}",
            output.scores.len(),
            encoded.rows()
        )));
    }

    let predictions = predict_classes(&output.scores);
    let correct     = count_correct(&predictions, &encoded.labels);
    let window      = window.record(output.loss, correct, encoded.rows());

    model.step()?;

    tracing::debug!("step loss={:.4} correct={}/{}", output.loss, correct, encoded.rows());
    Ok(window)
}

#[cfg(test)]
impl TrainingLoop {
    pub fn state(&self) -> LoopState {
        self.state
    }
}
