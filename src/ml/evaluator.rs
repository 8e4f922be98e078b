// ============================================================
// Layer 5 — Evaluation Loop
// ============================================================
// One full pass over the held-out batches in inference mode.
//
// Same prediction rule as training (argmax of softmax scores),
// but the model is only reachable through `&impl Classifier`:
// no gradients, no optimizer, no weight updates.
//
// Accuracy = total correct / total seen over the whole pass.
// An empty pass has no accuracy and is an error.

use crate::data::{batcher::BatchSource, encoder::BatchEncoder};
use crate::domain::error::FinetuneError;
use crate::domain::report::EvalReport;
use crate::domain::traits::Classifier;
use crate::ml::accumulator::{count_correct, predict_classes, Accumulator};

pub fn evaluate<C: Classifier + ?Sized>(
    model:   &C,
    source:  &BatchSource,
    encoder: &BatchEncoder,
) -> Result<EvalReport, FinetuneError> {
    let mut acc = Accumulator::default();

    for batch in source.iterate() {
        let encoded = encoder.encode(&batch)?;
        let output  = model.forward(&encoded)?;

        if output.scores.len() != encoded.rows() {
            return Err(FinetuneError::Device(format!(
                "model returned {} score rows for a batch of {}",
                output.scores.len(),
                encoded.rows()
            )));
        }

        let predictions = predict_classes(&output.scores);
        acc = acc.record(
            output.loss,
            count_correct(&predictions, &encoded.labels),
            encoded.rows(),
        );
    }

    let accuracy = acc
        .accuracy()
        .ok_or_else(|| FinetuneError::Evaluation("evaluation set is empty".into()))?;

    tracing::info!(
        "Evaluated {} reviews in {} batches: {} correct",
        acc.seen,
        acc.steps,
        acc.correct
    );

    Ok(EvalReport {
        correct:   acc.correct,
        seen:      acc.seen,
        accuracy,
        mean_loss: acc.mean_loss(),
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::data::{batcher::BatchOptions, dataset::ReviewDataset, encoder::TruncationPolicy};
    use crate::domain::review::Review;
    use crate::ml::testing::{MockClassifier, MockTokenizer};

    fn source(n: usize, batch_size: usize) -> BatchSource {
        let reviews = (0..n).map(|i| Review::new(format!("review {i}"), i % 2)).collect();
        let opts = BatchOptions { batch_size, shuffle_seed: None, num_workers: 0 };
        BatchSource::new(ReviewDataset::new(reviews), &opts).unwrap()
    }

    fn encoder() -> BatchEncoder {
        BatchEncoder::new(Arc::new(MockTokenizer), 8, 0, TruncationPolicy::Truncate).unwrap()
    }

    #[test]
    fn test_perfect_model_scores_one() {
        let report = evaluate(&MockClassifier::always_correct(2), &source(7, 3), &encoder()).unwrap();
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.seen, 7);
        assert_eq!(report.correct, 7);
    }

    #[test]
    fn test_wrong_model_scores_zero() {
        let report = evaluate(&MockClassifier::always_wrong(2), &source(5, 1), &encoder()).unwrap();
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.seen, 5);
    }

    #[test]
    fn test_accuracy_in_unit_interval() {
        let report = evaluate(&MockClassifier::always_correct(3), &source(4, 2), &encoder()).unwrap();
        assert!((0.0..=1.0).contains(&report.accuracy));
    }

    #[test]
    fn test_empty_set_is_evaluation_error() {
        let err = evaluate(&MockClassifier::always_correct(2), &source(0, 1), &encoder()).unwrap_err();
        assert!(matches!(err, FinetuneError::Evaluation(_)));
    }
}
