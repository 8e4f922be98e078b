// ============================================================
// Layer 5 — Burn Learner
// ============================================================
// Binds the TransformerClassifier and a Burn optimizer to the
// domain traits the loops drive.
//
//   BurnLearner<B, O>   — TrainableClassifier on an Autodiff
//                         backend; holds the model, optimizer,
//                         learning rate and the pending loss
//                         graph between forward_train and step
//   BurnClassifier<B>   — Classifier on the inner backend, made
//                         by model.valid() (dropout disabled,
//                         no gradient tracking)
//
// Key Burn insight:
//   optim.step() consumes the model and returns the updated one,
//   so the learner keeps it in an Option while it is on loan.
//
// Reference: Burn Book §5 (Custom Training Loop)

use burn::{
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::domain::batch::EncodedBatch;
use crate::domain::error::FinetuneError;
use crate::domain::traits::{Classifier, ForwardOutput, TrainableClassifier};
use crate::ml::model::TransformerClassifier;

// ─── Tensor conversion ────────────────────────────────────────────────────────

/// Input ids, padding mask and labels, created on `device`.
struct BatchTensors<B: Backend> {
    input_ids: Tensor<B, 2, Int>,
    mask_pad:  Tensor<B, 2, Bool>,
    labels:    Tensor<B, 1, Int>,
}

fn to_tensors<B: Backend>(
    batch:      &EncodedBatch,
    vocab_size: usize,
    device:     &B::Device,
) -> Result<BatchTensors<B>, FinetuneError> {
    if batch.rows() == 0 {
        return Err(FinetuneError::Encoding("cannot build tensors for an empty batch".into()));
    }
    if let Some(&bad) = batch.ids.iter().find(|&&id| id as usize >= vocab_size) {
        return Err(FinetuneError::Encoding(format!(
            "token id {bad} is outside the model vocabulary of {vocab_size}"
        )));
    }

    let rows  = batch.rows();
    let width = batch.width;

    let input_flat: Vec<i32> = batch.ids.iter().map(|&x| x as i32).collect();
    let mask_flat:  Vec<i32> = batch.attention_mask().iter().map(|&x| x as i32).collect();
    let label_flat: Vec<i32> = batch.labels.iter().map(|&x| x as i32).collect();

    let input_ids = Tensor::<B, 1, Int>::from_ints(input_flat.as_slice(), device)
        .reshape([rows, width]);

    // attention mask 0 → padding → masked out
    let mask_pad = Tensor::<B, 1, Int>::from_ints(mask_flat.as_slice(), device)
        .reshape([rows, width])
        .equal_elem(0);

    let labels = Tensor::<B, 1, Int>::from_ints(label_flat.as_slice(), device);

    Ok(BatchTensors { input_ids, mask_pad, labels })
}

/// [batch, num_classes] logits → one Vec<f32> per row
fn score_rows<B: Backend>(logits: Tensor<B, 2>) -> Result<Vec<Vec<f32>>, FinetuneError> {
    let [_, classes] = logits.dims();
    let flat = logits
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| FinetuneError::Device(format!("cannot read logits: {e:?}")))?;
    Ok(flat.chunks(classes.max(1)).map(|row| row.to_vec()).collect())
}

// ─── BurnLearner ──────────────────────────────────────────────────────────────
pub struct BurnLearner<B: AutodiffBackend, O> {
    model:      Option<TransformerClassifier<B>>,
    optim:      O,
    lr:         f64,
    vocab_size: usize,
    device:     B::Device,
    pending:    Option<Tensor<B, 1>>,
}

impl<B, O> BurnLearner<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<TransformerClassifier<B>, B>,
{
    pub fn new(
        model:      TransformerClassifier<B>,
        optim:      O,
        lr:         f64,
        vocab_size: usize,
        device:     B::Device,
    ) -> Self {
        Self { model: Some(model), optim, lr, vocab_size, device, pending: None }
    }

    fn model(&self) -> Result<&TransformerClassifier<B>, FinetuneError> {
        self.model
            .as_ref()
            .ok_or_else(|| FinetuneError::Device("model lost during an optimizer step".into()))
    }
}

impl<B, O> TrainableClassifier for BurnLearner<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<TransformerClassifier<B>, B>,
{
    type Inference = BurnClassifier<B::InnerBackend>;

    fn zero_grad(&mut self) {
        // Burn builds fresh gradients on every backward(); dropping the
        // previous graph is all that is left to clear.
        self.pending = None;
    }

    fn forward_train(&mut self, batch: &EncodedBatch) -> Result<ForwardOutput, FinetuneError> {
        let tensors = to_tensors::<B>(batch, self.vocab_size, &self.device)?;
        let output  = self.model()?.forward_classification(
            tensors.input_ids,
            tensors.mask_pad,
            tensors.labels,
        );

        let loss: f64 = output.loss.clone().into_scalar().elem::<f64>();
        let scores    = score_rows(output.logits)?;
        self.pending  = Some(output.loss);

        Ok(ForwardOutput { loss, scores })
    }

    fn step(&mut self) -> Result<(), FinetuneError> {
        let loss = self.pending.take().ok_or_else(|| {
            FinetuneError::Device("optimizer step requested before a forward pass".into())
        })?;
        let model = self.model.take().ok_or_else(|| {
            FinetuneError::Device("model lost during an optimizer step".into())
        })?;

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        self.model = Some(self.optim.step(self.lr, model, grads));
        Ok(())
    }

    fn to_inference(&self) -> Result<Self::Inference, FinetuneError> {
        Ok(BurnClassifier {
            model:      self.model()?.valid(),
            vocab_size: self.vocab_size,
            device:     self.device.clone(),
        })
    }
}

// ─── BurnClassifier ───────────────────────────────────────────────────────────
pub struct BurnClassifier<B: Backend> {
    model:      TransformerClassifier<B>,
    vocab_size: usize,
    device:     B::Device,
}

impl<B: Backend> Classifier for BurnClassifier<B> {
    fn forward(&self, batch: &EncodedBatch) -> Result<ForwardOutput, FinetuneError> {
        let tensors = to_tensors::<B>(batch, self.vocab_size, &self.device)?;
        let output  = self.model.forward_classification(
            tensors.input_ids,
            tensors.mask_pad,
            tensors.labels,
        );

        Ok(ForwardOutput {
            loss:   output.loss.into_scalar().elem::<f64>(),
            scores: score_rows(output.logits)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{ndarray::NdArray, Autodiff};
    use burn::optim::AdamConfig;

    use crate::ml::model::TransformerClassifierConfig;

    type TestBackend = Autodiff<NdArray<f32>>;

    fn batch() -> EncodedBatch {
        EncodedBatch {
            ids:     vec![101, 5, 6, 102, 101, 7, 102, 0],
            lengths: vec![4, 3],
            labels:  vec![1, 0],
            width:   4,
            pad_id:  0,
        }
    }

    fn learner() -> BurnLearner<TestBackend, impl Optimizer<TransformerClassifier<TestBackend>, TestBackend>> {
        let device = Default::default();
        let model  = TransformerClassifierConfig::new(128, 4, 16, 2, 1, 32, 0.0, 2)
            .init::<TestBackend>(&device);
        let optim  = AdamConfig::new().init::<TestBackend, TransformerClassifier<TestBackend>>();
        BurnLearner::new(model, optim, 1e-3, 128, device)
    }

    #[test]
    fn test_train_step_runs() {
        let mut learner = learner();
        learner.zero_grad();
        let out = learner.forward_train(&batch()).unwrap();
        assert!(out.loss.is_finite());
        assert_eq!(out.scores.len(), 2);
        assert!(out.scores.iter().all(|row| row.len() == 2));
        learner.step().unwrap();
    }

    #[test]
    fn test_step_without_forward_fails() {
        let mut learner = learner();
        assert!(matches!(learner.step(), Err(FinetuneError::Device(_))));
    }

    #[test]
    fn test_zero_grad_discards_pending_graph() {
        let mut learner = learner();
        learner.forward_train(&batch()).unwrap();
        learner.zero_grad();
        assert!(learner.step().is_err());
    }

    #[test]
    fn test_inference_matches_batch_rows() {
        let learner = learner();
        let eval    = learner.to_inference().unwrap();
        let out     = eval.forward(&batch()).unwrap();
        assert_eq!(out.scores.len(), 2);
    }

    #[test]
    fn test_out_of_vocabulary_id_rejected() {
        let mut learner = learner();
        let mut b = batch();
        b.ids[1] = 500;
        assert!(matches!(learner.forward_train(&b), Err(FinetuneError::Encoding(_))));
    }
}
