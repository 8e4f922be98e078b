// ============================================================
// Layer 2 — FinetuneUseCase
// ============================================================
// Orchestrates the full fine-tuning run in order:
//
//   Step 1: Validate the configuration        (Layer 2)
//   Step 2: Load train / test reviews          (Layer 4 - data)
//   Step 3: Load or build the tokenizer        (Layer 6 - infra)
//   Step 4: Build encoder and batch sources    (Layer 4 - data)
//   Step 5: Resolve the compute target         (Layer 6 - infra)
//   Step 6: Build model + optimizer            (Layer 5 - ml)
//   Step 7: Run the training loop              (Layer 5 - ml)
//   Step 8: Run the evaluation loop            (Layer 5 - ml)
//
// Control flow is strictly sequential: everything is loaded
// first, training runs to completion, evaluation runs once.
//
// Reference: Burn Book §5 (Training)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use burn::{optim::AdamConfig, tensor::backend::AutodiffBackend};
use serde::{Deserialize, Serialize};

use crate::data::{
    batcher::{BatchOptions, BatchSource},
    dataset::ReviewDataset,
    encoder::{BatchEncoder, TruncationPolicy},
    loader::{LoadOptions, RecordStore},
};
use crate::domain::error::FinetuneError;
use crate::domain::report::EvalReport;
use crate::domain::review::Review;
use crate::domain::traits::TrainableClassifier;
use crate::infra::{
    device::{self, ComputeTarget},
    metrics::{ConsoleReporter, MetricsLogger},
    tokenizer_store::TokenizerStore,
    weights::load_pretrained,
};
use crate::ml::{
    evaluator::evaluate,
    learner::BurnLearner,
    model::{TransformerClassifier, TransformerClassifierConfig},
    trainer::{TrainSummary, TrainingLoop},
};

// ─── Fine-tuning Configuration ───────────────────────────────────────────────
// Every knob of a run. Serialisable so a run can be saved and
// repeated; missing JSON fields fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinetuneConfig {
    pub train_path:         PathBuf,
    pub test_path:          PathBuf,
    pub delimiter:          char,
    pub has_headers:        bool,
    pub text_column:        usize,
    pub label_column:       usize,
    pub sample_fraction:    f64,
    pub seed:               u64,
    pub batch_size:         usize,
    pub num_workers:        usize,
    pub epochs:             usize,
    pub lr:                 f64,
    pub report_every:       usize,
    pub max_seq_len:        usize,
    pub truncation:         TruncationPolicy,
    pub compute_target:     ComputeTarget,
    pub tokenizer_path:     Option<PathBuf>,
    pub vocab_size:         usize,
    pub num_classes:        usize,
    pub d_model:            usize,
    pub num_heads:          usize,
    pub num_layers:         usize,
    pub d_ff:               usize,
    pub dropout:            f64,
    pub pretrained_weights: Option<PathBuf>,
    pub metrics_dir:        Option<PathBuf>,
}

impl Default for FinetuneConfig {
    fn default() -> Self {
        Self {
            train_path:         PathBuf::from("ratings_train.txt"),
            test_path:          PathBuf::from("ratings_test.txt"),
            delimiter:          '\t',
            has_headers:        true,
            text_column:        1,
            label_column:       2,
            sample_fraction:    0.4,
            seed:               999,
            batch_size:         1,
            num_workers:        2,
            epochs:             2,
            lr:                 1e-6,
            report_every:       500,
            max_seq_len:        512,
            truncation:         TruncationPolicy::Truncate,
            compute_target:     ComputeTarget::default(),
            tokenizer_path:     None,
            vocab_size:         30522,
            num_classes:        2,
            d_model:            256,
            num_heads:          8,
            num_layers:         6,
            d_ff:               1024,
            dropout:            0.1,
            pretrained_weights: None,
            metrics_dir:        None,
        }
    }
}

impl FinetuneConfig {
    /// Reject settings that can never produce a valid run.
    pub fn validate(&self) -> Result<(), FinetuneError> {
        let fail = |msg: String| Err(FinetuneError::Config(msg));

        if !self.delimiter.is_ascii() {
            return fail(format!("delimiter {:?} must be a single ASCII character", self.delimiter));
        }
        if self.text_column == self.label_column {
            return fail("text and label columns must differ".into());
        }
        if !(self.sample_fraction > 0.0 && self.sample_fraction <= 1.0) {
            return fail(format!("sample fraction must be in (0, 1], got {}", self.sample_fraction));
        }
        if self.batch_size == 0 {
            return fail("batch size must be at least 1".into());
        }
        if self.epochs == 0 {
            return fail("epochs must be at least 1".into());
        }
        if self.report_every == 0 {
            return fail("report interval must be at least 1".into());
        }
        if self.max_seq_len == 0 {
            return fail("max sequence length must be at least 1".into());
        }
        if !(self.lr > 0.0) {
            return fail(format!("learning rate must be positive, got {}", self.lr));
        }
        if self.num_classes < 2 {
            return fail(format!("need at least 2 classes, got {}", self.num_classes));
        }
        if self.num_heads == 0 || self.d_model % self.num_heads != 0 {
            return fail(format!(
                "d_model ({}) must be divisible by num_heads ({})",
                self.d_model, self.num_heads
            ));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return fail(format!("dropout must be in [0, 1), got {}", self.dropout));
        }
        Ok(())
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            // validate() guarantees ASCII
            delimiter:    self.delimiter as u8,
            has_headers:  self.has_headers,
            text_column:  self.text_column,
            label_column: self.label_column,
        }
    }
}

/// Everything a finished run produces.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub train: TrainSummary,
    pub eval:  EvalReport,
}

// ─── FinetuneUseCase ─────────────────────────────────────────────────────────
pub struct FinetuneUseCase {
    config: FinetuneConfig,
}

impl FinetuneUseCase {
    pub fn new(config: FinetuneConfig) -> Self {
        Self { config }
    }

    /// Execute the full run end to end
    pub fn execute(&self) -> Result<RunOutcome> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Load reviews ──────────────────────────────────────────────
        let train = RecordStore::new(&cfg.train_path, cfg.load_options())
            .load(cfg.sample_fraction, cfg.seed)
            .context("Loading training data")?;
        let test = RecordStore::new(&cfg.test_path, cfg.load_options())
            .load(cfg.sample_fraction, cfg.seed)
            .context("Loading test data")?;

        if let Some(first) = train.first() {
            tracing::info!("First training record: {:?}", first);
        }
        check_labels(&train, cfg.num_classes)?;
        check_labels(&test, cfg.num_classes)?;

        // ── Step 3: Tokenizer ─────────────────────────────────────────────────
        let tokenizer = match &cfg.tokenizer_path {
            Some(path) => TokenizerStore::load(path)?,
            None => TokenizerStore::build(train.iter().map(|r| r.text.as_str()), cfg.vocab_size)?,
        };
        let pad_id = tokenizer.pad_id();

        // ── Step 4: Encoder and batch sources ─────────────────────────────────
        let encoder = BatchEncoder::new(Arc::new(tokenizer), cfg.max_seq_len, pad_id, cfg.truncation)?;

        let train_source = BatchSource::new(
            ReviewDataset::new(train),
            &BatchOptions {
                batch_size:   cfg.batch_size,
                shuffle_seed: Some(cfg.seed),
                num_workers:  cfg.num_workers,
            },
        )?;
        let test_source = BatchSource::new(
            ReviewDataset::new(test),
            &BatchOptions {
                batch_size:   cfg.batch_size,
                shuffle_seed: None,
                num_workers:  cfg.num_workers,
            },
        )?;
        tracing::info!(
            "Data ready: {} train, {} test reviews",
            train_source.num_items(),
            test_source.num_items()
        );

        // ── Step 5: Compute target (resolved once) ────────────────────────────
        match cfg.compute_target.ensure_available()? {
            ComputeTarget::Cpu => {
                tracing::info!("Using CPU (NdArray) backend");
                self.train_and_evaluate::<device::CpuBackend>(
                    device::cpu_device(), &train_source, &test_source, &encoder,
                )
            }
            #[cfg(feature = "wgpu")]
            ComputeTarget::Accelerator => {
                let accel = device::accelerator_device();
                tracing::info!("Using WGPU device: {:?}", accel);
                self.train_and_evaluate::<device::AcceleratorBackend>(
                    accel, &train_source, &test_source, &encoder,
                )
            }
            #[cfg(not(feature = "wgpu"))]
            ComputeTarget::Accelerator => Err(FinetuneError::Device(
                "accelerator backend not compiled in".into(),
            )
            .into()),
        }
    }

    // ── Steps 6–8, generic over the chosen backend ────────────────────────────
    fn train_and_evaluate<B: AutodiffBackend>(
        &self,
        device:       B::Device,
        train_source: &BatchSource,
        test_source:  &BatchSource,
        encoder:      &BatchEncoder,
    ) -> Result<RunOutcome> {
        let cfg = &self.config;
        B::seed(cfg.seed);

        let model_cfg = TransformerClassifierConfig::new(
            encoder.vocab_size(), cfg.max_seq_len, cfg.d_model,
            cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout, cfg.num_classes,
        );
        let mut model: TransformerClassifier<B> = model_cfg.init(&device);
        if let Some(path) = &cfg.pretrained_weights {
            model = load_pretrained(model, path, &device)?;
        }
        tracing::info!(
            "Model ready: {} layers, d_model={}, vocab={}",
            cfg.num_layers, cfg.d_model, encoder.vocab_size()
        );

        let optim = AdamConfig::new().init::<B, TransformerClassifier<B>>();
        let mut learner = BurnLearner::new(model, optim, cfg.lr, encoder.vocab_size(), device);

        let csv = cfg
            .metrics_dir
            .as_ref()
            .map(|dir| MetricsLogger::new(dir.clone()))
            .transpose()?;
        let mut reporter = ConsoleReporter::new(csv);

        let train = TrainingLoop::new(cfg.epochs, cfg.report_every)?
            .run(&mut learner, train_source, encoder, &mut reporter)
            .context("Training failed")?;

        // model.valid() → inference mode, dropout off
        let classifier = learner.to_inference()?;
        let eval = evaluate(&classifier, test_source, encoder).context("Evaluation failed")?;

        Ok(RunOutcome { train, eval })
    }
}

fn check_labels(reviews: &[Review], num_classes: usize) -> Result<(), FinetuneError> {
    match reviews.iter().find(|r| r.label >= num_classes) {
        Some(r) => Err(FinetuneError::Config(format!(
            "label {} found but only {} classes configured",
            r.label, num_classes
        ))),
        None => Ok(()),
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_are_valid() {
        FinetuneConfig::default().validate().unwrap();
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let base = FinetuneConfig::default();
        let bad = [
            FinetuneConfig { batch_size: 0, ..base.clone() },
            FinetuneConfig { epochs: 0, ..base.clone() },
            FinetuneConfig { report_every: 0, ..base.clone() },
            FinetuneConfig { sample_fraction: 0.0, ..base.clone() },
            FinetuneConfig { delimiter: '한', ..base.clone() },
            FinetuneConfig { d_model: 250, ..base.clone() },
            FinetuneConfig { num_classes: 1, ..base.clone() },
            FinetuneConfig { max_seq_len: 0, ..base.clone() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(FinetuneError::Config(_))), "{cfg:?}");
        }
    }

    #[test]
    fn test_label_check() {
        let reviews = vec![Review::new("a", 0), Review::new("b", 2)];
        assert!(check_labels(&reviews, 3).is_ok());
        assert!(check_labels(&reviews, 2).is_err());
    }

    #[test]
    fn test_end_to_end_on_cpu() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.txt");
        let test_path  = dir.path().join("test.txt");
        fs::write(&train_path, "id\tdocument\tlabel\n1\tgood movie\t1\n2\tbad movie\t0\n3\tok\t1\n4\tterrible\t0\n").unwrap();
        fs::write(&test_path, "id\tdocument\tlabel\n5\tgood\t1\n6\tbad\t0\n").unwrap();

        let cfg = FinetuneConfig {
            train_path,
            test_path,
            sample_fraction: 1.0,
            batch_size:      2,
            num_workers:     0,
            epochs:          1,
            lr:              1e-3,
            report_every:    1,
            max_seq_len:     8,
            compute_target:  ComputeTarget::Cpu,
            d_model:         16,
            num_heads:       2,
            num_layers:      1,
            d_ff:            32,
            dropout:         0.0,
            metrics_dir:     Some(dir.path().join("metrics")),
            ..FinetuneConfig::default()
        };

        let outcome = FinetuneUseCase::new(cfg).execute().unwrap();

        assert_eq!(outcome.train.steps, 2);
        assert_eq!(outcome.train.reports.len(), 2);
        assert_eq!(outcome.eval.seen, 2);
        assert!((0.0..=1.0).contains(&outcome.eval.accuracy));
        assert!(dir.path().join("metrics").join("metrics.csv").exists());
    }

    #[test]
    fn test_empty_test_set_fails_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.txt");
        let test_path  = dir.path().join("test.txt");
        fs::write(&train_path, "id\tdocument\tlabel\n1\tgood\t1\n").unwrap();
        fs::write(&test_path, "id\tdocument\tlabel\n2\t\t0\n").unwrap();

        let cfg = FinetuneConfig {
            train_path,
            test_path,
            sample_fraction: 1.0,
            num_workers:     0,
            epochs:          1,
            max_seq_len:     4,
            compute_target:  ComputeTarget::Cpu,
            d_model:         8,
            num_heads:       2,
            num_layers:      1,
            d_ff:            16,
            ..FinetuneConfig::default()
        };

        let err = FinetuneUseCase::new(cfg).execute().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FinetuneError>(),
            Some(FinetuneError::Evaluation(_))
        ));
    }
}
