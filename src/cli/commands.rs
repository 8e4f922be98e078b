// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `from-config`, and
// all their configurable flags.
//
// Defaults mirror FinetuneConfig::default(): a 40% sample of
// tab-separated review files, 2 epochs, lr 1e-6, batch size 1,
// a progress line every 500 iterations.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::finetune_use_case::FinetuneConfig;
use crate::data::encoder::TruncationPolicy;
use crate::infra::device::ComputeTarget;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fine-tune and evaluate a sentiment classifier
    Train(TrainArgs),

    /// Repeat a run from a saved JSON config
    FromConfig(FromConfigArgs),
}

/// Where tensor operations run
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetArg {
    Cpu,
    Accelerator,
}

impl From<TargetArg> for ComputeTarget {
    fn from(t: TargetArg) -> Self {
        match t {
            TargetArg::Cpu         => ComputeTarget::Cpu,
            TargetArg::Accelerator => ComputeTarget::Accelerator,
        }
    }
}

/// What to do with reviews longer than --max-seq-len
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TruncationArg {
    Truncate,
    Reject,
}

impl From<TruncationArg> for TruncationPolicy {
    fn from(t: TruncationArg) -> Self {
        match t {
            TruncationArg::Truncate => TruncationPolicy::Truncate,
            TruncationArg::Reject   => TruncationPolicy::Reject,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Delimited training file
    #[arg(long, default_value = "ratings_train.txt")]
    pub train_path: PathBuf,

    /// Delimited test file
    #[arg(long, default_value = "ratings_test.txt")]
    pub test_path: PathBuf,

    /// Field delimiter (single ASCII character)
    #[arg(long, default_value_t = '\t')]
    pub delimiter: char,

    /// Treat the first row as data instead of a header
    #[arg(long)]
    pub no_header: bool,

    /// Zero-based column holding the review text
    #[arg(long, default_value_t = 1)]
    pub text_column: usize,

    /// Zero-based column holding the integer label
    #[arg(long, default_value_t = 2)]
    pub label_column: usize,

    /// Fraction of complete rows kept from each file, in (0, 1]
    #[arg(long, default_value_t = 0.4)]
    pub sample_fraction: f64,

    /// Seed for subsampling, shuffling and weight init
    #[arg(long, default_value_t = 999)]
    pub seed: u64,

    #[arg(long, default_value_t = 1)]
    pub batch_size: usize,

    /// Background workers assembling batches
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    #[arg(long, default_value_t = 2)]
    pub epochs: usize,

    #[arg(long, default_value_t = 1e-6)]
    pub lr: f64,

    /// Print a progress line every N iterations
    #[arg(long, default_value_t = 500)]
    pub report_every: usize,

    /// Maximum tokens per review, markers included
    #[arg(long, default_value_t = 512)]
    pub max_seq_len: usize,

    #[arg(long, value_enum, default_value_t = TruncationArg::Truncate)]
    pub truncation: TruncationArg,

    /// Compute target; defaults to the accelerator when compiled in
    #[arg(long, value_enum)]
    pub target: Option<TargetArg>,

    /// Pretrained tokenizer.json; without it a vocabulary is built
    /// from the training texts
    #[arg(long)]
    pub tokenizer: Option<PathBuf>,

    /// Upper bound on the corpus-built id space (embedding rows),
    /// the 104 reserved ids included
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,

    #[arg(long, default_value_t = 2)]
    pub num_classes: usize,

    /// Hidden dimension of the transformer
    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Pretrained weights saved with Burn's CompactRecorder
    #[arg(long)]
    pub pretrained: Option<PathBuf>,

    /// Directory for metrics.csv
    #[arg(long)]
    pub metrics_dir: Option<PathBuf>,

    /// Write the resolved config here before running
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

/// Convert CLI TrainArgs into the application-layer FinetuneConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for FinetuneConfig {
    fn from(a: TrainArgs) -> Self {
        FinetuneConfig {
            train_path:         a.train_path,
            test_path:          a.test_path,
            delimiter:          a.delimiter,
            has_headers:        !a.no_header,
            text_column:        a.text_column,
            label_column:       a.label_column,
            sample_fraction:    a.sample_fraction,
            seed:               a.seed,
            batch_size:         a.batch_size,
            num_workers:        a.num_workers,
            epochs:             a.epochs,
            lr:                 a.lr,
            report_every:       a.report_every,
            max_seq_len:        a.max_seq_len,
            truncation:         a.truncation.into(),
            compute_target:     a.target.map(Into::into).unwrap_or_default(),
            tokenizer_path:     a.tokenizer,
            vocab_size:         a.vocab_size,
            num_classes:        a.num_classes,
            d_model:            a.d_model,
            num_heads:          a.num_heads,
            num_layers:         a.num_layers,
            d_ff:               a.d_ff,
            dropout:            a.dropout,
            pretrained_weights: a.pretrained,
            metrics_dir:        a.metrics_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct FromConfigArgs {
    /// JSON config written by `train --save-config`
    #[arg(long)]
    pub config: PathBuf,
}
