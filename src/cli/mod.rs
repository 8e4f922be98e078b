// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`       — fine-tune on a review file, then evaluate
//   2. `from-config` — same, with settings read from JSON
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, FromConfigArgs, TrainArgs};

use crate::application::finetune_use_case::{FinetuneConfig, FinetuneUseCase};
use crate::infra::config_store::{load_config, save_config};

#[derive(Parser, Debug)]
#[command(
    name = "nsmc-finetune",
    version = "0.1.0",
    about = "Fine-tune a transformer sentiment classifier on labelled reviews, then report test accuracy."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to the use case. Never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)      => run_train(args),
            Commands::FromConfig(args) => run_from_config(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    let save_to = args.save_config.clone();
    let cfg: FinetuneConfig = args.into();

    if let Some(path) = save_to {
        save_config(&cfg, &path)?;
        tracing::info!("Config written to '{}'", path.display());
    }
    run(cfg)
}

fn run_from_config(args: FromConfigArgs) -> Result<()> {
    let cfg = load_config(&args.config)?;
    tracing::info!("Loaded config from '{}'", args.config.display());
    run(cfg)
}

fn run(cfg: FinetuneConfig) -> Result<()> {
    tracing::info!(
        "Fine-tuning on '{}' for {} epoch(s), evaluating on '{}'",
        cfg.train_path.display(),
        cfg.epochs,
        cfg.test_path.display()
    );

    let outcome = FinetuneUseCase::new(cfg).execute()?;

    tracing::info!(
        "Training done: {} steps, mean loss {:.4}",
        outcome.train.steps,
        outcome.train.total.mean_loss()
    );
    println!("{}", outcome.eval);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["nsmc-finetune", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: FinetuneConfig = args.into();
        let def = FinetuneConfig::default();

        assert_eq!(cfg.train_path, def.train_path);
        assert_eq!(cfg.delimiter, def.delimiter);
        assert_eq!(cfg.has_headers, def.has_headers);
        assert_eq!(cfg.sample_fraction, def.sample_fraction);
        assert_eq!(cfg.seed, def.seed);
        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.epochs, def.epochs);
        assert_eq!(cfg.lr, def.lr);
        assert_eq!(cfg.report_every, def.report_every);
        assert_eq!(cfg.compute_target, def.compute_target);
    }

    #[test]
    fn test_flags_reach_config() {
        let cli = Cli::try_parse_from([
            "nsmc-finetune", "train",
            "--target", "cpu",
            "--truncation", "reject",
            "--no-header",
            "--delimiter", ",",
            "--epochs", "3",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: FinetuneConfig = args.into();

        assert_eq!(cfg.compute_target, crate::infra::device::ComputeTarget::Cpu);
        assert_eq!(cfg.truncation, crate::data::encoder::TruncationPolicy::Reject);
        assert!(!cfg.has_headers);
        assert_eq!(cfg.delimiter, ',');
        assert_eq!(cfg.epochs, 3);
    }

    #[test]
    fn test_from_config_requires_path() {
        assert!(Cli::try_parse_from(["nsmc-finetune", "from-config"]).is_err());
    }
}
