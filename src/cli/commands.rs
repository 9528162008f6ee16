// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `evaluate` and
// `predict`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};
use crate::application::train_use_case::{ModelKind, OptimizerKind, TrainConfig};

/// The top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a rating classifier on labelled reviews
    Train(TrainArgs),

    /// Report loss and accuracy of a checkpoint on a labelled file
    Evaluate(EvaluateArgs),

    /// Rate a single piece of text with a trained checkpoint
    Predict(PredictArgs),
}

/// Model choice as spelled on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModelArg {
    Ffnn,
    Rnn,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OptimizerArg {
    Adagrad,
    Adam,
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Which network to train
    #[arg(long, value_enum, default_value_t = ModelArg::Ffnn)]
    pub model: ModelArg,

    /// JSON array of {"text", "stars"} objects to train on
    #[arg(long, default_value = "data/training.json")]
    pub train_data: String,

    /// Validation file; if omitted, part of the training data is held out
    #[arg(long)]
    pub val_data: Option<String>,

    /// Directory for the checkpoint, vocabulary and learning curves
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Size of the hidden layer / recurrent state
    #[arg(long, default_value_t = 32)]
    pub hidden_dim: usize,

    /// Word embedding size (RNN only)
    #[arg(long, default_value_t = 64)]
    pub embedding_dim: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Reviews per gradient update
    #[arg(long, default_value_t = 16)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 0.01)]
    pub lr: f64,

    #[arg(long, value_enum, default_value_t = OptimizerArg::Adagrad)]
    pub optimizer: OptimizerArg,

    /// Truncate reviews to this many tokens (RNN only)
    #[arg(long)]
    pub max_seq_len: Option<usize>,

    /// Fraction held out for validation when --val-data is absent
    #[arg(long, default_value_t = 0.2)]
    pub val_fraction: f64,

    /// Seed for weight init, shuffling and the train/validation split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Start from fresh weights even if a checkpoint exists
    #[arg(long)]
    pub no_resume: bool,

    /// Train for all epochs even when validation loss starts rising
    #[arg(long)]
    pub no_early_stopping: bool,
}

impl From<ModelArg> for ModelKind {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::Ffnn => ModelKind::Ffnn,
            ModelArg::Rnn  => ModelKind::Rnn,
        }
    }
}

impl From<OptimizerArg> for OptimizerKind {
    fn from(o: OptimizerArg) -> Self {
        match o {
            OptimizerArg::Adagrad => OptimizerKind::Adagrad,
            OptimizerArg::Adam    => OptimizerKind::Adam,
        }
    }
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            model:          a.model.into(),
            train_data:     a.train_data,
            val_data:       a.val_data,
            checkpoint_dir: a.checkpoint_dir,
            hidden_dim:     a.hidden_dim,
            embedding_dim:  a.embedding_dim,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            optimizer:      a.optimizer.into(),
            max_seq_len:    a.max_seq_len,
            val_fraction:   a.val_fraction,
            seed:           a.seed,
            resume:         !a.no_resume,
            early_stopping: !a.no_early_stopping,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Labelled JSON file to score
    #[arg(long)]
    pub data: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The review text to rate
    #[arg(long)]
    pub text: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_defaults_match_config_defaults() {
        let cli = Cli::try_parse_from(["rating-classifier", "train"]).unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        let default = TrainConfig::default();
        assert_eq!(cfg.model, ModelKind::Ffnn);
        assert_eq!(cfg.hidden_dim, default.hidden_dim);
        assert_eq!(cfg.epochs, default.epochs);
        assert_eq!(cfg.batch_size, 16);
        assert_eq!(cfg.optimizer, OptimizerKind::Adagrad);
        assert!(cfg.resume && cfg.early_stopping);
        assert!(cfg.val_data.is_none());
    }

    #[test]
    fn test_train_flags() {
        let cli = Cli::try_parse_from([
            "rating-classifier", "train", "--model", "rnn", "--optimizer", "adam",
            "--max-seq-len", "100", "--no-resume", "--no-early-stopping",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.model, ModelKind::Rnn);
        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.max_seq_len, Some(100));
        assert!(!cfg.resume && !cfg.early_stopping);
    }

    #[test]
    fn test_predict_requires_text() {
        assert!(Cli::try_parse_from(["rating-classifier", "predict"]).is_err());
    }
}
