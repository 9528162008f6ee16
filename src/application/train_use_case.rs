// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load training reviews            (Layer 4 - data)
//   Step 2: Load or split validation reviews (Layer 4 - data)
//   Step 3: Tokenise both sets               (Layer 4 - data)
//   Step 4: Decide whether to resume         (Layer 6 - infra)
//   Step 5: Build / load the vocabulary      (Layer 6 - infra)
//   Step 6: Save config                      (Layer 6 - infra)
//   Step 7: Run training loop                (Layer 5 - ml)
//   Step 8: Save learning curves             (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::JsonReviewLoader,
    preprocessor::Preprocessor,
    splitter::split_train_val,
};
use crate::domain::review::{Rating, Review};
use crate::domain::traits::ReviewSource;
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{MetricsLogger, TrainingHistory},
    vocab_store::VocabStore,
};
use crate::ml::trainer::run_training;

/// Which classifier to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Feed-forward network over bag-of-words counts
    Ffnn,
    /// Recurrent network over token sequences
    Rnn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    Adagrad,
    Adam,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved to train_config.json so inference can rebuild the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub model:          ModelKind,
    pub train_data:     String,
    /// Separate validation file; when absent the training
    /// reviews are split using `val_fraction`
    pub val_data:       Option<String>,
    pub checkpoint_dir: String,
    pub hidden_dim:     usize,
    /// RNN only
    pub embedding_dim:  usize,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub optimizer:      OptimizerKind,
    /// RNN only: longest token sequence fed to the model
    pub max_seq_len:    Option<usize>,
    pub val_fraction:   f64,
    pub seed:           u64,
    pub resume:         bool,
    pub early_stopping: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            model:          ModelKind::Ffnn,
            train_data:     "data/training.json".to_string(),
            val_data:       Some("data/validation.json".to_string()),
            checkpoint_dir: "checkpoints".to_string(),
            hidden_dim:     32,
            embedding_dim:  64,
            epochs:         10,
            batch_size:     16,
            lr:             0.01,
            optimizer:      OptimizerKind::Adagrad,
            max_seq_len:    None,
            val_fraction:   0.2,
            seed:           42,
            resume:         true,
            early_stopping: true,
        }
    }
}

impl TrainConfig {
    /// The tokeniser each model is trained with
    pub fn preprocessor(&self) -> Preprocessor {
        Preprocessor::new().with_strip_punctuation(self.model == ModelKind::Rnn)
    }

    pub fn validate(&self) -> Result<()> {
        if self.hidden_dim == 0 || self.batch_size == 0 || self.epochs == 0 {
            bail!("hidden_dim, batch_size and epochs must all be positive");
        }
        if self.model == ModelKind::Rnn && self.embedding_dim == 0 {
            bail!("embedding_dim must be positive for the RNN");
        }
        if !(self.lr > 0.0) {
            bail!("learning rate must be positive, got {}", self.lr);
        }
        if self.val_data.is_none() && !(self.val_fraction > 0.0 && self.val_fraction < 1.0) {
            bail!("val_fraction must be in (0, 1), got {}", self.val_fraction);
        }
        if self.max_seq_len == Some(0) {
            bail!("max_seq_len must be positive when set");
        }
        Ok(())
    }

    /// True when weights saved with `saved` fit the model this config builds
    fn same_architecture(&self, saved: &TrainConfig) -> bool {
        self.model == saved.model
            && self.hidden_dim == saved.hidden_dim
            && (self.model == ModelKind::Ffnn || self.embedding_dim == saved.embedding_dim)
    }
}

/// Tokenised reviews paired with their gold rating
pub type TokenizedReviews = Vec<(Vec<String>, Rating)>;

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<TrainingHistory> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Steps 1 + 2: Load reviews ─────────────────────────────────────────
        let train_reviews = JsonReviewLoader::new(&cfg.train_data).load_all()?;
        let (train_reviews, val_reviews) = match &cfg.val_data {
            Some(path) => (train_reviews, JsonReviewLoader::new(path).load_all()?),
            None => {
                tracing::info!(
                    "No validation file given, holding out {:.0}% of the training reviews",
                    cfg.val_fraction * 100.0
                );
                split_train_val(train_reviews, 1.0 - cfg.val_fraction, cfg.seed)
            }
        };
        if train_reviews.is_empty() {
            bail!("No training reviews in '{}'", cfg.train_data);
        }
        if val_reviews.is_empty() {
            bail!("The validation set is empty");
        }
        tracing::info!(
            "Split: {} train, {} validation",
            train_reviews.len(),
            val_reviews.len()
        );

        // ── Step 3: Tokenise ──────────────────────────────────────────────────
        let preprocessor = cfg.preprocessor();
        let train_docs = tokenize_all(&preprocessor, train_reviews);
        let val_docs   = tokenize_all(&preprocessor, val_reviews);

        // ── Step 4: Resume from an existing checkpoint? ───────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        let resume = cfg.resume && ckpt_manager.has_checkpoint();
        if resume {
            let saved = ckpt_manager.load_config()?;
            if !cfg.same_architecture(&saved) {
                bail!(
                    "Checkpoint in '{}' was trained with a different architecture \
                     ({:?}, hidden_dim={}); rerun with --no-resume or another --checkpoint-dir",
                    cfg.checkpoint_dir, saved.model, saved.hidden_dim
                );
            }
        }

        // ── Step 5: Vocabulary from the training set only ─────────────────────
        let vocab = VocabStore::new(&cfg.checkpoint_dir)
            .load_or_build(resume, train_docs.iter().map(|(tokens, _)| tokens.as_slice()))?;
        tracing::info!("Vocabulary size (with <UNK>): {}", vocab.len());

        // ── Step 6: Save config for inference ─────────────────────────────────
        ckpt_manager.save_config(cfg)?;

        // ── Step 7: Train ─────────────────────────────────────────────────────
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir, resume)?;
        let history = run_training(cfg, &vocab, &train_docs, &val_docs, resume, &ckpt_manager, &metrics)?;

        // ── Step 8: Learning curves ───────────────────────────────────────────
        let history_path = ckpt_manager.dir().join("history.json");
        history.save(&history_path)?;
        tracing::info!("Learning curves written to '{}'", history_path.display());

        Ok(history)
    }
}

fn tokenize_all(preprocessor: &Preprocessor, reviews: Vec<Review>) -> TokenizedReviews {
    reviews
        .into_iter()
        .map(|r| (preprocessor.tokenize(&r.text), r.rating))
        .collect()
}
