// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Loads a checkpoint and reports loss and accuracy on a
// labelled review file (e.g. a held-out test set).

use anyhow::{bail, Result};

use crate::data::loader::JsonReviewLoader;
use crate::domain::traits::ReviewSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::{EvaluationReport, Inferencer};

pub struct EvaluateUseCase {
    inferencer: Inferencer,
    batch_size: usize,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: &str, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            bail!("batch_size must be positive");
        }
        let ckpt_manager = CheckpointManager::new(checkpoint_dir);
        let inferencer   = Inferencer::from_checkpoint(&ckpt_manager)?;
        Ok(Self { inferencer, batch_size })
    }

    pub fn evaluate_file(&self, path: &str) -> Result<EvaluationReport> {
        let reviews = JsonReviewLoader::new(path).load_all()?;
        if reviews.is_empty() {
            bail!("No reviews to evaluate in '{path}'");
        }
        let report = self.inferencer.evaluate(&reviews, self.batch_size)?;
        tracing::info!(
            "Evaluated {} reviews: loss={:.4}, accuracy={:.4}",
            report.examples,
            report.loss,
            report.accuracy
        );
        Ok(report)
    }
}
