// ============================================================
// Layer 2 — PredictUseCase
// ============================================================
use anyhow::Result;

use crate::domain::review::Prediction;
use crate::domain::traits::RatingPredictor;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::inferencer::Inferencer;

pub struct PredictUseCase {
    predictor: Box<dyn RatingPredictor>,
}

impl PredictUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt_manager = CheckpointManager::new(checkpoint_dir);
        let inferencer   = Inferencer::from_checkpoint(&ckpt_manager)?;
        Ok(Self { predictor: Box::new(inferencer) })
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        self.predictor.predict(text)
    }
}
