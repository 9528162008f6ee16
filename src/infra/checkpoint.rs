// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What lives in the checkpoint directory:
//   model.mpk          — weights after the most recent epoch
//                        (overwritten every epoch)
//   latest_epoch.json  — which epoch model.mpk belongs to
//   train_config.json  — hyperparameters, needed to rebuild
//                        the model before loading weights
//
// The vocabulary (tokenizer.json) and learning curves
// (metrics.csv, history.json) are written to the same
// directory by VocabStore and MetricsLogger.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{anyhow, Context, Result};
use std::{fs, path::{Path, PathBuf}};
use burn::{
    prelude::*,
    record::CompactRecorder,
};

use crate::application::train_use_case::TrainConfig;

const MODEL_FILE:  &str = "model";
const EPOCH_FILE:  &str = "latest_epoch.json";
const CONFIG_FILE: &str = "train_config.json";

/// Manages saving and loading of model checkpoints.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        // .ok() ignores the error if the directory already exists
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// True when both the weights and the epoch pointer are on disk
    pub fn has_checkpoint(&self) -> bool {
        self.weights_path().exists() && self.dir.join(EPOCH_FILE).exists()
    }

    /// Path of the weights file, with the extension the recorder adds
    fn weights_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE).with_extension("mpk")
    }

    /// Save model weights for a given epoch, replacing the previous ones.
    pub fn save_model<B: Backend, M: Module<B>>(&self, model: &M, epoch: usize) -> Result<()> {
        let path = self.dir.join(MODEL_FILE);

        model
            .clone()
            .save_file(path.clone(), &CompactRecorder::new())
            .map_err(|e| anyhow!("Failed to save checkpoint to '{}': {e:?}", path.display()))?;

        let latest_path = self.dir.join(EPOCH_FILE);
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| format!("Failed to write '{}'", latest_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the saved weights into `model`.
    ///
    /// The model must have the architecture the checkpoint was
    /// trained with, or the recorder rejects the record.
    pub fn load_model<B: Backend, M: Module<B>>(&self, model: M, device: &B::Device) -> Result<M> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(MODEL_FILE);

        tracing::info!("Loading checkpoint from epoch {}", epoch);

        model
            .load_file(path.clone(), &CompactRecorder::new(), device)
            .map_err(|e| anyhow!(
                "Cannot load checkpoint '{}'. Have you trained the model first? ({e:?})",
                path.display()
            ))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' first.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// The epoch the saved weights belong to.
    pub fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join(EPOCH_FILE);

        let s = fs::read_to_string(&path)
            .with_context(|| format!("Cannot find '{}'. Have you run 'train' first?", path.display()))?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{ffnn::FfnnConfig, ffnn::Ffnn, InnerBackend};

    #[test]
    fn test_empty_directory_has_no_checkpoint() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path());
        assert!(!ckpt.has_checkpoint());
        assert!(ckpt.latest_epoch().is_err());
        assert!(ckpt.load_config().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let tmp  = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(tmp.path());
        let cfg  = TrainConfig { hidden_dim: 7, epochs: 3, ..TrainConfig::default() };
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.hidden_dim, 7);
        assert_eq!(loaded.epochs, 3);
        assert_eq!(loaded.model, cfg.model);
    }

    #[test]
    fn test_model_save_then_load() {
        let tmp    = tempfile::tempdir().unwrap();
        let ckpt   = CheckpointManager::new(tmp.path().join("nested"));
        let device = Default::default();

        let model: Ffnn<InnerBackend> = FfnnConfig::new(8, 3).init(&device);
        ckpt.save_model(&model, 4).unwrap();
        assert!(ckpt.has_checkpoint());
        assert_eq!(ckpt.latest_epoch().unwrap(), 4);

        let fresh: Ffnn<InnerBackend> = FfnnConfig::new(8, 3).init(&device);
        let loaded = ckpt.load_model(fresh, &device).unwrap();

        let x = Tensor::<InnerBackend, 2>::ones([1, 8], &device);
        let a: Vec<f32> = model.forward(x.clone()).into_data().convert::<f32>().to_vec().unwrap();
        let b: Vec<f32> = loaded.forward(x).into_data().convert::<f32>().to_vec().unwrap();
        // CompactRecorder stores half precision
        for (a, b) in a.iter().zip(&b) {
            assert!((a - b).abs() < 1e-2, "{a} vs {b}");
        }
    }
}
