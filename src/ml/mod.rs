// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn model and training code.
//
// What's in this layer:
//
//   ffnn.rs       — Feed-forward classifier over bag-of-words
//                   counts: Linear → ReLU → Linear → log-softmax
//
//   rnn.rs        — Recurrent classifier over token sequences:
//                   Embedding → tanh RNN cell → Σ hidden states
//                   → Linear → log-softmax
//
//   trainer.rs    — The training loop: minibatch updates,
//                   validation, early stopping, checkpoints
//
//   inferencer.rs — Rebuilds a trained model from a checkpoint
//                   and classifies or evaluates reviews
//
// Both models implement RatingClassifier, so one generic
// training loop drives either of them.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

/// Bag-of-words feed-forward network
pub mod ffnn;

/// Recurrent network over token sequences
pub mod rnn;

/// Generic training loop with validation and checkpointing
pub mod trainer;

/// Checkpoint loading, prediction and evaluation
pub mod inferencer;

use burn::{nn::loss::CrossEntropyLossConfig, prelude::*};

/// CPU backend used unless the `wgpu` feature is enabled
#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

/// Backend with automatic differentiation, used for training
pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

/// Result of running a classifier on one labelled batch.
#[derive(Debug, Clone)]
pub struct ClassificationOutput<B: Backend> {
    /// Mean negative log-likelihood over the batch — shape: [1]
    pub loss: Tensor<B, 1>,

    /// Unnormalised class scores — shape: [batch_size, 5]
    pub logits: Tensor<B, 2>,

    /// Gold labels — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

impl<B: Backend> ClassificationOutput<B> {
    /// Score `logits` against `targets`.
    ///
    /// CrossEntropyLoss applies log-softmax itself, so this is the
    /// NLL of the log-softmax output averaged over the batch.
    pub fn new(logits: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> Self {
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets.clone());
        Self { loss, logits, targets }
    }

    pub fn batch_size(&self) -> usize {
        self.targets.dims()[0]
    }

    pub fn loss_value(&self) -> f64 {
        self.loss.clone().into_scalar().elem::<f64>()
    }

    /// Number of rows whose arg-max class equals the target
    pub fn correct(&self) -> usize {
        // argmax(1) returns shape [batch, 1] — flatten to [batch]
        let predicted = self.logits.clone().argmax(1).flatten::<1>(0, 1);
        let correct: i64 = predicted
            .equal(self.targets.clone())
            .int()
            .sum()
            .into_scalar()
            .elem::<i64>();
        correct as usize
    }
}

/// A model that maps a batch of its own input type to class scores.
pub trait RatingClassifier<B: Backend> {
    type Batch: Clone + Send + Sync + std::fmt::Debug + 'static;

    fn forward_classification(&self, batch: Self::Batch) -> ClassificationOutput<B>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_counts_argmax_matches() {
        let device = Default::default();
        let logits = Tensor::<InnerBackend, 2>::from_floats(
            [[0.1, 2.0, 0.0, 0.0, 0.0], [3.0, 0.0, 0.0, 0.0, 0.0], [0.0, 0.0, 0.0, 0.0, 1.0]],
            &device,
        );
        let targets = Tensor::<InnerBackend, 1, Int>::from_ints([1, 2, 4], &device);
        let out = ClassificationOutput::new(logits, targets);
        assert_eq!(out.batch_size(), 3);
        assert_eq!(out.correct(), 2);
    }

    #[test]
    fn test_uniform_logits_give_log_five_loss() {
        let device = Default::default();
        let logits = Tensor::<InnerBackend, 2>::zeros([4, 5], &device);
        let targets = Tensor::<InnerBackend, 1, Int>::from_ints([0, 1, 2, 3], &device);
        let out = ClassificationOutput::new(logits, targets);
        assert!((out.loss_value() - 5f64.ln()).abs() < 1e-4);
    }
}
