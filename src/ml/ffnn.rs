//! Feed-forward rating classifier over bag-of-words vectors.
//!
//! Architecture: |V| → h (ReLU) → 5 → log-softmax

use burn::{
    nn::{Linear, LinearConfig, Relu},
    prelude::*,
    tensor::activation::log_softmax,
};

use crate::data::batcher::BowBatch;
use crate::ml::{ClassificationOutput, RatingClassifier};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
#[derive(Config, Debug)]
pub struct FfnnConfig {
    /// Vocabulary size including <UNK>
    pub input_dim:  usize,
    pub hidden_dim: usize,
    /// One class per star
    #[config(default = 5)]
    pub num_classes: usize,
}

impl FfnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Ffnn<B> {
        Ffnn {
            w1:         LinearConfig::new(self.input_dim, self.hidden_dim).init(device),
            activation: Relu::new(),
            w2:         LinearConfig::new(self.hidden_dim, self.num_classes).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Ffnn<B: Backend> {
    w1:         Linear<B>,
    activation: Relu,
    w2:         Linear<B>,
}

impl<B: Backend> Ffnn<B> {
    /// features: [batch, vocab] → logits: [batch, 5]
    ///
    /// The activation is applied to the hidden layer only; the
    /// output scores go straight into (log-)softmax.
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let z1 = self.activation.forward(self.w1.forward(features));
        self.w2.forward(z1)
    }

    /// Log class probabilities — shape: [batch, 5]
    pub fn log_probs(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        log_softmax(self.forward(features), 1)
    }
}

impl<B: Backend> RatingClassifier<B> for Ffnn<B> {
    type Batch = BowBatch<B>;

    fn forward_classification(&self, batch: BowBatch<B>) -> ClassificationOutput<B> {
        ClassificationOutput::new(self.forward(batch.features), batch.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::review::NUM_CLASSES;
    use crate::ml::InnerBackend;

    #[test]
    fn test_output_shape_and_parameter_count() {
        let device = Default::default();
        let model: Ffnn<InnerBackend> = FfnnConfig::new(10, 4).init(&device);
        let out = model.forward(Tensor::zeros([3, 10], &device));
        assert_eq!(out.dims(), [3, NUM_CLASSES]);
        // W1: 10*4 + 4, W2: 4*5 + 5
        assert_eq!(model.num_params(), 44 + 25);
    }

    #[test]
    fn test_log_probs_exponentiate_to_one() {
        let device = Default::default();
        let model: Ffnn<InnerBackend> = FfnnConfig::new(6, 3).init(&device);
        let features = Tensor::<InnerBackend, 2>::from_floats(
            [[1.0, 0.0, 2.0, 0.0, 0.0, 1.0], [0.0, 3.0, 0.0, 1.0, 0.0, 0.0]],
            &device,
        );
        let sums: Vec<f32> = model
            .log_probs(features)
            .exp()
            .sum_dim(1)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap();
        for s in sums {
            assert!((s - 1.0).abs() < 1e-5);
        }
    }
}
