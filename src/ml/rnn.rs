// ============================================================
// Layer 5 — Recurrent Rating Classifier
// ============================================================
// An Elman RNN over the review's token sequence:
//
//   x_t = Embedding(token_t)                       [batch, e]
//   h_t = tanh(W_ih · x_t + W_hh · h_{t-1})        [batch, h]
//   s   = Σ_t h_t                                  [batch, h]
//   logits = W_out · s                             [batch, 5]
//
// Burn has no vanilla RNN layer, so the cell is unrolled here
// with two Linear layers. W_ih · x_t is computed for every step
// at once before the loop; only the recurrent part is sequential.
//
// Padding: on a padded step (mask = 0) the hidden state is
// carried over unchanged and nothing is added to the sum, so a
// padded review scores exactly like the unpadded one.
//
// Reference: Elman (1990) Finding Structure in Time
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{Embedding, EmbeddingConfig, Linear, LinearConfig},
    prelude::*,
    tensor::activation::{log_softmax, tanh},
};

use crate::data::batcher::SequenceBatch;
use crate::ml::{ClassificationOutput, RatingClassifier};

#[derive(Config, Debug)]
pub struct RnnConfig {
    /// Vocabulary size including <UNK>
    pub vocab_size:    usize,
    pub embedding_dim: usize,
    pub hidden_dim:    usize,
    #[config(default = 5)]
    pub num_classes:   usize,
}

impl RnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Rnn<B> {
        Rnn {
            embedding:        EmbeddingConfig::new(self.vocab_size, self.embedding_dim).init(device),
            input_to_hidden:  LinearConfig::new(self.embedding_dim, self.hidden_dim).init(device),
            hidden_to_hidden: LinearConfig::new(self.hidden_dim, self.hidden_dim)
                .with_bias(false)
                .init(device),
            output:           LinearConfig::new(self.hidden_dim, self.num_classes).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct Rnn<B: Backend> {
    embedding:        Embedding<B>,
    input_to_hidden:  Linear<B>,
    hidden_to_hidden: Linear<B>,
    output:           Linear<B>,
}

impl<B: Backend> Rnn<B> {
    /// token_ids: [batch, seq_len], mask: [batch, seq_len] → logits: [batch, 5]
    pub fn forward(&self, token_ids: Tensor<B, 2, Int>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, seq_len] = token_ids.dims();

        let embedded = self.embedding.forward(token_ids);       // [batch, seq, e]
        let projected = self.input_to_hidden.forward(embedded); // [batch, seq, h]
        let [_, _, hidden_dim] = projected.dims();
        let device = projected.device();

        let mut hidden = Tensor::<B, 2>::zeros([batch_size, hidden_dim], &device);
        let mut summed = Tensor::<B, 2>::zeros([batch_size, hidden_dim], &device);

        for step in 0..seq_len {
            let x_t = projected
                .clone()
                .slice([0..batch_size, step..step + 1, 0..hidden_dim])
                .reshape([batch_size, hidden_dim]);
            let keep = mask
                .clone()
                .slice([0..batch_size, step..step + 1])
                .expand([batch_size, hidden_dim]);

            let candidate = tanh(x_t + self.hidden_to_hidden.forward(hidden.clone()));

            summed = summed + candidate.clone() * keep.clone();
            hidden = hidden.clone() + (candidate - hidden) * keep;
        }

        self.output.forward(summed)
    }

    pub fn log_probs(&self, token_ids: Tensor<B, 2, Int>, mask: Tensor<B, 2>) -> Tensor<B, 2> {
        log_softmax(self.forward(token_ids, mask), 1)
    }
}

impl<B: Backend> RatingClassifier<B> for Rnn<B> {
    type Batch = SequenceBatch<B>;

    fn forward_classification(&self, batch: SequenceBatch<B>) -> ClassificationOutput<B> {
        ClassificationOutput::new(self.forward(batch.token_ids, batch.mask), batch.targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{batcher::SequenceBatcher, dataset::SequenceSample};
    use crate::ml::InnerBackend;
    use burn::data::dataloader::batcher::Batcher;

    fn logits_of(model: &Rnn<InnerBackend>, batch: SequenceBatch<InnerBackend>) -> Vec<f32> {
        model
            .forward(batch.token_ids, batch.mask)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .unwrap()
    }

    #[test]
    fn test_output_shape() {
        let device = Default::default();
        let model: Rnn<InnerBackend> = RnnConfig::new(20, 8, 6).init(&device);
        let batch = SequenceBatcher::<InnerBackend>::new(device).batch(vec![
            SequenceSample { token_ids: vec![1, 2, 3], label: 0 },
            SequenceSample { token_ids: vec![4],       label: 1 },
        ]);
        let out = model.forward(batch.token_ids, batch.mask);
        assert_eq!(out.dims(), [2, 5]);
    }

    #[test]
    fn test_padding_does_not_change_scores() {
        let device: <InnerBackend as Backend>::Device = Default::default();
        let model: Rnn<InnerBackend> = RnnConfig::new(20, 8, 6).init(&device);
        let batcher = SequenceBatcher::<InnerBackend>::new(device);

        let short = SequenceSample { token_ids: vec![7, 3], label: 0 };
        let long  = SequenceSample { token_ids: vec![1, 2, 3, 4, 5], label: 0 };

        let alone  = logits_of(&model, batcher.batch(vec![short.clone()]));
        let padded = logits_of(&model, batcher.batch(vec![short, long]));

        for (a, b) in alone.iter().zip(&padded[..5]) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn test_empty_review_scores_output_bias_only() {
        let device: <InnerBackend as Backend>::Device = Default::default();
        let model: Rnn<InnerBackend> = RnnConfig::new(5, 4, 3).init(&device);
        let batcher = SequenceBatcher::<InnerBackend>::new(device);
        let a = logits_of(&model, batcher.batch(vec![SequenceSample { token_ids: vec![], label: 0 }]));
        let b = logits_of(&model, batcher.batch(vec![SequenceSample { token_ids: vec![], label: 3 }]));
        assert_eq!(a, b);
    }
}
