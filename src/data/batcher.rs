// ============================================================
// Layer 4 — Batchers
// ============================================================
// Implement Burn's Batcher trait to stack vectorised samples
// into tensors.
//
//   BowBatcher:      N × BowSample      → features [N, V]
//   SequenceBatcher: N × SequenceSample → token_ids [N, T]
//                                         mask      [N, T]
//
// Sequences in a batch have different lengths, so they are
// right-padded to the longest one (T). The mask holds 1.0 for
// real tokens and 0.0 for padding; the RNN uses it to skip
// padded steps. T is at least 1 so an empty review still
// yields a valid tensor.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::{BowSample, SequenceSample};

// ─── Batches ──────────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct BowBatch<B: Backend> {
    /// Word counts — shape: [batch_size, vocab_size]
    pub features: Tensor<B, 2>,

    /// Gold labels — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Debug, Clone)]
pub struct SequenceBatch<B: Backend> {
    /// Vocabulary indices — shape: [batch_size, seq_len]
    pub token_ids: Tensor<B, 2, Int>,

    /// 1.0 = real token, 0.0 = padding — shape: [batch_size, seq_len]
    pub mask: Tensor<B, 2>,

    /// Gold labels — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

fn targets_tensor<B: Backend>(labels: &[i32], device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::<B, 1, Int>::from_ints(labels, device)
}

// ─── BowBatcher ───────────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct BowBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> BowBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<BowSample, BowBatch<B>> for BowBatcher<B> {
    fn batch(&self, items: Vec<BowSample>) -> BowBatch<B> {
        let batch_size = items.len();
        let vocab_size = items.first().map_or(0, |s| s.features.len());

        let flat: Vec<f32> = items
            .iter()
            .flat_map(|s| s.features.iter().copied())
            .collect();
        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let features = Tensor::<B, 2>::from_data(
            TensorData::new(flat, [batch_size, vocab_size]),
            &self.device,
        );

        BowBatch {
            features,
            targets: targets_tensor(&labels, &self.device),
        }
    }
}

// ─── SequenceBatcher ──────────────────────────────────────────────────────────
#[derive(Clone, Debug)]
pub struct SequenceBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> SequenceBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<SequenceSample, SequenceBatch<B>> for SequenceBatcher<B> {
    fn batch(&self, items: Vec<SequenceSample>) -> SequenceBatch<B> {
        let batch_size = items.len();
        let seq_len = items
            .iter()
            .map(|s| s.token_ids.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let mut ids  = Vec::with_capacity(batch_size * seq_len);
        let mut mask = Vec::with_capacity(batch_size * seq_len);
        for sample in &items {
            let len = sample.token_ids.len();
            ids.extend(sample.token_ids.iter().map(|&id| id as i32));
            ids.extend(std::iter::repeat(0i32).take(seq_len - len));
            mask.extend(std::iter::repeat(1.0f32).take(len));
            mask.extend(std::iter::repeat(0.0f32).take(seq_len - len));
        }
        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let token_ids = Tensor::<B, 1, Int>::from_ints(ids.as_slice(), &self.device)
            .reshape([batch_size, seq_len]);
        let mask = Tensor::<B, 2>::from_data(
            TensorData::new(mask, [batch_size, seq_len]),
            &self.device,
        );

        SequenceBatch {
            token_ids,
            mask,
            targets: targets_tensor(&labels, &self.device),
        }
    }
}
