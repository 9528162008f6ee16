// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds a trained model from the checkpoint directory:
//   train_config.json → architecture
//   tokenizer.json    → vocabulary (sizes the input layer)
//   model.mpk         → weights
// and then classifies single texts or scores a labelled set.

use anyhow::Result;
use burn::{data::dataloader::batcher::Batcher, prelude::*, tensor::activation::softmax};

use crate::application::train_use_case::{ModelKind, TokenizedReviews, TrainConfig};
use crate::data::{
    batcher::{BowBatcher, SequenceBatcher},
    dataset::{BowSample, SequenceSample},
    preprocessor::Preprocessor,
    vectorizer::{bag_of_words, sequence, to_bow_samples, to_sequence_samples},
    vocabulary::Vocabulary,
};
use crate::domain::review::{Prediction, Rating, Review, NUM_CLASSES};
use crate::domain::traits::RatingPredictor;
use crate::infra::{checkpoint::CheckpointManager, vocab_store::VocabStore};
use crate::ml::{
    ffnn::{Ffnn, FfnnConfig},
    rnn::{Rnn, RnnConfig},
    trainer::{build_loader, evaluate, PassStats},
    InnerBackend,
};

type InferBackend = InnerBackend;

enum LoadedModel {
    Ffnn(Ffnn<InferBackend>),
    Rnn(Rnn<InferBackend>),
}

/// Loss and accuracy of a checkpoint on a labelled set
#[derive(Debug, Clone, Copy)]
pub struct EvaluationReport {
    pub examples: usize,
    pub loss:     f64,
    pub accuracy: f64,
}

impl From<PassStats> for EvaluationReport {
    fn from(stats: PassStats) -> Self {
        Self { examples: stats.total(), loss: stats.mean_loss(), accuracy: stats.accuracy() }
    }
}

pub struct Inferencer {
    model:        LoadedModel,
    vocab:        Vocabulary,
    preprocessor: Preprocessor,
    max_seq_len:  Option<usize>,
    device:       <InferBackend as Backend>::Device,
}

impl Inferencer {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = <InferBackend as Backend>::Device::default();
        let cfg    = ckpt_manager.load_config()?;
        let vocab  = VocabStore::new(ckpt_manager.dir()).load()?;

        let model = match cfg.model {
            ModelKind::Ffnn => {
                let model = FfnnConfig::new(vocab.len(), cfg.hidden_dim).init(&device);
                LoadedModel::Ffnn(ckpt_manager.load_model(model, &device)?)
            }
            ModelKind::Rnn => {
                let model = RnnConfig::new(vocab.len(), cfg.embedding_dim, cfg.hidden_dim).init(&device);
                LoadedModel::Rnn(ckpt_manager.load_model(model, &device)?)
            }
        };
        tracing::info!("{:?} model loaded from checkpoint", cfg.model);

        Ok(Self::new(model, vocab, &cfg, device))
    }

    fn new(
        model:  LoadedModel,
        vocab:  Vocabulary,
        cfg:    &TrainConfig,
        device: <InferBackend as Backend>::Device,
    ) -> Self {
        Self {
            model,
            vocab,
            preprocessor: cfg.preprocessor(),
            max_seq_len:  cfg.max_seq_len,
            device,
        }
    }

    /// Score a labelled set, `batch_size` reviews at a time.
    pub fn evaluate(&self, reviews: &[Review], batch_size: usize) -> Result<EvaluationReport> {
        let docs: TokenizedReviews = reviews
            .iter()
            .map(|r| (self.preprocessor.tokenize(&r.text), r.rating))
            .collect();

        let stats = match &self.model {
            LoadedModel::Ffnn(model) => {
                let loader = build_loader(
                    BowBatcher::<InferBackend>::new(self.device.clone()),
                    to_bow_samples(&docs, &self.vocab),
                    batch_size,
                    None,
                );
                evaluate(model, loader.as_ref())
            }
            LoadedModel::Rnn(model) => {
                let loader = build_loader(
                    SequenceBatcher::<InferBackend>::new(self.device.clone()),
                    to_sequence_samples(&docs, &self.vocab, self.max_seq_len),
                    batch_size,
                    None,
                );
                evaluate(model, loader.as_ref())
            }
        };
        Ok(stats.into())
    }
}

impl RatingPredictor for Inferencer {
    fn predict(&self, text: &str) -> Result<Prediction> {
        let tokens = self.preprocessor.tokenize(text);
        tracing::debug!("{} tokens after preprocessing", tokens.len());

        let logits = match &self.model {
            LoadedModel::Ffnn(model) => {
                let batch = BowBatcher::<InferBackend>::new(self.device.clone()).batch(vec![BowSample {
                    features: bag_of_words(&tokens, &self.vocab),
                    label:    0,
                }]);
                model.forward(batch.features)
            }
            LoadedModel::Rnn(model) => {
                let batch = SequenceBatcher::<InferBackend>::new(self.device.clone()).batch(vec![SequenceSample {
                    token_ids: sequence(&tokens, &self.vocab, self.max_seq_len),
                    label:     0,
                }]);
                model.forward(batch.token_ids, batch.mask)
            }
        };

        let probs: Vec<f32> = softmax(logits, 1)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("Cannot read model output: {e:?}"))?;

        let mut probabilities = [0.0f32; NUM_CLASSES];
        probabilities.copy_from_slice(&probs[..NUM_CLASSES]);

        let best = probabilities
            .iter()
            .enumerate()
            .fold(0, |best, (i, &p)| if p > probabilities[best] { i } else { best });

        Ok(Prediction { rating: Rating::from_label(best)?, probabilities })
    }
}
