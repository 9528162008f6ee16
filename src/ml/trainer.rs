// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One generic train + validation loop drives both models.
//
// Per epoch:
//   1. Ask EarlyStopping whether the last two epochs overfit
//   2. Training phase — the DataLoader reshuffles every epoch;
//      for each minibatch: forward, mean loss, backward and
//      ONE optimiser step
//   3. Validation phase — model.valid() on the inner backend,
//      no gradients, no updates
//   4. Log metrics, save the checkpoint (overwriting the last)
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<..>) for gradients
//   - model.valid() returns the model on InnerBackend
//   - the validation batcher must also use InnerBackend
//
// Reference: Burn Book §5
//            Duchi et al. (2011) AdaGrad, Kingma & Ba (2015) Adam

use anyhow::Result;
use std::{sync::Arc, time::Instant};
use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{AdaGradConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::{ModelKind, OptimizerKind, TokenizedReviews, TrainConfig};
use crate::data::{
    batcher::{BowBatcher, SequenceBatcher},
    dataset::ReviewDataset,
    vectorizer::{to_bow_samples, to_sequence_samples},
    vocabulary::Vocabulary,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{EarlyStopping, EpochMetrics, MetricsLogger, TrainingHistory},
};
use crate::ml::{
    ffnn::FfnnConfig,
    rnn::RnnConfig,
    ClassificationOutput, InnerBackend, RatingClassifier, TrainBackend,
};

/// Running totals over the batches of one pass.
///
/// Losses are weighted by batch size so a short final batch
/// counts per example, not per batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassStats {
    loss_sum: f64,
    correct:  usize,
    total:    usize,
}

impl PassStats {
    pub fn update<B: Backend>(&mut self, output: &ClassificationOutput<B>) {
        let n = output.batch_size();
        self.loss_sum += output.loss_value() * n as f64;
        self.correct  += output.correct();
        self.total    += n;
    }

    pub fn mean_loss(&self) -> f64 {
        if self.total > 0 { self.loss_sum / self.total as f64 } else { f64::NAN }
    }

    pub fn accuracy(&self) -> f64 {
        if self.total > 0 { self.correct as f64 / self.total as f64 } else { 0.0 }
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

/// Run a model over every batch of a loader without updating it.
pub fn evaluate<B, M>(model: &M, loader: &dyn DataLoader<M::Batch>) -> PassStats
where
    B: Backend,
    M: RatingClassifier<B>,
{
    let mut stats = PassStats::default();
    for batch in loader.iter() {
        stats.update(&model.forward_classification(batch));
    }
    stats
}

/// Epoch range and switches of one `fit` call
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub first_epoch:    usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub early_stopping: EarlyStopping,
    /// Epochs recorded before a resume; only consulted by early stopping
    pub previous:       TrainingHistory,
}

/// Train `model` with `optim`, validating and checkpointing every epoch.
pub fn fit<B, M, O>(
    mut model:    M,
    mut optim:    O,
    train_loader: Arc<dyn DataLoader<<M as RatingClassifier<B>>::Batch>>,
    valid_loader: Arc<dyn DataLoader<<M::InnerModule as RatingClassifier<B::InnerBackend>>::Batch>>,
    options:      &FitOptions,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<TrainingHistory>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + RatingClassifier<B>,
    M::InnerModule: RatingClassifier<B::InnerBackend>,
    O: Optimizer<M, B>,
{
    let mut history = TrainingHistory::default();
    let mut seen    = options.previous.clone();
    let last_epoch  = options.first_epoch + options.epochs - 1;

    for epoch in options.first_epoch..=last_epoch {
        if options.early_stopping.should_stop(&seen) {
            tracing::info!(
                "Early stopping before epoch {}: validation loss rose while training loss fell",
                epoch
            );
            history.stopped_early_at = Some(epoch);
            break;
        }

        // ── Training phase ────────────────────────────────────────────────────
        let started = Instant::now();
        tracing::info!("Training started for epoch {}", epoch);

        let mut train = PassStats::default();
        for batch in train_loader.iter() {
            let output = model.forward_classification(batch);
            train.update(&output);

            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(options.lr, model, grads);
        }

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let valid = evaluate::<B::InnerBackend, _>(&model_valid, valid_loader.as_ref());

        let m = EpochMetrics::new(
            epoch,
            train.mean_loss(),
            train.accuracy(),
            valid.mean_loss(),
            valid.accuracy(),
            started.elapsed().as_secs_f64(),
        );

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | train_acc={:.1}% | val_loss={:.4} | val_acc={:.1}% | {:.1}s",
            epoch, last_epoch, m.train_loss, m.train_accuracy * 100.0,
            m.val_loss, m.val_accuracy * 100.0, m.seconds,
        );

        metrics.log(&m)?;
        history.push(&m);
        seen.push(&m);

        ckpt_manager.save_model(&model_valid, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    Ok(history)
}

/// Build the configured model and optimiser and train it.
pub fn run_training(
    cfg:          &TrainConfig,
    vocab:        &Vocabulary,
    train_docs:   &TokenizedReviews,
    val_docs:     &TokenizedReviews,
    resume:       bool,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<TrainingHistory> {
    let device = <InnerBackend as Backend>::Device::default();
    tracing::info!("Using device: {:?}", device);
    TrainBackend::seed(cfg.seed);

    let (first_epoch, previous) = if resume {
        (ckpt_manager.latest_epoch()? + 1, metrics.load_history()?)
    } else {
        (1, TrainingHistory::default())
    };
    let options = FitOptions {
        first_epoch,
        epochs:         cfg.epochs,
        lr:             cfg.lr,
        early_stopping: EarlyStopping::new(cfg.early_stopping),
        previous,
    };

    match cfg.model {
        ModelKind::Ffnn => {
            let model = FfnnConfig::new(vocab.len(), cfg.hidden_dim).init::<TrainBackend>(&device);
            let model = if resume { ckpt_manager.load_model(model, &device)? } else { model };

            let train_loader = build_loader(
                BowBatcher::<TrainBackend>::new(device.clone()),
                to_bow_samples(train_docs, vocab),
                cfg.batch_size,
                Some(cfg.seed),
            );
            let valid_loader = build_loader(
                BowBatcher::<InnerBackend>::new(device.clone()),
                to_bow_samples(val_docs, vocab),
                cfg.batch_size,
                None,
            );
            fit_with_optimizer(cfg, model, train_loader, valid_loader, &options, ckpt_manager, metrics)
        }
        ModelKind::Rnn => {
            let model = RnnConfig::new(vocab.len(), cfg.embedding_dim, cfg.hidden_dim)
                .init::<TrainBackend>(&device);
            let model = if resume { ckpt_manager.load_model(model, &device)? } else { model };

            let train_loader = build_loader(
                SequenceBatcher::<TrainBackend>::new(device.clone()),
                to_sequence_samples(train_docs, vocab, cfg.max_seq_len),
                cfg.batch_size,
                Some(cfg.seed),
            );
            let valid_loader = build_loader(
                SequenceBatcher::<InnerBackend>::new(device.clone()),
                to_sequence_samples(val_docs, vocab, cfg.max_seq_len),
                cfg.batch_size,
                None,
            );
            fit_with_optimizer(cfg, model, train_loader, valid_loader, &options, ckpt_manager, metrics)
        }
    }
}

/// Data loader over in-memory samples; shuffled every epoch when a seed is given
pub fn build_loader<I, O, T>(
    batcher:    T,
    samples:    Vec<I>,
    batch_size: usize,
    shuffle:    Option<u64>,
) -> Arc<dyn DataLoader<O>>
where
    I: Clone + Send + Sync + std::fmt::Debug + 'static,
    O: Clone + Send + Sync + std::fmt::Debug + 'static,
    T: Batcher<I, O> + Clone + 'static,
{
    let builder = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1);
    let builder = match shuffle {
        Some(seed) => builder.shuffle(seed),
        None => builder,
    };
    builder.build(ReviewDataset::new(samples))
}

fn fit_with_optimizer<M>(
    cfg:          &TrainConfig,
    model:        M,
    train_loader: Arc<dyn DataLoader<<M as RatingClassifier<TrainBackend>>::Batch>>,
    valid_loader: Arc<dyn DataLoader<<M::InnerModule as RatingClassifier<InnerBackend>>::Batch>>,
    options:      &FitOptions,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
) -> Result<TrainingHistory>
where
    M: AutodiffModule<TrainBackend> + RatingClassifier<TrainBackend>,
    M::InnerModule: RatingClassifier<InnerBackend>,
{
    tracing::info!("Model ready: {} trainable parameters", model.num_params());

    match cfg.optimizer {
        OptimizerKind::Adagrad => {
            let optim = AdaGradConfig::new().init::<TrainBackend, M>();
            fit(model, optim, train_loader, valid_loader, options, ckpt_manager, metrics)
        }
        OptimizerKind::Adam => {
            let optim = AdamConfig::new().with_epsilon(1e-8).init::<TrainBackend, M>();
            fit(model, optim, train_loader, valid_loader, options, ckpt_manager, metrics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::BowSample;
    use crate::ml::ffnn::Ffnn;

    fn separable_samples(n: usize) -> Vec<BowSample> {
        // Feature i lights up for class i
        (0..n)
            .map(|i| {
                let label = i % 5;
                let mut features = vec![0.0; 5];
                features[label] = 3.0;
                BowSample { features, label }
            })
            .collect()
    }

    #[test]
    fn test_pass_stats_weight_by_batch_size() {
        let device = Default::default();
        let model: Ffnn<InnerBackend> = FfnnConfig::new(5, 4).init(&device);
        let loader = build_loader(
            BowBatcher::<InnerBackend>::new(device),
            separable_samples(7),
            3,
            None,
        );
        let stats = evaluate(&model, loader.as_ref());
        assert_eq!(stats.total(), 7);
        assert!(stats.mean_loss().is_finite());
        assert!((0.0..=1.0).contains(&stats.accuracy()));
    }

    #[test]
    fn test_empty_pass_has_nan_loss() {
        let stats = PassStats::default();
        assert!(stats.mean_loss().is_nan());
        assert_eq!(stats.accuracy(), 0.0);
    }

    #[test]
    fn test_fit_learns_a_separable_problem() {
        let tmp     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path());
        let metrics = MetricsLogger::new(tmp.path(), false).unwrap();
        let device  = <InnerBackend as Backend>::Device::default();
        TrainBackend::seed(3);

        let model = FfnnConfig::new(5, 16).init::<TrainBackend>(&device);
        let train_loader = build_loader(
            BowBatcher::<TrainBackend>::new(device.clone()),
            separable_samples(80),
            16,
            Some(3),
        );
        let valid_loader = build_loader(
            BowBatcher::<InnerBackend>::new(device.clone()),
            separable_samples(20),
            16,
            None,
        );
        let options = FitOptions {
            first_epoch:    1,
            epochs:         15,
            lr:             0.05,
            early_stopping: EarlyStopping::new(false),
            previous:       TrainingHistory::default(),
        };
        let optim = AdamConfig::new().init::<TrainBackend, Ffnn<TrainBackend>>();
        let history = fit(model, optim, train_loader, valid_loader, &options, &ckpt, &metrics).unwrap();

        assert_eq!(history.len(), 15);
        assert!(history.train_loss[14] < history.train_loss[0]);
        assert!(history.val_accuracy[14] > 0.9);
        assert_eq!(ckpt.latest_epoch().unwrap(), 15);
    }

    #[test]
    fn test_fit_stops_before_first_epoch_when_resumed_run_overfit() {
        let tmp     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path());
        let metrics = MetricsLogger::new(tmp.path(), false).unwrap();
        let device  = <InnerBackend as Backend>::Device::default();

        // Epochs 1-2 of an earlier run: train loss fell, val loss rose
        let mut previous = TrainingHistory::default();
        previous.push(&EpochMetrics::new(1, 1.0, 0.4, 1.1, 0.4, 1.0));
        previous.push(&EpochMetrics::new(2, 0.8, 0.5, 1.2, 0.4, 1.0));

        let model = FfnnConfig::new(5, 4).init::<TrainBackend>(&device);
        let train_loader = build_loader(
            BowBatcher::<TrainBackend>::new(device.clone()),
            separable_samples(10),
            5,
            Some(1),
        );
        let valid_loader = build_loader(
            BowBatcher::<InnerBackend>::new(device.clone()),
            separable_samples(5),
            5,
            None,
        );
        let options = FitOptions {
            first_epoch:    3,
            epochs:         2,
            lr:             0.01,
            early_stopping: EarlyStopping::new(true),
            previous,
        };
        let optim = AdamConfig::new().init::<TrainBackend, Ffnn<TrainBackend>>();
        let history = fit(model, optim, train_loader, valid_loader, &options, &ckpt, &metrics).unwrap();

        assert_eq!(history.stopped_early_at, Some(3));
        assert_eq!(history.len(), 0);
        assert!(!ckpt.has_checkpoint());
    }

    #[test]
    fn test_fit_without_early_stopping_ignores_overfit_history() {
        let tmp     = tempfile::tempdir().unwrap();
        let ckpt    = CheckpointManager::new(tmp.path());
        let metrics = MetricsLogger::new(tmp.path(), false).unwrap();
        let device  = <InnerBackend as Backend>::Device::default();

        let mut previous = TrainingHistory::default();
        previous.push(&EpochMetrics::new(1, 1.0, 0.4, 1.1, 0.4, 1.0));
        previous.push(&EpochMetrics::new(2, 0.8, 0.5, 1.2, 0.4, 1.0));

        let model = FfnnConfig::new(5, 4).init::<TrainBackend>(&device);
        let train_loader = build_loader(
            BowBatcher::<TrainBackend>::new(device.clone()),
            separable_samples(10),
            5,
            Some(1),
        );
        let valid_loader = build_loader(
            BowBatcher::<InnerBackend>::new(device.clone()),
            separable_samples(5),
            5,
            None,
        );
        let options = FitOptions {
            first_epoch:    3,
            epochs:         1,
            lr:             0.01,
            early_stopping: EarlyStopping::new(false),
            previous,
        };
        let optim = AdamConfig::new().init::<TrainBackend, Ffnn<TrainBackend>>();
        let history = fit(model, optim, train_loader, valid_loader, &options, &ckpt, &metrics).unwrap();

        assert_eq!(history.stopped_early_at, None);
        assert_eq!(history.epochs, vec![3]);
        assert_eq!(ckpt.latest_epoch().unwrap(), 3);
    }
}
