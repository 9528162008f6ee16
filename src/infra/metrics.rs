// ============================================================
// Layer 6 — Metrics, Learning Curves and Early Stopping
// ============================================================
// Records training metrics after each epoch.
//
//   metrics.csv   — one row per epoch, appended while resuming
//   history.json  — the four learning curves of the current
//                   run, ready for any plotting tool
//
// Example CSV output:
//   epoch,train_loss,train_acc,val_loss,val_acc,seconds
//   1,1.482310,0.351250,1.401220,0.393750,4.210000
//   2,1.281455,0.452500,1.355918,0.412500,4.180000
//
// How to read the metrics:
//   - train_loss should fall every epoch
//   - val_loss rising while train_loss falls → overfitting,
//     which is exactly what EarlyStopping watches for
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use serde::{Deserialize, Serialize};

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1, continues after a resume)
    pub epoch: usize,

    /// Mean negative log-likelihood per training example
    pub train_loss: f64,

    /// Fraction of training examples classified correctly
    /// during the epoch (with the weights of that moment)
    pub train_accuracy: f64,

    /// Mean negative log-likelihood per validation example
    pub val_loss: f64,

    pub val_accuracy: f64,

    /// Wall-clock time of the epoch
    pub seconds: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:          usize,
        train_loss:     f64,
        train_accuracy: f64,
        val_loss:       f64,
        val_accuracy:   f64,
        seconds:        f64,
    ) -> Self {
        Self { epoch, train_loss, train_accuracy, val_loss, val_accuracy, seconds }
    }
}

const CSV_HEADER: &str = "epoch,train_loss,train_acc,val_loss,val_acc,seconds";

fn parse_row(line: &str) -> Result<EpochMetrics> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        bail!("expected 6 columns, found {}", fields.len());
    }
    let num = |i: usize| -> Result<f64> {
        fields[i]
            .parse::<f64>()
            .with_context(|| format!("'{}' is not a number", fields[i]))
    };
    Ok(EpochMetrics::new(
        fields[0].parse().with_context(|| format!("'{}' is not an epoch", fields[0]))?,
        num(1)?,
        num(2)?,
        num(3)?,
        num(4)?,
        num(5)?,
    ))
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    ///
    /// A resumed run appends to an existing CSV; otherwise the
    /// file is recreated with a fresh header.
    pub fn new(dir: impl Into<PathBuf>, resume: bool) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        if !resume || !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{CSV_HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Read back every epoch recorded so far.
    pub fn load_history(&self) -> Result<TrainingHistory> {
        let csv = fs::read_to_string(&self.csv_path)
            .with_context(|| format!("Cannot read '{}'", self.csv_path.display()))?;

        let mut history = TrainingHistory::default();
        for (line_no, line) in csv.lines().enumerate().skip(1) {
            if line.trim().is_empty() {
                continue;
            }
            let m = parse_row(line).with_context(|| {
                format!("Bad row {} in '{}'", line_no + 1, self.csv_path.display())
            })?;
            history.push(&m);
        }
        Ok(history)
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.train_loss,
            m.train_accuracy,
            m.val_loss,
            m.val_accuracy,
            m.seconds,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.4}, val_loss={:.4}",
            m.epoch,
            m.train_loss,
            m.val_loss,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── TrainingHistory ──────────────────────────────────────────────────────────
/// Learning curves of one training run, indexed by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    pub epochs:              Vec<usize>,
    pub train_loss:          Vec<f64>,
    pub train_accuracy:      Vec<f64>,
    pub val_loss:            Vec<f64>,
    pub val_accuracy:        Vec<f64>,
    /// Set when the run ended early instead of finishing all epochs
    pub stopped_early_at:    Option<usize>,
}

impl TrainingHistory {
    pub fn push(&mut self, m: &EpochMetrics) {
        self.epochs.push(m.epoch);
        self.train_loss.push(m.train_loss);
        self.train_accuracy.push(m.train_accuracy);
        self.val_loss.push(m.val_loss);
        self.val_accuracy.push(m.val_accuracy);
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    /// Epoch with the lowest validation loss, if any
    pub fn best_epoch(&self) -> Option<(usize, f64)> {
        self.epochs
            .iter()
            .copied()
            .zip(self.val_loss.iter().copied())
            .fold(None, |best: Option<(usize, f64)>, (epoch, loss)| match best {
                Some((_, best_loss)) if best_loss <= loss => best,
                _ => Some((epoch, loss)),
            })
    }

    /// Write the curves as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("Cannot write history to '{}'", path.display()))?;
        Ok(())
    }
}

// ─── EarlyStopping ────────────────────────────────────────────────────────────
/// Stops training once the model starts to overfit.
///
/// Checked before each epoch against the last two recorded
/// epochs, including those of the run a checkpoint was resumed
/// from. Training stops when all three hold:
///   - the last training loss is below the last validation loss
///   - training loss went down
///   - validation loss went up
#[derive(Debug, Clone, Copy)]
pub struct EarlyStopping {
    enabled: bool,
}

impl EarlyStopping {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn should_stop(&self, history: &TrainingHistory) -> bool {
        if !self.enabled || history.len() < 2 {
            return false;
        }
        let n = history.len();
        let (train_prev, train_last) = (history.train_loss[n - 2], history.train_loss[n - 1]);
        let (val_prev,   val_last)   = (history.val_loss[n - 2],   history.val_loss[n - 1]);

        train_last < val_last && train_last < train_prev && val_last > val_prev
    }
}
