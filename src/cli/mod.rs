// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and prints results. All work is
// delegated to Layer 2 (application).
//
// Commands:
//   1. `train`    — trains an FFNN or RNN and checkpoints it
//   2. `evaluate` — scores a checkpoint on a labelled file
//   3. `predict`  — rates one text with a checkpoint
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, PredictArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "rating-classifier",
    version = "0.1.0",
    about = "Train feed-forward and recurrent 5-star review classifiers."
)]
pub struct Cli {
    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Predict(args)  => run_predict(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on reviews in: {}", args.train_data);

    let history = TrainUseCase::new(args.into()).execute()?;

    if let Some(epoch) = history.stopped_early_at {
        println!("Stopped early before epoch {epoch}.");
    }
    if let Some((epoch, loss)) = history.best_epoch() {
        println!("Best validation loss {loss:.4} at epoch {epoch}.");
    }
    println!("Training complete. Checkpoint saved.");
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let report = EvaluateUseCase::new(&args.checkpoint_dir, args.batch_size)?
        .evaluate_file(&args.data)?;

    println!(
        "{} reviews | loss={:.4} | accuracy={:.1}%",
        report.examples,
        report.loss,
        report.accuracy * 100.0
    );
    Ok(())
}

fn run_predict(args: PredictArgs) -> Result<()> {
    use crate::application::predict_use_case::PredictUseCase;

    let prediction = PredictUseCase::new(&args.checkpoint_dir)?.predict(&args.text)?;

    println!(
        "\nRating: {} star(s) ({:.1}% confident)",
        prediction.rating.stars(),
        prediction.confidence() * 100.0
    );
    for (label, p) in prediction.probabilities.iter().enumerate() {
        println!("  {} star(s): {:.3}", label + 1, p);
    }
    Ok(())
}
