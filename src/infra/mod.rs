// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything a training run leaves on disk:
//
//   checkpoint.rs  — model weights (Burn CompactRecorder),
//                    latest epoch pointer and TrainConfig JSON
//
//   vocab_store.rs — the vocabulary as tokenizer.json, so
//                    resumed runs and inference index words
//                    exactly like the run that trained the weights
//
//   metrics.rs     — per-epoch CSV rows, learning-curve JSON
//                    and the early-stopping rule
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Vocabulary persistence
pub mod vocab_store;

/// Training metrics, learning curves and early stopping
pub mod metrics;
