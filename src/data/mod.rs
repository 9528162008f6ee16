// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from a JSON file of reviews to tensor batches.
//
//   training.json / validation.json
//       │
//       ▼
//   JsonReviewLoader  → reads reviews and star labels
//       │
//       ▼
//   Preprocessor      → cleans text, splits into tokens
//       │
//       ▼
//   Vocabulary        → word → index (built on training data only)
//       │
//       ▼
//   vectorizer        → bag-of-words counts (FFNN)
//                       or index sequences (RNN)
//       │
//       ▼
//   ReviewDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   Bow/SequenceBatcher → stacks samples into tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads labelled reviews from JSON files
pub mod loader;

/// Cleans and tokenises review text
pub mod preprocessor;

/// Word ↔ index mapping with an <UNK> fallback
pub mod vocabulary;

/// Bag-of-words and sequence vectorisation
pub mod vectorizer;

/// Implements Burn's Dataset trait for vectorised samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded shuffle-and-split into train/validation sets
pub mod splitter;
