// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the other layers to accomplish one
// goal each: training, evaluating a checkpoint, or rating a
// single text.
//
// Rules for this layer:
//   - No model math here (Layer 5)
//   - No printing here (Layer 1)
//   - No direct file formats here (Layers 4 and 6)
//
// Reference: Clean Architecture pattern

// The training workflow
pub mod train_use_case;

// Scores a checkpoint on a labelled JSON file
pub mod evaluate_use_case;

// Rates one piece of text with a checkpoint
pub mod predict_use_case;
