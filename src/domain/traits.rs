// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer talks to these traits, never to the
// concrete JSON loader or the Burn-backed inferencer.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::review::{Prediction, Review};

// ─── ReviewSource ─────────────────────────────────────────────────────────────
/// Any component that can produce labelled reviews.
///
/// Implementations:
///   - JsonReviewLoader → reads a JSON array of {text, stars}
pub trait ReviewSource {
    /// Load every review this source holds.
    fn load_all(&self) -> Result<Vec<Review>>;
}

// ─── RatingPredictor ──────────────────────────────────────────────────────────
/// Any component that can assign a star rating to a text.
///
/// Implementations:
///   - Inferencer → runs a trained FFNN or RNN checkpoint
pub trait RatingPredictor {
    fn predict(&self, text: &str) -> Result<Prediction>;
}
