// ============================================================
// Layer 4 — Review Loader
// ============================================================
// Loads labelled reviews from a JSON file.
//
// Expected file layout (one array, one object per review):
//
//   [
//     { "text": "The pasta was cold ...", "stars": 2.0 },
//     { "text": "Best brunch in town",   "stars": 5.0 }
//   ]
//
// Extra fields on each object are ignored, so raw dataset
// dumps with ids, dates etc. load without preprocessing.
//
// Reference: serde_json documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::PathBuf};

use crate::domain::review::{Rating, Review};
use crate::domain::traits::ReviewSource;

/// One entry exactly as it appears on disk
#[derive(Debug, Deserialize)]
struct RawReview {
    text:  String,
    stars: f64,
}

/// Loads reviews from a single JSON file.
/// Implements the ReviewSource trait from Layer 3.
pub struct JsonReviewLoader {
    path: PathBuf,
}

impl JsonReviewLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReviewSource for JsonReviewLoader {
    fn load_all(&self) -> Result<Vec<Review>> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read reviews from '{}'", self.path.display()))?;

        let raw: Vec<RawReview> = serde_json::from_str(&json)
            .with_context(|| format!("'{}' is not a JSON array of reviews", self.path.display()))?;

        let total   = raw.len();
        let reviews = parse_reviews(raw);
        if reviews.len() < total {
            tracing::warn!(
                "Skipped {} of {} entries in '{}' with an invalid star rating",
                total - reviews.len(),
                total,
                self.path.display()
            );
        }

        tracing::info!("Loaded {} reviews from '{}'", reviews.len(), self.path.display());
        Ok(reviews)
    }
}

/// Convert raw entries into domain reviews, dropping the ones
/// whose star value is not a whole number in 1..=5.
fn parse_reviews(raw: Vec<RawReview>) -> Vec<Review> {
    raw.into_iter()
        .filter_map(|r| match Rating::from_stars(r.stars) {
            Ok(rating) => Some(Review::new(r.text, rating)),
            Err(e) => {
                tracing::debug!("Dropping review: {e}");
                None
            }
        })
        .collect()
}
