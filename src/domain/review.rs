// ============================================================
// Layer 3 — Review Domain Types
// ============================================================
// A review is a piece of free text together with the number
// of stars (1–5) its author gave. The classifiers never see
// stars directly — they predict a label in 0..=4, which is
// simply `stars - 1`.
//
// Example:
//   text:   "Great food, terrible parking"
//   stars:  4     →   Rating(3)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Number of output classes of every classifier (one per star)
pub const NUM_CLASSES: usize = 5;

/// A class label in `0..NUM_CLASSES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rating(u8);

impl Rating {
    /// Build a rating from a zero-based class label
    pub fn from_label(label: usize) -> Result<Self> {
        if label >= NUM_CLASSES {
            bail!("label {label} is outside 0..{NUM_CLASSES}");
        }
        Ok(Self(label as u8))
    }

    /// Build a rating from a star count as found in the data files.
    /// Stars arrive as JSON numbers, so `4.0` is accepted but `4.5` is not.
    pub fn from_stars(stars: f64) -> Result<Self> {
        if stars.fract() != 0.0 || !(1.0..=NUM_CLASSES as f64).contains(&stars) {
            bail!("stars value {stars} is not an integer in 1..={NUM_CLASSES}");
        }
        Self::from_label(stars as usize - 1)
    }

    pub fn label(self) -> usize {
        self.0 as usize
    }

    pub fn stars(self) -> usize {
        self.0 as usize + 1
    }
}

/// A single labelled review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// The raw review text, before tokenisation
    pub text: String,

    /// The gold rating
    pub rating: Rating,
}

impl Review {
    pub fn new(text: impl Into<String>, rating: Rating) -> Self {
        Self { text: text.into(), rating }
    }
}

/// The output of a classifier for one review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// The arg-max class
    pub rating: Rating,

    /// Softmax probability of every class, indexed by label
    pub probabilities: [f32; NUM_CLASSES],
}

impl Prediction {
    /// Probability assigned to the predicted class
    pub fn confidence(&self) -> f32 {
        self.probabilities[self.rating.label()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_map_to_zero_based_labels() {
        assert_eq!(Rating::from_stars(1.0).unwrap().label(), 0);
        assert_eq!(Rating::from_stars(5.0).unwrap().label(), 4);
        assert_eq!(Rating::from_stars(3.0).unwrap().stars(), 3);
    }

    #[test]
    fn test_rejects_out_of_range_stars() {
        assert!(Rating::from_stars(0.0).is_err());
        assert!(Rating::from_stars(6.0).is_err());
        assert!(Rating::from_stars(2.5).is_err());
        assert!(Rating::from_label(5).is_err());
    }

    #[test]
    fn test_confidence_reads_predicted_class() {
        let p = Prediction {
            rating:        Rating::from_label(2).unwrap(),
            probabilities: [0.1, 0.1, 0.6, 0.1, 0.1],
        };
        assert!((p.confidence() - 0.6).abs() < 1e-6);
    }
}
