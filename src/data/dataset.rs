use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One review as a bag-of-words count vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BowSample {
    pub features: Vec<f32>,
    pub label:    usize,
}

/// One review as a sequence of vocabulary indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSample {
    pub token_ids: Vec<u32>,
    pub label:     usize,
}

/// In-memory dataset over any kind of vectorised sample.
pub struct ReviewDataset<T> {
    samples: Vec<T>,
}

impl<T> ReviewDataset<T> {
    pub fn new(samples: Vec<T>) -> Self { Self { samples } }
}

impl<T> Dataset<T> for ReviewDataset<T>
where
    T: Clone + Send + Sync,
{
    fn get(&self, index: usize) -> Option<T> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_get_and_len() {
        let ds = ReviewDataset::new(vec![
            SequenceSample { token_ids: vec![1, 2], label: 0 },
            SequenceSample { token_ids: vec![3],    label: 4 },
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.get(1).unwrap().label, 4);
        assert!(ds.get(2).is_none());
    }
}
