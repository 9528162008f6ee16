// ============================================================
// Layer 4 — Vectorizer
// ============================================================
// Converts token lists into the numeric inputs of each model:
//
//   FFNN → bag of words: a Vec<f32> of length |vocab| where
//          entry i counts how often word i occurs
//   RNN  → sequence: the vocabulary index of every token,
//          in order, optionally truncated
//
// Example with vocab {bad:0, food:1, good:2, <UNK>:3}:
//   ["good", "good", "pizza"]
//     bag of words → [0, 0, 2, 1]
//     sequence     → [2, 2, 3]

use crate::data::dataset::{BowSample, SequenceSample};
use crate::data::vocabulary::Vocabulary;
use crate::domain::review::Rating;

/// Count vector over the vocabulary
pub fn bag_of_words(tokens: &[String], vocab: &Vocabulary) -> Vec<f32> {
    let mut vector = vec![0.0f32; vocab.len()];
    for token in tokens {
        vector[vocab.index_of(token) as usize] += 1.0;
    }
    vector
}

/// Index sequence, cut to `max_len` tokens when a limit is set
pub fn sequence(tokens: &[String], vocab: &Vocabulary, max_len: Option<usize>) -> Vec<u32> {
    let limit = max_len.unwrap_or(usize::MAX);
    tokens.iter().take(limit).map(|t| vocab.index_of(t)).collect()
}

pub fn to_bow_samples(documents: &[(Vec<String>, Rating)], vocab: &Vocabulary) -> Vec<BowSample> {
    documents
        .iter()
        .map(|(tokens, rating)| BowSample {
            features: bag_of_words(tokens, vocab),
            label:    rating.label(),
        })
        .collect()
}

pub fn to_sequence_samples(
    documents: &[(Vec<String>, Rating)],
    vocab:     &Vocabulary,
    max_len:   Option<usize>,
) -> Vec<SequenceSample> {
    documents
        .iter()
        .map(|(tokens, rating)| SequenceSample {
            token_ids: sequence(tokens, vocab, max_len),
            label:     rating.label(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn vocab() -> Vocabulary {
        let corpus = [toks("good food"), toks("bad food")];
        Vocabulary::from_documents(corpus.iter().map(Vec::as_slice)).unwrap()
    }

    #[test]
    fn test_bag_of_words_counts_with_unk() {
        let v = vocab();
        assert_eq!(bag_of_words(&toks("good good pizza"), &v), vec![0.0, 0.0, 2.0, 1.0]);
    }

    #[test]
    fn test_bag_of_words_of_empty_document_is_zero() {
        let v = vocab();
        assert_eq!(bag_of_words(&[], &v), vec![0.0; 4]);
    }

    #[test]
    fn test_sequence_keeps_order_and_truncates() {
        let v = vocab();
        assert_eq!(sequence(&toks("food is good"), &v, None), vec![1, 3, 2]);
        assert_eq!(sequence(&toks("food is good"), &v, Some(2)), vec![1, 3]);
    }

    #[test]
    fn test_samples_carry_labels() {
        let v = vocab();
        let docs = vec![(toks("bad"), Rating::from_stars(2.0).unwrap())];
        let bow = to_bow_samples(&docs, &v);
        assert_eq!(bow[0].label, 1);
        let seq = to_sequence_samples(&docs, &v, None);
        assert_eq!(seq[0].token_ids, vec![0]);
        assert_eq!(seq[0].label, 1);
    }
}
