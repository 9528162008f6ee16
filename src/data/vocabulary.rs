// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// Maps every word seen in the training reviews to an index.
//
// Index assignment:
//   - all distinct training tokens, sorted ascending, get
//     indices 0, 1, ..., V-1
//   - the special token <UNK> is appended last with index V
//   - any word not seen during training maps to <UNK>
//
// So a corpus {"good", "bad", "good"} produces
//   bad → 0, good → 1, <UNK> → 2        (size 3)
//
// The mapping is held in a HuggingFace `tokenizers` WordLevel
// model. That gives us word → id and id → word lookups and a
// standard `tokenizer.json` file format for persisting the
// vocabulary next to a checkpoint (see infra::vocab_store).
//
// Reference: tokenizers crate documentation (WordLevel model)

use anyhow::{anyhow, Result};
use std::collections::BTreeSet;
use tokenizers::Tokenizer;

/// The out-of-vocabulary token
pub const UNK: &str = "<UNK>";

#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokenizer: Tokenizer,
    unk_id:    u32,
}

impl Vocabulary {
    /// Build a vocabulary from tokenised training documents.
    pub fn from_documents<'a, I>(documents: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        Self::from_words(collect_words(documents))
    }

    /// Build a vocabulary from an already-collected word set.
    /// A literal "<UNK>" in the set is ignored; it always sits last.
    pub fn from_words(words: BTreeSet<String>) -> Result<Self> {
        // BTreeSet iterates in sorted order, which fixes the indices
        let mut vocab = serde_json::Map::new();
        for word in words.into_iter().filter(|w| w != UNK) {
            let id = vocab.len();
            vocab.insert(word, serde_json::json!(id));
        }
        let unk_id = vocab.len();
        vocab.insert(UNK.to_string(), serde_json::json!(unk_id));

        // Same HuggingFace layout the Tokenizer::from_file loader expects.
        // No normalizer: casing is significant.
        let tokenizer_json = serde_json::json!({
            "version":        "1.0",
            "truncation":     null,
            "padding":        null,
            "added_tokens":   [],
            "normalizer":     null,
            "pre_tokenizer":  { "type": "WhitespaceSplit" },
            "post_processor": null,
            "decoder":        null,
            "model": {
                "type":      "WordLevel",
                "vocab":     vocab,
                "unk_token": UNK
            }
        });

        let tokenizer: Tokenizer = tokenizer_json
            .to_string()
            .parse()
            .map_err(|e| anyhow!("Cannot build vocabulary tokenizer: {e}"))?;

        tracing::debug!("Vocabulary built with {} entries (including {UNK})", unk_id + 1);
        Self::from_tokenizer(tokenizer)
    }

    /// Wrap a tokenizer loaded from disk. It must know the <UNK> token.
    pub fn from_tokenizer(tokenizer: Tokenizer) -> Result<Self> {
        let unk_id = tokenizer
            .token_to_id(UNK)
            .ok_or_else(|| anyhow!("Vocabulary has no '{UNK}' entry"))?;
        Ok(Self { tokenizer, unk_id })
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Number of entries including <UNK>
    pub fn len(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    pub fn unk_index(&self) -> u32 {
        self.unk_id
    }

    /// Index of `word`, or the <UNK> index for unseen words
    pub fn index_of(&self, word: &str) -> u32 {
        self.tokenizer.token_to_id(word).unwrap_or(self.unk_id)
    }

    pub fn word_at(&self, index: u32) -> Option<String> {
        self.tokenizer.id_to_token(index)
    }
}

/// The set of distinct tokens across all documents.
pub fn collect_words<'a, I>(documents: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a [String]>,
{
    documents
        .into_iter()
        .flat_map(|doc| doc.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn vocab_of(raw: &[&str]) -> Vocabulary {
        let d = docs(raw);
        Vocabulary::from_documents(d.iter().map(Vec::as_slice)).unwrap()
    }

    #[test]
    fn test_indices_follow_sorted_order_with_unk_last() {
        let v = vocab_of(&["good food", "bad food"]);
        assert_eq!(v.len(), 4);
        assert_eq!(v.index_of("bad"), 0);
        assert_eq!(v.index_of("food"), 1);
        assert_eq!(v.index_of("good"), 2);
        assert_eq!(v.unk_index(), 3);
        assert_eq!(v.word_at(3).as_deref(), Some(UNK));
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let v = vocab_of(&["good food"]);
        assert_eq!(v.index_of("terrible"), v.unk_index());
        // Case matters: "Good" was never seen
        assert_eq!(v.index_of("Good"), v.unk_index());
    }

    #[test]
    fn test_literal_unk_in_corpus_is_not_duplicated() {
        let v = vocab_of(&["<UNK> a"]);
        assert_eq!(v.len(), 2);
        assert_eq!(v.index_of("a"), 0);
        assert_eq!(v.index_of(UNK), 1);
    }

    #[test]
    fn test_empty_corpus_has_only_unk() {
        let v = Vocabulary::from_words(BTreeSet::new()).unwrap();
        assert_eq!(v.len(), 1);
        assert_eq!(v.index_of("anything"), 0);
    }
}
