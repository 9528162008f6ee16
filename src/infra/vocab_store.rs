// ============================================================
// Layer 6 — Vocabulary Store
// ============================================================
// Persists the vocabulary as a HuggingFace tokenizer.json next
// to the checkpoint. A checkpoint's input layer is sized by the
// vocabulary, so resuming or running inference must reuse the
// exact vocabulary the weights were trained with.
//
// Reference: tokenizers crate documentation

use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::data::vocabulary::Vocabulary;

const VOCAB_FILE: &str = "tokenizer.json";

pub struct VocabStore {
    dir: PathBuf,
}

impl VocabStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(VOCAB_FILE)
    }

    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Reuse the stored vocabulary when `reuse` is set and one
    /// exists, otherwise build a new one from `documents` and save it.
    pub fn load_or_build<'a, I>(&self, reuse: bool, documents: I) -> Result<Vocabulary>
    where
        I: IntoIterator<Item = &'a [String]>,
    {
        if reuse && self.exists() {
            tracing::info!("Loading existing vocabulary from disk");
            self.load()
        } else {
            let vocab = Vocabulary::from_documents(documents)?;
            tracing::info!("Built new vocabulary with {} entries", vocab.len());
            self.save(&vocab)?;
            Ok(vocab)
        }
    }

    pub fn save(&self, vocab: &Vocabulary) -> Result<()> {
        std::fs::create_dir_all(&self.dir).ok();
        let path = self.path();
        vocab
            .tokenizer()
            .save(&path, true)
            .map_err(|e| anyhow!("Cannot write vocabulary to '{}': {e}", path.display()))?;
        tracing::debug!("Saved vocabulary to '{}'", path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Vocabulary> {
        let path = self.path();
        let tokenizer = Tokenizer::from_file(&path)
            .map_err(|e| anyhow!("Cannot load vocabulary from '{}': {e}", path.display()))?;
        Vocabulary::from_tokenizer(tokenizer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_saved_vocabulary_loads_identically() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(tmp.path());
        let docs  = corpus(&["nice view", "bad view"]);

        let built = store.load_or_build(false, docs.iter().map(Vec::as_slice)).unwrap();
        assert!(store.exists());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), built.len());
        for word in ["bad", "nice", "view", "unseen"] {
            assert_eq!(loaded.index_of(word), built.index_of(word));
        }
    }

    #[test]
    fn test_reuse_ignores_new_documents() {
        let tmp   = tempfile::tempdir().unwrap();
        let store = VocabStore::new(tmp.path());

        let first = corpus(&["a b"]);
        store.load_or_build(false, first.iter().map(Vec::as_slice)).unwrap();

        let second = corpus(&["c d e f"]);
        let reused = store.load_or_build(true, second.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(reused.len(), 3);
        assert_eq!(reused.index_of("c"), reused.unk_index());

        let rebuilt = store.load_or_build(false, second.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(rebuilt.len(), 5);
    }
}
