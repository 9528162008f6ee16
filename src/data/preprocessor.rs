// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Turns raw review text into the list of tokens both models
// consume.
//
// Tokenisation is plain whitespace splitting — a token is any
// maximal run of non-whitespace characters. Case is kept and
// punctuation stays attached to words ("good!" and "good" are
// different tokens) unless punctuation stripping is enabled.
//
// Cleaning steps (applied in order):
//   1. Replace Unicode whitespace variants with a plain space
//   2. Replace invisible control characters with a space
//   3. Optionally delete ASCII punctuation (RNN pipeline)
//   4. Split on whitespace
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

#[derive(Debug, Clone, Copy, Default)]
pub struct Preprocessor {
    /// Remove ASCII punctuation before splitting, so
    /// "don't!" becomes the single token "dont"
    strip_punctuation: bool,
}

impl Preprocessor {
    /// A preprocessor that keeps punctuation (bag-of-words pipeline)
    pub fn new() -> Self {
        Self { strip_punctuation: false }
    }

    pub fn with_strip_punctuation(mut self, strip: bool) -> Self {
        self.strip_punctuation = strip;
        self
    }

    /// Normalise odd characters to plain spaces.
    pub fn clean(&self, text: &str) -> String {
        text.chars()
            .filter_map(|c| match c {
                // Non-breaking, zero-width and BOM characters → space
                '\u{00A0}' | '\u{200B}' | '\u{FEFF}' => Some(' '),
                // Tabs, newlines and other control characters → space
                c if c.is_control() => Some(' '),
                c if self.strip_punctuation && c.is_ascii_punctuation() => None,
                c => Some(c),
            })
            .collect()
    }

    /// Clean the text and split it into tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.clean(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}
