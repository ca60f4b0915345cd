use std::collections::HashSet;

/// Reduces raw text to the token stream used for indexing.
///
/// Index construction and query processing must share one normalizer, or
/// query terms will miss the vocabulary the documents were indexed under.
pub trait TextNormalizer: Send + Sync {
    /// Normalize text into a whitespace-separated token string
    fn normalize(&self, text: &str) -> String;
}

/// Common English words excluded from the vocabulary
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as",
    "at", "be", "because", "been", "before", "but", "by", "can", "could",
    "did", "do", "does", "for", "from", "had", "has", "have", "he", "her",
    "here", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
    "me", "my", "no", "not", "of", "on", "or", "our", "out", "she", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these",
    "they", "this", "to", "up", "was", "we", "were", "what", "when", "where",
    "which", "who", "will", "with", "would", "you", "your",
];

/// Default normalizer: lowercases, strips punctuation, drops stop words and
/// single-character tokens, and folds trailing-s plurals.
pub struct BasicNormalizer {
    stopwords: HashSet<&'static str>,
}

impl BasicNormalizer {
    pub fn new() -> Self {
        Self {
            stopwords: STOPWORDS.iter().copied().collect(),
        }
    }
}

impl Default for BasicNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer for BasicNormalizer {
    fn normalize(&self, text: &str) -> String {
        let cleaned: String = text
            .chars()
            .flat_map(|c| c.to_lowercase())
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();

        let mut tokens = Vec::new();
        for token in cleaned.split_whitespace() {
            if token.chars().count() < 2 || self.stopwords.contains(token) {
                continue;
            }
            tokens.push(fold_plural(token));
        }
        tokens.join(" ")
    }
}

/// Strip a trailing `s` from longer words. A rough stand-in for real
/// lemmatization that keeps `cats` and `cat` on the same vocabulary term.
fn fold_plural(token: &str) -> String {
    if token.chars().count() > 3 && token.ends_with('s') && !token.ends_with("ss") {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}
