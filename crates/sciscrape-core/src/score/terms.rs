use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::result::TermFrequency;

/// How many of the most frequent matching terms are kept.
pub const TOP_TERMS: usize = 3;

/// Reference word list, case-folded and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    words: HashSet<String>,
}

impl Vocabulary {
    /// Read a newline-delimited word list. A blank line becomes the empty
    /// term, which matches empty tokens unless the tokenizer drops them.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let vocabulary: Self = content.lines().collect();
        tracing::debug!(path = %path.display(), words = vocabulary.len(), "Loaded vocabulary");
        Ok(vocabulary)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let words = iter
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .collect();
        Self { words }
    }
}

/// The most frequent matching terms of a token list and their summed count.
///
/// `term_count` covers only the retained terms, not every match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreqDistAndCount {
    pub term_count: usize,
    pub frequency_dist: Vec<TermFrequency>,
}

/// Count tokens that appear in `vocabulary` and keep the [`TOP_TERMS`] most
/// frequent. Ties keep the order in which terms were first seen.
pub fn match_terms<S: AsRef<str>>(tokens: &[S], vocabulary: &Vocabulary) -> FreqDistAndCount {
    let mut counts: Vec<TermFrequency> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for token in tokens {
        let token = token.as_ref();
        if !vocabulary.contains(token) {
            continue;
        }
        if let Some(&idx) = positions.get(token) {
            counts[idx].1 += 1;
        } else {
            positions.insert(token, counts.len());
            counts.push((token.to_string(), 1));
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_TERMS);

    let term_count = counts.iter().map(|(_, n)| n).sum();
    tracing::debug!(term_count, frequent_terms = ?counts, "Matched terms");

    FreqDistAndCount {
        term_count,
        frequency_dist: counts,
    }
}
