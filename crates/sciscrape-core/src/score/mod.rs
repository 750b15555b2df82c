//! Lexical relevance scoring.
//!
//! A token list is scanned once per vocabulary: `target_words` mark a
//! document as on-topic, `bycatch_words` mark it as a false positive. The
//! two top-term counts and the token total feed the statistics collaborator.

mod stats;
mod terms;
mod tokenize;

pub use stats::{RelevanceScore, RelevanceStatistics, WordscoreCalculator};
pub use terms::{match_terms, FreqDistAndCount, Vocabulary, TOP_TERMS};
pub use tokenize::{tokenize_abstract, tokenize_pages};

use crate::result::DocumentResult;

pub struct RelevanceEngine {
    target: Vocabulary,
    bycatch: Vocabulary,
    statistics: Box<dyn RelevanceStatistics>,
}

impl RelevanceEngine {
    #[must_use]
    pub fn new(target: Vocabulary, bycatch: Vocabulary) -> Self {
        Self {
            target,
            bycatch,
            statistics: Box::new(WordscoreCalculator),
        }
    }

    #[must_use]
    pub fn with_statistics(mut self, statistics: Box<dyn RelevanceStatistics>) -> Self {
        self.statistics = statistics;
        self
    }

    pub const fn target(&self) -> &Vocabulary {
        &self.target
    }

    pub const fn bycatch(&self) -> &Vocabulary {
        &self.bycatch
    }

    pub fn score_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> DocumentResult {
        let target = match_terms(tokens, &self.target);
        let bycatch = match_terms(tokens, &self.bycatch);
        let total_length = tokens.len();

        let score = self
            .statistics
            .score(target.term_count, bycatch.term_count, total_length);
        tracing::debug!(?score, total_length, "Relevance score");

        DocumentResult {
            matching_terms: target.term_count,
            bycatch_terms: bycatch.term_count,
            total_length,
            wordscore: score.probability,
            expectation: score.expectation,
            variance: score.variance,
            standard_deviation: score.standard_deviation,
            skewness: score.skewness,
            target_freq: target.frequency_dist,
            bycatch_freq: bycatch.frequency_dist,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedStatistics;

    impl RelevanceStatistics for FixedStatistics {
        fn score(&self, target: usize, bycatch: usize, total: usize) -> RelevanceScore {
            RelevanceScore {
                probability: target as f64,
                expectation: bycatch as f64,
                variance: total as f64,
                standard_deviation: 0.5,
                skewness: -1.0,
            }
        }
    }

    fn engine() -> RelevanceEngine {
        RelevanceEngine::new(
            ["neuron", "synapse"].into_iter().collect(),
            ["galaxy"].into_iter().collect(),
        )
    }

    #[test]
    fn test_scores_both_vocabularies() {
        let tokens = tokenize_abstract("Neuron neuron synapse galaxy dust", false);

        let result = engine().score_tokens(&tokens);

        assert_eq!(result.matching_terms, 3);
        assert_eq!(result.bycatch_terms, 1);
        assert_eq!(result.total_length, 5);
        assert_eq!(result.target_freq[0], ("neuron".to_string(), 2));
        assert_eq!(result.bycatch_freq, vec![("galaxy".to_string(), 1)]);
    }

    #[test]
    fn test_statistics_copied_verbatim() {
        let tokens = tokenize_abstract("neuron galaxy x", false);

        let result = engine()
            .with_statistics(Box::new(FixedStatistics))
            .score_tokens(&tokens);

        assert!((result.wordscore - 1.0).abs() < f64::EPSILON);
        assert!((result.expectation - 1.0).abs() < f64::EPSILON);
        assert!((result.variance - 3.0).abs() < f64::EPSILON);
        assert!((result.standard_deviation - 0.5).abs() < f64::EPSILON);
        assert!((result.skewness + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_tokens() {
        let empty: Vec<String> = Vec::new();

        let result = engine().score_tokens(&empty);

        assert_eq!(result.total_length, 0);
        assert_eq!(result.matching_terms, 0);
        assert!(result.wordscore.is_finite());
    }
}
