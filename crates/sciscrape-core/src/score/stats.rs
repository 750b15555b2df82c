/// The five measures a statistics collaborator reports for one document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelevanceScore {
    pub probability: f64,
    pub expectation: f64,
    pub variance: f64,
    pub standard_deviation: f64,
    pub skewness: f64,
}

/// Turns raw match counts into relevance measures.
///
/// Implementations must return finite values for every input, including a
/// zero-length document.
pub trait RelevanceStatistics: Send + Sync {
    fn score(&self, target_count: usize, bycatch_count: usize, total_tokens: usize) -> RelevanceScore;
}

/// Default statistics: target share of salient hits as the probability,
/// plus a binomial model over the document where each token is an
/// on-topic hit with probability `target / total`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordscoreCalculator;

impl RelevanceStatistics for WordscoreCalculator {
    fn score(&self, target_count: usize, bycatch_count: usize, total_tokens: usize) -> RelevanceScore {
        let target = target_count as f64;
        let hits = (target_count + bycatch_count) as f64;
        let n = total_tokens as f64;

        let probability = if hits > 0.0 { target / hits } else { 0.0 };
        let p = if n > 0.0 { (target / n).min(1.0) } else { 0.0 };

        let expectation = n * p;
        let variance = n * p * (1.0 - p);
        let standard_deviation = variance.sqrt();
        let skewness = if standard_deviation > 0.0 {
            (1.0 - 2.0 * p) / standard_deviation
        } else {
            0.0
        };

        RelevanceScore {
            probability,
            expectation,
            variance,
            standard_deviation,
            skewness,
        }
    }
}
