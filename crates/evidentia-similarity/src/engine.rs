//! Blended token / character-sequence similarity.
//!
//! Scoring algorithm:
//!
//! 1. Normalize both inputs: lowercase, drop apostrophes, turn every other
//!    non-alphanumeric character into a space, collapse whitespace.
//! 2. Tokenize on whitespace and drop stop-words, unless that would leave
//!    nothing.
//! 3. Token score: Jaccard overlap of the two token sets.
//! 4. Sequence score: `2·LCS / (|a| + |b|)` over the space-joined content
//!    tokens, measured in characters.
//! 5. Blend with the configured weights (0.6 token / 0.4 sequence by default).
//!
//! Words must overlap before the score gets anywhere near the accept
//! threshold: with no shared token the result is capped at the sequence
//! weight.

use std::collections::BTreeSet;

use evidentia_contracts::error::{EvidentiaError, EvidentiaResult};
use evidentia_core::traits::SimilarityScorer;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "at", "by", "for", "from", "in", "into", "is", "it", "of", "on", "or",
    "that", "the", "then", "this", "to", "with",
];

pub const DEFAULT_TOKEN_WEIGHT: f64 = 0.6;
pub const DEFAULT_SEQUENCE_WEIGHT: f64 = 0.4;

/// The default `SimilarityScorer`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenSimilarity {
    token_weight: f64,
    sequence_weight: f64,
}

impl Default for TokenSimilarity {
    fn default() -> Self {
        Self {
            token_weight: DEFAULT_TOKEN_WEIGHT,
            sequence_weight: DEFAULT_SEQUENCE_WEIGHT,
        }
    }
}

impl TokenSimilarity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scorer with custom weights. The weights are rescaled to sum
    /// to 1 so scores stay in [0, 1].
    ///
    /// Returns `EvidentiaError::ConfigError` if either weight is negative or
    /// non-finite, or both are zero.
    pub fn with_weights(token_weight: f64, sequence_weight: f64) -> EvidentiaResult<Self> {
        for (name, w) in [("token_weight", token_weight), ("sequence_weight", sequence_weight)] {
            if !w.is_finite() || w < 0.0 {
                return Err(EvidentiaError::ConfigError {
                    reason: format!("{name} must be a non-negative number, got {w}"),
                });
            }
        }
        let total = token_weight + sequence_weight;
        if total <= 0.0 {
            return Err(EvidentiaError::ConfigError {
                reason: "similarity weights must not both be zero".to_string(),
            });
        }
        Ok(Self {
            token_weight: token_weight / total,
            sequence_weight: sequence_weight / total,
        })
    }

    pub fn weights(&self) -> (f64, f64) {
        (self.token_weight, self.sequence_weight)
    }
}

impl SimilarityScorer for TokenSimilarity {
    fn score(&self, a: &str, b: &str) -> f64 {
        let na = normalize(a);
        let nb = normalize(b);
        if na.is_empty() || nb.is_empty() {
            return 0.0;
        }
        if na == nb {
            return 1.0;
        }

        let ta = content_tokens(&na);
        let tb = content_tokens(&nb);

        let token = jaccard(&ta, &tb);
        let sequence = sequence_ratio(&ta.join(" "), &tb.join(" "));

        (self.token_weight * token + self.sequence_weight * sequence).clamp(0.0, 1.0)
    }
}

/// Lowercase, strip punctuation and collapse whitespace.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace tokens with stop-words removed, unless only stop-words remain.
fn content_tokens(normalized: &str) -> Vec<&str> {
    let all: Vec<&str> = normalized.split_whitespace().collect();
    let content: Vec<&str> = all
        .iter()
        .copied()
        .filter(|t| !STOPWORDS.contains(t))
        .collect();
    if content.is_empty() {
        all
    } else {
        content
    }
}

fn jaccard(a: &[&str], b: &[&str]) -> f64 {
    let sa: BTreeSet<&str> = a.iter().copied().collect();
    let sb: BTreeSet<&str> = b.iter().copied().collect();
    let union = sa.union(&sb).count();
    if union == 0 {
        return 0.0;
    }
    sa.intersection(&sb).count() as f64 / union as f64
}

/// `2·LCS / (|a| + |b|)` over characters.
fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    2.0 * prev[b.len()] as f64 / total as f64
}
