//! Headline similarity.
//!
//! Two signals are computed over the compacted (normalized, whitespace-free)
//! headline: character-trigram Jaccard overlap, and a Dice ratio over the
//! longest common subsequence. The score is the larger of the two. Trigram
//! overlap alone under-scores short Korean headlines that differ by a single
//! inserted syllable, which breaks most of the trigrams around it while the
//! subsequence stays intact.

use std::collections::HashSet;

use crate::text::compact_title;

const NGRAM: usize = 3;

/// A headline prepared once for repeated comparisons.
#[derive(Debug, Clone)]
pub struct PreparedTitle {
    chars: Vec<char>,
    grams: HashSet<String>,
}

impl PreparedTitle {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let chars: Vec<char> = compact_title(raw).chars().collect();
        let grams = ngrams(&chars);
        Self { chars, grams }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Similarity in `[0, 1]`; 0 when either side normalizes to nothing.
    #[must_use]
    pub fn similarity(&self, other: &PreparedTitle) -> f64 {
        if self.is_empty() || other.is_empty() {
            return 0.0;
        }
        if self.chars == other.chars {
            return 1.0;
        }
        jaccard(&self.grams, &other.grams).max(lcs_dice(&self.chars, &other.chars))
    }
}

/// Similarity of two raw headlines.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    PreparedTitle::new(a).similarity(&PreparedTitle::new(b))
}

fn ngrams(chars: &[char]) -> HashSet<String> {
    if chars.is_empty() {
        return HashSet::new();
    }
    if chars.len() < NGRAM {
        return std::iter::once(chars.iter().collect()).collect();
    }
    chars.windows(NGRAM).map(|w| w.iter().collect()).collect()
}

#[allow(clippy::cast_precision_loss)]
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

#[allow(clippy::cast_precision_loss)]
fn lcs_dice(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    // Single-row DP over the shorter side.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut row = vec![0_usize; short.len() + 1];
    for &lc in long {
        let mut diagonal = 0;
        for (j, &sc) in short.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if lc == sc {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    (2 * row[short.len()]) as f64 / total as f64
}
