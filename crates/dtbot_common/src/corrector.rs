//! Fuzzy word correction against the learned lexicon.
//!
//! Each unknown token is mapped to the closest known word within a fixed
//! edit-distance budget. Correcting a line costs
//! O(tokens * vocabulary * len^2): every token is compared against every
//! known word with the quadratic DP distance below. That is fine for the
//! few-thousand-word lexicons this bot accumulates; a BK-tree index would
//! be the next step if the vocabulary ever grows past that.

use crate::error::Result;
use crate::lexicon::LexiconStore;
use crate::text::tokenize;

/// Corrections beyond this distance are rejected and the token kept as-is.
pub const MAX_EDIT_DISTANCE: usize = 3;

/// Optional morphological analyzer consulted before the edit-distance
/// fallback. Absence only degrades correction quality, never correctness.
pub trait MorphAnalyzer {
    /// Root form of the token, if the analyzer recognizes it.
    fn analyze(&self, token: &str) -> Option<String>;
}

/// Levenshtein distance with unit-cost insert, delete, and substitute.
///
/// Classic two-row DP table, O(len(a) * len(b)) time.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[derive(Default)]
pub struct Corrector {
    analyzer: Option<Box<dyn MorphAnalyzer>>,
}

impl Corrector {
    pub fn new() -> Self {
        Self { analyzer: None }
    }

    pub fn with_analyzer(analyzer: Box<dyn MorphAnalyzer>) -> Self {
        Self {
            analyzer: Some(analyzer),
        }
    }

    /// Correct one token against the known-word list.
    ///
    /// Empty and already-known tokens come back unchanged. Otherwise the
    /// first known word (in list order, which is lexicon insertion order)
    /// at minimal distance wins, provided the distance stays within
    /// [`MAX_EDIT_DISTANCE`].
    pub fn correct_token(&self, token: &str, known_words: &[String]) -> String {
        if token.is_empty() {
            return token.to_string();
        }
        let token = token.to_lowercase();

        if let Some(analyzer) = &self.analyzer {
            if let Some(root) = analyzer.analyze(&token) {
                return root;
            }
        }

        if known_words.iter().any(|w| *w == token) {
            return token;
        }

        let mut best: Option<(usize, &str)> = None;
        for known in known_words {
            let dist = edit_distance(&token, known);
            if best.map_or(true, |(d, _)| dist < d) {
                best = Some((dist, known));
            }
        }

        match best {
            Some((dist, word)) if dist <= MAX_EDIT_DISTANCE => word.to_string(),
            _ => token,
        }
    }

    /// Lowercase, tokenize, and correct a whole input line.
    pub fn correct_line(&self, line: &str, lexicon: &LexiconStore) -> Result<String> {
        let known = lexicon.all_words()?;
        let corrected: Vec<String> = tokenize(line)
            .iter()
            .map(|t| self.correct_token(t, &known))
            .collect();
        Ok(corrected.join(" "))
    }
}
