//! Word tokenization shared by the corrector, resolver, and ingestion.

use once_cell::sync::Lazy;
use regex::Regex;

// Apostrophes stay inside tokens so words like "o'rgan" are kept whole;
// splitting them would leak fragments into the lexicon.
static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w'’‘ʻ-]+").unwrap());

/// Extract lowercase word tokens from free text.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_punctuation() {
        assert_eq!(tokenize("Salom, dunyo!"), vec!["salom", "dunyo"]);
    }

    #[test]
    fn keeps_apostrophes_and_hyphens() {
        assert_eq!(tokenize("o'rgan ob-havo"), vec!["o'rgan", "ob-havo"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,.!  ").is_empty());
    }
}
