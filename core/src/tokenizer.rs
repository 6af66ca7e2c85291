use crate::config::AnalyzerConfig;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

/// Noise words removed from token streams before counting.
pub type StopWordSet = HashSet<String>;

lazy_static! {
    // `\w` is Unicode-aware: letters, marks, decimal digits and connector punctuation (`_`).
    static ref WORD: Regex = Regex::new(r"\w+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Split text into lower-cased runs of Unicode word characters.
///
/// Everything that is not a word character is a boundary and is dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_lowercase()).collect()
}

/// Keep the tokens not present in `stop_words`, in their original order.
pub fn filter_stop_words(tokens: Vec<String>, stop_words: &StopWordSet) -> Vec<String> {
    if stop_words.is_empty() {
        return tokens;
    }
    tokens.into_iter().filter(|t| !stop_words.contains(t)).collect()
}

/// Tokenizer with the optional normalization steps of an [`AnalyzerConfig`].
///
/// The same analyzer is stored in a built index and applied to query words, so both
/// sides of a lookup see identical terms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> AnalyzerConfig {
        self.config
    }

    /// Tokenize `text`, applying NFKC before splitting and stemming after lower-casing
    /// when enabled.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let tokens = if self.config.unicode_nfkc {
            tokenize(&text.nfkc().collect::<String>())
        } else {
            tokenize(text)
        };
        if !self.config.stem {
            return tokens;
        }
        tokens.into_iter().map(|t| STEMMER.stem(&t).into_owned()).collect()
    }

    /// Analyze then drop stop words.
    pub fn analyze_filtered(&self, text: &str, stop_words: &StopWordSet) -> Vec<String> {
        filter_stop_words(self.analyze(text), stop_words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_punctuation_and_lowercases() {
        assert_eq!(tokenize("Hello, World! foo_bar 123"), vec!["hello", "world", "foo_bar", "123"]);
    }

    #[test]
    fn empty_and_separator_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" ,.;!? \n\t").is_empty());
    }

    #[test]
    fn non_ascii_words_are_kept_whole() {
        assert_eq!(tokenize("Café über-Größe"), vec!["café", "über", "größe"]);
    }

    #[test]
    fn stop_words_are_removed_in_order() {
        let stop: StopWordSet = ["the", "a"].iter().map(|s| s.to_string()).collect();
        let toks: Vec<String> = ["the", "cat", "a", "dog"].iter().map(|s| s.to_string()).collect();
        assert_eq!(filter_stop_words(toks, &stop), vec!["cat", "dog"]);
    }

    #[test]
    fn empty_stop_set_is_identity() {
        let toks = tokenize("the cat sat on the mat");
        assert_eq!(filter_stop_words(toks.clone(), &StopWordSet::new()), toks);
    }

    #[test]
    fn analyzer_options() {
        let plain = Analyzer::default();
        assert_eq!(plain.analyze("Running ﬁsh"), vec!["running", "ﬁsh"]);

        let full = Analyzer::new(AnalyzerConfig { unicode_nfkc: true, stem: true });
        assert_eq!(full.analyze("Running ﬁsh"), vec!["run", "fish"]);
    }
}
