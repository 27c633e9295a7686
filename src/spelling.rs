// src/spelling.rs
//! Best-effort keyword spelling correction.
//!
//! Unknown lower-case words are replaced by the closest vocabulary word
//! (`strsim::damerau_levenshtein`), ties broken by vocabulary rank.
//! Capitalised tokens are treated as names and never touched.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use strsim::damerau_levenshtein;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}']+").unwrap());

/// English word list (~124k entries), news vocabulary first, then the rest
/// ordered by corpus frequency.
static EMBEDDED: &str = include_str!("../vocabulary.txt");

#[derive(Debug, Clone)]
pub struct SpellChecker {
    words: Vec<String>,
    index: HashSet<String>,
}

impl Default for SpellChecker {
    fn default() -> Self {
        Self::with_vocabulary(EMBEDDED.lines())
    }
}

impl SpellChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Vec::new();
        let mut index = HashSet::new();
        for w in words {
            let w = w.as_ref().trim().to_ascii_lowercase();
            if !w.is_empty() && index.insert(w.clone()) {
                list.push(w);
            }
        }
        Self { words: list, index }
    }

    /// Correct every word of `text`, keeping separators untouched.
    pub fn correct(&self, text: &str) -> String {
        WORD_RE
            .replace_all(text, |caps: &regex::Captures| self.correct_word(&caps[0]))
            .into_owned()
    }

    fn correct_word(&self, word: &str) -> String {
        if word.len() < 3 || !word.chars().all(|c| c.is_ascii_alphabetic()) {
            return word.to_string();
        }
        // acronyms and proper nouns
        if word.starts_with(|c: char| c.is_ascii_uppercase()) {
            return word.to_string();
        }
        let lower = word.to_ascii_lowercase();
        if self.index.contains(&lower) {
            return word.to_string();
        }

        let max_dist = if lower.len() < 5 { 1 } else { 2 };
        let mut best: Option<(usize, &str)> = None;
        for cand in &self.words {
            if cand.len().abs_diff(lower.len()) > max_dist {
                continue;
            }
            let d = damerau_levenshtein(&lower, cand);
            if d > max_dist {
                continue;
            }
            // earlier entries win ties
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, cand.as_str()));
                if d == 1 {
                    // cannot improve on distance 1 for an unknown word
                    break;
                }
            }
        }

        best.map_or_else(|| word.to_string(), |(_, cand)| cand.to_string())
    }
}
