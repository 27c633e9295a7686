// src/summarize.rs
//! Extractive summarization (TextRank).
//!
//! - Sentences are graph nodes; edge weight is the number of shared content
//!   words normalized by `ln|A| + ln|B|`.
//! - Sentences without any edge are dropped before ranking. If nothing is
//!   left, the summary is empty and callers fall back to the input text.
//! - Scores come from weighted PageRank (damping 0.85).
//! - Selected sentences are emitted in their original order.

use std::cmp::Ordering;
use std::collections::HashSet;

/// How much of the input to keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryTarget {
    /// Keep `floor(sentences * ratio)` sentences.
    Ratio(f64),
    /// Keep ranked sentences while the word total moves closer to this number.
    Words(usize),
}

#[derive(Debug, Clone)]
pub struct Summarizer {
    damping: f64,
    max_iter: usize,
    tolerance: f64,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self {
            damping: 0.85,
            max_iter: 100,
            tolerance: 1e-4,
        }
    }
}

struct Ranked {
    idx: usize,
    score: f64,
}

impl Summarizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summarize(&self, text: &str, target: SummaryTarget) -> String {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return String::new();
        }

        let ranked = self.rank(&sentences);
        if ranked.is_empty() {
            return String::new();
        }

        let mut picked: Vec<usize> = match target {
            SummaryTarget::Ratio(ratio) => {
                let count = (sentences.len() as f64 * ratio).floor() as usize;
                ranked.iter().take(count).map(|r| r.idx).collect()
            }
            SummaryTarget::Words(words) => pick_by_word_count(&sentences, &ranked, words),
        };

        picked.sort_unstable();
        picked
            .into_iter()
            .map(|i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Graph nodes sorted by score (desc), ties by position.
    fn rank(&self, sentences: &[String]) -> Vec<Ranked> {
        let tokens: Vec<HashSet<String>> = sentences.iter().map(|s| content_words(s)).collect();
        let n = sentences.len();

        let mut weights = vec![vec![0.0f64; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let w = similarity(&tokens[i], &tokens[j]);
                weights[i][j] = w;
                weights[j][i] = w;
            }
        }

        let nodes: Vec<usize> = (0..n)
            .filter(|&i| weights[i].iter().any(|&w| w > 0.0))
            .collect();
        if nodes.is_empty() {
            return Vec::new();
        }

        let scores = self.pagerank(&weights, &nodes);
        let mut ranked: Vec<Ranked> = nodes
            .iter()
            .zip(scores)
            .map(|(&idx, score)| Ranked { idx, score })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.idx.cmp(&b.idx))
        });
        ranked
    }

    fn pagerank(&self, weights: &[Vec<f64>], nodes: &[usize]) -> Vec<f64> {
        let n = nodes.len();
        let out_sum: Vec<f64> = nodes
            .iter()
            .map(|&i| nodes.iter().map(|&k| weights[i][k]).sum())
            .collect();

        let mut scores = vec![1.0 / n as f64; n];
        for _ in 0..self.max_iter {
            let mut next = vec![(1.0 - self.damping) / n as f64; n];
            for (a, &i) in nodes.iter().enumerate() {
                let mut acc = 0.0;
                for (b, &j) in nodes.iter().enumerate() {
                    let w = weights[j][i];
                    if w > 0.0 && out_sum[b] > 0.0 {
                        acc += w / out_sum[b] * scores[b];
                    }
                }
                next[a] += self.damping * acc;
            }

            let delta = next
                .iter()
                .zip(&scores)
                .map(|(x, y)| (x - y).abs())
                .fold(0.0, f64::max);
            scores = next;
            if delta < self.tolerance {
                break;
            }
        }
        scores
    }
}

fn pick_by_word_count(sentences: &[String], ranked: &[Ranked], words: usize) -> Vec<usize> {
    let target = words as i64;
    let mut total: i64 = 0;
    let mut out = Vec::new();
    for r in ranked {
        let len = sentences[r.idx].split_whitespace().count() as i64;
        if (target - total - len).abs() > (target - total).abs() {
            break;
        }
        out.push(r.idx);
        total += len;
    }
    out
}

fn similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(b).count();
    if common == 0 {
        return 0.0;
    }
    let denom = (a.len() as f64).ln() + (b.len() as f64).ln();
    if denom <= 0.0 {
        return 0.0;
    }
    common as f64 / denom
}

/// Split on `.`, `!`, `?` followed by whitespace (or end of input), and on line breaks.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\n' || c == '\r' {
            flush(&mut current, &mut out);
            continue;
        }
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            // keep "?!", "..." and closing quotes with the sentence
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?' | '"' | '\'' | ')' | '\u{201D}' | '\u{2019}') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            if chars.peek().is_none_or(|n| n.is_whitespace()) {
                flush(&mut current, &mut out);
            }
        }
    }
    flush(&mut current, &mut out);
    out
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    let t = current.trim();
    if !t.is_empty() {
        out.push(t.to_string());
    }
    current.clear();
}

fn content_words(sentence: &str) -> HashSet<String> {
    sentence
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .filter(|t| !is_stopword(t))
        .map(|t| stem(&t))
        .collect()
}

fn stem(word: &str) -> String {
    if word.len() > 3 && word.ends_with('s') && !word.ends_with("ss") {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

fn is_stopword(w: &str) -> bool {
    w.len() < 2
        || matches!(
            w,
            "a" | "about" | "above" | "after" | "again" | "against" | "all" | "also" | "am"
                | "an" | "and" | "any" | "are" | "as" | "at" | "be" | "because" | "been"
                | "before" | "being" | "below" | "between" | "both" | "but" | "by" | "can"
                | "could" | "did" | "do" | "does" | "doing" | "down" | "during" | "each"
                | "few" | "for" | "from" | "further" | "had" | "has" | "have" | "having" | "he"
                | "her" | "here" | "hers" | "him" | "his" | "how" | "if" | "in" | "into"
                | "is" | "it" | "its" | "just" | "me" | "more" | "most" | "my" | "no" | "nor"
                | "not" | "now" | "of" | "off" | "on" | "once" | "only" | "or" | "other"
                | "our" | "out" | "over" | "own" | "said" | "same" | "she" | "should" | "so"
                | "some" | "such" | "than" | "that" | "the" | "their" | "them" | "then"
                | "there" | "these" | "they" | "this" | "those" | "through" | "to" | "too"
                | "under" | "until" | "up" | "very" | "was" | "we" | "were" | "what" | "when"
                | "where" | "which" | "while" | "who" | "whom" | "why" | "will" | "with"
                | "would" | "you" | "your"
        )
}
