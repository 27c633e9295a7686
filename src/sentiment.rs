use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// word -> [polarity, subjectivity]
static LEXICON: Lazy<HashMap<String, (f64, f64)>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, (f64, f64)>>(raw).expect("valid sentiment lexicon")
});

/// Polarity is in [-1, 1] (negative .. positive), subjectivity in [0, 1]
/// (objective .. subjective).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub polarity: f64,
    pub subjectivity: f64,
}

impl Sentiment {
    pub const NEUTRAL: Sentiment = Sentiment {
        polarity: 0.0,
        subjectivity: 0.0,
    };

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::from_polarity(self.polarity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Exact comparison against zero. Lexicon averages of non-empty hits can
    /// land near zero without being zero; such input is labelled by sign.
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            Self::Positive
        } else if polarity == 0.0 {
            Self::Neutral
        } else {
            Self::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "😊 Positive",
            Self::Neutral => "😐 Neutral",
            Self::Negative => "😠 Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SentimentLabel {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Round to 3 decimals for API output.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> Option<(f64, f64)> {
        LEXICON.get(w).copied()
    }

    /// Averages every lexicon hit.
    /// Intensifier directly before a hit scales both scores; a negator in the
    /// previous 1..=3 tokens flips polarity at half strength.
    pub fn analyze(&self, text: &str) -> Sentiment {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut pol_sum = 0.0;
        let mut subj_sum = 0.0;
        let mut hits = 0usize;

        for i in 0..tokens.len() {
            let Some((mut pol, mut subj)) = self.word_score(tokens[i].as_str()) else {
                continue;
            };

            if i >= 1 {
                if let Some(m) = intensifier(tokens[i - 1].as_str()) {
                    pol *= m;
                    subj *= m;
                }
            }

            let negated = (1..=3).any(|k| i >= k && is_negator(tokens[i - k].as_str()));
            if negated {
                pol *= -0.5;
            }

            pol_sum += pol.clamp(-1.0, 1.0);
            subj_sum += subj.clamp(0.0, 1.0);
            hits += 1;
        }

        if hits == 0 {
            return Sentiment::NEUTRAL;
        }

        let n = hits as f64;
        Sentiment {
            polarity: (pol_sum / n).clamp(-1.0, 1.0),
            subjectivity: (subj_sum / n).clamp(0.0, 1.0),
        }
    }
}

/// Lower-case word tokens; apostrophes stay inside words ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

fn intensifier(tok: &str) -> Option<f64> {
    match tok {
        "very" | "really" | "extremely" | "so" => Some(1.3),
        "incredibly" | "totally" | "absolutely" => Some(1.4),
        "quite" | "pretty" => Some(1.1),
        "slightly" | "somewhat" | "barely" => Some(0.7),
        _ => None,
    }
}
