//! Lexicon/rule-based sentiment scoring
//!
//! Deterministic and lock-free: the analyzer holds only immutable tables,
//! so a single instance can be shared across any number of concurrent
//! batches.

use aho_corasick::AhoCorasick;
use feedlens_core::{Error, Result, SentimentLabel, SentimentRecord};
use std::collections::{HashMap, HashSet};

use crate::lexicon;

/// How many preceding tokens are scanned for negations and boosters
const MODIFIER_WINDOW: usize = 3;

/// Valence multiplier applied when a negation precedes a sentiment word
const NEGATION_SCALAR: f32 = -0.74;

/// Per-exclamation-mark emphasis added to the raw score
const EXCLAMATION_BOOST: f32 = 0.292;

/// Exclamation marks beyond this count add no further emphasis
const MAX_EXCLAMATIONS: usize = 4;

/// Normalization constant mapping the raw valence sum into [-1, 1]
const NORMALIZATION_ALPHA: f32 = 15.0;

/// Compound score at or above this labels the text positive
const POSITIVE_THRESHOLD: f32 = 0.05;

/// Compound score at or below this labels the text negative
const NEGATIVE_THRESHOLD: f32 = -0.05;

/// Lexicon-based sentiment analyzer, the always-available local
/// substitute for remote inference
pub struct LexiconAnalyzer {
    words: HashMap<&'static str, f32>,
    negations: HashSet<&'static str>,
    boosters: HashMap<&'static str, f32>,
    phrases: AhoCorasick,
    phrase_valences: Vec<f32>,
}

impl LexiconAnalyzer {
    /// Build the analyzer from the compiled-in lexicon
    pub fn new() -> Result<Self> {
        let phrases = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(lexicon::PHRASES.iter().map(|(phrase, _)| *phrase))
            .map_err(|e| Error::analyzer(format!("failed to build phrase matcher: {e}")))?;

        Ok(Self {
            words: lexicon::WORDS.iter().copied().collect(),
            negations: lexicon::NEGATIONS.iter().copied().collect(),
            boosters: lexicon::BOOSTERS.iter().copied().collect(),
            phrases,
            phrase_valences: lexicon::PHRASES.iter().map(|(_, v)| *v).collect(),
        })
    }

    /// Analyze a single text
    pub fn analyze(&self, text: &str) -> SentimentRecord {
        if text.trim().is_empty() {
            return SentimentRecord::neutral();
        }

        let compound = self.compound(text);
        let label = if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        SentimentRecord::new((compound + 1.0) / 2.0, label, compound.abs())
    }

    /// Analyze a batch of texts, preserving input order
    pub fn analyze_batch(&self, texts: &[String]) -> Vec<SentimentRecord> {
        texts.iter().map(|text| self.analyze(text)).collect()
    }

    /// Compound sentiment score in [-1, 1]
    pub fn compound(&self, text: &str) -> f32 {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|token| !token.is_empty())
            .collect();

        let mut sum = 0.0f32;

        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.words.get(token) else {
                continue;
            };

            let mut valence = base;
            let window_start = i.saturating_sub(MODIFIER_WINDOW);
            let mut negated = false;

            for prior in &tokens[window_start..i] {
                if let Some(&boost) = self.boosters.get(prior) {
                    // Boost scales with the sign of the word it modifies
                    valence += if valence >= 0.0 { boost } else { -boost };
                }
                if self.negations.contains(prior) {
                    negated = true;
                }
            }

            if negated {
                valence *= NEGATION_SCALAR;
            }

            sum += valence;
        }

        for hit in self.phrases.find_iter(&lowered) {
            sum += self.phrase_valences[hit.pattern().as_usize()];
        }

        let exclamations = text.chars().filter(|&c| c == '!').count().min(MAX_EXCLAMATIONS);
        if sum != 0.0 && exclamations > 0 {
            let emphasis = exclamations as f32 * EXCLAMATION_BOOST;
            sum += if sum > 0.0 { emphasis } else { -emphasis };
        }

        (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn analyzer() -> LexiconAnalyzer {
        LexiconAnalyzer::new().expect("lexicon should compile")
    }

    #[test]
    fn labels_obvious_polarity() {
        let analyzer = analyzer();

        let positive = analyzer.analyze("great app");
        assert_eq!(positive.label, SentimentLabel::Positive);
        assert!(positive.score > 0.5);

        let negative = analyzer.analyze("crashes constantly");
        assert_eq!(negative.label, SentimentLabel::Negative);
        assert!(negative.score < 0.5);

        let neutral = analyzer.analyze("meh, ok");
        assert_eq!(neutral.label, SentimentLabel::Neutral);
    }

    #[test]
    fn empty_text_is_neutral() {
        let record = analyzer().analyze("   ");
        assert_eq!(record, SentimentRecord::neutral());
    }

    #[test]
    fn negation_flips_polarity() {
        let analyzer = analyzer();
        assert_eq!(
            analyzer.analyze("not good at all").label,
            SentimentLabel::Negative
        );
        assert_eq!(
            analyzer.analyze("never works properly").label,
            SentimentLabel::Negative
        );
    }

    #[test]
    fn booster_intensifies_score() {
        let analyzer = analyzer();
        assert!(analyzer.compound("really good") > analyzer.compound("good"));
        assert!(analyzer.compound("slightly good") < analyzer.compound("good"));
        assert!(analyzer.compound("extremely bad") < analyzer.compound("bad"));
    }

    #[test]
    fn exclamations_add_emphasis() {
        let analyzer = analyzer();
        assert!(analyzer.compound("great!!!") > analyzer.compound("great"));
        assert!(analyzer.compound("terrible!!!") < analyzer.compound("terrible"));
        // Emphasis never manufactures polarity on its own
        assert_eq!(analyzer.compound("!!!"), 0.0);
    }

    #[test]
    fn phrases_score_as_units() {
        let analyzer = analyzer();
        assert_eq!(
            analyzer.analyze("complete waste of time").label,
            SentimentLabel::Negative
        );
        assert_eq!(
            analyzer.analyze("Five stars from me").label,
            SentimentLabel::Positive
        );
    }

    #[test]
    fn analysis_is_deterministic() {
        let analyzer = analyzer();
        let text = "love the design but it crashes on startup";
        assert_eq!(analyzer.analyze(text), analyzer.analyze(text));
    }

    #[test]
    fn batch_preserves_order_and_length() {
        let analyzer = analyzer();
        let texts = vec![
            "great".to_string(),
            "terrible".to_string(),
            "whatever".to_string(),
        ];
        let records = analyzer.analyze_batch(&texts);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].label, SentimentLabel::Positive);
        assert_eq!(records[1].label, SentimentLabel::Negative);
        assert_eq!(records[2].label, SentimentLabel::Neutral);
    }

    proptest! {
        #[test]
        fn scores_stay_in_range(text in "\\PC{0,200}") {
            let record = analyzer().analyze(&text);
            prop_assert!((0.0..=1.0).contains(&record.score));
            prop_assert!((0.0..=1.0).contains(&record.confidence));
        }
    }
}
