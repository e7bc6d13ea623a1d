//! In-process lexicon classifier
//!
//! Scores review text against weighted word lists. English entries match
//! whole words; Korean entries are stems matched by prefix because the
//! language attaches endings to the stem ("좋아요", "좋았다"). Negators before
//! a word ("not good", "안 좋아") and Korean negators after it ("좋지 않다")
//! flip its weight; intensifiers ("very", "정말") scale it.

use super::{Classification, Sentiment, SentimentClassifier, DEFAULT_CONFIDENCE};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Scores within this distance of zero are neutral
const NEUTRAL_BAND: f64 = 0.5;

/// Confidence for neutral text that did contain sentiment words
const MIXED_CONFIDENCE: f64 = 0.6;

const INTENSIFIER_BOOST: f64 = 1.5;

/// How many tokens a leading negator reaches
const NEGATION_WINDOW: usize = 3;

const ENGLISH_WORDS: &[(&str, f64)] = &[
    // positive
    ("good", 1.0), ("great", 1.5), ("excellent", 2.0), ("amazing", 2.0),
    ("awesome", 1.5), ("fantastic", 2.0), ("wonderful", 1.5), ("love", 1.5),
    ("loved", 1.5), ("lovely", 1.0), ("best", 1.5), ("brilliant", 2.0),
    ("enjoy", 1.0), ("enjoyed", 1.0), ("fun", 1.0), ("beautiful", 1.0),
    ("masterpiece", 2.0), ("perfect", 2.0), ("recommend", 1.0), ("superb", 2.0),
    ("outstanding", 2.0), ("incredible", 1.5), ("touching", 1.0), ("moving", 1.0),
    ("funny", 1.0), ("impressive", 1.0), ("stunning", 1.5), ("favorite", 1.0),
    ("like", 0.5), ("liked", 1.0), ("nice", 1.0), ("gripping", 1.0),
    ("entertaining", 1.0), ("fresh", 0.5),
    // negative
    ("bad", -1.0), ("terrible", -2.0), ("awful", -2.0), ("boring", -1.5),
    ("worst", -2.0), ("hate", -1.5), ("hated", -1.5), ("waste", -1.5),
    ("dull", -1.0), ("poor", -1.0), ("disappointing", -1.5), ("disappointed", -1.5),
    ("horrible", -2.0), ("mediocre", -1.0), ("weak", -1.0), ("stupid", -1.0),
    ("annoying", -1.0), ("mess", -1.0), ("predictable", -0.5), ("slow", -0.5),
    ("overrated", -1.0), ("forgettable", -1.0), ("painful", -1.0), ("lame", -1.0),
    ("meh", -0.5), ("confusing", -0.5), ("tedious", -1.0), ("cringe", -1.0),
];

const KOREAN_STEMS: &[(&str, f64)] = &[
    // positive
    ("좋", 1.0), ("재밌", 1.0), ("재미있", 1.0), ("최고", 2.0), ("감동", 1.5),
    ("훌륭", 1.5), ("멋지", 1.0), ("멋있", 1.0), ("추천", 1.0), ("사랑", 1.0),
    ("명작", 2.0), ("웃기", 0.5), ("대박", 1.5),
    // negative
    ("별로", -1.0), ("지루", -1.5), ("최악", -2.0), ("실망", -1.5), ("나쁘", -1.0),
    ("나빴", -1.0), ("아쉽", -0.5), ("아쉬웠", -0.5), ("싫", -1.0), ("재미없", -1.5),
    ("노잼", -1.5), ("졸리", -1.0), ("졸렸", -1.0), ("엉망", -1.5), ("쓰레기", -2.0),
];

const INTENSIFIERS: &[&str] = &[
    "very", "really", "so", "extremely", "absolutely", "truly", "super", "totally",
    "정말", "너무", "진짜", "완전", "아주", "매우",
];

const PRE_NEGATORS: &[&str] = &[
    "not", "no", "never", "hardly", "dont", "didnt", "doesnt", "isnt", "wasnt",
    "arent", "werent", "cant", "wont", "안", "못",
];

/// Korean negation that follows the word it negates
const POST_NEGATOR_PREFIXES: &[&str] = &["않", "아니"];

/// Korean negating prefixes written without a space ("안좋아")
const FUSED_NEGATORS: &[char] = &['안', '못'];

/// Word-list sentiment classifier
pub struct LexiconClassifier {
    words: HashMap<String, f64>,
    /// Longest stems first so "재미없" wins over shorter overlaps
    stems: Vec<(String, f64)>,
}

impl LexiconClassifier {
    /// Classifier with the built-in English and Korean lists
    pub fn new() -> Self {
        let mut classifier = Self {
            words: ENGLISH_WORDS
                .iter()
                .map(|(w, s)| (w.to_string(), *s))
                .collect(),
            stems: KOREAN_STEMS
                .iter()
                .map(|(w, s)| (w.to_string(), *s))
                .collect(),
        };
        classifier.sort_stems();
        classifier
    }

    /// Built-in lists extended (or overridden) by a lexicon file
    pub fn with_lexicon_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| AppError::Configuration {
            message: format!("Failed to read lexicon {}: {}", path.display(), e),
        })?;

        let mut classifier = Self::new();
        classifier.extend_from_str(&contents)?;

        tracing::info!(
            path = %path.display(),
            words = classifier.words.len(),
            stems = classifier.stems.len(),
            "Lexicon loaded"
        );

        Ok(classifier)
    }

    /// Merge entries of the form `word weight`, one per line.
    ///
    /// A trailing `*` marks a prefix stem; `#` starts a comment line.
    pub fn extend_from_str(&mut self, contents: &str) -> Result<()> {
        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(entry), Some(weight), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(lexicon_error(index, "expected `word weight`"));
            };

            let weight: f64 = weight
                .parse()
                .ok()
                .filter(|w: &f64| w.is_finite())
                .ok_or_else(|| lexicon_error(index, "weight is not a number"))?;

            let entry = entry.to_lowercase();
            match entry.strip_suffix('*') {
                Some(stem) if !stem.is_empty() => {
                    self.stems.retain(|(s, _)| s != stem);
                    self.stems.push((stem.to_string(), weight));
                }
                Some(_) => return Err(lexicon_error(index, "empty stem")),
                None => {
                    self.words.insert(entry, weight);
                }
            }
        }

        self.sort_stems();
        Ok(())
    }

    fn sort_stems(&mut self) {
        self.stems
            .sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
    }

    fn lookup(&self, token: &str) -> Option<f64> {
        if let Some(weight) = self.words.get(token) {
            return Some(*weight);
        }

        if let Some(weight) = self.stem_weight(token) {
            return Some(weight);
        }

        let mut chars = token.chars();
        match chars.next() {
            Some(first) if FUSED_NEGATORS.contains(&first) => {
                self.stem_weight(chars.as_str()).map(|w| -w)
            }
            _ => None,
        }
    }

    fn stem_weight(&self, token: &str) -> Option<f64> {
        if token.is_empty() {
            return None;
        }
        self.stems
            .iter()
            .find(|(stem, _)| token.starts_with(stem.as_str()))
            .map(|(_, weight)| *weight)
    }

    /// Net score and number of sentiment-bearing tokens
    fn score(&self, text: &str) -> (f64, usize) {
        let mut score = 0.0;
        let mut hits = 0;
        let mut boost = 1.0;
        let mut negation = 0usize;
        let mut last: Option<f64> = None;

        for token in tokenize(text) {
            let token = token.as_str();

            if INTENSIFIERS.contains(&token) {
                boost = INTENSIFIER_BOOST;
                continue;
            }

            if PRE_NEGATORS.contains(&token) {
                negation = NEGATION_WINDOW;
                last = None;
                continue;
            }

            if POST_NEGATOR_PREFIXES.iter().any(|p| token.starts_with(p)) {
                if let Some(previous) = last.take() {
                    score -= 2.0 * previous;
                }
                continue;
            }

            match self.lookup(token) {
                Some(weight) => {
                    let mut value = weight * boost;
                    if negation > 0 {
                        value = -value;
                        negation = 0;
                    }
                    score += value;
                    hits += 1;
                    last = Some(value);
                }
                None => {
                    negation = negation.saturating_sub(1);
                    last = None;
                }
            }
            boost = 1.0;
        }

        (score, hits)
    }

    /// Synchronous classification
    pub fn classify_text(&self, text: &str) -> Classification {
        let (score, hits) = self.score(text);
        let magnitude = score.abs();

        if magnitude <= NEUTRAL_BAND {
            let confidence = if hits == 0 { DEFAULT_CONFIDENCE } else { MIXED_CONFIDENCE };
            return Classification::new(Sentiment::Neutral, confidence);
        }

        let label = if score > 0.0 {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        };

        Classification::new(label, 0.5 + 0.5 * magnitude / (magnitude + 1.0))
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Classification {
        self.classify_text(text)
    }

    fn provider(&self) -> &str {
        "lexicon"
    }
}

fn lexicon_error(index: usize, reason: &str) -> AppError {
    AppError::Configuration {
        message: format!("Lexicon line {}: {}", index + 1, reason),
    }
}

/// Lowercased words; apostrophes inside a word are dropped ("don't" -> "dont")
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(text: &str) -> Sentiment {
        LexiconClassifier::new().classify_text(text).label
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(tokenize("Don't  GO!"), vec!["dont", "go"]);
        assert_eq!(tokenize("정말 좋아요."), vec!["정말", "좋아요"]);
        assert!(tokenize("  ...  ").is_empty());
    }

    #[test]
    fn test_basic_labels() {
        assert_eq!(label("great"), Sentiment::Positive);
        assert_eq!(label("What a boring, predictable mess"), Sentiment::Negative);
        assert_eq!(label("I watched it on Tuesday"), Sentiment::Neutral);
    }

    #[test]
    fn test_negation() {
        assert_eq!(label("not good at all"), Sentiment::Negative);
        assert_eq!(label("it wasn't bad"), Sentiment::Positive);
        assert_eq!(label("never really boring"), Sentiment::Positive);
    }

    #[test]
    fn test_korean() {
        assert_eq!(label("정말 재밌어요"), Sentiment::Positive);
        assert_eq!(label("최악의 영화"), Sentiment::Negative);
        assert_eq!(label("재미없다"), Sentiment::Negative);
        assert_eq!(label("좋지 않았다"), Sentiment::Negative);
        assert_eq!(label("안좋아요"), Sentiment::Negative);
        assert_eq!(label("안 지루해요"), Sentiment::Positive);
    }

    #[test]
    fn test_confidence_grows_with_evidence() {
        let classifier = LexiconClassifier::new();
        let mild = classifier.classify_text("good");
        let strong = classifier.classify_text("really great, an excellent masterpiece");

        assert_eq!(mild.confidence, 0.75);
        assert!(strong.confidence > mild.confidence);
        assert!(strong.confidence <= 1.0);
    }

    #[test]
    fn test_neutral_confidence() {
        let classifier = LexiconClassifier::new();
        assert_eq!(classifier.classify_text("").confidence, DEFAULT_CONFIDENCE);
        let mixed = classifier.classify_text("good but bad");
        assert_eq!(mixed.label, Sentiment::Neutral);
        assert_eq!(mixed.confidence, MIXED_CONFIDENCE);
    }

    #[test]
    fn test_extend_from_str() {
        let mut classifier = LexiconClassifier::new();
        classifier
            .extend_from_str("# custom entries\nbingeworthy 2.0\n꿀잼* 2.0\ngood -1\n")
            .unwrap();

        assert_eq!(classifier.classify_text("bingeworthy").label, Sentiment::Positive);
        assert_eq!(classifier.classify_text("꿀잼이에요").label, Sentiment::Positive);
        assert_eq!(classifier.classify_text("good").label, Sentiment::Negative);
    }

    #[test]
    fn test_extend_rejects_bad_lines() {
        let mut classifier = LexiconClassifier::new();
        assert!(classifier.extend_from_str("good").is_err());
        assert!(classifier.extend_from_str("good lots").is_err());
        assert!(classifier.extend_from_str("* 1.0").is_err());
        assert!(classifier.extend_from_str("a 1 2").is_err());
    }
}
