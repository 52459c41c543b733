//! Keyword rule-table classifier.
//!
//! # Responsibility
//! - Provide the deterministic reference classification heuristic.
//!
//! # Invariants
//! - Rules are checked in table order; the first match wins.
//! - No match (including empty text) yields `(Other, 0)`.
//! - Rule values are validated into `[-5, 10]` when the table is built.

use crate::classify::{
    check_value, normalize_text, Classification, Classifier, ClassifyError, ClassifyResult,
};
use crate::model::note::Category;
use once_cell::sync::Lazy;
use regex::Regex;

const KEYWORD_CLASSIFIER_ID: &str = "keyword";

/// Reference table: `(category, value, keyword stems)`.
///
/// Stems match at a word start, so `walk` also matches `walked`/`walking`.
/// Positive-leaning rules come first; multi-word negative phrases that would
/// otherwise be shadowed by a positive stem are listed ahead of it.
const DEFAULT_RULES: &[(Category, f64, &[&str])] = &[
    (
        Category::Sleep,
        -3.0,
        &["slept badly", "slept poorly", "insomnia", "stayed up", "all-nighter", "all nighter"],
    ),
    (
        Category::Physical,
        4.0,
        &[
            "walk", "run", "jog", "gym", "workout", "work out", "exercis", "yoga",
            "swim", "bike", "cycl", "hike", "stretch", "lift",
        ],
    ),
    (
        Category::Social,
        3.0,
        &[
            "friend", "family", "called mom", "called dad", "call with", "dinner with",
            "lunch with", "coffee with", "hung out", "hang out", "party", "visited",
        ],
    ),
    (
        Category::Focus,
        3.0,
        &[
            "deep work", "focus", "studied", "study", "finished", "shipped", "wrote", "writing",
            "reading", "pomodoro",
        ],
    ),
    (
        Category::EmotionRegulation,
        3.0,
        &[
            "meditat", "journal", "breath", "therapy", "gratitude", "grateful", "calm",
            "mindful",
        ],
    ),
    (
        Category::Sleep,
        2.0,
        &["slept well", "good sleep", "took a nap", "napped", "early bed", "went to bed early", "8 hours"],
    ),
    (
        Category::Avoidance,
        -3.0,
        &[
            "procrastinat", "avoided", "skipped", "put off", "ignored", "cancelled plans",
            "stayed in bed",
        ],
    ),
    (
        Category::Impulse,
        -4.0,
        &[
            "doomscroll", "binge", "impulse", "overspent", "drank too much", "junk food",
            "smoked", "gambl", "rage",
        ],
    ),
];

static DEFAULT_TABLE: Lazy<Vec<KeywordRule>> = Lazy::new(|| {
    DEFAULT_RULES
        .iter()
        .map(|(category, value, keywords)| KeywordRule::new(*category, *value, *keywords))
        .collect::<ClassifyResult<Vec<_>>>()
        .expect("default keyword table is valid")
});

/// One ordered keyword rule.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    category: Category,
    value: f64,
    pattern: Option<Regex>,
}

impl KeywordRule {
    /// Builds a rule matching any of `keywords` at a word start.
    ///
    /// Keywords are normalized like note text. A rule with no non-empty
    /// keyword never matches.
    ///
    /// # Errors
    /// - `NonFiniteValue` / `ValueOutOfRange` for values outside `[-5, 10]`.
    pub fn new<S: AsRef<str>>(
        category: Category,
        value: f64,
        keywords: &[S],
    ) -> ClassifyResult<Self> {
        check_value(value)?;

        let alternatives: Vec<String> = keywords
            .iter()
            .map(|keyword| normalize_text(keyword.as_ref()))
            .filter(|keyword| !keyword.is_empty())
            .map(|keyword| regex::escape(&keyword))
            .collect();

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let source = format!(r"\b(?:{})", alternatives.join("|"));
            Some(Regex::new(&source).map_err(|err| ClassifyError::Backend {
                classifier_id: KEYWORD_CLASSIFIER_ID.to_string(),
                message: format!("invalid keyword pattern: {err}"),
                retryable: false,
            })?)
        };

        Ok(Self {
            category,
            value,
            pattern,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Tests already-normalized text.
    pub fn matches(&self, normalized: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(normalized))
    }
}

/// Deterministic first-match keyword classifier.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_TABLE.clone(),
        }
    }
}

impl KeywordClassifier {
    /// Uses the built-in reference table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-provided, already-validated rule table.
    pub fn with_rules(rules: Vec<KeywordRule>) -> Self {
        Self { rules }
    }

    /// Infallible classification over any input string.
    pub fn classify_text(&self, text: &str) -> Classification {
        let normalized = normalize_text(text);
        if normalized.is_empty() {
            return Classification::NEUTRAL;
        }

        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| Classification {
                category: rule.category,
                value: rule.value,
            })
            .unwrap_or(Classification::NEUTRAL)
    }
}

impl Classifier for KeywordClassifier {
    fn classifier_id(&self) -> &str {
        KEYWORD_CLASSIFIER_ID
    }

    fn classify(&self, text: &str) -> ClassifyResult<Classification> {
        Ok(self.classify_text(text))
    }
}
