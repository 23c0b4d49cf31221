use serde::Deserialize;

use crate::domain::SearchMode;
use crate::error::ValidationError;

/// Length rules for the two exact identifier shapes and free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub exact_a_len: usize,
    pub exact_b_len: usize,
    pub min_free_text: usize,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            exact_a_len: 11,
            exact_b_len: 9,
            min_free_text: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Input with surrounding whitespace removed.
    pub text: String,
    pub mode: SearchMode,
    pub error: Option<ValidationError>,
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClassifier {
    rules: ClassifierRules,
}

impl QueryClassifier {
    pub fn new(rules: ClassifierRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ClassifierRules {
        &self.rules
    }

    /// Pick a search mode for `raw` and check it against that mode's rule.
    ///
    /// Digit strings of a length matching neither identifier fall through to
    /// free text, so "1234567890" is a name search rather than a malformed
    /// identifier.
    pub fn classify(&self, raw: &str) -> Classification {
        let text = raw.trim();
        let all_digits = !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());

        let (mode, error) = if all_digits && text.len() == self.rules.exact_a_len {
            (SearchMode::ExactIdentifierA, None)
        } else if all_digits && text.len() == self.rules.exact_b_len {
            (SearchMode::ExactIdentifierB, None)
        } else {
            let actual = text.chars().count();
            let error = if actual == 0 {
                Some(ValidationError::Empty)
            } else if actual < self.rules.min_free_text {
                Some(ValidationError::TooShort {
                    min: self.rules.min_free_text,
                    actual,
                })
            } else {
                None
            };
            (SearchMode::FreeText, error)
        };

        Classification {
            text: text.to_string(),
            mode,
            error,
        }
    }
}

/// Shorthand returning `(mode, is_valid)`.
pub fn classify(rules: &ClassifierRules, raw: &str) -> (SearchMode, bool) {
    let classification = QueryClassifier::new(*rules).classify(raw);
    (classification.mode, classification.is_valid())
}
