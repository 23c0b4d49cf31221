use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::warn;

use super::Validator;
use super::predicates::{self, EMAIL, PHONE, ZIP_CODE};

#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    Required,
    Pattern { regex: String, message: String },
    MinAge { years: u32 },
    /// Value of `start` must be strictly before value of `end`.
    DateOrder { start: String, end: String },
}

impl Rule {
    pub fn pattern(regex: impl Into<String>, message: impl Into<String>) -> Self {
        Rule::Pattern {
            regex: regex.into(),
            message: message.into(),
        }
    }

    pub fn email() -> Self {
        Self::pattern(EMAIL, "Please enter a valid email address")
    }

    pub fn zip_code() -> Self {
        Self::pattern(ZIP_CODE, "Please enter a valid zip code")
    }

    pub fn phone() -> Self {
        Self::pattern(PHONE, "Please enter a valid 10-digit phone number")
    }

    pub fn date_order(start: impl Into<String>, end: impl Into<String>) -> Self {
        Rule::DateOrder {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Field values plus the rules that apply to them. Values are bound through
/// [`set`](FormValidator::set) by field id.
#[derive(Clone, Debug)]
pub struct FormValidator {
    rules: BTreeMap<String, Vec<Rule>>,
    values: BTreeMap<String, String>,
    today: NaiveDate,
}

impl Default for FormValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl FormValidator {
    pub fn new() -> Self {
        Self::with_today(chrono::Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self {
            rules: BTreeMap::new(),
            values: BTreeMap::new(),
            today,
        }
    }

    pub fn rule(mut self, field: impl Into<String>, rule: Rule) -> Self {
        self.rules.entry(field.into()).or_default().push(rule);
        self
    }

    /// Store `value` for `field` and return its error message, if any.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> Option<String> {
        let value = value.into();
        let error = self.validate(field, &value);
        self.values.insert(field.to_string(), value);
        error
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Every field with a rule, mapped to its current error.
    pub fn validate_all(&self) -> BTreeMap<String, String> {
        self.rules
            .keys()
            .filter_map(|field| {
                let value = self.value(field).unwrap_or_default();
                self.validate(field, value)
                    .map(|error| (field.clone(), error))
            })
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate_all().is_empty()
    }

    fn check(&self, field: &str, value: &str, rule: &Rule) -> Option<String> {
        match rule {
            Rule::Required => {
                (!predicates::required(value)).then(|| "This field is required".to_string())
            }
            Rule::Pattern { regex, message } => match predicates::pattern(regex, value) {
                Ok(true) => None,
                Ok(false) => Some(message.clone()),
                Err(e) => {
                    warn!(field, regex = %regex, error = %e, "invalid validation pattern");
                    Some(format!("Invalid validation pattern: {e}"))
                }
            },
            Rule::MinAge { years } => match predicates::parse_date(value) {
                Some(birth) if predicates::min_age(birth, *years, self.today) => None,
                Some(_) => Some(format!("You must be at least {years} years old")),
                None => Some("Please enter a valid date (YYYY-MM-DD)".to_string()),
            },
            Rule::DateOrder { start, end } => {
                let lookup = |other: &str| {
                    if other == field {
                        Some(value)
                    } else {
                        self.value(other)
                    }
                };
                let start_date = lookup(start).and_then(predicates::parse_date);
                let end_date = lookup(end).and_then(predicates::parse_date);
                match (start_date, end_date) {
                    (Some(s), Some(e)) if !predicates::date_order(s, e) => {
                        Some("End Date must be after Start Date".to_string())
                    }
                    _ => None,
                }
            }
        }
    }
}

impl Validator for FormValidator {
    fn validate(&self, field_id: &str, value: &str) -> Option<String> {
        let rules = self.rules.get(field_id)?;

        if rules.contains(&Rule::Required) && !predicates::required(value) {
            return Some("This field is required".to_string());
        }
        if !predicates::required(value) {
            // Optional and empty: nothing else to check.
            return None;
        }

        rules
            .iter()
            .filter(|rule| **rule != Rule::Required)
            .find_map(|rule| self.check(field_id, value, rule))
    }
}
