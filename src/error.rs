//! Error types surfaced through the lookup's `error` field.

use std::time::Duration;
use thiserror::Error;

/// Input rejected by the classifier. Never reaches a provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("search term is empty")]
    Empty,

    #[error("search term needs at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },
}

/// A provider call that did not produce a result set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("search backend unavailable: {0}")]
    Unavailable(String),

    #[error("search rejected by backend: {0}")]
    Rejected(String),

    #[error("search timed out after {0:?}")]
    Timeout(Duration),

    #[error("search failed unexpectedly: {0}")]
    Internal(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

pub type LookupResult<T> = Result<T, LookupError>;

impl LookupError {
    /// Wording shown next to the search field.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::Validation(ValidationError::Empty) => {
                "Please enter a search term.".to_string()
            }
            LookupError::Validation(ValidationError::TooShort { min, .. }) => {
                format!("Please enter at least {min} characters or a valid ABN/ACN")
            }
            LookupError::Provider(ProviderError::Rejected(message)) => message.clone(),
            LookupError::Provider(ProviderError::Timeout(_)) => {
                "The search took too long. Please try again.".to_string()
            }
            LookupError::Provider(_) => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }

    /// Whether re-issuing the same input might succeed.
    pub fn can_retry(&self) -> bool {
        match self {
            LookupError::Validation(_) => false,
            LookupError::Provider(ProviderError::Rejected(_)) => false,
            LookupError::Provider(_) => true,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LookupError::Validation(_))
    }
}
