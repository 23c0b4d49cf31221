pub mod config;
pub mod controller;
pub mod debounce;
pub mod domain;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod pagination;
pub mod provider;
pub mod query;
pub mod validation;

pub use config::{LookupConfig, expand_tilde};
pub use controller::{LookupSnapshot, LookupState, SearchController};
pub use debounce::Debouncer;
pub use domain::{
    DropdownState, OpenState, Query, ResultPage, SearchMode, SearchResult, SelectionChange,
    SelectionEvent,
};
pub use error::{LookupError, LookupResult, ProviderError, ValidationError};
pub use pagination::ResultSetPager;
pub use provider::{InMemoryProvider, SearchProvider, SearchRequest};
pub use query::{Classification, ClassifierRules, QueryClassifier, classify};
pub use validation::{FormValidator, Rule, Validator};
