//! Field validation shared by plain form inputs.
//!
//! The lookup controller does not use this; it exists so form fields around
//! a lookup check `required`, pattern, minimum-age and date-order rules the
//! same way everywhere.

pub mod form;
pub mod predicates;
mod regex_cache;


pub use form::{FormValidator, Rule};
pub use predicates::{EMAIL, PHONE, ZIP_CODE, date_order, min_age, pattern, required};

pub trait Validator {
    /// Error message for `value` in `field_id`, or `None` when it passes.
    fn validate(&self, field_id: &str, value: &str) -> Option<String>;
}
