use chrono::{Datelike, NaiveDate};

use super::regex_cache::cached_regex;

pub const EMAIL: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
pub const ZIP_CODE: &str = r"^\d{5}(-\d{4})?$";
pub const PHONE: &str = r"^\d{10}$";

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

pub fn pattern(regex: &str, value: &str) -> Result<bool, regex::Error> {
    Ok(cached_regex(regex)?.is_match(value.trim()))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Whole years between `birth` and `today`, counting a year only once the
/// birthday has been reached.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub fn min_age(birth: NaiveDate, years: u32, today: NaiveDate) -> bool {
    age_on(birth, today) >= years as i32
}

/// `start` strictly before `end`.
pub fn date_order(start: NaiveDate, end: NaiveDate) -> bool {
    start < end
}
