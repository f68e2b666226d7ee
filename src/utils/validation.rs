//! Value format checks for free-form wizard inputs.
//!
//! Prices are typed as strings on the listing screens and manufacture years
//! for spare parts are typed rather than picked from a lookup list.

use chrono::Datelike;
use log::*;
use regex::Regex;

const PRICE_PATTERN: &str = r"^\d+(\.\d{1,2})?$";
const YEAR_PATTERN: &str = r"^\d{4}$";
const EARLIEST_YEAR: i32 = 1900;

fn matches(pattern: &str, text: &str) -> bool {
    match Regex::new(pattern) {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!("Failed to compile regex pattern '{}': {}", pattern, e);
            false
        }
    }
}

/// Returns true for a plain amount such as "450000" or "1200.50".
///
pub fn is_price(text: &str) -> bool {
    matches(PRICE_PATTERN, text.trim())
}

/// Parse a manufacture year, rejecting years in the future.
///
pub fn check_year(text: &str) -> Result<i32, String> {
    let text = text.trim();
    if !matches(YEAR_PATTERN, text) {
        return Err("enter a four digit year".to_string());
    }
    let year: i32 = text
        .parse()
        .map_err(|_| "enter a four digit year".to_string())?;
    let current = chrono::Utc::now().year();
    if year < EARLIEST_YEAR || year > current {
        return Err(format!("year must be between {} and {}", EARLIEST_YEAR, current));
    }
    Ok(year)
}
