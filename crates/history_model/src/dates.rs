//! Calendar dates as they arrive on the wire.
//!
//! The date pickers send `M/D/Y` and the upstream chart records carry
//! `Y-M-D`. Both resolve to the same [`NaiveDate`], which has no time of
//! day, so two parses of the same day always compare equal.

use chrono::NaiveDate;

const SLASH_FORMAT: &str = "%m/%d/%Y";
const HYPHEN_FORMAT: &str = "%Y-%m-%d";

/// Parses `M/D/Y`, e.g. `1/28/2020` or `01/28/2020`.
pub fn parse_slash_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), SLASH_FORMAT).ok()
}

/// Parses `Y-M-D`, e.g. `2020-01-28` or `2020-1-28`.
pub fn parse_hyphen_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), HYPHEN_FORMAT).ok()
}

/// Accepts either wire format.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.contains('/') {
        return parse_slash_date(value);
    }
    parse_hyphen_date(value)
}
