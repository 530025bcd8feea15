use chrono::NaiveDate;
use history_model::{DateWindow, parse_date};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid date parameter: {0:?}")]
pub struct InvalidDate(pub String);

fn parse_bound(value: Option<&str>) -> Result<Option<NaiveDate>, InvalidDate> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value)
            .map(Some)
            .ok_or_else(|| InvalidDate(value.to_string())),
    }
}

/// Builds the requested window from optional `from`/`to` query values.
/// No bounds at all means the whole history. A missing `from` is open ended,
/// a missing `to` stops at `today`.
pub fn parse_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<Option<DateWindow>, InvalidDate> {
    let from = parse_bound(from)?;
    let to = parse_bound(to)?;

    match (from, to) {
        (None, None) => Ok(None),
        (from, to) => Ok(Some(DateWindow::new(
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(today),
        ))),
    }
}
