use chrono::{Datelike, Days, NaiveDate};
use history_model::LookbackPeriod;

/// Same day `months` calendar months earlier. A day that does not exist in
/// the target month spills into the following month, so one month before
/// March 31st is March 2nd or 3rd depending on the leap year.
fn months_before(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 - months as i32;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_days(Days::new(u64::from(date.day0())))
}

fn years_before(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    months_before(date, years * 12)
}

/// Smallest lookback period that still reaches back to `from`.
///
/// The guards are checked in order and the first strict `<` match wins.
/// `ytd` is never produced.
/// Returns `None` when there is no start date, or when `today` is so close
/// to the calendar minimum that the offsets cannot be computed.
pub fn resolve_period(from: Option<NaiveDate>, today: NaiveDate) -> Option<LookbackPeriod> {
    let from = from?;

    let five_years_ago = years_before(today, 5)?;
    let two_years_ago = years_before(today, 2)?;
    let one_year_ago = years_before(today, 1)?;
    let six_months_ago = months_before(today, 6)?;
    let three_months_ago = months_before(today, 3)?;
    let one_month_ago = months_before(today, 1)?;

    let period = if from < five_years_ago {
        LookbackPeriod::Max
    } else if from < two_years_ago {
        LookbackPeriod::FiveYears
    } else if from < one_year_ago {
        LookbackPeriod::TwoYears
    } else if from < six_months_ago {
        LookbackPeriod::OneYear
    } else if from < three_months_ago {
        LookbackPeriod::SixMonths
    } else if from < one_month_ago {
        LookbackPeriod::ThreeMonths
    } else {
        LookbackPeriod::OneMonth
    };
    Some(period)
}
