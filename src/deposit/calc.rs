use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::error::DepositError;

/// Moves `date` by `months` calendar months, keeping the day of month.
///
/// Days that don't exist in the target month (Jan 31 + 1 month) are an error,
/// never clamped to the month end. So are targets outside the calendar chrono supports.
pub fn add_months(date: NaiveDate, months: i32) -> Result<NaiveDate, DepositError> {
    let overflow = DepositError::DateArithmetic { date, months };
    let total = match (date.month0() as i32).checked_add(months) {
        Some(total) => total,
        None => return Err(overflow),
    };
    let year = date.year() + total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, date.day()).ok_or(overflow)
}

/// Maturity value of a simple interest deposit: principal plus interest.
///
/// `rate_percent` is annual, `months` prorates it linearly over a 12 month year.
/// `None` when the result doesn't fit a `Decimal`.
pub fn calc_interest(
    rate_percent: Decimal,
    months: Decimal,
    principal: Decimal,
) -> Option<Decimal> {
    (rate_percent / Decimal::ONE_HUNDRED)
        .checked_mul(months / Decimal::from(12))?
        .checked_add(Decimal::ONE)?
        .checked_mul(principal)
}
