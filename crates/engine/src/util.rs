//! Internal helpers for input validation and calendar windows.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same field rules.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{BudgetCmd, EngineError, FieldErrors, ResultEngine, TransactionCmd};

pub(crate) const MAX_CATEGORY_LEN: usize = 100;
pub(crate) const MAX_DESCRIPTION_LEN: usize = 500;
pub(crate) const MIN_BUDGET_YEAR: i32 = 2000;
/// Largest accepted amount, in minor units.
pub(crate) const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000_000;

/// Returns the half-open span `[first instant of month, first instant of next
/// month)` for a calendar month in UTC.
pub fn month_window(month: u32, year: i32) -> ResultEngine<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (start, end) {
        (Some(start), Some(end)) => Ok((
            Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN)),
            Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)),
        )),
        _ => {
            let mut errors = FieldErrors::new();
            errors.add("month", "month must be between 1 and 12");
            Err(EngineError::Validation(errors))
        }
    }
}

/// Trims `value`, recording an error for blank or overlong input.
pub(crate) fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: &str,
    max_len: usize,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, format!("{field} is required"));
    } else if trimmed.chars().count() > max_len {
        errors.add(field, format!("{field} must be at most {max_len} characters"));
    }
    trimmed.to_string()
}

pub(crate) fn positive_amount(errors: &mut FieldErrors, amount_minor: i64) {
    if amount_minor <= 0 {
        errors.add("amount_minor", "amount must be positive");
    } else if amount_minor > MAX_AMOUNT_MINOR {
        errors.add("amount_minor", format!("amount must be at most {MAX_AMOUNT_MINOR}"));
    }
}

/// Validates and normalizes a transaction command.
pub(crate) fn validate_transaction(cmd: TransactionCmd) -> ResultEngine<TransactionCmd> {
    let mut errors = FieldErrors::new();
    positive_amount(&mut errors, cmd.amount_minor);
    let description = required_text(
        &mut errors,
        "description",
        &cmd.description,
        MAX_DESCRIPTION_LEN,
    );
    let category = required_text(&mut errors, "category", &cmd.category, MAX_CATEGORY_LEN);
    errors.into_result()?;

    Ok(TransactionCmd {
        description,
        category,
        ..cmd
    })
}

/// Validates and normalizes a budget command.
pub(crate) fn validate_budget(cmd: BudgetCmd) -> ResultEngine<BudgetCmd> {
    let mut errors = FieldErrors::new();
    let category = required_text(&mut errors, "category", &cmd.category, MAX_CATEGORY_LEN);
    positive_amount(&mut errors, cmd.amount_minor);
    if !(1..=12).contains(&cmd.month) {
        errors.add("month", "month must be between 1 and 12");
    }
    if cmd.year < MIN_BUDGET_YEAR {
        errors.add("year", format!("year must be {MIN_BUDGET_YEAR} or later"));
    }
    errors.into_result()?;

    Ok(BudgetCmd { category, ..cmd })
}
