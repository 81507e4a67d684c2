//! Field checks shared by the services.

use chrono::{NaiveDate, NaiveTime};
use isenior_core::{Error, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

pub fn non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// `YYYY-MM-DD`, zero-padded.
pub fn date(field: &str, value: &str) -> Result<NaiveDate> {
    if value.len() != 10 {
        return Err(Error::validation(format!(
            "{field} must be a date formatted YYYY-MM-DD, got '{value}'"
        )));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        Error::validation(format!("{field} must be a date formatted YYYY-MM-DD, got '{value}'"))
    })
}

/// `HH:MM`, 24-hour clock.
pub fn time(field: &str, value: &str) -> Result<NaiveTime> {
    if value.len() != 5 {
        return Err(Error::validation(format!(
            "{field} must be a time formatted HH:MM, got '{value}'"
        )));
    }
    NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| {
        Error::validation(format!("{field} must be a time formatted HH:MM, got '{value}'"))
    })
}

/// Like [`time`], but `None` and blank strings pass.
pub fn optional_time(field: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => time(field, v).map(|_| ()),
        _ => Ok(()),
    }
}
