//! Helpers for the text fields of submitted forms.

use serde::{Deserialize, Deserializer};
use time::{Date, Time, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]");
const TIME_WITH_SECONDS_FORMAT: &[BorrowedFormatItem] =
    format_description!("[hour]:[minute]:[second]");

/// Parse a money amount typed by a user.
///
/// Both "12.50" and "12,50" are accepted. Returns `None` for blank or
/// non-finite input.
pub fn parse_amount(text: &str) -> Option<f64> {
    let normalised = text.trim().replace(',', ".");

    if normalised.is_empty() {
        return None;
    }

    normalised
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// The trimmed text, or `None` if it is blank.
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// Parse the value of an `<input type="date">`, e.g. "2025-03-02".
pub fn parse_date(text: &str) -> Option<Date> {
    Date::parse(text.trim(), DATE_FORMAT).ok()
}

/// Parse the value of an `<input type="time">`, e.g. "20:45" or "20:45:00".
pub fn parse_time(text: &str) -> Option<Time> {
    let text = text.trim();

    Time::parse(text, TIME_FORMAT)
        .or_else(|_| Time::parse(text, TIME_WITH_SECONDS_FORMAT))
        .ok()
}

/// The hour and minute of `time` as an `<input type="time">` expects, e.g. "09:05".
pub fn time_input_value(time: Time) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Deserialize an optional form field where an empty string means "not set".
///
/// HTML forms submit an empty string for a `<select>` whose placeholder
/// option is chosen.
pub fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let text = Option::<String>::deserialize(deserializer)?;

    match text.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
