//! Small HTML helpers shared by the page templates.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::domain::ApplicationStatus;

/// Displays its text with HTML special characters escaped.
#[derive(Debug, Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut last = 0;
        for (index, ch) in self.0.char_indices() {
            let replacement = match ch {
                '&' => "&amp;",
                '<' => "&lt;",
                '>' => "&gt;",
                '"' => "&quot;",
                '\'' => "&#39;",
                _ => continue,
            };
            f.write_str(&self.0[last..index])?;
            f.write_str(replacement)?;
            last = index + ch.len_utf8();
        }
        f.write_str(&self.0[last..])
    }
}

pub fn escape(raw: &str) -> String {
    Escaped(raw).to_string()
}

/// First `limit` characters followed by `...`.
pub fn excerpt(text: &str, limit: usize) -> String {
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

/// Short calendar date (`M/D/YYYY`) for the timestamp shapes the backend emits.
///
/// Unparseable values are shown as-is; missing values as `Unknown`.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return "Unknown".to_string();
    };

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|value| value.date_naive())
        .or_else(|_| DateTime::parse_from_rfc2822(raw).map(|value| value.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|v| v.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|v| v.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format("%-m/%-d/%Y").to_string(),
        Err(_) => escape(raw),
    }
}

pub const fn status_badge(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Pending => "bg-warning text-dark",
        ApplicationStatus::Approved => "bg-success",
        ApplicationStatus::Rejected => "bg-danger",
        ApplicationStatus::Unknown => "bg-secondary",
    }
}
