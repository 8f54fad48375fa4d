//! Due date parsing and formatting.
//!
//! Due dates are picked as calendar days and stored as the UTC instant of
//! local midnight on that day.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};

/// Parse human-readable due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "next monday", "next tuesday", etc.
/// - "this friday", "this weekend"
/// - "end of week", "end of month"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD" format
pub fn parse_due_input_on(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => {
            let (_, end) = start_end_of_week(today);
            return Some(end);
        }
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            // Coming Saturday
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let unit_at = rest.char_indices().last().map_or(0, |(i, _)| i);
        let (count, unit) = rest.split_at(unit_at);
        if let Ok(n) = count.trim().parse::<i64>() {
            // Approximate: 30 days per month
            let offset = match unit {
                "d" => Duration::try_days(n),
                "w" => Duration::try_weeks(n),
                "m" => n.checked_mul(30).and_then(Duration::try_days),
                _ => None,
            };
            if let Some(offset) = offset {
                return today.checked_add_signed(offset);
            }
        }
    }

    let weekdays = [
        ("monday", 0), ("tuesday", 1), ("wednesday", 2), ("thursday", 3),
        ("friday", 4), ("saturday", 5), ("sunday", 6),
        ("mon", 0), ("tue", 1), ("wed", 2), ("thu", 3),
        ("fri", 4), ("sat", 5), ("sun", 6),
    ];
    let current = today.weekday().num_days_from_monday() as i64;
    for (name, target) in weekdays {
        let days_ahead = (target + 7 - current) % 7;
        if s == name || s == format!("this {name}") {
            return Some(today + Duration::days(days_ahead));
        }
        if s == format!("next {name}") {
            let days = if days_ahead == 0 { 7 } else { days_ahead + 7 };
            return Some(today + Duration::days(days));
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

/// Monday and Sunday of the ISO week containing `today`.
pub fn start_end_of_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let weekday = today.weekday().num_days_from_monday() as i64;
    let start = today - Duration::days(weekday);
    (start, start + Duration::days(6))
}

/// UTC instant of local midnight on `date`.
pub fn local_midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Local calendar day of a stored due instant.
pub fn due_day(due: DateTime<Utc>) -> NaiveDate {
    due.with_timezone(&Local).date_naive()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<DateTime<Utc>>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (due_day(d) - today).num_days();
            match delta {
                0 => "today".into(),
                1 => "tomorrow".into(),
                n if n > 1 => format!("in {n}d"),
                n => format!("{}d late", -n),
            }
        }
    }
}
