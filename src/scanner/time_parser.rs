//! Posting times as tori.fi prints them: `tänään 14:30`, `eilen 09:05` or
//! `3 tou 18:45`.
//!
//! The page never shows a year, so absolute dates always land in the year of
//! `now`. An ad from late December read in early January therefore comes out
//! almost a year in the future. Known limitation.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

const TODAY: &str = "tänään";
const YESTERDAY: &str = "eilen";

const FIN_MONTHS: [(&str, u32); 12] = [
    ("tam", 1),
    ("hel", 2),
    ("maa", 3),
    ("huh", 4),
    ("tou", 5),
    ("kes", 6),
    ("hei", 7),
    ("elo", 8),
    ("syy", 9),
    ("lok", 10),
    ("mar", 11),
    ("jou", 12),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("empty time text")]
    Empty,
    #[error("expected 3 tokens, found {0}")]
    TokenCount(usize),
    #[error("unknown month abbreviation: {0}")]
    UnknownMonth(String),
    #[error("invalid day of month: {0}")]
    InvalidDay(String),
    #[error("no such date: {year}-{month:02}-{day:02}")]
    InvalidDate { day: u32, month: u32, year: i32 },
    #[error("invalid time of day: {0}")]
    InvalidTime(String),
}

pub fn month_number(abbreviation: &str) -> Option<u32> {
    FIN_MONTHS
        .iter()
        .find(|(name, _)| *name == abbreviation)
        .map(|(_, number)| *number)
}

/// Converts a posting-time fragment into a local timestamp relative to `now`.
pub fn parse_posted_at(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime, TimeParseError> {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let tokens: Vec<&str> = normalized.split(' ').filter(|t| !t.is_empty()).collect();
    let last = *tokens.last().ok_or(TimeParseError::Empty)?;

    let date = if normalized.contains(TODAY) {
        now.date()
    } else if normalized.contains(YESTERDAY) {
        now.date() - Duration::days(1)
    } else {
        parse_absolute_date(&tokens, now.year())?
    };

    let time = NaiveTime::parse_from_str(last, "%H:%M")
        .map_err(|_| TimeParseError::InvalidTime(last.to_string()))?;

    Ok(date.and_time(time))
}

fn parse_absolute_date(tokens: &[&str], year: i32) -> Result<NaiveDate, TimeParseError> {
    let [day, month, _time] = tokens else {
        return Err(TimeParseError::TokenCount(tokens.len()));
    };

    let month =
        month_number(month).ok_or_else(|| TimeParseError::UnknownMonth(month.to_string()))?;
    let day: u32 = day
        .parse()
        .map_err(|_| TimeParseError::InvalidDay(day.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(TimeParseError::InvalidDate { day, month, year })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(14, 45, 0)
            .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_today() {
        assert_eq!(parse_posted_at("tänään 14:30", now()), Ok(at(2024, 3, 1, 14, 30)));
        assert_eq!(parse_posted_at("  Tänään\n 00:00 ", now()), Ok(at(2024, 3, 1, 0, 0)));
    }

    #[test]
    fn test_yesterday_crosses_month_and_leap_day() {
        assert_eq!(parse_posted_at("eilen 23:59", now()), Ok(at(2024, 2, 29, 23, 59)));
        assert_eq!(parse_posted_at("EILEN\t07:05", now()), Ok(at(2024, 2, 29, 7, 5)));
    }

    #[test]
    fn test_absolute_date_uses_current_year() {
        assert_eq!(parse_posted_at("3 tou 18:45", now()), Ok(at(2024, 5, 3, 18, 45)));
        assert_eq!(parse_posted_at("28 jou 09:00", now()), Ok(at(2024, 12, 28, 9, 0)));
    }

    #[test]
    fn test_every_month_abbreviation() {
        let names = [
            "tam", "hel", "maa", "huh", "tou", "kes", "hei", "elo", "syy", "lok", "mar", "jou",
        ];
        for (i, name) in names.iter().enumerate() {
            let parsed = parse_posted_at(&format!("1 {name} 12:00"), now()).unwrap();
            assert_eq!(parsed.month(), i as u32 + 1, "{name}");
        }
    }

    #[test]
    fn test_unknown_month() {
        assert_eq!(
            parse_posted_at("3 may 18:45", now()),
            Err(TimeParseError::UnknownMonth("may".to_string()))
        );
    }

    #[test]
    fn test_wrong_token_count() {
        assert_eq!(parse_posted_at("3 tou", now()), Err(TimeParseError::TokenCount(2)));
        assert_eq!(
            parse_posted_at("3 tou 2024 18:45", now()),
            Err(TimeParseError::TokenCount(4))
        );
        assert_eq!(parse_posted_at("   ", now()), Err(TimeParseError::Empty));
    }

    #[test]
    fn test_malformed_time_and_day() {
        assert_eq!(
            parse_posted_at("tänään 25:10", now()),
            Err(TimeParseError::InvalidTime("25:10".to_string()))
        );
        assert_eq!(
            parse_posted_at("eilen", now()),
            Err(TimeParseError::InvalidTime("eilen".to_string()))
        );
        assert_eq!(
            parse_posted_at("x tou 12:00", now()),
            Err(TimeParseError::InvalidDay("x".to_string()))
        );
        assert_eq!(
            parse_posted_at("31 hel 12:00", now()),
            Err(TimeParseError::InvalidDate { day: 31, month: 2, year: 2024 })
        );
    }
}
