//! Time expression resolution
//!
//! Turns the scanner's raw tokens (`now`, `2h`, `3hrs`, `13:00`, `-`) into
//! absolute UTC instants. Relative offsets resolve against an injected
//! reference instant (or an explicit anchor), absolute clock times resolve in
//! the requester's timezone with a today/tomorrow rollover.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static HOUR_OFFSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}[hrs]+").unwrap());
static CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d{1,2}):(\d{2})").unwrap());
static LEADING_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}").unwrap());

/// Errors from time resolution.
///
/// A token that merely fails to look like a time is not an error, it resolves
/// to "no time". An unknown timezone is a misconfigured requester record and
/// is surfaced distinctly.
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("unknown timezone identifier: {0}")]
    UnknownTimezone(String),
}

/// A classified time token, before resolution against a reference instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeExpr {
    /// `-`, `free`, or an empty/failed scan.
    Unspecified,
    Now,
    /// `Nh` / `Nhrs` style offsets, in whole hours.
    HourOffset(i64),
    /// A wall-clock `HH:MM` in the requester's timezone.
    Clock { hour: u32, minute: u32 },
}

/// Classify a sanitized token into a [`TimeExpr`].
///
/// The offset grammar is deliberately loose: any digits followed by letters
/// from `h`/`r`/`s` count as an hour offset, so `2h`, `3hrs` and even `2s`
/// all parse, with the leading digits taken as the hour count.
pub fn classify(token: &str) -> TimeExpr {
    match token {
        "" | "-" | "free" => return TimeExpr::Unspecified,
        "now" => return TimeExpr::Now,
        _ => {}
    }

    if HOUR_OFFSET.is_match(token) {
        if let Some(digits) = LEADING_DIGITS.find(token) {
            if let Ok(hours) = digits.as_str().parse() {
                return TimeExpr::HourOffset(hours);
            }
        }
    }

    if let Some(caps) = CLOCK.captures(token) {
        let hour = caps[1].parse().unwrap_or(0);
        let minute = caps[2].parse().unwrap_or(0);
        return TimeExpr::Clock { hour, minute };
    }

    debug!("unrecognized time token '{}', treating as unspecified", token);
    TimeExpr::Unspecified
}

/// Resolve a raw time token to an absolute UTC instant.
///
/// `anchor` is the already-resolved start time when this call resolves an end
/// token; offsets add to it instead of to `now`, so `now 1h` ends an hour
/// after the reservation starts regardless of when the message is processed.
pub fn resolve(
    token: &str,
    timezone: &str,
    now: DateTime<Utc>,
    anchor: Option<DateTime<Utc>>,
) -> Result<Option<DateTime<Utc>>, TimeError> {
    match classify(token) {
        TimeExpr::Unspecified => Ok(None),
        TimeExpr::Now => Ok(Some(now)),
        TimeExpr::HourOffset(hours) => Ok(Some(anchor.unwrap_or(now) + Duration::hours(hours))),
        TimeExpr::Clock { hour, minute } => resolve_clock(hour, minute, timezone, now),
    }
}

/// Look up a timezone identifier in the tz database.
pub(crate) fn parse_tz(timezone: &str) -> Result<Tz, TimeError> {
    timezone.parse().map_err(|_| TimeError::UnknownTimezone(timezone.to_string()))
}

/// Interpret `HH:MM` in the requester's timezone against the timezone-local
/// today, rolling over to tomorrow when the instant is already past.
fn resolve_clock(
    hour: u32,
    minute: u32,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, TimeError> {
    let tz = parse_tz(timezone)?;

    let time = match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => {
            debug!("clock token out of range ({:02}:{:02}), treating as unspecified", hour, minute);
            return Ok(None);
        }
    };

    let today = now.with_timezone(&tz).date_naive();
    let resolved = local_instant(tz, today, time);
    if resolved < now {
        Ok(Some(local_instant(tz, today + Duration::days(1), time)))
    } else {
        Ok(Some(resolved))
    }
}

/// Project a timezone-local date and time onto the UTC timeline. Ambiguous
/// local times (DST fall-back) take the earlier instant; nonexistent ones
/// (DST spring-forward) shift past the gap.
fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn frozen_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 13, 30, 0).unwrap()
    }

    #[test_case("", TimeExpr::Unspecified; "empty token")]
    #[test_case("-", TimeExpr::Unspecified; "dash")]
    #[test_case("free", TimeExpr::Unspecified; "free keyword")]
    #[test_case("now", TimeExpr::Now; "now keyword")]
    #[test_case("2h", TimeExpr::HourOffset(2); "single hour unit")]
    #[test_case("3hrs", TimeExpr::HourOffset(3); "plural hour unit")]
    #[test_case("12hr", TimeExpr::HourOffset(12); "two digit offset")]
    #[test_case("2s", TimeExpr::HourOffset(2); "loose unit letters")]
    #[test_case("13:00", TimeExpr::Clock { hour: 13, minute: 0 }; "clock time")]
    #[test_case("9:05", TimeExpr::Clock { hour: 9, minute: 5 }; "single digit hour")]
    #[test_case("soon", TimeExpr::Unspecified; "unrecognized word")]
    fn test_classify(token: &str, expected: TimeExpr) {
        assert_eq!(classify(token), expected);
    }

    #[test]
    fn test_resolve_now_returns_reference_instant() {
        let resolved = resolve("now", "UTC", frozen_now(), None).unwrap();
        assert_eq!(resolved, Some(frozen_now()));
    }

    #[test]
    fn test_resolve_offset_without_anchor_adds_to_now() {
        let resolved = resolve("2h", "UTC", frozen_now(), None).unwrap();
        assert_eq!(resolved, Some(Utc.with_ymd_and_hms(2000, 1, 1, 15, 30, 0).unwrap()));
    }

    #[test]
    fn test_resolve_offset_with_anchor_adds_to_anchor() {
        let anchor = Utc.with_ymd_and_hms(2000, 1, 1, 20, 0, 0).unwrap();
        let resolved = resolve("1h", "UTC", frozen_now(), Some(anchor)).unwrap();
        assert_eq!(resolved, Some(Utc.with_ymd_and_hms(2000, 1, 1, 21, 0, 0).unwrap()));
    }

    #[test]
    fn test_resolve_clock_later_today_stays_today() {
        let resolved = resolve("14:00", "UTC", frozen_now(), None).unwrap();
        assert_eq!(resolved, Some(Utc.with_ymd_and_hms(2000, 1, 1, 14, 0, 0).unwrap()));
    }

    #[test]
    fn test_resolve_clock_already_past_rolls_to_tomorrow() {
        let resolved = resolve("08:00", "UTC", frozen_now(), None).unwrap();
        assert_eq!(resolved, Some(Utc.with_ymd_and_hms(2000, 1, 2, 8, 0, 0).unwrap()));
    }

    #[test]
    fn test_resolve_clock_uses_timezone_local_today() {
        // 13:30 UTC is already past midnight in Melbourne (UTC+11 in
        // January), so "13:00" means Jan 2 local, which is still ahead.
        let resolved = resolve("13:00", "Australia/Melbourne", frozen_now(), None).unwrap();
        assert_eq!(resolved, Some(Utc.with_ymd_and_hms(2000, 1, 2, 2, 0, 0).unwrap()));
    }

    #[test]
    fn test_resolve_out_of_range_clock_degrades_to_unspecified() {
        let resolved = resolve("25:99", "UTC", frozen_now(), None).unwrap();
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_resolve_unknown_timezone_is_an_error() {
        let err = resolve("13:00", "Mars/Olympus", frozen_now(), None).unwrap_err();
        assert!(matches!(err, TimeError::UnknownTimezone(ref tz) if tz == "Mars/Olympus"));
    }

    #[test]
    fn test_resolve_unknown_timezone_untouched_for_relative_tokens() {
        // Only absolute clock times need the timezone database.
        assert_eq!(resolve("now", "Mars/Olympus", frozen_now(), None).unwrap(), Some(frozen_now()));
        assert!(resolve("2h", "Mars/Olympus", frozen_now(), None).is_ok());
    }
}
