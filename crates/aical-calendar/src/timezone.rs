//! Timezone helpers for displaying and requesting calendar times
//!
//! Best-effort formatting only: anything that cannot be parsed is passed
//! through unchanged.

use chrono::{DateTime, NaiveDate, Offset, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Zone used when none is configured
pub const DEFAULT_TIMEZONE: &str = "Asia/Bangkok";

/// Zones offered for selection
pub const COMMON_TIMEZONES: [&str; 10] = [
    "Asia/Bangkok",
    "Asia/Ho_Chi_Minh",
    "Asia/Jakarta",
    "Asia/Shanghai",
    "Asia/Tokyo",
    "America/New_York",
    "America/Los_Angeles",
    "Europe/London",
    "Europe/Paris",
    "UTC",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneInfo {
    /// IANA zone name, e.g. `Asia/Bangkok`
    pub value: String,
    /// `"Asia/Bangkok (GMT+07:00)"`
    pub label: String,
    /// `"GMT+07:00"`
    pub offset: String,
}

impl TimezoneInfo {
    fn new(zone: &str, offset_minutes: i32) -> Self {
        let offset = format_offset(offset_minutes);
        Self {
            value: zone.to_string(),
            label: format!("{} ({})", zone, offset),
            offset,
        }
    }
}

/// The selection table with the offsets in effect now
pub fn common_timezones() -> Vec<TimezoneInfo> {
    common_timezones_at(Utc::now())
}

/// The selection table with the offsets in effect at `at`
pub fn common_timezones_at(at: DateTime<Utc>) -> Vec<TimezoneInfo> {
    COMMON_TIMEZONES
        .iter()
        .map(|zone| timezone_info_at(zone, at))
        .collect()
}

fn parse_zone(zone: &str) -> Option<Tz> {
    zone.trim().parse::<Tz>().ok()
}

/// Offset of `zone` from UTC at `at`, in minutes. Unknown zones give 0.
pub fn offset_minutes(zone: &str, at: DateTime<Utc>) -> i32 {
    parse_zone(zone)
        .map(|tz| tz.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc() / 60)
        .unwrap_or(0)
}

/// Format an offset as `GMT±HH:MM`
pub fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes >= 0 { '+' } else { '-' };
    let abs = offset_minutes.unsigned_abs();
    format!("GMT{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// Offset information for `zone` at a given instant
pub fn timezone_info_at(zone: &str, at: DateTime<Utc>) -> TimezoneInfo {
    TimezoneInfo::new(zone, offset_minutes(zone, at))
}

/// Render a backend date string as `MM/DD/YYYY, HH:MM` in `zone`.
///
/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (taken as UTC
/// midnight). Strings containing a space are assumed to be formatted
/// already. Anything else, or an unknown zone, comes back unchanged.
pub fn convert_to_timezone(date: &str, zone: &str) -> String {
    let Some(tz) = parse_zone(zone) else {
        return date.to_string();
    };

    let instant = if date.contains('T') {
        DateTime::parse_from_rfc3339(date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    } else if date.contains(' ') {
        None
    } else {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    };

    match instant {
        Some(instant) => instant
            .with_timezone(&tz)
            .format("%m/%d/%Y, %H:%M")
            .to_string(),
        None => date.to_string(),
    }
}

/// Format an instant for backend requests as `YYYY-MM-DD HH:MM:SS` in
/// `zone`, or RFC 3339 UTC when the zone is unknown.
pub fn format_date_for_api(instant: DateTime<Utc>, zone: &str) -> String {
    match parse_zone(zone) {
        Some(tz) => instant
            .with_timezone(&tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => instant.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Rewrite an RFC 3339 timestamp into the backend's local format for
/// `zone`. Other strings are assumed to be in that format already.
pub fn normalize_for_api(date: &str, zone: &str) -> String {
    match DateTime::parse_from_rfc3339(date.trim()) {
        Ok(dt) => format_date_for_api(dt.with_timezone(&Utc), zone),
        Err(_) => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(420), "GMT+07:00");
        assert_eq!(format_offset(0), "GMT+00:00");
        assert_eq!(format_offset(-300), "GMT-05:00");
        assert_eq!(format_offset(330), "GMT+05:30");
        assert_eq!(format_offset(-210), "GMT-03:30");
    }

    #[test]
    fn test_common_timezones_use_current_offsets() {
        let winter = common_timezones_at(instant("2025-01-15T12:00:00Z"));
        assert_eq!(winter.len(), 10);
        assert_eq!(winter[0].value, DEFAULT_TIMEZONE);
        assert_eq!(winter[0].label, "Asia/Bangkok (GMT+07:00)");
        assert_eq!(winter[5].offset, "GMT-05:00");
        assert!(winter.iter().all(|z| z.value.parse::<Tz>().is_ok()));

        let summer = common_timezones_at(instant("2025-07-15T12:00:00Z"));
        assert_eq!(summer[5].label, "America/New_York (GMT-04:00)");
        assert_eq!(summer[8].offset, "GMT+02:00");
    }

    #[test]
    fn test_offset_minutes_follows_dst() {
        let winter = instant("2025-01-15T12:00:00Z");
        let summer = instant("2025-07-15T12:00:00Z");

        assert_eq!(offset_minutes("Asia/Bangkok", winter), 420);
        assert_eq!(offset_minutes("America/New_York", winter), -300);
        assert_eq!(offset_minutes("America/New_York", summer), -240);
        assert_eq!(offset_minutes("Not/AZone", summer), 0);
    }

    #[test]
    fn test_timezone_info_at() {
        let info = timezone_info_at("Europe/Paris", instant("2025-07-15T12:00:00Z"));
        assert_eq!(info.label, "Europe/Paris (GMT+02:00)");
        assert_eq!(info.offset, "GMT+02:00");

        let unknown = timezone_info_at("Mars/Base", instant("2025-07-15T12:00:00Z"));
        assert_eq!(unknown.offset, "GMT+00:00");
    }

    #[test]
    fn test_convert_rfc3339() {
        assert_eq!(
            convert_to_timezone("2025-06-02T02:00:00Z", "Asia/Bangkok"),
            "06/02/2025, 09:00"
        );
        assert_eq!(
            convert_to_timezone("2025-06-02T09:00:00+07:00", "Asia/Tokyo"),
            "06/02/2025, 11:00"
        );
    }

    #[test]
    fn test_convert_date_only() {
        assert_eq!(
            convert_to_timezone("2025-06-02", "America/New_York"),
            "06/01/2025, 20:00"
        );
    }

    #[test]
    fn test_convert_passthrough() {
        assert_eq!(
            convert_to_timezone("2025-06-02 09:00:00", "Asia/Bangkok"),
            "2025-06-02 09:00:00"
        );
        assert_eq!(convert_to_timezone("tomorrow", "Asia/Bangkok"), "tomorrow");
        assert_eq!(
            convert_to_timezone("2025-06-02T02:00:00Z", "Nowhere/City"),
            "2025-06-02T02:00:00Z"
        );
    }

    #[test]
    fn test_format_date_for_api() {
        let at = instant("2025-06-02T02:30:15Z");
        assert_eq!(format_date_for_api(at, "Asia/Bangkok"), "2025-06-02 09:30:15");
        assert_eq!(format_date_for_api(at, "bogus"), "2025-06-02T02:30:15.000Z");
    }

    #[test]
    fn test_normalize_for_api() {
        assert_eq!(
            normalize_for_api("2025-06-02T02:00:00Z", "Asia/Bangkok"),
            "2025-06-02 09:00:00"
        );
        assert_eq!(
            normalize_for_api("2025-06-02T09:00:00+09:00", "Asia/Bangkok"),
            "2025-06-02 07:00:00"
        );
        assert_eq!(normalize_for_api("2025-06-02", "Asia/Bangkok"), "2025-06-02");
        assert_eq!(
            normalize_for_api("2025-06-02 09:00:00", "Asia/Bangkok"),
            "2025-06-02 09:00:00"
        );
    }
}
