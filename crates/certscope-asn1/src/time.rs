//! UTCTime and GeneralizedTime to ISO-8601.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

enum Zone {
    Utc,
    Offset(i32),
    Local,
}

/// Converts UTCTime text (`YYMMDDhhmm[ss]` followed by `Z` or `±hhmm`).
/// Two-digit years 50-99 map to 19xx, 00-49 to 20xx.
pub fn utc_time_to_iso(text: &str) -> Option<String> {
    let (body, zone) = split_zone(text)?;
    if matches!(zone, Zone::Local) {
        return None;
    }
    if !(body.len() == 10 || body.len() == 12) || !all_digits(body) {
        return None;
    }

    let yy = number(body, 0, 2)?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    let seconds = if body.len() == 12 { number(body, 10, 2)? } else { 0 };
    let datetime = build(
        year,
        number(body, 2, 2)?,
        number(body, 4, 2)?,
        number(body, 6, 2)?,
        number(body, 8, 2)?,
        seconds,
    )?;
    finish(datetime, None, zone)
}

/// Converts GeneralizedTime text (`YYYYMMDDhh[mm[ss[.f+]]]` with an optional
/// `Z` or `±hhmm`; no zone means local time and yields no offset suffix).
pub fn generalized_time_to_iso(text: &str) -> Option<String> {
    let (body, zone) = split_zone(text)?;
    let (digits, fraction) = match body.find(|c: char| c == '.' || c == ',') {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    if !matches!(digits.len(), 10 | 12 | 14) || !all_digits(digits) {
        return None;
    }
    if let Some(fraction) = fraction {
        if digits.len() != 14 || fraction.is_empty() || !all_digits(fraction) {
            return None;
        }
    }

    let minutes = if digits.len() >= 12 { number(digits, 10, 2)? } else { 0 };
    let seconds = if digits.len() == 14 { number(digits, 12, 2)? } else { 0 };
    let datetime = build(
        number(digits, 0, 4)?,
        number(digits, 4, 2)?,
        number(digits, 6, 2)?,
        number(digits, 8, 2)?,
        minutes,
        seconds,
    )?;
    finish(datetime, fraction, zone)
}

fn split_zone(text: &str) -> Option<(&str, Zone)> {
    if !text.is_ascii() {
        return None;
    }
    if let Some(body) = text.strip_suffix('Z') {
        return Some((body, Zone::Utc));
    }
    if text.len() > 5 {
        let (body, suffix) = text.split_at(text.len() - 5);
        let sign = match suffix.as_bytes()[0] {
            b'+' => 1,
            b'-' => -1,
            _ => return Some((text, Zone::Local)),
        };
        let digits = &suffix[1..];
        if !all_digits(digits) {
            return None;
        }
        let hours = number(digits, 0, 2)? as i32;
        let minutes = number(digits, 2, 2)? as i32;
        if minutes > 59 {
            return None;
        }
        return Some((body, Zone::Offset(sign * (hours * 3600 + minutes * 60))));
    }
    Some((text, Zone::Local))
}

fn build(year: u32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
    let time = NaiveTime::from_hms_opt(hour, min, sec)?;
    Some(NaiveDateTime::new(date, time))
}

fn finish(datetime: NaiveDateTime, fraction: Option<&str>, zone: Zone) -> Option<String> {
    let mut out = datetime.format("%Y-%m-%dT%H:%M:%S").to_string();
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    match zone {
        Zone::Utc => out.push('Z'),
        Zone::Offset(seconds) => out.push_str(&FixedOffset::east_opt(seconds)?.to_string()),
        Zone::Local => {}
    }
    Some(out)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn number(s: &str, start: usize, len: usize) -> Option<u32> {
    s.get(start..start + len)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_time_with_seconds() {
        assert_eq!(
            utc_time_to_iso("260207131915Z").as_deref(),
            Some("2026-02-07T13:19:15Z")
        );
    }

    #[test]
    fn test_utc_time_century_pivot() {
        assert_eq!(
            utc_time_to_iso("9912312359Z").as_deref(),
            Some("1999-12-31T23:59:00Z")
        );
        assert_eq!(
            utc_time_to_iso("491231235959Z").as_deref(),
            Some("2049-12-31T23:59:59Z")
        );
    }

    #[test]
    fn test_utc_time_with_offset() {
        assert_eq!(
            utc_time_to_iso("260207131915+0530").as_deref(),
            Some("2026-02-07T13:19:15+05:30")
        );
    }

    #[test]
    fn test_utc_time_requires_zone() {
        assert!(utc_time_to_iso("260207131915").is_none());
    }

    #[test]
    fn test_utc_time_rejects_bad_date() {
        assert!(utc_time_to_iso("260230131915Z").is_none());
        assert!(utc_time_to_iso("26020713191Z").is_none());
        assert!(utc_time_to_iso("2602071319aaZ").is_none());
    }

    #[test]
    fn test_generalized_time_forms() {
        assert_eq!(
            generalized_time_to_iso("21260114131915Z").as_deref(),
            Some("2126-01-14T13:19:15Z")
        );
        assert_eq!(
            generalized_time_to_iso("20240115103000.123Z").as_deref(),
            Some("2024-01-15T10:30:00.123Z")
        );
        assert_eq!(
            generalized_time_to_iso("2024011510").as_deref(),
            Some("2024-01-15T10:00:00")
        );
        assert_eq!(
            generalized_time_to_iso("20240115103000-0800").as_deref(),
            Some("2024-01-15T10:30:00-08:00")
        );
    }

    #[test]
    fn test_generalized_time_rejects_garbage() {
        assert!(generalized_time_to_iso("2024").is_none());
        assert!(generalized_time_to_iso("202401151030.5Z").is_none());
        assert!(generalized_time_to_iso("20241315103000Z").is_none());
    }
}
