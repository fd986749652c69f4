//! Julian Date helpers (Gregorian calendar, Meeus ch. 7) and ISO-8601 UTC text.

use thiserror::Error;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Gregorian calendar date to Julian Date. `day` may carry a fraction.
pub fn calendar_to_jd(year: i32, month: u32, day: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year as f64 - 1.0, month as f64 + 12.0)
    } else {
        (year as f64, month as f64)
    };
    let a = (y / 100.0).floor();
    let b = 2.0 - a + (a / 4.0).floor();
    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day + b - 1524.5
}

/// Julian Date to `(year, month, day_with_fraction)`.
pub fn jd_to_calendar(jd: f64) -> (i32, u32, f64) {
    let z = (jd + 0.5).floor();
    let f = jd + 0.5 - z;
    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36_524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };
    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();
    let day = b - d - (30.6001 * e).floor() + f;
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };
    (year as i32, month as u32, day)
}

/// Text that is not a supported ISO-8601 UTC timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid UTC timestamp {input:?}: {reason}")]
pub struct DateParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS[.fff]][Z]` into a Julian Date.
pub fn parse_iso_utc(text: &str) -> Result<f64, DateParseError> {
    let err = |reason| DateParseError {
        input: text.to_string(),
        reason,
    };
    let s = text.trim();
    let s = s.strip_suffix('Z').unwrap_or(s);
    let (date, time) = match s.split_once(['T', ' ']) {
        Some((d, t)) => (d, Some(t)),
        None => (s, None),
    };

    let mut parts = date.splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(err("expected YYYY-MM-DD"));
    };
    let year: i32 = y.parse().map_err(|_| err("bad year"))?;
    let month: u32 = m.parse().map_err(|_| err("bad month"))?;
    let day: u32 = d.parse().map_err(|_| err("bad day"))?;
    if !(1..=12).contains(&month) {
        return Err(err("month out of range"));
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(err("day out of range"));
    }

    let mut seconds_of_day = 0.0;
    if let Some(t) = time {
        let mut fields = t.split(':');
        let hour: u32 = fields
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| err("bad hour"))?;
        let minute: u32 = fields
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| err("bad minute"))?;
        let second: f64 = match fields.next() {
            Some(v) => v.parse().map_err(|_| err("bad second"))?,
            None => 0.0,
        };
        if fields.next().is_some() {
            return Err(err("too many time fields"));
        }
        if hour > 23 || minute > 59 || !(0.0..60.0).contains(&second) {
            return Err(err("time out of range"));
        }
        seconds_of_day = f64::from(hour * 3600 + minute * 60) + second;
    }

    Ok(calendar_to_jd(year, month, f64::from(day) + seconds_of_day / SECONDS_PER_DAY))
}

/// Format a Julian Date as `YYYY-MM-DDTHH:MM:SSZ`, rounded to the second.
pub fn format_iso_utc(jd: f64) -> String {
    let rounded = (jd * SECONDS_PER_DAY).round() / SECONDS_PER_DAY;
    let (year, month, day) = jd_to_calendar(rounded);
    let whole_day = day.floor();
    let secs = ((day - whole_day) * SECONDS_PER_DAY).round().min(86_399.0) as u32;
    format!(
        "{year:04}-{month:02}-{:02}T{:02}:{:02}:{:02}Z",
        whole_day as u32,
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 31,
    }
}
