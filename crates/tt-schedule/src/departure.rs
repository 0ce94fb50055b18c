//! Departure-time parsing.
//!
//! Accepted encodings (surrounding whitespace ignored):
//!
//! | Input      | Meaning  |
//! |------------|----------|
//! | `07:30`    | 07:30    |
//! | `07:30:45` | 07:30:45 (seconds are truncated) |
//! | `730`      | 07:30, compact survey encoding `HMM` |
//! | `0730`     | 07:30, compact `HHMM` |
//!
//! Anything else, or an impossible time such as `25:00` or `0761`, is
//! rejected.

use chrono::{NaiveTime, Timelike};

/// Minutes since midnight for `raw`, or `None` if it cannot be parsed.
pub fn parse_departure(raw: &str) -> Option<u32> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let time = if s.contains(':') {
        NaiveTime::parse_from_str(s, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
            .ok()?
    } else {
        compact(s)?
    };
    Some(time.hour() * 60 + time.minute())
}

/// `HMM` / `HHMM` digits, as written by the upstream survey tables.
fn compact(s: &str) -> Option<NaiveTime> {
    if !(3..=4).contains(&s.len()) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: u32 = s.parse().ok()?;
    NaiveTime::from_hms_opt(n / 100, n % 100, 0)
}
