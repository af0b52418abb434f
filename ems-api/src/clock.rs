//! Clock and timezone source.
//!
//! Handlers never call `Utc::now()` directly; they read the managed
//! [`ClockHandle`] so tests can pin the current instant.

use std::sync::{Arc, Mutex};

use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Zone used when a tenant has no timezone configured, or an unusable one.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;

pub trait Clock: Send + Sync {
    /// Current instant as naive UTC.
    fn now_utc(&self) -> NaiveDateTime;
}

pub type ClockHandle = Arc<dyn Clock>;

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }
}

/// A clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        let mut guard = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *guard = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

// Windows-style names that older tenant settings still carry.
const ZONE_ALIASES: &[(&str, Tz)] = &[
    ("India Standard Time", chrono_tz::Asia::Kolkata),
    ("UTC", chrono_tz::UTC),
    ("GMT Standard Time", chrono_tz::Europe::London),
    ("Eastern Standard Time", chrono_tz::America::New_York),
    ("Central Standard Time", chrono_tz::America::Chicago),
    ("Pacific Standard Time", chrono_tz::America::Los_Angeles),
    ("W. Europe Standard Time", chrono_tz::Europe::Berlin),
    ("Singapore Standard Time", chrono_tz::Asia::Singapore),
];

/// Parses an IANA identifier or one of the known aliases.
pub fn parse_timezone(id: &str) -> Option<Tz> {
    let trimmed = id.trim();
    if let Ok(tz) = trimmed.parse::<Tz>() {
        return Some(tz);
    }
    ZONE_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(trimmed))
        .map(|(_, tz)| *tz)
}

/// Resolves the tenant zone, silently falling back to `fallback` when the
/// identifier is missing or unknown.
pub fn resolve_timezone(id: Option<&str>, fallback: Tz) -> Tz {
    id.and_then(parse_timezone).unwrap_or(fallback)
}

/// Converts a naive UTC instant into wall-clock time in `tz`.
pub fn to_local(utc: NaiveDateTime, tz: Tz) -> NaiveDateTime {
    tz.from_utc_datetime(&utc).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn iana_and_alias_names_resolve() {
        assert_eq!(parse_timezone("Europe/Paris"), Some(chrono_tz::Europe::Paris));
        assert_eq!(parse_timezone("india standard time"), Some(chrono_tz::Asia::Kolkata));
        assert_eq!(parse_timezone("Mars/Olympus_Mons"), None);
    }

    #[test]
    fn unknown_zone_falls_back() {
        assert_eq!(resolve_timezone(Some("Nowhere/Special"), DEFAULT_TIMEZONE), DEFAULT_TIMEZONE);
        assert_eq!(resolve_timezone(None, chrono_tz::UTC), chrono_tz::UTC);
    }

    #[test]
    fn local_conversion_crosses_midnight() {
        // 20:00 UTC is 01:30 the next day in Kolkata.
        let local = to_local(utc(20, 0), chrono_tz::Asia::Kolkata);
        assert_eq!(local.date(), NaiveDate::from_ymd_opt(2025, 3, 11).unwrap());
        assert_eq!(local.format("%H:%M").to_string(), "01:30");
    }

    #[test]
    fn fixed_clock_moves_only_when_told() {
        let clock = FixedClock::new(utc(4, 0));
        assert_eq!(clock.now_utc(), utc(4, 0));
        clock.advance(chrono::Duration::minutes(15));
        assert_eq!(clock.now_utc(), utc(4, 15));
        clock.set(utc(9, 0));
        assert_eq!(clock.now_utc(), utc(9, 0));
    }
}
