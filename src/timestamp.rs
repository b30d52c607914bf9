use chrono::{Local, NaiveDateTime, SubsecRound, TimeDelta};

/// Wire and file format for every timestamp these tools produce.
///
/// Local wall-clock time without an offset, always with microseconds, so two
/// stamps compare correctly as plain strings (the gift server relies on that).
pub const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Console form, with a space in place of the `T`.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Current local time, cut to the precision [`ISO_FORMAT`] can carry.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(6)
}

pub fn format_iso(t: &NaiveDateTime) -> String {
    t.format(ISO_FORMAT).to_string()
}

pub fn format_display(t: &NaiveDateTime) -> String {
    t.format(DISPLAY_FORMAT).to_string()
}

/// Accepts `2024-05-01T10:00:00` with or without fractional seconds, and the
/// space-separated form TOML allows for local date-times.
pub fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// The span during which a gift can be claimed. Both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ValidityWindow {
    pub fn starting_at(start: NaiveDateTime, days: i64) -> Self {
        Self {
            start,
            end: start + TimeDelta::days(days),
        }
    }

    pub fn contains(&self, t: &NaiveDateTime) -> bool {
        self.start <= *t && *t <= self.end
    }

    pub fn len(&self) -> TimeDelta {
        self.end - self.start
    }
}
