//! # Date IDs
//!
//! Every message is keyed by a `YYYYMMDDhhmmss` string taken from the wall clock,
//! shifted by the configured UTC offset. The ID is both the primary key and the
//! creation time, and because the format is fixed width, lexicographic key order
//! in the store is creation order.
//!
//! Second precision means two inserts within the same second would collide on
//! the key and the second would overwrite the first. [`IdGenerator`] remembers
//! the last ID it handed out and never issues one that is not strictly greater:
//! when the clock has not moved past the last ID, the next ID is the last one
//! plus one second. The store seeds the generator with the greatest existing key
//! on open, so the guarantee survives restarts and offset changes.

use crate::error::{Result, TxtError};
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Timelike, Utc};

pub const ID_FORMAT: &str = "%Y%m%d%H%M%S";

#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: Option<NaiveDateTime>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that will only issue IDs greater than `last_id`.
    /// Unparseable IDs are ignored.
    pub fn seeded(last_id: Option<&str>) -> Self {
        let last = last_id.and_then(|id| NaiveDateTime::parse_from_str(id, ID_FORMAT).ok());
        Self { last }
    }

    pub fn next_id(&mut self, offset: &str) -> Result<String> {
        let offset = parse_offset(offset)?;
        Ok(self.next_at(Utc::now(), offset))
    }

    fn next_at(&mut self, now: DateTime<Utc>, offset: FixedOffset) -> String {
        let local = now.with_timezone(&offset).naive_local();
        let mut candidate = local.with_nanosecond(0).unwrap_or(local);
        if let Some(last) = self.last {
            if candidate <= last {
                candidate = last + Duration::seconds(1);
            }
        }
        self.last = Some(candidate);
        candidate.format(ID_FORMAT).to_string()
    }
}

/// True when `s` reads as a message ID.
pub fn is_id(s: &str) -> bool {
    NaiveDateTime::parse_from_str(s, ID_FORMAT).is_ok()
}

/// The creation time encoded in `id`, read in `offset`.
///
/// IDs do not record the offset they were made with; after an offset change
/// older IDs are read in the new one.
pub fn created_at(id: &str, offset: &str) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(id, ID_FORMAT).ok()?;
    let offset = parse_offset(offset).ok()?;
    offset.from_local_datetime(&naive).single()
}

/// Parses a UTC offset such as `"+8"`, `"-5"`, `"+5:30"` or `"-3h30m"`.
pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    let invalid = || TxtError::InvalidOffset(s.to_string());
    let trimmed = s.trim();
    let (sign, rest) = match trimmed.chars().next() {
        Some('+') => (1, &trimmed[1..]),
        Some('-') => (-1, &trimmed[1..]),
        _ => (1, trimmed),
    };

    let seconds = if let Some((h, m)) = rest.split_once(':') {
        let hours = digits(h).ok_or_else(invalid)?;
        let minutes = digits(m).filter(|m| *m < 60).ok_or_else(invalid)?;
        hours * 3600 + minutes * 60
    } else if rest.ends_with('h') || rest.ends_with('m') {
        unit_seconds(rest).ok_or_else(invalid)?
    } else {
        digits(rest).ok_or_else(invalid)? * 3600
    };

    FixedOffset::east_opt(sign * seconds).ok_or_else(invalid)
}

fn digits(s: &str) -> Option<i32> {
    if s.is_empty() || s.len() > 4 || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `"8h"`, `"30m"`, `"5h30m"`. Hours must come before minutes.
fn unit_seconds(s: &str) -> Option<i32> {
    let (hours, minutes) = match s.split_once('h') {
        Some((h, "")) => (digits(h)?, 0),
        Some((h, m)) => (digits(h)?, digits(m.strip_suffix('m')?)?),
        None => (0, digits(s.strip_suffix('m')?)?),
    };
    Some(hours * 3600 + minutes * 60)
}
