//! Remote last-modified timestamps.
//!
//! Services report modification times as ISO-8601-like strings such as
//! `2012-05-08T14:30:41.407Z`. They are compared as epoch milliseconds, never
//! as strings.

use std::fmt;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::error::TimestampError;

/// Milliseconds since the Unix epoch, UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(&self) -> i64 {
        self.0
    }

    /// Parse a remote timestamp.
    ///
    /// The string is split on `-`, `:`, `T` and `.`; the first six fields are
    /// year, month, day, hour, minute and second, and an optional seventh
    /// field is the fractional second (only millisecond precision is kept).
    /// A trailing `Z` is ignored and the value is read as UTC.
    ///
    /// ```
    /// use matrix_sheets_remote::Timestamp;
    ///
    /// let ts = Timestamp::parse("2012-05-08T14:30:41.407Z").unwrap();
    /// assert_eq!(ts.as_millis(), 1_336_487_441_407);
    /// ```
    pub fn parse(input: &str) -> Result<Self, TimestampError> {
        let trimmed = input.trim().trim_end_matches(['Z', 'z']);
        let fields: Vec<&str> = trimmed
            .split(['-', ':', 'T', 't', '.', ' '])
            .filter(|f| !f.is_empty())
            .collect();

        if fields.len() < 6 {
            return Err(TimestampError::TooFewFields(input.to_string()));
        }

        let mut parts = [0u32; 6];
        for (slot, field) in parts.iter_mut().zip(&fields) {
            *slot = field.parse().map_err(|_| TimestampError::NonNumeric {
                input: input.to_string(),
                field: field.to_string(),
            })?;
        }

        let millis = match fields.get(6) {
            Some(frac) => parse_fraction_millis(frac).ok_or_else(|| TimestampError::NonNumeric {
                input: input.to_string(),
                field: frac.to_string(),
            })?,
            None => 0,
        };

        let [year, month, day, hour, minute, second] = parts;
        let naive = NaiveDate::from_ymd_opt(year as i32, month, day)
            .and_then(|d| d.and_hms_milli_opt(hour, minute, second, millis))
            .ok_or_else(|| TimestampError::OutOfRange(input.to_string()))?;

        Ok(Self(Utc.from_utc_datetime(&naive).timestamp_millis()))
    }

    /// Format the way [`MemoryService`](crate::MemoryService) reports it.
    pub fn to_remote_string(&self) -> String {
        match Utc.timestamp_millis_opt(self.0).single() {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            None => self.0.to_string(),
        }
    }
}

/// Leading digits of a fractional second, scaled to milliseconds.
fn parse_fraction_millis(frac: &str) -> Option<u32> {
    if !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits: String = frac.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits.parse().ok()
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_remote_string())
    }
}
