//! Duration and timestamp decoders.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use super::{FlagValue, Shape};
use crate::error::ValueError;

/// Timestamp text format: local time, no fraction, no offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Whether `text` is laid out exactly as `YYYY-MM-DDTHH:MM:SS`.
///
/// The chrono pattern alone accepts fields without zero padding.
fn is_timestamp_layout(text: &str) -> bool {
    text.len() == 19
        && text.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            10 => b == b'T',
            13 | 16 => b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Durations use the humantime grammar: unit-suffixed numbers such as
/// `3h4m5s`, `1h 30m` or `250ms`, with spaces allowed between parts and
/// longer units (`1day`, `2months`) accepted. Negative durations are
/// rejected.
impl FlagValue for Duration {
    fn shape() -> Shape {
        Shape::Duration
    }

    fn zero() -> Self {
        Duration::ZERO
    }

    fn is_zero(&self) -> bool {
        self.is_zero()
    }

    fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
        *self = humantime::parse_duration(text).map_err(|source| ValueError::Duration {
            text: text.to_string(),
            source,
        })?;
        Ok(())
    }

    fn flag_string(&self) -> String {
        humantime::format_duration(*self).to_string()
    }
}

impl FlagValue for DateTime<Local> {
    fn shape() -> Shape {
        Shape::Timestamp
    }

    fn zero() -> Self {
        DateTime::UNIX_EPOCH.with_timezone(&Local)
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn parse_flag(&mut self, text: &str) -> Result<(), ValueError> {
        if !is_timestamp_layout(text) {
            return Err(ValueError::Timestamp {
                text: text.to_string(),
                reason: "expected YYYY-MM-DDTHH:MM:SS".to_string(),
            });
        }
        let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).map_err(|e| {
            ValueError::Timestamp {
                text: text.to_string(),
                reason: e.to_string(),
            }
        })?;
        *self = Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| ValueError::Timestamp {
                text: text.to_string(),
                reason: "no such local time".to_string(),
            })?;
        Ok(())
    }

    fn flag_string(&self) -> String {
        self.format(TIMESTAMP_FORMAT).to_string()
    }
}
