use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Elapsed race time with millisecond precision.
///
/// Formats as `H:MM:SS`, or `H:MM:SS.mmm` when there is a sub-second part.
/// Parses `H:MM:SS`, `MM:SS` and either form with a fraction of up to three digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RunTime(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunTimeError {
    #[error("run time must not be empty")]
    Empty,
    #[error("invalid run time '{0}', expected H:MM:SS or H:MM:SS.mmm")]
    Format(String),
    #[error("run time must not be negative")]
    Negative,
}

impl RunTime {
    pub fn from_millis(millis: i64) -> Self {
        RunTime(millis)
    }

    pub fn try_from_millis(millis: i64) -> Result<Self, RunTimeError> {
        if millis < 0 {
            return Err(RunTimeError::Negative);
        }
        Ok(RunTime(millis))
    }

    /// Time elapsed between a gun start and a finish.
    pub fn between(
        start: chrono::DateTime<chrono::Utc>,
        finish: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, RunTimeError> {
        Self::try_from_millis((finish - start).num_milliseconds())
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RunTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = self.0 % 1000;
        let total_secs = self.0 / 1000;
        let hours = total_secs / 3600;
        let minutes = (total_secs % 3600) / 60;
        let seconds = total_secs % 60;

        write!(f, "{}:{:02}:{:02}", hours, minutes, seconds)?;
        if millis != 0 {
            write!(f, ".{:03}", millis)?;
        }
        Ok(())
    }
}

impl FromStr for RunTime {
    type Err = RunTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RunTimeError::Empty);
        }
        if s.starts_with('-') {
            return Err(RunTimeError::Negative);
        }
        let invalid = || RunTimeError::Format(s.to_string());

        let (clock, fraction) = match s.split_once('.') {
            Some((clock, fraction)) => (clock, Some(fraction)),
            None => (s, None),
        };

        let parts: Vec<&str> = clock.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [h, m, sec] => (parse_unit(h), parse_unit(m), parse_unit(sec)),
            [m, sec] => (Some(0), parse_unit(m), parse_unit(sec)),
            _ => return Err(invalid()),
        };
        let (hours, minutes, seconds) = match (hours, minutes, seconds) {
            (Some(h), Some(m), Some(sec)) if m < 60 && sec < 60 => (h, m, sec),
            _ => return Err(invalid()),
        };

        let millis = match fraction {
            None => 0,
            Some(f) if !f.is_empty() && f.len() <= 3 && f.chars().all(|c| c.is_ascii_digit()) => {
                let padded = format!("{:0<3}", f);
                padded.parse::<i64>().map_err(|_| invalid())?
            }
            Some(_) => return Err(invalid()),
        };

        hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes * 60 + seconds))
            .and_then(|secs| secs.checked_mul(1000))
            .and_then(|ms| ms.checked_add(millis))
            .map(RunTime)
            .ok_or_else(invalid)
    }
}

fn parse_unit(part: &str) -> Option<i64> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl Serialize for RunTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RunTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
