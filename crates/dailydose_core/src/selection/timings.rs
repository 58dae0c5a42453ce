//! Scheduled digest times of day.

use chrono::{NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static TIMING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("valid timing regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimingError {
    #[error("at least one digest timing is required")]
    Empty,
    #[error("invalid digest timing `{0}`; expected HH:MM (24h)")]
    Malformed(String),
}

/// Ordered, de-duplicated set of daily digest times.
///
/// Serialized as a list of `"HH:MM"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct DigestTimings {
    times: BTreeSet<NaiveTime>,
}

impl DigestTimings {
    /// Parses `"HH:MM"` values. Duplicates collapse into one slot.
    pub fn parse<I, S>(values: I) -> Result<Self, TimingError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut times = BTreeSet::new();
        for value in values {
            times.insert(parse_timing(value.as_ref())?);
        }
        if times.is_empty() {
            return Err(TimingError::Empty);
        }
        Ok(Self { times })
    }

    /// Number of digest runs per day.
    pub fn slots_per_day(&self) -> u32 {
        u32::try_from(self.times.len()).unwrap_or(u32::MAX)
    }

    /// Counts timings strictly later than `time`, at minute resolution.
    pub fn remaining_after(&self, time: NaiveTime) -> u32 {
        let cutoff = truncate_to_minute(time);
        let count = self.times.iter().filter(|slot| **slot > cutoff).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    pub fn to_strings(&self) -> Vec<String> {
        self.times
            .iter()
            .map(|time| time.format("%H:%M").to_string())
            .collect()
    }
}

/// One digest per day at 08:00.
impl Default for DigestTimings {
    fn default() -> Self {
        Self {
            times: NaiveTime::from_hms_opt(8, 0, 0).into_iter().collect(),
        }
    }
}

impl TryFrom<Vec<String>> for DigestTimings {
    type Error = TimingError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<DigestTimings> for Vec<String> {
    fn from(value: DigestTimings) -> Self {
        value.to_strings()
    }
}

fn parse_timing(value: &str) -> Result<NaiveTime, TimingError> {
    let trimmed = value.trim();
    let malformed = || TimingError::Malformed(value.to_string());
    let caps = TIMING_RE.captures(trimmed).ok_or_else(malformed)?;
    let hour = caps[1].parse::<u32>().map_err(|_| malformed())?;
    let minute = caps[2].parse::<u32>().map_err(|_| malformed())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(malformed)
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
