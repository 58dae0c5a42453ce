//! Dose (reminder item) model and its frequency requirement.
//!
//! # Invariants
//! - `id` is non-empty and never reused for another dose.
//! - `frequency_count` is at least 1.
//! - Doses are immutable after creation.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable caller-chosen identifier, e.g. `walk_10k`.
pub type DoseId = String;

/// How the frequency count should be read.
///
/// Scoring currently treats every kind like `AtLeast`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FrequencyKind {
    AtLeast,
    Exactly,
    AtMost,
}

/// Quota window a frequency count applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyPeriod {
    Day,
    /// Ends on Saturday; Sunday opens the next week.
    Week,
    Month,
}

impl FrequencyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AtLeast => "at-least",
            Self::Exactly => "exactly",
            Self::AtMost => "at-most",
        }
    }
}

impl FromStr for FrequencyKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "at-least" | "at_least" => Ok(Self::AtLeast),
            "exactly" => Ok(Self::Exactly),
            "at-most" | "at_most" => Ok(Self::AtMost),
            _ => Err(ValidationError::InvalidFrequencyKind(value.to_string())),
        }
    }
}

impl Display for FrequencyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FrequencyPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl FromStr for FrequencyPeriod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(ValidationError::InvalidPeriod(value.to_string())),
        }
    }
}

impl Display for FrequencyPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reminder unit with a frequency requirement.
///
/// Field names follow the external JSON shape (`frequency_type`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dose {
    pub id: DoseId,
    pub tag_name: String,
    #[serde(rename = "frequency_type")]
    pub frequency_kind: FrequencyKind,
    pub frequency_count: u32,
    pub frequency_period: FrequencyPeriod,
    pub message: String,
}

impl Dose {
    pub fn new(
        id: impl Into<DoseId>,
        tag_name: impl Into<String>,
        frequency_kind: FrequencyKind,
        frequency_count: u32,
        frequency_period: FrequencyPeriod,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            tag_name: tag_name.into(),
            frequency_kind,
            frequency_count,
            frequency_period,
            message: message.into(),
        }
    }

    /// Checks identity and frequency invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyDoseId);
        }
        if self.tag_name.trim().is_empty() {
            return Err(ValidationError::MissingTagReference(self.id.clone()));
        }
        if self.frequency_count == 0 {
            return Err(ValidationError::InvalidFrequencyCount(0));
        }
        Ok(())
    }
}
