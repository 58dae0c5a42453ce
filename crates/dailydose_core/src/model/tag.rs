//! Tag (category) model.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Grouping of doses with a demand weight.
///
/// Higher demand makes stale doses of this tag more urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub demand: f64,
}

impl Tag {
    pub fn new(name: impl Into<String>, demand: f64) -> Self {
        Self {
            name: name.into(),
            demand,
        }
    }

    /// Checks name and demand invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyTagName);
        }
        if !self.demand.is_finite() || self.demand <= 0.0 {
            return Err(ValidationError::InvalidDemand(self.demand));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Tag;
    use crate::model::validation::ValidationError;

    #[test]
    fn validate_rejects_non_positive_and_nan_demand() {
        assert_eq!(
            Tag::new("health", 0.0).validate(),
            Err(ValidationError::InvalidDemand(0.0))
        );
        assert!(Tag::new("health", f64::NAN).validate().is_err());
        assert!(Tag::new("health", f64::INFINITY).validate().is_err());
        assert!(Tag::new("health", 0.5).validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_name() {
        assert_eq!(
            Tag::new("  ", 1.0).validate(),
            Err(ValidationError::EmptyTagName)
        );
    }
}
