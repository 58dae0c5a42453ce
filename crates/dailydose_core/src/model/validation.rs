//! Validation errors shared by tag and dose models.

/// Rejection reasons for tag/dose records and their textual fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("tag name cannot be empty")]
    EmptyTagName,
    #[error("tag demand must be a finite number greater than 0, got {0}")]
    InvalidDemand(f64),
    #[error("dose id cannot be empty")]
    EmptyDoseId,
    #[error("dose `{0}` must reference a tag")]
    MissingTagReference(String),
    #[error("frequency count must be greater than 0, got {0}")]
    InvalidFrequencyCount(i64),
    #[error("unknown frequency period `{0}`; expected day|week|month")]
    InvalidPeriod(String),
    #[error("unknown frequency type `{0}`; expected at-least|exactly|at-most")]
    InvalidFrequencyKind(String),
}
