//! Per-dose quota bookkeeping.
//!
//! # Invariants
//! - `count_in_current_period` only increases here; resetting it at period
//!   boundaries is done outside core.
//! - `last_sent_at` is stamped with the digest time on every selection.

use crate::model::dose::DoseId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub dose_id: DoseId,
    pub count_in_current_period: u32,
    pub last_sent_at: Option<NaiveDateTime>,
}

impl History {
    /// Fresh history for a dose that has never been selected.
    pub fn new(dose_id: impl Into<DoseId>) -> Self {
        Self {
            dose_id: dose_id.into(),
            count_in_current_period: 0,
            last_sent_at: None,
        }
    }

    /// Records one delivery of the dose in the digest generated at `sent_at`.
    pub fn record_sent(&mut self, sent_at: NaiveDateTime) {
        self.count_in_current_period = self.count_in_current_period.saturating_add(1);
        self.last_sent_at = Some(sent_at);
    }
}

#[cfg(test)]
mod tests {
    use super::History;
    use chrono::NaiveDate;

    #[test]
    fn record_sent_increments_and_stamps() {
        let at = NaiveDate::from_ymd_opt(2023, 10, 25)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid datetime");
        let mut history = History::new("walk_10k");
        history.record_sent(at);
        history.record_sent(at);
        assert_eq!(history.count_in_current_period, 2);
        assert_eq!(history.last_sent_at, Some(at));
    }
}
