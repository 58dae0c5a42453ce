//! Urgency scoring for a single dose.
//!
//! Score `P = T * D + alpha * Q` where
//! - `T` is whole calendar days since the dose was last sent (0 if never),
//! - `D` is the tag demand,
//! - `Q` is quota pressure: 0 once the quota is met, infinite when every
//!   remaining digest is needed, otherwise `1 / spare_digests`.

use crate::model::dose::Dose;
use crate::model::history::History;
use crate::model::tag::Tag;
use crate::selection::clock::digests_remaining_in_period;
use crate::selection::timings::DigestTimings;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Intermediate terms of one urgency computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UrgencyBreakdown {
    pub time_pressure: f64,
    pub demand: f64,
    pub quota_pressure: f64,
    pub digests_remaining: u32,
    pub doses_remaining: i64,
    pub score: f64,
}

impl UrgencyBreakdown {
    /// Mandatory doses cannot meet their quota unless sent now.
    pub fn is_mandatory(&self) -> bool {
        self.quota_pressure.is_infinite()
    }
}

/// Computes the urgency score of `dose`, in `[0, +inf]`.
pub fn urgency_score(
    dose: &Dose,
    history: Option<&History>,
    tag: &Tag,
    now: NaiveDateTime,
    alpha: f64,
    timings: &DigestTimings,
) -> f64 {
    score_breakdown(dose, history, tag, now, alpha, timings).score
}

/// Same as [`urgency_score`] but keeps every term for inspection.
pub fn score_breakdown(
    dose: &Dose,
    history: Option<&History>,
    tag: &Tag,
    now: NaiveDateTime,
    alpha: f64,
    timings: &DigestTimings,
) -> UrgencyBreakdown {
    let time_pressure = history
        .and_then(|history| history.last_sent_at)
        .map_or(0.0, |last_sent| {
            let days = now.date().signed_duration_since(last_sent.date()).num_days();
            days.max(0) as f64
        });

    let demand = tag.demand;

    let digests_remaining = digests_remaining_in_period(now, dose.frequency_period, timings);
    let current_count = history.map_or(0, |history| history.count_in_current_period);
    let doses_remaining = i64::from(dose.frequency_count) - i64::from(current_count);

    // `doses_remaining >= digests_remaining` also covers a zero denominator.
    let quota_pressure = if doses_remaining <= 0 {
        0.0
    } else if doses_remaining >= i64::from(digests_remaining) {
        f64::INFINITY
    } else {
        1.0 / (i64::from(digests_remaining) - doses_remaining) as f64
    };

    // Only an unreachable quota may score infinite; huge finite terms that
    // overflow are pinned to the largest finite weight.
    let score = if quota_pressure.is_infinite() {
        f64::INFINITY
    } else {
        (time_pressure * demand + alpha * quota_pressure).min(f64::MAX)
    };

    UrgencyBreakdown {
        time_pressure,
        demand,
        quota_pressure,
        digests_remaining,
        doses_remaining,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::{score_breakdown, urgency_score};
    use crate::model::dose::{Dose, FrequencyKind, FrequencyPeriod};
    use crate::model::history::History;
    use crate::model::tag::Tag;
    use crate::selection::timings::DigestTimings;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn wednesday() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 10, 25)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid datetime")
    }

    fn noon() -> DigestTimings {
        DigestTimings::parse(["12:00"]).expect("valid timings")
    }

    fn weekly(count: u32) -> Dose {
        Dose::new("1", "test", FrequencyKind::AtLeast, count, FrequencyPeriod::Week, "msg")
    }

    fn history(count: u32, last_sent_at: Option<NaiveDateTime>) -> History {
        History {
            dose_id: "1".to_string(),
            count_in_current_period: count,
            last_sent_at,
        }
    }

    #[test]
    fn never_sent_dose_scores_quota_pressure_only() {
        let breakdown = score_breakdown(
            &weekly(1),
            None,
            &Tag::new("test", 1.0),
            wednesday(),
            1.0,
            &noon(),
        );
        assert_eq!(breakdown.digests_remaining, 4);
        assert_eq!(breakdown.doses_remaining, 1);
        assert_eq!(breakdown.time_pressure, 0.0);
        assert!((breakdown.score - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn staleness_adds_days_times_demand() {
        let last = wednesday() - Duration::days(2);
        let score = urgency_score(
            &weekly(1),
            Some(&history(0, Some(last))),
            &Tag::new("test", 1.0),
            wednesday(),
            1.0,
            &noon(),
        );
        assert!((score - (2.0 + 1.0 / 3.0)).abs() < 1e-9);

        let doubled = urgency_score(
            &weekly(1),
            Some(&history(0, Some(last))),
            &Tag::new("test", 2.0),
            wednesday(),
            1.0,
            &noon(),
        );
        assert!((doubled - (4.0 + 1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn time_pressure_uses_calendar_days_not_elapsed_hours() {
        // 23:59 the previous evening is one calendar day before.
        let last = wednesday() - Duration::minutes(1);
        let breakdown = score_breakdown(
            &weekly(1),
            Some(&history(0, Some(last))),
            &Tag::new("test", 1.0),
            wednesday(),
            1.0,
            &noon(),
        );
        assert_eq!(breakdown.time_pressure, 1.0);
    }

    #[test]
    fn last_sent_in_the_future_clamps_to_zero() {
        let last = wednesday() + Duration::days(3);
        let breakdown = score_breakdown(
            &weekly(1),
            Some(&history(0, Some(last))),
            &Tag::new("test", 1.0),
            wednesday(),
            1.0,
            &noon(),
        );
        assert_eq!(breakdown.time_pressure, 0.0);
    }

    #[test]
    fn quota_met_scores_zero_without_staleness() {
        let score = urgency_score(
            &weekly(1),
            Some(&history(1, None)),
            &Tag::new("test", 1.0),
            wednesday(),
            10.0,
            &noon(),
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn unreachable_quota_is_infinite() {
        // Friday with one slot per day: Fri + Sat remain.
        let friday = wednesday() + Duration::days(2);
        let breakdown = score_breakdown(
            &weekly(3),
            None,
            &Tag::new("test", 1.0),
            friday,
            1.0,
            &noon(),
        );
        assert_eq!(breakdown.digests_remaining, 2);
        assert!(breakdown.is_mandatory());

        // Exactly as many doses left as digests also forces selection.
        let exact = urgency_score(&weekly(2), None, &Tag::new("test", 1.0), friday, 1.0, &noon());
        assert_eq!(exact, f64::INFINITY);
    }

    #[test]
    fn no_remaining_digests_with_outstanding_quota_is_infinite() {
        let late = wednesday() + Duration::days(3) + Duration::hours(13);
        let breakdown = score_breakdown(
            &weekly(1),
            None,
            &Tag::new("test", 1.0),
            late,
            1.0,
            &noon(),
        );
        assert_eq!(breakdown.digests_remaining, 0);
        assert!(breakdown.is_mandatory());
    }

    #[test]
    fn overflowing_finite_terms_stay_optional() {
        let last = wednesday() - Duration::days(2);
        let breakdown = score_breakdown(
            &weekly(1),
            Some(&history(0, Some(last))),
            &Tag::new("test", f64::MAX / 2.0),
            wednesday(),
            f64::MAX,
            &noon(),
        );
        assert!((breakdown.quota_pressure - 1.0 / 3.0).abs() < 1e-9);
        assert!(breakdown.score.is_finite());
        assert_eq!(breakdown.score, f64::MAX);
        assert!(!breakdown.is_mandatory());
    }

    #[test]
    fn exactly_kind_scores_like_at_least() {
        let mut exactly = weekly(1);
        exactly.frequency_kind = FrequencyKind::Exactly;
        let tag = Tag::new("test", 1.0);
        assert_eq!(
            urgency_score(&exactly, None, &tag, wednesday(), 1.0, &noon()),
            urgency_score(&weekly(1), None, &tag, wednesday(), 1.0, &noon())
        );
    }
}
