//! Dose selection: period clock, urgency scoring and the slot auction.
//!
//! # Responsibility
//! - Count remaining digest opportunities in a quota period.
//! - Turn quota state and staleness into an urgency score.
//! - Pick the doses for one digest from scored candidates.
//!
//! # Invariants
//! - Everything in this module is pure apart from the injected `Rng`.
//! - An infinite score marks a mandatory dose; mandatory doses are never
//!   dropped, even when they overflow the digest size.

pub mod auction;
pub mod clock;
pub mod score;
pub mod timings;

pub use auction::{run_auction, sample_without_replacement, Scored};
pub use clock::{days_remaining_in_week, digests_remaining_in_period};
pub use score::{score_breakdown, urgency_score, UrgencyBreakdown};
pub use timings::{DigestTimings, TimingError};
