//! Digest generation use-case.
//!
//! # Responsibility
//! - Load candidates, score them and run the slot auction.
//! - Record every selected dose in its quota history.
//!
//! # Invariants
//! - Read failures abort before any scoring.
//! - History updates for one digest are committed together or not at all.
//! - Unselected doses keep their history untouched.

use crate::model::dose::Dose;
use crate::model::history::History;
use crate::repo::digest_repo::DigestRepository;
use crate::repo::RepoError;
use crate::selection::auction::{run_auction, Scored};
use crate::selection::score::{score_breakdown, UrgencyBreakdown};
use crate::settings::{SelectionSettings, SettingsError};
use chrono::NaiveDateTime;
use log::{error, info};
use rand::Rng;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Scored view of one candidate, used for inspection without selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDose {
    pub dose: Dose,
    pub breakdown: UrgencyBreakdown,
}

/// Digest orchestrator over a [`DigestRepository`].
pub struct DigestService<R: DigestRepository> {
    repo: R,
    settings: SelectionSettings,
}

impl<R: DigestRepository> DigestService<R> {
    pub fn new(repo: R, settings: SelectionSettings) -> Self {
        Self { repo, settings }
    }

    /// Scores every candidate at `now` without selecting or persisting.
    pub fn preview_digest(&self, now: NaiveDateTime) -> Result<Vec<ScoredDose>, DigestError> {
        self.settings.validate()?;
        let candidates = self.repo.list_candidates()?;
        Ok(candidates
            .into_iter()
            .map(|candidate| {
                let breakdown = score_breakdown(
                    &candidate.dose,
                    candidate.history.as_ref(),
                    &candidate.tag,
                    now,
                    self.settings.alpha,
                    &self.settings.digest_timings,
                );
                ScoredDose {
                    dose: candidate.dose,
                    breakdown,
                }
            })
            .collect())
    }

    /// Generates the digest for `now` and records the selection.
    ///
    /// Returns the selected doses. Mandatory doses may push the result past
    /// the configured digest size.
    pub fn generate_digest<G: Rng>(
        &mut self,
        now: NaiveDateTime,
        rng: &mut G,
    ) -> Result<Vec<Dose>, DigestError> {
        let started_at = Instant::now();
        info!("event=digest_generate module=digest status=start");

        let scored = self.preview_digest(now).map_err(|err| {
            error!(
                "event=digest_generate module=digest status=error error_code=load_failed error={err}"
            );
            err
        })?;
        let candidate_count = scored.len();
        let mandatory_count = scored
            .iter()
            .filter(|candidate| candidate.breakdown.is_mandatory())
            .count();

        let selected = run_auction(
            scored
                .into_iter()
                .map(|candidate| Scored::new(candidate.dose, candidate.breakdown.score))
                .collect(),
            self.settings.digest_size,
            rng,
        );

        let mut updates = Vec::with_capacity(selected.len());
        for dose in &selected {
            let mut history = self
                .repo
                .get_history(&dose.id)?
                .unwrap_or_else(|| History::new(dose.id.clone()));
            history.record_sent(now);
            updates.push(history);
        }

        if let Err(err) = self.repo.save_histories(&updates) {
            error!(
                "event=history_commit module=digest status=error error_code=commit_failed rows={} error={err}",
                updates.len()
            );
            return Err(err.into());
        }

        info!(
            "event=digest_generate module=digest status=ok candidates={} mandatory={} selected={} duration_ms={}",
            candidate_count,
            mandatory_count,
            selected.len(),
            started_at.elapsed().as_millis()
        );
        Ok(selected)
    }
}
