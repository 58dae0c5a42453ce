//! Digest candidate loading and quota history persistence.
//!
//! # Invariants
//! - Candidates are every dose joined with its tag; history is optional.
//! - `save_histories` writes the whole batch in one IMMEDIATE transaction
//!   or nothing at all.

use crate::model::dose::Dose;
use crate::model::history::History;
use crate::model::tag::Tag;
use crate::repo::catalog_repo::parse_dose_row;
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// One dose together with the state needed to score it.
#[derive(Debug, Clone, PartialEq)]
pub struct DigestCandidate {
    pub dose: Dose,
    pub history: Option<History>,
    pub tag: Tag,
}

/// Storage contract consumed by digest generation.
pub trait DigestRepository {
    /// Loads every dose with its (possibly absent) history and its tag.
    fn list_candidates(&self) -> RepoResult<Vec<DigestCandidate>>;
    fn get_history(&self, dose_id: &str) -> RepoResult<Option<History>>;
    /// Upserts all histories atomically.
    fn save_histories(&mut self, histories: &[History]) -> RepoResult<()>;
}

impl<R: DigestRepository + ?Sized> DigestRepository for &mut R {
    fn list_candidates(&self) -> RepoResult<Vec<DigestCandidate>> {
        (**self).list_candidates()
    }

    fn get_history(&self, dose_id: &str) -> RepoResult<Option<History>> {
        (**self).get_history(dose_id)
    }

    fn save_histories(&mut self, histories: &[History]) -> RepoResult<()> {
        (**self).save_histories(histories)
    }
}

/// SQLite-backed digest repository.
pub struct SqliteDigestRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteDigestRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl DigestRepository for SqliteDigestRepository<'_> {
    fn list_candidates(&self) -> RepoResult<Vec<DigestCandidate>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                d.id,
                d.tag_name,
                d.frequency_type,
                d.frequency_count,
                d.frequency_period,
                d.message,
                h.dose_id AS history_dose_id,
                h.count_in_current_period,
                h.last_sent_at,
                t.demand
             FROM doses d
             INNER JOIN tags t ON t.name = d.tag_name
             LEFT JOIN history h ON h.dose_id = d.id
             ORDER BY d.id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut candidates = Vec::new();
        while let Some(row) = rows.next()? {
            let dose = parse_dose_row(row)?;
            let history = match row.get::<_, Option<String>>("history_dose_id")? {
                Some(dose_id) => Some(History {
                    dose_id,
                    count_in_current_period: parse_count(
                        row.get::<_, i64>("count_in_current_period")?,
                    )?,
                    last_sent_at: row.get::<_, Option<NaiveDateTime>>("last_sent_at")?,
                }),
                None => None,
            };
            let tag = Tag::new(dose.tag_name.clone(), row.get::<_, f64>("demand")?);
            candidates.push(DigestCandidate { dose, history, tag });
        }

        Ok(candidates)
    }

    fn get_history(&self, dose_id: &str) -> RepoResult<Option<History>> {
        let raw = self
            .conn
            .query_row(
                "SELECT dose_id, count_in_current_period, last_sent_at
                 FROM history
                 WHERE dose_id = ?1;",
                [dose_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Option<NaiveDateTime>>(2)?,
                    ))
                },
            )
            .optional()?;

        raw.map(|(dose_id, count, last_sent_at)| -> RepoResult<History> {
            Ok(History {
                dose_id,
                count_in_current_period: parse_count(count)?,
                last_sent_at,
            })
        })
        .transpose()
    }

    fn save_histories(&mut self, histories: &[History]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        for history in histories {
            tx.execute(
                "INSERT INTO history (dose_id, count_in_current_period, last_sent_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(dose_id) DO UPDATE SET
                    count_in_current_period = excluded.count_in_current_period,
                    last_sent_at = excluded.last_sent_at;",
                params![
                    history.dose_id.as_str(),
                    history.count_in_current_period,
                    history.last_sent_at,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn parse_count(value: i64) -> RepoResult<u32> {
    u32::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid count `{value}` in history.count_in_current_period"
        ))
    })
}
