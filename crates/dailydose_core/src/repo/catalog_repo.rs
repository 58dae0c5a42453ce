//! Tag/dose repository contract and SQLite implementation.
//!
//! # Invariants
//! - Tags are keyed by name, doses by id.
//! - Doses reference an existing tag (foreign key).

use crate::model::dose::{Dose, FrequencyKind, FrequencyPeriod};
use crate::model::tag::Tag;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const DOSE_SELECT_SQL: &str = "SELECT
    id,
    tag_name,
    frequency_type,
    frequency_count,
    frequency_period,
    message
FROM doses";

/// Repository interface for tag and dose records.
pub trait CatalogRepository {
    fn create_tag(&self, tag: &Tag) -> RepoResult<()>;
    fn get_tag(&self, name: &str) -> RepoResult<Option<Tag>>;
    /// Returns every tag sorted by name.
    fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    fn create_dose(&self, dose: &Dose) -> RepoResult<()>;
    fn get_dose(&self, id: &str) -> RepoResult<Option<Dose>>;
    /// Returns every dose sorted by id.
    fn list_doses(&self) -> RepoResult<Vec<Dose>>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_tag(&self, tag: &Tag) -> RepoResult<()> {
        tag.validate()?;
        self.conn.execute(
            "INSERT INTO tags (name, demand) VALUES (?1, ?2);",
            params![tag.name.as_str(), tag.demand],
        )?;
        Ok(())
    }

    fn get_tag(&self, name: &str) -> RepoResult<Option<Tag>> {
        let tag = self
            .conn
            .query_row(
                "SELECT name, demand FROM tags WHERE name = ?1;",
                [name],
                |row| Ok(Tag::new(row.get::<_, String>(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(tag)
    }

    fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, demand FROM tags ORDER BY name ASC;")?;
        let tags = stmt
            .query_map([], |row| Ok(Tag::new(row.get::<_, String>(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    fn create_dose(&self, dose: &Dose) -> RepoResult<()> {
        dose.validate()?;
        self.conn.execute(
            "INSERT INTO doses (
                id,
                tag_name,
                frequency_type,
                frequency_count,
                frequency_period,
                message
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                dose.id.as_str(),
                dose.tag_name.as_str(),
                dose.frequency_kind.as_str(),
                dose.frequency_count,
                dose.frequency_period.as_str(),
                dose.message.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_dose(&self, id: &str) -> RepoResult<Option<Dose>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOSE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_dose_row(row)?));
        }
        Ok(None)
    }

    fn list_doses(&self) -> RepoResult<Vec<Dose>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOSE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut doses = Vec::new();
        while let Some(row) = rows.next()? {
            doses.push(parse_dose_row(row)?);
        }
        Ok(doses)
    }
}

/// Parses the dose columns of `row`; unknown kinds/periods are rejected.
pub(crate) fn parse_dose_row(row: &Row<'_>) -> RepoResult<Dose> {
    let kind_text: String = row.get("frequency_type")?;
    let period_text: String = row.get("frequency_period")?;
    let count: i64 = row.get("frequency_count")?;
    let frequency_count = u32::try_from(count).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid frequency_count `{count}` in doses.frequency_count"
        ))
    })?;

    let dose = Dose {
        id: row.get("id")?,
        tag_name: row.get("tag_name")?,
        frequency_kind: kind_text.parse::<FrequencyKind>()?,
        frequency_count,
        frequency_period: period_text.parse::<FrequencyPeriod>()?,
        message: row.get("message")?,
    };
    dose.validate()?;
    Ok(dose)
}
