//! Tag and dose catalog use-cases.
//!
//! # Invariants
//! - Tag names and dose ids are unique.
//! - A dose can only be created for an existing tag.

use crate::model::dose::Dose;
use crate::model::tag::Tag;
use crate::model::validation::ValidationError;
use crate::repo::catalog_repo::CatalogRepository;
use crate::repo::RepoError;
use log::{info, warn};

/// Service error for catalog use-cases.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("tag with name `{0}` already exists")]
    DuplicateTag(String),
    #[error("dose with id `{0}` already exists")]
    DuplicateDose(String),
    #[error("tag `{0}` does not exist")]
    UnknownTag(String),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Catalog service facade over repository implementations.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a tag after validating it and checking the name is free.
    pub fn create_tag(&self, tag: Tag) -> Result<Tag, CatalogError> {
        tag.validate()?;
        if self.repo.get_tag(&tag.name)?.is_some() {
            warn!("event=tag_create module=catalog status=error error_code=duplicate_tag");
            return Err(CatalogError::DuplicateTag(tag.name));
        }
        self.repo.create_tag(&tag)?;
        info!("event=tag_create module=catalog status=ok");
        Ok(tag)
    }

    pub fn get_tag(&self, name: &str) -> Result<Option<Tag>, CatalogError> {
        Ok(self.repo.get_tag(name)?)
    }

    pub fn list_tags(&self) -> Result<Vec<Tag>, CatalogError> {
        Ok(self.repo.list_tags()?)
    }

    /// Creates a dose after validating it, checking the id is free and that
    /// its tag exists.
    pub fn create_dose(&self, dose: Dose) -> Result<Dose, CatalogError> {
        dose.validate()?;
        if self.repo.get_dose(&dose.id)?.is_some() {
            warn!("event=dose_create module=catalog status=error error_code=duplicate_dose");
            return Err(CatalogError::DuplicateDose(dose.id));
        }
        if self.repo.get_tag(&dose.tag_name)?.is_none() {
            warn!("event=dose_create module=catalog status=error error_code=unknown_tag");
            return Err(CatalogError::UnknownTag(dose.tag_name));
        }
        self.repo.create_dose(&dose)?;
        info!(
            "event=dose_create module=catalog status=ok period={} kind={}",
            dose.frequency_period, dose.frequency_kind
        );
        Ok(dose)
    }

    pub fn get_dose(&self, id: &str) -> Result<Option<Dose>, CatalogError> {
        Ok(self.repo.get_dose(id)?)
    }

    pub fn list_doses(&self) -> Result<Vec<Dose>, CatalogError> {
        Ok(self.repo.list_doses()?)
    }
}
