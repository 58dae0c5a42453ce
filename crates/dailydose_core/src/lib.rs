//! Core domain logic for Daily Dose.
//!
//! Picks which reminder doses go into each digest and keeps their quota
//! bookkeeping. This crate is the single source of truth for selection
//! invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod selection;
pub mod service;
pub mod settings;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dose::{Dose, DoseId, FrequencyKind, FrequencyPeriod};
pub use model::history::History;
pub use model::tag::Tag;
pub use model::validation::ValidationError;
pub use repo::catalog_repo::{CatalogRepository, SqliteCatalogRepository};
pub use repo::digest_repo::{DigestCandidate, DigestRepository, SqliteDigestRepository};
pub use repo::{RepoError, RepoResult};
pub use selection::{
    digests_remaining_in_period, run_auction, urgency_score, DigestTimings, Scored,
    UrgencyBreakdown,
};
pub use service::catalog_service::{CatalogError, CatalogService};
pub use service::digest_service::{DigestError, DigestService, ScoredDose};
pub use settings::{SelectionSettings, Settings, SettingsError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
