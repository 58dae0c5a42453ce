//! Default catalog used by `dailydose seed`.

use dailydose_core::{
    CatalogError, CatalogRepository, CatalogService, Dose, FrequencyKind, FrequencyPeriod, Tag,
};
use serde::Serialize;

/// Counts of records written by one seed run.
#[derive(Debug, Default, Serialize)]
pub struct SeedReport {
    pub tags_created: usize,
    pub doses_created: usize,
    pub skipped: usize,
}

pub fn default_tags() -> Vec<Tag> {
    vec![
        Tag::new("exercise", 1.5),
        Tag::new("nutrition", 1.2),
        Tag::new("finance", 0.5),
    ]
}

pub fn default_doses() -> Vec<Dose> {
    vec![
        Dose::new(
            "complex_movement",
            "exercise",
            FrequencyKind::AtLeast,
            1,
            FrequencyPeriod::Day,
            "Do a compound movement today (Squat, Deadlift, or Bench).",
        ),
        Dose::new(
            "walk_10k",
            "exercise",
            FrequencyKind::AtLeast,
            3,
            FrequencyPeriod::Week,
            "Go for a long walk aiming for 10k steps.",
        ),
        Dose::new(
            "drink_water",
            "nutrition",
            FrequencyKind::AtLeast,
            1,
            FrequencyPeriod::Day,
            "Drink 8 glasses of water.",
        ),
        Dose::new(
            "check_balance",
            "finance",
            FrequencyKind::Exactly,
            1,
            FrequencyPeriod::Month,
            "Review your monthly expenses.",
        ),
    ]
}

/// Creates the default tags and doses; records that already exist are kept.
pub fn seed_defaults<R: CatalogRepository>(
    catalog: &CatalogService<R>,
) -> Result<SeedReport, CatalogError> {
    let mut report = SeedReport::default();
    for tag in default_tags() {
        match catalog.create_tag(tag) {
            Ok(_) => report.tags_created += 1,
            Err(CatalogError::DuplicateTag(_)) => report.skipped += 1,
            Err(err) => return Err(err),
        }
    }
    for dose in default_doses() {
        match catalog.create_dose(dose) {
            Ok(_) => report.doses_created += 1,
            Err(CatalogError::DuplicateDose(_)) => report.skipped += 1,
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}
