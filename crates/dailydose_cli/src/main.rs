//! `dailydose` command-line entry point.
//!
//! # Responsibility
//! - Load settings, open the store and dispatch to core services.
//! - Print results as JSON on stdout.

mod seed;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use clap::{Parser, Subcommand};
use dailydose_core::db::open_db;
use dailydose_core::{
    init_logging, CatalogService, DigestService, Dose, FrequencyKind, FrequencyPeriod, Settings,
    SqliteCatalogRepository, SqliteDigestRepository, Tag,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Picks the reminder doses for each digest and tracks their quotas.
#[derive(Parser)]
#[command(name = "dailydose", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML settings file.
    #[arg(short, long, global = true, env = "DAILYDOSE_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides the database path from settings.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Creates the default tags and doses.
    Seed,
    /// Manages tags.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Manages doses.
    #[command(subcommand)]
    Dose(DoseCommand),
    /// Shows every dose's urgency score without recording anything.
    Scores {
        /// Digest time as `YYYY-MM-DDTHH:MM[:SS]`; defaults to now.
        #[arg(long, value_parser = parse_datetime)]
        at: Option<NaiveDateTime>,
    },
    /// Generates a digest and records the selected doses.
    Digest {
        /// Digest time as `YYYY-MM-DDTHH:MM[:SS]`; defaults to now.
        #[arg(long, value_parser = parse_datetime)]
        at: Option<NaiveDateTime>,
        /// Seeds the sampler for reproducible selection.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    Add {
        name: String,
        #[arg(long)]
        demand: f64,
    },
    List,
    Show {
        name: String,
    },
}

#[derive(Subcommand)]
enum DoseCommand {
    Add {
        id: String,
        #[arg(long)]
        tag: String,
        #[arg(long)]
        message: String,
        /// at-least | exactly | at-most
        #[arg(long, default_value = "at-least")]
        kind: FrequencyKind,
        #[arg(long)]
        count: u32,
        /// day | week | month
        #[arg(long)]
        period: FrequencyPeriod,
    },
    List,
    Show {
        id: String,
    },
}

#[derive(Serialize)]
struct ScoreRow {
    dose_id: String,
    mandatory: bool,
    /// `None` for mandatory doses (infinite score).
    score: Option<f64>,
    time_pressure: f64,
    demand: f64,
    quota_pressure: Option<f64>,
    digests_remaining: u32,
    doses_remaining: i64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    if let Some(db) = cli.db {
        settings.db_path = db;
    }
    if let Some(log_dir) = settings.log_dir.as_deref() {
        init_logging(&settings.log_level, &absolute(log_dir)?)
            .context("failed to initialize logging")?;
    }

    let mut conn = open_db(&settings.db_path)
        .with_context(|| format!("failed to open `{}`", settings.db_path.display()))?;

    match cli.command {
        Commands::Seed => {
            let catalog = CatalogService::new(SqliteCatalogRepository::new(&conn));
            print_json(&seed::seed_defaults(&catalog)?)
        }
        Commands::Tag(command) => {
            let catalog = CatalogService::new(SqliteCatalogRepository::new(&conn));
            match command {
                TagCommand::Add { name, demand } => {
                    print_json(&catalog.create_tag(Tag::new(name, demand))?)
                }
                TagCommand::List => print_json(&catalog.list_tags()?),
                TagCommand::Show { name } => {
                    let tag = catalog
                        .get_tag(&name)?
                        .with_context(|| format!("tag `{name}` not found"))?;
                    print_json(&tag)
                }
            }
        }
        Commands::Dose(command) => {
            let catalog = CatalogService::new(SqliteCatalogRepository::new(&conn));
            match command {
                DoseCommand::Add {
                    id,
                    tag,
                    message,
                    kind,
                    count,
                    period,
                } => print_json(&catalog.create_dose(Dose::new(id, tag, kind, count, period, message))?),
                DoseCommand::List => print_json(&catalog.list_doses()?),
                DoseCommand::Show { id } => {
                    let dose = catalog
                        .get_dose(&id)?
                        .with_context(|| format!("dose `{id}` not found"))?;
                    print_json(&dose)
                }
            }
        }
        Commands::Scores { at } => {
            let now = at.unwrap_or_else(local_now);
            let service =
                DigestService::new(SqliteDigestRepository::new(&mut conn), settings.selection);
            let rows: Vec<ScoreRow> = service
                .preview_digest(now)?
                .into_iter()
                .map(|scored| {
                    let breakdown = scored.breakdown;
                    ScoreRow {
                        dose_id: scored.dose.id,
                        mandatory: breakdown.is_mandatory(),
                        score: Some(breakdown.score).filter(|score| score.is_finite()),
                        time_pressure: breakdown.time_pressure,
                        demand: breakdown.demand,
                        quota_pressure: Some(breakdown.quota_pressure)
                            .filter(|pressure| pressure.is_finite()),
                        digests_remaining: breakdown.digests_remaining,
                        doses_remaining: breakdown.doses_remaining,
                    }
                })
                .collect();
            print_json(&rows)
        }
        Commands::Digest { at, seed } => {
            let now = at.unwrap_or_else(local_now);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let mut service =
                DigestService::new(SqliteDigestRepository::new(&mut conn), settings.selection);
            let selected = service.generate_digest(now, &mut rng)?;
            info!("event=cli_digest module=cli status=ok selected={}", selected.len());
            print_json(&selected)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_datetime(value: &str) -> Result<NaiveDateTime, String> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value.trim(), format).ok())
        .ok_or_else(|| format!("invalid datetime `{value}`; expected YYYY-MM-DDTHH:MM[:SS]"))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()
        .context("failed to resolve current directory")?
        .join(path))
}
