//! # Seeding
//!
//! Loads a JSON array of full spots, keyed the way the app serializes them
//! (`walkMinutes`, `displayOrder`, ...), and inserts each one as is.
//!
//! Unlike the CSV import nothing is derived: id, status, approval time, display
//! order and timestamps all come from the file. This is the path that sets
//! `displayOrder`, which the list sorts by.
//!
//! Rows are independent. A malformed or rejected row is counted and reported,
//! the rest still go in.
use std::{fs, path::Path};

use anyhow::{Context, Error, bail};
use indicatif::ProgressBar;
use serde_json::Value;
use spots::{RecordStore, SeedSpot, models::SafetyRank};
use tracing::{info, warn};

use crate::{import::ImportSummary, utils::progress_bar};

pub async fn seed_json(records: &dyn RecordStore, json_path: &Path) -> Result<ImportSummary, Error> {
    let contents = fs::read_to_string(json_path)
        .with_context(|| format!("{} not found", json_path.display()))?;

    let rows: Vec<Value> = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a JSON array", json_path.display()))?;

    info!("Seeding {} spots from {}", rows.len(), json_path.display());

    let pb = progress_bar(rows.len())?;
    let mut summary = ImportSummary::default();

    for (index, row) in rows.into_iter().enumerate() {
        match seed_row(records, row, &pb).await {
            Ok(name) => {
                pb.println(format!("✅ {name}"));
                summary.succeeded += 1;
            }
            Err(e) => {
                warn!("Row {index} failed: {e:#}");
                pb.println(format!("❌ {e:#}"));
                summary.failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    Ok(summary)
}

async fn seed_row(records: &dyn RecordStore, row: Value, pb: &ProgressBar) -> Result<String, Error> {
    let label = row["name"].as_str().unwrap_or("<unnamed>").to_string();
    let spot: SeedSpot = serde_json::from_value(row).with_context(|| label.clone())?;

    pb.set_message(spot.name.clone());

    if spot.walk_minutes == 0 {
        bail!("{}: walkMinutes must be positive", spot.name);
    }

    if SafetyRank::new(spot.safety_rank.into()).is_none() {
        bail!("{}: safetyRank {} is outside 1-5", spot.name, spot.safety_rank);
    }

    records
        .insert_row(&spot)
        .await
        .with_context(|| spot.name.clone())?;

    Ok(spot.name)
}
