// src/pipeline/status.rs

//! Offline materialization report.

use crate::error::Result;
use crate::models::Config;
use crate::storage::{ContentStore, InstitutionStatus, LocalStore};

/// Scan the stored tree and log complete and incomplete nodes per institution.
pub async fn run_status(config: &Config) -> Result<Vec<InstitutionStatus>> {
    let store = LocalStore::from_config(&config.storage);
    let statuses = store.scan().await?;

    if statuses.is_empty() {
        log::info!("No institution tree at {}", store.root().display());
        return Ok(statuses);
    }

    let mut total = 0;
    for status in &statuses {
        total += status.materialized;
        log::info!(
            "{}: {} materialized, {} incomplete",
            status.institution,
            status.materialized,
            status.incomplete.len()
        );
        for dir in &status.incomplete {
            log::info!("    incomplete: {}", dir);
        }
    }
    log::info!(
        "{} institutions, {} materialized programs",
        statuses.len(),
        total
    );

    Ok(statuses)
}
