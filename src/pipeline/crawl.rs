// src/pipeline/crawl.rs

//! Catalog crawling pipeline.

use crate::error::Result;
use crate::models::{Config, Layout, WalkReport};
use crate::services::{CatalogWalker, DocumentTransfer, OperatorGate};
use crate::session::Automation;
use crate::storage::LocalStore;

/// Walk the catalog and materialize every missing program node.
pub async fn run_crawler<A: Automation>(
    config: &Config,
    session: &A,
    layout: Layout,
    transfer: &dyn DocumentTransfer,
    gate: &dyn OperatorGate,
) -> Result<WalkReport> {
    log::info!("****Start catalog walk****");
    log::info!("Storing nodes under {}", config.storage.root_dir.display());

    let store = LocalStore::from_config(&config.storage);
    let walker = CatalogWalker::new(session, &store, transfer, gate, config, layout)?;
    let report = walker.walk().await?;

    if report.is_consistent() {
        log::info!("✓ Catalog walk complete, all counts verified");
    } else {
        log::warn!(
            "Catalog walk complete with {} discrepancies and {} failed downloads",
            report.discrepancies.len(),
            report.download_failures
        );
    }

    Ok(report)
}
