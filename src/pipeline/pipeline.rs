// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::{Config, Layout, WalkReport};
use crate::services::{DocumentTransfer, OperatorGate};
use crate::session::Automation;

use super::crawl::run_crawler;
use super::init::run_init;

/// Run the full pipeline: tree initialization, then the walk.
pub async fn run_pipeline<A: Automation>(
    config: &Config,
    session: &A,
    layout: Layout,
    transfer: &dyn DocumentTransfer,
    gate: &dyn OperatorGate,
) -> Result<WalkReport> {
    log::info!("[STEP 1/2] Init - Creating institution directories");
    run_init(config, session, layout).await?;

    log::info!("[STEP 2/2] Crawl - Materializing program nodes");
    run_crawler(config, session, layout, transfer, gate).await
}
