// src/pipeline/init.rs

//! Institution tree pipeline.

use crate::error::Result;
use crate::models::{Config, Layout};
use crate::services::create_institution_tree;
use crate::session::Automation;
use crate::storage::LocalStore;

/// Pre-create one directory per institution under the configured root.
pub async fn run_init<A: Automation>(
    config: &Config,
    session: &A,
    layout: Layout,
) -> Result<Vec<String>> {
    log::info!("****Start institution tree creation****");
    let store = LocalStore::from_config(&config.storage);
    create_institution_tree(session, &store, layout, &config.layout).await
}
