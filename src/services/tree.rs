// src/services/tree.rs

//! Institution tree initialization.

use std::path::Path;

use crate::error::Result;
use crate::models::{Layout, LayoutSelectors};
use crate::session::Automation;
use crate::storage::{ContentStore, institution_dir};

/// Create one directory per institution listed in the selection control.
///
/// The first option is the "choose one" placeholder and is skipped.
/// Existing directories are left untouched. Returns the institution labels.
pub async fn create_institution_tree<A: Automation>(
    session: &A,
    store: &dyn ContentStore,
    layout: Layout,
    selectors: &LayoutSelectors,
) -> Result<Vec<String>> {
    store.ensure_dir(Path::new("")).await?;
    log::info!("Creating institution tree under {}", store.path(Path::new("")).display());

    let options = session.find_all(&layout.institution_options(selectors)).await?;
    let mut institutions = Vec::with_capacity(options.len().saturating_sub(1));

    for option in options.iter().skip(1) {
        let label = session.text(option).await?.trim().to_string();
        if label.is_empty() {
            log::warn!("Skipping institution option with empty label");
            continue;
        }
        log::debug!("{}", label);
        store.ensure_dir(&institution_dir(&label)).await?;
        institutions.push(label);
    }

    log::info!("{} institution directories ready", institutions.len());
    Ok(institutions)
}
