// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;

/// Validate the configuration and log the effective settings.
pub fn run_validate(config: &Config) -> Result<()> {
    log::info!("Validating configuration...");

    match config.validate() {
        Ok(()) => {
            log::info!("✓ Config OK");
            log::info!("    Start URL: {}", config.catalog.start_url);
            log::info!("    WebDriver: {}", config.catalog.webdriver_url);
            log::info!("    Storage root: {}", config.storage.root_dir.display());
            log::info!(
                "    Minimum document size: {} bytes",
                config.storage.min_document_bytes
            );
            log::info!("    Transfer timeout: {}s", config.transfer.timeout_secs);
            Ok(())
        }
        Err(e) => {
            log::error!("Config validation failed: {}", e);
            Err(e)
        }
    }
}
