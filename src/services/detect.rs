// src/services/detect.rs

//! Layout variant detection.

use crate::error::Result;
use crate::models::{Config, Layout};
use crate::session::{Automation, settle};

/// Dismiss the consent banner if it is showing and report the resulting layout.
///
/// Runs once per session; the returned variant addresses every later lookup.
pub async fn detect_layout<A: Automation>(session: &A, config: &Config) -> Result<Layout> {
    settle(session, &config.timing.banner_probe).await?;

    let banner = &config.layout.banner_button;
    if !session.exists(banner).await? {
        log::info!("No banner present, using standard layout");
        return Ok(Layout::Standard);
    }

    let button = session.find(banner).await?;
    session.click(&button).await?;
    log::info!("Banner dismissed, using shifted layout");
    Ok(Layout::BannerDismissed)
}
