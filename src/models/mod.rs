// src/models/mod.rs

//! Domain models for the catalog crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod layout;
mod program;
mod report;

// Re-export all public types
pub use config::{CatalogConfig, Config, Settle, StorageConfig, TimingConfig, TransferConfig};
pub use layout::{Layout, LayoutSelectors};
pub use program::ProgramRecord;
pub use report::{Discrepancy, WalkReport};
