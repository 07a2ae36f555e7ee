//! Service layer for the catalog crawler.
//!
//! This module contains the business logic for:
//! - Layout detection (`detect_layout`)
//! - Institution tree initialization (`create_institution_tree`)
//! - Row attribute extraction (`RowExtractor`)
//! - Document download (`download`, `HttpTransfer`)
//! - Catalog traversal (`CatalogWalker`)
//! - Count verification and operator escalation (`check_count`, `OperatorGate`)

pub mod detect;
pub mod downloader;
pub mod extractor;
pub mod gate;
pub mod tree;
pub mod verify;
pub mod walker;

pub use detect::detect_layout;
pub use downloader::{DocumentTransfer, DownloadOutcome, HttpTransfer, download};
pub use extractor::RowExtractor;
pub use gate::{ConsoleGate, LogOnlyGate, OperatorGate};
pub use tree::create_institution_tree;
pub use verify::{check_count, parse_expected_count};
pub use walker::CatalogWalker;
