//! Pipeline entry points for crawler operations.
//!
//! - `run_init`: Create the institution tree
//! - `run_crawler`: Walk the catalog and materialize program nodes
//! - `run_pipeline`: Both, in that order
//! - `run_status`: Report materialization state without a browser
//! - `run_validate`: Check the configuration

pub mod crawl;
pub mod init;
pub mod pipeline;
pub mod status;
pub mod validate;

pub use crawl::run_crawler;
pub use init::run_init;
pub use pipeline::run_pipeline;
pub use status::run_status;
pub use validate::run_validate;
