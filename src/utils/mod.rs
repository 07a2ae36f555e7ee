//! Utility functions and helpers.

pub mod http;
pub mod sanitize;
pub mod url;

pub use sanitize::sanitize;
