// src/lib.rs

//! Catalog Crawler Library
//!
//! Walks a two-level course catalog (institutions, then programs), downloads
//! one document per program and stores it with its metadata in a tree keyed
//! by institution, program name and program code.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod session;
pub mod storage;
pub mod utils;
