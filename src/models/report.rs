//! Walk outcome and verification report structures.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Count mismatch between the catalog's summary and the materialized nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub institution: String,
    pub found: usize,
    pub expected: usize,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ERROR IN {}: FOUND {} EXPECTED {}",
            self.institution, self.found, self.expected
        )
    }
}

/// Summary of a catalog walk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalkReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub institutions: usize,
    pub rows_seen: usize,
    /// Rows whose node was already materialized
    pub skipped: usize,
    /// Rows committed during this walk
    pub materialized: usize,
    pub download_failures: usize,
    pub discrepancies: Vec<Discrepancy>,
}

impl WalkReport {
    pub fn started() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            institutions: 0,
            rows_seen: 0,
            skipped: 0,
            materialized: 0,
            download_failures: 0,
            discrepancies: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.end_time = Utc::now();
    }

    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty() && self.download_failures == 0
    }

    /// Key/value pairs for the closing summary log.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        let elapsed = self.end_time - self.start_time;
        vec![
            ("Institutions", self.institutions.to_string()),
            ("Rows seen", self.rows_seen.to_string()),
            ("Already materialized", self.skipped.to_string()),
            ("Materialized now", self.materialized.to_string()),
            ("Download failures", self.download_failures.to_string()),
            ("Discrepancies", self.discrepancies.len().to_string()),
            ("Elapsed", format!("{}s", elapsed.num_seconds())),
        ]
    }
}
