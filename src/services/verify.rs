// src/services/verify.rs

//! Post-walk count verification.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Discrepancy;

static EXPECTED_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Trovati (\d+) corsi").expect("valid count pattern"));

/// Program count announced by the results caption, `None` if absent.
pub fn parse_expected_count(caption: &str) -> Option<usize> {
    EXPECTED_COUNT
        .captures(caption)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Compare materialized nodes against the announced count.
pub fn check_count(institution: &str, found: usize, expected: usize) -> Option<Discrepancy> {
    (found != expected).then(|| Discrepancy {
        institution: institution.to_string(),
        found,
        expected,
    })
}
