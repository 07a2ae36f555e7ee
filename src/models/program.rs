//! Program record data structure.

use serde::{Deserialize, Serialize};

/// Metadata extracted from one catalog result row.
///
/// Serialized verbatim into `metadata.txt`; the field names on disk are the
/// catalog's own column keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgramRecord {
    /// Program display name
    pub name: String,

    /// Degree level codes (e.g. "L-31")
    #[serde(rename = "cds_codes")]
    pub codes: Vec<String>,

    /// Cities where the program is taught
    pub cities: Vec<String>,

    /// Teaching language label
    pub language: String,

    /// Access type label (open, limited, ...)
    #[serde(rename = "type_of_access")]
    pub access_type: String,

    /// Admission test label
    #[serde(rename = "test_access")]
    pub admission_test: String,

    /// Delivery mode label (in person, online, ...)
    #[serde(rename = "mod")]
    pub delivery_mode: String,

    /// Duration in years, empty when the icon is unrecognised
    pub duration: String,

    /// Degree award label
    pub degree_type: String,

    /// External numeric program code
    #[serde(rename = "sua_code")]
    pub external_code: String,
}

impl ProgramRecord {
    /// Serialize to the flat textual object stored in `metadata.txt`.
    pub fn to_metadata(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
