// src/models/layout.rs

//! Page layout variants and the XPath locations addressed within them.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// XPath locations of the catalog page elements.
///
/// Paths ending in `_path` are relative to the layout root chosen by
/// [`Layout::root`]; the banner and root paths are absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutSelectors {
    /// Close button of the consent banner
    #[serde(default = "defaults::banner_button")]
    pub banner_button: String,

    /// Content root while the banner markup is present
    #[serde(default = "defaults::standard_root")]
    pub standard_root: String,

    /// Content root once the banner has been dismissed
    #[serde(default = "defaults::dismissed_root")]
    pub dismissed_root: String,

    #[serde(default = "defaults::institution_select_path")]
    pub institution_select_path: String,

    #[serde(default = "defaults::search_button_path")]
    pub search_button_path: String,

    #[serde(default = "defaults::results_table_path")]
    pub results_table_path: String,

    #[serde(default = "defaults::results_heading_path")]
    pub results_heading_path: String,

    /// Caption holding "Trovati N corsi"
    #[serde(default = "defaults::results_summary_path")]
    pub results_summary_path: String,

    /// Document link on the program detail view
    #[serde(default = "defaults::detail_document_path")]
    pub detail_document_path: String,
}

impl Default for LayoutSelectors {
    fn default() -> Self {
        Self {
            banner_button: defaults::banner_button(),
            standard_root: defaults::standard_root(),
            dismissed_root: defaults::dismissed_root(),
            institution_select_path: defaults::institution_select_path(),
            search_button_path: defaults::search_button_path(),
            results_table_path: defaults::results_table_path(),
            results_heading_path: defaults::results_heading_path(),
            results_summary_path: defaults::results_summary_path(),
            detail_document_path: defaults::detail_document_path(),
        }
    }
}

impl LayoutSelectors {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("banner_button", &self.banner_button),
            ("standard_root", &self.standard_root),
            ("dismissed_root", &self.dismissed_root),
        ] {
            if !value.starts_with('/') {
                return Err(AppError::validation(format!(
                    "layout.{name} must be an absolute XPath"
                )));
            }
        }
        for (name, value) in [
            ("institution_select_path", &self.institution_select_path),
            ("search_button_path", &self.search_button_path),
            ("results_table_path", &self.results_table_path),
            ("results_heading_path", &self.results_heading_path),
            ("results_summary_path", &self.results_summary_path),
            ("detail_document_path", &self.detail_document_path),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("layout.{name} is empty")));
            }
        }
        Ok(())
    }
}

/// Which of the two known page structures is active.
///
/// Dismissing the banner removes one sibling before the content root, so
/// every later lookup must be addressed against the variant detected at
/// session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Standard,
    BannerDismissed,
}

impl Layout {
    /// Absolute root every relative path is joined onto.
    pub fn root<'a>(&self, selectors: &'a LayoutSelectors) -> &'a str {
        match self {
            Layout::Standard => &selectors.standard_root,
            Layout::BannerDismissed => &selectors.dismissed_root,
        }
    }

    /// Join a root-relative path onto this layout's root.
    pub fn xpath(&self, selectors: &LayoutSelectors, relative: &str) -> String {
        format!("{}/{}", self.root(selectors), relative.trim_start_matches('/'))
    }

    pub fn institution_select(&self, s: &LayoutSelectors) -> String {
        self.xpath(s, &s.institution_select_path)
    }

    pub fn institution_options(&self, s: &LayoutSelectors) -> String {
        format!("{}/option", self.institution_select(s))
    }

    pub fn search_button(&self, s: &LayoutSelectors) -> String {
        self.xpath(s, &s.search_button_path)
    }

    pub fn results_rows(&self, s: &LayoutSelectors) -> String {
        format!("{}/tbody/tr", self.xpath(s, &s.results_table_path))
    }

    pub fn results_heading(&self, s: &LayoutSelectors) -> String {
        self.xpath(s, &s.results_heading_path)
    }

    pub fn results_summary(&self, s: &LayoutSelectors) -> String {
        self.xpath(s, &s.results_summary_path)
    }

    pub fn detail_document(&self, s: &LayoutSelectors) -> String {
        self.xpath(s, &s.detail_document_path)
    }
}

mod defaults {
    pub fn banner_button() -> String {
        "/html/body/div[1]/div/a[1]".into()
    }

    pub fn standard_root() -> String {
        "/html/body/div[4]".into()
    }

    pub fn dismissed_root() -> String {
        "/html/body/div[3]".into()
    }

    pub fn institution_select_path() -> String {
        "div/div[2]/div[1]/form/div[2]/div[2]/fieldset/select[4]".into()
    }

    pub fn search_button_path() -> String {
        "div/div[2]/div[1]/form/p/input[1]".into()
    }

    pub fn results_table_path() -> String {
        "div/div[2]/div[2]/div[2]/div/table".into()
    }

    pub fn results_heading_path() -> String {
        "div/div[2]/div[2]/div[1]/div[1]/h3".into()
    }

    pub fn results_summary_path() -> String {
        "div/div[2]/div[2]/div[1]/div[1]/div/p[1]".into()
    }

    pub fn detail_document_path() -> String {
        "div/div[2]/div[1]/div[4]/a".into()
    }
}
