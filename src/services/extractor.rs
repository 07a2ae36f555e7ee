// src/services/extractor.rs

//! Program attribute extraction.
//!
//! Works on the rendered markup of one result row. Cells are addressed by
//! their 1-based column position:
//!
//! | column | content                                  |
//! |--------|------------------------------------------|
//! | 2      | title, detail link, location text        |
//! | 3      | one `span` per level code                |
//! | 4      | access type icon                         |
//! | 6      | admission test icon                      |
//! | 7      | delivery mode icon                       |
//! | 8      | duration icon (`.../anniN.png`)          |
//! | 9      | degree type icon, absent for single award|
//! | 10     | language icon, absent for Italian        |

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::ProgramRecord;
use crate::utils::url::extract_program_code;

/// Detail view link, relative to a result row.
pub const DETAIL_LINK_XPATH: &str = "./td[2]/a[1]";

pub const DEFAULT_LANGUAGE: &str = "Italian-language course";
pub const DEFAULT_DEGREE_TYPE: &str = "single-degree-award course";

const INTERATENEO: &str = "Interateneo";

static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"anni(\d+)\.png").expect("valid duration pattern"));

static CITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([^,\n\[\]]+)").expect("valid city pattern"));

/// Parsed selectors for the row rules.
pub struct RowExtractor {
    name: Selector,
    codes: Selector,
    location: Selector,
    link: Selector,
    access: Selector,
    admission_test: Selector,
    delivery_mode: Selector,
    duration: Selector,
    degree: Selector,
    language: Selector,
}

impl RowExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: Self::parse_selector("tr > td:nth-child(2) > strong")?,
            codes: Self::parse_selector("tr > td:nth-child(3) > span")?,
            location: Self::parse_selector("tr > td:nth-child(2)")?,
            link: Self::parse_selector("tr > td:nth-child(2) > a")?,
            access: Self::parse_selector("tr > td:nth-child(4) > img")?,
            admission_test: Self::parse_selector("tr > td:nth-child(6) > img")?,
            delivery_mode: Self::parse_selector("tr > td:nth-child(7) > img")?,
            duration: Self::parse_selector("tr > td:nth-child(8) > img")?,
            degree: Self::parse_selector("tr > td:nth-child(9) > img")?,
            language: Self::parse_selector("tr > td:nth-child(10) > img")?,
        })
    }

    /// Derive a record from the outer HTML of one `<tr>`.
    pub fn extract(&self, row_html: &str) -> Result<ProgramRecord> {
        // Table rows only survive parsing inside a table context.
        let document = Html::parse_fragment(&format!("<table><tbody>{row_html}</tbody></table>"));

        let name = document
            .select(&self.name)
            .next()
            .map(element_text)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AppError::extraction("name", "title element missing"))?;

        let codes = document
            .select(&self.codes)
            .map(element_text)
            .collect::<Vec<_>>();

        let cities = document
            .select(&self.location)
            .next()
            .map(|cell| extract_cities(&own_text(cell)))
            .unwrap_or_default();

        let href = document
            .select(&self.link)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| AppError::extraction("sua_code", "detail link missing"))?;
        let external_code = extract_program_code(href).ok_or_else(|| {
            AppError::extraction("sua_code", format!("no numeric code in '{href}'"))
        })?;

        let duration = document
            .select(&self.duration)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(parse_duration)
            .unwrap_or_default();

        Ok(ProgramRecord {
            name,
            codes,
            cities,
            language: self
                .title_of(&document, &self.language)
                .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            access_type: self.required_title(&document, &self.access, "type_of_access")?,
            admission_test: self.required_title(&document, &self.admission_test, "test_access")?,
            delivery_mode: self.required_title(&document, &self.delivery_mode, "mod")?,
            duration,
            degree_type: self
                .title_of(&document, &self.degree)
                .unwrap_or_else(|| DEFAULT_DEGREE_TYPE.to_string()),
            external_code,
        })
    }

    fn title_of(&self, document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .and_then(|img| img.value().attr("title"))
            .map(str::to_string)
    }

    fn required_title(&self, document: &Html, selector: &Selector, field: &str) -> Result<String> {
        self.title_of(document, selector)
            .ok_or_else(|| AppError::extraction(field, "icon title missing"))
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Text nodes directly under `element`, one per line. Child elements such
/// as the program title and the detail link are left out.
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text())
        .map(|text| &**text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cities listed after the first comma of the location text.
///
/// Bracketed suffixes such as `[Interateneo]` end a token, and a bare
/// `Interateneo` token is dropped.
pub fn extract_cities(text: &str) -> Vec<String> {
    CITY.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|city| !city.is_empty() && city != INTERATENEO)
        .collect()
}

/// Duration label from an icon path like `/img/anni3.png`; empty if unrecognised.
pub fn parse_duration(src: &str) -> String {
    DURATION
        .captures(src)
        .and_then(|caps| caps.get(1))
        .map(|years| format!("{} years", years.as_str()))
        .unwrap_or_default()
}
