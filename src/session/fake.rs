//! Scripted in-memory catalog page for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Layout, LayoutSelectors};
use crate::session::Automation;

pub(crate) const PLACEHOLDER: &str = "Seleziona un ateneo";

/// Markup builder for one catalog result row.
pub(crate) struct RowHtml {
    name: String,
    code: String,
    location: String,
    language: Option<String>,
    degree: Option<String>,
    duration_src: String,
    with_access_icon: bool,
}

impl RowHtml {
    pub(crate) fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            location: "Milano, Sede A, Sede B [Interateneo]".to_string(),
            language: Some("Corso in lingua inglese".to_string()),
            degree: Some("Corso a rilascio titolo doppio".to_string()),
            duration_src: "/img/icone/anni3.png".to_string(),
            with_access_icon: true,
        }
    }

    pub(crate) fn location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub(crate) fn without_language(mut self) -> Self {
        self.language = None;
        self
    }

    pub(crate) fn without_degree(mut self) -> Self {
        self.degree = None;
        self
    }

    pub(crate) fn without_access(mut self) -> Self {
        self.with_access_icon = false;
        self
    }

    pub(crate) fn duration_src(mut self, src: &str) -> Self {
        self.duration_src = src.to_string();
        self
    }

    pub(crate) fn build(&self) -> String {
        let icon = |title: &Option<String>| match title {
            Some(t) => format!(r#"<img src="/img/icone/i.png" title="{t}">"#),
            None => String::new(),
        };
        let access = if self.with_access_icon {
            r#"<img src="/img/icone/libero.png" title="Accesso libero">"#
        } else {
            ""
        };
        format!(
            concat!(
                "<tr>",
                "<td>1</td>",
                "<td><strong>{name}</strong><br>",
                r#"<a href="https://www.universitaly.it/index.php/scheda/sua/{code}" target="_blank">Scheda SUA</a><br>"#,
                "{location}</td>",
                "<td><span>L-31</span><span>L-35</span></td>",
                "<td>{access}</td>",
                "<td></td>",
                r#"<td><img src="/img/icone/test.png" title="Test non selettivo"></td>"#,
                r#"<td><img src="/img/icone/mod.png" title="Convenzionale"></td>"#,
                r#"<td><img src="{duration}"></td>"#,
                "<td>{degree}</td>",
                "<td>{language}</td>",
                "</tr>"
            ),
            name = self.name,
            code = self.code,
            location = self.location,
            access = access,
            duration = self.duration_src,
            degree = icon(&self.degree),
            language = icon(&self.language),
        )
    }
}

pub(crate) struct FakeRow {
    pub html: String,
    pub document_url: Option<String>,
}

impl FakeRow {
    pub(crate) fn program(name: &str, code: &str) -> Self {
        Self {
            html: RowHtml::new(name, code).build(),
            document_url: Some(format!("https://docs.example.org/sua/{code}.pdf")),
        }
    }
}

pub(crate) struct FakeInstitution {
    pub name: String,
    pub rows: Vec<FakeRow>,
    pub caption: String,
}

impl FakeInstitution {
    /// Institution whose caption reports exactly its row count.
    pub(crate) fn new(name: &str, rows: Vec<FakeRow>) -> Self {
        let caption = format!("Trovati {} corsi", rows.len());
        Self {
            name: name.to_string(),
            rows,
            caption,
        }
    }

    pub(crate) fn caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FakeElement {
    Banner,
    Select,
    Option(usize),
    Search,
    Heading,
    Summary,
    HeaderRow,
    Row(usize),
    RowLink(usize),
    Document,
}

#[derive(Default)]
struct FakeState {
    banner_dismissed: bool,
    highlighted: Option<usize>,
    selected: Option<usize>,
    opened_detail: Option<usize>,
    detail_focused: bool,
    contexts: usize,
    max_contexts: usize,
    detail_opens: usize,
}

/// Catalog page served from memory. Options are 1-based; index 0 is the placeholder.
pub(crate) struct FakeSession {
    selectors: LayoutSelectors,
    institutions: Vec<FakeInstitution>,
    banner: bool,
    state: Mutex<FakeState>,
}

impl FakeSession {
    pub(crate) fn new(institutions: Vec<FakeInstitution>) -> Self {
        Self {
            selectors: LayoutSelectors::default(),
            institutions,
            banner: false,
            state: Mutex::new(FakeState {
                contexts: 1,
                max_contexts: 1,
                ..FakeState::default()
            }),
        }
    }

    pub(crate) fn with_banner(mut self) -> Self {
        self.banner = true;
        self
    }

    pub(crate) fn detail_opens(&self) -> usize {
        self.state.lock().unwrap().detail_opens
    }

    pub(crate) fn max_contexts(&self) -> usize {
        self.state.lock().unwrap().max_contexts
    }

    pub(crate) fn open_contexts(&self) -> usize {
        self.state.lock().unwrap().contexts
    }

    fn layout(&self, state: &FakeState) -> Layout {
        if state.banner_dismissed {
            Layout::BannerDismissed
        } else {
            Layout::Standard
        }
    }

    fn selected(&self, state: &FakeState) -> Result<&FakeInstitution> {
        state
            .selected
            .and_then(|i| self.institutions.get(i - 1))
            .ok_or_else(|| AppError::automation("find", "results", "no search submitted"))
    }

    fn missing(action: &str, xpath: &str) -> AppError {
        AppError::automation(action, xpath, "no such element")
    }
}

#[async_trait]
impl Automation for FakeSession {
    type Element = FakeElement;

    async fn goto(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    async fn exists(&self, xpath: &str) -> Result<bool> {
        Ok(self.find(xpath).await.is_ok())
    }

    async fn find(&self, xpath: &str) -> Result<FakeElement> {
        let state = self.state.lock().unwrap();
        let s = &self.selectors;
        let layout = self.layout(&state);

        if xpath == s.banner_button {
            return if self.banner && !state.banner_dismissed {
                Ok(FakeElement::Banner)
            } else {
                Err(Self::missing("find", xpath))
            };
        }
        if xpath == layout.institution_select(s) {
            return Ok(FakeElement::Select);
        }
        if xpath == layout.search_button(s) {
            return Ok(FakeElement::Search);
        }
        if xpath == layout.results_heading(s) {
            self.selected(&state)?;
            return Ok(FakeElement::Heading);
        }
        if xpath == layout.results_summary(s) {
            self.selected(&state)?;
            return Ok(FakeElement::Summary);
        }
        if xpath == layout.detail_document(s) && state.detail_focused {
            return Ok(FakeElement::Document);
        }
        Err(Self::missing("find", xpath))
    }

    async fn find_all(&self, xpath: &str) -> Result<Vec<FakeElement>> {
        let state = self.state.lock().unwrap();
        let s = &self.selectors;
        let layout = self.layout(&state);

        if xpath == layout.institution_options(s) {
            return Ok((0..=self.institutions.len())
                .map(FakeElement::Option)
                .collect());
        }
        if xpath == layout.results_rows(s) {
            let Ok(institution) = self.selected(&state) else {
                return Ok(Vec::new());
            };
            let mut rows = vec![FakeElement::HeaderRow];
            rows.extend((0..institution.rows.len()).map(FakeElement::Row));
            return Ok(rows);
        }
        Ok(Vec::new())
    }

    async fn find_in(&self, parent: &FakeElement, xpath: &str) -> Result<FakeElement> {
        match (parent, xpath) {
            (FakeElement::Row(j), "./td[2]/a[1]") => Ok(FakeElement::RowLink(*j)),
            _ => Err(Self::missing("find_in", xpath)),
        }
    }

    async fn attribute(&self, element: &FakeElement, name: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        match (element, name) {
            (FakeElement::Document, "href") => {
                let row = state
                    .opened_detail
                    .ok_or_else(|| Self::missing("attribute", "detail"))?;
                Ok(self.selected(&state)?.rows[row].document_url.clone())
            }
            _ => Ok(None),
        }
    }

    async fn text(&self, element: &FakeElement) -> Result<String> {
        let state = self.state.lock().unwrap();
        match element {
            FakeElement::Option(0) => Ok(PLACEHOLDER.to_string()),
            FakeElement::Option(i) => Ok(self.institutions[i - 1].name.clone()),
            FakeElement::Summary => Ok(self.selected(&state)?.caption.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn outer_html(&self, element: &FakeElement) -> Result<String> {
        let state = self.state.lock().unwrap();
        match element {
            FakeElement::HeaderRow => Ok("<tr><th>#</th><th>Corso</th></tr>".to_string()),
            FakeElement::Row(j) => Ok(self.selected(&state)?.rows[*j].html.clone()),
            _ => Err(Self::missing("outer_html", "element")),
        }
    }

    async fn click(&self, element: &FakeElement) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match element {
            FakeElement::Banner => state.banner_dismissed = true,
            FakeElement::Option(i) => state.highlighted = Some(*i),
            FakeElement::Search => state.selected = state.highlighted,
            FakeElement::RowLink(j) => {
                state.opened_detail = Some(*j);
                state.detail_opens += 1;
                state.contexts += 1;
                state.max_contexts = state.max_contexts.max(state.contexts);
            }
            _ => {}
        }
        Ok(())
    }

    async fn switch_to_newest(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.detail_focused = state.contexts > 1;
        Ok(())
    }

    async fn close_context(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.detail_focused {
            state.contexts -= 1;
            state.opened_detail = None;
            state.detail_focused = false;
        }
        Ok(())
    }

    async fn switch_to_main(&self) -> Result<()> {
        self.state.lock().unwrap().detail_focused = false;
        Ok(())
    }

    async fn wait(&self, _duration: Duration) -> Result<()> {
        Ok(())
    }

    async fn quit(&self) -> Result<()> {
        Ok(())
    }
}
