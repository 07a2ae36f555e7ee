// src/services/walker.rs

//! Catalog walker.
//!
//! Drives one browser session through every institution in source order:
//! select, search, settle, then visit each result row. Rows whose node is
//! already complete are skipped without touching the page; the rest are
//! reset, re-downloaded and committed. After each institution the announced
//! program count is reconciled against the materialized nodes, and any
//! mismatch is handed to the [`OperatorGate`] before the walk continues.
//!
//! Rows are processed strictly one at a time: the detail view is the only
//! secondary browsing context and is closed before the next row starts.

use crate::error::{AppError, Result};
use crate::models::{Config, Discrepancy, Layout, WalkReport};
use crate::services::downloader::{DocumentTransfer, DownloadOutcome, download};
use crate::services::extractor::{DETAIL_LINK_XPATH, RowExtractor};
use crate::services::gate::OperatorGate;
use crate::services::verify::{check_count, parse_expected_count};
use crate::session::{Automation, settle};
use crate::storage::{ContentStore, ProgramNode, institution_dir};
use crate::utils::url::resolve;

/// Sequential walker over institutions and their program rows.
pub struct CatalogWalker<'a, A: Automation> {
    session: &'a A,
    store: &'a dyn ContentStore,
    transfer: &'a dyn DocumentTransfer,
    gate: &'a dyn OperatorGate,
    config: &'a Config,
    layout: Layout,
    extractor: RowExtractor,
}

impl<'a, A: Automation> CatalogWalker<'a, A> {
    pub fn new(
        session: &'a A,
        store: &'a dyn ContentStore,
        transfer: &'a dyn DocumentTransfer,
        gate: &'a dyn OperatorGate,
        config: &'a Config,
        layout: Layout,
    ) -> Result<Self> {
        Ok(Self {
            session,
            store,
            transfer,
            gate,
            config,
            layout,
            extractor: RowExtractor::new()?,
        })
    }

    /// Walk every institution. Fatal row errors abort and propagate.
    pub async fn walk(&self) -> Result<WalkReport> {
        let mut report = WalkReport::started();
        let options_xpath = self.layout.institution_options(&self.config.layout);
        let option_count = self.session.find_all(&options_xpath).await?.len();
        let total = option_count.saturating_sub(1);

        log::info!("Walking {} institutions", total);

        for index in 1..option_count {
            // Re-located every time: the result table re-renders the form.
            let options = self.session.find_all(&options_xpath).await?;
            let option = options.get(index).ok_or_else(|| {
                AppError::automation("find_all", &options_xpath, format!("option {index} vanished"))
            })?;
            let institution = self.session.text(option).await?.trim().to_string();
            if institution.is_empty() {
                log::warn!("Skipping institution option {} with empty label", index);
                continue;
            }

            log::info!("[{}/{}] {}", index, total, institution);

            self.session.click(option).await?;
            let search = self
                .session
                .find(&self.layout.search_button(&self.config.layout))
                .await?;
            self.session.click(&search).await?;
            settle(self.session, &self.config.timing.search).await?;

            self.walk_results(&institution, &mut report).await?;

            if let Some(discrepancy) = self.verify(&institution).await? {
                report.discrepancies.push(discrepancy.clone());
                self.gate.acknowledge(&discrepancy).await?;
            }
            report.institutions += 1;
        }

        report.finish();
        for (key, value) in report.summary_items() {
            log::info!("    {}: {}", key, value);
        }
        Ok(report)
    }

    async fn walk_results(&self, institution: &str, report: &mut WalkReport) -> Result<()> {
        let selectors = &self.config.layout;
        self.store.ensure_dir(&institution_dir(institution)).await?;

        let rows = self
            .session
            .find_all(&self.layout.results_rows(selectors))
            .await?;
        let heading = self
            .session
            .find(&self.layout.results_heading(selectors))
            .await?;
        self.session.click(&heading).await?;

        // Row 0 is the table header.
        for row in rows.iter().skip(1) {
            self.process_row(institution, row, report).await?;
        }
        Ok(())
    }

    async fn process_row(
        &self,
        institution: &str,
        row: &A::Element,
        report: &mut WalkReport,
    ) -> Result<()> {
        let html = self.session.outer_html(row).await?;
        let record = self.extractor.extract(&html)?;
        let node = ProgramNode::new(institution, &record.name, &record.external_code);
        report.rows_seen += 1;

        log::info!("----- {}", record.name);

        if self.store.is_complete(&node).await {
            log::info!("Already materialized: {}", node.dir().display());
            report.skipped += 1;
            return Ok(());
        }

        self.store.reset_node(&node.dir()).await;
        self.store.ensure_dir(&node.dir()).await?;

        let outcome = self.fetch_document(row, &node).await?;

        match outcome {
            DownloadOutcome::Completed { bytes } if bytes >= self.store.min_document_bytes() => {
                self.store
                    .write_once(&node.metadata(), record.to_metadata()?.as_bytes())
                    .await?;
                report.materialized += 1;
                log::info!("------ document OK ({} bytes)", bytes);
            }
            DownloadOutcome::Completed { bytes } => {
                report.download_failures += 1;
                log::warn!(
                    "Document for {} is only {} bytes, leaving node incomplete",
                    record.name,
                    bytes
                );
            }
            DownloadOutcome::Failed { reason } => {
                report.download_failures += 1;
                log::warn!("Download for {} failed: {}", record.name, reason);
            }
        }

        settle(self.session, &self.config.timing.post_row).await
    }

    /// Open the detail view, download its document and return to the results.
    async fn fetch_document(&self, row: &A::Element, node: &ProgramNode) -> Result<DownloadOutcome> {
        let link = self.session.find_in(row, DETAIL_LINK_XPATH).await?;
        self.session.click(&link).await?;
        self.session.switch_to_newest().await?;
        settle(self.session, &self.config.timing.detail).await?;

        let xpath = self.layout.detail_document(&self.config.layout);
        let anchor = self.session.find(&xpath).await?;
        let href = self
            .session
            .attribute(&anchor, "href")
            .await?
            .filter(|href| !href.trim().is_empty())
            .ok_or_else(|| AppError::extraction("document_url", "detail link has no href"))?;
        let url = resolve(&self.config.catalog.start_url, href.trim())?;
        log::info!("{}", url);

        let outcome = download(self.transfer, &url, &self.store.path(&node.document())).await;
        settle(self.session, &self.config.timing.post_download).await?;

        self.session.close_context().await?;
        self.session.switch_to_main().await?;
        Ok(outcome)
    }

    /// Reconcile the caption count against complete nodes on disk.
    async fn verify(&self, institution: &str) -> Result<Option<Discrepancy>> {
        let caption_el = self
            .session
            .find(&self.layout.results_summary(&self.config.layout))
            .await?;
        let caption = self.session.text(&caption_el).await?;
        let expected = parse_expected_count(&caption).unwrap_or_else(|| {
            log::warn!("No program count in caption '{}'", caption.trim());
            0
        });
        let found = self
            .store
            .count_materialized(&institution_dir(institution))
            .await?;

        match check_count(institution, found, expected) {
            Some(discrepancy) => Ok(Some(discrepancy)),
            None => {
                log::info!("{}: {} of {} programs materialized", institution, found, expected);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::models::TimingConfig;
    use crate::services::downloader::testing::FakeTransfer;
    use crate::services::gate::testing::RecordingGate;
    use crate::session::fake::{FakeInstitution, FakeRow, FakeSession};
    use crate::storage::LocalStore;
    use tempfile::TempDir;

    fn config() -> Config {
        Config {
            timing: TimingConfig::immediate(),
            ..Config::default()
        }
    }

    fn doc_url(code: &str) -> String {
        format!("https://docs.example.org/sua/{code}.pdf")
    }

    fn transfer_for(codes: &[&str]) -> FakeTransfer {
        codes.iter().fold(FakeTransfer::default(), |t, code| {
            t.serve(&doc_url(code), format!("%PDF-{code}").as_bytes())
        })
    }

    fn catalog() -> Vec<FakeInstitution> {
        vec![
            FakeInstitution::new(
                "Politecnico di Milano",
                vec![
                    FakeRow::program("Ingegneria Informatica", "101"),
                    FakeRow::program("Design", "102"),
                ],
            ),
            FakeInstitution::new(
                "Università di Bari",
                vec![FakeRow::program("Scienze/Tecnologie", "201")],
            ),
        ]
    }

    async fn walk(
        session: &FakeSession,
        store: &LocalStore,
        transfer: &FakeTransfer,
        gate: &RecordingGate,
        layout: Layout,
    ) -> Result<WalkReport> {
        let config = config();
        CatalogWalker::new(session, store, transfer, gate, &config, layout)?
            .walk()
            .await
    }

    #[tokio::test]
    async fn test_walk_materializes_every_row() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let session = FakeSession::new(catalog());
        let transfer = transfer_for(&["101", "102", "201"]);
        let gate = RecordingGate::default();

        let report = walk(&session, &store, &transfer, &gate, Layout::Standard)
            .await
            .unwrap();

        assert_eq!(report.institutions, 2);
        assert_eq!(report.rows_seen, 3);
        assert_eq!(report.materialized, 3);
        assert!(report.is_consistent());
        assert!(gate.seen().is_empty());

        let node = ProgramNode::new("Università di Bari", "Scienze/Tecnologie", "201");
        assert_eq!(node.dir(), Path::new("Università di Bari/ScienzeTecnologie_201"));
        assert!(store.is_complete(&node).await);

        let metadata = std::fs::read_to_string(store.path(&node.metadata())).unwrap();
        let json: serde_json::Value = serde_json::from_str(&metadata).unwrap();
        assert_eq!(json["name"], "Scienze/Tecnologie");
        assert_eq!(json["sua_code"], "201");

        assert_eq!(session.max_contexts(), 2);
        assert_eq!(session.open_contexts(), 1);
    }

    #[tokio::test]
    async fn test_rerun_skips_complete_nodes() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let gate = RecordingGate::default();
        let first_transfer = transfer_for(&["101", "102", "201"]);
        walk(&FakeSession::new(catalog()), &store, &first_transfer, &gate, Layout::Standard)
            .await
            .unwrap();

        let node = ProgramNode::new("Politecnico di Milano", "Design", "102");
        let document_before = std::fs::read(store.path(&node.document())).unwrap();
        let metadata_before = std::fs::read(store.path(&node.metadata())).unwrap();

        let session = FakeSession::new(catalog());
        let transfer = FakeTransfer::default();
        let report = walk(&session, &store, &transfer, &gate, Layout::Standard)
            .await
            .unwrap();

        assert_eq!(report.skipped, 3);
        assert_eq!(report.materialized, 0);
        assert!(transfer.calls().is_empty());
        assert_eq!(session.detail_opens(), 0);
        assert_eq!(std::fs::read(store.path(&node.document())).unwrap(), document_before);
        assert_eq!(std::fs::read(store.path(&node.metadata())).unwrap(), metadata_before);
    }

    #[tokio::test]
    async fn test_partial_node_is_redone() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let node = ProgramNode::new("Università di Bari", "Scienze/Tecnologie", "201");
        store.ensure_dir(&node.dir()).await.unwrap();
        std::fs::write(store.path(&node.document()), b"").unwrap();
        std::fs::write(store.path(&node.dir().join("leftover.bin")), b"junk").unwrap();

        let transfer = transfer_for(&["101", "102", "201"]);
        let gate = RecordingGate::default();
        walk(&FakeSession::new(catalog()), &store, &transfer, &gate, Layout::Standard)
            .await
            .unwrap();

        assert!(store.is_complete(&node).await);
        assert!(!store.exists(&node.dir().join("leftover.bin")).await);
        assert_eq!(std::fs::read(store.path(&node.document())).unwrap(), b"%PDF-201");
    }

    #[tokio::test]
    async fn test_failed_download_is_reported_and_retried() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let gate = RecordingGate::default();
        let transfer = transfer_for(&["101", "201"]).serve_chunks(
            &doc_url("102"),
            vec![Ok(b"%PDF".to_vec()), Err("reset by peer".to_string())],
        );

        let report = walk(&FakeSession::new(catalog()), &store, &transfer, &gate, Layout::Standard)
            .await
            .unwrap();

        assert_eq!(report.download_failures, 1);
        assert_eq!(report.materialized, 2);
        assert_eq!(
            gate.seen(),
            vec![Discrepancy {
                institution: "Politecnico di Milano".to_string(),
                found: 1,
                expected: 2,
            }]
        );

        let node = ProgramNode::new("Politecnico di Milano", "Design", "102");
        assert!(!store.exists(&node.metadata()).await);

        let retry = transfer_for(&["102"]);
        let session = FakeSession::new(catalog());
        let report = walk(&session, &store, &retry, &gate, Layout::Standard)
            .await
            .unwrap();
        assert_eq!(report.materialized, 1);
        assert_eq!(report.skipped, 2);
        assert_eq!(retry.calls(), vec![doc_url("102")]);
        assert!(store.is_complete(&node).await);
    }

    #[tokio::test]
    async fn test_caption_mismatch_reaches_gate() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let institutions = vec![
            FakeInstitution::new("Ateneo", vec![FakeRow::program("Corso", "7")])
                .caption("Trovati 2 corsi"),
        ];
        let gate = RecordingGate::default();

        let report = walk(
            &FakeSession::new(institutions),
            &store,
            &transfer_for(&["7"]),
            &gate,
            Layout::Standard,
        )
        .await
        .unwrap();

        let expected = Discrepancy {
            institution: "Ateneo".to_string(),
            found: 1,
            expected: 2,
        };
        assert_eq!(report.discrepancies, vec![expected.clone()]);
        assert_eq!(gate.seen(), vec![expected]);
    }

    #[tokio::test]
    async fn test_missing_document_link_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let mut row = FakeRow::program("Corso", "7");
        row.document_url = None;
        let session = FakeSession::new(vec![FakeInstitution::new("Ateneo", vec![row])]);
        let gate = RecordingGate::default();

        let err = walk(&session, &store, &FakeTransfer::default(), &gate, Layout::Standard)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Extraction { ref field, .. } if field == "document_url"));
        assert!(gate.seen().is_empty());
    }

    #[tokio::test]
    async fn test_unlabelled_institution_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let session = FakeSession::new(vec![
            FakeInstitution::new("  ", vec![FakeRow::program("Orfano", "900")]),
            FakeInstitution::new("Università di Bari", vec![FakeRow::program("Fisica", "201")]),
        ]);
        let transfer = transfer_for(&["900", "201"]);
        let gate = RecordingGate::default();

        let report = walk(&session, &store, &transfer, &gate, Layout::Standard)
            .await
            .unwrap();

        assert_eq!(report.institutions, 1);
        assert_eq!(report.materialized, 1);
        assert_eq!(transfer.calls(), vec![doc_url("201")]);
        assert!(gate.seen().is_empty());
        assert_eq!(store.list_dirs(Path::new("")).await.unwrap(), vec!["Università di Bari"]);
    }

    #[tokio::test]
    async fn test_walk_in_dismissed_layout() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        let session = FakeSession::new(catalog()).with_banner();
        let config = config();
        let layout = crate::services::detect::detect_layout(&session, &config)
            .await
            .unwrap();
        let transfer = transfer_for(&["101", "102", "201"]);
        let gate = RecordingGate::default();

        let report = walk(&session, &store, &transfer, &gate, layout).await.unwrap();

        assert_eq!(layout, Layout::BannerDismissed);
        assert_eq!(report.materialized, 3);
    }
}
