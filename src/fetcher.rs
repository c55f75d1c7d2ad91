//! The fetch pipeline: catalog, selection, download plan, storage, manifest.
//!
//! Filings are processed one at a time, in catalog order, and every filing's
//! manifest is on disk before the next filing starts. A failure stops the run
//! but leaves everything already written in place.
//!
//! Files that already exist are not downloaded again; their manifest entry is
//! rebuilt from the bytes on disk. Rerunning the same request therefore
//! produces the same manifests and no document requests.

use super::catalog::{FilingRecord, fetch_catalog};
use super::error::{EdgarError, Result};
use super::ident::CompanyIdentifier;
use super::manifest::{DownloadOutcome, ProvenanceManifest, push_unique};
use super::options::SelectionOptions;
use super::plan::{DownloadPlanner, DownloadTask};
use super::store::{self, filing_dir, sha256_hex, task_path, write_atomic};
use super::traits::Fetch;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Fetches the selected filings of a company into `data_root`.
///
/// # Arguments
///
/// * `client` - Network access, usually an [`Edgar`](crate::Edgar) or a
///   [`Retrying`](crate::Retrying) wrapper around one
/// * `company` - The resolved company
/// * `options` - Which filings of the catalog to fetch
/// * `data_root` - Root of the on-disk store
///
/// # Returns
///
/// One manifest per selected filing, in catalog order (most recent first).
///
/// # Errors
///
/// The first fetch, parse or filesystem error ends the run. Manifests of
/// filings completed before the failure remain on disk.
pub async fn fetch_filings<F: Fetch + ?Sized>(
    client: &F,
    company: &CompanyIdentifier,
    options: &SelectionOptions,
    data_root: &Path,
) -> Result<Vec<ProvenanceManifest>> {
    let (catalog_url, rows) = fetch_catalog(client, company).await?;
    let selected = options.apply(rows);
    tracing::info!(
        cik10 = company.cik10(),
        filings = selected.len(),
        "selected filings"
    );

    let notes = selection_notes(options);
    let mut manifests = Vec::with_capacity(selected.len());
    for filing in &selected {
        let manifest =
            fetch_filing(client, company, filing, &catalog_url, data_root, &notes).await?;
        manifests.push(manifest);
    }
    Ok(manifests)
}

fn selection_notes(options: &SelectionOptions) -> BTreeMap<String, String> {
    let mut notes = BTreeMap::new();
    notes.insert("forms".to_string(), options.forms_label());
    notes.insert(
        "include_amendments".to_string(),
        options.include_amendments.to_string(),
    );
    notes
}

/// Fetches every planned file of one filing and writes its manifest.
///
/// `catalog_url` is recorded as the first source URL.
pub async fn fetch_filing<F: Fetch + ?Sized>(
    client: &F,
    company: &CompanyIdentifier,
    filing: &FilingRecord,
    catalog_url: &str,
    data_root: &Path,
    notes: &BTreeMap<String, String>,
) -> Result<ProvenanceManifest> {
    let dir = filing_dir(data_root, filing);
    let tasks = DownloadPlanner::from_urls(client.urls()).plan(filing);
    let previous = match store::read_manifest(&dir) {
        Ok(manifest) => Some(manifest),
        Err(EdgarError::NotFound(_)) => None,
        Err(e) => {
            tracing::warn!(
                dir = %dir.display(),
                error = %e,
                "ignoring unreadable manifest, it will be rewritten"
            );
            None
        }
    };
    let needed = store::needed_tasks(&tasks, &dir)?;

    let mut source_urls = Vec::with_capacity(tasks.len() + 1);
    push_unique(&mut source_urls, catalog_url);

    let mut files = Vec::with_capacity(tasks.len());
    for task in &tasks {
        let prior_status = previous
            .as_ref()
            .and_then(|m| m.outcome_for(task))
            .map(|o| o.status_code);
        let cached = !needed.contains(&task);
        files.push(download(client, task, &dir, cached, prior_status).await?);
        push_unique(&mut source_urls, &task.url);
    }

    let manifest = ProvenanceManifest {
        company: company.clone(),
        filing: filing.clone(),
        source_urls,
        files,
        user_agent: client.user_agent().to_string(),
        notes: notes.clone(),
    };
    let path = store::write_manifest(&dir, &manifest)?;

    tracing::info!(
        accession = %filing.accession,
        form = %filing.form,
        manifest = %path.display(),
        "filing stored"
    );
    Ok(manifest)
}

/// Stores one task's file, or reads it back when `cached`.
async fn download<F: Fetch + ?Sized>(
    client: &F,
    task: &DownloadTask,
    dir: &Path,
    cached: bool,
    prior_status: Option<u16>,
) -> Result<DownloadOutcome> {
    let path = task_path(dir, task)?;

    let (content, status_code) = if cached {
        let content = fs::read(&path).map_err(|e| EdgarError::fs(&path, e))?;
        tracing::debug!(url = %task.url, "already on disk, skipping download");
        (content, prior_status.unwrap_or(200))
    } else {
        let response = client.get(&task.url, None).await?;
        write_atomic(&path, &response.body)?;
        tracing::debug!(url = %task.url, bytes = response.body.len(), "downloaded");
        (response.body, response.status)
    };

    Ok(DownloadOutcome {
        task: task.clone(),
        status_code,
        bytes: content.len() as u64,
        sha256: sha256_hex(&content),
        downloaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EdgarUrls;
    use crate::core::FetchResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const CATALOG: &str = r#"{"filings": {"recent": {
        "accessionNumber": ["0000320193-23-000106", "0000320193-23-000077"],
        "form": ["10-K", "10-Q"],
        "filingDate": ["2023-11-03", "2023-08-04"],
        "reportDate": ["2023-09-30", "2023-07-01"],
        "primaryDocument": ["aapl-20230930.htm", "aapl-20230701.htm"]
    }}}"#;

    struct Scripted {
        urls: EdgarUrls,
        responses: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new() -> Self {
            let urls = EdgarUrls::default();
            let mut responses = HashMap::new();
            responses.insert(urls.submissions("0000320193"), CATALOG.as_bytes().to_vec());
            let base = "https://www.sec.gov/Archives/edgar/data/320193";
            for (acc, doc) in [
                ("000032019323000106", "aapl-20230930.htm"),
                ("000032019323000077", "aapl-20230701.htm"),
            ] {
                responses.insert(format!("{base}/{acc}/{doc}"), format!("<p>{doc}</p>").into_bytes());
                responses.insert(format!("{base}/{acc}/index.html"), b"<ul></ul>".to_vec());
            }
            Self {
                urls,
                responses,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for Scripted {
        async fn get(&self, url: &str, _params: Option<&[(&str, &str)]>) -> Result<FetchResponse> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(body) => Ok(FetchResponse::new(200, body.clone())),
                None => Err(EdgarError::RemoteRejected {
                    url: url.to_string(),
                    status_code: 404,
                    body_preview: String::new(),
                }),
            }
        }

        fn user_agent(&self) -> &str {
            "edgarsum-tests tests@example.com"
        }

        fn urls(&self) -> &EdgarUrls {
            &self.urls
        }
    }

    fn apple() -> CompanyIdentifier {
        CompanyIdentifier::with_ticker("AAPL", "320193").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_writes_files_and_manifest() {
        let tmp = TempDir::new().unwrap();
        let client = Scripted::new();
        let options = SelectionOptions::new().with_form_type("10-K");

        let manifests = fetch_filings(&client, &apple(), &options, tmp.path())
            .await
            .unwrap();
        assert_eq!(manifests.len(), 1);

        let manifest = &manifests[0];
        let dir = tmp.path().join("0000320193/000032019323000106");
        assert_eq!(fs::read(dir.join("aapl-20230930.htm")).unwrap(), b"<p>aapl-20230930.htm</p>");
        assert!(dir.join("index.html").exists());
        assert_eq!(store::read_manifest(&dir).unwrap(), *manifest);

        assert_eq!(manifest.source_urls.len(), 3);
        assert_eq!(manifest.source_urls[0], client.urls.submissions("0000320193"));
        assert_eq!(manifest.files[0].bytes, 24);
        assert_eq!(manifest.files[0].sha256, sha256_hex(b"<p>aapl-20230930.htm</p>"));
        assert!(manifest.files[0].downloaded_at.ends_with('Z'));
        assert_eq!(manifest.notes["forms"], "10-K");
        assert_eq!(manifest.user_agent, "edgarsum-tests tests@example.com");
    }

    #[tokio::test]
    async fn test_rerun_skips_existing_files() {
        let tmp = TempDir::new().unwrap();
        let client = Scripted::new();
        let options = SelectionOptions::new();

        let first = fetch_filings(&client, &apple(), &options, tmp.path()).await.unwrap();
        assert_eq!(client.calls().len(), 5);

        let second = fetch_filings(&client, &apple(), &options, tmp.path()).await.unwrap();
        // Only the catalog is requested again.
        assert_eq!(client.calls().len(), 6);

        let strip = |ms: &[ProvenanceManifest]| {
            ms.iter().map(ProvenanceManifest::without_timestamps).collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[tokio::test]
    async fn test_corrupt_manifest_is_rewritten() {
        let tmp = TempDir::new().unwrap();
        let client = Scripted::new();
        let options = SelectionOptions::new().with_form_type("10-K");

        let first = fetch_filings(&client, &apple(), &options, tmp.path()).await.unwrap();
        let dir = tmp.path().join("0000320193/000032019323000106");
        fs::write(dir.join("manifest.json"), "{\"company\": ").unwrap();

        let second = fetch_filings(&client, &apple(), &options, tmp.path()).await.unwrap();
        // Files on disk are reused; only the catalog is requested again.
        assert_eq!(client.calls().len(), 4);

        let rewritten = store::read_manifest(&dir).unwrap();
        assert_eq!(rewritten, second[0]);
        assert!(rewritten.files.iter().all(|o| o.status_code == 200));
        assert_eq!(first[0].without_timestamps(), rewritten.without_timestamps());
    }

    #[tokio::test]
    async fn test_zero_limit_fetches_nothing() {
        let tmp = TempDir::new().unwrap();
        let client = Scripted::new();
        let options = SelectionOptions::new().with_limit(0);

        let manifests = fetch_filings(&client, &apple(), &options, tmp.path()).await.unwrap();
        assert!(manifests.is_empty());
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_manifests() {
        let tmp = TempDir::new().unwrap();
        let mut client = Scripted::new();
        client.responses.retain(|url, _| !url.ends_with("000032019323000077/index.html"));

        let result = fetch_filings(&client, &apple(), &SelectionOptions::new(), tmp.path()).await;
        assert!(matches!(
            result,
            Err(EdgarError::RemoteRejected { status_code: 404, .. })
        ));

        assert!(tmp.path().join("0000320193/000032019323000106/manifest.json").exists());
        let failed = tmp.path().join("0000320193/000032019323000077");
        assert!(failed.join("aapl-20230701.htm").exists());
        assert!(!failed.join("manifest.json").exists());
    }
}
