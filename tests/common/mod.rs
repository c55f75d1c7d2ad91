#![allow(dead_code)]

use async_trait::async_trait;
use edgarsum::{EdgarError, EdgarUrls, Fetch, FetchResponse, Result, Sections, Summarizer};
use serde_json::Value;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

pub const USER_AGENT: &str = "test_agent example@example.com";
pub const APPLE_CIK: &str = "0000320193";

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

pub fn read_fixture_bytes(relative: impl AsRef<Path>) -> Vec<u8> {
    fs::read(fixture_path(relative)).expect("fixture file should be readable")
}

/// A `Fetch` that answers from a URL → body table and records every request.
/// Unknown URLs are rejected with a 404.
pub struct ScriptedFetch {
    urls: EdgarUrls,
    responses: HashMap<String, Vec<u8>>,
    failures: HashMap<String, u16>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetch {
    pub fn new() -> Self {
        Self {
            urls: EdgarUrls::default(),
            responses: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    pub fn reject(mut self, url: impl Into<String>, status_code: u16) -> Self {
        self.failures.insert(url.into(), status_code);
        self
    }

    /// Apple's catalog fixture plus a document and index for every filing in it.
    pub fn apple() -> Self {
        let urls = EdgarUrls::default();
        let mut fetch = Self::new().respond(
            urls.submissions(APPLE_CIK),
            read_fixture_bytes("submissions/catalog.json"),
        );
        let filings =
            edgarsum::parse_catalog(APPLE_CIK, &read_fixture_bytes("submissions/catalog.json"))
                .expect("catalog fixture should parse");
        let sample = read_fixture_bytes("filings/sample-10k.htm");
        for filing in filings {
            let folder = urls.filing_folder("320193", &filing.accession_compact);
            fetch = fetch
                .respond(format!("{}/{}", folder, filing.primary_document), sample.clone())
                .respond(format!("{}/index.html", folder), b"<html>index</html>".to_vec());
        }
        fetch
    }

    pub fn with_tickers(self) -> Self {
        let url = self.urls.company_tickers();
        self.respond(url, read_fixture_bytes("tickers/company_tickers.json"))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetch for ScriptedFetch {
    async fn get(&self, url: &str, _params: Option<&[(&str, &str)]>) -> Result<FetchResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(status_code) = self.failures.get(url) {
            return Err(EdgarError::RemoteRejected {
                url: url.to_string(),
                status_code: *status_code,
                body_preview: String::new(),
            });
        }
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
        USER_AGENT
    }

    fn urls(&self) -> &EdgarUrls {
        &self.urls
    }
}

/// A `Summarizer` that lists the section keys it was given.
pub struct EchoSummarizer;

#[async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, meta: &BTreeMap<String, Value>, sections: &Sections) -> Result<String> {
        let form = meta.get("form").and_then(Value::as_str).unwrap_or("?");
        let keys: Vec<&str> = sections.keys().map(String::as_str).collect();
        Ok(format!("# {}\n{}\n", form, keys.join(",")))
    }
}
