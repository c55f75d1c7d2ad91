//! Provenance records written next to every fetched filing.

use super::catalog::FilingRecord;
use super::ident::CompanyIdentifier;
use super::plan::DownloadTask;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Result of one completed download task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    #[serde(rename = "spec")]
    pub task: DownloadTask,
    pub status_code: u16,
    /// Length of the stored file in bytes.
    pub bytes: u64,
    /// Hex SHA-256 of the stored file.
    pub sha256: String,
    /// UTC timestamp, RFC 3339 with a `Z` suffix.
    pub downloaded_at: String,
}

/// What was fetched for one filing, from where, and what it hashed to.
///
/// Stored as `manifest.json` inside the filing directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceManifest {
    pub company: CompanyIdentifier,
    pub filing: FilingRecord,
    /// Catalog URL followed by every task URL, de-duplicated in first-seen order.
    pub source_urls: Vec<String>,
    /// One outcome per download task, in plan order.
    pub files: Vec<DownloadOutcome>,
    pub user_agent: String,
    #[serde(default)]
    pub notes: BTreeMap<String, String>,
}

impl ProvenanceManifest {
    /// The recorded outcome for a task, matched by URL and destination.
    pub fn outcome_for(&self, task: &DownloadTask) -> Option<&DownloadOutcome> {
        self.files
            .iter()
            .find(|o| o.task.url == task.url && o.task.destination == task.destination)
    }

    /// A copy with every `downloaded_at` blanked, for comparing two runs.
    pub fn without_timestamps(&self) -> Self {
        let mut copy = self.clone();
        for outcome in &mut copy.files {
            outcome.downloaded_at.clear();
        }
        copy
    }
}

/// Appends `url` unless it is already present.
pub(crate) fn push_unique(urls: &mut Vec<String>, url: &str) {
    if !urls.iter().any(|u| u == url) {
        urls.push(url.to_string());
    }
}
