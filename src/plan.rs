//! Download plans: which remote resources belong to a filing and where they go on disk.

use super::catalog::FilingRecord;
use super::config::EdgarUrls;
use super::ident::plain_cik;
use serde::{Deserialize, Serialize};

/// Local file name of the filing's directory index page.
pub const INDEX_FILE_NAME: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// The filing's primary document (the 10-K/10-Q body).
    Primary,
    /// The HTML listing of every file in the filing folder.
    Index,
}

/// One remote resource of a filing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    pub url: String,
    pub kind: TaskKind,
    /// Path relative to the filing directory.
    #[serde(rename = "dest_relpath")]
    pub destination: String,
}

/// Builds download plans against an archive base URL.
#[derive(Debug, Clone)]
pub struct DownloadPlanner {
    archives_url: String,
}

impl Default for DownloadPlanner {
    fn default() -> Self {
        Self::from_urls(&EdgarUrls::default())
    }
}

impl DownloadPlanner {
    pub fn new(archives_url: impl Into<String>) -> Self {
        Self {
            archives_url: archives_url.into(),
        }
    }

    pub fn from_urls(urls: &EdgarUrls) -> Self {
        Self::new(urls.archives.clone())
    }

    /// The tasks for one filing, in the order they are fetched: primary
    /// document first, then the folder index. A filing without a primary
    /// document gets the index alone.
    pub fn plan(&self, filing: &FilingRecord) -> Vec<DownloadTask> {
        if !filing.has_primary_document() {
            return vec![self.index_task(filing)];
        }
        vec![self.primary_task(filing), self.index_task(filing)]
    }

    fn folder_url(&self, filing: &FilingRecord) -> String {
        format!(
            "{}/data/{}/{}",
            self.archives_url,
            plain_cik(&filing.cik10),
            filing.accession_compact
        )
    }

    fn primary_task(&self, filing: &FilingRecord) -> DownloadTask {
        DownloadTask {
            url: format!("{}/{}", self.folder_url(filing), filing.primary_document),
            kind: TaskKind::Primary,
            destination: filing.primary_document.clone(),
        }
    }

    fn index_task(&self, filing: &FilingRecord) -> DownloadTask {
        DownloadTask {
            url: format!("{}/{}", self.folder_url(filing), INDEX_FILE_NAME),
            kind: TaskKind::Index,
            destination: INDEX_FILE_NAME.to_string(),
        }
    }
}
