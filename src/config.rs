use std::time::Duration;

/// Default user agent. SEC.gov asks for an application name and a contact address.
pub const DEFAULT_USER_AGENT: &str = "edgarsum/0.1 (contact@example.com)";

/// Configuration for the Edgar client
#[derive(Debug, Clone)]
pub struct EdgarConfig {
    /// User agent string for HTTP requests
    pub user_agent: String,
    /// Request ceiling in requests per second. Zero or negative disables throttling.
    pub requests_per_second: f64,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Base URLs for different EDGAR services
    pub base_urls: EdgarUrls,
}

/// Base URLs for different EDGAR services
#[derive(Debug, Clone)]
pub struct EdgarUrls {
    /// Base URL for EDGAR archives
    pub archives: String,
    /// Base URL for EDGAR data (submissions)
    pub data: String,
    /// Base URL for EDGAR files (ticker maps)
    pub files: String,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            requests_per_second: 5.0,
            timeout: Duration::from_secs(15),
            base_urls: EdgarUrls::default(),
        }
    }
}

impl EdgarConfig {
    /// Creates a new EdgarConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use edgarsum::{Edgar, EdgarConfig};
    /// use std::time::Duration;
    /// let config = EdgarConfig::new("YourAppName contact@example.com", 5.0, Duration::from_secs(15), None);
    /// let edgar = Edgar::with_config(config)?;
    /// # Ok::<(), edgarsum::EdgarError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        requests_per_second: f64,
        timeout: Duration,
        base_urls: Option<EdgarUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            requests_per_second,
            timeout,
            base_urls: base_urls.unwrap_or_default(),
        }
    }
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives/edgar".to_string(),
            data: "https://data.sec.gov".to_string(),
            files: "https://www.sec.gov/files".to_string(),
        }
    }
}

impl EdgarUrls {
    /// Submission catalog for a zero-padded CIK.
    pub fn submissions(&self, cik10: &str) -> String {
        format!("{}/submissions/CIK{}.json", self.data, cik10)
    }

    /// The public ticker to CIK map.
    pub fn company_tickers(&self) -> String {
        format!("{}/company_tickers.json", self.files)
    }

    /// Folder of a single filing in the archive.
    pub fn filing_folder(&self, plain_cik: &str, accession_compact: &str) -> String {
        format!("{}/data/{}/{}", self.archives, plain_cik, accession_compact)
    }
}
