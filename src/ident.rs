//! Company identifiers: ticker and CIK normalization, and the ticker map.
//!
//! Most users start from a ticker such as `AAPL`. The SEC publishes a
//! ticker → CIK map at `www.sec.gov/files/company_tickers.json`; the resolver
//! downloads it once, stores a flat `{"AAPL": "320193", ...}` copy through a
//! [`TickerStore`], and serves later lookups from that copy.

use super::error::{EdgarError, Result};
use super::parsing::utils::deserialize_lenient_u64;
use super::store::write_atomic;
use super::traits::Fetch;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::OnceCell;

/// Uppercase ticker → CIK without leading zeros.
pub type TickerMap = BTreeMap<String, String>;

const CIK_DIGITS: usize = 10;

/// A company as known to EDGAR.
///
/// The CIK is always exactly ten ASCII digits; the only way to build one is
/// through the validating constructors below. Deserialization goes through
/// the same checks, so a hand-edited manifest cannot smuggle in a bad CIK.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCompanyIdentifier")]
pub struct CompanyIdentifier {
    ticker: Option<String>,
    cik10: String,
}

#[derive(Deserialize)]
struct RawCompanyIdentifier {
    #[serde(default)]
    ticker: Option<String>,
    cik10: String,
}

impl TryFrom<RawCompanyIdentifier> for CompanyIdentifier {
    type Error = EdgarError;

    fn try_from(raw: RawCompanyIdentifier) -> Result<Self> {
        match raw.ticker {
            Some(ticker) => Self::with_ticker(&ticker, &raw.cik10),
            None => Self::from_cik(&raw.cik10),
        }
    }
}

impl CompanyIdentifier {
    /// Identifier from a numeric CIK, padded to ten digits.
    pub fn from_cik(cik: &str) -> Result<Self> {
        Ok(Self {
            ticker: None,
            cik10: normalize_cik(cik)?,
        })
    }

    /// Identifier for a ticker whose CIK is already known.
    pub fn with_ticker(ticker: &str, cik: &str) -> Result<Self> {
        Ok(Self {
            ticker: Some(normalize_ticker(ticker)?),
            cik10: normalize_cik(cik)?,
        })
    }

    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    pub fn cik10(&self) -> &str {
        &self.cik10
    }

    /// The CIK without leading zeros, as used in archive URLs.
    pub fn plain_cik(&self) -> String {
        plain_cik(&self.cik10)
    }
}

/// Trims, uppercases and validates a ticker (`[A-Za-z0-9.-]+`).
pub fn normalize_ticker(ticker: &str) -> Result<String> {
    let trimmed = ticker.trim();
    if trimmed.is_empty() {
        return Err(EdgarError::InvalidIdentifier("ticker is empty".to_string()));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '-'))
    {
        return Err(EdgarError::InvalidIdentifier(format!(
            "ticker {:?} contains invalid character {:?}",
            trimmed, bad
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// Left-pads a digits-only CIK with zeros to ten digits.
pub fn normalize_cik(cik: &str) -> Result<String> {
    let trimmed = cik.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EdgarError::InvalidIdentifier(format!(
            "CIK {:?} must be digits only",
            trimmed
        )));
    }
    if trimmed.len() > CIK_DIGITS {
        return Err(EdgarError::InvalidIdentifier(format!(
            "CIK {:?} is longer than {} digits",
            trimmed, CIK_DIGITS
        )));
    }
    Ok(format!("{:0>10}", trimmed))
}

/// Strips leading zeros, keeping a single `0` for an all-zero CIK.
pub fn plain_cik(cik10: &str) -> String {
    let stripped = cik10.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Entry of the SEC `company_tickers.json` document.
#[derive(Debug, Deserialize, Serialize)]
pub struct CompanyTicker {
    #[serde(rename = "cik_str", deserialize_with = "deserialize_lenient_u64")]
    pub cik: u64,
    pub ticker: String,
    #[serde(default)]
    pub title: String,
}

/// Parses the SEC ticker document (`{"0": {"cik_str": 320193, "ticker": "AAPL", ...}, ...}`)
/// into an uppercase-keyed map. When a ticker appears twice, the entry with
/// the lowest index wins.
pub fn parse_ticker_map(raw: &[u8]) -> Result<TickerMap> {
    let entries: HashMap<String, CompanyTicker> = serde_json::from_slice(raw)?;

    let mut ordered: Vec<(u64, CompanyTicker)> = entries
        .into_iter()
        .map(|(key, entry)| (key.parse::<u64>().unwrap_or(u64::MAX), entry))
        .collect();
    ordered.sort_by_key(|(idx, _)| *idx);

    let mut map = TickerMap::new();
    for (_, entry) in ordered {
        let ticker = entry.ticker.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            continue;
        }
        map.entry(ticker).or_insert_with(|| entry.cik.to_string());
    }
    Ok(map)
}

fn uppercase_keys(map: TickerMap) -> TickerMap {
    map.into_iter()
        .map(|(ticker, cik)| (ticker.trim().to_ascii_uppercase(), cik))
        .collect()
}

/// Where the resolver keeps its copy of the ticker map.
pub trait TickerStore: Send + Sync {
    /// The cached map, or `None` if nothing has been stored yet.
    fn load(&self) -> Result<Option<TickerMap>>;
    /// Replaces the cached map.
    fn persist(&self, map: &TickerMap) -> Result<()>;
}

/// Ticker map cached as a flat JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileTickerStore {
    path: PathBuf,
}

impl FileTickerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TickerStore for FileTickerStore {
    fn load(&self) -> Result<Option<TickerMap>> {
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(EdgarError::fs(&self.path, e)),
        };
        let map: TickerMap = serde_json::from_slice(&content).map_err(|e| {
            EdgarError::MalformedResponse(format!("ticker cache {}: {}", self.path.display(), e))
        })?;
        Ok(Some(uppercase_keys(map)))
    }

    fn persist(&self, map: &TickerMap) -> Result<()> {
        let json = serde_json::to_vec_pretty(map)?;
        write_atomic(&self.path, &json)
    }
}

/// In-memory ticker map, for tests and short-lived processes.
#[derive(Debug, Default)]
pub struct MemoryTickerStore {
    map: Mutex<Option<TickerMap>>,
}

impl MemoryTickerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(map: TickerMap) -> Self {
        Self {
            map: Mutex::new(Some(map)),
        }
    }

    /// A copy of what is currently stored.
    pub fn snapshot(&self) -> Option<TickerMap> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<TickerMap>> {
        self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TickerStore for MemoryTickerStore {
    fn load(&self) -> Result<Option<TickerMap>> {
        Ok(self.lock().clone().map(uppercase_keys))
    }

    fn persist(&self, map: &TickerMap) -> Result<()> {
        *self.lock() = Some(map.clone());
        Ok(())
    }
}

/// Turns user input (ticker or CIK) into a [`CompanyIdentifier`].
///
/// The ticker map is loaded at most once per resolver: from the store if it
/// has a copy, otherwise from the SEC, after which it is persisted.
#[derive(Debug)]
pub struct IdentifierResolver<S> {
    store: S,
    map: OnceCell<TickerMap>,
}

impl<S: TickerStore> IdentifierResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            map: OnceCell::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolves a ticker or a numeric CIK.
    ///
    /// All-digit input is a CIK and never touches the network. Anything else
    /// is a ticker and is looked up in the ticker map.
    ///
    /// # Errors
    ///
    /// * `EdgarError::InvalidIdentifier` - empty input, a CIK over ten digits,
    ///   or a ticker with characters outside `[A-Za-z0-9.-]`
    /// * `EdgarError::NotFound` - the ticker is not in the map
    /// * Fetch and parse errors while loading the map
    pub async fn resolve<F: Fetch + ?Sized>(
        &self,
        client: &F,
        input: &str,
    ) -> Result<CompanyIdentifier> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EdgarError::InvalidIdentifier(
                "identifier is empty".to_string(),
            ));
        }

        if trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return CompanyIdentifier::from_cik(trimmed);
        }

        let ticker = normalize_ticker(trimmed)?;
        let map = self.ticker_map(client).await?;
        let cik = map
            .get(&ticker)
            .ok_or_else(|| EdgarError::NotFound(format!("ticker {}", ticker)))?;

        tracing::debug!(%ticker, %cik, "resolved ticker");
        Ok(CompanyIdentifier {
            cik10: normalize_cik(cik)?,
            ticker: Some(ticker),
        })
    }

    /// The ticker map, loading it on first use.
    pub async fn ticker_map<F: Fetch + ?Sized>(&self, client: &F) -> Result<&TickerMap> {
        self.map
            .get_or_try_init(|| self.load_ticker_map(client))
            .await
    }

    async fn load_ticker_map<F: Fetch + ?Sized>(&self, client: &F) -> Result<TickerMap> {
        if let Some(map) = self.store.load()? {
            tracing::debug!(tickers = map.len(), "ticker map loaded from cache");
            return Ok(map);
        }

        let url = client.urls().company_tickers();
        let response = client.get(&url, None).await?;
        let map = parse_ticker_map(&response.body)?;
        self.store.persist(&map)?;
        tracing::info!(tickers = map.len(), %url, "ticker map downloaded");
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deserialize_validates_identifier() {
        let company: CompanyIdentifier =
            serde_json::from_str(r#"{"ticker": " aapl ", "cik10": "320193"}"#).unwrap();
        assert_eq!(company.cik10(), "0000320193");
        assert_eq!(company.ticker(), Some("AAPL"));

        let company: CompanyIdentifier = serde_json::from_str(r#"{"cik10": "0000320193"}"#).unwrap();
        assert_eq!(company.ticker(), None);

        for bad in [
            r#"{"ticker": null, "cik10": "12ab"}"#,
            r#"{"ticker": null, "cik10": "12345678901"}"#,
            r#"{"ticker": "AA PL", "cik10": "320193"}"#,
        ] {
            assert!(serde_json::from_str::<CompanyIdentifier>(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_normalize_cik_pads() {
        assert_eq!(normalize_cik("320193").unwrap(), "0000320193");
        assert_eq!(normalize_cik("0000320193").unwrap(), "0000320193");
        assert_eq!(normalize_cik("0").unwrap(), "0000000000");
        assert_eq!(normalize_cik(" 1234567890 ").unwrap(), "1234567890");
        for len in 1..=10 {
            let digits = "7".repeat(len);
            assert_eq!(normalize_cik(&digits).unwrap().len(), 10);
        }
    }

    #[test]
    fn test_normalize_cik_rejects() {
        assert!(matches!(
            normalize_cik("12345678901"),
            Err(EdgarError::InvalidIdentifier(_))
        ));
        assert!(normalize_cik("").is_err());
        assert!(normalize_cik("12a").is_err());
    }

    #[test]
    fn test_normalize_ticker() {
        assert_eq!(normalize_ticker(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_ticker("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_ticker("BF-A").unwrap(), "BF-A");
        assert!(matches!(
            normalize_ticker("AA PL"),
            Err(EdgarError::InvalidIdentifier(_))
        ));
        assert!(normalize_ticker("AAPL$").is_err());
        assert!(normalize_ticker("   ").is_err());
    }

    #[test]
    fn test_plain_cik() {
        assert_eq!(plain_cik("0000320193"), "320193");
        assert_eq!(plain_cik("0000000000"), "0");
    }

    #[test]
    fn test_parse_ticker_map() {
        let raw = br#"{
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "1": {"cik_str": "789019", "ticker": "msft", "title": "MICROSOFT CORP"},
            "2": {"cik_str": 1111111, "ticker": "AAPL", "title": "Duplicate"}
        }"#;
        let map = parse_ticker_map(raw).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["AAPL"], "320193");
        assert_eq!(map["MSFT"], "789019");
    }

    #[test]
    fn test_parse_ticker_map_malformed() {
        assert!(matches!(
            parse_ticker_map(b"<html></html>"),
            Err(EdgarError::MalformedResponse(_))
        ));
        assert!(parse_ticker_map(br#"{"0": {"ticker": "AAPL"}}"#).is_err());
    }

    #[test]
    fn test_file_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = FileTickerStore::new(tmp.path().join("cache/tickers.json"));
        assert!(store.load().unwrap().is_none());

        let mut map = TickerMap::new();
        map.insert("aapl".to_string(), "320193".to_string());
        store.persist(&map).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.get("AAPL").map(String::as_str), Some("320193"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTickerStore::new();
        assert!(store.load().unwrap().is_none());
        let map = TickerMap::from([("MSFT".to_string(), "789019".to_string())]);
        store.persist(&map).unwrap();
        assert_eq!(store.snapshot(), Some(map));
    }
}
