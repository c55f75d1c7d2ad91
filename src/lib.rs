//! # edgarsum - SEC filing fetch, storage and section extraction
//!
//! edgarsum downloads a company's annual and quarterly reports from SEC EDGAR,
//! stores them on disk with a provenance manifest, and splits their text into
//! the standard `Item` sections ready for summarization.
//!
//! ## Features
//!
//! - **Rate-limited HTTP client** - Complies with SEC.gov fair access rules
//! - **Identifier resolution** - Tickers or CIKs, with a cached ticker map
//! - **Catalog selection** - Filter recent filings by form, amendments and count
//! - **Idempotent storage** - Atomic writes, SHA-256 hashes, `manifest.json` per filing
//! - **Section extraction** - `Item 1`, `1A`, `2`, `3`, `4`, `7`, `7A` and `9A`
//! - **Summarization seam** - Plug any language model in through [`Summarizer`]
//!
//! ## Requirements
//!
//! edgarsum is async and requires a runtime; the examples use
//! [tokio](https://tokio.rs).
//!
//! ## Basic Usage
//!
//! ```ignore
//! use edgarsum::{Edgar, FileTickerStore, IdentifierResolver, SelectionOptions, fetch_filings};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Initialize with a proper user agent (required by SEC.gov)
//!     let edgar = Edgar::new("YourAppName contact@example.com")?;
//!     let resolver = IdentifierResolver::new(FileTickerStore::new("data/company_tickers.json"));
//!
//!     let company = resolver.resolve(&edgar, "AAPL").await?;
//!     let options = SelectionOptions::new().with_form_type("10-K").with_limit(1);
//!
//!     for manifest in fetch_filings(&edgar, &company, &options, Path::new("data")).await? {
//!         println!("Stored {} filed {}", manifest.filing.form, manifest.filing.filing_date);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod catalog;
mod config;
mod core;
mod error;
mod fetcher;
mod ident;
mod manifest;
mod options;
mod parse;
pub mod parsing;
mod pipeline;
mod plan;
mod retry;
mod store;
mod summary;
mod traits;

pub use catalog::{FilingRecord, RecentFilings, Submission, compact_accession, fetch_catalog, parse_catalog};
pub use config::{DEFAULT_USER_AGENT, EdgarConfig, EdgarUrls};
pub use core::{Edgar, FetchResponse, Throttle, body_preview};
pub use error::{EdgarError, ErrorKind, Result};
pub use fetcher::{fetch_filing, fetch_filings};
pub use ident::{
    CompanyIdentifier, CompanyTicker, FileTickerStore, IdentifierResolver, MemoryTickerStore,
    TickerMap, TickerStore, normalize_cik, normalize_ticker, parse_ticker_map, plain_cik,
};
pub use manifest::{DownloadOutcome, ProvenanceManifest};
pub use options::{SelectionOptions, exclude_amendments, filter_forms, take_limit};
pub use parse::{
    ParseSource, ParsedDocument, document_text, extract_sections_from_file,
    find_filing_by_accession, parse_filing, read_parsed,
};
pub use parsing::sections::{SECTION_KEYS, Sections, normalize_block, section_key, segment};
pub use pipeline::{PipelineRequest, run_pipeline};
pub use plan::{DownloadPlanner, DownloadTask, INDEX_FILE_NAME, TaskKind};
pub use retry::{RetryPolicy, Retrying};
pub use store::{
    MANIFEST_FILE_NAME, company_dir, exists_and_same, filing_dir, manifest_path, needed_tasks,
    read_manifest, sha256_hex, task_path, write_atomic, write_atomic_with, write_manifest,
};
pub use summary::{SYSTEM_PROMPT, SummaryPrompt, section_label, summarize_parsed_file, summary_prompt};
pub use traits::{Fetch, Summarizer};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
