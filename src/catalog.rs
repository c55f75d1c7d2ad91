//! Submission catalog parsing.
//!
//! `data.sec.gov/submissions/CIK##########.json` lists a company's recent
//! filings as a record of parallel arrays, one array per column, already
//! ordered most-recent-first. This module zips those columns back into
//! [`FilingRecord`] rows.

use super::error::Result;
use super::ident::CompanyIdentifier;
use super::traits::Fetch;
use serde::{Deserialize, Serialize};

/// The parts of a submissions document this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tickers: Vec<String>,
    pub filings: FilingsData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilingsData {
    pub recent: RecentFilings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentFilings {
    #[serde(rename = "accessionNumber", default)]
    pub accession_number: Vec<String>,
    #[serde(default)]
    pub form: Vec<String>,
    #[serde(rename = "filingDate", default)]
    pub filing_date: Vec<String>,
    #[serde(rename = "reportDate", default)]
    pub report_date: Option<Vec<Option<String>>>,
    #[serde(rename = "primaryDocument", default)]
    pub primary_document: Vec<String>,
}

/// One filing of one company.
///
/// Serialized field names match the `filing` object of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    pub cik10: String,
    /// Accession number with dashes, e.g. `0000320193-23-000106`.
    pub accession: String,
    /// Accession number without dashes, used in archive URLs and storage paths.
    #[serde(rename = "accession_nodash")]
    pub accession_compact: String,
    pub form: String,
    pub filing_date: String,
    pub report_period: Option<String>,
    pub primary_document: String,
}

/// Removes the separators from an accession number.
pub fn compact_accession(accession: &str) -> String {
    accession.replace('-', "")
}

impl FilingRecord {
    pub fn new(
        cik10: impl Into<String>,
        accession: impl Into<String>,
        form: impl Into<String>,
        filing_date: impl Into<String>,
        report_period: Option<String>,
        primary_document: impl Into<String>,
    ) -> Self {
        let accession = accession.into();
        Self {
            cik10: cik10.into(),
            accession_compact: compact_accession(&accession),
            accession,
            form: form.into(),
            filing_date: filing_date.into(),
            report_period: report_period.filter(|p| !p.trim().is_empty()),
            primary_document: primary_document.into(),
        }
    }

    /// `false` when the catalog row carries no primary document name.
    pub fn has_primary_document(&self) -> bool {
        !self.primary_document.trim().is_empty()
    }

    /// `true` for amended forms such as `10-K/A`.
    pub fn is_amendment(&self) -> bool {
        self.form.trim().to_ascii_uppercase().ends_with("/A")
    }
}

impl RecentFilings {
    /// Number of complete rows: the shortest participating column.
    ///
    /// `reportDate` only takes part when the column is present at all.
    pub fn row_count(&self) -> usize {
        let len = [
            self.accession_number.len(),
            self.form.len(),
            self.filing_date.len(),
            self.primary_document.len(),
        ]
        .into_iter()
        .min()
        .unwrap_or(0);

        match &self.report_date {
            Some(dates) => len.min(dates.len()),
            None => len,
        }
    }

    fn report_date_at(&self, idx: usize) -> Option<String> {
        self.report_date
            .as_ref()
            .and_then(|dates| dates.get(idx).cloned().flatten())
    }

    /// Zips the columns into records, in source order.
    pub fn records(&self, cik10: &str) -> Vec<FilingRecord> {
        (0..self.row_count())
            .map(|idx| {
                FilingRecord::new(
                    cik10,
                    self.accession_number[idx].trim(),
                    self.form[idx].trim(),
                    self.filing_date[idx].trim(),
                    self.report_date_at(idx),
                    self.primary_document[idx].trim(),
                )
            })
            .collect()
    }
}

/// Parses a raw submissions document into filing records.
///
/// # Errors
///
/// `EdgarError::MalformedResponse` if the body is not JSON or has no
/// `filings.recent` object.
pub fn parse_catalog(cik10: &str, raw: &[u8]) -> Result<Vec<FilingRecord>> {
    let submission: Submission = serde_json::from_slice(raw)?;
    Ok(submission.filings.recent.records(cik10))
}

/// Downloads and parses the submission catalog of a company.
///
/// Returns the catalog URL alongside the records so callers can record it as
/// provenance.
pub async fn fetch_catalog<F: Fetch + ?Sized>(
    client: &F,
    company: &CompanyIdentifier,
) -> Result<(String, Vec<FilingRecord>)> {
    let url = client.urls().submissions(company.cik10());
    let response = client.get(&url, None).await?;
    let records = parse_catalog(company.cik10(), &response.body)?;
    tracing::debug!(%url, filings = records.len(), "parsed submission catalog");
    Ok((url, records))
}
