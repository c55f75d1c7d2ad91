//! Resolve, fetch, parse and summarize in one call.

use super::error::Result;
use super::fetcher::fetch_filings;
use super::ident::{IdentifierResolver, TickerStore};
use super::options::SelectionOptions;
use super::parse::{ParseSource, parse_filing};
use super::summary::summarize_parsed_file;
use super::traits::{Fetch, Summarizer};
use std::path::PathBuf;

/// Inputs of a full pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Ticker or CIK.
    pub identifier: String,
    pub selection: SelectionOptions,
    /// Root of the filing store.
    pub data_root: PathBuf,
    /// Where parsed documents and summaries are written.
    pub out_dir: PathBuf,
}

impl PipelineRequest {
    pub fn new(
        identifier: impl Into<String>,
        data_root: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            selection: SelectionOptions::default(),
            data_root: data_root.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn with_selection(mut self, selection: SelectionOptions) -> Self {
        self.selection = selection;
        self
    }
}

/// Runs the whole chain for one company and returns the summary paths, in
/// selection order. Filings the catalog lists without a primary document are
/// stored but not summarized.
///
/// # Errors
///
/// Stops at the first failing step. Filings stored, parsed or summarized
/// before the failure stay on disk.
pub async fn run_pipeline<F, S, Z>(
    client: &F,
    resolver: &IdentifierResolver<S>,
    summarizer: &Z,
    request: &PipelineRequest,
) -> Result<Vec<PathBuf>>
where
    F: Fetch + ?Sized,
    S: TickerStore,
    Z: Summarizer + ?Sized,
{
    let company = resolver.resolve(client, &request.identifier).await?;
    let manifests =
        fetch_filings(client, &company, &request.selection, &request.data_root).await?;

    let mut summaries = Vec::with_capacity(manifests.len());
    for manifest in &manifests {
        if !manifest.filing.has_primary_document() {
            tracing::warn!(
                accession = %manifest.filing.accession,
                "no primary document in catalog, skipping parse"
            );
            continue;
        }
        let source = ParseSource::Accession(manifest.filing.accession.clone());
        let parsed = parse_filing(&source, &request.data_root, &request.out_dir)?;
        summaries.push(summarize_parsed_file(summarizer, &parsed, &request.out_dir).await?);
    }

    tracing::info!(
        cik10 = company.cik10(),
        summaries = summaries.len(),
        "pipeline finished"
    );
    Ok(summaries)
}
