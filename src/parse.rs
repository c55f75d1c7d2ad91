//! Turns a stored filing document into a `ParsedDocument` JSON artifact.
//!
//! The artifact is what the summarization step consumes:
//!
//! ```json
//! { "meta": { "source_path": "...", "cik10": "...", ... },
//!   "sections": { "item_1": "...", "item_1a": "..." } }
//! ```

use super::catalog::{FilingRecord, compact_accession};
use super::error::{EdgarError, Result};
use super::manifest::ProvenanceManifest;
use super::parsing::sections::{Sections, segment};
use super::store::{self, MANIFEST_FILE_NAME, contained_path, write_atomic};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub meta: BTreeMap<String, Value>,
    pub sections: Sections,
}

/// Which document to parse.
#[derive(Debug, Clone)]
pub enum ParseSource {
    /// A filing previously fetched into the data root, by accession number
    /// (with or without dashes).
    Accession(String),
    /// Any document on disk.
    Path(PathBuf),
}

impl ParsedDocument {
    /// Identifying fields of a filing, as written into `meta`.
    pub fn filing_meta(filing: &FilingRecord) -> BTreeMap<String, Value> {
        let mut meta = BTreeMap::new();
        meta.insert("accession".into(), Value::from(filing.accession.clone()));
        meta.insert(
            "accession_nodash".into(),
            Value::from(filing.accession_compact.clone()),
        );
        meta.insert("cik10".into(), Value::from(filing.cik10.clone()));
        meta.insert("form".into(), Value::from(filing.form.clone()));
        meta.insert("filing_date".into(), Value::from(filing.filing_date.clone()));
        meta.insert(
            "report_period".into(),
            filing.report_period.clone().map_or(Value::Null, Value::from),
        );
        meta
    }

    /// A string field of `meta`, if present.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "htm" | "html" | "xhtml" | "xml"))
}

/// Readable text of a document: HTML is reduced to its text nodes, anything
/// else is taken as-is. Invalid UTF-8 is replaced rather than rejected.
pub fn document_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| EdgarError::fs(path, e))?;
    let content = String::from_utf8_lossy(&bytes);

    if is_html(path) {
        return Ok(markup_text(&content));
    }
    Ok(content.into_owned())
}

#[cfg(feature = "html")]
fn markup_text(content: &str) -> String {
    super::parsing::html::html_to_text(content)
}

#[cfg(not(feature = "html"))]
fn markup_text(content: &str) -> String {
    tracing::debug!("html feature disabled, segmenting raw markup");
    content.to_string()
}

/// Reads a document and segments it into sections.
pub fn extract_sections_from_file(path: &Path) -> Result<Sections> {
    Ok(segment(&document_text(path)?))
}

/// Finds a fetched filing by accession number under `data_root`.
///
/// Looks for `{data_root}/*/{accession_nodash}/manifest.json` and returns the
/// manifest with the path of the primary document.
///
/// # Errors
///
/// * `EdgarError::NotFound` - the data root does not exist, no company
///   directory holds the filing, or the manifest exists but the primary
///   document is gone
/// * `EdgarError::MalformedResponse` - the manifest's primary document points
///   outside the filing directory
pub fn find_filing_by_accession(
    accession: &str,
    data_root: &Path,
) -> Result<(ProvenanceManifest, PathBuf)> {
    let compact = compact_accession(accession.trim());
    let entries = match fs::read_dir(data_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(EdgarError::NotFound(format!(
                "data root {}",
                data_root.display()
            )));
        }
        Err(e) => return Err(EdgarError::fs(data_root, e)),
    };

    let mut company_dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    company_dirs.sort();

    for company_dir in company_dirs {
        let candidate = company_dir.join(&compact);
        if !candidate.join(MANIFEST_FILE_NAME).exists() {
            continue;
        }
        let manifest = store::read_manifest(&candidate)?;
        if !manifest.filing.has_primary_document() {
            return Err(EdgarError::NotFound(format!(
                "primary document of filing {}",
                manifest.filing.accession
            )));
        }
        let primary = contained_path(&candidate, &manifest.filing.primary_document)
            .ok_or_else(|| {
                EdgarError::MalformedResponse(format!(
                    "manifest in {}: primary document {:?} escapes the filing directory",
                    candidate.display(),
                    manifest.filing.primary_document
                ))
            })?;
        if !primary.exists() {
            return Err(EdgarError::NotFound(format!(
                "primary document {} listed in manifest",
                primary.display()
            )));
        }
        return Ok((manifest, primary));
    }

    Err(EdgarError::NotFound(format!(
        "filing {} under {}",
        accession,
        data_root.display()
    )))
}

/// Parses a document into a `ParsedDocument` and writes it into `out_dir`.
///
/// The artifact is named `{cik10}_{accession_nodash}.json` for a fetched
/// filing and `{file stem}.parsed.json` for an arbitrary path. Returns the
/// artifact path.
pub fn parse_filing(source: &ParseSource, data_root: &Path, out_dir: &Path) -> Result<PathBuf> {
    let (manifest, document) = match source {
        ParseSource::Accession(accession) => {
            let (manifest, primary) = find_filing_by_accession(accession, data_root)?;
            (Some(manifest), primary)
        }
        ParseSource::Path(path) => {
            if !path.exists() {
                return Err(EdgarError::NotFound(format!("document {}", path.display())));
            }
            (None, path.clone())
        }
    };

    let sections = extract_sections_from_file(&document)?;

    let (mut meta, out_name) = match &manifest {
        Some(manifest) => (
            ParsedDocument::filing_meta(&manifest.filing),
            format!(
                "{}_{}.json",
                manifest.filing.cik10, manifest.filing.accession_compact
            ),
        ),
        None => {
            let stem = document
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            (BTreeMap::new(), format!("{}.parsed.json", stem))
        }
    };
    meta.insert(
        "source_path".into(),
        Value::from(document.display().to_string()),
    );

    let parsed = ParsedDocument { meta, sections };
    let out_path = out_dir.join(out_name);
    write_atomic(&out_path, &serde_json::to_vec_pretty(&parsed)?)?;

    tracing::info!(
        path = %out_path.display(),
        sections = parsed.sections.len(),
        "wrote parsed document"
    );
    Ok(out_path)
}

/// Reads a `ParsedDocument` artifact.
pub fn read_parsed(path: &Path) -> Result<ParsedDocument> {
    let content = fs::read(path).map_err(|e| EdgarError::fs(path, e))?;
    serde_json::from_slice(&content).map_err(|e| {
        EdgarError::MalformedResponse(format!("parsed document {}: {}", path.display(), e))
    })
}
