//! Summarization of parsed filings.
//!
//! The crate does not talk to a language model itself. A [`Summarizer`]
//! implementation does, usually by sending the messages built by
//! [`summary_prompt`] to a chat completion endpoint.

use super::error::{EdgarError, Result};
use super::parse::read_parsed;
use super::parsing::sections::{SECTION_KEYS, Sections};
use super::store::write_atomic;
use super::traits::Summarizer;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SYSTEM_PROMPT: &str = "You are a senior equity analyst. \
Write precise, concise, investor-grade summaries of SEC filings.";

const INSTRUCTIONS: &str = "Write a structured Markdown summary:\n\
1. Overall snapshot (2-3 paragraphs)\n\
2. Key risks (bullet list, based on Item 1A)\n\
3. Business overview (based on Item 1)\n\
4. MD&A highlights (based on Item 2 or 7)\n\
5. Market risk and controls (based on Items 3, 7A, 4, 9A)\n\n\
Do NOT ask for more content. All sections you need are already provided below.\n\
If something is missing, state that briefly.\n";

/// System and user message of a summary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPrompt {
    pub system: String,
    pub user: String,
}

/// Heading of a section key: `item_1a` → `Item 1A`.
pub fn section_label(key: &str) -> Option<String> {
    SECTION_KEYS
        .iter()
        .find(|(_, known)| *known == key)
        .map(|(label, _)| format!("Item {}", label))
}

fn meta_field(meta: &BTreeMap<String, Value>, key: &str) -> String {
    match meta.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Builds the summary request for a parsed filing.
///
/// Sections appear in item order under `### Item N` headings; absent
/// sections are left out. The output depends only on the inputs.
pub fn summary_prompt(meta: &BTreeMap<String, Value>, sections: &Sections) -> SummaryPrompt {
    let header = format!(
        "CIK: {}, Form: {}, Filing date: {}",
        meta_field(meta, "cik10"),
        meta_field(meta, "form"),
        meta_field(meta, "filing_date")
    );
    let header = header.trim_matches(|c| c == ',' || c == ' ');

    let mut parts = vec![format!("Metadata:\n{}\n", header), INSTRUCTIONS.to_string()];
    for (label, key) in SECTION_KEYS {
        if let Some(text) = sections.get(*key) {
            parts.push(format!("\n\n### Item {}\n{}", label, text));
        }
    }

    SummaryPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user: parts.join("\n"),
    }
}

/// Summarizes a `ParsedDocument` artifact and writes the result as Markdown.
///
/// The output is `{out_dir}/{accession_nodash}.summary.md`, falling back to
/// the input's file stem when the artifact carries no accession.
///
/// # Errors
///
/// Read errors on the artifact, any error of the summarizer, and write errors
/// on the output.
pub async fn summarize_parsed_file<S: Summarizer + ?Sized>(
    summarizer: &S,
    input: &Path,
    out_dir: &Path,
) -> Result<PathBuf> {
    let parsed = read_parsed(input)?;
    let summary = summarizer.summarize(&parsed.meta, &parsed.sections).await?;

    let base = match parsed.meta_str("accession_nodash") {
        Some(acc) if !acc.is_empty() => acc.to_string(),
        _ => input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| {
                EdgarError::InvalidIdentifier(format!(
                    "cannot name a summary for {}",
                    input.display()
                ))
            })?,
    };

    let out_path = out_dir.join(format!("{}.summary.md", base));
    write_atomic(&out_path, summary.as_bytes())?;
    tracing::info!(path = %out_path.display(), "wrote summary");
    Ok(out_path)
}
