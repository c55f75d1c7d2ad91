//! Idempotent on-disk storage for fetched filings.
//!
//! Layout under a data root:
//!
//! ```text
//! {root}/{cik10}/{accession_nodash}/
//!     {primary document}
//!     index.html
//!     manifest.json
//! ```
//!
//! Every file is written to a sibling temporary path and renamed into place,
//! so readers see either the previous content or the complete new content.

use super::catalog::FilingRecord;
use super::error::{EdgarError, Result};
use super::manifest::ProvenanceManifest;
use super::plan::DownloadTask;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

pub fn company_dir(root: &Path, cik10: &str) -> PathBuf {
    root.join(cik10)
}

/// `{root}/{cik10}/{accession_nodash}`
pub fn filing_dir(root: &Path, filing: &FilingRecord) -> PathBuf {
    company_dir(root, &filing.cik10).join(&filing.accession_compact)
}

/// `relative` joined onto `dir`, or `None` when it is empty, absolute or
/// climbs out of `dir`.
pub fn contained_path(dir: &Path, relative: &str) -> Option<PathBuf> {
    let path = Path::new(relative);
    let contained = !relative.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    contained.then(|| dir.join(path))
}

/// Destination of a task inside its filing directory.
///
/// # Errors
///
/// `EdgarError::MalformedResponse` if the destination is empty, absolute or
/// climbs out of the filing directory.
pub fn task_path(filing_dir: &Path, task: &DownloadTask) -> Result<PathBuf> {
    contained_path(filing_dir, &task.destination).ok_or_else(|| {
        EdgarError::MalformedResponse(format!(
            "download destination {:?} of {} escapes the filing directory",
            task.destination, task.url
        ))
    })
}

pub fn manifest_path(filing_dir: &Path) -> PathBuf {
    filing_dir.join(MANIFEST_FILE_NAME)
}

/// Hex SHA-256 of `content`.
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Writes `content` to `path` atomically, creating parent directories.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_with(path, |file| file.write_all(content))
}

/// Atomic write driven by a caller-supplied writer.
///
/// `write` receives the temporary file. If it fails, the temporary file is
/// removed and `path` is left untouched.
pub fn write_atomic_with<W>(path: &Path, write: W) -> Result<()>
where
    W: FnOnce(&mut File) -> io::Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| EdgarError::fs(&parent, e))?;

    let tmp = temp_sibling(path);
    let result = File::create(&tmp)
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(EdgarError::fs(path, e));
    }
    Ok(())
}

/// `.{name}.{pid}.{random}.tmp` next to `path`, unique per writer.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{}.{}.{:08x}.tmp",
        name,
        std::process::id(),
        fastrand::u32(..)
    ))
}

/// True if `path` exists and, when `expected_sha256` is given, hashes to it.
///
/// Fetching never rehashes files it reuses; use this with the `sha256` of a
/// manifest outcome to check a stored filing for tampering or truncation.
pub fn exists_and_same(path: &Path, expected_sha256: Option<&str>) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    match expected_sha256 {
        None => Ok(true),
        Some(expected) => {
            let content = fs::read(path).map_err(|e| EdgarError::fs(path, e))?;
            Ok(sha256_hex(&content) == expected)
        }
    }
}

/// Tasks whose destination does not exist yet, in plan order. These are the
/// only tasks a fetch sends requests for.
pub fn needed_tasks<'a>(tasks: &'a [DownloadTask], filing_dir: &Path) -> Result<Vec<&'a DownloadTask>> {
    let mut needed = Vec::new();
    for task in tasks {
        if !task_path(filing_dir, task)?.exists() {
            needed.push(task);
        }
    }
    Ok(needed)
}

/// Writes `manifest.json` into the filing directory and returns its path.
pub fn write_manifest(filing_dir: &Path, manifest: &ProvenanceManifest) -> Result<PathBuf> {
    let path = manifest_path(filing_dir);
    let json = serde_json::to_vec_pretty(manifest)?;
    write_atomic(&path, &json)?;
    Ok(path)
}

/// Reads `manifest.json` from the filing directory.
///
/// # Errors
///
/// * `EdgarError::NotFound` - no manifest in this directory
/// * `EdgarError::MalformedResponse` - the manifest is not valid JSON of the expected shape
pub fn read_manifest(filing_dir: &Path) -> Result<ProvenanceManifest> {
    let path = manifest_path(filing_dir);
    let content = match fs::read(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(EdgarError::NotFound(format!(
                "manifest {}",
                path.display()
            )));
        }
        Err(e) => return Err(EdgarError::fs(&path, e)),
    };
    serde_json::from_slice(&content).map_err(|e| {
        EdgarError::MalformedResponse(format!("manifest {}: {}", path.display(), e))
    })
}
