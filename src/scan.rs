//! Corpus enumeration and summary-path derivation.
//!
//! The scanner walks a single directory level: every regular file whose
//! extension matches the source extension becomes a candidate document. The
//! enumeration order is whatever the directory yields; nothing downstream
//! depends on it beyond stable progress counts within one run.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::SUMMARY_EXTENSION;

/// One candidate source document. The stem (file name without extension) is
/// the canonical document name, reused for the summary file name and the
/// documentation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub stem: String,
}

/// Enumerates source documents in `input_dir` with the given extension.
/// Non-matching entries and subdirectories are silently skipped.
pub fn scan_documents(input_dir: &Path, extension: &str) -> io::Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .map(|ext| ext == extension)
            .unwrap_or(false);
        if !matches {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => {
                debug!(path = %path.display(), "Skipping entry with non-UTF-8 name");
                continue;
            }
        };
        documents.push(SourceDocument { path, stem });
    }
    debug!(
        input_dir = %input_dir.display(),
        count = documents.len(),
        "Scanned corpus directory"
    );
    Ok(documents)
}

/// Expected output path for a document's summary. The existence of a file at
/// this path is the whole caching contract: present means already processed,
/// regardless of content.
pub fn summary_path(output_dir: &Path, stem: &str) -> PathBuf {
    output_dir.join(format!("{stem}.{SUMMARY_EXTENSION}"))
}
