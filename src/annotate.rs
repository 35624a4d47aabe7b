//! Link annotation over written summaries.
//!
//! Pure local text processing, run as its own subcommand after the
//! summarise pipeline: for each summary file, find the identifier the model
//! highlighted first (quoted or bold, earliest text position across both
//! kinds) and append a canonical documentation link for the source document.
//! Files with no identifier are left untouched and reported as skipped.
//! Re-running appends the sentence again; the pass does not guard against
//! that.

use regex::Regex;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::{debug, info, warn};

use crate::config::{AnnotateConfig, SOURCE_EXTENSION, SUMMARY_EXTENSION};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnnotateReport {
    pub annotated: usize,
    pub skipped: usize,
}

/// Identifier patterns, scanned over the whole document. Quoted matches are
/// collected before bold ones; the stable sort on position makes the
/// earliest occurrence across both kinds win. The quote patterns are one
/// alternation per quote character, equivalent to a backreferenced pair for
/// this corpus.
struct IdentifierPatterns {
    quoted: Regex,
    bold: Regex,
}

impl IdentifierPatterns {
    fn new() -> Self {
        IdentifierPatterns {
            quoted: Regex::new(r#"'([^'\n]+)'|"([^"\n]+)"|`([^`\n]+)`"#)
                .expect("quoted identifier pattern compiles"),
            bold: Regex::new(r"\*\*(.+?)\*\*").expect("bold identifier pattern compiles"),
        }
    }

    /// Earliest identifier match in `content`, across all pattern kinds.
    fn first_identifier(&self, content: &str) -> Option<String> {
        let mut matches: Vec<(usize, String)> = Vec::new();
        for caps in self.quoted.captures_iter(content) {
            let whole = caps.get(0).expect("match has a full capture");
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .expect("one quote alternative captured");
            matches.push((whole.start(), name.as_str().to_string()));
        }
        for caps in self.bold.captures_iter(content) {
            let whole = caps.get(0).expect("match has a full capture");
            let name = caps.get(1).expect("bold body captured");
            matches.push((whole.start(), name.as_str().to_string()));
        }
        matches.sort_by_key(|(start, _)| *start);
        matches.into_iter().next().map(|(_, name)| name)
    }
}

/// The appended sentence for one summary.
fn link_sentence(identifier: &str, doc_url_prefix: &str, stem: &str) -> String {
    format!(
        "\nMore information in the documentation [{identifier}]({doc_url_prefix}/{stem}.{SOURCE_EXTENSION})\n"
    )
}

/// Entrypoint: append a documentation link to every summary file that
/// contains an identifier.
pub fn annotate(config: &AnnotateConfig) -> Result<AnnotateReport, String> {
    let patterns = IdentifierPatterns::new();
    let entries = fs::read_dir(&config.summary_dir).map_err(|e| {
        format!(
            "Failed to read summary directory {:?}: {e}",
            config.summary_dir
        )
    })?;

    let mut report = AnnotateReport::default();
    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read directory entry: {e}"))?;
        let path = entry.path();
        let is_summary = path
            .extension()
            .map(|ext| ext == SUMMARY_EXTENSION)
            .unwrap_or(false);
        if !is_summary {
            continue;
        }
        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem.to_string(),
            None => {
                debug!(path = %path.display(), "Skipping entry with non-UTF-8 name");
                continue;
            }
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read summary {:?}: {e}", path))?;

        let identifier = match patterns.first_identifier(&content) {
            Some(identifier) => identifier,
            None => {
                warn!(file = %stem, "No identifier found in summary, skipping");
                report.skipped += 1;
                continue;
            }
        };

        let sentence = link_sentence(&identifier, &config.doc_url_prefix, &stem);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open summary {:?} for append: {e}", path))?;
        file.write_all(sentence.as_bytes())
            .map_err(|e| format!("Failed to append to summary {:?}: {e}", path))?;

        info!(file = %stem, identifier = %identifier, "Appended documentation link");
        report.annotated += 1;
    }

    info!(
        annotated = report.annotated,
        skipped = report.skipped,
        "Annotation pass complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(content: &str) -> Option<String> {
        IdentifierPatterns::new().first_identifier(content)
    }

    #[test]
    fn picks_single_quoted_identifier() {
        assert_eq!(first("The 'REDUCE' function folds a GTS."), Some("REDUCE".to_string()));
    }

    #[test]
    fn picks_double_quoted_and_backticked_identifiers() {
        assert_eq!(first(r#"See "MAP" for details."#), Some("MAP".to_string()));
        assert_eq!(first("See `FILTER` for details."), Some("FILTER".to_string()));
    }

    #[test]
    fn earliest_match_wins_across_pattern_kinds() {
        // Bold at position 4, quoted later: the bold one is selected.
        let content = "The **PROFILE** macro relates to 'MP_ROW' and others.";
        assert_eq!(first(content), Some("PROFILE".to_string()));
    }

    #[test]
    fn quoted_before_bold_when_quoted_is_earlier() {
        let content = "'FLUSS' computes flux; see also **RPROFILE**.";
        assert_eq!(first(content), Some("FLUSS".to_string()));
    }

    #[test]
    fn no_identifier_yields_none() {
        assert_eq!(first("A plain sentence without markers."), None);
    }

    #[test]
    fn quotes_do_not_span_lines() {
        assert_eq!(first("a ' line\nbreak ' b"), None);
    }

    #[test]
    fn link_sentence_format() {
        let sentence = link_sentence("PROFILE", "https://example.com/docs", "PROFILE");
        assert_eq!(
            sentence,
            "\nMore information in the documentation [PROFILE](https://example.com/docs/PROFILE.mc2)\n"
        );
    }
}
