//! Coordinating module for the scan → summarise → persist pipeline.
//!
//! Walks the input corpus once, sequentially. Per document: the idempotency
//! gate (an existing summary file short-circuits everything), then the
//! truncating request protocol (at most two attempts against the completion
//! API), then atomic persistence plus token accounting. Per-document
//! failures are logged and never abort the batch; only configuration
//! problems and an unreadable corpus directory do.
//!
//! # Major types
//! - [`SummariseReport`]: per-document outcomes plus run totals
//! - [`PipelineState`]: attempted-document and token counters owned by the
//!   driver and threaded through the loop by reference
//!
//! # Callable from
//! - The CLI entrypoint and integration tests; expects any
//!   [`CompletionApi`] implementation (production client or mock).

use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, error, info, warn};

use crate::completion::{classify, ChatRequest, Completion, CompletionApi};
use crate::config::{PipelineConfig, MACRO_BODY_MARKER, SOURCE_EXTENSION};
use crate::prompts::user_message;
use crate::scan::{scan_documents, summary_path, SourceDocument};

/// Final report for one pipeline run.
#[derive(Debug)]
pub struct SummariseReport {
    /// Documents that went through the request protocol (successes and
    /// failures; skipped documents are not attempts).
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total_tokens: u64,
    pub documents: Vec<DocumentReport>,
}

#[derive(Debug)]
pub struct DocumentReport {
    pub stem: String,
    pub outcome: DocumentOutcome,
}

#[derive(Debug, PartialEq, Eq)]
pub enum DocumentOutcome {
    Summarised { tokens: u64 },
    Skipped,
    Failed { message: String },
}

/// Counters owned by the pipeline driver; mutated only by the single control
/// loop.
#[derive(Debug, Default)]
struct PipelineState {
    attempted: usize,
    total_tokens: u64,
}

impl PipelineState {
    fn record_attempt(&mut self, config: &PipelineConfig) {
        self.attempted += 1;
        if config.report_interval > 0 && self.attempted % config.report_interval == 0 {
            info!(
                documents = self.attempted,
                total_tokens = self.total_tokens,
                "Progress"
            );
        }
    }
}

/// Outcome of the request protocol for one document.
#[derive(Debug, PartialEq, Eq)]
enum AttemptOutcome {
    Summarised { summary: String, tokens: u64 },
    Rejected { status: u16, message: String },
}

/// Truncation transform applied between the two attempts: everything before
/// the macro-body marker. Returns `None` when the marker is absent, in which
/// case the retry goes out with the original content unchanged (a second
/// oversize rejection then terminates the protocol).
fn truncate_at_marker<'a>(content: &'a str, marker: &str) -> Option<&'a str> {
    content.find(marker).map(|index| &content[..index])
}

/// The truncating request protocol: submit the full document, and on an
/// oversize rejection rebuild with truncated content and submit exactly once
/// more. Any other rejection, or a second oversize one, is terminal for the
/// document. Transport errors bubble up as `Err`.
async fn request_summary<C>(
    api: &C,
    config: &PipelineConfig,
    content: &str,
) -> Result<AttemptOutcome, Box<dyn std::error::Error + Send + Sync>>
where
    C: CompletionApi + ?Sized,
{
    let request = ChatRequest::single_user(&config.model, user_message(content));
    let response = api.complete(request).await?;

    let first = classify(&response);
    let completion = match first {
        Completion::RetryableOversize => {
            let retry_content = match truncate_at_marker(content, MACRO_BODY_MARKER) {
                Some(truncated) => {
                    debug!(
                        original_len = content.len(),
                        truncated_len = truncated.len(),
                        "Request rejected as oversized, retrying with truncated content"
                    );
                    truncated
                }
                None => {
                    warn!("Request rejected as oversized but truncation marker not found, retrying unchanged");
                    content
                }
            };
            let retry = ChatRequest::single_user(&config.model, user_message(retry_content));
            let response = api.complete(retry).await?;
            match classify(&response) {
                Completion::RetryableOversize => Completion::TerminalFailure {
                    status: 400,
                    message: "Request still oversized after truncation".to_string(),
                },
                other => other,
            }
        }
        other => other,
    };

    Ok(match completion {
        Completion::Success {
            summary,
            total_tokens,
        } => AttemptOutcome::Summarised {
            summary,
            tokens: total_tokens,
        },
        Completion::TerminalFailure { status, message } => {
            AttemptOutcome::Rejected { status, message }
        }
        // Converted above; a bare oversize never escapes the protocol.
        Completion::RetryableOversize => unreachable!("oversize handled by retry"),
    })
}

/// Writes the summary via a temp file in the output directory followed by a
/// rename, so the idempotency gate can never observe a half-written summary.
fn write_summary(output_dir: &Path, path: &Path, summary: &str) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(output_dir)?;
    tmp.write_all(summary.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Entrypoint: summarise every unprocessed document in the corpus.
pub async fn summarise<C>(
    config: &PipelineConfig,
    api: &C,
) -> Result<SummariseReport, String>
where
    C: CompletionApi + ?Sized,
{
    info!("Starting summarise pipeline");

    if let Err(e) = fs::create_dir_all(&config.output_dir) {
        error!(error = ?e, output_dir = %config.output_dir.display(), "Failed to create output directory");
        return Err(format!(
            "Failed to create output directory {:?}: {e}",
            config.output_dir
        ));
    }

    let documents = scan_documents(&config.input_dir, SOURCE_EXTENSION)
        .map_err(|e| format!("Failed to scan corpus directory {:?}: {e}", config.input_dir))?;
    info!(candidates = documents.len(), "Corpus scanned");

    let mut state = PipelineState::default();
    let mut reports: Vec<DocumentReport> = Vec::new();
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    for document in &documents {
        // Cap is checked between documents only, never mid-request.
        if let Some(cap) = config.max_documents {
            if state.attempted >= cap {
                info!(cap, "Document cap reached, stopping early");
                break;
            }
        }

        let output = summary_path(&config.output_dir, &document.stem);
        if output.exists() {
            debug!(stem = %document.stem, "Summary already exists, skipping");
            skipped += 1;
            reports.push(DocumentReport {
                stem: document.stem.clone(),
                outcome: DocumentOutcome::Skipped,
            });
            continue;
        }

        let outcome = process_document(api, config, document, &output).await;
        match &outcome {
            DocumentOutcome::Summarised { tokens } => {
                state.total_tokens += tokens;
                succeeded += 1;
            }
            DocumentOutcome::Failed { message } => {
                error!(file = %document.stem, %message, "Failed to summarise document");
                failed += 1;
            }
            DocumentOutcome::Skipped => unreachable!("skip decided before processing"),
        }
        state.record_attempt(config);
        reports.push(DocumentReport {
            stem: document.stem.clone(),
            outcome,
        });
    }

    // Final summary line, emitted even when the report interval was never hit.
    info!(
        documents = state.attempted,
        total_tokens = state.total_tokens,
        succeeded,
        failed,
        skipped,
        "Summarise pipeline complete"
    );

    Ok(SummariseReport {
        attempted: state.attempted,
        succeeded,
        failed,
        skipped,
        total_tokens: state.total_tokens,
        documents: reports,
    })
}

async fn process_document<C>(
    api: &C,
    config: &PipelineConfig,
    document: &SourceDocument,
    output: &Path,
) -> DocumentOutcome
where
    C: CompletionApi + ?Sized,
{
    let content = match fs::read_to_string(&document.path) {
        Ok(content) => content,
        Err(e) => {
            return DocumentOutcome::Failed {
                message: format!("Failed to read source document: {e}"),
            }
        }
    };

    match request_summary(api, config, &content).await {
        Ok(AttemptOutcome::Summarised { summary, tokens }) => {
            match write_summary(&config.output_dir, output, &summary) {
                Ok(()) => {
                    debug!(stem = %document.stem, tokens, "Summary written");
                    DocumentOutcome::Summarised { tokens }
                }
                Err(e) => DocumentOutcome::Failed {
                    message: format!("Failed to write summary: {e}"),
                },
            }
        }
        Ok(AttemptOutcome::Rejected { status, message }) => DocumentOutcome::Failed {
            message: format!("{status} - {message}"),
        },
        Err(e) => DocumentOutcome::Failed {
            message: format!("Transport error: {e}"),
        },
    }
}
