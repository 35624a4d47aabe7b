use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// File extension of source documents in the input corpus.
pub const SOURCE_EXTENSION: &str = "mc2";

/// File extension of written summaries.
pub const SUMMARY_EXTENSION: &str = "txt";

/// Structural marker delimiting the macro body inside a source document.
/// Oversized documents are truncated to everything before this marker on
/// retry.
pub const MACRO_BODY_MARKER: &str = "'macro' STORE";

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_REPORT_INTERVAL: usize = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fully resolved configuration for the summarise pipeline.
///
/// Built once by [`crate::load_config::load_summarise_config`] and passed by
/// reference into the pipeline driver; the credential is injected from the
/// environment, never from the YAML file.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub model: String,
    pub api_url: String,
    pub api_key: String,
    /// Emit a cumulative progress line after this many attempted documents.
    pub report_interval: usize,
    /// Stop after this many attempted documents; `None` processes the whole
    /// corpus. Checked between documents, never mid-request.
    pub max_documents: Option<usize>,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl PipelineConfig {
    pub fn trace_loaded(&self) {
        info!(
            input_dir = %self.input_dir.display(),
            output_dir = %self.output_dir.display(),
            model = %self.model,
            api_url = %self.api_url,
            report_interval = self.report_interval,
            max_documents = ?self.max_documents,
            "Loaded summarise pipeline config"
        );
        debug!(
            request_timeout_secs = self.request_timeout.as_secs(),
            connect_timeout_secs = self.connect_timeout.as_secs(),
            api_key_len = self.api_key.len(),
            "Pipeline config details"
        );
    }
}

/// Configuration for the link-annotation pass over written summaries.
#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    pub summary_dir: PathBuf,
    /// Prefix of the canonical documentation URL; the document stem and
    /// source extension are appended per file.
    pub doc_url_prefix: String,
}

impl AnnotateConfig {
    pub fn trace_loaded(&self) {
        info!(
            summary_dir = %self.summary_dir.display(),
            doc_url_prefix = %self.doc_url_prefix,
            "Loaded annotate config"
        );
    }
}
