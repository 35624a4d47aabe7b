//! Loads and adapts a static YAML config, including environment secret
//! injection, into the strongly-typed pipeline configs.
//!
//! This module is the only place where untrusted YAML is parsed and mapped to
//! rich internal structs. The API credential is never read from the file: it
//! is injected from `OPENAI_API_KEY` so the YAML can be committed alongside
//! the corpus. A missing credential is a fatal configuration error raised
//! here, before any document is touched.
//!
//! All errors use `anyhow::Error` for context-rich diagnostics surfaced at
//! the CLI boundary.

use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

use crate::config::{
    AnnotateConfig, PipelineConfig, DEFAULT_API_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MODEL,
    DEFAULT_REPORT_INTERVAL, DEFAULT_REQUEST_TIMEOUT_SECS,
};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Deserialize)]
struct RawConfig {
    summarise: Option<SummariseSection>,
    annotate: Option<AnnotateSection>,
}

#[derive(Debug, Deserialize)]
struct SummariseSection {
    input_dir: PathBuf,
    output_dir: PathBuf,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    report_interval: Option<usize>,
    #[serde(default)]
    max_documents: Option<usize>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct AnnotateSection {
    summary_dir: PathBuf,
    doc_url_prefix: String,
}

fn read_raw<P: AsRef<Path>>(path: P) -> Result<RawConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    match serde_yaml::from_str(&config_content) {
        Ok(raw) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(raw)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Loads the `summarise` section and injects the API credential from the
/// environment. Errors if the section or the credential is missing.
pub fn load_summarise_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let raw = read_raw(path)?;
    let section = raw
        .summarise
        .ok_or_else(|| anyhow::anyhow!("Config is missing the 'summarise' section"))?;

    let api_key = match env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => key,
        _ => {
            error!(env_var = API_KEY_ENV, "API credential not set");
            return Err(anyhow::anyhow!(
                "{API_KEY_ENV} must be set in the environment to call the completion API"
            ));
        }
    };

    let config = PipelineConfig {
        input_dir: section.input_dir,
        output_dir: section.output_dir,
        model: section.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        api_url: section.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        api_key,
        report_interval: section.report_interval.unwrap_or(DEFAULT_REPORT_INTERVAL),
        max_documents: section.max_documents,
        request_timeout: Duration::from_secs(
            section
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        ),
        connect_timeout: Duration::from_secs(
            section
                .connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        ),
    };
    config.trace_loaded();
    Ok(config)
}

/// Loads the `annotate` section. No credential required: annotation is pure
/// local text processing.
pub fn load_annotate_config<P: AsRef<Path>>(path: P) -> Result<AnnotateConfig> {
    let raw = read_raw(path)?;
    let section = raw
        .annotate
        .ok_or_else(|| anyhow::anyhow!("Config is missing the 'annotate' section"))?;

    let config = AnnotateConfig {
        summary_dir: section.summary_dir,
        doc_url_prefix: section.doc_url_prefix,
    };
    config.trace_loaded();
    Ok(config)
}
