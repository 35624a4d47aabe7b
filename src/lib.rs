pub mod annotate;
pub mod completion;
pub mod config;
pub mod load_config;
pub mod prompts;
pub mod scan;
pub mod summarise;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use completion::OpenAiClient;
use load_config::{load_annotate_config, load_summarise_config};
use summarise::summarise;

#[derive(Parser)]
#[clap(
    name = "rag-summarise",
    version,
    about = "Summarise a documentation-macro corpus into RAG-ready snippets and annotate them with documentation links"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarise every unprocessed corpus document via the completion API
    Summarise {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// Append canonical documentation links to written summaries
    Annotate {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Summarise { config } => {
            let config = load_summarise_config(config)?;
            let client = OpenAiClient::new(&config)
                .map_err(|e| anyhow::anyhow!("Failed to construct completion client: {e}"))?;
            println!("Summarise starting...");
            match summarise(&config, &client).await {
                Ok(report) => {
                    println!("Summarise complete.");
                    println!(
                        "Processed {} documents ({} summarised, {} failed, {} skipped).",
                        report.attempted, report.succeeded, report.failed, report.skipped
                    );
                    println!("Total tokens used: {}", report.total_tokens);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Summarise failed: {}", e);
                    Err(anyhow::Error::msg(e))
                }
            }
        }
        Commands::Annotate { config } => {
            let config = load_annotate_config(config)?;
            match annotate::annotate(&config) {
                Ok(report) => {
                    println!(
                        "Annotated {} summaries ({} skipped).",
                        report.annotated, report.skipped
                    );
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Annotate failed: {}", e);
                    Err(anyhow::Error::msg(e))
                }
            }
        }
    }
}
