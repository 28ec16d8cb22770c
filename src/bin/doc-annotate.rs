//! doc-annotate CLI tool
//!
//! Command-line interface for running the annotation passes over a JSON document tree.
//!
//! ## Commands
//!
//! - `toc <file.json>`: Print the table of contents
//! - `xrefs <file.json>`: Print every cross-reference target
//! - `check <file.json>`: Report dangling references, exiting non-zero if any exist
//!
//! The input is the nested form `{"tag": ..., "attrs": {...}, "children": [...]}`, with text
//! leaves written as `{"text": "..."}`.

use clap::{Parser, Subcommand};
use doc_annotator::{config::AnnotatorConfig, state::AnnotationState, tree::Document};
use std::{fs::read_to_string, path::{Path, PathBuf}, process::ExitCode};

#[derive(Parser)]
#[command(name = "doc-annotate")]
#[command(author, version, about = "Compute ToC, numbering and cross-reference tables for a document tree", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the table of contents as JSON
    Toc {
        /// Path to the JSON document
        path: PathBuf,
    },

    /// Print all cross-reference targets as JSON
    Xrefs {
        /// Path to the JSON document
        path: PathBuf,
    },

    /// List references whose target does not exist
    Check {
        /// Path to the JSON document
        path: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

fn annotate(
    config: &AnnotatorConfig,
    path: &Path,
) -> Result<AnnotationState, Box<dyn std::error::Error>> {
    let content = read_to_string(path)?;
    let doc = Document::from_json(&content)?;
    let mut state = AnnotationState::with_config(config);
    state.set_root(doc)?;
    Ok(state)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => AnnotatorConfig::load(path)?,
        None => AnnotatorConfig::default(),
    };

    match cli.command {
        Commands::Toc { path } => {
            let state = annotate(&config, &path)?;
            let items: Vec<_> = state.toc().iter().collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Xrefs { path } => {
            let state = annotate(&config, &path)?;
            println!("{}", serde_json::to_string_pretty(&state.summary().targets)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Check { path, verbose } => {
            if verbose {
                println!("Checking: {:?}", path);
            }
            let state = annotate(&config, &path)?;
            let dangling = state.dangling_refs();
            for broken in dangling.iter() {
                println!("{}: unresolved reference '{}'", broken.node, broken.target);
            }
            if dangling.is_empty() {
                if verbose {
                    println!("All references resolved");
                }
                Ok(ExitCode::SUCCESS)
            } else {
                println!("\n{} unresolved reference(s)", dangling.len());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
