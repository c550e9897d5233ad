//! Command-line argument parsing
//!
//! Supports:
//! - Highlighting a file or stdin
//! - Explicit language or detection from the file extension
//! - Trace or JSON output of the event stream
//! - Logging the engine's raw emitter callbacks

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use hlstream::LanguageId;

/// Stream syntax highlighting events
#[derive(Parser, Debug)]
#[command(
    name = "hlstream",
    version,
    about = "Print the highlighting event stream for source code"
)]
pub struct CliArgs {
    /// File to highlight (reads stdin when omitted)
    #[arg(value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Language name or alias (detected from the file extension when omitted)
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Trace)]
    pub format: OutputFormat,

    /// Fail on syntax errors instead of highlighting through them
    #[arg(long)]
    pub strict: bool,

    /// Log the engine's emitter callbacks instead of streaming events
    #[arg(long)]
    pub trace_callbacks: bool,

    /// List registered languages and exit
    #[arg(long)]
    pub list_languages: bool,
}

/// How events are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per event, as it arrives
    Trace,
    /// JSON array of operations, after the pass completes
    Json,
}

impl CliArgs {
    /// The language to request; `None` means the configured default
    pub fn resolve_language(&self) -> Option<String> {
        if let Some(language) = &self.language {
            return Some(language.clone());
        }
        self.path
            .as_deref()
            .map(LanguageId::from_path)
            .filter(LanguageId::has_highlighting)
            .map(|id| id.name().to_string())
    }
}
