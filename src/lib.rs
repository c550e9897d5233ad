//! hlstream - streaming syntax highlighting
//!
//! Adapts a tree-sitter highlighting engine's emitter callbacks into a live,
//! strictly ordered stream of scope, text, and sub-language events.

pub mod config;
pub mod config_paths;
pub mod engine;
pub mod highlight;
pub mod stream;
pub mod syntax;
pub mod tracing;

// Re-export commonly used types
pub use config::HighlightConfig;
pub use highlight::{highlight, HighlightError, StreamingHighlighter};
pub use stream::{Operation, OperationLog, StreamingEmitter};
pub use syntax::LanguageId;
