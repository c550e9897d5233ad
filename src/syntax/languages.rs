//! Language identification and detection
//!
//! Maps file extensions to language IDs and provides language metadata.

use std::path::Path;

use crate::engine::PLAINTEXT;

/// Bundled language identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    Html,
    JavaScript,
    Css,
}

impl LanguageId {
    /// Every bundled language
    pub const ALL: [LanguageId; 4] = [
        LanguageId::PlainText,
        LanguageId::Html,
        LanguageId::JavaScript,
        LanguageId::Css,
    ];

    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "html" | "htm" | "xhtml" => LanguageId::Html,
            "js" | "mjs" | "cjs" | "jsx" => LanguageId::JavaScript,
            "css" => LanguageId::Css,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Canonical name registered with the engine
    pub fn name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => PLAINTEXT,
            LanguageId::Html => "html",
            LanguageId::JavaScript => "javascript",
            LanguageId::Css => "css",
        }
    }

    /// Get display name for the language
    pub fn display_name(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "Plain Text",
            LanguageId::Html => "HTML",
            LanguageId::JavaScript => "JavaScript",
            LanguageId::Css => "CSS",
        }
    }

    /// Check if this language has syntax highlighting support
    pub fn has_highlighting(&self) -> bool {
        !matches!(self, LanguageId::PlainText)
    }
}
