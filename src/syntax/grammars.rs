//! Grammar bundles for the bundled languages
//!
//! Highlight queries come from the grammar crates. Injection queries are
//! kept here so only registered languages are ever injected.

use super::languages::LanguageId;
use crate::engine::LanguageDefinition;

/// `<script>` content as JavaScript, `<style>` content as CSS
pub const HTML_INJECTIONS: &str = r#"
((script_element
  (raw_text) @injection.content)
 (#set! injection.language "javascript"))

((style_element
  (raw_text) @injection.content)
 (#set! injection.language "css"))
"#;

/// css`...` tagged templates as CSS.
///
/// Only the literal fragments are injected; the backticks and any `${...}`
/// substitutions stay JavaScript.
pub const JAVASCRIPT_INJECTIONS: &str = r#"
((call_expression
   function: (identifier) @_tag
   arguments: (template_string
     (string_fragment) @injection.content))
 (#eq? @_tag "css")
 (#set! injection.language "css"))
"#;

impl LanguageId {
    /// Engine registration for this language; plain text is built into the engine
    pub fn definition(&self) -> Option<LanguageDefinition> {
        let definition = match self {
            LanguageId::PlainText => return None,
            LanguageId::Html => LanguageDefinition::new(
                self.name(),
                tree_sitter_html::LANGUAGE.into(),
                tree_sitter_html::HIGHLIGHTS_QUERY,
            )
            .with_aliases(&["htm", "xhtml", "xml"])
            .with_injections(HTML_INJECTIONS),
            LanguageId::JavaScript => LanguageDefinition::new(
                self.name(),
                tree_sitter_javascript::LANGUAGE.into(),
                tree_sitter_javascript::HIGHLIGHT_QUERY,
            )
            .with_aliases(&["js", "mjs", "cjs", "jsx"])
            .with_injections(JAVASCRIPT_INJECTIONS),
            LanguageId::Css => LanguageDefinition::new(
                self.name(),
                tree_sitter_css::LANGUAGE.into(),
                tree_sitter_css::HIGHLIGHTS_QUERY,
            ),
        };
        Some(definition)
    }
}

/// Definitions for every bundled language with a grammar
pub fn builtin_definitions() -> Vec<LanguageDefinition> {
    LanguageId::ALL
        .iter()
        .filter_map(LanguageId::definition)
        .collect()
}
