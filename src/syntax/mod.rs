//! Language grammars
//!
//! Grammar bundles for the languages the streaming highlighter registers by
//! default, plus file-extension detection:
//!
//! - HTML, with `<script>` and `<style>` content injected as JavaScript and CSS
//! - JavaScript, with css`...` tagged templates injected as CSS
//! - CSS

mod grammars;
mod languages;

pub use grammars::{builtin_definitions, HTML_INJECTIONS, JAVASCRIPT_INJECTIONS};
pub use languages::LanguageId;
