//! Highlighting engine
//!
//! A small tree-sitter based engine that reports its findings through the
//! emitter plug-in contract instead of building output itself:
//!
//! - Languages are registered per [`Highlighter`] instance, each with a
//!   grammar, a highlight query, and an optional injection query
//! - A highlight pass creates one emitter per nesting level through an
//!   [`EmitterFactory`]
//! - Injected regions (e.g. `<script>` content) are parsed by a nested pass
//!   and handed to the parent emitter via [`Emitter::add_sublanguage`]
//!
//! Failures raised by emitters during the walk are recorded on the
//! [`HighlightResult`] instead of being returned, the way a safe-mode engine
//! keeps going for its caller.

mod emitter;
pub mod tracing_emitter;
mod walk;

use std::collections::HashMap;
use std::fmt;

use tree_sitter::{Parser, Query, Tree};

pub use emitter::{Emitter, EmitterFactory};

/// Canonical name of the built-in language without a grammar
pub const PLAINTEXT: &str = "plaintext";

/// Errors returned by the engine itself
#[derive(Debug)]
pub enum EngineError {
    /// Requested language is not registered
    UnknownLanguage(String),
    /// Grammar or query could not be loaded
    Grammar { language: String, message: String },
    /// tree-sitter produced no tree
    ParseFailed { language: String },
    /// The root emitter could not be created
    Emitter(anyhow::Error),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownLanguage(name) => write!(f, "Unknown language: {:?}", name),
            EngineError::Grammar { language, message } => {
                write!(f, "Invalid grammar for {}: {}", language, message)
            }
            EngineError::ParseFailed { language } => write!(f, "Failed to parse {}", language),
            EngineError::Emitter(err) => write!(f, "Failed to create emitter: {}", err),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Emitter(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Everything needed to register a language with a [`Highlighter`]
#[derive(Clone)]
pub struct LanguageDefinition {
    pub name: String,
    pub aliases: Vec<String>,
    pub grammar: tree_sitter::Language,
    pub highlights_query: String,
    /// Marks `@injection.content` with an `injection.language`; may be empty
    pub injections_query: String,
}

impl LanguageDefinition {
    pub fn new(
        name: impl Into<String>,
        grammar: tree_sitter::Language,
        highlights_query: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            grammar,
            highlights_query: highlights_query.into(),
            injections_query: String::new(),
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases
            .extend(aliases.iter().map(|alias| alias.to_string()));
        self
    }

    pub fn with_injections(mut self, injections_query: impl Into<String>) -> Self {
        self.injections_query = injections_query.into();
        self
    }
}

/// Compiled grammar and queries
struct Grammar {
    language: tree_sitter::Language,
    highlights: Query,
    injections: Option<Query>,
}

/// A language known to a [`Highlighter`]
pub struct RegisteredLanguage {
    name: String,
    aliases: Vec<String>,
    grammar: Option<Grammar>,
}

impl RegisteredLanguage {
    /// Canonical name, as reported to `add_sublanguage`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether this language is parsed (plain text is not)
    pub fn has_grammar(&self) -> bool {
        self.grammar.is_some()
    }
}

/// Options for one highlight pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    pub language: String,
    /// Keep going over syntax errors instead of reporting the input illegal
    pub ignore_illegals: bool,
}

impl HighlightOptions {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ignore_illegals: false,
        }
    }

    pub fn ignore_illegals(mut self, ignore: bool) -> Self {
        self.ignore_illegals = ignore;
        self
    }
}

/// Outcome of a highlight pass
#[derive(Debug)]
pub struct HighlightResult {
    /// Canonical name of the language used
    pub language: String,
    /// The root emitter's `to_html()` output
    pub value: String,
    /// Input had a syntax error and illegals were not ignored
    pub illegal: bool,
    /// Byte offset of the first syntax error when `illegal` is set
    pub illegal_at: Option<usize>,
    /// Failure raised by an emitter or nested pass during the walk
    pub error_raised: Option<anyhow::Error>,
}

/// An engine instance with its own language registry
pub struct Highlighter {
    languages: HashMap<String, RegisteredLanguage>,
    /// alias -> canonical name
    aliases: HashMap<String, String>,
}

impl Highlighter {
    /// Create an instance that only knows plain text
    pub fn new() -> Self {
        let mut highlighter = Self {
            languages: HashMap::new(),
            aliases: HashMap::new(),
        };
        highlighter.languages.insert(
            PLAINTEXT.to_string(),
            RegisteredLanguage {
                name: PLAINTEXT.to_string(),
                aliases: vec!["text".to_string(), "txt".to_string()],
                grammar: None,
            },
        );
        highlighter.register_aliases(&["text", "txt"], PLAINTEXT);
        highlighter
    }

    /// Compile and register a language, replacing any previous one of the same name
    pub fn register_language(&mut self, definition: LanguageDefinition) -> Result<(), EngineError> {
        let name = definition.name.to_lowercase();
        let grammar_error = |message: String| EngineError::Grammar {
            language: name.clone(),
            message,
        };

        let highlights = Query::new(&definition.grammar, &definition.highlights_query)
            .map_err(|e| grammar_error(format!("highlight query: {}", e)))?;
        let injections = if definition.injections_query.trim().is_empty() {
            None
        } else {
            Some(
                Query::new(&definition.grammar, &definition.injections_query)
                    .map_err(|e| grammar_error(format!("injection query: {}", e)))?,
            )
        };

        let aliases: Vec<String> = definition
            .aliases
            .iter()
            .map(|alias| alias.to_lowercase())
            .collect();
        for alias in &aliases {
            self.aliases.insert(alias.clone(), name.clone());
        }

        tracing::debug!(
            "Registered language {} ({} highlight patterns)",
            name,
            highlights.pattern_count()
        );
        self.languages.insert(
            name.clone(),
            RegisteredLanguage {
                name,
                aliases,
                grammar: Some(Grammar {
                    language: definition.grammar,
                    highlights,
                    injections,
                }),
            },
        );
        Ok(())
    }

    /// Make each alias resolve to `language`
    pub fn register_aliases(&mut self, aliases: &[&str], language: &str) {
        let language = language.to_lowercase();
        for alias in aliases {
            self.aliases.insert(alias.to_lowercase(), language.clone());
        }
    }

    /// Resolve a name or alias (case-insensitive)
    pub fn get_language(&self, name: &str) -> Option<&RegisteredLanguage> {
        let name = name.to_lowercase();
        self.languages.get(&name).or_else(|| {
            self.aliases
                .get(&name)
                .and_then(|canonical| self.languages.get(canonical))
        })
    }

    /// Canonical names of all registered languages, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run a highlight pass over `code`, driving emitters created by `factory`.
    pub fn highlight<'a>(
        &self,
        code: &str,
        options: &HighlightOptions,
        factory: &mut dyn EmitterFactory<'a>,
    ) -> Result<HighlightResult, EngineError> {
        let language = self
            .get_language(&options.language)
            .ok_or_else(|| EngineError::UnknownLanguage(options.language.clone()))?;

        tracing::debug!(
            "Highlighting {} bytes as {}",
            code.len(),
            language.name()
        );

        let tree = self.parse(language, code)?;

        if !options.ignore_illegals {
            if let Some(offset) = tree.as_ref().and_then(walk::first_error_offset) {
                tracing::debug!("Illegal {} syntax at byte {}", language.name(), offset);
                return Ok(HighlightResult {
                    language: language.name().to_string(),
                    value: String::new(),
                    illegal: true,
                    illegal_at: Some(offset),
                    error_raised: None,
                });
            }
        }

        let mut emitter = factory.create_emitter().map_err(EngineError::Emitter)?;

        match self.emit_tokens(language, code, tree.as_ref(), emitter.as_mut(), factory) {
            Ok(()) => {
                emitter.finalize();
                Ok(HighlightResult {
                    language: language.name().to_string(),
                    value: emitter.to_html(),
                    illegal: false,
                    illegal_at: None,
                    error_raised: None,
                })
            }
            Err(err) => {
                tracing::warn!("Highlighting {} raised: {:#}", language.name(), err);
                Ok(HighlightResult {
                    language: language.name().to_string(),
                    value: String::new(),
                    illegal: false,
                    illegal_at: None,
                    error_raised: Some(err),
                })
            }
        }
    }

    /// Parse `code`; plain text has no tree
    fn parse(&self, language: &RegisteredLanguage, code: &str) -> Result<Option<Tree>, EngineError> {
        let Some(grammar) = language.grammar.as_ref() else {
            return Ok(None);
        };

        let mut parser = Parser::new();
        parser
            .set_language(&grammar.language)
            .map_err(|e| EngineError::Grammar {
                language: language.name().to_string(),
                message: e.to_string(),
            })?;

        parser
            .parse(code, None)
            .map(Some)
            .ok_or_else(|| EngineError::ParseFailed {
                language: language.name().to_string(),
            })
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}
