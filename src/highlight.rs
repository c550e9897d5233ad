//! Streaming highlight driver
//!
//! Wires the engine to a consumer: validates the language, creates a fresh
//! [`StreamingSession`] per call so the first emitter the engine creates
//! streams straight to the consumer, and turns engine outcomes into
//! [`HighlightError`]s.
//!
//! ```text
//! highlight(code, "html", consumer)
//!   → Highlighter::highlight(code, options, session)
//!       → root StreamingEmitterAdapter ──live──→ consumer
//!       → nested adapters (script/style) ──buffer──→ replayed by root
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::config::HighlightConfig;
use crate::engine::{EngineError, HighlightOptions, Highlighter, LanguageDefinition, PLAINTEXT};
use crate::stream::{AdapterError, StreamingEmitter, StreamingSession};
use crate::syntax;

/// Why a highlight call failed.
///
/// Events already delivered before a failure stay delivered.
#[derive(Debug)]
pub enum HighlightError {
    /// Requested language is not registered; nothing was delivered
    UnknownLanguage(String),
    /// Syntax error with illegals not ignored; nothing was delivered
    Illegal { language: String, offset: usize },
    /// Adapter misconfiguration detected before the pass started
    Adapter(AdapterError),
    /// The engine raised an error part way through the pass
    Raised {
        language: String,
        source: anyhow::Error,
    },
    /// Grammar loading or parsing failed
    Engine(EngineError),
}

impl HighlightError {
    /// The adapter error behind this failure, if there is one
    pub fn adapter_error(&self) -> Option<&AdapterError> {
        match self {
            HighlightError::Adapter(err) => Some(err),
            HighlightError::Raised { source, .. } => source
                .chain()
                .find_map(|cause| cause.downcast_ref::<AdapterError>()),
            _ => None,
        }
    }
}

impl fmt::Display for HighlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightError::UnknownLanguage(name) => write!(f, "Unknown language: {:?}", name),
            HighlightError::Illegal { language, offset } => {
                write!(f, "Illegal {} syntax at byte {}", language, offset)
            }
            HighlightError::Adapter(err) => write!(f, "Emitter setup failed: {}", err),
            HighlightError::Raised { language, .. } => {
                write!(f, "Exception during {} highlighting", language)
            }
            HighlightError::Engine(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for HighlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HighlightError::Adapter(err) => Some(err),
            HighlightError::Raised { source, .. } => Some(source.as_ref()),
            HighlightError::Engine(err) => Some(err),
            HighlightError::UnknownLanguage(_) | HighlightError::Illegal { .. } => None,
        }
    }
}

impl From<EngineError> for HighlightError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownLanguage(name) => HighlightError::UnknownLanguage(name),
            EngineError::Emitter(err) => match err.downcast::<AdapterError>() {
                Ok(adapter) => HighlightError::Adapter(adapter),
                Err(err) => HighlightError::Engine(EngineError::Emitter(err)),
            },
            other => HighlightError::Engine(other),
        }
    }
}

/// An engine instance with the bundled grammars, streaming to consumers
pub struct StreamingHighlighter {
    engine: Highlighter,
    default_language: String,
    ignore_illegals: bool,
}

impl StreamingHighlighter {
    /// Engine with the bundled grammars and default settings
    pub fn new() -> Result<Self, HighlightError> {
        let mut engine = Highlighter::new();
        for definition in syntax::builtin_definitions() {
            engine.register_language(definition)?;
        }

        Ok(Self {
            engine,
            default_language: PLAINTEXT.to_string(),
            ignore_illegals: true,
        })
    }

    /// Engine configured from user settings
    pub fn from_config(config: &HighlightConfig) -> Result<Self, HighlightError> {
        let mut highlighter = Self::new()?;
        highlighter.default_language = config.default_language.clone();
        highlighter.ignore_illegals = config.ignore_illegals;
        highlighter.register_aliases(&config.aliases);
        Ok(highlighter)
    }

    /// Register an additional language
    pub fn register_language(&mut self, definition: LanguageDefinition) -> Result<(), HighlightError> {
        self.engine.register_language(definition)?;
        Ok(())
    }

    /// Add alias -> language mappings; aliases to unknown languages are skipped
    pub fn register_aliases(&mut self, aliases: &BTreeMap<String, String>) {
        for (alias, language) in aliases {
            if self.engine.get_language(language).is_none() {
                tracing::warn!(
                    "Ignoring alias {:?} for unknown language {:?}",
                    alias,
                    language
                );
                continue;
            }
            self.engine.register_aliases(&[alias.as_str()], language);
        }
    }

    pub fn set_ignore_illegals(&mut self, ignore: bool) {
        self.ignore_illegals = ignore;
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Canonical names of the registered languages
    pub fn languages(&self) -> Vec<&str> {
        self.engine.languages()
    }

    pub fn engine(&self) -> &Highlighter {
        &self.engine
    }

    /// Highlight `code`, delivering events to `consumer` as they are found.
    ///
    /// `None` highlights with the default language.
    pub fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
        consumer: &mut dyn StreamingEmitter,
    ) -> Result<(), HighlightError> {
        let requested = language.unwrap_or(&self.default_language);
        let Some(registered) = self.engine.get_language(requested) else {
            return Err(HighlightError::UnknownLanguage(requested.to_string()));
        };

        let options =
            HighlightOptions::new(registered.name()).ignore_illegals(self.ignore_illegals);
        let mut session = StreamingSession::new(consumer);
        let result = self.engine.highlight(code, &options, &mut session)?;

        tracing::debug!(
            "Streamed {} bytes as {} through {} emitters",
            code.len(),
            result.language,
            session.sequence_number()
        );

        if result.illegal {
            return Err(HighlightError::Illegal {
                language: result.language,
                offset: result.illegal_at.unwrap_or_default(),
            });
        }
        if let Some(source) = result.error_raised {
            return Err(HighlightError::Raised {
                language: result.language,
                source,
            });
        }
        Ok(())
    }
}

/// Highlight `code` with a fresh engine instance.
///
/// `language` defaults to plain text.
pub fn highlight(
    code: &str,
    language: Option<&str>,
    consumer: &mut dyn StreamingEmitter,
) -> Result<(), HighlightError> {
    StreamingHighlighter::new()?.highlight(code, language, consumer)
}
