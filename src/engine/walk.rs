//! Tree walk: query captures -> emitter callbacks
//!
//! Captures become nested scopes, gaps between them become text runs, and
//! injected regions are handed to a nested pass. Every byte of the input is
//! emitted exactly once, in order.

use std::cmp::Reverse;

use anyhow::Context;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, QueryCursor, Tree};

use super::{Emitter, EmitterFactory, Grammar, Highlighter, RegisteredLanguage};

const CONTENT_CAPTURE: &str = "injection.content";
const LANGUAGE_CAPTURE: &str = "injection.language";
const LANGUAGE_PROPERTY: &str = "injection.language";

/// A highlight capture reduced to what the walk needs
struct Capture<'q> {
    start: usize,
    end: usize,
    pattern: usize,
    name: &'q str,
}

/// A region parsed by another registered language
struct Injection<'l> {
    start: usize,
    end: usize,
    language: &'l RegisteredLanguage,
}

/// Emission state for one nesting level
struct Cursor<'c> {
    code: &'c str,
    /// Bytes before this offset have been emitted
    offset: usize,
    /// End offsets of the open scopes, innermost last
    open: Vec<usize>,
}

impl<'c> Cursor<'c> {
    fn new(code: &'c str) -> Self {
        Self {
            code,
            offset: 0,
            open: Vec::new(),
        }
    }

    /// Close every scope ending at or before `target`, then emit text up to it
    fn advance_to(&mut self, target: usize, emitter: &mut dyn Emitter) {
        while let Some(&end) = self.open.last() {
            if end > target {
                break;
            }
            self.emit_until(end, emitter);
            emitter.close_node();
            self.open.pop();
        }
        self.emit_until(target, emitter);
    }

    fn emit_until(&mut self, target: usize, emitter: &mut dyn Emitter) {
        if target <= self.offset {
            return;
        }
        if let Some(text) = self.code.get(self.offset..target) {
            emitter.add_text(text);
        }
        self.offset = target;
    }

    fn finish(&mut self, emitter: &mut dyn Emitter) {
        self.advance_to(self.code.len(), emitter);
        while self.open.pop().is_some() {
            emitter.end_scope();
        }
    }
}

impl Highlighter {
    /// Drive `emitter` over `code`, recursing into injected languages.
    pub(super) fn emit_tokens<'a>(
        &self,
        language: &RegisteredLanguage,
        code: &str,
        tree: Option<&Tree>,
        emitter: &mut dyn Emitter,
        factory: &mut dyn EmitterFactory<'a>,
    ) -> anyhow::Result<()> {
        let (Some(grammar), Some(tree)) = (language.grammar.as_ref(), tree) else {
            if !code.is_empty() {
                emitter.add_text(code);
            }
            return Ok(());
        };

        let root = tree.root_node();
        let injections = self.collect_injections(grammar, root, code);
        let captures = collect_captures(grammar, root, code, &injections);

        let mut cursor = Cursor::new(code);
        let mut pending = injections.iter().peekable();

        for capture in &captures {
            while let Some(injection) = pending.next_if(|i| i.start < capture.start) {
                self.inject(injection, &mut cursor, emitter, factory)?;
            }

            cursor.advance_to(capture.start, emitter);
            if capture.start < cursor.offset {
                // Inside an injected region that was already emitted
                continue;
            }
            if cursor.open.last().is_some_and(|&end| capture.end > end) {
                // Crosses the end of the enclosing scope
                continue;
            }

            emitter.open_node(capture.name);
            cursor.open.push(capture.end);
        }

        for injection in pending {
            self.inject(injection, &mut cursor, emitter, factory)?;
        }
        cursor.finish(emitter);
        Ok(())
    }

    /// Run a nested pass over `injection` and hand it to `emitter`
    fn inject<'a>(
        &self,
        injection: &Injection<'_>,
        cursor: &mut Cursor<'_>,
        emitter: &mut dyn Emitter,
        factory: &mut dyn EmitterFactory<'a>,
    ) -> anyhow::Result<()> {
        cursor.advance_to(injection.start, emitter);

        let language = injection.language;
        let content = cursor
            .code
            .get(injection.start..injection.end)
            .with_context(|| {
                format!(
                    "injected {} region {}..{} is not on a character boundary",
                    language.name(),
                    injection.start,
                    injection.end
                )
            })?;

        let tree = self.parse(language, content)?;
        let mut child = factory.create_emitter()?;
        self.emit_tokens(language, content, tree.as_ref(), child.as_mut(), factory)
            .with_context(|| format!("nested {} pass failed", language.name()))?;
        child.finalize();

        tracing::trace!(
            "Nested {} pass over {}..{} complete",
            language.name(),
            injection.start,
            injection.end
        );
        emitter.add_sublanguage(child.as_mut(), language.name())?;

        cursor.offset = injection.end;
        Ok(())
    }

    /// Injected regions whose language is registered, in order, non-overlapping
    fn collect_injections<'l>(
        &'l self,
        grammar: &Grammar,
        root: Node<'_>,
        code: &str,
    ) -> Vec<Injection<'l>> {
        let Some(query) = grammar.injections.as_ref() else {
            return Vec::new();
        };
        let content_index = query.capture_index_for_name(CONTENT_CAPTURE);
        let language_index = query.capture_index_for_name(LANGUAGE_CAPTURE);

        let mut injections = Vec::new();
        let mut query_cursor = QueryCursor::new();
        let mut matches = query_cursor.matches(query, root, code.as_bytes());

        while let Some(query_match) = matches.next() {
            let mut language_name = query
                .property_settings(query_match.pattern_index)
                .iter()
                .find(|property| &*property.key == LANGUAGE_PROPERTY)
                .and_then(|property| property.value.as_deref());
            let mut content = None;

            for capture in query_match.captures {
                if Some(capture.index) == content_index {
                    content = Some(capture.node);
                } else if Some(capture.index) == language_index {
                    language_name = capture.node.utf8_text(code.as_bytes()).ok();
                }
            }

            let (Some(node), Some(language_name)) = (content, language_name) else {
                continue;
            };
            let Some(language) = self.get_language(language_name) else {
                tracing::trace!("Skipping injection of unregistered {}", language_name);
                continue;
            };
            if node.start_byte() < node.end_byte() {
                injections.push(Injection {
                    start: node.start_byte(),
                    end: node.end_byte(),
                    language,
                });
            }
        }

        injections.sort_by_key(|injection| (injection.start, Reverse(injection.end)));
        let mut kept: Vec<Injection<'l>> = Vec::with_capacity(injections.len());
        for injection in injections {
            if kept.last().map_or(true, |last| injection.start >= last.end) {
                kept.push(injection);
            }
        }
        kept
    }
}

/// Highlight captures sorted outermost-first, one per range.
///
/// Captures that cut through an injected region are dropped; captures
/// enclosing one are kept.
fn collect_captures<'q>(
    grammar: &'q Grammar,
    root: Node<'_>,
    code: &str,
    injections: &[Injection<'_>],
) -> Vec<Capture<'q>> {
    let query = &grammar.highlights;
    let names = query.capture_names();

    let mut captures = Vec::new();
    let mut query_cursor = QueryCursor::new();
    let mut matches = query_cursor.captures(query, root, code.as_bytes());

    while let Some((query_match, capture_idx)) = matches.next() {
        let capture = &query_match.captures[*capture_idx];
        let name = names[capture.index as usize];
        if name.starts_with('_') {
            continue;
        }

        let start = capture.node.start_byte();
        let end = capture.node.end_byte();
        if start >= end {
            continue;
        }

        let cuts_injection = injections.iter().any(|injection| {
            let overlaps = start < injection.end && injection.start < end;
            let encloses = start <= injection.start && injection.end <= end;
            overlaps && !encloses
        });
        if cuts_injection {
            continue;
        }

        captures.push(Capture {
            start,
            end,
            pattern: query_match.pattern_index,
            name,
        });
    }

    // Earliest pattern wins for identical ranges
    captures.sort_by_key(|capture| (capture.start, Reverse(capture.end), capture.pattern));
    captures.dedup_by(|later, earlier| later.start == earlier.start && later.end == earlier.end);
    captures
}

/// Byte offset of the first syntax error in `tree`, if any
pub(super) fn first_error_offset(tree: &Tree) -> Option<usize> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }
    Some(first_error(root).start_byte())
}

fn first_error(node: Node<'_>) -> Node<'_> {
    if node.is_error() || node.is_missing() {
        return node;
    }
    let mut walker = node.walk();
    for child in node.children(&mut walker) {
        if child.has_error() || child.is_missing() {
            return first_error(child);
        }
    }
    node
}
