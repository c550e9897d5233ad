//! Emitter adapter: engine callbacks in, streaming events out
//!
//! The engine creates one emitter per nesting level of a highlight call and
//! only hands a nested level's result back to its parent once the nested
//! parse completes. The adapter turns that into a live stream:
//!
//! - The first adapter created in a [`StreamingSession`] is the root. It owns
//!   the consumer and forwards every callback immediately.
//! - Every later adapter buffers its callbacks in an [`OperationLog`].
//! - When a nested parse completes, the parent either replays the child's log
//!   into the consumer (root) or absorbs it, bracketed by sub-language
//!   markers, into its own log (buffering).

use std::fmt;

use super::{Operation, OperationLog, Replayable, StreamingEmitter};
use crate::engine::{Emitter, EmitterFactory};

/// Errors raised by the adapter while the engine drives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The root adapter was created from a session without a consumer
    MissingConsumer,
    /// A completed nested parse was not recorded by a streaming adapter
    EmitterMismatch { sublanguage: String },
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::MissingConsumer => {
                write!(f, "no streaming consumer configured for this session")
            }
            AdapterError::EmitterMismatch { sublanguage } => write!(
                f,
                "nested parse of {:?} was not recorded by a streaming adapter",
                sublanguage
            ),
        }
    }
}

impl std::error::Error for AdapterError {}

/// Per-call state shared by every adapter the engine creates.
///
/// Create one for each top-level highlight call and pass it to the engine as
/// the emitter factory. Never reuse a session across calls.
#[derive(Default)]
pub struct StreamingSession<'a> {
    sequence_number: u32,
    consumer: Option<&'a mut dyn StreamingEmitter>,
}

impl<'a> StreamingSession<'a> {
    pub fn new(consumer: &'a mut dyn StreamingEmitter) -> Self {
        Self {
            sequence_number: 0,
            consumer: Some(consumer),
        }
    }

    /// Number of adapters created so far in this session
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }
}

impl<'a> EmitterFactory<'a> for StreamingSession<'a> {
    fn create_emitter(&mut self) -> anyhow::Result<Box<dyn Emitter + 'a>> {
        let adapter = StreamingEmitterAdapter::new(self)?;
        Ok(Box::new(adapter))
    }
}

/// Where an adapter's events go
enum Sink<'a> {
    /// Root: straight to the consumer
    Live(&'a mut dyn StreamingEmitter),
    /// Nested: recorded for an ancestor to replay
    Buffered(OperationLog),
}

/// Engine-facing emitter that streams to a [`StreamingEmitter`].
pub struct StreamingEmitterAdapter<'a> {
    sink: Sink<'a>,
}

impl<'a> StreamingEmitterAdapter<'a> {
    /// Register a new adapter with `session`.
    ///
    /// The first adapter of a session becomes the root and takes the
    /// session's consumer; it fails if there is none.
    pub fn new(session: &mut StreamingSession<'a>) -> Result<Self, AdapterError> {
        session.sequence_number += 1;
        let sink = if session.sequence_number == 1 {
            let consumer = session
                .consumer
                .take()
                .ok_or(AdapterError::MissingConsumer)?;
            Sink::Live(consumer)
        } else {
            Sink::Buffered(OperationLog::new())
        };

        tracing::trace!(
            sequence = session.sequence_number,
            root = matches!(sink, Sink::Live(_)),
            "created streaming emitter"
        );
        Ok(Self { sink })
    }

    pub fn is_root(&self) -> bool {
        matches!(self.sink, Sink::Live(_))
    }

    fn sink(&mut self) -> &mut dyn StreamingEmitter {
        match &mut self.sink {
            Sink::Live(consumer) => &mut **consumer,
            Sink::Buffered(log) => log,
        }
    }
}

impl Emitter for StreamingEmitterAdapter<'_> {
    fn start_scope(&mut self, name: &str) {
        self.sink().begin_scope(name);
    }

    fn end_scope(&mut self) {
        self.sink().end_scope();
    }

    fn add_text(&mut self, text: &str) {
        self.sink().emit_text(text);
    }

    fn add_sublanguage(&mut self, child: &mut dyn Emitter, name: &str) -> anyhow::Result<()> {
        let child = child
            .as_replayable()
            .ok_or_else(|| AdapterError::EmitterMismatch {
                sublanguage: name.to_owned(),
            })?;

        match &mut self.sink {
            Sink::Live(consumer) => {
                tracing::trace!(
                    sublanguage = name,
                    operations = child.operations().len(),
                    "replaying nested parse"
                );
                consumer.begin_sublanguage(name);
                super::replay(child.operations(), &mut **consumer);
                consumer.end_sublanguage();
            }
            Sink::Buffered(log) => {
                log.push(Operation::BeginSublanguage {
                    name: name.to_owned(),
                });
                log.extend(child.take_operations());
                log.push(Operation::EndSublanguage);
            }
        }
        Ok(())
    }

    fn finalize(&mut self) {}

    fn to_html(&self) -> String {
        String::new()
    }

    fn as_replayable(&mut self) -> Option<&mut dyn Replayable> {
        match &mut self.sink {
            Sink::Live(_) => None,
            Sink::Buffered(log) => Some(log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tracing_emitter::TracingEmitter;

    fn begin(name: &str) -> Operation {
        Operation::BeginScope {
            name: name.to_string(),
        }
    }

    fn text(text: &str) -> Operation {
        Operation::EmitText {
            text: text.to_string(),
        }
    }

    fn sub(name: &str) -> Operation {
        Operation::BeginSublanguage {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_first_adapter_is_root() {
        let mut consumer = OperationLog::new();
        let mut session = StreamingSession::new(&mut consumer);

        let root = StreamingEmitterAdapter::new(&mut session).unwrap();
        let nested = StreamingEmitterAdapter::new(&mut session).unwrap();

        assert!(root.is_root());
        assert!(!nested.is_root());
        assert_eq!(session.sequence_number(), 2);
    }

    #[test]
    fn test_root_without_consumer_fails() {
        let mut session = StreamingSession::default();
        let result = StreamingEmitterAdapter::new(&mut session);

        assert_eq!(result.err(), Some(AdapterError::MissingConsumer));
    }

    #[test]
    fn test_later_adapters_do_not_need_consumer() {
        let mut session = StreamingSession::default();
        assert!(StreamingEmitterAdapter::new(&mut session).is_err());

        let nested = StreamingEmitterAdapter::new(&mut session).unwrap();
        assert!(!nested.is_root());
    }

    #[test]
    fn test_root_forwards_immediately() {
        let mut consumer = OperationLog::new();
        {
            let mut session = StreamingSession::new(&mut consumer);
            let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
            root.start_scope("keyword");
            root.add_text("let");
            root.end_scope();
        }

        assert_eq!(
            consumer.operations(),
            &[begin("keyword"), text("let"), Operation::EndScope]
        );
    }

    #[test]
    fn test_node_synonyms_match_scope_methods() {
        let mut via_scope = OperationLog::new();
        let mut via_node = OperationLog::new();
        {
            let mut session = StreamingSession::new(&mut via_scope);
            let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
            root.start_scope("string");
            root.add_text("'a'");
            root.end_scope();
        }
        {
            let mut session = StreamingSession::new(&mut via_node);
            let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
            root.open_node("string");
            root.add_text("'a'");
            root.close_node();
        }

        assert_eq!(via_scope, via_node);
    }

    #[test]
    fn test_buffering_adapter_records_instead_of_forwarding() {
        let mut consumer = OperationLog::new();
        let mut session = StreamingSession::new(&mut consumer);
        let _root = StreamingEmitterAdapter::new(&mut session).unwrap();
        let mut nested = StreamingEmitterAdapter::new(&mut session).unwrap();

        nested.start_scope("number");
        nested.add_text("42");
        nested.close_node();

        let log = nested.as_replayable().unwrap();
        assert_eq!(
            log.operations(),
            &[begin("number"), text("42"), Operation::EndScope]
        );
    }

    #[test]
    fn test_root_brackets_replayed_sublanguage() {
        let mut consumer = OperationLog::new();
        {
            let mut session = StreamingSession::new(&mut consumer);
            let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
            let mut child = StreamingEmitterAdapter::new(&mut session).unwrap();

            root.add_text("<script>");
            child.start_scope("keyword");
            child.add_text("var");
            child.end_scope();
            root.add_sublanguage(&mut child, "javascript").unwrap();
            root.add_text("</script>");
        }

        assert_eq!(
            consumer.operations(),
            &[
                text("<script>"),
                sub("javascript"),
                begin("keyword"),
                text("var"),
                Operation::EndScope,
                Operation::EndSublanguage,
                text("</script>"),
            ]
        );
    }

    #[test]
    fn test_buffering_parent_absorbs_child_then_root_replays() {
        let mut consumer = OperationLog::new();
        {
            let mut session = StreamingSession::new(&mut consumer);
            let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
            let mut middle = StreamingEmitterAdapter::new(&mut session).unwrap();
            let mut inner = StreamingEmitterAdapter::new(&mut session).unwrap();

            middle.add_text("css`");
            inner.start_scope("property");
            inner.add_text("color");
            inner.end_scope();
            middle.add_sublanguage(&mut inner, "css").unwrap();
            middle.add_text("`");

            assert!(inner.as_replayable().unwrap().operations().is_empty());

            root.add_sublanguage(&mut middle, "javascript").unwrap();
        }

        assert_eq!(
            consumer.operations(),
            &[
                sub("javascript"),
                text("css`"),
                sub("css"),
                begin("property"),
                text("color"),
                Operation::EndScope,
                Operation::EndSublanguage,
                text("`"),
                Operation::EndSublanguage,
            ]
        );
    }

    #[test]
    fn test_foreign_child_is_rejected() {
        let mut consumer = OperationLog::new();
        let mut session = StreamingSession::new(&mut consumer);
        let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
        let mut foreign = TracingEmitter::new(1);

        let err = root.add_sublanguage(&mut foreign, "css").unwrap_err();
        assert_eq!(
            err.downcast_ref::<AdapterError>(),
            Some(&AdapterError::EmitterMismatch {
                sublanguage: "css".to_string()
            })
        );
    }

    #[test]
    fn test_render_hooks_are_neutral() {
        let mut consumer = OperationLog::new();
        {
            let mut session = StreamingSession::new(&mut consumer);
            let mut root = StreamingEmitterAdapter::new(&mut session).unwrap();
            root.finalize();
            assert_eq!(root.to_html(), "");
        }
        assert!(consumer.is_empty());
    }
}
