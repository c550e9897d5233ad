//! Streaming highlight events
//!
//! The consumer-facing vocabulary: a highlighting pass is delivered as a
//! strictly ordered stream of scope, text, and sub-language events.
//!
//! ## Event shape
//!
//! ```text
//! begin_scope("tag") emit_text("script") end_scope()
//! begin_sublanguage("javascript")
//!     begin_scope("keyword") emit_text("function") end_scope()
//!     emit_text(" add(x, y) ...")
//! end_sublanguage()
//! ```
//!
//! Scopes and sub-language brackets always nest. The concatenation of all
//! `emit_text` payloads is the highlighted source.

pub mod adapter;

use serde::Serialize;

pub use adapter::{AdapterError, StreamingEmitterAdapter, StreamingSession};

/// Receives highlight events as the engine discovers them.
///
/// Delivery is incremental and carries no atomicity guarantee: if a
/// highlight call fails part way, the consumer keeps whatever prefix of
/// events it already received.
pub trait StreamingEmitter {
    /// Open a scope; text up to the matching `end_scope` belongs to it.
    fn begin_scope(&mut self, name: &str);

    /// Close the innermost open scope.
    fn end_scope(&mut self);

    /// Source text styled by the currently open scopes.
    fn emit_text(&mut self, text: &str);

    /// Start of a run of events produced by a nested parse of `name`.
    fn begin_sublanguage(&mut self, name: &str);

    /// End of the innermost sub-language run.
    fn end_sublanguage(&mut self);
}

/// One recorded streaming event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    BeginScope { name: String },
    EndScope,
    EmitText { text: String },
    BeginSublanguage { name: String },
    EndSublanguage,
}

impl Operation {
    /// Deliver this operation to `sink`
    pub fn dispatch(&self, sink: &mut dyn StreamingEmitter) {
        match self {
            Operation::BeginScope { name } => sink.begin_scope(name),
            Operation::EndScope => sink.end_scope(),
            Operation::EmitText { text } => sink.emit_text(text),
            Operation::BeginSublanguage { name } => sink.begin_sublanguage(name),
            Operation::EndSublanguage => sink.end_sublanguage(),
        }
    }
}

/// Re-dispatch recorded operations, in order, against a live sink.
pub fn replay(operations: &[Operation], sink: &mut dyn StreamingEmitter) {
    for operation in operations {
        operation.dispatch(sink);
    }
}

/// Exposes an operation log that a parent emitter can replay or absorb.
pub trait Replayable {
    /// Operations recorded so far, in call order
    fn operations(&self) -> &[Operation];

    /// Move the recorded operations out, leaving the log empty
    fn take_operations(&mut self) -> Vec<Operation>;
}

/// Append-only record of streaming events.
///
/// Doubles as a consumer: handing an `OperationLog` to a highlight call
/// records every event it receives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OperationLog {
    operations: Vec<Operation>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn extend(&mut self, operations: impl IntoIterator<Item = Operation>) {
        self.operations.extend(operations);
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Replay every recorded operation into `sink`
    pub fn replay_into(&self, sink: &mut dyn StreamingEmitter) {
        replay(&self.operations, sink);
    }

    /// Concatenation of all emitted text
    pub fn text(&self) -> String {
        self.operations
            .iter()
            .filter_map(|op| match op {
                Operation::EmitText { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }
}

impl StreamingEmitter for OperationLog {
    fn begin_scope(&mut self, name: &str) {
        self.push(Operation::BeginScope {
            name: name.to_owned(),
        });
    }

    fn end_scope(&mut self) {
        self.push(Operation::EndScope);
    }

    fn emit_text(&mut self, text: &str) {
        self.push(Operation::EmitText {
            text: text.to_owned(),
        });
    }

    fn begin_sublanguage(&mut self, name: &str) {
        self.push(Operation::BeginSublanguage {
            name: name.to_owned(),
        });
    }

    fn end_sublanguage(&mut self) {
        self.push(Operation::EndSublanguage);
    }
}

impl Replayable for OperationLog {
    fn operations(&self) -> &[Operation] {
        &self.operations
    }

    fn take_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }
}

impl<'a> IntoIterator for &'a OperationLog {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

impl From<Vec<Operation>> for OperationLog {
    fn from(operations: Vec<Operation>) -> Self {
        Self { operations }
    }
}
