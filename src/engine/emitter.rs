//! Emitter plug-in contract
//!
//! The engine never builds output itself. It creates one emitter per nesting
//! level through an [`EmitterFactory`] and reports what it finds through the
//! [`Emitter`] callbacks.

use crate::stream::Replayable;

/// Callbacks the engine drives while walking a parse.
pub trait Emitter {
    fn start_scope(&mut self, name: &str);

    fn end_scope(&mut self);

    /// Older name for [`Emitter::start_scope`]
    fn open_node(&mut self, name: &str) {
        self.start_scope(name);
    }

    /// Older name for [`Emitter::end_scope`]
    fn close_node(&mut self) {
        self.end_scope();
    }

    fn add_text(&mut self, text: &str);

    /// Called on the parent once the nested parse held by `child` completes.
    fn add_sublanguage(&mut self, child: &mut dyn Emitter, name: &str) -> anyhow::Result<()>;

    /// Parse complete
    fn finalize(&mut self);

    /// Rendered output, stored on the highlight result
    fn to_html(&self) -> String;

    /// Access to a recorded operation log, for emitters that keep one.
    fn as_replayable(&mut self) -> Option<&mut dyn Replayable> {
        None
    }

    /// Construction number, for emitters that are numbered by their factory
    fn instance_number(&self) -> Option<u32> {
        None
    }
}

/// Creates the emitter for each nesting level of one highlight call.
///
/// The same factory is handed every construction in a call, so it is where
/// per-call state lives.
pub trait EmitterFactory<'a> {
    fn create_emitter(&mut self) -> anyhow::Result<Box<dyn Emitter + 'a>>;
}
