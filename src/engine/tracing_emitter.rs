//! Emitter that only logs the engine's callbacks
//!
//! Useful for seeing how the engine sequences emitter construction, nested
//! passes, and sub-language hand-off. Enable with `HLSTREAM_LOG=hlstream=debug`.

use super::{Emitter, EmitterFactory};

/// Logs every callback, tagged with its construction number
#[derive(Debug)]
pub struct TracingEmitter {
    instance: u32,
}

impl TracingEmitter {
    pub fn new(instance: u32) -> Self {
        tracing::debug!("constructor {}", instance);
        Self { instance }
    }

    pub fn instance(&self) -> u32 {
        self.instance
    }
}

impl Emitter for TracingEmitter {
    fn start_scope(&mut self, name: &str) {
        tracing::debug!("[{}] start_scope {:?}", self.instance, name);
    }

    fn end_scope(&mut self) {
        tracing::debug!("[{}] end_scope", self.instance);
    }

    fn open_node(&mut self, name: &str) {
        tracing::debug!("[{}] open_node {:?}", self.instance, name);
    }

    fn close_node(&mut self) {
        tracing::debug!("[{}] close_node", self.instance);
    }

    fn add_text(&mut self, text: &str) {
        tracing::debug!("[{}] add_text {:?}", self.instance, text);
    }

    fn add_sublanguage(&mut self, child: &mut dyn Emitter, name: &str) -> anyhow::Result<()> {
        let Some(child_instance) = child.instance_number() else {
            anyhow::bail!(
                "nested {:?} pass handed to emitter {} was not traced",
                name,
                self.instance
            );
        };
        tracing::debug!(
            "[{}] add_sublanguage {:?} from [{}]",
            self.instance,
            name,
            child_instance
        );
        Ok(())
    }

    fn finalize(&mut self) {
        tracing::debug!("[{}] finalize", self.instance);
    }

    fn to_html(&self) -> String {
        tracing::debug!("[{}] to_html", self.instance);
        String::new()
    }

    fn instance_number(&self) -> Option<u32> {
        Some(self.instance)
    }
}

/// Creates [`TracingEmitter`]s numbered from zero
#[derive(Debug, Default)]
pub struct TracingFactory {
    instance_count: u32,
}

impl TracingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emitters created so far
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

impl<'a> EmitterFactory<'a> for TracingFactory {
    fn create_emitter(&mut self) -> anyhow::Result<Box<dyn Emitter + 'a>> {
        let emitter = TracingEmitter::new(self.instance_count);
        self.instance_count += 1;
        Ok(Box::new(emitter))
    }
}
