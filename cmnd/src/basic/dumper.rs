use crate::command::{Editable, Stable};

/// A no-op command that logs every step of its life at debug level.
///
/// Drop one into a macro to see when the history constructs, runs and
/// discards it.
#[derive(Debug)]
pub struct DebugDumper {
    text: String,
}

impl DebugDumper {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        log::debug!("cnst : {text}");
        Self { text }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Drop for DebugDumper {
    fn drop(&mut self) {
        log::debug!("dest : {}", self.text);
    }
}

impl<T: Editable> Stable<T> for DebugDumper {
    fn exec(&mut self, _target: &mut T) {
        log::debug!("exec : {}", self.text);
    }

    fn undo(&mut self, _target: &mut T) {
        log::debug!("undo : {}", self.text);
    }

    fn redo(&mut self, _target: &mut T) {
        log::debug!("redo : {}", self.text);
    }

    fn name(&self) -> &str {
        &self.text
    }
}
