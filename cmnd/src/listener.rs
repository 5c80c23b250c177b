//! Observers attached to composite commands.
//!
//! A [`Listener`] is how domain code learns that one of its edits went
//! through the engine: caches are rebuilt, views repainted and the document
//! marked as modified from these callbacks. Listeners are owned by the macro
//! or [`Scalable`](crate::Scalable) they are attached to and are dropped with
//! it.
//!
//! Callbacks run after the owner's operation completes, in attach order. A
//! listener must not push, undo or redo on the stack that is notifying it.

use std::fmt;

use crate::command::Editable;

/// What happened to the command a listener is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerEvent {
    /// First execution.
    Executed,
    /// Reverted by an undo.
    Undone,
    /// Re-applied by a redo.
    Redone,
}

/// Observer notified on execute, undo and redo. All methods default to
/// no-ops.
pub trait Listener<T: Editable>: Send {
    fn on_executed(&mut self, _target: &mut T) {}

    fn on_undone(&mut self, _target: &mut T) {}

    fn on_redone(&mut self, _target: &mut T) {}
}

/// Closure-backed listener receiving every event.
///
/// ```ignore
/// scalable.grab_listener(Box::new(FnListener::new(|event, mesh: &mut Mesh| {
///     mesh.rebuild_cache();
/// })));
/// ```
pub struct FnListener<F> {
    callback: F,
}

impl<F> FnListener<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<T, F> Listener<T> for FnListener<F>
where
    T: Editable,
    F: FnMut(ListenerEvent, &mut T) + Send,
{
    fn on_executed(&mut self, target: &mut T) {
        (self.callback)(ListenerEvent::Executed, target);
    }

    fn on_undone(&mut self, target: &mut T) {
        (self.callback)(ListenerEvent::Undone, target);
    }

    fn on_redone(&mut self, target: &mut T) {
        (self.callback)(ListenerEvent::Redone, target);
    }
}

/// Ordered, owning list of listeners.
pub(crate) struct Listeners<T: Editable> {
    list: Vec<Box<dyn Listener<T>>>,
}

impl<T: Editable> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self { list: Vec::new() }
    }

    pub(crate) fn grab(&mut self, listener: Box<dyn Listener<T>>) {
        self.list.push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.list.len()
    }

    pub(crate) fn notify(&mut self, event: ListenerEvent, target: &mut T) {
        for listener in &mut self.list {
            match event {
                ListenerEvent::Executed => listener.on_executed(target),
                ListenerEvent::Undone => listener.on_undone(target),
                ListenerEvent::Redone => listener.on_redone(target),
            }
        }
    }
}

impl<T: Editable> Default for Listeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for Listeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.list.len())
            .finish()
    }
}
