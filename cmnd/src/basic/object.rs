//! Commands that move owned objects in and out of the document.
//!
//! The document owns its objects through `Option<Box<O>>` slots. While a
//! command has taken an object out of the document it owns it, and the
//! object is dropped together with the command if the history discards it.

use std::fmt;

use crate::command::{Accessor, Editable, Stable};

/// Places a freshly created object into an empty slot.
///
/// Undo takes the object back out. If the history drops the command while it
/// is undone, the object goes with it.
pub struct GrabNewObject<T, O> {
    slot: Accessor<T, Option<Box<O>>>,
    held: Option<Box<O>>,
}

impl<T, O> GrabNewObject<T, O>
where
    T: Editable,
    O: Send + 'static,
{
    pub fn new<F>(slot: F, object: Box<O>) -> Self
    where
        F: Fn(&mut T) -> &mut Option<Box<O>> + Send + 'static,
    {
        Self {
            slot: Box::new(slot),
            held: Some(object),
        }
    }

    /// Whether the object is currently outside the document.
    pub fn is_canceled(&self) -> bool {
        self.held.is_some()
    }
}

impl<T, O> fmt::Debug for GrabNewObject<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabNewObject")
            .field("canceled", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, O> Stable<T> for GrabNewObject<T, O>
where
    T: Editable,
    O: Send + 'static,
{
    fn undo(&mut self, target: &mut T) {
        self.held = (self.slot)(target).take();
        assert!(self.held.is_some(), "grabbed object is missing from its slot");
    }

    fn redo(&mut self, target: &mut T) {
        let slot = (self.slot)(target);
        assert!(slot.is_none(), "slot for a new object is occupied");
        *slot = self.held.take();
    }
}

/// Removes an object from its slot and keeps it until the command is dropped.
///
/// Undo puts the same object back, so anything referring to it by identity
/// stays valid across the round trip.
pub struct GrabDeleteObject<T, O> {
    slot: Accessor<T, Option<Box<O>>>,
    held: Option<Box<O>>,
}

impl<T, O> GrabDeleteObject<T, O>
where
    T: Editable,
    O: Send + 'static,
{
    pub fn new<F>(slot: F) -> Self
    where
        F: Fn(&mut T) -> &mut Option<Box<O>> + Send + 'static,
    {
        Self {
            slot: Box::new(slot),
            held: None,
        }
    }

    /// The deleted object while the deletion is applied.
    pub fn object(&self) -> Option<&O> {
        self.held.as_deref()
    }
}

impl<T, O> fmt::Debug for GrabDeleteObject<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrabDeleteObject")
            .field("holding", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, O> Stable<T> for GrabDeleteObject<T, O>
where
    T: Editable,
    O: Send + 'static,
{
    fn undo(&mut self, target: &mut T) {
        let slot = (self.slot)(target);
        assert!(slot.is_none(), "slot of a deleted object was reused");
        *slot = self.held.take();
    }

    fn redo(&mut self, target: &mut T) {
        self.held = (self.slot)(target).take();
        assert!(self.held.is_some(), "no object to delete");
    }
}

/// Assigns a new object to a slot, replacing whatever it held.
///
/// The replaced object is kept by the command and restored on undo.
pub struct AssignNewObject<T, O> {
    slot: Accessor<T, Option<Box<O>>>,
    held: Option<Box<O>>,
}

impl<T, O> AssignNewObject<T, O>
where
    T: Editable,
    O: Send + 'static,
{
    pub fn new<F>(slot: F, object: Box<O>) -> Self
    where
        F: Fn(&mut T) -> &mut Option<Box<O>> + Send + 'static,
    {
        Self {
            slot: Box::new(slot),
            held: Some(object),
        }
    }

    fn exchange(&mut self, target: &mut T) {
        std::mem::swap((self.slot)(target), &mut self.held);
    }
}

impl<T, O> fmt::Debug for AssignNewObject<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignNewObject")
            .field("holding", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, O> Stable<T> for AssignNewObject<T, O>
where
    T: Editable,
    O: Send + 'static,
{
    fn undo(&mut self, target: &mut T) {
        self.exchange(target);
    }

    fn redo(&mut self, target: &mut T) {
        self.exchange(target);
    }
}
