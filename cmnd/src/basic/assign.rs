//! Value assignment commands.

use std::fmt;

use crate::command::{Accessor, Editable, Stable};

/// Assigns a value to a field of the document.
///
/// The previous value is captured on first execution. The pending value can
/// be replaced with [`modify_value`](Self::modify_value) while the command
/// is still the modifiable one on its stack, which is how slider drags and
/// brush strokes stay a single history entry.
pub struct Assign<T, V> {
    access: Accessor<T, V>,
    prev: Option<V>,
    next: V,
    done: bool,
}

impl<T, V> Assign<T, V>
where
    T: Editable,
    V: Clone + Send + 'static,
{
    pub fn new<F>(access: F, value: V) -> Self
    where
        F: Fn(&mut T) -> &mut V + Send + 'static,
    {
        Self {
            access: Box::new(access),
            prev: None,
            next: value,
            done: false,
        }
    }

    /// Replaces the value to assign, re-applying it if the command is
    /// currently applied.
    pub fn modify_value(&mut self, value: V, target: &mut T) {
        self.next = value;
        if self.done {
            self.redo(target);
        }
    }

    /// The value this command assigns.
    pub fn value(&self) -> &V {
        &self.next
    }

    /// The value captured before the first execution.
    pub fn previous(&self) -> Option<&V> {
        self.prev.as_ref()
    }
}

impl<T, V> fmt::Debug for Assign<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assign")
            .field("captured", &self.prev.is_some())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T, V> Stable<T> for Assign<T, V>
where
    T: Editable,
    V: Clone + Send + 'static,
{
    fn exec(&mut self, target: &mut T) {
        self.prev = Some((self.access)(target).clone());
        self.redo(target);
    }

    fn undo(&mut self, target: &mut T) {
        if let Some(prev) = &self.prev {
            *(self.access)(target) = prev.clone();
        }
        self.done = false;
    }

    fn redo(&mut self, target: &mut T) {
        *(self.access)(target) = self.next.clone();
        self.done = true;
    }
}

/// Assigns a value whose type differs from the field it lands in.
///
/// The value converts into the field with [`Into`] on every redo, so an
/// `i64` frame index edited through an `i32` spin box can be assigned
/// without a cast at each call site. The previous field content is kept as
/// is.
pub struct ConvertAssign<T, F, V> {
    access: Accessor<T, F>,
    prev: Option<F>,
    next: V,
}

impl<T, F, V> ConvertAssign<T, F, V>
where
    T: Editable,
    F: Clone + Send + 'static,
    V: Clone + Into<F> + Send + 'static,
{
    pub fn new<A>(access: A, value: V) -> Self
    where
        A: Fn(&mut T) -> &mut F + Send + 'static,
    {
        Self {
            access: Box::new(access),
            prev: None,
            next: value,
        }
    }
}

impl<T, F, V> fmt::Debug for ConvertAssign<T, F, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertAssign")
            .field("captured", &self.prev.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, F, V> Stable<T> for ConvertAssign<T, F, V>
where
    T: Editable,
    F: Clone + Send + 'static,
    V: Clone + Into<F> + Send + 'static,
{
    fn exec(&mut self, target: &mut T) {
        self.prev = Some((self.access)(target).clone());
        self.redo(target);
    }

    fn undo(&mut self, target: &mut T) {
        if let Some(prev) = &self.prev {
            *(self.access)(target) = prev.clone();
        }
    }

    fn redo(&mut self, target: &mut T) {
        *(self.access)(target) = self.next.clone().into();
    }
}
