use std::fmt;

use crate::command::{Editable, Stable};

type Step<T> = Box<dyn FnMut(&mut T) + Send>;

/// A stable command made of closures.
///
/// Redo falls back to the exec closure unless a separate one is given.
///
/// ```ignore
/// let command = Delegatable::new(
///     |s: &mut Skeleton| s.selection.push(bone),
///     |s: &mut Skeleton| { s.selection.pop(); },
/// );
/// ```
pub struct Delegatable<T> {
    exec: Step<T>,
    undo: Step<T>,
    redo: Option<Step<T>>,
}

impl<T: Editable> Delegatable<T> {
    pub fn new<E, U>(exec: E, undo: U) -> Self
    where
        E: FnMut(&mut T) + Send + 'static,
        U: FnMut(&mut T) + Send + 'static,
    {
        Self {
            exec: Box::new(exec),
            undo: Box::new(undo),
            redo: None,
        }
    }

    pub fn with_redo<E, U, R>(exec: E, undo: U, redo: R) -> Self
    where
        E: FnMut(&mut T) + Send + 'static,
        U: FnMut(&mut T) + Send + 'static,
        R: FnMut(&mut T) + Send + 'static,
    {
        Self {
            exec: Box::new(exec),
            undo: Box::new(undo),
            redo: Some(Box::new(redo)),
        }
    }
}

impl<T> fmt::Debug for Delegatable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delegatable")
            .field("separate_redo", &self.redo.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Editable> Stable<T> for Delegatable<T> {
    fn exec(&mut self, target: &mut T) {
        (self.exec)(target);
    }

    fn undo(&mut self, target: &mut T) {
        (self.undo)(target);
    }

    fn redo(&mut self, target: &mut T) {
        match self.redo.as_mut() {
            Some(redo) => redo(target),
            None => (self.exec)(target),
        }
    }
}
