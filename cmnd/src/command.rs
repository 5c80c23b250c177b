//! Commands, the unit of reversible mutation.
//!
//! - [`Editable`]: marker trait for documents that commands operate on
//! - [`Command`]: the object-safe interface the [`Stack`](crate::Stack) drives
//! - [`Stable`]: fixed exec/undo/redo commands that always report an effect
//! - [`StableCommand`]: adapter that lets a [`Stable`] live in a history
//! - [`CommandId`]: stable identity handed back by every push
//!
//! Composite commands live in [`scalable`](crate::scalable).
//!
//! Commands never hold pointers into the document. Every operation receives
//! the document as `&mut T`, and leaf commands reach the field they edit
//! through an accessor closure (see [`Accessor`]).

use std::any::Any;
use std::fmt;

/// Helper trait for downcasting trait objects to concrete types.
///
/// Automatically implemented for all `'static` types. The stack uses it to
/// hand out the concrete command behind a [`CommandId`] for value
/// coalescing.
pub trait AsAny: 'static {
    /// Returns a reference to `self` as `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Marker trait for types that serve as editing targets.
///
/// Implement this on the document a [`Stack`](crate::Stack) edits: a
/// skeleton, a mesh, a whole project.
///
/// ```ignore
/// struct Project { /* ... */ }
/// impl Editable for Project {}
/// ```
pub trait Editable: 'static {}

/// Accessor from a document to the value a leaf command edits.
///
/// Accessors are re-evaluated on every exec/undo/redo, so they stay valid
/// when the document reallocates its storage.
pub type Accessor<T, V> = Box<dyn Fn(&mut T) -> &mut V + Send>;

/// Identity of a pushed command.
///
/// Ids are allocated from a per-stack counter and are never reused, so an
/// id compares equal only to the push that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub(crate) u64);

impl CommandId {
    /// Get the raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A reversible unit of mutation.
///
/// `try_exec`, `try_redo` and `try_undo` return whether the operation had an
/// observable effect. [`is_useless`](Self::is_useless) lets the stack skip
/// dead entries during traversal without removing them from history.
///
/// None of these operations may fail. A command built against a document it
/// does not match is a programming error and panics.
///
/// # Object Safety
///
/// The trait is dyn-compatible so that different command types can be
/// stored in one history as `Box<dyn Command<T>>`.
pub trait Command<T: Editable>: fmt::Debug + AsAny + Send {
    /// A short, human-readable label for status bars and menus.
    fn name(&self) -> &str {
        ""
    }

    /// Whether the command no longer has any effect and can be skipped.
    fn is_useless(&self) -> bool {
        false
    }

    /// Executes the command for the first time.
    fn try_exec(&mut self, target: &mut T) -> bool;

    /// Re-applies the command after an undo.
    fn try_redo(&mut self, target: &mut T) -> bool;

    /// Reverts the command.
    fn try_undo(&mut self, target: &mut T) -> bool;

    /// The value a coalescing caller downcasts to.
    ///
    /// Adapters override this to expose the command they wrap.
    fn downcast_target(&mut self) -> &mut dyn Any {
        AsAny::as_any_mut(self)
    }
}

/// A command with fixed exec/undo/redo steps.
///
/// Stable commands execute once and are then only undone and redone. They
/// are always considered to have done something.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug)]
/// struct Rename {
///     bone: usize,
///     prev: String,
///     next: String,
/// }
///
/// impl Stable<Skeleton> for Rename {
///     fn exec(&mut self, target: &mut Skeleton) {
///         self.prev = target.bones[self.bone].name.clone();
///         self.redo(target);
///     }
///
///     fn undo(&mut self, target: &mut Skeleton) {
///         target.bones[self.bone].name = self.prev.clone();
///     }
///
///     fn redo(&mut self, target: &mut Skeleton) {
///         target.bones[self.bone].name = self.next.clone();
///     }
/// }
///
/// stack.push(Rename { .. }.into_command(), &mut skeleton);
/// ```
pub trait Stable<T: Editable>: fmt::Debug + Send + 'static {
    /// First application. Defaults to [`redo`](Self::redo).
    fn exec(&mut self, target: &mut T) {
        self.redo(target);
    }

    /// Reverts the command.
    fn undo(&mut self, target: &mut T);

    /// Re-applies the command.
    fn redo(&mut self, target: &mut T);

    /// A short, human-readable label.
    fn name(&self) -> &str {
        ""
    }

    /// Whether the command can be skipped.
    fn is_useless(&self) -> bool {
        false
    }

    /// Wraps the command so it can be pushed onto a stack.
    fn into_command(self) -> Box<dyn Command<T>>
    where
        Self: Sized,
    {
        Box::new(StableCommand::new(self))
    }
}

/// Adapts a [`Stable`] command to the [`Command`] interface.
///
/// Every `try_*` call forwards to the wrapped command and reports success.
/// Downcasting through [`Command::downcast_target`] yields the wrapped
/// command, not the adapter.
pub struct StableCommand<S> {
    inner: S,
}

impl<S> StableCommand<S> {
    /// Wraps a stable command.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped command.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// The wrapped command, mutably.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Unwraps the adapter.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: fmt::Debug> fmt::Debug for StableCommand<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

impl<T: Editable, S: Stable<T>> Command<T> for StableCommand<S> {
    fn name(&self) -> &str {
        Stable::<T>::name(&self.inner)
    }

    fn is_useless(&self) -> bool {
        Stable::<T>::is_useless(&self.inner)
    }

    fn try_exec(&mut self, target: &mut T) -> bool {
        self.inner.exec(target);
        true
    }

    fn try_redo(&mut self, target: &mut T) -> bool {
        self.inner.redo(target);
        true
    }

    fn try_undo(&mut self, target: &mut T) -> bool {
        self.inner.undo(target);
        true
    }

    fn downcast_target(&mut self) -> &mut dyn Any {
        &mut self.inner
    }
}
