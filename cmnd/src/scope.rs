//! RAII guards over a [`Stack`].
//!
//! - [`ScopedMacro`] opens a macro and closes it when dropped, so an early
//!   return or a panic in the middle of a multi-step edit still leaves the
//!   history balanced.
//! - [`ScopedUndoSuspender`] blocks undo and redo while, for example, a
//!   viewport drag is in progress.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::command::{Command, CommandId, Editable};
use crate::life_link::LifeLink;
use crate::listener::Listener;
use crate::stack::Stack;

/// Groups every command pushed through it into one history entry.
///
/// The guard borrows both the stack and the document for its lifetime and
/// calls [`Stack::end_macro`] on drop.
///
/// # Example
///
/// ```ignore
/// {
///     let mut group = ScopedMacro::new(&mut stack, &mut skeleton, "Mirror bones");
///     group.push(Assign::new(|s: &mut Skeleton| &mut s.bones[0].angle, 0.5).into_command());
///     group.push(Assign::new(|s: &mut Skeleton| &mut s.bones[1].angle, -0.5).into_command());
/// } // one entry named "Mirror bones" is recorded and executed here
/// ```
pub struct ScopedMacro<'a, T: Editable> {
    stack: &'a mut Stack<T>,
    target: &'a mut T,
}

impl<'a, T: Editable> ScopedMacro<'a, T> {
    /// Opens a macro named `name` on `stack`.
    ///
    /// # Panics
    ///
    /// Panics if `stack` already has an open macro.
    pub fn new(stack: &'a mut Stack<T>, target: &'a mut T, name: impl Into<String>) -> Self {
        stack.begin_macro(name);
        Self { stack, target }
    }

    /// Appends a command to the macro.
    pub fn push(&mut self, command: Box<dyn Command<T>>) -> CommandId {
        self.stack.push(command, self.target)
    }

    /// See [`Stack::set_macro_valid_link`].
    pub fn set_valid_link(&mut self, link: &LifeLink) {
        self.stack.set_macro_valid_link(link);
    }

    /// See [`Stack::grab_macro_listener`].
    pub fn grab_listener(&mut self, listener: Box<dyn Listener<T>>) {
        self.stack.grab_macro_listener(listener);
    }

    /// The document, for reading state while building commands.
    ///
    /// Commands pushed into the macro have not run yet, so the document
    /// still shows the state from before the macro.
    pub fn target(&self) -> &T {
        &*self.target
    }

    pub fn stack(&self) -> &Stack<T> {
        &*self.stack
    }

    /// The stack, for coalescing through [`Stack::modifiable_mut`].
    pub fn stack_mut(&mut self) -> &mut Stack<T> {
        &mut *self.stack
    }
}

impl<T: Editable> Drop for ScopedMacro<'_, T> {
    fn drop(&mut self) {
        self.stack.end_macro(self.target);
    }
}

impl<T: Editable> fmt::Debug for ScopedMacro<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedMacro")
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

/// Suspends undo and redo on a stack while alive.
///
/// Suspenders nest: the stack resumes once the last one is dropped. The
/// guard does not borrow the stack, so edits can continue while it is held.
#[derive(Debug)]
#[must_use = "the stack resumes as soon as the suspender is dropped"]
pub struct ScopedUndoSuspender {
    count: Arc<AtomicUsize>,
}

impl ScopedUndoSuspender {
    pub fn new<T: Editable>(stack: &Stack<T>) -> Self {
        let count = stack.suspend_counter();
        count.fetch_add(1, Ordering::AcqRel);
        log::trace!("suspend undo");
        Self { count }
    }
}

impl Drop for ScopedUndoSuspender {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
        log::trace!("resume undo");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic::Assign;
    use crate::command::Stable;

    #[derive(Debug, Default)]
    struct Pose {
        angles: [f32; 3],
    }

    impl Editable for Pose {}

    fn rotate(bone: usize, angle: f32) -> Box<dyn Command<Pose>> {
        Assign::new(move |p: &mut Pose| &mut p.angles[bone], angle).into_command()
    }

    #[test]
    fn scoped_macro_records_one_entry() {
        let mut stack = Stack::new();
        let mut pose = Pose::default();
        {
            let mut group = ScopedMacro::new(&mut stack, &mut pose, "Mirror");
            group.push(rotate(0, 1.0));
            group.push(rotate(1, -1.0));
            assert!(group.stack().is_macro_open());
            assert_eq!(group.target().angles, [0.0; 3]);
        }
        assert!(!stack.is_macro_open());
        assert_eq!(stack.len(), 1);
        assert_eq!(pose.angles, [1.0, -1.0, 0.0]);

        assert_eq!(stack.undo(&mut pose).as_deref(), Some("Mirror"));
        assert_eq!(pose.angles, [0.0; 3]);
    }

    #[test]
    fn scoped_macro_closes_on_early_return() {
        fn edit(stack: &mut Stack<Pose>, pose: &mut Pose, bail: bool) -> Option<()> {
            let mut group = ScopedMacro::new(stack, pose, "Maybe");
            group.push(rotate(2, 3.0));
            if bail {
                return None;
            }
            group.push(rotate(0, 1.0));
            Some(())
        }

        let mut stack = Stack::new();
        let mut pose = Pose::default();
        assert!(edit(&mut stack, &mut pose, true).is_none());
        assert!(!stack.is_macro_open());
        assert_eq!(pose.angles, [0.0, 0.0, 3.0]);
    }

    #[test]
    fn scoped_macro_coalesces_through_stack() {
        let mut stack = Stack::new();
        let mut pose = Pose::default();
        let mut group = ScopedMacro::new(&mut stack, &mut pose, "Drag");
        let id = group.push(rotate(0, 0.1));
        assert!(group.stack().is_modifiable(id));
        let assign = group.stack_mut().modifiable_mut::<Assign<Pose, f32>>(id);
        assert!(assign.is_some());
    }

    #[test]
    fn suspender_blocks_undo_and_redo() {
        let mut stack = Stack::new();
        let mut pose = Pose::default();
        stack.push(rotate(0, 2.0), &mut pose);

        let suspender = ScopedUndoSuspender::new(&stack);
        assert!(stack.is_suspended());
        assert_eq!(stack.undo(&mut pose), None);
        assert_eq!(pose.angles[0], 2.0);

        drop(suspender);
        assert!(!stack.is_suspended());
        assert!(stack.undo(&mut pose).is_some());
        assert_eq!(pose.angles[0], 0.0);
    }

    #[test]
    fn suspenders_nest() {
        let stack = Stack::<Pose>::new();
        let outer = ScopedUndoSuspender::new(&stack);
        let inner = ScopedUndoSuspender::new(&stack);
        drop(outer);
        assert!(stack.is_suspended());
        drop(inner);
        assert!(!stack.is_suspended());
    }

    #[test]
    fn pushes_allowed_while_suspended() {
        let mut stack = Stack::new();
        let mut pose = Pose::default();
        let _suspender = ScopedUndoSuspender::new(&stack);
        stack.push(rotate(1, 5.0), &mut pose);
        assert_eq!(pose.angles[1], 5.0);
        assert_eq!(stack.len(), 1);
    }
}
