//! Composite commands assembled lazily from child commands.
//!
//! A [`Scalable`] owns an ordered list of children. The list is built by an
//! optional initializer the first time the command executes, so a composite
//! can look at the document before deciding what to do. Children that
//! report [`is_useless`](Command::is_useless) are skipped on every pass.

use std::fmt;

use crate::command::{Command, Editable, Stable};
use crate::listener::{Listener, ListenerEvent, Listeners};

/// Ordered child list of a composite command.
pub struct Commands<T: Editable> {
    list: Vec<Box<dyn Command<T>>>,
}

impl<T: Editable> Commands<T> {
    pub fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Appends a child.
    pub fn push(&mut self, command: Box<dyn Command<T>>) {
        self.list.push(command);
    }

    /// Appends a stable child.
    pub fn push_stable<S: Stable<T>>(&mut self, command: S) {
        self.list.push(command.into_command());
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Children in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command<T>> {
        self.list.iter().map(|command| &**command as &dyn Command<T>)
    }

    /// Executes every useful child. Returns whether any had an effect.
    pub(crate) fn exec_all(&mut self, target: &mut T) -> bool {
        let mut succeed = false;
        for command in &mut self.list {
            if !command.is_useless() && command.try_exec(target) {
                succeed = true;
            }
        }
        succeed
    }

    /// Re-applies every useful child in order.
    pub(crate) fn redo_all(&mut self, target: &mut T) -> bool {
        let mut succeed = false;
        for command in &mut self.list {
            if !command.is_useless() && command.try_redo(target) {
                succeed = true;
            }
        }
        succeed
    }

    /// Reverts every useful child in reverse order.
    pub(crate) fn undo_all(&mut self, target: &mut T) -> bool {
        let mut succeed = false;
        for command in self.list.iter_mut().rev() {
            if !command.is_useless() && command.try_undo(target) {
                succeed = true;
            }
        }
        succeed
    }

    pub(crate) fn all_useless(&self) -> bool {
        self.list.iter().all(|command| command.is_useless())
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Box<dyn Command<T>>> {
        self.list.last_mut()
    }
}

impl<T: Editable> Default for Commands<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> fmt::Debug for Commands<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.list.iter()).finish()
    }
}

impl<T: Editable> Extend<Box<dyn Command<T>>> for Commands<T> {
    fn extend<I: IntoIterator<Item = Box<dyn Command<T>>>>(&mut self, iter: I) {
        self.list.extend(iter);
    }
}

/// Builds the children of a [`Scalable`] from the current document.
pub type Initializer<T> = Box<dyn FnMut(&mut Commands<T>, &T) + Send>;

/// A composite command.
///
/// Success of every pass is the logical OR of its children. The composite
/// becomes useless once it has executed and every child reports useless.
///
/// # Example
///
/// ```ignore
/// let scalable = Scalable::with_initializer("Flip bones", |commands, skeleton: &Skeleton| {
///     for (index, bone) in skeleton.bones.iter().enumerate() {
///         commands.push_stable(Assign::new(move |s: &mut Skeleton| &mut s.bones[index].angle, -bone.angle));
///     }
/// });
/// stack.push(Box::new(scalable), &mut skeleton);
/// ```
pub struct Scalable<T: Editable> {
    name: String,
    commands: Commands<T>,
    listeners: Listeners<T>,
    initializer: Option<Initializer<T>>,
    executed: bool,
}

impl<T: Editable> Scalable<T> {
    /// Creates an empty composite. Children can be added through
    /// [`commands_mut`](Self::commands_mut) before it is pushed.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Commands::new(),
            listeners: Listeners::new(),
            initializer: None,
            executed: false,
        }
    }

    /// Creates a composite whose children are built on first execution.
    pub fn with_initializer<F>(name: impl Into<String>, initializer: F) -> Self
    where
        F: FnMut(&mut Commands<T>, &T) + Send + 'static,
    {
        let mut scalable = Self::new(name);
        scalable.initializer = Some(Box::new(initializer));
        scalable
    }

    /// Runs the initializer, then executes every useful child.
    pub fn initialize_and_execute(&mut self, target: &mut T) -> bool {
        if let Some(initializer) = self.initializer.as_mut() {
            initializer(&mut self.commands, target);
        }
        self.commands.exec_all(target)
    }

    /// Attaches a listener owned by this composite.
    pub fn grab_listener(&mut self, listener: Box<dyn Listener<T>>) {
        self.listeners.grab(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn commands(&self) -> &Commands<T> {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut Commands<T> {
        &mut self.commands
    }

    /// Whether the composite has executed at least once.
    pub fn is_executed(&self) -> bool {
        self.executed
    }
}

impl<T: Editable> fmt::Debug for Scalable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalable")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .field("listeners", &self.listeners)
            .field("executed", &self.executed)
            .finish()
    }
}

impl<T: Editable> Command<T> for Scalable<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_useless(&self) -> bool {
        self.executed && self.commands.all_useless()
    }

    fn try_exec(&mut self, target: &mut T) -> bool {
        let succeed = self.initialize_and_execute(target);
        self.executed = true;
        self.listeners.notify(ListenerEvent::Executed, target);
        succeed
    }

    fn try_redo(&mut self, target: &mut T) -> bool {
        let succeed = self.commands.redo_all(target);
        self.listeners.notify(ListenerEvent::Redone, target);
        succeed
    }

    fn try_undo(&mut self, target: &mut T) -> bool {
        let succeed = self.commands.undo_all(target);
        self.listeners.notify(ListenerEvent::Undone, target);
        succeed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::FnListener;

    struct Doc {
        values: Vec<i32>,
        trace: Vec<String>,
    }

    impl Editable for Doc {}

    #[derive(Debug)]
    struct SetSlot {
        slot: usize,
        prev: i32,
        next: i32,
    }

    impl Stable<Doc> for SetSlot {
        fn exec(&mut self, target: &mut Doc) {
            self.prev = target.values[self.slot];
            self.redo(target);
        }

        fn undo(&mut self, target: &mut Doc) {
            target.values[self.slot] = self.prev;
            target.trace.push(format!("undo {}", self.slot));
        }

        fn redo(&mut self, target: &mut Doc) {
            target.values[self.slot] = self.next;
            target.trace.push(format!("redo {}", self.slot));
        }
    }

    /// Command that never has an effect.
    #[derive(Debug)]
    struct Dead;

    impl Command<Doc> for Dead {
        fn is_useless(&self) -> bool {
            true
        }

        fn try_exec(&mut self, _target: &mut Doc) -> bool {
            unreachable!("useless commands are never executed");
        }

        fn try_redo(&mut self, _target: &mut Doc) -> bool {
            unreachable!("useless commands are never redone");
        }

        fn try_undo(&mut self, _target: &mut Doc) -> bool {
            unreachable!("useless commands are never undone");
        }
    }

    fn doc() -> Doc {
        Doc {
            values: vec![0; 3],
            trace: Vec::new(),
        }
    }

    fn set(slot: usize, next: i32) -> SetSlot {
        SetSlot {
            slot,
            prev: 0,
            next,
        }
    }

    #[test]
    fn initializer_builds_children_from_document() {
        let mut doc = doc();
        doc.values = vec![1, 2, 3];
        let mut scalable = Scalable::with_initializer("Negate", |commands, doc: &Doc| {
            for (slot, value) in doc.values.iter().enumerate() {
                commands.push_stable(set(slot, -value));
            }
        });

        assert!(scalable.try_exec(&mut doc));
        assert_eq!(doc.values, vec![-1, -2, -3]);
        assert_eq!(scalable.commands().len(), 3);
        assert!(scalable.commands().iter().all(|child| !child.is_useless()));

        assert!(scalable.try_undo(&mut doc));
        assert_eq!(doc.values, vec![1, 2, 3]);
    }

    #[test]
    fn undo_runs_in_reverse_order() {
        let mut doc = doc();
        let mut scalable = Scalable::new("Three");
        scalable.commands_mut().push_stable(set(0, 1));
        scalable.commands_mut().push_stable(set(1, 2));
        scalable.commands_mut().push_stable(set(2, 3));

        scalable.try_exec(&mut doc);
        doc.trace.clear();
        scalable.try_undo(&mut doc);
        assert_eq!(doc.trace, vec!["undo 2", "undo 1", "undo 0"]);
        doc.trace.clear();
        scalable.try_redo(&mut doc);
        assert_eq!(doc.trace, vec!["redo 0", "redo 1", "redo 2"]);
    }

    #[test]
    fn useless_only_after_execution() {
        let mut doc = doc();
        let mut scalable = Scalable::new("Dead");
        scalable.commands_mut().push(Box::new(Dead));
        assert!(!scalable.is_useless());
        assert!(!scalable.try_exec(&mut doc));
        assert!(scalable.is_executed());
        assert!(scalable.is_useless());
    }

    #[test]
    fn empty_scalable_is_useless_once_executed() {
        let mut doc = doc();
        let mut scalable = Scalable::<Doc>::new("Empty");
        assert!(!scalable.is_useless());
        assert!(!scalable.try_exec(&mut doc));
        assert!(scalable.is_useless());
    }

    #[test]
    fn mixed_children_skip_useless() {
        let mut doc = doc();
        let mut scalable = Scalable::new("Mixed");
        scalable.commands_mut().push(Box::new(Dead));
        scalable.commands_mut().push_stable(set(1, 5));
        assert!(scalable.try_exec(&mut doc));
        assert!(!scalable.is_useless());
        assert_eq!(doc.values, vec![0, 5, 0]);
    }

    #[test]
    fn listeners_follow_each_pass() {
        let mut doc = doc();
        let mut scalable = Scalable::new("Listened");
        scalable.commands_mut().push_stable(set(0, 1));
        scalable.grab_listener(Box::new(FnListener::new(
            |event: ListenerEvent, doc: &mut Doc| doc.trace.push(format!("{event:?}")),
        )));
        assert_eq!(scalable.listener_count(), 1);

        scalable.try_exec(&mut doc);
        scalable.try_undo(&mut doc);
        scalable.try_redo(&mut doc);

        let events: Vec<&str> = doc
            .trace
            .iter()
            .map(String::as_str)
            .filter(|line| !line.contains(' '))
            .collect();
        assert_eq!(events, vec!["Executed", "Undone", "Redone"]);
    }

    #[test]
    fn name_is_reported() {
        let scalable = Scalable::<Doc>::new("Flip bones");
        assert_eq!(scalable.name(), "Flip bones");
    }
}
