//! The macro: a named group of commands that forms one history step.

use std::fmt;

use crate::command::{Command, Editable};
use crate::life_link::{LifeLink, LifeLinkNode};
use crate::listener::{Listener, ListenerEvent, Listeners};
use crate::scalable::Commands;

/// A group of commands collected between `begin_macro` and `end_macro`.
///
/// Children are only appended while the macro is open. They execute when the
/// finished macro is pushed, undo in reverse order and redo in order.
pub(crate) struct Macro<T: Editable> {
    name: String,
    commands: Commands<T>,
    valid_link: Option<LifeLinkNode>,
    listeners: Listeners<T>,
}

impl<T: Editable> Macro<T> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Commands::new(),
            valid_link: None,
            listeners: Listeners::new(),
        }
    }

    pub(crate) fn push(&mut self, command: Box<dyn Command<T>>) {
        self.commands.push(command);
    }

    /// Ties the macro to a domain object. Once the object is gone the macro
    /// is permanently useless.
    pub(crate) fn set_valid_link(&mut self, link: &LifeLink) {
        self.valid_link = Some(link.node());
    }

    pub(crate) fn grab_listener(&mut self, listener: Box<dyn Listener<T>>) {
        self.listeners.grab(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.commands.len()
    }

    pub(crate) fn last_child_mut(&mut self) -> Option<&mut Box<dyn Command<T>>> {
        self.commands.last_mut()
    }
}

impl<T: Editable> fmt::Debug for Macro<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macro")
            .field("name", &self.name)
            .field("commands", &self.commands)
            .field("valid_link", &self.valid_link)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl<T: Editable> Command<T> for Macro<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_useless(&self) -> bool {
        if let Some(link) = &self.valid_link
            && !link.is_linking()
        {
            return true;
        }
        self.commands.is_empty() || self.commands.all_useless()
    }

    fn try_exec(&mut self, target: &mut T) -> bool {
        let succeed = self.commands.exec_all(target);
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
    use crate::command::Stable;

    struct Doc {
        trace: Vec<String>,
    }

    impl Editable for Doc {}

    #[derive(Debug)]
    struct Step(&'static str);

    impl Stable<Doc> for Step {
        fn undo(&mut self, target: &mut Doc) {
            target.trace.push(format!("undo {}", self.0));
        }

        fn redo(&mut self, target: &mut Doc) {
            target.trace.push(format!("redo {}", self.0));
        }
    }

    #[test]
    fn empty_macro_is_useless() {
        let m = Macro::<Doc>::new("Empty");
        assert!(m.is_useless());
        assert_eq!(m.len(), 0);
    }

    #[test]
    fn dead_link_makes_macro_useless() {
        let link = LifeLink::new();
        let mut m = Macro::<Doc>::new("Linked");
        m.push(Step("a").into_command());
        m.set_valid_link(&link);
        assert!(!m.is_useless());
        drop(link);
        assert!(m.is_useless());
    }

    #[test]
    fn children_run_in_order_and_undo_in_reverse() {
        let mut doc = Doc { trace: Vec::new() };
        let mut m = Macro::new("Three");
        m.push(Step("c1").into_command());
        m.push(Step("c2").into_command());
        m.push(Step("c3").into_command());

        assert!(m.try_exec(&mut doc));
        assert!(m.try_undo(&mut doc));
        assert_eq!(
            doc.trace,
            vec![
                "redo c1", "redo c2", "redo c3", "undo c3", "undo c2", "undo c1"
            ]
        );
    }

    #[test]
    fn last_child_is_reachable() {
        let mut m = Macro::<Doc>::new("Two");
        m.push(Step("first").into_command());
        m.push(Step("second").into_command());
        let last = m
            .last_child_mut()
            .and_then(|c| c.downcast_target().downcast_mut::<Step>())
            .map(|s| s.0);
        assert_eq!(last, Some("second"));
    }
}
