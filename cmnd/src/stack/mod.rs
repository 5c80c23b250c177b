//! Bounded, cursor-based command history.
//!
//! [`Stack`] owns every pushed command in one ordered list and a cursor that
//! points one past the last applied command:
//!
//! ```text
//! push A, push B, push C          undo, undo            push D
//! [A, B, C]                       [A, B, C]             [A, D]
//!           ^ current              ^ current                  ^ current
//! ```
//!
//! Pushing executes the command immediately and discards everything after
//! the cursor. Undo and redo move the cursor one useful step, walking past
//! entries that report [`is_useless`](Command::is_useless) without removing
//! them. When the history is full the oldest entry is dropped for good.

mod macro_command;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::command::{Command, CommandId, Editable};
use crate::config::StackConfig;
use crate::life_link::LifeLink;
use crate::listener::Listener;

use macro_command::Macro;

/// Default maximum number of history entries.
pub const DEFAULT_LIMIT: usize = 32;

/// Where the most recently pushed command lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    /// Last top-level entry of the history.
    LastEntry,
    /// Last child of the macro that is still open.
    OpenMacro,
    /// Last child of the macro that was closed into the last entry.
    ClosedMacro,
}

#[derive(Debug, Clone, Copy)]
struct Modifiable {
    id: CommandId,
    location: Location,
}

/// Callback fired when [`Stack::is_edited`] flips.
pub type EditStatusCallback = Box<dyn FnMut(bool) + Send>;

/// The transactional history of one document.
///
/// Every mutation of the document goes through [`push`](Self::push). The
/// stack is created per document and passed by reference to whoever edits
/// it.
///
/// # Example
///
/// ```ignore
/// let mut stack = Stack::new();
/// let mut skeleton = Skeleton::default();
///
/// let id = stack.push(
///     Assign::new(|s: &mut Skeleton| &mut s.bones[0].angle, 0.5).into_command(),
///     &mut skeleton,
/// );
///
/// // The slider keeps moving: coalesce into the same history entry.
/// if let Some(assign) = stack.modifiable_mut::<Assign<Skeleton, f32>>(id) {
///     assign.modify_value(0.7, &mut skeleton);
/// }
///
/// assert_eq!(stack.undo(&mut skeleton).as_deref(), Some(""));
/// ```
pub struct Stack<T: Editable> {
    limit: usize,
    commands: VecDeque<Box<dyn Command<T>>>,
    current: usize,
    open_macro: Option<Macro<T>>,
    suspend_count: Arc<AtomicUsize>,
    modifiable: Option<Modifiable>,
    next_id: u64,
    /// Cursor position that matches the saved document, if still reachable.
    saved: Option<usize>,
    is_edited: bool,
    on_edit_status_changed: Option<EditStatusCallback>,
}

impl<T: Editable> Stack<T> {
    /// Creates an empty history holding at most [`DEFAULT_LIMIT`] entries.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Creates an empty history from a loaded configuration.
    pub fn with_config(config: &StackConfig) -> Self {
        Self::with_limit(config.limit)
    }

    /// Creates an empty history holding at most `limit` entries.
    ///
    /// # Panics
    ///
    /// Panics if `limit` is zero.
    pub fn with_limit(limit: usize) -> Self {
        assert!(limit > 0, "history limit must be at least 1");
        Self {
            limit,
            commands: VecDeque::new(),
            current: 0,
            open_macro: None,
            suspend_count: Arc::new(AtomicUsize::new(0)),
            modifiable: None,
            next_id: 0,
            saved: Some(0),
            is_edited: false,
            on_edit_status_changed: None,
        }
    }

    // ========================================================================
    // Push
    // ========================================================================

    /// Pushes a command, taking ownership.
    ///
    /// With a macro open the command is only appended to it. Otherwise it is
    /// recorded and executed right away, and any undone future branch is
    /// discarded.
    ///
    /// Returns the id to use with [`is_modifiable`](Self::is_modifiable).
    pub fn push(&mut self, command: Box<dyn Command<T>>, target: &mut T) -> CommandId {
        let id = self.allocate_id();
        if let Some(open) = self.open_macro.as_mut() {
            log::trace!("append \"{}\" to open macro", command.name());
            open.push(command);
            self.modifiable = Some(Modifiable {
                id,
                location: Location::OpenMacro,
            });
        } else {
            self.push_impl(command, target);
            self.modifiable = Some(Modifiable {
                id,
                location: Location::LastEntry,
            });
        }
        id
    }

    /// Pushes several commands in order. Returns the id of the last one.
    pub fn push_all<I>(&mut self, commands: I, target: &mut T) -> Option<CommandId>
    where
        I: IntoIterator<Item = Box<dyn Command<T>>>,
    {
        commands
            .into_iter()
            .fold(None, |_, command| Some(self.push(command, target)))
    }

    fn push_impl(&mut self, command: Box<dyn Command<T>>, target: &mut T) {
        // Drop the undone branch.
        if self.current < self.commands.len() {
            log::trace!(
                "discard {} undone entries",
                self.commands.len() - self.current
            );
            self.commands.truncate(self.current);
            if self.saved.is_some_and(|saved| saved > self.current) {
                self.saved = None;
            }
        }

        // Keep within the limit.
        while self.commands.len() >= self.limit {
            if let Some(evicted) = self.commands.pop_front() {
                log::debug!("evict oldest history entry \"{}\"", evicted.name());
            }
            self.saved = match self.saved {
                Some(0) | None => None,
                Some(saved) => Some(saved - 1),
            };
        }

        log::trace!("push \"{}\"", command.name());
        self.commands.push_back(command);
        if let Some(pushed) = self.commands.back_mut()
            && !pushed.is_useless()
        {
            pushed.try_exec(target);
        }
        self.current = self.commands.len();

        self.update_edit_status();
    }

    fn allocate_id(&mut self) -> CommandId {
        let id = CommandId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========================================================================
    // Macros
    // ========================================================================

    /// Opens a macro. Commands pushed until [`end_macro`](Self::end_macro)
    /// form a single history step named `name`.
    ///
    /// Prefer [`ScopedMacro`](crate::ScopedMacro), which closes the macro on
    /// every exit path.
    ///
    /// # Panics
    ///
    /// Panics if a macro is already open.
    pub fn begin_macro(&mut self, name: impl Into<String>) {
        assert!(self.open_macro.is_none(), "macros cannot be nested");
        let name = name.into();
        log::debug!("begin macro \"{name}\"");
        self.open_macro = Some(Macro::new(name));
    }

    /// Ties the open macro to a domain object. If the object is dropped the
    /// macro is skipped by undo and redo from then on.
    ///
    /// # Panics
    ///
    /// Panics if no macro is open.
    pub fn set_macro_valid_link(&mut self, link: &LifeLink) {
        self.expect_open_macro().set_valid_link(link);
    }

    /// Attaches a listener to the open macro.
    ///
    /// # Panics
    ///
    /// Panics if no macro is open.
    pub fn grab_macro_listener(&mut self, listener: Box<dyn Listener<T>>) {
        self.expect_open_macro().grab_listener(listener);
    }

    /// Closes the open macro, records it as one entry and executes it.
    ///
    /// # Panics
    ///
    /// Panics if no macro is open.
    pub fn end_macro(&mut self, target: &mut T) {
        let Some(finished) = self.open_macro.take() else {
            panic!("end_macro called without an open macro");
        };
        log::debug!(
            "end macro \"{}\" ({} commands)",
            finished.name(),
            finished.len()
        );
        self.push_impl(Box::new(finished), target);

        // Only a command pushed into this macro stays reachable.
        self.modifiable = match self.modifiable {
            Some(modifiable) if modifiable.location == Location::OpenMacro => Some(Modifiable {
                location: Location::ClosedMacro,
                ..modifiable
            }),
            _ => None,
        };
    }

    /// Returns `true` between `begin_macro` and `end_macro`.
    pub fn is_macro_open(&self) -> bool {
        self.open_macro.is_some()
    }

    fn expect_open_macro(&mut self) -> &mut Macro<T> {
        match self.open_macro.as_mut() {
            Some(open) => open,
            None => panic!("no macro is open"),
        }
    }

    // ========================================================================
    // Undo / Redo
    // ========================================================================

    /// Undoes the most recent useful entry.
    ///
    /// Useless entries on the way are passed over but stay in the history.
    /// Returns the name of the undone entry, or `None` if nothing was undone
    /// or undo is suspended.
    pub fn undo(&mut self, target: &mut T) -> Option<String> {
        if self.is_suspended() {
            return None;
        }
        self.modifiable = None;

        let mut undone = None;
        while self.current > 0 {
            self.current -= 1;
            let command = &mut self.commands[self.current];
            if !command.is_useless() && command.try_undo(target) {
                log::trace!("undo \"{}\"", command.name());
                undone = Some(command.name().to_owned());
                break;
            }
        }

        self.update_edit_status();
        undone
    }

    /// Redoes the next useful entry.
    ///
    /// Returns the name of the redone entry, or `None` if nothing was redone
    /// or redo is suspended.
    pub fn redo(&mut self, target: &mut T) -> Option<String> {
        if self.is_suspended() {
            return None;
        }
        self.modifiable = None;

        let mut redone = None;
        while self.current < self.commands.len() {
            let command = &mut self.commands[self.current];
            self.current += 1;
            if !command.is_useless() && command.try_redo(target) {
                log::trace!("redo \"{}\"", command.name());
                redone = Some(command.name().to_owned());
                break;
            }
        }

        self.update_edit_status();
        redone
    }

    /// Drops the whole history. Meant for project load and close, never for
    /// the middle of an edit.
    pub fn clear(&mut self) {
        log::debug!("clear {} history entries", self.commands.len());
        self.saved = if self.saved == Some(self.current) {
            Some(0)
        } else {
            None
        };
        self.commands.clear();
        self.current = 0;
        self.modifiable = None;
        self.update_edit_status();
    }

    // ========================================================================
    // Coalescing
    // ========================================================================

    /// Returns `true` if `id` belongs to the most recently pushed command and
    /// no push, undo or redo has happened since.
    pub fn is_modifiable(&self, id: CommandId) -> bool {
        self.modifiable.is_some_and(|modifiable| modifiable.id == id)
    }

    /// The command behind `id`, if it is still modifiable and of type `C`.
    ///
    /// Callers update it in place (for example `Assign::modify_value`)
    /// instead of pushing a new command, so a continuous edit stays one
    /// history entry.
    pub fn modifiable_mut<C: 'static>(&mut self, id: CommandId) -> Option<&mut C> {
        let modifiable = self.modifiable.filter(|modifiable| modifiable.id == id)?;
        let command = match modifiable.location {
            Location::LastEntry => self.commands.back_mut()?,
            Location::OpenMacro => self.open_macro.as_mut()?.last_child_mut()?,
            Location::ClosedMacro => self
                .commands
                .back_mut()?
                .downcast_target()
                .downcast_mut::<Macro<T>>()?
                .last_child_mut()?,
        };
        command.downcast_target().downcast_mut::<C>()
    }

    // ========================================================================
    // Suspension
    // ========================================================================

    /// Returns `true` while a [`ScopedUndoSuspender`](crate::ScopedUndoSuspender)
    /// is alive for this stack.
    pub fn is_suspended(&self) -> bool {
        self.suspend_count.load(Ordering::Acquire) > 0
    }

    pub(crate) fn suspend_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.suspend_count)
    }

    // ========================================================================
    // Edit status
    // ========================================================================

    /// Records the current state as the saved state.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.current);
        self.update_edit_status();
    }

    /// Returns `true` if the document differs from the last saved state.
    ///
    /// Stays `true` once the saved state is unreachable: discarded with an
    /// undone branch or evicted by the history limit.
    pub fn is_edited(&self) -> bool {
        self.is_edited
    }

    /// Registers the callback fired whenever [`is_edited`](Self::is_edited)
    /// changes.
    pub fn set_on_edit_status_changed<F>(&mut self, callback: F)
    where
        F: FnMut(bool) + Send + 'static,
    {
        self.on_edit_status_changed = Some(Box::new(callback));
    }

    fn update_edit_status(&mut self) {
        let is_edited = self.saved != Some(self.current);
        if self.is_edited != is_edited {
            self.is_edited = is_edited;
            if let Some(callback) = self.on_edit_status_changed.as_mut() {
                callback(is_edited);
            }
        }
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Number of entries in the history, including undone ones.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Maximum number of entries.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Position one past the last applied entry.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Returns `true` if there are entries before the cursor.
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Returns `true` if there are entries after the cursor.
    pub fn can_redo(&self) -> bool {
        self.current < self.commands.len()
    }

    /// Entry names, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|command| command.name())
    }
}

impl<T: Editable> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Editable> Drop for Stack<T> {
    fn drop(&mut self) {
        if let Some(open) = &self.open_macro {
            log::warn!("history dropped with macro \"{}\" still open", open.name());
        }
    }
}

impl<T: Editable> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("len", &self.commands.len())
            .field("current", &self.current)
            .field("limit", &self.limit)
            .field("macro_open", &self.open_macro.is_some())
            .field("suspended", &self.is_suspended())
            .field("saved", &self.saved)
            .finish()
    }
}
