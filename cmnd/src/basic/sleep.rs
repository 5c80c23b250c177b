use std::fmt;

use crate::command::{Accessor, Editable, Stable};

/// An object that can be deactivated without being destroyed.
///
/// Deleting a bone from a rig usually sleeps it instead, so that keys and
/// bindings referring to it survive an undo.
pub trait Sleepable {
    fn awake(&mut self);

    fn sleep(&mut self);
}

/// Wakes an object up; undo puts it back to sleep.
pub struct Awake<T, S> {
    access: Accessor<T, S>,
}

impl<T: Editable, S: Sleepable + 'static> Awake<T, S> {
    pub fn new<F>(access: F) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
        }
    }
}

impl<T, S> fmt::Debug for Awake<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Awake")
    }
}

impl<T: Editable, S: Sleepable + 'static> Stable<T> for Awake<T, S> {
    fn undo(&mut self, target: &mut T) {
        (self.access)(target).sleep();
    }

    fn redo(&mut self, target: &mut T) {
        (self.access)(target).awake();
    }
}

/// Puts an object to sleep; undo wakes it up.
pub struct Sleep<T, S> {
    access: Accessor<T, S>,
}

impl<T: Editable, S: Sleepable + 'static> Sleep<T, S> {
    pub fn new<F>(access: F) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
        }
    }
}

impl<T, S> fmt::Debug for Sleep<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sleep")
    }
}

impl<T: Editable, S: Sleepable + 'static> Stable<T> for Sleep<T, S> {
    fn undo(&mut self, target: &mut T) {
        (self.access)(target).awake();
    }

    fn redo(&mut self, target: &mut T) {
        (self.access)(target).sleep();
    }
}
