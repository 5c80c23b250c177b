//! # BoneKit Commands
//!
//! Transactional undo/redo engine for the BoneKit animation editor.
//!
//! Every mutation of a document goes through a [`Stack`] as a [`Command`].
//! The stack executes it, records it, and can later undo and redo it. Related
//! commands group into one history step with a macro ([`ScopedMacro`]), and
//! continuous edits such as slider drags coalesce into the last entry through
//! [`Stack::modifiable_mut`].
//!
//! Ready-made leaf commands live in [`basic`], composites in [`scalable`].

pub mod basic;
pub mod command;
pub mod config;
pub mod life_link;
pub mod listener;
pub mod scalable;
pub mod scope;
pub mod stack;

pub use command::{Accessor, AsAny, Command, CommandId, Editable, Stable, StableCommand};
pub use config::{ConfigError, ConfigResult, StackConfig};
pub use life_link::{LifeLink, LifeLinkNode};
pub use listener::{FnListener, Listener, ListenerEvent};
pub use scalable::{Commands, Initializer, Scalable};
pub use scope::{ScopedMacro, ScopedUndoSuspender};
pub use stack::{DEFAULT_LIMIT, EditStatusCallback, Stack};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
