//! Raw byte-buffer assignment with bounded auxiliary memory.
//!
//! [`AssignMemory`] undoes and redoes writes to a large byte region, such as
//! a mesh vertex buffer after a deformation pass, in one of two modes:
//!
//! - **Copy once** (block size equals the payload size): the original bytes
//!   are snapshotted on first execution and undo/redo are plain copies. The
//!   command holds two full-size buffers.
//! - **Block swap** (block size smaller than the payload): target and payload
//!   are exchanged block by block through a scratch buffer of at most one
//!   block. The exchange is its own inverse, so after a redo the payload
//!   buffer holds the original bytes and the next undo swaps them back. The
//!   command holds one full-size buffer plus one block.
//!
//! ```text
//! redo / undo (block swap)
//!
//! target  [ t0 | t1 | t2 | t3 ]        [ a0 | a1 | a2 | a3 ]
//!            ⇅    ⇅    ⇅    ⇅    ──►
//! payload [ a0 | a1 | a2 | a3 ]        [ t0 | t1 | t2 | t3 ]
//! ```

use std::fmt;

use bytemuck::Pod;

use crate::command::{Editable, Stable};

/// Accessor from a document to the byte region an [`AssignMemory`] edits.
pub type ByteAccessor<T> = Box<dyn Fn(&mut T) -> &mut [u8] + Send>;

/// Assigns a byte payload to a region of the document.
pub struct AssignMemory<T> {
    access: ByteAccessor<T>,
    /// Bytes to assign; in block-swap mode holds the original bytes while the
    /// command is applied.
    assign: Vec<u8>,
    /// Original bytes in copy-once mode, scratch block in block-swap mode.
    block: Vec<u8>,
    done: bool,
}

impl<T: Editable> AssignMemory<T> {
    /// Creates a copy-once command.
    ///
    /// # Panics
    ///
    /// Panics if `assign` is empty.
    pub fn new<F>(access: F, assign: Vec<u8>) -> Self
    where
        F: Fn(&mut T) -> &mut [u8] + Send + 'static,
    {
        Self::with_block_size(access, assign, 0)
    }

    /// Creates a command that exchanges at most `block_size` bytes at a time.
    ///
    /// A `block_size` of zero, or one not smaller than the payload, selects
    /// copy-once mode.
    ///
    /// # Panics
    ///
    /// Panics if `assign` is empty.
    pub fn with_block_size<F>(access: F, assign: Vec<u8>, block_size: usize) -> Self
    where
        F: Fn(&mut T) -> &mut [u8] + Send + 'static,
    {
        assert!(!assign.is_empty(), "memory assignment needs a payload");
        let size = assign.len();
        let block_size = if block_size == 0 || block_size > size {
            size
        } else {
            block_size
        };
        Self {
            access: Box::new(access),
            assign,
            block: vec![0; block_size],
            done: false,
        }
    }

    /// Creates a command over a typed buffer, for example a slice of vertex
    /// structs.
    pub fn from_pod<P, F>(access: F, assign: &[P], block_size: usize) -> Self
    where
        P: Pod,
        F: Fn(&mut T) -> &mut [P] + Send + 'static,
    {
        Self::with_block_size(
            move |target: &mut T| bytemuck::cast_slice_mut::<P, u8>(access(target)),
            bytemuck::cast_slice::<P, u8>(assign).to_vec(),
            block_size,
        )
    }

    /// Total number of bytes assigned.
    pub fn size(&self) -> usize {
        self.assign.len()
    }

    /// Size of one exchanged block.
    pub fn block_size(&self) -> usize {
        self.block.len()
    }

    /// Whether the whole payload is copied in one step.
    pub fn copies_one_time(&self) -> bool {
        self.block.len() == self.assign.len()
    }

    /// Bytes held besides the payload itself.
    pub fn auxiliary_bytes(&self) -> usize {
        self.block.len()
    }

    /// Replaces the payload.
    ///
    /// Before the first application, or in copy-once mode, the pending
    /// payload is updated. While applied, the target is overwritten so the
    /// live result follows the new value.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not match [`size`](Self::size).
    pub fn modify_value(&mut self, value: &[u8], target: &mut T) {
        assert_eq!(value.len(), self.assign.len(), "payload size mismatch");
        if self.copies_one_time() || !self.done {
            self.assign.copy_from_slice(value);
        }
        if self.done {
            self.target_bytes(target).copy_from_slice(value);
        }
    }

    /// Typed variant of [`modify_value`](Self::modify_value).
    pub fn modify_value_pod<P: Pod>(&mut self, value: &[P], target: &mut T) {
        self.modify_value(bytemuck::cast_slice(value), target);
    }

    fn target_bytes<'a>(&self, target: &'a mut T) -> &'a mut [u8] {
        let bytes = (self.access)(target);
        assert_eq!(bytes.len(), self.assign.len(), "target size mismatch");
        bytes
    }

    fn exchange(&mut self, target: &mut T) {
        let bytes = (self.access)(target);
        assert_eq!(bytes.len(), self.assign.len(), "target size mismatch");
        exchange_blocks(bytes, &mut self.assign, &mut self.block);
    }
}

/// Swaps `a` and `b` through `scratch`, one `scratch.len()` block at a time.
fn exchange_blocks(a: &mut [u8], b: &mut [u8], scratch: &mut [u8]) {
    let block_size = scratch.len();
    for (lhs, rhs) in a.chunks_mut(block_size).zip(b.chunks_mut(block_size)) {
        let block = &mut scratch[..lhs.len()];
        block.copy_from_slice(lhs);
        lhs.copy_from_slice(rhs);
        rhs.copy_from_slice(block);
    }
}

impl<T> fmt::Debug for AssignMemory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssignMemory")
            .field("size", &self.assign.len())
            .field("block_size", &self.block.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<T: Editable> Stable<T> for AssignMemory<T> {
    fn exec(&mut self, target: &mut T) {
        if self.copies_one_time() {
            let bytes = (self.access)(target);
            assert_eq!(bytes.len(), self.block.len(), "target size mismatch");
            self.block.copy_from_slice(bytes);
        }
        self.redo(target);
    }

    fn undo(&mut self, target: &mut T) {
        if self.copies_one_time() {
            self.target_bytes(target).copy_from_slice(&self.block);
        } else {
            self.exchange(target);
        }
        self.done = false;
    }

    fn redo(&mut self, target: &mut T) {
        if self.copies_one_time() {
            self.target_bytes(target).copy_from_slice(&self.assign);
        } else {
            self.exchange(target);
        }
        self.done = true;
    }
}
