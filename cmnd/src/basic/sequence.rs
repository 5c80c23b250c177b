//! Commands that edit ordered containers.
//!
//! All of them go through the [`Sequence`] trait, which is implemented for
//! `Vec` and `VecDeque` and can be implemented for tree child lists. Removed
//! elements are owned by the command while the removal is applied.

use std::collections::VecDeque;
use std::fmt;

use crate::command::{Accessor, Editable, Stable};

/// An ordered container the sequence commands can edit.
pub trait Sequence {
    type Item;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Self::Item>;

    fn push_back(&mut self, item: Self::Item);

    fn pop_back(&mut self) -> Option<Self::Item>;

    /// Inserts at `index`, shifting later elements. `index == len` appends.
    fn insert(&mut self, index: usize, item: Self::Item);

    fn remove(&mut self, index: usize) -> Option<Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first element equal to `item`.
    fn position_of(&self, item: &Self::Item) -> Option<usize>
    where
        Self::Item: PartialEq,
    {
        (0..self.len()).find(|&index| self.get(index) == Some(item))
    }
}

impl<V> Sequence for Vec<V> {
    type Item = V;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&V> {
        self.as_slice().get(index)
    }

    fn push_back(&mut self, item: V) {
        self.push(item);
    }

    fn pop_back(&mut self) -> Option<V> {
        self.pop()
    }

    fn insert(&mut self, index: usize, item: V) {
        Vec::insert(self, index, item);
    }

    fn remove(&mut self, index: usize) -> Option<V> {
        (index < Vec::len(self)).then(|| Vec::remove(self, index))
    }
}

impl<V> Sequence for VecDeque<V> {
    type Item = V;

    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn get(&self, index: usize) -> Option<&V> {
        VecDeque::get(self, index)
    }

    fn push_back(&mut self, item: V) {
        VecDeque::push_back(self, item);
    }

    fn pop_back(&mut self) -> Option<V> {
        VecDeque::pop_back(self)
    }

    fn insert(&mut self, index: usize, item: V) {
        VecDeque::insert(self, index, item);
    }

    fn remove(&mut self, index: usize) -> Option<V> {
        VecDeque::remove(self, index)
    }
}

/// Appends an element.
pub struct PushBack<T, S: Sequence> {
    access: Accessor<T, S>,
    held: Option<S::Item>,
}

impl<T, S> PushBack<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    pub fn new<F>(access: F, item: S::Item) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
            held: Some(item),
        }
    }
}

impl<T, S: Sequence> fmt::Debug for PushBack<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushBack")
            .field("applied", &self.held.is_none())
            .finish_non_exhaustive()
    }
}

impl<T, S> Stable<T> for PushBack<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    fn undo(&mut self, target: &mut T) {
        self.held = (self.access)(target).pop_back();
        assert!(self.held.is_some(), "pushed element is gone");
    }

    fn redo(&mut self, target: &mut T) {
        let Some(item) = self.held.take() else {
            panic!("element is already in the sequence");
        };
        (self.access)(target).push_back(item);
    }
}

/// Removes the last element.
pub struct PopBack<T, S: Sequence> {
    access: Accessor<T, S>,
    held: Option<S::Item>,
}

impl<T, S> PopBack<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    pub fn new<F>(access: F) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
            held: None,
        }
    }

    /// The popped element while the pop is applied.
    pub fn popped(&self) -> Option<&S::Item> {
        self.held.as_ref()
    }
}

impl<T, S: Sequence> fmt::Debug for PopBack<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopBack")
            .field("applied", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, S> Stable<T> for PopBack<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    fn undo(&mut self, target: &mut T) {
        let Some(item) = self.held.take() else {
            panic!("nothing was popped");
        };
        (self.access)(target).push_back(item);
    }

    fn redo(&mut self, target: &mut T) {
        self.held = (self.access)(target).pop_back();
        assert!(self.held.is_some(), "pop from an empty sequence");
    }
}

/// Inserts an element at a fixed index.
pub struct Insert<T, S: Sequence> {
    access: Accessor<T, S>,
    index: usize,
    held: Option<S::Item>,
}

impl<T, S> Insert<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    pub fn new<F>(access: F, index: usize, item: S::Item) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
            index,
            held: Some(item),
        }
    }
}

impl<T, S: Sequence> fmt::Debug for Insert<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Insert")
            .field("index", &self.index)
            .field("applied", &self.held.is_none())
            .finish_non_exhaustive()
    }
}

impl<T, S> Stable<T> for Insert<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    fn undo(&mut self, target: &mut T) {
        self.held = (self.access)(target).remove(self.index);
        assert!(self.held.is_some(), "inserted element is gone");
    }

    fn redo(&mut self, target: &mut T) {
        let Some(item) = self.held.take() else {
            panic!("element is already in the sequence");
        };
        let sequence = (self.access)(target);
        assert!(self.index <= sequence.len(), "insert index out of range");
        sequence.insert(self.index, item);
    }
}

/// Removes the element at a fixed index.
pub struct Remove<T, S: Sequence> {
    access: Accessor<T, S>,
    index: usize,
    held: Option<S::Item>,
}

impl<T, S> Remove<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    pub fn new<F>(access: F, index: usize) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
            index,
            held: None,
        }
    }

    /// The removed element while the removal is applied.
    pub fn removed(&self) -> Option<&S::Item> {
        self.held.as_ref()
    }
}

impl<T, S: Sequence> fmt::Debug for Remove<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Remove")
            .field("index", &self.index)
            .field("applied", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, S> Stable<T> for Remove<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: Send,
{
    fn undo(&mut self, target: &mut T) {
        let Some(item) = self.held.take() else {
            panic!("nothing was removed");
        };
        (self.access)(target).insert(self.index, item);
    }

    fn redo(&mut self, target: &mut T) {
        self.held = (self.access)(target).remove(self.index);
        assert!(self.held.is_some(), "remove index out of range");
    }
}

/// Removes the first element equal to a given value.
///
/// The index is looked up once on first execution and reused afterwards.
pub struct RemoveByValue<T, S: Sequence> {
    access: Accessor<T, S>,
    value: S::Item,
    index: Option<usize>,
    held: Option<S::Item>,
}

impl<T, S> RemoveByValue<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: PartialEq + Send,
{
    pub fn new<F>(access: F, value: S::Item) -> Self
    where
        F: Fn(&mut T) -> &mut S + Send + 'static,
    {
        Self {
            access: Box::new(access),
            value,
            index: None,
            held: None,
        }
    }

    /// Where the value was found.
    pub fn index(&self) -> Option<usize> {
        self.index
    }
}

impl<T, S: Sequence> fmt::Debug for RemoveByValue<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoveByValue")
            .field("index", &self.index)
            .field("applied", &self.held.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, S> Stable<T> for RemoveByValue<T, S>
where
    T: Editable,
    S: Sequence + 'static,
    S::Item: PartialEq + Send,
{
    fn exec(&mut self, target: &mut T) {
        let index = (self.access)(target).position_of(&self.value);
        assert!(index.is_some(), "value to remove is not in the sequence");
        self.index = index;
        self.redo(target);
    }

    fn undo(&mut self, target: &mut T) {
        let (Some(index), Some(item)) = (self.index, self.held.take()) else {
            panic!("nothing was removed");
        };
        (self.access)(target).insert(index, item);
    }

    fn redo(&mut self, target: &mut T) {
        let Some(index) = self.index else {
            panic!("value was never located");
        };
        self.held = (self.access)(target).remove(index);
        assert!(
            self.held.as_ref() == Some(&self.value),
            "sequence changed under a recorded removal"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Tree {
        children: Vec<&'static str>,
        queue: VecDeque<u32>,
    }

    impl Editable for Tree {}

    fn children(tree: &mut Tree) -> &mut Vec<&'static str> {
        &mut tree.children
    }

    fn queue(tree: &mut Tree) -> &mut VecDeque<u32> {
        &mut tree.queue
    }

    #[test]
    fn push_back_round_trip() {
        let mut tree = Tree::default();
        let mut command = PushBack::new(children, "arm");
        command.exec(&mut tree);
        assert_eq!(tree.children, vec!["arm"]);
        command.undo(&mut tree);
        assert!(tree.children.is_empty());
        command.redo(&mut tree);
        assert_eq!(tree.children, vec!["arm"]);
    }

    #[test]
    fn pop_back_keeps_element() {
        let mut tree = Tree {
            queue: VecDeque::from([1, 2, 3]),
            ..Tree::default()
        };
        let mut command = PopBack::new(queue);
        command.exec(&mut tree);
        assert_eq!(tree.queue, VecDeque::from([1, 2]));
        assert_eq!(command.popped(), Some(&3));
        command.undo(&mut tree);
        assert_eq!(tree.queue, VecDeque::from([1, 2, 3]));
    }

    #[test]
    fn insert_and_remove_at_index() {
        let mut tree = Tree {
            children: vec!["root", "leg"],
            ..Tree::default()
        };
        let mut insert = Insert::new(children, 1, "arm");
        insert.exec(&mut tree);
        assert_eq!(tree.children, vec!["root", "arm", "leg"]);

        let mut remove = Remove::new(children, 0);
        remove.exec(&mut tree);
        assert_eq!(tree.children, vec!["arm", "leg"]);
        assert_eq!(remove.removed(), Some(&"root"));

        remove.undo(&mut tree);
        insert.undo(&mut tree);
        assert_eq!(tree.children, vec!["root", "leg"]);
    }

    #[test]
    fn remove_by_value_remembers_position() {
        let mut tree = Tree {
            queue: VecDeque::from([4, 8, 15, 8]),
            ..Tree::default()
        };
        let mut command = RemoveByValue::new(queue, 8);
        command.exec(&mut tree);
        assert_eq!(command.index(), Some(1));
        assert_eq!(tree.queue, VecDeque::from([4, 15, 8]));

        command.undo(&mut tree);
        assert_eq!(tree.queue, VecDeque::from([4, 8, 15, 8]));
        command.redo(&mut tree);
        assert_eq!(tree.queue, VecDeque::from([4, 15, 8]));
    }

    #[test]
    #[should_panic(expected = "not in the sequence")]
    fn remove_missing_value_is_fatal() {
        let mut tree = Tree::default();
        RemoveByValue::new(children, "tail").exec(&mut tree);
    }

    #[test]
    #[should_panic(expected = "empty sequence")]
    fn pop_empty_is_fatal() {
        let mut tree = Tree::default();
        PopBack::new(children).exec(&mut tree);
    }

    struct Rig {
        root: Node,
    }

    impl Editable for Rig {}

    struct Node {
        name: &'static str,
        children: Vec<Box<Node>>,
        drops: Arc<AtomicUsize>,
    }

    impl Node {
        fn new(name: &'static str, drops: &Arc<AtomicUsize>) -> Self {
            Self {
                name,
                children: Vec::new(),
                drops: Arc::clone(drops),
            }
        }
    }

    impl PartialEq for Node {
        fn eq(&self, other: &Self) -> bool {
            self.name == other.name
        }
    }

    impl Drop for Node {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn rig(drops: &Arc<AtomicUsize>) -> Rig {
        let mut spine = Node::new("spine", drops);
        spine.children.push(Box::new(Node::new("neck", drops)));
        let mut root = Node::new("root", drops);
        root.children.push(Box::new(spine));
        Rig { root }
    }

    fn spine_children(rig: &mut Rig) -> &mut Vec<Box<Node>> {
        &mut rig.root.children[0].children
    }

    fn names(nodes: &[Box<Node>]) -> Vec<&'static str> {
        nodes.iter().map(|node| node.name).collect()
    }

    #[test]
    fn nested_tree_insert_and_remove() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut rig = rig(&drops);

        let mut insert = Insert::new(spine_children, 0, Box::new(Node::new("arm", &drops)));
        insert.exec(&mut rig);
        assert_eq!(names(&rig.root.children[0].children), vec!["arm", "neck"]);

        let mut remove = RemoveByValue::new(spine_children, Box::new(Node::new("neck", &drops)));
        remove.exec(&mut rig);
        assert_eq!(remove.index(), Some(1));
        assert_eq!(names(&rig.root.children[0].children), vec!["arm"]);

        remove.undo(&mut rig);
        insert.undo(&mut rig);
        assert_eq!(names(&rig.root.children[0].children), vec!["neck"]);
        assert_eq!(drops.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn undone_tree_insert_drops_node_with_command() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut rig = rig(&drops);

        let mut arm = Node::new("arm", &drops);
        arm.children.push(Box::new(Node::new("hand", &drops)));
        let mut command = PushBack::new(spine_children, Box::new(arm));
        command.exec(&mut rig);
        command.undo(&mut rig);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(command);
        // The node and its own child.
        assert_eq!(drops.load(Ordering::SeqCst), 2);
        assert_eq!(names(&rig.root.children[0].children), vec!["neck"]);
    }

    #[test]
    fn applied_tree_removal_drops_subtree_with_command() {
        let drops = Arc::new(AtomicUsize::new(0));
        let mut rig = rig(&drops);

        let mut command = Remove::new(|r: &mut Rig| &mut r.root.children, 0);
        command.exec(&mut rig);
        assert!(rig.root.children.is_empty());
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(command);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }
}
