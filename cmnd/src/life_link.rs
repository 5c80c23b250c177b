//! Liveness links between domain objects and history entries.
//!
//! A domain object that can disappear while history still references it owns
//! a [`LifeLink`]. Anything that must not outlive the object holds a
//! [`LifeLinkNode`] and asks [`is_linking`](LifeLinkNode::is_linking) before
//! acting. A node never keeps the object alive.

use std::sync::{Arc, Weak};

/// Owner side of a liveness link. Dropping it unlinks every node.
#[derive(Debug, Default)]
pub struct LifeLink {
    alive: Arc<()>,
}

impl LifeLink {
    /// Creates a new live link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node observing this link.
    pub fn node(&self) -> LifeLinkNode {
        LifeLinkNode {
            link: Some(Arc::downgrade(&self.alive)),
        }
    }

    /// Number of nodes that still observe this link.
    pub fn node_count(&self) -> usize {
        Arc::weak_count(&self.alive)
    }
}

/// Observer side of a liveness link.
///
/// A default node is not linked to anything.
#[derive(Debug, Clone, Default)]
pub struct LifeLinkNode {
    link: Option<Weak<()>>,
}

impl LifeLinkNode {
    /// Returns `true` while the owning [`LifeLink`] is alive.
    pub fn is_linking(&self) -> bool {
        self.link.as_ref().is_some_and(|link| link.strong_count() > 0)
    }

    /// Re-targets the node at another link.
    pub fn link(&mut self, link: &LifeLink) {
        *self = link.node();
    }

    /// Detaches the node.
    pub fn unlink(&mut self) {
        self.link = None;
    }
}
