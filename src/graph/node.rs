//! Arena trie nodes.
//!
//! Nodes live in one `Vec` owned by the graph and refer to each other by
//! index, so the trie needs no interior mutability and no reference
//! counting. A node is a uniform token→child map; terminals additionally
//! carry their bound category. Nodes are created lazily on insertion and
//! never removed; logical deletion clears the category and leaves the node
//! reachable but unmatched.

use std::collections::HashMap;

use crate::path::Token;
use crate::{Category, MAX_GRAPH_HEIGHT};

/// Index of a node in the graph's arena. Stable for the lifetime of the
/// graph; nodes are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) children: HashMap<Token, NodeId>,
    pub(crate) category: Option<Category>,
    /// Cached minimum remaining-token-count to the nearest descendant
    /// terminal. `#`/`^` edges contribute zero, every other edge one.
    pub(crate) height: usize,
    pub(crate) shortcut: bool,
    /// Names of sets reachable as immediate `<SET>` children, in
    /// registration order (search tries them in this order).
    pub(crate) sets: Vec<String>,
}

impl Node {
    pub(crate) fn new() -> Self {
        Node {
            children: HashMap::new(),
            category: None,
            height: MAX_GRAPH_HEIGHT,
            shortcut: false,
            sets: Vec::new(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn register_set(&mut self, name: &str) {
        if !self.sets.iter().any(|s| s == name) {
            self.sets.push(name.to_string());
        }
    }
}
