//! The pattern graph: indexing trie plus priority search.
//!
//! This module is the operational core of the crate. A `Graphmaster` owns an
//! arena of trie nodes keyed by [`Token`] edges; categories bind to terminal
//! nodes; search walks the trie depth-first in a fixed wildcard priority
//! order.
//!
//! ## How the parts work together
//!
//! ```text
//! Category ── add_category            (insert.rs)
//!               - resolve <bot .../> placeholders
//!               - build + validate composite path
//!               - shortcut detection (<THAT> * <TOPIC> * tail)
//!               - create edges, update cached heights
//!                         │
//!                         v
//!                   trie arena  (node.rs)
//!                         │
//! (input, that, topic) ── matches    (search.rs)
//!               - depth-first priority search with backtracking
//!               - height pruning, boundary-aware wildcard runs
//!               - star bindings assembled on the success unwind
//!                         │
//!                         v
//!                   MatchResult { category, stars }
//! ```
//!
//! Diagnostics (`node_stats`, `vocabulary`, `render_graph`) live in
//! `stats.rs` and always recompute from a cold traversal.
//!
//! ## Responsibilities by module
//!
//! - `node.rs`: the arena node: token→child map, bound category, cached
//!   height, shortcut flag, registered set names.
//! - `insert.rs`: insertion, exact lookup (`find_node`), logical deletion,
//!   bulk export.
//! - `search.rs`: the recursive priority search and star binding collection.
//! - `stats.rs`: cold-traversal statistics, vocabulary, graph rendering.
//!
//! ## Debugging
//!
//! The crate logs through `tracing`: insertions and search outcomes at
//! `debug`, failed branches at `trace`. Run the `graphmaster` binary with
//! `RUST_LOG=graphmaster=trace` to watch a search backtrack.

#[path = "graph/insert.rs"]
mod insert;
#[path = "graph/node.rs"]
mod node;
#[path = "graph/search.rs"]
mod search;
#[path = "graph/stats.rs"]
mod stats;

#[cfg(test)]
#[path = "graph/tests.rs"]
mod tests;

pub use node::NodeId;
pub use search::{MatchResult, StarBindings};
pub use stats::NodeStats;

use crate::Category;
use node::Node;

bitflags::bitflags! {
    /// Behavior switches for a graph instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct GraphOptions: u32 {
        /// Collapse `<THAT> * <TOPIC> *` tails to a direct terminal binding.
        const SHORTCUTS     = 1 << 0;
        /// Prune subtrees whose cached height exceeds the remaining path.
        /// Never changes results, only skips doomed descents.
        const PRUNING       = 1 << 1;
        /// Count activations on matched categories.
        const COUNT_MATCHES = 1 << 2;
    }
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::all()
    }
}

/// The rule database: a shared-prefix trie over composite keys with a
/// deterministic, wildcard-aware priority search.
///
/// Mutation (insertion, deletion) takes `&mut self`; search takes `&self`
/// and is structurally read-only, so shared readers are safe once loading
/// has finished.
#[derive(Debug)]
pub struct Graphmaster {
    name: String,
    options: GraphOptions,
    nodes: Vec<Node>,
    next_sequence: u32,
}

impl Graphmaster {
    pub(crate) const ROOT: NodeId = NodeId(0);

    pub fn new(name: impl Into<String>) -> Self {
        Self::with_options(name, GraphOptions::default())
    }

    pub fn with_options(name: impl Into<String>, options: GraphOptions) -> Self {
        Graphmaster {
            name: name.into(),
            options,
            nodes: vec![Node::new()],
            next_sequence: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// The category bound at `id`, if any. `None` for interior nodes and for
    /// logically deleted terminals.
    pub fn category_at(&self, id: NodeId) -> Option<&Category> {
        self.node(id).category.as_ref()
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn alloc(&mut self) -> NodeId {
        self.nodes.push(Node::new());
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn take_sequence(&mut self) -> u32 {
        let seq = self.next_sequence;
        self.next_sequence += 1;
        seq
    }
}
