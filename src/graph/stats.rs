//! Cold-traversal diagnostics.
//!
//! Everything here recomputes from a full walk of the trie on each call, so
//! the numbers stay honest regardless of any cached counters, and double as
//! a cross-check on the incremental bookkeeping insertion performs.

use std::collections::HashSet;

use crate::api::MatchContext;
use crate::path::Token;

use super::Graphmaster;

/// Snapshot of trie shape, produced by one full traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    /// Bound categories (deleted terminals excluded).
    pub categories: usize,
    pub nodes: usize,
    /// Childless non-shortcut terminals.
    pub leaves: usize,
    pub shortcuts: usize,
    /// Nodes with exactly one child.
    pub singletons: usize,
    /// Nodes with more than one child.
    pub nary: usize,
    /// Total child edges.
    pub branches: usize,
    pub average_branching: f32,
}

impl Graphmaster {
    pub fn node_stats(&self) -> NodeStats {
        let mut stats = NodeStats::default();
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            stats.nodes += 1;
            stats.branches += node.children.len();
            match node.children.len() {
                0 => {}
                1 => stats.singletons += 1,
                _ => stats.nary += 1,
            }
            if node.is_leaf() && !node.shortcut {
                stats.leaves += 1;
            }
            if node.shortcut {
                stats.shortcuts += 1;
            }
            if node.category.is_some() {
                stats.categories += 1;
            }
            stack.extend(node.children.values().copied());
        }
        if stats.nodes > 0 {
            stats.average_branching = stats.branches as f32 / stats.nodes as f32;
        }
        stats
    }

    /// Every literal word on an edge, plus every member of every set the
    /// trie references. Introspection only; matching never consults this.
    pub fn vocabulary(&self, ctx: &MatchContext<'_>) -> Vec<String> {
        let mut vocab: HashSet<String> = HashSet::new();
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            for (token, &child) in &node.children {
                match token {
                    Token::Word(word) | Token::Priority(word) => {
                        vocab.insert(word.clone());
                    }
                    Token::Set(name) => {
                        vocab.extend(ctx.sets.members(name));
                    }
                    _ => {}
                }
                stack.push(child);
            }
        }
        let mut vocab: Vec<String> = vocab.into_iter().collect();
        vocab.sort();
        vocab
    }

    /// Render the trie one terminal per line, each prefixed with the edge
    /// chain that reaches it. Children are visited in sorted edge order so
    /// the output is stable.
    pub fn render_graph(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![(Self::ROOT, String::new())];
        while let Some((id, partial)) = stack.pop() {
            let node = self.node(id);
            if let Some(category) = &node.category {
                let preview: String = category.template().chars().take(16).collect();
                let line = if node.shortcut {
                    format!(
                        "{partial}({}[{}])--<THAT>-->*-->(<TOPIC>)-->*--> {preview}...",
                        node.children.len(),
                        node.height
                    )
                } else {
                    format!("{partial}({}[{}]) {preview}...", node.children.len(), node.height)
                };
                out.push(line);
            }

            let mut edges: Vec<(&Token, &super::NodeId)> = node.children.iter().collect();
            edges.sort_by_key(|(token, _)| token.to_string());
            // Reverse so the stack pops edges in sorted order.
            for (token, &child) in edges.into_iter().rev() {
                let prefix = format!(
                    "{partial}({}[{}])--{token}-->",
                    node.children.len(),
                    node.height
                );
                stack.push((child, prefix));
            }
        }
        out
    }
}
