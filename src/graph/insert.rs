//! Insertion, exact lookup, logical deletion, and bulk export.
//!
//! Insertion resolves `<bot name="X"/>` placeholders, builds the composite
//! path, and walks it from the root, creating edges on demand. Two details
//! carry the algorithm:
//!
//! - **Shortcut**: a `<THAT> * <TOPIC> *` tail never discriminates, and the
//!   large majority of rules ignore conversational context. With shortcuts
//!   enabled the category binds directly at the input-pattern node and the
//!   tail nodes are never materialized.
//! - **Height maintenance**: every node caches the minimum remaining-token
//!   count to its nearest descendant terminal. On the way back up the walk,
//!   each node takes `min(height, offset + child.height)`, with offset zero
//!   for the zero-width wildcards `#`/`^`. Search prunes on this value.

use tracing::debug;

use crate::api::MatchContext;
use crate::path::{Path, Token};
use crate::props::PropertySource;
use crate::{Category, GraphError};

use super::{GraphOptions, Graphmaster, NodeId};

/// The literal tail the shortcut optimization elides.
const SHORTCUT_TAIL: [Token; 4] = [Token::That, Token::Star, Token::Topic, Token::Star];

impl Graphmaster {
    /// Insert a category under its composite key. Re-inserting an identical
    /// key overwrites the previously bound category.
    ///
    /// Placeholder resolution is baked in here: later changes to a bot
    /// property do not re-index categories already inserted.
    pub fn add_category(
        &mut self,
        mut category: Category,
        ctx: &MatchContext<'_>,
    ) -> Result<(), GraphError> {
        let key = resolve_bot_properties(&category.input_that_topic(), ctx.properties);
        let path = Path::from_sentence(&key);
        path.validate_composite(&key)?;
        debug!(target: "graphmaster::insert", graph = %self.name(), key = %key, "add category");

        let tokens = path.tokens();
        let shortcut =
            self.options().contains(GraphOptions::SHORTCUTS) && tokens.ends_with(&SHORTCUT_TAIL);
        let walk = if shortcut { &tokens[..tokens.len() - 4] } else { tokens };

        // Walk down, creating edges on demand and remembering each edge's
        // offset for the height refresh on the way back up.
        let mut trail: Vec<(NodeId, usize)> = Vec::with_capacity(walk.len());
        let mut current = Self::ROOT;
        for token in walk {
            if let Token::Set(name) = token {
                self.node_mut(current).register_set(name);
            }
            let offset = match token {
                Token::Sharp | Token::Caret => 0,
                _ => 1,
            };
            let next = match self.node(current).children.get(token).copied() {
                Some(id) => id,
                None => {
                    let id = self.alloc();
                    self.node_mut(current).children.insert(token.clone(), id);
                    id
                }
            };
            trail.push((current, offset));
            current = next;
        }

        let sequence = self.take_sequence();
        category.set_sequence(sequence);
        let terminal = self.node_mut(current);
        if shortcut {
            terminal.shortcut = true;
            // The elided tail is four tokens long.
            terminal.height = terminal.height.min(4);
        } else {
            terminal.height = 0;
        }
        if terminal.category.replace(category).is_some() {
            debug!(target: "graphmaster::insert", key = %key, "overwrote existing category");
        }

        let mut child_height = self.node(current).height;
        for &(id, offset) in trail.iter().rev() {
            let node = self.node_mut(id);
            node.height = node.height.min(offset + child_height);
            child_height = node.height;
        }
        Ok(())
    }

    /// Exact, non-wildcard lookup of the node indexing an identical
    /// composite key. Returns interior or terminal nodes alike; a deleted
    /// terminal is still found (with no category bound).
    pub fn find_node(&self, pattern: &str, that: &str, topic: &str) -> Option<NodeId> {
        let key = Path::input_that_topic(pattern, that, topic);
        let path = Path::from_sentence(&key);

        let mut current = Self::ROOT;
        let mut rest = path.tokens();
        loop {
            if rest.is_empty() {
                return Some(current);
            }
            let node = self.node(current);
            if node.shortcut && rest == &SHORTCUT_TAIL[..] {
                return Some(current);
            }
            current = *node.children.get(&rest[0])?;
            rest = &rest[1..];
        }
    }

    /// Logically delete the category bound under an identical composite key.
    /// The node stays in the trie, reachable but unmatched. Returns whether
    /// a category was actually removed.
    pub fn delete_category(&mut self, pattern: &str, that: &str, topic: &str) -> bool {
        let Some(id) = self.find_node(pattern, that, topic) else {
            return false;
        };
        let removed = self.node_mut(id).category.take().is_some();
        if removed {
            debug!(
                target: "graphmaster::insert",
                graph = %self.name(),
                key = %Path::input_that_topic(pattern, that, topic),
                "deleted category"
            );
        }
        removed
    }

    /// Every bound category, ordered by insertion sequence.
    pub fn categories(&self) -> Vec<&Category> {
        let mut out: Vec<&Category> = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if let Some(category) = &node.category {
                out.push(category);
            }
            stack.extend(node.children.values().copied());
        }
        out.sort_by_key(|c| c.sequence());
        out
    }
}

/// Substitute `<bot name="X"/>` placeholders with the current property
/// values, upper-cased. An unresolved property becomes the empty string.
fn resolve_bot_properties(key: &str, properties: &dyn PropertySource) -> String {
    if !key.to_uppercase().contains("<BOT") {
        return key.to_string();
    }
    regex!(r#"(?i)<bot name="(.*?)"/>"#)
        .replace_all(key, |caps: &regex::Captures<'_>| {
            properties.get(&caps[1].to_lowercase()).unwrap_or("").to_uppercase()
        })
        .into_owned()
}
