extern crate self as graphmaster;

use std::sync::atomic::{AtomicU32, Ordering};

#[macro_use]
mod macros;
mod api;
mod error;
mod graph;
mod path;
mod props;
mod sets;

pub use api::MatchContext;
pub use error::GraphError;
pub use graph::{GraphOptions, Graphmaster, MatchResult, NodeId, NodeStats, StarBindings};
pub use path::{Path, Token};
pub use props::{Properties, PropertySource};
pub use sets::{SetCatalog, WordSet, WordSets};

// --- Limits ------------------------------------------------------------------

/// Star bindings past this index are dropped, never an error.
pub const MAX_STARS: usize = 1000;

/// Recursion ceiling for the priority search; exceeding it degrades to
/// "no match".
pub const MAX_SEARCH_DEPTH: usize = 765;

/// Longest composite key accepted, in tokens. Longer insertions are rejected,
/// longer queries simply fail to match. Kept comfortably under the recursion
/// ceiling so a capped query can never be mistaken for a capped search.
pub const MAX_PATH_LENGTH: usize = 256;

/// Sentinel height for a node with no terminal below it yet.
pub(crate) const MAX_GRAPH_HEIGHT: usize = 100_000;

// --- Category ----------------------------------------------------------------

/// One entry in the rule database: an input/that/topic pattern triple plus an
/// opaque response payload.
///
/// The matching core never interprets `template`; it only hands it back on a
/// successful match. Pattern strings are trimmed and upper-cased on
/// construction so that insertion and lookup agree on one canonical form.
#[derive(Debug)]
pub struct Category {
    pattern: String,
    that: String,
    topic: String,
    template: String,
    sequence: u32,
    activation: AtomicU32,
}

impl Category {
    pub fn new(
        pattern: impl AsRef<str>,
        that: impl AsRef<str>,
        topic: impl AsRef<str>,
        template: impl Into<String>,
    ) -> Self {
        Category {
            pattern: pattern.as_ref().trim().to_uppercase(),
            that: that.as_ref().trim().to_uppercase(),
            topic: topic.as_ref().trim().to_uppercase(),
            template: template.into(),
            sequence: 0,
            activation: AtomicU32::new(0),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn that(&self) -> &str {
        &self.that
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The opaque response payload bound to this category.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Insertion sequence number, assigned by the graph. Bulk export orders
    /// categories by this value.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Number of times this category has been returned by a search.
    pub fn activation_count(&self) -> u32 {
        self.activation.load(Ordering::Relaxed)
    }

    /// The composite key this category indexes under.
    pub fn input_that_topic(&self) -> String {
        Path::input_that_topic(&self.pattern, &self.that, &self.topic)
    }

    pub(crate) fn set_sequence(&mut self, sequence: u32) {
        self.sequence = sequence;
    }

    pub(crate) fn record_activation(&self) {
        self.activation.fetch_add(1, Ordering::Relaxed);
    }
}

impl Clone for Category {
    fn clone(&self) -> Self {
        Category {
            pattern: self.pattern.clone(),
            that: self.that.clone(),
            topic: self.topic.clone(),
            template: self.template.clone(),
            sequence: self.sequence,
            activation: AtomicU32::new(self.activation.load(Ordering::Relaxed)),
        }
    }
}
