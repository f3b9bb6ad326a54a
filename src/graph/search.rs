//! Priority-ordered depth-first search.
//!
//! Search walks the trie against the composite query path, trying branches
//! at each node in a fixed order; the first branch that leads to an overall
//! success wins. There is no scoring: the order *is* the ranking.
//!
//! ```text
//! 1. end of path at a bound leaf
//! 2. height pruning (fail fast, never changes the outcome)
//! 3. $WORD        exact literal, above every wildcard
//! 4. #            zero or more words (zero-width case first)
//! 5. _            one or more words
//! 6. WORD         exact literal
//! 7. <SET>NAME</SET>  shortest successful run within the set's max length
//! 8. shortcut     elided <THAT> * <TOPIC> * tail
//! 9. ^            zero or more words, low priority
//! 10. *           one or more words, lowest priority
//! ```
//!
//! Wildcard and set runs never consume a `<THAT>`/`<TOPIC>` separator, and
//! crossing a separator resets the star index for the next segment. Failure
//! at every branch propagates to the caller frame, which tries its own next
//! branch. Plain backtracking, no memoization.
//!
//! Star bindings are collected on the success unwind: each frame pushes its
//! own capture onto the returned hit, so abandoned branches can never leak
//! bindings into the result.

use std::cell::Cell;

use tracing::{debug, trace, warn};

use crate::api::MatchContext;
use crate::path::{Path, Token, tokens_to_sentence};
use crate::props::NULL_STAR_PROPERTY;
use crate::{Category, GraphError, MAX_SEARCH_DEPTH, MAX_STARS};

use super::{GraphOptions, Graphmaster, NodeId};

/// Token runs captured by wildcards and sets, indexed per segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarBindings {
    pub input_stars: Vec<String>,
    pub that_stars: Vec<String>,
    pub topic_stars: Vec<String>,
}

/// A successful search: the bound category plus its star bindings.
#[derive(Debug)]
pub struct MatchResult<'a> {
    pub category: &'a Category,
    pub node: NodeId,
    pub stars: StarBindings,
}

/// Which of the three independently-wildcarded segments the search is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Input,
    That,
    Topic,
}

#[derive(Debug)]
struct Capture {
    segment: Segment,
    index: usize,
    text: String,
}

/// Internal success value; captures accumulate as the stack unwinds.
#[derive(Debug)]
struct Hit {
    node: NodeId,
    captures: Vec<Capture>,
}

impl Hit {
    fn at(node: NodeId) -> Self {
        Hit { node, captures: Vec::new() }
    }
}

impl Graphmaster {
    /// Find the best-matching category for an (input, that, topic) triple.
    ///
    /// Returns `Ok(None)` when nothing matches, including when a resource
    /// cap (recursion depth, query length) forces the search to give up.
    /// A structurally malformed key errors instead of silently missing.
    pub fn matches(
        &self,
        input: &str,
        that: &str,
        topic: &str,
        ctx: &MatchContext<'_>,
    ) -> Result<Option<MatchResult<'_>>, GraphError> {
        let key = Path::input_that_topic(input, that, topic);
        let path = match Path::composite(input, that, topic) {
            Ok(path) => path,
            Err(GraphError::PathTooLong { length, limit }) => {
                warn!(
                    target: "graphmaster::search",
                    length, limit, "query over the token limit, reporting no match"
                );
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let searcher = Searcher {
            graph: self,
            ctx,
            pruning: self.options().contains(GraphOptions::PRUNING),
            exhausted: Cell::new(false),
        };
        let hit = searcher.search(path.tokens(), Self::ROOT, Segment::Input, 0, 0);

        if let Some(hit) = hit {
            if let Some(category) = self.node(hit.node).category.as_ref() {
                if self.options().contains(GraphOptions::COUNT_MATCHES) {
                    category.record_activation();
                }
                debug!(
                    target: "graphmaster::search",
                    graph = %self.name(),
                    key = %key,
                    matched = %category.input_that_topic(),
                    "matched"
                );
                return Ok(Some(MatchResult {
                    category,
                    node: hit.node,
                    stars: assemble(hit.captures),
                }));
            }
        }

        if searcher.exhausted.get() {
            warn!(
                target: "graphmaster::search",
                key = %key,
                "search hit the recursion cap; reporting no match"
            );
        } else {
            debug!(target: "graphmaster::search", graph = %self.name(), key = %key, "no match");
        }
        Ok(None)
    }
}

/// Sort captures into the three indexed star arrays. Indices on the success
/// path are contiguous per segment; anything past the binding cap was
/// already dropped at capture time.
fn assemble(mut captures: Vec<Capture>) -> StarBindings {
    captures.sort_by_key(|c| c.index);
    let mut stars = StarBindings::default();
    for segment in [Segment::Input, Segment::That, Segment::Topic] {
        let out = match segment {
            Segment::Input => &mut stars.input_stars,
            Segment::That => &mut stars.that_stars,
            Segment::Topic => &mut stars.topic_stars,
        };
        let mut expected = 0;
        for cap in captures.iter().filter(|c| c.segment == segment) {
            if cap.index == expected {
                out.push(cap.text.clone());
                expected += 1;
            }
        }
    }
    stars
}

struct Searcher<'g, 'c> {
    graph: &'g Graphmaster,
    ctx: &'c MatchContext<'c>,
    pruning: bool,
    exhausted: Cell<bool>,
}

impl Searcher<'_, '_> {
    fn search(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        if depth >= MAX_SEARCH_DEPTH {
            self.exhausted.set(true);
            return None;
        }

        let n = self.graph.node(node);

        // End of path: only a bound leaf is a match.
        if path.is_empty() {
            return (n.is_leaf() && n.category.is_some()).then(|| Hit::at(node));
        }

        // Doomed subtree: fewer tokens remain than any terminal below needs.
        if self.pruning && path.len() < n.height {
            return None;
        }

        self.dollar_match(path, node, segment, star_index, depth)
            .or_else(|| self.sharp_match(path, node, segment, star_index, depth))
            .or_else(|| self.under_match(path, node, segment, star_index, depth))
            .or_else(|| self.word_match(path, node, segment, star_index, depth))
            .or_else(|| self.set_match(path, node, segment, star_index, depth))
            .or_else(|| self.shortcut_match(path, node))
            .or_else(|| self.caret_match(path, node, segment, star_index, depth))
            .or_else(|| self.star_match(path, node, segment, star_index, depth))
    }

    /// `$WORD`: exact literal lookup ahead of every wildcard tier.
    fn dollar_match(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        let Token::Word(word) = &path[0] else { return None };
        let child = *self.graph.node(node).children.get(&Token::Priority(word.clone()))?;
        self.search(&path[1..], child, segment, star_index, depth + 1)
    }

    fn sharp_match(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        self.zero_match(Token::Sharp, path, node, segment, star_index, depth)
            .or_else(|| self.wild_match(Token::Sharp, path, node, segment, star_index, depth))
    }

    fn under_match(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        self.wild_match(Token::Underscore, path, node, segment, star_index, depth)
    }

    /// Exact token lookup; crossing a separator starts the next segment and
    /// resets the star index.
    fn word_match(
        &self,
        path: &[Token],
        node: NodeId,
        mut segment: Segment,
        mut star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        let token = &path[0];
        match token {
            Token::That => {
                segment = Segment::That;
                star_index = 0;
            }
            Token::Topic => {
                segment = Segment::Topic;
                star_index = 0;
            }
            _ => {}
        }
        let child = *self.graph.node(node).children.get(token)?;
        self.search(&path[1..], child, segment, star_index, depth + 1)
    }

    /// `<SET>NAME</SET>`: candidate runs from shortest to longest, bounded
    /// by the set's recorded maximum member length. The first run that is a
    /// member *and* whose continuation succeeds wins.
    fn set_match(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        let n = self.graph.node(node);
        if n.sets.is_empty() || path[0].is_separator() {
            return None;
        }

        for name in &n.sets {
            let Some(&child) = n.children.get(&Token::Set(name.clone())) else {
                continue;
            };
            let max_run = self.ctx.sets.max_member_length(name);

            let mut star_words = path[0].to_string();
            let mut consumed = &path[0];
            let mut rest = &path[1..];
            let mut run_len = 1;
            while !rest.is_empty() && !consumed.is_separator() && run_len <= max_run {
                if self.ctx.sets.contains(name, &star_words) {
                    trace!(target: "graphmaster::search", set = %name, run = %star_words, "set member, trying continuation");
                    if let Some(mut hit) =
                        self.search(rest, child, segment, star_index + 1, depth + 1)
                    {
                        push_capture(&mut hit, segment, star_index, star_words);
                        return Some(hit);
                    }
                }
                run_len += 1;
                consumed = &rest[0];
                star_words.push(' ');
                star_words.push_str(&consumed.to_string());
                rest = &rest[1..];
            }
        }
        None
    }

    /// Shortcut leaf: the remaining path is `<THAT> rest1 <TOPIC> rest2` and
    /// the elided tail matches it unconditionally, binding rest1/rest2
    /// verbatim.
    fn shortcut_match(&self, path: &[Token], node: NodeId) -> Option<Hit> {
        let n = self.graph.node(node);
        if !n.shortcut || path[0] != Token::That || n.category.is_none() {
            return None;
        }
        let topic_at = path.iter().position(|t| *t == Token::Topic)?;

        let mut hit = Hit::at(node);
        push_capture(&mut hit, Segment::That, 0, tokens_to_sentence(&path[1..topic_at]));
        push_capture(&mut hit, Segment::Topic, 0, tokens_to_sentence(&path[topic_at + 1..]));
        Some(hit)
    }

    fn caret_match(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        self.zero_match(Token::Caret, path, node, segment, star_index, depth)
            .or_else(|| self.wild_match(Token::Caret, path, node, segment, star_index, depth))
    }

    fn star_match(
        &self,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        self.wild_match(Token::Star, path, node, segment, star_index, depth)
    }

    /// Zero-width case of `#`/`^`: consume nothing, bind the configured
    /// null-star text, continue below the wildcard edge.
    fn zero_match(
        &self,
        wildcard: Token,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        let child = *self.graph.node(node).children.get(&wildcard)?;
        let mut hit = self.search(path, child, segment, star_index + 1, depth + 1)?;
        let null_star = self.ctx.properties.get(NULL_STAR_PROPERTY).unwrap_or("").to_string();
        push_capture(&mut hit, segment, star_index, null_star);
        Some(hit)
    }

    /// One-or-more case shared by `#`, `_`, `^` and `*`: consume words one
    /// at a time, trying the continuation after each, and stop at segment
    /// separators.
    fn wild_match(
        &self,
        wildcard: Token,
        path: &[Token],
        node: NodeId,
        segment: Segment,
        star_index: usize,
        depth: usize,
    ) -> Option<Hit> {
        if path[0].is_separator() {
            return None;
        }
        let child = *self.graph.node(node).children.get(&wildcard)?;
        let next = self.graph.node(child);

        // A bare terminal below the wildcard swallows the whole remainder.
        if next.is_leaf() && !next.shortcut {
            if next.category.is_some() {
                let mut hit = Hit::at(child);
                push_capture(&mut hit, segment, star_index, tokens_to_sentence(path));
                return Some(hit);
            }
            // Logically deleted terminal: reachable but unmatched.
            return None;
        }

        let mut star_words = path[0].to_string();
        let mut consumed = &path[0];
        let mut rest = &path[1..];
        while !rest.is_empty() && !consumed.is_separator() {
            if let Some(mut hit) = self.search(rest, child, segment, star_index + 1, depth + 1) {
                push_capture(&mut hit, segment, star_index, star_words);
                return Some(hit);
            }
            consumed = &rest[0];
            star_words.push(' ');
            star_words.push_str(&consumed.to_string());
            rest = &rest[1..];
        }
        trace!(target: "graphmaster::search", wildcard = %wildcard, "wildcard run exhausted");
        None
    }
}

/// Record a capture on the success unwind; indices past the cap are dropped.
fn push_capture(hit: &mut Hit, segment: Segment, index: usize, text: String) {
    if index < MAX_STARS {
        hit.captures.push(Capture { segment, index, text: text.trim().to_string() });
    }
}
