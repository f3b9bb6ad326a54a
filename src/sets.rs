//! Named word sets backing `<SET>NAME</SET>` pattern tokens.
//!
//! The graph consumes sets through the [`SetCatalog`] seam: membership tests
//! and the recorded maximum member length, which bounds how many tokens a set
//! wildcard will ever try to consume. [`WordSets`] is the in-memory
//! implementation used by tests and the debug CLI; production embedders can
//! supply their own catalog.
//!
//! Phrases are normalized to upper case with single spaces between words,
//! both on insertion and lookup. The `NUMBER` set is built in and matches any
//! run of digits.

use std::collections::{HashMap, HashSet};

/// Name of the built-in digits-only set.
pub(crate) const NATURAL_NUMBER_SET: &str = "number";

/// Membership and length queries used during set-wildcard resolution.
///
/// An unknown set name behaves as an empty set: `contains` is false and
/// `max_member_length` is zero, which stops the search from consuming any
/// candidate run at all.
pub trait SetCatalog {
    fn contains(&self, set_name: &str, phrase: &str) -> bool;

    /// Longest member of the set, in words. Bounds the candidate runs the
    /// search will test against `contains`.
    fn max_member_length(&self, set_name: &str) -> usize;

    /// Every member phrase, for vocabulary introspection. Not used by
    /// matching itself.
    fn members(&self, set_name: &str) -> Vec<String> {
        let _ = set_name;
        Vec::new()
    }
}

/// One named set of upper-cased member phrases.
#[derive(Debug, Clone, Default)]
pub struct WordSet {
    members: HashSet<String>,
    max_length: usize,
}

impl WordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, phrase: &str) {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        if words.is_empty() {
            return;
        }
        if words.len() > self.max_length {
            self.max_length = words.len();
        }
        self.members.insert(words.join(" ").to_uppercase());
    }

    pub fn contains(&self, phrase: &str) -> bool {
        self.members.contains(phrase)
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// In-memory catalog of named word sets. Set names are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct WordSets {
    sets: HashMap<String, WordSet>,
}

impl WordSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or extend) a set from an iterator of member phrases.
    pub fn define<'a>(&mut self, name: &str, members: impl IntoIterator<Item = &'a str>) {
        let set = self.sets.entry(name.to_lowercase()).or_default();
        for phrase in members {
            set.insert(phrase);
        }
    }

    pub fn insert(&mut self, name: &str, phrase: &str) {
        self.sets.entry(name.to_lowercase()).or_default().insert(phrase);
    }

    pub fn get(&self, name: &str) -> Option<&WordSet> {
        self.sets.get(&name.to_lowercase())
    }
}

impl SetCatalog for WordSets {
    fn contains(&self, set_name: &str, phrase: &str) -> bool {
        let name = set_name.to_lowercase();
        if name == NATURAL_NUMBER_SET {
            return regex!(r"^\d+$").is_match(phrase);
        }
        self.sets.get(&name).is_some_and(|set| set.contains(phrase))
    }

    fn max_member_length(&self, set_name: &str) -> usize {
        let name = set_name.to_lowercase();
        if name == NATURAL_NUMBER_SET {
            return 1;
        }
        self.sets.get(&name).map_or(0, WordSet::max_length)
    }

    fn members(&self, set_name: &str) -> Vec<String> {
        let mut members: Vec<String> = self
            .sets
            .get(&set_name.to_lowercase())
            .map(|set| set.members.iter().cloned().collect())
            .unwrap_or_default();
        members.sort();
        members
    }
}
