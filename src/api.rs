//! Collaborator context for insertion and search.
//!
//! The graph itself owns only the trie; set membership and bot properties
//! live outside it and are borrowed per call through [`MatchContext`]. This
//! keeps the core free of any loading or session concerns and makes the two
//! seams explicit:
//!
//! ```text
//! add_category(cat, &ctx)  ── resolves <bot name="X"/> via ctx.properties
//! matches(i, t, p, &ctx)   ── set runs via ctx.sets, null-star via ctx.properties
//! ```

use once_cell::sync::Lazy;

use crate::props::{Properties, PropertySource};
use crate::sets::{SetCatalog, WordSets};

static EMPTY_SETS: Lazy<WordSets> = Lazy::new(WordSets::new);
static EMPTY_PROPERTIES: Lazy<Properties> = Lazy::new(Properties::new);

/// Borrowed collaborators for one insertion or search call.
#[derive(Clone, Copy)]
pub struct MatchContext<'a> {
    pub sets: &'a dyn SetCatalog,
    pub properties: &'a dyn PropertySource,
}

impl<'a> MatchContext<'a> {
    pub fn new(sets: &'a dyn SetCatalog, properties: &'a dyn PropertySource) -> Self {
        MatchContext { sets, properties }
    }
}

impl MatchContext<'static> {
    /// A context with no sets and no properties. Handy for graphs whose
    /// patterns use neither.
    ///
    /// # Example
    /// ```
    /// use graphmaster::{Graphmaster, MatchContext, category};
    ///
    /// let ctx = MatchContext::empty();
    /// let mut graph = Graphmaster::new("brain");
    /// graph.add_category(category!("HELLO *" => "Hi there!"), &ctx).unwrap();
    ///
    /// let hit = graph.matches("hello world", "*", "*", &ctx).unwrap().unwrap();
    /// assert_eq!(hit.category.template(), "Hi there!");
    /// assert_eq!(hit.stars.input_stars, vec!["WORLD"]);
    /// ```
    pub fn empty() -> Self {
        MatchContext { sets: &*EMPTY_SETS, properties: &*EMPTY_PROPERTIES }
    }
}
