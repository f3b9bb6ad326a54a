use crate::{
    Category, GraphError, GraphOptions, Graphmaster, MatchContext, Properties, StarBindings,
    WordSets, category,
};

fn graph_with(categories: Vec<Category>) -> Graphmaster {
    graph_with_options(categories, GraphOptions::default())
}

fn graph_with_options(categories: Vec<Category>, options: GraphOptions) -> Graphmaster {
    let ctx = MatchContext::empty();
    let mut graph = Graphmaster::with_options("test", options);
    for category in categories {
        graph.add_category(category, &ctx).unwrap();
    }
    graph
}

/// Template of the matching category, or `None`.
fn matched(
    graph: &Graphmaster,
    input: &str,
    that: &str,
    topic: &str,
    ctx: &MatchContext<'_>,
) -> Option<String> {
    graph.matches(input, that, topic, ctx).unwrap().map(|hit| hit.category.template().to_string())
}

// --- Concrete scenarios ------------------------------------------------------

#[test]
fn wildcard_vs_exact_priority_scenario() {
    let graph = graph_with(vec![
        category!("I LIKE *" => "c1"),
        category!("I LIKE MANGO" => "c2"),
        category!("* LIKE *" => "c3"),
    ]);
    let ctx = MatchContext::empty();

    assert_eq!(matched(&graph, "I LIKE MANGO", "HELLO", "GREETING", &ctx), Some("c2".into()));
    assert_eq!(matched(&graph, "I LIKE PEACHES", "HELLO", "GREETING", &ctx), Some("c1".into()));
    assert_eq!(matched(&graph, "YOU LIKE MANGO", "HELLO", "GREETING", &ctx), Some("c3".into()));
}

#[test]
fn set_membership_scenario() {
    let mut sets = WordSets::new();
    sets.define("fruit", ["APPLE", "MANGO", "ORANGE"]);
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("I LIKE <SET>FRUIT</SET>" => "yum"), &ctx).unwrap();

    let hit = graph.matches("I LIKE MANGO", "X", "Y", &ctx).unwrap().unwrap();
    assert_eq!(hit.category.template(), "yum");
    assert_eq!(hit.stars.input_stars, vec!["MANGO"]);

    assert_eq!(matched(&graph, "I LIKE ROCKS", "X", "Y", &ctx), None);
}

#[test]
fn malformed_keys_error_instead_of_missing() {
    let ctx = MatchContext::empty();
    let mut graph = Graphmaster::new("test");

    // A pattern smuggling its own separator duplicates it in the composite.
    let err = graph.add_category(category!("FOO <TOPIC> BAR" => "x"), &ctx).unwrap_err();
    assert!(matches!(err, GraphError::MalformedKey { .. }));

    graph.add_category(category!("* " => "fallback"), &ctx).unwrap();
    let err = graph.matches("FOO <THAT> BAR", "X", "Y", &ctx).unwrap_err();
    assert!(matches!(err, GraphError::MalformedKey { .. }));
}

// --- Insertion ---------------------------------------------------------------

#[test]
fn reinsertion_overwrites_instead_of_duplicating() {
    let ctx = MatchContext::empty();
    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("HELLO", "X", "Y" => "first"), &ctx).unwrap();
    graph.add_category(category!("HELLO", "X", "Y" => "second"), &ctx).unwrap();

    assert_eq!(matched(&graph, "HELLO", "X", "Y", &ctx), Some("second".into()));

    let exported = graph.categories();
    assert_eq!(exported.len(), 1);
    assert_eq!(exported[0].template(), "second");
    assert!(graph.find_node("HELLO", "X", "Y").is_some());
}

#[test]
fn find_node_is_exact_lookup_including_shortcut_tails() {
    let graph = graph_with(vec![
        category!("I LIKE *" => "c1"),
        category!("HI", "X", "Y" => "c2"),
    ]);

    let shortcut = graph.find_node("I LIKE *", "*", "*").unwrap();
    assert_eq!(graph.category_at(shortcut).unwrap().template(), "c1");

    assert!(graph.find_node("HI", "X", "Y").is_some());
    assert!(graph.find_node("HI", "X", "Z").is_none());
    assert!(graph.find_node("I LIKE MANGO", "*", "*").is_none());
}

#[test]
fn deletion_is_logical_and_unmatches_the_key() {
    let ctx = MatchContext::empty();
    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("I LIKE MANGO" => "exact"), &ctx).unwrap();
    graph.add_category(category!("I LIKE *" => "wild"), &ctx).unwrap();

    assert_eq!(matched(&graph, "I LIKE MANGO", "X", "Y", &ctx), Some("exact".into()));
    assert!(graph.delete_category("I LIKE MANGO", "*", "*"));
    assert!(!graph.delete_category("I LIKE MANGO", "*", "*"));

    // The node survives, unmatched; search falls through to the wildcard.
    assert!(graph.find_node("I LIKE MANGO", "*", "*").is_some());
    assert_eq!(matched(&graph, "I LIKE MANGO", "X", "Y", &ctx), Some("wild".into()));
}

#[test]
fn bot_properties_resolve_at_insertion_time() {
    let sets = WordSets::new();
    let mut props = Properties::new();
    props.set("name", "Alice");
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph
        .add_category(category!(r#"CALL ME <bot name="name"/>"#, "X", "Y" => "that is me"), &ctx)
        .unwrap();
    // Unresolved properties vanish rather than failing.
    graph
        .add_category(category!(r#"HI <bot name="ghost"/>"#, "X", "Y" => "just hi"), &ctx)
        .unwrap();

    assert_eq!(matched(&graph, "call me alice", "X", "Y", &ctx), Some("that is me".into()));
    assert_eq!(matched(&graph, "hi", "X", "Y", &ctx), Some("just hi".into()));

    // Baked in: changing the property later does not re-index.
    let mut changed = Properties::new();
    changed.set("name", "Bob");
    let changed_ctx = MatchContext::new(&sets, &changed);
    assert_eq!(matched(&graph, "call me alice", "X", "Y", &changed_ctx), Some("that is me".into()));
    assert_eq!(matched(&graph, "call me bob", "X", "Y", &changed_ctx), None);
}

#[test]
fn independent_graphs_cross_reference_by_exact_lookup() {
    let ctx = MatchContext::empty();
    let mut committed = Graphmaster::new("committed");
    let mut learned = Graphmaster::new("learned");
    committed.add_category(category!("HELLO" => "hi"), &ctx).unwrap();

    // Learn only what the committed graph does not already index.
    for (pattern, template) in [("HELLO", "ignored"), ("GOODBYE", "bye")] {
        if committed.find_node(pattern, "*", "*").is_none() {
            learned.add_category(category!(pattern => template), &ctx).unwrap();
        }
    }

    assert_eq!(learned.categories().len(), 1);
    assert_eq!(matched(&learned, "GOODBYE", "X", "Y", &ctx), Some("bye".into()));
}

// --- Priority ordering -------------------------------------------------------

#[test]
fn dollar_word_outranks_sharp() {
    let graph = graph_with(vec![
        category!("$B", "X", "Y" => "dollar"),
        category!("#", "X", "Y" => "sharp"),
    ]);
    let ctx = MatchContext::empty();
    assert_eq!(matched(&graph, "B", "X", "Y", &ctx), Some("dollar".into()));
}

#[test]
fn sharp_outranks_underscore() {
    let graph = graph_with(vec![
        category!("#", "X", "Y" => "sharp"),
        category!("_", "X", "Y" => "under"),
    ]);
    let ctx = MatchContext::empty();
    assert_eq!(matched(&graph, "B", "X", "Y", &ctx), Some("sharp".into()));
}

#[test]
fn underscore_outranks_exact_word() {
    let graph = graph_with(vec![
        category!("_", "X", "Y" => "under"),
        category!("B", "X", "Y" => "word"),
    ]);
    let ctx = MatchContext::empty();
    assert_eq!(matched(&graph, "B", "X", "Y", &ctx), Some("under".into()));
}

#[test]
fn exact_word_outranks_set() {
    let mut sets = WordSets::new();
    sets.define("letters", ["B"]);
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("B", "X", "Y" => "word"), &ctx).unwrap();
    graph.add_category(category!("<SET>LETTERS</SET>", "X", "Y" => "set"), &ctx).unwrap();

    assert_eq!(matched(&graph, "B", "X", "Y", &ctx), Some("word".into()));
}

#[test]
fn set_outranks_caret() {
    let mut sets = WordSets::new();
    sets.define("letters", ["C"]);
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("B <SET>LETTERS</SET>", "X", "Y" => "set"), &ctx).unwrap();
    graph.add_category(category!("B ^ C", "X", "Y" => "caret"), &ctx).unwrap();

    assert_eq!(matched(&graph, "B C", "X", "Y", &ctx), Some("set".into()));
}

#[test]
fn shortcut_outranks_caret() {
    let graph = graph_with(vec![
        category!("B" => "shortcut"),
        category!("B ^", "X", "Y" => "caret"),
    ]);
    let ctx = MatchContext::empty();
    assert_eq!(matched(&graph, "B", "X", "Y", &ctx), Some("shortcut".into()));
}

#[test]
fn caret_outranks_star() {
    let graph = graph_with(vec![
        category!("B ^", "X", "Y" => "caret"),
        category!("B *", "X", "Y" => "star"),
    ]);
    let ctx = MatchContext::empty();

    // Zero-width caret wins when nothing is left to consume...
    assert_eq!(matched(&graph, "B", "X", "Y", &ctx), Some("caret".into()));
    // ...and the greedy caret wins when something is.
    assert_eq!(matched(&graph, "B C", "X", "Y", &ctx), Some("caret".into()));
}

#[test]
fn one_or_more_wildcards_need_at_least_one_word() {
    let graph = graph_with(vec![category!("A *", "X", "Y" => "star")]);
    let ctx = MatchContext::empty();
    assert_eq!(matched(&graph, "A", "X", "Y", &ctx), None);
    assert_eq!(matched(&graph, "A B C", "X", "Y", &ctx), Some("star".into()));
}

// --- Star bindings -----------------------------------------------------------

#[test]
fn zero_width_wildcards_bind_the_null_star_property() {
    let sets = WordSets::new();
    let mut props = Properties::new();
    props.set("nullstar", "NIL");
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("# HELLO", "X", "Y" => "greeting"), &ctx).unwrap();

    let hit = graph.matches("HELLO", "X", "Y", &ctx).unwrap().unwrap();
    assert_eq!(hit.stars.input_stars, vec!["NIL"]);

    // Without the property the binding degrades to the empty string.
    let empty_props = Properties::new();
    let bare = MatchContext::new(&sets, &empty_props);
    let hit = graph.matches("HELLO", "X", "Y", &bare).unwrap().unwrap();
    assert_eq!(hit.stars.input_stars, vec![""]);
}

#[test]
fn binding_indices_reset_at_segment_boundaries() {
    let graph = graph_with(vec![
        category!("* X *", "* Z", "* W" => "bound"),
    ]);
    let ctx = MatchContext::empty();

    let hit = graph.matches("A X B C", "Q Z", "R W", &ctx).unwrap().unwrap();
    assert_eq!(
        hit.stars,
        StarBindings {
            input_stars: vec!["A".into(), "B C".into()],
            that_stars: vec!["Q".into()],
            topic_stars: vec!["R".into()],
        }
    );
}

#[test]
fn shortcut_and_explicit_tail_match_identically() {
    let with_shortcuts = graph_with(vec![category!("HELLO *" => "greet")]);
    let without = graph_with_options(
        vec![category!("HELLO *" => "greet")],
        GraphOptions::default().difference(GraphOptions::SHORTCUTS),
    );
    let ctx = MatchContext::empty();

    let a = with_shortcuts.matches("HELLO THERE", "GOOD DAY", "WEATHER", &ctx).unwrap().unwrap();
    let b = without.matches("HELLO THERE", "GOOD DAY", "WEATHER", &ctx).unwrap().unwrap();

    assert_eq!(a.category.template(), b.category.template());
    assert_eq!(a.stars, b.stars);
    assert_eq!(a.stars.input_stars, vec!["THERE"]);
    assert_eq!(a.stars.that_stars, vec!["GOOD DAY"]);
    assert_eq!(a.stars.topic_stars, vec!["WEATHER"]);

    // Only one of the two actually took the shortcut.
    assert_eq!(with_shortcuts.node_stats().shortcuts, 1);
    assert_eq!(without.node_stats().shortcuts, 0);
}

#[test]
fn natural_number_set_is_always_available() {
    let sets = WordSets::new();
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("I AM <SET>NUMBER</SET> YEARS OLD" => "age"), &ctx).unwrap();

    let hit = graph.matches("I AM 25 YEARS OLD", "X", "Y", &ctx).unwrap().unwrap();
    assert_eq!(hit.stars.input_stars, vec!["25"]);
    assert_eq!(matched(&graph, "I AM FIVE YEARS OLD", "X", "Y", &ctx), None);
}

#[test]
fn multi_word_set_members_capture_the_whole_run() {
    let mut sets = WordSets::new();
    sets.define("fruit", ["BLOOD ORANGE", "MANGO"]);
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("I LIKE <SET>FRUIT</SET> A LOT" => "yum"), &ctx).unwrap();

    let hit = graph.matches("I LIKE BLOOD ORANGE A LOT", "X", "Y", &ctx).unwrap().unwrap();
    assert_eq!(hit.stars.input_stars, vec!["BLOOD ORANGE"]);
}

#[test]
fn sets_at_one_node_are_tried_in_registration_order() {
    let mut sets = WordSets::new();
    sets.define("fruit", ["MANGO"]);
    sets.define("color", ["RED"]);
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("I LIKE <SET>FRUIT</SET>" => "fruit"), &ctx).unwrap();
    graph.add_category(category!("I LIKE <SET>COLOR</SET>" => "color"), &ctx).unwrap();

    assert_eq!(matched(&graph, "I LIKE MANGO", "X", "Y", &ctx), Some("fruit".into()));
    assert_eq!(matched(&graph, "I LIKE RED", "X", "Y", &ctx), Some("color".into()));
}

// --- Resource caps -----------------------------------------------------------

#[test]
fn over_long_queries_degrade_to_no_match() {
    let graph = graph_with(vec![category!("*" => "anything")]);
    let ctx = MatchContext::empty();

    assert_eq!(matched(&graph, "HELLO WORLD", "X", "Y", &ctx), Some("anything".into()));

    let long_input = vec!["WORD"; crate::MAX_PATH_LENGTH].join(" ");
    assert_eq!(matched(&graph, &long_input, "X", "Y", &ctx), None);
}

#[test]
fn match_counting_respects_the_option() {
    let ctx = MatchContext::empty();
    let counting = graph_with(vec![category!("HI" => "hello")]);
    counting.matches("HI", "X", "Y", &ctx).unwrap();
    counting.matches("HI", "X", "Y", &ctx).unwrap();
    assert_eq!(counting.categories()[0].activation_count(), 2);

    let silent = graph_with_options(
        vec![category!("HI" => "hello")],
        GraphOptions::default().difference(GraphOptions::COUNT_MATCHES),
    );
    silent.matches("HI", "X", "Y", &ctx).unwrap();
    assert_eq!(silent.categories()[0].activation_count(), 0);
}

// --- Diagnostics -------------------------------------------------------------

#[test]
fn node_stats_recompute_from_a_cold_traversal() {
    let ctx = MatchContext::empty();
    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("A B", "X", "Y" => "one"), &ctx).unwrap();
    graph.add_category(category!("A C" => "two"), &ctx).unwrap();

    let stats = graph.node_stats();
    assert_eq!(stats.categories, 2);
    assert_eq!(stats.shortcuts, 1);
    assert_eq!(stats.leaves, 1);
    assert!(stats.nodes > stats.leaves);
    assert!(stats.average_branching > 0.0);

    // Logical deletion shows up on the next traversal.
    graph.delete_category("A C", "*", "*");
    assert_eq!(graph.node_stats().categories, 1);
    assert_eq!(graph.node_stats().nodes, stats.nodes);
}

#[test]
fn vocabulary_unions_edge_words_and_set_members() {
    let mut sets = WordSets::new();
    sets.define("fruit", ["MANGO", "APPLE"]);
    let props = Properties::new();
    let ctx = MatchContext::new(&sets, &props);

    let mut graph = Graphmaster::new("test");
    graph.add_category(category!("I LIKE <SET>FRUIT</SET>" => "yum"), &ctx).unwrap();
    graph.add_category(category!("$HELLO *" => "hi"), &ctx).unwrap();

    let vocab = graph.vocabulary(&ctx);
    assert_eq!(vocab, vec!["APPLE", "HELLO", "I", "LIKE", "MANGO"]);
}

#[test]
fn render_graph_lists_one_line_per_terminal() {
    let graph = graph_with(vec![
        category!("A B", "X", "Y" => "first template"),
        category!("A *" => "second template"),
    ]);
    let lines = graph.render_graph();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.contains("first template")));
    assert!(lines.iter().any(|l| l.contains("-->")));
}

// --- Pruning equivalence -----------------------------------------------------

/// Splitmix-style generator so the fuzz below is reproducible.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next() as usize) % items.len()]
    }

    fn phrase(&mut self, words: &[&str], max_len: usize) -> String {
        let len = 1 + (self.next() as usize) % max_len;
        (0..len).map(|_| self.pick(words)).collect::<Vec<_>>().join(" ")
    }
}

#[test]
fn pruning_and_shortcuts_never_change_the_outcome() {
    const PATTERN_WORDS: &[&str] = &["A", "B", "C", "*", "_", "#", "^", "$A"];
    const QUERY_WORDS: &[&str] = &["A", "B", "C", "D"];
    const CONTEXTS: &[&str] = &["*", "X", "X Y"];

    let ctx = MatchContext::empty();
    let mut rng = Rng(0x5eed);

    let mut pruned = Graphmaster::new("pruned");
    let mut unpruned = Graphmaster::with_options(
        "unpruned",
        GraphOptions::default().difference(GraphOptions::PRUNING),
    );
    let mut expanded = Graphmaster::with_options(
        "expanded",
        GraphOptions::default().difference(GraphOptions::SHORTCUTS),
    );

    for seq in 0..40 {
        let pattern = rng.phrase(PATTERN_WORDS, 4);
        let that = rng.pick(CONTEXTS);
        let topic = rng.pick(CONTEXTS);
        let category = category!(&pattern, that, topic => format!("t{seq}"));
        pruned.add_category(category.clone(), &ctx).unwrap();
        unpruned.add_category(category.clone(), &ctx).unwrap();
        expanded.add_category(category, &ctx).unwrap();
    }

    for _ in 0..120 {
        let input = rng.phrase(QUERY_WORDS, 4);
        let that = rng.phrase(QUERY_WORDS, 2);
        let topic = rng.phrase(QUERY_WORDS, 2);

        let baseline = pruned
            .matches(&input, &that, &topic, &ctx)
            .unwrap()
            .map(|hit| (hit.category.template().to_string(), hit.stars));

        for other in [&unpruned, &expanded] {
            let outcome = other
                .matches(&input, &that, &topic, &ctx)
                .unwrap()
                .map(|hit| (hit.category.template().to_string(), hit.stars));
            assert_eq!(outcome, baseline, "diverged on {input:?} / {that:?} / {topic:?}");
        }
    }
}
