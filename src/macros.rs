#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

/// Build a [`Category`](crate::Category) with literal that/topic defaults of
/// `"*"`, or with explicit that/topic patterns.
#[macro_export]
macro_rules! category {
    ($pattern:expr => $template:expr $(,)?) => {
        $crate::Category::new($pattern, "*", "*", $template)
    };
    ($pattern:expr, $that:expr, $topic:expr => $template:expr $(,)?) => {
        $crate::Category::new($pattern, $that, $topic, $template)
    };
}
