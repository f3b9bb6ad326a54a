//! Bot property resolution.
//!
//! Patterns may embed `<bot name="X"/>` placeholders; insertion substitutes
//! the current property value before the path is built, so the value is baked
//! into the index. The zero-width wildcards also read the `nullstar` property
//! for the text they bind when they consume nothing.

use std::collections::HashMap;

/// Property bound by `#`/`^` when they match zero words.
pub(crate) const NULL_STAR_PROPERTY: &str = "nullstar";

/// Read-only property lookup. Property names are case-insensitive; an absent
/// property degrades to the empty string at the call sites.
pub trait PropertySource {
    fn get(&self, name: &str) -> Option<&str>;
}

/// In-memory property map.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_lowercase(), value.into());
    }
}

impl PropertySource for Properties {
    fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&name.to_lowercase()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_names_are_case_insensitive() {
        let mut props = Properties::new();
        props.set("Name", "Alice");
        assert_eq!(props.get("name"), Some("Alice"));
        assert_eq!(props.get("NAME"), Some("Alice"));
        assert_eq!(props.get("species"), None);
    }
}
