//! Logging and debugging facilities.
//!
//! The crate instruments itself with the `tracing` crate; install a
//! subscriber in the application to see events:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! Dictionary registration and definition resolution emit trace-level
//! events under the targets in [`targets`], so they can be filtered per
//! subsystem.

use crate::dictionary::TypeDictionary;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Whole-crate target.
    pub const CORE: &str = "definable_core";
    /// Dictionary registration target.
    pub const DICTIONARY: &str = "definable_core::dictionary";
    /// Definition attachment/resolution target.
    pub const DEFINABLE: &str = "definable_core::definable";
}

/// Render a dictionary chain level by level, for debugging.
///
/// Each line shows one level's type name and its own (not inherited) keys,
/// starting at the given dictionary and walking toward the root:
///
/// ```text
/// Car: doors, model
///   Vehicle: make
/// ```
pub fn format_dictionary_chain<T: Send + Sync + 'static>(
    dictionary: &TypeDictionary<T>,
) -> String {
    let mut output = String::new();
    let mut current = Some(dictionary);
    let mut depth = 0usize;
    while let Some(dict) = current {
        let indent = "  ".repeat(depth);
        output.push_str(&format!(
            "{}{}: {}\n",
            indent,
            dict.type_name(),
            dict.own_keys().join(", ")
        ));
        current = dict.parent().map(|p| &**p);
        depth += 1;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;
    use std::sync::Arc;

    #[derive(Default)]
    struct Widget {
        size: RwLock<usize>,
        label: RwLock<String>,
    }

    #[test]
    fn test_format_dictionary_chain() {
        let parent = Arc::new(TypeDictionary::<Widget>::new("Base"));
        parent.register_attribute("size", |w: &Widget, v: usize| *w.size.write() = v);

        let child = TypeDictionary::with_parent("Widget", parent);
        child.register_attribute("label", |w: &Widget, v: String| *w.label.write() = v);

        let rendered = format_dictionary_chain(&child);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["Widget: label", "  Base: size"]);
    }
}
