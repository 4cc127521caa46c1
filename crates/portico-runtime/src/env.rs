//! Environment variable substitution for manifest documents
//!
//! Supports `${VAR_NAME}` and `${VAR_NAME:-fallback}`. Substitution runs on
//! the raw document text before parsing.
//!
//! An unset variable without a fallback leaves the placeholder untouched,
//! so the literal `${VAR_NAME}` reaches the parser and shows up verbatim in
//! the loaded manifest.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Matches `${NAME}` and `${NAME:-fallback}`
static ENV_VAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("placeholder pattern is a valid regex")
});

/// Substitute placeholders from the process environment.
///
/// # Example
///
/// ```rust
/// use portico_runtime::env::expand;
///
/// let out = expand("url: ${PORTICO_DOC_UNSET_HOST:-localhost}:6333");
/// assert_eq!(out, "url: localhost:6333");
/// ```
pub fn expand(text: &str) -> String {
    expand_with(text, |name| std::env::var(name).ok())
}

/// Substitute placeholders from an explicit lookup.
///
/// Useful for tests and tooling that must not touch the process environment.
pub fn expand_with<F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR_REGEX
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            match (lookup(name), caps.get(2)) {
                (Some(value), Some(fallback)) if value.is_empty() => fallback.as_str().to_string(),
                (Some(value), _) => value,
                (None, Some(fallback)) => fallback.as_str().to_string(),
                (None, None) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Names of the variables referenced by `text`, in order of first appearance.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in ENV_VAR_REGEX.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|seen| seen == name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_expand_single() {
        let env = vars(&[("QDRANT_HOST", "qdrant.internal")]);
        let out = expand_with("host: ${QDRANT_HOST}", |name| env.get(name).cloned());
        assert_eq!(out, "host: qdrant.internal");
    }

    #[test]
    fn test_expand_multiple() {
        let env = vars(&[("A", "foo"), ("B", "bar")]);
        let out = expand_with("${A}_${B}_${A}", |name| env.get(name).cloned());
        assert_eq!(out, "foo_bar_foo");
    }

    #[test]
    fn test_unset_variable_left_literal() {
        let out = expand_with("key: ${MISSING_KEY}", |_| None);
        assert_eq!(out, "key: ${MISSING_KEY}");
    }

    #[test]
    fn test_fallback_used_when_unset_or_empty() {
        let env = vars(&[("EMPTY", "")]);
        let lookup = |name: &str| env.get(name).cloned();

        assert_eq!(expand_with("${UNSET:-8080}", lookup), "8080");
        assert_eq!(expand_with("${EMPTY:-8080}", lookup), "8080");
        assert_eq!(expand_with("${UNSET:-}", lookup), "");
    }

    #[test]
    fn test_fallback_ignored_when_set() {
        let env = vars(&[("PORT", "9090")]);
        assert_eq!(expand_with("${PORT:-8080}", |n| env.get(n).cloned()), "9090");
    }

    #[test]
    fn test_non_placeholders_untouched() {
        let text = "cost: $5, regex: ^a{2}$, ${1BAD}, $PLAIN";
        assert_eq!(expand_with(text, |_| Some("x".to_string())), text);
    }

    #[test]
    fn test_expand_reads_process_environment() {
        let path = std::env::var("PATH").unwrap_or_default();
        assert_eq!(expand("${PATH:-}"), path);
    }

    #[test]
    fn test_placeholders_lists_names_once() {
        assert_eq!(
            placeholders("${A} ${B:-x} ${A}"),
            vec!["A".to_string(), "B".to_string()]
        );
    }
}
