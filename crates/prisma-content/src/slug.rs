//! Slug sanitizing and per-build uniqueness.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("Invalid slug character regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Lower-case `text`, drop everything but ASCII word characters, whitespace
/// and hyphens, then turn whitespace runs into single hyphens.
pub fn sanitize(text: &str) -> String {
    let lower = text.to_lowercase();
    let kept = DISALLOWED_RE.replace_all(&lower, "");
    WHITESPACE_RE.replace_all(&kept, "-").into_owned()
}

/// Slugs already handed out during one build.
#[derive(Debug, Default, Clone)]
pub struct SlugRegistry {
    taken: HashSet<String>,
}

impl SlugRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `base`, or the first free `base-1`, `base-2`, ... and return it.
    pub fn claim(&mut self, base: &str) -> String {
        let mut slug = base.to_string();
        let mut suffix = 1;

        while self.taken.contains(&slug) {
            slug = format!("{}-{}", base, suffix);
            suffix += 1;
        }

        self.taken.insert(slug.clone());
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_works() {
        assert_eq!(sanitize("Hello World"), "hello-world");
        assert_eq!(sanitize("Ansiedad (guía)  rápida"), "ansiedad-gua-rpida");
        assert_eq!(sanitize("already-slugged"), "already-slugged");
        assert_eq!(sanitize("tab\tand\nnewline"), "tab-and-newline");
    }

    #[test]
    fn claims_unique_slugs_in_order() {
        let mut registry = SlugRegistry::new();

        assert_eq!(registry.claim("foo"), "foo");
        assert_eq!(registry.claim("foo"), "foo-1");
        assert_eq!(registry.claim("foo"), "foo-2");
        assert_eq!(registry.claim("bar"), "bar");
    }

    #[test]
    fn suffix_skips_explicitly_taken_values() {
        let mut registry = SlugRegistry::new();

        registry.claim("foo-1");
        registry.claim("foo");

        assert_eq!(registry.claim("foo"), "foo-2");
        assert_eq!(registry.claim("foo-1"), "foo-1-1");
    }
}
