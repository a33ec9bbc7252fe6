//! Front matter extraction and parsing.
//!
//! Articles may start with a block of `key: value` lines fenced by `---`.
//! This is deliberately not YAML: values stay strings, except for `tags` and
//! the category keys, which accept either a bracketed list or a comma
//! separated one and degrade to a plain comma split when the list is malformed.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Keys folded into [`Frontmatter::category`].
const CATEGORY_KEYS: [&str; 4] = ["category", "categories", "cat", "categoria"];

static KEY_VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([^\s:]+)\s*:\s*(.*)$").expect("Invalid key/value regex")
});

// Bare words inside a bracketed list, with the quotes that may surround them.
static LIST_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(['"])?([a-zA-Z0-9_\s-]+)(['"])?"#).expect("Invalid list word regex")
});

/// Parsed front matter of an article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    /// Ordered tags from the `tags` key
    pub tags: Option<Vec<String>>,

    /// Single category from `category`, `categories`, `cat` or `categoria`
    pub category: Option<String>,

    /// Every other key, lower-cased and accent-stripped, with its trimmed value
    pub fields: BTreeMap<String, String>,
}

impl Frontmatter {
    /// Look up a plain string field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// True when no key was recognised.
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.category.is_none() && self.fields.is_empty()
    }

    fn insert(&mut self, key: String, value: &str) {
        if key == "tags" {
            self.tags = Some(parse_tags(value));
        } else if CATEGORY_KEYS.contains(&key.as_str()) {
            self.category = Some(parse_category(value));
        } else {
            self.fields.insert(key, value.to_string());
        }
    }
}

/// Split an article into its front matter and body.
///
/// The block is only recognised when the very first line is `---` and a
/// later line is `---` as well. Without it the metadata is empty and the body
/// is the whole input, untouched. With it, the body is trimmed.
pub fn extract_frontmatter(source: &str) -> (Frontmatter, &str) {
    let Some((block, body)) = split_block(source) else {
        return (Frontmatter::default(), source);
    };

    let mut frontmatter = Frontmatter::default();

    for line in block.lines() {
        let Some(caps) = KEY_VALUE_RE.captures(line) else {
            continue;
        };
        let key = normalize_key(&caps[1]);
        let value = strip_wrapping_quotes(caps[2].trim());
        frontmatter.insert(key, value);
    }

    (frontmatter, body.trim())
}

/// Locate the fenced block. Returns `(block, rest)`.
fn split_block(source: &str) -> Option<(&str, &str)> {
    let mut lines = source.split_inclusive('\n');

    let first = lines.next()?;
    if !is_fence(first) {
        return None;
    }

    let block_start = first.len();
    let mut offset = block_start;

    for line in lines {
        if is_fence(line) {
            let block = &source[block_start..offset];
            let rest = &source[offset + line.len()..];
            return Some((block, rest));
        }
        offset += line.len();
    }

    None
}

fn is_fence(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Lower-case a key and drop combining accents, so `Categoría` reads as `categoria`.
fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

/// Remove one layer of matching `"` or `'` quotes.
fn strip_wrapping_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn parse_tags(value: &str) -> Vec<String> {
    let value = value.trim();
    if value.starts_with('[') {
        match parse_bracket_list(value) {
            Some(items) => items.into_iter().filter(|item| !item.is_empty()).collect(),
            None => lenient_split(value),
        }
    } else {
        split_entries(value)
    }
}

fn parse_category(value: &str) -> String {
    let value = value.trim();
    if value.starts_with('[') {
        match parse_bracket_list(value) {
            Some(items) => items.into_iter().next().unwrap_or_default(),
            None => lenient_split(value)
                .into_iter()
                .next()
                .unwrap_or_else(|| value.to_string()),
        }
    } else if value.contains(',') {
        split_entries(value)
            .into_iter()
            .next()
            .unwrap_or_else(|| value.to_string())
    } else {
        value.replace(['"', '\''], "").trim().to_string()
    }
}

/// Quote every bare word of `[a, b c, 'd']` and read the result as a JSON
/// array of strings. Anything the heuristic cannot turn into such an array
/// (accented words, nested lists, unbalanced brackets) yields `None`.
/// Items are trimmed; empty ones are kept.
fn parse_bracket_list(value: &str) -> Option<Vec<String>> {
    let quoted = LIST_WORD_RE.replace_all(value, |caps: &regex::Captures<'_>| {
        format!("\"{}\"", caps[2].trim())
    });

    let items: Vec<String> = serde_json::from_str(&quoted).ok()?;
    Some(items.into_iter().map(|item| item.trim().to_string()).collect())
}

/// Fallback for malformed lists: drop brackets and quotes, then split on commas.
fn lenient_split(value: &str) -> Vec<String> {
    value
        .replace(['[', ']', '\'', '"'], "")
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn split_entries(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.replace(['"', '\''], "").trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
