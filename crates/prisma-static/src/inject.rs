//! Embedding post data into the site template.
//!
//! The template declares the collection the page script reads, for example
//! `let blogPosts = [];` inside an inline `<script>`. The injector swaps that
//! initializer for the serialized posts.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Name of the collection the default template declares.
pub const DEFAULT_BINDING: &str = "blogPosts";

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>(.*?)</script>").expect("Invalid script block regex")
});

static SCRIPT_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</(script)").expect("Invalid script close regex"));

/// Errors that can occur when injecting data.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error(
        "Template has no `{binding}` binding point: expected `let {binding} = [...]` inside an inline <script>"
    )]
    MissingBinding { binding: String },

    #[error("Failed to serialize posts: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the initializer sits in the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BindingPoint<'t> {
    keyword: &'t str,
    start: usize,
    end: usize,
}

/// Replaces a named collection initializer in an HTML template.
#[derive(Debug, Clone)]
pub struct TemplateInjector {
    binding: String,
    declaration: Regex,
}

impl TemplateInjector {
    pub fn new(binding: &str) -> Self {
        let pattern = format!(r"\b(let|const|var)\s+{}\s*=\s*", regex::escape(binding));
        Self {
            binding: binding.to_string(),
            // The binding name is escaped, so the pattern is always valid.
            declaration: Regex::new(&pattern).expect("Invalid binding declaration regex"),
        }
    }

    /// Serialize `items` and splice them in as the binding's initializer.
    pub fn inject<T: Serialize>(&self, template: &str, items: &[T]) -> Result<String, InjectError> {
        let json = serialize_for_script(items)?;

        let point = self
            .locate(template)
            .ok_or_else(|| InjectError::MissingBinding {
                binding: self.binding.clone(),
            })?;

        let mut html = String::with_capacity(template.len() + json.len());
        html.push_str(&template[..point.start]);
        html.push_str(&format!("{} {} = {};", point.keyword, self.binding, json));
        html.push_str(&template[point.end..]);

        Ok(html)
    }

    /// Check that the template can receive data.
    pub fn has_binding(&self, template: &str) -> bool {
        self.locate(template).is_some()
    }

    fn locate<'t>(&self, template: &'t str) -> Option<BindingPoint<'t>> {
        for script in SCRIPT_RE.captures_iter(template) {
            let Some(body) = script.get(1) else {
                continue;
            };
            let offset = body.start();
            let code = body.as_str();

            for decl in self.declaration.captures_iter(code) {
                let (Some(whole), Some(keyword)) = (decl.get(0), decl.get(1)) else {
                    continue;
                };
                if !code[whole.end()..].starts_with('[') {
                    continue;
                }
                let Some(close) = initializer_end(code, whole.end()) else {
                    continue;
                };

                let rest = &code[close..];
                let padded = rest.trim_start_matches([' ', '\t']);
                let end = if padded.starts_with(';') {
                    close + (rest.len() - padded.len()) + 1
                } else {
                    close
                };

                return Some(BindingPoint {
                    keyword: &template[offset + keyword.start()..offset + keyword.end()],
                    start: offset + whole.start(),
                    end: offset + end,
                });
            }
        }

        None
    }
}

impl Default for TemplateInjector {
    fn default() -> Self {
        Self::new(DEFAULT_BINDING)
    }
}

/// Pretty JSON with every `</script` turned into `<\/script`, so string
/// values cannot close the surrounding element.
pub fn serialize_for_script<T: Serialize>(items: &[T]) -> Result<String, InjectError> {
    let json = serde_json::to_string_pretty(items)?;
    Ok(SCRIPT_CLOSE_RE.replace_all(&json, r"<\/$1").into_owned())
}

/// Byte index just past the bracket matching the `[` at `open`.
///
/// String literals and comments are skipped so brackets inside them do not
/// count.
fn initializer_end(code: &str, open: usize) -> Option<usize> {
    let bytes = code.as_bytes();
    let mut depth = 0usize;
    let mut i = open;

    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' | b'(' => depth += 1,
            b']' | b'}' | b')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            quote @ (b'"' | b'\'' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                    i += 1;
                }
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    None
}
