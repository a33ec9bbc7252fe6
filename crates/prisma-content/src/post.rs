//! Post normalization.
//!
//! Every user-facing field of a [`Post`] comes from a fallback chain: an
//! ordered list of candidate producers, the first non-blank answer wins.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::frontmatter::{extract_frontmatter, Frontmatter};
use crate::markdown::MarkdownRenderer;
use crate::slug::{sanitize, SlugRegistry};

/// Title used when neither front matter nor file name provide one.
pub const UNTITLED: &str = "Sin título";

/// Maximum length of a description taken from the body.
pub const DESCRIPTION_SOURCE_LIMIT: usize = 200;

/// Summaries longer than this are cut and suffixed with [`ELLIPSIS`].
pub const SUMMARY_LIMIT: usize = 140;

pub const ELLIPSIS: &str = "...";

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+").expect("Invalid heading regex"));

static EMPHASIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[`*_>~-]+").expect("Invalid emphasis regex"));

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]+").expect("Invalid separator regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// A normalized article, ready to be embedded in the site template.
///
/// Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub summary: String,
    pub slug: String,
    /// Markdown source including front matter, verbatim
    pub raw: String,
    /// Rendered HTML body
    pub content: String,
}

/// An article split into front matter and body.
#[derive(Debug, Clone)]
pub struct ParsedArticle<'a> {
    pub frontmatter: Frontmatter,
    pub body: &'a str,
    pub raw: &'a str,
}

/// Parse an article source.
pub fn parse_article(raw: &str) -> ParsedArticle<'_> {
    let (frontmatter, body) = extract_frontmatter(raw);
    ParsedArticle {
        frontmatter,
        body,
        raw,
    }
}

impl Post {
    /// Parse, render and normalize one article.
    ///
    /// `relative_path` is the file path relative to the articles root.
    pub fn from_markdown(
        raw: &str,
        relative_path: &Path,
        renderer: &dyn MarkdownRenderer,
        slugs: &mut SlugRegistry,
    ) -> Self {
        let article = parse_article(raw);
        let content = renderer.render(article.body);
        normalize_post(&article, content, relative_path, slugs)
    }
}

type Candidate<'a> = &'a dyn Fn() -> Option<String>;

/// Evaluate candidates in order and return the first non-blank, trimmed value.
fn first_present(candidates: &[Candidate<'_>]) -> Option<String> {
    candidates.iter().find_map(|candidate| {
        candidate()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Build a [`Post`] from a parsed article and its rendered HTML, reserving
/// its slug in `slugs`.
pub fn normalize_post(
    article: &ParsedArticle<'_>,
    content: String,
    relative_path: &Path,
    slugs: &mut SlugRegistry,
) -> Post {
    let fm = &article.frontmatter;
    let file_title = humanize_file_name(relative_path);
    let tags = fm.tags.clone().unwrap_or_default();

    let title = first_present(&[
        &|| fm.get("title").map(str::to_string),
        &|| Some(file_title.clone()),
    ])
    .unwrap_or_else(|| UNTITLED.to_string());

    let description = first_present(&[
        &|| fm.get("description").map(str::to_string),
        &|| Some(extract_summary(article.body)),
    ])
    .unwrap_or_default();

    let category = first_present(&[
        &|| fm.category.clone(),
        &|| tags.first().cloned(),
        &|| folder_category(relative_path),
    ])
    .unwrap_or_default();

    let base_slug = first_present(&[
        &|| fm.get("slug").map(str::to_string),
        &|| Some(sanitize(&file_title)),
        &|| Some(sanitize(&title)),
        &|| Some(hyphenate(&title)),
    ])
    .unwrap_or_else(|| hyphenate(UNTITLED));

    let summary = summarize(&description, article.body);
    let slug = slugs.claim(&base_slug);

    Post {
        title,
        description,
        tags,
        category,
        summary,
        slug,
        raw: article.raw.to_string(),
        content,
    }
}

/// Lower-cased `text` with whitespace runs turned into `-`, other characters kept.
fn hyphenate(text: &str) -> String {
    WHITESPACE_RE.replace_all(&text.to_lowercase(), "-").into_owned()
}

/// File name without its `.md` extension, `-`/`_` runs turned into spaces.
pub fn humanize_file_name(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let stem = strip_md_extension(name);
    SEPARATOR_RE.replace_all(stem, " ").trim().to_string()
}

fn strip_md_extension(name: &str) -> &str {
    let split = name.len().saturating_sub(3);
    match name.get(split..) {
        Some(ext) if ext.eq_ignore_ascii_case(".md") => &name[..split],
        _ => name,
    }
}

/// Name of the folder holding the article, or `None` at the articles root.
pub fn folder_category(relative_path: &Path) -> Option<String> {
    relative_path
        .parent()
        .and_then(Path::file_name)
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// First body line that is not a heading, emphasis marks removed, cut to
/// [`DESCRIPTION_SOURCE_LIMIT`] characters. Falls back to the first line when
/// every line is a heading.
pub fn extract_summary(body: &str) -> String {
    let lines: Vec<&str> = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let Some(first) = lines.first() else {
        return String::new();
    };

    let line = lines
        .iter()
        .find(|line| !HEADING_RE.is_match(line))
        .unwrap_or(first);

    let stripped = EMPHASIS_RE.replace_all(line, "");
    truncate_chars(&stripped, DESCRIPTION_SOURCE_LIMIT).to_string()
}

/// Card summary for a description.
///
/// Without any description the extracted body line is used and the ellipsis
/// is always appended.
pub fn summarize(description: &str, body: &str) -> String {
    if description.is_empty() {
        let fallback = extract_summary(body);
        return format!("{}{}", truncate_chars(&fallback, SUMMARY_LIMIT), ELLIPSIS);
    }

    if description.chars().count() > SUMMARY_LIMIT {
        format!("{}{}", truncate_chars(description, SUMMARY_LIMIT), ELLIPSIS)
    } else {
        description.to_string()
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::CommonMark;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn post(raw: &str, path: &str, slugs: &mut SlugRegistry) -> Post {
        Post::from_markdown(raw, &PathBuf::from(path), &CommonMark::new(), slugs)
    }

    fn single(raw: &str, path: &str) -> Post {
        post(raw, path, &mut SlugRegistry::new())
    }

    #[test]
    fn derives_fields_without_front_matter() {
        let raw = "# Title\nFirst real line.";
        let p = single(raw, "a.md");

        assert_eq!(p.title, "a");
        assert_eq!(p.description, "First real line.");
        assert_eq!(p.summary, "First real line.");
        assert_eq!(p.slug, "a");
        assert_eq!(p.category, "");
        assert!(p.tags.is_empty());
        assert_eq!(p.raw, raw);
        assert!(p.content.contains("<h1>Title</h1>"));
    }

    #[test]
    fn front_matter_takes_precedence() {
        let raw = "---\ntitle: B Post\ndescription: Short one\nslug: custom-slug\n---\nSecond.";
        let p = single(raw, "b.md");

        assert_eq!(p.title, "B Post");
        assert_eq!(p.description, "Short one");
        assert_eq!(p.summary, "Short one");
        assert_eq!(p.slug, "custom-slug");
        assert_eq!(p.content.trim(), "<p>Second.</p>");
        assert_eq!(p.raw, raw);
    }

    #[test]
    fn humanizes_file_names() {
        assert_eq!(
            humanize_file_name(Path::new("guias/mi-primer__articulo.MD")),
            "mi primer articulo"
        );
        assert_eq!(humanize_file_name(Path::new("_borrador-.md")), "borrador");
        assert_eq!(humanize_file_name(Path::new("notes.markdown")), "notes.markdown");
    }

    #[test]
    fn falls_back_to_untitled() {
        let p = single("Body only", "---.md");

        assert_eq!(p.title, UNTITLED);
        assert_eq!(p.slug, "sin-ttulo");
    }

    #[test]
    fn non_ascii_names_still_get_a_slug() {
        let mut slugs = SlugRegistry::new();

        let first = post("x", "日本語.md", &mut slugs);
        let second = post("y", "notas/日本語.md", &mut slugs);
        let accented = post("---\ntitle: Ñandú Común\n---\nz", "ßß.md", &mut slugs);
        let spaced = post("---\ntitle: 東京 の 夜\n---\nw", "ßß.md", &mut slugs);

        assert_eq!(first.title, "日本語");
        assert_eq!(first.slug, "日本語");
        assert_eq!(second.slug, "日本語-1");
        assert_eq!(accented.slug, "and-comn");
        assert_eq!(spaced.slug, "東京-の-夜");
    }

    #[test]
    fn blank_front_matter_values_are_skipped() {
        let p = single("---\ntitle: \"  \"\ndescription: ''\n---\nActual text", "note.md");

        assert_eq!(p.title, "note");
        assert_eq!(p.description, "Actual text");
    }

    #[test]
    fn category_precedence() {
        let with_all = "---\ncategory: \"Health\"\ntags: [Wellness]\n---\nBody";
        let tags_only = "---\ntags: [Wellness]\n---\nBody";
        let neither = "---\ntitle: Plain\n---\nBody";

        assert_eq!(single(with_all, "guides/post.md").category, "Health");
        assert_eq!(single(tags_only, "guides/post.md").category, "Wellness");
        assert_eq!(single(neither, "guides/post.md").category, "guides");
        assert_eq!(single(neither, "post.md").category, "");
    }

    #[test]
    fn nested_folder_uses_immediate_parent() {
        assert_eq!(
            folder_category(Path::new("salud/ansiedad/post.md")),
            Some("ansiedad".to_string())
        );
        assert_eq!(folder_category(Path::new("post.md")), None);
    }

    #[test]
    fn colliding_slugs_get_suffixes() {
        let mut slugs = SlugRegistry::new();

        let first = post("One", "guides/foo.md", &mut slugs);
        let second = post("Two", "notes/foo.md", &mut slugs);
        let third = post("---\nslug: foo\n---\nThree", "other.md", &mut slugs);

        assert_eq!(first.slug, "foo");
        assert_eq!(second.slug, "foo-1");
        assert_eq!(third.slug, "foo-2");
    }

    #[test]
    fn slug_is_sanitized_from_file_name() {
        let p = single("x", "Qué es la Ansiedad.md");

        assert_eq!(p.title, "Qué es la Ansiedad");
        assert_eq!(p.slug, "qu-es-la-ansiedad");
    }

    #[test]
    fn summary_skips_headings_and_strips_emphasis() {
        let body = "# Heading\n\n## Sub\n\n> **Importante:** lee esto\n\nMore";

        assert_eq!(extract_summary(body), " Importante: lee esto");
        assert_eq!(single(body, "x.md").description, "Importante: lee esto");
    }

    #[test]
    fn summary_uses_first_line_when_all_headings() {
        assert_eq!(extract_summary("# Only\n## Headings"), "# Only");
        assert_eq!(extract_summary("  \n\n"), "");
    }

    #[test]
    fn extracted_description_is_capped() {
        let body = "x".repeat(300);

        assert_eq!(extract_summary(&body).chars().count(), DESCRIPTION_SOURCE_LIMIT);
    }

    #[test]
    fn long_description_is_truncated() {
        let description = "d".repeat(200);
        let raw = format!("---\ndescription: {}\n---\nBody", description);
        let p = single(&raw, "long.md");

        assert_eq!(p.description.len(), 200);
        assert_eq!(p.summary.len(), 143);
        assert_eq!(p.summary, format!("{}...", "d".repeat(140)));
    }

    #[test]
    fn truncation_counts_characters() {
        let description = "á".repeat(141);
        let summary = summarize(&description, "");

        assert_eq!(summary.chars().count(), 143);
        assert!(summary.ends_with(ELLIPSIS));
        assert_eq!(summarize(&"é".repeat(140), ""), "é".repeat(140));
    }

    #[test]
    fn empty_body_yields_bare_ellipsis() {
        let p = single("", "empty.md");

        assert_eq!(p.description, "");
        assert_eq!(p.summary, ELLIPSIS);
    }

    #[test]
    fn serializes_in_field_order() {
        let p = single("---\ntitle: T\ntags: a\n---\nBody", "t.md");
        let json = serde_json::to_string(&p).unwrap();

        let keys = [
            "\"title\"",
            "\"description\"",
            "\"tags\"",
            "\"category\"",
            "\"summary\"",
            "\"slug\"",
            "\"raw\"",
            "\"content\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }
}
