//! Markdown to HTML rendering.

use pulldown_cmark::{html, Options, Parser};

/// Turns an article body into HTML.
pub trait MarkdownRenderer {
    /// Render Markdown to an HTML fragment.
    fn render(&self, body: &str) -> String;
}

/// CommonMark renderer backed by pulldown-cmark.
///
/// Raw HTML in the source is passed through as-is.
#[derive(Debug, Clone)]
pub struct CommonMark {
    options: Options,
}

impl CommonMark {
    pub fn new() -> Self {
        Self {
            options: Options::ENABLE_TABLES
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS,
        }
    }
}

impl Default for CommonMark {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for CommonMark {
    fn render(&self, body: &str) -> String {
        let parser = Parser::new_ext(body, self.options);

        let mut html_output = String::with_capacity(body.len() * 3 / 2);
        html::push_html(&mut html_output, parser);

        html_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_paragraphs() {
        let html = CommonMark::new().render("# Title\n\nFirst real line.");

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>First real line.</p>"));
    }

    #[test]
    fn passes_raw_html_through() {
        let html = CommonMark::new().render("<div class=\"note\">Aviso</div>\n\nTexto");

        assert!(html.contains("<div class=\"note\">Aviso</div>"));
        assert!(!html.contains("&lt;div"));
    }

    #[test]
    fn renders_tables_and_strikethrough() {
        let html = CommonMark::new().render("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~");

        assert!(html.contains("<table>"));
        assert!(html.contains("<del>old</del>"));
    }
}
