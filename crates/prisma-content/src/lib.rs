//! Article model for prisma.
//!
//! This crate splits Markdown articles into front matter and body, renders
//! the body to HTML and normalizes everything into [`Post`] values with
//! build-wide unique slugs.

pub mod frontmatter;
pub mod markdown;
pub mod post;
pub mod slug;

pub use frontmatter::{extract_frontmatter, Frontmatter};
pub use markdown::{CommonMark, MarkdownRenderer};
pub use post::{normalize_post, parse_article, ParsedArticle, Post};
pub use slug::{sanitize, SlugRegistry};
