//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use prisma_content::{CommonMark, MarkdownRenderer, Post, SlugRegistry};

use crate::assets::{AssetError, AssetMount, AssetPublisher};
use crate::collector::{collect_markdown, CollectError, CollectOptions};
use crate::companion::{integrate, AccessibilityKit, CompanionPage};
use crate::inject::{InjectError, TemplateInjector, DEFAULT_BINDING};

/// Configuration for building the site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root folder of the Markdown articles
    pub articles_dir: PathBuf,

    /// HTML template holding the binding point
    pub template: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Name of the collection the template declares
    pub binding: String,

    /// Visit articles in file-name order
    pub sorted: bool,

    /// Minify copied stylesheets
    pub minify: bool,

    /// Asset directories to copy
    pub assets: Vec<AssetMount>,

    /// Pages that receive the accessibility controls of the main page
    pub companions: Vec<CompanionPage>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            articles_dir: PathBuf::from("src/publicaciones"),
            template: PathBuf::from("index.html"),
            output_dir: PathBuf::from("dist"),
            binding: DEFAULT_BINDING.to_string(),
            sorted: false,
            minify: true,
            assets: vec![AssetMount::new("assets", "assets")],
            companions: vec![],
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Markdown files discovered
    pub files_found: usize,

    /// Posts embedded in the page
    pub posts: usize,

    /// Articles skipped because of an error
    pub skipped: usize,

    /// Asset files copied
    pub assets_copied: usize,

    /// Companion pages written
    pub companions: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// The generated page
    pub output_path: PathBuf,
}

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("Failed to read template {}: {message}", .path.display())]
    Template { path: PathBuf, message: String },

    #[error(transparent)]
    Inject(#[from] InjectError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A single article that could not be turned into a post.
#[derive(Debug, thiserror::Error)]
#[error("Failed to process {}: {message}", .path.display())]
pub struct ArticleError {
    pub path: PathBuf,
    pub message: String,
}

/// State threaded through one build: the slugs handed out so far and the
/// posts in traversal order.
#[derive(Debug, Default)]
pub struct BuildContext {
    pub slugs: SlugRegistry,
    pub posts: Vec<Post>,
    pub failures: Vec<ArticleError>,
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    renderer: Box<dyn MarkdownRenderer>,
    injector: TemplateInjector,
}

impl StaticBuilder {
    /// Create a new static builder with the CommonMark renderer.
    pub fn new(config: BuildConfig) -> Self {
        Self::with_renderer(config, Box::new(CommonMark::new()))
    }

    pub fn with_renderer(config: BuildConfig, renderer: Box<dyn MarkdownRenderer>) -> Self {
        let injector = TemplateInjector::new(&config.binding);
        Self {
            config,
            renderer,
            injector,
        }
    }

    /// Build the site.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let files = collect_markdown(
            &self.config.articles_dir,
            CollectOptions {
                sorted: self.config.sorted,
            },
        )?;

        tracing::info!("Found {} Markdown files", files.len());
        for file in &files {
            tracing::debug!("- {}", self.relative_path(file).display());
        }

        let template =
            fs::read_to_string(&self.config.template).map_err(|e| BuildError::Template {
                path: self.config.template.clone(),
                message: e.to_string(),
            })?;

        let mut ctx = BuildContext::default();
        for file in &files {
            self.add_article(&mut ctx, file);
        }

        for post in &ctx.posts {
            let category = if post.category.is_empty() {
                "uncategorized"
            } else {
                post.category.as_str()
            };
            tracing::info!("- {} (slug: {}) category: {}", post.title, post.slug, category);
        }

        let html = self.injector.inject(&template, &ctx.posts)?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let output_path = self.config.output_dir.join(self.page_name());
        fs::write(&output_path, &html).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let assets_copied = self.publish_assets()?;
        let companions = self.publish_companions(&html)?;

        Ok(BuildResult {
            files_found: files.len(),
            posts: ctx.posts.len(),
            skipped: ctx.failures.len(),
            assets_copied,
            companions,
            duration_ms: start.elapsed().as_millis() as u64,
            output_path,
        })
    }

    /// Turn one file into a post, or record why it could not be.
    fn add_article(&self, ctx: &mut BuildContext, path: &Path) {
        let relative = self.relative_path(path);

        match fs::read_to_string(path) {
            Ok(raw) => {
                let post =
                    Post::from_markdown(&raw, &relative, self.renderer.as_ref(), &mut ctx.slugs);
                ctx.posts.push(post);
            }
            Err(e) => {
                let failure = ArticleError {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                };
                tracing::error!("{}", failure);
                ctx.failures.push(failure);
            }
        }
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.config.articles_dir)
            .unwrap_or(path)
            .to_path_buf()
    }

    fn page_name(&self) -> &std::ffi::OsStr {
        self.config
            .template
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("index.html"))
    }

    fn publish_assets(&self) -> Result<usize, BuildError> {
        let publisher = AssetPublisher::new(self.config.minify);
        let mut copied = 0;

        for mount in &self.config.assets {
            copied += publisher.publish(mount, &self.config.output_dir)?;
        }

        Ok(copied)
    }

    fn publish_companions(&self, main_html: &str) -> Result<usize, BuildError> {
        if self.config.companions.is_empty() {
            return Ok(0);
        }

        let kit = AccessibilityKit::extract(main_html);
        if kit.is_empty() {
            tracing::warn!("Generated page has no accessibility controls to share");
        }

        let mut written = 0;

        for page in &self.config.companions {
            let Some(name) = page.source.file_name() else {
                continue;
            };
            let source = match fs::read_to_string(&page.source) {
                Ok(source) => source,
                Err(e) => {
                    tracing::debug!("Skipping companion {}: {}", page.source.display(), e);
                    continue;
                }
            };

            let html = integrate(&source, &kit, page.back_link.as_ref());
            let dest = self.config.output_dir.join(name);
            fs::write(&dest, html).map_err(|e| BuildError::WriteError(e.to_string()))?;

            tracing::info!("Integrated companion page {}", dest.display());
            written += 1;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::BackLink;
    use tempfile::{tempdir, TempDir};

    const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<body>
<button id="accessibility-btn">A</button>
<div id="accessibility-panel"><div>Opciones</div></div>
<main><div id="posts"></div></main>
<script>
  let blogPosts = [];
  renderPosts(blogPosts);
</script>
<script>
  const accBtn = document.getElementById('accessibility-btn');
</script>
</body>
</html>"#;

    struct Site {
        temp: TempDir,
    }

    impl Site {
        fn new() -> Self {
            let temp = tempdir().unwrap();
            fs::create_dir_all(temp.path().join("articles")).unwrap();
            fs::write(temp.path().join("index.html"), TEMPLATE).unwrap();
            Self { temp }
        }

        fn path(&self, rel: &str) -> PathBuf {
            self.temp.path().join(rel)
        }

        fn article(&self, rel: &str, content: &str) {
            let path = self.path("articles").join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        fn config(&self) -> BuildConfig {
            BuildConfig {
                articles_dir: self.path("articles"),
                template: self.path("index.html"),
                output_dir: self.path("dist"),
                sorted: true,
                assets: vec![AssetMount::new(self.path("assets"), "assets")],
                ..Default::default()
            }
        }

        fn embedded_posts(&self) -> Vec<serde_json::Value> {
            let html = fs::read_to_string(self.path("dist/index.html")).unwrap();
            let start = html.find("let blogPosts = ").unwrap() + "let blogPosts = ".len();
            let end = html[start..].find("];").unwrap() + start + 1;
            serde_json::from_str(&html[start..end]).unwrap()
        }
    }

    #[test]
    fn builds_posts_in_traversal_order() {
        let site = Site::new();
        site.article("a.md", "# Title\nFirst real line.");
        site.article("b.md", "---\ntitle: B Post\n---\nSecond.");

        let result = StaticBuilder::new(site.config()).build().unwrap();

        assert_eq!(result.files_found, 2);
        assert_eq!(result.posts, 2);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.output_path, site.path("dist/index.html"));

        let posts = site.embedded_posts();
        assert_eq!(posts[0]["title"], "a");
        assert_eq!(posts[0]["summary"], "First real line.");
        assert_eq!(posts[1]["title"], "B Post");
        assert_eq!(posts[1]["content"], "<p>Second.</p>\n");
    }

    #[test]
    fn slugs_are_unique_across_folders() {
        let site = Site::new();
        site.article("guides/foo.md", "One");
        site.article("notes/foo.md", "Two");
        site.article("foo-bar.md", "Three");

        StaticBuilder::new(site.config()).build().unwrap();

        let slugs: Vec<String> = site
            .embedded_posts()
            .iter()
            .map(|p| p["slug"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(slugs, vec!["foo-bar", "foo", "foo-1"]);
    }

    #[test]
    fn rebuilding_is_byte_identical() {
        let site = Site::new();
        site.article("salud/ansiedad.md", "---\ntags: [calma, respiracion]\n---\nRespira.");
        site.article("sueño.md", "Dormir bien.");

        let builder = StaticBuilder::new(site.config());
        builder.build().unwrap();
        let first = fs::read_to_string(site.path("dist/index.html")).unwrap();
        builder.build().unwrap();
        let second = fs::read_to_string(site.path("dist/index.html")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn missing_articles_dir_is_fatal() {
        let site = Site::new();
        let config = BuildConfig {
            articles_dir: site.path("nope"),
            ..site.config()
        };

        let err = StaticBuilder::new(config).build().unwrap_err();

        assert!(matches!(err, BuildError::Collect(CollectError::RootNotFound { .. })));
        assert!(!site.path("dist").exists());
    }

    #[test]
    fn missing_template_is_fatal() {
        let site = Site::new();
        site.article("a.md", "A");
        fs::remove_file(site.path("index.html")).unwrap();

        let err = StaticBuilder::new(site.config()).build().unwrap_err();

        assert!(matches!(err, BuildError::Template { ref path, .. } if *path == site.path("index.html")));
        assert!(!site.path("dist").exists());
    }

    #[test]
    fn missing_binding_is_fatal() {
        let site = Site::new();
        site.article("a.md", "A");
        fs::write(site.path("index.html"), "<html><body></body></html>").unwrap();

        let err = StaticBuilder::new(site.config()).build().unwrap_err();

        assert!(matches!(err, BuildError::Inject(InjectError::MissingBinding { .. })));
        assert!(err.to_string().contains("blogPosts"));
    }

    #[test]
    fn unreadable_article_is_skipped() {
        let site = Site::new();
        site.article("good.md", "Fine.");
        fs::write(site.path("articles/bad.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = StaticBuilder::new(site.config()).build().unwrap();

        assert_eq!(result.files_found, 2);
        assert_eq!(result.posts, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(site.embedded_posts()[0]["title"], "good");
    }

    #[test]
    fn script_close_in_content_is_escaped() {
        struct Raw;
        impl MarkdownRenderer for Raw {
            fn render(&self, body: &str) -> String {
                body.to_string()
            }
        }

        let site = Site::new();
        site.article("x.md", "<script>alert(1)</script>");

        StaticBuilder::with_renderer(site.config(), Box::new(Raw))
            .build()
            .unwrap();

        let html = fs::read_to_string(site.path("dist/index.html")).unwrap();
        let data_start = html.find("let blogPosts").unwrap();
        let data_end = html.find("renderPosts(blogPosts)").unwrap();
        assert!(!html[data_start..data_end].contains("</script>"));
        assert_eq!(site.embedded_posts()[0]["content"], "<script>alert(1)</script>");
    }

    #[test]
    fn copies_assets_and_integrates_companions() {
        let site = Site::new();
        site.article("a.md", "A");
        fs::create_dir_all(site.path("assets/js")).unwrap();
        fs::write(site.path("assets/js/contact.js"), "// contact").unwrap();
        fs::write(
            site.path("inclusion.html"),
            "<html><body><main><form class=\"space-y-6\"></form></main></body></html>",
        )
        .unwrap();

        let config = BuildConfig {
            companions: vec![
                CompanionPage {
                    source: site.path("inclusion.html"),
                    back_link: Some(BackLink {
                        href: "index.html".to_string(),
                        label: "Volver".to_string(),
                    }),
                },
                CompanionPage {
                    source: site.path("missing.html"),
                    back_link: None,
                },
            ],
            ..site.config()
        };

        let result = StaticBuilder::new(config).build().unwrap();

        assert_eq!(result.assets_copied, 1);
        assert_eq!(result.companions, 1);
        assert!(site.path("dist/assets/js/contact.js").exists());

        let inclusion = fs::read_to_string(site.path("dist/inclusion.html")).unwrap();
        assert!(inclusion.contains("id=\"accessibility-panel\""));
        assert!(inclusion.contains("const accBtn"));
        assert!(inclusion.contains("Volver"));
        assert!(inclusion.contains("<form id=\"contact-form\""));
        assert!(!inclusion.contains("blogPosts"));
    }
}
