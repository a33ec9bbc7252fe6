//! Static site generator for prisma.
//!
//! Collects Markdown articles, embeds the normalized posts into an HTML
//! template and publishes the page with its assets and companion pages.

pub mod assets;
pub mod builder;
pub mod collector;
pub mod companion;
pub mod inject;

pub use assets::{AssetMount, AssetPublisher};
pub use builder::{ArticleError, BuildConfig, BuildContext, BuildError, BuildResult, StaticBuilder};
pub use collector::{collect_markdown, CollectError, CollectOptions};
pub use companion::{AccessibilityKit, BackLink, CompanionPage};
pub use inject::{InjectError, TemplateInjector, DEFAULT_BINDING};
