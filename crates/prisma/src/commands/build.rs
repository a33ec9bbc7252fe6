//! Static site build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use prisma_static::{AssetMount, BackLink, BuildConfig, CompanionPage, StaticBuilder};
use serde::Deserialize;

/// Configuration file structure (site.toml).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    content: ContentConfig,
    #[serde(default)]
    build: BuildSettings,
    #[serde(default = "default_assets")]
    assets: Vec<AssetConfig>,
    #[serde(default)]
    companions: Vec<CompanionConfig>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    #[serde(default = "default_articles_dir")]
    dir: String,
    #[serde(default = "default_template")]
    template: String,
    #[serde(default = "default_output")]
    output: String,
    #[serde(default = "default_binding")]
    binding: String,
    #[serde(default)]
    sorted: bool,
}

#[derive(Debug, Deserialize)]
struct BuildSettings {
    #[serde(default = "default_minify")]
    minify: bool,
}

#[derive(Debug, Deserialize)]
struct AssetConfig {
    source: String,
    /// Defaults to the source directory name
    target: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompanionConfig {
    source: String,
    back_link: Option<BackLinkConfig>,
}

#[derive(Debug, Deserialize)]
struct BackLinkConfig {
    #[serde(default = "default_back_href")]
    href: String,
    label: String,
}

fn default_articles_dir() -> String {
    "src/publicaciones".to_string()
}
fn default_template() -> String {
    "index.html".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_binding() -> String {
    prisma_static::DEFAULT_BINDING.to_string()
}
fn default_minify() -> bool {
    true
}
fn default_back_href() -> String {
    "index.html".to_string()
}
fn default_assets() -> Vec<AssetConfig> {
    vec![AssetConfig {
        source: "assets".to_string(),
        target: None,
    }]
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            content: ContentConfig::default(),
            build: BuildSettings::default(),
            assets: default_assets(),
            companions: Vec::new(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dir: default_articles_dir(),
            template: default_template(),
            output: default_output(),
            binding: default_binding(),
            sorted: false,
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            minify: default_minify(),
        }
    }
}

/// Command line values that win over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub minify: Option<bool>,
    pub sorted: Option<bool>,
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        tracing::info!("Loaded config from {}", path.display());
        return Ok(config);
    }
    Ok(ConfigFile::default())
}

fn resolve(file: ConfigFile, overrides: Overrides) -> BuildConfig {
    let assets = file
        .assets
        .into_iter()
        .map(|asset| {
            let target = asset.target.unwrap_or_else(|| {
                Path::new(&asset.source)
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            AssetMount::new(asset.source, target)
        })
        .collect();

    let companions = file
        .companions
        .into_iter()
        .map(|page| CompanionPage {
            source: PathBuf::from(page.source),
            back_link: page.back_link.map(|link| BackLink {
                href: link.href,
                label: link.label,
            }),
        })
        .collect();

    BuildConfig {
        articles_dir: PathBuf::from(&file.content.dir),
        template: PathBuf::from(&file.content.template),
        output_dir: overrides
            .output
            .unwrap_or_else(|| PathBuf::from(&file.content.output)),
        binding: file.content.binding,
        sorted: overrides.sorted.unwrap_or(file.content.sorted),
        minify: overrides.minify.unwrap_or(file.build.minify),
        assets,
        companions,
    }
}

/// Run the build command.
pub fn run(config_path: &Path, overrides: Overrides) -> Result<()> {
    tracing::info!("Building site...");

    let config = resolve(load_config(config_path)?, overrides);
    let result = StaticBuilder::new(config).build()?;

    if result.skipped > 0 {
        tracing::warn!("Skipped {} articles with errors", result.skipped);
    }

    tracing::info!(
        "Built {} posts from {} files, copied {} assets and {} companion pages in {}ms",
        result.posts,
        result.files_found,
        result.assets_copied,
        result.companions,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_path.display());

    Ok(())
}
