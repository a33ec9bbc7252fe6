//! Static asset publishing.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A directory copied into the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMount {
    /// Source directory
    pub source: PathBuf,
    /// Destination, relative to the output directory
    pub target: PathBuf,
}

impl AssetMount {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Errors that can occur while publishing assets.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Failed to copy asset {}: {message}", .path.display())]
    Copy { path: PathBuf, message: String },
}

impl AssetError {
    fn copy(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Copy {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Copies asset directories, optionally minifying stylesheets on the way.
#[derive(Debug, Clone, Default)]
pub struct AssetPublisher {
    minify_css: bool,
}

impl AssetPublisher {
    pub fn new(minify_css: bool) -> Self {
        Self { minify_css }
    }

    /// Copy `mount.source` recursively into `output_dir/mount.target`.
    ///
    /// A missing source directory is skipped. Returns the number of files
    /// written.
    pub fn publish(&self, mount: &AssetMount, output_dir: &Path) -> Result<usize, AssetError> {
        if !mount.source.is_dir() {
            tracing::debug!("No assets at {}, skipping", mount.source.display());
            return Ok(0);
        }

        let dest_root = output_dir.join(&mount.target);
        let mut copied = 0;

        for entry in WalkDir::new(&mount.source).follow_links(true) {
            let entry = entry.map_err(|e| AssetError::copy(&mount.source, e))?;
            let relative = entry
                .path()
                .strip_prefix(&mount.source)
                .unwrap_or(entry.path());
            let dest = dest_root.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| AssetError::copy(&dest, e))?;
            } else if entry.file_type().is_file() {
                self.copy_file(entry.path(), &dest)?;
                copied += 1;
            }
        }

        tracing::info!(
            "Copied {} asset files from {} to {}",
            copied,
            mount.source.display(),
            dest_root.display()
        );

        Ok(copied)
    }

    fn copy_file(&self, source: &Path, dest: &Path) -> Result<(), AssetError> {
        let is_css = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("css"));

        if !(self.minify_css && is_css) {
            fs::copy(source, dest).map_err(|e| AssetError::copy(source, e))?;
            return Ok(());
        }

        let css = fs::read_to_string(source).map_err(|e| AssetError::copy(source, e))?;
        let output = match minify_css(&css) {
            Ok(minified) => minified,
            Err(e) => {
                tracing::warn!("Copying {} unminified: {}", source.display(), e);
                css
            }
        };
        fs::write(dest, output).map_err(|e| AssetError::copy(dest, e))
    }
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}
