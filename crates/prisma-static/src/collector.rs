//! Markdown source discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Options for [`collect_markdown`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectOptions {
    /// Visit directory entries by file name instead of listing order
    pub sorted: bool,
}

/// Errors that can occur while collecting sources.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("Articles directory not found: {}", .path.display())]
    RootNotFound { path: PathBuf },
}

/// Find every `.md` file (extension matched case-insensitively) below `root`,
/// depth first.
///
/// Entries that cannot be read are logged and skipped. Only a missing root
/// is an error.
pub fn collect_markdown(root: &Path, options: CollectOptions) -> Result<Vec<PathBuf>, CollectError> {
    if !root.is_dir() {
        return Err(CollectError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut walker = WalkDir::new(root).follow_links(true);
    if options.sorted {
        walker = walker.sort_by_file_name();
    }

    let mut files = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}
