//! Scaffold a new site.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command in `root`.
pub fn run(root: &Path, config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing site in {}...", root.display());

    let articles_dir = root.join("src/publicaciones");
    fs::create_dir_all(&articles_dir).context("Failed to create articles directory")?;

    let js_dir = root.join("assets/js");
    fs::create_dir_all(&js_dir).context("Failed to create assets directory")?;

    write_scaffold(&root.join(config_path), DEFAULT_CONFIG, yes)?;
    write_scaffold(&root.join("index.html"), DEFAULT_TEMPLATE, yes)?;
    write_scaffold(&articles_dir.join("bienvenida.md"), DEFAULT_ARTICLE, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'prisma build' to generate the site.");

    Ok(())
}

fn write_scaffold(path: &Path, content: &str, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        tracing::warn!("{} already exists. Use --yes to overwrite.", path.display());
        return Ok(());
    }

    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Prisma configuration

[content]
# Markdown articles, sub-folder names become fallback categories
dir = "src/publicaciones"

# Page template declaring `let blogPosts = [];` in an inline script
template = "index.html"

# Output directory
output = "dist"

[build]
# Minify copied stylesheets
minify = true

[[assets]]
source = "assets"

# Hand-written pages that receive the accessibility controls
# [[companions]]
# source = "src/inclusion.html"
# back_link = { href = "index.html", label = "Volver al inicio" }
"#;

const DEFAULT_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="es">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Publicaciones</title>
</head>
<body>
  <button id="accessibility-btn" aria-controls="accessibility-panel">Accesibilidad</button>
  <div id="accessibility-panel" hidden>
    <label for="disability-type">Perfil</label>
    <select id="disability-type">
      <option value="">Ninguno</option>
      <option value="visual">Visual</option>
      <option value="dislexia">Dislexia</option>
    </select>
  </div>

  <main>
    <div id="posts"></div>
  </main>

  <script>
    let blogPosts = [];

    const list = document.getElementById('posts');
    for (const post of blogPosts) {
      const card = document.createElement('article');
      card.innerHTML = '<h2></h2><p></p>';
      card.querySelector('h2').textContent = post.title;
      card.querySelector('p').textContent = post.summary;
      list.appendChild(card);
    }
  </script>
  <script>
    const accBtn = document.getElementById('accessibility-btn');
    const accPanel = document.getElementById('accessibility-panel');
    accBtn.onclick = () => { accPanel.hidden = !accPanel.hidden; };
  </script>
</body>
</html>
"##;

const DEFAULT_ARTICLE: &str = r#"---
title: Bienvenida
description: Primera publicación del sitio.
tags: [inicio, guia]
---

# Bienvenida

Escribe tus artículos en Markdown dentro de `src/publicaciones`.
"#;
