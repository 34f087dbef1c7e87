//! HTML preview generation
//!
//! Builds a self-contained HTML page showing the extracted thumbnails as
//! a card grid, one section per page or finish, for quick visual
//! inspection before reconciliation is applied.

use std::path::{Path, PathBuf};

use crate::Result;

/// One titled group of thumbnails.
#[derive(Debug, Clone)]
pub struct PreviewSection {
    /// Section heading, e.g. `Glossy — page 1 (26)`
    pub title: String,
    /// Thumbnail paths as they should appear in `src` attributes
    pub image_paths: Vec<PathBuf>,
}

/// Render sections into a standalone HTML document
pub fn render_preview(title: &str, sections: &[PreviewSection]) -> String {
    let mut html = String::new();
    html.push_str("<!doctype html>\n<html lang=\"fr\">\n<head>\n");
    html.push_str("  <meta charset=\"utf-8\" />\n");
    html.push_str("  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");
    html.push_str(&format!("  <title>{}</title>\n", escape(title)));
    html.push_str("  <style>\n");
    html.push_str("    body { font-family: Arial, sans-serif; margin: 20px; }\n");
    html.push_str("    .section { margin: 24px 0; }\n");
    html.push_str("    .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(120px, 1fr)); gap: 12px; }\n");
    html.push_str("    .card { border: 1px solid #ddd; border-radius: 8px; padding: 8px; text-align: center; }\n");
    html.push_str("    .thumb { width: 100%; height: 90px; object-fit: cover; border-radius: 6px; border: 1px solid #eee; }\n");
    html.push_str("    .label { margin-top: 6px; font-size: 12px; color: #555; }\n");
    html.push_str("  </style>\n</head>\n<body>\n");
    html.push_str(&format!("  <h1>{}</h1>\n", escape(title)));

    for section in sections {
        html.push_str("  <div class=\"section\">\n");
        html.push_str(&format!("    <h2>{}</h2>\n", escape(&section.title)));
        html.push_str("    <div class=\"grid\">\n");
        for path in &section.image_paths {
            let src = path.to_string_lossy();
            let label = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            html.push_str("      <div class=\"card\">\n");
            html.push_str(&format!(
                "        <img class=\"thumb\" src=\"{}\" alt=\"{}\" />\n",
                escape(&src),
                escape(&label)
            ));
            html.push_str(&format!("        <div class=\"label\">{}</div>\n", escape(&label)));
            html.push_str("      </div>\n");
        }
        html.push_str("    </div>\n  </div>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Render and write a preview file
pub fn write_preview(path: &Path, title: &str, sections: &[PreviewSection]) -> Result<()> {
    std::fs::write(path, render_preview(title, sections))?;
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
