// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subcommand implementations.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use storywerk_core::config::ExportResolution;
use storywerk_core::error::Result;
use storywerk_core::layer::{FontWeight, LayerContent};
use storywerk_core::{Document, EditorConfig, codec};
use storywerk_document::{Compositor, ExportFormat, Exporter, FontBook};
use storywerk_editor::EditorHandle;
use tracing::{info, warn};

/// Options of `storywerk export`.
#[derive(Debug, Clone, Default)]
pub struct ExportRequest {
    pub out: PathBuf,
    pub pdf: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fonts: Vec<PathBuf>,
}

/// Write an empty eight-page document.
pub fn new_document(path: &Path, config: &EditorConfig) -> Result<()> {
    codec::save(&Document::new(config.canvas_size), path)?;
    info!(path = %path.display(), "New story created");
    Ok(())
}

/// Human-readable outline of a document, top layer first on each page.
pub fn describe(document: &Document) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "canvas {}x{}, {} layers",
        document.canvas_size.width,
        document.canvas_size.height,
        document.layer_count()
    );
    for (index, page) in document.pages.iter().enumerate() {
        let _ = writeln!(out, "page {} ({} layers)", index + 1, page.len());
        for layer in page.layers.iter().rev() {
            let detail = match &layer.content {
                LayerContent::Text(text) => format!("{:?}", text.text),
                LayerContent::Image { data } => format!("{} bytes", data.len()),
                LayerContent::Drawing { data, size } => {
                    format!("{} bytes, authored {}x{}", data.len(), size.width, size.height)
                }
            };
            let hidden = if layer.is_hidden { " [hidden]" } else { "" };
            let _ = writeln!(
                out,
                "  {:<8} {} {}{}",
                layer.content.kind(),
                layer.id,
                detail,
                hidden
            );
        }
    }
    out
}

pub fn inspect(path: &Path) -> Result<String> {
    Ok(describe(&codec::load(path)?))
}

/// Export `path` into `request.out`. Returns the written files.
pub async fn export(
    path: &Path,
    config: EditorConfig,
    request: &ExportRequest,
) -> Result<Vec<PathBuf>> {
    let mut compositor = Compositor::from_config(&config);
    let mut options = compositor.options();
    options.resolution = ExportResolution::new(
        request.width.unwrap_or(config.export_resolution.width),
        request.height.unwrap_or(config.export_resolution.height),
    );
    compositor = compositor.with_options(options);

    if !request.fonts.is_empty() {
        let mut book = FontBook::new();
        for font in &request.fonts {
            let (family, weight, italic) = face_from_file_name(font);
            book.load_file(family, weight, italic, font)?;
        }
        compositor = compositor.with_fonts(Arc::new(book));
    } else {
        warn!("No --font given, text layers will not be rendered");
    }

    let title = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Storywerk Story".into());
    let exporter = Exporter::new(compositor).with_title(title);

    let handle = EditorHandle::from_config(config);
    handle.load(path).await?;

    let format = if request.pdf { ExportFormat::Pdf } else { ExportFormat::Png };
    let output = handle.export(&exporter, format).await?;
    output.write_to_dir(&request.out)
}

/// Guess family, weight, and slant from names like `Inter-SemiboldItalic.ttf`.
pub fn face_from_file_name(path: &Path) -> (String, FontWeight, bool) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (family, style) = match stem.split_once('-') {
        Some((family, style)) => (family.to_owned(), style.to_ascii_lowercase()),
        None => (stem.clone(), String::new()),
    };
    let italic = style.contains("italic") || style.contains("oblique");
    let style = style.replace("italic", "").replace("oblique", "");

    // Longest match first so "semibold" is not read as "bold".
    let mut weights = FontWeight::ALL;
    weights.sort_by_key(|w| std::cmp::Reverse(w.name().len()));
    let weight = weights
        .into_iter()
        .find(|w| !style.is_empty() && style.contains(&w.name().to_ascii_lowercase()))
        .unwrap_or_default();

    (family, weight, italic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storywerk_core::layer::{Layer, Point, Rgba, TextContent};

    #[test]
    fn font_names_are_parsed() {
        assert_eq!(
            face_from_file_name(Path::new("fonts/Inter-SemiboldItalic.ttf")),
            ("Inter".into(), FontWeight::Semibold, true)
        );
        assert_eq!(
            face_from_file_name(Path::new("Inter-Bold.otf")),
            ("Inter".into(), FontWeight::Bold, false)
        );
        assert_eq!(
            face_from_file_name(Path::new("Lora.ttf")),
            ("Lora".into(), FontWeight::Regular, false)
        );
    }

    #[test]
    fn describe_lists_top_layer_first() {
        let mut doc = Document::default();
        let bottom = Layer::image(vec![0u8; 3], Point::default());
        let mut top = Layer::text(TextContent::new("Hi", 20.0, Rgba::WHITE), Point::default());
        top.is_hidden = true;
        doc.pages[1].layers = vec![bottom, top];

        let text = describe(&doc);
        let image_at = text.find("image").expect("image line");
        let text_at = text.find("text ").expect("text line");
        assert!(text_at < image_at);
        assert!(text.contains("[hidden]"));
        assert!(text.contains("page 8 (0 layers)"));
    }

    #[tokio::test]
    async fn new_then_export_writes_eight_pngs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let story = dir.path().join("story.json");
        let config = EditorConfig::default();
        new_document(&story, &config).expect("new");

        let request = ExportRequest {
            out: dir.path().join("out"),
            width: Some(54),
            height: Some(96),
            ..ExportRequest::default()
        };
        let written = export(&story, config, &request).await.expect("export");
        assert_eq!(written.len(), 8);
        assert!(written.iter().all(|p| p.is_file()));
    }

    #[tokio::test]
    async fn pdf_export_writes_one_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let story = dir.path().join("story.json");
        let config = EditorConfig::default();
        new_document(&story, &config).expect("new");

        let request = ExportRequest {
            out: dir.path().to_path_buf(),
            pdf: true,
            width: Some(54),
            height: Some(96),
            ..ExportRequest::default()
        };
        let written = export(&story, config, &request).await.expect("export");
        assert_eq!(written, vec![dir.path().join("story.pdf")]);
    }
}
