// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Exporter — per-page rasters and the paginated PDF for a whole document.

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use storywerk_core::document::Document;
use storywerk_core::error::{Result, StorywerkError};
use storywerk_core::layer::{Layer, Size};
use tracing::{info, instrument};

use crate::compose::Compositor;
use crate::image::processor::encode_to_format;
use crate::pdf::writer::PdfWriter;

/// File name of a PDF export inside the output directory.
pub const PDF_FILE_NAME: &str = "story.pdf";

/// Output container for a whole-document export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One PNG per page.
    #[default]
    Png,
    /// A single PDF with one page per document page.
    Pdf,
}

/// Encoded export result.
#[derive(Debug, Clone)]
pub enum ExportOutput {
    /// PNG bytes in page order.
    Pngs(Vec<Vec<u8>>),
    Pdf(Vec<u8>),
}

impl ExportOutput {
    /// Write into `dir` as `page-1.png` .. `page-8.png`, or `story.pdf`.
    /// Returns the written paths.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let written = match self {
            Self::Pngs(pages) => {
                let mut paths = Vec::with_capacity(pages.len());
                for (index, bytes) in pages.iter().enumerate() {
                    let path = dir.join(format!("page-{}.png", index + 1));
                    std::fs::write(&path, bytes)?;
                    paths.push(path);
                }
                paths
            }
            Self::Pdf(bytes) => {
                let path = dir.join(PDF_FILE_NAME);
                std::fs::write(&path, bytes)?;
                vec![path]
            }
        };
        info!(dir = %dir.display(), files = written.len(), "Export written");
        Ok(written)
    }
}

/// Encode a raster as PNG.
pub fn encode_png(raster: &RgbaImage) -> Result<Vec<u8>> {
    encode_to_format(raster, ImageFormat::Png)
}

/// Drives the compositor across a document's pages.
#[derive(Clone)]
pub struct Exporter {
    compositor: Compositor,
    title: Option<String>,
}

impl Exporter {
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Compositor for `document`, honouring the canvas it was authored on.
    fn compositor_for(&self, document: &Document) -> Compositor {
        self.compositor.clone().with_canvas_size(document.canvas_size)
    }

    /// Composite a single page.
    #[instrument(skip(self, document))]
    pub fn export_page(&self, document: &Document, index: usize) -> Result<RgbaImage> {
        let page = document.page(index).ok_or(StorywerkError::PageOutOfRange(index))?;
        Ok(self.compositor_for(document).compose(&page.layers))
    }

    /// Composite a detached layer list authored on `canvas_size`.
    pub fn export_layers(&self, canvas_size: Size, layers: &[Layer]) -> RgbaImage {
        self.compositor.clone().with_canvas_size(canvas_size).compose(layers)
    }

    /// Composite every page, in page order.
    #[instrument(skip_all)]
    pub fn export_all_pages(&self, document: &Document) -> Vec<RgbaImage> {
        let compositor = self.compositor_for(document);
        let rasters: Vec<RgbaImage> = document
            .pages
            .iter()
            .map(|page| compositor.compose(&page.layers))
            .collect();
        info!(pages = rasters.len(), "All pages exported");
        rasters
    }

    /// One PDF page per document page.
    pub fn export_pdf(&self, document: &Document) -> Result<Vec<u8>> {
        let rasters = self.export_all_pages(document);
        self.pdf_from_rasters(&rasters)
    }

    /// Assemble already composited pages into a PDF.
    pub fn pdf_from_rasters(&self, rasters: &[RgbaImage]) -> Result<Vec<u8>> {
        let mut writer = PdfWriter::new();
        if let Some(title) = &self.title {
            writer.set_title(title.clone());
        }
        writer.create_from_rasters(rasters)
    }

    /// Export the whole document in `format`.
    pub fn export(&self, document: &Document, format: ExportFormat) -> Result<ExportOutput> {
        match format {
            ExportFormat::Png => {
                let pngs = self
                    .export_all_pages(document)
                    .iter()
                    .map(encode_png)
                    .collect::<Result<Vec<_>>>()?;
                Ok(ExportOutput::Pngs(pngs))
            }
            ExportFormat::Pdf => Ok(ExportOutput::Pdf(self.export_pdf(document)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ExportOptions;
    use crate::image::processor::ImageProcessor;
    use image::Rgba;
    use storywerk_core::config::ExportResolution;
    use storywerk_core::document::PAGE_COUNT;
    use storywerk_core::layer::{Point, Rgba as Colour};

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    fn png(pixel: [u8; 4]) -> Vec<u8> {
        ImageProcessor::from_rgba(RgbaImage::from_pixel(4, 4, Rgba(pixel)))
            .to_png_bytes()
            .expect("png")
    }

    fn exporter() -> Exporter {
        let compositor = Compositor::new(
            Size::new(108.0, 192.0),
            ExportOptions {
                resolution: ExportResolution::new(108, 192),
                background: Colour::BLACK,
            },
        )
        .with_image_base_width(20.0);
        Exporter::new(compositor)
    }

    /// Page 5 (index 4) holds a hidden red square and a visible green one.
    fn story() -> Document {
        let mut doc = Document::new(Size::new(108.0, 192.0));
        let mut hidden = Layer::image(png(RED), Point::new(30.0, 50.0));
        hidden.is_hidden = true;
        let visible = Layer::image(png(GREEN), Point::new(70.0, 140.0));
        doc.pages[4].layers = vec![hidden, visible];
        doc
    }

    #[test]
    fn page_five_shows_only_visible_layer() {
        let pages = exporter().export_all_pages(&story());
        assert_eq!(pages.len(), PAGE_COUNT);

        let page_five = &pages[4];
        assert_eq!(page_five.get_pixel(70, 140).0, GREEN);
        assert_eq!(page_five.get_pixel(30, 50).0, BLACK);
        assert!(page_five.pixels().all(|p| p.0 != RED));

        for (index, page) in pages.iter().enumerate().filter(|(i, _)| *i != 4) {
            assert!(page.pixels().all(|p| p.0 == BLACK), "page {index} should be blank");
        }
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let result = exporter().export_page(&story(), PAGE_COUNT);
        assert!(matches!(result, Err(StorywerkError::PageOutOfRange(8))));
    }

    #[test]
    fn pdf_has_eight_pages_in_order() {
        let bytes = exporter().with_title("Story").export_pdf(&story()).expect("pdf");
        let parsed = lopdf::Document::load_mem(&bytes).expect("parse");
        assert_eq!(parsed.get_pages().len(), PAGE_COUNT);
    }

    #[test]
    fn png_export_writes_numbered_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = exporter().export(&story(), ExportFormat::Png).expect("export");
        let paths = output.write_to_dir(dir.path()).expect("write");

        assert_eq!(paths.len(), PAGE_COUNT);
        assert_eq!(paths[0], dir.path().join("page-1.png"));
        assert_eq!(paths[7], dir.path().join("page-8.png"));

        let bytes = std::fs::read(&paths[4]).expect("read");
        let page_five = ImageProcessor::from_bytes(&bytes).expect("decode");
        assert_eq!(page_five.as_rgba().get_pixel(70, 140).0, GREEN);
    }

    #[test]
    fn pdf_export_writes_single_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let output = exporter().export(&story(), ExportFormat::Pdf).expect("export");
        let paths = output.write_to_dir(dir.path()).expect("write");
        assert_eq!(paths, vec![dir.path().join(PDF_FILE_NAME)]);
    }
}
