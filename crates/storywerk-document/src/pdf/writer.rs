// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer — assemble composited page rasters into a paginated PDF using
// `printpdf` 0.8.
//
// printpdf 0.8 uses a data-oriented API: documents are built by constructing
// `PdfPage` structs containing `Vec<Op>` operation lists, then serialised via
// `PdfDocument::save()`.

use image::{DynamicImage, RgbaImage};
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use storywerk_core::error::{Result, StorywerkError};
use tracing::{debug, info, instrument, warn};

/// Resolution rasters are placed at unless overridden.
pub const DEFAULT_DPI: f32 = 150.0;

const MM_PER_INCH: f32 = 25.4;

/// Builds a PDF with one full-bleed page per raster.
///
/// Each page is exactly the size of its raster at the configured DPI, so a
/// 1080x1920 export at 150 DPI yields 182.88 x 325.12 mm pages.
pub struct PdfWriter {
    /// Title metadata embedded in the PDF /Info dictionary.
    title: Option<String>,
    dpi: f32,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self {
            title: None,
            dpi: DEFAULT_DPI,
        }
    }

    /// Set a title for the PDF metadata.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Place rasters at `dpi` instead of the default 150.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Page dimensions for a raster of `width` x `height` pixels.
    pub fn page_dimensions(&self, width: u32, height: u32) -> (Mm, Mm) {
        (
            Mm(width as f32 / self.dpi * MM_PER_INCH),
            Mm(height as f32 / self.dpi * MM_PER_INCH),
        )
    }

    /// Create a PDF with one page per raster, in order.
    #[instrument(skip(self, rasters), fields(pages = rasters.len()))]
    pub fn create_from_rasters(&self, rasters: &[RgbaImage]) -> Result<Vec<u8>> {
        if rasters.is_empty() {
            return Err(StorywerkError::PdfError("no pages to write".into()));
        }
        if !(self.dpi.is_finite() && self.dpi > 0.0) {
            return Err(StorywerkError::PdfError(format!("invalid DPI {}", self.dpi)));
        }

        let title = self.title.as_deref().unwrap_or("Storywerk Story");
        info!(title, dpi = self.dpi, "Creating paginated PDF");

        let mut doc = PdfDocument::new(title);
        let mut pages: Vec<PdfPage> = Vec::with_capacity(rasters.len());

        for raster in rasters {
            let (width, height) = raster.dimensions();
            // printpdf takes opaque RGB here; alpha is dropped, the
            // compositor has already flattened onto the background.
            let rgb = DynamicImage::ImageRgba8(raster.clone()).to_rgb8();
            let raw = RawImage {
                pixels: RawImageData::U8(rgb.into_raw()),
                width: width as usize,
                height: height as usize,
                data_format: RawImageFormat::RGB8,
                tag: Vec::new(),
            };
            let xobject_id = doc.add_image(&raw);

            let ops = vec![Op::UseXobject {
                id: xobject_id,
                transform: XObjectTransform {
                    translate_x: Some(Pt(0.0)),
                    translate_y: Some(Pt(0.0)),
                    scale_x: None,
                    scale_y: None,
                    dpi: Some(self.dpi),
                    rotate: None,
                },
            }];

            let (page_w, page_h) = self.page_dimensions(width, height);
            pages.push(PdfPage::new(page_w, page_h, ops));
        }

        doc.with_pages(pages);
        debug!(pages = doc.pages.len(), "Pages assembled");

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let output = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "PDF serialisation reported warnings");
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(30, 60, Rgba(pixel))
    }

    #[test]
    fn one_pdf_page_per_raster() {
        let rasters = vec![
            solid([255, 0, 0, 255]),
            solid([0, 255, 0, 255]),
            solid([0, 0, 255, 255]),
        ];
        let bytes = PdfWriter::new().create_from_rasters(&rasters).expect("pdf");

        assert!(bytes.starts_with(b"%PDF"));
        let parsed = lopdf::Document::load_mem(&bytes).expect("parse");
        assert_eq!(parsed.get_pages().len(), 3);
    }

    #[test]
    fn empty_raster_list_is_rejected() {
        let result = PdfWriter::new().create_from_rasters(&[]);
        assert!(matches!(result, Err(StorywerkError::PdfError(_))));
    }

    #[test]
    fn page_size_follows_dpi() {
        let (w, h) = PdfWriter::new().page_dimensions(150, 300);
        assert!((w.0 - 25.4).abs() < 1e-3);
        assert!((h.0 - 50.8).abs() < 1e-3);

        let (w, _) = PdfWriter::new().with_dpi(300.0).page_dimensions(150, 300);
        assert!((w.0 - 12.7).abs() < 1e-3);
    }
}
