// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Text rasterization for text layers.
//
// Fonts are supplied by the caller through `FontProvider`; the engine never
// discovers system fonts. When no face resolves, the text layer renders as
// nothing.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use storywerk_core::error::{Result, StorywerkError};
use storywerk_core::layer::{FontWeight, TextContent};
use tracing::{debug, info, instrument};

use crate::image::processor::MAX_RASTER_EDGE;

/// Padding, in pixels, around a rendered text block.
const TEXT_PADDING: u32 = 2;

/// Resolves the face a text layer should be drawn with.
pub trait FontProvider: Send + Sync {
    /// Best face for the request, or `None` if nothing usable is available.
    fn font_for(&self, family: Option<&str>, weight: FontWeight, italic: bool) -> Option<FontArc>;
}

/// A registered font face.
#[derive(Clone)]
pub struct FontFace {
    pub family: String,
    pub weight: FontWeight,
    pub italic: bool,
    font: FontArc,
}

/// In-memory `FontProvider` populated by the host application.
///
/// Lookup prefers the requested family (any face when the family is absent or
/// unknown), then matching slant, then the nearest numeric weight.
#[derive(Clone, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a face from raw TrueType/OpenType bytes.
    pub fn add(
        &mut self,
        family: impl Into<String>,
        weight: FontWeight,
        italic: bool,
        data: Vec<u8>,
    ) -> Result<()> {
        let family = family.into();
        let font = FontArc::try_from_vec(data)
            .map_err(|err| StorywerkError::Font(format!("{family}: {err}")))?;
        debug!(family = %family, weight = weight.name(), italic, "Font face registered");
        self.faces.push(FontFace {
            family,
            weight,
            italic,
            font,
        });
        Ok(())
    }

    /// Register a face from a font file.
    #[instrument(skip(self, family, path), fields(path = %path.as_ref().display()))]
    pub fn load_file(
        &mut self,
        family: impl Into<String>,
        weight: FontWeight,
        italic: bool,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let data = std::fs::read(path.as_ref())?;
        self.add(family, weight, italic, data)?;
        info!("Font file loaded");
        Ok(())
    }

    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// The registered face that best serves the request.
    pub fn face_for(
        &self,
        family: Option<&str>,
        weight: FontWeight,
        italic: bool,
    ) -> Option<&FontFace> {
        let family_matches =
            |face: &&FontFace| family.is_some_and(|f| face.family.eq_ignore_ascii_case(f));
        let in_family = self.faces.iter().any(|face| family_matches(&face));

        self.faces
            .iter()
            .filter(|face| !in_family || family_matches(face))
            .min_by_key(|face| {
                let slant_penalty = if face.italic == italic { 0 } else { 1000 };
                slant_penalty + face.weight.numeric().abs_diff(weight.numeric())
            })
    }
}

impl FontProvider for FontBook {
    fn font_for(&self, family: Option<&str>, weight: FontWeight, italic: bool) -> Option<FontArc> {
        self.face_for(family, weight, italic)
            .map(|face| face.font.clone())
    }
}

/// Render `content` at `scale` pixels per logical point onto a tightly sized
/// transparent raster. Lines are centred. `None` for blank text.
pub fn rasterize_text(
    content: &TextContent,
    font: &FontArc,
    scale: f32,
) -> Result<Option<RgbaImage>> {
    let px = content.font_size * scale;
    if content.text.trim().is_empty() || !(px.is_finite() && px >= 1.0) {
        return Ok(None);
    }
    let px_scale = PxScale::from(px);
    let scaled = font.as_scaled(px_scale);
    let line_height = (scaled.ascent() - scaled.descent() + scaled.line_gap())
        .ceil()
        .max(1.0) as u32;

    let lines: Vec<&str> = content.text.lines().collect();
    let widths: Vec<u32> = lines
        .iter()
        .map(|line| text_size(px_scale, font, line).0)
        .collect();
    let text_width = widths.iter().copied().max().unwrap_or(0);
    if text_width == 0 {
        return Ok(None);
    }

    let width = text_width + 2 * TEXT_PADDING;
    let height = line_height * lines.len() as u32 + 2 * TEXT_PADDING;
    if width > MAX_RASTER_EDGE || height > MAX_RASTER_EDGE {
        return Err(StorywerkError::ImageError(format!(
            "text raster {width}x{height} exceeds the size limit"
        )));
    }

    let mut canvas = RgbaImage::new(width, height);
    let colour = Rgba(content.color.to_rgba8());
    for (index, (line, line_width)) in lines.iter().zip(&widths).enumerate() {
        let x = TEXT_PADDING + (text_width - line_width) / 2;
        let y = TEXT_PADDING + index as u32 * line_height;
        draw_text_mut(&mut canvas, colour, x as i32, y as i32, px_scale, font, line);
    }
    Ok(Some(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storywerk_core::layer::Rgba as Colour;

    const TUFFY: &[u8] = include_bytes!("../../tests/fonts/Tuffy.ttf");

    fn book(faces: &[(&str, FontWeight, bool)]) -> FontBook {
        let mut book = FontBook::new();
        for &(family, weight, italic) in faces {
            book.add(family, weight, italic, TUFFY.to_vec()).expect("font");
        }
        book
    }

    fn tuffy() -> FontArc {
        FontArc::try_from_slice(TUFFY).expect("font")
    }

    fn text(content: &str) -> TextContent {
        TextContent::new(content, 24.0, Colour::WHITE)
    }

    /// Leftmost column with any ink in rows `rows`.
    fn first_inked_column(raster: &RgbaImage, rows: std::ops::Range<u32>) -> Option<u32> {
        (0..raster.width()).find(|&x| rows.clone().any(|y| raster.get_pixel(x, y).0[3] > 0))
    }

    #[test]
    fn face_resolves_by_weight_and_slant() {
        let book = book(&[
            ("Tuffy", FontWeight::Regular, false),
            ("Tuffy", FontWeight::Bold, false),
            ("Tuffy", FontWeight::Regular, true),
        ]);

        let face = book.face_for(Some("Tuffy"), FontWeight::Bold, false).expect("face");
        assert_eq!((face.weight, face.italic), (FontWeight::Bold, false));

        let face = book.face_for(Some("tuffy"), FontWeight::Regular, true).expect("face");
        assert_eq!((face.weight, face.italic), (FontWeight::Regular, true));

        // Slant outranks weight.
        let face = book.face_for(Some("Tuffy"), FontWeight::Black, true).expect("face");
        assert_eq!((face.weight, face.italic), (FontWeight::Regular, true));

        assert!(book.font_for(None, FontWeight::Regular, false).is_some());
    }

    #[test]
    fn missing_weight_falls_back_to_nearest() {
        let book = book(&[
            ("Tuffy", FontWeight::Light, false),
            ("Tuffy", FontWeight::Semibold, false),
            ("Tuffy", FontWeight::Black, false),
        ]);
        let face = book.face_for(Some("Tuffy"), FontWeight::Bold, false).expect("face");
        assert_eq!(face.weight, FontWeight::Semibold);
    }

    #[test]
    fn requested_family_wins_over_closer_weight() {
        let book = book(&[
            ("Tuffy", FontWeight::Bold, false),
            ("Serif", FontWeight::Thin, false),
        ]);
        let face = book.face_for(Some("Serif"), FontWeight::Bold, false).expect("face");
        assert_eq!(face.family, "Serif");

        // Unknown families fall back to any registered face.
        let face = book.face_for(Some("Mono"), FontWeight::Bold, false).expect("face");
        assert_eq!(face.family, "Tuffy");
    }

    #[test]
    fn text_is_rasterized_with_ink() {
        let raster = rasterize_text(&text("Hello"), &tuffy(), 1.0)
            .expect("render")
            .expect("raster");
        assert!(raster.width() > raster.height());
        assert!(raster.pixels().any(|p| p.0[3] > 0));
        assert!(raster.pixels().filter(|p| p.0[3] == 255).all(|p| p.0 == [255; 4]));

        let doubled = rasterize_text(&text("Hello"), &tuffy(), 2.0)
            .expect("render")
            .expect("raster");
        assert!(doubled.width() > raster.width());
    }

    #[test]
    fn lines_are_stacked_and_centred() {
        let font = tuffy();
        let single = rasterize_text(&text("i"), &font, 1.0).expect("render").expect("raster");
        let raster = rasterize_text(&text("i\nWWWWWW"), &font, 1.0)
            .expect("render")
            .expect("raster");
        assert!(raster.height() > single.height());

        let line_height = (raster.height() - 2 * TEXT_PADDING) / 2;
        let top = TEXT_PADDING..TEXT_PADDING + line_height;
        let bottom = TEXT_PADDING + line_height..raster.height() - TEXT_PADDING;
        let narrow = first_inked_column(&raster, top).expect("first line inked");
        let wide = first_inked_column(&raster, bottom).expect("second line inked");
        assert!(narrow > wide + 10, "short line should start further right");
    }

    #[test]
    fn blank_text_renders_nothing() {
        let font = tuffy();
        assert!(rasterize_text(&text("   "), &font, 1.0).expect("render").is_none());
        assert!(rasterize_text(&text(""), &font, 1.0).expect("render").is_none());
        assert!(rasterize_text(&text("\n\t"), &font, 1.0).expect("render").is_none());
        assert!(rasterize_text(&text("tiny"), &font, 0.01).expect("render").is_none());
    }

    #[test]
    fn oversized_text_is_an_error() {
        let result = rasterize_text(&text("Hello"), &tuffy(), 2_000.0);
        assert!(matches!(result, Err(StorywerkError::ImageError(_))));
    }

    #[test]
    fn invalid_font_bytes_are_rejected() {
        let mut book = FontBook::new();
        let result = book.add("Broken", FontWeight::Regular, false, b"not a font".to_vec());
        assert!(matches!(result, Err(StorywerkError::Font(_))));
        assert!(book.is_empty());
    }

    #[test]
    fn empty_book_resolves_nothing() {
        let book = FontBook::new();
        assert!(book.font_for(None, FontWeight::Bold, false).is_none());
        assert!(book.font_for(Some("Inter"), FontWeight::Regular, true).is_none());
    }

    #[test]
    fn missing_font_file_is_io_error() {
        let mut book = FontBook::new();
        let result =
            book.load_file("Inter", FontWeight::Regular, false, "/nonexistent/inter.ttf");
        assert!(matches!(result, Err(StorywerkError::Io(_))));
    }
}
