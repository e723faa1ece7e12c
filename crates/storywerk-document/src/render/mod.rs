// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-layer content rendering.
//
// Each layer variant is rasterised at its base size multiplied by a pixel
// factor. Transform handling (scale, rotation, placement) lives in the
// compositor; this module only answers "what does the content look like at N
// pixels per logical unit".

pub mod ink;
pub mod text;

use image::RgbaImage;
use storywerk_core::error::{Result, StorywerkError};
use storywerk_core::layer::LayerContent;
use tracing::warn;

use crate::image::processor::{ImageProcessor, MAX_RASTER_EDGE};

pub use ink::{InkDrawing, InkStroke};
pub use text::{FontBook, FontFace, FontProvider};

/// Everything content rendering needs besides the layer itself.
pub struct RenderContext<'a> {
    pub fonts: Option<&'a dyn FontProvider>,
    /// Logical width image layers are laid out at before their own scale.
    pub image_base_width: f32,
}

/// Rasterise `content` at `factor` pixels per logical unit.
///
/// `Ok(None)` means the content legitimately draws nothing (blank text, empty
/// ink, or no usable font). Errors mean the payload could not be decoded.
pub fn render_content(
    content: &LayerContent,
    factor: f32,
    ctx: &RenderContext<'_>,
) -> Result<Option<RgbaImage>> {
    match content {
        LayerContent::Text(text) => {
            let family = text.font_family.as_deref();
            let Some(font) = ctx
                .fonts
                .and_then(|fonts| fonts.font_for(family, text.weight, text.italic))
            else {
                warn!(
                    family = family.unwrap_or("default"),
                    weight = text.weight.name(),
                    "No font available for text layer, skipping"
                );
                return Ok(None);
            };
            text::rasterize_text(text, &font, factor)
        }
        LayerContent::Image { data } => {
            let target = (ctx.image_base_width * factor).round();
            if !(target.is_finite() && target >= 1.0) {
                return Ok(None);
            }
            let processor = ImageProcessor::from_bytes(data)?;
            let aspect = processor.height() as f32 / processor.width().max(1) as f32;
            if target > MAX_RASTER_EDGE as f32 || target * aspect > MAX_RASTER_EDGE as f32 {
                return Err(StorywerkError::ImageError(format!(
                    "image layer at {target}px wide exceeds the size limit"
                )));
            }
            Ok(Some(processor.resize_to_width(target as u32).into_rgba()))
        }
        LayerContent::Drawing { data, size } => InkDrawing::decode(data)?.rasterize(*size, factor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use storywerk_core::layer::{Point, Rgba as Colour, Size, TextContent};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let raster = RgbaImage::from_pixel(width, height, Rgba([0, 255, 0, 255]));
        ImageProcessor::from_rgba(raster).to_png_bytes().expect("png")
    }

    fn ctx() -> RenderContext<'static> {
        RenderContext {
            fonts: None,
            image_base_width: 50.0,
        }
    }

    #[test]
    fn image_is_laid_out_at_base_width() {
        let content = LayerContent::Image {
            data: png(10, 20).into(),
        };
        let raster = render_content(&content, 2.0, &ctx()).expect("render").expect("raster");
        assert_eq!(raster.dimensions(), (100, 200));
    }

    #[test]
    fn corrupt_image_is_an_error() {
        let content = LayerContent::Image {
            data: vec![1u8, 2, 3].into(),
        };
        assert!(render_content(&content, 1.0, &ctx()).is_err());
    }

    #[test]
    fn text_without_fonts_renders_nothing() {
        let content = LayerContent::Text(TextContent::new("hi", 40.0, Colour::WHITE));
        assert!(render_content(&content, 1.0, &ctx()).expect("render").is_none());
    }

    #[test]
    fn drawing_uses_authored_size() {
        let ink = InkDrawing::new(vec![InkStroke {
            color: Colour::BLACK,
            width: 2.0,
            points: vec![Point::new(1.0, 1.0), Point::new(9.0, 9.0)],
        }]);
        let content = LayerContent::Drawing {
            data: ink.encode().into(),
            size: Size::new(10.0, 20.0),
        };
        let raster = render_content(&content, 3.0, &ctx()).expect("render").expect("raster");
        assert_eq!(raster.dimensions(), (30, 60));
    }
}
