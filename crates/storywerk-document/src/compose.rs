// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Compositor — flattens a page's visible layers onto one raster surface.
//
// Layer positions live in the logical canvas space and scale per axis to the
// export resolution. Content sizes use the smaller of the two axis factors so
// layers never distort when the export aspect differs from the canvas.

use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use storywerk_core::config::{EditorConfig, ExportResolution};
use storywerk_core::error::Result;
use storywerk_core::layer::{Layer, Rgba as Colour, Size};
use tracing::{debug, instrument, warn};

use crate::image::processor::ImageProcessor;
use crate::render::{self, FontProvider, RenderContext};

/// Target surface of an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    pub resolution: ExportResolution,
    pub background: Colour,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            resolution: ExportResolution::default(),
            background: Colour::BLACK,
        }
    }
}

/// Renders ordered layer lists into rasters.
#[derive(Clone)]
pub struct Compositor {
    canvas_size: Size,
    options: ExportOptions,
    fonts: Option<Arc<dyn FontProvider>>,
    image_base_width: f32,
}

impl Compositor {
    pub fn new(canvas_size: Size, options: ExportOptions) -> Self {
        Self {
            canvas_size,
            options,
            fonts: None,
            image_base_width: EditorConfig::default().image_base_width,
        }
    }

    /// Compositor configured from persisted editor settings.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(
            config.canvas_size,
            ExportOptions {
                resolution: config.export_resolution,
                background: config.background,
            },
        )
        .with_image_base_width(config.image_base_width)
    }

    pub fn with_fonts(mut self, fonts: Arc<dyn FontProvider>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn with_image_base_width(mut self, width: f32) -> Self {
        self.image_base_width = width;
        self
    }

    pub fn with_canvas_size(mut self, canvas_size: Size) -> Self {
        self.canvas_size = canvas_size;
        self
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ExportOptions {
        self.options
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas_size
    }

    /// Pixels per logical unit on each axis. A degenerate canvas maps 1:1.
    fn axis_factors(&self) -> (f32, f32) {
        let ExportResolution { width, height } = self.options.resolution;
        let axis = |px: u32, logical: f32| {
            if logical.is_finite() && logical > 0.0 {
                px as f32 / logical
            } else {
                1.0
            }
        };
        (
            axis(width, self.canvas_size.width),
            axis(height, self.canvas_size.height),
        )
    }

    fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            fonts: self.fonts.as_deref(),
            image_base_width: self.image_base_width,
        }
    }

    /// Composite `layers` bottom to top. Hidden layers are skipped, as is any
    /// layer whose content fails to render. Always returns a surface.
    #[instrument(skip_all, fields(layers = layers.len()))]
    pub fn compose(&self, layers: &[Layer]) -> RgbaImage {
        let ExportResolution { width, height } = self.options.resolution;
        let mut surface = RgbaImage::from_pixel(
            width.max(1),
            height.max(1),
            Rgba(self.options.background.to_rgba8()),
        );

        let (fx, fy) = self.axis_factors();
        let content_factor = fx.min(fy);
        let ctx = self.render_context();
        let mut painted = 0usize;

        for layer in layers.iter().filter(|l| !l.is_hidden) {
            let raster = match render_transformed(layer, content_factor, &ctx) {
                Ok(Some(raster)) => raster,
                Ok(None) => continue,
                Err(err) => {
                    warn!(
                        layer = %layer.id,
                        kind = layer.content.kind(),
                        error = %err,
                        "Layer failed to render, skipping"
                    );
                    continue;
                }
            };

            let centre_x = layer.transform.position.x * fx;
            let centre_y = layer.transform.position.y * fy;
            let x = (centre_x - raster.width() as f32 / 2.0).round() as i64;
            let y = (centre_y - raster.height() as f32 / 2.0).round() as i64;
            imageops::overlay(&mut surface, &raster, x, y);
            painted += 1;
        }

        debug!(painted, width, height, "Page composited");
        surface
    }

    /// Render one layer's content, untransformed, fitted within `max_edge`.
    ///
    /// `None` when the content cannot be rendered.
    pub fn thumbnail(&self, layer: &Layer, max_edge: u32) -> Option<RgbaImage> {
        let raster = match render::render_content(&layer.content, 1.0, &self.render_context()) {
            Ok(Some(raster)) => raster,
            Ok(None) => return None,
            Err(err) => {
                debug!(layer = %layer.id, error = %err, "Thumbnail unavailable");
                return None;
            }
        };

        let (w, h) = raster.dimensions();
        let longest = w.max(h);
        if max_edge == 0 || longest == 0 {
            return None;
        }
        if longest <= max_edge {
            return Some(raster);
        }
        let fit = max_edge as f32 / longest as f32;
        let (tw, th) = (
            ((w as f32 * fit).round() as u32).max(1),
            ((h as f32 * fit).round() as u32).max(1),
        );
        Some(imageops::resize(&raster, tw, th, FilterType::Triangle))
    }
}

/// Content at base size, then scale, then rotation.
///
/// Scale is folded into the render factor so every variant is rasterised once
/// at its final pixel size.
fn render_transformed(
    layer: &Layer,
    content_factor: f32,
    ctx: &RenderContext<'_>,
) -> Result<Option<RgbaImage>> {
    let factor = content_factor * layer.transform.scale;
    if !(factor.is_finite() && factor > 0.0) {
        return Ok(None);
    }

    let Some(raster) = render::render_content(&layer.content, factor, ctx)? else {
        return Ok(None);
    };

    let degrees = layer.transform.rotation.degrees();
    if degrees == 0.0 || !degrees.is_finite() {
        return Ok(Some(raster));
    }
    Ok(Some(ImageProcessor::from_rgba(raster).rotate(degrees).into_rgba()))
}
