// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, resize, and rotate a single layer raster. Operates
// on in-memory RGBA images using the `image` and `imageproc` crates.

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::geometric_transformations::{self, Interpolation};
use storywerk_core::error::StorywerkError;
use tracing::{debug, instrument};

/// Largest edge, in pixels, a single layer raster may reach.
pub const MAX_RASTER_EDGE: u32 = 16_384;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Transformation pipeline over one RGBA raster.
///
/// Every operation consumes `self` and returns the transformed processor, so
/// steps chain:
///
/// ```ignore
/// let raster = ImageProcessor::from_bytes(&png)?
///     .resize_to_width(540)
///     .rotate(30.0)
///     .into_rgba();
/// ```
pub struct ImageProcessor {
    image: RgbaImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Decode an encoded raster (PNG, JPEG, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, StorywerkError> {
        let img = image::load_from_memory(data).map_err(|err| {
            StorywerkError::ImageError(format!("failed to decode image: {}", err))
        })?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self {
            image: img.to_rgba8(),
        })
    }

    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Resize to exactly `width` x `height` pixels (each at least 1).
    pub fn resize_exact(self, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.image.dimensions() {
            return self;
        }
        Self {
            image: imageops::resize(&self.image, width, height, FilterType::Lanczos3),
        }
    }

    /// Resize to `width` pixels wide, preserving the aspect ratio.
    pub fn resize_to_width(self, width: u32) -> Self {
        let (w, h) = self.image.dimensions();
        if w == 0 {
            return self;
        }
        let height = (h as f64 * width as f64 / w as f64).round() as u32;
        self.resize_exact(width, height)
    }

    /// Rotate clockwise by `degrees`.
    ///
    /// The canvas grows to the rotated bounding box so no corner is clipped;
    /// uncovered pixels are transparent. Multiples of 90 degrees are lossless.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate(self, degrees: f32) -> Self {
        let normalised = degrees.rem_euclid(360.0);
        if normalised.abs() < 0.01 || (normalised - 360.0).abs() < 0.01 {
            return self;
        }
        if (normalised - 90.0).abs() < 0.01 {
            return Self {
                image: imageops::rotate90(&self.image),
            };
        }
        if (normalised - 180.0).abs() < 0.01 {
            return Self {
                image: imageops::rotate180(&self.image),
            };
        }
        if (normalised - 270.0).abs() < 0.01 {
            return Self {
                image: imageops::rotate270(&self.image),
            };
        }

        let (w, h) = self.image.dimensions();
        let radians = normalised.to_radians();
        let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
        let rotated_w = (w as f32 * cos + h as f32 * sin).ceil() as u32;
        let rotated_h = (w as f32 * sin + h as f32 * cos).ceil() as u32;

        // Pad so the rotation about the centre has room, then crop to the
        // rotated bounding box.
        let pad_w = rotated_w.max(w);
        let pad_h = rotated_h.max(h);
        let mut padded = RgbaImage::from_pixel(pad_w, pad_h, TRANSPARENT);
        imageops::replace(
            &mut padded,
            &self.image,
            ((pad_w - w) / 2) as i64,
            ((pad_h - h) / 2) as i64,
        );

        let rotated = geometric_transformations::rotate_about_center(
            &padded,
            radians,
            Interpolation::Bilinear,
            TRANSPARENT,
        );
        let cropped = imageops::crop_imm(
            &rotated,
            (pad_w - rotated_w) / 2,
            (pad_h - rotated_h) / 2,
            rotated_w,
            rotated_h,
        )
        .to_image();

        debug!(
            from_w = w,
            from_h = h,
            to_w = rotated_w,
            to_h = rotated_h,
            "General rotation applied"
        );
        Self { image: cropped }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current raster as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, StorywerkError> {
        encode_to_format(&self.image, ImageFormat::Png)
    }
}

/// Encode an RGBA raster into `format`, returning the raw bytes.
pub fn encode_to_format(image: &RgbaImage, format: ImageFormat) -> Result<Vec<u8>, StorywerkError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    DynamicImage::ImageRgba8(image.clone())
        .write_to(&mut cursor, format)
        .map_err(|err| StorywerkError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}
