// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vector ink — the binary payload behind drawing layers.
//
// Layout (version 1, little-endian):
//
//   magic    4 bytes  "SWNK"
//   version  u8
//   strokes  u32
//   per stroke:
//     colour  4 x f32 (r, g, b, a)
//     width   f32, in authored canvas units
//     points  u32
//     xy      points x (f32, f32), in authored canvas coordinates
//
// A zero-length payload is an empty drawing.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;
use storywerk_core::error::{Result, StorywerkError};
use storywerk_core::layer::{Point, Rgba as Colour, Size};
use tracing::debug;

use crate::image::processor::MAX_RASTER_EDGE;

pub const INK_MAGIC: [u8; 4] = *b"SWNK";
pub const INK_VERSION: u8 = 1;

/// Colour + width + point count.
const STROKE_HEADER_LEN: usize = 4 * 4 + 4 + 4;
const POINT_LEN: usize = 8;

/// One continuous pen stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct InkStroke {
    pub color: Colour,
    pub width: f32,
    pub points: Vec<Point>,
}

/// A decoded ink payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InkDrawing {
    pub strokes: Vec<InkStroke>,
}

impl InkDrawing {
    pub fn new(strokes: Vec<InkStroke>) -> Self {
        Self { strokes }
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.iter().all(|s| s.points.is_empty())
    }

    /// Serialise to the version 1 layout.
    pub fn encode(&self) -> Vec<u8> {
        let points: usize = self.strokes.iter().map(|s| s.points.len()).sum();
        let mut out =
            Vec::with_capacity(9 + self.strokes.len() * STROKE_HEADER_LEN + points * POINT_LEN);
        out.extend_from_slice(&INK_MAGIC);
        out.push(INK_VERSION);
        out.extend_from_slice(&(self.strokes.len() as u32).to_le_bytes());
        for stroke in &self.strokes {
            for c in [stroke.color.r, stroke.color.g, stroke.color.b, stroke.color.a] {
                out.extend_from_slice(&c.to_le_bytes());
            }
            out.extend_from_slice(&stroke.width.to_le_bytes());
            out.extend_from_slice(&(stroke.points.len() as u32).to_le_bytes());
            for p in &stroke.points {
                out.extend_from_slice(&p.x.to_le_bytes());
                out.extend_from_slice(&p.y.to_le_bytes());
            }
        }
        out
    }

    /// Parse a payload. Truncated data, trailing bytes, a wrong magic, or an
    /// unknown version are errors.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::default());
        }

        let mut reader = Reader::new(data);
        if reader.take(4)? != INK_MAGIC.as_slice() {
            return Err(StorywerkError::InkError("bad magic".into()));
        }
        let version = reader.u8()?;
        if version != INK_VERSION {
            return Err(StorywerkError::InkError(format!("unsupported version {version}")));
        }

        let stroke_count = reader.u32()? as usize;
        if stroke_count > reader.remaining() / STROKE_HEADER_LEN {
            return Err(StorywerkError::InkError(format!(
                "{stroke_count} strokes cannot fit in {} bytes",
                reader.remaining()
            )));
        }

        let mut strokes = Vec::with_capacity(stroke_count);
        for _ in 0..stroke_count {
            let color = Colour::new(reader.f32()?, reader.f32()?, reader.f32()?, reader.f32()?);
            let width = reader.f32()?;
            let point_count = reader.u32()? as usize;
            if point_count > reader.remaining() / POINT_LEN {
                return Err(StorywerkError::InkError("truncated point list".into()));
            }
            let mut points = Vec::with_capacity(point_count);
            for _ in 0..point_count {
                points.push(Point::new(reader.f32()?, reader.f32()?));
            }
            strokes.push(InkStroke { color, width, points });
        }

        if reader.remaining() != 0 {
            return Err(StorywerkError::InkError(format!(
                "{} trailing bytes",
                reader.remaining()
            )));
        }
        Ok(Self { strokes })
    }

    /// Rasterise onto a transparent canvas of `authored` size multiplied by
    /// `factor`. Returns `None` when there is nothing to draw.
    pub fn rasterize(&self, authored: Size, factor: f32) -> Result<Option<RgbaImage>> {
        let width = (authored.width * factor).ceil();
        let height = (authored.height * factor).ceil();
        if self.is_empty() || width < 1.0 || height < 1.0 {
            return Ok(None);
        }
        if width > MAX_RASTER_EDGE as f32 || height > MAX_RASTER_EDGE as f32 {
            return Err(StorywerkError::InkError(format!(
                "drawing raster {width}x{height} exceeds the size limit"
            )));
        }

        let mut canvas = RgbaImage::new(width as u32, height as u32);
        for stroke in &self.strokes {
            let colour = Rgba(stroke.color.to_rgba8());
            let radius = (stroke.width * factor / 2.0).max(0.5);
            let scaled: Vec<(f32, f32)> = stroke
                .points
                .iter()
                .map(|p| (p.x * factor, p.y * factor))
                .collect();

            match scaled.as_slice() {
                [] => {}
                [only] => stamp(&mut canvas, *only, radius, colour),
                _ => {
                    for pair in scaled.windows(2) {
                        stamp_segment(&mut canvas, pair[0], pair[1], radius, colour);
                    }
                }
            }
        }
        debug!(strokes = self.strokes.len(), width, height, "Ink rasterised");
        Ok(Some(canvas))
    }
}

/// Cover a segment with discs spaced at most half a radius apart.
fn stamp_segment(
    canvas: &mut RgbaImage,
    from: (f32, f32),
    to: (f32, f32),
    radius: f32,
    colour: Rgba<u8>,
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = (dx * dx + dy * dy).sqrt();
    let step = (radius / 2.0).max(1.0);
    let steps = (length / step).ceil().max(1.0) as u32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp(canvas, (from.0 + dx * t, from.1 + dy * t), radius, colour);
    }
}

fn stamp(canvas: &mut RgbaImage, centre: (f32, f32), radius: f32, colour: Rgba<u8>) {
    draw_filled_circle_mut(
        canvas,
        (centre.0.round() as i32, centre.1.round() as i32),
        radius.round() as i32,
        colour,
    );
}

/// Bounds-checked little-endian cursor.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(StorywerkError::InkError(format!(
                "truncated payload at byte {}",
                self.pos
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn f32(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(f32::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_diagonal() -> InkDrawing {
        InkDrawing::new(vec![InkStroke {
            color: Colour::new(1.0, 0.0, 0.0, 1.0),
            width: 4.0,
            points: vec![Point::new(10.0, 10.0), Point::new(90.0, 90.0)],
        }])
    }

    #[test]
    fn encoded_payload_decodes_to_same_strokes() {
        let ink = red_diagonal();
        assert_eq!(InkDrawing::decode(&ink.encode()).expect("decode"), ink);
    }

    #[test]
    fn empty_payload_is_empty_drawing() {
        let ink = InkDrawing::decode(&[]).expect("decode");
        assert!(ink.is_empty());
        assert!(ink.rasterize(Size::new(100.0, 100.0), 1.0).expect("raster").is_none());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let bytes = red_diagonal().encode();
        let result = InkDrawing::decode(&bytes[..bytes.len() - 3]);
        assert!(matches!(result, Err(StorywerkError::InkError(_))));
    }

    #[test]
    fn wrong_magic_and_version_are_rejected() {
        let mut bytes = red_diagonal().encode();
        bytes[0] = b'X';
        assert!(InkDrawing::decode(&bytes).is_err());

        let mut bytes = red_diagonal().encode();
        bytes[4] = 9;
        assert!(InkDrawing::decode(&bytes).is_err());
    }

    #[test]
    fn absurd_stroke_count_does_not_allocate() {
        let mut bytes = INK_MAGIC.to_vec();
        bytes.push(INK_VERSION);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        assert!(InkDrawing::decode(&bytes).is_err());
    }

    #[test]
    fn rasterised_stroke_scales_with_factor() {
        let raster = red_diagonal()
            .rasterize(Size::new(100.0, 100.0), 2.0)
            .expect("raster")
            .expect("non-empty");
        assert_eq!(raster.dimensions(), (200, 200));
        // The midpoint of the stroke (50,50) lands at (100,100) after scaling.
        assert_eq!(raster.get_pixel(100, 100).0, [255, 0, 0, 255]);
        assert_eq!(raster.get_pixel(180, 20).0[3], 0);
    }
}
