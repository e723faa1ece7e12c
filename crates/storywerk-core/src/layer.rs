// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layer model — the editable visual elements of a page and their transform.

use std::sync::Arc;

use uuid::Uuid;

/// Default scale of a freshly created layer.
pub const DEFAULT_SCALE: f32 = 1.0;

/// Smallest scale interactive gestures may shrink a layer to.
pub const MIN_SCALE: f32 = 0.2;

/// Opaque unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated string form produced by `Display`.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Geometry -----------------------------------------------------------------

/// A point in the logical canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Logical dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// A rotation, stored in degrees so that persisted values survive unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Angle {
    degrees: f32,
}

impl Angle {
    pub const ZERO: Self = Self { degrees: 0.0 };

    pub const fn from_degrees(degrees: f32) -> Self {
        Self { degrees }
    }

    pub fn from_radians(radians: f32) -> Self {
        Self {
            degrees: radians.to_degrees(),
        }
    }

    pub fn degrees(&self) -> f32 {
        self.degrees
    }

    pub fn radians(&self) -> f32 {
        self.degrees.to_radians()
    }
}

/// Straight-alpha RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Quantise to 8-bit channels, clamping out-of-range components.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

// -- Text ---------------------------------------------------------------------

/// Font weights offered to text layers, lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

impl FontWeight {
    pub const ALL: [FontWeight; 9] = [
        Self::UltraLight,
        Self::Thin,
        Self::Light,
        Self::Regular,
        Self::Medium,
        Self::Semibold,
        Self::Bold,
        Self::Heavy,
        Self::Black,
    ];

    /// Stable name used in persisted documents.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UltraLight => "ultraLight",
            Self::Thin => "thin",
            Self::Light => "light",
            Self::Regular => "regular",
            Self::Medium => "medium",
            Self::Semibold => "semibold",
            Self::Bold => "bold",
            Self::Heavy => "heavy",
            Self::Black => "black",
        }
    }

    /// Inverse of [`FontWeight::name`]. Unknown names fall back to `Regular`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|w| w.name() == name)
            .unwrap_or_else(|| {
                tracing::warn!(name, "unknown font weight, using regular");
                Self::Regular
            })
    }

    /// CSS-style numeric weight (100..=900), used for nearest-face matching.
    pub fn numeric(&self) -> u16 {
        match self {
            Self::UltraLight => 100,
            Self::Thin => 200,
            Self::Light => 300,
            Self::Regular => 400,
            Self::Medium => 500,
            Self::Semibold => 600,
            Self::Bold => 700,
            Self::Heavy => 800,
            Self::Black => 900,
        }
    }
}

/// Content and style of a text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextContent {
    pub text: String,
    /// Logical point size, always positive.
    pub font_size: f32,
    pub color: Rgba,
    pub weight: FontWeight,
    /// `None` means the renderer's default family.
    pub font_family: Option<String>,
    pub italic: bool,
}

impl TextContent {
    pub fn new(text: impl Into<String>, font_size: f32, color: Rgba) -> Self {
        Self {
            text: text.into(),
            font_size,
            color,
            weight: FontWeight::Regular,
            font_family: None,
            italic: false,
        }
    }
}

// -- Layer --------------------------------------------------------------------

/// Shared immutable byte payload. Cloning a layer never copies its bytes.
pub type Blob = Arc<[u8]>;

/// What a layer shows. Closed set: every consumer matches exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerContent {
    Text(TextContent),
    /// Encoded raster (PNG, JPEG, ...).
    Image { data: Blob },
    /// Vector-ink blob plus the canvas size the ink was authored against.
    Drawing { data: Blob, size: Size },
}

impl LayerContent {
    /// Short tag, identical to the persisted content `type`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image { .. } => "image",
            Self::Drawing { .. } => "drawing",
        }
    }
}

/// Where and how a layer is drawn. `position` is the layer's centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Point,
    pub scale: f32,
    pub rotation: Angle,
}

impl Transform {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            scale: DEFAULT_SCALE,
            rotation: Angle::ZERO,
        }
    }

    /// Multiply the scale by `factor`, never going below `min_scale`.
    pub fn scaled_by(self, factor: f32, min_scale: f32) -> Self {
        Self {
            scale: (self.scale * factor).max(min_scale),
            ..self
        }
    }

    /// Every component is a finite number, so the transform can be encoded.
    pub fn is_finite(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.scale.is_finite()
            && self.rotation.degrees().is_finite()
    }
}

/// One editable visual element of a page.
///
/// Two layers are equal when their ids are equal, whatever their other fields
/// hold. Use [`Layer::same_value`] for a full comparison.
#[derive(Debug, Clone)]
pub struct Layer {
    pub id: LayerId,
    pub content: LayerContent,
    pub transform: Transform,
    pub is_hidden: bool,
}

impl Layer {
    pub fn new(content: LayerContent, position: Point) -> Self {
        Self {
            id: LayerId::new(),
            content,
            transform: Transform::at(position),
            is_hidden: false,
        }
    }

    pub fn text(content: TextContent, position: Point) -> Self {
        Self::new(LayerContent::Text(content), position)
    }

    pub fn image(data: impl Into<Blob>, position: Point) -> Self {
        Self::new(LayerContent::Image { data: data.into() }, position)
    }

    pub fn drawing(data: impl Into<Blob>, size: Size, position: Point) -> Self {
        Self::new(
            LayerContent::Drawing {
                data: data.into(),
                size,
            },
            position,
        )
    }

    /// Field-by-field comparison, including the id.
    pub fn same_value(&self, other: &Layer) -> bool {
        self.id == other.id
            && self.content == other.content
            && self.transform == other.transform
            && self.is_hidden == other.is_hidden
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Layer {}

impl std::hash::Hash for Layer {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_id_only() {
        let a = Layer::image(vec![1u8, 2, 3], Point::new(0.0, 0.0));
        let mut b = a.clone();
        b.transform.scale = 3.0;
        b.is_hidden = true;
        assert_eq!(a, b);
        assert!(!a.same_value(&b));

        let c = Layer::image(vec![1u8, 2, 3], Point::new(0.0, 0.0));
        assert_ne!(a, c);
    }

    #[test]
    fn weight_names_round_trip() {
        for weight in FontWeight::ALL {
            assert_eq!(FontWeight::from_name(weight.name()), weight);
        }
    }

    #[test]
    fn unknown_weight_falls_back_to_regular() {
        assert_eq!(FontWeight::from_name("extraChonky"), FontWeight::Regular);
        assert_eq!(FontWeight::from_name("Bold"), FontWeight::Regular);
    }

    #[test]
    fn non_finite_transforms_are_detected() {
        let transform = Transform::at(Point::new(10.0, 20.0));
        assert!(transform.is_finite());
        let huge = Transform {
            scale: f32::INFINITY,
            ..transform
        };
        assert!(!huge.is_finite());
        let lost = Transform {
            position: Point::new(f32::NAN, 0.0),
            ..transform
        };
        assert!(!lost.is_finite());
        let spun = Transform {
            rotation: Angle::from_degrees(f32::NEG_INFINITY),
            ..transform
        };
        assert!(!spun.is_finite());
    }

    #[test]
    fn scaling_clamps_at_floor() {
        let t = Transform::at(Point::default());
        assert_eq!(t.scaled_by(0.01, MIN_SCALE).scale, MIN_SCALE);
        assert_eq!(t.scaled_by(2.0, MIN_SCALE).scale, 2.0);
    }

    #[test]
    fn angle_keeps_degrees_exactly() {
        let angle = Angle::from_degrees(37.5);
        assert_eq!(angle.degrees(), 37.5);
        assert!((angle.radians() - 37.5f32.to_radians()).abs() < f32::EPSILON);
    }

    #[test]
    fn colour_quantisation_clamps() {
        assert_eq!(Rgba::new(2.0, -1.0, 0.5, 1.0).to_rgba8(), [255, 0, 128, 255]);
    }
}
