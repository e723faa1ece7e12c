// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::DEFAULT_CANVAS_SIZE;
use crate::error::Result;
use crate::layer::{MIN_SCALE, Rgba, Size};

/// Depth of each page's undo and redo stacks.
pub const HISTORY_DEPTH: usize = 5;

/// Pixel dimensions of an exported raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResolution {
    pub width: u32,
    pub height: u32,
}

impl ExportResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ExportResolution {
    fn default() -> Self {
        Self::new(1080, 1920)
    }
}

/// What to do with an ingestion result when the user navigated away while the
/// payload was being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestPolicy {
    /// Add the layer to whichever page is active when decoding finishes.
    #[default]
    ApplyToActivePage,
    /// Drop the result if the active page changed since the drop.
    DiscardIfPageChanged,
}

/// Persistent editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Logical canvas new documents are authored against.
    #[serde(with = "size_record")]
    pub canvas_size: Size,
    /// Default raster size for exports.
    pub export_resolution: ExportResolution,
    /// Floor applied to interactive scaling.
    pub min_scale: f32,
    /// Placeholder string of a new text layer.
    pub default_text: String,
    pub default_font_size: f32,
    #[serde(with = "color_record")]
    pub default_text_color: Rgba,
    /// Logical width an image layer is laid out at before its own scale.
    pub image_base_width: f32,
    /// Fill colour of export surfaces.
    #[serde(with = "color_record")]
    pub background: Rgba,
    pub ingest_policy: IngestPolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            export_resolution: ExportResolution::default(),
            min_scale: MIN_SCALE,
            default_text: "Tap to edit".into(),
            default_font_size: 48.0,
            default_text_color: Rgba::WHITE,
            image_base_width: 540.0,
            background: Rgba::BLACK,
            ingest_policy: IngestPolicy::default(),
        }
    }
}

impl EditorConfig {
    /// Read a JSON config file. Missing keys take their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&data)?;
        debug!(path = %path.as_ref().display(), "editor config loaded");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "editor config saved");
        Ok(())
    }
}

mod size_record {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::layer::Size;

    #[derive(Serialize, Deserialize)]
    struct Wh {
        w: f32,
        h: f32,
    }

    pub fn serialize<S: Serializer>(size: &Size, serializer: S) -> Result<S::Ok, S::Error> {
        Wh {
            w: size.width,
            h: size.height,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Size, D::Error> {
        let wh = Wh::deserialize(deserializer)?;
        Ok(Size::new(wh.w, wh.h))
    }
}

mod color_record {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::layer::Rgba;

    #[derive(Serialize, Deserialize)]
    struct Rgb {
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    }

    pub fn serialize<S: Serializer>(c: &Rgba, serializer: S) -> Result<S::Ok, S::Error> {
        Rgb {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Rgba, D::Error> {
        let c = Rgb::deserialize(deserializer)?;
        Ok(Rgba::new(c.r, c.g, c.b, c.a))
    }
}
