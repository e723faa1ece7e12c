// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire records for the persisted document format and their conversions to and
// from the in-memory model.
//
// The records are deliberately separate from the model types: colours travel as
// explicit `{r,g,b,a}` floats, font weights as fixed names, rotation as plain
// degrees, and byte payloads as base64.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::document::{DEFAULT_CANVAS_SIZE, Document, PAGE_COUNT, Page};
use crate::error::DecodeError;
use crate::layer::{
    Angle, Blob, FontWeight, Layer, LayerContent, LayerId, Point, Rgba, Size, TextContent,
    Transform,
};

/// Current document schema version.
pub const FORMAT_VERSION: u32 = 1;

const TYPE_TEXT: &str = "text";
const TYPE_IMAGE: &str = "image";
const TYPE_DRAWING: &str = "drawing";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvas_size: Option<SizeRecord>,
    pub pages: Vec<Vec<LayerRecord>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub id: String,
    pub content: ContentRecord,
    pub position: PointRecord,
    pub scale: f32,
    pub rotation_degrees: f32,
    pub is_hidden: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drawing: Option<DrawingRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRecord {
    pub text: String,
    pub font_size: f32,
    pub color: ColorRecord,
    pub weight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
    #[serde(default)]
    pub is_italic: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(with = "super::base64_serde")]
    pub data: Blob,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DrawingRecord {
    #[serde(with = "super::base64_serde")]
    pub data: Blob,
    pub size: SizeRecord,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColorRecord {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SizeRecord {
    pub w: f32,
    pub h: f32,
}

// -- Model → record -----------------------------------------------------------

impl From<&Document> for DocumentRecord {
    fn from(doc: &Document) -> Self {
        Self {
            version: FORMAT_VERSION,
            canvas_size: Some(doc.canvas_size.into()),
            pages: doc
                .pages
                .iter()
                .map(|page| page.layers.iter().map(LayerRecord::from).collect())
                .collect(),
        }
    }
}

impl From<&Layer> for LayerRecord {
    fn from(layer: &Layer) -> Self {
        Self {
            id: layer.id.to_string(),
            content: ContentRecord::from(&layer.content),
            position: PointRecord {
                x: layer.transform.position.x,
                y: layer.transform.position.y,
            },
            scale: layer.transform.scale,
            rotation_degrees: layer.transform.rotation.degrees(),
            is_hidden: layer.is_hidden,
        }
    }
}

impl From<&LayerContent> for ContentRecord {
    fn from(content: &LayerContent) -> Self {
        let mut record = Self {
            kind: content.kind().to_owned(),
            text: None,
            image: None,
            drawing: None,
        };
        match content {
            LayerContent::Text(text) => {
                record.text = Some(TextRecord {
                    text: text.text.clone(),
                    font_size: text.font_size,
                    color: text.color.into(),
                    weight: text.weight.name().to_owned(),
                    font_name: text.font_family.clone(),
                    is_italic: text.italic,
                });
            }
            LayerContent::Image { data } => {
                record.image = Some(ImageRecord { data: data.clone() });
            }
            LayerContent::Drawing { data, size } => {
                record.drawing = Some(DrawingRecord {
                    data: data.clone(),
                    size: (*size).into(),
                });
            }
        }
        record
    }
}

impl From<Rgba> for ColorRecord {
    fn from(c: Rgba) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

impl From<Size> for SizeRecord {
    fn from(s: Size) -> Self {
        Self {
            w: s.width,
            h: s.height,
        }
    }
}

// -- Record → model -----------------------------------------------------------

impl TryFrom<DocumentRecord> for Document {
    type Error = DecodeError;

    fn try_from(record: DocumentRecord) -> Result<Self, Self::Error> {
        if record.version != FORMAT_VERSION {
            return Err(DecodeError::UnsupportedVersion(record.version));
        }
        if record.pages.len() > PAGE_COUNT {
            return Err(DecodeError::TooManyPages(record.pages.len()));
        }

        let canvas_size = match record.canvas_size {
            Some(size) => positive_size("canvasSize", size)?,
            None => DEFAULT_CANVAS_SIZE,
        };

        // Documents with fewer pages than PAGE_COUNT keep the trailing pages empty.
        let mut doc = Document::new(canvas_size);
        for (index, layers) in record.pages.into_iter().enumerate() {
            let mut seen = HashSet::new();
            let mut page = Page::default();
            for layer_record in layers {
                let layer = Layer::try_from(layer_record)?;
                if !seen.insert(layer.id) {
                    return Err(DecodeError::DuplicateLayerId {
                        page: index,
                        id: layer.id.to_string(),
                    });
                }
                page.layers.push(layer);
            }
            doc.pages[index] = page;
        }
        Ok(doc)
    }
}

impl TryFrom<LayerRecord> for Layer {
    type Error = DecodeError;

    fn try_from(record: LayerRecord) -> Result<Self, Self::Error> {
        let id = LayerId::parse(&record.id).ok_or(DecodeError::InvalidLayerId(record.id))?;
        if !record.scale.is_finite() || record.scale < 0.0 {
            return Err(DecodeError::InvalidField {
                field: "scale",
                reason: format!("must be a non-negative number, got {}", record.scale),
            });
        }
        Ok(Self {
            id,
            content: LayerContent::try_from(record.content)?,
            transform: Transform {
                position: Point::new(record.position.x, record.position.y),
                scale: record.scale,
                rotation: Angle::from_degrees(record.rotation_degrees),
            },
            is_hidden: record.is_hidden,
        })
    }
}

impl TryFrom<ContentRecord> for LayerContent {
    type Error = DecodeError;

    fn try_from(record: ContentRecord) -> Result<Self, Self::Error> {
        match record.kind.as_str() {
            TYPE_TEXT => {
                let text = record
                    .text
                    .ok_or_else(|| DecodeError::MissingContent(record.kind.clone()))?;
                if text.font_size.is_nan() || text.font_size <= 0.0 {
                    return Err(DecodeError::InvalidField {
                        field: "fontSize",
                        reason: format!("must be positive, got {}", text.font_size),
                    });
                }
                Ok(Self::Text(TextContent {
                    text: text.text,
                    font_size: text.font_size,
                    color: Rgba::new(text.color.r, text.color.g, text.color.b, text.color.a),
                    weight: FontWeight::from_name(&text.weight),
                    font_family: text.font_name,
                    italic: text.is_italic,
                }))
            }
            TYPE_IMAGE => {
                let image = record
                    .image
                    .ok_or_else(|| DecodeError::MissingContent(record.kind.clone()))?;
                Ok(Self::Image { data: image.data })
            }
            TYPE_DRAWING => {
                let drawing = record
                    .drawing
                    .ok_or_else(|| DecodeError::MissingContent(record.kind.clone()))?;
                Ok(Self::Drawing {
                    data: drawing.data,
                    size: non_negative_size("drawing.size", drawing.size)?,
                })
            }
            _ => Err(DecodeError::UnknownContentType(record.kind)),
        }
    }
}

fn non_negative_size(field: &'static str, size: SizeRecord) -> Result<Size, DecodeError> {
    if size.w.is_finite() && size.h.is_finite() && size.w >= 0.0 && size.h >= 0.0 {
        Ok(Size::new(size.w, size.h))
    } else {
        Err(DecodeError::InvalidField {
            field,
            reason: format!("must be non-negative, got {}x{}", size.w, size.h),
        })
    }
}

fn positive_size(field: &'static str, size: SizeRecord) -> Result<Size, DecodeError> {
    let checked = non_negative_size(field, size)?;
    if checked.width > 0.0 && checked.height > 0.0 {
        Ok(checked)
    } else {
        Err(DecodeError::InvalidField {
            field,
            reason: format!("must be positive, got {}x{}", size.w, size.h),
        })
    }
}
