//! Vision recognition results and overlay geometry.
//!
//! The request itself is made by an external client; this module only reads the
//! provider's annotate response and turns bounding polygons into overlay boxes
//! expressed as percentages of the image.

use serde::{Deserialize, Serialize};

/// A polygon vertex. Normalized (0..=1) for objects, pixels for text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vertex {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

/// An image-level label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionLabel {
    /// Label text
    pub description: String,
    /// Confidence in 0..=1
    pub score: f32,
}

/// A localized object with a normalized bounding polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionObject {
    /// Object name
    pub name: String,
    /// Confidence in 0..=1
    pub score: f32,
    /// Bounding polygon, normalized coordinates
    pub vertices: Vec<Vertex>,
}

/// A recognized word with its bounding polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionText {
    /// Word text
    pub text: String,
    /// Confidence in 0..=1
    pub confidence: f32,
    /// Bounding polygon, usually in pixels
    pub vertices: Vec<Vertex>,
}

/// Everything recognized in one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionResult {
    /// Image-level labels
    pub labels: Vec<VisionLabel>,
    /// Localized objects
    pub objects: Vec<VisionObject>,
    /// Recognized words
    pub texts: Vec<VisionText>,
    /// Error reported by the provider, if any
    pub error: Option<String>,
}

impl VisionResult {
    /// Parses an `images:annotate` response body and reads its first response.
    pub fn from_annotate_response(json: &str) -> Result<Self, serde_json::Error> {
        let body: wire::AnnotateBody = serde_json::from_str(json)?;
        Ok(body
            .responses
            .into_iter()
            .next()
            .map(Self::from_wire)
            .unwrap_or_default())
    }

    fn from_wire(response: wire::AnnotateResponse) -> Self {
        let labels = response
            .label_annotations
            .into_iter()
            .map(|label| VisionLabel {
                description: label.description,
                score: label.score,
            })
            .collect();

        let objects = response
            .localized_object_annotations
            .into_iter()
            .map(|object| VisionObject {
                name: object.name,
                score: object.score,
                vertices: object.bounding_poly.normalized_vertices,
            })
            .collect();

        let mut texts = Vec::new();
        if let Some(full_text) = response.full_text_annotation {
            let words = full_text
                .pages
                .into_iter()
                .flat_map(|page| page.blocks)
                .flat_map(|block| block.paragraphs)
                .flat_map(|paragraph| paragraph.words);
            for word in words {
                let text: String = word.symbols.into_iter().map(|s| s.text).collect();
                if text.trim().is_empty() {
                    continue;
                }
                texts.push(VisionText {
                    text,
                    confidence: word.confidence,
                    vertices: word.bounding_box.vertices,
                });
            }
        }

        Self {
            labels,
            objects,
            texts,
            error: response.error.map(|e| e.message),
        }
    }

    /// Returns true when nothing at all was recognized and no error was reported.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.objects.is_empty() && self.texts.is_empty()
    }
}

/// Rectangle in percent of the image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayBox {
    /// Left edge, percent of image width
    pub left: f32,
    /// Top edge, percent of image height
    pub top: f32,
    /// Width, percent of image width
    pub width: f32,
    /// Height, percent of image height
    pub height: f32,
}

/// Axis-aligned box around normalized vertices, in percent.
///
/// Polygons with fewer than three vertices have no box.
pub fn overlay_box(vertices: &[Vertex]) -> Option<OverlayBox> {
    if vertices.len() < 3 {
        return None;
    }
    let (min_x, max_x, min_y, max_y) = vertices.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY, f32::INFINITY, f32::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), v| {
            (min_x.min(v.x), max_x.max(v.x), min_y.min(v.y), max_y.max(v.y))
        },
    );
    Some(OverlayBox {
        left: min_x * 100.0,
        top: min_y * 100.0,
        width: (max_x - min_x) * 100.0,
        height: (max_y - min_y) * 100.0,
    })
}

/// Brings vertices into 0..=1 space.
///
/// Vertices already inside the unit square are returned unchanged; otherwise
/// they are divided by the image size when one is known.
pub fn normalize_vertices(vertices: &[Vertex], image_size: Option<(f32, f32)>) -> Vec<Vertex> {
    let normalized = vertices
        .iter()
        .all(|v| (0.0..=1.0).contains(&v.x) && (0.0..=1.0).contains(&v.y));
    match image_size {
        Some((width, height)) if !normalized && width > 0.0 && height > 0.0 => vertices
            .iter()
            .map(|v| Vertex {
                x: v.x / width,
                y: v.y / height,
            })
            .collect(),
        _ => vertices.to_vec(),
    }
}

/// Formats a 0..=1 score as a percentage with one decimal, e.g. `87.5%`.
pub fn score_percent(score: f32) -> String {
    format!("{:.1}%", score * 100.0)
}

/// Response shapes as sent by the provider. Every field is optional on the wire.
mod wire {
    use super::Vertex;
    use serde::Deserialize;

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct AnnotateBody {
        pub responses: Vec<AnnotateResponse>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default, rename_all = "camelCase")]
    pub struct AnnotateResponse {
        pub label_annotations: Vec<Label>,
        pub localized_object_annotations: Vec<LocalizedObject>,
        pub full_text_annotation: Option<FullText>,
        pub error: Option<Status>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Label {
        pub description: String,
        pub score: f32,
    }

    #[derive(Deserialize, Default)]
    #[serde(default, rename_all = "camelCase")]
    pub struct LocalizedObject {
        pub name: String,
        pub score: f32,
        pub bounding_poly: NormalizedPoly,
    }

    #[derive(Deserialize, Default)]
    #[serde(default, rename_all = "camelCase")]
    pub struct NormalizedPoly {
        pub normalized_vertices: Vec<Vertex>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Poly {
        pub vertices: Vec<Vertex>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct FullText {
        pub pages: Vec<Page>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Page {
        pub blocks: Vec<Block>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Block {
        pub paragraphs: Vec<Paragraph>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Paragraph {
        pub words: Vec<Word>,
    }

    #[derive(Deserialize, Default)]
    #[serde(default, rename_all = "camelCase")]
    pub struct Word {
        pub symbols: Vec<Symbol>,
        pub confidence: f32,
        pub bounding_box: Poly,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Symbol {
        pub text: String,
    }

    #[derive(Deserialize, Default)]
    #[serde(default)]
    pub struct Status {
        pub message: String,
    }
}
