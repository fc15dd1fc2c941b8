//! Slide shape: a fixed-aspect element positioned by its slideshow.

use super::{ShapeId, ShapeKind, ShapeTrait};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format of a slide's rendered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayloadFormat {
    Png,
    Jpeg,
    WebP,
}

impl PayloadFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            PayloadFormat::Png => "image/png",
            PayloadFormat::Jpeg => "image/jpeg",
            PayloadFormat::WebP => "image/webp",
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(PayloadFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(PayloadFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(PayloadFormat::WebP);
        }
        None
    }
}

/// Rendered content of a slide (e.g. a thumbnail of its frame).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlidePayload {
    pub format: PayloadFormat,
    /// Base64 so the payload survives JSON snapshots.
    pub data_base64: String,
}

impl SlidePayload {
    /// Wrap raw bytes, sniffing the format. Returns `None` for unknown formats.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        use base64::{Engine, engine::general_purpose::STANDARD};

        let format = PayloadFormat::from_magic_bytes(data)?;
        Some(Self {
            format,
            data_base64: STANDARD.encode(data),
        })
    }

    /// Decode the payload bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        use base64::{Engine, engine::general_purpose::STANDARD};
        STANDARD.decode(&self.data_base64).ok()
    }
}

/// A slide. Its position is owned by the layout engine and its size is fixed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub parent: Option<ShapeId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub payload: Option<SlidePayload>,
}

impl Slide {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: size.width,
            height: size.height,
            parent: None,
            title: String::new(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: SlidePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Decoded payload bytes, if any.
    pub fn payload_bytes(&self) -> Option<Vec<u8>> {
        self.payload.as_ref().and_then(SlidePayload::bytes)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height.max(f64::EPSILON)
    }
}

impl ShapeTrait for Slide {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Slide
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn transform(&mut self, affine: Affine) {
        // Slides are not resizable; only translation applies.
        self.position = affine * self.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_bounds() {
        let slide = Slide::new(Point::new(10.0, 20.0), Size::new(160.0, 90.0));
        let bounds = slide.bounds();
        assert!((bounds.x0 - 10.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 110.0).abs() < f64::EPSILON);
        assert!((slide.aspect_ratio() - 16.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_payload_roundtrip() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let payload = SlidePayload::from_bytes(&png).unwrap();
        assert_eq!(payload.format, PayloadFormat::Png);
        assert_eq!(payload.format.mime_type(), "image/png");
        let slide = Slide::new(Point::ZERO, Size::new(16.0, 9.0)).with_payload(payload);
        assert_eq!(slide.payload_bytes().unwrap(), png.to_vec());
    }

    #[test]
    fn test_unknown_payload_rejected() {
        assert!(SlidePayload::from_bytes(b"GIF89a").is_none());
    }

    #[test]
    fn test_hit_test() {
        let slide = Slide::new(Point::ZERO, Size::new(100.0, 50.0));
        assert!(slide.hit_test(Point::new(50.0, 25.0), 0.0));
        assert!(!slide.hit_test(Point::new(105.0, 25.0), 0.0));
        assert!(slide.hit_test(Point::new(105.0, 25.0), 10.0));
    }
}
