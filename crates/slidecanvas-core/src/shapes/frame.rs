//! Content frame: the region under a slide's header that holds its content.

use super::{ShapeId, ShapeKind, ShapeTrait};
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A frame glued to its owning slide at a fixed offset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFrame {
    pub(crate) id: ShapeId,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    /// Owning slide.
    #[serde(default)]
    pub parent: Option<ShapeId>,
}

impl ContentFrame {
    pub fn new(position: Point, size: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: size.width,
            height: size.height,
            parent: None,
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

impl ShapeTrait for ContentFrame {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::ContentFrame
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn transform(&mut self, affine: Affine) {
        self.position = affine * self.position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_bounds() {
        let frame = ContentFrame::new(Point::new(0.0, 24.0), Size::new(320.0, 156.0));
        let bounds = frame.bounds();
        assert!((bounds.y0 - 24.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 180.0).abs() < f64::EPSILON);
    }
}
