//! Rectangle shape: a generic host shape with no layout coupling.

use super::{ShapeId, ShapeKind, ShapeTrait};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A plain rectangle. Used for annotations placed inside content frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
    #[serde(default)]
    pub parent: Option<ShapeId>,
}

impl Rectangle {
    /// Create a new rectangle.
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width,
            height,
            parent: None,
        }
    }

    /// Attach this rectangle to a parent shape.
    pub fn with_parent(mut self, parent: ShapeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Get the rectangle as a kurbo Rect.
    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }
}

impl ShapeTrait for Rectangle {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Rectangle
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn transform(&mut self, affine: Affine) {
        // Axis-aligned only: rotation and skew are dropped.
        let [sx, _, _, sy, _, _] = affine.as_coeffs();
        self.position = affine * self.position;
        self.width *= sx.abs();
        self.height *= sy.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_resizes() {
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 20.0, 30.0);
        rect.transform(Affine::scale(2.0));
        assert_eq!(rect.position, Point::new(20.0, 20.0));
        assert!((rect.width - 40.0).abs() < f64::EPSILON);
        assert!((rect.height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_translate_keeps_size() {
        let mut rect = Rectangle::new(Point::new(10.0, 20.0), 100.0, 50.0);
        rect.transform(Affine::translate((5.0, -5.0)));
        assert_eq!(rect.position, Point::new(15.0, 15.0));
        assert!((rect.width - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test() {
        let rect = Rectangle::new(Point::new(0.0, 0.0), 100.0, 100.0);
        assert!(rect.hit_test(Point::new(50.0, 50.0), 0.0));
        assert!(!rect.hit_test(Point::new(150.0, 50.0), 0.0));
        assert!(rect.hit_test(Point::new(105.0, 50.0), 10.0));
    }
}
