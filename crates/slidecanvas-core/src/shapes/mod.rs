//! Shape definitions for the slide canvas.

mod frame;
mod rectangle;
mod slide;
mod slideshow;

pub use frame::ContentFrame;
pub use rectangle::Rectangle;
pub use slide::{PayloadFormat, Slide, SlidePayload};
pub use slideshow::Slideshow;

use crate::layout::LayoutPattern;
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for shapes.
pub type ShapeId = Uuid;

/// Type tag of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Slideshow,
    Slide,
    ContentFrame,
    Rectangle,
}

/// Static behavior of a shape kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeBehavior {
    /// The user may resize it directly.
    pub resizable: bool,
    /// Slides can be bound into it.
    pub accepts_slides: bool,
    /// It can be bound into a slideshow.
    pub bindable_slide: bool,
    /// It owns a content frame that follows it.
    pub hosts_content: bool,
}

const SLIDESHOW_BEHAVIOR: ShapeBehavior = ShapeBehavior {
    resizable: false,
    accepts_slides: true,
    bindable_slide: false,
    hosts_content: false,
};

const SLIDE_BEHAVIOR: ShapeBehavior = ShapeBehavior {
    resizable: false,
    accepts_slides: false,
    bindable_slide: true,
    hosts_content: true,
};

const CONTENT_FRAME_BEHAVIOR: ShapeBehavior = ShapeBehavior {
    resizable: false,
    accepts_slides: false,
    bindable_slide: false,
    hosts_content: false,
};

const RECTANGLE_BEHAVIOR: ShapeBehavior = ShapeBehavior {
    resizable: true,
    accepts_slides: false,
    bindable_slide: false,
    hosts_content: false,
};

impl ShapeKind {
    /// Look up the behavior table entry for this kind.
    pub fn behavior(self) -> &'static ShapeBehavior {
        match self {
            ShapeKind::Slideshow => &SLIDESHOW_BEHAVIOR,
            ShapeKind::Slide => &SLIDE_BEHAVIOR,
            ShapeKind::ContentFrame => &CONTENT_FRAME_BEHAVIOR,
            ShapeKind::Rectangle => &RECTANGLE_BEHAVIOR,
        }
    }
}

/// Common trait for all shapes.
pub trait ShapeTrait {
    /// Get the unique identifier.
    fn id(&self) -> ShapeId;

    /// Get the type tag.
    fn kind(&self) -> ShapeKind;

    /// Get the bounding box in page coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in page coordinates) hits this shape.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.bounds().inflate(tolerance, tolerance).contains(point)
    }

    /// Apply a transform to this shape.
    fn transform(&mut self, affine: Affine);
}

/// Partial update for a shape. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub parent: Option<Option<ShapeId>>,
    pub pattern: Option<LayoutPattern>,
    pub current_index: Option<usize>,
    pub slide_ids: Option<Vec<ShapeId>>,
}

impl ShapePatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }
}

/// Enum wrapper for all shape types (for serialization).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Slideshow(Slideshow),
    Slide(Slide),
    ContentFrame(ContentFrame),
    Rectangle(Rectangle),
}

impl Shape {
    pub fn id(&self) -> ShapeId {
        match self {
            Shape::Slideshow(s) => s.id(),
            Shape::Slide(s) => s.id(),
            Shape::ContentFrame(s) => s.id(),
            Shape::Rectangle(s) => s.id(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Slideshow(s) => s.kind(),
            Shape::Slide(s) => s.kind(),
            Shape::ContentFrame(s) => s.kind(),
            Shape::Rectangle(s) => s.kind(),
        }
    }

    pub fn behavior(&self) -> &'static ShapeBehavior {
        self.kind().behavior()
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Slideshow(s) => s.bounds(),
            Shape::Slide(s) => s.bounds(),
            Shape::ContentFrame(s) => s.bounds(),
            Shape::Rectangle(s) => s.bounds(),
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self {
            Shape::Slideshow(s) => s.hit_test(point, tolerance),
            Shape::Slide(s) => s.hit_test(point, tolerance),
            Shape::ContentFrame(s) => s.hit_test(point, tolerance),
            Shape::Rectangle(s) => s.hit_test(point, tolerance),
        }
    }

    pub fn transform(&mut self, affine: Affine) {
        match self {
            Shape::Slideshow(s) => s.transform(affine),
            Shape::Slide(s) => s.transform(affine),
            Shape::ContentFrame(s) => s.transform(affine),
            Shape::Rectangle(s) => s.transform(affine),
        }
    }

    /// Top-left corner in page coordinates.
    pub fn position(&self) -> Point {
        match self {
            Shape::Slideshow(s) => s.position,
            Shape::Slide(s) => s.position,
            Shape::ContentFrame(s) => s.position,
            Shape::Rectangle(s) => s.position,
        }
    }

    pub fn size(&self) -> Size {
        self.bounds().size()
    }

    /// Structural parent, if any.
    pub fn parent(&self) -> Option<ShapeId> {
        match self {
            Shape::Slideshow(s) => s.parent,
            Shape::Slide(s) => s.parent,
            Shape::ContentFrame(s) => s.parent,
            Shape::Rectangle(s) => s.parent,
        }
    }

    fn geometry_mut(&mut self) -> (&mut Point, &mut f64, &mut f64, &mut Option<ShapeId>) {
        match self {
            Shape::Slideshow(s) => (&mut s.position, &mut s.width, &mut s.height, &mut s.parent),
            Shape::Slide(s) => (&mut s.position, &mut s.width, &mut s.height, &mut s.parent),
            Shape::ContentFrame(s) => (&mut s.position, &mut s.width, &mut s.height, &mut s.parent),
            Shape::Rectangle(s) => (&mut s.position, &mut s.width, &mut s.height, &mut s.parent),
        }
    }

    /// Apply a patch. Returns true if anything actually changed.
    ///
    /// Fields that do not apply to this shape kind are ignored.
    pub fn apply_patch(&mut self, patch: &ShapePatch) -> bool {
        let mut changed = false;
        {
            let (position, width, height, parent) = self.geometry_mut();
            if let Some(p) = patch.position {
                changed |= set_if_changed(position, p);
            }
            if let Some(size) = patch.size {
                changed |= set_if_changed(width, size.width);
                changed |= set_if_changed(height, size.height);
            }
            if let Some(p) = patch.parent {
                changed |= set_if_changed(parent, p);
            }
        }
        if let Shape::Slideshow(show) = self {
            if let Some(pattern) = patch.pattern {
                changed |= set_if_changed(&mut show.pattern, pattern);
            }
            if let Some(index) = patch.current_index {
                changed |= set_if_changed(&mut show.current_index, index);
            }
            if let Some(ids) = &patch.slide_ids {
                if show.slide_ids != *ids {
                    show.slide_ids = ids.clone();
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn is_slideshow(&self) -> bool {
        matches!(self, Shape::Slideshow(_))
    }

    pub fn as_slideshow(&self) -> Option<&Slideshow> {
        match self {
            Shape::Slideshow(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_slide(&self) -> Option<&Slide> {
        match self {
            Shape::Slide(s) => Some(s),
            _ => None,
        }
    }
}

fn set_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
