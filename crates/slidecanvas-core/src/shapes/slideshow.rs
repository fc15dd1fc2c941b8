//! Slideshow shape: the container that arranges slides.

use super::{ShapeId, ShapeKind, ShapeTrait};
use crate::layout::{LayoutPattern, MIN_CONTAINER_HEIGHT, MIN_CONTAINER_WIDTH};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A slideshow that owns an ordered set of slides.
///
/// Its size is always derived from its pattern and committed slides; it is
/// never resized directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slideshow {
    pub(crate) id: ShapeId,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub parent: Option<ShapeId>,
    /// Layout strategy.
    #[serde(default)]
    pub pattern: LayoutPattern,
    /// Index of the slide currently in focus for navigation.
    #[serde(default)]
    pub current_index: usize,
    /// Ordered slide ids. A cache of the binding table; rebuilt on every layout.
    #[serde(default)]
    pub slide_ids: Vec<ShapeId>,
    /// Title shown in the header band.
    #[serde(default)]
    pub title: String,
}

impl Slideshow {
    /// Create an empty slideshow at its minimum size.
    pub fn new(position: Point, pattern: LayoutPattern) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: MIN_CONTAINER_WIDTH,
            height: MIN_CONTAINER_HEIGHT,
            parent: None,
            pattern,
            current_index: 0,
            slide_ids: Vec::new(),
            title: String::new(),
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
    }

    /// Number of cached slides.
    pub fn slide_count(&self) -> usize {
        self.slide_ids.len()
    }

    /// Slide under the navigation cursor.
    pub fn current_slide(&self) -> Option<ShapeId> {
        self.slide_ids
            .get(self.current_index.min(self.slide_ids.len().saturating_sub(1)))
            .copied()
    }
}

impl ShapeTrait for Slideshow {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Slideshow
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn transform(&mut self, affine: Affine) {
        // Size is derived from the slides, so only the origin moves.
        self.position = affine * self.position;
    }
}
