//! Engine errors.

use crate::order_key::OrderKeyError;
use crate::shapes::ShapeId;
use thiserror::Error;

/// Errors returned by programmatic engine operations.
///
/// Pointer-event handlers never surface these; they log and skip the step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Shape not found: {0}")]
    ShapeNotFound(ShapeId),
    #[error("Shape {0} is not a slideshow")]
    NotASlideshow(ShapeId),
    #[error("Shape {0} is not a slide")]
    NotASlide(ShapeId),
    #[error("Slide {slide} is not bound to slideshow {slideshow}")]
    NotBound { slideshow: ShapeId, slide: ShapeId },
    #[error("Index {index} out of range for {len} slides")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    OrderKey(#[from] OrderKeyError),
}

impl EngineError {
    /// Whether the error comes from a shape or binding that went away or
    /// changed kind under the engine, as opposed to a broken order invariant.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Self::ShapeNotFound(_) | Self::NotASlideshow(_) | Self::NotASlide(_) | Self::NotBound { .. }
        )
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
