//! Current slideshow / slide, derived from the document on demand.
//!
//! Nothing here is authoritative state. The "current" slideshow is recomputed
//! from the viewport and the shape graph; [`Derived`] only memoizes the answer
//! until the host revision or the viewport changes.

use crate::error::{EngineError, EngineResult};
use crate::host::{Host, ordered_slide_bindings, page_bounds};
use crate::shapes::{Shape, ShapeId, ShapePatch};
use kurbo::Rect;

/// A value recomputed whenever its key changes.
#[derive(Debug, Clone)]
pub struct Derived<K, T> {
    cached: Option<(K, T)>,
}

impl<K, T> Default for Derived<K, T> {
    fn default() -> Self {
        Self { cached: None }
    }
}

impl<K: PartialEq, T: Clone> Derived<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached value for `key`, computing it first if the key moved on.
    pub fn get(&mut self, key: K, compute: impl FnOnce() -> T) -> T {
        match &self.cached {
            Some((cached_key, value)) if *cached_key == key => value.clone(),
            _ => {
                let value = compute();
                self.cached = Some((key, value.clone()));
                value
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}

/// Slide that navigation focused, with its page-space bounds for the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlideFocus {
    pub slideshow: ShapeId,
    pub slide: ShapeId,
    pub index: usize,
    pub bounds: Rect,
}

/// Slideshow the user is looking at.
///
/// The one containing the viewport centre wins; otherwise the front-most
/// slideshow that intersects the viewport.
pub fn find_current_slideshow<H: Host>(host: &H) -> Option<ShapeId> {
    let viewport = host.viewport_bounds();
    let center = viewport.center();
    let mut visible = None;
    for id in host.shape_ids().into_iter().rev() {
        if !host.get_shape(id).is_some_and(Shape::is_slideshow) {
            continue;
        }
        let Some(bounds) = page_bounds(host, id) else {
            continue;
        };
        if bounds.contains(center) {
            return Some(id);
        }
        if visible.is_none() && !bounds.intersect(viewport).is_zero_area() {
            visible = Some(id);
        }
    }
    visible
}

/// Memoized navigation state.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Derived<(u64, Rect), Option<ShapeId>>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_slideshow<H: Host>(&mut self, host: &H) -> Option<ShapeId> {
        let key = (host.revision(), host.viewport_bounds());
        self.current.get(key, || find_current_slideshow(host))
    }

    /// Focused slide of the current slideshow.
    pub fn current_slide<H: Host>(&mut self, host: &H) -> Option<SlideFocus> {
        let slideshow = self.current_slideshow(host)?;
        let index = match host.get_shape(slideshow) {
            Some(Shape::Slideshow(show)) => show.current_index,
            _ => return None,
        };
        focus_at(host, slideshow, index)
    }
}

fn committed_order<H: Host>(host: &H, slideshow: ShapeId) -> EngineResult<Vec<ShapeId>> {
    match host.get_shape(slideshow) {
        Some(Shape::Slideshow(_)) => Ok(ordered_slide_bindings(host, slideshow, false)
            .into_iter()
            .map(|b| b.to_id)
            .filter(|id| host.get_shape(*id).is_some())
            .collect()),
        Some(_) => Err(EngineError::NotASlideshow(slideshow)),
        None => Err(EngineError::ShapeNotFound(slideshow)),
    }
}

fn focus_at<H: Host>(host: &H, slideshow: ShapeId, index: usize) -> Option<SlideFocus> {
    let order = committed_order(host, slideshow).ok()?;
    let index = index.min(order.len().checked_sub(1)?);
    let slide = order[index];
    Some(SlideFocus {
        slideshow,
        slide,
        index,
        bounds: page_bounds(host, slide)?,
    })
}

/// Point `slideshow` at slide `index`, clamped to the committed range.
///
/// Returns `None` for an empty slideshow.
pub fn go_to_slide<H: Host>(host: &mut H, slideshow: ShapeId, index: usize) -> EngineResult<Option<SlideFocus>> {
    let order = committed_order(host, slideshow)?;
    let Some(last) = order.len().checked_sub(1) else {
        return Ok(None);
    };
    let index = index.min(last);
    let patch = ShapePatch {
        current_index: Some(index),
        ..Default::default()
    };
    if host.update_shape(slideshow, &patch) {
        log::debug!("Slideshow {} now on slide {}", slideshow, index);
    }
    Ok(focus_at(host, slideshow, index))
}

fn current_index<H: Host>(host: &H, slideshow: ShapeId) -> EngineResult<usize> {
    match host.get_shape(slideshow) {
        Some(Shape::Slideshow(show)) => Ok(show.current_index),
        Some(_) => Err(EngineError::NotASlideshow(slideshow)),
        None => Err(EngineError::ShapeNotFound(slideshow)),
    }
}

/// Step forward one slide, stopping at the last.
pub fn next_slide<H: Host>(host: &mut H, slideshow: ShapeId) -> EngineResult<Option<SlideFocus>> {
    let index = current_index(host, slideshow)?;
    go_to_slide(host, slideshow, index.saturating_add(1))
}

/// Step back one slide, stopping at the first.
pub fn previous_slide<H: Host>(host: &mut H, slideshow: ShapeId) -> EngineResult<Option<SlideFocus>> {
    let index = current_index(host, slideshow)?;
    go_to_slide(host, slideshow, index.saturating_sub(1))
}
