//! Committing order changes and re-laying out slideshows.
//!
//! Everything here runs inside one host batch, so a renderer never sees a
//! slideshow whose slides, keys and size disagree.

use crate::bindings::{Binding, BindingPatch};
use crate::content;
use crate::error::{EngineError, EngineResult};
use crate::host::{Host, ordered_slide_bindings};
use crate::layout::{LayoutConfig, LayoutPattern, layout_positions, size_for};
use crate::order_key::{OrderKey, key_between};
use crate::shapes::{Shape, ShapeId, ShapePatch};
use kurbo::{Point, Size};

/// Result of [`commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// Committed slide order after the move.
    pub order: Vec<ShapeId>,
    /// Index the moved slide landed on.
    pub index: usize,
    /// Slide that previously held `index`, and where it was laid out after
    /// the move.
    pub displaced: Option<(ShapeId, Point)>,
    /// Order key of the moved slide.
    pub order_key: OrderKey,
}

fn slideshow_geometry<H: Host>(host: &H, slideshow: ShapeId) -> EngineResult<(Point, LayoutPattern)> {
    match host.get_shape(slideshow) {
        Some(Shape::Slideshow(show)) => Ok((show.position, show.pattern)),
        Some(_) => Err(EngineError::NotASlideshow(slideshow)),
        None => Err(EngineError::ShapeNotFound(slideshow)),
    }
}

/// Committed slides that still exist, with their sizes, in order.
fn committed_slides<H: Host>(host: &H, slideshow: ShapeId) -> Vec<(Binding, Size)> {
    ordered_slide_bindings(host, slideshow, false)
        .into_iter()
        .filter_map(|binding| match host.get_shape(binding.to_id) {
            Some(shape) => {
                let size = shape.size();
                Some((binding, size))
            }
            None => {
                log::warn!("Skipping binding {} to missing slide {}", binding.id, binding.to_id);
                None
            }
        })
        .collect()
}

/// Position every committed slide, sync their frames and resize the slideshow.
///
/// Returns the committed order, which is also written to the slideshow's
/// `slide_ids` cache.
pub fn relayout<H: Host>(host: &mut H, slideshow: ShapeId, config: &LayoutConfig) -> EngineResult<Vec<ShapeId>> {
    let (origin, pattern) = slideshow_geometry(host, slideshow)?;
    let slides = committed_slides(host, slideshow);
    let sizes: Vec<Size> = slides.iter().map(|(_, size)| *size).collect();
    let ids: Vec<ShapeId> = slides.iter().map(|(b, _)| b.to_id).collect();
    let positions = layout_positions(pattern, &sizes, origin, config);
    let size = size_for(pattern, &sizes, config);

    host.batch(|host| {
        for (id, position) in ids.iter().zip(positions) {
            host.update_shape(*id, &ShapePatch::position(position));
            content::follow(host, *id, config);
        }
        let current = match host.get_shape(slideshow) {
            Some(Shape::Slideshow(show)) => show.current_index,
            _ => 0,
        };
        let patch = ShapePatch {
            size: Some(size),
            current_index: Some(current.min(ids.len().saturating_sub(1))),
            slide_ids: Some(ids.clone()),
            ..Default::default()
        };
        if host.update_shape(slideshow, &patch) {
            log::debug!("Slideshow {} laid out {} slides as {}", slideshow, ids.len(), pattern);
        }
    });
    Ok(ids)
}

/// Move `moved` to `to_index` within `slideshow` and promote its binding.
///
/// `moved` must already have a binding from `slideshow`, committed or
/// placeholder. `from_index` is its committed index before the move, or
/// `None` if it came from elsewhere. The order follows splice semantics and the
/// whole slideshow is laid out again from it. The slide that held `to_index`
/// shifts one slot towards the vacated one; for a move to an adjacent index
/// that is exactly the moved slide's old slot.
pub fn commit<H: Host>(
    host: &mut H,
    slideshow: ShapeId,
    moved: ShapeId,
    from_index: Option<usize>,
    to_index: usize,
    config: &LayoutConfig,
) -> EngineResult<CommitOutcome> {
    slideshow_geometry(host, slideshow)?;
    let binding = ordered_slide_bindings(host, slideshow, true)
        .into_iter()
        .find(|b| b.to_id == moved)
        .ok_or(EngineError::NotBound { slideshow, slide: moved })?;
    if host.get_shape(moved).is_none() {
        return Err(EngineError::ShapeNotFound(moved));
    }

    let others: Vec<(Binding, Size)> = committed_slides(host, slideshow)
        .into_iter()
        .filter(|(b, _)| b.to_id != moved)
        .collect();
    let to_index = to_index.min(others.len());

    // Slide holding `to_index` before the move.
    let mut old_order: Vec<ShapeId> = others.iter().map(|(b, _)| b.to_id).collect();
    if let Some(from) = from_index {
        old_order.insert(from.min(old_order.len()), moved);
    }
    let displaced = old_order.get(to_index).copied().filter(|id| *id != moved);

    let lower = to_index.checked_sub(1).and_then(|i| others.get(i)).and_then(|(b, _)| b.order_key());
    let upper = others.get(to_index).and_then(|(b, _)| b.order_key());
    let key = match binding.order_key() {
        Some(key) if lower.is_none_or(|l| l < key) && upper.is_none_or(|u| key < u) => key.clone(),
        _ => key_between(lower, upper)?,
    };

    host.batch(|host| -> EngineResult<()> {
        host.update_binding(
            binding.id,
            &BindingPatch {
                order_key: Some(key.clone()),
                placeholder: Some(false),
                ..Default::default()
            },
        );
        relayout(host, slideshow, config)?;
        Ok(())
    })?;

    let mut order: Vec<ShapeId> = others.iter().map(|(b, _)| b.to_id).collect();
    order.insert(to_index, moved);
    log::debug!("Committed slide {} at index {} of slideshow {}", moved, to_index, slideshow);
    let displaced = displaced.and_then(|id| Some((id, host.get_shape(id)?.position())));
    Ok(CommitOutcome {
        order,
        index: to_index,
        displaced,
        order_key: key,
    })
}
