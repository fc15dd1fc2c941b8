//! Drag reconciliation for a single slide.
//!
//! A [`SlideDrag`] walks `Idle -> Dragging -> Committed | Removed`. While
//! dragging, the slide's binding to the slideshow under its anchor is kept as
//! a placeholder whose order key tracks the projected insertion index. On
//! release the placeholder is either promoted through [`reorder::commit`] or
//! every binding of the slide is dropped.
//!
//! Every transition tolerates being called again: a second `end` or a `move`
//! outside `Dragging` does nothing.

use crate::bindings::{Binding, BindingKind, BindingPatch, NewBinding, SlideBindingProps};
use crate::content;
use crate::error::{EngineError, EngineResult};
use crate::host::{Host, ordered_slide_bindings, page_bounds, slide_binding_of};
use crate::layout::{LayoutConfig, LayoutPattern, project_slot, slot_size};
use crate::order_key::{OrderKey, key_between};
use crate::reorder::{self, CommitOutcome};
use crate::shapes::{Shape, ShapeId};
use kurbo::{Point, Rect, Size};

/// Distance from a half slot within which two slots count as tied.
const TIE_EPSILON: f64 = 1e-6;

/// Where an in-progress drag currently stands.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub slide: ShapeId,
    /// Slideshow the slide was committed to when the drag began.
    pub origin: Option<ShapeId>,
    /// Committed index inside `origin` when the drag began.
    pub origin_index: Option<usize>,
    /// Slideshow holding the placeholder binding, if any.
    pub target: Option<ShapeId>,
    /// Projected insertion index inside `target`.
    pub target_index: Option<usize>,
    /// Last page-space anchor (slide centre).
    pub anchor: Point,
}

/// Phase of a slide drag.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging(DragState),
    /// The slide landed in `slideshow`.
    Committed(CommitOutcome),
    /// The slide ended outside every slideshow and lost its bindings.
    Removed,
}

impl DragPhase {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragPhase::Dragging(_))
    }
}

/// Drag state machine for one slide.
#[derive(Debug, Clone, Default)]
pub struct SlideDrag {
    phase: DragPhase,
}

/// Log a failed drag step. Stale ids are expected while shapes are deleted
/// under a drag; anything else is a broken invariant.
fn report(step: &str, id: ShapeId, err: &EngineError) {
    if err.is_stale() {
        log::warn!("{} of {} skipped: {}", step, id, err);
    } else {
        log::error!("{} of {} failed: {}", step, id, err);
    }
}

impl SlideDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &DragPhase {
        &self.phase
    }

    /// Slide being dragged, while dragging.
    pub fn slide(&self) -> Option<ShapeId> {
        match &self.phase {
            DragPhase::Dragging(state) => Some(state.slide),
            _ => None,
        }
    }

    /// Begin dragging `slide`. Ignored while a drag is already running.
    pub fn start<H: Host>(&mut self, host: &mut H, slide: ShapeId) {
        if self.phase.is_dragging() {
            log::debug!("Drag of {} already in progress", slide);
            return;
        }
        let Some(shape) = host.get_shape(slide) else {
            log::warn!("Drag start on missing shape {}", slide);
            return;
        };
        if !shape.behavior().bindable_slide {
            log::debug!("Shape {} is not draggable into slideshows", slide);
            return;
        }
        let anchor = anchor_of(host, slide).unwrap_or_default();

        let binding = slide_binding_of(host, slide).filter(|b| !b.is_placeholder());
        if binding
            .as_ref()
            .and_then(Binding::as_slide)
            .is_some_and(|props| props.is_moving_with_parent)
        {
            log::debug!("Slide {} is moving with its slideshow, not starting a drag", slide);
            return;
        }

        let (origin, origin_index) = match &binding {
            Some(binding) => {
                let index = ordered_slide_bindings(host, binding.from_id, false)
                    .iter()
                    .position(|b| b.to_id == slide);
                (Some(binding.from_id), index)
            }
            None => (None, None),
        };

        host.batch(|host| {
            if let Some(binding) = &binding {
                host.update_binding(binding.id, &BindingPatch::placeholder(true));
            }
            content::on_translate_start(host, slide);
        });

        log::debug!("Drag started for slide {} (slideshow {:?}, index {:?})", slide, origin, origin_index);
        self.phase = DragPhase::Dragging(DragState {
            slide,
            origin,
            origin_index,
            target: origin,
            target_index: origin_index,
            anchor,
        });
    }

    /// Reconcile bindings with the slide's current position.
    pub fn update<H: Host>(&mut self, host: &mut H, config: &LayoutConfig) {
        let DragPhase::Dragging(state) = &mut self.phase else {
            return;
        };
        if let Err(err) = reconcile(host, state, config) {
            report("Drag update", state.slide, &err);
        }
    }

    /// Release the slide: commit it where it stands or drop its bindings.
    pub fn end<H: Host>(&mut self, host: &mut H, config: &LayoutConfig) -> &DragPhase {
        let mut state = match std::mem::take(&mut self.phase) {
            DragPhase::Dragging(state) => state,
            settled => {
                self.phase = settled;
                return &self.phase;
            }
        };
        if host.get_shape(state.slide).is_some() {
            if let Err(err) = reconcile(host, &mut state, config) {
                report("Final reconcile", state.slide, &err);
            }
        }

        self.phase = host.batch(|host| {
            let phase = match resolve(host, &state, config) {
                Ok(Some(outcome)) => DragPhase::Committed(outcome),
                Ok(None) => DragPhase::Removed,
                Err(err) => {
                    report("Commit", state.slide, &err);
                    detach(host, state.slide);
                    DragPhase::Removed
                }
            };
            if let Some(origin) = state.origin.filter(|o| Some(*o) != state.target) {
                relayout_logged(host, origin, config);
            }
            if matches!(phase, DragPhase::Removed) {
                if let Some(target) = state.target {
                    relayout_logged(host, target, config);
                }
            }
            content::on_translate_end(host, state.slide, config);
            phase
        });
        log::debug!("Drag of slide {} ended: {:?}", state.slide, self.phase);
        &self.phase
    }

    /// Abort the drag. Resolves exactly like a release at the last position.
    pub fn cancel<H: Host>(&mut self, host: &mut H, config: &LayoutConfig) -> &DragPhase {
        self.end(host, config)
    }
}

/// Page-space centre of a shape.
fn anchor_of<H: Host>(host: &H, id: ShapeId) -> Option<Point> {
    page_bounds(host, id).map(|r: Rect| r.center())
}

fn relayout_logged<H: Host>(host: &mut H, slideshow: ShapeId, config: &LayoutConfig) {
    if let Err(err) = reorder::relayout(host, slideshow, config) {
        report("Relayout", slideshow, &err);
    }
}

/// Delete every slideshow binding of `slide`.
fn detach<H: Host>(host: &mut H, slide: ShapeId) -> Vec<ShapeId> {
    let bindings = host.bindings_to_shape(slide, BindingKind::Slide);
    let ids: Vec<_> = bindings.iter().map(|b| b.id).collect();
    host.delete_bindings(&ids);
    bindings.into_iter().map(|b| b.from_id).collect()
}

/// Round a fractional slot to an insertion index in `0..=count`.
///
/// Exact ties go to the slot nearer `current`, else the lower one.
pub fn insertion_index(slot: f64, count: usize, current: Option<usize>) -> usize {
    if count == 0 || !slot.is_finite() {
        return 0;
    }
    let floor = slot.floor();
    let index = if ((slot - floor) - 0.5).abs() < TIE_EPSILON {
        let low = floor;
        let high = floor + 1.0;
        match current {
            Some(current) if (high - current as f64).abs() < (low - current as f64).abs() => high,
            _ => low,
        }
    } else {
        slot.round()
    };
    index.clamp(0.0, count as f64) as usize
}

fn key_fits(key: &OrderKey, lower: Option<&OrderKey>, upper: Option<&OrderKey>) -> bool {
    lower.is_none_or(|l| l < key) && upper.is_none_or(|u| key < u)
}

/// One reconciliation step for a move event.
fn reconcile<H: Host>(host: &mut H, state: &mut DragState, config: &LayoutConfig) -> EngineResult<()> {
    let slide = state.slide;
    let size = host
        .get_shape(slide)
        .map(Shape::size)
        .ok_or(EngineError::ShapeNotFound(slide))?;
    let anchor = anchor_of(host, slide).ok_or(EngineError::ShapeNotFound(slide))?;
    state.anchor = anchor;

    content::on_translate(host, slide, config);

    let hit = host.hit_test_at_point(anchor, &|shape: &Shape| {
        shape.behavior().accepts_slides && shape.id() != slide
    });

    let Some(slideshow) = hit else {
        if let Some(current) = state.target {
            let inside = page_bounds(host, current).is_some_and(|bounds| bounds.contains(anchor));
            if !inside {
                host.batch(|host| {
                    for left in detach(host, slide) {
                        relayout_logged(host, left, config);
                    }
                });
                log::debug!("Slide {} left slideshow {}", slide, current);
                state.target = None;
                state.target_index = None;
            }
        }
        return Ok(());
    };

    let (origin, pattern) = match host.get_shape(slideshow) {
        Some(Shape::Slideshow(show)) => (show.position, show.pattern),
        _ => return Err(EngineError::NotASlideshow(slideshow)),
    };
    let others: Vec<Binding> = ordered_slide_bindings(host, slideshow, false)
        .into_iter()
        .filter(|b| b.to_id != slide)
        .collect();
    let mut sizes: Vec<Size> = others
        .iter()
        .filter_map(|b| host.get_shape(b.to_id).map(Shape::size))
        .collect();
    sizes.push(size);
    let cell = match pattern {
        LayoutPattern::Grid | LayoutPattern::Radial => slot_size(&sizes, config),
        _ => size,
    };
    let slot = project_slot(pattern, anchor, others.len() + 1, cell, origin, config);
    let current = (state.origin == Some(slideshow)).then_some(state.origin_index).flatten();
    let index = insertion_index(slot, others.len(), current);

    let lower = index.checked_sub(1).and_then(|i| others.get(i)).and_then(Binding::order_key);
    let upper = others.get(index).and_then(Binding::order_key);
    let existing = host.bindings_to_shape(slide, BindingKind::Slide);

    host.batch(|host| -> EngineResult<()> {
        let stale: Vec<&Binding> = existing.iter().filter(|b| b.from_id != slideshow).collect();
        if !stale.is_empty() {
            let ids: Vec<_> = stale.iter().map(|b| b.id).collect();
            host.delete_bindings(&ids);
            for b in stale {
                relayout_logged(host, b.from_id, config);
            }
        }
        match existing.iter().find(|b| b.from_id == slideshow) {
            Some(binding) => {
                if !binding.order_key().is_some_and(|k| key_fits(k, lower, upper)) {
                    let key = key_between(lower, upper)?;
                    host.update_binding(binding.id, &BindingPatch::order_key(key));
                }
                host.update_binding(binding.id, &BindingPatch::placeholder(true));
            }
            None => {
                let key = key_between(lower, upper)?;
                host.create_binding(NewBinding::slide(slideshow, slide, SlideBindingProps::placeholder(key)));
                log::debug!("Slide {} entered slideshow {} at index {}", slide, slideshow, index);
            }
        }
        Ok(())
    })?;

    state.target = Some(slideshow);
    state.target_index = Some(index);
    Ok(())
}

/// Settle a finished drag. `Some` when the slide was committed.
fn resolve<H: Host>(host: &mut H, state: &DragState, config: &LayoutConfig) -> EngineResult<Option<CommitOutcome>> {
    let placeholder = state.target.filter(|target| {
        host.get_shape(*target).is_some()
            && host
                .bindings_to_shape(state.slide, BindingKind::Slide)
                .iter()
                .any(|b| b.from_id == *target)
    });
    match (placeholder, host.get_shape(state.slide)) {
        (Some(target), Some(_)) => {
            let from_index = (state.origin == Some(target)).then_some(state.origin_index).flatten();
            let to_index = state.target_index.unwrap_or(0);
            reorder::commit(host, target, state.slide, from_index, to_index, config).map(Some)
        }
        _ => {
            detach(host, state.slide);
            Ok(None)
        }
    }
}
