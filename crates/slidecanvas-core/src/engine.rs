//! Entry point wiring host events to the layout and binding machinery.
//!
//! A host owns one [`SlideEngine`] next to its document and forwards
//! translate (drag) and delete events to it. Programmatic edits return
//! [`EngineResult`]; event handlers log failures and carry on so a bad event
//! never wedges the UI loop.

use crate::bindings::{BindingKind, BindingPatch, NewBinding, SlideBindingProps};
use crate::content;
use crate::drag::{DragPhase, SlideDrag};
use crate::error::{EngineError, EngineResult};
use crate::host::{Host, ordered_slide_bindings};
use crate::layout::{LayoutConfig, LayoutPattern};
use crate::navigation::{self, Navigator, SlideFocus};
use crate::order_key::{key_between, n_keys_between};
use crate::reorder::{self, CommitOutcome};
use crate::shapes::{Shape, ShapeId, ShapeKind, ShapePatch, Slide, Slideshow};
use kurbo::Point;
use std::collections::HashMap;

/// Slide layout and binding engine.
#[derive(Debug, Default)]
pub struct SlideEngine {
    config: LayoutConfig,
    drags: HashMap<ShapeId, SlideDrag>,
    navigator: Navigator,
}

impl SlideEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            drags: HashMap::new(),
            navigator: Navigator::new(),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Phase of the drag running on `slide`, if any.
    pub fn drag_phase(&self, slide: ShapeId) -> Option<&DragPhase> {
        self.drags.get(&slide).map(SlideDrag::phase)
    }

    fn ensure_slideshow<H: Host>(host: &H, id: ShapeId) -> EngineResult<()> {
        match host.get_shape(id) {
            Some(Shape::Slideshow(_)) => Ok(()),
            Some(_) => Err(EngineError::NotASlideshow(id)),
            None => Err(EngineError::ShapeNotFound(id)),
        }
    }

    fn new_slide<H: Host>(&self, host: &mut H, at: Point, number: usize) -> ShapeId {
        let mut slide = Slide::new(at, self.config.slide_size);
        slide.title = format!("Slide {}", number);
        let id = host.create_shape(Shape::Slide(slide));
        content::attach_frame(host, id, &self.config);
        id
    }

    // --- Programmatic edits ---

    /// Create a slideshow at `origin` holding `slide_count` fresh slides.
    pub fn create_slideshow<H: Host>(
        &self,
        host: &mut H,
        origin: Point,
        pattern: LayoutPattern,
        slide_count: usize,
    ) -> EngineResult<ShapeId> {
        let keys = n_keys_between(None, None, slide_count)?;
        let show = host.batch(|host| -> EngineResult<ShapeId> {
            let show = host.create_shape(Shape::Slideshow(Slideshow::new(origin, pattern)));
            for (i, key) in keys.into_iter().enumerate() {
                let slide = self.new_slide(host, origin, i + 1);
                host.create_binding(NewBinding::slide(show, slide, SlideBindingProps::committed(key)));
            }
            reorder::relayout(host, show, &self.config)?;
            Ok(show)
        })?;
        log::info!("Created {} slideshow {} with {} slides", pattern, show, slide_count);
        Ok(show)
    }

    /// Create a slide at `index` of `slideshow`.
    pub fn insert_slide<H: Host>(&self, host: &mut H, slideshow: ShapeId, index: usize) -> EngineResult<ShapeId> {
        Self::ensure_slideshow(host, slideshow)?;
        let order = ordered_slide_bindings(host, slideshow, false);
        if index > order.len() {
            return Err(EngineError::IndexOutOfRange { index, len: order.len() });
        }
        let lower = index.checked_sub(1).and_then(|i| order.get(i)).and_then(|b| b.order_key());
        let upper = order.get(index).and_then(|b| b.order_key());
        let key = key_between(lower, upper)?;
        let origin = host.get_shape(slideshow).map(Shape::position).unwrap_or_default();

        host.batch(|host| -> EngineResult<ShapeId> {
            let slide = self.new_slide(host, origin, order.len() + 1);
            host.create_binding(NewBinding::slide(slideshow, slide, SlideBindingProps::committed(key)));
            reorder::relayout(host, slideshow, &self.config)?;
            Ok(slide)
        })
    }

    /// Delete `slide` and its content frame from `slideshow`.
    pub fn remove_slide<H: Host>(&mut self, host: &mut H, slideshow: ShapeId, slide: ShapeId) -> EngineResult<()> {
        Self::ensure_slideshow(host, slideshow)?;
        let bound = host
            .bindings_to_shape(slide, BindingKind::Slide)
            .iter()
            .any(|b| b.from_id == slideshow);
        if !bound {
            return Err(EngineError::NotBound { slideshow, slide });
        }
        self.drags.remove(&slide);
        host.batch(|host| -> EngineResult<()> {
            content::remove_frame(host, slide);
            host.delete_shape(slide);
            reorder::relayout(host, slideshow, &self.config)?;
            Ok(())
        })
    }

    /// Move the slide at `from` to `to`.
    pub fn move_slide<H: Host>(
        &self,
        host: &mut H,
        slideshow: ShapeId,
        from: usize,
        to: usize,
    ) -> EngineResult<CommitOutcome> {
        Self::ensure_slideshow(host, slideshow)?;
        let order = ordered_slide_bindings(host, slideshow, false);
        let len = order.len();
        let moved = order
            .get(from)
            .map(|b| b.to_id)
            .ok_or(EngineError::IndexOutOfRange { index: from, len })?;
        if to >= len {
            return Err(EngineError::IndexOutOfRange { index: to, len });
        }
        reorder::commit(host, slideshow, moved, Some(from), to, &self.config)
    }

    /// Switch the layout pattern and lay everything out again.
    pub fn set_pattern<H: Host>(
        &self,
        host: &mut H,
        slideshow: ShapeId,
        pattern: LayoutPattern,
    ) -> EngineResult<Vec<ShapeId>> {
        Self::ensure_slideshow(host, slideshow)?;
        host.batch(|host| {
            let patch = ShapePatch {
                pattern: Some(pattern),
                ..Default::default()
            };
            host.update_shape(slideshow, &patch);
            reorder::relayout(host, slideshow, &self.config)
        })
    }

    /// Advance to the next pattern in the cycle. Returns the new pattern.
    pub fn cycle_pattern<H: Host>(&self, host: &mut H, slideshow: ShapeId) -> EngineResult<LayoutPattern> {
        let next = match host.get_shape(slideshow) {
            Some(Shape::Slideshow(show)) => show.pattern.next(),
            Some(_) => return Err(EngineError::NotASlideshow(slideshow)),
            None => return Err(EngineError::ShapeNotFound(slideshow)),
        };
        self.set_pattern(host, slideshow, next)?;
        Ok(next)
    }

    /// Rebuild the slide cache, positions and size of `slideshow`.
    pub fn relayout<H: Host>(&self, host: &mut H, slideshow: ShapeId) -> EngineResult<Vec<ShapeId>> {
        reorder::relayout(host, slideshow, &self.config)
    }

    // --- Slide drags ---

    pub fn on_drag_start<H: Host>(&mut self, host: &mut H, slide: ShapeId) {
        let drag = self.drags.entry(slide).or_default();
        drag.start(host, slide);
        if !drag.phase().is_dragging() {
            self.drags.remove(&slide);
        }
    }

    pub fn on_drag_move<H: Host>(&mut self, host: &mut H, slide: ShapeId) {
        if let Some(drag) = self.drags.get_mut(&slide) {
            drag.update(host, &self.config);
        }
    }

    /// Release a dragged slide. `None` if no drag was running.
    pub fn on_drag_end<H: Host>(&mut self, host: &mut H, slide: ShapeId) -> Option<DragPhase> {
        let mut drag = self.drags.remove(&slide)?;
        Some(drag.end(host, &self.config).clone())
    }

    pub fn on_drag_cancel<H: Host>(&mut self, host: &mut H, slide: ShapeId) -> Option<DragPhase> {
        let mut drag = self.drags.remove(&slide)?;
        Some(drag.cancel(host, &self.config).clone())
    }

    // --- Translation, dispatched by shape kind ---

    pub fn on_translate_start<H: Host>(&mut self, host: &mut H, id: ShapeId) {
        match host.get_shape(id).map(Shape::kind) {
            Some(ShapeKind::Slideshow) => set_moving_with_parent(host, id, true),
            Some(ShapeKind::Slide) => self.on_drag_start(host, id),
            _ => {}
        }
    }

    pub fn on_translate<H: Host>(&mut self, host: &mut H, id: ShapeId) {
        match host.get_shape(id).map(Shape::kind) {
            Some(ShapeKind::Slideshow) => {
                if let Err(err) = reorder::relayout(host, id, &self.config) {
                    log::warn!("Slideshow {} could not carry its slides: {}", id, err);
                }
            }
            Some(ShapeKind::Slide) => {
                if self.drags.contains_key(&id) {
                    self.on_drag_move(host, id);
                } else {
                    content::on_translate(host, id, &self.config);
                }
            }
            _ => {}
        }
    }

    pub fn on_translate_end<H: Host>(&mut self, host: &mut H, id: ShapeId) -> Option<DragPhase> {
        match host.get_shape(id).map(Shape::kind) {
            Some(ShapeKind::Slideshow) => {
                host.batch(|host| {
                    if let Err(err) = reorder::relayout(host, id, &self.config) {
                        log::warn!("Slideshow {} could not carry its slides: {}", id, err);
                    }
                    set_moving_with_parent(host, id, false);
                });
                None
            }
            Some(ShapeKind::Slide) => {
                if self.drags.contains_key(&id) {
                    self.on_drag_end(host, id)
                } else {
                    content::on_translate_end(host, id, &self.config);
                    None
                }
            }
            _ => None,
        }
    }

    // --- Deletion ---

    /// Clean up before the host deletes `id`.
    ///
    /// A slide leaves its slideshow, which closes the gap. A slideshow drops
    /// its bindings and its slides stay on the canvas unbound. A content frame
    /// drops its binding.
    pub fn on_before_delete<H: Host>(&mut self, host: &mut H, id: ShapeId) {
        let Some(kind) = host.get_shape(id).map(Shape::kind) else {
            return;
        };
        host.batch(|host| match kind {
            ShapeKind::Slide => {
                self.drags.remove(&id);
                let bindings = host.bindings_to_shape(id, BindingKind::Slide);
                let ids: Vec<_> = bindings.iter().map(|b| b.id).collect();
                host.delete_bindings(&ids);
                content::remove_frame(host, id);
                for binding in bindings {
                    if let Err(err) = reorder::relayout(host, binding.from_id, &self.config) {
                        log::warn!("Relayout after deleting slide {} skipped: {}", id, err);
                    }
                }
            }
            ShapeKind::Slideshow => {
                let ids: Vec<_> = host
                    .bindings_from_shape(id, BindingKind::Slide)
                    .iter()
                    .map(|b| b.id)
                    .collect();
                log::debug!("Slideshow {} deleted, releasing {} slides", id, ids.len());
                host.delete_bindings(&ids);
            }
            ShapeKind::ContentFrame => {
                let ids: Vec<_> = host
                    .bindings_to_shape(id, BindingKind::ContentFrame)
                    .iter()
                    .map(|b| b.id)
                    .collect();
                host.delete_bindings(&ids);
            }
            ShapeKind::Rectangle => {}
        });
    }

    /// Delete `id` through the host after cleaning up around it.
    pub fn delete_shape<H: Host>(&mut self, host: &mut H, id: ShapeId) -> Option<Shape> {
        host.batch(|host| {
            self.on_before_delete(host, id);
            host.delete_shape(id)
        })
    }

    // --- Navigation ---

    pub fn current_slideshow<H: Host>(&mut self, host: &H) -> Option<ShapeId> {
        self.navigator.current_slideshow(host)
    }

    pub fn current_slide<H: Host>(&mut self, host: &H) -> Option<SlideFocus> {
        self.navigator.current_slide(host)
    }

    /// Advance the current slideshow. `None` when nothing is in view.
    pub fn next_slide<H: Host>(&mut self, host: &mut H) -> Option<SlideFocus> {
        let show = self.navigator.current_slideshow(host)?;
        navigation::next_slide(host, show)
            .inspect_err(|err| log::warn!("Cannot advance slideshow {}: {}", show, err))
            .ok()
            .flatten()
    }

    pub fn previous_slide<H: Host>(&mut self, host: &mut H) -> Option<SlideFocus> {
        let show = self.navigator.current_slideshow(host)?;
        navigation::previous_slide(host, show)
            .inspect_err(|err| log::warn!("Cannot rewind slideshow {}: {}", show, err))
            .ok()
            .flatten()
    }

    pub fn go_to_slide<H: Host>(
        &self,
        host: &mut H,
        slideshow: ShapeId,
        index: usize,
    ) -> EngineResult<Option<SlideFocus>> {
        navigation::go_to_slide(host, slideshow, index)
    }
}

fn set_moving_with_parent<H: Host>(host: &mut H, slideshow: ShapeId, moving: bool) {
    let bindings = host.bindings_from_shape(slideshow, BindingKind::Slide);
    host.batch(|host| {
        for binding in &bindings {
            host.update_binding(binding.id, &BindingPatch::moving_with_parent(moving));
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasDocument;
    use crate::content::frame_of;
    use crate::layout::{HEADER_HEIGHT, PADDING, SLIDE_HEIGHT, SLIDE_WIDTH, SPACING};
    use kurbo::{Affine, Rect};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn setup(pattern: LayoutPattern, n: usize) -> (CanvasDocument, SlideEngine, ShapeId) {
        init_logging();
        let mut doc = CanvasDocument::new();
        let engine = SlideEngine::default();
        let show = engine
            .create_slideshow(&mut doc, Point::new(100.0, 100.0), pattern, n)
            .unwrap();
        (doc, engine, show)
    }

    fn slide_ids(doc: &CanvasDocument, show: ShapeId) -> Vec<ShapeId> {
        doc.get_shape(show).unwrap().as_slideshow().unwrap().slide_ids.clone()
    }

    fn position(doc: &CanvasDocument, id: ShapeId) -> Point {
        doc.get_shape(id).unwrap().position()
    }

    /// Drag `slide` so its top-left lands on `to`, emitting the host events.
    fn drag_to(doc: &mut CanvasDocument, engine: &mut SlideEngine, slide: ShapeId, to: Point) -> Option<DragPhase> {
        engine.on_translate_start(doc, slide);
        let from = position(doc, slide);
        let mut last = from;
        for step in 1..=4 {
            let next = from.lerp(to, step as f64 / 4.0);
            doc.transform_shape(slide, Affine::translate(next - last));
            last = next;
            engine.on_translate(doc, slide);
        }
        engine.on_translate_end(doc, slide)
    }

    #[test]
    fn test_create_slideshow_sizes_closed_form() {
        let (doc, _engine, show) = setup(LayoutPattern::Horizontal, 3);
        let size = doc.get_shape(show).unwrap().size();
        assert!((size.width - (SPACING + 3.0 * (SLIDE_WIDTH + SPACING))).abs() < f64::EPSILON);
        assert!((size.height - (HEADER_HEIGHT + 2.0 * PADDING + SLIDE_HEIGHT)).abs() < f64::EPSILON);
        assert_eq!(slide_ids(&doc, show).len(), 3);
    }

    #[test]
    fn test_create_slideshow_is_one_change_set() {
        init_logging();
        let mut doc = CanvasDocument::new();
        let engine = SlideEngine::default();
        engine
            .create_slideshow(&mut doc, Point::ZERO, LayoutPattern::Grid, 4)
            .unwrap();
        assert_eq!(doc.change_sets().len(), 1);
        assert_eq!(doc.revision(), 1);
    }

    #[test]
    fn test_drag_first_slide_to_last_slot() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 3);
        let slides = slide_ids(&doc, show);
        let first_slot = position(&doc, slides[0]);
        let middle_slot = position(&doc, slides[1]);
        let last_slot = position(&doc, slides[2]);

        let phase = drag_to(&mut doc, &mut engine, slides[0], last_slot);
        let Some(DragPhase::Committed(outcome)) = phase else {
            panic!("expected a commit, got {:?}", phase);
        };
        assert_eq!(outcome.order, vec![slides[1], slides[2], slides[0]]);
        assert_eq!(outcome.displaced, Some((slides[2], middle_slot)));
        assert_eq!(position(&doc, slides[2]), middle_slot);
        assert_eq!(slide_ids(&doc, show), outcome.order);
        assert_eq!(position(&doc, slides[0]), last_slot);
        assert_eq!(position(&doc, slides[1]), first_slot);
        assert!(engine.drag_phase(slides[0]).is_none());
    }

    #[test]
    fn test_drag_out_detaches_and_shrinks() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 3);
        let slides = slide_ids(&doc, show);

        let phase = drag_to(&mut doc, &mut engine, slides[1], Point::new(4000.0, 4000.0));
        assert_eq!(phase, Some(DragPhase::Removed));
        assert!(doc.bindings_to_shape(slides[1], BindingKind::Slide).is_empty());
        assert_eq!(slide_ids(&doc, show), vec![slides[0], slides[2]]);

        let width = doc.get_shape(show).unwrap().size().width;
        assert!((width - (SPACING + 2.0 * (SLIDE_WIDTH + SPACING))).abs() < f64::EPSILON);
        assert!(doc.get_shape(slides[1]).is_some());
    }

    #[test]
    fn test_insert_many_keeps_total_order() {
        let (mut doc, engine, show) = setup(LayoutPattern::Vertical, 2);
        for _ in 0..50 {
            engine.insert_slide(&mut doc, show, 1).unwrap();
        }
        let bindings = ordered_slide_bindings(&doc, show, false);
        assert_eq!(bindings.len(), 52);
        let keys: Vec<_> = bindings.iter().map(|b| b.order_key().unwrap().clone()).collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(slide_ids(&doc, show), bindings.iter().map(|b| b.to_id).collect::<Vec<_>>());
    }

    #[test]
    fn test_move_round_trip() {
        let (mut doc, engine, show) = setup(LayoutPattern::Grid, 5);
        let slides = slide_ids(&doc, show);
        let before: Vec<Point> = slides.iter().map(|id| position(&doc, *id)).collect();

        engine.move_slide(&mut doc, show, 0, 3).unwrap();
        engine.move_slide(&mut doc, show, 3, 0).unwrap();

        let after: Vec<Point> = slides.iter().map(|id| position(&doc, *id)).collect();
        assert_eq!(before, after);
        assert_eq!(slide_ids(&doc, show), slides);
    }

    #[test]
    fn test_no_two_slides_share_a_slot() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 4);
        let slides = slide_ids(&doc, show);
        let target = position(&doc, slides[2]) + kurbo::Vec2::new(30.0, 0.0);
        drag_to(&mut doc, &mut engine, slides[0], target);
        engine.move_slide(&mut doc, show, 3, 1).unwrap();

        let positions: Vec<Point> = slide_ids(&doc, show).iter().map(|id| position(&doc, *id)).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in &positions[i + 1..] {
                assert!(a.distance(*b) > 1.0, "slides overlap at {:?}", a);
            }
        }
    }

    #[test]
    fn test_move_slide_out_of_range() {
        let (mut doc, engine, show) = setup(LayoutPattern::Horizontal, 2);
        assert_eq!(
            engine.move_slide(&mut doc, show, 0, 2),
            Err(EngineError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            engine.insert_slide(&mut doc, show, 5),
            Err(EngineError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_remove_slide_deletes_frame() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 3);
        let slides = slide_ids(&doc, show);
        let frame = frame_of(&doc, slides[0]).unwrap();

        engine.remove_slide(&mut doc, show, slides[0]).unwrap();
        assert!(doc.get_shape(slides[0]).is_none());
        assert!(doc.get_shape(frame).is_none());
        assert_eq!(slide_ids(&doc, show), vec![slides[1], slides[2]]);
        assert_eq!(
            engine.remove_slide(&mut doc, show, slides[0]),
            Err(EngineError::NotBound { slideshow: show, slide: slides[0] })
        );
    }

    #[test]
    fn test_set_pattern_relayouts() {
        let (mut doc, engine, show) = setup(LayoutPattern::Horizontal, 4);
        engine.set_pattern(&mut doc, show, LayoutPattern::Grid).unwrap();
        let size = doc.get_shape(show).unwrap().size();
        assert!((size.width - (SPACING + 2.0 * (SLIDE_WIDTH + SPACING))).abs() < f64::EPSILON);
        let slides = slide_ids(&doc, show);
        assert_eq!(position(&doc, slides[2]).x, position(&doc, slides[0]).x);
    }

    #[test]
    fn test_cycle_pattern() {
        let (mut doc, engine, show) = setup(LayoutPattern::Horizontal, 2);
        assert_eq!(engine.cycle_pattern(&mut doc, show), Ok(LayoutPattern::Vertical));
        let shape = doc.get_shape(show).unwrap();
        assert_eq!(shape.as_slideshow().unwrap().pattern, LayoutPattern::Vertical);
        let height = HEADER_HEIGHT + PADDING + SPACING + 2.0 * (SLIDE_HEIGHT + SPACING);
        assert!((shape.size().height - height).abs() < f64::EPSILON);
    }

    #[test]
    fn test_slideshow_translation_carries_slides_and_frames() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 2);
        let slides = slide_ids(&doc, show);
        let frame = frame_of(&doc, slides[1]).unwrap();
        let slide_before = position(&doc, slides[1]);
        let frame_before = position(&doc, frame);

        engine.on_translate_start(&mut doc, show);
        let flagged = doc.bindings_from_shape(show, BindingKind::Slide);
        assert!(flagged.iter().all(|b| b.as_slide().unwrap().is_moving_with_parent));

        // Children ignore drags while their slideshow moves.
        engine.on_drag_start(&mut doc, slides[0]);
        assert!(engine.drag_phase(slides[0]).is_none());

        doc.transform_shape(show, Affine::translate((200.0, 50.0)));
        engine.on_translate(&mut doc, show);
        engine.on_translate_end(&mut doc, show);

        let delta = kurbo::Vec2::new(200.0, 50.0);
        assert_eq!(position(&doc, slides[1]), slide_before + delta);
        assert_eq!(position(&doc, frame), frame_before + delta);
        let cleared = doc.bindings_from_shape(show, BindingKind::Slide);
        assert!(cleared.iter().all(|b| !b.as_slide().unwrap().is_moving_with_parent));
    }

    #[test]
    fn test_deleting_slide_closes_gap() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 3);
        let slides = slide_ids(&doc, show);
        let first_slot = position(&doc, slides[0]);

        engine.delete_shape(&mut doc, slides[0]);
        assert_eq!(slide_ids(&doc, show), vec![slides[1], slides[2]]);
        assert_eq!(position(&doc, slides[1]), first_slot);
    }

    #[test]
    fn test_deleting_slideshow_releases_slides() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Radial, 3);
        let slides = slide_ids(&doc, show);

        engine.delete_shape(&mut doc, show);
        for slide in slides {
            assert!(doc.get_shape(slide).is_some());
            assert!(doc.bindings_to_shape(slide, BindingKind::Slide).is_empty());
        }
    }

    #[test]
    fn test_navigation_through_engine() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 3);
        doc.set_viewport(Rect::new(0.0, 0.0, 1400.0, 600.0));
        let slides = slide_ids(&doc, show);

        assert_eq!(engine.current_slideshow(&doc), Some(show));
        assert_eq!(engine.next_slide(&mut doc).map(|f| f.slide), Some(slides[1]));
        assert_eq!(engine.current_slide(&doc).map(|f| f.index), Some(1));
        assert_eq!(engine.previous_slide(&mut doc).map(|f| f.slide), Some(slides[0]));
    }

    /// Move `slide` so its top-left sits on `to` in one translate step.
    fn step_to(doc: &mut CanvasDocument, engine: &mut SlideEngine, slide: ShapeId, to: Point) {
        let from = position(doc, slide);
        doc.transform_shape(slide, Affine::translate(to - from));
        engine.on_translate(doc, slide);
    }

    #[test]
    fn test_target_deleted_mid_drag_detaches() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 2);
        let other = engine
            .create_slideshow(&mut doc, Point::new(100.0, 1000.0), LayoutPattern::Horizontal, 1)
            .unwrap();
        let slides = slide_ids(&doc, show);
        let slide = slides[0];

        engine.on_translate_start(&mut doc, slide);
        step_to(&mut doc, &mut engine, slide, Point::new(120.0, 1040.0));
        let bindings = doc.bindings_to_shape(slide, BindingKind::Slide);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].from_id, other);

        assert!(engine.delete_shape(&mut doc, other).is_some());
        step_to(&mut doc, &mut engine, slide, Point::new(140.0, 1060.0));
        assert_eq!(engine.on_translate_end(&mut doc, slide), Some(DragPhase::Removed));
        assert!(doc.bindings_to_shape(slide, BindingKind::Slide).is_empty());
        assert_eq!(slide_ids(&doc, show), vec![slides[1]]);
    }

    #[test]
    fn test_origin_deleted_mid_drag_commits_elsewhere() {
        let (mut doc, mut engine, show) = setup(LayoutPattern::Horizontal, 2);
        let other = engine
            .create_slideshow(&mut doc, Point::new(100.0, 1000.0), LayoutPattern::Horizontal, 1)
            .unwrap();
        let slide = slide_ids(&doc, show)[0];

        engine.on_translate_start(&mut doc, slide);
        step_to(&mut doc, &mut engine, slide, Point::new(130.0, 160.0));
        assert!(engine.delete_shape(&mut doc, show).is_some());
        assert!(doc.bindings_to_shape(slide, BindingKind::Slide).is_empty());

        step_to(&mut doc, &mut engine, slide, Point::new(120.0, 1040.0));
        let phase = engine.on_translate_end(&mut doc, slide);
        let Some(DragPhase::Committed(outcome)) = phase else {
            panic!("expected a commit, got {:?}", phase);
        };
        assert_eq!(outcome.index, 0);
        let bindings = doc.bindings_to_shape(slide, BindingKind::Slide);
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].from_id, other);
        assert!(!bindings[0].is_placeholder());
        assert_eq!(slide_ids(&doc, other).len(), 2);
    }

    #[test]
    fn test_stale_events_are_ignored() {
        let (mut doc, mut engine, _show) = setup(LayoutPattern::Horizontal, 1);
        let ghost = uuid::Uuid::new_v4();
        engine.on_drag_start(&mut doc, ghost);
        engine.on_drag_move(&mut doc, ghost);
        assert_eq!(engine.on_drag_end(&mut doc, ghost), None);
        engine.on_translate(&mut doc, ghost);
        assert_eq!(engine.delete_shape(&mut doc, ghost).map(|s| s.id()), None);
    }
}
