//! Content frames glued to their owning slide.
//!
//! A slide may own one content frame through a [`BindingKind::ContentFrame`]
//! binding. The frame always sits at `config.content_offset` from the slide's
//! origin; shapes parented to the frame keep their offsets from it. The
//! binding never takes part in ordering.

use crate::bindings::{BindingPatch, NewBinding};
use crate::host::{Host, content_binding_of};
use crate::layout::LayoutConfig;
use crate::shapes::{ContentFrame, Shape, ShapeId, ShapePatch};
use kurbo::{Point, Size, Vec2};

/// Create a content frame for `slide` and bind it. Returns the frame id.
pub fn attach_frame<H: Host>(host: &mut H, slide: ShapeId, config: &LayoutConfig) -> Option<ShapeId> {
    let shape = host.get_shape(slide)?;
    if !shape.behavior().hosts_content {
        log::warn!("Shape {} cannot host a content frame", slide);
        return None;
    }
    let size = shape.size();
    let position = shape.position() + config.content_offset;
    let frame_size = Size::new(
        (size.width - config.content_offset.x).max(0.0),
        (size.height - config.content_offset.y).max(0.0),
    );
    let mut frame = ContentFrame::new(position, frame_size);
    frame.parent = Some(slide);

    Some(host.batch(|host| {
        let frame_id = host.create_shape(Shape::ContentFrame(frame));
        host.create_binding(NewBinding::content(slide, frame_id));
        frame_id
    }))
}

/// Content frame bound to `slide`, if any.
pub fn frame_of<H: Host>(host: &H, slide: ShapeId) -> Option<ShapeId> {
    content_binding_of(host, slide).map(|b| b.to_id)
}

/// Where the frame of `slide` belongs in page space.
fn frame_target<H: Host>(host: &H, slide: ShapeId, config: &LayoutConfig) -> Option<Point> {
    let transform = host.page_transform(slide)?;
    Some(transform * Point::new(config.content_offset.x, config.content_offset.y))
}

/// Move the frame of `slide` back to its fixed offset, carrying its children.
///
/// Returns true if anything moved. Safe to call any number of times.
pub fn follow<H: Host>(host: &mut H, slide: ShapeId, config: &LayoutConfig) -> bool {
    let Some(frame) = frame_of(host, slide) else {
        return false;
    };
    let Some(target) = frame_target(host, slide, config) else {
        log::debug!("Slide {} vanished before its frame could follow", slide);
        return false;
    };
    let Some(current) = host.get_shape(frame).map(Shape::position) else {
        log::warn!("Content frame {} of slide {} is missing", frame, slide);
        return false;
    };
    let delta = target - current;
    if delta == Vec2::ZERO {
        return false;
    }
    host.batch(|host| {
        host.update_shape(frame, &ShapePatch::position(target));
        translate_children(host, frame, delta);
    });
    true
}

/// Delete the content frame of `slide` together with everything inside it.
pub fn remove_frame<H: Host>(host: &mut H, slide: ShapeId) -> bool {
    let Some(frame) = frame_of(host, slide) else {
        return false;
    };
    host.batch(|host| delete_subtree(host, frame));
    true
}

fn delete_subtree<H: Host>(host: &mut H, id: ShapeId) {
    for child in host.children_of(id) {
        delete_subtree(host, child);
    }
    host.delete_shape(id);
}

fn translate_children<H: Host>(host: &mut H, parent: ShapeId, delta: Vec2) {
    for child in host.children_of(parent) {
        let Some(position) = host.get_shape(child).map(Shape::position) else {
            continue;
        };
        host.update_shape(child, &ShapePatch::position(position + delta));
        translate_children(host, child, delta);
    }
}

fn set_placeholder<H: Host>(host: &mut H, slide: ShapeId, placeholder: bool) {
    if let Some(binding) = content_binding_of(host, slide) {
        host.update_binding(binding.id, &BindingPatch::placeholder(placeholder));
    }
}

/// The owning slide started moving.
pub fn on_translate_start<H: Host>(host: &mut H, slide: ShapeId) {
    set_placeholder(host, slide, true);
}

/// The owning slide moved.
pub fn on_translate<H: Host>(host: &mut H, slide: ShapeId, config: &LayoutConfig) {
    follow(host, slide, config);
}

/// The owning slide stopped moving.
pub fn on_translate_end<H: Host>(host: &mut H, slide: ShapeId, config: &LayoutConfig) {
    host.batch(|host| {
        follow(host, slide, config);
        set_placeholder(host, slide, false);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingKind;
    use crate::canvas::CanvasDocument;
    use crate::shapes::{Rectangle, Slide};

    fn setup() -> (CanvasDocument, ShapeId, ShapeId, LayoutConfig) {
        let config = LayoutConfig::default();
        let mut doc = CanvasDocument::new();
        let slide = doc.add_shape(Shape::Slide(Slide::new(Point::new(100.0, 100.0), config.slide_size)));
        let frame = attach_frame(&mut doc, slide, &config).unwrap();
        (doc, slide, frame, config)
    }

    #[test]
    fn test_attach_frame_at_offset() {
        let (doc, slide, frame, config) = setup();
        let frame_shape = doc.get_shape(frame).unwrap();
        assert_eq!(frame_shape.position(), Point::new(100.0, 100.0) + config.content_offset);
        assert_eq!(frame_shape.parent(), Some(slide));
        assert_eq!(frame_of(&doc, slide), Some(frame));
    }

    #[test]
    fn test_frame_follows_slide_with_children() {
        let (mut doc, slide, frame, config) = setup();
        let note = doc.add_shape(Shape::Rectangle(
            Rectangle::new(Point::new(110.0, 140.0), 20.0, 20.0).with_parent(frame),
        ));

        on_translate_start(&mut doc, slide);
        assert!(doc.bindings_from_shape(slide, BindingKind::ContentFrame)[0].is_placeholder());

        doc.update_shape(slide, &ShapePatch::position(Point::new(150.0, 80.0)));
        on_translate(&mut doc, slide, &config);

        let frame_pos = doc.get_shape(frame).unwrap().position();
        assert_eq!(frame_pos, Point::new(150.0, 80.0) + config.content_offset);
        assert_eq!(doc.get_shape(note).unwrap().position(), Point::new(160.0, 120.0));

        on_translate_end(&mut doc, slide, &config);
        assert!(!doc.bindings_from_shape(slide, BindingKind::ContentFrame)[0].is_placeholder());
    }

    #[test]
    fn test_follow_is_idempotent() {
        let (mut doc, slide, _frame, config) = setup();
        assert!(!follow(&mut doc, slide, &config));
        doc.update_shape(slide, &ShapePatch::position(Point::new(0.0, 0.0)));
        assert!(follow(&mut doc, slide, &config));
        assert!(!follow(&mut doc, slide, &config));
    }

    #[test]
    fn test_remove_frame_takes_contents() {
        let (mut doc, slide, frame, _config) = setup();
        let note = doc.add_shape(Shape::Rectangle(
            Rectangle::new(Point::new(110.0, 140.0), 20.0, 20.0).with_parent(frame),
        ));
        assert!(remove_frame(&mut doc, slide));
        assert!(doc.get_shape(frame).is_none());
        assert!(doc.get_shape(note).is_none());
        assert!(doc.get_shape(slide).is_some());
        assert!(doc.bindings_from_shape(slide, BindingKind::ContentFrame).is_empty());
        assert!(!remove_frame(&mut doc, slide));
    }

    #[test]
    fn test_follow_without_frame_is_noop() {
        let config = LayoutConfig::default();
        let mut doc = CanvasDocument::new();
        let slide = doc.add_shape(Shape::Slide(Slide::new(Point::ZERO, config.slide_size)));
        assert!(!follow(&mut doc, slide, &config));
        assert!(!follow(&mut doc, uuid::Uuid::new_v4(), &config));
    }
}
