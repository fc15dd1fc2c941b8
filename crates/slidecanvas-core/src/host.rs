//! Interface to the canvas host that owns shapes and bindings.
//!
//! The engine never stores shapes itself. Every reconciliation step reads the
//! current state through this trait and writes back through it, so a stale
//! id simply resolves to `None` and the step is skipped.

use crate::bindings::{Binding, BindingId, BindingKind, BindingPatch, NewBinding};
use crate::shapes::{Shape, ShapeId, ShapePatch};
use kurbo::{Affine, Point, Rect};

/// Shape and binding storage provided by the canvas editor.
pub trait Host {
    fn get_shape(&self, id: ShapeId) -> Option<&Shape>;

    /// Patch a shape. Returns true if the shape exists and changed.
    fn update_shape(&mut self, id: ShapeId, patch: &ShapePatch) -> bool;

    fn create_shape(&mut self, shape: Shape) -> ShapeId;

    /// Delete a shape along with every binding touching it.
    fn delete_shape(&mut self, id: ShapeId) -> Option<Shape>;

    fn create_binding(&mut self, binding: NewBinding) -> BindingId;

    /// Patch a binding. Returns true if the binding exists and changed.
    fn update_binding(&mut self, id: BindingId, patch: &BindingPatch) -> bool;

    fn delete_bindings(&mut self, ids: &[BindingId]);

    fn get_binding(&self, id: BindingId) -> Option<&Binding>;

    fn bindings_from_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding>;

    fn bindings_to_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding>;

    /// Front-most shape containing `point` that passes `filter`.
    fn hit_test_at_point(&self, point: Point, filter: &dyn Fn(&Shape) -> bool) -> Option<ShapeId>;

    /// Shape-local to page transform.
    fn page_transform(&self, id: ShapeId) -> Option<Affine>;

    /// Visible page-space area.
    fn viewport_bounds(&self) -> Rect;

    /// Shape ids back to front.
    fn shape_ids(&self) -> Vec<ShapeId>;

    /// Shapes whose structural parent is `parent`.
    fn children_of(&self, parent: ShapeId) -> Vec<ShapeId>;

    /// Counter bumped once per published change set.
    fn revision(&self) -> u64;

    /// Run `f` so that all of its mutations are published as one change set.
    fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized;
}

/// Slide bindings of a slideshow sorted by order key.
///
/// Placeholders are left out unless `include_placeholders` is set.
pub fn ordered_slide_bindings<H: Host>(
    host: &H,
    slideshow: ShapeId,
    include_placeholders: bool,
) -> Vec<Binding> {
    let mut bindings: Vec<Binding> = host
        .bindings_from_shape(slideshow, BindingKind::Slide)
        .into_iter()
        .filter(|b| include_placeholders || !b.is_placeholder())
        .collect();
    bindings.sort_by(|a, b| a.order_key().cmp(&b.order_key()).then(a.id.cmp(&b.id)));
    bindings
}

/// The slideshow binding of a slide, preferring a committed one.
pub fn slide_binding_of<H: Host>(host: &H, slide: ShapeId) -> Option<Binding> {
    let mut bindings = host.bindings_to_shape(slide, BindingKind::Slide);
    bindings.sort_by_key(Binding::is_placeholder);
    bindings.into_iter().next()
}

/// The content binding owned by a slide, if it has a frame.
pub fn content_binding_of<H: Host>(host: &H, slide: ShapeId) -> Option<Binding> {
    host.bindings_from_shape(slide, BindingKind::ContentFrame)
        .into_iter()
        .next()
}

/// Page-space bounds of a shape.
pub fn page_bounds<H: Host>(host: &H, id: ShapeId) -> Option<Rect> {
    let shape = host.get_shape(id)?;
    let transform = host.page_transform(id)?;
    let local = Rect::from_origin_size(Point::ZERO, shape.size());
    Some(transform.transform_rect_bbox(local))
}
