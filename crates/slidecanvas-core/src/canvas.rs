//! In-memory canvas document implementing [`Host`].

use crate::bindings::{Binding, BindingId, BindingKind, BindingPatch, BindingStore, NewBinding};
use crate::host::Host;
use crate::shapes::{Shape, ShapeId, ShapePatch};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A single mutation observed by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentChange {
    ShapeCreated(ShapeId),
    ShapeUpdated(ShapeId),
    ShapeDeleted(ShapeId),
    BindingCreated(BindingId),
    BindingUpdated(BindingId),
    BindingDeleted(BindingId),
}

/// Mutations published together under one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    pub revision: u64,
    pub changes: Vec<DocumentChange>,
}

/// A canvas document containing all shapes and bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document name.
    pub name: String,
    /// All shapes in the document, keyed by ID.
    pub shapes: HashMap<ShapeId, Shape>,
    /// Z-order of shapes (back to front).
    pub z_order: Vec<ShapeId>,
    /// Relations between shapes.
    #[serde(default)]
    pub bindings: BindingStore,
    /// Visible page-space area.
    #[serde(skip, default = "default_viewport")]
    viewport: Rect,
    #[serde(skip)]
    revision: u64,
    #[serde(skip)]
    batch_depth: usize,
    #[serde(skip)]
    pending: Vec<DocumentChange>,
    #[serde(skip)]
    published: Vec<ChangeSet>,
}

fn default_viewport() -> Rect {
    Rect::new(0.0, 0.0, 1600.0, 900.0)
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            shapes: HashMap::new(),
            z_order: Vec::new(),
            bindings: BindingStore::new(),
            viewport: default_viewport(),
            revision: 0,
            batch_depth: 0,
            pending: Vec::new(),
            published: Vec::new(),
        }
    }

    /// Add a shape to the document.
    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.z_order.push(id);
        self.shapes.insert(id, shape);
        self.record(DocumentChange::ShapeCreated(id));
        id
    }

    /// Remove a shape and every binding touching it.
    pub fn remove_shape(&mut self, id: ShapeId) -> Option<Shape> {
        let shape = self.shapes.remove(&id)?;
        self.z_order.retain(|&shape_id| shape_id != id);
        let involving = self.bindings.involving(id);
        for binding in involving {
            if self.bindings.remove(binding).is_some() {
                self.record(DocumentChange::BindingDeleted(binding));
            }
        }
        self.record(DocumentChange::ShapeDeleted(id));
        Some(shape)
    }

    /// Get shapes in z-order (back to front).
    pub fn shapes_ordered(&self) -> impl Iterator<Item = &Shape> {
        self.z_order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Bring a shape to the front (topmost).
    pub fn bring_to_front(&mut self, id: ShapeId) {
        self.z_order.retain(|&shape_id| shape_id != id);
        self.z_order.push(id);
    }

    /// Find shapes at a point, front to back.
    pub fn shapes_at_point(&self, point: Point, tolerance: f64) -> Vec<ShapeId> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|&id| {
                self.shapes
                    .get(&id)
                    .filter(|s| s.hit_test(point, tolerance))
                    .map(|_| id)
            })
            .collect()
    }

    /// Apply an affine transform to a shape, as a pointer move would.
    pub fn transform_shape(&mut self, id: ShapeId, affine: Affine) -> bool {
        let Some(shape) = self.shapes.get_mut(&id) else {
            return false;
        };
        let before = shape.bounds();
        shape.transform(affine);
        let changed = shape.bounds() != before;
        if changed {
            self.record(DocumentChange::ShapeUpdated(id));
        }
        changed
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Check if the document is empty.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Get the number of shapes.
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Change sets published so far, oldest first.
    pub fn change_sets(&self) -> &[ChangeSet] {
        &self.published
    }

    /// Drain the published change sets.
    pub fn take_change_sets(&mut self) -> Vec<ChangeSet> {
        std::mem::take(&mut self.published)
    }

    /// Mutations recorded inside the currently open batch.
    pub fn pending_changes(&self) -> &[DocumentChange] {
        &self.pending
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn record(&mut self, change: DocumentChange) {
        self.pending.push(change);
        if self.batch_depth == 0 {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.revision += 1;
        let changes = std::mem::take(&mut self.pending);
        log::debug!("Publishing revision {} ({} changes)", self.revision, changes.len());
        self.published.push(ChangeSet {
            revision: self.revision,
            changes,
        });
    }
}

impl Host for CanvasDocument {
    fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    fn update_shape(&mut self, id: ShapeId, patch: &ShapePatch) -> bool {
        let changed = self
            .shapes
            .get_mut(&id)
            .map(|shape| shape.apply_patch(patch))
            .unwrap_or(false);
        if changed {
            self.record(DocumentChange::ShapeUpdated(id));
        }
        changed
    }

    fn create_shape(&mut self, shape: Shape) -> ShapeId {
        self.add_shape(shape)
    }

    fn delete_shape(&mut self, id: ShapeId) -> Option<Shape> {
        self.remove_shape(id)
    }

    fn create_binding(&mut self, binding: NewBinding) -> BindingId {
        let id = self.bindings.create(binding);
        self.record(DocumentChange::BindingCreated(id));
        id
    }

    fn update_binding(&mut self, id: BindingId, patch: &BindingPatch) -> bool {
        let changed = self.bindings.update(id, patch).unwrap_or(false);
        if changed {
            self.record(DocumentChange::BindingUpdated(id));
        }
        changed
    }

    fn delete_bindings(&mut self, ids: &[BindingId]) {
        for &id in ids {
            if self.bindings.remove(id).is_some() {
                self.record(DocumentChange::BindingDeleted(id));
            }
        }
    }

    fn get_binding(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(id)
    }

    fn bindings_from_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding> {
        self.bindings.from_shape(id, Some(kind)).into_iter().cloned().collect()
    }

    fn bindings_to_shape(&self, id: ShapeId, kind: BindingKind) -> Vec<Binding> {
        self.bindings.to_shape(id, Some(kind)).into_iter().cloned().collect()
    }

    fn hit_test_at_point(&self, point: Point, filter: &dyn Fn(&Shape) -> bool) -> Option<ShapeId> {
        self.z_order.iter().rev().copied().find(|id| {
            self.shapes
                .get(id)
                .is_some_and(|s| s.hit_test(point, 0.0) && filter(s))
        })
    }

    fn page_transform(&self, id: ShapeId) -> Option<Affine> {
        // Shapes store page coordinates directly.
        self.shapes
            .get(&id)
            .map(|s| Affine::translate(s.position().to_vec2()))
    }

    fn viewport_bounds(&self) -> Rect {
        self.viewport
    }

    fn shape_ids(&self) -> Vec<ShapeId> {
        self.z_order.clone()
    }

    fn children_of(&self, parent: ShapeId) -> Vec<ShapeId> {
        self.shapes_ordered()
            .filter(|s| s.parent() == Some(parent))
            .map(Shape::id)
            .collect()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn batch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 {
            self.flush();
        }
        result
    }
}
