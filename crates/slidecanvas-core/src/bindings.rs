//! Binding relations between shapes.
//!
//! Relations live in their own table keyed by binding id and are indexed by
//! both endpoints, so neither shape stores a pointer to the other.

use crate::order_key::OrderKey;
use crate::shapes::ShapeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for bindings.
pub type BindingId = Uuid;

/// Type tag of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingKind {
    /// Slideshow -> slide layout relation.
    Slide,
    /// Slide -> content frame follower relation.
    ContentFrame,
}

/// Layout metadata of a slideshow -> slide relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideBindingProps {
    pub order_key: OrderKey,
    /// Set while the slideshow itself is being translated.
    #[serde(default)]
    pub is_moving_with_parent: bool,
    /// Tentative relation of an in-progress drag.
    #[serde(default)]
    pub placeholder: bool,
}

impl SlideBindingProps {
    pub fn committed(order_key: OrderKey) -> Self {
        Self {
            order_key,
            is_moving_with_parent: false,
            placeholder: false,
        }
    }

    pub fn placeholder(order_key: OrderKey) -> Self {
        Self {
            order_key,
            is_moving_with_parent: false,
            placeholder: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentBindingProps {
    #[serde(default)]
    pub placeholder: bool,
}

/// Type-specific binding data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingProps {
    Slide(SlideBindingProps),
    ContentFrame(ContentBindingProps),
}

/// A directed relation `from_id -> to_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub id: BindingId,
    pub from_id: ShapeId,
    pub to_id: ShapeId,
    pub props: BindingProps,
}

impl Binding {
    pub fn kind(&self) -> BindingKind {
        match self.props {
            BindingProps::Slide(_) => BindingKind::Slide,
            BindingProps::ContentFrame(_) => BindingKind::ContentFrame,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        match &self.props {
            BindingProps::Slide(p) => p.placeholder,
            BindingProps::ContentFrame(p) => p.placeholder,
        }
    }

    pub fn as_slide(&self) -> Option<&SlideBindingProps> {
        match &self.props {
            BindingProps::Slide(p) => Some(p),
            _ => None,
        }
    }

    pub fn order_key(&self) -> Option<&OrderKey> {
        self.as_slide().map(|p| &p.order_key)
    }

    /// Apply a patch. Returns true if anything actually changed.
    pub fn apply_patch(&mut self, patch: &BindingPatch) -> bool {
        let mut changed = false;
        match &mut self.props {
            BindingProps::Slide(p) => {
                if let Some(key) = &patch.order_key {
                    if p.order_key != *key {
                        p.order_key = key.clone();
                        changed = true;
                    }
                }
                if let Some(placeholder) = patch.placeholder {
                    changed |= p.placeholder != placeholder;
                    p.placeholder = placeholder;
                }
                if let Some(moving) = patch.is_moving_with_parent {
                    changed |= p.is_moving_with_parent != moving;
                    p.is_moving_with_parent = moving;
                }
            }
            BindingProps::ContentFrame(p) => {
                if let Some(placeholder) = patch.placeholder {
                    changed |= p.placeholder != placeholder;
                    p.placeholder = placeholder;
                }
            }
        }
        changed
    }
}

/// Request to create a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBinding {
    pub from_id: ShapeId,
    pub to_id: ShapeId,
    pub props: BindingProps,
}

impl NewBinding {
    pub fn slide(slideshow: ShapeId, slide: ShapeId, props: SlideBindingProps) -> Self {
        Self {
            from_id: slideshow,
            to_id: slide,
            props: BindingProps::Slide(props),
        }
    }

    pub fn content(slide: ShapeId, frame: ShapeId) -> Self {
        Self {
            from_id: slide,
            to_id: frame,
            props: BindingProps::ContentFrame(ContentBindingProps::default()),
        }
    }
}

/// Partial update for a binding. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingPatch {
    pub order_key: Option<OrderKey>,
    pub placeholder: Option<bool>,
    pub is_moving_with_parent: Option<bool>,
}

impl BindingPatch {
    pub fn order_key(key: OrderKey) -> Self {
        Self {
            order_key: Some(key),
            ..Self::default()
        }
    }

    pub fn placeholder(placeholder: bool) -> Self {
        Self {
            placeholder: Some(placeholder),
            ..Self::default()
        }
    }

    pub fn moving_with_parent(moving: bool) -> Self {
        Self {
            is_moving_with_parent: Some(moving),
            ..Self::default()
        }
    }
}

/// Arena of bindings with per-endpoint indexes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Binding>", into = "Vec<Binding>")]
pub struct BindingStore {
    bindings: HashMap<BindingId, Binding>,
    from_index: HashMap<ShapeId, Vec<BindingId>>,
    to_index: HashMap<ShapeId, Vec<BindingId>>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Insert a new binding and return its id.
    pub fn create(&mut self, new: NewBinding) -> BindingId {
        let binding = Binding {
            id: Uuid::new_v4(),
            from_id: new.from_id,
            to_id: new.to_id,
            props: new.props,
        };
        let id = binding.id;
        self.insert(binding);
        id
    }

    /// Insert an existing binding, replacing any binding with the same id.
    pub fn insert(&mut self, binding: Binding) {
        if self.bindings.contains_key(&binding.id) {
            self.remove(binding.id);
        }
        self.from_index.entry(binding.from_id).or_default().push(binding.id);
        self.to_index.entry(binding.to_id).or_default().push(binding.id);
        self.bindings.insert(binding.id, binding);
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// Update a binding. Returns `None` if it does not exist, otherwise
    /// whether anything changed.
    pub fn update(&mut self, id: BindingId, patch: &BindingPatch) -> Option<bool> {
        self.bindings.get_mut(&id).map(|b| b.apply_patch(patch))
    }

    pub fn remove(&mut self, id: BindingId) -> Option<Binding> {
        let binding = self.bindings.remove(&id)?;
        unindex(&mut self.from_index, binding.from_id, id);
        unindex(&mut self.to_index, binding.to_id, id);
        Some(binding)
    }

    /// Bindings whose `from_id` is `shape`, optionally filtered by kind, in
    /// creation order.
    pub fn from_shape(&self, shape: ShapeId, kind: Option<BindingKind>) -> Vec<&Binding> {
        self.lookup(&self.from_index, shape, kind)
    }

    /// Bindings whose `to_id` is `shape`, optionally filtered by kind, in
    /// creation order.
    pub fn to_shape(&self, shape: ShapeId, kind: Option<BindingKind>) -> Vec<&Binding> {
        self.lookup(&self.to_index, shape, kind)
    }

    /// Ids of every binding touching `shape` on either end.
    pub fn involving(&self, shape: ShapeId) -> Vec<BindingId> {
        let mut ids: Vec<BindingId> = self
            .from_index
            .get(&shape)
            .into_iter()
            .chain(self.to_index.get(&shape))
            .flatten()
            .copied()
            .collect();
        ids.dedup();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    fn lookup(
        &self,
        index: &HashMap<ShapeId, Vec<BindingId>>,
        shape: ShapeId,
        kind: Option<BindingKind>,
    ) -> Vec<&Binding> {
        index
            .get(&shape)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.bindings.get(id))
                    .filter(|b| kind.is_none_or(|k| b.kind() == k))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn unindex(index: &mut HashMap<ShapeId, Vec<BindingId>>, shape: ShapeId, id: BindingId) {
    if let Some(ids) = index.get_mut(&shape) {
        ids.retain(|&b| b != id);
        if ids.is_empty() {
            index.remove(&shape);
        }
    }
}

impl From<Vec<Binding>> for BindingStore {
    fn from(bindings: Vec<Binding>) -> Self {
        let mut store = Self::new();
        for binding in bindings {
            store.insert(binding);
        }
        store
    }
}

impl From<BindingStore> for Vec<Binding> {
    fn from(store: BindingStore) -> Self {
        let mut bindings: Vec<Binding> = store.bindings.into_values().collect();
        bindings.sort_by_key(|b| b.id);
        bindings
    }
}
