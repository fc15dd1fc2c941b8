//! SlideCanvas Core Library
//!
//! Slide layout and binding engine for slideshows on an infinite canvas.
//! Slides are bound into slideshows through ordered bindings; the engine keeps
//! their positions, order keys and the slideshow's size consistent while the
//! user drags things around.

pub mod bindings;
pub mod canvas;
pub mod content;
pub mod drag;
pub mod engine;
pub mod error;
pub mod host;
pub mod layout;
pub mod navigation;
pub mod order_key;
pub mod reorder;
pub mod shapes;

pub use bindings::{Binding, BindingId, BindingKind, BindingPatch, BindingStore, NewBinding};
pub use canvas::{CanvasDocument, ChangeSet, DocumentChange};
pub use drag::{DragPhase, SlideDrag};
pub use engine::SlideEngine;
pub use error::{EngineError, EngineResult};
pub use host::Host;
pub use layout::{LayoutConfig, LayoutPattern};
pub use navigation::{Derived, Navigator, SlideFocus};
pub use order_key::{OrderKey, OrderKeyError, key_between, n_keys_between, validate_order_key};
pub use reorder::CommitOutcome;
pub use shapes::{Shape, ShapeId, ShapeKind, ShapePatch};
