pub mod bitmap;
pub mod kind;
pub mod layer;
pub mod state;
pub mod tree;

pub use bitmap::Bitmap;
pub use kind::LayerKind;
pub use layer::{DrawContext, EditMode, EditOutcome, Layer, LayerId, Modifiers};
pub use state::{LayerCtor, LayerRegistry, LayerState};
pub use tree::{SceneTree, Slot};
