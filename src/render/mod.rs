pub mod compositor;
pub mod frame;

pub use compositor::{Compositor, DEFAULT_OVERLAY_OPACITY, flatten_visible};
pub use frame::{Frame, FrameFingerprint};
