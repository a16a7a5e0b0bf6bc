//! Editing session: screens, history-recorded layer operations, and preview scheduling.

pub mod editor;
pub mod preview;
pub mod screen;

pub use editor::{Session, SessionOpts};
pub use preview::{Clock, DEFAULT_PREVIEW_DEBOUNCE, ManualClock, PreviewScheduler, SystemClock};
pub use screen::{Screen, decode_preview_uri};
