//! pixelscene is the document core of a pixel-art editor for small monochrome displays.
//!
//! - Layers of shapes, text, bitmaps and groups live in a per-screen [`SceneTree`]
//! - A [`Session`] mutates the tree and records every change for undo/redo
//! - The [`Compositor`] flattens a tree into a two-tone [`Frame`]
//! - Bitmap fonts (column-major, glcd, BDF) decode into immutable [`FontPack`]s
//! - Projects round-trip through a versioned JSON container
#![forbid(unsafe_code)]

pub mod font;
pub mod foundation;
pub mod history;
pub mod project;
pub mod raster;
pub mod render;
pub mod scene;
pub mod session;

pub use crate::foundation::core::{COORD_LIMIT, Point, Rect, Rgba8, Size, Vec2};
pub use crate::foundation::error::{SceneError, SceneResult};

pub use crate::font::{FontFormat, FontLibrary, FontPack, FontSource, Glyph, PlatformFont};
pub use crate::history::{Change, ChangeHistory};
pub use crate::project::{PROJECT_VERSION, Project, ProjectMeta};
pub use crate::raster::buffer::PixelBuffer;
pub use crate::render::{Compositor, Frame, FrameFingerprint};
pub use crate::scene::{
    Bitmap, EditMode, Layer, LayerId, LayerKind, LayerRegistry, LayerState, SceneTree,
};
pub use crate::session::{
    Clock, ManualClock, PreviewScheduler, Screen, Session, SessionOpts, SystemClock,
};
