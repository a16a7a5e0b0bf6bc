use std::fmt;

use crate::font::library::FontLibrary;
use crate::foundation::core::{Point, Rect, Rgba8, Size, Vec2};
use crate::raster::buffer::PixelBuffer;
use crate::scene::kind::LayerKind;

/// Identity of a layer, unique within one scene tree.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Reference-only layer: drawn translucent over the output, never quantized or exported.
    pub overlay: bool,
}

/// Interactive edit mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    None,
    Creating,
    Moving,
    Resizing,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct EditState {
    mode: EditMode,
    anchor: Point,
    last: Point,
}

/// What a single [`Layer::edit`] step did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    Idle,
    Reshaped,
    /// The layer moved by this delta; group children still need to follow.
    Moved(Point),
}

/// Everything a layer needs from the outside to paint itself.
#[derive(Clone, Copy, Debug)]
pub struct DrawContext<'a> {
    pub fonts: &'a FontLibrary,
}

/// One drawable unit of a scene.
#[derive(Clone, Debug)]
pub struct Layer {
    uid: LayerId,
    pub name: Option<String>,
    pub index: Option<u32>,
    pub visible: bool,
    pub locked: bool,
    /// Not persisted.
    pub selected: bool,
    pub inverted: bool,
    pub modifiers: Modifiers,
    pub kind: LayerKind,
    edit: EditState,
    view_scale: Vec2,
    buffer: PixelBuffer,
}

impl Layer {
    pub fn new(uid: LayerId, kind: LayerKind) -> Self {
        Self {
            uid,
            name: None,
            index: None,
            visible: true,
            locked: false,
            selected: false,
            inverted: false,
            modifiers: Modifiers::default(),
            kind,
            edit: EditState::default(),
            view_scale: Vec2::new(1.0, 1.0),
            buffer: PixelBuffer::default(),
        }
    }

    pub fn uid(&self) -> LayerId {
        self.uid
    }

    pub(crate) fn set_uid(&mut self, uid: LayerId) {
        self.uid = uid;
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    pub fn is_group(&self) -> bool {
        self.kind.is_group()
    }

    /// Group children in paint order; empty for other kinds.
    pub fn children(&self) -> &[LayerId] {
        match &self.kind {
            LayerKind::Group { children, .. } => children,
            _ => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<LayerId>> {
        match &mut self.kind {
            LayerKind::Group { children, .. } => Some(children),
            _ => None,
        }
    }

    /// Whether this is an expanded group, i.e. one that captures new layers.
    pub fn is_expanded_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { expanded: true, .. })
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    pub fn mode(&self) -> EditMode {
        self.edit.mode
    }

    /// Adopt the display size and view scale; the buffer is reallocated when the size changes.
    pub fn resize(&mut self, display: Size, scale: Vec2) {
        self.view_scale = scale;
        if self.buffer.size() != display {
            self.buffer.resize(display);
        }
    }

    /// Repaint the owned buffer from the current state.
    pub fn draw(&mut self, ctx: &DrawContext<'_>) {
        self.buffer.clear();
        self.kind.draw(&mut self.buffer, ctx.fonts, Rgba8::WHITE);
    }

    pub fn bounds(&self, fonts: &FontLibrary) -> Rect {
        self.kind.bounds(fonts)
    }

    pub fn contains(&self, p: Point, fonts: &FontLibrary) -> bool {
        self.kind.contains(p, fonts)
    }

    /// Hit test with a point in scaled view coordinates.
    pub fn contains_view(&self, view: kurbo::Point, fonts: &FontLibrary) -> bool {
        self.contains(view_to_display(view, self.view_scale), fonts)
    }

    pub fn start_edit(&mut self, mode: EditMode, point: Point) {
        self.edit = EditState {
            mode,
            anchor: point,
            last: point,
        };
        if mode == EditMode::Creating {
            self.kind.reshape(point, point);
        }
    }

    pub fn edit(&mut self, point: Point) -> EditOutcome {
        let EditState { mode, anchor, last } = self.edit;
        match mode {
            EditMode::None => EditOutcome::Idle,
            EditMode::Moving | EditMode::Resizing if self.locked => EditOutcome::Idle,
            EditMode::Creating => {
                self.kind.reshape(anchor, point);
                EditOutcome::Reshaped
            }
            EditMode::Moving => {
                let delta = point.sub(last);
                self.edit.last = point;
                self.kind.translate(delta);
                EditOutcome::Moved(delta)
            }
            EditMode::Resizing => {
                self.kind.resize_to(point);
                EditOutcome::Reshaped
            }
        }
    }

    pub fn stop_edit(&mut self) {
        self.edit.mode = EditMode::None;
    }
}

/// Map a view-space point to the display pixel under it.
pub fn view_to_display(view: kurbo::Point, scale: Vec2) -> Point {
    let sx = if scale.x > 0.0 { scale.x } else { 1.0 };
    let sy = if scale.y > 0.0 { scale.y } else { 1.0 };
    Point::new((view.x / sx).floor() as i32, (view.y / sy).floor() as i32)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layer.rs"]
mod tests;
