use kurbo::{ParamCurveNearest, Shape};
use serde_json::{Map, Value, json};

use crate::font::library::FontLibrary;
use crate::font::raster::{measure, with_placeholders};
use crate::foundation::core::{COORD_LIMIT, Point, Rect, Rgba8, Size, clamp_i32};
use crate::foundation::error::{SceneError, SceneResult};
use crate::raster::buffer::PixelBuffer;
use crate::raster::shapes;
use crate::scene::bitmap::Bitmap;
use crate::scene::layer::LayerId;

/// Closed set of drawable layer variants.
///
/// Everything variant-specific lives here; the shared flags live on
/// [`Layer`](crate::scene::layer::Layer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Rectangle {
        pos: Point,
        size: Size,
        fill: bool,
    },
    Ellipse {
        center: Point,
        rx: u32,
        ry: u32,
        fill: bool,
    },
    Circle {
        center: Point,
        radius: u32,
        fill: bool,
    },
    Line {
        p1: Point,
        p2: Point,
    },
    Text {
        pos: Point,
        text: String,
        font: String,
        scale: u32,
    },
    Icon {
        pos: Point,
        name: String,
        bitmap: Bitmap,
    },
    Paint {
        pos: Point,
        bitmap: Bitmap,
    },
    Group {
        children: Vec<LayerId>,
        expanded: bool,
    },
}

impl LayerKind {
    /// Canonical persisted tag.
    pub fn tag(&self) -> &'static str {
        match self {
            LayerKind::Rectangle { .. } => "rect",
            LayerKind::Ellipse { .. } => "ellipse",
            LayerKind::Circle { .. } => "circle",
            LayerKind::Line { .. } => "line",
            LayerKind::Text { .. } => "string",
            LayerKind::Icon { .. } => "icon",
            LayerKind::Paint { .. } => "paint",
            LayerKind::Group { .. } => "group",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, LayerKind::Group { .. })
    }

    /// An empty group, expanded so it captures new layers.
    pub fn group() -> Self {
        LayerKind::Group {
            children: Vec::new(),
            expanded: true,
        }
    }

    /// Display-space bounds. Groups report an empty rect; the tree unions their children.
    pub fn bounds(&self, fonts: &FontLibrary) -> Rect {
        match self {
            LayerKind::Rectangle { pos, size, .. } => Rect::new(*pos, *size),
            LayerKind::Ellipse { center, rx, ry, .. } => ellipse_bounds(*center, *rx, *ry),
            LayerKind::Circle { center, radius, .. } => ellipse_bounds(*center, *radius, *radius),
            LayerKind::Line { p1, p2 } => Rect::from_corners(*p1, *p2),
            LayerKind::Text {
                pos,
                text,
                font,
                scale,
            } => {
                let size = fonts
                    .get(font)
                    .map(|f| measure(&f, &with_placeholders(&f, text), *scale))
                    .unwrap_or_default();
                let top = clamp_i32(i64::from(pos.y) - i64::from(size.h));
                Rect::new(Point::new(pos.x, top), size)
            }
            LayerKind::Icon { pos, bitmap, .. } | LayerKind::Paint { pos, bitmap } => {
                Rect::new(*pos, Size::new(bitmap.width(), bitmap.height()))
            }
            LayerKind::Group { .. } => Rect::default(),
        }
    }

    /// Reject geometry past [`COORD_LIMIT`].
    pub fn check_extent(&self) -> SceneResult<()> {
        let limit = COORD_LIMIT as u32;
        let ok = match self {
            LayerKind::Rectangle { pos, size, .. } => pos.within_limit() && size.within_limit(),
            LayerKind::Ellipse { center, rx, ry, .. } => {
                center.within_limit() && *rx <= limit && *ry <= limit
            }
            LayerKind::Circle { center, radius, .. } => center.within_limit() && *radius <= limit,
            LayerKind::Line { p1, p2 } => p1.within_limit() && p2.within_limit(),
            LayerKind::Text { pos, scale, .. } => pos.within_limit() && *scale <= limit,
            LayerKind::Icon { pos, bitmap, .. } | LayerKind::Paint { pos, bitmap } => {
                pos.within_limit() && Size::new(bitmap.width(), bitmap.height()).within_limit()
            }
            LayerKind::Group { .. } => true,
        };
        if ok {
            Ok(())
        } else {
            Err(SceneError::structural(format!(
                "{} layer geometry exceeds ±{COORD_LIMIT}",
                self.tag()
            )))
        }
    }

    /// Hit test in display space.
    pub fn contains(&self, p: Point, fonts: &FontLibrary) -> bool {
        let kp = p.to_kurbo();
        match self {
            LayerKind::Ellipse { center, rx, ry, .. } => kurbo::Ellipse::new(
                center.to_kurbo(),
                (f64::from(*rx) + 0.5, f64::from(*ry) + 0.5),
                0.0,
            )
            .contains(kp),
            LayerKind::Circle { center, radius, .. } => {
                kurbo::Circle::new(center.to_kurbo(), f64::from(*radius) + 0.5).contains(kp)
            }
            LayerKind::Line { p1, p2 } => {
                kurbo::Line::new(p1.to_kurbo(), p2.to_kurbo())
                    .nearest(kp, 1e-6)
                    .distance_sq
                    <= 1.0
            }
            LayerKind::Group { .. } => false,
            _ => self.bounds(fonts).contains(p),
        }
    }

    /// Shift the geometry by `delta`. Groups are moved by the tree.
    pub fn translate(&mut self, delta: Point) {
        match self {
            LayerKind::Rectangle { pos, .. }
            | LayerKind::Text { pos, .. }
            | LayerKind::Icon { pos, .. }
            | LayerKind::Paint { pos, .. } => *pos = pos.add(delta),
            LayerKind::Ellipse { center, .. } | LayerKind::Circle { center, .. } => {
                *center = center.add(delta)
            }
            LayerKind::Line { p1, p2 } => {
                *p1 = p1.add(delta);
                *p2 = p2.add(delta);
            }
            LayerKind::Group { .. } => {}
        }
    }

    /// Grow the geometry from `anchor` to `point` while the layer is being created.
    pub fn reshape(&mut self, anchor: Point, point: Point) {
        let d = point.sub(anchor).abs();
        match self {
            LayerKind::Rectangle { pos, size, .. } => {
                let r = Rect::from_corners(anchor, point);
                *pos = r.pos;
                *size = Size::new(
                    r.size.w.min(COORD_LIMIT as u32),
                    r.size.h.min(COORD_LIMIT as u32),
                );
            }
            LayerKind::Ellipse { center, rx, ry, .. } => {
                *center = anchor;
                *rx = extent(d.x);
                *ry = extent(d.y);
            }
            LayerKind::Circle { center, radius, .. } => {
                *center = anchor;
                *radius = extent(d.x.max(d.y));
            }
            LayerKind::Line { p1, p2 } => {
                *p1 = anchor;
                *p2 = point;
            }
            LayerKind::Text { pos, .. }
            | LayerKind::Icon { pos, .. }
            | LayerKind::Paint { pos, .. } => *pos = point,
            LayerKind::Group { .. } => {}
        }
    }

    /// Drag the far edge to `point`, keeping the origin.
    pub fn resize_to(&mut self, point: Point) {
        match self {
            LayerKind::Rectangle { pos, size, .. } => {
                let w = i64::from(point.x) - i64::from(pos.x) + 1;
                let h = i64::from(point.y) - i64::from(pos.y) + 1;
                let clamp = |v: i64| v.clamp(1, i64::from(COORD_LIMIT)) as u32;
                *size = Size::new(clamp(w), clamp(h));
            }
            LayerKind::Ellipse { center, rx, ry, .. } => {
                let d = point.sub(*center).abs();
                *rx = extent(d.x);
                *ry = extent(d.y);
            }
            LayerKind::Circle { center, radius, .. } => {
                let d = point.sub(*center).abs();
                *radius = extent(d.x.max(d.y));
            }
            LayerKind::Line { p2, .. } => *p2 = point,
            LayerKind::Text { .. }
            | LayerKind::Icon { .. }
            | LayerKind::Paint { .. }
            | LayerKind::Group { .. } => {}
        }
    }

    /// Paint this variant into `buf`. Groups paint nothing on their own.
    pub fn draw(&self, buf: &mut PixelBuffer, fonts: &FontLibrary, color: Rgba8) {
        match self {
            LayerKind::Rectangle { pos, size, fill } => {
                let r = Rect::new(*pos, *size);
                if *fill {
                    shapes::draw_box(buf, r, color);
                } else {
                    shapes::draw_frame(buf, r, color);
                }
            }
            LayerKind::Ellipse {
                center,
                rx,
                ry,
                fill,
            } => {
                if *fill {
                    shapes::draw_filled_ellipse(buf, *center, *rx, *ry, color);
                } else {
                    shapes::draw_ellipse(buf, *center, *rx, *ry, color);
                }
            }
            LayerKind::Circle {
                center,
                radius,
                fill,
            } => {
                if *fill {
                    shapes::draw_disc(buf, *center, *radius, color);
                } else {
                    shapes::draw_circle(buf, *center, *radius, color);
                }
            }
            LayerKind::Line { p1, p2 } => shapes::draw_line(buf, *p1, *p2, color),
            LayerKind::Text {
                pos,
                text,
                font,
                scale,
            } => {
                let Some(f) = fonts.get(font) else {
                    tracing::warn!(font = %font, "text layer has no font to draw with");
                    return;
                };
                let t = with_placeholders(&f, text);
                crate::font::raster::draw(buf, &f, &t, *pos, *scale, color);
            }
            LayerKind::Icon { pos, bitmap, .. } | LayerKind::Paint { pos, bitmap } => {
                bitmap.draw(buf, *pos, color)
            }
            LayerKind::Group { .. } => {}
        }
    }

    /// Variant fields as blob properties. Group children are filled in by the tree.
    pub(crate) fn props(&self) -> Map<String, Value> {
        let v = match self {
            LayerKind::Rectangle { pos, size, fill } => json!({ "p": pos, "s": size, "f": fill }),
            LayerKind::Ellipse {
                center,
                rx,
                ry,
                fill,
            } => json!({ "c": center, "rx": rx, "ry": ry, "f": fill }),
            LayerKind::Circle {
                center,
                radius,
                fill,
            } => json!({ "c": center, "r": radius, "f": fill }),
            LayerKind::Line { p1, p2 } => json!({ "p1": p1, "p2": p2 }),
            LayerKind::Text {
                pos,
                text,
                font,
                scale,
            } => json!({ "p": pos, "txt": text, "f": font, "s": scale }),
            LayerKind::Icon { pos, name, bitmap } => json!({ "p": pos, "nm": name, "bmp": bitmap }),
            LayerKind::Paint { pos, bitmap } => json!({ "p": pos, "bmp": bitmap }),
            LayerKind::Group { expanded, .. } => json!({ "ex": expanded }),
        };
        match v {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

fn ellipse_bounds(center: Point, rx: u32, ry: u32) -> Rect {
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let (rx, ry) = (i64::from(rx), i64::from(ry));
    Rect::from_corners(
        Point::new(clamp_i32(cx - rx), clamp_i32(cy - ry)),
        Point::new(clamp_i32(cx + rx), clamp_i32(cy + ry)),
    )
}

/// Clamp a dragged extent to `COORD_LIMIT`.
fn extent(v: i32) -> u32 {
    v.unsigned_abs().min(COORD_LIMIT as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/kind.rs"]
mod tests;
