use crate::foundation::error::{SceneError, SceneResult};

pub use kurbo::Vec2;

/// Largest coordinate magnitude, extent or radius a layer may carry.
///
/// Displays are a few hundred pixels at most; anything past this is rejected when a layer is
/// built or inserted, which keeps every rasterizer loop bounded.
pub const COORD_LIMIT: i32 = 1 << 16;

pub(crate) fn clamp_i32(v: i64) -> i32 {
    v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Integer pixel coordinate in display space.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl Point {
    /// Build a point from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum.
    pub fn add(self, other: Point) -> Self {
        Self::new(self.x.saturating_add(other.x), self.y.saturating_add(other.y))
    }

    /// Component-wise difference.
    pub fn sub(self, other: Point) -> Self {
        Self::new(self.x.saturating_sub(other.x), self.y.saturating_sub(other.y))
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.saturating_abs(), self.y.saturating_abs())
    }

    /// Component-wise minimum.
    pub fn min(self, other: Point) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Point) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Return `true` when both coordinates lie within `±COORD_LIMIT`.
    pub fn within_limit(self) -> bool {
        self.x.unsigned_abs() <= COORD_LIMIT as u32 && self.y.unsigned_abs() <= COORD_LIMIT as u32
    }

    /// Convert to a `kurbo` point for analytic geometry.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Pixel extent.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Size {
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

impl Size {
    /// Build a size from its extents.
    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    /// Return `true` when either extent is zero.
    pub fn is_empty(self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Return `true` when both extents are at most `COORD_LIMIT`.
    pub fn within_limit(self) -> bool {
        self.w <= COORD_LIMIT as u32 && self.h <= COORD_LIMIT as u32
    }

    /// Number of pixels covered.
    pub fn area(self) -> usize {
        (self.w as usize).saturating_mul(self.h as usize)
    }
}

/// Axis-aligned pixel rectangle `[pos, pos + size)`.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rect {
    /// Top-left corner.
    pub pos: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// Build a rectangle from its corner and extent.
    pub const fn new(pos: Point, size: Size) -> Self {
        Self { pos, size }
    }

    /// Smallest rectangle covering both corners (inclusive).
    pub fn from_corners(a: Point, b: Point) -> Self {
        let lo = a.min(b);
        let hi = a.max(b);
        Self {
            pos: lo,
            size: Size::new(
                hi.x.abs_diff(lo.x).saturating_add(1),
                hi.y.abs_diff(lo.y).saturating_add(1),
            ),
        }
    }

    /// Exclusive right edge.
    pub fn right(self) -> i32 {
        clamp_i32(i64::from(self.pos.x) + i64::from(self.size.w))
    }

    /// Exclusive bottom edge.
    pub fn bottom(self) -> i32 {
        clamp_i32(i64::from(self.pos.y) + i64::from(self.size.h))
    }

    /// Return `true` when `p` lies inside the rectangle.
    pub fn contains(self, p: Point) -> bool {
        p.x >= self.pos.x && p.y >= self.pos.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Smallest rectangle covering both inputs. Empty rectangles are ignored.
    pub fn union(self, other: Rect) -> Rect {
        if self.size.is_empty() {
            return other;
        }
        if other.size.is_empty() {
            return self;
        }
        let x0 = self.pos.x.min(other.pos.x);
        let y0 = self.pos.y.min(other.pos.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::new(
            Point::new(x0, y0),
            Size::new(x1.abs_diff(x0), y1.abs_diff(y0)),
        )
    }

    /// Shift by `delta`.
    pub fn translate(self, delta: Point) -> Rect {
        Rect::new(self.pos.add(delta), self.size)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque white; the ink every layer paints with.
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    /// Opaque black.
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    /// Build a color from straight channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` (leading `#` optional) into an opaque color.
    pub fn from_hex(hex: &str) -> SceneResult<Self> {
        let s = hex.trim().trim_start_matches('#');
        if s.len() != 6 || !s.is_ascii() {
            return Err(SceneError::validation(format!(
                "color '{hex}' must be #RRGGBB"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| SceneError::validation(format!("color '{hex}' is not valid hex")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, 255))
    }

    /// Format as `#rrggbb`; alpha is dropped.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as premultiplied RGBA8 bytes.
    pub fn to_premul(self) -> [u8; 4] {
        let a = u16::from(self.a);
        let premul = |c: u8| crate::foundation::math::mul_div255_u8(u16::from(c), a);
        [premul(self.r), premul(self.g), premul(self.b), self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
