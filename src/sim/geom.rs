//! Rectangle and circle geometry for collision tests
//!
//! The playfield uses canvas coordinates: origin at the top-left, y growing
//! downward. Obstacles are axis-aligned rectangles; projectiles and targets
//! are circles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (top-left corner plus extents)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Center of the rectangle
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// True iff `p` lies within the rect expanded by `padding` on all sides.
    ///
    /// A circle of radius `padding` touches the rect exactly when its center
    /// passes this test (corner regions are slightly generous, matching the
    /// original contact rule).
    pub fn contains_with_padding(&self, p: Vec2, padding: f32) -> bool {
        p.x >= self.x - padding
            && p.x <= self.x + self.w + padding
            && p.y >= self.y - padding
            && p.y <= self.y + self.h + padding
    }
}

/// True iff two circles overlap (distance between centers < sum of radii)
#[inline]
pub fn circles_intersect(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    c1.distance(c2) < r1 + r2
}

/// Reflection angle for a projectile in contact with a rectangle.
///
/// The dominant penetration axis is chosen by comparing `|dx|` against
/// `|dy| * (w / h)`, where `(dx, dy)` is the offset from the rect center.
/// Horizontal-dominant contact flips the angle horizontally (`pi - angle`),
/// anything else flips vertically (`-angle`). The aspect-ratio scaling of dy
/// is inherited behavior, kept as-is rather than replaced with a face-normal
/// test, so long thin obstacles deflect exactly like they always have.
pub fn reflect_off_rect(pos: Vec2, angle: f32, rect: &Rect) -> f32 {
    let offset = pos - rect.center();
    if offset.x.abs() > offset.y.abs() * (rect.w / rect.h) {
        std::f32::consts::PI - angle
    } else {
        -angle
    }
}
