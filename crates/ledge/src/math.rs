//! Pixel-space math types.
//!
//! Positions and velocities are `f32`; collision rectangles are whole
//! pixels, like the tile grid they are tested against.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 2D Vector - position, velocity, offsets
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Converts to array
    #[must_use]
    pub const fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned pixel rectangle (`x`, `y` is the top-left corner).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Width
    pub w: i32,
    /// Height
    pub h: i32,
}

impl Rect {
    /// Creates a new Rect
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// One past the right-most pixel column.
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x + self.w
    }

    /// One past the bottom-most pixel row.
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y + self.h
    }

    /// True if the rectangle covers no pixels.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Strict overlap test: rectangles that only share an edge do not
    /// intersect, and empty rectangles intersect nothing.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Center point in pixel space.
    #[must_use]
    pub fn center(self) -> Vec2 {
        Vec2::new(
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }
}

/// Converts a sub-pixel coordinate to the pixel containing it.
#[inline]
#[must_use]
pub fn to_pixel(value: f32) -> i32 {
    value.floor() as i32
}

/// Moves `value` toward zero by at most `amount`, never crossing zero.
#[inline]
#[must_use]
pub fn move_to_zero(value: f32, amount: f32) -> f32 {
    if value > 0.0 {
        (value - amount).max(0.0)
    } else if value < 0.0 {
        (value + amount).min(0.0)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_is_strict() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(Rect::new(9, 9, 5, 5)));
        // Touching edges only
        assert!(!a.intersects(Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(Rect::new(0, 10, 5, 5)));
        // Empty rectangles never intersect
        assert!(!a.intersects(Rect::new(2, 2, 0, 4)));
    }

    #[test]
    fn test_move_to_zero() {
        assert_eq!(move_to_zero(10.0, 3.0), 7.0);
        assert_eq!(move_to_zero(2.0, 3.0), 0.0);
        assert_eq!(move_to_zero(-10.0, 3.0), -7.0);
        assert_eq!(move_to_zero(-1.0, 3.0), 0.0);
        assert_eq!(move_to_zero(0.0, 3.0), 0.0);
    }

    #[test]
    fn test_to_pixel_floors() {
        assert_eq!(to_pixel(3.9), 3);
        assert_eq!(to_pixel(-0.5), -1);
    }

    #[test]
    fn test_vec2_ops() {
        let v = Vec2::new(1.0, 2.0) + Vec2::new(3.0, 4.0);
        assert_eq!(v, Vec2::new(4.0, 6.0));
        assert_eq!(v * 0.5, Vec2::new(2.0, 3.0));
        assert_eq!(-v, Vec2::new(-4.0, -6.0));
    }
}
