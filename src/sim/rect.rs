//! Integer axis-aligned rectangles
//!
//! Screen-space, y grows downward. Edges follow the usual half-open
//! convention: `right = x + w`, `bottom = y + h`, and two rectangles that
//! merely touch do not intersect.

use glam::IVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle of size `(w, h)` whose bottom-left corner sits at `(x, bottom)`
    pub const fn from_bottom_left(x: i32, bottom: i32, w: i32, h: i32) -> Self {
        Self::new(x, bottom - h, w, h)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> i32 {
        self.x + self.w / 2
    }

    pub fn top_left(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn bottom_left(&self) -> IVec2 {
        IVec2::new(self.x, self.bottom())
    }

    pub fn bottom_right(&self) -> IVec2 {
        IVec2::new(self.right(), self.bottom())
    }

    /// Zero or negative extent on either axis
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Strict overlap test; degenerate rectangles never intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_degenerate()
            && !other.is_degenerate()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Shrink horizontally by `inset` on each side
    pub fn inset_x(&self, inset: i32) -> Rect {
        Rect::new(self.x + inset, self.y, self.w - inset * 2, self.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(832, 192, 64, 64);
        assert_eq!(r.right(), 896);
        assert_eq!(r.bottom(), 256);
        assert_eq!(r.center_x(), 864);
        assert_eq!(Rect::from_bottom_left(271, 384, 24, 24).top(), 360);
    }

    #[test]
    fn test_touching_does_not_intersect() {
        let a = Rect::new(0, 0, 64, 64);
        let b = Rect::new(64, 0, 64, 64);
        let c = Rect::new(0, 64, 64, 64);
        assert!(!a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.intersects(&Rect::new(63, 63, 10, 10)));
    }

    #[test]
    fn test_degenerate_never_intersects() {
        let a = Rect::new(0, 0, 64, 64);
        assert!(!a.intersects(&Rect::new(10, 10, 0, 5)));
        assert!(!a.intersects(&Rect::new(10, 10, 5, -3)));
        assert!(!Rect::new(10, 10, 0, 0).intersects(&a));
    }

    #[test]
    fn test_inset() {
        assert_eq!(Rect::new(0, 0, 64, 46).inset_x(9), Rect::new(9, 0, 46, 46));
    }
}
