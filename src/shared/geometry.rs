//! Screen and window rectangles

use serde::{Deserialize, Serialize};

/// Window or screen geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center point
    pub fn center(&self) -> (i32, i32) {
        (
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        let (x, y) = (x as i64, y as i64);
        x >= self.x as i64 && x < self.right() && y >= self.y as i64 && y < self.bottom()
    }

    /// Area of the intersection with `other`, 0 when they do not overlap
    pub fn overlap(&self, other: &Geometry) -> u64 {
        let left = (self.x as i64).max(other.x as i64);
        let top = (self.y as i64).max(other.y as i64);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            return 0;
        }
        ((right - left) * (bottom - top)) as u64
    }

    /// Squared distance from a point to the nearest pixel of this rectangle
    pub fn distance_sq(&self, x: i32, y: i32) -> i64 {
        let (x, y) = (x as i64, y as i64);
        let dx = if x < self.x as i64 {
            self.x as i64 - x
        } else if x >= self.right() {
            x - self.right() + 1
        } else {
            0
        };
        let dy = if y < self.y as i64 {
            self.y as i64 - y
        } else if y >= self.bottom() {
            y - self.bottom() + 1
        } else {
            0
        };
        dx * dx + dy * dy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Geometry::new(0, 0, 100, 100);
        let b = Geometry::new(50, 50, 100, 100);
        assert_eq!(a.overlap(&b), 2500);
        assert_eq!(b.overlap(&a), 2500);
        assert_eq!(a.overlap(&Geometry::new(100, 0, 10, 10)), 0);
        assert_eq!(a.overlap(&a), a.area());
    }

    #[test]
    fn test_distance_and_containment() {
        let screen = Geometry::new(1920, 0, 1280, 1024);
        assert!(screen.contains_point(1920, 0));
        assert!(!screen.contains_point(3200, 10));
        assert_eq!(screen.distance_sq(1920, 500), 0);
        assert_eq!(screen.distance_sq(1910, 500), 100);
        assert_eq!(screen.center(), (2560, 512));
    }
}
