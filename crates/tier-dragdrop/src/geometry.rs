//! Pointer geometry used by hover resolution.

use serde::{Deserialize, Serialize};

/// Pointer position in client coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True if `other` is more than `threshold` away on either axis
    pub fn moved_beyond(&self, other: Point, threshold: f64) -> bool {
        (other.x - self.x).abs() > threshold || (other.y - self.y).abs() > threshold
    }
}

/// Bounding box of a rendered item, as reported by the host
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn mid_x(&self) -> f64 {
        self.left + self.width / 2.0
    }

    pub fn mid_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Layout direction of a container's items
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Items flow left to right (tier rows)
    #[default]
    Horizontal,
    /// Items flow top to bottom
    Vertical,
}

impl Axis {
    /// Whether `at` falls in the leading half of `rect` along this axis
    pub fn is_leading_half(&self, rect: &Rect, at: Point) -> bool {
        match self {
            Axis::Horizontal => at.x < rect.mid_x(),
            Axis::Vertical => at.y < rect.mid_y(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_exclusive() {
        let start = Point::new(10.0, 10.0);
        assert!(!start.moved_beyond(Point::new(15.0, 10.0), 5.0));
        assert!(start.moved_beyond(Point::new(15.5, 10.0), 5.0));
        assert!(start.moved_beyond(Point::new(10.0, 4.0), 5.0));
    }

    #[test]
    fn test_leading_half() {
        let rect = Rect::new(100.0, 0.0, 50.0, 20.0);
        assert!(Axis::Horizontal.is_leading_half(&rect, Point::new(124.9, 5.0)));
        assert!(!Axis::Horizontal.is_leading_half(&rect, Point::new(125.0, 5.0)));
        assert!(Axis::Vertical.is_leading_half(&rect, Point::new(140.0, 9.0)));
        assert!(!Axis::Vertical.is_leading_half(&rect, Point::new(101.0, 15.0)));
    }
}
