use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge x-coordinate
    pub x: i32,
    /// Top edge y-coordinate
    pub y: i32,
    /// Box width
    pub width: i32,
    /// Box height
    pub height: i32,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate.
    #[inline]
    pub fn x2(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate.
    #[inline]
    pub fn y2(&self) -> i32 {
        self.y + self.height
    }

    /// Return a new box with padding added on all sides.
    pub fn pad(&self, padding: i32) -> BoundingBox {
        BoundingBox {
            x: self.x - padding,
            y: self.y - padding,
            width: self.width + 2 * padding,
            height: self.height + 2 * padding,
        }
    }

    /// Intersect with the frame rectangle `[0, frame_width) x [0, frame_height)`.
    ///
    /// Returns `None` when the clamped region is empty.
    pub fn clamp(&self, frame_width: u32, frame_height: u32) -> Option<BoundingBox> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.x2().min(frame_width as i32);
        let y2 = self.y2().min(frame_height as i32);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(BoundingBox {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }

    /// Compute the extent of a point set.
    pub fn from_points(points: &[Point]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_and_clamp() {
        let bbox = BoundingBox::new(10, 10, 50, 40);
        let padded = bbox.pad(29);
        assert_eq!(padded, BoundingBox::new(-19, -19, 108, 98));

        let clamped = padded.clamp(640, 480).unwrap();
        assert_eq!(clamped, BoundingBox::new(0, 0, 89, 79));
    }

    #[test]
    fn test_clamp_empty() {
        // Entirely left of the frame after clamping.
        let bbox = BoundingBox::new(-100, 10, 50, 40);
        assert!(bbox.clamp(640, 480).is_none());
        // Degenerate zero-area box.
        assert!(BoundingBox::new(10, 10, 0, 40).clamp(640, 480).is_none());
    }

    #[test]
    fn test_from_points() {
        let points = [Point::new(5, 7), Point::new(20, 3), Point::new(11, 30)];
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bbox, BoundingBox::new(5, 3, 15, 27));
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
