//! Hand detections and the MediaPipe 21-landmark layout.

use serde::{Deserialize, Serialize};

use crate::point::Point;
use crate::rect::BoundingBox;

/// Number of landmarks produced per detected hand.
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical landmark indices.
///
/// 0 is the wrist; each finger runs base-to-tip. 5/9/13/17 are the knuckle
/// bases (MCP joints) used by the palm edges.
pub mod landmark {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

use self::landmark::{
    INDEX_MCP, INDEX_TIP, MIDDLE_MCP, MIDDLE_TIP, PINKY_MCP, PINKY_TIP, RING_MCP, RING_TIP,
    THUMB_TIP, WRIST,
};

/// Consecutive-index chains drawn as open polylines, one per digit.
///
/// The thumb chain starts at the wrist; the four finger chains start at
/// their knuckle base, so the wrist-to-knuckle segments are covered by the
/// palm edges instead.
pub const FINGER_CHAINS: [(usize, usize); 5] = [
    (WRIST, THUMB_TIP),
    (INDEX_MCP, INDEX_TIP),
    (MIDDLE_MCP, MIDDLE_TIP),
    (RING_MCP, RING_TIP),
    (PINKY_MCP, PINKY_TIP),
];

/// Explicit palm connection segments.
pub const PALM_EDGES: [(usize, usize); 5] = [
    (INDEX_MCP, MIDDLE_MCP),
    (MIDDLE_MCP, RING_MCP),
    (RING_MCP, PINKY_MCP),
    (WRIST, INDEX_MCP),
    (WRIST, PINKY_MCP),
];

/// A single detected hand: bounding box plus the 21 landmark points, both in
/// full-frame pixel coordinates. Produced fresh per request and discarded
/// after the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandDetection {
    pub bbox: BoundingBox,
    pub points: Vec<Point>,
}

impl HandDetection {
    /// Build a detection from landmark points, deriving the bounding box
    /// from their extent.
    pub fn from_points(points: Vec<Point>) -> Option<Self> {
        let bbox = BoundingBox::from_points(&points)?;
        Some(Self { bbox, points })
    }

    /// Whether the detection carries the full landmark set.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points_bbox() {
        let points: Vec<Point> = (0..LANDMARK_COUNT as i32)
            .map(|i| Point::new(100 + i, 200 + 2 * i))
            .collect();
        let hand = HandDetection::from_points(points).unwrap();
        assert_eq!(hand.bbox, BoundingBox::new(100, 200, 20, 40));
        assert!(hand.is_complete());
    }

    #[test]
    fn test_chain_layout_covers_all_landmarks() {
        let mut seen = [false; LANDMARK_COUNT];
        for (start, end) in FINGER_CHAINS {
            for i in start..=end {
                seen[i] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}
