//! Canonical skeleton rendering.
//!
//! Maps a hand detection into a fixed 400x400 white canvas: landmarks are
//! re-expressed relative to the cropped hand region, centered with offsets
//! derived from the bounding box, and drawn as the finger/palm connection
//! graph. The canvas dimensions are a hard input contract for the sign
//! classifier.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

use asl_models::{HandDetection, Point, FINGER_CHAINS, LANDMARK_COUNT, PALM_EDGES};

use crate::error::{VisionError, VisionResult};

/// Canvas edge length in pixels.
pub const CANVAS_SIZE: u32 = 400;

/// Margin added around the bounding box when validating the crop region.
pub const CROP_MARGIN: i32 = 29;

/// Inset subtracted from the centering offsets.
const CENTER_INSET: i32 = 15;

const STROKE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const POINT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const POINT_RADIUS: i32 = 2;

/// A rendered skeleton: the canonical canvas plus the landmark points in
/// crop-local coordinates, as consumed by the refinement cascade.
#[derive(Debug)]
pub struct Skeleton {
    pub canvas: RgbImage,
    pub points: Vec<Point>,
}

/// Centering offsets for a bounding box dimension: `((400 - dim) / 2) - 15`
/// with floor division.
pub fn centering_offset(bbox_dim: i32) -> i32 {
    (CANVAS_SIZE as i32 - bbox_dim).div_euclid(2) - CENTER_INSET
}

/// Render the canonical skeleton for a detection within a frame of the
/// given dimensions.
///
/// Fails with a detection miss when fewer than 21 landmarks are available
/// or when the margin-expanded crop region clamps to nothing.
pub fn render(
    hand: &HandDetection,
    frame_width: u32,
    frame_height: u32,
) -> VisionResult<Skeleton> {
    if hand.points.len() < LANDMARK_COUNT {
        return Err(VisionError::InsufficientLandmarks {
            got: hand.points.len(),
        });
    }

    // The crop validates that some of the hand lies inside the frame; the
    // drawing itself works purely in translated coordinates.
    let crop = hand
        .bbox
        .pad(CROP_MARGIN)
        .clamp(frame_width, frame_height)
        .ok_or(VisionError::EmptyCropRegion)?;

    let points: Vec<Point> = hand
        .points
        .iter()
        .map(|p| p.translate(-crop.x, -crop.y))
        .collect();

    let os_x = centering_offset(hand.bbox.width);
    let os_y = centering_offset(hand.bbox.height);

    let mut canvas = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgb([255, 255, 255]));

    for (start, end) in FINGER_CHAINS {
        for i in start..end {
            draw_bone(&mut canvas, points[i], points[i + 1], os_x, os_y);
        }
    }
    for (a, b) in PALM_EDGES {
        draw_bone(&mut canvas, points[a], points[b], os_x, os_y);
    }
    for p in &points {
        draw_filled_circle_mut(
            &mut canvas,
            (p.x + os_x, p.y + os_y),
            POINT_RADIUS,
            POINT_COLOR,
        );
    }

    Ok(Skeleton { canvas, points })
}

/// Draw one connection segment with a ~3px stroke by repeating the 1px line
/// at unit offsets on each axis. imageproc clips out-of-bounds pixels.
fn draw_bone(canvas: &mut RgbImage, a: Point, b: Point, os_x: i32, os_y: i32) {
    let ax = (a.x + os_x) as f32;
    let ay = (a.y + os_y) as f32;
    let bx = (b.x + os_x) as f32;
    let by = (b.y + os_y) as f32;

    for d in -1..=1i32 {
        let o = d as f32;
        draw_line_segment_mut(canvas, (ax + o, ay), (bx + o, by), STROKE_COLOR);
        if d != 0 {
            draw_line_segment_mut(canvas, (ax, ay + o), (bx, by + o), STROKE_COLOR);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asl_models::BoundingBox;

    fn synthetic_hand(bbox: BoundingBox) -> HandDetection {
        // 21 points spread across the box interior.
        let points = (0..LANDMARK_COUNT as i32)
            .map(|i| {
                Point::new(
                    bbox.x + (i * bbox.width.max(1)) / LANDMARK_COUNT as i32,
                    bbox.y + (i * bbox.height.max(1)) / LANDMARK_COUNT as i32,
                )
            })
            .collect();
        HandDetection { bbox, points }
    }

    #[test]
    fn test_canvas_is_always_canonical_size() {
        for bbox in [
            BoundingBox::new(50, 60, 120, 180),
            // Degenerate thin and wide boxes.
            BoundingBox::new(10, 10, 2, 300),
            BoundingBox::new(10, 10, 500, 3),
        ] {
            let skeleton = render(&synthetic_hand(bbox), 640, 480).unwrap();
            assert_eq!(skeleton.canvas.dimensions(), (CANVAS_SIZE, CANVAS_SIZE));
        }
    }

    #[test]
    fn test_centering_offset_full_size_box() {
        // A bbox matching the canvas exactly centers to -15 on both axes.
        assert_eq!(centering_offset(400), -15);
    }

    #[test]
    fn test_centering_offset_floor_division() {
        // (400 - 33) / 2 floors to 183.
        assert_eq!(centering_offset(33), 183 - 15);
        // Boxes wider than the canvas floor toward negative infinity.
        assert_eq!(centering_offset(405), -3 - 15);
    }

    #[test]
    fn test_points_are_crop_local() {
        let bbox = BoundingBox::new(100, 100, 80, 80);
        let hand = synthetic_hand(bbox);
        let skeleton = render(&hand, 640, 480).unwrap();
        // Crop origin is bbox origin minus the margin, so the wrist lands
        // at (margin, margin) in crop-local space.
        assert_eq!(skeleton.points[0], Point::new(CROP_MARGIN, CROP_MARGIN));
    }

    #[test]
    fn test_insufficient_landmarks() {
        let hand = HandDetection {
            bbox: BoundingBox::new(10, 10, 50, 50),
            points: vec![Point::new(10, 10); 5],
        };
        let err = render(&hand, 640, 480).unwrap_err();
        assert!(matches!(
            err,
            VisionError::InsufficientLandmarks { got: 5 }
        ));
        assert!(err.is_detection_miss());
    }

    #[test]
    fn test_hand_outside_frame() {
        let bbox = BoundingBox::new(-500, -500, 100, 100);
        let hand = synthetic_hand(bbox);
        let err = render(&hand, 640, 480).unwrap_err();
        assert!(matches!(err, VisionError::EmptyCropRegion));
    }

    #[test]
    fn test_skeleton_draws_on_white_background() {
        let bbox = BoundingBox::new(200, 150, 120, 160);
        let skeleton = render(&synthetic_hand(bbox), 640, 480).unwrap();
        let has_stroke = skeleton
            .canvas
            .pixels()
            .any(|p| *p == STROKE_COLOR || *p == POINT_COLOR);
        assert!(has_stroke);
        // Corners stay untouched.
        assert_eq!(*skeleton.canvas.get_pixel(0, 0), Rgb([255, 255, 255]));
    }
}
