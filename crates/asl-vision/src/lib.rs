//! Hand landmark extraction and canonical skeleton rendering.
//!
//! This crate provides:
//! - The [`HandLandmarker`] trait and its ONNX Runtime implementation
//! - The fixed-size skeleton renderer feeding the sign classifier

pub mod error;
pub mod landmarker;
pub mod skeleton;

pub use error::{VisionError, VisionResult};
pub use landmarker::{HandLandmarker, OrtHandLandmarker};
pub use skeleton::{render, Skeleton, CANVAS_SIZE, CROP_MARGIN};
