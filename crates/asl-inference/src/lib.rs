//! Coarse sign classification and geometric refinement.
//!
//! This crate provides:
//! - The [`SignModel`] trait and its ONNX Runtime implementation
//! - The ordered geometric rule cascade resolving the coarse class into a
//!   letter

pub mod classifier;
pub mod error;
pub mod refine;

pub use classifier::{OrtSignModel, SignModel, COARSE_CLASSES};
pub use error::{InferenceError, InferenceResult};
pub use refine::refine;

/// Predictions with a max probability below this are reported as uncertain.
/// The boundary is exclusive: exactly 0.4 keeps the letter.
pub const CONFIDENCE_FLOOR: f32 = 0.4;
