//! Geometry primitives used across trellis.

/// 2D affine transforms.
mod affine;
/// Error types for geometry operations.
mod error;
/// Edge inset helpers.
mod insets;
/// Point helpers.
mod point;
/// Rectangle operations.
mod rect;
/// Width/height size type.
mod size;

pub use affine::Affine;
pub use error::{Error, Result};
pub use insets::Insets;
pub use point::Point;
pub use rect::Rect;
pub use size::Size;
