//! Aspect-locked crop state.
//!
//! The crop is edited in displayed space and always keeps the poster aspect
//! ratio ([`crate::ASPECT_RATIO`]). The interaction layer is responsible for
//! moving both dimensions together while resizing; this module stores what
//! it proposes and refuses rectangles that break the lock rather than
//! correcting them.
//!
//! # Events
//!
//! The interaction surface emits [`CropEvent::Changed`] while dragging and
//! [`CropEvent::Committed`] at the end of every interaction. Only committed
//! crops reach export.

mod default;
mod state;

use thiserror::Error;

pub use default::default_crop;
pub use state::{validate_crop, CropEvent, CropState};

/// Errors from crop computation and validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CropError {
    /// Displayed dimensions must be finite and positive.
    #[error("Invalid displayed dimensions: {width}x{height}")]
    InvalidDimensions { width: f64, height: f64 },

    /// The image has not been laid out yet, so there is no displayed space.
    #[error("Image has no displayed size yet")]
    NotDisplayed,

    /// A coordinate is NaN or infinite.
    #[error("Crop rectangle has non-finite coordinates")]
    NonFinite,

    /// The rectangle leaves the displayed image.
    #[error("Crop rectangle ({x}, {y}, {width}x{height}) exceeds displayed bounds {bound_width}x{bound_height}")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        bound_width: f64,
        bound_height: f64,
    },

    /// The rectangle does not hold the locked aspect ratio.
    #[error("Crop aspect {actual:.4} does not match locked aspect {expected:.4}")]
    AspectViolation { expected: f64, actual: f64 },
}
