//! Posterlab Core - Poster editing library
//!
//! This crate provides the editing model behind Posterlab: decoding the
//! generated image, the aspect-locked crop state machine, the filter catalog
//! and the cropped, filtered PNG export.

pub mod crop;
pub mod decode;
pub mod encode;
pub mod export;
pub mod filter;
pub mod session;
pub mod transform;

pub use crop::{default_crop, CropError, CropEvent, CropState};
pub use decode::{decode_base64_image, DecodeError, Raster};
pub use export::{
    export_crop, export_to_sink, DirectorySink, DownloadSink, ExportArtifact, ExportError,
    ExportOptions, MemorySink,
};
pub use filter::{catalog, select, FilterError, FilterSpec};
pub use session::{
    EditingSession, GenerationError, ImageGenerator, SessionController, SessionError,
    ValidationError,
};
pub use transform::{Crop, DisplaySize, PercentCrop, PixelCrop};

/// Locked crop aspect ratio (width / height): the 1.2 x 0.8 poster format.
pub const ASPECT_RATIO: f64 = 1.2 / 0.8;

/// Absolute slack on `width / height` before a crop counts as off-ratio.
pub const ASPECT_TOLERANCE: f64 = 1e-3;

/// Slack, in displayed pixels, on the crop-inside-image check.
pub const CONTAINMENT_TOLERANCE: f64 = 1e-6;

/// Width of the default crop as a percentage of the displayed width.
pub const DEFAULT_CROP_WIDTH_PERCENT: f64 = 90.0;

/// Suggested filename for exports.
pub const EXPORT_FILENAME: &str = "edited-backstage-poster.png";

/// Largest export surface side, in pixels.
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;
