//! Cropped, filtered export.
//!
//! Export reads only the *completed* crop (displayed pixels), scales it into
//! native space, draws that region with the active filter baked in, encodes
//! the surface as PNG and hands it to a [`DownloadSink`].
//!
//! # Surface size
//!
//! The surface is `round(width * sx) x round(height * sy)` where `sx`/`sy`
//! are the native/displayed scale factors. `f64::round` (half away from
//! zero) keeps the result deterministic for a given crop.
//!
//! # Refusals
//!
//! Missing layout, missing crop and zero-area crops are refused before any
//! drawing and logged at `warn`. Nothing reaches the sink in that case.

mod sink;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::Raster;
use crate::encode::{encode_png, EncodeError, PNG_MIME_TYPE};
use crate::filter::{ColorPipeline, FilterError, FilterSpec};
use crate::transform::{draw_region, to_native, DisplaySize, PixelCrop};
use crate::{EXPORT_FILENAME, MAX_SURFACE_DIMENSION};

pub use sink::{DirectorySink, DownloadSink, MemorySink, SinkError};

/// Errors that abort an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The image has not been laid out, or has no pixels.
    #[error("Export refused: image not loaded")]
    NotLoaded,

    /// No completed crop is available.
    #[error("Export refused: no completed crop")]
    MissingCrop,

    /// The completed crop has zero width or height.
    #[error("Export refused: crop has zero area ({width}x{height})")]
    EmptyCrop { width: f64, height: f64 },

    /// The output surface could not be allocated.
    #[error("Could not create export surface: {0}")]
    Surface(String),

    /// The active filter directive could not be interpreted.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// PNG encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The sink could not persist the artifact.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl ExportError {
    /// True for the precondition refusals (nothing was attempted).
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ExportError::NotLoaded | ExportError::MissingCrop | ExportError::EmptyCrop { .. }
        )
    }
}

/// Export settings a shell may override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Suggested download filename.
    pub filename: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            filename: EXPORT_FILENAME.to_string(),
        }
    }
}

/// An encoded export ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// `data:` URL form, as used for anchor-based downloads.
    pub fn data_url(&self) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Everything export reads from a session.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    pub image: &'a Raster,
    /// Displayed size, `None` until the image has been laid out.
    pub display: Option<DisplaySize>,
    /// Committed crop in displayed pixels.
    pub completed: Option<PixelCrop>,
    pub filter: FilterSpec,
}

impl ExportRequest<'_> {
    /// Check preconditions and compute the native region and surface size.
    pub fn plan(&self) -> Result<SurfacePlan, ExportError> {
        let display = match self.display {
            Some(display) if display.is_valid() && !self.image.is_empty() => display,
            _ => return Err(ExportError::NotLoaded),
        };
        let crop = self.completed.ok_or(ExportError::MissingCrop)?;
        if crop.is_degenerate() || !crop.is_finite() {
            return Err(ExportError::EmptyCrop {
                width: crop.width,
                height: crop.height,
            });
        }

        let region = to_native(&crop, &self.image.dimensions(display));
        let width = surface_side(region.width)?;
        let height = surface_side(region.height)?;
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(Raster::CHANNELS))
            .ok_or_else(|| ExportError::Surface(format!("{}x{} overflows", width, height)))?;

        Ok(SurfacePlan {
            region,
            width,
            height,
        })
    }
}

/// Native region to draw and the surface it lands on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePlan {
    pub region: PixelCrop,
    pub width: u32,
    pub height: u32,
}

fn surface_side(extent: f64) -> Result<u32, ExportError> {
    let side = extent.round();
    if side < 1.0 {
        return Err(ExportError::Surface(format!(
            "crop rounds to an empty surface ({:.3}px)",
            extent
        )));
    }
    if side > MAX_SURFACE_DIMENSION as f64 {
        return Err(ExportError::Surface(format!(
            "{}px exceeds the {}px limit",
            side, MAX_SURFACE_DIMENSION
        )));
    }
    Ok(side as u32)
}

/// Draw the cropped, filtered surface.
///
/// # Errors
///
/// Precondition refusals are logged and returned; see [`ExportError`].
pub fn render_crop(request: &ExportRequest<'_>) -> Result<Raster, ExportError> {
    let plan = request
        .plan()
        .inspect_err(|err| warn!("{}", err))?;
    let pipeline = ColorPipeline::compile(&request.filter.chain()?);

    Ok(draw_region(
        request.image,
        &plan.region,
        plan.width,
        plan.height,
        &pipeline,
    ))
}

/// Render and encode, without persisting.
pub fn export_crop(
    request: &ExportRequest<'_>,
    options: &ExportOptions,
) -> Result<ExportArtifact, ExportError> {
    let surface = render_crop(request)?;
    let bytes = encode_png(&surface.pixels, surface.width, surface.height)?;

    Ok(ExportArtifact {
        filename: options.filename.clone(),
        mime_type: PNG_MIME_TYPE,
        width: surface.width,
        height: surface.height,
        bytes,
    })
}

/// Render, encode and hand the artifact to `sink`.
pub fn export_to_sink(
    request: &ExportRequest<'_>,
    options: &ExportOptions,
    sink: &mut dyn DownloadSink,
) -> Result<(), ExportError> {
    let artifact = export_crop(request, options)?;
    sink.save(&artifact)?;
    info!(
        "Exported {} ({}x{}, filter {})",
        artifact.filename, artifact.width, artifact.height, request.filter.name
    );
    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
