//! The editing session value type.

use std::rc::Rc;

use crate::crop::{CropError, CropEvent, CropState};
use crate::decode::Raster;
use crate::export::ExportRequest;
use crate::filter::{identity, FilterSpec};
use crate::transform::DisplaySize;

/// One generated image plus the edits made to it.
///
/// Cloning is cheap (the pixels are shared). Every edit consumes the
/// session and returns the next one.
#[derive(Debug, Clone)]
pub struct EditingSession {
    image: Rc<Raster>,
    crop: Option<CropState>,
    filter: FilterSpec,
}

impl EditingSession {
    /// Fresh session: identity filter, no crop until the image is laid out.
    pub fn new(image: Raster) -> Self {
        Self {
            image: Rc::new(image),
            crop: None,
            filter: identity(),
        }
    }

    pub fn image(&self) -> &Raster {
        &self.image
    }

    /// `None` until [`EditingSession::displayed`] has been called.
    pub fn crop(&self) -> Option<&CropState> {
        self.crop.as_ref()
    }

    pub fn active_filter(&self) -> FilterSpec {
        self.filter
    }

    pub fn display(&self) -> Option<DisplaySize> {
        self.crop.map(|crop| crop.display())
    }

    /// The image was laid out at `display`.
    ///
    /// The first layout computes the default crop; later layouts rescale the
    /// existing crop.
    pub fn displayed(self, display: DisplaySize) -> Result<Self, CropError> {
        let crop = match self.crop {
            None => CropState::new(display)?,
            Some(crop) if crop.display() == display => crop,
            Some(crop) => crop.resize_display(display)?,
        };
        Ok(Self {
            crop: Some(crop),
            ..self
        })
    }

    pub fn with_crop_event(self, event: CropEvent) -> Result<Self, CropError> {
        let crop = self.crop.ok_or(CropError::NotDisplayed)?.apply(event)?;
        Ok(Self {
            crop: Some(crop),
            ..self
        })
    }

    pub fn with_filter(self, filter: FilterSpec) -> Self {
        Self { filter, ..self }
    }

    /// Default crop for the current layout and the identity filter.
    pub fn reset(self) -> Result<Self, CropError> {
        let crop = self.crop.map(CropState::reset).transpose()?;
        Ok(Self {
            crop,
            filter: identity(),
            ..self
        })
    }

    /// What export needs from this session.
    pub fn export_request(&self) -> ExportRequest<'_> {
        ExportRequest {
            image: &self.image,
            display: self.display(),
            completed: self.crop.map(|crop| crop.completed()),
            filter: self.filter,
        }
    }
}
