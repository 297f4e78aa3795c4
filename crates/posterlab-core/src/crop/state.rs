//! The crop state machine.

use log::{debug, warn};

use super::{default_crop, CropError};
use crate::transform::{percent_to_pixel, pixel_to_percent, Crop, DisplaySize, PercentCrop, PixelCrop};
use crate::{ASPECT_RATIO, ASPECT_TOLERANCE, CONTAINMENT_TOLERANCE};

/// Interaction messages from the crop surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropEvent {
    /// The rectangle moved or resized mid-interaction.
    Changed(Crop),
    /// The interaction ended on this rectangle.
    Committed(Crop),
}

/// Current and committed crop for one displayed image.
///
/// A value type: every transition consumes the state and returns the next
/// one, leaving the caller's copy untouched on error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropState {
    display: DisplaySize,
    current: PercentCrop,
    completed: PixelCrop,
}

impl CropState {
    /// Fresh state with the centered default crop, already committed so an
    /// export works without any interaction.
    pub fn new(display: DisplaySize) -> Result<Self, CropError> {
        let current = default_crop(display)?;
        Ok(Self {
            display,
            current,
            completed: percent_to_pixel(&current, display),
        })
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    /// Current crop in percent of the displayed size.
    pub fn percent(&self) -> PercentCrop {
        self.current
    }

    /// Current crop in displayed pixels.
    pub fn pixel(&self) -> PixelCrop {
        percent_to_pixel(&self.current, self.display)
    }

    /// The committed crop export reads, in displayed pixels.
    pub fn completed(&self) -> PixelCrop {
        self.completed
    }

    /// Store a rectangle proposed mid-drag.
    ///
    /// # Errors
    ///
    /// Refuses rectangles that break the aspect lock or leave the image; the
    /// returned error leaves `self` as the valid state.
    pub fn on_drag(self, crop: Crop) -> Result<Self, CropError> {
        let pixel = crop.to_pixel(self.display);
        validate_crop(&pixel, self.display).inspect_err(|err| warn!("Rejected crop drag: {}", err))?;
        Ok(Self {
            current: crop.to_percent(self.display),
            ..self
        })
    }

    /// Record the rectangle an interaction ended on as the completed crop.
    ///
    /// Degenerate rectangles are stored; export refuses them.
    pub fn commit(self, crop: Crop) -> Result<Self, CropError> {
        let pixel = crop.to_pixel(self.display);
        validate_crop(&pixel, self.display)
            .inspect_err(|err| warn!("Rejected crop commit: {}", err))?;
        debug!(
            "Crop committed: {:.1},{:.1} {:.1}x{:.1}",
            pixel.x, pixel.y, pixel.width, pixel.height
        );
        Ok(Self {
            current: crop.to_percent(self.display),
            completed: pixel,
            ..self
        })
    }

    /// Route an interaction event.
    pub fn apply(self, event: CropEvent) -> Result<Self, CropError> {
        match event {
            CropEvent::Changed(crop) => self.on_drag(crop),
            CropEvent::Committed(crop) => self.commit(crop),
        }
    }

    /// Back to the centered default for the current displayed size.
    pub fn reset(self) -> Result<Self, CropError> {
        Self::new(self.display)
    }

    /// The image was re-laid out at a new displayed size.
    ///
    /// The percent crop is kept as-is; the completed crop is rescaled so it
    /// still covers the same part of the image. A layout with a different
    /// shape would stretch both off the locked aspect, so the state falls
    /// back to the default crop for the new size instead.
    pub fn resize_display(self, display: DisplaySize) -> Result<Self, CropError> {
        if !display.is_valid() {
            return Err(CropError::InvalidDimensions {
                width: display.width,
                height: display.height,
            });
        }
        let relative = pixel_to_percent(&self.completed, self.display);
        let resized = Self {
            display,
            current: self.current,
            completed: percent_to_pixel(&relative, display),
        };

        let still_valid = validate_crop(&resized.completed, display)
            .and_then(|()| validate_crop(&resized.pixel(), display));
        match still_valid {
            Ok(()) => Ok(resized),
            Err(err) => {
                debug!("Crop reset to default after resize: {}", err);
                Self::new(display)
            }
        }
    }
}

/// Check a displayed-space rectangle against containment and the aspect lock.
///
/// Zero-area rectangles skip the aspect check: they are a normal transient
/// state while a new selection is being dragged out.
pub fn validate_crop(rect: &PixelCrop, display: DisplaySize) -> Result<(), CropError> {
    if !rect.is_finite() {
        return Err(CropError::NonFinite);
    }

    let out_of_bounds = rect.x < -CONTAINMENT_TOLERANCE
        || rect.y < -CONTAINMENT_TOLERANCE
        || rect.width < 0.0
        || rect.height < 0.0
        || rect.right() > display.width + CONTAINMENT_TOLERANCE
        || rect.bottom() > display.height + CONTAINMENT_TOLERANCE;
    if out_of_bounds {
        return Err(CropError::OutOfBounds {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            bound_width: display.width,
            bound_height: display.height,
        });
    }

    if !rect.is_degenerate() && (rect.aspect() - ASPECT_RATIO).abs() >= ASPECT_TOLERANCE {
        return Err(CropError::AspectViolation {
            expected: ASPECT_RATIO,
            actual: rect.aspect(),
        });
    }

    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Any accepted drag satisfies aspect and containment.
        #[test]
        fn prop_accepted_drags_hold_invariants(
            (w, h) in (50.0f64..=3000.0, 50.0f64..=3000.0),
            (x, y, cw, ch) in (0.0f64..=3000.0, 0.0f64..=3000.0, 0.0f64..=3000.0, 0.0f64..=3000.0),
        ) {
            let display = DisplaySize::new(w, h);
            let state = CropState::new(display).unwrap();

            if let Ok(next) = state.on_drag(Crop::Pixel(PixelCrop::new(x, y, cw, ch))) {
                let rect = next.pixel();
                prop_assert!(rect.x >= -CONTAINMENT_TOLERANCE);
                prop_assert!(rect.y >= -CONTAINMENT_TOLERANCE);
                prop_assert!(rect.right() <= w + CONTAINMENT_TOLERANCE * 2.0);
                prop_assert!(rect.bottom() <= h + CONTAINMENT_TOLERANCE * 2.0);
                if !rect.is_degenerate() {
                    prop_assert!((rect.aspect() - ASPECT_RATIO).abs() < ASPECT_TOLERANCE * 1.01);
                }
            }
        }

        /// Property: Aspect-locked drags inside the image are always accepted.
        #[test]
        fn prop_locked_drags_accepted(
            (w, h) in (50.0f64..=3000.0, 50.0f64..=3000.0),
            scale in 0.05f64..=1.0,
            (fx, fy) in (0.0f64..=1.0, 0.0f64..=1.0),
        ) {
            let display = DisplaySize::new(w, h);
            let max_w = w.min(h * ASPECT_RATIO);
            let cw = max_w * scale;
            let ch = cw / ASPECT_RATIO;
            let rect = PixelCrop::new((w - cw) * fx, (h - ch) * fy, cw, ch);

            let state = CropState::new(display).unwrap();
            prop_assert!(state.on_drag(Crop::Pixel(rect)).is_ok());
        }

        /// Property: Any re-layout leaves both stored crops valid.
        #[test]
        fn prop_resize_keeps_invariants(
            (w, h) in (50.0f64..=3000.0, 50.0f64..=3000.0),
            (w2, h2) in (50.0f64..=3000.0, 50.0f64..=3000.0),
        ) {
            let display = DisplaySize::new(w2, h2);
            let resized = CropState::new(DisplaySize::new(w, h))
                .unwrap()
                .resize_display(display)
                .unwrap();

            prop_assert!(validate_crop(&resized.completed(), display).is_ok());
            prop_assert!(validate_crop(&resized.pixel(), display).is_ok());
        }

        /// Property: Reset after arbitrary drags equals the initial state.
        #[test]
        fn prop_reset_restores_default(
            (w, h) in (50.0f64..=3000.0, 50.0f64..=3000.0),
            scales in prop::collection::vec(0.05f64..=1.0, 1..6),
        ) {
            let display = DisplaySize::new(w, h);
            let initial = CropState::new(display).unwrap();
            let max_w = w.min(h * ASPECT_RATIO);

            let mut state = initial;
            for s in scales {
                let cw = max_w * s;
                let rect = Crop::Pixel(PixelCrop::new(0.0, 0.0, cw, cw / ASPECT_RATIO));
                state = state.on_drag(rect).unwrap().commit(rect).unwrap();
            }

            prop_assert_eq!(state.reset().unwrap(), initial);
        }
    }
}
