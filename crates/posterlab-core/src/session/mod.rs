//! Session orchestration around the generation collaborator.
//!
//! [`SessionController`] owns the current [`EditingSession`] and sequences
//! generation, crop edits, filter selection and export. It runs on a single
//! cooperative event loop: state lives in a `RefCell` and is only borrowed
//! between await points, so crop/filter/export calls stay available against
//! the previous session while a generation is pending.
//!
//! # Re-entrancy
//!
//! A second [`SessionController::generate`] while one is outstanding is
//! rejected with [`SessionError::GenerationInFlight`]; the first call is not
//! affected.

mod editing;

use std::cell::RefCell;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::crop::{CropError, CropEvent, CropState};
use crate::decode::{decode_base64_image, DecodeError};
use crate::export::{export_crop, export_to_sink, DownloadSink, ExportArtifact, ExportError, ExportOptions};
use crate::filter::{select, FilterError, FilterSpec};
use crate::transform::{Crop, DisplaySize};

pub use editing::EditingSession;

/// Message used when the collaborator gives no usable reason.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Rejected user input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,
}

/// The generation collaborator failed or returned unusable data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GenerationError {
    pub message: String,
}

impl GenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::unknown();
        }
        Self { message }
    }

    pub fn unknown() -> Self {
        Self {
            message: UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<DecodeError> for GenerationError {
    fn from(err: DecodeError) -> Self {
        Self::new(format!("Generated image could not be decoded: {}", err))
    }
}

/// Errors surfaced by [`SessionController`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("A generation is already in progress")]
    GenerationInFlight,

    #[error("No image has been generated yet")]
    NoImage,

    #[error(transparent)]
    Crop(#[from] CropError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Remote image generation.
///
/// Returns base64-encoded image bytes, optionally as a `data:` URL.
#[allow(async_fn_in_trait)]
pub trait ImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Default)]
struct ControllerState {
    session: Option<EditingSession>,
    loading: bool,
    last_error: Option<String>,
}

/// Clears the loading flag when a generation finishes or is dropped.
struct LoadingGuard<'a> {
    state: &'a RefCell<ControllerState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().loading = false;
    }
}

/// Owns the editing session and exposes the shell's actions.
pub struct SessionController<G> {
    generator: G,
    state: RefCell<ControllerState>,
}

impl<G: ImageGenerator> SessionController<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            state: RefCell::new(ControllerState::default()),
        }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Generate a new image and replace the session with a fresh one.
    ///
    /// On failure the message is kept in [`SessionController::last_error`]
    /// and the previous session, if any, stays as it was.
    pub async fn generate(&self, prompt: &str) -> Result<(), SessionError> {
        if prompt.trim().is_empty() {
            let err = ValidationError::EmptyPrompt;
            self.state.borrow_mut().last_error = Some(err.to_string());
            return Err(err.into());
        }

        let _guard = {
            let mut state = self.state.borrow_mut();
            if state.loading {
                warn!("Generation requested while another is in flight");
                return Err(SessionError::GenerationInFlight);
            }
            state.loading = true;
            state.last_error = None;
            LoadingGuard { state: &self.state }
        };

        let outcome = match self.generator.generate(prompt).await {
            Ok(payload) => decode_base64_image(&payload).map_err(GenerationError::from),
            Err(err) => Err(err),
        };

        let mut state = self.state.borrow_mut();
        match outcome {
            Ok(image) => {
                info!("Generated {}x{} image", image.width, image.height);
                state.session = Some(EditingSession::new(image));
                Ok(())
            }
            Err(err) => {
                error!("Generation failed: {}", err);
                state.last_error = Some(err.message.clone());
                Err(err.into())
            }
        }
    }

    /// The UI laid the image out at `width` x `height` displayed pixels.
    pub fn image_displayed(&self, width: f64, height: f64) -> Result<(), SessionError> {
        self.update(|session| Ok(session.displayed(DisplaySize::new(width, height))?))
    }

    /// Default crop for the current layout, identity filter. No-op without
    /// an image.
    pub fn reset_edits(&self) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        let Some(session) = state.session.take() else {
            return Ok(());
        };
        match session.clone().reset() {
            Ok(next) => {
                debug!("Edits reset");
                state.session = Some(next);
                Ok(())
            }
            Err(err) => {
                state.session = Some(session);
                Err(err.into())
            }
        }
    }

    /// Make the named filter active.
    pub fn select_filter(&self, name: &str) -> Result<FilterSpec, SessionError> {
        let filter = select(name)?;
        self.update(|session| Ok(session.with_filter(filter)))?;
        debug!("Filter selected: {}", filter.name);
        Ok(filter)
    }

    /// A mid-drag crop update.
    pub fn update_crop(&self, crop: Crop) -> Result<(), SessionError> {
        self.update(|session| Ok(session.with_crop_event(CropEvent::Changed(crop))?))
    }

    /// The crop an interaction ended on.
    pub fn commit_crop(&self, crop: Crop) -> Result<(), SessionError> {
        self.update(|session| Ok(session.with_crop_event(CropEvent::Committed(crop))?))
    }

    /// Render and encode the current session without saving it.
    pub fn render_export(&self, options: &ExportOptions) -> Result<ExportArtifact, SessionError> {
        let Some(session) = self.session() else {
            let err = ExportError::NotLoaded;
            warn!("{}", err);
            return Err(err.into());
        };
        Ok(export_crop(&session.export_request(), options)?)
    }

    /// Export with the default filename.
    pub fn export(&self, sink: &mut dyn DownloadSink) -> Result<(), SessionError> {
        self.export_with(&ExportOptions::default(), sink)
    }

    /// Export and hand the file to `sink`.
    pub fn export_with(
        &self,
        options: &ExportOptions,
        sink: &mut dyn DownloadSink,
    ) -> Result<(), SessionError> {
        let Some(session) = self.session() else {
            let err = ExportError::NotLoaded;
            warn!("{}", err);
            return Err(err.into());
        };
        Ok(export_to_sink(&session.export_request(), options, sink)?)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error.clone()
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Option<EditingSession> {
        self.state.borrow().session.clone()
    }

    pub fn crop(&self) -> Option<CropState> {
        self.state.borrow().session.as_ref().and_then(|s| s.crop().copied())
    }

    pub fn active_filter(&self) -> Option<FilterSpec> {
        self.state.borrow().session.as_ref().map(|s| s.active_filter())
    }

    /// Apply `edit` to the current session, keeping it on error.
    fn update(
        &self,
        edit: impl FnOnce(EditingSession) -> Result<EditingSession, SessionError>,
    ) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        let session = state.session.clone().ok_or(SessionError::NoImage)?;
        state.session = Some(edit(session)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropError;
    use crate::decode::Raster;
    use crate::encode::encode_png;
    use crate::export::MemorySink;
    use crate::filter::FilterError;
    use crate::transform::PixelCrop;
    use crate::EXPORT_FILENAME;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::Cell;

    fn poster_payload(width: u32, height: u32, seed: u8) -> String {
        let pixels: Vec<u8> = (0..width * height * 4)
            .map(|i| (i as u8).wrapping_mul(seed))
            .collect();
        let png = encode_png(&pixels, width, height).unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(png))
    }

    /// Replays a fixed result and counts calls.
    struct StubGenerator {
        result: RefCell<Result<String, GenerationError>>,
        calls: Cell<usize>,
    }

    impl StubGenerator {
        fn ok(payload: String) -> Self {
            Self {
                result: RefCell::new(Ok(payload)),
                calls: Cell::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: RefCell::new(Err(GenerationError::new(message))),
                calls: Cell::new(0),
            }
        }

        fn set(&self, result: Result<String, GenerationError>) {
            *self.result.borrow_mut() = result;
        }
    }

    impl ImageGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.set(self.calls.get() + 1);
            self.result.borrow().clone()
        }
    }

    /// Holds the first call open until the gate fires.
    struct GatedGenerator {
        gate: RefCell<Option<oneshot::Receiver<()>>>,
        payload: String,
    }

    impl ImageGenerator for GatedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let gate = self.gate.borrow_mut().take();
            if let Some(rx) = gate {
                rx.await.map_err(|_| GenerationError::unknown())?;
            }
            Ok(self.payload.clone())
        }
    }

    fn loaded() -> SessionController<StubGenerator> {
        let controller = SessionController::new(StubGenerator::ok(poster_payload(30, 20, 7)));
        block_on(controller.generate("a concert poster")).unwrap();
        controller.image_displayed(300.0, 200.0).unwrap();
        controller
    }

    fn export_bytes(controller: &SessionController<StubGenerator>) -> ExportArtifact {
        let mut sink = MemorySink::new();
        controller.export(&mut sink).unwrap();
        sink.last().unwrap().clone()
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let controller = SessionController::new(StubGenerator::ok(poster_payload(4, 4, 1)));

        for prompt in ["", "   \n\t"] {
            let err = block_on(controller.generate(prompt)).unwrap_err();
            assert!(matches!(err, SessionError::Validation(ValidationError::EmptyPrompt)));
        }
        assert_eq!(controller.last_error().as_deref(), Some("Prompt cannot be empty."));
        assert_eq!(controller.generator().calls.get(), 0);
        assert!(controller.session().is_none());
    }

    #[test]
    fn test_generate_installs_fresh_session() {
        let controller = SessionController::new(StubGenerator::ok(poster_payload(30, 20, 3)));
        block_on(controller.generate("poster")).unwrap();

        let session = controller.session().unwrap();
        assert_eq!((session.image().width, session.image().height), (30, 20));
        assert!(session.crop().is_none());
        assert!(session.active_filter().is_identity());
        assert!(!controller.is_loading());
        assert!(controller.last_error().is_none());
    }

    #[test]
    fn test_image_displayed_sets_default_crop() {
        let controller = loaded();
        let crop = controller.crop().unwrap();
        assert_eq!(crop, CropState::new(DisplaySize::new(300.0, 200.0)).unwrap());
    }

    #[test]
    fn test_generation_failure_keeps_previous_session() {
        let controller = loaded();
        controller.select_filter("Vintage").unwrap();
        controller.generator().set(Err(GenerationError::new("quota exceeded")));

        let err = block_on(controller.generate("again")).unwrap_err();
        assert!(matches!(err, SessionError::Generation(_)));
        assert_eq!(controller.last_error().as_deref(), Some("quota exceeded"));
        assert!(!controller.is_loading());
        assert_eq!(controller.active_filter().unwrap().name, "Vintage");
    }

    #[test]
    fn test_generation_error_without_message() {
        let controller = SessionController::new(StubGenerator::failing(""));
        block_on(controller.generate("poster")).unwrap_err();
        assert_eq!(controller.last_error().as_deref(), Some(UNKNOWN_ERROR_MESSAGE));
    }

    #[test]
    fn test_undecodable_payload() {
        let controller = SessionController::new(StubGenerator::ok("not an image".to_string()));
        let err = block_on(controller.generate("poster")).unwrap_err();

        assert!(matches!(err, SessionError::Generation(_)));
        assert!(controller.last_error().unwrap().starts_with("Generated image could not be decoded"));
        assert!(controller.session().is_none());
    }

    #[test]
    fn test_second_generate_rejected_while_in_flight() {
        let (tx, rx) = oneshot::channel();
        let controller = SessionController::new(GatedGenerator {
            gate: RefCell::new(Some(rx)),
            payload: poster_payload(12, 8, 5),
        });
        let controller = &controller;

        let (first, second) = block_on(async move {
            let first = controller.generate("first");
            let second = async move {
                assert!(controller.is_loading());
                let result = controller.generate("second").await;
                tx.send(()).unwrap();
                result
            };
            futures::join!(first, second)
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(SessionError::GenerationInFlight)));
        assert!(!controller.is_loading());
        assert_eq!(controller.session().unwrap().image().width, 12);
    }

    #[test]
    fn test_regenerate_resets_edits() {
        let controller = loaded();
        controller.select_filter("Grayscale").unwrap();
        controller
            .commit_crop(Crop::Pixel(PixelCrop::new(0.0, 0.0, 150.0, 100.0)))
            .unwrap();

        controller.generator().set(Ok(poster_payload(40, 40, 9)));
        block_on(controller.generate("another poster")).unwrap();

        let session = controller.session().unwrap();
        assert!(session.active_filter().is_identity());
        assert!(session.crop().is_none());
        assert_eq!(session.image().width, 40);

        controller.image_displayed(300.0, 300.0).unwrap();
        let expected = CropState::new(DisplaySize::new(300.0, 300.0)).unwrap();
        assert_eq!(controller.crop().unwrap(), expected);
        // 90% of 300 wide, centred vertically
        let completed = controller.crop().unwrap().completed();
        assert!((completed.width - 270.0).abs() < 1e-9);
        assert!((completed.x - 15.0).abs() < 1e-9);
        assert!((completed.y - (300.0 - 180.0) / 2.0).abs() < 1e-9);
        assert!(export_bytes(&controller).width > 0);
    }

    #[test]
    fn test_edits_require_image() {
        let controller = SessionController::new(StubGenerator::ok(poster_payload(4, 4, 1)));

        assert!(matches!(controller.select_filter("Grayscale"), Err(SessionError::NoImage)));
        assert!(matches!(controller.image_displayed(10.0, 10.0), Err(SessionError::NoImage)));
        assert!(controller.reset_edits().is_ok());

        let mut sink = MemorySink::new();
        assert!(matches!(
            controller.export(&mut sink),
            Err(SessionError::Export(ExportError::NotLoaded))
        ));
        assert!(sink.artifacts().is_empty());
    }

    #[test]
    fn test_crop_event_before_layout() {
        let controller = SessionController::new(StubGenerator::ok(poster_payload(4, 4, 1)));
        block_on(controller.generate("poster")).unwrap();

        let err = controller
            .update_crop(Crop::Pixel(PixelCrop::new(0.0, 0.0, 3.0, 2.0)))
            .unwrap_err();
        assert!(matches!(err, SessionError::Crop(CropError::NotDisplayed)));
    }

    #[test]
    fn test_unknown_filter_keeps_active() {
        let controller = loaded();
        controller.select_filter("Grayscale").unwrap();

        let err = controller.select_filter("Sparkle").unwrap_err();
        assert!(matches!(err, SessionError::Filter(FilterError::UnknownFilter(_))));
        assert_eq!(controller.active_filter().unwrap().name, "Grayscale");
    }

    #[test]
    fn test_rejected_crop_keeps_previous() {
        let controller = loaded();
        let before = controller.crop().unwrap();

        let err = controller
            .commit_crop(Crop::Pixel(PixelCrop::new(0.0, 0.0, 100.0, 100.0)))
            .unwrap_err();
        assert!(matches!(err, SessionError::Crop(CropError::AspectViolation { .. })));
        assert_eq!(controller.crop().unwrap(), before);
    }

    #[test]
    fn test_drag_does_not_move_export_region() {
        let controller = loaded();
        let committed = controller.crop().unwrap().completed();

        controller
            .update_crop(Crop::Pixel(PixelCrop::new(0.0, 0.0, 150.0, 100.0)))
            .unwrap();
        assert_eq!(controller.crop().unwrap().completed(), committed);
    }

    #[test]
    fn test_export_default_crop() {
        let controller = loaded();
        let artifact = export_bytes(&controller);

        // 90% of 300 = 270 displayed, one tenth of that natively
        assert_eq!((artifact.width, artifact.height), (27, 18));
        assert_eq!(artifact.filename, EXPORT_FILENAME);
        assert_eq!(artifact.mime_type, "image/png");
    }

    #[test]
    fn test_export_committed_crop_with_options() {
        let controller = loaded();
        controller
            .commit_crop(Crop::Pixel(PixelCrop::new(0.0, 0.0, 150.0, 100.0)))
            .unwrap();

        let options = ExportOptions {
            filename: "poster.png".to_string(),
        };
        let mut sink = MemorySink::new();
        controller.export_with(&options, &mut sink).unwrap();

        let artifact = sink.last().unwrap();
        assert_eq!((artifact.width, artifact.height), (15, 10));
        assert_eq!(artifact.filename, "poster.png");
    }

    #[test]
    fn test_repeated_filter_selection_is_idempotent() {
        let controller = loaded();
        controller.select_filter("Grayscale").unwrap();
        let once = export_bytes(&controller);
        controller.select_filter("Grayscale").unwrap();
        let twice = export_bytes(&controller);

        assert_eq!(once.bytes, twice.bytes);
    }

    #[test]
    fn test_reset_edits_restores_defaults() {
        let controller = loaded();
        let untouched = export_bytes(&controller);

        controller.select_filter("High Contrast").unwrap();
        controller
            .commit_crop(Crop::Pixel(PixelCrop::new(30.0, 30.0, 150.0, 100.0)))
            .unwrap();
        controller.reset_edits().unwrap();

        assert!(controller.active_filter().unwrap().is_identity());
        assert_eq!(export_bytes(&controller).bytes, untouched.bytes);
    }

    #[test]
    fn test_filter_changes_export() {
        let controller = loaded();
        let plain = export_bytes(&controller);
        controller.select_filter("Grayscale").unwrap();
        let gray = export_bytes(&controller);

        assert_ne!(plain.bytes, gray.bytes);
        let decoded = crate::decode::decode_image(&gray.bytes).unwrap();
        for px in decoded.pixels.chunks_exact(Raster::CHANNELS) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }

    #[test]
    fn test_render_export_does_not_need_sink() {
        let controller = loaded();
        let artifact = controller.render_export(&ExportOptions::default()).unwrap();
        assert!(artifact.data_url().starts_with("data:image/png;base64,"));
    }
}
