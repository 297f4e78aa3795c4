//! Editing session WASM bindings.
//!
//! [`PosterSession`] wraps the core `SessionController` for the UI shell.
//! Crops cross the boundary as plain objects tagged with their unit:
//!
//! ```typescript
//! { unit: '%', x: 5, y: 5, width: 90, height: 60 }
//! { unit: 'px', x: 100, y: 50, width: 300, height: 200 }
//! ```
//!
//! # Example
//!
//! ```typescript
//! import { PosterSession } from '@posterlab/wasm';
//!
//! const session = new PosterSession((prompt) => callModel(prompt));
//! await session.generate('a backstage concert poster');
//! session.image_displayed(img.width, img.height);
//! session.select_filter('Vintage');
//! session.export(); // downloads edited-backstage-poster.png
//! ```

use std::rc::Rc;

use js_sys::{Function, Promise};
use posterlab_core::export::ExportOptions;
use posterlab_core::{Crop, SessionController, SessionError};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::download::BrowserDownload;
use crate::generator::JsGenerator;

/// Session wrapper for JavaScript.
#[wasm_bindgen]
pub struct PosterSession {
    inner: Rc<SessionController<JsGenerator>>,
}

#[wasm_bindgen]
impl PosterSession {
    /// Create a session around a `(prompt) => Promise<string>` generator.
    #[wasm_bindgen(constructor)]
    pub fn new(generate: Function) -> PosterSession {
        PosterSession {
            inner: Rc::new(SessionController::new(JsGenerator::new(generate))),
        }
    }

    /// Generate a new image. Resolves once the session holds it.
    ///
    /// Rejects with a message for an empty prompt, a failed generation or a
    /// generation that is already running.
    pub fn generate(&self, prompt: String) -> Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            inner
                .generate(&prompt)
                .await
                .map(|()| JsValue::UNDEFINED)
                .map_err(|e| to_js_error(&e))
        })
    }

    /// Report the laid-out size of the image element.
    pub fn image_displayed(&self, width: f64, height: f64) -> Result<(), JsValue> {
        self.inner
            .image_displayed(width, height)
            .map_err(|e| to_js_error(&e))
    }

    /// Restore the default crop and the identity filter.
    pub fn reset_edits(&self) -> Result<(), JsValue> {
        self.inner.reset_edits().map_err(|e| to_js_error(&e))
    }

    /// Select a filter by name; returns `{ name, directive }`.
    pub fn select_filter(&self, name: &str) -> Result<JsValue, JsValue> {
        let filter = self.inner.select_filter(name).map_err(|e| to_js_error(&e))?;
        to_js(&filter)
    }

    /// Mid-drag crop update.
    pub fn update_crop(&self, crop: JsValue) -> Result<(), JsValue> {
        let crop = crop_from_js(crop)?;
        self.inner.update_crop(crop).map_err(|e| to_js_error(&e))
    }

    /// Crop committed at the end of an interaction.
    pub fn commit_crop(&self, crop: JsValue) -> Result<(), JsValue> {
        let crop = crop_from_js(crop)?;
        self.inner.commit_crop(crop).map_err(|e| to_js_error(&e))
    }

    /// Export the cropped, filtered image as a browser download.
    ///
    /// `options` may be omitted or `{ filename }`. Returns `false` without
    /// downloading when there is nothing to export yet; the reason goes to
    /// the console. Other failures still throw.
    pub fn export(&self, options: JsValue) -> Result<bool, JsValue> {
        let options = options_from_js(options)?;
        let outcome = self.inner.export_with(&options, &mut BrowserDownload);
        refusal_as_none(outcome)
            .map(|done| done.is_some())
            .map_err(|e| to_js_error(&e))
    }

    /// Export to PNG bytes without downloading.
    ///
    /// `undefined` when there is nothing to export yet, as for `export`.
    pub fn export_bytes(&self, options: JsValue) -> Result<Option<Vec<u8>>, JsValue> {
        let options = options_from_js(options)?;
        let outcome = self.inner.render_export(&options);
        refusal_as_none(outcome)
            .map(|artifact| artifact.map(|a| a.bytes))
            .map_err(|e| to_js_error(&e))
    }

    /// Whether a generation is running.
    #[wasm_bindgen(getter)]
    pub fn loading(&self) -> bool {
        self.inner.is_loading()
    }

    /// Message of the last failure, if any.
    #[wasm_bindgen(getter)]
    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error()
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.session().is_some()
    }

    /// Active filter as `{ name, directive }`, or `null` without an image.
    #[wasm_bindgen(getter)]
    pub fn active_filter(&self) -> Result<JsValue, JsValue> {
        match self.inner.active_filter() {
            Some(filter) => to_js(&filter),
            None => Ok(JsValue::NULL),
        }
    }

    /// Current crop in percent units, or `null` before layout.
    #[wasm_bindgen(getter)]
    pub fn crop(&self) -> Result<JsValue, JsValue> {
        match self.inner.crop() {
            Some(state) => to_js(&Crop::Percent(state.percent())),
            None => Ok(JsValue::NULL),
        }
    }

    /// Committed crop in displayed pixels, or `null` before layout.
    #[wasm_bindgen(getter)]
    pub fn completed_crop(&self) -> Result<JsValue, JsValue> {
        match self.inner.crop() {
            Some(state) => to_js(&Crop::Pixel(state.completed())),
            None => Ok(JsValue::NULL),
        }
    }
}

/// User-facing text for a session failure.
pub(crate) fn error_message(err: &SessionError) -> String {
    err.to_string()
}

/// Turn export refusals into `None`. The core has already logged them.
pub(crate) fn refusal_as_none<T>(outcome: Result<T, SessionError>) -> Result<Option<T>, SessionError> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(SessionError::Export(err)) if err.is_precondition() => Ok(None),
        Err(err) => Err(err),
    }
}

fn to_js_error(err: &SessionError) -> JsValue {
    JsValue::from_str(&error_message(err))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn crop_from_js(value: JsValue) -> Result<Crop, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid crop: {}", e)))
}

fn options_from_js(value: JsValue) -> Result<ExportOptions, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(ExportOptions::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid export options: {}", e)))
}
