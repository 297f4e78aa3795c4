//! Browser downloads through a temporary anchor element.

use posterlab_core::export::{DownloadSink, ExportArtifact, SinkError};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlAnchorElement;

/// [`DownloadSink`] that triggers a browser download.
///
/// Builds an `<a download>` pointing at the artifact's `data:` URL, clicks it
/// and removes it again.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownload;

impl DownloadSink for BrowserDownload {
    fn save(&mut self, artifact: &ExportArtifact) -> Result<(), SinkError> {
        let failed = |message: String| SinkError::Write {
            filename: artifact.filename.clone(),
            message,
        };

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| failed("no document available".to_string()))?;
        let body = document
            .body()
            .ok_or_else(|| failed("document has no body".to_string()))?;

        let anchor: HtmlAnchorElement = document
            .create_element("a")
            .map_err(|e| failed(js_message(&e)))?
            .dyn_into()
            .map_err(|_| failed("created element is not an anchor".to_string()))?;
        anchor.set_href(&artifact.data_url());
        anchor.set_download(&artifact.filename);
        let _ = anchor.set_attribute("style", "display:none;");

        body.append_child(&anchor).map_err(|e| failed(js_message(&e)))?;
        anchor.click();
        anchor.remove();
        Ok(())
    }
}

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}
