use log::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CssStyleDeclaration, Document, Element, HtmlCanvasElement, HtmlElement, Window};

use crate::config::VizConfig;
use crate::error::VizError;
use crate::theme::{StyleKey, StyleSink};

/// Attribute on the pattern canvas holding optional JSON config.
pub const CONFIG_ATTR: &str = "data-config";

pub fn viewport_size(window: &Window) -> Result<(u32, u32), JsValue> {
    let w = window.inner_width()?.as_f64().unwrap_or(0.0);
    let h = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok((w.max(0.0) as u32, h.max(0.0) as u32))
}

pub fn read_config(canvas: &HtmlCanvasElement) -> VizConfig {
    match canvas.get_attribute(CONFIG_ATTR) {
        None => VizConfig::default(),
        Some(text) => VizConfig::from_json(&text).unwrap_or_else(|e| {
            warn!("{e}; using defaults");
            VizConfig::default()
        }),
    }
}

/// Look up an optional element, warning when it is missing.
pub fn optional_element(document: &Document, id: &str) -> Option<Element> {
    let el = document.get_element_by_id(id);
    if el.is_none() {
        warn!("#{id} not found; feature disabled");
    }
    el
}

pub fn optional_canvas(document: &Document, id: &str) -> Option<HtmlCanvasElement> {
    optional_element(document, id)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| warn!("#{id} is not a <canvas>"))
        .ok()
}

/// CSS custom properties on the document root.
pub struct CssVars {
    style: CssStyleDeclaration,
}

impl CssVars {
    pub fn new(document: &Document) -> Result<Self, VizError> {
        let root = document
            .document_element()
            .ok_or_else(|| VizError::Dom("document has no root element".into()))?
            .dyn_into::<HtmlElement>()
            .map_err(|_| VizError::Dom("root element is not an HTMLElement".into()))?;
        Ok(Self {
            style: root.style(),
        })
    }
}

impl StyleSink for CssVars {
    fn set(&mut self, key: StyleKey, value: &str) {
        let name = format!("--{}", key.name());
        if let Err(e) = self.style.set_property(&name, value) {
            warn!("failed to set {name}: {e:?}");
        }
    }
}
