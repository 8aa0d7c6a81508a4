#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated page backdrop: a Voronoi pattern field, a morphing polygon
//! overlay, and a cycling color theme that also restyles the page chrome.
//!
//! The core modules are plain Rust and build on any target. The browser glue
//! in `wasm` is compiled only for `wasm32`.

pub mod app;
pub mod color;
pub mod config;
pub mod error;
pub mod frame;
pub mod pattern;
pub mod shapes;
pub mod theme;

pub use app::{Backdrop, FrameOutput};
pub use config::VizConfig;
pub use error::VizError;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod dom;
    mod gl;
    mod render;
    mod surface;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let level = if cfg!(debug_assertions) {
            log::Level::Debug
        } else {
            log::Level::Info
        };
        console_log::init_with_level(level).ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id("glcanvas")
            .ok_or("canvas not found")?
            .dyn_into::<web_sys::HtmlCanvasElement>()?;

        render::start(window, document, canvas)?;
        Ok(())
    }
}
