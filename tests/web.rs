#![cfg(target_arch = "wasm32")]

use voronoi_backdrop::theme::{builtin_themes, StyleKey, StyleSink, StyleStrategy, ThemeManager};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

struct RootStyle(web_sys::CssStyleDeclaration);

impl StyleSink for RootStyle {
    fn set(&mut self, key: StyleKey, value: &str) {
        self.0
            .set_property(&format!("--{}", key.name()), value)
            .unwrap();
    }
}

fn root_style() -> web_sys::CssStyleDeclaration {
    web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .document_element()
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap()
        .style()
}

#[wasm_bindgen_test]
fn derived_style_lands_in_css_variables() {
    let mut themes = ThemeManager::new(builtin_themes(), 0, StyleStrategy::Chrome).unwrap();
    let mut sink = RootStyle(root_style());
    themes.advance().publish(&mut sink);

    let style = root_style();
    assert_eq!(style.get_property_value("--accent").unwrap(), "#e68a2e");
    assert_eq!(
        style.get_property_value("--header-background").unwrap(),
        "rgba(230, 138, 46, 0.8)"
    );
}

#[wasm_bindgen_test]
fn canvas_accepts_viewport_size() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas.set_width(800);
    canvas.set_height(600);

    let rect = canvas.get_bounding_client_rect();
    assert!(rect.width() > 0.0 && rect.height() > 0.0);
}
