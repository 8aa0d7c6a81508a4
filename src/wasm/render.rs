use std::cell::RefCell;
use std::rc::Rc;

use log::{error, warn};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, Window};

use super::dom::{self, CssVars};
use super::gl::PatternRenderer;
use super::surface::CanvasSurface;
use crate::app::Backdrop;
use crate::frame::fps_label;

/// Everything the browser callbacks share.
struct Scene {
    backdrop: Backdrop,
    pattern_canvas: HtmlCanvasElement,
    pattern: Option<PatternRenderer>,
    overlay_canvas: Option<HtmlCanvasElement>,
    overlay: Option<CanvasSurface>,
    fps_readout: Option<Element>,
    css: Option<CssVars>,
}

impl Scene {
    fn resize(&mut self, width: u32, height: u32) {
        self.pattern_canvas.set_width(width);
        self.pattern_canvas.set_height(height);
        if let Some(canvas) = &self.overlay_canvas {
            canvas.set_width(width);
            canvas.set_height(height);
        }
        self.backdrop.resize(width, height);
    }

    fn publish_style(&mut self) {
        if let Some(css) = &mut self.css {
            self.backdrop.publish_style(css);
        }
    }

    fn toggle_theme(&mut self) {
        self.backdrop.toggle_theme();
        self.publish_style();
    }

    fn tick(&mut self, now_ms: f64) {
        let out = self.backdrop.frame(now_ms);
        if let Some(pattern) = &mut self.pattern {
            pattern.draw(self.backdrop.pattern());
        }
        if let Some(surface) = &mut self.overlay {
            self.backdrop.draw_shapes(surface);
        }
        if let (Some(fps), Some(el)) = (out.fps, &self.fps_readout) {
            el.set_text_content(Some(&fps_label(fps)));
        }
    }
}

/// Build the scene, hook up browser events and start the animation loop.
pub fn start(win: Window, document: Document, canvas: HtmlCanvasElement) -> Result<(), JsValue> {
    let config = dom::read_config(&canvas);
    let (width, height) = dom::viewport_size(&win)?;

    let overlay_canvas = if config.shapes {
        dom::optional_canvas(&document, "shapes")
    } else {
        None
    };
    let overlay = overlay_canvas.as_ref().and_then(|c| {
        c.get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()
            .map(CanvasSurface::new)
    });

    let pattern = match PatternRenderer::new(&canvas) {
        Ok(p) => Some(p),
        Err(e) => {
            error!("pattern engine disabled: {e}");
            None
        }
    };
    let css = CssVars::new(&document)
        .map_err(|e| warn!("style publication disabled: {e}"))
        .ok();

    let scene = Rc::new(RefCell::new(Scene {
        backdrop: Backdrop::new(config, width, height)?,
        pattern_canvas: canvas,
        pattern,
        overlay_canvas,
        overlay,
        fps_readout: dom::optional_element(&document, "fps"),
        css,
    }));
    {
        let mut s = scene.borrow_mut();
        s.resize(width, height);
        s.publish_style();
    }

    // Resize canvases to fit window
    let resize_closure = {
        let scene = scene.clone();
        Closure::wrap(Box::new(move || {
            let Some(win) = window() else { return };
            match dom::viewport_size(&win) {
                Ok((w, h)) => scene.borrow_mut().resize(w, h),
                Err(e) => warn!("viewport size unavailable: {e:?}"),
            }
        }) as Box<dyn FnMut()>)
    };
    for event in ["resize", "orientationchange"] {
        win.add_event_listener_with_callback(event, resize_closure.as_ref().unchecked_ref())?;
    }
    resize_closure.forget();

    let scroll_closure = {
        let scene = scene.clone();
        Closure::wrap(Box::new(move || {
            if let Some(y) = window().and_then(|w| w.scroll_y().ok()) {
                scene.borrow_mut().backdrop.set_scroll(y);
            }
        }) as Box<dyn FnMut()>)
    };
    win.add_event_listener_with_callback("scroll", scroll_closure.as_ref().unchecked_ref())?;
    scroll_closure.forget();

    if let Some(button) = dom::optional_element(&document, "themeToggle") {
        let scene = scene.clone();
        let click = Closure::wrap(Box::new(move || {
            scene.borrow_mut().toggle_theme();
        }) as Box<dyn FnMut()>);
        button.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        click.forget();
    }

    // Animation loop. `f` owns the frame callback so it can re-register
    // itself each tick; the `Option` is filled once the closure exists.
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        scene.borrow_mut().tick(now);

        // schedule next
        if let Some(cb) = f.borrow().as_ref() {
            if let Err(e) = request_frame(cb) {
                error!("requestAnimationFrame failed; animation stopped: {e:?}");
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(cb) = g.borrow().as_ref() {
        request_frame(cb)?;
    }
    Ok(())
}

fn request_frame(cb: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window()
        .ok_or("no window")?
        .request_animation_frame(cb.as_ref().unchecked_ref())
}
