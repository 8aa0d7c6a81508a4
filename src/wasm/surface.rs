use log::warn;
use web_sys::CanvasRenderingContext2d;

use crate::color::Rgb;
use crate::shapes::Surface;

/// [`Surface`] over a canvas 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn fill_vertical_gradient(
        &mut self,
        width: f64,
        height: f64,
        start: Rgb,
        end: Rgb,
        alpha: f64,
    ) {
        let gradient = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, height);
        let stops = gradient
            .add_color_stop(0.0, &start.to_hex())
            .and_then(|()| gradient.add_color_stop(1.0, &end.to_hex()));
        if let Err(e) = stops {
            warn!("gradient stop rejected: {e:?}");
            return;
        }
        self.ctx.save();
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.fill_rect(0.0, 0.0, width, height);
        self.ctx.restore();
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)], fill: &str) {
        let Some((&(x0, y0), rest)) = points.split_first() else {
            return;
        };
        self.ctx.begin_path();
        self.ctx.move_to(x0, y0);
        for &(x, y) in rest {
            self.ctx.line_to(x, y);
        }
        self.ctx.close_path();
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill();
    }
}
