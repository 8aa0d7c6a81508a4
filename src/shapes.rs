//! Grid of drifting, morphing translucent polygons.
//!
//! The field is rebuilt from scratch whenever the viewport size changes and is
//! stepped once per frame. Positions wrap toroidally with a one-radius margin
//! so shapes leave one edge and re-enter from the opposite edge.

use std::f64::consts::TAU;

use log::debug;

use crate::color::Rgb;
use crate::config::VizConfig;

pub const MIN_SIDES: u8 = 3;
pub const MAX_SIDES: u8 = 6;
/// Smallest shape radius accepted from config, in px.
pub const MIN_RADIUS: f64 = 1.0;
pub const MIN_SPACING_FACTOR: f64 = 1.0;
/// Lattice pitch floor in px; bounds the shape count for any radius.
pub const MIN_SPACING: f64 = 8.0;

/// Scroll bonus added to the phase rate at full scroll.
const PHASE_SCROLL_BONUS: f64 = 0.02;
/// Scroll bonus added to the morph rate at full scroll.
const MORPH_SCROLL_BONUS: f64 = 0.01;
const BASE_ALPHA: f64 = 0.2;
const SCROLL_ALPHA: f64 = 0.3;

/// 2D immediate-mode drawing target for the shape field.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    /// Fill the whole surface with a top-to-bottom gradient.
    fn fill_vertical_gradient(&mut self, width: f64, height: f64, start: Rgb, end: Rgb, alpha: f64);
    /// Fill a closed polygon. `fill` is a CSS color string.
    fn fill_polygon(&mut self, points: &[(f64, f64)], fill: &str);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeParams {
    pub radius: f64,
    pub spacing_factor: f64,
    pub max_speed: f64,
    pub stagger_frames: u32,
    pub fade_step: f64,
    pub phase_rate: f64,
    pub morph_rate: f64,
}

impl ShapeParams {
    pub fn spacing(&self) -> f64 {
        let spacing = self.radius * self.spacing_factor;
        if spacing.is_finite() {
            spacing.max(MIN_SPACING)
        } else {
            MIN_SPACING
        }
    }
}

impl Default for ShapeParams {
    fn default() -> Self {
        Self::from(&VizConfig::default())
    }
}

impl From<&VizConfig> for ShapeParams {
    fn from(cfg: &VizConfig) -> Self {
        Self {
            radius: cfg.shape_radius,
            spacing_factor: cfg.spacing_factor,
            max_speed: cfg.max_speed,
            stagger_frames: cfg.stagger_frames,
            fade_step: cfg.fade_step,
            phase_rate: cfg.phase_rate,
            morph_rate: cfg.morph_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub phase: f64,
    pub current_sides: u8,
    pub target_sides: u8,
    /// In `[0, 1)`.
    pub morph: f64,
    pub spawn_delay: u64,
    pub visible: bool,
    pub opacity: f64,
}

impl Shape {
    /// Interpolated vertex count; fractional while morphing.
    pub fn sides(&self) -> f64 {
        let a = f64::from(self.current_sides);
        let b = f64::from(self.target_sides);
        a + (b - a) * self.morph
    }

    /// Regular polygon with `sides()` vertices, rotated by `phase`.
    ///
    /// A fractional count keeps the `2π / n` step, so the last edge is short
    /// and the outline blends between neighbouring polygons.
    pub fn vertices(&self, radius: f64) -> Vec<(f64, f64)> {
        let n = self.sides();
        let step = TAU / n;
        (0..n.ceil() as usize)
            .map(|i| {
                let a = self.phase + i as f64 * step;
                (self.x + radius * a.cos(), self.y + radius * a.sin())
            })
            .collect()
    }

    /// Move the shape to the opposite edge once it is `margin` past a bound.
    pub fn wrap(&mut self, width: f64, height: f64, margin: f64) {
        if self.x > width + margin {
            self.x = -margin;
        } else if self.x < -margin {
            self.x = width + margin;
        }
        if self.y > height + margin {
            self.y = -margin;
        } else if self.y < -margin {
            self.y = height + margin;
        }
    }
}

/// Colors and scroll state used for one draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub accent: Rgb,
    pub gradient: Option<(Rgb, Rgb)>,
    pub gradient_alpha: f64,
    pub scroll_factor: f64,
}

impl ShapeStyle {
    pub fn fill_alpha(&self, opacity: f64) -> f64 {
        opacity * (BASE_ALPHA + self.scroll_factor * SCROLL_ALPHA)
    }
}

pub struct ShapeField {
    params: ShapeParams,
    width: f64,
    height: f64,
    frame: u64,
    shapes: Vec<Shape>,
    rng: fastrand::Rng,
}

impl ShapeField {
    pub fn new(params: ShapeParams, rng: fastrand::Rng) -> Self {
        Self {
            params,
            width: 0.0,
            height: 0.0,
            frame: 0,
            shapes: Vec::new(),
            rng,
        }
    }

    pub fn params(&self) -> &ShapeParams {
        &self.params
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Lattice dimensions `(cols, rows)` for a viewport, margin included.
    pub fn grid_dims(&self, width: f64, height: f64) -> (usize, usize) {
        let spacing = self.params.spacing();
        let cols = ((width / spacing).ceil().max(0.0) as usize).saturating_add(1);
        let rows = ((height / spacing).ceil().max(0.0) as usize).saturating_add(1);
        (cols, rows)
    }

    /// Rebuild the grid for a new viewport, discarding all shape state.
    pub fn generate(&mut self, width: f64, height: f64) {
        let (cols, rows) = self.grid_dims(width, height);
        let spacing = self.params.spacing();
        let p = self.params;
        let rng = &mut self.rng;

        self.width = width;
        self.height = height;
        self.frame = 0;
        self.shapes = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .enumerate()
            .map(|(index, (row, col))| Shape {
                x: col as f64 * spacing,
                y: row as f64 * spacing,
                dx: (rng.f64() * 2.0 - 1.0) * p.max_speed,
                dy: (rng.f64() * 2.0 - 1.0) * p.max_speed,
                phase: rng.f64() * TAU,
                current_sides: rng.u8(MIN_SIDES..=MAX_SIDES),
                target_sides: rng.u8(MIN_SIDES..=MAX_SIDES),
                morph: 0.0,
                spawn_delay: index as u64 * u64::from(p.stagger_frames),
                visible: false,
                opacity: 0.0,
            })
            .collect();
        debug!(
            "shape field regenerated: {cols}x{rows} = {} shapes for {width}x{height}",
            self.shapes.len()
        );
    }

    /// Regenerate only if the viewport size changed. Returns whether it did.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        if width == self.width && height == self.height && !self.shapes.is_empty() {
            return false;
        }
        self.generate(width, height);
        true
    }

    /// Advance every shape by one frame.
    pub fn update(&mut self, scroll_factor: f64) {
        let p = self.params;
        let (w, h) = (self.width, self.height);
        let frame = self.frame;
        let phase_step = p.phase_rate + scroll_factor * PHASE_SCROLL_BONUS;
        let morph_step = p.morph_rate + scroll_factor * MORPH_SCROLL_BONUS;
        let drift = 1.0 + scroll_factor;

        for shape in &mut self.shapes {
            if !shape.visible {
                if frame < shape.spawn_delay {
                    continue;
                }
                shape.visible = true;
            }

            shape.phase += phase_step;
            shape.x += shape.dx * drift;
            shape.y += shape.dy * drift;
            shape.opacity = (shape.opacity + p.fade_step).min(1.0);
            shape.wrap(w, h, p.radius);

            shape.morph += morph_step;
            if shape.morph >= 1.0 {
                shape.current_sides = shape.target_sides;
                shape.target_sides = self.rng.u8(MIN_SIDES..=MAX_SIDES);
                shape.morph = 0.0;
            }
        }
        self.frame += 1;
    }

    /// Redraw the whole field.
    pub fn draw(&self, surface: &mut impl Surface, style: &ShapeStyle) {
        surface.clear(self.width, self.height);
        if let Some((start, end)) = style.gradient {
            if style.gradient_alpha > 0.0 {
                surface.fill_vertical_gradient(
                    self.width,
                    self.height,
                    start,
                    end,
                    style.gradient_alpha,
                );
            }
        }
        for shape in self.shapes.iter().filter(|s| s.visible) {
            let alpha = style.fill_alpha(shape.opacity);
            if alpha <= 0.0 {
                continue;
            }
            let points = shape.vertices(self.params.radius);
            surface.fill_polygon(&points, &style.accent.to_rgba(alpha));
        }
    }
}
