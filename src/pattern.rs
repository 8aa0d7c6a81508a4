//! Cellular (Voronoi) pattern field.
//!
//! [`shade`] is the CPU form of the fragment shader in `wasm::gl`: the same
//! algorithm with the same constants. The CPU path runs in `f64` while the
//! shader runs in `highp` `f32`, so the cell hashes (and with them individual
//! cell colors) can differ between the two paths.
//!
//! # Determinism
//!
//! The field is a pure function of `(pixel, params)`. There is no cache and no
//! hidden state, so every frame re-evaluates every pixel.

use std::fmt;

use log::warn;

use crate::color::Rgb;

/// Smallest accepted pixelation step. Anything lower is clamped to this.
pub const MIN_PIXELATION: f64 = 1e-3;
/// Feature density multiplier applied after quantization.
pub const MAGNIFICATION: f64 = 6.0;
/// Angular span of the animated cell offset (the shader literal, not `TAU`).
pub const PHASE_SPAN: f64 = 6.2831;
const HASH_SCALE: f64 = 43758.5453;
const SEARCH_RADIUS: i32 = 2;
const INITIAL_MIN_DISTANCE: f64 = 8.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// An output buffer did not hold exactly `width * height * 4` bytes.
    BufferSize { expected: usize, actual: usize },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferSize { expected, actual } => {
                write!(f, "RGBA buffer holds {actual} bytes, expected {expected}")
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// Everything the pattern needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternParameters {
    pub resolution: (u32, u32),
    pixelation: f64,
    pub base_color: [f64; 3],
    pub accent_color: [f64; 3],
    pub scale: f64,
    pub speed: f64,
    /// Seconds since the loop started.
    pub time: f64,
}

/// Uniform values in the layout the shader declares them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniforms {
    pub resolution: [f32; 2],
    pub pixelation: f32,
    pub color1: [f32; 3],
    pub color2: [f32; 3],
    pub scale: f32,
    pub speed: f32,
    pub time: f32,
}

impl Default for PatternParameters {
    fn default() -> Self {
        Self {
            resolution: (1, 1),
            pixelation: 0.1,
            base_color: [0.0; 3],
            accent_color: [1.0; 3],
            scale: -0.44,
            speed: 0.1,
            time: 0.0,
        }
    }
}

impl PatternParameters {
    /// Defaults for everything but the viewport and the (clamped) pixelation.
    pub fn new(resolution: (u32, u32), pixelation: f64) -> Self {
        Self {
            resolution,
            pixelation: sanitize_pixelation(pixelation),
            ..Self::default()
        }
    }

    pub fn pixelation(&self) -> f64 {
        self.pixelation
    }

    /// Set the pixelation step, clamping invalid values to [`MIN_PIXELATION`].
    pub fn set_pixelation(&mut self, step: f64) {
        self.pixelation = sanitize_pixelation(step);
    }

    pub fn set_accent(&mut self, accent: Rgb) {
        self.accent_color = accent.to_unit();
    }

    pub fn uniforms(&self) -> Uniforms {
        let c = |v: [f64; 3]| [v[0] as f32, v[1] as f32, v[2] as f32];
        Uniforms {
            resolution: [self.resolution.0 as f32, self.resolution.1 as f32],
            pixelation: self.pixelation as f32,
            color1: c(self.base_color),
            color2: c(self.accent_color),
            scale: self.scale as f32,
            speed: self.speed as f32,
            time: self.time as f32,
        }
    }
}

pub(crate) fn sanitize_pixelation(step: f64) -> f64 {
    if step.is_finite() && step >= MIN_PIXELATION {
        step
    } else {
        warn!("pixelation step {step} is invalid; clamping to {MIN_PIXELATION}");
        MIN_PIXELATION
    }
}

#[inline]
fn fract(x: f64) -> f64 {
    x - x.floor()
}

#[inline]
pub fn hash1(n: f64) -> f64 {
    fract(n.sin() * HASH_SCALE)
}

#[inline]
pub fn hash2(x: f64, y: f64) -> (f64, f64) {
    let a = x * 127.1 + y * 311.7;
    let b = x * 269.5 + y * 183.3;
    (fract(a.sin() * HASH_SCALE), fract(b.sin() * HASH_SCALE))
}

/// Nearest animated feature point around `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHit {
    pub distance: f64,
    /// Integer coordinate of the winning cell.
    pub cell: (f64, f64),
}

/// Search the 5x5 cell neighbourhood of `(x, y)` for the closest feature point.
pub fn nearest_cell(x: f64, y: f64, time: f64, speed: f64) -> CellHit {
    let (nx, ny) = (x.floor(), y.floor());
    let (fx, fy) = (x - nx, y - ny);
    let phase = time * speed;

    let mut best = CellHit {
        distance: INITIAL_MIN_DISTANCE,
        cell: (nx, ny),
    };
    for j in -SEARCH_RADIUS..=SEARCH_RADIUS {
        for i in -SEARCH_RADIUS..=SEARCH_RADIUS {
            let (gx, gy) = (f64::from(i), f64::from(j));
            let (ox, oy) = hash2(nx + gx, ny + gy);
            let ox = 0.5 + 0.5 * (phase + PHASE_SPAN * ox).sin();
            let oy = 0.5 + 0.5 * (phase + PHASE_SPAN * oy).sin();
            let dx = gx - fx + ox;
            let dy = gy - fy + oy;
            let d = (dx * dx + dy * dy).sqrt();
            if d < best.distance {
                best = CellHit {
                    distance: d,
                    cell: (nx + gx, ny + gy),
                };
            }
        }
    }
    best
}

/// Color of the field at fragment coordinate `(frag_x, frag_y)`.
///
/// Fragment coordinates have their origin at the bottom-left corner and
/// sample pixel centers at `n + 0.5`, matching `gl_FragCoord`.
pub fn shade(frag_x: f64, frag_y: f64, params: &PatternParameters) -> [f64; 3] {
    let h = f64::from(params.resolution.1);
    if h <= 0.0 {
        return params.base_color;
    }
    let px = frag_x / h * params.scale;
    let py = frag_y / h * params.scale;

    let cells = h / params.pixelation;
    let px = (px * cells).floor() / cells;
    let py = (py * cells).floor() / cells;

    let hit = nearest_cell(
        MAGNIFICATION * px,
        MAGNIFICATION * py,
        params.time,
        params.speed,
    );
    let blend = hash1(hit.cell.0 * 7.0 + hit.cell.1 * 113.0) * 0.5 + 0.5;

    let mut out = [0.0; 3];
    for (k, channel) in out.iter_mut().enumerate() {
        let a = params.base_color[k];
        let b = params.accent_color[k];
        let mixed = a + (b - a) * blend;
        *channel = (mixed * mixed).sqrt();
    }
    out
}

/// Color of pixel `(x, y)` in fragment space (bottom-left origin).
pub fn shade_pixel(x: u32, y: u32, params: &PatternParameters) -> [f64; 3] {
    shade(f64::from(x) + 0.5, f64::from(y) + 0.5, params)
}

/// Fill a top-down RGBA8 buffer with one frame of the pattern.
///
/// Rows are flipped so row 0 of `out` is the top of the viewport, as canvas
/// `ImageData` expects.
pub fn rasterize(params: &PatternParameters, out: &mut [u8]) -> Result<(), PatternError> {
    let (w, h) = params.resolution;
    let expected = w as usize * h as usize * 4;
    if out.len() != expected {
        return Err(PatternError::BufferSize {
            expected,
            actual: out.len(),
        });
    }
    if w == 0 {
        return Ok(());
    }
    for (row, line) in out.chunks_exact_mut(w as usize * 4).enumerate() {
        let y = h - 1 - row as u32;
        for (x, px) in line.chunks_exact_mut(4).enumerate() {
            let c = shade_pixel(x as u32, y, params);
            px[0] = to_byte(c[0]);
            px[1] = to_byte(c[1]);
            px[2] = to_byte(c[2]);
            px[3] = 255;
        }
    }
    Ok(())
}

#[inline]
fn to_byte(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
