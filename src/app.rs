//! Host-driven scene state.
//!
//! [`Backdrop`] owns everything that changes between frames. The wasm layer
//! forwards browser events and animation-frame timestamps into it and reads
//! back what to draw, which keeps this module testable without a browser.

use log::{info, warn};

use crate::config::VizConfig;
use crate::error::VizError;
use crate::frame::{scroll_factor, FpsCounter};
use crate::pattern::PatternParameters;
use crate::shapes::{ShapeField, ShapeParams, ShapeStyle, Surface};
use crate::theme::{DerivedStyle, StyleSink, ThemeManager};

/// Result of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Pattern time in seconds.
    pub time: f64,
    /// Set when a new FPS sample is available.
    pub fps: Option<u32>,
}

pub struct Backdrop {
    config: VizConfig,
    themes: ThemeManager,
    pattern: PatternParameters,
    shapes: ShapeField,
    fps: Option<FpsCounter>,
    scroll_y: f64,
}

impl Backdrop {
    pub fn new(config: VizConfig, width: u32, height: u32) -> Result<Self, VizError> {
        let config = config.sanitized();
        let list = config.theme_list();
        let themes = match config.theme {
            Some(i) if i < list.len() => ThemeManager::new(list, i, config.style_strategy)?,
            Some(i) => {
                warn!("configured theme {i} out of range; picking one at random");
                ThemeManager::with_random_start(list, config.style_strategy)?
            }
            None => ThemeManager::with_random_start(list, config.style_strategy)?,
        };

        let rng = config.seed.map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        let mut shapes = ShapeField::new(ShapeParams::from(&config), rng);
        if config.shapes {
            shapes.generate(f64::from(width), f64::from(height));
        }
        let pattern = config.pattern_parameters(width, height, themes.active().accent);

        info!(
            "backdrop ready: {width}x{height}, theme {} ({}), {} shapes",
            themes.active().name,
            themes.style().accent,
            shapes.shapes().len()
        );
        Ok(Self {
            config,
            themes,
            pattern,
            shapes,
            fps: None,
            scroll_y: 0.0,
        })
    }

    pub fn config(&self) -> &VizConfig {
        &self.config
    }

    pub fn pattern(&self) -> &PatternParameters {
        &self.pattern
    }

    pub fn shapes(&self) -> &ShapeField {
        &self.shapes
    }

    pub fn themes(&self) -> &ThemeManager {
        &self.themes
    }

    pub fn style(&self) -> &DerivedStyle {
        self.themes.style()
    }

    /// New viewport size. Takes effect before the next evaluation.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.pattern.resolution = (width, height);
        if self.config.shapes {
            self.shapes.resize(f64::from(width), f64::from(height));
        }
    }

    pub fn set_scroll(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    pub fn scroll_factor(&self) -> f64 {
        scroll_factor(self.scroll_y, f64::from(self.pattern.resolution.1))
    }

    /// Advance to the next theme and push its accent into the pattern.
    pub fn toggle_theme(&mut self) -> &DerivedStyle {
        self.themes.advance();
        self.pattern.set_accent(self.themes.active().accent);
        self.themes.style()
    }

    /// Activate a specific theme. `Ok(None)` when nothing changed.
    pub fn apply_theme(&mut self, index: usize) -> Result<Option<&DerivedStyle>, VizError> {
        if self.themes.apply(index)?.is_none() {
            return Ok(None);
        }
        self.pattern.set_accent(self.themes.active().accent);
        Ok(Some(self.themes.style()))
    }

    pub fn publish_style(&self, sink: &mut impl StyleSink) {
        self.themes.style().publish(sink);
    }

    /// One scheduler tick at `now_ms` (animation-frame timestamp).
    pub fn frame(&mut self, now_ms: f64) -> FrameOutput {
        self.pattern.time = self.pattern.time.max(now_ms * 0.001);
        if self.config.shapes {
            self.shapes.update(self.scroll_factor());
        }
        let fps = match &mut self.fps {
            Some(counter) => counter.tick(now_ms),
            None => {
                self.fps = Some(FpsCounter::new(now_ms));
                None
            }
        };
        FrameOutput {
            time: self.pattern.time,
            fps,
        }
    }

    pub fn shape_style(&self) -> ShapeStyle {
        let theme = self.themes.active();
        ShapeStyle {
            accent: theme.accent,
            gradient: self
                .config
                .backdrop_gradient
                .then(|| theme.gradient_or_derived()),
            gradient_alpha: self.config.backdrop_alpha,
            scroll_factor: self.scroll_factor(),
        }
    }

    pub fn draw_shapes(&self, surface: &mut impl Surface) {
        if self.config.shapes {
            self.shapes.draw(surface, &self.shape_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::StyleKey;
    use pretty_assertions::assert_eq;

    fn backdrop() -> Backdrop {
        let cfg = VizConfig {
            theme: Some(0),
            seed: Some(1),
            ..Default::default()
        };
        Backdrop::new(cfg, 800, 600).unwrap()
    }

    #[test]
    fn toggle_updates_pattern_accent() {
        let mut b = backdrop();
        assert_eq!(b.style().accent, "#d94f4f");
        let style = b.toggle_theme().clone();
        assert_eq!(style.accent, "#e68a2e");
        assert_eq!(
            b.pattern().accent_color,
            crate::color::Rgb::new(0xe6, 0x8a, 0x2e).to_unit()
        );
    }

    #[test]
    fn apply_same_theme_is_noop() {
        let mut b = backdrop();
        assert!(b.apply_theme(0).unwrap().is_none());
        assert!(b.apply_theme(4).unwrap().is_some());
        assert!(b.apply_theme(99).is_err());
    }

    #[test]
    fn resize_updates_resolution_and_regenerates() {
        let mut b = backdrop();
        assert_eq!(b.shapes().shapes().len(), 154);
        b.resize(400, 300);
        assert_eq!(b.pattern().resolution, (400, 300));
        assert_eq!(b.shapes().shapes().len(), 8 * 6);
    }

    #[test]
    fn frames_carry_time_and_fps() {
        let mut b = backdrop();
        assert_eq!(b.frame(0.0).fps, None);
        let mut fps = None;
        for i in 1..=60u32 {
            fps = b.frame(f64::from(i) * 1000.0 / 60.0).fps.or(fps);
        }
        assert_eq!(fps, Some(60));
        assert_eq!(b.pattern().time, 1.0);
        assert_eq!(b.shapes().frame(), 61);

        // Time never runs backwards.
        b.frame(10.0);
        assert_eq!(b.pattern().time, 1.0);
    }

    #[test]
    fn scroll_factor_uses_viewport_height() {
        let mut b = backdrop();
        b.set_scroll(300.0);
        assert_eq!(b.scroll_factor(), 0.5);
        assert_eq!(b.shape_style().scroll_factor, 0.5);
        b.set_scroll(5000.0);
        assert_eq!(b.scroll_factor(), 1.0);
    }

    #[test]
    fn publishes_all_style_keys() {
        let b = backdrop();
        let mut sink: Vec<(StyleKey, String)> = Vec::new();
        b.publish_style(&mut sink);
        assert_eq!(sink.len(), StyleKey::ALL.len());
    }

    #[test]
    fn shapes_can_be_disabled() {
        let cfg = VizConfig {
            shapes: false,
            theme: Some(1),
            ..Default::default()
        };
        let mut b = Backdrop::new(cfg, 800, 600).unwrap();
        assert!(b.shapes().shapes().is_empty());
        b.frame(16.0);
        assert_eq!(b.shapes().frame(), 0);
    }

    #[test]
    fn tiny_shape_radius_from_config_stays_bounded() {
        let cfg = VizConfig::from_json(r#"{"shape_radius": 1e-300, "theme": 0}"#).unwrap();
        let b = Backdrop::new(cfg, 800, 600).unwrap();
        assert_eq!(b.config().shape_radius, crate::shapes::MIN_RADIUS);
        // 1 px * 2.5 is below the lattice floor of 8 px.
        assert_eq!(b.shapes().shapes().len(), 101 * 76);
    }

    #[test]
    fn out_of_range_start_theme_falls_back() {
        let cfg = VizConfig {
            theme: Some(100),
            ..Default::default()
        };
        let b = Backdrop::new(cfg, 10, 10).unwrap();
        assert!(b.themes().index() < b.themes().len());
    }
}
