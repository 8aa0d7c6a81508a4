//! Runtime configuration.
//!
//! The page may attach a JSON object to the pattern canvas as
//! `data-config='{"pixelation": 0.2, "style_strategy": "soft"}'`. Missing
//! fields take their defaults.

use log::warn;
use serde::Deserialize;

use crate::color::Rgb;
use crate::error::VizError;
use crate::pattern::{PatternParameters, MIN_PIXELATION};
use crate::shapes::{MIN_RADIUS, MIN_SPACING_FACTOR};
use crate::theme::{builtin_themes, themes_from_hex, StyleStrategy, Theme};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VizConfig {
    pub pixelation: f64,
    pub scale: f64,
    pub speed: f64,
    /// `#RRGGBB` for the dark end of the pattern blend.
    pub base_color: String,
    /// Accent palette override; the built-in palette is used when `None`.
    pub themes: Option<Vec<String>>,
    /// Fixed starting theme. Picked at random when `None`.
    pub theme: Option<usize>,
    pub style_strategy: StyleStrategy,

    pub shapes: bool,
    pub shape_radius: f64,
    pub spacing_factor: f64,
    /// Per-axis velocity bound in px/frame.
    pub max_speed: f64,
    pub stagger_frames: u32,
    pub fade_step: f64,
    pub phase_rate: f64,
    pub morph_rate: f64,
    pub backdrop_gradient: bool,
    pub backdrop_alpha: f64,
    /// Seed for shape randomness; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

impl Default for VizConfig {
    fn default() -> Self {
        Self {
            pixelation: 0.1,
            scale: -0.44,
            speed: 0.1,
            base_color: "#000000".into(),
            themes: None,
            theme: None,
            style_strategy: StyleStrategy::Chrome,
            shapes: true,
            shape_radius: 25.0,
            spacing_factor: 2.5,
            max_speed: 0.3,
            stagger_frames: 2,
            fade_step: 0.02,
            phase_rate: 0.01,
            morph_rate: 0.005,
            backdrop_gradient: true,
            backdrop_alpha: 0.35,
            seed: None,
        }
    }
}

impl VizConfig {
    pub fn from_json(text: &str) -> Result<Self, VizError> {
        let cfg: Self = serde_json::from_str(text)?;
        Ok(cfg.sanitized())
    }

    /// Clamp values that would break the renderers back into range.
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        if !(self.pixelation.is_finite() && self.pixelation >= MIN_PIXELATION) {
            warn!(
                "config: pixelation {} clamped to {MIN_PIXELATION}",
                self.pixelation
            );
            self.pixelation = MIN_PIXELATION;
        }
        if !(self.shape_radius.is_finite() && self.shape_radius > 0.0) {
            warn!(
                "config: shape_radius {} replaced with {}",
                self.shape_radius, d.shape_radius
            );
            self.shape_radius = d.shape_radius;
        } else if self.shape_radius < MIN_RADIUS {
            warn!(
                "config: shape_radius {} clamped to {MIN_RADIUS}",
                self.shape_radius
            );
            self.shape_radius = MIN_RADIUS;
        }
        if !(self.spacing_factor.is_finite() && self.spacing_factor > 0.0) {
            warn!(
                "config: spacing_factor {} replaced with {}",
                self.spacing_factor, d.spacing_factor
            );
            self.spacing_factor = d.spacing_factor;
        } else if self.spacing_factor < MIN_SPACING_FACTOR {
            warn!(
                "config: spacing_factor {} clamped to {MIN_SPACING_FACTOR}",
                self.spacing_factor
            );
            self.spacing_factor = MIN_SPACING_FACTOR;
        }
        self.max_speed = finite_or(self.max_speed, d.max_speed).abs();
        self.fade_step = finite_or(self.fade_step, d.fade_step).clamp(0.0, 1.0);
        self.phase_rate = finite_or(self.phase_rate, d.phase_rate);
        self.morph_rate = finite_or(self.morph_rate, d.morph_rate).max(0.0);
        self.backdrop_alpha = finite_or(self.backdrop_alpha, d.backdrop_alpha).clamp(0.0, 1.0);
        self.scale = finite_or(self.scale, d.scale);
        self.speed = finite_or(self.speed, d.speed);
        self
    }

    pub fn base_rgb(&self) -> Rgb {
        Rgb::parse_hex(&self.base_color).unwrap_or_else(|e| {
            warn!("config: base_color {:?}: {e}; using black", self.base_color);
            Rgb::default()
        })
    }

    pub fn theme_list(&self) -> Vec<Theme> {
        match &self.themes {
            Some(list) => themes_from_hex(list),
            None => builtin_themes(),
        }
    }

    pub fn pattern_parameters(&self, width: u32, height: u32, accent: Rgb) -> PatternParameters {
        let mut params = PatternParameters::new((width, height), self.pixelation);
        params.base_color = self.base_rgb().to_unit();
        params.scale = self.scale;
        params.speed = self.speed;
        params.set_accent(accent);
        params
    }
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        assert_eq!(VizConfig::from_json("{}").unwrap(), VizConfig::default());
    }

    #[test]
    fn partial_override() {
        let cfg = VizConfig::from_json(
            r#"{"pixelation": 0.25, "style_strategy": "soft", "theme": 4, "seed": 7}"#,
        )
        .unwrap();
        assert_eq!(cfg.pixelation, 0.25);
        assert_eq!(cfg.style_strategy, StyleStrategy::Soft);
        assert_eq!(cfg.theme, Some(4));
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.shape_radius, 25.0);
    }

    #[test]
    fn invalid_json_is_config_error() {
        let err = VizConfig::from_json("{pixelation:").unwrap_err();
        assert!(matches!(err, VizError::Config(_)));
        let err = VizConfig::from_json(r#"{"style_strategy": "loud"}"#).unwrap_err();
        assert!(matches!(err, VizError::Config(_)));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = VizConfig::from_json(
            r#"{"pixelation": 0, "shape_radius": -4, "backdrop_alpha": 3, "max_speed": -0.5}"#,
        )
        .unwrap();
        assert_eq!(cfg.pixelation, MIN_PIXELATION);
        assert_eq!(cfg.shape_radius, 25.0);
        assert_eq!(cfg.backdrop_alpha, 1.0);
        assert_eq!(cfg.max_speed, 0.5);
    }

    #[test]
    fn tiny_positive_spacing_is_clamped() {
        let cfg =
            VizConfig::from_json(r#"{"shape_radius": 1e-300, "spacing_factor": 1e-300}"#)
                .unwrap();
        assert_eq!(cfg.shape_radius, MIN_RADIUS);
        assert_eq!(cfg.spacing_factor, MIN_SPACING_FACTOR);

        let cfg = VizConfig::from_json(r#"{"shape_radius": 0.5, "spacing_factor": 3}"#).unwrap();
        assert_eq!(cfg.shape_radius, MIN_RADIUS);
        assert_eq!(cfg.spacing_factor, 3.0);
    }

    #[test]
    fn bad_base_color_falls_back_to_black() {
        let cfg = VizConfig {
            base_color: "navy".into(),
            ..Default::default()
        };
        assert_eq!(cfg.base_rgb(), Rgb::default());
    }

    #[test]
    fn custom_theme_list() {
        let cfg = VizConfig::from_json(r##"{"themes": ["#ff0000", "bad", "#00ff00"]}"##).unwrap();
        let themes = cfg.theme_list();
        assert_eq!(themes.len(), 2);
        assert_eq!(themes[1].accent, Rgb::new(0, 255, 0));
        assert_eq!(VizConfig::default().theme_list().len(), 9);
    }

    #[test]
    fn pattern_parameters_from_config() {
        let p = VizConfig::default().pattern_parameters(800, 600, Rgb::new(255, 255, 255));
        assert_eq!(p.resolution, (800, 600));
        assert_eq!(p.pixelation(), 0.1);
        assert_eq!(p.scale, -0.44);
        assert_eq!(p.accent_color, [1.0; 3]);
        assert_eq!(p.base_color, [0.0; 3]);
    }
}
