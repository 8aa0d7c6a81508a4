//! Color themes, derived page-chrome styles, and the active-theme cursor.

use std::fmt;

use log::{debug, warn};
use serde::Deserialize;

use crate::color::{self, darken, lighten, readable_text, shift, soften, Rgb};

/// Fallback accent when no configured theme parses.
pub const DEFAULT_ACCENT: Rgb = Rgb::new(0x3a, 0x8d, 0xdf);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    Empty,
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "theme list is empty"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "theme index {index} out of range for {len} themes")
            }
        }
    }
}

impl std::error::Error for ThemeError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub accent: Rgb,
    /// Backdrop gradient (start, end). Derived from the accent when absent.
    pub gradient: Option<(Rgb, Rgb)>,
}

impl Theme {
    pub fn new(name: impl Into<String>, accent: Rgb) -> Self {
        Self {
            name: name.into(),
            accent,
            gradient: None,
        }
    }

    pub fn with_gradient(mut self, start: Rgb, end: Rgb) -> Self {
        self.gradient = Some((start, end));
        self
    }

    /// Build a theme from a `#RRGGBB` accent string.
    pub fn parse(name: impl Into<String>, hex: &str) -> Result<Self, color::ColorError> {
        Ok(Self::new(name, Rgb::parse_hex(hex)?))
    }

    pub fn gradient_or_derived(&self) -> (Rgb, Rgb) {
        self.gradient
            .unwrap_or_else(|| (darken(self.accent, 0.6), self.accent))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new("azure", DEFAULT_ACCENT)
    }
}

/// The built-in palette, in cycling order.
pub fn builtin_themes() -> Vec<Theme> {
    vec![
        Theme::new("crimson", Rgb::new(0xd9, 0x4f, 0x4f)),
        Theme::new("amber", Rgb::new(0xe6, 0x8a, 0x2e)),
        Theme::new("citrine", Rgb::new(0xe6, 0xd8, 0x2e)),
        Theme::new("jade", Rgb::new(0x4f, 0xe6, 0x6b)),
        Theme::new("aqua", Rgb::new(0x2e, 0xe6, 0xd8)),
        Theme::new("azure", Rgb::new(0x3a, 0x8d, 0xdf))
            .with_gradient(Rgb::new(0x1e, 0x3c, 0x72), Rgb::new(0x2a, 0x52, 0x98)),
        Theme::new("violet", Rgb::new(0xa3, 0x6b, 0xe6))
            .with_gradient(Rgb::new(0x41, 0x29, 0x5a), Rgb::new(0x2f, 0x07, 0x43)),
        Theme::new("graphite", Rgb::new(0x2a, 0x2a, 0x2a))
            .with_gradient(Rgb::new(0x23, 0x25, 0x26), Rgb::new(0x41, 0x43, 0x45)),
        Theme::new("bronze", Rgb::new(0xa6, 0x7c, 0x52)),
    ]
}

/// Parse a list of accent strings, skipping malformed entries.
///
/// Falls back to a single default theme when nothing parses.
pub fn themes_from_hex<S: AsRef<str>>(list: &[S]) -> Vec<Theme> {
    let themes: Vec<Theme> = list
        .iter()
        .enumerate()
        .filter_map(|(i, hex)| {
            let hex = hex.as_ref();
            match Theme::parse(format!("custom-{i}"), hex) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("skipping theme {hex:?}: {e}");
                    None
                }
            }
        })
        .collect();
    if themes.is_empty() {
        warn!("no valid themes configured; using default");
        vec![Theme::default()]
    } else {
        themes
    }
}

/// Names of the published style values. Published as CSS custom properties
/// `--{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKey {
    Accent,
    AccentHover,
    AccentDark,
    HeaderBackground,
    ContentBackground,
    ContentShadow,
    ButtonShadow,
    TextColor,
    GradientStart,
    GradientEnd,
}

impl StyleKey {
    pub const ALL: [StyleKey; 10] = [
        Self::Accent,
        Self::AccentHover,
        Self::AccentDark,
        Self::HeaderBackground,
        Self::ContentBackground,
        Self::ContentShadow,
        Self::ButtonShadow,
        Self::TextColor,
        Self::GradientStart,
        Self::GradientEnd,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Accent => "accent",
            Self::AccentHover => "accent-hover",
            Self::AccentDark => "accent-dark",
            Self::HeaderBackground => "header-background",
            Self::ContentBackground => "content-background",
            Self::ContentShadow => "content-shadow",
            Self::ButtonShadow => "button-shadow",
            Self::TextColor => "text-color",
            Self::GradientStart => "gradient-start",
            Self::GradientEnd => "gradient-end",
        }
    }
}

/// Receiver of published style values.
pub trait StyleSink {
    fn set(&mut self, key: StyleKey, value: &str);
}

impl StyleSink for Vec<(StyleKey, String)> {
    fn set(&mut self, key: StyleKey, value: &str) {
        self.push((key, value.to_string()));
    }
}

/// Which derived-color formulas to use for page chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleStrategy {
    /// Additive lighten/darken, text threshold 128.
    #[default]
    Chrome,
    /// Multiplicative darken with gray-softened panels, text threshold 150.
    Soft,
}

impl StyleStrategy {
    pub const fn text_threshold(self) -> f64 {
        match self {
            Self::Chrome => 128.0,
            Self::Soft => 150.0,
        }
    }

    pub fn derive(self, theme: &Theme) -> DerivedStyle {
        let a = theme.accent;
        let (gradient_start, gradient_end) = theme.gradient_or_derived();
        let threshold = self.text_threshold();
        match self {
            Self::Chrome => DerivedStyle {
                accent: a.to_hex(),
                accent_hover: lighten(a, 0.2).to_hex(),
                accent_dark: shift(a, -0.2).to_hex(),
                header_background: a.to_rgba(0.8),
                content_background: a.to_rgba(0.2),
                content_shadow: a.to_hex(),
                button_shadow: shift(a, -0.4).to_hex(),
                text_color: readable_text(a, threshold, lighten(a, 0.6), shift(a, -0.6)).to_hex(),
                gradient_start: gradient_start.to_hex(),
                gradient_end: gradient_end.to_hex(),
            },
            Self::Soft => DerivedStyle {
                accent: a.to_hex(),
                accent_hover: lighten(a, 0.15).to_hex(),
                accent_dark: darken(a, 0.3).to_hex(),
                header_background: soften(a, 0.3).to_rgba(0.85),
                content_background: soften(a, 0.6).to_rgba(0.25),
                content_shadow: darken(a, 0.5).to_hex(),
                button_shadow: darken(a, 0.6).to_hex(),
                text_color: readable_text(
                    a,
                    threshold,
                    Rgb::new(0xf5, 0xf5, 0xf5),
                    Rgb::new(0x1a, 0x1a, 0x1a),
                )
                .to_hex(),
                gradient_start: gradient_start.to_hex(),
                gradient_end: gradient_end.to_hex(),
            },
        }
    }
}

/// Page-chrome colors computed from one theme. Always recomputed whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedStyle {
    pub accent: String,
    pub accent_hover: String,
    pub accent_dark: String,
    pub header_background: String,
    pub content_background: String,
    pub content_shadow: String,
    pub button_shadow: String,
    pub text_color: String,
    pub gradient_start: String,
    pub gradient_end: String,
}

impl DerivedStyle {
    pub fn get(&self, key: StyleKey) -> &str {
        match key {
            StyleKey::Accent => &self.accent,
            StyleKey::AccentHover => &self.accent_hover,
            StyleKey::AccentDark => &self.accent_dark,
            StyleKey::HeaderBackground => &self.header_background,
            StyleKey::ContentBackground => &self.content_background,
            StyleKey::ContentShadow => &self.content_shadow,
            StyleKey::ButtonShadow => &self.button_shadow,
            StyleKey::TextColor => &self.text_color,
            StyleKey::GradientStart => &self.gradient_start,
            StyleKey::GradientEnd => &self.gradient_end,
        }
    }

    pub fn publish(&self, sink: &mut impl StyleSink) {
        for key in StyleKey::ALL {
            sink.set(key, self.get(key));
        }
    }
}

/// Fixed theme list plus the active index.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    themes: Vec<Theme>,
    active: usize,
    strategy: StyleStrategy,
    style: DerivedStyle,
}

impl ThemeManager {
    pub fn new(
        themes: Vec<Theme>,
        start: usize,
        strategy: StyleStrategy,
    ) -> Result<Self, ThemeError> {
        if themes.is_empty() {
            return Err(ThemeError::Empty);
        }
        let len = themes.len();
        let theme = themes
            .get(start)
            .ok_or(ThemeError::IndexOutOfRange { index: start, len })?;
        let style = strategy.derive(theme);
        Ok(Self {
            themes,
            active: start,
            strategy,
            style,
        })
    }

    /// Start from a pseudo-random theme.
    pub fn with_random_start(
        themes: Vec<Theme>,
        strategy: StyleStrategy,
    ) -> Result<Self, ThemeError> {
        if themes.is_empty() {
            return Err(ThemeError::Empty);
        }
        let start = fastrand::usize(..themes.len());
        Self::new(themes, start, strategy)
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Theme {
        &self.themes[self.active]
    }

    pub fn strategy(&self) -> StyleStrategy {
        self.strategy
    }

    pub fn style(&self) -> &DerivedStyle {
        &self.style
    }

    /// Move to the next theme, wrapping at the end.
    pub fn advance(&mut self) -> &DerivedStyle {
        let next = (self.active + 1) % self.themes.len();
        self.select(next);
        &self.style
    }

    /// Activate `index`. Returns `Ok(None)` when it is already active.
    pub fn apply(&mut self, index: usize) -> Result<Option<&DerivedStyle>, ThemeError> {
        if index >= self.themes.len() {
            return Err(ThemeError::IndexOutOfRange {
                index,
                len: self.themes.len(),
            });
        }
        if index == self.active {
            return Ok(None);
        }
        self.select(index);
        Ok(Some(&self.style))
    }

    fn select(&mut self, index: usize) {
        self.active = index;
        self.style = self.strategy.derive(&self.themes[index]);
        debug!("theme -> {} ({})", self.themes[index].name, self.style.accent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn manager(start: usize) -> ThemeManager {
        ThemeManager::new(builtin_themes(), start, StyleStrategy::Chrome).unwrap()
    }

    #[test]
    fn chrome_style_for_crimson() {
        let m = manager(0);
        let s = m.style();
        assert_eq!(s.accent, "#d94f4f");
        assert_eq!(s.accent_hover, "#ff8282");
        assert_eq!(s.accent_dark, "#a61c1c");
        assert_eq!(s.header_background, "rgba(217, 79, 79, 0.8)");
        assert_eq!(s.content_background, "rgba(217, 79, 79, 0.2)");
        assert_eq!(s.content_shadow, "#d94f4f");
        assert_eq!(s.button_shadow, "#730000");
        // brightness ~120.3 <= 128 -> lightened text
        assert_eq!(s.text_color, "#ffe8e8");
        assert_eq!(s.gradient_start, "#572020");
        assert_eq!(s.gradient_end, "#d94f4f");
    }

    #[test]
    fn soft_style_uses_its_own_threshold() {
        let themes = vec![Theme::new("gray", Rgb::new(140, 140, 140))];
        let chrome = ThemeManager::new(themes.clone(), 0, StyleStrategy::Chrome).unwrap();
        let soft = ThemeManager::new(themes, 0, StyleStrategy::Soft).unwrap();
        // 140 is bright for 128 and dark for 150.
        assert_eq!(chrome.style().text_color, shift(Rgb::new(140, 140, 140), -0.6).to_hex());
        assert_eq!(soft.style().text_color, "#f5f5f5");
        assert_eq!(soft.style().accent_dark, "#626262");
    }

    #[test]
    fn advance_is_cyclic() {
        let mut m = manager(3);
        let original = m.style().clone();
        for _ in 0..m.len() {
            m.advance();
        }
        assert_eq!(m.index(), 3);
        assert_eq!(m.style(), &original);
    }

    #[test]
    fn advance_wraps_at_end() {
        let mut m = manager(8);
        m.advance();
        assert_eq!(m.index(), 0);
        assert_eq!(m.active().name, "crimson");
    }

    #[test]
    fn apply_is_idempotent() {
        let mut m = manager(2);
        assert_eq!(m.apply(2), Ok(None));
        let style = m.apply(5).unwrap().cloned();
        assert_eq!(style.as_ref().map(|s| s.accent.as_str()), Some("#3a8ddf"));
        assert_eq!(m.apply(5), Ok(None));
        assert_eq!(
            m.apply(9),
            Err(ThemeError::IndexOutOfRange { index: 9, len: 9 })
        );
    }

    #[test]
    fn theme_gradient_overrides_derived() {
        let m = manager(5);
        assert_eq!(m.style().gradient_start, "#1e3c72");
        assert_eq!(m.style().gradient_end, "#2a5298");
    }

    #[test]
    fn publish_emits_every_key_once() {
        let m = manager(1);
        let mut sink: Vec<(StyleKey, String)> = Vec::new();
        m.style().publish(&mut sink);
        let keys: Vec<_> = sink.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, StyleKey::ALL.to_vec());
        assert_eq!(sink[0].1, "#e68a2e");
    }

    #[test]
    fn malformed_hex_is_rejected_at_boundary() {
        let themes = themes_from_hex(&["#112233", "oops", "#12345g"]);
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].accent, Rgb::new(0x11, 0x22, 0x33));

        let fallback = themes_from_hex(&["nope"]);
        assert_eq!(fallback, vec![Theme::default()]);
    }

    #[test]
    fn construction_errors() {
        assert_eq!(
            ThemeManager::new(Vec::new(), 0, StyleStrategy::Chrome).unwrap_err(),
            ThemeError::Empty
        );
        assert_eq!(
            ThemeManager::new(builtin_themes(), 42, StyleStrategy::Chrome).unwrap_err(),
            ThemeError::IndexOutOfRange { index: 42, len: 9 }
        );
        let m = ThemeManager::with_random_start(builtin_themes(), StyleStrategy::Soft).unwrap();
        assert!(m.index() < m.len());
    }
}
