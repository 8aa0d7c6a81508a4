//! 8-bit RGB colors and the derived-color arithmetic used by the theme system.
//!
//! Every adjustment works on integer channels, clamps to `[0, 255]` and rounds
//! to the nearest integer, so the CSS strings produced for a given accent are
//! stable across platforms.

use std::fmt;
use std::str::FromStr;

/// Mid-gray target used by [`soften`].
pub const MID_GRAY: f64 = 128.0;

/// An opaque sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

pub const BLACK: Rgb = Rgb::new(0, 0, 0);
pub const WHITE: Rgb = Rgb::new(255, 255, 255);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// Input did not start with `#`.
    MissingHash,
    /// Input was not exactly `#` plus six digits.
    BadLength(usize),
    /// A character outside `[0-9a-fA-F]`.
    BadDigit(char),
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHash => write!(f, "color must start with '#'"),
            Self::BadLength(len) => write!(f, "expected #RRGGBB, got {len} characters"),
            Self::BadDigit(c) => write!(f, "invalid hex digit {c:?}"),
        }
    }
}

impl std::error::Error for ColorError {}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a strict `#RRGGBB` string (either case).
    pub fn parse_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;
        if digits.chars().count() != 6 {
            return Err(ColorError::BadLength(s.chars().count()));
        }
        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(bad));
        }
        // ASCII hex digits only from here on.
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).unwrap_or(0);
        Ok(Self::new(channel(0), channel(2), channel(4)))
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS `rgba(r, g, b, a)` with the alpha printed as given.
    pub fn to_rgba(self, alpha: f64) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha)
    }

    /// Channels normalized to `[0, 1]`, as fed to the pattern shader.
    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    fn map(self, f: impl Fn(f64) -> f64) -> Self {
        let ch = |v: u8| f(f64::from(v)).clamp(0.0, 255.0).round() as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Scale every channel by `1 - factor` (linear blend toward black).
pub fn darken(c: Rgb, factor: f64) -> Rgb {
    c.map(|v| v * (1.0 - factor))
}

/// Add `255 * factor` to every channel, clamped.
pub fn lighten(c: Rgb, factor: f64) -> Rgb {
    c.map(|v| v + 255.0 * factor)
}

/// Signed additive adjustment; negative amounts subtract.
pub fn shift(c: Rgb, amount: f64) -> Rgb {
    c.map(|v| v + 255.0 * amount)
}

/// Blend every channel toward [`MID_GRAY`].
pub fn soften(c: Rgb, factor: f64) -> Rgb {
    c.map(|v| v + (MID_GRAY - v) * factor)
}

/// Perceptual brightness on the 0..=255 scale (ITU-R 601 luma weights).
pub fn brightness(c: Rgb) -> f64 {
    (f64::from(c.r) * 299.0 + f64::from(c.g) * 587.0 + f64::from(c.b) * 114.0) / 1000.0
}

/// Pick the `dark` color for bright backgrounds and `light` otherwise.
pub fn readable_text(c: Rgb, threshold: f64, light: Rgb, dark: Rgb) -> Rgb {
    if brightness(c) > threshold {
        dark
    } else {
        light
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_formats_hex() {
        let c = Rgb::parse_hex("#D94f4F").unwrap();
        assert_eq!(c, Rgb::new(0xd9, 0x4f, 0x4f));
        assert_eq!(c.to_hex(), "#d94f4f");
        assert_eq!(c.to_string(), "#d94f4f");
        assert_eq!(c.to_rgba(0.8), "rgba(217, 79, 79, 0.8)");
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgb::parse_hex("d94f4f"), Err(ColorError::MissingHash));
        assert_eq!(Rgb::parse_hex("#d94f4"), Err(ColorError::BadLength(6)));
        assert_eq!(Rgb::parse_hex("#d94f4fa"), Err(ColorError::BadLength(8)));
        assert_eq!(Rgb::parse_hex("#d94g4f"), Err(ColorError::BadDigit('g')));
        assert_eq!(Rgb::parse_hex("#d9é4f4"), Err(ColorError::BadDigit('é')));
        assert!("".parse::<Rgb>().is_err());
    }

    #[test]
    fn identities_at_zero_and_one() {
        let c = Rgb::new(12, 200, 99);
        assert_eq!(darken(c, 0.0), c);
        assert_eq!(lighten(c, 0.0), c);
        assert_eq!(darken(c, 1.0), BLACK);
        assert_eq!(lighten(c, 1.0), WHITE);
        assert_eq!(soften(c, 0.0), c);
        assert_eq!(soften(c, 1.0), Rgb::new(128, 128, 128));
    }

    #[test]
    fn shift_matches_additive_css_variant() {
        let c = Rgb::parse_hex("#d94f4f").unwrap();
        // 217 - 51 = 166, 79 - 51 = 28
        assert_eq!(shift(c, -0.2), Rgb::new(166, 28, 28));
        assert_eq!(lighten(c, 0.2), Rgb::new(255, 130, 130));
        assert_eq!(shift(c, 0.2), lighten(c, 0.2));
    }

    #[test]
    fn brightness_and_text_choice() {
        assert_eq!(brightness(WHITE), 255.0);
        assert_eq!(brightness(BLACK), 0.0);
        let citrine = Rgb::parse_hex("#e6d82e").unwrap();
        assert!(brightness(citrine) > 150.0);
        assert_eq!(readable_text(citrine, 128.0, WHITE, BLACK), BLACK);
        let graphite = Rgb::parse_hex("#2a2a2a").unwrap();
        assert_eq!(readable_text(graphite, 128.0, WHITE, BLACK), WHITE);
    }

    #[test]
    fn thresholds_disagree_between_128_and_150() {
        // brightness ~= 140: bright for one call site, dark for the other.
        let c = Rgb::new(140, 140, 140);
        assert_eq!(readable_text(c, 128.0, WHITE, BLACK), BLACK);
        assert_eq!(readable_text(c, 150.0, WHITE, BLACK), WHITE);
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod props {
        use super::super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn darken_never_brightens(r: u8, g: u8, b: u8, f in 0.0f64..=1.0) {
                let c = Rgb::new(r, g, b);
                let d = darken(c, f);
                prop_assert!(d.r <= c.r && d.g <= c.g && d.b <= c.b);
            }

            #[test]
            fn lighten_never_darkens(r: u8, g: u8, b: u8, f in 0.0f64..=1.0) {
                let c = Rgb::new(r, g, b);
                let l = lighten(c, f);
                prop_assert!(l.r >= c.r && l.g >= c.g && l.b >= c.b);
            }
        }
    }
}
