use std::fmt;

use crate::color::ColorError;
use crate::pattern::PatternError;
use crate::theme::ThemeError;

/// Crate-level error. Component errors convert into it with `?`.
#[derive(Debug, Clone, PartialEq)]
pub enum VizError {
    Color(ColorError),
    Theme(ThemeError),
    Pattern(PatternError),
    /// `data-config` was present but not valid JSON for [`crate::config::VizConfig`].
    Config(String),
    /// GLSL compilation failed; `log` is the driver's info log.
    Shader { stage: &'static str, log: String },
    Link(String),
    /// A rendering context could not be created.
    Context(&'static str),
    /// A DOM lookup or call failed.
    Dom(String),
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(e) => write!(f, "color error: {e}"),
            Self::Theme(e) => write!(f, "theme error: {e}"),
            Self::Pattern(e) => write!(f, "pattern error: {e}"),
            Self::Config(msg) => write!(f, "invalid config: {msg}"),
            Self::Shader { stage, log } => write!(f, "{stage} shader failed to compile: {log}"),
            Self::Link(log) => write!(f, "shader program failed to link: {log}"),
            Self::Context(kind) => write!(f, "{kind} context not available"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
        }
    }
}

impl std::error::Error for VizError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Color(e) => Some(e),
            Self::Theme(e) => Some(e),
            Self::Pattern(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ColorError> for VizError {
    fn from(e: ColorError) -> Self {
        Self::Color(e)
    }
}

impl From<ThemeError> for VizError {
    fn from(e: ThemeError) -> Self {
        Self::Theme(e)
    }
}

impl From<PatternError> for VizError {
    fn from(e: PatternError) -> Self {
        Self::Pattern(e)
    }
}

impl From<serde_json::Error> for VizError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<VizError> for wasm_bindgen::JsValue {
    fn from(e: VizError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
