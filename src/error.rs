use std::fmt;

use wasm_bindgen::JsValue;

/// Failures while bringing up a decorative component.
///
/// None of these are fatal to the page: component boundaries log them and
/// fall back to rendering nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum HeroError {
    /// `getContext("webgl2")` returned nothing (no GPU, blocklisted driver, ...).
    ContextUnavailable,
    Shader(String),
    Link(String),
    /// A GL object could not be allocated.
    Resource(&'static str),
    /// A DOM call threw.
    Dom(String),
}

impl fmt::Display for HeroError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeroError::ContextUnavailable => write!(f, "WebGL2 not supported"),
            HeroError::Shader(log) => write!(f, "shader compile failed: {log}"),
            HeroError::Link(log) => write!(f, "program link failed: {log}"),
            HeroError::Resource(what) => write!(f, "could not allocate {what}"),
            HeroError::Dom(msg) => write!(f, "DOM error: {msg}"),
        }
    }
}

impl std::error::Error for HeroError {}

impl From<JsValue> for HeroError {
    fn from(value: JsValue) -> Self {
        HeroError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

impl From<HeroError> for JsValue {
    fn from(err: HeroError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
