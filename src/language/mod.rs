//! Language detection module
//!
//! Provides the keyword-based heuristic that guesses the spoken language
//! from recognized text, plus the caller-facing language selection type.

mod detect;
mod selection;

pub use detect::{detect, DEFAULT_LANGUAGE};
pub use selection::LanguageMode;
