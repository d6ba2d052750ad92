//! Candlestick pattern detectors
//!
//! # Pattern Categories
//!
//! - **Single-bar (5 rules, 6 patterns)**: Doji, Hammer, Shooting Star, Spinning Top,
//!   Marubozu (bullish/bearish)
//! - **Two-bar (4 rules, 6 patterns)**: Engulfing and Harami (bullish/bearish), Piercing,
//!   Dark Cloud Cover
//! - **Three-bar (4 rules, 4 patterns)**: Three White Soldiers, Three Black Crows,
//!   Morning Star, Evening Star

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple detector types.
macro_rules! impl_with_defaults {
  ($($detector:ty),* $(,)?) => {
    $(impl $detector {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

// Re-export all detectors for convenience
pub use helpers::*;
pub use single_bar::*;
pub use three_bar::*;
pub use two_bar::*;
