//! Common helper functions for candlestick pattern detection
//!
//! Default rule thresholds, confidence caps and the ratio/comparison helpers shared across
//! all detector modules.

use crate::{OHLCVExt, OHLCV};

// ============================================================
// RULE THRESHOLDS
// ============================================================

/// Doji: body <= range * DOJI_BODY_RATIO
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Hammer / Shooting Star: dominant shadow >= body * SHADOW_BODY_MULTIPLE
pub const SHADOW_BODY_MULTIPLE: f64 = 2.0;
/// Hammer / Shooting Star: opposite shadow <= body * OPPOSITE_SHADOW_MULTIPLE
pub const OPPOSITE_SHADOW_MULTIPLE: f64 = 0.5;
/// Hammer / Shooting Star: body must be at least this share of the range
pub const MIN_BODY_RATIO: f64 = 0.1;
/// Spinning Top: body <= range * SPINNING_TOP_BODY_RATIO
pub const SPINNING_TOP_BODY_RATIO: f64 = 0.3;
/// Marubozu: each shadow <= range * MARUBOZU_SHADOW_RATIO
pub const MARUBOZU_SHADOW_RATIO: f64 = 0.01;
/// Marubozu: body >= range * MARUBOZU_BODY_RATIO
pub const MARUBOZU_BODY_RATIO: f64 = 0.95;

// ============================================================
// CONFIDENCE
// ============================================================

pub const MIN_CONFIDENCE: f64 = 0.0;
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Confidence at or above which a detection is `Strength::Strong`
pub const STRONG_CONFIDENCE: f64 = 80.0;
/// Confidence at or above which a detection is `Strength::Moderate`
pub const MODERATE_CONFIDENCE: f64 = 60.0;

/// Clamp a raw rule score into the confidence range.
#[inline]
pub fn clamp_confidence(score: f64) -> f64 {
    score.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

// ============================================================
// GEOMETRY
// ============================================================

/// Body, upper shadow, lower shadow and range of a candle, or `None` when the range is not
/// a positive finite number or any part of the candle is NaN/infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub body: f64,
    pub upper: f64,
    pub lower: f64,
    pub range: f64,
}

impl Shape {
    #[inline]
    pub fn of<T: OHLCV>(bar: &T) -> Option<Self> {
        let range = bar.range();
        if !(range > 0.0 && range.is_finite()) {
            return None;
        }
        let shape = Self {
            body: bar.body(),
            upper: bar.upper_shadow(),
            lower: bar.lower_shadow(),
            range,
        };
        (shape.body.is_finite() && shape.upper.is_finite() && shape.lower.is_finite())
            .then_some(shape)
    }

    #[inline]
    pub fn body_ratio(&self) -> f64 {
        self.body / self.range
    }

    #[inline]
    pub fn upper_ratio(&self) -> f64 {
        self.upper / self.range
    }

    #[inline]
    pub fn lower_ratio(&self) -> f64 {
        self.lower / self.range
    }
}

/// Midpoint of a candle's real body
#[inline]
pub fn body_midpoint<T: OHLCV>(bar: &T) -> f64 {
    (bar.open() + bar.close()) / 2.0
}

/// Top of the real body: max(open, close)
#[inline]
pub fn body_top<T: OHLCV>(bar: &T) -> f64 {
    bar.open().max(bar.close())
}

/// Bottom of the real body: min(open, close)
#[inline]
pub fn body_bottom<T: OHLCV>(bar: &T) -> f64 {
    bar.open().min(bar.close())
}

/// True when `inner`'s real body lies strictly inside `outer`'s real body
#[inline]
pub fn body_inside<T: OHLCV>(inner: &T, outer: &T) -> bool {
    body_top(inner) < body_top(outer) && body_bottom(inner) > body_bottom(outer)
}
