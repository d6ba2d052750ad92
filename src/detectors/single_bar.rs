//! Single-bar candlestick pattern detectors
//!
//! Patterns: DOJI, HAMMER, SHOOTING_STAR, SPINNING_TOP, MARUBOZU_BULLISH, MARUBOZU_BEARISH
//!
//! Every single-bar rule compares the candle's body and shadows to its own high-low range,
//! so a zero-range candle (`high == low`) never matches any of them.

use std::collections::HashMap;

use super::helpers::{self, clamp_confidence, Shape};
use crate::{
    params::{get_multiple, get_ratio, ParamMeta, ParameterizedDetector},
    OHLCVExt, Pattern, PatternDetector, PatternError, PatternMatch, Ratio, Result, OHLCV,
};

impl_with_defaults!(
    DojiDetector,
    HammerDetector,
    ShootingStarDetector,
    SpinningTopDetector,
    MarubozuDetector,
);

// Confidence shaping (not tunable)
const DOJI_CONFIDENCE_FLOOR: f64 = 50.0;
const DOJI_BODY_PENALTY: f64 = 500.0;
const SHADOW_CONFIDENCE_BASE: f64 = 60.0;
const SHADOW_CONFIDENCE_SCALE: f64 = 10.0;
const SHADOW_CONFIDENCE_CAP: f64 = 90.0;
const SPINNING_TOP_BASE: f64 = 50.0;
const SPINNING_TOP_SCALE: f64 = 60.0;
const SPINNING_TOP_CAP: f64 = 80.0;
const MARUBOZU_CONFIDENCE: f64 = 90.0;

fn check_multiple(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PatternError::InvalidConfig(format!(
            "{field} must be a finite non-negative multiple, got {value}"
        )));
    }
    Ok(())
}

// ============================================================
// DOJI
// ============================================================

/// DOJI - open and close (nearly) equal relative to the range
#[derive(Debug, Clone, Copy)]
pub struct DojiDetector {
    pub max_body_ratio: Ratio,
}

impl Default for DojiDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(helpers::DOJI_BODY_RATIO),
        }
    }
}

impl PatternDetector for DojiDetector {
    fn name(&self) -> &'static str {
        "DOJI"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::Doji]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let shape = Shape::of(bars.get(index)?)?;
        let body_ratio = shape.body_ratio();

        if body_ratio > self.max_body_ratio.get() {
            return None;
        }

        let score = (helpers::MAX_CONFIDENCE - body_ratio * DOJI_BODY_PENALTY)
            .max(DOJI_CONFIDENCE_FLOOR);

        Some(PatternMatch {
            pattern: Pattern::Doji,
            confidence: clamp_confidence(score),
            start_index: index,
            end_index: index,
        })
    }
}

// ============================================================
// HAMMER / SHOOTING STAR
// ============================================================

/// HAMMER - small body at the top of the range with a long lower shadow
#[derive(Debug, Clone, Copy)]
pub struct HammerDetector {
    /// Lower shadow must be at least this multiple of the body
    pub shadow_multiple: f64,
    /// Upper shadow may be at most this multiple of the body
    pub opposite_shadow_multiple: f64,
    /// Body must be at least this share of the range
    pub min_body_ratio: Ratio,
}

impl Default for HammerDetector {
    fn default() -> Self {
        Self {
            shadow_multiple: helpers::SHADOW_BODY_MULTIPLE,
            opposite_shadow_multiple: helpers::OPPOSITE_SHADOW_MULTIPLE,
            min_body_ratio: Ratio::new_const(helpers::MIN_BODY_RATIO),
        }
    }
}

impl PatternDetector for HammerDetector {
    fn name(&self) -> &'static str {
        "HAMMER"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::Hammer]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let shape = Shape::of(bars.get(index)?)?;
        let confidence = shadow_reversal_confidence(
            shape.lower,
            shape.upper,
            &shape,
            self.shadow_multiple,
            self.opposite_shadow_multiple,
            self.min_body_ratio,
        )?;

        Some(PatternMatch {
            pattern: Pattern::Hammer,
            confidence,
            start_index: index,
            end_index: index,
        })
    }

    fn validate_config(&self) -> Result<()> {
        check_multiple("shadow_multiple", self.shadow_multiple)?;
        check_multiple("opposite_shadow_multiple", self.opposite_shadow_multiple)
    }
}

/// SHOOTING_STAR - small body at the bottom of the range with a long upper shadow
#[derive(Debug, Clone, Copy)]
pub struct ShootingStarDetector {
    /// Upper shadow must be at least this multiple of the body
    pub shadow_multiple: f64,
    /// Lower shadow may be at most this multiple of the body
    pub opposite_shadow_multiple: f64,
    pub min_body_ratio: Ratio,
}

impl Default for ShootingStarDetector {
    fn default() -> Self {
        Self {
            shadow_multiple: helpers::SHADOW_BODY_MULTIPLE,
            opposite_shadow_multiple: helpers::OPPOSITE_SHADOW_MULTIPLE,
            min_body_ratio: Ratio::new_const(helpers::MIN_BODY_RATIO),
        }
    }
}

impl PatternDetector for ShootingStarDetector {
    fn name(&self) -> &'static str {
        "SHOOTING_STAR"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::ShootingStar]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let shape = Shape::of(bars.get(index)?)?;
        let confidence = shadow_reversal_confidence(
            shape.upper,
            shape.lower,
            &shape,
            self.shadow_multiple,
            self.opposite_shadow_multiple,
            self.min_body_ratio,
        )?;

        Some(PatternMatch {
            pattern: Pattern::ShootingStar,
            confidence,
            start_index: index,
            end_index: index,
        })
    }

    fn validate_config(&self) -> Result<()> {
        check_multiple("shadow_multiple", self.shadow_multiple)?;
        check_multiple("opposite_shadow_multiple", self.opposite_shadow_multiple)
    }
}

/// Shared rule for Hammer and Shooting Star, which differ only in which shadow dominates.
fn shadow_reversal_confidence(
    dominant: f64,
    opposite: f64,
    shape: &Shape,
    shadow_multiple: f64,
    opposite_multiple: f64,
    min_body_ratio: Ratio,
) -> Option<f64> {
    if shape.body <= 0.0 {
        return None;
    }
    if dominant < shape.body * shadow_multiple {
        return None;
    }
    if opposite > shape.body * opposite_multiple {
        return None;
    }
    if shape.body_ratio() < min_body_ratio.get() {
        return None;
    }

    let score = (SHADOW_CONFIDENCE_BASE + dominant / shape.body * SHADOW_CONFIDENCE_SCALE)
        .min(SHADOW_CONFIDENCE_CAP);
    Some(clamp_confidence(score))
}

// ============================================================
// SPINNING TOP
// ============================================================

/// SPINNING_TOP - small body with shadows at least as long as the body on both sides
#[derive(Debug, Clone, Copy)]
pub struct SpinningTopDetector {
    pub max_body_ratio: Ratio,
}

impl Default for SpinningTopDetector {
    fn default() -> Self {
        Self {
            max_body_ratio: Ratio::new_const(helpers::SPINNING_TOP_BODY_RATIO),
        }
    }
}

impl PatternDetector for SpinningTopDetector {
    fn name(&self) -> &'static str {
        "SPINNING_TOP"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::SpinningTop]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let shape = Shape::of(bars.get(index)?)?;
        let body_ratio = shape.body_ratio();

        if body_ratio > self.max_body_ratio.get() {
            return None;
        }
        if shape.upper < shape.body || shape.lower < shape.body {
            return None;
        }

        let score =
            (SPINNING_TOP_BASE + (1.0 - body_ratio) * SPINNING_TOP_SCALE).min(SPINNING_TOP_CAP);

        Some(PatternMatch {
            pattern: Pattern::SpinningTop,
            confidence: clamp_confidence(score),
            start_index: index,
            end_index: index,
        })
    }
}

// ============================================================
// MARUBOZU
// ============================================================

/// MARUBOZU - body fills (nearly) the whole range; direction follows the candle color
#[derive(Debug, Clone, Copy)]
pub struct MarubozuDetector {
    /// Each shadow may be at most this share of the range
    pub max_shadow_ratio: Ratio,
    pub min_body_ratio: Ratio,
}

impl Default for MarubozuDetector {
    fn default() -> Self {
        Self {
            max_shadow_ratio: Ratio::new_const(helpers::MARUBOZU_SHADOW_RATIO),
            min_body_ratio: Ratio::new_const(helpers::MARUBOZU_BODY_RATIO),
        }
    }
}

impl PatternDetector for MarubozuDetector {
    fn name(&self) -> &'static str {
        "MARUBOZU"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::MarubozuBullish, Pattern::MarubozuBearish]
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let bar = bars.get(index)?;
        let shape = Shape::of(bar)?;
        let max_shadow = self.max_shadow_ratio.get();

        if shape.upper_ratio() > max_shadow || shape.lower_ratio() > max_shadow {
            return None;
        }
        if shape.body_ratio() < self.min_body_ratio.get() {
            return None;
        }

        let pattern = if bar.is_bullish() {
            Pattern::MarubozuBullish
        } else if bar.is_bearish() {
            Pattern::MarubozuBearish
        } else {
            return None;
        };

        Some(PatternMatch {
            pattern,
            confidence: MARUBOZU_CONFIDENCE,
            start_index: index,
            end_index: index,
        })
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static DOJI_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "max_body_ratio",
    helpers::DOJI_BODY_RATIO,
    (0.05, 0.2, 0.05),
    "Maximum body share of the range",
)];

static SHADOW_REVERSAL_PARAMS: &[ParamMeta] = &[
    ParamMeta::multiple(
        "shadow_multiple",
        helpers::SHADOW_BODY_MULTIPLE,
        (1.5, 3.0, 0.5),
        "Minimum dominant shadow as a multiple of the body",
    ),
    ParamMeta::multiple(
        "opposite_shadow_multiple",
        helpers::OPPOSITE_SHADOW_MULTIPLE,
        (0.25, 1.0, 0.25),
        "Maximum opposite shadow as a multiple of the body",
    ),
    ParamMeta::ratio(
        "min_body_ratio",
        helpers::MIN_BODY_RATIO,
        (0.05, 0.2, 0.05),
        "Minimum body share of the range",
    ),
];

static SPINNING_TOP_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "max_body_ratio",
    helpers::SPINNING_TOP_BODY_RATIO,
    (0.2, 0.4, 0.05),
    "Maximum body share of the range",
)];

static MARUBOZU_PARAMS: &[ParamMeta] = &[
    ParamMeta::ratio(
        "max_shadow_ratio",
        helpers::MARUBOZU_SHADOW_RATIO,
        (0.0, 0.05, 0.01),
        "Maximum share of the range for each shadow",
    ),
    ParamMeta::ratio(
        "min_body_ratio",
        helpers::MARUBOZU_BODY_RATIO,
        (0.9, 1.0, 0.01),
        "Minimum body share of the range",
    ),
];

impl ParameterizedDetector for DojiDetector {
    fn param_meta() -> &'static [ParamMeta] {
        DOJI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_body_ratio: get_ratio(params, "max_body_ratio", helpers::DOJI_BODY_RATIO)?,
        })
    }

    fn detector_name() -> &'static str {
        "DOJI"
    }
}

impl ParameterizedDetector for HammerDetector {
    fn param_meta() -> &'static [ParamMeta] {
        SHADOW_REVERSAL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            shadow_multiple: get_multiple(
                params,
                "shadow_multiple",
                helpers::SHADOW_BODY_MULTIPLE,
            )?,
            opposite_shadow_multiple: get_multiple(
                params,
                "opposite_shadow_multiple",
                helpers::OPPOSITE_SHADOW_MULTIPLE,
            )?,
            min_body_ratio: get_ratio(params, "min_body_ratio", helpers::MIN_BODY_RATIO)?,
        })
    }

    fn detector_name() -> &'static str {
        "HAMMER"
    }
}

impl ParameterizedDetector for ShootingStarDetector {
    fn param_meta() -> &'static [ParamMeta] {
        SHADOW_REVERSAL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let hammer = HammerDetector::with_params(params)?;
        Ok(Self {
            shadow_multiple: hammer.shadow_multiple,
            opposite_shadow_multiple: hammer.opposite_shadow_multiple,
            min_body_ratio: hammer.min_body_ratio,
        })
    }

    fn detector_name() -> &'static str {
        "SHOOTING_STAR"
    }
}

impl ParameterizedDetector for SpinningTopDetector {
    fn param_meta() -> &'static [ParamMeta] {
        SPINNING_TOP_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_body_ratio: get_ratio(
                params,
                "max_body_ratio",
                helpers::SPINNING_TOP_BODY_RATIO,
            )?,
        })
    }

    fn detector_name() -> &'static str {
        "SPINNING_TOP"
    }
}

impl ParameterizedDetector for MarubozuDetector {
    fn param_meta() -> &'static [ParamMeta] {
        MARUBOZU_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            max_shadow_ratio: get_ratio(
                params,
                "max_shadow_ratio",
                helpers::MARUBOZU_SHADOW_RATIO,
            )?,
            min_body_ratio: get_ratio(params, "min_body_ratio", helpers::MARUBOZU_BODY_RATIO)?,
        })
    }

    fn detector_name() -> &'static str {
        "MARUBOZU"
    }
}
