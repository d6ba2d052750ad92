//! Two-bar candlestick pattern detectors
//!
//! Patterns: BULLISH_ENGULFING, BEARISH_ENGULFING, BULLISH_HARAMI, BEARISH_HARAMI,
//! PIERCING_PATTERN, DARK_CLOUD_COVER
//!
//! Each detector looks at the bar pair `(index - 1, index)` and reports the match at `index`.

#![allow(clippy::default_constructed_unit_structs)]

use super::helpers::{body_inside, body_midpoint, clamp_confidence};
use crate::{OHLCVExt, Pattern, PatternDetector, PatternMatch, OHLCV};

impl_with_defaults!(
    EngulfingDetector,
    HaramiDetector,
    PiercingDetector,
    DarkCloudCoverDetector,
);

const ENGULFING_BASE: f64 = 70.0;
const ENGULFING_SCALE: f64 = 50.0;
const ENGULFING_CAP: f64 = 95.0;
const HARAMI_BASE: f64 = 60.0;
const HARAMI_SCALE: f64 = 50.0;
const HARAMI_CAP: f64 = 85.0;
const PENETRATION_CONFIDENCE: f64 = 75.0;

/// Returns `(prev, curr)` for the pair ending at `index`
#[inline]
fn pair<T: OHLCV>(bars: &[T], index: usize) -> Option<(&T, &T)> {
    if index < 1 {
        return None;
    }
    Some((bars.get(index - 1)?, bars.get(index)?))
}

// ============================================================
// ENGULFING
// ============================================================

/// ENGULFING - a larger opposite-color body swallows the previous body (bullish and bearish)
#[derive(Debug, Clone, Copy, Default)]
pub struct EngulfingDetector;

impl PatternDetector for EngulfingDetector {
    fn name(&self) -> &'static str {
        "ENGULFING"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::BullishEngulfing, Pattern::BearishEngulfing]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;

        let prev_body = prev.body();
        let curr_body = curr.body();
        if curr_body <= prev_body {
            return None;
        }

        let pattern = if prev.is_bearish()
            && curr.is_bullish()
            && curr.open() <= prev.close()
            && curr.close() >= prev.open()
        {
            Pattern::BullishEngulfing
        } else if prev.is_bullish()
            && curr.is_bearish()
            && curr.open() >= prev.close()
            && curr.close() <= prev.open()
        {
            Pattern::BearishEngulfing
        } else {
            return None;
        };

        // prev has a color, so prev_body > 0
        let score = (ENGULFING_BASE + (curr_body / prev_body - 1.0) * ENGULFING_SCALE)
            .min(ENGULFING_CAP);

        Some(PatternMatch {
            pattern,
            confidence: clamp_confidence(score),
            start_index: index - 1,
            end_index: index,
        })
    }
}

// ============================================================
// HARAMI
// ============================================================

/// HARAMI - a smaller opposite-color body sits inside the previous body (bullish and bearish)
///
/// Containment is checked body-to-body, not wick-to-wick.
#[derive(Debug, Clone, Copy, Default)]
pub struct HaramiDetector;

impl PatternDetector for HaramiDetector {
    fn name(&self) -> &'static str {
        "HARAMI"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::BullishHarami, Pattern::BearishHarami]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;

        let prev_body = prev.body();
        let curr_body = curr.body();
        if curr_body >= prev_body || !body_inside(curr, prev) {
            return None;
        }

        let pattern = if prev.is_bearish() && curr.is_bullish() {
            Pattern::BullishHarami
        } else if prev.is_bullish() && curr.is_bearish() {
            Pattern::BearishHarami
        } else {
            return None;
        };

        let score =
            (HARAMI_BASE + (1.0 - curr_body / prev_body) * HARAMI_SCALE).min(HARAMI_CAP);

        Some(PatternMatch {
            pattern,
            confidence: clamp_confidence(score),
            start_index: index - 1,
            end_index: index,
        })
    }
}

// ============================================================
// PIERCING / DARK CLOUD COVER
// ============================================================

/// PIERCING_PATTERN - bullish bar opens below the prior bearish close and closes above its
/// body midpoint without reaching its open
#[derive(Debug, Clone, Copy, Default)]
pub struct PiercingDetector;

impl PatternDetector for PiercingDetector {
    fn name(&self) -> &'static str {
        "PIERCING_PATTERN"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::PiercingPattern]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;

        if !prev.is_bearish() || !curr.is_bullish() {
            return None;
        }
        if curr.open() >= prev.close() {
            return None;
        }
        if curr.close() <= body_midpoint(prev) || curr.close() >= prev.open() {
            return None;
        }

        Some(PatternMatch {
            pattern: Pattern::PiercingPattern,
            confidence: PENETRATION_CONFIDENCE,
            start_index: index - 1,
            end_index: index,
        })
    }
}

/// DARK_CLOUD_COVER - bearish bar opens above the prior bullish close and closes below its
/// body midpoint without reaching its open
#[derive(Debug, Clone, Copy, Default)]
pub struct DarkCloudCoverDetector;

impl PatternDetector for DarkCloudCoverDetector {
    fn name(&self) -> &'static str {
        "DARK_CLOUD_COVER"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[Pattern::DarkCloudCover]
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
        let (prev, curr) = pair(bars, index)?;

        if !prev.is_bullish() || !curr.is_bearish() {
            return None;
        }
        if curr.open() <= prev.close() {
            return None;
        }
        if curr.close() >= body_midpoint(prev) || curr.close() <= prev.open() {
            return None;
        }

        Some(PatternMatch {
            pattern: Pattern::DarkCloudCover,
            confidence: PENETRATION_CONFIDENCE,
            start_index: index - 1,
            end_index: index,
        })
    }
}
