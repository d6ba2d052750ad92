//! Three-bar candlestick pattern detectors
//!
//! Patterns: THREE_WHITE_SOLDIERS, THREE_BLACK_CROWS, MORNING_STAR, EVENING_STAR

#![allow(clippy::default_constructed_unit_structs)]

use super::helpers::body_midpoint;
use crate::{OHLCVExt, Pattern, PatternDetector, PatternMatch, OHLCV};

impl_with_defaults!(
  ThreeWhiteSoldiersDetector,
  ThreeBlackCrowsDetector,
  MorningStarDetector,
  EveningStarDetector,
);

const THREE_LINE_CONFIDENCE: f64 = 85.0;
const STAR_CONFIDENCE: f64 = 80.0;

/// Returns `(first, second, third)` for the window ending at `index`
#[inline]
fn window<T: OHLCV>(bars: &[T], index: usize) -> Option<(&T, &T, &T)> {
  if index < 2 {
    return None;
  }
  Some((bars.get(index - 2)?, bars.get(index - 1)?, bars.get(index)?))
}

// ============================================================
// THREE WHITE SOLDIERS / THREE BLACK CROWS
// ============================================================

/// THREE_WHITE_SOLDIERS - three bullish bars, each opening and closing above the last
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeWhiteSoldiersDetector;

impl PatternDetector for ThreeWhiteSoldiersDetector {
  fn name(&self) -> &'static str {
    "THREE_WHITE_SOLDIERS"
  }

  fn patterns(&self) -> &'static [Pattern] {
    &[Pattern::ThreeWhiteSoldiers]
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = window(bars, index)?;

    if !(first.is_bullish() && second.is_bullish() && third.is_bullish()) {
      return None;
    }
    if !(first.close() < second.close() && second.close() < third.close()) {
      return None;
    }
    if !(first.open() < second.open() && second.open() < third.open()) {
      return None;
    }

    Some(PatternMatch {
      pattern:     Pattern::ThreeWhiteSoldiers,
      confidence:  THREE_LINE_CONFIDENCE,
      start_index: index - 2,
      end_index:   index,
    })
  }
}

/// THREE_BLACK_CROWS - three bearish bars, each opening and closing below the last
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeBlackCrowsDetector;

impl PatternDetector for ThreeBlackCrowsDetector {
  fn name(&self) -> &'static str {
    "THREE_BLACK_CROWS"
  }

  fn patterns(&self) -> &'static [Pattern] {
    &[Pattern::ThreeBlackCrows]
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = window(bars, index)?;

    if !(first.is_bearish() && second.is_bearish() && third.is_bearish()) {
      return None;
    }
    if !(first.close() > second.close() && second.close() > third.close()) {
      return None;
    }
    if !(first.open() > second.open() && second.open() > third.open()) {
      return None;
    }

    Some(PatternMatch {
      pattern:     Pattern::ThreeBlackCrows,
      confidence:  THREE_LINE_CONFIDENCE,
      start_index: index - 2,
      end_index:   index,
    })
  }
}

// ============================================================
// MORNING STAR / EVENING STAR
// ============================================================

/// Middle bar body is smaller than both neighbours
#[inline]
fn is_star<T: OHLCV>(first: &T, second: &T, third: &T) -> bool {
  let star_body = second.body();
  first.body() > star_body && third.body() > star_body
}

/// MORNING_STAR - bearish bar, small-bodied star, then a bullish bar closing above the
/// first bar's body midpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct MorningStarDetector;

impl PatternDetector for MorningStarDetector {
  fn name(&self) -> &'static str {
    "MORNING_STAR"
  }

  fn patterns(&self) -> &'static [Pattern] {
    &[Pattern::MorningStar]
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = window(bars, index)?;

    if !first.is_bearish() || !third.is_bullish() {
      return None;
    }
    if !is_star(first, second, third) {
      return None;
    }
    if third.close() <= body_midpoint(first) {
      return None;
    }

    Some(PatternMatch {
      pattern:     Pattern::MorningStar,
      confidence:  STAR_CONFIDENCE,
      start_index: index - 2,
      end_index:   index,
    })
  }
}

/// EVENING_STAR - bullish bar, small-bodied star, then a bearish bar closing below the
/// first bar's body midpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct EveningStarDetector;

impl PatternDetector for EveningStarDetector {
  fn name(&self) -> &'static str {
    "EVENING_STAR"
  }

  fn patterns(&self) -> &'static [Pattern] {
    &[Pattern::EveningStar]
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
    let (first, second, third) = window(bars, index)?;

    if !first.is_bullish() || !third.is_bearish() {
      return None;
    }
    if !is_star(first, second, third) {
      return None;
    }
    if third.close() >= body_midpoint(first) {
      return None;
    }

    Some(PatternMatch {
      pattern:     Pattern::EveningStar,
      confidence:  STAR_CONFIDENCE,
      start_index: index - 2,
      end_index:   index,
    })
  }
}
