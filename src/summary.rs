//! Aggregate view over a detection list
//!
//! Dashboards usually want "what is the market telling me" rather than a raw list; this
//! folds a scan result into counts, a confidence-weighted bias and the headline detections.

use crate::{PatternDetection, Signal, Strength};

/// Counts and headline detections for one scan
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PatternSummary {
  pub total: usize,
  pub bullish: usize,
  pub bearish: usize,
  pub neutral: usize,
  pub strong_count: usize,
  /// Side with the larger summed confidence; `Neutral` on a tie
  pub bias: Signal,
  /// Highest confidence (first in input order on ties)
  pub strongest: Option<PatternDetection>,
  /// Greatest timestamp (first in input order on ties)
  pub latest: Option<PatternDetection>,
}

impl PatternSummary {
  pub fn from_detections(detections: &[PatternDetection]) -> Self {
    let mut bullish = 0;
    let mut bearish = 0;
    let mut neutral = 0;
    let mut strong_count = 0;
    let mut bullish_weight = 0.0;
    let mut bearish_weight = 0.0;
    let mut strongest: Option<&PatternDetection> = None;
    let mut latest: Option<&PatternDetection> = None;

    for d in detections {
      match d.signal {
        Signal::Bullish => {
          bullish += 1;
          bullish_weight += d.confidence;
        },
        Signal::Bearish => {
          bearish += 1;
          bearish_weight += d.confidence;
        },
        Signal::Neutral => neutral += 1,
      }
      if d.strength == Strength::Strong {
        strong_count += 1;
      }
      if strongest.map_or(true, |s| d.confidence > s.confidence) {
        strongest = Some(d);
      }
      if latest.map_or(true, |l| d.timestamp > l.timestamp) {
        latest = Some(d);
      }
    }

    let bias = if bullish_weight > bearish_weight {
      Signal::Bullish
    } else if bearish_weight > bullish_weight {
      Signal::Bearish
    } else {
      Signal::Neutral
    };

    Self {
      total: detections.len(),
      bullish,
      bearish,
      neutral,
      strong_count,
      bias,
      strongest: strongest.cloned(),
      latest: latest.cloned(),
    }
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.total == 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Pattern, PatternMatch};

  fn detection(pattern: Pattern, confidence: f64, index: usize, timestamp: i64) -> PatternDetection {
    PatternDetection::from_match(
      PatternMatch { pattern, confidence, start_index: index, end_index: index },
      timestamp,
    )
  }

  #[test]
  fn test_empty_summary() {
    let summary = PatternSummary::from_detections(&[]);
    assert!(summary.is_empty());
    assert_eq!(summary.bias, Signal::Neutral);
    assert!(summary.strongest.is_none());
    assert!(summary.latest.is_none());
  }

  #[test]
  fn test_counts_and_bias() {
    let detections = vec![
      detection(Pattern::Hammer, 90.0, 5, 500),
      detection(Pattern::Doji, 87.5, 5, 500),
      detection(Pattern::BearishHarami, 70.0, 4, 400),
      detection(Pattern::ThreeBlackCrows, 85.0, 3, 300),
    ];
    let summary = PatternSummary::from_detections(&detections);

    assert_eq!(summary.total, 4);
    assert_eq!(summary.bullish, 1);
    assert_eq!(summary.bearish, 2);
    assert_eq!(summary.neutral, 1);
    assert_eq!(summary.strong_count, 3);
    // 155 bearish vs 90 bullish
    assert_eq!(summary.bias, Signal::Bearish);
    assert_eq!(summary.strongest.unwrap().pattern, Pattern::Hammer);
    assert_eq!(summary.latest.unwrap().pattern, Pattern::Hammer);
  }

  #[test]
  fn test_balanced_bias_is_neutral() {
    let detections = vec![
      detection(Pattern::PiercingPattern, 75.0, 3, 3),
      detection(Pattern::DarkCloudCover, 75.0, 4, 4),
    ];
    let summary = PatternSummary::from_detections(&detections);
    assert_eq!(summary.bias, Signal::Neutral);
  }

  #[test]
  fn test_ties_keep_first() {
    let detections = vec![
      detection(Pattern::MorningStar, 80.0, 9, 9),
      detection(Pattern::SpinningTop, 80.0, 9, 9),
    ];
    let summary = PatternSummary::from_detections(&detections);
    assert_eq!(summary.strongest.unwrap().pattern, Pattern::MorningStar);
    assert_eq!(summary.latest.unwrap().pattern, Pattern::MorningStar);
  }
}
