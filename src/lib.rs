//! # candlewise - deterministic candlestick pattern detection
//!
//! Scans an ordered OHLC series (oldest first) and reports every occurrence of 16 classic
//! candlestick patterns with a heuristic confidence score, a strength bucket and a fixed
//! bullish/bearish/neutral signal.
//!
//! ## Quick Start
//!
//! ```rust
//! use candlewise::prelude::*;
//!
//! let bars = vec![
//!     Candle::new(1, 100.0, 101.0, 89.0, 90.0, 0.0),
//!     Candle::new(2, 100.0, 101.0, 89.0, 90.0, 0.0),
//!     Candle::new(3, 88.0, 105.0, 87.0, 104.0, 0.0),
//! ];
//!
//! // Every builtin rule, no filters
//! let detections = detect_all(&bars);
//! assert!(detections.iter().any(|d| d.pattern == Pattern::BullishEngulfing));
//!
//! // Or a configured engine
//! let engine = EngineBuilder::new()
//!     .with_two_bar_defaults()
//!     .min_strength(Strength::Strong)
//!     .build()
//!     .unwrap();
//! let strong = engine.scan(&bars).unwrap();
//! assert_eq!(strong.len(), 1);
//! ```

use std::sync::LazyLock;

use tracing::{debug, trace, warn};

pub mod detectors;
pub mod params;
pub mod summary;

pub mod prelude {
    pub use crate::{
        // Entry point
        detect_all,
        // Detectors
        detectors::*,
        // Parameters
        params::{get_multiple, get_ratio, ParamMeta, ParamType, ParameterizedDetector},
        // Parallel
        scan_parallel,
        // Summary
        summary::PatternSummary,
        // Iterator
        BarPatterns,
        // Engine
        BuiltinDetector,
        // Types
        Candle,
        EngineBuilder,
        EngineConfig,
        OHLCVExt,
        Pattern,
        PatternCategory,
        PatternDetection,
        // Core traits
        PatternDetector,
        PatternEngine,
        // Errors
        PatternError,
        PatternIterator,
        PatternMatch,
        PatternMetadata,
        Ratio,
        Result,
        ScanError,
        ScanResult,
        Signal,
        Strength,
        OHLCV,
    };
}

/// Series shorter than this never produce detections.
pub const MIN_SERIES_LEN: usize = 3;

/// First index evaluated by a scan; every rule can look back two bars from here.
const FIRST_SCAN_INDEX: usize = MIN_SERIES_LEN - 1;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors from the opt-in validating paths (candle validation, detector/engine config).
/// Plain detection never fails.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
///
/// `timestamp` only labels and orders detections; the rules never read it.
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
    fn timestamp(&self) -> i64;
}

impl<T: OHLCV + ?Sized> OHLCV for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }

    fn timestamp(&self) -> i64 {
        (**self).timestamp()
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Body as ratio of range. Returns None for a zero-range candle
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > 0.0).then(|| self.body() / range)
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) || self.volume().is_nan() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) || self.volume().is_infinite() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if prices.iter().any(|p| *p < 0.0) || self.volume() < 0.0 {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "negative value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.open().max(self.close()) > self.high() || self.open().min(self.close()) < self.low()
        {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "body outside high/low range",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

/// One time-bucketed OHLCV record
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

// ============================================================
// PATTERNS
// ============================================================

/// Directional bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Bullish,
    Neutral,
    Bearish,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Bullish => "BULLISH",
            Signal::Neutral => "NEUTRAL",
            Signal::Bearish => "BEARISH",
        }
    }
}

/// Confidence bucket: `Strong` at 80+, `Moderate` at 60+, `Weak` below
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= detectors::STRONG_CONFIDENCE {
            Strength::Strong
        } else if confidence >= detectors::MODERATE_CONFIDENCE {
            Strength::Moderate
        } else {
            Strength::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strength::Weak => "WEAK",
            Strength::Moderate => "MODERATE",
            Strength::Strong => "STRONG",
        }
    }
}

/// Category of pattern by number of bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternCategory {
    SingleBar,
    TwoBar,
    ThreeBar,
}

impl PatternCategory {
    /// Number of bars the pattern spans
    pub fn bars(self) -> usize {
        match self {
            PatternCategory::SingleBar => 1,
            PatternCategory::TwoBar => 2,
            PatternCategory::ThreeBar => 3,
        }
    }
}

/// Every pattern kind the detector can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Pattern {
    Doji,
    Hammer,
    ShootingStar,
    SpinningTop,
    MarubozuBullish,
    MarubozuBearish,
    BullishEngulfing,
    BearishEngulfing,
    BullishHarami,
    BearishHarami,
    PiercingPattern,
    DarkCloudCover,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
    MorningStar,
    EveningStar,
}

/// Static per-pattern facts
#[derive(Debug, Clone, Copy)]
pub struct PatternMetadata {
    pub pattern: Pattern,
    pub name: &'static str,
    pub signal: Signal,
    pub description: &'static str,
    pub category: PatternCategory,
}

macro_rules! pattern_table {
    ($($variant:ident => $name:literal, $signal:ident, $category:ident, $description:literal;)*) => {
        impl Pattern {
            /// All patterns, in declaration order
            pub const ALL: &'static [Pattern] = &[$(Pattern::$variant),*];
        }

        static PATTERN_TABLE: &[PatternMetadata] = &[
            $(PatternMetadata {
                pattern: Pattern::$variant,
                name: $name,
                signal: Signal::$signal,
                description: $description,
                category: PatternCategory::$category,
            }),*
        ];
    };
}

pattern_table! {
    Doji => "DOJI", Neutral, SingleBar,
        "Open and close are nearly equal: the market is undecided";
    Hammer => "HAMMER", Bullish, SingleBar,
        "Small body near the high with a long lower shadow: sellers were rejected, possible bullish reversal";
    ShootingStar => "SHOOTING_STAR", Bearish, SingleBar,
        "Small body near the low with a long upper shadow: buyers were rejected, possible bearish reversal";
    SpinningTop => "SPINNING_TOP", Neutral, SingleBar,
        "Small body with long shadows on both sides: indecision between buyers and sellers";
    MarubozuBullish => "MARUBOZU_BULLISH", Bullish, SingleBar,
        "Full bullish body with almost no shadows: buyers controlled the whole session";
    MarubozuBearish => "MARUBOZU_BEARISH", Bearish, SingleBar,
        "Full bearish body with almost no shadows: sellers controlled the whole session";
    BullishEngulfing => "BULLISH_ENGULFING", Bullish, TwoBar,
        "A large bullish candle swallows the previous bearish body: strong bullish reversal";
    BearishEngulfing => "BEARISH_ENGULFING", Bearish, TwoBar,
        "A large bearish candle swallows the previous bullish body: strong bearish reversal";
    BullishHarami => "BULLISH_HARAMI", Bullish, TwoBar,
        "A small bullish body inside the previous bearish body: selling momentum is fading";
    BearishHarami => "BEARISH_HARAMI", Bearish, TwoBar,
        "A small bearish body inside the previous bullish body: buying momentum is fading";
    PiercingPattern => "PIERCING_PATTERN", Bullish, TwoBar,
        "Bullish candle opens below the prior close and recovers past the midpoint of the prior bearish body";
    DarkCloudCover => "DARK_CLOUD_COVER", Bearish, TwoBar,
        "Bearish candle opens above the prior close and falls past the midpoint of the prior bullish body";
    ThreeWhiteSoldiers => "THREE_WHITE_SOLDIERS", Bullish, ThreeBar,
        "Three rising bullish candles in a row: steady buying pressure";
    ThreeBlackCrows => "THREE_BLACK_CROWS", Bearish, ThreeBar,
        "Three falling bearish candles in a row: steady selling pressure";
    MorningStar => "MORNING_STAR", Bullish, ThreeBar,
        "Bearish candle, small-bodied star, then a strong bullish close: bottom reversal";
    EveningStar => "EVENING_STAR", Bearish, ThreeBar,
        "Bullish candle, small-bodied star, then a strong bearish close: top reversal";
}

impl Pattern {
    #[inline]
    pub fn metadata(self) -> &'static PatternMetadata {
        &PATTERN_TABLE[self as usize]
    }

    /// Wire name, e.g. `"BULLISH_ENGULFING"`
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.metadata().name
    }

    #[inline]
    pub fn signal(self) -> Signal {
        self.metadata().signal
    }

    #[inline]
    pub fn description(self) -> &'static str {
        self.metadata().description
    }

    #[inline]
    pub fn category(self) -> PatternCategory {
        self.metadata().category
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================
// DETECTION RESULTS
// ============================================================

/// Raw rule output - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternMatch {
    pub pattern: Pattern,
    /// Heuristic score 0.0..=100.0
    pub confidence: f64,
    pub start_index: usize,
    pub end_index: usize,
}

/// A pattern occurrence in a series, as handed to chart overlays and alerting
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PatternDetection {
    /// Index of the bar completing the pattern
    pub index: usize,
    pub start_index: usize,
    pub timestamp: i64,
    pub pattern: Pattern,
    pub signal: Signal,
    pub strength: Strength,
    pub description: &'static str,
    pub confidence: f64,
}

impl PatternDetection {
    pub fn from_match(m: PatternMatch, timestamp: i64) -> Self {
        let meta = m.pattern.metadata();
        Self {
            index: m.end_index,
            start_index: m.start_index,
            timestamp,
            pattern: m.pattern,
            signal: meta.signal,
            strength: Strength::from_confidence(m.confidence),
            description: meta.description,
            confidence: m.confidence,
        }
    }
}

// ============================================================
// PATTERN DETECTOR TRAIT
// ============================================================

/// A single detection rule
pub trait PatternDetector: Send + Sync {
    /// Rule name; rules covering both directions use the shared name ("ENGULFING")
    fn name(&self) -> &'static str;
    /// Patterns this rule can emit
    fn patterns(&self) -> &'static [Pattern];
    /// Bars the rule needs, counting the bar at `index`
    fn min_bars(&self) -> usize;
    /// Evaluate the rule for the pattern completing at `index`; fires at most once
    fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch>;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN DETECTORS - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinDetector enum without boilerplate
macro_rules! define_builtin_detectors {
    (
        $(
            $variant:ident($detector:ty)
        ),* $(,)?
    ) => {
        /// All builtin detectors - static dispatch via enum
        #[derive(Debug, Clone)]
        pub enum BuiltinDetector {
            $($variant($detector)),*
        }

        impl BuiltinDetector {
            #[inline]
            pub fn detect<T: OHLCV>(&self, bars: &[T], index: usize) -> Option<PatternMatch> {
                match self {
                    $(Self::$variant(d) => PatternDetector::detect(d, bars, index)),*
                }
            }

            #[inline]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(d) => PatternDetector::name(d)),*
                }
            }

            #[inline]
            pub fn patterns(&self) -> &'static [Pattern] {
                match self {
                    $(Self::$variant(d) => PatternDetector::patterns(d)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(d) => PatternDetector::min_bars(d)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(d) => PatternDetector::validate_config(d)),*
                }
            }
        }
    };
}

define_builtin_detectors! {
    // Single bar
    Doji(DojiDetector),
    Hammer(HammerDetector),
    ShootingStar(ShootingStarDetector),
    SpinningTop(SpinningTopDetector),
    Marubozu(MarubozuDetector),

    // Two bar
    Engulfing(EngulfingDetector),
    Harami(HaramiDetector),
    Piercing(PiercingDetector),
    DarkCloudCover(DarkCloudCoverDetector),

    // Three bar
    ThreeWhiteSoldiers(ThreeWhiteSoldiersDetector),
    ThreeBlackCrows(ThreeBlackCrowsDetector),
    MorningStar(MorningStarDetector),
    EveningStar(EveningStarDetector),
}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Engine configuration. The default applies no filtering and no validation.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_confidence: Option<f64>,
    pub min_strength: Option<Strength>,
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<Pattern>>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(min) = self.min_confidence {
            if !(detectors::MIN_CONFIDENCE..=detectors::MAX_CONFIDENCE).contains(&min) {
                return Err(PatternError::OutOfRange {
                    field: "min_confidence",
                    value: min,
                    min: detectors::MIN_CONFIDENCE,
                    max: detectors::MAX_CONFIDENCE,
                });
            }
        }
        if matches!(&self.pattern_filter, Some(filter) if filter.is_empty()) {
            return Err(PatternError::InvalidConfig(
                "pattern_filter must name at least one pattern".to_string(),
            ));
        }
        Ok(())
    }
}

/// Main pattern detection engine
#[derive(Debug, Clone)]
pub struct PatternEngine {
    builtin: Vec<BuiltinDetector>,
    config: EngineConfig,
}

static DEFAULT_ENGINE: LazyLock<PatternEngine> = LazyLock::new(PatternEngine::with_defaults);

/// Detect every builtin pattern over `bars` (oldest first), most recent first.
///
/// Returns an empty vector for fewer than three bars. Never fails: degenerate candles
/// simply contribute no detections.
pub fn detect_all<T: OHLCV>(bars: &[T]) -> Vec<PatternDetection> {
    DEFAULT_ENGINE.detect(bars)
}

impl PatternEngine {
    /// Engine with every builtin rule in default evaluation order and no filters
    pub fn with_defaults() -> Self {
        Self {
            builtin: EngineBuilder::new().with_all_defaults().builtin,
            config: EngineConfig::default(),
        }
    }

    pub fn detectors(&self) -> &[BuiltinDetector] {
        &self.builtin
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ===========================================
    // Single bar / range
    // ===========================================

    /// Detections completing at `index`, in rule evaluation order.
    ///
    /// Empty for the first two bars and for out-of-range indices.
    pub fn scan_at<T: OHLCV>(&self, bars: &[T], index: usize) -> Vec<PatternDetection> {
        let mut results = Vec::new();
        self.scan_at_into(bars, index, &mut results);
        results
    }

    // ===========================================
    // Batch processing
    // ===========================================

    /// Scan all bars; most recent detections first. Infallible: no data validation.
    pub fn detect<T: OHLCV>(&self, bars: &[T]) -> Vec<PatternDetection> {
        let mut results = Vec::new();
        if bars.len() < MIN_SERIES_LEN {
            debug!(bars = bars.len(), "series too short for pattern scan");
            return results;
        }

        for i in FIRST_SCAN_INDEX..bars.len() {
            self.scan_at_into(bars, i, &mut results);
        }

        // stable: same-timestamp detections keep evaluation order
        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        debug!(
            bars = bars.len(),
            detections = results.len(),
            "pattern scan complete"
        );
        results
    }

    /// Like [`detect`](Self::detect), but validates candles first when
    /// `validate_data` is enabled.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<PatternDetection>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }
        Ok(self.detect(bars))
    }

    /// Scan and return detections grouped by bar index, oldest bar first.
    pub fn scan_grouped<T: OHLCV>(&self, bars: &[T]) -> Result<Vec<Vec<PatternDetection>>> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }

        let mut grouped = vec![Vec::new(); bars.len()];
        if bars.len() >= MIN_SERIES_LEN {
            for (i, slot) in grouped.iter_mut().enumerate().skip(FIRST_SCAN_INDEX) {
                self.scan_at_into(bars, i, slot);
            }
        }
        Ok(grouped)
    }

    /// Create an iterator over bars with their patterns.
    pub fn iter<'a, T: OHLCV>(&'a self, bars: &'a [T]) -> PatternIterator<'a, T> {
        PatternIterator::new(self, bars)
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn scan_at_into<T: OHLCV>(&self, bars: &[T], index: usize, out: &mut Vec<PatternDetection>) {
        if index < FIRST_SCAN_INDEX || bars.len() < MIN_SERIES_LEN {
            return;
        }
        let Some(bar) = bars.get(index) else {
            return;
        };
        let timestamp = bar.timestamp();

        for detector in &self.builtin {
            if let Some(m) = detector.detect(bars, index) {
                let detection = PatternDetection::from_match(m, timestamp);
                if self.should_include(&detection) {
                    trace!(
                        index,
                        pattern = detection.pattern.as_str(),
                        signal = detection.signal.as_str(),
                        strength = detection.strength.as_str(),
                        confidence = detection.confidence,
                        "pattern detected"
                    );
                    out.push(detection);
                }
            }
        }
    }

    fn should_include(&self, d: &PatternDetection) -> bool {
        if let Some(min) = self.config.min_confidence {
            if d.confidence < min {
                return false;
            }
        }
        if let Some(min) = self.config.min_strength {
            if d.strength < min {
                return false;
            }
        }
        if let Some(ref filter) = self.config.pattern_filter {
            if !filter.contains(&d.pattern) {
                return false;
            }
        }
        true
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| {
                let e = match e {
                    PatternError::InvalidOHLCV { reason, .. } => {
                        PatternError::InvalidOHLCV { index: i, reason }
                    }
                    other => other,
                };
                warn!(index = i, error = %e, "rejecting candle series");
                e
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for d in &self.builtin {
            d.validate_config()?;
        }
        self.config.validate()
    }
}

// ============================================================
// PATTERN ITERATOR
// ============================================================

/// Patterns completing at a specific bar
#[derive(Debug, Clone)]
pub struct BarPatterns {
    pub index: usize,
    pub patterns: Vec<PatternDetection>,
}

/// Iterator over bars (oldest first) with the patterns completing at each
pub struct PatternIterator<'a, T: OHLCV> {
    engine: &'a PatternEngine,
    bars: &'a [T],
    current: usize,
}

impl<'a, T: OHLCV> PatternIterator<'a, T> {
    fn new(engine: &'a PatternEngine, bars: &'a [T]) -> Self {
        Self {
            engine,
            bars,
            current: 0,
        }
    }
}

impl<'a, T: OHLCV> Iterator for PatternIterator<'a, T> {
    type Item = BarPatterns;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.bars.len() {
            return None;
        }

        let index = self.current;
        let patterns = self.engine.scan_at(self.bars, index);

        self.current += 1;

        Some(BarPatterns { index, patterns })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bars.len().saturating_sub(self.current);
        (remaining, Some(remaining))
    }
}

impl<'a, T: OHLCV> ExactSizeIterator for PatternIterator<'a, T> {}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternEngine instances
#[derive(Debug, Clone, Default)]
pub struct EngineBuilder {
    builtin: Vec<BuiltinDetector>,
    config: EngineConfig,
}

/// Generate an array of `BuiltinDetector` variants using `Default::default()` for each inner type.
macro_rules! builtin_defaults {
  ($($variant:ident),* $(,)?) => {
    [$(BuiltinDetector::$variant(Default::default())),*]
  };
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all builtin rules with default thresholds: single, then two, then three bar
    pub fn with_all_defaults(self) -> Self {
        self.with_single_bar_defaults()
            .with_two_bar_defaults()
            .with_three_bar_defaults()
    }

    /// Add single-bar rules with defaults (5)
    pub fn with_single_bar_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            Doji,
            Hammer,
            ShootingStar,
            SpinningTop,
            Marubozu,
        ]);
        self
    }

    /// Add two-bar rules with defaults (4)
    pub fn with_two_bar_defaults(mut self) -> Self {
        self.builtin
            .extend(builtin_defaults![Engulfing, Harami, Piercing, DarkCloudCover]);
        self
    }

    /// Add three-bar rules with defaults (4)
    pub fn with_three_bar_defaults(mut self) -> Self {
        self.builtin.extend(builtin_defaults![
            ThreeWhiteSoldiers,
            ThreeBlackCrows,
            MorningStar,
            EveningStar,
        ]);
        self
    }

    /// Add a builtin detector
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, detector: BuiltinDetector) -> Self {
        self.builtin.push(detector);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, detector: BuiltinDetector) -> Result<Self> {
        detector.validate_config()?;
        self.builtin.push(detector);
        Ok(self)
    }

    /// Replace the whole engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Drop detections below this confidence
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Drop detections below this strength
    pub fn min_strength(mut self, strength: Strength) -> Self {
        self.config.min_strength = Some(strength);
        self
    }

    /// Enable/disable data validation in `scan` / `scan_grouped`
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Keep only these patterns
    pub fn only_patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.config.pattern_filter = Some(patterns.into_iter().collect());
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<PatternEngine> {
        let engine = PatternEngine {
            builtin: self.builtin,
            config: self.config,
        };
        engine.validate()?;
        debug!(
            detectors = engine.builtin.len(),
            config = ?engine.config,
            "pattern engine built"
        );
        Ok(engine)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub detections: Vec<PatternDetection>,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: PatternError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(
    engine: &PatternEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|detections| ScanResult {
                    symbol: symbol.to_string(),
                    detections,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    debug!(
        scanned = successes.len(),
        failed = errors.len(),
        "parallel scan complete"
    );
    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
