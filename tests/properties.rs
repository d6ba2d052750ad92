//! Property tests over arbitrary candle series.

use candlewise::prelude::*;
use proptest::prelude::*;

fn candle_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    let shaped = (1.0..1000.0f64, -50.0..50.0f64, 0.0..20.0f64, 0.0..20.0f64).prop_map(
        |(open, change, up, down)| {
            let close = (open + change).max(0.5);
            let high = open.max(close) + up;
            let low = (open.min(close) - down).max(0.0);
            (open, high, low, close)
        },
    );
    let flat = (1.0..1000.0f64).prop_map(|p| (p, p, p, p));
    let broken = (1.0..1000.0f64, 0..4usize).prop_map(|(p, field)| {
        let mut ohlc = [p, p + 1.0, p - 0.5, p + 0.5];
        ohlc[field] = f64::NAN;
        (ohlc[0], ohlc[1], ohlc[2], ohlc[3])
    });
    prop_oneof![8 => shaped, 1 => flat, 1 => broken]
}

fn series_strategy(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec(candle_strategy(), 0..max_len).prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (o, h, l, c))| Candle::new(i as i64 * 60, o, h, l, c, 1.0))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_detection_is_deterministic(bars in series_strategy(60)) {
        prop_assert_eq!(detect_all(&bars), detect_all(&bars));
    }

    #[test]
    fn prop_short_series_yield_nothing(bars in series_strategy(3)) {
        prop_assert!(detect_all(&bars).is_empty());
    }

    #[test]
    fn prop_confidence_and_strength_agree(bars in series_strategy(80)) {
        for d in detect_all(&bars) {
            prop_assert!((0.0..=100.0).contains(&d.confidence));
            prop_assert_eq!(d.strength, Strength::from_confidence(d.confidence));
        }
    }

    #[test]
    fn prop_signal_and_description_follow_pattern(bars in series_strategy(80)) {
        for d in detect_all(&bars) {
            prop_assert_eq!(d.signal, d.pattern.signal());
            prop_assert_eq!(d.description, d.pattern.description());
        }
    }

    #[test]
    fn prop_indices_in_bounds(bars in series_strategy(80)) {
        for d in detect_all(&bars) {
            prop_assert!(d.index >= 2);
            prop_assert!(d.index < bars.len());
            prop_assert_eq!(d.timestamp, bars[d.index].timestamp);
            prop_assert_eq!(d.index + 1 - d.start_index, d.pattern.category().bars());
        }
    }

    #[test]
    fn prop_most_recent_first(bars in series_strategy(80)) {
        let detections = detect_all(&bars);
        for w in detections.windows(2) {
            prop_assert!(w[0].timestamp >= w[1].timestamp);
        }
    }

    #[test]
    fn prop_one_match_per_rule_per_index(bars in series_strategy(80)) {
        let engine = PatternEngine::with_defaults();
        for (i, group) in engine.scan_grouped(&bars).unwrap().iter().enumerate() {
            prop_assert!(group.len() <= engine.detectors().len());
            for d in group {
                prop_assert_eq!(d.index, i);
                let same = group.iter().filter(|o| o.pattern == d.pattern).count();
                prop_assert_eq!(same, 1);
            }
        }
    }

    #[test]
    fn prop_degenerate_candles_skip_single_bar_rules(bars in series_strategy(40)) {
        for d in detect_all(&bars) {
            let bar = &bars[d.index];
            let finite = [bar.open, bar.high, bar.low, bar.close].iter().all(|p| p.is_finite());
            if !finite || bar.high == bar.low {
                prop_assert_ne!(d.pattern.category(), PatternCategory::SingleBar);
            }
        }
    }

    #[test]
    fn prop_filters_only_remove(bars in series_strategy(80), min in 0.0..=100.0f64) {
        let engine = EngineBuilder::new()
            .with_all_defaults()
            .min_confidence(min)
            .build()
            .unwrap();
        let filtered = engine.detect(&bars);
        let expected: Vec<_> = detect_all(&bars)
            .into_iter()
            .filter(|d| d.confidence >= min)
            .collect();
        prop_assert_eq!(filtered, expected);
    }
}
