//! Benchmarks for candlestick pattern detection.

use candlewise::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Generate realistic random bars
fn generate_bars(n: usize) -> Vec<Candle> {
  let mut bars = Vec::with_capacity(n);
  let mut price = 100.0;

  for i in 0..n {
    let change = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let volatility = 2.0 + ((i * 3) % 10) as f64 / 5.0;

    let o = price;
    let c = price + change;
    let h = o.max(c) + volatility * 0.5;
    let l = o.min(c) - volatility * 0.5;

    bars.push(Candle::new(i as i64 * 60_000, o, h, l, c, 1000.0));
    price = c;
  }

  bars
}

fn bench_single_pattern(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let engine =
    EngineBuilder::new().add(BuiltinDetector::Doji(DojiDetector::with_defaults())).build().unwrap();

  c.bench_function("scan_doji_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan(black_box(&bars)));
    })
  });
}

fn bench_detect_all(c: &mut Criterion) {
  let bars = generate_bars(1000);

  c.bench_function("detect_all_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(detect_all(black_box(&bars)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let engine = PatternEngine::with_defaults();

  let mut group = c.benchmark_group("scaling");

  for size in [100, 500, 1000, 5000, 10000].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("detect", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(engine.detect(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_parallel_scan(c: &mut Criterion) {
  let bars1 = generate_bars(1000);
  let bars2 = generate_bars(1000);
  let bars3 = generate_bars(1000);
  let bars4 = generate_bars(1000);

  let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

  let instruments: Vec<(&str, &[Candle])> =
    vec![("SYM1", &bars1), ("SYM2", &bars2), ("SYM3", &bars3), ("SYM4", &bars4)];

  c.bench_function("parallel_scan_4_instruments", |b| {
    b.iter(|| {
      let _ = black_box(scan_parallel(black_box(&engine), black_box(instruments.clone())));
    })
  });
}

fn bench_scan_at(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let engine = EngineBuilder::new().with_all_defaults().build().unwrap();

  c.bench_function("scan_at_single_bar", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan_at(black_box(&bars), black_box(500)));
    })
  });
}

fn bench_summary(c: &mut Criterion) {
  let detections = detect_all(&generate_bars(5000));

  c.bench_function("summary_5000_bars", |b| {
    b.iter(|| {
      let _ = black_box(PatternSummary::from_detections(black_box(&detections)));
    })
  });
}

criterion_group!(
  benches,
  bench_single_pattern,
  bench_detect_all,
  bench_scaling,
  bench_parallel_scan,
  bench_scan_at,
  bench_summary,
);

criterion_main!(benches);
