use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use opening_range_core::{Bar, BarSeries, BarSize, Instrument, RangeAggregator};

const T0: i64 = 1_709_510_400_000;

fn gen_minutes(days: usize) -> BarSeries {
    let mut v = Vec::with_capacity(days * 1440);
    let mut price = 100.0f64;
    for i in 0..days * 1440 {
        let t = T0 + i as i64 * 60_000;
        let o = price;
        let c = o + ((i as f64) * 0.07).sin() * 0.2;
        price = c;
        v.push(Bar { start_time: t, end_time: t + 60_000, open: o, high: o.max(c) + 0.1, low: o.min(c) - 0.1, close: c });
    }
    BarSeries::from_bars(v).expect("ordered")
}

fn bench_backfill(c: &mut Criterion) {
    let instr = Instrument::default();
    let mut group = c.benchmark_group("backfill");
    for &days in &[250usize, 1000usize] {
        let minutes = gen_minutes(days);
        let day_bars = minutes.resample(BarSize::DAY, &instr);
        let opening = minutes.resample(BarSize::minutes(30).expect("size"), &instr);
        group.bench_with_input(BenchmarkId::from_parameter(format!("days{days}")), &days, |b, _| {
            b.iter_batched(
                RangeAggregator::new,
                |agg| {
                    for bar in day_bars.bars() {
                        black_box(agg.on_day_close(bar, &opening, &instr));
                    }
                    agg
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_backfill);
criterion_main!(benches);
