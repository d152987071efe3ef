use criterion::{criterion_group, criterion_main, Criterion};
use fit_tracker::services::{FixedClock, RunRecordingSession};
use std::hint::black_box;
use std::sync::Arc;

/// Synthetic accelerometer trace: gravity plus a stride bump every few samples
/// and some deterministic jitter.
fn synthetic_trace(len: usize) -> Vec<(f64, f64, f64)> {
    (0..len)
        .map(|i| {
            let jitter = ((i * 7919) % 100) as f64 / 100.0 - 0.5;
            let stride = if i % 5 == 0 { 3.5 } else { 0.0 };
            (0.1 * jitter, 0.2 * jitter, 9.81 + stride + jitter)
        })
        .collect()
}

fn benchmark_step_detection(c: &mut Criterion) {
    let clock = Arc::new(FixedClock(
        chrono::NaiveDate::from_ymd_opt(2025, 10, 4).expect("valid date"),
    ));
    // About ten minutes of samples at 50 Hz.
    let trace = synthetic_trace(30_000);

    let mut group = c.benchmark_group("step_detection");

    group.bench_function("running_session", |b| {
        b.iter(|| {
            let mut session = RunRecordingSession::new(clock.clone());
            session.start();
            for &(x, y, z) in &trace {
                session.on_motion_sample(black_box(x), black_box(y), black_box(z));
            }
            session.step_count()
        })
    });

    group.bench_function("paused_session", |b| {
        b.iter(|| {
            let mut session = RunRecordingSession::new(clock.clone());
            session.start();
            session.toggle_pause();
            for &(x, y, z) in &trace {
                session.on_motion_sample(black_box(x), black_box(y), black_box(z));
            }
            session.step_count()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_step_detection);
criterion_main!(benches);
