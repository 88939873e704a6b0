// SPDX-License-Identifier: LGPL-3.0-or-later

//! Criterion benchmarks for the peak limiter and its components.

use brickwall_dsp::dynamics::limiter::Limiter;
use brickwall_dsp::meters::true_peak::TruePeakUpsampler;
use brickwall_dsp::util::moving_min::MovingMin;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

const BUF_SIZE: usize = 1024;

/// Generate a deterministic white noise buffer using a simple LCG.
fn white_noise(len: usize, seed: u64) -> Vec<f32> {
    let mut state: u64 = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as i32) as f32 / (i32::MAX as f32)
        })
        .collect()
}

fn bench_limiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("limiter");
    let input = white_noise(2 * BUF_SIZE, 0xDEAD_BEEF_CAFE_BABE);
    let mut output = vec![0.0f32; 2 * BUF_SIZE];

    group.bench_function("digital_stereo_1024", |b| {
        let mut limiter = Limiter::new();
        limiter.init(48000.0, 2);
        limiter.set_inpgain(6.0);
        limiter.set_threshold(-1.0);
        limiter.set_release(0.05);

        b.iter(|| {
            limiter.process(black_box(&input), black_box(&mut output));
        });
    });

    group.bench_function("truepeak_stereo_1024", |b| {
        let mut limiter = Limiter::new();
        limiter.init(48000.0, 2);
        limiter.set_inpgain(6.0);
        limiter.set_threshold(-1.0);
        limiter.set_release(0.05);
        limiter.set_truepeak(true);

        b.iter(|| {
            limiter.process(black_box(&input), black_box(&mut output));
        });
    });

    group.finish();
}

fn bench_upsampler(c: &mut Criterion) {
    let mut group = c.benchmark_group("true_peak_upsampler");
    let input = white_noise(BUF_SIZE, 0xCAFE_BABE_DEAD_BEEF);

    group.bench_function("mono_1024", |b| {
        let mut up = TruePeakUpsampler::new();
        up.init(1);

        b.iter(|| up.process(0.0, black_box(&input)));
    });

    group.finish();
}

fn bench_moving_min(c: &mut Criterion) {
    let mut group = c.benchmark_group("moving_min");
    let values: Vec<f32> = white_noise(BUF_SIZE, 0x0123_4567_89AB_CDEF)
        .iter()
        .map(|v| 0.5 + 0.45 * v)
        .collect();

    group.bench_function("write_1024", |b| {
        let mut mm = MovingMin::new();
        mm.init(9);

        b.iter(|| {
            let mut acc = 0.0f32;
            for &v in black_box(&values) {
                acc += mm.write(v);
            }
            acc
        });
    });

    group.finish();
}

criterion_group!(benches, bench_limiter, bench_upsampler, bench_moving_min);
criterion_main!(benches);
