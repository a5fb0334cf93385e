//! DSP Benchmarks
//!
//! Performance benchmarks for audio processing operations.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use solidarity::bridging::BridgingAnchorProcessor;
use solidarity::dsp::{analyze_harmonics, Effect, Reverb};
use solidarity::phrase::{PhraseParams, PhraseProcessor, ZipPhrase};

fn sine_wave(frequency: f64, duration_secs: f64, sample_rate: u32) -> Vec<f64> {
    let n = (duration_secs * sample_rate as f64) as usize;
    (0..n)
        .map(|i| (2.0 * std::f64::consts::PI * frequency * i as f64 / sample_rate as f64).sin())
        .collect()
}

fn benchmark_reverb(c: &mut Criterion) {
    let signal = sine_wave(440.0, 1.0, 44100);
    let reverb = Reverb::new(0.7);

    c.bench_function("reverb_1s_mono", |b| {
        b.iter(|| reverb.process(black_box(&signal), 44100).unwrap())
    });
}

fn benchmark_harmonic_analysis(c: &mut Criterion) {
    let signal = sine_wave(440.0, 1.0, 44100);

    c.bench_function("harmonic_analysis_1s", |b| {
        b.iter(|| analyze_harmonics(black_box(&signal), 44100).unwrap())
    });
}

fn benchmark_phrases(c: &mut Criterion) {
    let signal = sine_wave(440.0, 1.0, 44100);
    let params = PhraseParams::default();
    let mut processor = PhraseProcessor::new(44100);

    c.bench_function("zip_phrase_spatial_1s", |b| {
        b.iter(|| {
            processor
                .process(black_box(&signal), ZipPhrase::Spatial, &params)
                .unwrap()
        })
    });
}

fn benchmark_bridging(c: &mut Criterion) {
    let signal = sine_wave(440.0, 1.0, 44100);
    let processor = BridgingAnchorProcessor::new();

    c.bench_function("bridging_full_1s", |b| {
        b.iter(|| processor.full_process(black_box(&signal), true, 7).unwrap())
    });
}

criterion_group!(
    benches,
    benchmark_reverb,
    benchmark_harmonic_analysis,
    benchmark_phrases,
    benchmark_bridging
);
criterion_main!(benches);
