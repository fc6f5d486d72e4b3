// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::f64::consts::PI;

use ndarray::{Array1, Array2, Axis};
use rust_temporal_filter::preprocessing::filter::{Filter, FilterSpec};
use rust_temporal_filter::preprocessing::passband::{Cutoff, Passband, SamplingRate};
use rust_temporal_filter::preprocessing::temporal::{general_filter, TemporalFilter};
use rust_temporal_filter::FilterError;

/// Root mean square of the middle half of a series, away from edge effects
fn central_rms(series: ndarray::ArrayView1<f64>) -> f64 {
    let n = series.len();
    let centre = series.slice(ndarray::s![n / 4..3 * n / 4]);
    (centre.mapv(|x| x * x).sum() / centre.len() as f64).sqrt()
}

fn sine(samples: usize, frequency: f64, rate: f64) -> Array1<f64> {
    Array1::from_shape_fn(samples, |t| (2.0 * PI * frequency * t as f64 / rate).sin())
}

#[test]
fn test_bandpass_keeps_band_and_rejects_outside() {
    // TR = 2 s, band 0.01-0.08 Hz
    let rate = SamplingRate::from_repetition_time(2.0).unwrap();
    let passband = Passband::band(0.01, 0.08);

    for tag in ["butterworth", "cheby1", "cheby2", "elliptic"] {
        let spec = FilterSpec::from_parts(tag, 2, Some(1.0), Some(40.0)).unwrap();
        let filter = TemporalFilter::new(spec, passband, rate).unwrap();

        let slow = sine(600, 0.0015, 0.5);
        let fast = sine(600, 0.22, 0.5);
        let mut data = Array2::zeros((3, 600));
        data.row_mut(0).assign(&slow);
        data.row_mut(1).assign(&fast);
        data.row_mut(2).assign(&sine(600, 0.029, 0.5));

        let filtered = filter.apply(data.view()).unwrap();

        let in_band = central_rms(filtered.row(2)) / central_rms(data.row(2));
        assert!(in_band > 0.7, "{}: in-band gain {}", tag, in_band);
        assert!(
            central_rms(filtered.row(0)) < 0.2 * central_rms(slow.view()),
            "{}: slow drift not attenuated",
            tag
        );
        assert!(
            central_rms(filtered.row(1)) < 0.05 * central_rms(fast.view()),
            "{}: fast oscillation not attenuated",
            tag
        );
    }
}

#[test]
fn test_rows_are_filtered_independently() {
    let rate = SamplingRate::hz(1.0).unwrap();
    let spec = FilterSpec::butterworth(2).unwrap();
    let passband = Passband::band(0.05, 0.2);

    let a = sine(200, 0.1, 1.0);
    let b = sine(200, 0.3, 1.0) * 4.0 + 10.0;
    let mut both = Array2::zeros((2, 200));
    both.row_mut(0).assign(&a);
    both.row_mut(1).assign(&b);

    let together = general_filter(both.view(), rate, spec, passband).unwrap();
    let alone = general_filter(b.view().insert_axis(Axis(0)), rate, spec, passband).unwrap();

    for (x, y) in together.row(1).iter().zip(alone.row(0).iter()) {
        assert!((x - y).abs() < 1e-12);
    }
}

#[test]
fn test_mean_is_restored() {
    let rate = SamplingRate::hz(1.0).unwrap();
    let filter = TemporalFilter::new(
        FilterSpec::butterworth(1).unwrap(),
        Passband::highpass(0.1),
        rate,
    )
    .unwrap();

    let row = sine(300, 0.3, 1.0) + 250.0;
    let filtered = filter.apply(row.view().insert_axis(Axis(0))).unwrap();
    let mean = filtered.row(0).mean().unwrap();
    assert!((mean - 250.0).abs() < 0.05, "mean {}", mean);
}

#[test]
fn test_nan_everywhere_stays_nan() {
    let rate = SamplingRate::hz(1.0).unwrap();
    let filter = TemporalFilter::new(
        FilterSpec::butterworth(1).unwrap(),
        Passband::band(0.05, 0.2),
        rate,
    )
    .unwrap();

    let data = Array2::from_elem((2, 50), f64::NAN);
    let filtered = filter.apply(data.view()).unwrap();
    assert!(filtered.iter().all(|x| x.is_nan()));
}

#[test]
fn test_error_cases() {
    let data = Array2::<f64>::zeros((1, 100));
    let spec = FilterSpec::butterworth(1).unwrap();

    let permissive = general_filter(
        data.view(),
        SamplingRate::hz(1.0).unwrap(),
        spec,
        Passband::new(-1.0, Cutoff::Hz(2.0)),
    );
    assert!(matches!(permissive, Err(FilterError::PermissiveFilter { .. })));

    let short = general_filter(
        Array2::<f64>::zeros((1, 5)).view(),
        SamplingRate::hz(1.0).unwrap(),
        spec,
        Passband::band(0.05, 0.2),
    );
    assert!(matches!(short, Err(FilterError::SeriesTooShort { .. })));

    assert!(matches!(
        SamplingRate::from_repetition_time(0.0),
        Err(FilterError::InvalidSamplingRate(_))
    ));
}

#[test]
fn test_band_with_equal_edges_is_rejected() {
    let data = Array2::<f64>::from_shape_fn((2, 200), |(r, t)| (r + t) as f64);
    let rate = SamplingRate::hz(1.0).unwrap();

    for (tag, rp, rs) in [
        ("butterworth", None, None),
        ("cheby1", Some(1.0), None),
        ("cheby2", None, Some(40.0)),
        ("elliptic", Some(1.0), Some(40.0)),
    ] {
        let spec = FilterSpec::from_parts(tag, 2, rp, rs).unwrap();
        let result = general_filter(data.view(), rate, spec, Passband::band(0.1, 0.1));
        assert!(
            matches!(result, Err(FilterError::InvalidCriticalFrequency(_))),
            "{}: {:?}",
            tag,
            result.map(|filtered| filtered.dim())
        );
    }
}
