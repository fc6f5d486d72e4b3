// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Zero-phase temporal filtering of time-series matrices
//!
//! [`TemporalFilter`] validates and normalizes a passband, designs the IIR
//! sections once and then filters any number of matrices. Each row is
//! processed independently:
//!
//! 1. missing samples (NaN) are recorded and replaced by the fill strategy
//! 2. the row mean is subtracted
//! 3. the sections are run forward and backward (`sosfiltfilt`), which
//!    cancels the phase shift and squares the magnitude response
//! 4. the mean is added back and NaN is restored at the recorded positions
//!
//! Rows are filtered in parallel with rayon.
//!
//! # Examples
//!
//! ```no_run
//! use ndarray::Array2;
//! use rust_temporal_filter::preprocessing::filter::{Filter, FilterSpec};
//! use rust_temporal_filter::preprocessing::passband::{Passband, SamplingRate};
//! use rust_temporal_filter::preprocessing::temporal::TemporalFilter;
//!
//! let rate = SamplingRate::from_repetition_time(2.0).unwrap();
//! let filter = TemporalFilter::new(FilterSpec::butterworth(1).unwrap(), Passband::default(), rate).unwrap();
//!
//! let data = Array2::<f64>::zeros((10, 200));
//! let filtered = filter.apply(data.view()).unwrap();
//! assert_eq!(filtered.dim(), (10, 200));
//! ```

use std::sync::Arc;

use anyhow::Context;
use log::{debug, warn};
use ndarray::parallel::prelude::*;
use ndarray::{Array2, ArrayView2, ArrayViewMut1, Axis};
use sci_rs::signal::filter::sosfiltfilt_dyn;
use serde_json::Value;

use super::filter::{self, Filter, FilterCoefficients, FilterFamily, FilterSpec};
use super::missing::{FillMissing, ZeroFill};
use super::passband::{self, Cutoff, NormalizedPassband, Passband, SamplingRate};
use crate::error::{FilterError, Result};

/// Reusable zero-phase IIR filter for matrices of time series
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    sampling_rate: SamplingRate,
    spec: FilterSpec,
    passband: Passband,
    band: NormalizedPassband,
    coefficients: FilterCoefficients,
    fill: Arc<dyn FillMissing>,
}

fn prepare(
    spec: &FilterSpec,
    passband: &Passband,
    sampling_rate: SamplingRate,
) -> Result<(NormalizedPassband, FilterCoefficients)> {
    passband::validate(spec.family.name(), passband)?;
    let band = passband::normalize(passband, sampling_rate)?;
    let coefficients = filter::design(spec, &band)?;
    Ok((band, coefficients))
}

impl TemporalFilter {
    /// Validate the passband and design the filter
    ///
    /// ### Errors
    ///
    /// * [`FilterError::InvalidPassband`] if the low cutoff exceeds the high cutoff
    /// * [`FilterError::PermissiveFilter`] if the band covers 0 to Nyquist
    /// * [`FilterError::InvalidCriticalFrequency`] if a cutoff lands outside (0, Nyquist)
    pub fn new(spec: FilterSpec, passband: Passband, sampling_rate: SamplingRate) -> Result<Self> {
        let (band, coefficients) = prepare(&spec, &passband, sampling_rate)?;
        Ok(Self {
            sampling_rate,
            spec,
            passband,
            band,
            coefficients,
            fill: Arc::new(ZeroFill),
        })
    }

    /// Replace the strategy used for missing samples
    pub fn with_fill_missing(mut self, fill: Arc<dyn FillMissing>) -> Self {
        self.fill = fill;
        self
    }

    pub fn sampling_rate(&self) -> SamplingRate {
        self.sampling_rate
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn passband(&self) -> &Passband {
        &self.passband
    }

    /// Passband relative to Nyquist, with its classification
    pub fn band(&self) -> &NormalizedPassband {
        &self.band
    }

    pub fn coefficients(&self) -> &FilterCoefficients {
        &self.coefficients
    }

    pub fn fill_missing(&self) -> &dyn FillMissing {
        self.fill.as_ref()
    }

    /// Shortest series the forward-backward filter accepts
    pub fn min_samples(&self) -> usize {
        self.coefficients.padding_len() + 1
    }

    fn filter_row(&self, mut row: ArrayViewMut1<f64>) {
        let missing: Vec<usize> = row
            .iter()
            .enumerate()
            .filter(|(_, x)| x.is_nan())
            .map(|(i, _)| i)
            .collect();
        if !missing.is_empty() {
            self.fill.fill(row.view_mut());
        }

        let mean = row.mean().unwrap_or(0.0);
        let centred: Vec<f64> = row.iter().map(|&x| x - mean).collect();
        let filtered = sosfiltfilt_dyn(centred.iter(), self.coefficients.sections());

        for (value, filtered) in row.iter_mut().zip(filtered) {
            *value = filtered + mean;
        }
        for i in missing {
            row[i] = f64::NAN;
        }
    }
}

impl Filter for TemporalFilter {
    fn apply(&self, data: ArrayView2<f64>) -> Result<Array2<f64>> {
        let (rows, samples) = data.dim();
        if rows == 0 {
            return Ok(data.to_owned());
        }

        let required = self.min_samples();
        if samples < required {
            return Err(FilterError::SeriesTooShort { samples, required });
        }

        let missing = data.iter().filter(|x| x.is_nan()).count();
        if missing > 0 {
            warn!(
                "{} missing samples replaced with '{}' placeholders before filtering; \
                 neighbouring samples may be distorted",
                missing,
                self.fill.name()
            );
        }

        debug!(
            "Filtering {} series of {} samples ({} band, {} sections) on {} threads",
            rows,
            samples,
            self.band.classification(),
            self.coefficients.sections().len(),
            rayon::current_num_threads()
        );

        let mut output = data.to_owned();
        output
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(|row| self.filter_row(row));

        Ok(output)
    }

    fn update_config(&mut self, parameters: &Value) -> anyhow::Result<bool> {
        let mut updated = false;
        let mut spec = self.spec;
        let mut passband = self.passband;
        let mut sampling_rate = self.sampling_rate;

        if let Some(tag) = parameters.get("family").and_then(|v| v.as_str()) {
            let family = FilterFamily::parse(
                tag,
                spec.family.passband_ripple().or(Some(5.0)),
                spec.family.stopband_ripple().or(Some(20.0)),
            )?;
            spec.family = family;
            updated = true;
        }

        if let Some(order) = parameters.get("order").and_then(|v| v.as_u64()) {
            spec.order = order as usize;
            updated = true;
        }

        let passband_ripple = parameters.get("passband_ripple").and_then(|v| v.as_f64());
        let stopband_ripple = parameters.get("stopband_ripple").and_then(|v| v.as_f64());
        if passband_ripple.is_some() || stopband_ripple.is_some() {
            spec.family = spec.family.with_ripples(passband_ripple, stopband_ripple);
            updated = true;
        }

        if let Some(low) = parameters.get("low_cutoff").and_then(|v| v.as_f64()) {
            passband.low = low;
            updated = true;
        }

        if let Some(high) = parameters.get("high_cutoff") {
            passband.high =
                serde_json::from_value::<Cutoff>(high.clone()).context("Invalid high_cutoff")?;
            updated = true;
        }

        if let Some(rate) = parameters.get("sampling_rate").and_then(|v| v.as_f64()) {
            sampling_rate = SamplingRate::hz(rate)?;
            updated = true;
        }

        if let Some(tr) = parameters.get("repetition_time").and_then(|v| v.as_f64()) {
            sampling_rate = SamplingRate::from_repetition_time(tr)?;
            updated = true;
        }

        if !updated {
            return Ok(false);
        }

        let spec = FilterSpec::new(spec.family, spec.order)?;
        let (band, coefficients) = prepare(&spec, &passband, sampling_rate)?;

        self.spec = spec;
        self.passband = passband;
        self.sampling_rate = sampling_rate;
        self.band = band;
        self.coefficients = coefficients;

        debug!(
            "Temporal filter reconfigured: {} order {}, {} band {:?}",
            self.spec.family,
            self.spec.order,
            self.band.classification(),
            self.band.critical_frequencies()
        );

        Ok(true)
    }
}

/// Filter every row of `data` in one call
///
/// Designs a [`TemporalFilter`] for the given parameters and applies it. Use
/// [`TemporalFilter`] directly to filter several matrices with the same design.
pub fn general_filter(
    data: ArrayView2<f64>,
    sampling_rate: SamplingRate,
    spec: FilterSpec,
    passband: Passband,
) -> Result<Array2<f64>> {
    TemporalFilter::new(spec, passband, sampling_rate)?.apply(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::missing::LinearInterpolation;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use std::f64::consts::PI;

    fn rate(hz: f64) -> SamplingRate {
        SamplingRate::hz(hz).unwrap()
    }

    fn bandpass_filter() -> TemporalFilter {
        TemporalFilter::new(
            FilterSpec::butterworth(1).unwrap(),
            Passband::band(0.01, 0.08),
            SamplingRate::from_repetition_time(2.0).unwrap(),
        )
        .unwrap()
    }

    fn noisy_row(samples: usize, offset: f64) -> Array1<f64> {
        Array1::from_shape_fn(samples, |t| {
            let t = t as f64;
            offset + (0.05 * t).sin() + 0.3 * (1.3 * t).cos() + 0.1 * (0.37 * t).sin()
        })
    }

    #[test]
    fn test_constant_rows_are_preserved() {
        let filter = bandpass_filter();
        let data = Array2::from_shape_fn((3, 64), |(r, _)| r as f64 * 10.0 - 5.0);
        let filtered = filter.apply(data.view()).unwrap();
        for (value, expected) in filtered.iter().zip(data.iter()) {
            assert_relative_eq!(*value, *expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_matches_manual_forward_backward_filtering() {
        let filter = bandpass_filter();
        let row = noisy_row(120, 100.0);
        let data = row.clone().insert_axis(Axis(0));

        let filtered = filter.apply(data.view()).unwrap();

        let mean = row.mean().unwrap();
        let centred: Vec<f64> = row.iter().map(|x| x - mean).collect();
        let expected = sosfiltfilt_dyn(centred.iter(), filter.coefficients().sections());
        for (value, expected) in filtered.row(0).iter().zip(expected.iter()) {
            assert_relative_eq!(*value, *expected + mean, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_missing_samples_are_restored() {
        let filter = bandpass_filter();
        let mut data = Array2::from_shape_fn((2, 80), |(r, t)| (r as f64 + 1.0) * (0.2 * t as f64).sin());
        data[[0, 5]] = f64::NAN;
        data[[0, 40]] = f64::NAN;
        data[[1, 79]] = f64::NAN;

        let filtered = filter.apply(data.view()).unwrap();
        assert_eq!(filtered.dim(), data.dim());
        for ((r, t), value) in filtered.indexed_iter() {
            assert_eq!(value.is_nan(), data[[r, t]].is_nan(), "row {} sample {}", r, t);
        }
        // The input is left untouched
        assert!(data[[0, 5]].is_nan());
        assert!(data[[0, 6]].is_finite());
    }

    #[test]
    fn test_fill_strategy_changes_result() {
        let mut data = noisy_row(100, 3.0).insert_axis(Axis(0));
        data[[0, 50]] = f64::NAN;

        let zero = bandpass_filter().apply(data.view()).unwrap();
        let linear = bandpass_filter()
            .with_fill_missing(Arc::new(LinearInterpolation))
            .apply(data.view())
            .unwrap();

        assert!(zero[[0, 50]].is_nan() && linear[[0, 50]].is_nan());
        assert!((zero[[0, 49]] - linear[[0, 49]]).abs() > 1e-6);
    }

    #[test]
    fn test_lowpass_is_zero_phase() {
        let filter = TemporalFilter::new(
            FilterSpec::butterworth(2).unwrap(),
            Passband::band(0.0, 0.1),
            rate(1.0),
        )
        .unwrap();
        assert_eq!(filter.band(), &NormalizedPassband::Lowpass(0.2));

        let signal = Array1::from_shape_fn(400, |t| (2.0 * PI * 0.02 * t as f64).sin());
        let filtered = filter.apply(signal.view().insert_axis(Axis(0))).unwrap();
        for t in 100..300 {
            assert!((filtered[[0, t]] - signal[t]).abs() < 0.01);
        }
    }

    #[test]
    fn test_highpass_removes_slow_drift() {
        let filter = TemporalFilter::new(
            FilterSpec::butterworth(2).unwrap(),
            Passband::highpass(0.1),
            rate(1.0),
        )
        .unwrap();
        assert_eq!(filter.band(), &NormalizedPassband::Highpass(0.2));

        let drift = Array1::from_shape_fn(400, |t| 5.0 * (2.0 * PI * 0.002 * t as f64).sin());
        let fast = Array1::from_shape_fn(400, |t| (2.0 * PI * 0.3 * t as f64).sin());
        let signal = &drift + &fast;
        let mean = signal.mean().unwrap();

        let filtered = filter.apply(signal.view().insert_axis(Axis(0))).unwrap();
        for t in 100..300 {
            assert!((filtered[[0, t]] - mean - fast[t]).abs() < 0.05);
        }
    }

    #[test]
    fn test_short_series_is_rejected() {
        let filter = bandpass_filter();
        assert_eq!(filter.min_samples(), 10);
        let data = Array2::<f64>::zeros((2, 9));
        assert_eq!(
            filter.apply(data.view()).err(),
            Some(FilterError::SeriesTooShort {
                samples: 9,
                required: 10
            })
        );
    }

    #[test]
    fn test_first_order_lowpass_accepts_short_series() {
        let filter = TemporalFilter::new(
            FilterSpec::butterworth(1).unwrap(),
            Passband::band(0.0, 0.1),
            rate(1.0),
        )
        .unwrap();
        assert_eq!(filter.band(), &NormalizedPassband::Lowpass(0.2));
        assert_eq!(filter.coefficients().padding_len(), 6);
        assert_eq!(filter.min_samples(), 7);

        let data = Array2::from_shape_fn((2, 7), |(r, t)| (r * 7 + t) as f64);
        let filtered = filter.apply(data.view()).unwrap();
        assert_eq!(filtered.dim(), (2, 7));
        assert!(filtered.iter().all(|x| x.is_finite()));

        assert_eq!(
            filter.apply(Array2::<f64>::zeros((1, 6)).view()).err(),
            Some(FilterError::SeriesTooShort {
                samples: 6,
                required: 7
            })
        );
    }

    #[test]
    fn test_empty_matrix_is_returned_unchanged() {
        let filter = bandpass_filter();
        let data = Array2::<f64>::zeros((0, 5));
        assert_eq!(filter.apply(data.view()).unwrap().dim(), (0, 5));
    }

    #[test]
    fn test_general_filter_propagates_passband_errors() {
        let data = Array2::<f64>::zeros((1, 100));
        let result = general_filter(
            data.view(),
            rate(1.0),
            FilterSpec::butterworth(1).unwrap(),
            Passband::band(0.2, 0.1),
        );
        assert!(matches!(result, Err(FilterError::InvalidPassband { .. })));

        let result = general_filter(
            data.view(),
            rate(1.0),
            FilterSpec::butterworth(1).unwrap(),
            Passband::new(0.0, Cutoff::Nyquist),
        );
        assert!(matches!(result, Err(FilterError::PermissiveFilter { .. })));
    }

    #[test]
    fn test_update_config() {
        let mut filter = bandpass_filter();

        let updated = filter
            .update_config(&serde_json::json!({"order": 2, "high_cutoff": 0.1}))
            .unwrap();
        assert!(updated);
        assert_eq!(filter.spec().order, 2);
        assert_eq!(filter.passband().high, Cutoff::Hz(0.1));
        assert_eq!(filter.coefficients().sections().len(), 2);

        let updated = filter
            .update_config(&serde_json::json!({"family": "cheby1", "passband_ripple": 1.0}))
            .unwrap();
        assert!(updated);
        assert_eq!(
            filter.spec().family,
            FilterFamily::ChebyshevI {
                passband_ripple: 1.0
            }
        );

        let updated = filter
            .update_config(&serde_json::json!({"high_cutoff": "nyquist"}))
            .unwrap();
        assert!(updated);
        assert_eq!(filter.band(), &NormalizedPassband::Highpass(0.04));
    }

    #[test]
    fn test_update_config_rejects_invalid_values() {
        let mut filter = bandpass_filter();

        assert!(!filter
            .update_config(&serde_json::json!({"unknown": 1}))
            .unwrap());

        assert!(filter
            .update_config(&serde_json::json!({"low_cutoff": 0.5, "order": 3}))
            .is_err());
        assert!(filter.update_config(&serde_json::json!({"order": 0})).is_err());
        assert!(filter
            .update_config(&serde_json::json!({"sampling_rate": -1.0}))
            .is_err());

        assert_eq!(filter.spec().order, 1);
        assert_eq!(filter.passband(), &Passband::band(0.01, 0.08));
        assert_eq!(filter.band(), &NormalizedPassband::Bandpass(0.04, 0.32));
    }
}
