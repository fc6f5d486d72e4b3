// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Temporal filter configuration
//!
//! This module defines the `filter` section of the configuration file,
//! describing which IIR filter to design and how to sample the series.

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, Result};
use crate::preprocessing::filter::FilterSpec;
use crate::preprocessing::missing::FillStrategy;
use crate::preprocessing::passband::{Cutoff, Passband, SamplingRate};
use crate::preprocessing::temporal::TemporalFilter;

/// Settings of the temporal filter
///
/// Cutoffs are in Hz; `high_cutoff` may also be `nyquist` to disable the
/// low-pass edge. Exactly one of `repetition_time` (seconds) and
/// `sampling_rate` (Hz) must be given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalFilterConfig {
    /// Filter family tag
    ///
    /// One of `butterworth`, `chebyshev1`, `chebyshev2` or `elliptic`
    /// (short aliases such as `butter`, `cheby1` or `ellip` are accepted).
    #[serde(default = "default_family")]
    pub family: String,

    /// Order of the designed filter, doubled by forward-backward filtering
    #[serde(default = "default_order")]
    pub order: usize,

    /// High-pass edge in Hz (0 disables it)
    #[serde(default = "default_low_cutoff")]
    pub low_cutoff: f64,

    /// Low-pass edge in Hz, or `nyquist`
    #[serde(default = "default_high_cutoff")]
    pub high_cutoff: Cutoff,

    /// Maximum passband ripple in dB (Chebyshev type I and elliptic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passband_ripple: Option<f64>,

    /// Minimum stopband attenuation in dB (Chebyshev type II and elliptic)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopband_ripple: Option<f64>,

    /// Interval between volumes in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition_time: Option<f64>,

    /// Sampling rate in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_rate: Option<f64>,

    /// Placeholder used for missing samples while filtering
    #[serde(default)]
    pub fill_missing: FillStrategy,
}

fn default_family() -> String {
    "butterworth".to_string()
}

fn default_order() -> usize {
    1
}

fn default_low_cutoff() -> f64 {
    0.01
}

fn default_high_cutoff() -> Cutoff {
    Cutoff::Hz(0.08)
}

impl Default for TemporalFilterConfig {
    fn default() -> Self {
        Self {
            family: default_family(),
            order: default_order(),
            low_cutoff: default_low_cutoff(),
            high_cutoff: default_high_cutoff(),
            passband_ripple: Some(5.0),
            stopband_ripple: Some(20.0),
            repetition_time: Some(2.0),
            sampling_rate: None,
            fill_missing: FillStrategy::default(),
        }
    }
}

impl TemporalFilterConfig {
    /// Family and order, with the ripples the family needs
    pub fn spec(&self) -> Result<FilterSpec> {
        FilterSpec::from_parts(
            &self.family,
            self.order,
            self.passband_ripple,
            self.stopband_ripple,
        )
    }

    pub fn passband(&self) -> Passband {
        Passband::new(self.low_cutoff, self.high_cutoff)
    }

    /// Sampling rate from whichever of `sampling_rate` / `repetition_time` is set
    ///
    /// ### Errors
    ///
    /// * [`FilterError::SamplingRateSource`] if both or neither are set
    /// * [`FilterError::InvalidSamplingRate`] if the value is not positive
    pub fn sampling_rate(&self) -> Result<SamplingRate> {
        match (self.sampling_rate, self.repetition_time) {
            (Some(rate), None) => SamplingRate::hz(rate),
            (None, Some(tr)) => SamplingRate::from_repetition_time(tr),
            (Some(_), Some(_)) => Err(FilterError::SamplingRateSource("both")),
            (None, None) => Err(FilterError::SamplingRateSource("neither")),
        }
    }

    /// Design the configured filter
    pub fn to_temporal_filter(&self) -> Result<TemporalFilter> {
        let filter = TemporalFilter::new(self.spec()?, self.passband(), self.sampling_rate()?)?;
        Ok(filter.with_fill_missing(self.fill_missing.build()))
    }
}
