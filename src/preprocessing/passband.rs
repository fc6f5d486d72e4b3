// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Passband validation and normalization
//!
//! A [`Passband`] is expressed in Hz. Before a digital filter can be designed
//! the band must be normalized against the Nyquist frequency of the series and
//! reduced to the shape the design routines expect: a single critical
//! frequency for highpass/lowpass filters, a pair for bandpass/bandstop ones.
//!
//! ```
//! use rust_temporal_filter::preprocessing::passband::{
//!     normalize, Cutoff, FilterPass, Passband, SamplingRate,
//! };
//!
//! let band = Passband::new(0.01, Cutoff::Nyquist);
//! let normalized = normalize(&band, SamplingRate::hz(2.0).unwrap()).unwrap();
//! assert_eq!(normalized.classification(), FilterPass::Highpass);
//! assert_eq!(normalized.critical_frequencies(), vec![0.01]);
//! ```

use std::fmt;

use log::debug;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{FilterError, Result};

/// Upper edge of a passband
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cutoff {
    /// Finite cutoff frequency in Hz
    Hz(f64),
    /// Pass everything up to the Nyquist frequency
    Nyquist,
}

impl Cutoff {
    /// Finite frequency, or `None` for the Nyquist sentinel
    pub fn hz(self) -> Option<f64> {
        match self {
            Cutoff::Hz(value) => Some(value),
            Cutoff::Nyquist => None,
        }
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cutoff::Hz(value) => write!(f, "{}", value),
            Cutoff::Nyquist => write!(f, "nyquist"),
        }
    }
}

impl Serialize for Cutoff {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cutoff::Hz(value) => serializer.serialize_f64(*value),
            Cutoff::Nyquist => serializer.serialize_str("nyquist"),
        }
    }
}

impl<'de> Deserialize<'de> for Cutoff {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CutoffVisitor;

        impl Visitor<'_> for CutoffVisitor {
            type Value = Cutoff;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a frequency in Hz or the string \"nyquist\"")
            }

            fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<Cutoff, E> {
                Ok(Cutoff::Hz(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<Cutoff, E> {
                Ok(Cutoff::Hz(value as f64))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<Cutoff, E> {
                Ok(Cutoff::Hz(value as f64))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<Cutoff, E> {
                if value.eq_ignore_ascii_case("nyquist") {
                    Ok(Cutoff::Nyquist)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(CutoffVisitor)
    }
}

/// Frequency band retained by a filter, in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Passband {
    /// High-pass cutoff (lower edge of the band)
    pub low: f64,
    /// Low-pass cutoff (upper edge of the band)
    pub high: Cutoff,
}

impl Passband {
    pub fn new(low: f64, high: Cutoff) -> Self {
        Self { low, high }
    }

    /// Band with two finite edges
    pub fn band(low: f64, high: f64) -> Self {
        Self::new(low, Cutoff::Hz(high))
    }

    /// Band open up to the Nyquist frequency
    pub fn highpass(low: f64) -> Self {
        Self::new(low, Cutoff::Nyquist)
    }
}

impl Default for Passband {
    /// The 0.01-0.08 Hz band conventionally used for resting-state BOLD data
    fn default() -> Self {
        Self::band(0.01, 0.08)
    }
}

/// Sampling rate of the filtered axis, stored in Hz
///
/// Repetition times (seconds between samples) are converted on construction
/// so that every consumer agrees on `nyquist = 0.5 * hz`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct SamplingRate(f64);

impl SamplingRate {
    /// Sampling rate given in samples per second
    pub fn hz(rate: f64) -> Result<Self> {
        if rate.is_finite() && rate > 0.0 {
            Ok(Self(rate))
        } else {
            Err(FilterError::InvalidSamplingRate(rate))
        }
    }

    /// Sampling rate derived from the interval between samples, in seconds
    pub fn from_repetition_time(seconds: f64) -> Result<Self> {
        if seconds.is_finite() && seconds > 0.0 {
            Self::hz(1.0 / seconds)
        } else {
            Err(FilterError::InvalidSamplingRate(seconds))
        }
    }

    pub fn as_hz(self) -> f64 {
        self.0
    }

    /// Interval between two samples, in seconds
    pub fn repetition_time(self) -> f64 {
        1.0 / self.0
    }

    pub fn nyquist(self) -> f64 {
        0.5 * self.0
    }
}

/// Shape of the frequency response selected by normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterPass {
    Highpass,
    Lowpass,
    Bandpass,
    Bandstop,
}

impl fmt::Display for FilterPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterPass::Highpass => "highpass",
            FilterPass::Lowpass => "lowpass",
            FilterPass::Bandpass => "bandpass",
            FilterPass::Bandstop => "bandstop",
        };
        f.write_str(name)
    }
}

/// Critical frequencies relative to Nyquist, tagged with their classification
///
/// Highpass and lowpass filters carry a single frequency, bandpass and
/// bandstop filters carry the pair in the order it was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NormalizedPassband {
    Highpass(f64),
    Lowpass(f64),
    Bandpass(f64, f64),
    Bandstop(f64, f64),
}

impl NormalizedPassband {
    pub fn classification(&self) -> FilterPass {
        match self {
            NormalizedPassband::Highpass(_) => FilterPass::Highpass,
            NormalizedPassband::Lowpass(_) => FilterPass::Lowpass,
            NormalizedPassband::Bandpass(..) => FilterPass::Bandpass,
            NormalizedPassband::Bandstop(..) => FilterPass::Bandstop,
        }
    }

    /// Normalized critical frequencies as produced by [`normalize`]
    pub fn critical_frequencies(&self) -> Vec<f64> {
        match *self {
            NormalizedPassband::Highpass(w) | NormalizedPassband::Lowpass(w) => vec![w],
            NormalizedPassband::Bandpass(low, high) | NormalizedPassband::Bandstop(low, high) => {
                vec![low, high]
            }
        }
    }

    /// Critical frequencies in ascending order, as filter design expects them
    pub fn design_frequencies(&self) -> Vec<f64> {
        let mut frequencies = self.critical_frequencies();
        frequencies.sort_by(|a, b| a.total_cmp(b));
        frequencies
    }
}

/// Check that the high-pass cutoff does not exceed the low-pass cutoff
///
/// `filter_type` only appears in the error message.
pub fn validate(filter_type: &str, passband: &Passband) -> Result<()> {
    if let Cutoff::Hz(high) = passband.high {
        if passband.low > high {
            return Err(FilterError::InvalidPassband {
                filter_type: filter_type.to_string(),
                low: passband.low,
                high,
            });
        }
    }
    Ok(())
}

/// Normalize a passband against the Nyquist frequency and classify it
///
/// A band reaching Nyquist becomes a highpass filter, a band reaching DC
/// becomes a lowpass filter, and a band doing both passes the whole spectrum
/// and is rejected with [`FilterError::PermissiveFilter`].
pub fn normalize(passband: &Passband, sampling_rate: SamplingRate) -> Result<NormalizedPassband> {
    let nyquist = sampling_rate.nyquist();
    let low = passband.low / nyquist;
    let high = match passband.high {
        Cutoff::Hz(value) => value / nyquist,
        Cutoff::Nyquist => 1.0,
    };

    let reaches_nyquist = high >= 1.0;
    let reaches_dc = low <= 0.0;

    let normalized = match (reaches_dc, reaches_nyquist) {
        (true, true) => {
            return Err(FilterError::PermissiveFilter {
                sampling_rate: sampling_rate.as_hz(),
                nyquist,
                low: passband.low,
                high: passband.high,
            })
        }
        (false, true) => NormalizedPassband::Highpass(low),
        (true, false) => NormalizedPassband::Lowpass(high),
        (false, false) if low > high => NormalizedPassband::Bandstop(low, high),
        (false, false) => NormalizedPassband::Bandpass(low, high),
    };

    debug!(
        "Normalized passband {}..{} Hz at {} Hz (Nyquist {}) to {:?}",
        passband.low,
        passband.high,
        sampling_rate.as_hz(),
        nyquist,
        normalized
    );
    Ok(normalized)
}

/// Gaussian filter widths in the convention of FSL's `-bptf` option
///
/// Sigmas are expressed in volumes; `-1` disables the corresponding side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FslPassband {
    pub highpass_sigma: f64,
    pub lowpass_sigma: f64,
}

/// Convert a passband to FSL sigmas
///
/// A cutoff frequency `f` (Hz) corresponds to a period of `1 / f` seconds,
/// which spans `1 / (f * TR)` volumes; FSL expects half of that as sigma.
pub fn fsl_passband(passband: &Passband, sampling_rate: SamplingRate) -> FslPassband {
    let repetition_time = sampling_rate.repetition_time();
    let sigma = |cutoff: f64| {
        if cutoff > 0.0 && cutoff.is_finite() {
            (1.0 / cutoff) / (2.0 * repetition_time)
        } else {
            -1.0
        }
    };

    FslPassband {
        highpass_sigma: sigma(passband.low),
        lowpass_sigma: passband.high.hz().map_or(-1.0, sigma),
    }
}
