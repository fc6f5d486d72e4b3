// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types for passband handling, filter design and volume reshaping

use thiserror::Error;

use crate::preprocessing::passband::Cutoff;

/// Errors raised by the temporal filtering core
///
/// Every error is raised at the point of detection; nothing is retried and no
/// partial result is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error(
        "High-pass cutoff must be less than low-pass cutoff for the selected filter type \
         (filter class: {filter_type}, high-pass cutoff: {low}, low-pass cutoff: {high})"
    )]
    InvalidPassband {
        filter_type: String,
        low: f64,
        high: f64,
    },

    #[error(
        "Permissive filter for the specified sampling rate \
         (sampling rate: {sampling_rate}, Nyquist frequency: {nyquist}, \
         high-pass cutoff: {low}, low-pass cutoff: {high})"
    )]
    PermissiveFilter {
        sampling_rate: f64,
        nyquist: f64,
        low: f64,
        high: Cutoff,
    },

    #[error("Unsupported filter family '{0}' (expected butterworth, chebyshev1, chebyshev2 or elliptic)")]
    UnsupportedFilterFamily(String),

    #[error("Filter family '{family}' requires a {parameter} ripple parameter")]
    MissingRippleParameter {
        family: String,
        parameter: &'static str,
    },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Sampling rate must be positive and finite, got {0}")]
    InvalidSamplingRate(f64),

    #[error("Exactly one of 'sampling_rate' and 'repetition_time' must be set, {0} given")]
    SamplingRateSource(&'static str),

    #[error("Filter order must be at least 1, got {0}")]
    InvalidOrder(usize),

    #[error("The {parameter} ripple must be positive and finite, got {value} dB")]
    InvalidRipple { parameter: &'static str, value: f64 },

    #[error(
        "Digital filter critical frequencies must satisfy 0 < Wn < 1 with band edges \
         in strictly increasing order, got {0:?}"
    )]
    InvalidCriticalFrequency(Vec<f64>),

    #[error(
        "Time series of {samples} samples is too short for forward-backward filtering \
         (at least {required} samples required)"
    )]
    SeriesTooShort { samples: usize, required: usize },

    #[error("Filter design failed: {0}")]
    Design(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
