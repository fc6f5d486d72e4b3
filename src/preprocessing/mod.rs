// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//! Temporal preprocessing of time series
//!
//! This module handles the passband arithmetic, IIR filter design and the
//! zero-phase filtering of matrices whose rows are time series.

pub mod filter;
pub mod missing;
pub mod passband;
pub mod temporal;

pub use filter::{design, Filter, FilterCoefficients, FilterFamily, FilterSpec};
pub use missing::{FillMissing, FillStrategy, LinearInterpolation, ZeroFill};
pub use passband::{Cutoff, FilterPass, NormalizedPassband, Passband, SamplingRate};
pub use temporal::{general_filter, TemporalFilter};
