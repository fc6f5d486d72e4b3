// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust Temporal Filter library
//!
//! Zero-phase IIR filtering of the voxel time courses of 4D volumetric
//! series (for instance resting-state fMRI band-pass filtering).
//!
//! - [`preprocessing::passband`]: passband validation and normalization
//! - [`preprocessing::filter`]: Butterworth, Chebyshev and elliptic designs
//! - [`preprocessing::temporal`]: forward-backward filtering of time-series matrices
//! - [`volume`]: conversion between 4D series and `(voxels, time)` matrices
//! - [`config`]: YAML configuration validated against a JSON schema

pub mod config;
pub mod error;
pub mod preprocessing;
pub mod volume;

pub use error::{FilterError, Result};
pub use preprocessing::{general_filter, Filter, TemporalFilter};
pub use volume::{filter_volume, VolumeSeries};
