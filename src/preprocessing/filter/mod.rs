// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! IIR filter design for temporal filtering
//!
//! Four filter families are supported, all producing a cascade of
//! second-order sections (SOS) meant to be run forward and backward:
//!
//! - **Butterworth** ([`scipy_butter_filter`]): maximally flat passband, designed with sci-rs
//! - **Chebyshev type I** ([`scipy_cheby_filter`]): equiripple passband
//! - **Chebyshev type II** ([`scipy_cheby_filter`]): equiripple stopband
//! - **Elliptic / Cauer** ([`scipy_cauer_filter`]): equiripple in both bands
//!
//! Critical frequencies are expressed relative to the Nyquist frequency,
//! exactly as SciPy's `iirfilter` expects them.
//!
//! # Examples
//!
//! ```no_run
//! use rust_temporal_filter::preprocessing::filter::{design, FilterSpec};
//! use rust_temporal_filter::preprocessing::passband::NormalizedPassband;
//!
//! let spec = FilterSpec::from_parts("cheby1", 2, Some(1.0), None).unwrap();
//! let coefficients = design(&spec, &NormalizedPassband::Bandpass(0.04, 0.32)).unwrap();
//! assert_eq!(coefficients.sections().len(), 2);
//! ```

pub mod scipy_butter_filter;
pub mod scipy_cauer_filter;
pub mod scipy_cheby_filter;
pub mod zpk;

use std::f64::consts::PI;
use std::fmt;

use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;
use sci_rs::signal::filter::design::Sos;

use crate::error::{FilterError, Result};
use crate::preprocessing::passband::NormalizedPassband;

/// Trait for filters applied to a matrix of time series
///
/// Rows are observations (voxels), columns are time points. Implementations
/// are thread-safe so a single filter can be shared between workers.
pub trait Filter: Send + Sync {
    /// Filter every row of `data` and return a new matrix of the same shape
    fn apply(&self, data: ArrayView2<f64>) -> Result<Array2<f64>>;

    /// Update filter parameters from a JSON object
    ///
    /// ### Returns
    ///
    /// * `Ok(true)` if at least one parameter was recognized and applied
    /// * `Ok(false)` if no recognized parameter was present
    /// * `Err` if a value is invalid; the filter is left unchanged
    fn update_config(&mut self, parameters: &serde_json::Value) -> anyhow::Result<bool>;
}

/// IIR filter family, carrying the ripple parameters it needs (in dB)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterFamily {
    Butterworth,
    ChebyshevI { passband_ripple: f64 },
    ChebyshevII { stopband_ripple: f64 },
    Elliptic { passband_ripple: f64, stopband_ripple: f64 },
}

impl FilterFamily {
    /// Parse a family tag, attaching the ripples the family requires
    ///
    /// Tags are case-insensitive. Ripples that the family does not use are
    /// ignored.
    pub fn parse(
        tag: &str,
        passband_ripple: Option<f64>,
        stopband_ripple: Option<f64>,
    ) -> Result<Self> {
        let require = |value: Option<f64>, parameter: &'static str| {
            value.ok_or_else(|| FilterError::MissingRippleParameter {
                family: tag.to_string(),
                parameter,
            })
        };

        match tag.trim().to_ascii_lowercase().as_str() {
            "butterworth" | "butter" => Ok(FilterFamily::Butterworth),
            "chebyshev1" | "chebyshev-type1" | "cheby1" => Ok(FilterFamily::ChebyshevI {
                passband_ripple: require(passband_ripple, "passband")?,
            }),
            "chebyshev2" | "chebyshev-type2" | "cheby2" => Ok(FilterFamily::ChebyshevII {
                stopband_ripple: require(stopband_ripple, "stopband")?,
            }),
            "elliptic" | "ellip" | "cauer" => Ok(FilterFamily::Elliptic {
                passband_ripple: require(passband_ripple, "passband")?,
                stopband_ripple: require(stopband_ripple, "stopband")?,
            }),
            _ => Err(FilterError::UnsupportedFilterFamily(tag.to_string())),
        }
    }

    /// Canonical tag of the family
    pub fn name(&self) -> &'static str {
        match self {
            FilterFamily::Butterworth => "butterworth",
            FilterFamily::ChebyshevI { .. } => "chebyshev1",
            FilterFamily::ChebyshevII { .. } => "chebyshev2",
            FilterFamily::Elliptic { .. } => "elliptic",
        }
    }

    pub fn passband_ripple(&self) -> Option<f64> {
        match *self {
            FilterFamily::ChebyshevI { passband_ripple }
            | FilterFamily::Elliptic { passband_ripple, .. } => Some(passband_ripple),
            _ => None,
        }
    }

    pub fn stopband_ripple(&self) -> Option<f64> {
        match *self {
            FilterFamily::ChebyshevII { stopband_ripple }
            | FilterFamily::Elliptic { stopband_ripple, .. } => Some(stopband_ripple),
            _ => None,
        }
    }

    /// Same family with the given ripples substituted where the family uses them
    pub fn with_ripples(self, passband_ripple: Option<f64>, stopband_ripple: Option<f64>) -> Self {
        match self {
            FilterFamily::Butterworth => self,
            FilterFamily::ChebyshevI { passband_ripple: rp } => FilterFamily::ChebyshevI {
                passband_ripple: passband_ripple.unwrap_or(rp),
            },
            FilterFamily::ChebyshevII { stopband_ripple: rs } => FilterFamily::ChebyshevII {
                stopband_ripple: stopband_ripple.unwrap_or(rs),
            },
            FilterFamily::Elliptic {
                passband_ripple: rp,
                stopband_ripple: rs,
            } => FilterFamily::Elliptic {
                passband_ripple: passband_ripple.unwrap_or(rp),
                stopband_ripple: stopband_ripple.unwrap_or(rs),
            },
        }
    }

    fn validate(&self) -> Result<()> {
        let check = |value: Option<f64>, parameter: &'static str| match value {
            Some(value) if !(value.is_finite() && value > 0.0) => {
                Err(FilterError::InvalidRipple { parameter, value })
            }
            _ => Ok(()),
        };
        check(self.passband_ripple(), "passband")?;
        check(self.stopband_ripple(), "stopband")
    }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Family and order of a filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    pub family: FilterFamily,
    pub order: usize,
}

impl FilterSpec {
    /// Create a filter specification, checking the order and the ripples
    pub fn new(family: FilterFamily, order: usize) -> Result<Self> {
        if order == 0 {
            return Err(FilterError::InvalidOrder(order));
        }
        family.validate()?;
        Ok(Self { family, order })
    }

    /// Butterworth filter of the given order
    pub fn butterworth(order: usize) -> Result<Self> {
        Self::new(FilterFamily::Butterworth, order)
    }

    /// Build a specification from a family tag and optional ripples
    pub fn from_parts(
        tag: &str,
        order: usize,
        passband_ripple: Option<f64>,
        stopband_ripple: Option<f64>,
    ) -> Result<Self> {
        Self::new(FilterFamily::parse(tag, passband_ripple, stopband_ripple)?, order)
    }

    /// Order of the response actually applied to the data
    ///
    /// Forward-backward filtering squares the magnitude response, doubling
    /// the order.
    pub fn effective_order(&self) -> usize {
        2 * self.order
    }
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            family: FilterFamily::Butterworth,
            order: 1,
        }
    }
}

/// Designed filter as a cascade of second-order sections
#[derive(Debug, Clone)]
pub struct FilterCoefficients {
    sections: Vec<Sos<f64>>,
}

impl FilterCoefficients {
    pub fn new(sections: Vec<Sos<f64>>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[Sos<f64>] {
        &self.sections
    }

    fn expand(polynomials: impl Iterator<Item = [f64; 3]>) -> Vec<f64> {
        polynomials.fold(vec![1.0], |acc, factor| {
            let mut product = vec![0.0; acc.len() + 2];
            for (i, &a) in acc.iter().enumerate() {
                for (j, &f) in factor.iter().enumerate() {
                    product[i + j] += a * f;
                }
            }
            product
        })
    }

    /// Numerator coefficients of the equivalent transfer function, in powers of `z^-1`
    pub fn numerator(&self) -> Vec<f64> {
        Self::expand(self.sections.iter().map(|s| s.b))
    }

    /// Denominator coefficients of the equivalent transfer function, in powers of `z^-1`
    pub fn denominator(&self) -> Vec<f64> {
        Self::expand(self.sections.iter().map(|s| s.a))
    }

    /// Complex response of a single forward pass at `w` (fraction of Nyquist)
    pub fn frequency_response(&self, w: f64) -> Complex64 {
        let z1 = Complex64::from_polar(1.0, -PI * w);
        let z2 = z1 * z1;
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |acc, section| {
                let numerator = section.b[0] + z1 * section.b[1] + z2 * section.b[2];
                let denominator = section.a[0] + z1 * section.a[1] + z2 * section.a[2];
                acc * numerator / denominator
            })
    }

    /// Magnitude of a single forward pass at `w` (fraction of Nyquist)
    pub fn magnitude(&self, w: f64) -> f64 {
        self.frequency_response(w).norm()
    }

    /// Number of samples the forward-backward filter pads each edge with
    ///
    /// Three times the tap count, where first-order sections (no `z^-2`
    /// term in both numerator and denominator) do not count their last tap.
    pub fn padding_len(&self) -> usize {
        let taps = 2 * self.sections.len() + 1;
        let b_zeros = self.sections.iter().filter(|s| s.b[2] == 0.0).count();
        let a_zeros = self.sections.iter().filter(|s| s.a[2] == 0.0).count();
        3 * (taps - b_zeros.min(a_zeros))
    }
}

/// Design a digital filter for a normalized band
///
/// ### Errors
///
/// * [`FilterError::InvalidCriticalFrequency`] if a critical frequency is outside (0, 1),
///   or if the two edges of a band coincide
/// * [`FilterError::Design`] if sci-rs did not produce second-order sections
pub fn design(spec: &FilterSpec, band: &NormalizedPassband) -> Result<FilterCoefficients> {
    let critical = band.critical_frequencies();
    if critical.iter().any(|&w| !(w > 0.0 && w < 1.0)) {
        return Err(FilterError::InvalidCriticalFrequency(critical));
    }
    if let &[low, high] = band.design_frequencies().as_slice() {
        if low >= high {
            return Err(FilterError::InvalidCriticalFrequency(critical));
        }
    }

    let coefficients = match spec.family {
        FilterFamily::Butterworth => scipy_butter_filter::design(spec.order, band)?,
        FilterFamily::ChebyshevI { passband_ripple } => {
            scipy_cheby_filter::design_type1(spec.order, passband_ripple, band)
        }
        FilterFamily::ChebyshevII { stopband_ripple } => {
            scipy_cheby_filter::design_type2(spec.order, stopband_ripple, band)
        }
        FilterFamily::Elliptic {
            passband_ripple,
            stopband_ripple,
        } => scipy_cauer_filter::design(spec.order, passband_ripple, stopband_ripple, band),
    };

    log::debug!(
        "Designed {} filter of order {} for {} band {:?}: {} sections",
        spec.family,
        spec.order,
        band.classification(),
        critical,
        coefficients.sections().len()
    );

    Ok(coefficients)
}
