// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Chebyshev type I and type II digital filters using SciPy-style SOS
//!
//! Both designs start from the normalized analog prototypes of SciPy
//! (`cheb1ap`, `cheb2ap`) and go through the same frequency transform,
//! bilinear mapping and section pairing as `scipy.signal.iirfilter`.
//!
//! - Type I: equiripple passband of `rp` dB, monotonic stopband. The
//!   magnitude at the cutoff is `10^(-rp/20)`.
//! - Type II: monotonic passband, equiripple stopband at least `rs` dB down.
//!   The cutoff marks the start of the stopband.

use std::f64::consts::PI;

use num_complex::Complex64;

use super::zpk::{design_from_prototype, product_of_negated, Zpk};
use super::FilterCoefficients;
use crate::preprocessing::passband::NormalizedPassband;

/// Angles `pi * m / (2N)` for `m = -N+1, -N+3, ..., N-1`
fn chebyshev_angles(order: usize) -> impl Iterator<Item = f64> {
    let n = order as i64;
    (-n + 1..n)
        .step_by(2)
        .map(move |m| PI * m as f64 / (2.0 * order as f64))
}

/// Analog Chebyshev type I lowpass prototype
///
/// Poles lie on an ellipse in the left half-plane; the filter has no
/// finite zeros. The gain is set so that the passband peaks at 1.
pub fn cheb1ap(order: usize, passband_ripple: f64) -> Zpk {
    let eps = (10f64.powf(0.1 * passband_ripple) - 1.0).sqrt();
    let mu = (1.0 / eps).asinh() / order as f64;

    let poles: Vec<Complex64> = chebyshev_angles(order)
        .map(|theta| -(Complex64::new(mu, theta)).sinh())
        .collect();

    let mut gain = product_of_negated(&poles).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps * eps).sqrt();
    }

    Zpk::new(Vec::new(), poles, gain)
}

/// Analog Chebyshev type II lowpass prototype
///
/// Zeros lie on the imaginary axis above the stopband edge (1 rad/s); the
/// stopband ripple is `stopband_ripple` dB below the passband.
pub fn cheb2ap(order: usize, stopband_ripple: f64) -> Zpk {
    let de = 1.0 / (10f64.powf(0.1 * stopband_ripple) - 1.0).sqrt();
    let mu = (1.0 / de).asinh() / order as f64;

    // The middle angle of an odd order has no finite zero
    let zeros: Vec<Complex64> = chebyshev_angles(order)
        .filter(|theta| *theta != 0.0)
        .map(|theta| Complex64::new(0.0, 1.0 / theta.sin()))
        .collect();

    let poles: Vec<Complex64> = chebyshev_angles(order)
        .map(|theta| {
            let p = -Complex64::new(0.0, theta).exp();
            Complex64::new(mu.sinh() * p.re, mu.cosh() * p.im).inv()
        })
        .collect();

    let gain = (product_of_negated(&poles) / product_of_negated(&zeros)).re;

    Zpk::new(zeros, poles, gain)
}

/// Design a Chebyshev type I filter for a normalized band
pub fn design_type1(
    order: usize,
    passband_ripple: f64,
    band: &NormalizedPassband,
) -> FilterCoefficients {
    design_from_prototype(cheb1ap(order, passband_ripple), band)
}

/// Design a Chebyshev type II filter for a normalized band
pub fn design_type2(
    order: usize,
    stopband_ripple: f64,
    band: &NormalizedPassband,
) -> FilterCoefficients {
    design_from_prototype(cheb2ap(order, stopband_ripple), band)
}
