// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Cauer (elliptic) digital filters using SciPy-style SOS
//!
//! Elliptic filters have an equiripple passband (`rp` dB) and an equiripple
//! stopband (`rs` dB down), giving the steepest transition for a given
//! order. The analog prototype follows SciPy's `ellipap`, which relies on the
//! Jacobi elliptic functions and complete elliptic integrals implemented
//! below (Cephes `ellpj` and arithmetic-geometric mean based `ellipk`).

use std::f64::consts::{FRAC_PI_2, LN_10, PI};

use num_complex::Complex64;

use super::zpk::{design_from_prototype, product_of_negated, Zpk};
use super::FilterCoefficients;
use crate::preprocessing::passband::NormalizedPassband;

/// Threshold below which `sn` is treated as zero when placing zeros
const EPSILON: f64 = 2e-16;

const MACHEP: f64 = 1.110_223_024_625_156_5e-16;

/// Number of nome terms used to solve the degree equation
const ELLIPDEG_MMAX: i32 = 7;

const ARC_JAC_SN_MAXITER: usize = 10;

/// `10^x - 1` without cancellation for small `x`
fn pow10m1(x: f64) -> f64 {
    (x * LN_10).exp_m1()
}

fn agm(mut a: f64, mut b: f64) -> f64 {
    for _ in 0..64 {
        if (a - b).abs() <= MACHEP * a {
            break;
        }
        let next = (a + b) / 2.0;
        b = (a * b).sqrt();
        a = next;
    }
    (a + b) / 2.0
}

/// Complete elliptic integral of the first kind, `K(m)`, with parameter `m = k^2`
pub fn ellipk(m: f64) -> f64 {
    if m >= 1.0 {
        return f64::INFINITY;
    }
    FRAC_PI_2 / agm(1.0, (1.0 - m).sqrt())
}

/// `K(1 - p)`, accurate when `p` is small
pub fn ellipkm1(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::INFINITY;
    }
    FRAC_PI_2 / agm(1.0, p.sqrt())
}

/// Jacobi elliptic functions `(sn, cn, dn)` of argument `u` and parameter `m`
///
/// Descending Landen transformation as in Cephes `ellpj`, with series
/// expansions near `m = 0` and `m = 1`.
pub fn ellipj(u: f64, m: f64) -> (f64, f64, f64) {
    if m < 1e-9 {
        let t = u.sin();
        let b = u.cos();
        let ai = 0.25 * m * (u - t * b);
        return (t - ai * b, b + ai * t, 1.0 - 0.5 * m * t * t);
    }

    if m >= 0.999_999_999_9 {
        let ai = 0.25 * (1.0 - m);
        let b = u.cosh();
        let t = u.tanh();
        let phi = 1.0 / b;
        let twon = b * u.sinh();
        let sn = t + ai * (twon - u) / (b * b);
        let ai = ai * t * phi;
        return (sn, phi - ai * (twon - u), phi + ai * (twon + u));
    }

    let mut a = [0.0; 9];
    let mut c = [0.0; 9];
    a[0] = 1.0;
    c[0] = m.sqrt();
    let mut b = (1.0 - m).sqrt();
    let mut twon = 1.0;
    let mut i = 0;

    while (c[i] / a[i]).abs() > MACHEP && i < 8 {
        let ai = a[i];
        i += 1;
        c[i] = (ai - b) / 2.0;
        let t = (ai * b).sqrt();
        a[i] = (ai + b) / 2.0;
        b = t;
        twon *= 2.0;
    }

    // Backward recurrence
    let mut phi = twon * a[i] * u;
    let mut previous = phi;
    while i > 0 {
        let t = c[i] * phi.sin() / a[i];
        previous = phi;
        phi = (t.asin() + phi) / 2.0;
        i -= 1;
    }

    let sn = phi.sin();
    let cn = phi.cos();
    let dnfix = cn / (phi - previous).cos();
    let dn = if dnfix.abs() < 0.1 {
        (1.0 - m * sn * sn).sqrt()
    } else {
        dnfix
    };

    (sn, cn, dn)
}

/// Solve the degree equation for the elliptic modulus of an order-`n` filter
///
/// `m1` is the ratio of passband to stopband ripple factors (squared).
fn ellipdeg(n: usize, m1: f64) -> f64 {
    let k1 = ellipk(m1);
    let k1p = ellipkm1(m1);

    let q1 = (-PI * k1p / k1).exp();
    let q = q1.powf(1.0 / n as f64);

    let num: f64 = (0..=ELLIPDEG_MMAX).map(|m| q.powi(m * (m + 1))).sum();
    let den: f64 = 1.0 + 2.0 * (1..=ELLIPDEG_MMAX + 1).map(|m| q.powi(m * m)).sum::<f64>();

    16.0 * q * (num / den).powi(4)
}

/// `sqrt((1 - x)(1 + x))` on the principal branch
fn complement(x: Complex64) -> Complex64 {
    ((1.0 - x) * (1.0 + x)).sqrt()
}

/// Inverse Jacobi `sn` for complex `w`, via the descending Landen sequence
fn arc_jac_sn(w: Complex64, m: f64) -> Complex64 {
    let k = m.sqrt();
    if k >= 1.0 {
        return w.atanh();
    }

    let mut ks = vec![k];
    while let Some(&last) = ks.last() {
        if last == 0.0 || ks.len() > ARC_JAC_SN_MAXITER {
            break;
        }
        let last_p = ((1.0 - last) * (1.0 + last)).sqrt();
        ks.push((1.0 - last_p) / (1.0 + last_p));
    }

    let capk = ks[1..].iter().map(|kn| 1.0 + kn).product::<f64>() * FRAC_PI_2;

    let wn = ks.windows(2).fold(w, |wn, pair| {
        let (kn, knext) = (pair[0], pair[1]);
        2.0 * wn / ((1.0 + knext) * (1.0 + complement(wn * kn)))
    });

    wn.asin() * (capk * 2.0 / PI)
}

/// Real inverse of the Jacobi `sc` function for real `w`
fn arc_jac_sc1(w: f64, m: f64) -> f64 {
    arc_jac_sn(Complex64::new(0.0, w), m).im
}

/// Analog elliptic lowpass prototype with passband edge at 1 rad/s
pub fn ellipap(order: usize, passband_ripple: f64, stopband_ripple: f64) -> Zpk {
    if order == 1 {
        let pole = -(1.0 / pow10m1(0.1 * passband_ripple)).sqrt();
        return Zpk::new(Vec::new(), vec![Complex64::new(pole, 0.0)], -pole);
    }

    let eps_sq = pow10m1(0.1 * passband_ripple);
    let eps = eps_sq.sqrt();
    let ck1_sq = eps_sq / pow10m1(0.1 * stopband_ripple);

    let m = ellipdeg(order, ck1_sq);
    let capk = ellipk(m);

    let elliptic: Vec<(f64, f64, f64)> = ((1 - order % 2)..order)
        .step_by(2)
        .map(|j| ellipj(j as f64 * capk / order as f64, m))
        .collect();

    let mut zeros: Vec<Complex64> = elliptic
        .iter()
        .filter(|(s, _, _)| s.abs() > EPSILON)
        .map(|(s, _, _)| Complex64::new(0.0, 1.0 / (m.sqrt() * s)))
        .collect();
    let conjugates: Vec<Complex64> = zeros.iter().map(|z| z.conj()).collect();
    zeros.extend(conjugates);

    let r = arc_jac_sc1(1.0 / eps, ck1_sq);
    let v0 = capk * r / (order as f64 * ellipk(ck1_sq));
    let (sv, cv, dv) = ellipj(v0, 1.0 - m);

    let mut poles: Vec<Complex64> = elliptic
        .iter()
        .map(|&(s, c, d)| {
            -Complex64::new(c * d * sv * cv, s * dv) / (1.0 - (d * sv).powi(2))
        })
        .collect();

    let conjugates: Vec<Complex64> = if order % 2 == 1 {
        // The real pole of an odd order has no partner
        let scale = poles.iter().map(|p| p.norm_sqr()).sum::<f64>().sqrt();
        poles
            .iter()
            .filter(|p| p.im.abs() > EPSILON * scale)
            .map(|p| p.conj())
            .collect()
    } else {
        poles.iter().map(|p| p.conj()).collect()
    };
    poles.extend(conjugates);

    let mut gain = (product_of_negated(&poles) / product_of_negated(&zeros)).re;
    if order % 2 == 0 {
        gain /= (1.0 + eps_sq).sqrt();
    }

    Zpk::new(zeros, poles, gain)
}

/// Design an elliptic filter for a normalized band
pub fn design(
    order: usize,
    passband_ripple: f64,
    stopband_ripple: f64,
    band: &NormalizedPassband,
) -> FilterCoefficients {
    design_from_prototype(ellipap(order, passband_ripple, stopband_ripple), band)
}
