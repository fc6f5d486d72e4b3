// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Digital design chain shared by the prototype-based filter families
//!
//! sci-rs `iirfilter_dyn` only ships the Butterworth prototype, so the
//! Chebyshev and elliptic modules build their own analog prototypes and hand
//! them to this module. From there on the pipeline is the sci-rs one: the
//! `lp2*_zpk_dyn` band transforms, `bilinear_zpk_dyn` at `fs = 2` with
//! pre-warped frequencies and `zpk2sos_dyn` with nearest pairing.

use std::f64::consts::PI;

use num_complex::Complex64;
use sci_rs::signal::filter::design::{
    bilinear_zpk_dyn, lp2bp_zpk_dyn, lp2bs_zpk_dyn, lp2hp_zpk_dyn, lp2lp_zpk_dyn, zpk2sos_dyn,
    ZpkFormatFilter,
};

use super::FilterCoefficients;
use crate::preprocessing::passband::NormalizedPassband;

/// Sampling rate the critical frequencies are relative to (Nyquist = 1)
const FS: f64 = 2.0;

/// Analog or digital filter as zeros, poles and gain
pub type Zpk = ZpkFormatFilter<f64>;

/// Product of the negated roots, i.e. the constant term of `prod(s - r)`
pub(crate) fn product_of_negated(roots: &[Complex64]) -> Complex64 {
    roots
        .iter()
        .fold(Complex64::new(1.0, 0.0), |acc, &root| acc * (-root))
}

/// Analog frequency for a critical frequency relative to Nyquist
fn prewarp(w: f64) -> f64 {
    2.0 * FS * (PI * w / FS).tan()
}

/// Move an analog lowpass prototype to the band, discretize it and split it
/// into second-order sections
pub(crate) fn design_from_prototype(prototype: Zpk, band: &NormalizedPassband) -> FilterCoefficients {
    let order = prototype.p.len();

    let analog = match *band {
        NormalizedPassband::Lowpass(w) => lp2lp_zpk_dyn(prototype, Some(prewarp(w))),
        NormalizedPassband::Highpass(w) => lp2hp_zpk_dyn(prototype, Some(prewarp(w))),
        NormalizedPassband::Bandpass(..) | NormalizedPassband::Bandstop(..) => {
            let edges = band.design_frequencies();
            let (low, high) = (prewarp(edges[0]), prewarp(edges[1]));
            let wo = (low * high).sqrt();
            let bw = high - low;
            if matches!(band, NormalizedPassband::Bandpass(..)) {
                lp2bp_zpk_dyn(prototype, Some(wo), Some(bw))
            } else {
                lp2bs_zpk_dyn(prototype, Some(wo), Some(bw))
            }
        }
    };

    let digital = bilinear_zpk_dyn(analog, FS);
    FilterCoefficients::new(zpk2sos_dyn(order, digital, None, Some(false)).sos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn first_order_lowpass() -> Zpk {
        Zpk::new(vec![], vec![Complex64::new(-1.0, 0.0)], 1.0)
    }

    #[test]
    fn test_prewarp_matches_tangent_mapping() {
        assert_relative_eq!(prewarp(0.5), 4.0, epsilon = 1e-12);
        assert!(prewarp(0.999) > 1000.0);
    }

    #[test]
    fn test_first_order_lowpass_sections() {
        let coefficients =
            design_from_prototype(first_order_lowpass(), &NormalizedPassband::Lowpass(0.5));
        assert_eq!(coefficients.sections().len(), 1);
        // Half-band first order lowpass: (1 + z^-1) / 2
        assert_relative_eq!(coefficients.magnitude(0.0), 1.0, epsilon = 1e-12);
        assert_relative_eq!(coefficients.magnitude(1.0), 0.0, epsilon = 1e-12);
        let section = &coefficients.sections()[0];
        assert_relative_eq!(section.b[0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(section.b[1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(section.a[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_bandstop_zeros_sit_on_the_centre_frequency() {
        let coefficients = design_from_prototype(
            first_order_lowpass(),
            &NormalizedPassband::Bandstop(0.4, 0.2),
        );
        let centre = 2.0 / PI * ((0.2 * PI / 2.0).tan() * (0.4 * PI / 2.0).tan()).sqrt().atan();
        assert!(coefficients.magnitude(centre) < 1e-9);
        assert_relative_eq!(coefficients.magnitude(0.0), 1.0, epsilon = 1e-9);
    }
}
