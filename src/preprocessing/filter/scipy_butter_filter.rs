// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Butterworth digital filters using SciPy-style SOS (Second-Order Sections)
//!
//! The design is delegated to sci-rs `iirfilter_dyn` with
//! `FilterOutputType::Sos`, which follows SciPy's `butter(..., output='sos')`.
//! Butterworth filters have a maximally flat passband and a magnitude of
//! `1/sqrt(2)` at each cutoff for a single pass.

use sci_rs::signal::filter::design::{
    iirfilter_dyn, DigitalFilter, FilterBandType, FilterOutputType, FilterType,
};

use super::FilterCoefficients;
use crate::error::{FilterError, Result};
use crate::preprocessing::passband::{FilterPass, NormalizedPassband};

/// Map a band classification to the sci-rs band type
pub(crate) fn band_type(pass: FilterPass) -> FilterBandType {
    match pass {
        FilterPass::Highpass => FilterBandType::Highpass,
        FilterPass::Lowpass => FilterBandType::Lowpass,
        FilterPass::Bandpass => FilterBandType::Bandpass,
        FilterPass::Bandstop => FilterBandType::Bandstop,
    }
}

/// Design a Butterworth filter of the given order for a normalized band
///
/// ### Errors
///
/// Returns [`FilterError::Design`] if sci-rs does not return second-order sections.
pub fn design(order: usize, band: &NormalizedPassband) -> Result<FilterCoefficients> {
    let result = iirfilter_dyn(
        order,                                   // filter order
        band.design_frequencies(),               // critical frequencies (normalized)
        None,                                    // rp (not used for Butterworth)
        None,                                    // rs (not used for Butterworth)
        Some(band_type(band.classification())), // band type
        Some(FilterType::Butterworth),           // analog prototype
        Some(false),                             // analog = false (digital filter)
        Some(FilterOutputType::Sos),             // output as SOS
        None,                                    // fs (already normalized)
    );

    match result {
        DigitalFilter::Sos(sos_filter) => Ok(FilterCoefficients::new(sos_filter.sos)),
        _ => Err(FilterError::Design(
            "Expected SOS output from iirfilter_dyn".to_string(),
        )),
    }
}
