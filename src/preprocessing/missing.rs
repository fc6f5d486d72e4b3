// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Placeholder strategies for missing (NaN) samples
//!
//! Forward-backward filtering cannot run over NaN values, so missing samples
//! are replaced before filtering and put back afterwards. The replacement
//! only has to keep the recursion finite; it still leaks into neighbouring
//! samples through the filter's impulse response.

use std::fmt::Debug;
use std::sync::Arc;

use ndarray::ArrayViewMut1;
use serde::{Deserialize, Serialize};

/// Strategy filling missing samples of a single time series in place
pub trait FillMissing: Send + Sync + Debug {
    /// Replace every NaN of `row` with a finite value
    fn fill(&self, row: ArrayViewMut1<f64>);

    /// Short name used in logs and configuration
    fn name(&self) -> &'static str;
}

/// Replace missing samples with zero
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroFill;

impl FillMissing for ZeroFill {
    fn fill(&self, mut row: ArrayViewMut1<f64>) {
        row.mapv_inplace(|x| if x.is_nan() { 0.0 } else { x });
    }

    fn name(&self) -> &'static str {
        "zero"
    }
}

/// Linearly interpolate interior gaps and hold the nearest sample at the edges
///
/// A row with no observed sample at all is filled with zeros.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolation;

impl FillMissing for LinearInterpolation {
    fn fill(&self, mut row: ArrayViewMut1<f64>) {
        let observed: Vec<usize> = row
            .iter()
            .enumerate()
            .filter(|(_, x)| !x.is_nan())
            .map(|(i, _)| i)
            .collect();

        let (first, last) = match (observed.first(), observed.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                row.fill(0.0);
                return;
            }
        };

        let (head, tail) = (row[first], row[last]);
        row.slice_mut(ndarray::s![..first]).fill(head);
        row.slice_mut(ndarray::s![last + 1..]).fill(tail);

        for pair in observed.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            if end - start < 2 {
                continue;
            }
            let (from, to) = (row[start], row[end]);
            let span = (end - start) as f64;
            for i in start + 1..end {
                row[i] = from + (to - from) * (i - start) as f64 / span;
            }
        }
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Serializable selection of a [`FillMissing`] strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    #[default]
    Zero,
    Linear,
}

impl FillStrategy {
    pub fn build(self) -> Arc<dyn FillMissing> {
        match self {
            FillStrategy::Zero => Arc::new(ZeroFill),
            FillStrategy::Linear => Arc::new(LinearInterpolation),
        }
    }
}
