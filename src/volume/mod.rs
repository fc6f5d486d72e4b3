// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! In-memory 4D volumetric time series
//!
//! A [`VolumeSeries`] holds a dense `(X, Y, Z, T)` buffer together with the
//! geometry it was acquired with (4×4 voxel-to-world affine) and free-form
//! header metadata. Reading and writing image files is left to the caller.
//!
//! The [`matrix`] submodule converts between a series and the 2D
//! `(voxels, time)` matrix the temporal filters work on.

pub mod matrix;

use std::collections::BTreeMap;

use ndarray::{Array2, Array3, Array4};
use serde_json::Value;

use crate::error::{FilterError, Result};
use crate::preprocessing::filter::Filter;

pub use matrix::{fold, unfold};

/// Header key holding the interval between volumes, in seconds
pub const REPETITION_TIME_KEY: &str = "repetition_time";

/// Dense 4D series with its geometry
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeSeries {
    data: Array4<f64>,
    affine: Array2<f64>,
    header: BTreeMap<String, Value>,
}

impl VolumeSeries {
    /// Create a series, checking that the affine is 4×4
    pub fn new(data: Array4<f64>, affine: Array2<f64>, header: BTreeMap<String, Value>) -> Result<Self> {
        if affine.dim() != (4, 4) {
            return Err(FilterError::ShapeMismatch(format!(
                "affine must be 4x4, got {:?}",
                affine.dim()
            )));
        }
        Ok(Self {
            data,
            affine,
            header,
        })
    }

    /// Series with an identity affine and an empty header
    pub fn from_data(data: Array4<f64>) -> Self {
        Self {
            data,
            affine: Array2::eye(4),
            header: BTreeMap::new(),
        }
    }

    /// Attach a header entry
    pub fn with_header_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }

    pub fn data(&self) -> &Array4<f64> {
        &self.data
    }

    pub fn into_data(self) -> Array4<f64> {
        self.data
    }

    pub fn affine(&self) -> &Array2<f64> {
        &self.affine
    }

    pub fn header(&self) -> &BTreeMap<String, Value> {
        &self.header
    }

    /// `(X, Y, Z)` extent of a single volume
    pub fn spatial_shape(&self) -> (usize, usize, usize) {
        let (x, y, z, _) = self.data.dim();
        (x, y, z)
    }

    pub fn n_voxels(&self) -> usize {
        let (x, y, z) = self.spatial_shape();
        x * y * z
    }

    pub fn n_timepoints(&self) -> usize {
        self.data.dim().3
    }

    /// Interval between volumes recorded in the header, if any
    pub fn repetition_time(&self) -> Option<f64> {
        self.header.get(REPETITION_TIME_KEY).and_then(Value::as_f64)
    }

    /// New series sharing this series' affine and header
    pub fn with_data(&self, data: Array4<f64>) -> Self {
        Self {
            data,
            affine: self.affine.clone(),
            header: self.header.clone(),
        }
    }
}

/// Filter the time course of every voxel of a series
///
/// Voxels outside `mask` are set to zero in the result. The input series is
/// not modified.
pub fn filter_volume<F>(series: &VolumeSeries, mask: Option<&Array3<bool>>, filter: &F) -> Result<VolumeSeries>
where
    F: Filter + ?Sized,
{
    let matrix = unfold(series, mask)?;
    let filtered = filter.apply(matrix.view())?;
    fold(filtered.view(), series, mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_bad_affine() {
        let data = Array4::<f64>::zeros((2, 2, 2, 3));
        let result = VolumeSeries::new(data, Array2::eye(3), BTreeMap::new());
        assert!(matches!(result, Err(FilterError::ShapeMismatch(_))));
    }

    #[test]
    fn test_shape_accessors() {
        let series = VolumeSeries::from_data(Array4::zeros((2, 3, 4, 5)));
        assert_eq!(series.spatial_shape(), (2, 3, 4));
        assert_eq!(series.n_voxels(), 24);
        assert_eq!(series.n_timepoints(), 5);
        assert_eq!(series.affine(), &Array2::<f64>::eye(4));
        assert_eq!(series.repetition_time(), None);
    }

    #[test]
    fn test_with_data_keeps_geometry() {
        let affine = array![
            [2.0, 0.0, 0.0, -90.0],
            [0.0, 2.0, 0.0, -126.0],
            [0.0, 0.0, 2.0, -72.0],
            [0.0, 0.0, 0.0, 1.0]
        ];
        let series = VolumeSeries::new(Array4::zeros((1, 1, 1, 2)), affine.clone(), BTreeMap::new())
            .unwrap()
            .with_header_entry(REPETITION_TIME_KEY, 2.5);

        let copy = series.with_data(Array4::ones((1, 1, 1, 2)));
        assert_eq!(copy.affine(), &affine);
        assert_eq!(copy.repetition_time(), Some(2.5));
        assert_eq!(copy.data().sum(), 2.0);
    }
}
