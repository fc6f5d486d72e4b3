// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-temporal-filter project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Conversion between 4D series and `(voxels, time)` matrices
//!
//! Voxels are enumerated in row-major order of the spatial axes (`z` varies
//! fastest), with or without a mask; [`fold`] is the exact inverse of
//! [`unfold`] for the same mask.

use ndarray::{s, Array2, Array3, Array4, ArrayView2};

use super::VolumeSeries;
use crate::error::{FilterError, Result};

fn check_mask(mask: &Array3<bool>, spatial: (usize, usize, usize)) -> Result<()> {
    if mask.dim() != spatial {
        return Err(FilterError::ShapeMismatch(format!(
            "mask shape {:?} does not match the spatial shape {:?}",
            mask.dim(),
            spatial
        )));
    }
    Ok(())
}

fn masked_voxels(mask: &Array3<bool>) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    mask.indexed_iter()
        .filter(|(_, selected)| **selected)
        .map(|(index, _)| index)
}

/// Flatten a series to one row per voxel and one column per time point
///
/// With a mask, only voxels where the mask is `true` become rows.
///
/// ### Errors
///
/// [`FilterError::ShapeMismatch`] if the mask does not cover the spatial shape.
pub fn unfold(series: &VolumeSeries, mask: Option<&Array3<bool>>) -> Result<Array2<f64>> {
    let data = series.data();
    let timepoints = series.n_timepoints();

    match mask {
        None => data
            .to_shape((series.n_voxels(), timepoints))
            .map(|matrix| matrix.into_owned())
            .map_err(|e| FilterError::ShapeMismatch(e.to_string())),
        Some(mask) => {
            check_mask(mask, series.spatial_shape())?;
            let rows = mask.iter().filter(|&&selected| selected).count();
            let mut matrix = Array2::zeros((rows, timepoints));
            for (mut row, (x, y, z)) in matrix.rows_mut().into_iter().zip(masked_voxels(mask)) {
                row.assign(&data.slice(s![x, y, z, ..]));
            }
            Ok(matrix)
        }
    }
}

/// Rebuild a series from a matrix produced by [`unfold`]
///
/// The result takes the template's shape, affine and header. Voxels outside
/// the mask are zero.
///
/// ### Errors
///
/// [`FilterError::ShapeMismatch`] if the row count differs from the number of
/// (masked) voxels, the column count from the template's time points, or the
/// mask from the spatial shape.
pub fn fold(
    matrix: ArrayView2<f64>,
    template: &VolumeSeries,
    mask: Option<&Array3<bool>>,
) -> Result<VolumeSeries> {
    let (x, y, z) = template.spatial_shape();
    let timepoints = template.n_timepoints();
    let (rows, columns) = matrix.dim();

    if columns != timepoints {
        return Err(FilterError::ShapeMismatch(format!(
            "matrix has {} time points, template has {}",
            columns, timepoints
        )));
    }

    let data = match mask {
        None => {
            if rows != template.n_voxels() {
                return Err(FilterError::ShapeMismatch(format!(
                    "matrix has {} rows, template has {} voxels",
                    rows,
                    template.n_voxels()
                )));
            }
            matrix
                .to_shape((x, y, z, timepoints))
                .map_err(|e| FilterError::ShapeMismatch(e.to_string()))?
                .into_owned()
        }
        Some(mask) => {
            check_mask(mask, (x, y, z))?;
            let selected = mask.iter().filter(|&&selected| selected).count();
            if rows != selected {
                return Err(FilterError::ShapeMismatch(format!(
                    "matrix has {} rows, mask selects {} voxels",
                    rows, selected
                )));
            }
            let mut data = Array4::zeros((x, y, z, timepoints));
            for (row, (i, j, k)) in matrix.rows().into_iter().zip(masked_voxels(mask)) {
                data.slice_mut(s![i, j, k, ..]).assign(&row);
            }
            data
        }
    };

    Ok(template.with_data(data))
}
