// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Labelled Field
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::ops::Range;

use ndarray::{concatenate, s, Array1, Array2, ArrayView1, Axis as NdAxis};

use crate::error::{FusionError, FusionResult};

/// Logical grid axis of a 2D field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Radial (BOUT++ x).
    X,
    /// Poloidal (BOUT++ y).
    Y,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// 2D field on the BOUT++ logical grid, stored `[x, y]` like `BoutGrid`.
///
/// Carries optional 1D coordinates along each axis and the name of the
/// region it was cut from, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Field2D {
    pub name: String,
    pub values: Array2<f64>,
    x_coord: Option<Array1<f64>>,
    y_coord: Option<Array1<f64>>,
    region: Option<String>,
}

impl Field2D {
    pub fn new(name: impl Into<String>, values: Array2<f64>) -> Self {
        Field2D {
            name: name.into(),
            values,
            x_coord: None,
            y_coord: None,
            region: None,
        }
    }

    /// Attach coordinates; lengths must match the value shape.
    pub fn with_coords(mut self, x: Array1<f64>, y: Array1<f64>) -> FusionResult<Self> {
        self.assign_coords(x, y)?;
        Ok(self)
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn nx(&self) -> usize {
        self.values.nrows()
    }

    pub fn ny(&self) -> usize {
        self.values.ncols()
    }

    pub fn dim(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn coord(&self, axis: Axis) -> Option<&Array1<f64>> {
        match axis {
            Axis::X => self.x_coord.as_ref(),
            Axis::Y => self.y_coord.as_ref(),
        }
    }

    pub fn has_coords(&self) -> bool {
        self.x_coord.is_some() && self.y_coord.is_some()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn set_region(&mut self, region: Option<String>) {
        self.region = region;
    }

    pub fn assign_coords(&mut self, x: Array1<f64>, y: Array1<f64>) -> FusionResult<()> {
        if x.len() != self.nx() || y.len() != self.ny() {
            return Err(FusionError::ShapeMismatch(format!(
                "coordinates ({}, {}) do not match field '{}' of shape {:?}",
                x.len(),
                y.len(),
                self.name,
                self.dim()
            )));
        }
        self.x_coord = Some(x);
        self.y_coord = Some(y);
        Ok(())
    }

    /// Select an index range along both axes. Coordinates follow the values.
    pub fn isel(&self, x: Range<usize>, y: Range<usize>) -> FusionResult<Self> {
        let (nx, ny) = self.dim();
        if x.start > x.end || x.end > nx || y.start > y.end || y.end > ny {
            return Err(FusionError::ShapeMismatch(format!(
                "selection x={x:?}, y={y:?} outside field '{}' of shape ({nx}, {ny})",
                self.name
            )));
        }
        Ok(Field2D {
            name: self.name.clone(),
            values: self.values.slice(s![x.clone(), y.clone()]).to_owned(),
            x_coord: self.x_coord.as_ref().map(|c| c.slice(s![x]).to_owned()),
            y_coord: self.y_coord.as_ref().map(|c| c.slice(s![y]).to_owned()),
            region: self.region.clone(),
        })
    }

    /// Concatenate along `axis` with an exact join on the other axis.
    ///
    /// The name is taken from the first part; the region annotation is
    /// dropped and must be re-attached by the caller.
    pub fn concat(parts: &[&Field2D], axis: Axis) -> FusionResult<Self> {
        let first = parts.first().ok_or_else(|| {
            FusionError::InvalidArgument("concat needs at least one field".to_string())
        })?;
        let other = axis.other();

        for part in &parts[1..] {
            let (a, b) = (first.values.len_of(NdAxis(other.index())), part.values.len_of(NdAxis(other.index())));
            if a != b {
                return Err(FusionError::ShapeMismatch(format!(
                    "cannot concatenate '{}' along {axis:?}: lengths along {other:?} differ ({a} vs {b})",
                    first.name
                )));
            }
            if let (Some(ca), Some(cb)) = (first.coord(other), part.coord(other)) {
                if ca != cb {
                    return Err(FusionError::CoordinateMismatch(format!(
                        "'{}' {other:?} coordinates differ between concatenated parts",
                        first.name
                    )));
                }
            }
        }

        let views: Vec<_> = parts.iter().map(|p| p.values.view()).collect();
        let values = concatenate(NdAxis(axis.index()), &views)
            .map_err(|e| FusionError::ShapeMismatch(format!("concatenate: {e}")))?;

        let seam_coord = if parts.iter().all(|p| p.coord(axis).is_some()) {
            let coords: Vec<ArrayView1<f64>> = parts
                .iter()
                .filter_map(|p| p.coord(axis).map(|c| c.view()))
                .collect();
            Some(
                concatenate(NdAxis(0), &coords)
                    .map_err(|e| FusionError::ShapeMismatch(format!("concatenate: {e}")))?,
            )
        } else {
            None
        };
        let cross_coord = if parts.iter().all(|p| p.coord(other).is_some()) {
            first.coord(other).cloned()
        } else {
            None
        };

        let (x_coord, y_coord) = match axis {
            Axis::X => (seam_coord, cross_coord),
            Axis::Y => (cross_coord, seam_coord),
        };

        Ok(Field2D {
            name: first.name.clone(),
            values,
            x_coord,
            y_coord,
            region: None,
        })
    }

    /// Same shape and coordinates, every value set to `value`.
    pub fn full_like(&self, value: f64) -> Self {
        Field2D {
            name: self.name.clone(),
            values: Array2::from_elem(self.dim(), value),
            x_coord: self.x_coord.clone(),
            y_coord: self.y_coord.clone(),
            region: self.region.clone(),
        }
    }

    /// Minimum ignoring NaN; `None` when nothing is finite-comparable.
    pub fn min(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
    }

    /// Maximum ignoring NaN; `None` when nothing is finite-comparable.
    pub fn max(&self) -> Option<f64> {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }

    /// Cumulative sum along `axis`.
    pub fn cumsum(&self, axis: Axis) -> Array2<f64> {
        let mut out = self.values.clone();
        out.accumulate_axis_inplace(NdAxis(axis.index()), |&prev, curr| *curr += prev);
        out
    }
}
