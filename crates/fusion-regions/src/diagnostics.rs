// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Region Diagnostics
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Helpers for inspecting a decomposition: per-region pieces for plotting,
//! a colour-coded region map and grid-line selection.

use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{Axis, Field2D};
use indexmap::IndexMap;
use serde_json::Value;

use crate::dataset::{BoutField, WithGuards};

/// Split a global field into its regions, each with one guard cell so that
/// neighbouring pieces overlap when drawn. A core-only grid is returned whole.
pub fn decompose_regions(field: &BoutField) -> FusionResult<IndexMap<String, Field2D>> {
    if field.metadata().is_core_only() {
        let mut whole = field.data().clone();
        whole.set_region(Some("core".to_string()));
        return Ok(IndexMap::from([("core".to_string(), whole)]));
    }
    field
        .regions()
        .names()
        .map(|name| Ok((name.to_string(), field.from_region(name, WithGuards::Uniform(1))?)))
        .collect()
}

/// Same pieces as [`decompose_regions`], each filled with `index / count`.
pub fn colour_regions(field: &BoutField) -> FusionResult<IndexMap<String, Field2D>> {
    let pieces = decompose_regions(field)?;
    let count = pieces.len() as f64;
    Ok(pieces
        .into_iter()
        .enumerate()
        .map(|(i, (name, piece))| (name, piece.full_like(i as f64 / count)))
        .collect())
}

/// Which grid lines to draw along one axis.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GridlineSelection {
    #[default]
    None,
    All,
    /// Every n-th line, starting at 0.
    Stride(usize),
    /// Python-style slice; negative bounds count from the end.
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: usize,
    },
}

impl GridlineSelection {
    fn from_value(value: &Value) -> FusionResult<Self> {
        let invalid = || {
            FusionError::InvalidArgument(format!(
                "gridlines must be bool, a positive integer or a slice {{start, stop, step}}, got {value}"
            ))
        };
        match value {
            Value::Null | Value::Bool(false) => Ok(GridlineSelection::None),
            Value::Bool(true) => Ok(GridlineSelection::All),
            Value::Number(n) => match n.as_u64() {
                Some(stride) if stride >= 1 => Ok(GridlineSelection::Stride(stride as usize)),
                _ => Err(invalid()),
            },
            Value::Object(map) => {
                let bound = |key: &str| -> FusionResult<Option<i64>> {
                    match map.get(key) {
                        None | Some(Value::Null) => Ok(None),
                        Some(v) => v.as_i64().map(Some).ok_or_else(invalid),
                    }
                };
                if map.keys().any(|k| !matches!(k.as_str(), "start" | "stop" | "step")) {
                    return Err(invalid());
                }
                let step = match bound("step")? {
                    None => 1,
                    Some(s) if s >= 1 => s as usize,
                    Some(_) => return Err(invalid()),
                };
                Ok(GridlineSelection::Slice {
                    start: bound("start")?,
                    stop: bound("stop")?,
                    step,
                })
            }
            _ => Err(invalid()),
        }
    }

    /// Selected indices in `0..len`.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        match *self {
            GridlineSelection::None => Vec::new(),
            GridlineSelection::All => (0..len).collect(),
            GridlineSelection::Stride(n) => (0..len).step_by(n).collect(),
            GridlineSelection::Slice { start, stop, step } => {
                let n = len as i64;
                let clamp = |b: i64| if b < 0 { (b + n).max(0) } else { b.min(n) };
                let start = start.map_or(0, clamp) as usize;
                let stop = stop.map_or(n, clamp) as usize;
                (start..stop.max(start)).step_by(step).collect()
            }
        }
    }
}

/// Grid-line selection for both axes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Gridlines {
    pub x: GridlineSelection,
    pub y: GridlineSelection,
}

impl Gridlines {
    /// Parse a scalar (applied to both axes) or an `{x, y}` object.
    pub fn from_value(value: &Value) -> FusionResult<Self> {
        if let Value::Object(map) = value {
            let per_axis = map.keys().all(|k| k == "x" || k == "y");
            if per_axis && !map.is_empty() {
                let get = |key: &str| {
                    map.get(key)
                        .map_or(Ok(GridlineSelection::None), GridlineSelection::from_value)
                };
                return Ok(Gridlines {
                    x: get("x")?,
                    y: get("y")?,
                });
            }
        }
        let both = GridlineSelection::from_value(value)?;
        Ok(Gridlines {
            x: both.clone(),
            y: both,
        })
    }

    pub fn indices(&self, axis: Axis, len: usize) -> Vec<usize> {
        match axis {
            Axis::X => self.x.indices(len),
            Axis::Y => self.y.indices(len),
        }
    }
}
