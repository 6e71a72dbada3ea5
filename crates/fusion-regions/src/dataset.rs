// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — BOUT++ Dataset
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Global BOUT++ variables and per-region extraction.
//!
//! A [`BoutDataset`] owns the global arrays of one run. Its metadata and
//! region registry are shared with every [`BoutField`] through `Arc`, so a
//! field can be extracted for any region without reaching back to the
//! dataset.

use std::collections::BTreeMap;
use std::sync::Arc;

use fusion_types::config::GridMetadata;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::Field2D;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::builder::{build_regions, GridSpacing};
use crate::guards;
use crate::region::{Region, RegionMap};
use crate::topology::{classify, Topology};

/// Guard widths requested when extracting a region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WithGuards {
    /// `MXG`/`MYG` from the grid metadata.
    #[default]
    Native,
    /// Same width on both axes.
    Uniform(usize),
    /// Width per bound axis name; a missing axis falls back to the native width.
    PerAxis(BTreeMap<String, usize>),
}

impl WithGuards {
    /// Parse from a JSON value: `null`, a non-negative integer or an
    /// object keyed by axis name.
    pub fn from_value(value: serde_json::Value) -> FusionResult<Self> {
        serde_json::from_value(value.clone()).map_err(|_| {
            FusionError::InvalidArgument(format!(
                "with_guards must be an integer or a map of axis name to integer, got {value}"
            ))
        })
    }

    /// `(mxg, myg)` to use for `meta`.
    pub fn resolve(&self, meta: &GridMetadata) -> FusionResult<(usize, usize)> {
        let native = (meta.mxg.max(0) as usize, meta.myg.max(0) as usize);
        match self {
            WithGuards::Native => Ok(native),
            WithGuards::Uniform(n) => Ok((*n, *n)),
            WithGuards::PerAxis(widths) => {
                let (mut mxg, mut myg) = native;
                for (axis, &width) in widths {
                    if *axis == meta.axes.x {
                        mxg = width;
                    } else if *axis == meta.axes.y {
                        myg = width;
                    } else {
                        return Err(FusionError::InvalidArgument(format!(
                            "with_guards names axis '{axis}', expected '{}' or '{}'",
                            meta.axes.x, meta.axes.y
                        )));
                    }
                }
                Ok((mxg, myg))
            }
        }
    }
}

impl From<usize> for WithGuards {
    fn from(width: usize) -> Self {
        WithGuards::Uniform(width)
    }
}

/// A global variable together with the grid description it lives on.
#[derive(Debug, Clone)]
pub struct BoutField {
    data: Field2D,
    metadata: Arc<GridMetadata>,
    regions: Arc<RegionMap>,
}

impl BoutField {
    /// Wrap a global array; its shape must be the global shape of `metadata`.
    pub fn new(
        data: Field2D,
        metadata: Arc<GridMetadata>,
        regions: Arc<RegionMap>,
    ) -> FusionResult<Self> {
        let shape = metadata.global_shape()?;
        if data.dim() != shape {
            return Err(FusionError::ShapeMismatch(format!(
                "variable '{}' has shape {:?}, global grid is {shape:?}",
                data.name,
                data.dim()
            )));
        }
        Ok(BoutField {
            data,
            metadata,
            regions,
        })
    }

    pub fn data(&self) -> &Field2D {
        &self.data
    }

    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    pub fn region(&self, name: &str) -> FusionResult<&Region> {
        self.regions.get(name)
    }

    /// Cut out `name` and fill its guard cells from the connected regions.
    pub fn from_region(&self, name: &str, with_guards: WithGuards) -> FusionResult<Field2D> {
        let (mxg, myg) = with_guards.resolve(&self.metadata)?;
        self.region_with_guards(name, mxg, myg)
    }

    pub(crate) fn region_with_guards(
        &self,
        name: &str,
        mxg: usize,
        myg: usize,
    ) -> FusionResult<Field2D> {
        let region = self.regions.get(name)?;
        let (x, y) = region.interior_slice().resolve(self.data.dim())?;
        let mut da = self.data.isel(x, y)?;
        da.set_region(Some(region.name().to_string()));

        if region.connection_inner_x().is_some() {
            da = guards::concat_inner_guards(da, self, mxg)?;
        }
        if region.connection_outer_x().is_some() {
            da = guards::concat_outer_guards(da, self, mxg)?;
        }
        if region.connection_lower_y().is_some() {
            da = guards::concat_lower_guards(da, self, mxg, myg)?;
        }
        if region.connection_upper_y().is_some() {
            da = guards::concat_upper_guards(da, self, mxg, myg)?;
        }
        Ok(da)
    }
}

/// Extract `region` from `field`; same as [`BoutField::from_region`].
pub fn extract_region(
    field: &BoutField,
    region: &str,
    with_guards: WithGuards,
) -> FusionResult<Field2D> {
    field.from_region(region, with_guards)
}

/// All global variables of one BOUT++ run plus their shared region registry.
#[derive(Debug, Clone)]
pub struct BoutDataset {
    metadata: Arc<GridMetadata>,
    topology: Topology,
    regions: Arc<RegionMap>,
    variables: IndexMap<String, BoutField>,
}

impl BoutDataset {
    pub fn new(metadata: GridMetadata, variables: Vec<Field2D>) -> FusionResult<Self> {
        metadata.validate()?;
        let shape = metadata.global_shape()?;
        for var in &variables {
            if var.dim() != shape {
                return Err(FusionError::ShapeMismatch(format!(
                    "variable '{}' has shape {:?}, global grid is {shape:?}",
                    var.name,
                    var.dim()
                )));
            }
        }

        let topology = classify(&metadata)?;
        let find = |name: &str| variables.iter().find(|v| v.name == name);
        let spacing = match (find("dx"), find("dy")) {
            (Some(dx), Some(dy)) => Some(GridSpacing { dx, dy }),
            _ => None,
        };
        let regions = Arc::new(build_regions(topology, &metadata, spacing)?);
        let metadata = Arc::new(metadata);

        let mut fields = IndexMap::with_capacity(variables.len());
        for var in variables {
            let name = var.name.clone();
            let field = BoutField::new(var, Arc::clone(&metadata), Arc::clone(&regions))?;
            if fields.insert(name.clone(), field).is_some() {
                return Err(FusionError::InvalidArgument(format!(
                    "variable '{name}' given more than once"
                )));
            }
        }

        Ok(BoutDataset {
            metadata,
            topology,
            regions,
            variables: fields,
        })
    }

    pub fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn regions(&self) -> &RegionMap {
        &self.regions
    }

    pub fn variable(&self, name: &str) -> FusionResult<&BoutField> {
        self.variables
            .get(name)
            .ok_or_else(|| FusionError::UnknownVariable(name.to_string()))
    }

    pub fn variables(&self) -> impl Iterator<Item = &BoutField> {
        self.variables.values()
    }
}
