// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Guard-Cell Stitching
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fill the guard cells of a region-local field from its neighbours.
//!
//! Each operation takes a field cut from one region (annotated with that
//! region's name) and the global field it came from, and returns a new field
//! with guard cells prepended or appended on one edge. x-guards are stitched
//! before y-guards, so y-guards pick up the corner cells from the
//! neighbour's own x-stitching.

use std::ops::Range;

use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{Axis, Field2D};
use ndarray::s;

use crate::dataset::BoutField;
use crate::region::{Edge, Region};

fn requester<'a>(da: &Field2D, global: &'a BoutField) -> FusionResult<&'a Region> {
    let name = da.region().ok_or_else(|| {
        FusionError::InvalidArgument(format!(
            "field '{}' carries no region annotation, cannot fill guard cells",
            da.name
        ))
    })?;
    global.regions().get(name)
}

fn connected<'a>(region: &'a Region, edge: Edge) -> FusionResult<&'a str> {
    region.connection(edge).ok_or_else(|| {
        FusionError::InvalidArgument(format!(
            "region '{}' has no neighbour across its {edge:?} edge",
            region.name()
        ))
    })
}

/// The `width` cells of a block of length `len` that sit next to the seam on `edge`
/// of the requesting region.
fn seam_cells(len: usize, width: usize, edge: Edge, source: &str) -> FusionResult<Range<usize>> {
    if width > len {
        return Err(FusionError::InvalidArgument(format!(
            "{width} guard cells requested but region '{source}' is only {len} cells wide"
        )));
    }
    Ok(match edge {
        Edge::InnerX | Edge::LowerY => len - width..len,
        Edge::OuterX | Edge::UpperY => 0..width,
    })
}

fn rewrite_coords(
    block: &mut Field2D,
    global: &Field2D,
    x: Range<usize>,
    y: Range<usize>,
) -> FusionResult<()> {
    if let (Some(gx), Some(gy)) = (global.coord(Axis::X), global.coord(Axis::Y)) {
        block.assign_coords(gx.slice(s![x]).to_owned(), gy.slice(s![y]).to_owned())?;
    }
    Ok(())
}

/// Prepend `mxg` inner x-guard columns.
pub fn concat_inner_guards(da: Field2D, global: &BoutField, mxg: usize) -> FusionResult<Field2D> {
    concat_x_guards(da, global, mxg, Edge::InnerX)
}

/// Append `mxg` outer x-guard columns.
pub fn concat_outer_guards(da: Field2D, global: &BoutField, mxg: usize) -> FusionResult<Field2D> {
    concat_x_guards(da, global, mxg, Edge::OuterX)
}

/// Prepend `myg` lower y-guard rows, with `mxg` corner columns where `da` has them.
pub fn concat_lower_guards(
    da: Field2D,
    global: &BoutField,
    mxg: usize,
    myg: usize,
) -> FusionResult<Field2D> {
    concat_y_guards(da, global, mxg, myg, Edge::LowerY)
}

/// Append `myg` upper y-guard rows, with `mxg` corner columns where `da` has them.
pub fn concat_upper_guards(
    da: Field2D,
    global: &BoutField,
    mxg: usize,
    myg: usize,
) -> FusionResult<Field2D> {
    concat_y_guards(da, global, mxg, myg, Edge::UpperY)
}

fn concat_x_guards(
    da: Field2D,
    global: &BoutField,
    mxg: usize,
    edge: Edge,
) -> FusionResult<Field2D> {
    if mxg == 0 {
        return Ok(da);
    }
    let region = requester(&da, global)?;
    let neighbour_name = connected(region, edge)?;
    let neighbour = global.region(neighbour_name)?;
    log::trace!(
        "stitching {mxg} {edge:?} guard columns into '{}' from '{neighbour_name}'",
        region.name()
    );

    let meta = global.metadata();
    let myg = meta.myg.max(0) as usize;
    let reconcile = myg > 0 && meta.keep_yboundaries;

    let block = global.region_with_guards(neighbour_name, 0, 0)?;

    // The neighbour keeps boundary rows where the requester has a seam instead
    let mut rows = 0..block.ny();
    if reconcile && region.connection_lower_y().is_some() && neighbour.connection_lower_y().is_none() {
        log::trace!("dropping {myg} lower boundary rows of '{neighbour_name}'");
        rows.start = myg.min(rows.end);
    }
    if reconcile && region.connection_upper_y().is_some() && neighbour.connection_upper_y().is_none() {
        log::trace!("dropping {myg} upper boundary rows of '{neighbour_name}'");
        rows.end = rows.end.saturating_sub(myg).max(rows.start);
    }
    let columns = seam_cells(block.nx(), mxg, edge, neighbour_name)?;
    let mut block = block.isel(columns, rows)?;

    // The requester keeps boundary rows where the neighbour has a seam: take
    // them from the neighbour's own y-neighbour
    if reconcile && region.connection_lower_y().is_none() {
        if let Some(below) = neighbour.connection_lower_y() {
            log::trace!("fetching {myg} rows below '{neighbour_name}' from '{below}'");
            let extra = global.region_with_guards(below, 0, 0)?;
            let columns = seam_cells(extra.nx(), mxg, edge, below)?;
            let rows = seam_cells(extra.ny(), myg, Edge::LowerY, below)?;
            let extra = extra.isel(columns, rows)?;
            block = Field2D::concat(&[&extra, &block], Axis::Y)?;
        }
    }
    if reconcile && region.connection_upper_y().is_none() {
        if let Some(above) = neighbour.connection_upper_y() {
            log::trace!("fetching {myg} rows above '{neighbour_name}' from '{above}'");
            let extra = global.region_with_guards(above, 0, 0)?;
            let columns = seam_cells(extra.nx(), mxg, edge, above)?;
            let rows = seam_cells(extra.ny(), myg, Edge::UpperY, above)?;
            let extra = extra.isel(columns, rows)?;
            block = Field2D::concat(&[&block, &extra], Axis::Y)?;
        }
    }

    let slice = match edge {
        Edge::InnerX => region.inner_x_slice(mxg, 0),
        _ => region.outer_x_slice(mxg, 0),
    };
    let (x, y) = slice.resolve(global.data().dim())?;
    if da.has_coords() {
        rewrite_coords(&mut block, global.data(), x, y)?;
    }

    let name = region.name().to_string();
    let mut out = match edge {
        Edge::InnerX => Field2D::concat(&[&block, &da], Axis::X)?,
        _ => Field2D::concat(&[&da, &block], Axis::X)?,
    };
    out.set_region(Some(name));
    Ok(out)
}

fn concat_y_guards(
    da: Field2D,
    global: &BoutField,
    mxg: usize,
    myg: usize,
    edge: Edge,
) -> FusionResult<Field2D> {
    if myg == 0 {
        return Ok(da);
    }
    let region = requester(&da, global)?;
    let neighbour_name = connected(region, edge)?;
    log::trace!(
        "stitching {myg} {edge:?} guard rows into '{}' from '{neighbour_name}'",
        region.name()
    );

    let block = global.region_with_guards(neighbour_name, mxg, 0)?;
    let rows = seam_cells(block.ny(), myg, edge, neighbour_name)?;
    let mut block = block.isel(0..block.nx(), rows)?;

    let slice = match edge {
        Edge::LowerY => region.lower_y_slice(myg, mxg),
        _ => region.upper_y_slice(myg, mxg),
    };
    let (x, y) = slice.resolve(global.data().dim())?;
    if da.has_coords() {
        rewrite_coords(&mut block, global.data(), x, y)?;
    }

    let name = region.name().to_string();
    let mut out = match edge {
        Edge::LowerY => Field2D::concat(&[&block, &da], Axis::Y)?,
        _ => Field2D::concat(&[&da, &block], Axis::Y)?,
    };
    out.set_region(Some(name));
    Ok(out)
}
