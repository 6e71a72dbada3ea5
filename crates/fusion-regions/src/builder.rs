// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Region Builder
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Construction of the region registry for each supported topology.
//!
//! All region bounds include the boundary cells retained in the dataset;
//! guard cells at inter-region seams are filled later by [`crate::guards`].
//! Connections are only ever created in symmetric pairs.

use std::ops::Range;

use fusion_types::config::GridMetadata;
use fusion_types::error::{FusionError, FusionResult};
use fusion_types::state::{Axis, Field2D};
use ndarray::{Array2, ArrayView1};

use crate::region::{Edge, Region, RegionExtent, RegionMap};
use crate::topology::Topology;

/// Cell spacing fields used to compute the physical extent of each region.
/// Both are in the global `[x, y]` layout of the dataset.
#[derive(Debug, Clone, Copy)]
pub struct GridSpacing<'a> {
    pub dx: &'a Field2D,
    pub dy: &'a Field2D,
}

/// Spacing together with its running sums, dx along x and dy along y.
struct CellEdges<'a> {
    spacing: GridSpacing<'a>,
    x_sum: Array2<f64>,
    y_sum: Array2<f64>,
}

impl<'a> CellEdges<'a> {
    fn new(spacing: GridSpacing<'a>) -> Self {
        CellEdges {
            spacing,
            x_sum: spacing.dx.cumsum(Axis::X),
            y_sum: spacing.dy.cumsum(Axis::Y),
        }
    }

    fn extent(&self, x: &Range<usize>, y: &Range<usize>) -> RegionExtent {
        // dx is constant along y within a region and dy constant along x
        let (x_inner, x_outer) = edges(
            self.spacing.dx.values.column(y.start),
            self.x_sum.column(y.start),
            x,
        );
        let (y_lower, y_upper) = edges(
            self.spacing.dy.values.row(x.start),
            self.y_sum.row(x.start),
            y,
        );
        RegionExtent {
            x_inner,
            x_outer,
            y_lower,
            y_upper,
        }
    }
}

/// Separatrix and branch-cut indices after clamping, ordering and shifting
/// for the boundary cells present in the global arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoints {
    pub ixseps1: i64,
    pub ixseps2: i64,
    pub nx: i64,
    pub jyseps1_1: i64,
    pub jyseps2_1: i64,
    pub ny_inner: i64,
    pub jyseps1_2: i64,
    pub jyseps2_2: i64,
    pub ny: i64,
    /// y-boundary width at the lower targets.
    pub ybndry: i64,
}

fn in_range(val: i64, lower: i64, upper: i64) -> i64 {
    if val < lower {
        lower
    } else if val > upper {
        upper
    } else {
        val
    }
}

fn ordered(a: i64, b: i64) -> (i64, i64) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}

impl Breakpoints {
    /// Fails with `ConfigError` when `meta` does not validate, so the index
    /// arithmetic below stays within the global shape.
    pub fn new(meta: &GridMetadata) -> FusionResult<Self> {
        meta.validate()?;
        let (global_nx, global_ny) = meta.global_shape()?;
        let ybndry = meta.y_boundary_width();
        // An upper target only exists with a genuine upper X-point
        let ybndry_upper = meta.upper_y_boundary_width();
        let dropped_x = meta.mxg - meta.x_boundary_width();

        let (nx, ny) = (meta.nx, meta.ny);
        let (ixs1, ixs2) = ordered(
            in_range(meta.ixseps1, 0, nx),
            in_range(meta.ixseps2, 0, nx),
        );
        let jys11 = in_range(meta.jyseps1_1, 0, ny - 1);
        let (jys21, jys12) = ordered(
            in_range(meta.jyseps2_1, 0, ny - 1),
            in_range(meta.jyseps1_2, 0, ny - 1),
        );
        let ny_inner = in_range(meta.ny_inner, jys21 + 1, jys12 + 1);
        let jys22 = in_range(meta.jyseps2_2, 0, ny - 1);

        Ok(Breakpoints {
            ixseps1: ixs1 - dropped_x,
            ixseps2: ixs2 - dropped_x,
            nx: global_nx as i64,
            jyseps1_1: jys11 + ybndry,
            jyseps2_1: jys21 + ybndry,
            ny_inner: ny_inner + ybndry + ybndry_upper,
            jyseps1_2: jys12 + ybndry + 2 * ybndry_upper,
            jyseps2_2: jys22 + ybndry + 2 * ybndry_upper,
            ny: global_ny as i64,
            ybndry,
        })
    }
}

struct RegionDraft {
    name: &'static str,
    x: (i64, i64),
    y: (i64, i64),
}

/// Mutable staging area; frozen into an immutable [`RegionMap`].
struct Drafts {
    grid: (i64, i64),
    drafts: Vec<RegionDraft>,
    connections: Vec<(&'static str, Edge, &'static str)>,
}

impl Drafts {
    fn new(b: &Breakpoints) -> Self {
        Drafts {
            grid: (b.nx, b.ny),
            drafts: Vec::new(),
            connections: Vec::new(),
        }
    }

    fn add(&mut self, name: &'static str, x: (i64, i64), y: (i64, i64)) {
        self.drafts.push(RegionDraft { name, x, y });
    }

    fn connect_x(&mut self, inner: &'static str, outer: &'static str) {
        self.connections.push((inner, Edge::OuterX, outer));
        self.connections.push((outer, Edge::InnerX, inner));
    }

    fn connect_y(&mut self, lower: &'static str, upper: &'static str) {
        self.connections.push((lower, Edge::UpperY, upper));
        self.connections.push((upper, Edge::LowerY, lower));
    }

    fn clip(r: (i64, i64), n: i64) -> Range<usize> {
        let start = in_range(r.0, 0, n);
        let end = in_range(r.1, start, n);
        start as usize..end as usize
    }

    fn freeze(self, topology: Topology, spacing: Option<GridSpacing<'_>>) -> FusionResult<RegionMap> {
        let (nx, ny) = self.grid;
        let kept: Vec<(&'static str, Range<usize>, Range<usize>)> = self
            .drafts
            .iter()
            .filter_map(|d| {
                let x = Self::clip(d.x, nx);
                let y = Self::clip(d.y, ny);
                if x.is_empty() || y.is_empty() {
                    log::debug!("{topology}: skipping empty region {}", d.name);
                    None
                } else {
                    Some((d.name, x, y))
                }
            })
            .collect();
        if kept.is_empty() {
            return Err(FusionError::DegenerateRegion {
                topology: topology.to_string(),
                nx,
                ny,
            });
        }

        let cell_edges = spacing.map(CellEdges::new);
        let is_kept = |name: &str| kept.iter().any(|(n, _, _)| *n == name);
        let mut regions = Vec::with_capacity(kept.len());
        for (name, x, y) in &kept {
            let mut conns: [Option<String>; 4] = Default::default();
            for (from, edge, to) in &self.connections {
                // Connections to skipped regions become true boundaries on both sides
                if from == name && is_kept(to) {
                    let slot = match edge {
                        Edge::InnerX => 0,
                        Edge::OuterX => 1,
                        Edge::LowerY => 2,
                        Edge::UpperY => 3,
                    };
                    conns[slot] = Some((*to).to_string());
                }
            }
            let extent = cell_edges.as_ref().map(|e| e.extent(x, y));
            let [inner_x, outer_x, lower_y, upper_y] = conns;
            regions.push(Region::new(
                (*name).to_string(),
                x.clone(),
                y.clone(),
                inner_x,
                outer_x,
                lower_y,
                upper_y,
                extent,
            ));
        }
        log::debug!("built {} regions for {topology} topology", regions.len());
        Ok(RegionMap::from_regions(regions))
    }
}

/// Position of the cell edges bounding `range` along a 1D spacing profile.
fn edges(spacing: ArrayView1<'_, f64>, cumsum: ArrayView1<'_, f64>, range: &Range<usize>) -> (f64, f64) {
    let (first, last) = (range.start, range.end - 1);
    (
        cumsum[first] - spacing[first] / 2.0,
        cumsum[last] + spacing[last] / 2.0,
    )
}

/// Build the region registry for a topology tag given by name.
pub fn build_regions_for_tag(
    tag: &str,
    meta: &GridMetadata,
    spacing: Option<GridSpacing<'_>>,
) -> FusionResult<RegionMap> {
    build_regions(tag.parse()?, meta, spacing)
}

/// Build the region registry for `topology`.
///
/// When `spacing` is given, every region also carries its physical extent.
pub fn build_regions(
    topology: Topology,
    meta: &GridMetadata,
    spacing: Option<GridSpacing<'_>>,
) -> FusionResult<RegionMap> {
    let shape = meta.global_shape()?;
    if let Some(sp) = &spacing {
        if sp.dx.dim() != shape || sp.dy.dim() != shape {
            return Err(FusionError::ShapeMismatch(format!(
                "spacing fields dx {:?} / dy {:?} do not match global shape {shape:?}",
                sp.dx.dim(),
                sp.dy.dim()
            )));
        }
    }

    let b = Breakpoints::new(meta)?;
    let drafts = match topology {
        Topology::Core => core_regions(&b),
        Topology::Sol => sol_regions(&b),
        Topology::Limiter => limiter_regions(&b),
        Topology::XPoint => xpoint_regions(&b),
        Topology::SingleNull => single_null_regions(&b),
        Topology::ConnectedDoubleNull => connected_double_null_regions(&b),
        Topology::DisconnectedDoubleNull => disconnected_double_null_regions(&b),
    };
    drafts.freeze(topology, spacing)
}

fn core_regions(b: &Breakpoints) -> Drafts {
    let mut d = Drafts::new(b);
    d.add("core", (0, b.nx), (b.ybndry, b.ny - b.ybndry));
    d.connect_y("core", "core");
    d
}

fn sol_regions(b: &Breakpoints) -> Drafts {
    let mut d = Drafts::new(b);
    d.add("SOL", (0, b.nx), (0, b.ny));
    d
}

fn limiter_regions(b: &Breakpoints) -> Drafts {
    let mut d = Drafts::new(b);
    d.add("core", (0, b.ixseps1), (b.ybndry, b.ny - b.ybndry));
    d.add("SOL", (b.ixseps1, b.nx), (0, b.ny));
    d.connect_x("core", "SOL");
    d.connect_y("core", "core");
    d
}

fn xpoint_regions(b: &Breakpoints) -> Drafts {
    let pfr = (0, b.ixseps1);
    let sol = (b.ixseps1, b.nx);
    let lower_inner = (0, b.jyseps1_1 + 1);
    let upper_inner = (b.jyseps1_1 + 1, b.ny_inner);
    let upper_outer = (b.ny_inner, b.jyseps2_2 + 1);
    let lower_outer = (b.jyseps2_2 + 1, b.ny);

    let mut d = Drafts::new(b);
    d.add("lower_inner_PFR", pfr, lower_inner);
    d.add("lower_inner_SOL", sol, lower_inner);
    d.add("upper_inner_PFR", pfr, upper_inner);
    d.add("upper_inner_SOL", sol, upper_inner);
    d.add("upper_outer_PFR", pfr, upper_outer);
    d.add("upper_outer_SOL", sol, upper_outer);
    d.add("lower_outer_PFR", pfr, lower_outer);
    d.add("lower_outer_SOL", sol, lower_outer);
    d.connect_x("lower_inner_PFR", "lower_inner_SOL");
    d.connect_x("upper_inner_PFR", "upper_inner_SOL");
    d.connect_x("upper_outer_PFR", "upper_outer_SOL");
    d.connect_x("lower_outer_PFR", "lower_outer_SOL");
    d.connect_y("lower_inner_PFR", "lower_outer_PFR");
    d.connect_y("lower_inner_SOL", "upper_inner_SOL");
    d.connect_y("upper_outer_PFR", "upper_inner_PFR");
    d.connect_y("upper_outer_SOL", "lower_outer_SOL");
    d
}

fn single_null_regions(b: &Breakpoints) -> Drafts {
    let pfr = (0, b.ixseps1);
    let sol = (b.ixseps1, b.nx);
    let inner_leg = (0, b.jyseps1_1 + 1);
    let closed = (b.jyseps1_1 + 1, b.jyseps2_2 + 1);
    let outer_leg = (b.jyseps2_2 + 1, b.ny);

    let mut d = Drafts::new(b);
    d.add("inner_PFR", pfr, inner_leg);
    d.add("inner_SOL", sol, inner_leg);
    d.add("core", pfr, closed);
    d.add("SOL", sol, closed);
    d.add("outer_PFR", pfr, outer_leg);
    d.add("outer_SOL", sol, outer_leg);
    d.connect_x("inner_PFR", "inner_SOL");
    d.connect_x("core", "SOL");
    d.connect_x("outer_PFR", "outer_SOL");
    d.connect_y("inner_PFR", "outer_PFR");
    d.connect_y("inner_SOL", "SOL");
    d.connect_y("core", "core");
    d.connect_y("SOL", "outer_SOL");
    d
}

/// Poloidal segments shared by both double-null topologies, lower target to lower target.
fn double_null_segments(b: &Breakpoints) -> [(i64, i64); 6] {
    [
        (0, b.jyseps1_1 + 1),
        (b.jyseps1_1 + 1, b.jyseps2_1 + 1),
        (b.jyseps2_1 + 1, b.ny_inner),
        (b.ny_inner, b.jyseps1_2 + 1),
        (b.jyseps1_2 + 1, b.jyseps2_2 + 1),
        (b.jyseps2_2 + 1, b.ny),
    ]
}

fn connected_double_null_regions(b: &Breakpoints) -> Drafts {
    let [lower_inner, inner, upper_inner, upper_outer, outer, lower_outer] = double_null_segments(b);
    let pfr = (0, b.ixseps1);
    let sol = (b.ixseps2, b.nx);

    let mut d = Drafts::new(b);
    d.add("lower_inner_PFR", pfr, lower_inner);
    d.add("lower_inner_SOL", sol, lower_inner);
    d.add("inner_core", pfr, inner);
    d.add("inner_SOL", sol, inner);
    d.add("upper_inner_PFR", pfr, upper_inner);
    d.add("upper_inner_SOL", sol, upper_inner);
    d.add("upper_outer_PFR", pfr, upper_outer);
    d.add("upper_outer_SOL", sol, upper_outer);
    d.add("outer_core", pfr, outer);
    d.add("outer_SOL", sol, outer);
    d.add("lower_outer_PFR", pfr, lower_outer);
    d.add("lower_outer_SOL", sol, lower_outer);
    d.connect_x("lower_inner_PFR", "lower_inner_SOL");
    d.connect_x("inner_core", "inner_SOL");
    d.connect_x("upper_inner_PFR", "upper_inner_SOL");
    d.connect_x("upper_outer_PFR", "upper_outer_SOL");
    d.connect_x("outer_core", "outer_SOL");
    d.connect_x("lower_outer_PFR", "lower_outer_SOL");
    d.connect_y("lower_inner_PFR", "lower_outer_PFR");
    d.connect_y("lower_inner_SOL", "inner_SOL");
    d.connect_y("inner_core", "outer_core");
    d.connect_y("outer_core", "inner_core");
    d.connect_y("inner_SOL", "upper_inner_SOL");
    d.connect_y("upper_outer_PFR", "upper_inner_PFR");
    d.connect_y("upper_outer_SOL", "outer_SOL");
    d.connect_y("outer_SOL", "lower_outer_SOL");
    d
}

fn disconnected_double_null_regions(b: &Breakpoints) -> Drafts {
    let [lower_inner, inner, upper_inner, upper_outer, outer, lower_outer] = double_null_segments(b);
    let pfr = (0, b.ixseps1);
    let intersep = (b.ixseps1, b.ixseps2);
    let sol = (b.ixseps2, b.nx);

    let mut d = Drafts::new(b);
    d.add("lower_inner_PFR", pfr, lower_inner);
    d.add("lower_inner_intersep", intersep, lower_inner);
    d.add("lower_inner_SOL", sol, lower_inner);
    d.add("inner_core", pfr, inner);
    d.add("inner_intersep", intersep, inner);
    d.add("inner_SOL", sol, inner);
    d.add("upper_inner_PFR", pfr, upper_inner);
    d.add("upper_inner_intersep", intersep, upper_inner);
    d.add("upper_inner_SOL", sol, upper_inner);
    d.add("upper_outer_PFR", pfr, upper_outer);
    d.add("upper_outer_intersep", intersep, upper_outer);
    d.add("upper_outer_SOL", sol, upper_outer);
    d.add("outer_core", pfr, outer);
    d.add("outer_intersep", intersep, outer);
    d.add("outer_SOL", sol, outer);
    d.add("lower_outer_PFR", pfr, lower_outer);
    d.add("lower_outer_intersep", intersep, lower_outer);
    d.add("lower_outer_SOL", sol, lower_outer);
    d.connect_x("lower_inner_PFR", "lower_inner_intersep");
    d.connect_x("lower_inner_intersep", "lower_inner_SOL");
    d.connect_x("inner_core", "inner_intersep");
    d.connect_x("inner_intersep", "inner_SOL");
    d.connect_x("upper_inner_PFR", "upper_inner_intersep");
    d.connect_x("upper_inner_intersep", "upper_inner_SOL");
    d.connect_x("upper_outer_PFR", "upper_outer_intersep");
    d.connect_x("upper_outer_intersep", "upper_outer_SOL");
    d.connect_x("outer_core", "outer_intersep");
    d.connect_x("outer_intersep", "outer_SOL");
    d.connect_x("lower_outer_PFR", "lower_outer_intersep");
    d.connect_x("lower_outer_intersep", "lower_outer_SOL");
    d.connect_y("lower_inner_PFR", "lower_outer_PFR");
    d.connect_y("lower_inner_intersep", "inner_intersep");
    d.connect_y("lower_inner_SOL", "inner_SOL");
    d.connect_y("inner_core", "outer_core");
    d.connect_y("outer_core", "inner_core");
    d.connect_y("inner_intersep", "outer_intersep");
    d.connect_y("inner_SOL", "upper_inner_SOL");
    d.connect_y("upper_outer_intersep", "upper_inner_intersep");
    d.connect_y("upper_outer_PFR", "upper_inner_PFR");
    d.connect_y("upper_outer_SOL", "outer_SOL");
    d.connect_y("outer_intersep", "lower_outer_intersep");
    d.connect_y("outer_SOL", "lower_outer_SOL");
    d
}
