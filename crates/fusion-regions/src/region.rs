// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Topological Regions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Logically rectangular regions of a BOUT++ grid.
//!
//! A [`Region`] records the global index bounds of one contiguous block of
//! the (x, y) grid and the names of the regions it touches on each edge.
//! Regions are produced by [`crate::builder`] and never change afterwards.

use std::fmt;
use std::ops::Range;

use fusion_types::error::{FusionError, FusionResult};
use indexmap::IndexMap;

/// One of the four edges of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    InnerX,
    OuterX,
    LowerY,
    UpperY,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::InnerX, Edge::OuterX, Edge::LowerY, Edge::UpperY];

    /// The edge a neighbour sees across this one.
    pub fn opposite(self) -> Edge {
        match self {
            Edge::InnerX => Edge::OuterX,
            Edge::OuterX => Edge::InnerX,
            Edge::LowerY => Edge::UpperY,
            Edge::UpperY => Edge::LowerY,
        }
    }
}

/// Physical extent of a region, from cumulative sums of `dx` and `dy`.
/// Bounds sit on cell edges, not cell centres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionExtent {
    pub x_inner: f64,
    pub x_outer: f64,
    pub y_lower: f64,
    pub y_upper: f64,
}

/// Global index ranges that may reach outside the array (guard slices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSlice {
    pub x: Range<isize>,
    pub y: Range<isize>,
}

impl GlobalSlice {
    /// Convert to array ranges, failing if any part lies outside `shape`.
    pub fn resolve(&self, shape: (usize, usize)) -> FusionResult<(Range<usize>, Range<usize>)> {
        let (nx, ny) = (shape.0 as isize, shape.1 as isize);
        let inside = |r: &Range<isize>, n: isize| r.start >= 0 && r.start <= r.end && r.end <= n;
        if !inside(&self.x, nx) || !inside(&self.y, ny) {
            return Err(FusionError::MissingBoundaryData(format!(
                "cells x={:?}, y={:?} are not present in the global array of shape ({nx}, {ny}), \
                 so there are no values or coordinates for them; open the dataset with \
                 keep_xboundaries/keep_yboundaries enabled",
                self.x, self.y
            )));
        }
        Ok((
            self.x.start as usize..self.x.end as usize,
            self.y.start as usize..self.y.end as usize,
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    x_inner_index: usize,
    x_outer_index: usize,
    y_lower_index: usize,
    y_upper_index: usize,
    connection_inner_x: Option<String>,
    connection_outer_x: Option<String>,
    connection_lower_y: Option<String>,
    connection_upper_y: Option<String>,
    extent: Option<RegionExtent>,
}

impl Region {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        x: Range<usize>,
        y: Range<usize>,
        connection_inner_x: Option<String>,
        connection_outer_x: Option<String>,
        connection_lower_y: Option<String>,
        connection_upper_y: Option<String>,
        extent: Option<RegionExtent>,
    ) -> Self {
        Region {
            name,
            x_inner_index: x.start,
            x_outer_index: x.end,
            y_lower_index: y.start,
            y_upper_index: y.end,
            connection_inner_x,
            connection_outer_x,
            connection_lower_y,
            connection_upper_y,
            extent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn x_inner_index(&self) -> usize {
        self.x_inner_index
    }

    pub fn x_outer_index(&self) -> usize {
        self.x_outer_index
    }

    pub fn y_lower_index(&self) -> usize {
        self.y_lower_index
    }

    pub fn y_upper_index(&self) -> usize {
        self.y_upper_index
    }

    pub fn nx(&self) -> usize {
        self.x_outer_index - self.x_inner_index
    }

    pub fn ny(&self) -> usize {
        self.y_upper_index - self.y_lower_index
    }

    pub fn connection_inner_x(&self) -> Option<&str> {
        self.connection_inner_x.as_deref()
    }

    pub fn connection_outer_x(&self) -> Option<&str> {
        self.connection_outer_x.as_deref()
    }

    pub fn connection_lower_y(&self) -> Option<&str> {
        self.connection_lower_y.as_deref()
    }

    pub fn connection_upper_y(&self) -> Option<&str> {
        self.connection_upper_y.as_deref()
    }

    pub fn connection(&self, edge: Edge) -> Option<&str> {
        match edge {
            Edge::InnerX => self.connection_inner_x(),
            Edge::OuterX => self.connection_outer_x(),
            Edge::LowerY => self.connection_lower_y(),
            Edge::UpperY => self.connection_upper_y(),
        }
    }

    /// True when the region wraps onto itself in y (periodic core).
    pub fn is_periodic_y(&self) -> bool {
        self.connection_lower_y() == Some(self.name()) && self.connection_upper_y() == Some(self.name())
    }

    pub fn extent(&self) -> Option<&RegionExtent> {
        self.extent.as_ref()
    }

    fn widen(&self, edge: Edge, width: usize) -> isize {
        if self.connection(edge).is_some() {
            width as isize
        } else {
            0
        }
    }

    /// The region's own cells, no guards.
    pub fn interior_slice(&self) -> GlobalSlice {
        GlobalSlice {
            x: self.x_inner_index as isize..self.x_outer_index as isize,
            y: self.y_lower_index as isize..self.y_upper_index as isize,
        }
    }

    /// Interior plus guards on every connected edge.
    pub fn guarded_slice(&self, mxg: usize, myg: usize) -> GlobalSlice {
        GlobalSlice {
            x: self.x_inner_index as isize - self.widen(Edge::InnerX, mxg)
                ..self.x_outer_index as isize + self.widen(Edge::OuterX, mxg),
            y: self.y_lower_index as isize - self.widen(Edge::LowerY, myg)
                ..self.y_upper_index as isize + self.widen(Edge::UpperY, myg),
        }
    }

    fn y_with_corners(&self, myg: usize) -> Range<isize> {
        self.y_lower_index as isize - self.widen(Edge::LowerY, myg)
            ..self.y_upper_index as isize + self.widen(Edge::UpperY, myg)
    }

    fn x_with_corners(&self, mxg: usize) -> Range<isize> {
        self.x_inner_index as isize - self.widen(Edge::InnerX, mxg)
            ..self.x_outer_index as isize + self.widen(Edge::OuterX, mxg)
    }

    /// `mxg` guard columns inside the inner-x edge, with `myg` corner rows
    /// where the y-edges are connected.
    pub fn inner_x_slice(&self, mxg: usize, myg: usize) -> GlobalSlice {
        let xi = self.x_inner_index as isize;
        GlobalSlice {
            x: xi - mxg as isize..xi,
            y: self.y_with_corners(myg),
        }
    }

    pub fn outer_x_slice(&self, mxg: usize, myg: usize) -> GlobalSlice {
        let xo = self.x_outer_index as isize;
        GlobalSlice {
            x: xo..xo + mxg as isize,
            y: self.y_with_corners(myg),
        }
    }

    /// `myg` guard rows below the lower-y edge, with `mxg` corner columns
    /// where the x-edges are connected.
    pub fn lower_y_slice(&self, myg: usize, mxg: usize) -> GlobalSlice {
        let yl = self.y_lower_index as isize;
        GlobalSlice {
            x: self.x_with_corners(mxg),
            y: yl - myg as isize..yl,
        }
    }

    pub fn upper_y_slice(&self, myg: usize, mxg: usize) -> GlobalSlice {
        let yu = self.y_upper_index as isize;
        GlobalSlice {
            x: self.x_with_corners(mxg),
            y: yu..yu + myg as isize,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |c: Option<&str>| c.unwrap_or("-").to_string();
        write!(
            f,
            "{}: x=[{}, {}) y=[{}, {}) inner_x={} outer_x={} lower_y={} upper_y={}",
            self.name,
            self.x_inner_index,
            self.x_outer_index,
            self.y_lower_index,
            self.y_upper_index,
            show(self.connection_inner_x()),
            show(self.connection_outer_x()),
            show(self.connection_lower_y()),
            show(self.connection_upper_y()),
        )
    }
}

/// Ordered, read-only registry of the regions of one dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionMap {
    regions: IndexMap<String, Region>,
}

impl RegionMap {
    pub(crate) fn from_regions(regions: Vec<Region>) -> Self {
        RegionMap {
            regions: regions.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> FusionResult<&Region> {
        self.regions
            .get(name)
            .ok_or_else(|| FusionError::UnknownRegion(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }
}

impl<'a> IntoIterator for &'a RegionMap {
    type Item = &'a Region;
    type IntoIter = indexmap::map::Values<'a, String, Region>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(
        name: &str,
        x: Range<usize>,
        y: Range<usize>,
        conns: [Option<&str>; 4],
    ) -> Region {
        let own = |c: Option<&str>| c.map(str::to_string);
        Region::new(
            name.to_string(),
            x,
            y,
            own(conns[0]),
            own(conns[1]),
            own(conns[2]),
            own(conns[3]),
            None,
        )
    }

    #[test]
    fn test_sizes_and_accessors() {
        let r = region("core", 0..3, 3..11, [None, Some("SOL"), Some("core"), Some("core")]);
        assert_eq!(r.nx(), 3);
        assert_eq!(r.ny(), 8);
        assert_eq!(r.connection_outer_x(), Some("SOL"));
        assert_eq!(r.connection(Edge::InnerX), None);
        assert!(r.is_periodic_y());
        assert!(r.extent().is_none());
    }

    #[test]
    fn test_guarded_slice_only_grows_connected_edges() {
        let r = region("core", 0..3, 3..11, [None, Some("SOL"), Some("core"), Some("core")]);
        let s = r.guarded_slice(2, 1);
        assert_eq!(s.x, 0..5);
        assert_eq!(s.y, 2..12);
        assert_eq!(r.interior_slice(), GlobalSlice { x: 0..3, y: 3..11 });
    }

    #[test]
    fn test_guard_slices_with_corners() {
        let r = region(
            "SOL",
            3..8,
            3..11,
            [Some("core"), None, Some("inner_SOL"), None],
        );
        let inner = r.inner_x_slice(2, 2);
        assert_eq!(inner.x, 1..3);
        assert_eq!(inner.y, 1..11);
        let outer = r.outer_x_slice(2, 0);
        assert_eq!(outer.x, 8..10);
        assert_eq!(outer.y, 3..11);
        let lower = r.lower_y_slice(2, 2);
        assert_eq!(lower.x, 1..8);
        assert_eq!(lower.y, 1..3);
        let upper = r.upper_y_slice(1, 2);
        assert_eq!(upper.x, 1..8);
        assert_eq!(upper.y, 11..12);
    }

    #[test]
    fn test_resolve_rejects_cells_outside_array() {
        let r = region("core", 0..4, 0..8, [None, None, Some("core"), Some("core")]);
        let err = r.lower_y_slice(2, 0).resolve((4, 8)).expect_err("negative start");
        match err {
            FusionError::MissingBoundaryData(msg) => assert!(msg.contains("keep_")),
            other => panic!("Unexpected error: {other:?}"),
        }
        assert!(r.upper_y_slice(2, 0).resolve((4, 8)).is_err());
        assert_eq!(r.upper_y_slice(2, 0).resolve((4, 10)).unwrap(), (0..4, 8..10));
    }

    #[test]
    fn test_edge_opposites() {
        for e in Edge::ALL {
            assert_eq!(e.opposite().opposite(), e);
            assert_ne!(e.opposite(), e);
        }
    }

    #[test]
    fn test_region_map_lookup_keeps_order() {
        let map = RegionMap::from_regions(vec![
            region("b", 0..1, 0..1, [None; 4]),
            region("a", 1..2, 0..1, [None; 4]),
        ]);
        assert_eq!(map.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("a").unwrap().x_inner_index(), 1);
        match map.get("c") {
            Err(FusionError::UnknownRegion(name)) => assert_eq!(name, "c"),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_display_lists_connections() {
        let r = region("SOL", 3..8, 0..4, [Some("core"), None, None, None]);
        let text = r.to_string();
        assert!(text.starts_with("SOL: x=[3, 8) y=[0, 4)"));
        assert!(text.contains("inner_x=core"));
        assert!(text.contains("outer_x=-"));
    }
}
