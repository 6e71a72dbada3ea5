// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Property-Based Tests (proptest) for fusion-regions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for fusion-regions using proptest.
//!
//! Covers: classification of generated grids, partition of the global
//! array by regions, connection symmetry, guard-cell continuity at every
//! seam of single- and double-null grids.

use std::collections::BTreeMap;

use fusion_regions::{build_regions, classify, BoutDataset, Edge, RegionMap, Topology, WithGuards};
use fusion_types::config::{AxisNames, GridMetadata};
use fusion_types::state::Field2D;
use ndarray::{s, Array2};
use proptest::prelude::*;

fn grid(ixs: (i64, i64), jys: (i64, i64, i64, i64), ny_inner: i64, nx: i64, ny: i64) -> GridMetadata {
    GridMetadata {
        ixseps1: ixs.0,
        ixseps2: ixs.1,
        jyseps1_1: jys.0,
        jyseps2_1: jys.1,
        jyseps1_2: jys.2,
        jyseps2_2: jys.3,
        ny_inner,
        nx,
        ny,
        mxg: 2,
        myg: 2,
        keep_xboundaries: true,
        keep_yboundaries: false,
        axes: AxisNames::default(),
    }
}

prop_compose! {
    fn arb_single_null()(
        nx in 6i64..24,
        ny in 12i64..40,
        ixs_frac in 0.2f64..0.8,
        jys11 in 1i64..4,
        leg in 1i64..4,
        keep_x in any::<bool>(),
        keep_y in any::<bool>(),
    ) -> GridMetadata {
        let ixs1 = ((nx as f64) * ixs_frac) as i64;
        let mut meta = grid((ixs1, nx), (jys11, ny / 2, ny / 2, ny - 1 - leg), ny / 2, nx, ny);
        meta.keep_xboundaries = keep_x;
        meta.keep_yboundaries = keep_y;
        meta
    }
}

prop_compose! {
    fn arb_double_null()(
        nx in 8i64..24,
        ny in 18i64..40,
        ixs in (2i64..4, 0i64..3),
        jys11 in 1i64..4,
        gaps in (1i64..3, 0i64..3, 0i64..3, 0i64..3),
        keep_y in any::<bool>(),
    ) -> GridMetadata {
        let jys21 = jys11 + gaps.0;
        let ny_inner = jys21 + 2 + gaps.1;
        let jys12 = ny_inner + 1 + gaps.2;
        let jys22 = jys12 + 1 + gaps.3;
        let mut meta = grid((ixs.0, ixs.0 + ixs.1), (jys11, jys21, jys12, jys22), ny_inner, nx, ny);
        meta.keep_yboundaries = keep_y;
        meta
    }
}

prop_compose! {
    fn arb_no_xpoint()(
        nx in 4i64..24,
        ny in 4i64..32,
        ixs in -2i64..26,
        keep_y in any::<bool>(),
    ) -> GridMetadata {
        let mut meta = grid((ixs, ixs), (-1, ny / 2, ny / 2, ny - 1), ny / 2, nx, ny);
        meta.keep_yboundaries = keep_y;
        meta
    }
}

fn arb_grid() -> impl Strategy<Value = GridMetadata> {
    prop_oneof![arb_single_null(), arb_double_null(), arb_no_xpoint()]
}

/// Number of regions covering each global cell.
fn coverage(regions: &RegionMap, shape: (usize, usize)) -> Array2<u32> {
    let mut count = Array2::zeros(shape);
    for r in regions {
        count
            .slice_mut(s![r.x_inner_index()..r.x_outer_index(), r.y_lower_index()..r.y_upper_index()])
            .mapv_inplace(|c| c + 1);
    }
    count
}

fn guard_widths(mxg: usize, myg: usize) -> WithGuards {
    let mut widths = BTreeMap::new();
    widths.insert("x".to_string(), mxg);
    widths.insert("theta".to_string(), myg);
    WithGuards::PerAxis(widths)
}

proptest! {
    /// Generated grids classify into the family they were built for.
    #[test]
    fn generated_grids_classify(meta in arb_single_null()) {
        prop_assert_eq!(classify(&meta).unwrap(), Topology::SingleNull);
    }

    #[test]
    fn generated_double_null_classify(meta in arb_double_null()) {
        let expected = if meta.ixseps1 == meta.ixseps2 {
            Topology::ConnectedDoubleNull
        } else {
            Topology::DisconnectedDoubleNull
        };
        prop_assert_eq!(classify(&meta).unwrap(), expected);
    }

    /// Regions lie inside the array and cover every cell exactly once,
    /// except the y-boundary rows of a periodic core.
    #[test]
    fn regions_partition_global_array(meta in arb_grid()) {
        let topology = classify(&meta).unwrap();
        let regions = build_regions(topology, &meta, None).unwrap();
        let shape = meta.global_shape().unwrap();
        for r in &regions {
            prop_assert!(r.nx() > 0 && r.ny() > 0);
            prop_assert!(r.x_outer_index() <= shape.0 && r.y_upper_index() <= shape.1);
        }
        let count = coverage(&regions, shape);
        let periodic = regions
            .iter()
            .find(|r| r.is_periodic_y() && matches!(topology, Topology::Core | Topology::Limiter));
        for ((i, j), &c) in count.indexed_iter() {
            let excluded = periodic.is_some_and(|p| {
                i < p.x_outer_index() && (j < p.y_lower_index() || j >= p.y_upper_index())
            });
            prop_assert_eq!(c, if excluded { 0 } else { 1 }, "{} at ({}, {})", topology, i, j);
        }
    }

    /// Every connection has its mirror on the neighbour.
    #[test]
    fn connections_are_symmetric(meta in arb_grid()) {
        let topology = classify(&meta).unwrap();
        let regions = build_regions(topology, &meta, None).unwrap();
        for r in &regions {
            for edge in Edge::ALL {
                if let Some(other) = r.connection(edge) {
                    let back = regions.get(other).unwrap().connection(edge.opposite());
                    prop_assert_eq!(back, Some(r.name()));
                }
            }
        }
    }

    /// In a single-null grid the SOL with guards is a contiguous window of
    /// the global array: its neighbours are its index neighbours.
    #[test]
    fn single_null_sol_guards_are_contiguous(
        meta in arb_single_null(),
        mxg in 0usize..3,
        myg in 0usize..3,
    ) {
        let topology = classify(&meta).unwrap();
        let regions = build_regions(topology, &meta, None).unwrap();
        prop_assume!(regions.len() == 6);
        let core = regions.get("core").unwrap();
        let sol = regions.get("SOL").unwrap();
        let inner_leg = regions.get("inner_SOL").unwrap();
        let outer_leg = regions.get("outer_SOL").unwrap();
        prop_assume!(core.nx() >= mxg && inner_leg.ny() >= myg && outer_leg.ny() >= myg);

        let shape = meta.global_shape().unwrap();
        let values = Array2::from_shape_fn(shape, |(i, j)| (i * 1000 + j) as f64);
        let ds = BoutDataset::new(meta, vec![Field2D::new("n", values.clone())]).unwrap();
        let n = ds.variable("n").unwrap();

        let piece = n.from_region("SOL", guard_widths(mxg, myg)).unwrap();
        let expected = values.slice(s![
            sol.x_inner_index() - mxg..sol.x_outer_index(),
            sol.y_lower_index() - myg..sol.y_upper_index() + myg
        ]);
        prop_assert_eq!(piece.region(), Some("SOL"));
        prop_assert_eq!(&piece.values, &expected);
    }

    /// Double-null guard cells, with and without the y-boundary rows, are
    /// the neighbour's cells next to the shared seam for every width up to
    /// MXG/MYG. Neighbours narrower than the width are rejected.
    #[test]
    fn double_null_guards_match_neighbour_seams(meta in arb_double_null()) {
        let topology = classify(&meta).unwrap();
        let regions = build_regions(topology, &meta, None).unwrap();
        let shape = meta.global_shape().unwrap();
        let (mxg, myg) = (meta.mxg as usize, meta.myg as usize);
        let values = Array2::from_shape_fn(shape, |(i, j)| (i * 1000 + j) as f64);
        let ds = BoutDataset::new(meta, vec![Field2D::new("n", values.clone())]).unwrap();
        let n = ds.variable("n").unwrap();

        for r in &regions {
            let x = r.x_inner_index()..r.x_outer_index();
            let y = r.y_lower_index()..r.y_upper_index();
            let neighbour = |edge| r.connection(edge).map(|name| regions.get(name).unwrap());

            // x-neighbours sit next to each other in the global array
            let (inner, outer) = (neighbour(Edge::InnerX), neighbour(Edge::OuterX));
            for w in 0..=mxg {
                let piece = n.from_region(r.name(), guard_widths(w, 0));
                if [inner, outer].iter().flatten().any(|nb| nb.nx() < w) {
                    prop_assert!(piece.is_err(), "{} x width {}", r.name(), w);
                    continue;
                }
                let piece = piece.unwrap();
                let lo = x.start - if inner.is_some() { w } else { 0 };
                let hi = x.end + if outer.is_some() { w } else { 0 };
                prop_assert_eq!(&piece.values, &values.slice(s![lo..hi, y.clone()]), "{} x width {}", r.name(), w);
            }

            let (lower, upper) = (neighbour(Edge::LowerY), neighbour(Edge::UpperY));
            for w in 0..=myg {
                let piece = n.from_region(r.name(), guard_widths(0, w));
                if [lower, upper].iter().flatten().any(|nb| nb.ny() < w) {
                    prop_assert!(piece.is_err(), "{} y width {}", r.name(), w);
                    continue;
                }
                let piece = piece.unwrap();
                let mut row = 0;
                if let Some(nb) = lower {
                    let seam = values.slice(s![x.clone(), nb.y_upper_index() - w..nb.y_upper_index()]);
                    prop_assert_eq!(piece.values.slice(s![.., 0..w]), seam, "{} lower width {}", r.name(), w);
                    row = w;
                }
                let interior = values.slice(s![x.clone(), y.clone()]);
                prop_assert_eq!(piece.values.slice(s![.., row..row + r.ny()]), interior);
                row += r.ny();
                if let Some(nb) = upper {
                    let seam = values.slice(s![x.clone(), nb.y_lower_index()..nb.y_lower_index() + w]);
                    prop_assert_eq!(piece.values.slice(s![.., row..row + w]), seam, "{} upper width {}", r.name(), w);
                    row += w;
                }
                prop_assert_eq!(piece.values.ncols(), row);
            }
        }
    }
}
