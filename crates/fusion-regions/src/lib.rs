//! Topological region decomposition of BOUT++ tokamak grids.
//!
//! Classifies a grid from its separatrix and branch-cut indices, builds the
//! registry of logically rectangular regions, and extracts per-region fields
//! with guard cells filled from the connected neighbours.

pub mod builder;
pub mod dataset;
pub mod diagnostics;
pub mod guards;
pub mod region;
pub mod topology;

pub use builder::{build_regions, build_regions_for_tag, Breakpoints, GridSpacing};
pub use dataset::{extract_region, BoutDataset, BoutField, WithGuards};
pub use diagnostics::{colour_regions, decompose_regions, GridlineSelection, Gridlines};
pub use region::{Edge, GlobalSlice, Region, RegionExtent, RegionMap};
pub use topology::{classify, Topology};
