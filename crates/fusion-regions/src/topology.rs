// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Topology Classification
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Magnetic topology classification from BOUT++ separatrix and branch-cut indices.

use std::fmt;
use std::str::FromStr;

use fusion_types::config::GridMetadata;
use fusion_types::error::{FusionError, FusionResult};

/// The grid topologies the region builder knows how to decompose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// Closed flux surfaces only, periodic in y.
    Core,
    /// Open field lines only, no periodic part.
    Sol,
    /// Closed core surrounded by a SOL, no X-point.
    Limiter,
    /// Slab-like X-point test grid with no core.
    XPoint,
    SingleNull,
    ConnectedDoubleNull,
    DisconnectedDoubleNull,
}

impl Topology {
    pub const ALL: [Topology; 7] = [
        Topology::Core,
        Topology::Sol,
        Topology::Limiter,
        Topology::XPoint,
        Topology::SingleNull,
        Topology::ConnectedDoubleNull,
        Topology::DisconnectedDoubleNull,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topology::Core => "core",
            Topology::Sol => "sol",
            Topology::Limiter => "limiter",
            Topology::XPoint => "xpoint",
            Topology::SingleNull => "single-null",
            Topology::ConnectedDoubleNull => "connected-double-null",
            Topology::DisconnectedDoubleNull => "disconnected-double-null",
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topology {
    type Err = FusionError;

    fn from_str(tag: &str) -> FusionResult<Self> {
        Topology::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| FusionError::NotImplemented(tag.to_string()))
    }
}

fn unsupported(meta: &GridMetadata) -> FusionError {
    FusionError::UnsupportedTopology {
        ixseps1: meta.ixseps1,
        ixseps2: meta.ixseps2,
        jyseps1_1: meta.jyseps1_1,
        jyseps2_1: meta.jyseps2_1,
        jyseps1_2: meta.jyseps1_2,
        jyseps2_2: meta.jyseps2_2,
        ny_inner: meta.ny_inner,
    }
}

/// Classify the grid topology. Checks run in a fixed order; the first match wins.
pub fn classify(meta: &GridMetadata) -> FusionResult<Topology> {
    let (jys11, jys21, jys12, jys22) = (
        meta.jyseps1_1,
        meta.jyseps2_1,
        meta.jyseps1_2,
        meta.jyseps2_2,
    );
    // Unvalidated metadata may hold extreme values
    let below_inner = meta.ny_inner.saturating_sub(1);
    let ny_inner = meta.ny_inner;

    let topology = if jys21 == jys12 {
        // No upper X-point
        if jys11 <= 0 && jys22 >= meta.ny.saturating_sub(1) {
            let ix = meta.ixseps1.min(meta.ixseps2);
            if ix >= meta.nx.saturating_sub(1) {
                Topology::Core
            } else if ix <= 0 {
                Topology::Sol
            } else {
                Topology::Limiter
            }
        } else {
            Topology::SingleNull
        }
    } else if jys11 == jys21 && jys12 == jys22 {
        if jys11 < below_inner && jys22 > ny_inner {
            Topology::XPoint
        } else {
            return Err(unsupported(meta));
        }
    } else if meta.ixseps1 == meta.ixseps2 {
        if jys21 < below_inner && jys12 > ny_inner {
            Topology::ConnectedDoubleNull
        } else {
            return Err(unsupported(meta));
        }
    } else {
        Topology::DisconnectedDoubleNull
    };

    log::debug!("classified grid topology as {topology}");
    Ok(topology)
}
