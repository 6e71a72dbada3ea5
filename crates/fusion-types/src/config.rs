// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Grid Metadata
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FusionError, FusionResult};

/// BOUT++ grid metadata needed to decompose a dataset into regions.
/// Maps 1:1 to the scalar attributes written by BOUT++ into each dump file.
/// Unknown keys are rejected so typos surface at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridMetadata {
    pub ixseps1: i64,
    pub ixseps2: i64,
    pub jyseps1_1: i64,
    pub jyseps2_1: i64,
    pub jyseps1_2: i64,
    pub jyseps2_2: i64,
    pub ny_inner: i64,
    /// Radial points, including x-boundary cells.
    pub nx: i64,
    /// Poloidal points, excluding y-boundary cells.
    pub ny: i64,
    #[serde(rename = "MXG")]
    pub mxg: i64,
    #[serde(rename = "MYG")]
    pub myg: i64,
    #[serde(
        deserialize_with = "flag_from_int_or_bool",
        serialize_with = "flag_to_int"
    )]
    pub keep_xboundaries: bool,
    #[serde(
        deserialize_with = "flag_from_int_or_bool",
        serialize_with = "flag_to_int"
    )]
    pub keep_yboundaries: bool,
    #[serde(default)]
    pub axes: AxisNames,
}

/// Names bound to the radial, poloidal, toroidal and time axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisNames {
    #[serde(default = "default_x")]
    pub x: String,
    #[serde(default = "default_y")]
    pub y: String,
    #[serde(default = "default_z")]
    pub z: String,
    #[serde(default = "default_t")]
    pub t: String,
}

fn default_x() -> String {
    "x".to_string()
}
fn default_y() -> String {
    "theta".to_string()
}
fn default_z() -> String {
    "zeta".to_string()
}
fn default_t() -> String {
    "t".to_string()
}

impl Default for AxisNames {
    fn default() -> Self {
        AxisNames {
            x: default_x(),
            y: default_y(),
            z: default_z(),
            t: default_t(),
        }
    }
}

/// BOUT++ writes these flags as 0/1 integers; hand-written configs tend to use bools.
fn flag_from_int_or_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "boundary flag must be 0 or 1, got {other}"
        ))),
    }
}

fn flag_to_int<S>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_i64(i64::from(*flag))
}

impl GridMetadata {
    /// Load from a JSON file and validate.
    pub fn from_file(path: &str) -> FusionResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse from a JSON string and validate.
    pub fn from_json(json: &str) -> FusionResult<Self> {
        let meta: Self = serde_json::from_str(json)?;
        meta.validate()?;
        Ok(meta)
    }

    pub fn validate(&self) -> FusionResult<()> {
        if self.mxg < 0 || self.myg < 0 {
            return Err(FusionError::ConfigError(format!(
                "guard widths must be non-negative: MXG={}, MYG={}",
                self.mxg, self.myg
            )));
        }
        if self.nx < 1 || self.ny < 1 {
            return Err(FusionError::ConfigError(format!(
                "grid must have at least one point per axis: nx={}, ny={}",
                self.nx, self.ny
            )));
        }
        let names = [&self.axes.x, &self.axes.y, &self.axes.z, &self.axes.t];
        for (i, a) in names.iter().enumerate() {
            if names[i + 1..].contains(a) {
                return Err(FusionError::ConfigError(format!(
                    "axis name '{a}' is bound to more than one axis"
                )));
            }
        }
        let (nx, _) = self.global_shape()?;
        if nx == 0 {
            return Err(FusionError::ConfigError(format!(
                "no x points remain after dropping boundaries: nx={}, MXG={}",
                self.nx, self.mxg
            )));
        }
        Ok(())
    }

    /// Width of the x-boundary retained in the global arrays.
    pub fn x_boundary_width(&self) -> i64 {
        if self.keep_xboundaries {
            self.mxg
        } else {
            0
        }
    }

    /// Width of the y-boundary retained at each lower/outer target.
    pub fn y_boundary_width(&self) -> i64 {
        if self.keep_yboundaries {
            self.myg
        } else {
            0
        }
    }

    /// True when the grid has a second (upper) X-point.
    pub fn has_upper_xpoint(&self) -> bool {
        self.jyseps2_1 != self.jyseps1_2
    }

    /// Width of the y-boundary at the upper targets; zero without an upper X-point.
    pub fn upper_y_boundary_width(&self) -> i64 {
        if self.has_upper_xpoint() {
            self.y_boundary_width()
        } else {
            0
        }
    }

    /// `(x, y)` shape of every global variable opened with this metadata.
    pub fn global_shape(&self) -> FusionResult<(usize, usize)> {
        let overflow = || {
            FusionError::ConfigError(format!(
                "global shape overflows: nx={}, ny={}, MXG={}, MYG={}",
                self.nx, self.ny, self.mxg, self.myg
            ))
        };
        // Guard columns not retained on each x side
        let dropped_x = self.mxg - self.x_boundary_width();
        let nx = dropped_x
            .checked_mul(2)
            .and_then(|w| self.nx.checked_sub(w))
            .ok_or_else(overflow)?;
        let ny = self
            .y_boundary_width()
            .checked_add(self.upper_y_boundary_width())
            .and_then(|w| w.checked_mul(2))
            .and_then(|w| self.ny.checked_add(w))
            .ok_or_else(overflow)?;
        match (usize::try_from(nx), usize::try_from(ny)) {
            (Ok(gx), Ok(gy)) => Ok((gx, gy)),
            _ => Err(FusionError::ConfigError(format!(
                "negative global shape ({nx}, {ny})"
            ))),
        }
    }

    /// True when every flux surface is closed (no separatrix inside the grid).
    pub fn is_core_only(&self) -> bool {
        self.ixseps1 >= self.nx && self.ixseps2 >= self.nx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_null_json() -> &'static str {
        r#"{
            "ixseps1": 3, "ixseps2": 8,
            "jyseps1_1": 2, "jyseps2_1": 7, "jyseps1_2": 7, "jyseps2_2": 10,
            "ny_inner": 7, "nx": 8, "ny": 14,
            "MXG": 2, "MYG": 2,
            "keep_xboundaries": 1, "keep_yboundaries": 0
        }"#
    }

    #[test]
    fn test_parse_integer_flags() {
        let meta = GridMetadata::from_json(single_null_json()).unwrap();
        assert_eq!(meta.ixseps1, 3);
        assert_eq!(meta.mxg, 2);
        assert!(meta.keep_xboundaries);
        assert!(!meta.keep_yboundaries);
        assert_eq!(meta.axes, AxisNames::default());
        assert_eq!(meta.axes.y, "theta");
    }

    #[test]
    fn test_parse_bool_flags_and_axes() {
        let json = r#"{
            "ixseps1": 4, "ixseps2": 4,
            "jyseps1_1": -1, "jyseps2_1": 4, "jyseps1_2": 4, "jyseps2_2": 7,
            "ny_inner": 4, "nx": 4, "ny": 8,
            "MXG": 2, "MYG": 2,
            "keep_xboundaries": true, "keep_yboundaries": true,
            "axes": {"y": "y"}
        }"#;
        let meta = GridMetadata::from_json(json).unwrap();
        assert!(meta.keep_yboundaries);
        assert_eq!(meta.axes.x, "x");
        assert_eq!(meta.axes.y, "y");
    }

    #[test]
    fn test_rejects_unknown_field() {
        let json = single_null_json().replace("\"nx\": 8", "\"nx\": 8, \"nxx\": 1");
        let err = GridMetadata::from_json(&json).expect_err("unknown key must fail");
        assert!(matches!(err, FusionError::Json(_)));
    }

    #[test]
    fn test_rejects_missing_field() {
        let json = single_null_json().replace("\"ny_inner\": 7,", "");
        assert!(GridMetadata::from_json(&json).is_err());
    }

    #[test]
    fn test_rejects_bad_flag_value() {
        let json = single_null_json().replace("\"keep_yboundaries\": 0", "\"keep_yboundaries\": 2");
        assert!(GridMetadata::from_json(&json).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_guards() {
        let mut meta = GridMetadata::from_json(single_null_json()).unwrap();
        meta.myg = -1;
        match meta.validate() {
            Err(FusionError::ConfigError(msg)) => assert!(msg.contains("MYG=-1")),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_overflowing_guards() {
        let json = single_null_json()
            .replace("\"MXG\": 2", "\"MXG\": 5000000000000000000")
            .replace("\"keep_xboundaries\": 1", "\"keep_xboundaries\": 0");
        match GridMetadata::from_json(&json) {
            Err(FusionError::ConfigError(msg)) => assert!(msg.contains("overflows"), "{msg}"),
            other => panic!("Unexpected result: {other:?}"),
        }

        let mut meta = GridMetadata::from_json(single_null_json()).unwrap();
        meta.keep_yboundaries = true;
        meta.jyseps2_1 = 5;
        meta.myg = i64::MAX / 2;
        assert!(matches!(meta.validate(), Err(FusionError::ConfigError(_))));
        meta.myg = 2;
        meta.ny = i64::MAX;
        assert!(matches!(meta.global_shape(), Err(FusionError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_guards_wider_than_grid() {
        let mut meta = GridMetadata::from_json(single_null_json()).unwrap();
        meta.keep_xboundaries = false;
        meta.mxg = 5;
        match meta.validate() {
            Err(FusionError::ConfigError(msg)) => assert!(msg.contains("(-2, 14)"), "{msg}"),
            other => panic!("Unexpected result: {other:?}"),
        }
        meta.mxg = 4;
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicate_axis_names() {
        let mut meta = GridMetadata::from_json(single_null_json()).unwrap();
        meta.axes.y = "x".to_string();
        assert!(meta.validate().is_err());
    }

    #[test]
    fn test_global_shape_boundaries() {
        let mut meta = GridMetadata::from_json(single_null_json()).unwrap();
        assert_eq!(meta.global_shape().unwrap(), (8, 14));
        meta.keep_xboundaries = false;
        assert_eq!(meta.global_shape().unwrap(), (4, 14));
        meta.keep_yboundaries = true;
        // single-null: one lower target pair, no upper targets
        assert_eq!(meta.global_shape().unwrap(), (4, 18));
        meta.jyseps2_1 = 5;
        meta.jyseps1_2 = 9;
        assert!(meta.has_upper_xpoint());
        assert_eq!(meta.global_shape().unwrap(), (4, 22));
    }

    #[test]
    fn test_core_only_detection() {
        let mut meta = GridMetadata::from_json(single_null_json()).unwrap();
        assert!(!meta.is_core_only());
        meta.ixseps1 = 8;
        assert!(meta.is_core_only());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let meta = GridMetadata::from_json(single_null_json()).unwrap();
        let json = serde_json::to_string_pretty(&meta).unwrap();
        assert!(json.contains("\"keep_xboundaries\": 1"));
        let path = std::env::temp_dir().join(format!(
            "fusion_types_grid_metadata_{}.json",
            std::process::id()
        ));
        std::fs::write(&path, json).unwrap();
        let loaded = GridMetadata::from_file(&path.to_string_lossy()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(meta, loaded);
    }

    #[test]
    fn test_from_file_missing() {
        let err = GridMetadata::from_file("/nonexistent/grid.json").expect_err("missing file");
        assert!(matches!(err, FusionError::Io(_)));
    }
}
