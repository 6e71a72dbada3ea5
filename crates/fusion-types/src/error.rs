use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error(
        "Unsupported topology: ixseps1={ixseps1}, ixseps2={ixseps2}, jyseps1_1={jyseps1_1}, \
         jyseps2_1={jyseps2_1}, jyseps1_2={jyseps1_2}, jyseps2_2={jyseps2_2}, ny_inner={ny_inner}"
    )]
    UnsupportedTopology {
        ixseps1: i64,
        ixseps2: i64,
        jyseps1_1: i64,
        jyseps2_1: i64,
        jyseps1_2: i64,
        jyseps2_2: i64,
        ny_inner: i64,
    },

    #[error("Topology '{0}' is not implemented")]
    NotImplemented(String),

    #[error("Missing boundary data: {0}")]
    MissingBoundaryData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("No non-empty region for {topology} topology in grid of shape ({nx}, {ny})")]
    DegenerateRegion {
        topology: String,
        nx: i64,
        ny: i64,
    },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Coordinate mismatch: {0}")]
    CoordinateMismatch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FusionResult<T> = Result<T, FusionError>;
