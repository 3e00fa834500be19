/// Error type for beidou-grid-rs operations.
#[derive(Debug, Clone, PartialEq)]
pub enum BeiDouGridError {
    /// An input value is unusable: NaN/out-of-range coordinate, level
    /// outside 1-10, inverted height band, empty geometry.
    InvalidArgument(String),
    /// A code string does not parse: length matches no level, a fragment
    /// fails its per-level parse, or an index is outside the tabled range.
    InvalidCode(String),
    /// The polar caps (|latitude| >= 88 degrees, level-1 longitude index 0)
    /// are reserved by the standard and not implemented.
    UnsupportedPolar,
    /// Failed to parse geometry from a string (GeoJSON or WKT).
    GeometryParse(String),
}

impl std::fmt::Display for BeiDouGridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BeiDouGridError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            BeiDouGridError::InvalidCode(msg) => write!(f, "Invalid grid code: {}", msg),
            BeiDouGridError::UnsupportedPolar => {
                write!(f, "Polar region codes are not supported")
            }
            BeiDouGridError::GeometryParse(msg) => write!(f, "Geometry parse error: {}", msg),
        }
    }
}

impl std::error::Error for BeiDouGridError {}
