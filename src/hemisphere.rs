use crate::coord::Coordinate;
use crate::error::BeiDouGridError;

/// Quadrant of the Earth a point or code belongs to, written latitude
/// direction first: `NE` is the north-east quadrant.
///
/// Zero sits in the north-east: latitude 0 counts as N and longitude 0 as E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hemisphere {
    NE,
    NW,
    SE,
    SW,
}

/// Level-3 Z-order tables, `[latitude row][longitude column]`, one per
/// hemisphere. Immutable and shared; the mirrored variants encode the
/// standard's outward spiral away from the equator and prime meridian.
const LEVEL3_Z_ORDER_NE: [[u8; 2]; 3] = [[0, 1], [2, 3], [4, 5]];
const LEVEL3_Z_ORDER_NW: [[u8; 2]; 3] = [[1, 0], [3, 2], [5, 4]];
const LEVEL3_Z_ORDER_SW: [[u8; 2]; 3] = [[5, 4], [3, 2], [1, 0]];
const LEVEL3_Z_ORDER_SE: [[u8; 2]; 3] = [[4, 5], [2, 3], [0, 1]];

/// Level-6 Z-order tables, same conventions as level 3.
const LEVEL6_Z_ORDER_NE: [[u8; 2]; 2] = [[0, 1], [2, 3]];
const LEVEL6_Z_ORDER_NW: [[u8; 2]; 2] = [[1, 0], [3, 2]];
const LEVEL6_Z_ORDER_SW: [[u8; 2]; 2] = [[3, 2], [1, 0]];
const LEVEL6_Z_ORDER_SE: [[u8; 2]; 2] = [[2, 3], [0, 1]];

impl Hemisphere {
    /// Derives the hemisphere of a coordinate.
    ///
    /// # Example
    ///
    /// ```
    /// use beidou_grid_rs::Hemisphere;
    ///
    /// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
    /// assert_eq!(Hemisphere::from_point(&(120.58, 31.14))?, Hemisphere::NE);
    /// assert_eq!(Hemisphere::from_point(&(-57.70, -31.39))?, Hemisphere::SW);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_point(coord: &impl Coordinate) -> Result<Self, BeiDouGridError> {
        let lat = coord.lat();
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "latitude must be between -90 and 90 degrees, got {}",
                lat
            )));
        }
        let lng = coord.lng();
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "longitude must be between -180 and 180 degrees, got {}",
                lng
            )));
        }
        Ok(match (lat >= 0.0, lng >= 0.0) {
            (true, true) => Hemisphere::NE,
            (true, false) => Hemisphere::NW,
            (false, true) => Hemisphere::SE,
            (false, false) => Hemisphere::SW,
        })
    }

    /// Extracts the hemisphere from a grid code prefix: the first character
    /// gives the latitude direction ('N' is north, anything else south) and
    /// the two-digit decimal at positions 2-3 gives the longitude direction
    /// (31 and above is east).
    pub fn from_code(code: &str) -> Result<Self, BeiDouGridError> {
        let bytes = code.as_bytes();
        if bytes.len() < 3 || !code.is_ascii() {
            return Err(BeiDouGridError::InvalidCode(format!(
                "code must be at least 3 ASCII characters: {:?}",
                code
            )));
        }
        let north = bytes[0] == b'N';
        if !bytes[1].is_ascii_digit() || !bytes[2].is_ascii_digit() {
            return Err(BeiDouGridError::InvalidCode(format!(
                "level-1 longitude field is not a two-digit number: {:?}",
                &code[1..3]
            )));
        }
        let lng_part = (bytes[1] - b'0') as u32 * 10 + (bytes[2] - b'0') as u32;
        let east = lng_part >= 31;
        Ok(match (north, east) {
            (true, true) => Hemisphere::NE,
            (true, false) => Hemisphere::NW,
            (false, true) => Hemisphere::SE,
            (false, false) => Hemisphere::SW,
        })
    }

    /// Latitude direction character used as the code prefix.
    pub fn lat_char(self) -> char {
        match self {
            Hemisphere::NE | Hemisphere::NW => 'N',
            Hemisphere::SE | Hemisphere::SW => 'S',
        }
    }

    /// Sign of longitudes in this hemisphere.
    pub fn lng_sign(self) -> f64 {
        match self {
            Hemisphere::NE | Hemisphere::SE => 1.0,
            Hemisphere::NW | Hemisphere::SW => -1.0,
        }
    }

    /// Sign of latitudes in this hemisphere.
    pub fn lat_sign(self) -> f64 {
        match self {
            Hemisphere::NE | Hemisphere::NW => 1.0,
            Hemisphere::SE | Hemisphere::SW => -1.0,
        }
    }

    /// Mirrors a pair of cell indices into this hemisphere's enumeration
    /// direction. The mapping is an involution, so the same call undoes it
    /// on decode.
    pub(crate) fn mirror(self, lng: u32, lat: u32, max_lng: u32, max_lat: u32) -> (u32, u32) {
        debug_assert!(lng <= max_lng && lat <= max_lat);
        match self {
            Hemisphere::NE => (lng, lat),
            Hemisphere::NW => (lng, max_lat - lat),
            Hemisphere::SW => (max_lng - lng, max_lat - lat),
            Hemisphere::SE => (max_lng - lng, lat),
        }
    }

    /// Z-order lookup table for level 3, `[lat][lng]`.
    pub(crate) fn level3_z_order(self) -> &'static [[u8; 2]; 3] {
        match self {
            Hemisphere::NE => &LEVEL3_Z_ORDER_NE,
            Hemisphere::NW => &LEVEL3_Z_ORDER_NW,
            Hemisphere::SW => &LEVEL3_Z_ORDER_SW,
            Hemisphere::SE => &LEVEL3_Z_ORDER_SE,
        }
    }

    /// Z-order lookup table for level 6, `[lat][lng]`.
    pub(crate) fn level6_z_order(self) -> &'static [[u8; 2]; 2] {
        match self {
            Hemisphere::NE => &LEVEL6_Z_ORDER_NE,
            Hemisphere::NW => &LEVEL6_Z_ORDER_NW,
            Hemisphere::SW => &LEVEL6_Z_ORDER_SW,
            Hemisphere::SE => &LEVEL6_Z_ORDER_SE,
        }
    }
}

impl std::fmt::Display for Hemisphere {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Hemisphere::NE => "NE",
            Hemisphere::NW => "NW",
            Hemisphere::SE => "SE",
            Hemisphere::SW => "SW",
        };
        write!(f, "{}", s)
    }
}
