use crate::constants::GRID_SIZES_DEGREES;
use crate::coord::{Coordinate, GeoPoint};
use crate::decoder::{code_level_2d, code_level_3d, decode_2d, decode_3d, decode_height_parts};
use crate::encoder::{encode_2d, encode_3d};
use crate::error::BeiDouGridError;
use crate::height;
use crate::hemisphere::Hemisphere;
use geo_types::{coord, Coord, LineString, Polygon, Rect};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// A single cell of the 2D grid, reconstructed from its code.
///
/// Bounds are signed degrees with `min <= max`, so western and southern
/// cells read naturally regardless of the code's expansion direction.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::GridCell;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let cell = GridCell::from_code("N31A")?;
/// assert_eq!(cell.level, 1);
/// assert_eq!(cell.min_longitude, 0.0);
/// assert_eq!(cell.max_latitude, 4.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    /// The 2D grid code naming this cell.
    pub code: String,
    /// Refinement level, 1-10.
    pub level: u8,
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl GridCell {
    /// Decodes a 2D code into a cell with signed bounds.
    pub fn from_code(code: &str) -> Result<Self, BeiDouGridError> {
        let level = code_level_2d(code)?;
        let anchor = decode_2d(code)?;
        let hemisphere = Hemisphere::from_code(code)?;
        let (lng_size, lat_size) = GRID_SIZES_DEGREES[level as usize];
        let lng_size = lng_size.to_f64().unwrap_or(0.0);
        let lat_size = lat_size.to_f64().unwrap_or(0.0);

        let (min_longitude, max_longitude) = if hemisphere.lng_sign() > 0.0 {
            (anchor.longitude(), anchor.longitude() + lng_size)
        } else {
            (anchor.longitude() - lng_size, anchor.longitude())
        };
        let (min_latitude, max_latitude) = if hemisphere.lat_sign() > 0.0 {
            (anchor.latitude(), anchor.latitude() + lat_size)
        } else {
            (anchor.latitude() - lat_size, anchor.latitude())
        };

        Ok(Self {
            code: code.to_string(),
            level,
            min_longitude,
            max_longitude,
            min_latitude,
            max_latitude,
        })
    }

    /// Builds the cell containing a point at the given level.
    ///
    /// # Example
    ///
    /// ```
    /// use beidou_grid_rs::{GeoPoint, GridCell};
    ///
    /// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
    /// let point = GeoPoint::new_2d(116.391, 39.913)?;
    /// let cell = GridCell::from_point(&point, 2)?;
    /// assert_eq!(cell.code, "N50J47");
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_point(point: &GeoPoint, level: u8) -> Result<Self, BeiDouGridError> {
        let code = encode_2d(point, level)?;
        Self::from_code(&code)
    }

    /// The cell footprint as an axis-aligned rectangle.
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.min_longitude, y: self.min_latitude },
            coord! { x: self.max_longitude, y: self.max_latitude },
        )
    }

    /// The cell footprint as a closed polygon ring (SW, SE, NE, NW).
    pub fn to_polygon(&self) -> Polygon<f64> {
        let ring: Vec<Coord<f64>> = vec![
            coord! { x: self.min_longitude, y: self.min_latitude },
            coord! { x: self.max_longitude, y: self.min_latitude },
            coord! { x: self.max_longitude, y: self.max_latitude },
            coord! { x: self.min_longitude, y: self.max_latitude },
            coord! { x: self.min_longitude, y: self.min_latitude },
        ];
        Polygon::new(LineString::from(ring), vec![])
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &impl Coordinate) -> bool {
        point.lng() >= self.min_longitude
            && point.lng() <= self.max_longitude
            && point.lat() >= self.min_latitude
            && point.lat() <= self.max_latitude
    }
}

/// A 3D grid cell: a 2D footprint plus a vertical slab.
///
/// The slab bounds come from the logarithmic height mapping, so they are
/// the authoritative vertical geometry of the cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell3D {
    /// The 3D grid code naming this cell.
    pub code: String,
    /// Refinement level, 1-10.
    pub level: u8,
    /// The horizontal footprint.
    pub footprint: GridCell,
    /// Bottom of the vertical slab in metres.
    pub min_height: f64,
    /// Top of the vertical slab in metres.
    pub max_height: f64,
}

impl GridCell3D {
    /// Builds the 3D cell containing a point (and its height) at the given
    /// level.
    pub fn from_point(point: &GeoPoint, level: u8) -> Result<Self, BeiDouGridError> {
        let code = encode_3d(point, level)?;
        Self::from_code(&code)
    }

    /// Decodes a 3D code into a cell with footprint and slab bounds.
    pub fn from_code(code: &str) -> Result<Self, BeiDouGridError> {
        let level = code_level_3d(code)?;
        // Validates every fragment, including the height digits.
        decode_3d(code)?;
        let (negative, magnitude) = decode_height_parts(code, level)?;
        let code_2d = crate::decoder::extract_2d_code(code)?;
        let footprint = GridCell::from_code(&code_2d)?;
        let (min_height, max_height) = height::slab_bounds(magnitude, negative, level);
        Ok(Self {
            code: code.to_string(),
            level,
            footprint,
            min_height,
            max_height,
        })
    }
}
