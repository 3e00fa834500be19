use crate::constants::EARTH_RADIUS;
use crate::error::BeiDouGridError;
use geo_types::Point;
use serde::Serialize;

/// Trait for types that can provide longitude/latitude coordinates.
///
/// Implemented for `(f64, f64)` tuples, `geo_types::Point<f64>` and
/// [`GeoPoint`]. This allows functions to accept any of them.
pub trait Coordinate {
    /// Returns the longitude in decimal degrees.
    fn lng(&self) -> f64;
    /// Returns the latitude in decimal degrees.
    fn lat(&self) -> f64;
}

impl Coordinate for (f64, f64) {
    fn lng(&self) -> f64 {
        self.0
    }
    fn lat(&self) -> f64 {
        self.1
    }
}

impl Coordinate for Point<f64> {
    fn lng(&self) -> f64 {
        self.x()
    }
    fn lat(&self) -> f64 {
        self.y()
    }
}

/// A geographic point with longitude, latitude and ellipsoidal height.
///
/// Longitude is restricted to [-180, 180] degrees, latitude to [-90, 90]
/// degrees; height is metres above the reference ellipsoid. Construction
/// validates all three, so every encoder input is known to be in range.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::GeoPoint;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let point = GeoPoint::new(116.391, 39.913, 50.0)?;
/// assert_eq!(point.longitude(), 116.391);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
    height: f64,
}

impl GeoPoint {
    /// Creates a validated point. Fails with `InvalidArgument` on NaN or
    /// out-of-range coordinates.
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Result<Self, BeiDouGridError> {
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "longitude must be between -180 and 180 degrees, got {}",
                longitude
            )));
        }
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "latitude must be between -90 and 90 degrees, got {}",
                latitude
            )));
        }
        if !height.is_finite() {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "height must be a finite number of metres, got {}",
                height
            )));
        }
        Ok(Self {
            longitude,
            latitude,
            height,
        })
    }

    /// Creates a point at height zero.
    pub fn new_2d(longitude: f64, latitude: f64) -> Result<Self, BeiDouGridError> {
        Self::new(longitude, latitude, 0.0)
    }

    /// Returns the longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns the latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the ellipsoidal height in metres.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Straight-line (chord) distance to another point in metres, taking
    /// the height above the geocentric reference radius into account.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let (x1, y1, z1) = self.geocentric();
        let (x2, y2, z2) = other.geocentric();
        let (dx, dy, dz) = (x2 - x1, y2 - y1, z2 - z1);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    fn geocentric(&self) -> (f64, f64, f64) {
        let lat = self.latitude.to_radians();
        let lng = self.longitude.to_radians();
        let r = EARTH_RADIUS + self.height;
        (r * lat.cos() * lng.cos(), r * lat.cos() * lng.sin(), r * lat.sin())
    }
}

impl Coordinate for GeoPoint {
    fn lng(&self) -> f64 {
        self.longitude
    }
    fn lat(&self) -> f64 {
        self.latitude
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({:.7}, {:.7}, {:.2}m)",
            self.longitude, self.latitude, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_trait_tuple() {
        let tuple = (116.391, 39.913);
        assert_eq!(tuple.lng(), 116.391);
        assert_eq!(tuple.lat(), 39.913);
    }

    #[test]
    fn test_coordinate_trait_point() {
        let point = Point::new(116.391, 39.913);
        assert_eq!(point.lng(), 116.391);
        assert_eq!(point.lat(), 39.913);
    }

    #[test]
    fn test_geo_point_validation() {
        assert!(GeoPoint::new(116.391, 39.913, 0.0).is_ok());
        assert!(GeoPoint::new(180.0, 90.0, 0.0).is_ok());
        assert!(GeoPoint::new(-180.0, -90.0, 0.0).is_ok());
        assert!(GeoPoint::new(180.1, 0.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -90.1, 0.0).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, 0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_distance_to_height_difference() -> Result<(), BeiDouGridError> {
        let a = GeoPoint::new(116.391, 39.913, 0.0)?;
        let b = GeoPoint::new(116.391, 39.913, 100.0)?;
        assert!((a.distance_to(&b) - 100.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_distance_to_is_symmetric() -> Result<(), BeiDouGridError> {
        let a = GeoPoint::new(116.391, 39.913, 10.0)?;
        let b = GeoPoint::new(116.401, 39.923, 30.0)?;
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
        assert!(a.distance_to(&b) > 1000.0);
        Ok(())
    }
}
