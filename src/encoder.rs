use crate::constants::{
    validate_level, CODE_LENGTH_2D, CODE_LENGTH_3D, GRID_SIZES_DEGREES, GRID_SIZES_SECONDS,
};
use crate::coord::GeoPoint;
use crate::error::BeiDouGridError;
use crate::height;
use crate::hemisphere::Hemisphere;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Latitudes at or beyond this magnitude fall in the polar cap scheme,
/// which the standard defines separately and this crate does not implement.
const POLAR_LATITUDE: f64 = 88.0;

/// Absolute guard in arc-seconds added before flooring, so an anchor that
/// went through an f64 degree/second conversion still lands in its own
/// cell. Far below the level-10 cell of 0.00048828125".
const SECOND_EPS: f64 = 1e-7;

/// Encodes a point to its 2D grid code at the given level.
///
/// The code names the cell containing the point; its length is fixed per
/// level (4, 6, 7, 9, 11, 12, 14, 16, 18, 20 characters for levels 1-10).
///
/// # Errors
///
/// `UnsupportedPolar` for |latitude| >= 88 degrees, `InvalidArgument` for a
/// level outside 1-10.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::{encode_2d, GeoPoint};
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let point = GeoPoint::new_2d(116.391, 39.913)?;
/// assert_eq!(encode_2d(&point, 5)?, "N50J475846B");
/// # Ok(())
/// # }
/// ```
pub fn encode_2d(point: &GeoPoint, level: u8) -> Result<String, BeiDouGridError> {
    validate_level(level)?;
    let hemisphere = Hemisphere::from_point(point)?;
    if point.latitude().abs() >= POLAR_LATITUDE {
        return Err(BeiDouGridError::UnsupportedPolar);
    }

    let mut longitude = decimal_of(point.longitude())?;
    let mut latitude = decimal_of(point.latitude())?;
    let mut base_lng = Decimal::ZERO;
    let mut base_lat = Decimal::ZERO;

    let mut code = String::with_capacity(CODE_LENGTH_2D[level as usize]);
    code.push(hemisphere.lat_char());

    for i in 1..=level {
        let (lng_size, lat_size) = GRID_SIZES_DEGREES[i as usize];
        let lng_p = ((longitude - base_lng) / lng_size)
            .floor()
            .to_i64()
            .ok_or_else(|| {
                BeiDouGridError::InvalidArgument("longitude index overflow".to_string())
            })?;
        let lat_p = ((latitude.abs() - base_lat) / lat_size)
            .floor()
            .to_i64()
            .ok_or_else(|| {
                BeiDouGridError::InvalidArgument("latitude index overflow".to_string())
            })?;

        if i == 1 {
            // The level-1 longitude index is signed; the anchor walks
            // outward from the prime meridian in both directions.
            let lng_cells = if lng_p < 0 { -lng_p - 1 } else { lng_p };
            base_lng += Decimal::from(lng_cells) * lng_size;
            base_lat += Decimal::from(lat_p) * lat_size;
            code.push_str(&level1_fragment((lng_p + 31) as u32, lat_p as u32));
            latitude = latitude.abs();
            longitude = longitude.abs();
        } else {
            base_lng += Decimal::from(lng_p) * lng_size;
            base_lat += Decimal::from(lat_p) * lat_size;
            code.push_str(&level_fragment(i, lng_p as u32, lat_p as u32, hemisphere));
        }
    }

    Ok(code)
}

/// Encodes a point and its height to an interleaved 3D grid code.
///
/// Layout: latitude direction, height sign digit, then per level the 2D
/// fragment followed by the height fragment (two characters at level 1,
/// one elsewhere).
///
/// # Example
///
/// ```
/// use beidou_grid_rs::{encode_3d, GeoPoint};
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let point = GeoPoint::new(116.391, 39.913, 50.0)?;
/// let code = encode_3d(&point, 3)?;
/// assert_eq!(code.len(), 12);
/// assert!(code.starts_with('N'));
/// # Ok(())
/// # }
/// ```
pub fn encode_3d(point: &GeoPoint, level: u8) -> Result<String, BeiDouGridError> {
    validate_level(level)?;
    let hemisphere = Hemisphere::from_point(point)?;
    if point.latitude().abs() >= POLAR_LATITUDE {
        return Err(BeiDouGridError::UnsupportedPolar);
    }

    let n = height::height_to_n(point.height())?;
    let negative = n < 0;
    let magnitude = n.unsigned_abs() as u32;

    let mut code = String::with_capacity(CODE_LENGTH_3D[level as usize]);
    code.push(hemisphere.lat_char());
    code.push(if negative { '1' } else { '0' });

    // 2D fragments are derived in arc-seconds here; the second table is
    // exact in f64, so no decimal bases are needed.
    let lng_sec = point.longitude() * 3600.0;
    let lat_sec = point.latitude().abs() * 3600.0;
    let mut lng_offset = 0.0;
    let mut lat_offset = 0.0;

    for i in 1..=level {
        let (lng_size, lat_size) = GRID_SIZES_SECONDS[i as usize];
        if i == 1 {
            let lng_idx = sec_floor(lng_sec, lng_size);
            let lat_idx = sec_floor(lat_sec, lat_size);
            lng_offset = (if lng_idx >= 0 { lng_idx } else { -lng_idx - 1 }) as f64 * lng_size;
            lat_offset = lat_idx as f64 * lat_size;
            code.push_str(&level1_fragment((lng_idx + 31) as u32, lat_idx as u32));
        } else {
            let lng_idx = sec_floor(lng_sec.abs() - lng_offset, lng_size);
            let lat_idx = sec_floor(lat_sec - lat_offset, lat_size);
            lng_offset += lng_idx as f64 * lng_size;
            lat_offset += lat_idx as f64 * lat_size;
            code.push_str(&level_fragment(i, lng_idx as u32, lat_idx as u32, hemisphere));
        }
        code.push_str(&height::fragment(magnitude, i));
    }

    Ok(code)
}

/// Encodes only the height component of a 3D code: the sign digit followed
/// by each level's height fragment.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::encode_3d_height;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// assert_eq!(encode_3d_height(50.0, 5)?, "0000000");
/// # Ok(())
/// # }
/// ```
pub fn encode_3d_height(height_m: f64, level: u8) -> Result<String, BeiDouGridError> {
    validate_level(level)?;
    let n = height::height_to_n(height_m)?;
    let magnitude = n.unsigned_abs() as u32;
    let mut code = String::with_capacity(level as usize + 2);
    code.push(if n < 0 { '1' } else { '0' });
    for i in 1..=level {
        code.push_str(&height::fragment(magnitude, i));
    }
    Ok(code)
}

/// Interleaves a 2D code with height fragments built from a slab
/// magnitude, producing the full 3D code.
pub(crate) fn compose_3d(code_2d: &str, negative: bool, magnitude: u32, level: u8) -> String {
    let mut code = String::with_capacity(CODE_LENGTH_3D[level as usize]);
    code.push_str(&code_2d[..1]);
    code.push(if negative { '1' } else { '0' });
    for i in 1..=level as usize {
        code.push_str(&code_2d[CODE_LENGTH_2D[i - 1]..CODE_LENGTH_2D[i]]);
        code.push_str(&height::fragment(magnitude, i as u8));
    }
    code
}

fn decimal_of(value: f64) -> Result<Decimal, BeiDouGridError> {
    Decimal::from_f64(value).ok_or_else(|| {
        BeiDouGridError::InvalidArgument(format!("coordinate {} is not a finite number", value))
    })
}

fn sec_floor(difference: f64, cell_size: f64) -> i64 {
    ((difference + SECOND_EPS) / cell_size).floor() as i64
}

fn level1_fragment(lng: u32, lat: u32) -> String {
    debug_assert!(lng <= 61 && lat <= 21);
    format!("{:02}{}", lng, (b'A' + lat as u8) as char)
}

fn level_fragment(level: u8, lng: u32, lat: u32, hemisphere: Hemisphere) -> String {
    match level {
        2 => hex_pair(hemisphere.mirror(lng, lat, 11, 7)),
        3 => hemisphere.level3_z_order()[lat as usize][lng as usize].to_string(),
        4 | 5 => hex_pair(hemisphere.mirror(lng, lat, 14, 14)),
        6 => hemisphere.level6_z_order()[lat as usize][lng as usize].to_string(),
        7..=10 => hex_pair(hemisphere.mirror(lng, lat, 7, 7)),
        _ => unreachable!("level checked by caller"),
    }
}

fn hex_pair((lng, lat): (u32, u32)) -> String {
    format!("{:X}{:X}", lng, lat)
}
