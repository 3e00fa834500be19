use crate::constants::{CODE_LENGTH_2D, CODE_LENGTH_3D, GRID_SIZES_DEGREES, GRID_SIZES_SECONDS};
use crate::coord::GeoPoint;
use crate::error::BeiDouGridError;
use crate::height;
use crate::hemisphere::Hemisphere;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Infers the level of a 2D code from its length.
pub fn code_level_2d(code: &str) -> Result<u8, BeiDouGridError> {
    if code.is_empty() || !code.is_ascii() {
        return Err(BeiDouGridError::InvalidCode(format!(
            "code must be a non-empty ASCII string: {:?}",
            code
        )));
    }
    for level in 1..=10usize {
        if CODE_LENGTH_2D[level] == code.len() {
            return Ok(level as u8);
        }
    }
    Err(BeiDouGridError::InvalidCode(format!(
        "length {} matches no 2D code level: {:?}",
        code.len(),
        code
    )))
}

/// Infers the level of a 3D code from its length.
pub fn code_level_3d(code: &str) -> Result<u8, BeiDouGridError> {
    if code.is_empty() || !code.is_ascii() {
        return Err(BeiDouGridError::InvalidCode(format!(
            "code must be a non-empty ASCII string: {:?}",
            code
        )));
    }
    for level in 1..=10usize {
        if CODE_LENGTH_3D[level] == code.len() {
            return Ok(level as u8);
        }
    }
    Err(BeiDouGridError::InvalidCode(format!(
        "length {} matches no 3D code level: {:?}",
        code.len(),
        code
    )))
}

/// Decodes a 2D code to the anchor corner of its cell: the corner nearest
/// the equator and the prime meridian (the south-west corner for NE
/// hemisphere cells). Height is zero.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::decode_2d;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let corner = decode_2d("N31A")?;
/// assert_eq!(corner.longitude(), 0.0);
/// assert_eq!(corner.latitude(), 0.0);
/// # Ok(())
/// # }
/// ```
pub fn decode_2d(code: &str) -> Result<GeoPoint, BeiDouGridError> {
    let level = code_level_2d(code)?;
    let hemisphere = hemisphere_of(code)?;

    // Accumulate on the same decimal grid the encoder walks, so the anchor
    // is an exact fixed point of encode(decode(code)).
    let mut lng_deg = Decimal::ZERO;
    let mut lat_deg = Decimal::ZERO;
    for i in 1..=level as usize {
        let fragment = &code[CODE_LENGTH_2D[i - 1]..CODE_LENGTH_2D[i]];
        let (lng_idx, lat_idx) = parse_level_fragment(fragment, i as u8, hemisphere)?;
        let (lng_size, lat_size) = GRID_SIZES_DEGREES[i];
        lng_deg += Decimal::from(lng_idx) * lng_size;
        lat_deg += Decimal::from(lat_idx) * lat_size;
    }

    let lng = decimal_to_f64(lng_deg)? * hemisphere.lng_sign();
    let lat = decimal_to_f64(lat_deg)? * hemisphere.lat_sign();
    GeoPoint::new(lng, lat, 0.0).map_err(|_| {
        BeiDouGridError::InvalidCode(format!(
            "code decodes outside the valid coordinate range: {:?}",
            code
        ))
    })
}

/// Decodes a 3D code to the anchor corner of its cell with the height of
/// the slab edge nearest the geoid.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::decode_3d;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let corner = decode_3d("N050J0047050")?;
/// assert_eq!(corner.longitude(), 116.25);
/// assert_eq!(corner.height(), 0.0);
/// # Ok(())
/// # }
/// ```
pub fn decode_3d(code: &str) -> Result<GeoPoint, BeiDouGridError> {
    let level = code_level_3d(code)?;
    let (negative, magnitude) = decode_height_parts(code, level)?;
    let code_2d = extract_2d_at(code, level);
    let hemisphere = hemisphere_of(&code_2d)?;

    // The 3D path accumulates arc-seconds; every step is exact in f64.
    let mut lng_sec = 0.0;
    let mut lat_sec = 0.0;
    for i in 1..=level as usize {
        let fragment = &code_2d[CODE_LENGTH_2D[i - 1]..CODE_LENGTH_2D[i]];
        let (lng_idx, lat_idx) = parse_level_fragment(fragment, i as u8, hemisphere)?;
        let (lng_size, lat_size) = GRID_SIZES_SECONDS[i];
        lng_sec += lng_idx as f64 * lng_size;
        lat_sec += lat_idx as f64 * lat_size;
    }

    let lng = lng_sec / 3600.0 * hemisphere.lng_sign();
    let lat = lat_sec / 3600.0 * hemisphere.lat_sign();
    let height_m = height::n_to_height(magnitude as u64, negative);
    GeoPoint::new(lng, lat, height_m).map_err(|_| {
        BeiDouGridError::InvalidCode(format!(
            "code decodes outside the valid coordinate range: {:?}",
            code
        ))
    })
}

/// Strips the height digits out of a 3D code, returning the embedded 2D
/// code.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::extract_2d_code;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// assert_eq!(extract_2d_code("N050J0047050")?, "N50J475");
/// # Ok(())
/// # }
/// ```
pub fn extract_2d_code(code: &str) -> Result<String, BeiDouGridError> {
    let level = code_level_3d(code)?;
    Ok(extract_2d_at(code, level))
}

/// Reads the height sign digit and reassembles the slab magnitude from a
/// 3D code's height fragments.
pub(crate) fn decode_height_parts(
    code: &str,
    level: u8,
) -> Result<(bool, u32), BeiDouGridError> {
    let negative = match code.as_bytes()[1] {
        b'0' => false,
        b'1' => true,
        other => {
            return Err(BeiDouGridError::InvalidCode(format!(
                "height sign digit must be 0 or 1, got {:?}",
                other as char
            )))
        }
    };
    let mut values = Vec::with_capacity(level as usize);
    let mut index = 2;
    for i in 1..=level as usize {
        index += CODE_LENGTH_2D[i] - CODE_LENGTH_2D[i - 1];
        let width = if i == 1 { 2 } else { 1 };
        values.push((i as u8, height::parse_fragment(&code[index..index + width], i as u8)?));
        index += width;
    }
    Ok((negative, height::magnitude_from_fragments(&values)))
}

fn extract_2d_at(code: &str, level: u8) -> String {
    let mut code_2d = String::with_capacity(CODE_LENGTH_2D[level as usize]);
    code_2d.push_str(&code[..1]);
    let mut index = 2;
    for i in 1..=level as usize {
        let width = CODE_LENGTH_2D[i] - CODE_LENGTH_2D[i - 1];
        code_2d.push_str(&code[index..index + width]);
        index += width + if i == 1 { 2 } else { 1 };
    }
    code_2d
}

fn hemisphere_of(code_2d: &str) -> Result<Hemisphere, BeiDouGridError> {
    let first = code_2d.as_bytes()[0];
    if first != b'N' && first != b'S' {
        return Err(BeiDouGridError::InvalidCode(format!(
            "code must start with N or S, got {:?}",
            first as char
        )));
    }
    Hemisphere::from_code(code_2d)
}

/// Parses one level's 2D fragment into unsigned cell indices, undoing the
/// hemisphere mirroring (level 1 is remapped to its distance from the
/// prime meridian instead).
fn parse_level_fragment(
    fragment: &str,
    level: u8,
    hemisphere: Hemisphere,
) -> Result<(u32, u32), BeiDouGridError> {
    let bytes = fragment.as_bytes();
    match level {
        1 => {
            if !bytes[..2].iter().all(u8::is_ascii_digit) {
                return Err(BeiDouGridError::InvalidCode(format!(
                    "level-1 longitude field is not a two-digit number: {:?}",
                    fragment
                )));
            }
            let lng_raw = (bytes[0] - b'0') as u32 * 10 + (bytes[1] - b'0') as u32;
            if !(b'A'..=b'V').contains(&bytes[2]) {
                return Err(BeiDouGridError::InvalidCode(format!(
                    "level-1 latitude letter must be A-V: {:?}",
                    fragment
                )));
            }
            if lng_raw == 0 {
                return Err(BeiDouGridError::UnsupportedPolar);
            }
            if lng_raw > 61 {
                return Err(BeiDouGridError::InvalidCode(format!(
                    "level-1 longitude index out of range: {:?}",
                    fragment
                )));
            }
            let lng = if lng_raw >= 31 { lng_raw - 31 } else { 30 - lng_raw };
            Ok((lng, (bytes[2] - b'A') as u32))
        }
        2 => mirrored_hex_pair(bytes, level, hemisphere, 11, 7),
        4 | 5 => mirrored_hex_pair(bytes, level, hemisphere, 14, 14),
        7..=10 => mirrored_hex_pair(bytes, level, hemisphere, 7, 7),
        3 => z_order_lookup(bytes[0], level, hemisphere.level3_z_order()),
        6 => z_order_lookup(bytes[0], level, hemisphere.level6_z_order()),
        _ => unreachable!("level checked by caller"),
    }
}

fn mirrored_hex_pair(
    bytes: &[u8],
    level: u8,
    hemisphere: Hemisphere,
    max_lng: u32,
    max_lat: u32,
) -> Result<(u32, u32), BeiDouGridError> {
    let lng = hex_digit(bytes[0], level)?;
    let lat = hex_digit(bytes[1], level)?;
    if lng > max_lng || lat > max_lat {
        return Err(BeiDouGridError::InvalidCode(format!(
            "level-{} fragment index out of range: {:?}",
            level,
            std::str::from_utf8(bytes).unwrap_or("?")
        )));
    }
    Ok(hemisphere.mirror(lng, lat, max_lng, max_lat))
}

fn hex_digit(byte: u8, level: u8) -> Result<u32, BeiDouGridError> {
    (byte as char).to_digit(16).ok_or_else(|| {
        BeiDouGridError::InvalidCode(format!(
            "level-{} fragment is not hexadecimal: {:?}",
            level, byte as char
        ))
    })
}

fn z_order_lookup(
    byte: u8,
    level: u8,
    table: &[[u8; 2]],
) -> Result<(u32, u32), BeiDouGridError> {
    for (lat, row) in table.iter().enumerate() {
        for (lng, &value) in row.iter().enumerate() {
            if value + b'0' == byte {
                return Ok((lng as u32, lat as u32));
            }
        }
    }
    Err(BeiDouGridError::InvalidCode(format!(
        "level-{} Z-order value outside the tabled set: {:?}",
        level, byte as char
    )))
}

fn decimal_to_f64(value: Decimal) -> Result<f64, BeiDouGridError> {
    value.to_f64().ok_or_else(|| {
        BeiDouGridError::InvalidCode("decoded coordinate is not representable".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_2d, encode_3d};

    #[test]
    fn test_decode_2d_origin_cell() -> Result<(), BeiDouGridError> {
        let corner = decode_2d("N31A")?;
        assert_eq!(corner.longitude(), 0.0);
        assert_eq!(corner.latitude(), 0.0);
        assert_eq!(corner.height(), 0.0);
        Ok(())
    }

    #[test]
    fn test_decode_2d_known_vector() -> Result<(), BeiDouGridError> {
        let corner = decode_2d("N50J475846B")?;
        assert!((corner.longitude() - 116.3900000002).abs() < 1e-9);
        assert!((corner.latitude() - 39.9122222223).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_code_level_inference() -> Result<(), BeiDouGridError> {
        assert_eq!(code_level_2d("N31A")?, 1);
        assert_eq!(code_level_2d("N50J475846B")?, 5);
        assert_eq!(code_level_3d("N050J0047050")?, 3);
        assert_eq!(code_level_3d("S025O00940406203D000576204121744")?, 10);
        assert!(code_level_2d("").is_err());
        assert!(code_level_2d("N31").is_err());
        assert!(code_level_3d("N31A").is_err());
        Ok(())
    }

    #[test]
    fn test_decode_2d_round_trips_through_encoder() -> Result<(), BeiDouGridError> {
        // Interior points in all four quadrants, re-encoded at every level.
        let points = [
            (116.391, 39.913),
            (120.5830508, 31.1415575),
            (-2.248, 53.481),
            (151.2093, -33.8688),
            (-57.702155, -31.396478),
        ];
        for (lng, lat) in points {
            for level in 1..=10u8 {
                let code = encode_2d(&GeoPoint::new_2d(lng, lat)?, level)?;
                let corner = decode_2d(&code)?;
                let reencoded = encode_2d(&corner, level)?;
                assert_eq!(reencoded, code, "({}, {}) level {}", lng, lat, level);
            }
        }
        Ok(())
    }

    #[test]
    fn test_decode_2d_corner_stays_within_cell() -> Result<(), BeiDouGridError> {
        use rust_decimal::prelude::ToPrimitive;
        let point = GeoPoint::new_2d(120.5830508, 31.1415575)?;
        for level in 1..=10u8 {
            let code = encode_2d(&point, level)?;
            let corner = decode_2d(&code)?;
            let (lng_size, lat_size) = GRID_SIZES_DEGREES[level as usize];
            let lng_size = lng_size.to_f64().unwrap();
            let lat_size = lat_size.to_f64().unwrap();
            assert!(corner.longitude() <= point.longitude());
            assert!(corner.latitude() <= point.latitude());
            assert!(point.longitude() - corner.longitude() < lng_size + 1e-9);
            assert!(point.latitude() - corner.latitude() < lat_size + 1e-9);
        }
        Ok(())
    }

    #[test]
    fn test_decode_2d_polar_and_invalid_fragments() {
        assert_eq!(decode_2d("N00A"), Err(BeiDouGridError::UnsupportedPolar));
        assert!(matches!(
            decode_2d("N31W"),
            Err(BeiDouGridError::InvalidCode(_))
        )); // latitude letter beyond V
        assert!(matches!(
            decode_2d("NXXA"),
            Err(BeiDouGridError::InvalidCode(_))
        ));
        assert!(matches!(
            decode_2d("X31A"),
            Err(BeiDouGridError::InvalidCode(_))
        ));
        assert!(matches!(
            decode_2d("N31A006"),
            Err(BeiDouGridError::InvalidCode(_))
        )); // level-3 Z-order digit outside 0-5
        assert!(matches!(
            decode_2d("N31ACF"),
            Err(BeiDouGridError::InvalidCode(_))
        )); // level-2 longitude digit beyond 11
        assert!(matches!(
            decode_2d("N31A99"),
            Err(BeiDouGridError::InvalidCode(_))
        )); // level-2 latitude digit beyond 7
    }

    #[test]
    fn test_decode_3d_scenario() -> Result<(), BeiDouGridError> {
        let corner = decode_3d("N050J0047050")?;
        assert_eq!(corner.longitude(), 116.25);
        assert!((corner.latitude() - 143400.0 / 3600.0).abs() < 1e-12);
        assert_eq!(corner.height(), 0.0);
        Ok(())
    }

    #[test]
    fn test_decode_3d_round_trips_through_encoder() -> Result<(), BeiDouGridError> {
        let code = "S025O00940406203D000576204121744";
        let corner = decode_3d(code)?;
        assert!(corner.longitude() < 0.0);
        assert!(corner.latitude() < 0.0);
        assert_eq!(encode_3d(&corner, 10)?, code);
        Ok(())
    }

    #[test]
    fn test_decode_3d_height_is_slab_base() -> Result<(), BeiDouGridError> {
        let input = GeoPoint::new(120.5830508, 31.1415575, 50.0)?;
        for level in [6u8, 7, 8, 9, 10] {
            let code = encode_3d(&input, level)?;
            let corner = decode_3d(&code)?;
            assert!(corner.height() <= 50.0 + 0.01, "level {}", level);
            assert_eq!(encode_3d(&corner, level)?, code, "level {}", level);
        }
        Ok(())
    }

    #[test]
    fn test_decode_3d_rejects_bad_sign() {
        assert!(matches!(
            decode_3d("N250J0047050"),
            Err(BeiDouGridError::InvalidCode(_))
        ));
    }

    #[test]
    fn test_extract_2d_code() -> Result<(), BeiDouGridError> {
        assert_eq!(extract_2d_code("N050J0047050")?, "N50J475");
        assert_eq!(
            extract_2d_code("S025O00940406203D000576204121744")?,
            "S25O944623D057201274"
        );
        Ok(())
    }
}
