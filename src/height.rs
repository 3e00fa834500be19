//! Logarithmic height codec shared by the 3D encoder and decoder.
//!
//! A height H in metres maps to a 31-bit integer
//! `n = floor((theta0/theta) * ln((H + r0)/r0) / ln(1 + theta0))` with
//! `theta0 = pi/180`, `theta = pi/(180*3600*2048)` and r0 the geocentric
//! reference radius. The sign of n travels separately as bit 32; each
//! level's code fragment carries a fixed slice of the magnitude bits.

use crate::constants::{ELEVATION_ENCODING, EARTH_RADIUS, HEIGHT_BIT_RANGES};
use crate::error::BeiDouGridError;

const THETA0: f64 = std::f64::consts::PI / 180.0;
const THETA: f64 = std::f64::consts::PI / (180.0 * 3600.0 * 2048.0);

/// Quotients within this distance of an integer are snapped before the
/// floor, so a decoded slab base re-encodes to its own slab despite the
/// exp/ln float round trip.
const FLOOR_SNAP: f64 = 1e-6;

/// Maps a height in metres to the signed slab index n.
pub(crate) fn height_to_n(height_m: f64) -> Result<i64, BeiDouGridError> {
    if !height_m.is_finite() {
        return Err(BeiDouGridError::InvalidArgument(format!(
            "height must be a finite number of metres, got {}",
            height_m
        )));
    }
    let ratio = (height_m + EARTH_RADIUS) / EARTH_RADIUS;
    if ratio <= 0.0 {
        return Err(BeiDouGridError::InvalidArgument(format!(
            "height {}m is at or below the geocentre",
            height_m
        )));
    }
    let quotient = (THETA0 / THETA) * ratio.ln() / (1.0 + THETA0).ln();
    let nearest = quotient.round();
    let n = if (quotient - nearest).abs() < FLOOR_SNAP {
        nearest
    } else {
        quotient.floor()
    };
    if n.abs() >= (1u64 << 31) as f64 {
        return Err(BeiDouGridError::InvalidArgument(format!(
            "height {}m is outside the encodable range",
            height_m
        )));
    }
    Ok(n as i64)
}

/// Maps a slab index back to the height of the slab edge nearest the
/// geoid, in metres. The sign rides in the exponent, which makes this the
/// exact inverse of [`height_to_n`]: `x(H(±m)) = ±m`.
pub(crate) fn n_to_height(magnitude: u64, negative: bool) -> f64 {
    let signed = if negative {
        -(magnitude as f64)
    } else {
        magnitude as f64
    };
    let exponent = signed * (THETA / THETA0) * (1.0 + THETA0).ln();
    exponent.exp() * EARTH_RADIUS - EARTH_RADIUS
}

/// The n-step between adjacent slabs at a level: one unit of the least
/// significant bit that level's fragment carries.
pub(crate) fn slab_step(level: u8) -> u32 {
    1u32 << (HEIGHT_BIT_RANGES[level as usize].0 - 1)
}

/// Vertical extent `(min, max)` of the slab at a quantised magnitude.
pub(crate) fn slab_bounds(magnitude: u32, negative: bool, level: u8) -> (f64, f64) {
    let step = slab_step(level) as u64;
    let near = n_to_height(magnitude as u64, negative);
    let far = n_to_height(magnitude as u64 + step, negative);
    if negative {
        (far, near)
    } else {
        (near, far)
    }
}

/// Renders one level's height fragment from the magnitude bits.
pub(crate) fn fragment(magnitude: u32, level: u8) -> String {
    let (bits, radix) = ELEVATION_ENCODING[level as usize];
    let (low, _) = HEIGHT_BIT_RANGES[level as usize];
    let value = (magnitude >> (low - 1)) & ((1u32 << bits) - 1);
    match radix {
        16 => format!("{:X}", value),
        _ if level == 1 => format!("{:02}", value),
        _ => value.to_string(),
    }
}

/// Parses one level's height fragment back into its bit-field value.
pub(crate) fn parse_fragment(fragment: &str, level: u8) -> Result<u32, BeiDouGridError> {
    let (bits, radix) = ELEVATION_ENCODING[level as usize];
    if !fragment.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(BeiDouGridError::InvalidCode(format!(
            "level-{} height fragment contains a non-digit: {:?}",
            level, fragment
        )));
    }
    let value = u32::from_str_radix(fragment, radix).map_err(|_| {
        BeiDouGridError::InvalidCode(format!(
            "level-{} height fragment is not a base-{} number: {:?}",
            level, radix, fragment
        ))
    })?;
    if value >= (1u32 << bits) {
        return Err(BeiDouGridError::InvalidCode(format!(
            "level-{} height fragment out of range: {:?}",
            level, fragment
        )));
    }
    Ok(value)
}

/// Rebuilds the magnitude from per-level bit-field values.
pub(crate) fn magnitude_from_fragments(values: &[(u8, u32)]) -> u32 {
    let mut magnitude = 0u32;
    for &(level, value) in values {
        let (low, _) = HEIGHT_BIT_RANGES[level as usize];
        magnitude |= value << (low - 1);
    }
    magnitude
}
