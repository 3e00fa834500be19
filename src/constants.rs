use crate::error::BeiDouGridError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Cell size per level in decimal degrees `(longitude, latitude)`.
///
/// Index 0 is a placeholder so tables can be indexed directly by level.
/// Non-terminating values are fixed at 10 fractional digits, matching the
/// grid the encoder walks; all level transitions use these exact decimals.
pub const GRID_SIZES_DEGREES: [(Decimal, Decimal); 11] = [
    (Decimal::ZERO, Decimal::ZERO),
    (dec!(6), dec!(4)),                         // level 1: 6 x 4 degrees
    (dec!(0.5), dec!(0.5)),                     // level 2: 30' x 30'
    (dec!(0.25), dec!(0.1666666667)),           // level 3: 15' x 10'
    (dec!(0.0166666667), dec!(0.0166666667)),   // level 4: 1' x 1'
    (dec!(0.0011111111), dec!(0.0011111111)),   // level 5: 4" x 4"
    (dec!(0.0005555556), dec!(0.0005555556)),   // level 6: 2" x 2"
    (dec!(0.0000694444), dec!(0.0000694444)),   // level 7: 1/4" x 1/4"
    (dec!(0.0000086806), dec!(0.0000086806)),   // level 8: 1/32" x 1/32"
    (dec!(0.0000010851), dec!(0.0000010851)),   // level 9: 1/256" x 1/256"
    (dec!(0.0000001356), dec!(0.0000001356)),   // level 10: 1/2048" x 1/2048"
];

/// Cell size per level in arc-seconds `(longitude, latitude)`.
///
/// Every entry is an integer or a negative power of two, so `f64`
/// accumulation over these values is exact.
pub const GRID_SIZES_SECONDS: [(f64, f64); 11] = [
    (0.0, 0.0),
    (21600.0, 14400.0),
    (1800.0, 1800.0),
    (900.0, 600.0),
    (60.0, 60.0),
    (4.0, 4.0),
    (2.0, 2.0),
    (0.25, 0.25),
    (0.03125, 0.03125),
    (0.00390625, 0.00390625),
    (0.00048828125, 0.00048828125),
];

/// Grid fan-out per level `(longitude cells, latitude cells)`.
pub const GRID_DIVISIONS: [(u32, u32); 11] = [
    (0, 0),
    (60, 22),
    (12, 8),
    (2, 3),
    (15, 10),
    (15, 15),
    (2, 2),
    (8, 8),
    (8, 8),
    (8, 8),
    (8, 8),
];

/// Cumulative 2D code length per level (index 0 counts the hemisphere
/// letter alone).
pub const CODE_LENGTH_2D: [usize; 11] = [1, 4, 6, 7, 9, 11, 12, 14, 16, 18, 20];

/// Cumulative 3D code length per level (index 0 counts the hemisphere
/// letter plus the height sign digit).
pub const CODE_LENGTH_3D: [usize; 11] = [2, 7, 10, 12, 15, 18, 20, 23, 26, 29, 32];

/// Height fragment layout per level: `(bits, radix)`.
pub const ELEVATION_ENCODING: [(u32, u32); 11] = [
    (0, 0),
    (6, 10),
    (3, 8),
    (1, 2),
    (4, 16),
    (4, 16),
    (1, 2),
    (3, 8),
    (3, 8),
    (3, 8),
    (3, 8),
];

/// Bit positions of each level's height fragment inside the 32-bit height
/// integer, 1-indexed from the least significant bit: `(low, high)`.
/// Index 0 holds the sign bit.
pub const HEIGHT_BIT_RANGES: [(u32, u32); 11] = [
    (32, 32),
    (26, 31),
    (23, 25),
    (22, 22),
    (18, 21),
    (14, 17),
    (13, 13),
    (10, 12),
    (7, 9),
    (4, 6),
    (1, 3),
];

/// Geocentric reference radius in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Equator circumference in metres, used for metric cell widths.
pub const EARTH_EQUATOR_CIRCUMFERENCE: f64 = 40_075_000.0;

/// Metric width of a level's cell in metres, derived from the equator
/// circumference. Coarse figure only: the authoritative vertical geometry
/// is the logarithmic height mapping.
pub fn grid_size_3d_m(level: u8) -> f64 {
    debug_assert!((1..=10).contains(&level));
    let degrees = match level {
        1 => 4.0,
        _ => GRID_SIZES_SECONDS[level as usize].0 / 3600.0,
    };
    EARTH_EQUATOR_CIRCUMFERENCE / 360.0 * degrees
}

/// Checks a refinement level against the supported 1-10 range.
pub(crate) fn validate_level(level: u8) -> Result<(), BeiDouGridError> {
    if (1..=10).contains(&level) {
        Ok(())
    } else {
        Err(BeiDouGridError::InvalidArgument(format!(
            "level must be between 1 and 10, got {}",
            level
        )))
    }
}
