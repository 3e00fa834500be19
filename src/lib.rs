//! # beidou-grid-rs
//!
//! Rust implementation of the BeiDou Grid Location Code from GB/T
//! 39409-2020: a hierarchical textual encoding naming rectangular cells on
//! the Earth's surface (2D) or boxes in Earth-centred space (3D) at ten
//! refinement levels.
//!
//! ## Core operations
//!
//! ### Encoding
//!
//! ```
//! use beidou_grid_rs::{encode_2d, encode_3d, GeoPoint};
//!
//! # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
//! let point = GeoPoint::new(116.391, 39.913, 50.0)?;
//!
//! // 2D: hemisphere letter + one fragment per level.
//! assert_eq!(encode_2d(&point, 5)?, "N50J475846B");
//!
//! // 3D: height sign digit and per-level height fragments interleaved.
//! let code3d = encode_3d(&point, 5)?;
//! assert_eq!(code3d.len(), 18);
//! # Ok(())
//! # }
//! ```
//!
//! ### Decoding
//!
//! ```
//! use beidou_grid_rs::{decode_2d, GridCell};
//!
//! # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
//! // The anchor corner of the cell (its SW corner in the NE hemisphere).
//! let corner = decode_2d("N31A")?;
//! assert_eq!((corner.longitude(), corner.latitude()), (0.0, 0.0));
//!
//! // Or the whole cell with signed bounds and a polygon footprint.
//! let cell = GridCell::from_code("N50J47")?;
//! assert!((cell.max_longitude - cell.min_longitude - 0.5).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ### Hierarchy and coverage
//!
//! ```no_run
//! use beidou_grid_rs::{child_codes_2d, find_2d_codes, parse_geometry};
//!
//! # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
//! // All 96 level-2 children of a level-1 cell.
//! let children = child_codes_2d("N50J")?;
//!
//! // All level-6 cells intersecting a polygon.
//! let geom = parse_geometry(r#"{"type":"Polygon","coordinates":[[
//!     [116.391,39.913],[116.401,39.913],[116.401,39.923],[116.391,39.913]
//! ]]}"#)?;
//! let codes = find_2d_codes(&geom, 6)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## API reference
//!
//! | Concept                     | beidou-grid-rs                    |
//! | :-------------------------- | :-------------------------------- |
//! | Point to 2D code            | `encode_2d`                       |
//! | Point + height to 3D code   | `encode_3d`                       |
//! | Height component only       | `encode_3d_height`                |
//! | 2D code to corner point     | `decode_2d`                       |
//! | 3D code to corner + height  | `decode_3d`                       |
//! | 3D code to embedded 2D code | `extract_2d_code`                 |
//! | Code level from length      | `code_level_2d` / `code_level_3d` |
//! | Code to cell with bounds    | `GridCell` / `GridCell3D`         |
//! | Hemisphere of point or code | `Hemisphere`                      |
//! | Child cells                 | `child_codes_2d` / `child_codes_3d` |
//! | Geometry to covering codes  | `find_2d_codes` / `find_2d_codes_refined` |
//! | Geometry + height band      | `find_3d_codes`                   |
//! | 3D polyline to codes        | `find_3d_codes_along_line`        |
//! | Parse WKT / GeoJSON         | `parse_geometry`                  |
//!
//! ## Conventions
//!
//! - Longitude and latitude are WGS84 decimal degrees; heights are metres
//!   above the reference ellipsoid (radius 6 378 137 m).
//! - Decoded corners are the cell corner nearest the equator and prime
//!   meridian, which is the south-west corner in the NE hemisphere.
//! - The polar caps (|latitude| >= 88 degrees) are reserved by the
//!   standard and rejected with `UnsupportedPolar`.
//! - Encode and decode are pure and thread-safe; range queries may fan
//!   out internally but share nothing mutable with the caller.

mod cell;
mod children;
mod constants;
mod coord;
mod decoder;
mod encoder;
mod error;
mod geom;
mod height;
mod hemisphere;
mod range;

pub use cell::{GridCell, GridCell3D};
pub use children::{child_codes_2d, child_codes_3d};
pub use constants::{
    grid_size_3d_m, CODE_LENGTH_2D, CODE_LENGTH_3D, EARTH_EQUATOR_CIRCUMFERENCE, EARTH_RADIUS,
    ELEVATION_ENCODING, GRID_DIVISIONS, GRID_SIZES_DEGREES, GRID_SIZES_SECONDS, HEIGHT_BIT_RANGES,
};
pub use coord::{Coordinate, GeoPoint};
pub use decoder::{code_level_2d, code_level_3d, decode_2d, decode_3d, extract_2d_code};
pub use encoder::{encode_2d, encode_3d, encode_3d_height};
pub use error::BeiDouGridError;
pub use geom::parse_geometry;
pub use hemisphere::Hemisphere;
pub use range::{find_2d_codes, find_2d_codes_refined, find_3d_codes, find_3d_codes_along_line};

pub use geo;
pub use geo_types;
pub use rust_decimal;
