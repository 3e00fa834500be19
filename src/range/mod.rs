//! Range queries: find all grid codes at a level whose cells intersect a
//! planar geometry, optionally restricted to a height band.

mod predicates;

use crate::cell::GridCell;
use crate::children::child_codes_2d;
use crate::constants::{grid_size_3d_m, validate_level, GRID_SIZES_DEGREES};
use crate::coord::GeoPoint;
use crate::encoder::{compose_3d, encode_2d, encode_3d};
use crate::error::BeiDouGridError;
use crate::height;
use geo::{BoundingRect, Intersects};
use geo_types::{Geometry, Rect};
use rayon::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;
use tracing::debug;

/// Finds all 2D codes at `level` whose cells intersect the geometry, by
/// sweeping the geometry's bounding box at the target resolution.
///
/// Candidate cells that fail to encode or decode (outside the coordinate
/// domain, polar caps) are rejected individually; only top-level argument
/// errors abort the query. The returned set is unordered.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::{find_2d_codes, parse_geometry};
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let geom = parse_geometry("POINT(116.391 39.913)")?;
/// let codes = find_2d_codes(&geom, 2)?;
/// assert!(codes.contains("N50J47"));
/// # Ok(())
/// # }
/// ```
pub fn find_2d_codes(
    geom: &Geometry<f64>,
    level: u8,
) -> Result<HashSet<String>, BeiDouGridError> {
    validate_level(level)?;
    let bbox = bounding_box(geom)?;

    let (lng_size, lat_size) = GRID_SIZES_DEGREES[level as usize];
    let lng_size = lng_size.to_f64().unwrap_or(f64::MAX);
    let lat_size = lat_size.to_f64().unwrap_or(f64::MAX);

    let mut result = HashSet::new();
    let mut lng = bbox.min().x;
    while lng <= bbox.max().x + lng_size {
        let mut lat = bbox.min().y;
        while lat <= bbox.max().y + lat_size {
            match candidate_code(lng, lat, level) {
                Ok(code) => {
                    if cell_intersects(&code, geom, &bbox) {
                        result.insert(code);
                    }
                }
                Err(error) => {
                    debug!(lng, lat, %error, "candidate cell rejected");
                }
            }
            lat += lat_size;
        }
        lng += lng_size;
    }
    Ok(result)
}

/// Finds all 2D codes at `target_level` whose cells intersect the
/// geometry, by refining intersecting level-1 cells through their
/// children. Level-1 branches are processed in parallel.
///
/// Produces the same set as [`find_2d_codes`]; preferable for large
/// geometries at deep levels, where whole coarse cells can be discarded
/// early.
pub fn find_2d_codes_refined(
    geom: &Geometry<f64>,
    target_level: u8,
) -> Result<HashSet<String>, BeiDouGridError> {
    validate_level(target_level)?;
    let bbox = bounding_box(geom)?;

    let result = level1_candidates(geom, &bbox)
        .into_par_iter()
        .map(|code| {
            let mut branch = HashSet::new();
            refine(&code, geom, &bbox, target_level, 1, &mut branch);
            branch
        })
        .reduce(HashSet::new, |mut merged, branch| {
            merged.extend(branch);
            merged
        });
    Ok(result)
}

/// Finds all 3D codes at `level` whose cells intersect the geometry and
/// whose height slab overlaps `[min_height, max_height]`.
///
/// The horizontal candidates come from [`find_2d_codes`]; the vertical
/// slabs are walked in units of the level's height-fragment step and kept
/// when `slab_max > min_height && slab_min < max_height`, with slab bounds
/// taken from the logarithmic height mapping.
pub fn find_3d_codes(
    geom: &Geometry<f64>,
    level: u8,
    min_height: f64,
    max_height: f64,
) -> Result<HashSet<String>, BeiDouGridError> {
    validate_level(level)?;
    if !min_height.is_finite() || !max_height.is_finite() {
        return Err(BeiDouGridError::InvalidArgument(
            "height band must be finite".to_string(),
        ));
    }
    if min_height > max_height {
        return Err(BeiDouGridError::InvalidArgument(format!(
            "minimum height {} exceeds maximum height {}",
            min_height, max_height
        )));
    }

    let base = find_2d_codes(geom, level)?;
    let slabs = slab_keys(level, min_height, max_height)?;

    let mut result = HashSet::with_capacity(base.len() * slabs.len());
    for code_2d in &base {
        for &(negative, magnitude) in &slabs {
            let (slab_min, slab_max) = height::slab_bounds(magnitude, negative, level);
            if slab_max > min_height && slab_min < max_height {
                result.insert(compose_3d(code_2d, negative, magnitude, level));
            }
        }
    }
    Ok(result)
}

/// Codes of the cells a 3D polyline passes through, in path order with
/// consecutive duplicates removed.
///
/// The line is densified so consecutive samples are no further apart than
/// the level's metric cell width; cells clipped by a segment shorter than
/// that spacing can still be skipped, as in any sampling scheme.
pub fn find_3d_codes_along_line(
    points: &[GeoPoint],
    level: u8,
) -> Result<Vec<String>, BeiDouGridError> {
    validate_level(level)?;
    if points.len() < 2 {
        return Err(BeiDouGridError::InvalidArgument(
            "a polyline needs at least two points".to_string(),
        ));
    }

    let spacing = grid_size_3d_m(level);
    let mut codes: Vec<String> = Vec::new();
    for sample in fill_line(points, spacing)? {
        let code = encode_3d(&sample, level)?;
        if codes.last() != Some(&code) {
            codes.push(code);
        }
    }
    Ok(codes)
}

/// Tests whether the cell named by `code` intersects the geometry. Decode
/// failures count as "not a member", logged at debug level.
pub(crate) fn cell_intersects(code: &str, geom: &Geometry<f64>, bbox: &Rect<f64>) -> bool {
    let cell = match GridCell::from_code(code) {
        Ok(cell) => cell,
        Err(error) => {
            debug!(code, %error, "candidate cell rejected");
            return false;
        }
    };
    let rect = cell.to_rect();

    // Disjoint bounding boxes reject before any per-type work.
    if rect.max().x < bbox.min().x
        || rect.min().x > bbox.max().x
        || rect.max().y < bbox.min().y
        || rect.min().y > bbox.max().y
    {
        return false;
    }

    match geom {
        Geometry::Point(point) => predicates::point_in_rect(point.0, &rect),
        Geometry::Line(line) => predicates::segment_intersects_rect(line.start, line.end, &rect),
        Geometry::LineString(line) => predicates::line_intersects_rect(line, &rect),
        Geometry::Polygon(polygon) => predicates::polygon_intersects_rect(polygon, &rect),
        other => other.intersects(&cell.to_polygon()),
    }
}

fn bounding_box(geom: &Geometry<f64>) -> Result<Rect<f64>, BeiDouGridError> {
    geom.bounding_rect().ok_or_else(|| {
        BeiDouGridError::InvalidArgument("geometry has no extent".to_string())
    })
}

fn candidate_code(lng: f64, lat: f64, level: u8) -> Result<String, BeiDouGridError> {
    encode_2d(&GeoPoint::new_2d(lng, lat)?, level)
}

/// Level-1 cells whose rectangles meet the bounding box and whose cells
/// intersect the geometry, identified by encoding each cell centre.
fn level1_candidates(geom: &Geometry<f64>, bbox: &Rect<f64>) -> Vec<String> {
    let min_lng_idx = (bbox.min().x / 6.0).floor() as i64;
    let max_lng_idx = (bbox.max().x / 6.0).floor() as i64;
    let min_lat_idx = (bbox.min().y / 4.0).floor() as i64;
    let max_lat_idx = (bbox.max().y / 4.0).floor() as i64;

    let mut candidates = Vec::new();
    for lng_idx in min_lng_idx..=max_lng_idx {
        for lat_idx in min_lat_idx..=max_lat_idx {
            let centre_lng = lng_idx as f64 * 6.0 + 3.0;
            let centre_lat = lat_idx as f64 * 4.0 + 2.0;
            match candidate_code(centre_lng, centre_lat, 1) {
                Ok(code) => {
                    if cell_intersects(&code, geom, bbox) {
                        candidates.push(code);
                    }
                }
                Err(error) => {
                    debug!(centre_lng, centre_lat, %error, "level-1 candidate rejected");
                }
            }
        }
    }
    candidates
}

fn refine(
    code: &str,
    geom: &Geometry<f64>,
    bbox: &Rect<f64>,
    target_level: u8,
    current_level: u8,
    accepted: &mut HashSet<String>,
) {
    if current_level == target_level {
        accepted.insert(code.to_string());
        return;
    }
    let children = match child_codes_2d(code) {
        Ok(children) => children,
        Err(error) => {
            debug!(code, %error, "child enumeration rejected");
            return;
        }
    };
    for child in children {
        if cell_intersects(&child, geom, bbox) {
            refine(&child, geom, bbox, target_level, current_level + 1, accepted);
        }
    }
}

/// Quantised `(negative, magnitude)` slab keys covering a height band at a
/// level.
fn slab_keys(
    level: u8,
    min_height: f64,
    max_height: f64,
) -> Result<Vec<(bool, u32)>, BeiDouGridError> {
    let n_low = height::height_to_n(min_height)?;
    let n_high = height::height_to_n(max_height)?;
    let step = height::slab_step(level);
    let quantise = |magnitude: u32| magnitude - magnitude % step;

    let mut keys = Vec::new();
    if n_low < 0 {
        let largest = quantise(n_low.unsigned_abs() as u32);
        let smallest = if n_high < 0 {
            quantise(n_high.unsigned_abs() as u32)
        } else {
            0
        };
        let mut magnitude = smallest;
        while magnitude <= largest {
            keys.push((true, magnitude));
            magnitude += step;
        }
    }
    if n_high >= 0 {
        let smallest = if n_low >= 0 {
            quantise(n_low as u32)
        } else {
            0
        };
        let largest = quantise(n_high as u32);
        let mut magnitude = smallest;
        while magnitude <= largest {
            keys.push((false, magnitude));
            magnitude += step;
        }
    }
    Ok(keys)
}

/// Densifies a 3D polyline so consecutive samples are at most `spacing`
/// metres apart (straight-line distance).
fn fill_line(points: &[GeoPoint], spacing: f64) -> Result<Vec<GeoPoint>, BeiDouGridError> {
    let mut filled = Vec::with_capacity(points.len());
    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let distance = start.distance_to(&end);
        // An exact multiple of the spacing would land the last inserted
        // sample on the end vertex; drop it so vertices stay unique.
        let inserted = if distance % spacing == 0.0 {
            (distance / spacing) as i64 - 1
        } else {
            (distance / spacing) as i64
        };

        filled.push(start);
        for j in 1..=inserted {
            let t = j as f64 / (inserted + 1) as f64;
            filled.push(GeoPoint::new(
                start.longitude() + (end.longitude() - start.longitude()) * t,
                start.latitude() + (end.latitude() - start.latitude()) * t,
                start.height() + (end.height() - start.height()) * t,
            )?);
        }
    }
    filled.push(points[points.len() - 1]);
    Ok(filled)
}
