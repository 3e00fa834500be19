use crate::constants::{GRID_DIVISIONS, GRID_SIZES_DEGREES};
use crate::coord::GeoPoint;
use crate::decoder::{code_level_2d, code_level_3d, decode_2d, decode_height_parts, extract_2d_code};
use crate::encoder::{compose_3d, encode_2d};
use crate::error::BeiDouGridError;
use crate::height;
use crate::hemisphere::Hemisphere;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;

/// Enumerates the 2D codes of all children one level below a parent cell.
///
/// The child count is exactly the level-(L+1) fan-out product. Fails with
/// `InvalidArgument` for a level-10 parent.
///
/// # Example
///
/// ```
/// use beidou_grid_rs::child_codes_2d;
///
/// # fn main() -> Result<(), beidou_grid_rs::BeiDouGridError> {
/// let children = child_codes_2d("N31A")?;
/// assert_eq!(children.len(), 12 * 8);
/// # Ok(())
/// # }
/// ```
pub fn child_codes_2d(parent: &str) -> Result<HashSet<String>, BeiDouGridError> {
    let level = code_level_2d(parent)?;
    if level >= 10 {
        return Err(BeiDouGridError::InvalidArgument(
            "level-10 cells have no children".to_string(),
        ));
    }

    let anchor = decode_2d(parent)?;
    let hemisphere = Hemisphere::from_code(parent)?;
    let (lng_divisions, lat_divisions) = GRID_DIVISIONS[level as usize + 1];
    let (lng_size, lat_size) = GRID_SIZES_DEGREES[level as usize + 1];
    let lng_size = lng_size.to_f64().unwrap_or(0.0);
    let lat_size = lat_size.to_f64().unwrap_or(0.0);

    let mut children = HashSet::with_capacity((lng_divisions * lat_divisions) as usize);
    for i in 0..lng_divisions {
        // Step away from the anchor corner, toward the cell interior.
        let lng = anchor.longitude()
            + hemisphere.lng_sign() * (i as f64 * lng_size + lng_size / 2.0);
        for j in 0..lat_divisions {
            let lat = anchor.latitude()
                + hemisphere.lat_sign() * (j as f64 * lat_size + lat_size / 2.0);
            let centre = GeoPoint::new_2d(lng, lat)?;
            children.insert(encode_2d(&centre, level + 1)?);
        }
    }
    Ok(children)
}

/// Enumerates the 3D codes of all children one level below a parent cell.
///
/// Horizontal children follow [`child_codes_2d`]; vertically, the parent's
/// slab splits into `2^bits(L+1)` child slabs, one per value of the child
/// level's height fragment.
pub fn child_codes_3d(parent: &str) -> Result<HashSet<String>, BeiDouGridError> {
    let level = code_level_3d(parent)?;
    if level >= 10 {
        return Err(BeiDouGridError::InvalidArgument(
            "level-10 cells have no children".to_string(),
        ));
    }

    let (negative, magnitude) = decode_height_parts(parent, level)?;
    let parent_2d = extract_2d_code(parent)?;
    let children_2d = child_codes_2d(&parent_2d)?;

    let parent_step = height::slab_step(level);
    let child_step = height::slab_step(level + 1);
    let base = magnitude - magnitude % parent_step;

    let slab_count = (parent_step / child_step) as usize;
    let mut children = HashSet::with_capacity(children_2d.len() * slab_count);
    for child_2d in &children_2d {
        let mut slab = base;
        while slab < base + parent_step {
            children.insert(compose_3d(child_2d, negative, slab, level + 1));
            slab += child_step;
        }
    }
    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode_3d;
    use crate::encoder::encode_3d;

    #[test]
    fn test_child_count_matches_fan_out() -> Result<(), BeiDouGridError> {
        let parent = encode_2d(&GeoPoint::new_2d(116.391, 39.913)?, 2)?;
        let children = child_codes_2d(&parent)?;
        let (lng, lat) = GRID_DIVISIONS[3];
        assert_eq!(children.len(), (lng * lat) as usize);
        Ok(())
    }

    #[test]
    fn test_children_are_one_level_deeper_and_inside_parent() -> Result<(), BeiDouGridError> {
        use crate::cell::GridCell;
        let parent = "N50J47";
        let parent_cell = GridCell::from_code(parent)?;
        for child in child_codes_2d(parent)? {
            assert_eq!(code_level_2d(&child)?, 3);
            let corner = decode_2d(&child)?;
            assert!(parent_cell.contains(&corner), "child {}", child);
        }
        Ok(())
    }

    #[test]
    fn test_children_in_every_hemisphere() -> Result<(), BeiDouGridError> {
        for (lng, lat) in [(116.4, 39.9), (-116.4, 39.9), (116.4, -39.9), (-116.4, -39.9)] {
            let parent = encode_2d(&GeoPoint::new_2d(lng, lat)?, 3)?;
            let children = child_codes_2d(&parent)?;
            let (dl, dt) = GRID_DIVISIONS[4];
            assert_eq!(children.len(), (dl * dt) as usize, "parent {}", parent);
            // Every child keeps the parent as its code prefix.
            for child in &children {
                assert!(child.starts_with(&parent), "{} not under {}", child, parent);
            }
        }
        Ok(())
    }

    #[test]
    fn test_level_10_has_no_children() -> Result<(), BeiDouGridError> {
        let parent = encode_2d(&GeoPoint::new_2d(116.391, 39.913)?, 10)?;
        assert!(matches!(
            child_codes_2d(&parent),
            Err(BeiDouGridError::InvalidArgument(_))
        ));
        Ok(())
    }

    #[test]
    fn test_child_codes_3d_count_and_levels() -> Result<(), BeiDouGridError> {
        let parent = "N050J0047050";
        let children = child_codes_3d(parent)?;
        let (dl, dt) = GRID_DIVISIONS[4];
        let slabs = (height::slab_step(3) / height::slab_step(4)) as usize;
        assert_eq!(slabs, 16);
        assert_eq!(children.len(), (dl * dt) as usize * slabs);
        for child in &children {
            assert_eq!(code_level_3d(child)?, 4);
        }
        Ok(())
    }

    #[test]
    fn test_child_slabs_tile_the_parent_slab() -> Result<(), BeiDouGridError> {
        use crate::cell::GridCell3D;
        let parent = encode_3d(&GeoPoint::new(116.391, 39.913, 50.0)?, 8)?;
        let parent_cell = GridCell3D::from_code(&parent)?;
        let mut min_seen = f64::MAX;
        let mut max_seen = f64::MIN;
        for child in child_codes_3d(&parent)? {
            let cell = GridCell3D::from_code(&child)?;
            min_seen = min_seen.min(cell.min_height);
            max_seen = max_seen.max(cell.max_height);
            assert!(cell.min_height >= parent_cell.min_height - 1e-9);
            assert!(cell.max_height <= parent_cell.max_height + 1e-9);
        }
        assert!((min_seen - parent_cell.min_height).abs() < 1e-9);
        assert!((max_seen - parent_cell.max_height).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn test_child_3d_corner_decodes_inside_parent_band() -> Result<(), BeiDouGridError> {
        let parent = "N050J0047050";
        let parent_corner = decode_3d(parent)?;
        for child in child_codes_3d(parent)? {
            let corner = decode_3d(&child)?;
            assert!(corner.height() >= parent_corner.height() - 1e-9);
        }
        Ok(())
    }
}
