use crate::error::BeiDouGridError;
use geo::CoordsIter;
use geo_types::Geometry;
use geojson::GeoJson;
use std::str::FromStr;
use wkt::Wkt;

/// Parses a geometry string and checks it against the codec's coordinate
/// domain.
///
/// GeoJSON is detected by a leading `{`; anything else is read as WKT.
/// Every vertex must satisfy the same bounds as [`crate::GeoPoint`]:
/// longitude in [-180, 180], latitude in [-90, 90], nothing NaN. A
/// geometry that parses but strays outside those bounds fails with
/// `InvalidArgument`, so range queries never sweep an impossible extent.
pub fn parse_geometry(s: &str) -> Result<Geometry<f64>, BeiDouGridError> {
    let trimmed = s.trim();
    let geometry = if trimmed.starts_with('{') {
        from_geojson(trimmed)?
    } else {
        from_wkt(trimmed)?
    };
    validate_domain(&geometry)?;
    Ok(geometry)
}

fn from_geojson(s: &str) -> Result<Geometry<f64>, BeiDouGridError> {
    let parsed: GeoJson = s
        .parse()
        .map_err(|e: geojson::Error| BeiDouGridError::GeometryParse(e.to_string()))?;

    let geometry = match parsed {
        GeoJson::Geometry(g) => Some(g),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(_) => {
            return Err(BeiDouGridError::GeometryParse(
                "pass a single geometry or feature, not a FeatureCollection".to_string(),
            ))
        }
    };
    let geometry = geometry.ok_or_else(|| {
        BeiDouGridError::GeometryParse("feature carries no geometry".to_string())
    })?;
    Geometry::try_from(geometry).map_err(|e| BeiDouGridError::GeometryParse(e.to_string()))
}

fn from_wkt(s: &str) -> Result<Geometry<f64>, BeiDouGridError> {
    let wkt: Wkt<f64> =
        Wkt::from_str(s).map_err(|e| BeiDouGridError::GeometryParse(e.to_string()))?;
    wkt.try_into()
        .map_err(|_| BeiDouGridError::GeometryParse(format!("unsupported WKT geometry: {}", s)))
}

/// Rejects geometries with vertices the grid cannot address.
fn validate_domain(geometry: &Geometry<f64>) -> Result<(), BeiDouGridError> {
    for coord in geometry.coords_iter() {
        if !coord.x.is_finite() || !(-180.0..=180.0).contains(&coord.x) {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "geometry longitude must be between -180 and 180 degrees, got {}",
                coord.x
            )));
        }
        if !coord.y.is_finite() || !(-90.0..=90.0).contains(&coord.y) {
            return Err(BeiDouGridError::InvalidArgument(format!(
                "geometry latitude must be between -90 and 90 degrees, got {}",
                coord.y
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geojson_point() -> Result<(), BeiDouGridError> {
        let json = r#"{"type":"Point","coordinates":[116.391,39.913]}"#;
        match parse_geometry(json)? {
            Geometry::Point(pt) => {
                assert!((pt.x() - 116.391).abs() < 1e-9);
                assert!((pt.y() - 39.913).abs() < 1e-9);
            }
            _ => panic!("Expected Point"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_geojson_polygon() -> Result<(), BeiDouGridError> {
        let json = r#"{"type":"Polygon","coordinates":[[[116.391,39.913],[116.401,39.913],[116.401,39.923],[116.391,39.913]]]}"#;
        match parse_geometry(json)? {
            Geometry::Polygon(poly) => {
                assert_eq!(poly.exterior().coords().count(), 4);
            }
            _ => panic!("Expected Polygon"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_geojson_feature() -> Result<(), BeiDouGridError> {
        let json = r#"{"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[116.391,39.913]}}"#;
        assert!(matches!(parse_geometry(json)?, Geometry::Point(_)));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_feature_collection_and_empty_feature() {
        let collection = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(matches!(
            parse_geometry(collection),
            Err(BeiDouGridError::GeometryParse(_))
        ));
        let bare = r#"{"type":"Feature","properties":{},"geometry":null}"#;
        assert!(matches!(
            parse_geometry(bare),
            Err(BeiDouGridError::GeometryParse(_))
        ));
    }

    #[test]
    fn test_parse_wkt_point_and_linestring() -> Result<(), BeiDouGridError> {
        match parse_geometry("POINT(116.391 39.913)")? {
            Geometry::Point(pt) => {
                assert!((pt.x() - 116.391).abs() < 1e-9);
                assert!((pt.y() - 39.913).abs() < 1e-9);
            }
            _ => panic!("Expected Point"),
        }
        match parse_geometry("LINESTRING(116.35 39.90, 116.45 39.90)")? {
            Geometry::LineString(line) => assert_eq!(line.0.len(), 2),
            _ => panic!("Expected LineString"),
        }
        Ok(())
    }

    #[test]
    fn test_parse_rejects_out_of_domain_vertices() {
        // Parses as WKT, but no grid cell can contain these vertices.
        assert!(matches!(
            parse_geometry("POINT(200.0 10.0)"),
            Err(BeiDouGridError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_geometry("LINESTRING(10.0 -95.0, 11.0 -94.0)"),
            Err(BeiDouGridError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_geometry("not a geometry").is_err());
        assert!(parse_geometry("{\"type\":\"Nope\"}").is_err());
    }
}
