//! Fast math intersection predicates between a grid cell rectangle and a
//! geometry, avoiding general-purpose geometry algebra in the hot loop.

use geo_types::{Coord, LineString, Polygon, Rect};

const OUT_LEFT: u8 = 1;
const OUT_RIGHT: u8 = 2;
const OUT_BOTTOM: u8 = 4;
const OUT_TOP: u8 = 8;

/// Inclusive point-in-rectangle test.
pub(crate) fn point_in_rect(point: Coord<f64>, rect: &Rect<f64>) -> bool {
    point.x >= rect.min().x
        && point.x <= rect.max().x
        && point.y >= rect.min().y
        && point.y <= rect.max().y
}

/// Line/rectangle test: any segment of the line string accepted by the
/// Cohen-Sutherland outcode filter counts as a hit.
pub(crate) fn line_intersects_rect(line: &LineString<f64>, rect: &Rect<f64>) -> bool {
    line.0
        .windows(2)
        .any(|pair| segment_intersects_rect(pair[0], pair[1], rect))
}

/// Segment/rectangle test via Cohen-Sutherland region outcodes: the
/// segment is accepted when the two endpoint outcodes share no region bit.
pub(crate) fn segment_intersects_rect(p1: Coord<f64>, p2: Coord<f64>, rect: &Rect<f64>) -> bool {
    out_code(p1, rect) & out_code(p2, rect) == 0
}

fn out_code(point: Coord<f64>, rect: &Rect<f64>) -> u8 {
    let mut code = 0;
    if point.x < rect.min().x {
        code |= OUT_LEFT;
    }
    if point.x > rect.max().x {
        code |= OUT_RIGHT;
    }
    if point.y < rect.min().y {
        code |= OUT_BOTTOM;
    }
    if point.y > rect.max().y {
        code |= OUT_TOP;
    }
    code
}

/// Polygon/rectangle test: a polygon vertex inside the rectangle, a
/// rectangle corner inside the polygon, or any polygon edge crossing a
/// rectangle edge.
pub(crate) fn polygon_intersects_rect(polygon: &Polygon<f64>, rect: &Rect<f64>) -> bool {
    for ring in rings(polygon) {
        if ring.coords().any(|&c| point_in_rect(c, rect)) {
            return true;
        }
    }

    let corners = [
        Coord { x: rect.min().x, y: rect.min().y },
        Coord { x: rect.max().x, y: rect.min().y },
        Coord { x: rect.max().x, y: rect.max().y },
        Coord { x: rect.min().x, y: rect.max().y },
    ];
    if corners.iter().any(|&c| point_in_polygon(c, polygon)) {
        return true;
    }

    rings(polygon).any(|ring| line_intersects_rect(ring, rect))
}

/// Even-odd ray cast across every ring, so interior-ring holes are
/// excluded.
pub(crate) fn point_in_polygon(point: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    let mut inside = false;
    for ring in rings(polygon) {
        let coords = &ring.0;
        let mut j = coords.len().saturating_sub(1);
        for i in 0..coords.len() {
            let (a, b) = (coords[i], coords[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
    }
    inside
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors().iter())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{coord, polygon};

    fn unit_rect() -> Rect<f64> {
        Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 })
    }

    #[test]
    fn test_point_in_rect_inclusive_edges() {
        let rect = unit_rect();
        assert!(point_in_rect(coord! { x: 0.5, y: 0.5 }, &rect));
        assert!(point_in_rect(coord! { x: 0.0, y: 0.0 }, &rect));
        assert!(point_in_rect(coord! { x: 1.0, y: 1.0 }, &rect));
        assert!(!point_in_rect(coord! { x: 1.1, y: 0.5 }, &rect));
    }

    #[test]
    fn test_segment_outcode_filter() {
        let rect = unit_rect();
        // Crossing segment.
        assert!(segment_intersects_rect(
            coord! { x: -1.0, y: 0.5 },
            coord! { x: 2.0, y: 0.5 },
            &rect
        ));
        // Fully left of the rectangle.
        assert!(!segment_intersects_rect(
            coord! { x: -2.0, y: 0.0 },
            coord! { x: -1.0, y: 1.0 },
            &rect
        ));
        // Both endpoints outside but in different regions.
        assert!(segment_intersects_rect(
            coord! { x: -1.0, y: -1.0 },
            coord! { x: 2.0, y: 2.0 },
            &rect
        ));
    }

    #[test]
    fn test_line_intersects_rect() {
        let rect = unit_rect();
        let crossing = LineString::from(vec![(-1.0, 0.5), (0.5, 0.5), (2.0, 0.5)]);
        assert!(line_intersects_rect(&crossing, &rect));
        let outside = LineString::from(vec![(-2.0, -2.0), (-1.5, -1.5)]);
        assert!(!line_intersects_rect(&outside, &rect));
    }

    #[test]
    fn test_polygon_vertex_inside_rect() {
        let rect = unit_rect();
        let poly = polygon![
            (x: 0.5, y: 0.5),
            (x: 3.0, y: 0.5),
            (x: 3.0, y: 3.0),
            (x: 0.5, y: 0.5),
        ];
        assert!(polygon_intersects_rect(&poly, &rect));
    }

    #[test]
    fn test_rect_fully_inside_polygon() {
        let rect = unit_rect();
        let poly = polygon![
            (x: -5.0, y: -5.0),
            (x: 5.0, y: -5.0),
            (x: 5.0, y: 5.0),
            (x: -5.0, y: 5.0),
            (x: -5.0, y: -5.0),
        ];
        assert!(polygon_intersects_rect(&poly, &rect));
    }

    #[test]
    fn test_polygon_disjoint_from_rect() {
        let rect = unit_rect();
        let poly = polygon![
            (x: 2.0, y: 2.0),
            (x: 3.0, y: 2.0),
            (x: 3.0, y: 3.0),
            (x: 2.0, y: 2.0),
        ];
        assert!(!polygon_intersects_rect(&poly, &rect));
    }

    #[test]
    fn test_polygon_edge_crosses_rect_without_vertices_inside() {
        let rect = unit_rect();
        // A thin triangle slicing through the rectangle, all vertices out.
        let poly = polygon![
            (x: -1.0, y: 0.4),
            (x: 2.0, y: 0.5),
            (x: -1.0, y: 0.6),
            (x: -1.0, y: 0.4),
        ];
        assert!(polygon_intersects_rect(&poly, &rect));
    }

    #[test]
    fn test_point_in_polygon_respects_holes() {
        let shell = LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (4.0, 4.0),
            (6.0, 4.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 4.0),
        ]);
        let poly = Polygon::new(shell, vec![hole]);
        assert!(point_in_polygon(coord! { x: 2.0, y: 2.0 }, &poly));
        assert!(!point_in_polygon(coord! { x: 5.0, y: 5.0 }, &poly));
        assert!(!point_in_polygon(coord! { x: 12.0, y: 5.0 }, &poly));
    }
}
