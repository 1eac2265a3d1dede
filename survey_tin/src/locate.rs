//! Point-in-triangle location with bounding-box pruning.
//!
//! Query points are processed in fixed-size batches so that large surveys
//! never materialize a points-by-triangles matrix. Results are independent of
//! the batch size: each point is resolved on its own against the triangle
//! list in table order.

use log::debug;

use crate::error::{Result, TinError};
use crate::geometry::{Bbox, Point};
use crate::mesh::{QueryPoint, Triangle, Vertex};

/// Points per processing batch.
const BATCH_SIZE: usize = 4096;

/// Exact containment test via the Gram-matrix barycentric solve.
///
/// The half-open convention (`u >= 0 && v >= 0 && u + v < 1`) attributes a
/// point on a shared edge asymmetrically; when both incident triangles still
/// accept it, the first one in table order wins. Degenerate triangles reject
/// every point (the denominator inverts to a non-finite value and all
/// comparisons fail).
fn point_in_triangle(p: Point, a: Point, b: Point, c: Point) -> bool {
    let v0 = (c.x - a.x, c.y - a.y);
    let v1 = (b.x - a.x, b.y - a.y);
    let v2 = (p.x - a.x, p.y - a.y);
    let dot00 = v0.0 * v0.0 + v0.1 * v0.1;
    let dot01 = v0.0 * v1.0 + v0.1 * v1.1;
    let dot02 = v0.0 * v2.0 + v0.1 * v2.1;
    let dot11 = v1.0 * v1.0 + v1.1 * v1.1;
    let dot12 = v1.0 * v2.0 + v1.1 * v2.1;
    let inv_denom = 1.0 / (dot00 * dot11 - dot01 * dot01);
    let u = (dot11 * dot02 - dot01 * dot12) * inv_denom;
    let v = (dot00 * dot12 - dot01 * dot02) * inv_denom;
    u >= 0.0 && v >= 0.0 && u + v < 1.0
}

/// Locates each query point in at most one triangle.
///
/// Returns one entry per point: `Some(triangle_id)` for the first triangle
/// (in table order) that contains the point, `None` when no triangle does.
/// Points outside the mesh coverage are a normal case, not an error. The
/// exact test only runs on triangles whose bounding box contains the point.
pub fn points_in_triangles(
    points: &[QueryPoint],
    vertices: &[Vertex],
    triangles: &[Triangle],
) -> Result<Vec<Option<usize>>> {
    let mut corners = Vec::with_capacity(triangles.len());
    let mut boxes = Vec::with_capacity(triangles.len());
    for (index, t) in triangles.iter().enumerate() {
        let mut abc = [Point::new(0.0, 0.0); 3];
        for (slot, &v) in abc.iter_mut().zip(&t.v) {
            *slot = vertices
                .get(v)
                .ok_or(TinError::DanglingVertex {
                    triangle: index,
                    vertex: v,
                })?
                .point();
        }
        boxes.push(Bbox::of_triangle(abc[0], abc[1], abc[2]));
        corners.push(abc);
    }

    let mut matches = Vec::with_capacity(points.len());
    for batch in points.chunks(BATCH_SIZE.max(1)) {
        for p in batch {
            let p = p.point();
            let hit = boxes
                .iter()
                .enumerate()
                .filter(|(_, bb)| bb.contains(p))
                .find(|&(i, _)| point_in_triangle(p, corners[i][0], corners[i][1], corners[i][2]))
                .map(|(i, _)| i);
            matches.push(hit);
        }
    }
    debug!(
        "points_in_triangles: {} / {} points located",
        matches.iter().filter(|m| m.is_some()).count(),
        matches.len()
    );
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> (Vec<Vertex>, Vec<Triangle>) {
        (
            vec![
                Vertex::new(0.0, 0.0),
                Vertex::new(1.0, 0.0),
                Vertex::new(1.0, 1.0),
                Vertex::new(0.0, 1.0),
            ],
            vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)],
        )
    }

    #[test]
    fn centroid_locates_in_its_triangle() {
        let (v, t) = square();
        let centroid = QueryPoint::new(2.0 / 3.0, 1.0 / 3.0);
        let hits = points_in_triangles(&[centroid], &v, &t).unwrap();
        assert_eq!(hits, vec![Some(0)]);
    }

    #[test]
    fn point_outside_all_boxes_is_no_match() {
        let (v, t) = square();
        let hits = points_in_triangles(&[QueryPoint::new(5.0, 5.0)], &v, &t).unwrap();
        assert_eq!(hits, vec![None]);
    }

    #[test]
    fn shared_edge_resolves_to_first_triangle_in_order() {
        let (v, t) = square();
        // (0.5, 0.5) sits on the diagonal shared by both triangles; the
        // half-open test accepts it for the first triangle in table order.
        let hits = points_in_triangles(&[QueryPoint::new(0.5, 0.5)], &v, &t).unwrap();
        assert_eq!(hits[0], Some(0));
    }

    #[test]
    fn empty_triangle_table_yields_all_no_match() {
        let hits = points_in_triangles(&[QueryPoint::new(0.0, 0.0)], &[], &[]).unwrap();
        assert_eq!(hits, vec![None]);
    }

    #[test]
    fn degenerate_triangle_never_matches() {
        let v = vec![Vertex::new(0.0, 0.0), Vertex::new(1.0, 1.0)];
        let t = vec![Triangle::new(0, 0, 1)];
        let hits = points_in_triangles(&[QueryPoint::new(0.5, 0.5)], &v, &t).unwrap();
        assert_eq!(hits, vec![None]);
    }

    #[test]
    fn results_do_not_depend_on_batching() {
        let (v, t) = square();
        let pts: Vec<QueryPoint> = (0..100)
            .map(|i| QueryPoint::new(i as f64 * 0.017, i as f64 * 0.013))
            .collect();
        let all = points_in_triangles(&pts, &v, &t).unwrap();
        let mut chunked = Vec::new();
        for chunk in pts.chunks(7) {
            chunked.extend(points_in_triangles(chunk, &v, &t).unwrap());
        }
        assert_eq!(all, chunked);
    }
}
