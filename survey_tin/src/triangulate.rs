//! Seam to the external Delaunay / constrained-Delaunay solvers.
//!
//! The solvers are black-box collaborators: they receive coordinate arrays
//! and constraint segments and hand back index triples. Nothing here relies
//! on their output ordering. The default [`CdtSolver`] wires in the
//! `delaunator` and `cdt` crates.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::error::{Result, TinError};
use crate::geometry::{barycentric, Point};

/// Result of a constrained triangulation. `points` lists the input points in
/// their original order followed by any Steiner points the solver had to
/// introduce; `triangles` indexes into `points`.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    pub points: Vec<Point>,
    pub triangles: Vec<[usize; 3]>,
}

/// External geometric solver interface.
pub trait Triangulator {
    /// Plain Delaunay triangulation of a point set.
    fn delaunay(&self, points: &[Point]) -> Result<Vec<[usize; 3]>>;

    /// Constrained triangulation. `segments` are edges the output must
    /// contain. `region_markers` select which constrained regions survive:
    /// regions containing no marker are discarded. An empty marker list
    /// keeps everything.
    fn constrained(
        &self,
        points: &[Point],
        segments: &[(usize, usize)],
        region_markers: &[Point],
    ) -> Result<Triangulation>;
}

/// Default solver backed by `delaunator` (plain) and `cdt` (constrained).
/// `cdt` never introduces Steiner points, so the returned point list equals
/// the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdtSolver;

impl Triangulator for CdtSolver {
    fn delaunay(&self, points: &[Point]) -> Result<Vec<[usize; 3]>> {
        let coords: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&coords);
        let triangles: Vec<[usize; 3]> = triangulation
            .triangles
            .chunks(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        if triangles.is_empty() && points.len() >= 3 {
            return Err(TinError::Triangulation(
                "point set produced no triangles (collinear input?)".to_string(),
            ));
        }
        Ok(triangles)
    }

    fn constrained(
        &self,
        points: &[Point],
        segments: &[(usize, usize)],
        region_markers: &[Point],
    ) -> Result<Triangulation> {
        let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
        let tris = if segments.is_empty() {
            cdt::triangulate_points(&coords)
        } else {
            cdt::triangulate_with_edges(&coords, segments)
        }
        .map_err(|e| TinError::Triangulation(format!("{e:?}")))?;
        let mut triangles: Vec<[usize; 3]> = tris.into_iter().map(|t| [t.0, t.1, t.2]).collect();
        if !region_markers.is_empty() {
            triangles = keep_marked_regions(points, segments, triangles, region_markers);
        }
        Ok(Triangulation {
            points: points.to_vec(),
            triangles,
        })
    }
}

/// Keeps the constrained regions that contain at least one marker.
///
/// Regions are the connected components of the triangle adjacency graph when
/// crossing a constraint segment is forbidden; the flood starts at the
/// triangle containing each marker.
fn keep_marked_regions(
    points: &[Point],
    segments: &[(usize, usize)],
    triangles: Vec<[usize; 3]>,
    markers: &[Point],
) -> Vec<[usize; 3]> {
    let canonical = |a: usize, b: usize| if a <= b { (a, b) } else { (b, a) };
    let constraints: HashSet<(usize, usize)> =
        segments.iter().map(|&(a, b)| canonical(a, b)).collect();

    let mut by_edge: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (i, t) in triangles.iter().enumerate() {
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[0], t[2])] {
            by_edge.entry(canonical(a, b)).or_default().push(i);
        }
    }

    let contains = |t: &[usize; 3], p: Point| -> bool {
        match barycentric(p, points[t[0]], points[t[1]], points[t[2]]) {
            Some((u, v, w)) => u >= 0.0 && v >= 0.0 && w >= 0.0,
            None => false,
        }
    };

    let mut keep = vec![false; triangles.len()];
    let mut stack = Vec::new();
    for &marker in markers {
        match triangles.iter().position(|t| contains(t, marker)) {
            Some(seed) => stack.push(seed),
            None => debug!(
                "region marker ({}, {}) lies outside the triangulation",
                marker.x, marker.y
            ),
        }
    }
    while let Some(i) = stack.pop() {
        if keep[i] {
            continue;
        }
        keep[i] = true;
        let t = triangles[i];
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[0], t[2])] {
            let edge = canonical(a, b);
            if constraints.contains(&edge) {
                continue;
            }
            for &neighbor in &by_edge[&edge] {
                if !keep[neighbor] {
                    stack.push(neighbor);
                }
            }
        }
    }

    triangles
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| *k)
        .map(|(t, _)| t)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area;

    fn area_of(points: &[Point], triangles: &[[usize; 3]]) -> f64 {
        triangles
            .iter()
            .map(|t| polygon_area(&[points[t[0]], points[t[1]], points[t[2]]]))
            .sum()
    }

    #[test]
    fn delaunay_square_covers_unit_area() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let tris = CdtSolver.delaunay(&pts).unwrap();
        assert_eq!(tris.len(), 2);
        assert!((area_of(&pts, &tris) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn delaunay_collinear_is_error() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ];
        assert!(CdtSolver.delaunay(&pts).is_err());
    }

    #[test]
    fn markers_select_regions() {
        // Two unit squares with a gap between them; constraining both
        // outlines splits the hull into three regions. A single marker in
        // the left square keeps only that region.
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 1.0),
            Point::new(2.0, 1.0),
        ];
        let segments = vec![
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
        ];
        let markers = vec![Point::new(0.5, 0.5)];
        let result = CdtSolver.constrained(&pts, &segments, &markers).unwrap();
        assert!((area_of(&result.points, &result.triangles) - 1.0).abs() < 1e-9);
        // Every surviving triangle stays inside the left square.
        for t in &result.triangles {
            assert!(t.iter().all(|&v| v < 4));
        }
    }

    #[test]
    fn empty_markers_keep_everything() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let segments = vec![(0, 1), (1, 2), (2, 3), (3, 0)];
        let result = CdtSolver.constrained(&pts, &segments, &[]).unwrap();
        assert!((area_of(&result.points, &result.triangles) - 1.0).abs() < 1e-9);
    }
}
