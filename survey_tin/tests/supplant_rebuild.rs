//! Full-rebuild behavior: region preservation with the default solver and
//! attribute propagation onto Steiner vertices with a solver that adds one.

use survey_tin::error::Result;
use survey_tin::geometry::Point;
use survey_tin::mesh::{Triangle, Vertex};
use survey_tin::refine::supplant;
use survey_tin::triangulate::{CdtSolver, Triangulation, Triangulator};
use survey_tin::TinMesh;

fn square_with_depths() -> TinMesh {
    let mut vertices = vec![
        Vertex::with_z(0.0, 0.0, 10.0),
        Vertex::with_z(1.0, 0.0, 20.0),
        Vertex::with_z(1.0, 1.0, 30.0),
        Vertex::with_z(0.0, 1.0, 40.0),
    ];
    for (i, v) in vertices.iter_mut().enumerate() {
        v.attrs
            .insert("quality".to_string(), Some((i + 1) as f64));
    }
    // No quality reading at the last corner.
    vertices[3].attrs.insert("quality".to_string(), None);
    TinMesh::new(
        vertices,
        vec![Triangle::new(0, 1, 2), Triangle::new(0, 2, 3)],
    )
}

#[test]
fn rebuild_preserves_region_and_vertices() {
    let mesh = square_with_depths();
    let out = supplant(&mesh, false, &CdtSolver).unwrap();
    assert_eq!(out.vertices.len(), 4);
    assert_eq!(out.vertices[2].z, Some(30.0));
    assert!((out.total_area() - 1.0).abs() < 1e-9);
    // The constraint segments end up on the result.
    assert_eq!(out.segments.as_ref().unwrap().len(), 4);
}

#[test]
fn rebuild_with_existing_boundary_skips_hull() {
    let mesh = square_with_depths();
    let out = supplant(&mesh, true, &CdtSolver).unwrap();
    assert!((out.total_area() - 1.0).abs() < 1e-9);
}

/// Solver that fans the square around one Steiner vertex at the centroid,
/// standing in for a constrained triangulator that refines constraints.
struct FanSolver;

impl Triangulator for FanSolver {
    fn delaunay(&self, points: &[Point]) -> Result<Vec<[usize; 3]>> {
        CdtSolver.delaunay(points)
    }

    fn constrained(
        &self,
        points: &[Point],
        _segments: &[(usize, usize)],
        _region_markers: &[Point],
    ) -> Result<Triangulation> {
        let mut all = points.to_vec();
        let steiner = all.len();
        all.push(Point::new(0.5, 0.5));
        Ok(Triangulation {
            points: all,
            triangles: vec![
                [0, 1, steiner],
                [1, 2, steiner],
                [2, 3, steiner],
                [3, 0, steiner],
            ],
        })
    }
}

#[test]
fn steiner_vertex_gets_inverse_distance_attributes() {
    let mesh = square_with_depths();
    let out = supplant(&mesh, false, &FanSolver).unwrap();
    assert_eq!(out.vertices.len(), 5);
    assert_eq!(out.triangles.len(), 4);
    assert!((out.total_area() - 1.0).abs() < 1e-9);

    let steiner = &out.vertices[4];
    assert_eq!(steiner.x, 0.5);
    // All four corners are equidistant, so the weights are equal.
    let z = steiner.z.unwrap();
    assert!((z - 25.0).abs() < 1e-9);
    // The missing corner reading contributes nothing instead of poisoning
    // the average: mean of 1, 2, 3.
    let quality = steiner.attrs.get("quality").unwrap().unwrap();
    assert!((quality - 2.0).abs() < 1e-9);
}

#[test]
fn rebuild_splits_hull_edges_at_collinear_vertices() {
    // Square whose bottom edge carries a midpoint vertex. The hull skips
    // the midpoint, so the raw hull edge would run straight over it and the
    // solver would reject the constraint; the rebuild must hand the solver
    // the two half edges instead.
    let vertices = vec![
        Vertex::new(0.0, 0.0),
        Vertex::new(1.0, 0.0),
        Vertex::new(1.0, 1.0),
        Vertex::new(0.0, 1.0),
        Vertex::new(0.5, 0.0),
    ];
    let triangles = vec![
        Triangle::new(0, 4, 3),
        Triangle::new(4, 2, 3),
        Triangle::new(4, 1, 2),
    ];
    let mesh = TinMesh::new(vertices, triangles);
    let out = supplant(&mesh, false, &CdtSolver).unwrap();
    assert_eq!(out.vertices.len(), 5);
    assert!((out.total_area() - 1.0).abs() < 1e-9);
    let segments = out.segments.unwrap();
    assert!(!segments.iter().any(|s| s.canonical() == (0, 1)));
    assert!(segments.iter().any(|s| s.canonical() == (0, 4)));
    assert!(segments.iter().any(|s| s.canonical() == (1, 4)));
}

#[test]
fn rebuild_keeps_interior_holes_uncovered() {
    // A 3x1 strip of squares with the middle square missing; the rebuild
    // must not fill the gap even though the hull covers it.
    let vertices = vec![
        Vertex::new(0.0, 0.0),
        Vertex::new(1.0, 0.0),
        Vertex::new(1.0, 1.0),
        Vertex::new(0.0, 1.0),
        Vertex::new(2.0, 0.0),
        Vertex::new(3.0, 0.0),
        Vertex::new(3.0, 1.0),
        Vertex::new(2.0, 1.0),
    ];
    let triangles = vec![
        Triangle::new(0, 1, 2),
        Triangle::new(0, 2, 3),
        Triangle::new(4, 5, 6),
        Triangle::new(4, 6, 7),
    ];
    let mesh = TinMesh::new(vertices, triangles);
    let out = supplant(&mesh, true, &CdtSolver).unwrap();
    assert!((out.total_area() - 2.0).abs() < 1e-9);
}
