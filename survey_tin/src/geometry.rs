//! 2D geometry primitives shared by the mesh algorithms.

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Returns the distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Calculates the area of a simple polygon using the shoelace formula.
pub fn polygon_area(vertices: &[Point]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        sum += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    sum.abs() * 0.5
}

/// Axis-aligned bounding box of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bbox {
    /// Bounding box of a triangle given its three corners.
    pub fn of_triangle(a: Point, b: Point, c: Point) -> Self {
        Self {
            min_x: a.x.min(b.x).min(c.x),
            min_y: a.y.min(b.y).min(c.y),
            max_x: a.x.max(b.x).max(c.x),
            max_y: a.y.max(b.y).max(c.y),
        }
    }

    /// Returns `true` if `p` lies inside or on the box.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Barycentric weights of `p` with respect to triangle `(a, b, c)`.
///
/// Returns `None` for degenerate triangles. The weights correspond to the
/// corners in the order given and sum to one.
pub fn barycentric(p: Point, a: Point, b: Point, c: Point) -> Option<(f64, f64, f64)> {
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det.abs() < f64::EPSILON {
        return None;
    }
    let u = ((b.y - c.y) * (p.x - c.x) + (c.x - b.x) * (p.y - c.y)) / det;
    let v = ((c.y - a.y) * (p.x - c.x) + (a.x - c.x) * (p.y - c.y)) / det;
    let w = 1.0 - u - v;
    Some((u, v, w))
}

/// Indices of the convex hull of `points` in counter-clockwise order,
/// computed with Andrew's monotone chain. Collinear input yields the two
/// extreme points.
pub fn convex_hull(points: &[Point]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        (points[i].x, points[i].y)
            .partial_cmp(&(points[j].x, points[j].y))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let cross = |o: usize, a: usize, b: usize| -> f64 {
        (points[a].x - points[o].x) * (points[b].y - points[o].y)
            - (points[a].y - points[o].y) * (points[b].x - points[o].x)
    };

    if order.len() < 3 {
        return order;
    }

    let mut hull: Vec<usize> = Vec::with_capacity(order.len() * 2);
    for &i in &order {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0 {
            hull.pop();
        }
        hull.push(i);
    }
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], i) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }
    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoelace_unit_square() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!((polygon_area(&square) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bbox_contains_edges() {
        let bb = Bbox::of_triangle(
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 2.0),
        );
        assert!(bb.contains(Point::new(0.0, 0.0)));
        assert!(bb.contains(Point::new(2.0, 2.0)));
        assert!(!bb.contains(Point::new(2.1, 0.0)));
    }

    #[test]
    fn barycentric_centroid() {
        let (u, v, w) = barycentric(
            Point::new(1.0 / 3.0, 1.0 / 3.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
        )
        .unwrap();
        assert!((u - 1.0 / 3.0).abs() < 1e-12);
        assert!((v - 1.0 / 3.0).abs() < 1e-12);
        assert!((w - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn barycentric_degenerate_is_none() {
        let p = Point::new(0.5, 0.5);
        let a = Point::new(0.0, 0.0);
        assert!(barycentric(p, a, a, a).is_none());
    }

    #[test]
    fn hull_of_square_with_interior_point() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
            Point::new(0.5, 0.5),
        ];
        let mut hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        hull.sort_unstable();
        assert_eq!(hull, vec![0, 1, 2, 3]);
    }
}
