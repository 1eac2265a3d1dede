//! Mesh tables and the TIN snapshot record.
//!
//! A [`TinMesh`] is a value: operations take a snapshot and return a new one.
//! Vertex ids are positions in the vertex table and are kept dense by
//! [`crate::cleanup::reindex`] after any filtering step.

use std::collections::BTreeMap;

use crate::error::{Result, TinError};
use crate::geometry::Point;

/// Named numeric attribute columns. Missing values are explicit, there is no
/// in-band sentinel.
pub type Attributes = BTreeMap<String, Option<f64>>;

/// One row of the vertex table.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            attrs: Attributes::new(),
        }
    }

    pub fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            attrs: Attributes::new(),
        }
    }

    /// The 2D position of this vertex.
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One row of the triangle table: three vertex ids plus attribute columns.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Triangle {
    pub v: [usize; 3],
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
}

impl Triangle {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self {
            v: [a, b, c],
            attrs: Attributes::new(),
        }
    }

    /// A triangle is degenerate when two of its corners collapsed onto the
    /// same vertex id.
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.v;
        a == b || a == c || b == c
    }
}

/// An undirected boundary/constraint edge between two vertex ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    pub a: usize,
    pub b: usize,
    /// Triangle this edge was emitted from, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triangle: Option<usize>,
}

impl Segment {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            a,
            b,
            triangle: None,
        }
    }

    /// Endpoints ordered `(min, max)`, the canonical form for edge matching.
    pub fn canonical(&self) -> (usize, usize) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

/// A free-standing query or insertion point, not (yet) part of the mesh.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct QueryPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
}

impl QueryPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            attrs: Attributes::new(),
        }
    }

    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Snapshot of a triangulated irregular network.
///
/// Segment and point tables are optional components; absence is tagged by
/// `None` rather than by an empty table so that round-trips preserve which
/// tables a survey actually carried.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct TinMesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<QueryPoint>>,
    /// Coordinate reference system tag, e.g. `"EPSG:25832"`. Reprojection is
    /// a collaborator concern; the tag just travels with the mesh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
}

impl TinMesh {
    /// Creates a mesh from bare vertex and triangle tables.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<Triangle>) -> Self {
        Self {
            vertices,
            triangles,
            ..Self::default()
        }
    }

    /// Validates ingestion-level invariants: every coordinate in the vertex
    /// and point tables must be finite. Dangling triangle or segment
    /// references are reported separately by [`TinMesh::check_references`]
    /// because they are repairable.
    pub fn validate(&self) -> Result<()> {
        for (index, v) in self.vertices.iter().enumerate() {
            if !v.x.is_finite() || !v.y.is_finite() {
                return Err(TinError::NonFiniteCoordinate {
                    index,
                    x: v.x,
                    y: v.y,
                });
            }
        }
        if let Some(points) = &self.points {
            for (index, p) in points.iter().enumerate() {
                if !p.x.is_finite() || !p.y.is_finite() {
                    return Err(TinError::NonFiniteCoordinate {
                        index,
                        x: p.x,
                        y: p.y,
                    });
                }
            }
        }
        Ok(())
    }

    /// Verifies that every triangle and segment references an existing
    /// vertex. Callers that fail this check can repair the mesh with
    /// [`crate::cleanup::remove_invalid_triangles`].
    pub fn check_references(&self) -> Result<()> {
        let n = self.vertices.len();
        for (triangle, t) in self.triangles.iter().enumerate() {
            for &vertex in &t.v {
                if vertex >= n {
                    return Err(TinError::DanglingVertex { triangle, vertex });
                }
            }
        }
        if let Some(segments) = &self.segments {
            for s in segments {
                for vertex in [s.a, s.b] {
                    if vertex >= n {
                        return Err(TinError::DanglingSegment { vertex });
                    }
                }
            }
        }
        Ok(())
    }

    /// Sum of the areas of all triangles, in coordinate units squared.
    pub fn total_area(&self) -> f64 {
        use crate::geometry::polygon_area;
        self.triangles
            .iter()
            .map(|t| {
                polygon_area(&[
                    self.vertices[t.v[0]].point(),
                    self.vertices[t.v[1]].point(),
                    self.vertices[t.v[2]].point(),
                ])
            })
            .sum()
    }
}
