//! Vertex table normalization: reindexing, tolerance-based deduplication,
//! concatenation and removal of unused or invalid entities.
//!
//! Every insertion path in [`crate::refine`] relies on the tables being
//! dense (ids `0..N-1`), which is what [`reindex`] re-establishes after any
//! filtering step.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::error::{Result, TinError};
use crate::mesh::{QueryPoint, TinMesh, Triangle, Vertex};

/// Remaps an arbitrary vertex id space to dense `0..N-1` ids, rewriting all
/// triangle references. Rows keep their relative (ascending id) order, so
/// applying `reindex` to an already dense table is the identity.
pub fn reindex(
    vertices: BTreeMap<usize, Vertex>,
    triangles: Vec<Triangle>,
) -> Result<(Vec<Vertex>, Vec<Triangle>)> {
    let mut remap = HashMap::with_capacity(vertices.len());
    let mut rows = Vec::with_capacity(vertices.len());
    for (new_id, (old_id, vertex)) in vertices.into_iter().enumerate() {
        remap.insert(old_id, new_id);
        rows.push(vertex);
    }

    let mut out = Vec::with_capacity(triangles.len());
    for (index, mut t) in triangles.into_iter().enumerate() {
        for corner in &mut t.v {
            *corner = *remap.get(corner).ok_or(TinError::DanglingVertex {
                triangle: index,
                vertex: *corner,
            })?;
        }
        out.push(t);
    }
    Ok((rows, out))
}

/// Quantization key for a coordinate pair. `precision` scales by
/// `10^precision` and floors (adding 0.5 first when `offset` rounds instead
/// of truncating); `None` groups on exact coordinates.
///
/// Buckets are the floored floats themselves, keyed by their bit patterns,
/// so coordinates of any magnitude stay distinct; an integer cast would
/// saturate and collapse everything past `i64::MAX` into one bucket.
fn quantize(x: f64, y: f64, precision: Option<i32>, offset: bool) -> (u64, u64) {
    fn bucket(v: f64) -> u64 {
        let f = v.floor();
        // +0.0 and -0.0 compare equal and must share a bucket.
        if f == 0.0 {
            0
        } else {
            f.to_bits()
        }
    }
    match precision {
        Some(p) => {
            let scale = 10f64.powi(p);
            let shift = if offset { 0.5 } else { 0.0 };
            (bucket(x * scale + shift), bucket(y * scale + shift))
        }
        None => (x.to_bits(), y.to_bits()),
    }
}

/// Merges vertices that quantize to the same coordinate bucket.
///
/// Each bucket keeps the vertex with the minimum original id as its
/// representative; output coordinates are therefore always an original input
/// vertex, never a centroid. Triangle references are rewritten to the
/// representatives, triangles that collapse onto fewer than three distinct
/// vertices are dropped, and the result is reindexed.
pub fn clean_triangles(
    vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
    precision: Option<i32>,
    offset: bool,
) -> Result<(Vec<Vertex>, Vec<Triangle>)> {
    let mut buckets: HashMap<(u64, u64), usize> = HashMap::with_capacity(vertices.len());
    let mut representative = Vec::with_capacity(vertices.len());
    for (id, v) in vertices.iter().enumerate() {
        let key = quantize(v.x, v.y, precision, offset);
        representative.push(*buckets.entry(key).or_insert(id));
    }

    let mut rewritten = Vec::with_capacity(triangles.len());
    for (index, mut t) in triangles.into_iter().enumerate() {
        for corner in &mut t.v {
            *corner = *representative
                .get(*corner)
                .ok_or(TinError::DanglingVertex {
                    triangle: index,
                    vertex: *corner,
                })?;
        }
        rewritten.push(t);
    }

    let merged = vertices.len() - buckets.len();
    let kept: BTreeMap<usize, Vertex> = vertices
        .into_iter()
        .enumerate()
        .filter(|(id, _)| representative[*id] == *id)
        .collect();

    let (vertices, mut triangles) = reindex(kept, rewritten)?;

    let before = triangles.len();
    triangles.retain(|t| !t.is_degenerate());
    debug!(
        "clean_triangles: merged {} vertices, dropped {} degenerate triangles",
        merged,
        before - triangles.len()
    );
    Ok((vertices, triangles))
}

/// Drops query points whose exact coordinates already appear in the vertex
/// table. Comparison is bitwise, so points a rounding error away are kept.
pub fn remove_overlapping_points(points: &[QueryPoint], vertices: &[Vertex]) -> Vec<QueryPoint> {
    let existing: HashSet<(u64, u64)> = vertices
        .iter()
        .map(|v| (v.x.to_bits(), v.y.to_bits()))
        .collect();
    points
        .iter()
        .filter(|p| !existing.contains(&(p.x.to_bits(), p.y.to_bits())))
        .cloned()
        .collect()
}

/// Appends free-standing points to the vertex table as new vertices.
///
/// The tables are dense by construction, so existing ids stay stable; the
/// returned offset is the id of the first appended point. Every insertion
/// operation goes through here.
pub fn append_nodes(
    points: &[QueryPoint],
    mut vertices: Vec<Vertex>,
    triangles: Vec<Triangle>,
) -> (Vec<Vertex>, Vec<Triangle>, usize) {
    let start = vertices.len();
    vertices.extend(points.iter().map(|p| Vertex {
        x: p.x,
        y: p.y,
        z: None,
        attrs: p.attrs.clone(),
    }));
    (vertices, triangles, start)
}

/// Concatenates two meshes: `b`'s triangle references are shifted past `a`'s
/// vertex table. No deduplication happens here; run [`clean_triangles`] on
/// the result to merge coincident vertices.
pub fn merge_meshes(a: &TinMesh, b: &TinMesh) -> TinMesh {
    let mut out = a.clone();
    let shift = a.vertices.len();
    out.vertices.extend(b.vertices.iter().cloned());
    out.triangles.extend(b.triangles.iter().map(|t| Triangle {
        v: [t.v[0] + shift, t.v[1] + shift, t.v[2] + shift],
        attrs: t.attrs.clone(),
    }));
    out
}

/// Drops vertices referenced by neither triangles nor segments, remapping
/// both tables onto the compacted id space.
pub fn remove_unused_vertices(mesh: &TinMesh) -> Result<TinMesh> {
    mesh.check_references()?;
    let mut used: BTreeMap<usize, usize> = BTreeMap::new();
    for t in &mesh.triangles {
        for &v in &t.v {
            used.insert(v, 0);
        }
    }
    if let Some(segments) = &mesh.segments {
        for s in segments {
            used.insert(s.a, 0);
            used.insert(s.b, 0);
        }
    }
    for (new_id, (_, slot)) in used.iter_mut().enumerate() {
        *slot = new_id;
    }

    let mut out = mesh.clone();
    out.vertices = used.keys().map(|&id| mesh.vertices[id].clone()).collect();
    for t in &mut out.triangles {
        for corner in &mut t.v {
            *corner = used[corner];
        }
    }
    if let Some(segments) = &mut out.segments {
        for s in segments {
            s.a = used[&s.a];
            s.b = used[&s.b];
        }
    }
    debug!(
        "remove_unused_vertices: {} -> {} vertices",
        mesh.vertices.len(),
        out.vertices.len()
    );
    Ok(out)
}

/// Drops triangles that reference nonexistent vertex ids. This is the repair
/// path for meshes that fail [`TinMesh::check_references`]; all other
/// operations treat dangling references as fatal.
pub fn remove_invalid_triangles(mesh: &TinMesh) -> TinMesh {
    let n = mesh.vertices.len();
    let mut out = mesh.clone();
    let before = out.triangles.len();
    out.triangles.retain(|t| t.v.iter().all(|&v| v < n));
    if out.triangles.len() != before {
        debug!(
            "remove_invalid_triangles: dropped {} triangles",
            before - out.triangles.len()
        );
    }
    out
}
