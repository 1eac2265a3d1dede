//! Incremental refinement: inserts survey points into an existing TIN by
//! re-triangulating only the triangles they fall in, plus a full-rebuild
//! path constrained to the current boundary.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::boundary;
use crate::cleanup;
use crate::error::{Result, TinError};
use crate::geometry::{convex_hull, distance, polygon_area, Point};
use crate::locate;
use crate::mesh::{QueryPoint, Segment, TinMesh, Triangle, Vertex};
use crate::triangulate::Triangulator;

/// Inserts new points into the mesh with minimal disruption.
///
/// Points are appended to the vertex table (the first new id is the prior
/// vertex count), located against the original triangles, and grouped by
/// containing triangle in ascending triangle id. Each affected triangle is
/// re-triangulated locally from (its inserted points ∪ its three corners);
/// the replacement triangles inherit the replaced triangle's attribute
/// columns verbatim. Triangles that received no point pass through
/// untouched, in their original order.
///
/// Returns the refined mesh and the ids of leftover points that fell in no
/// triangle (outside the coverage); they remain in the vertex table and the
/// caller decides their fate.
pub fn insert_points(
    mesh: &TinMesh,
    new_points: &[QueryPoint],
    solver: &dyn Triangulator,
) -> Result<(TinMesh, Vec<usize>)> {
    mesh.check_references()?;
    let (all_vertices, triangles, start) =
        cleanup::append_nodes(new_points, mesh.vertices.clone(), mesh.triangles.clone());

    let located = locate::points_in_triangles(new_points, &mesh.vertices, &mesh.triangles)?;
    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    let mut leftover = Vec::new();
    for (i, hit) in located.iter().enumerate() {
        match hit {
            Some(t) => groups.entry(*t).or_default().push(i),
            None => leftover.push(start + i),
        }
    }

    let mut replacements = Vec::new();
    for (&tri_id, point_ids) in &groups {
        let t = &triangles[tri_id];
        // Local point set: the inserted points, then the three corners.
        let mut local: Vec<Point> = point_ids.iter().map(|&i| new_points[i].point()).collect();
        let mut global: Vec<usize> = point_ids.iter().map(|&i| start + i).collect();
        for &corner in &t.v {
            local.push(all_vertices[corner].point());
            global.push(corner);
        }

        // Solvers lose precision on coordinates far from the origin; shift
        // the local set to its centroid before triangulating.
        let cx = local.iter().map(|p| p.x).sum::<f64>() / local.len() as f64;
        let cy = local.iter().map(|p| p.y).sum::<f64>() / local.len() as f64;
        let shifted: Vec<Point> = local
            .iter()
            .map(|p| Point::new(p.x - cx, p.y - cy))
            .collect();

        let faces = solver.delaunay(&shifted)?;

        let base = shifted.len() - 3;
        let area_before = polygon_area(&[shifted[base], shifted[base + 1], shifted[base + 2]]);
        let mut area_after = 0.0;
        for f in &faces {
            area_after += polygon_area(&[shifted[f[0]], shifted[f[1]], shifted[f[2]]]);
            replacements.push(Triangle {
                v: [global[f[0]], global[f[1]], global[f[2]]],
                attrs: t.attrs.clone(),
            });
        }
        // Subdivision must conserve the replaced triangle's area.
        if (area_after - area_before).abs() > 1e-9 * area_before.max(1.0) {
            warn!(
                "insert_points: triangle {} area drifted from {} to {} during subdivision",
                tri_id, area_before, area_after
            );
        }
    }

    let replaced = groups.len();
    let mut out_triangles: Vec<Triangle> = triangles
        .iter()
        .enumerate()
        .filter(|(i, _)| !groups.contains_key(i))
        .map(|(_, t)| t.clone())
        .collect();
    out_triangles.extend(replacements);

    debug!(
        "insert_points: {} points, {} triangles replaced, {} leftover",
        new_points.len(),
        replaced,
        leftover.len()
    );

    let mut out = mesh.clone();
    out.vertices = all_vertices;
    out.triangles = out_triangles;
    Ok((out, leftover))
}

/// Rebuilds the whole triangulation, constrained to cover exactly the
/// region the mesh covers today.
///
/// The current boundary edges become constraint segments; when
/// `existing_boundary` is false the convex hull of the full vertex set is
/// added as well. One region marker per existing triangle centroid tells the
/// solver which constrained regions to keep, so holes stay holes. Steiner
/// vertices introduced by the solver receive attribute values by
/// inverse-distance weighting (weight `1 / edge length`) over the original
/// vertices they share a new edge with; edges between two Steiner vertices
/// contribute nothing, so missing values never propagate.
pub fn supplant(
    mesh: &TinMesh,
    existing_boundary: bool,
    solver: &dyn Triangulator,
) -> Result<TinMesh> {
    mesh.check_references()?;
    if mesh.triangles.is_empty() {
        return Ok(mesh.clone());
    }
    let coords: Vec<Point> = mesh.vertices.iter().map(|v| v.point()).collect();
    let mut segments: Vec<(usize, usize)> = boundary::boundary_segments(&mesh.triangles)
        .iter()
        .map(|s| s.canonical())
        .collect();
    if !existing_boundary {
        let hull = convex_hull(&coords);
        if hull.len() >= 2 {
            for i in 0..hull.len() {
                let s = Segment::new(hull[i], hull[(i + 1) % hull.len()]);
                segments.push(s.canonical());
            }
        }
    }
    // Constraint edges may not pass through other input vertices: the
    // solver rejects them. Split every segment at the collinear vertices it
    // runs over (a hull edge over a subdivided boundary edge is the common
    // case).
    let segments = split_segments_at_vertices(&coords, &segments);

    let markers: Vec<Point> = mesh
        .triangles
        .iter()
        .map(|t| {
            let [a, b, c] = t.v.map(|v| mesh.vertices[v].point());
            Point::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
        })
        .collect();

    let result = solver.constrained(&coords, &segments, &markers)?;
    if result.points.len() < coords.len() {
        return Err(TinError::Triangulation(
            "solver dropped input points".to_string(),
        ));
    }

    let original = mesh.vertices.len();
    let mut vertices = mesh.vertices.clone();
    for point in &result.points[original..] {
        vertices.push(Vertex::new(point.x, point.y));
    }

    // Edges from each Steiner vertex back to original vertices.
    let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); result.points.len() - original];
    for t in &result.triangles {
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[0], t[2])] {
            let (steiner, other) = if a >= original && b < original {
                (a, b)
            } else if b >= original && a < original {
                (b, a)
            } else {
                continue;
            };
            let list = &mut neighbors[steiner - original];
            if !list.contains(&other) {
                list.push(other);
            }
        }
    }
    for (slot, list) in neighbors.iter().enumerate() {
        let id = original + slot;
        let point = vertices[id].point();
        let weights: Vec<(usize, f64)> = list
            .iter()
            .map(|&n| (n, 1.0 / distance(point, mesh.vertices[n].point()).max(f64::MIN_POSITIVE)))
            .collect();
        vertices[id].z = weighted_average(&weights, |n| mesh.vertices[n].z);
        let mut columns: Vec<&String> = list.iter().flat_map(|&n| mesh.vertices[n].attrs.keys()).collect();
        columns.sort_unstable();
        columns.dedup();
        for column in columns {
            let value = weighted_average(&weights, |n| {
                mesh.vertices[n].attrs.get(column).copied().flatten()
            });
            vertices[id].attrs.insert(column.clone(), value);
        }
    }

    debug!(
        "supplant: {} -> {} triangles, {} steiner vertices",
        mesh.triangles.len(),
        result.triangles.len(),
        result.points.len() - original
    );

    let mut out = mesh.clone();
    out.vertices = vertices;
    out.triangles = result
        .triangles
        .iter()
        .map(|t| Triangle::new(t[0], t[1], t[2]))
        .collect();
    out.segments = Some(
        segments
            .iter()
            .map(|&(a, b)| Segment::new(a, b))
            .collect(),
    );
    Ok(out)
}

fn point_on_segment(a: Point, b: Point, p: Point, tol: f64) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    if cross.abs() > tol {
        return false;
    }
    let len2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if len2 <= f64::MIN_POSITIVE {
        return false;
    }
    let t = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2;
    t >= -tol && t <= 1.0 + tol
}

/// Splits each segment at the input vertices lying on it, ordered by
/// distance from the segment's first endpoint, so no constraint edge passes
/// through a vertex. Output is canonical, sorted, deduplicated.
fn split_segments_at_vertices(
    points: &[Point],
    segments: &[(usize, usize)],
) -> Vec<(usize, usize)> {
    let mut refined = Vec::new();
    for &(a, b) in segments {
        let pa = points[a];
        let pb = points[b];
        let mut mids: Vec<(usize, f64)> = Vec::new();
        for (i, &p) in points.iter().enumerate() {
            if i == a || i == b {
                continue;
            }
            if point_on_segment(pa, pb, p, 1e-9) {
                mids.push((i, distance(pa, p)));
            }
        }
        mids.sort_by(|x, y| x.1.partial_cmp(&y.1).unwrap());
        let mut last = a;
        for &(idx, _) in &mids {
            refined.push(Segment::new(last, idx).canonical());
            last = idx;
        }
        refined.push(Segment::new(last, b).canonical());
    }
    refined.sort_unstable();
    refined.dedup();
    refined
}

/// Inverse-distance-weighted average over the neighbors whose value is
/// present; `None` when nothing contributes.
fn weighted_average<F>(weights: &[(usize, f64)], value: F) -> Option<f64>
where
    F: Fn(usize) -> Option<f64>,
{
    let mut sum = 0.0;
    let mut total = 0.0;
    for &(n, w) in weights {
        if let Some(v) = value(n) {
            sum += w * v;
            total += w;
        }
    }
    (total > 0.0).then(|| sum / total)
}
