//! Boundary extraction: derives boundary edges from triangle adjacency and
//! traces them into closed polygonal rings.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::mesh::{Segment, TinMesh, Triangle};

/// Emits the boundary edges of a triangulation.
///
/// Every triangle contributes its three undirected edges in canonical
/// `(min, max)` form; an edge seen exactly once is boundary, an edge seen
/// twice is interior. Edges shared by more than two triangles fall through
/// the same `count == 1` rule and are discarded silently, which misreads
/// genuinely non-manifold meshes; the inherited rule is kept unchanged.
/// Output is ordered by canonical endpoints and each segment records one
/// triangle it was emitted from.
pub fn boundary_segments(triangles: &[Triangle]) -> Vec<Segment> {
    let mut edges: BTreeMap<(usize, usize), (usize, usize)> = BTreeMap::new();
    for (index, t) in triangles.iter().enumerate() {
        for (i, j) in [(0, 1), (1, 2), (0, 2)] {
            let key = Segment::new(t.v[i], t.v[j]).canonical();
            let entry = edges.entry(key).or_insert((0, index));
            entry.0 += 1;
        }
    }

    let over_shared = edges.values().filter(|(count, _)| *count > 2).count();
    if over_shared > 0 {
        debug!(
            "boundary_segments: {} edges shared by more than two triangles, treated as interior",
            over_shared
        );
    }

    edges
        .into_iter()
        .filter(|(_, (count, _))| *count == 1)
        .map(|((a, b), (_, triangle))| Segment {
            a,
            b,
            triangle: Some(triangle),
        })
        .collect()
}

/// Returns a copy of the mesh with its segment table replaced by the derived
/// boundary edges.
pub fn mesh_boundary(mesh: &TinMesh) -> TinMesh {
    let mut out = mesh.clone();
    out.segments = Some(boundary_segments(&mesh.triangles));
    out
}

/// Walks boundary edges into rings, merging rings that turn out to join.
///
/// Each unassigned edge starts a new ring; the walk repeatedly looks for an
/// edge incident to the trailing vertex (either endpoint, edges are
/// undirected). Reaching an edge that already belongs to a ring shifts that
/// ring's positions past the walk's and relabels it under the walking ring,
/// which closes loops and fuses chains met halfway. A ring that finds no
/// continuation stays open; closure is not validated here.
///
/// Returns ring id to the ordered, deduplicated vertex walk (the start
/// vertex appears once even for closed rings). Zero edges yield zero rings;
/// a lone edge yields a two-vertex open ring.
pub fn trace_rings(segments: &[Segment]) -> BTreeMap<usize, Vec<usize>> {
    let n = segments.len();
    let mut ring: Vec<Option<usize>> = vec![None; n];
    let mut pos: Vec<usize> = vec![0; n];

    // Incident unassigned-or-assigned edges per vertex, in edge table order.
    let mut incident: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        incident.entry(s.a).or_default().push(i);
        incident.entry(s.b).or_default().push(i);
    }

    // Continuation from `vertex`, excluding the edge we came in on: matches
    // on the first endpoint win over matches on the second, lowest edge id
    // first, mirroring the table-scan walk this replaces.
    let continuation = |vertex: usize, current: usize| -> Option<usize> {
        let edges = incident.get(&vertex)?;
        edges
            .iter()
            .find(|&&e| e != current && segments[e].a == vertex)
            .or_else(|| {
                edges
                    .iter()
                    .find(|&&e| e != current && segments[e].b == vertex)
            })
            .copied()
    };

    let mut ring_count = 0;
    for start in 0..n {
        if ring[start].is_some() {
            continue;
        }
        let r = ring_count;
        ring_count += 1;
        ring[start] = Some(r);
        pos[start] = 0;

        let mut current = start;
        let mut right = segments[start].b;
        let mut p = 0;
        while let Some(next) = continuation(right, current) {
            current = next;
            right = if segments[next].a == right {
                segments[next].b
            } else {
                segments[next].a
            };
            if let Some(existing) = ring[current] {
                // Closed back onto a ring (possibly this one): shift its
                // positions past the walk and fold it into the walking ring.
                for i in 0..n {
                    if ring[i] == Some(existing) {
                        pos[i] += p;
                        ring[i] = Some(r);
                    }
                }
                break;
            }
            p += 1;
            ring[current] = Some(r);
            pos[current] = p;
        }
    }

    let mut rings = BTreeMap::new();
    for r in 0..ring_count {
        let mut edges: Vec<usize> = (0..n).filter(|&i| ring[i] == Some(r)).collect();
        if edges.is_empty() {
            // Ring id was absorbed by a merge.
            continue;
        }
        edges.sort_by_key(|&i| pos[i]);
        rings.insert(r, chain_vertices(&edges, segments));
    }
    debug!("trace_rings: {} rings from {} edges", rings.len(), n);
    rings
}

/// Chains pos-ordered edges into a vertex walk by shared endpoints.
fn chain_vertices(edges: &[usize], segments: &[Segment]) -> Vec<usize> {
    let first = segments[edges[0]];
    let mut walk = if edges.len() > 1 {
        let second = segments[edges[1]];
        if second.a == first.b || second.b == first.b {
            vec![first.a, first.b]
        } else {
            vec![first.b, first.a]
        }
    } else {
        vec![first.a, first.b]
    };

    for &e in &edges[1..] {
        let s = segments[e];
        let tail = *walk.last().unwrap();
        let head = walk[0];
        if s.a == tail {
            walk.push(s.b);
        } else if s.b == tail {
            walk.push(s.a);
        } else if s.a == head {
            // Merged chains extend the walk at its start.
            walk.insert(0, s.b);
        } else if s.b == head {
            walk.insert(0, s.a);
        } else {
            walk.push(s.a);
            walk.push(s.b);
        }
    }
    if walk.len() > 2 && walk.first() == walk.last() {
        walk.pop();
    }
    walk
}
