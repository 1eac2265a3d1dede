//! Samples vertex attribute columns onto the mesh's free-standing points.

use log::debug;

use crate::error::{Result, TinError};
use crate::geometry::barycentric;
use crate::locate;
use crate::mesh::{QueryPoint, TinMesh};

/// Interpolates every vertex column (and Z) onto the mesh's query points.
///
/// Each point is located in the mesh and the containing triangle's corner
/// values are blended with the point's barycentric weights. A corner with a
/// missing value makes the interpolated value missing too; points outside
/// the coverage are returned unchanged.
pub fn sample_points(mesh: &TinMesh) -> Result<Vec<QueryPoint>> {
    let points = mesh
        .points
        .as_ref()
        .ok_or(TinError::MissingTable("points"))?;
    let hits = locate::points_in_triangles(points, &mesh.vertices, &mesh.triangles)?;

    let mut out = points.clone();
    let mut sampled = 0;
    for (p, hit) in out.iter_mut().zip(&hits) {
        let Some(t) = hit else { continue };
        let [a, b, c] = mesh.triangles[*t].v;
        let (va, vb, vc) = (&mesh.vertices[a], &mesh.vertices[b], &mesh.vertices[c]);
        let Some((wa, wb, wc)) = barycentric(p.point(), va.point(), vb.point(), vc.point()) else {
            continue;
        };
        sampled += 1;

        if let (Some(za), Some(zb), Some(zc)) = (va.z, vb.z, vc.z) {
            p.attrs
                .insert("Z".to_string(), Some(wa * za + wb * zb + wc * zc));
        }

        let mut columns: Vec<&String> = va
            .attrs
            .keys()
            .chain(vb.attrs.keys())
            .chain(vc.attrs.keys())
            .collect();
        columns.sort_unstable();
        columns.dedup();
        for column in columns {
            let corner = |v: &crate::mesh::Vertex| v.attrs.get(column).copied().flatten();
            let value = match (corner(va), corner(vb), corner(vc)) {
                (Some(x), Some(y), Some(z)) => Some(wa * x + wb * y + wc * z),
                _ => None,
            };
            p.attrs.insert(column.clone(), value);
        }
    }
    debug!("sample_points: {} / {} points sampled", sampled, out.len());
    Ok(out)
}
