//! Shadow volume geometry
//!
//! The volume is a closed hull made of side quads swept from each
//! silhouette edge plus a near cap (the lit faces themselves) and a far cap
//! (the lit faces pushed away from the light). All faces wind inward.

use serde::{Deserialize, Serialize};
use umbra_math::Vec3;
use umbra_mesh::{EdgeId, Mesh};

use super::visibility::Visibility;

/// Counters describing one generated volume
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeStats {
    pub visible_triangles: usize,
    pub silhouette_edges: usize,
    pub side_triangles: usize,
    pub cap_triangles: usize,
    /// Silhouette edges dropped because the light sits on an endpoint
    pub skipped_edges: usize,
    /// Visible triangles whose caps were dropped for the same reason
    pub skipped_triangles: usize,
}

/// Triangle list in the caster's local space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShadowVolume {
    pub positions: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub stats: VolumeStats,
}

impl ShadowVolume {
    /// Positions as a flat float slice for upload
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let base = self.positions.len() as u32;
        self.positions.extend([a.to_array(), b.to_array(), c.to_array()]);
        self.indices.extend([base, base + 1, base + 2]);
    }
}

/// Push `vertex` `depth` units further from `light`
#[inline]
pub fn extrude(vertex: Vec3, light: Vec3, depth: f32, epsilon: f32) -> Option<Vec3> {
    (vertex - light).try_normalize(epsilon).map(|dir| vertex + dir * depth)
}

/// Inputs for [`build`]
#[derive(Clone, Copy, Debug)]
pub struct VolumeParams {
    pub light: Vec3,
    pub depth: f32,
    pub epsilon: f32,
}

/// Build the volume for the visible set and its silhouette
pub fn build(mesh: &Mesh, visibility: &Visibility, silhouette: &[EdgeId], params: VolumeParams) -> ShadowVolume {
    let VolumeParams { light, depth, epsilon } = params;
    let mut volume = ShadowVolume::default();
    volume.stats.visible_triangles = visibility.count_visible();
    volume.stats.silhouette_edges = silhouette.len();

    let position = |id| mesh.vertex(id);

    for &edge_id in silhouette {
        let Some(edge) = mesh.edge(edge_id) else { continue };
        let (Some(v1), Some(v2)) = (position(edge.v1), position(edge.v2)) else { continue };
        match (extrude(v1, light, depth, epsilon), extrude(v2, light, depth, epsilon)) {
            (Some(e1), Some(e2)) => {
                volume.push_triangle(v1, v2, e1);
                volume.push_triangle(e2, e1, v2);
                volume.stats.side_triangles += 2;
            }
            _ => {
                log::debug!("Skipping silhouette edge {:?}: light coincides with an endpoint", edge_id);
                volume.stats.skipped_edges += 1;
            }
        }
    }

    for id in visibility.visible() {
        let Some(triangle) = mesh.triangle(id) else { continue };
        let [a, b, c] = triangle.vertices;
        let (Some(p1), Some(p2), Some(p3)) = (position(a), position(b), position(c)) else { continue };
        match (
            extrude(p1, light, depth, epsilon),
            extrude(p2, light, depth, epsilon),
            extrude(p3, light, depth, epsilon),
        ) {
            (Some(e1), Some(e2), Some(e3)) => {
                volume.push_triangle(p3, p2, p1);
                volume.push_triangle(e1, e2, e3);
                volume.stats.cap_triangles += 2;
            }
            _ => {
                log::debug!("Skipping caps of triangle {:?}: light coincides with a vertex", id);
                volume.stats.skipped_triangles += 1;
            }
        }
    }

    volume
}
