//! Immutable shadow-casting mesh
//!
//! Vertices, edges and triangles live in flat append-only arrays and refer
//! to each other only through integer ids. Once built, a [`Mesh`] is never
//! mutated; per-frame data such as light-facing flags is owned by whoever
//! evaluates the mesh, not by the mesh itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use umbra_math::Vec3;

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Position in the owning array
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

index_id!(
    /// Index into [`Mesh::vertices`]
    VertexId
);
index_id!(
    /// Index into [`Mesh::edges`]
    EdgeId
);
index_id!(
    /// Index into [`Mesh::triangles`]
    TriangleId
);

/// Direction-independent identity of an edge.
///
/// `EdgeKey::new(a, b) == EdgeKey::new(b, a)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeKey(VertexId, VertexId);

impl EdgeKey {
    #[inline]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// Lower and higher endpoint
    #[inline]
    pub fn endpoints(self) -> (VertexId, VertexId) {
        (self.0, self.1)
    }
}

/// An edge record owned by one triangle, oriented in that triangle's winding
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub v1: VertexId,
    pub v2: VertexId,
}

impl Edge {
    #[inline]
    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.v1, self.v2)
    }
}

/// A triangle with precomputed normal and centroid
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Vertex ids in winding order
    pub vertices: [VertexId; 3],
    /// Edge ids for (v1,v2), (v2,v3), (v3,v1)
    pub edges: [EdgeId; 3],
    /// Unit normal, or zero for degenerate triangles
    pub normal: Vec3,
    /// Mean of the three vertex positions
    pub centroid: Vec3,
    /// Fewer than three distinct vertices or zero area
    pub degenerate: bool,
}

/// Non-deduplicated draw stream for the host renderer
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl RenderGeometry {
    /// Number of vertices in the stream
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Summary counts for a mesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshStats {
    pub vertices: usize,
    pub edges: usize,
    pub unique_edges: usize,
    pub triangles: usize,
    pub degenerate_triangles: usize,
}

/// Immutable triangle mesh with deduplicated vertices
#[derive(Clone, Debug)]
pub struct Mesh {
    pub(crate) name: String,
    pub(crate) vertices: Vec<Vec3>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) render: RenderGeometry,
    pub(crate) degenerate: usize,
}

impl Mesh {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<Vec3> {
        self.vertices.get(id.index()).copied()
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    #[inline]
    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id.index())
    }

    pub fn render_geometry(&self) -> &RenderGeometry {
        &self.render
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate
    }

    /// Triangles sharing each undirected edge
    pub fn edge_adjacency(&self) -> HashMap<EdgeKey, Vec<TriangleId>> {
        let mut adjacency: HashMap<EdgeKey, Vec<TriangleId>> = HashMap::new();
        for (index, triangle) in self.triangles.iter().enumerate() {
            for edge_id in triangle.edges {
                let key = self.edges[edge_id.index()].key();
                adjacency.entry(key).or_default().push(TriangleId(index as u32));
            }
        }
        adjacency
    }

    pub fn unique_edge_count(&self) -> usize {
        self.edge_adjacency().len()
    }

    /// Every undirected edge is shared by exactly two triangles
    pub fn is_closed_manifold(&self) -> bool {
        !self.triangles.is_empty()
            && self.edge_adjacency().values().all(|tris| tris.len() == 2)
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            vertices: self.vertices.len(),
            edges: self.edges.len(),
            unique_edges: self.unique_edge_count(),
            triangles: self.triangles.len(),
            degenerate_triangles: self.degenerate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_key_is_direction_independent() {
        let a = VertexId(3);
        let b = VertexId(7);
        assert_eq!(EdgeKey::new(a, b), EdgeKey::new(b, a));
        assert_eq!(EdgeKey::new(b, a).endpoints(), (a, b));
        assert_ne!(EdgeKey::new(a, b), EdgeKey::new(a, VertexId(8)));
    }

    #[test]
    fn test_edge_record_key() {
        let edge = Edge { v1: VertexId(5), v2: VertexId(1) };
        assert_eq!(edge.key(), EdgeKey::new(VertexId(1), VertexId(5)));
    }
}
