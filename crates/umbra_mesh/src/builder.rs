//! Mesh builder
//!
//! Accepts raw triangle submissions and produces an immutable [`Mesh`].
//! Coincident vertices are merged through a quantized spatial hash; every
//! triangle contributes its own three edge records so that two neighbours
//! each reference the same vertex pair.

use std::collections::HashMap;

use umbra_math::Vec3;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Edge, EdgeId, Mesh, RenderGeometry, Triangle, TriangleId, VertexId};

/// Default quantization: positions are compared at 1/1000 unit
pub const DEFAULT_RESOLUTION: f32 = 1000.0;

/// A triangle corner as submitted by a shape: position plus texture coords
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TexturedVertex {
    pub position: Vec3,
    pub uv: [f32; 2],
}

impl TexturedVertex {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self { position: Vec3::new(x, y, z), uv: [u, v] }
    }
}

/// Quantized vertex identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct VertexKey(i64, i64, i64);

impl VertexKey {
    fn quantize(position: Vec3, resolution: f32) -> Self {
        // Truncation toward zero, matching integer conversion of the scaled value
        let q = |c: f32| (c * resolution).trunc() as i64;
        Self(q(position.x), q(position.y), q(position.z))
    }
}

/// Incremental mesh construction
#[derive(Debug)]
pub struct MeshBuilder {
    name: String,
    resolution: f32,
    lookup: HashMap<VertexKey, VertexId>,
    vertices: Vec<Vec3>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    render: RenderGeometry,
    degenerate: usize,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshBuilder {
    /// Create a builder with the default 1/1000 resolution
    pub fn new() -> Self {
        Self {
            name: String::from("mesh"),
            resolution: DEFAULT_RESOLUTION,
            lookup: HashMap::new(),
            vertices: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
            render: RenderGeometry::default(),
            degenerate: 0,
        }
    }

    /// Create a builder that merges vertices closer than `1 / resolution`
    pub fn with_resolution(resolution: f32) -> MeshResult<Self> {
        if !resolution.is_finite() || resolution <= 0.0 {
            return Err(MeshError::InvalidResolution(resolution));
        }
        Ok(Self { resolution, ..Self::new() })
    }

    /// Set the mesh name (builder pattern)
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Return the id of the vertex at `position`, adding it if no vertex
    /// with the same quantized key exists yet.
    pub fn add_vertex(&mut self, position: Vec3) -> MeshResult<VertexId> {
        if !position.is_finite() {
            return Err(MeshError::NonFiniteVertex {
                x: position.x,
                y: position.y,
                z: position.z,
            });
        }

        let key = VertexKey::quantize(position, self.resolution);
        if let Some(&id) = self.lookup.get(&key) {
            return Ok(id);
        }

        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(position);
        self.lookup.insert(key, id);
        Ok(id)
    }

    fn add_edge(&mut self, v1: VertexId, v2: VertexId) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge { v1, v2 });
        id
    }

    /// Add a triangle in winding order.
    ///
    /// Degenerate triangles (repeated vertex or zero area) are still
    /// recorded, flagged and logged, so that they can be skipped at
    /// evaluation time without shifting any ids.
    pub fn add_triangle(
        &mut self,
        a: TexturedVertex,
        b: TexturedVertex,
        c: TexturedVertex,
    ) -> MeshResult<TriangleId> {
        let v1 = self.add_vertex(a.position)?;
        let v2 = self.add_vertex(b.position)?;
        let v3 = self.add_vertex(c.position)?;

        let e1 = self.add_edge(v1, v2);
        let e2 = self.add_edge(v2, v3);
        let e3 = self.add_edge(v3, v1);

        let p1 = self.vertices[v1.index()];
        let p2 = self.vertices[v2.index()];
        let p3 = self.vertices[v3.index()];

        let edge_a = p2 - p1;
        let edge_b = p3 - p2;
        let cross = edge_a.cross(edge_b);
        let repeated = v1 == v2 || v2 == v3 || v3 == v1;
        let area_floor = 1e-6 * edge_a.length() * edge_b.length();
        let normal = if repeated || cross.length() <= area_floor {
            None
        } else {
            cross.try_normalize(0.0)
        };

        let id = TriangleId(self.triangles.len() as u32);
        let degenerate = normal.is_none();
        if degenerate {
            self.degenerate += 1;
            log::warn!(
                "Degenerate triangle {} in '{}' ({:?}, {:?}, {:?})",
                id.0, self.name, v1, v2, v3
            );
        }
        let normal = normal.unwrap_or(Vec3::ZERO);

        self.triangles.push(Triangle {
            vertices: [v1, v2, v3],
            edges: [e1, e2, e3],
            normal,
            centroid: (p1 + p2 + p3) / 3.0,
            degenerate,
        });

        for corner in [a, b, c] {
            self.render.indices.push(self.render.positions.len() as u32);
            self.render.positions.push(corner.position.to_array());
            self.render.normals.push(normal.to_array());
            self.render.uvs.push(corner.uv);
        }

        Ok(id)
    }

    /// Finish construction
    pub fn build(self) -> Mesh {
        Mesh {
            name: self.name,
            vertices: self.vertices,
            edges: self.edges,
            triangles: self.triangles,
            render: self.render,
            degenerate: self.degenerate,
        }
    }
}
