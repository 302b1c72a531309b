//! Shape generators
//!
//! Each shape emits its triangles through a [`MeshBuilder`]; none of them
//! holds mesh state of its own.

use serde::{Deserialize, Serialize};
use umbra_math::radians;

use crate::builder::{MeshBuilder, TexturedVertex};
use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;

/// Something that can describe its geometry as a list of triangles
pub trait MeshSource {
    /// Human-readable shape name
    fn name(&self) -> &str;

    /// Push every triangle of the shape into `builder`
    fn emit(&self, builder: &mut MeshBuilder) -> MeshResult<()>;
}

impl Mesh {
    /// Build a mesh from a shape
    pub fn from_source(source: &dyn MeshSource) -> MeshResult<Mesh> {
        let mut builder = MeshBuilder::new().named(source.name());
        source.emit(&mut builder)?;
        Ok(builder.build())
    }
}

fn check_extents(shape: &str, sx: f32, sy: f32, sz: f32) -> MeshResult<()> {
    if [sx, sy, sz].iter().all(|s| s.is_finite() && *s > 0.0) {
        Ok(())
    } else {
        Err(MeshError::InvalidShape {
            shape: shape.to_string(),
            reason: format!("extents must be positive, got ({}, {}, {})", sx, sy, sz),
        })
    }
}

#[inline]
fn tv(x: f32, y: f32, z: f32, u: f32, v: f32) -> TexturedVertex {
    TexturedVertex::new(x, y, z, u, v)
}

/// Axis-aligned box centred on the origin, given by half-extents
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CuboidShape {
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
}

impl CuboidShape {
    pub fn new(sx: f32, sy: f32, sz: f32) -> Self {
        Self { sx, sy, sz }
    }

    /// Cube with half-extent `size` on every axis
    pub fn cube(size: f32) -> Self {
        Self::new(size, size, size)
    }
}

impl MeshSource for CuboidShape {
    fn name(&self) -> &str {
        "cuboid"
    }

    fn emit(&self, b: &mut MeshBuilder) -> MeshResult<()> {
        let Self { sx, sy, sz } = *self;
        check_extents(self.name(), sx, sy, sz)?;

        // +Z
        b.add_triangle(tv(-sx, -sy, sz, 0.0, 0.0), tv(sx, -sy, sz, 1.0, 0.0), tv(sx, sy, sz, 1.0, 1.0))?;
        b.add_triangle(tv(-sx, -sy, sz, 0.0, 0.0), tv(sx, sy, sz, 1.0, 1.0), tv(-sx, sy, sz, 0.0, 1.0))?;
        // -Z
        b.add_triangle(tv(-sx, -sy, -sz, 1.0, 0.0), tv(-sx, sy, -sz, 0.0, 0.0), tv(sx, sy, -sz, 0.0, 1.0))?;
        b.add_triangle(tv(-sx, -sy, -sz, 1.0, 0.0), tv(sx, sy, -sz, 0.0, 1.0), tv(sx, -sy, -sz, 1.0, 1.0))?;
        // +Y
        b.add_triangle(tv(-sx, sy, -sz, 0.0, 0.0), tv(-sx, sy, sz, 1.0, 0.0), tv(sx, sy, sz, 1.0, 1.0))?;
        b.add_triangle(tv(-sx, sy, -sz, 0.0, 0.0), tv(sx, sy, sz, 1.0, 1.0), tv(sx, sy, -sz, 0.0, 1.0))?;
        // -Y
        b.add_triangle(tv(-sx, -sy, -sz, 1.0, 0.0), tv(sx, -sy, -sz, 0.0, 0.0), tv(sx, -sy, sz, 0.0, 1.0))?;
        b.add_triangle(tv(-sx, -sy, -sz, 1.0, 0.0), tv(sx, -sy, sz, 0.0, 1.0), tv(-sx, -sy, sz, 1.0, 1.0))?;
        // +X
        b.add_triangle(tv(sx, -sy, -sz, 0.0, 0.0), tv(sx, sy, -sz, 1.0, 0.0), tv(sx, sy, sz, 1.0, 1.0))?;
        b.add_triangle(tv(sx, -sy, -sz, 0.0, 0.0), tv(sx, sy, sz, 1.0, 1.0), tv(sx, -sy, sz, 0.0, 1.0))?;
        // -X
        b.add_triangle(tv(-sx, -sy, -sz, 1.0, 0.0), tv(-sx, -sy, sz, 0.0, 0.0), tv(-sx, sy, sz, 0.0, 1.0))?;
        b.add_triangle(tv(-sx, -sy, -sz, 1.0, 0.0), tv(-sx, sy, sz, 0.0, 1.0), tv(-sx, sy, -sz, 1.0, 1.0))?;
        Ok(())
    }
}

/// Square-based pyramid with its apex on +Y
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PyramidShape {
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
}

impl PyramidShape {
    pub fn new(sx: f32, sy: f32, sz: f32) -> Self {
        Self { sx, sy, sz }
    }
}

impl MeshSource for PyramidShape {
    fn name(&self) -> &str {
        "pyramid"
    }

    fn emit(&self, b: &mut MeshBuilder) -> MeshResult<()> {
        let Self { sx, sy, sz } = *self;
        check_extents(self.name(), sx, sy, sz)?;

        b.add_triangle(tv(-sx, -sy, sz, 1.0, 0.0), tv(sx, -sy, sz, 0.0, 0.0), tv(0.0, sy, 0.0, 0.5, 1.0))?;
        b.add_triangle(tv(-sx, -sy, -sz, 0.0, 0.0), tv(0.0, sy, 0.0, 0.5, 1.0), tv(sx, -sy, -sz, 1.0, 0.0))?;

        b.add_triangle(tv(-sx, -sy, -sz, 0.0, 0.0), tv(sx, -sy, -sz, 1.0, 0.0), tv(sx, -sy, sz, 1.0, 1.0))?;
        b.add_triangle(tv(-sx, -sy, -sz, 0.0, 0.0), tv(sx, -sy, sz, 1.0, 1.0), tv(-sx, -sy, sz, 0.0, 1.0))?;

        b.add_triangle(tv(sx, -sy, -sz, 1.0, 0.0), tv(0.0, sy, 0.0, 0.5, 1.0), tv(sx, -sy, sz, 0.0, 0.0))?;
        b.add_triangle(tv(-sx, -sy, -sz, 0.0, 0.0), tv(-sx, -sy, sz, 1.0, 0.0), tv(0.0, sy, 0.0, 0.5, 1.0))?;
        Ok(())
    }
}

/// Five-pointed star prism: a flat star with a ridge at z = 0
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarShape {
    pub sx: f32,
    pub sy: f32,
    pub sz: f32,
}

impl StarShape {
    pub const POINTS: usize = 5;

    pub fn new(sx: f32, sy: f32, sz: f32) -> Self {
        Self { sx, sy, sz }
    }
}

impl MeshSource for StarShape {
    fn name(&self) -> &str {
        "star"
    }

    fn emit(&self, b: &mut MeshBuilder) -> MeshResult<()> {
        let Self { sx, sy, sz } = *self;
        check_extents(self.name(), sx, sy, sz)?;

        let step = radians(360.0 / Self::POINTS as f32);
        let start = radians(360.0 / (Self::POINTS * 2) as f32);
        let u = |x: f32| (x + sx) / (sx * 2.0);
        let v = |y: f32| (y + sy) / (sy * 2.0);

        for i in 0..Self::POINTS {
            let i = i as f32;
            let (x1, y1) = ((start + i * step).sin() * sx * 0.5, (start + i * step).cos() * sy * 0.5);
            let (x2, y2) = ((start + (i + 1.0) * step).sin() * sx * 0.5, (start + (i + 1.0) * step).cos() * sy * 0.5);
            let (x3, y3) = ((start + (i + 0.5) * step).sin() * sx, (start + (i + 0.5) * step).cos() * sy);
            let (u1, v1, u2, v2, u3, v3) = (u(x1), v(y1), u(x2), v(y2), u(x3), v(y3));

            b.add_triangle(tv(x1, y1, -sz, u1, v1), tv(x2, y2, -sz, u2, v2), tv(0.0, 0.0, -sz, u3, v3))?;
            b.add_triangle(tv(x2, y2, -sz, u2, v2), tv(x1, y1, -sz, u1, v1), tv(x3, y3, 0.0, u3, v3))?;
            b.add_triangle(tv(x2, y2, sz, u2, v2), tv(x1, y1, sz, u1, v1), tv(0.0, 0.0, sz, 0.5, 0.5))?;
            b.add_triangle(tv(x1, y1, sz, u1, v1), tv(x2, y2, sz, u2, v2), tv(x3, y3, 0.0, u3, v3))?;
            b.add_triangle(tv(x1, y1, -sz, u1, v1), tv(x1, y1, sz, u1, v1), tv(x3, y3, 0.0, u3, v3))?;
            b.add_triangle(tv(x2, y2, sz, u2, v2), tv(x2, y2, -sz, u2, v2), tv(x3, y3, 0.0, u3, v3))?;
        }
        Ok(())
    }
}

/// Serializable shape description
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeKind {
    Cuboid(CuboidShape),
    Pyramid(PyramidShape),
    Star(StarShape),
}

impl ShapeKind {
    pub fn as_source(&self) -> &dyn MeshSource {
        match self {
            Self::Cuboid(shape) => shape,
            Self::Pyramid(shape) => shape,
            Self::Star(shape) => shape,
        }
    }

    pub fn build(&self) -> MeshResult<Mesh> {
        Mesh::from_source(self.as_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_topology() {
        let mesh = Mesh::from_source(&CuboidShape::cube(1.0)).unwrap();
        assert_eq!(mesh.name(), "cuboid");
        assert_eq!(mesh.triangle_count(), 12);
        assert_eq!(mesh.vertices().len(), 8);
        assert_eq!(mesh.edges().len(), 36);
        assert_eq!(mesh.unique_edge_count(), 18);
        assert_eq!(mesh.degenerate_count(), 0);
        assert!(mesh.is_closed_manifold());
    }

    #[test]
    fn test_cube_normals_point_outward() {
        let mesh = Mesh::from_source(&CuboidShape::new(2.0, 1.0, 0.5)).unwrap();
        for tri in mesh.triangles() {
            assert!(tri.normal.dot(tri.centroid) > 0.0, "inward normal on {:?}", tri);
        }
    }

    #[test]
    fn test_pyramid_topology() {
        let mesh = Mesh::from_source(&PyramidShape::new(2.0, 2.0, 2.0)).unwrap();
        assert_eq!(mesh.triangle_count(), 6);
        assert_eq!(mesh.vertices().len(), 5);
        assert!(mesh.is_closed_manifold());
    }

    #[test]
    fn test_star_topology() {
        let mesh = Mesh::from_source(&StarShape::new(2.0, 2.0, 0.5)).unwrap();
        assert_eq!(mesh.triangle_count(), 30);
        // 5 inner points on each face, 5 ridge tips, 2 face centres
        assert_eq!(mesh.vertices().len(), 17);
        assert_eq!(mesh.degenerate_count(), 0);
    }

    #[test]
    fn test_invalid_extents() {
        let err = Mesh::from_source(&CuboidShape::new(0.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, MeshError::InvalidShape { .. }));
    }

    #[test]
    fn test_shape_kind_serialization() {
        let kind = ShapeKind::Pyramid(PyramidShape::new(2.0, 2.0, 2.0));
        let json = serde_json::to_string(&kind).unwrap();
        assert!(json.contains("\"kind\":\"pyramid\""));
        let restored: ShapeKind = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, kind);
        assert_eq!(restored.build().unwrap().triangle_count(), 6);
    }
}
