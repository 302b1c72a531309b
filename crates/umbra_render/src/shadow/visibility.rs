//! Per-triangle light visibility

use umbra_math::Vec3;
use umbra_mesh::{Mesh, Triangle, TriangleId};

/// One bit per triangle, set when the triangle faces the light
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visibility {
    bits: Vec<u64>,
    len: usize,
}

impl Visibility {
    const BITS_PER_WORD: usize = 64;

    /// All-clear set sized for `len` triangles
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0; len.div_ceil(Self::BITS_PER_WORD)],
            len,
        }
    }

    /// Resize to `len` triangles and clear every bit
    pub fn reset(&mut self, len: usize) {
        self.bits.clear();
        self.bits.resize(len.div_ceil(Self::BITS_PER_WORD), 0);
        self.len = len;
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.bits[index / Self::BITS_PER_WORD] |= 1u64 << (index % Self::BITS_PER_WORD);
    }

    /// Out-of-range indices read as not visible
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        index < self.len && (self.bits[index / Self::BITS_PER_WORD] & (1u64 << (index % Self::BITS_PER_WORD))) != 0
    }

    #[inline]
    pub fn is_visible(&self, id: TriangleId) -> bool {
        self.get(id.index())
    }

    pub fn count_visible(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Visible triangle ids in ascending order
    pub fn visible(&self) -> impl Iterator<Item = TriangleId> + '_ {
        (0..self.len).filter(|&i| self.get(i)).map(|i| TriangleId(i as u32))
    }
}

/// Does `triangle` face a light at `light` (local space)
#[inline]
pub fn faces_light(triangle: &Triangle, light: Vec3, epsilon: f32) -> bool {
    if triangle.degenerate {
        return false;
    }
    match (triangle.centroid - light).try_normalize(epsilon) {
        Some(dir) => dir.dot(triangle.normal) < 0.0,
        None => false,
    }
}

/// Classify every triangle of `mesh` into `out`
pub fn classify(mesh: &Mesh, light: Vec3, epsilon: f32, out: &mut Visibility) {
    out.reset(mesh.triangle_count());
    for (i, triangle) in mesh.triangles().iter().enumerate() {
        if faces_light(triangle, light, epsilon) {
            out.set(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use umbra_mesh::CuboidShape;

    #[test]
    fn test_bits_span_words() {
        let mut vis = Visibility::new(130);
        vis.set(0);
        vis.set(64);
        vis.set(129);
        assert_eq!(vis.count_visible(), 3);
        assert!(vis.get(129));
        assert!(!vis.get(128));
        assert!(!vis.get(500));
        assert_eq!(vis.visible().map(|t| t.index()).collect::<Vec<_>>(), vec![0, 64, 129]);

        vis.reset(10);
        assert_eq!(vis.len(), 10);
        assert_eq!(vis.count_visible(), 0);
    }

    #[test]
    fn test_cube_top_faces_light_above() {
        let mesh = Mesh::from_source(&CuboidShape::cube(2.0)).unwrap();
        let mut vis = Visibility::default();
        classify(&mesh, Vec3::new(0.0, 0.0, 100.0), 1e-6, &mut vis);
        assert_eq!(vis.count_visible(), 2);
        for id in vis.visible() {
            let tri = mesh.triangle(id).unwrap();
            assert!(tri.normal.z > 0.9);
        }
    }

    #[test]
    fn test_light_at_centroid_is_not_visible() {
        let mesh = Mesh::from_source(&CuboidShape::cube(2.0)).unwrap();
        let tri = &mesh.triangles()[0];
        assert!(!faces_light(tri, tri.centroid, 1e-6));
    }

    #[test]
    fn test_classification_is_repeatable() {
        let mesh = Mesh::from_source(&CuboidShape::cube(2.0)).unwrap();
        let light = Vec3::new(3.0, -2.0, 7.0);
        let mut a = Visibility::default();
        let mut b = Visibility::default();
        classify(&mesh, light, 1e-6, &mut a);
        classify(&mesh, light, 1e-6, &mut b);
        classify(&mesh, light, 1e-6, &mut b);
        assert_eq!(a, b);
    }
}
