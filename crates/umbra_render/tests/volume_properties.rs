//! Geometric properties of generated shadow volumes

use std::collections::HashMap;
use std::sync::Arc;

use approx::assert_relative_eq;
use umbra_math::{EulerTransform, Vec3};
use umbra_mesh::{CuboidShape, EdgeKey, Mesh, PyramidShape, TriangleId};
use umbra_render::shadow::silhouette::{self, SilhouetteBuilder};
use umbra_render::shadow::volume::{self, VolumeParams};
use umbra_render::{ShadowConfig, ShadowVolume, ShadowVolumeGenerator, Visibility};

const LIGHTS: [[f32; 3]; 5] = [
    [0.0, 0.0, 100.0],
    [3.0, 7.0, 20.0],
    [-15.0, 2.0, 1.5],
    [0.5, -9.0, -4.0],
    [6.0, 18.0, 9.0],
];

fn generator(mesh: Mesh) -> ShadowVolumeGenerator {
    ShadowVolumeGenerator::new(Arc::new(mesh), &ShadowConfig::default())
}

fn closed_meshes() -> Vec<Mesh> {
    vec![
        Mesh::from_source(&CuboidShape::cube(1.0)).unwrap(),
        Mesh::from_source(&CuboidShape::new(5.0, 0.5, 0.5)).unwrap(),
        Mesh::from_source(&PyramidShape::new(2.0, 2.0, 2.0)).unwrap(),
    ]
}

fn bits(p: [f32; 3]) -> [u32; 3] {
    p.map(f32::to_bits)
}

#[test]
fn test_cube_lit_from_above() {
    let mut gen = generator(Mesh::from_source(&CuboidShape::cube(1.0)).unwrap());
    gen.transform_light(Vec3::new(0.0, 0.0, 100.0), &EulerTransform::IDENTITY).unwrap();

    let visible: Vec<TriangleId> = gen.classify_visibility().unwrap().visible().collect();
    assert_eq!(visible.len(), 2);

    let silhouette = gen.extract_silhouette().unwrap().to_vec();
    assert_eq!(silhouette.len(), 4);
    let mesh = gen.mesh().clone();
    for id in &silhouette {
        let edge = mesh.edge(*id).unwrap();
        let a = mesh.vertex(edge.v1).unwrap();
        let b = mesh.vertex(edge.v2).unwrap();
        // Outline of the top face
        assert_eq!(a.z, 1.0);
        assert_eq!(b.z, 1.0);
    }

    let volume = gen.build_volume().unwrap();
    assert_eq!(volume.triangle_count(), 12);
    assert_eq!(volume.stats.side_triangles, 8);
    assert_eq!(volume.stats.cap_triangles, 4);
    assert_eq!(volume.stats.skipped_edges, 0);

    // First side triangle of each quad is (v1, v2, v1')
    for quad in volume.indices.chunks(6).take(4) {
        let v1 = Vec3::from_array(volume.positions[quad[0] as usize]);
        let v1_extruded = Vec3::from_array(volume.positions[quad[2] as usize]);
        assert_relative_eq!(v1.distance(v1_extruded), 30.0, epsilon = 1e-4);
        assert!(v1_extruded.z < v1.z);
    }
}

#[test]
fn test_silhouette_edges_border_one_visible_triangle() {
    for mesh in closed_meshes() {
        let adjacency = mesh.edge_adjacency();
        let mut gen = generator(mesh.clone());
        for light in LIGHTS {
            gen.transform_light(Vec3::from_array(light), &EulerTransform::IDENTITY).unwrap();
            let visible = gen.classify_visibility().unwrap().clone();
            let edges = gen.extract_silhouette().unwrap().to_vec();

            for id in &edges {
                let key = mesh.edge(*id).unwrap().key();
                let lit = adjacency[&key].iter().filter(|t| visible.is_visible(**t)).count();
                assert_eq!(lit, 1, "{} edge {:?} light {:?}", mesh.name(), key, light);
            }

            // Every edge with exactly one lit neighbour is on the silhouette
            let expected = adjacency
                .values()
                .filter(|tris| tris.iter().filter(|t| visible.is_visible(**t)).count() == 1)
                .count();
            assert_eq!(edges.len(), expected);
        }
    }
}

#[test]
fn test_silhouette_forms_closed_loops() {
    for mesh in closed_meshes() {
        let mut gen = generator(mesh.clone());
        for light in LIGHTS {
            gen.transform_light(Vec3::from_array(light), &EulerTransform::IDENTITY).unwrap();
            gen.classify_visibility().unwrap();
            let edges = gen.extract_silhouette().unwrap();

            let mut degree: HashMap<u32, i32> = HashMap::new();
            for id in edges {
                let edge = mesh.edge(*id).unwrap();
                *degree.entry(edge.v1.0).or_default() += 1;
                *degree.entry(edge.v2.0).or_default() -= 1;
            }
            // Each vertex is entered as often as it is left
            assert!(degree.values().all(|d| *d == 0), "{} light {:?}", mesh.name(), light);
        }
    }
}

#[test]
fn test_volume_is_closed_and_consistently_wound() {
    for mesh in closed_meshes() {
        let mut gen = generator(mesh.clone());
        for light in LIGHTS {
            let volume = gen.generate(Vec3::from_array(light), &EulerTransform::IDENTITY).unwrap();
            assert!(!volume.is_empty());

            let mut directed: HashMap<([u32; 3], [u32; 3]), i32> = HashMap::new();
            for tri in volume.indices.chunks(3) {
                let p = [0, 1, 2].map(|k| bits(volume.positions[tri[k] as usize]));
                for k in 0..3 {
                    *directed.entry((p[k], p[(k + 1) % 3])).or_default() += 1;
                }
            }
            for (&(a, b), &count) in &directed {
                assert_eq!(count, 1, "{} duplicated edge, light {:?}", mesh.name(), light);
                assert_eq!(directed.get(&(b, a)), Some(&1), "{} open edge, light {:?}", mesh.name(), light);
            }
        }
    }
}

#[test]
fn test_generation_is_deterministic() {
    let transform = EulerTransform::new(Vec3::new(8.0, -6.0, -8.0), Vec3::new(0.0, 1.55, 0.0));
    let light = Vec3::new(1.2, 21.0, -3.0);

    let mut a = generator(Mesh::from_source(&CuboidShape::new(4.0, 1.0, 1.0)).unwrap());
    let mut b = generator(Mesh::from_source(&CuboidShape::new(4.0, 1.0, 1.0)).unwrap());

    let first = a.generate(light, &transform).unwrap();
    let again = a.generate(light, &transform).unwrap();
    let other = b.generate(light, &transform).unwrap();
    assert_eq!(first, again);
    assert_eq!(first, other);
}

#[test]
fn test_transformed_caster_matches_local_light() {
    let mesh = Mesh::from_source(&PyramidShape::new(2.0, 2.0, 2.0)).unwrap();
    let transform = EulerTransform::new(Vec3::new(-4.0, 5.0, 0.0), Vec3::new(0.4, -0.7, 1.1));
    let light_world = Vec3::new(3.0, 18.0, 6.0);

    let mut world = generator(mesh.clone());
    let expected_local = transform.inverse_transform_point(light_world);
    let from_world = world.generate(light_world, &transform).unwrap();

    let mut local = generator(mesh);
    let from_local = local.generate(expected_local, &EulerTransform::IDENTITY).unwrap();
    assert_eq!(from_world, from_local);
}

#[test]
fn test_light_on_vertex_never_produces_nan() {
    let mesh = Mesh::from_source(&CuboidShape::cube(1.0)).unwrap();
    let mut gen = generator(mesh.clone());

    for corner in mesh.vertices().to_vec() {
        let volume = gen.generate(corner, &EulerTransform::IDENTITY).unwrap();
        assert!(volume.positions.iter().flatten().all(|c| c.is_finite()));
    }
}

#[test]
fn test_coincident_vertex_skips_edges_and_caps() {
    let mesh = Mesh::from_source(&CuboidShape::cube(1.0)).unwrap();
    // Force the top face visible with the light sitting on one of its corners
    let top = mesh.triangles()[0];
    let light = mesh.vertex(top.vertices[2]).unwrap();

    let mut visibility = Visibility::new(mesh.triangle_count());
    visibility.set(0);
    visibility.set(1);
    let mut edges = Vec::new();
    silhouette::extract(&mesh, &visibility, &mut SilhouetteBuilder::new(), &mut edges);
    assert_eq!(edges.len(), 4);

    let volume: ShadowVolume = volume::build(&mesh, &visibility, &edges, VolumeParams { light, depth: 30.0, epsilon: 1e-6 });
    assert_eq!(volume.stats.skipped_edges, 2);
    assert_eq!(volume.stats.skipped_triangles, 2);
    assert_eq!(volume.stats.side_triangles, 4);
    assert_eq!(volume.stats.cap_triangles, 0);
    assert!(volume.positions.iter().flatten().all(|c| c.is_finite()));
}

#[test]
fn test_silhouette_key_is_direction_independent() {
    let mesh = Mesh::from_source(&CuboidShape::cube(1.0)).unwrap();
    let adjacency = mesh.edge_adjacency();
    for edge in mesh.edges() {
        assert_eq!(edge.key(), EdgeKey::new(edge.v2, edge.v1));
        assert_eq!(adjacency[&edge.key()].len(), 2);
    }
}
