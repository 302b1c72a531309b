//! Animated shadow scene
//!
//! Owns the shapes, their placements, the orbiting light and one shadow
//! generator per casting instance. Each frame draws the lit geometry, marks
//! every caster's volume into the stencil buffer and finishes with the
//! darkening overlay.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use umbra_math::{radians, EulerTransform, Vec3};
use umbra_mesh::{CuboidShape, Mesh};
use umbra_render::{
    AttributeStream, BufferId, Capability, CompareFunction, Face, GraphicsBackend, OrthoCamera, ShadowConfig,
    ShadowVolumeGenerator, StencilCompositor,
};

use crate::config::{CameraConfig, SceneConfig};
use crate::context::RenderContext;
use crate::error::{SceneError, SceneResult};
use crate::light::OrbitingLight;

/// Half-extent of the cube drawn at the light position
pub const LIGHT_MARKER_SIZE: f32 = 0.2;

const LIGHT_MARKER_COLOR: [f32; 4] = [1.0, 0.87, 0.0, 1.0];

/// A mesh plus how it is drawn
#[derive(Clone, Debug)]
pub struct SceneShape {
    pub mesh: Arc<Mesh>,
    pub casts_shadow: bool,
    pub color: [f32; 4],
}

/// One placement of a shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeInstance {
    pub shape: usize,
    pub transform: EulerTransform,
    /// Radians gained per elapsed millisecond on each axis
    pub spin: Vec3,
}

/// What one frame drew
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Casters whose volume reached the stencil buffer
    pub casters: usize,
    /// Casters dropped this frame after a generation or upload failure
    pub skipped_casters: usize,
    pub volume_triangles: usize,
    pub silhouette_edges: usize,
}

#[derive(Clone, Copy, Debug)]
struct MeshBuffers {
    positions: BufferId,
    indices: BufferId,
}

pub struct Scene {
    shapes: Vec<SceneShape>,
    instances: Vec<ShapeInstance>,
    light: OrbitingLight,
    camera: CameraConfig,
    camera_angle: f32,
    show_light: bool,
    ambient: f32,
    diffuse: f32,
    marker: Arc<Mesh>,
    compositor: StencilCompositor,
    generators: Vec<Option<ShadowVolumeGenerator>>,
    /// Static geometry per shape, the light marker last
    buffers: Vec<Option<MeshBuffers>>,
}

impl Scene {
    /// The default demo layout
    pub fn demo(shadow: &ShadowConfig) -> SceneResult<Self> {
        Self::from_config(&SceneConfig::default(), shadow)
    }

    /// Scene with no shapes and default camera and lighting
    pub fn new(shadow: &ShadowConfig) -> SceneResult<Self> {
        Self::from_config(&SceneConfig::empty(), shadow)
    }

    pub fn from_config(config: &SceneConfig, shadow: &ShadowConfig) -> SceneResult<Self> {
        let marker = Arc::new(Mesh::from_source(&CuboidShape::cube(LIGHT_MARKER_SIZE))?);
        let mut scene = Self {
            shapes: Vec::new(),
            instances: Vec::new(),
            light: OrbitingLight::new(),
            camera: config.camera.clone(),
            camera_angle: 0.0,
            show_light: config.show_light,
            ambient: config.ambient,
            diffuse: config.diffuse,
            marker,
            compositor: StencilCompositor::new(shadow),
            generators: Vec::new(),
            buffers: vec![None],
        };

        for shape in &config.shapes {
            scene.add_shape(Arc::new(shape.kind.build()?), shape.casts_shadow, shape.color);
        }
        for instance in &config.instances {
            let index = scene.add_instance(instance.shape, EulerTransform::new(instance.location(), instance.angle()))?;
            scene.instances[index].spin = instance.spin();
        }

        log::info!(
            "Scene: {} shapes, {} instances, {} casters",
            scene.shapes.len(),
            scene.instances.len(),
            config.caster_count()
        );
        Ok(scene)
    }

    /// Register a shape and return its index
    pub fn add_shape(&mut self, mesh: Arc<Mesh>, casts_shadow: bool, color: [f32; 4]) -> usize {
        self.shapes.push(SceneShape { mesh, casts_shadow, color });
        // Keep the marker slot last
        self.buffers.insert(self.shapes.len() - 1, None);
        self.shapes.len() - 1
    }

    /// Place a registered shape and return the instance index
    pub fn add_instance(&mut self, shape: usize, transform: EulerTransform) -> SceneResult<usize> {
        if shape >= self.shapes.len() {
            return Err(SceneError::UnknownShape(shape));
        }
        self.instances.push(ShapeInstance { shape, transform, spin: Vec3::ZERO });
        self.generators.push(None);
        Ok(self.instances.len() - 1)
    }

    pub fn shapes(&self) -> &[SceneShape] {
        &self.shapes
    }

    pub fn instances(&self) -> &[ShapeInstance] {
        &self.instances
    }

    pub fn instance_mut(&mut self, index: usize) -> Option<&mut ShapeInstance> {
        self.instances.get_mut(index)
    }

    pub fn light(&self) -> &OrbitingLight {
        &self.light
    }

    pub fn shadow_config(&self) -> &ShadowConfig {
        self.compositor.config()
    }

    /// Stencil value to clear to before [`Self::render`]
    pub fn stencil_clear_value(&self) -> u8 {
        self.compositor.stencil_clear_value()
    }

    /// Advance the light, the camera orbit and every spinning instance
    pub fn update(&mut self, elapsed_ms: f32) {
        self.camera_angle += self.camera.orbit_speed * elapsed_ms;
        self.light.update(elapsed_ms);
        for instance in &mut self.instances {
            instance.transform.angles += instance.spin * elapsed_ms;
        }
    }

    /// Camera for the current orbit angle
    pub fn camera(&self) -> OrthoCamera {
        OrthoCamera::orbiting(
            self.camera.half_width,
            self.camera.eye_distance,
            radians(-self.camera_angle),
            radians(self.camera.tilt_degrees),
        )
    }

    /// Draw one frame.
    ///
    /// The backend must already be cleared to [`Self::stencil_clear_value`].
    /// A caster whose volume cannot be built or uploaded is skipped with a
    /// warning; the rest of the frame still renders.
    pub fn render<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) -> SceneResult<FrameStats> {
        let ctx = RenderContext::new(self.light.position(), self.compositor.config().clone());
        let light = ctx.require_light()?;
        if let Some(instance) = self.instances.iter().find(|i| i.shape >= self.shapes.len()) {
            return Err(SceneError::UnknownShape(instance.shape));
        }

        backend.enable(Capability::DepthTest);
        backend.set_depth_func(CompareFunction::Less);
        backend.set_depth_mask(true);
        backend.set_color_mask(true, true, true, true);
        backend.disable(Capability::StencilTest);
        backend.disable(Capability::Blend);
        backend.enable(Capability::CullFace);
        backend.set_cull_face(Face::Back);

        for index in 0..self.instances.len() {
            let instance = self.instances[index];
            let shape = self.shapes.get(instance.shape).ok_or(SceneError::UnknownShape(instance.shape))?;
            let (mesh, color) = (shape.mesh.clone(), shape.color);
            self.draw_lit(backend, instance.shape, &mesh, &ctx.with_transform(instance.transform), color)?;
        }
        if self.show_light {
            let marker = self.marker.clone();
            let slot = self.shapes.len();
            let ctx = ctx.with_transform(EulerTransform::from_translation(light));
            self.draw_lit(backend, slot, &marker, &ctx, LIGHT_MARKER_COLOR)?;
        }

        let stats = self.mark_casters(backend, &ctx);
        self.compositor.draw_overlay(backend)?;

        log::debug!(
            "Frame: {} casters ({} skipped), {} volume triangles, {} silhouette edges",
            stats.casters,
            stats.skipped_casters,
            stats.volume_triangles,
            stats.silhouette_edges
        );
        Ok(stats)
    }

    fn mark_casters<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B, ctx: &RenderContext) -> FrameStats {
        let mut stats = FrameStats::default();
        let light = match ctx.light {
            Some(light) => light,
            None => return stats,
        };

        for (index, instance) in self.instances.iter().enumerate() {
            let shape = match self.shapes.get(instance.shape) {
                Some(shape) if shape.casts_shadow => shape,
                _ => continue,
            };

            let generator = self.generators[index]
                .get_or_insert_with(|| ShadowVolumeGenerator::new(shape.mesh.clone(), &ctx.stencil));
            let volume = match generator.generate(light, &instance.transform) {
                Ok(volume) => volume,
                Err(err) => {
                    log::warn!("Skipping shadow of instance {} ('{}'): {}", index, shape.mesh.name(), err);
                    stats.skipped_casters += 1;
                    continue;
                }
            };

            match self.compositor.mark_volume(backend, &volume, &instance.transform) {
                Ok(()) => {
                    stats.casters += 1;
                    stats.volume_triangles += volume.triangle_count();
                    stats.silhouette_edges += volume.stats.silhouette_edges;
                }
                Err(err) => {
                    log::warn!("Skipping shadow of instance {} ('{}'): {}", index, shape.mesh.name(), err);
                    stats.skipped_casters += 1;
                }
            }
        }
        stats
    }

    /// Draw a mesh with per-vertex Lambert shading from the frame's light
    fn draw_lit<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        slot: usize,
        mesh: &Mesh,
        ctx: &RenderContext,
        color: [f32; 4],
    ) -> SceneResult<()> {
        let buffers = self.mesh_buffers(backend, slot, mesh)?;
        let light = ctx.require_light()?;
        let colors = self.shade(mesh, &ctx.transform, light, color);

        let color_buffer = backend.upload_vertex_buffer(&colors)?;
        backend.bind_attribute(AttributeStream::ObjectPosition, buffers.positions);
        backend.bind_attribute(AttributeStream::Color, color_buffer);
        backend.set_model_transform(&ctx.transform);
        let drawn = backend.draw_indexed_triangles(buffers.indices);
        backend.unbind_attribute(AttributeStream::Color);
        backend.release_buffer(color_buffer);
        drawn.map_err(SceneError::from)
    }

    fn shade(&self, mesh: &Mesh, transform: &EulerTransform, light: Vec3, color: [f32; 4]) -> Vec<f32> {
        let geometry = mesh.render_geometry();
        let mut colors = Vec::with_capacity(geometry.vertex_count() * 4);
        for (position, normal) in geometry.positions.iter().zip(&geometry.normals) {
            let world = transform.transform_point(Vec3::from_array(*position));
            let normal = transform.transform_point(Vec3::from_array(*normal)) - transform.translation;
            let to_light = (light - world).normalize_or_zero();
            let intensity = (self.ambient + self.diffuse * normal.dot(to_light).max(0.0)).min(1.0);
            colors.extend_from_slice(&[color[0] * intensity, color[1] * intensity, color[2] * intensity, color[3]]);
        }
        colors
    }

    fn mesh_buffers<B: GraphicsBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        slot: usize,
        mesh: &Mesh,
    ) -> SceneResult<MeshBuffers> {
        if let Some(buffers) = self.buffers[slot] {
            return Ok(buffers);
        }

        let geometry = mesh.render_geometry();
        let positions = backend.upload_vertex_buffer(bytemuck::cast_slice(&geometry.positions))?;
        let indices = match backend.upload_index_buffer(&geometry.indices) {
            Ok(indices) => indices,
            Err(err) => {
                backend.release_buffer(positions);
                return Err(err.into());
            }
        };
        let buffers = MeshBuffers { positions, indices };
        self.buffers[slot] = Some(buffers);
        Ok(buffers)
    }

    /// Release cached mesh buffers; the next render uploads them again
    pub fn release_buffers<B: GraphicsBackend + ?Sized>(&mut self, backend: &mut B) {
        for buffers in self.buffers.iter_mut().filter_map(Option::take) {
            backend.release_buffer(buffers.indices);
            backend.release_buffer(buffers.positions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use umbra_render::{BackendCall, RecordingBackend};

    fn demo() -> Scene {
        Scene::demo(&ShadowConfig::default()).unwrap()
    }

    #[test]
    fn test_demo_builds() {
        let scene = demo();
        assert_eq!(scene.shapes().len(), 6);
        assert_eq!(scene.instances().len(), 8);
        assert_eq!(scene.stencil_clear_value(), 128);
    }

    #[test]
    fn test_unknown_shape_rejected() {
        let mut config = SceneConfig::default();
        config.instances[2].shape = 42;
        assert_eq!(
            Scene::from_config(&config, &ShadowConfig::default()).err(),
            Some(SceneError::UnknownShape(42))
        );
    }

    #[test]
    fn test_build_scene_by_hand() {
        let mut scene = Scene::new(&ShadowConfig::default()).unwrap();
        let cube = Arc::new(Mesh::from_source(&CuboidShape::cube(1.0)).unwrap());
        let shape = scene.add_shape(cube, true, [1.0; 4]);
        assert_eq!(scene.add_instance(shape, EulerTransform::IDENTITY), Ok(0));
        assert_eq!(scene.add_instance(3, EulerTransform::IDENTITY), Err(SceneError::UnknownShape(3)));

        scene.update(16.0);
        let mut backend = RecordingBackend::new();
        let stats = scene.render(&mut backend).unwrap();
        assert_eq!(stats.casters, 1);
        // Cube and marker geometry stay cached
        assert_eq!(backend.live_buffers(), 4);
    }

    #[test]
    fn test_render_before_update_needs_light() {
        let mut scene = demo();
        let mut backend = RecordingBackend::new();
        assert_eq!(scene.render(&mut backend), Err(SceneError::MissingLight));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_render_rejects_retargeted_instance() {
        let mut scene = demo();
        scene.update(16.0);
        scene.instance_mut(0).unwrap().shape = 99;

        let mut backend = RecordingBackend::new();
        assert_eq!(scene.render(&mut backend), Err(SceneError::UnknownShape(99)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn test_lit_draw_unbinds_color() {
        let mut scene = demo();
        scene.update(16.0);
        let mut backend = RecordingBackend::new();
        scene.render(&mut backend).unwrap();

        let calls = backend.calls();
        let first_draw = calls.iter().position(|c| matches!(c, BackendCall::DrawIndexedTriangles { .. })).unwrap();
        assert_eq!(
            calls[first_draw + 1],
            BackendCall::UnbindAttribute(AttributeStream::Color)
        );
    }

    #[test]
    fn test_update_spins_bar_only() {
        let mut scene = demo();
        scene.update(1000.0);
        let bar = scene.instances()[1].transform.angles;
        assert_relative_eq!(bar.y, 0.6, epsilon = 1e-5);
        assert_relative_eq!(bar.z, 0.5, epsilon = 1e-5);
        assert_eq!(scene.instances()[3].transform.angles, Vec3::new(0.0, 1.55, 0.0));
        assert!(scene.light().position().is_some());
    }

    #[test]
    fn test_camera_orbits() {
        let mut scene = demo();
        let start = scene.camera();
        assert_relative_eq!(start.view.angles.x, radians(20.0), epsilon = 1e-6);
        assert_eq!(start.view.angles.y, 0.0);

        scene.update(100.0);
        assert_relative_eq!(scene.camera().view.angles.y, radians(-5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_shading_is_ambient_away_from_light() {
        let scene = demo();
        let mesh = Mesh::from_source(&CuboidShape::cube(1.0)).unwrap();
        let colors = scene.shade(&mesh, &EulerTransform::IDENTITY, Vec3::new(0.0, 100.0, 0.0), [1.0; 4]);
        let normals = &mesh.render_geometry().normals;
        for (rgba, n) in colors.chunks(4).zip(normals) {
            if n[1] < -0.5 {
                assert_relative_eq!(rgba[0], 0.5, epsilon = 1e-5);
            }
            if n[1] > 0.5 {
                assert!(rgba[0] > 0.99);
            }
            assert_eq!(rgba[3], 1.0);
        }
    }
}
