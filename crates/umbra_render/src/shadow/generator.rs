//! Per-caster shadow volume generator
//!
//! One generator exists per (caster, light) pair. Each frame it walks
//! `Idle -> LightTransformed -> VisibilityClassified -> SilhouetteExtracted
//! -> Done`; a step called from the wrong state fails with
//! [`ShadowError::OutOfOrder`] instead of working on stale buffers.

use std::sync::Arc;

use umbra_math::{EulerTransform, Vec3};
use umbra_mesh::{EdgeId, Mesh};

use super::config::ShadowConfig;
use super::silhouette::{self, SilhouetteBuilder};
use super::visibility::{self, Visibility};
use super::volume::{self, ShadowVolume, VolumeParams};
use crate::error::{ShadowError, ShadowResult};

/// Position in the per-frame generation sequence
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeneratorState {
    #[default]
    Idle,
    LightTransformed,
    VisibilityClassified,
    SilhouetteExtracted,
    Done,
}

/// Builds shadow volumes for one mesh
#[derive(Debug)]
pub struct ShadowVolumeGenerator {
    mesh: Arc<Mesh>,
    config: ShadowConfig,
    state: GeneratorState,
    light_local: Vec3,
    visibility: Visibility,
    builder: SilhouetteBuilder,
    silhouette: Vec<EdgeId>,
}

impl ShadowVolumeGenerator {
    pub fn new(mesh: Arc<Mesh>, config: &ShadowConfig) -> Self {
        let mut config = config.clone();
        config.validate();
        Self {
            mesh,
            config,
            state: GeneratorState::Idle,
            light_local: Vec3::ZERO,
            visibility: Visibility::default(),
            builder: SilhouetteBuilder::new(),
            silhouette: Vec::new(),
        }
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    /// Light position in mesh space, once transformed this frame
    pub fn light_local(&self) -> Option<Vec3> {
        (self.state != GeneratorState::Idle).then_some(self.light_local)
    }

    /// Drop per-frame buffers and return to `Idle`
    pub fn reset(&mut self) {
        self.visibility.reset(0);
        self.builder.clear();
        self.silhouette.clear();
        self.state = GeneratorState::Idle;
    }

    fn expect_state(&self, expected: GeneratorState) -> ShadowResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ShadowError::OutOfOrder { expected, found: self.state })
        }
    }

    /// Start a frame: move the world-space light into the mesh's local frame.
    ///
    /// Valid from any state. Discards whatever the previous frame left.
    pub fn transform_light(&mut self, light_world: Vec3, transform: &EulerTransform) -> ShadowResult<Vec3> {
        self.reset();
        if !light_world.is_finite() {
            return Err(ShadowError::InvalidLight(light_world.to_array()));
        }
        if !transform.is_finite() {
            return Err(ShadowError::InvalidTransform);
        }
        self.light_local = transform.inverse_transform_point(light_world);
        self.state = GeneratorState::LightTransformed;
        Ok(self.light_local)
    }

    /// Flag the triangles facing the light
    pub fn classify_visibility(&mut self) -> ShadowResult<&Visibility> {
        self.expect_state(GeneratorState::LightTransformed)?;
        visibility::classify(&self.mesh, self.light_local, self.config.degenerate_epsilon, &mut self.visibility);
        self.state = GeneratorState::VisibilityClassified;
        Ok(&self.visibility)
    }

    /// Outline edges of the visible set, oriented as their visible triangle
    pub fn extract_silhouette(&mut self) -> ShadowResult<&[EdgeId]> {
        self.expect_state(GeneratorState::VisibilityClassified)?;
        silhouette::extract(&self.mesh, &self.visibility, &mut self.builder, &mut self.silhouette);
        self.state = GeneratorState::SilhouetteExtracted;
        Ok(&self.silhouette)
    }

    /// Extrude the silhouette and caps into a closed volume, ending the frame
    pub fn build_volume(&mut self) -> ShadowResult<ShadowVolume> {
        self.expect_state(GeneratorState::SilhouetteExtracted)?;
        let params = VolumeParams {
            light: self.light_local,
            depth: self.config.extrusion_depth,
            epsilon: self.config.degenerate_epsilon,
        };
        let volume = volume::build(&self.mesh, &self.visibility, &self.silhouette, params);

        self.visibility.reset(0);
        self.builder.clear();
        self.silhouette.clear();
        self.state = GeneratorState::Done;

        log::debug!(
            "Volume for '{}': {} visible, {} silhouette edges, {} triangles",
            self.mesh.name(),
            volume.stats.visible_triangles,
            volume.stats.silhouette_edges,
            volume.triangle_count()
        );
        Ok(volume)
    }

    /// Run every step for one frame
    pub fn generate(&mut self, light_world: Vec3, transform: &EulerTransform) -> ShadowResult<ShadowVolume> {
        self.transform_light(light_world, transform)?;
        self.classify_visibility()?;
        self.extract_silhouette()?;
        self.build_volume()
    }
}
