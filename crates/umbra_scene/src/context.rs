//! Per-draw render context
//!
//! Everything a caster needs to build its shadow for one frame, passed by
//! value instead of living in shared mutable state.

use umbra_math::{EulerTransform, Vec3};
use umbra_render::ShadowConfig;

use crate::error::{SceneError, SceneResult};

#[derive(Clone, Debug, PartialEq)]
pub struct RenderContext {
    /// World-space light position, if the light has been placed yet
    pub light: Option<Vec3>,
    /// Model transform of the instance being drawn
    pub transform: EulerTransform,
    pub stencil: ShadowConfig,
}

impl RenderContext {
    pub fn new(light: Option<Vec3>, stencil: ShadowConfig) -> Self {
        Self {
            light,
            transform: EulerTransform::IDENTITY,
            stencil,
        }
    }

    /// Same frame, different instance
    pub fn with_transform(&self, transform: EulerTransform) -> Self {
        Self {
            transform,
            ..self.clone()
        }
    }

    pub fn require_light(&self) -> SceneResult<Vec3> {
        self.light.ok_or(SceneError::MissingLight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_light() {
        let ctx = RenderContext::new(None, ShadowConfig::default());
        assert_eq!(ctx.require_light(), Err(SceneError::MissingLight));
    }

    #[test]
    fn test_with_transform_keeps_frame_data() {
        let ctx = RenderContext::new(Some(Vec3::new(0.0, 20.0, 0.0)), ShadowConfig::deep(50.0));
        let moved = ctx.with_transform(EulerTransform::from_translation(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(moved.light, ctx.light);
        assert_eq!(moved.stencil.extrusion_depth, 50.0);
        assert_eq!(moved.transform.translation.x, 1.0);
    }
}
