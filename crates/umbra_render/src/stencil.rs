//! Stencil compositing of shadow volumes
//!
//! Two ordered passes per frame:
//!
//! 1. [`StencilCompositor::mark_volume`], once per caster, counts how many
//!    volumes enclose each visible pixel into the stencil buffer.
//! 2. [`StencilCompositor::draw_overlay`], once per frame, darkens the
//!    colour buffer by a per-count alpha using a full-screen quad.
//!
//! The host clears the stencil to [`StencilCompositor::stencil_clear_value`]
//! before marking.

use std::ops::{Deref, DerefMut};

use umbra_math::EulerTransform;

use crate::backend::{BufferId, GraphicsBackend};
use crate::error::ShadowResult;
use crate::shadow::{MarkStrategy, ShadowConfig, ShadowVolume};
use crate::state::{AttributeStream, BlendFactor, Capability, CompareFunction, Face, StencilOp};

/// Full-screen quad in normalized device coordinates, counter-clockwise
const SCREEN_QUAD: [f32; 12] = [
    -1.0, -1.0, 0.0,
    1.0, -1.0, 0.0,
    1.0, 1.0, 0.0,
    -1.0, 1.0, 0.0,
];
const SCREEN_QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Restores write masks and disables the stencil test when a mark pass ends
struct MarkStateGuard<'a, B: GraphicsBackend + ?Sized> {
    backend: &'a mut B,
    culling: bool,
}

impl<'a, B: GraphicsBackend + ?Sized> MarkStateGuard<'a, B> {
    fn new(backend: &'a mut B) -> Self {
        Self { backend, culling: false }
    }

    fn enable_culling(&mut self) {
        self.culling = true;
        self.backend.enable(Capability::CullFace);
    }
}

impl<B: GraphicsBackend + ?Sized> Deref for MarkStateGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: GraphicsBackend + ?Sized> DerefMut for MarkStateGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: GraphicsBackend + ?Sized> Drop for MarkStateGuard<'_, B> {
    fn drop(&mut self) {
        if self.culling {
            self.backend.disable(Capability::CullFace);
        }
        self.backend.unbind_attribute(AttributeStream::ObjectPosition);
        self.backend.set_color_mask(true, true, true, true);
        self.backend.set_depth_mask(true);
        self.backend.disable(Capability::StencilTest);
    }
}

/// Restores default render state and frees overlay buffers on drop
struct OverlayStateGuard<'a, B: GraphicsBackend + ?Sized> {
    backend: &'a mut B,
    buffers: Vec<BufferId>,
}

impl<'a, B: GraphicsBackend + ?Sized> OverlayStateGuard<'a, B> {
    fn new(backend: &'a mut B) -> Self {
        Self { backend, buffers: Vec::new() }
    }

    fn track(&mut self, buffer: BufferId) -> BufferId {
        self.buffers.push(buffer);
        buffer
    }

    fn release(&mut self, buffer: BufferId) {
        self.buffers.retain(|b| *b != buffer);
        self.backend.release_buffer(buffer);
    }
}

impl<B: GraphicsBackend + ?Sized> Deref for OverlayStateGuard<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.backend
    }
}

impl<B: GraphicsBackend + ?Sized> DerefMut for OverlayStateGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.backend
    }
}

impl<B: GraphicsBackend + ?Sized> Drop for OverlayStateGuard<'_, B> {
    fn drop(&mut self) {
        self.backend.unbind_attribute(AttributeStream::Color);
        self.backend.unbind_attribute(AttributeStream::ScreenPosition);
        for buffer in self.buffers.drain(..) {
            self.backend.release_buffer(buffer);
        }
        self.backend.set_color_mask(true, true, true, true);
        self.backend.set_depth_mask(true);
        self.backend.disable(Capability::StencilTest);
        self.backend.disable(Capability::Blend);
        self.backend.enable(Capability::DepthTest);
    }
}

/// Drives the mark and overlay passes against a [`GraphicsBackend`]
#[derive(Clone, Debug)]
pub struct StencilCompositor {
    config: ShadowConfig,
    alphas: Vec<f32>,
}

impl StencilCompositor {
    pub fn new(config: &ShadowConfig) -> Self {
        let mut config = config.clone();
        config.validate();
        let alphas = (1..=config.overlay_passes).map(|k| config.overlay_alpha(k)).collect();
        Self { config, alphas }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// Value the stencil buffer must hold before the first mark pass
    pub fn stencil_clear_value(&self) -> u8 {
        self.config.stencil_base
    }

    /// Destination scale per overlay pass; entry `k - 1` applies to pixels
    /// enclosed by `k` volumes
    pub fn overlay_alphas(&self) -> &[f32] {
        &self.alphas
    }

    /// Count `volume` into the stencil buffer.
    ///
    /// Colour and depth writes are off for the duration; depth testing
    /// stays on so only volume faces in front of visible geometry count.
    /// Back faces increment, front faces decrement. Write masks come back
    /// on and the stencil test off on return, including on error.
    pub fn mark_volume<B: GraphicsBackend + ?Sized>(
        &self,
        backend: &mut B,
        volume: &ShadowVolume,
        transform: &EulerTransform,
    ) -> ShadowResult<()> {
        if volume.is_empty() {
            return Ok(());
        }

        let vertices = backend.upload_vertex_buffer(volume.positions_flat())?;
        let indices = match backend.upload_index_buffer(&volume.indices) {
            Ok(indices) => indices,
            Err(err) => {
                backend.release_buffer(vertices);
                return Err(err.into());
            }
        };

        let result = self.draw_marked(backend, vertices, indices, transform);
        backend.release_buffer(indices);
        backend.release_buffer(vertices);
        result
    }

    fn draw_marked<B: GraphicsBackend + ?Sized>(
        &self,
        backend: &mut B,
        vertices: BufferId,
        indices: BufferId,
        transform: &EulerTransform,
    ) -> ShadowResult<()> {
        let mut guard = MarkStateGuard::new(backend);

        // Volumes carry positions only
        guard.unbind_attribute(AttributeStream::Color);
        guard.bind_attribute(AttributeStream::ObjectPosition, vertices);
        guard.set_model_transform(transform);

        guard.set_color_mask(false, false, false, false);
        guard.set_depth_mask(false);
        guard.enable(Capability::DepthTest);
        guard.set_depth_func(self.config.volume_depth_compare);
        guard.disable(Capability::CullFace);
        guard.enable(Capability::StencilTest);
        guard.set_stencil_func(CompareFunction::Always, 0, 0xFF);

        match self.config.mark_strategy {
            MarkStrategy::SeparateFaces => {
                guard.set_stencil_op(Face::Back, StencilOp::Keep, StencilOp::Keep, StencilOp::Increment);
                guard.set_stencil_op(Face::Front, StencilOp::Keep, StencilOp::Keep, StencilOp::Decrement);
                guard.draw_indexed_triangles(indices)?;
            }
            MarkStrategy::CulledPasses => {
                guard.enable_culling();

                guard.set_cull_face(Face::Front);
                guard.set_stencil_op(Face::FrontAndBack, StencilOp::Keep, StencilOp::Keep, StencilOp::Increment);
                guard.draw_indexed_triangles(indices)?;

                guard.set_cull_face(Face::Back);
                guard.set_stencil_op(Face::FrontAndBack, StencilOp::Keep, StencilOp::Keep, StencilOp::Decrement);
                guard.draw_indexed_triangles(indices)?;
            }
        }
        Ok(())
    }

    /// Darken every pixel whose stencil count lies in `1..=passes`.
    ///
    /// Render state is restored on return, including on error.
    pub fn draw_overlay<B: GraphicsBackend + ?Sized>(&self, backend: &mut B) -> ShadowResult<()> {
        let mut guard = OverlayStateGuard::new(backend);

        guard.disable(Capability::DepthTest);
        guard.disable(Capability::CullFace);
        guard.set_stencil_op(Face::FrontAndBack, StencilOp::Keep, StencilOp::Keep, StencilOp::Keep);
        guard.set_depth_mask(false);
        guard.set_color_mask(true, true, true, true);
        guard.enable(Capability::StencilTest);
        guard.enable(Capability::Blend);
        // Black source: result = dst * src_alpha
        guard.set_blend_func(BlendFactor::One, BlendFactor::SrcAlpha);

        let quad = guard.upload_vertex_buffer(&SCREEN_QUAD)?;
        guard.track(quad);
        let quad_indices = guard.upload_index_buffer(&SCREEN_QUAD_INDICES)?;
        guard.track(quad_indices);
        guard.bind_attribute(AttributeStream::ScreenPosition, quad);

        for (pass, &alpha) in (1u8..).zip(&self.alphas) {
            guard.set_stencil_func(CompareFunction::Equal, self.config.stencil_base + pass, 0xFF);

            let colors = [0.0, 0.0, 0.0, alpha].repeat(4);
            let color = guard.upload_vertex_buffer(&colors)?;
            guard.track(color);
            guard.bind_attribute(AttributeStream::Color, color);
            guard.draw_indexed_triangles(quad_indices)?;
            guard.release(color);
        }

        Ok(())
    }
}
