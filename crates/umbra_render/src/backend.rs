//! Graphics backend capability set
//!
//! The shadow passes talk to the GPU only through [`GraphicsBackend`]. The
//! trait is deliberately small and state-oriented so it maps directly onto
//! a GL-style immediate API, a command recorder, or the CPU reference
//! rasteriser used in tests.

use serde::{Deserialize, Serialize};
use umbra_math::EulerTransform;

use crate::error::BackendResult;
use crate::state::{AttributeStream, BlendFactor, Capability, CompareFunction, Face, StencilOp};

/// Opaque handle for an uploaded buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u64);

/// Operations the shadow subsystem issues against a graphics backend
pub trait GraphicsBackend {
    /// Upload vertex data, returning a handle for later binding
    fn upload_vertex_buffer(&mut self, data: &[f32]) -> BackendResult<BufferId>;

    /// Upload triangle-list indices
    fn upload_index_buffer(&mut self, indices: &[u32]) -> BackendResult<BufferId>;

    /// Free a buffer previously returned by an upload
    fn release_buffer(&mut self, buffer: BufferId);

    /// Use `buffer` as the source for `stream` in subsequent draws
    fn bind_attribute(&mut self, stream: AttributeStream, buffer: BufferId);

    /// Stop sourcing `stream` from any buffer
    fn unbind_attribute(&mut self, stream: AttributeStream);

    /// Model transform applied to [`AttributeStream::ObjectPosition`]
    fn set_model_transform(&mut self, transform: &EulerTransform);

    fn set_stencil_func(&mut self, func: CompareFunction, reference: u8, mask: u8);

    fn set_stencil_op(&mut self, face: Face, on_fail: StencilOp, on_depth_fail: StencilOp, on_pass: StencilOp);

    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool);

    fn set_depth_mask(&mut self, write: bool);

    fn set_depth_func(&mut self, func: CompareFunction);

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor);

    fn set_cull_face(&mut self, face: Face);

    fn enable(&mut self, capability: Capability);

    fn disable(&mut self, capability: Capability);

    /// Draw the triangle list described by `indices` with the bound streams
    fn draw_indexed_triangles(&mut self, indices: BufferId) -> BackendResult<()>;
}
