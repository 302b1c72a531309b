//! Command-recording backend
//!
//! Records every call as a [`BackendCall`] so that pass ordering and state
//! changes can be asserted without a GPU. Uploads can be made to fail to
//! exercise the per-caster skip path.

use std::collections::HashMap;

use umbra_math::EulerTransform;

use crate::backend::{BufferId, GraphicsBackend};
use crate::error::{BackendError, BackendResult};
use crate::state::{AttributeStream, BlendFactor, Capability, CompareFunction, Face, StencilOp};

/// One recorded backend call
#[derive(Clone, Debug, PartialEq)]
pub enum BackendCall {
    UploadVertexBuffer { buffer: BufferId, floats: usize },
    UploadIndexBuffer { buffer: BufferId, indices: usize },
    ReleaseBuffer(BufferId),
    BindAttribute { stream: AttributeStream, buffer: BufferId },
    UnbindAttribute(AttributeStream),
    SetModelTransform(EulerTransform),
    SetStencilFunc { func: CompareFunction, reference: u8, mask: u8 },
    SetStencilOp { face: Face, on_fail: StencilOp, on_depth_fail: StencilOp, on_pass: StencilOp },
    SetColorMask([bool; 4]),
    SetDepthMask(bool),
    SetDepthFunc(CompareFunction),
    SetBlendFunc { src: BlendFactor, dst: BlendFactor },
    SetCullFace(Face),
    Enable(Capability),
    Disable(Capability),
    DrawIndexedTriangles { indices: BufferId, count: usize },
}

#[derive(Clone, Debug)]
enum BufferData {
    Vertex(Vec<f32>),
    Index(Vec<u32>),
}

/// Backend that records calls instead of rendering
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    buffers: HashMap<BufferId, BufferData>,
    next_buffer: u64,
    attempts: usize,
    fail_after: Option<usize>,
    fail_at: Vec<usize>,
    draw_attempts: usize,
    fail_draw_at: Vec<usize>,
    /// Object and screen positions share one slot
    position: Option<(AttributeStream, BufferId)>,
    color: Option<BufferId>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upload attempt after the first `n`
    pub fn fail_uploads_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Fail only the upload attempt with this zero-based ordinal
    pub fn fail_upload(&mut self, attempt: usize) {
        self.fail_at.push(attempt);
    }

    /// Fail only the draw attempt with this zero-based ordinal
    pub fn fail_draw(&mut self, attempt: usize) {
        self.fail_draw_at.push(attempt);
    }

    /// Stop injecting upload and draw failures
    pub fn clear_failures(&mut self) {
        self.fail_after = None;
        self.fail_at.clear();
        self.fail_draw_at.clear();
    }

    /// Upload attempts so far, failed ones included
    pub fn upload_attempts(&self) -> usize {
        self.attempts
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take_calls(&mut self) -> Vec<BackendCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of buffers uploaded and not yet released
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Recorded draw calls with their index counts
    pub fn draws(&self) -> Vec<(BufferId, usize)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::DrawIndexedTriangles { indices, count } => Some((*indices, *count)),
                _ => None,
            })
            .collect()
    }

    /// Contents of a live vertex buffer
    pub fn vertex_data(&self, buffer: BufferId) -> Option<&[f32]> {
        match self.buffers.get(&buffer) {
            Some(BufferData::Vertex(data)) => Some(data),
            _ => None,
        }
    }

    fn allocate(&mut self, data: BufferData) -> BackendResult<BufferId> {
        let attempt = self.attempts;
        self.attempts += 1;
        let over_limit = self.fail_after.is_some_and(|limit| attempt >= limit);
        if over_limit || self.fail_at.contains(&attempt) {
            return Err(BackendError::UploadFailed(format!("injected failure on upload {}", attempt)));
        }
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(id, data);
        Ok(id)
    }
}

impl GraphicsBackend for RecordingBackend {
    fn upload_vertex_buffer(&mut self, data: &[f32]) -> BackendResult<BufferId> {
        let buffer = self.allocate(BufferData::Vertex(data.to_vec()))?;
        self.calls.push(BackendCall::UploadVertexBuffer { buffer, floats: data.len() });
        Ok(buffer)
    }

    fn upload_index_buffer(&mut self, indices: &[u32]) -> BackendResult<BufferId> {
        let buffer = self.allocate(BufferData::Index(indices.to_vec()))?;
        self.calls.push(BackendCall::UploadIndexBuffer { buffer, indices: indices.len() });
        Ok(buffer)
    }

    fn release_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(BackendCall::ReleaseBuffer(buffer));
    }

    fn bind_attribute(&mut self, stream: AttributeStream, buffer: BufferId) {
        match stream {
            AttributeStream::Color => self.color = Some(buffer),
            _ => self.position = Some((stream, buffer)),
        }
        self.calls.push(BackendCall::BindAttribute { stream, buffer });
    }

    fn unbind_attribute(&mut self, stream: AttributeStream) {
        match stream {
            AttributeStream::Color => self.color = None,
            _ => {
                if self.position.is_some_and(|(bound, _)| bound == stream) {
                    self.position = None;
                }
            }
        }
        self.calls.push(BackendCall::UnbindAttribute(stream));
    }

    fn set_model_transform(&mut self, transform: &EulerTransform) {
        self.calls.push(BackendCall::SetModelTransform(*transform));
    }

    fn set_stencil_func(&mut self, func: CompareFunction, reference: u8, mask: u8) {
        self.calls.push(BackendCall::SetStencilFunc { func, reference, mask });
    }

    fn set_stencil_op(&mut self, face: Face, on_fail: StencilOp, on_depth_fail: StencilOp, on_pass: StencilOp) {
        self.calls.push(BackendCall::SetStencilOp { face, on_fail, on_depth_fail, on_pass });
    }

    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.calls.push(BackendCall::SetColorMask([r, g, b, a]));
    }

    fn set_depth_mask(&mut self, write: bool) {
        self.calls.push(BackendCall::SetDepthMask(write));
    }

    fn set_depth_func(&mut self, func: CompareFunction) {
        self.calls.push(BackendCall::SetDepthFunc(func));
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.calls.push(BackendCall::SetBlendFunc { src, dst });
    }

    fn set_cull_face(&mut self, face: Face) {
        self.calls.push(BackendCall::SetCullFace(face));
    }

    fn enable(&mut self, capability: Capability) {
        self.calls.push(BackendCall::Enable(capability));
    }

    fn disable(&mut self, capability: Capability) {
        self.calls.push(BackendCall::Disable(capability));
    }

    fn draw_indexed_triangles(&mut self, indices: BufferId) -> BackendResult<()> {
        let attempt = self.draw_attempts;
        self.draw_attempts += 1;
        if self.fail_draw_at.contains(&attempt) {
            return Err(BackendError::DrawFailed(format!("injected failure on draw {}", attempt)));
        }
        let count = match self.buffers.get(&indices) {
            Some(BufferData::Index(data)) => data.len(),
            Some(BufferData::Vertex(_)) | None => return Err(BackendError::UnknownBuffer(indices)),
        };
        let bound = self.position.map(|(_, buffer)| buffer).into_iter().chain(self.color);
        for buffer in bound {
            if !matches!(self.buffers.get(&buffer), Some(BufferData::Vertex(_))) {
                return Err(BackendError::UnknownBuffer(buffer));
            }
        }
        self.calls.push(BackendCall::DrawIndexedTriangles { indices, count });
        Ok(())
    }
}
