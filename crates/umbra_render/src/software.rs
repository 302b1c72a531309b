//! CPU reference rasteriser
//!
//! A small fixed-function pipeline with colour, depth and stencil buffers.
//! It follows GL conventions closely enough to verify stencil counting:
//! counter-clockwise front faces, stencil test before depth test, and depth
//! writes only while the depth test is enabled.
//!
//! The camera is orthographic and looks down -Z of its view space. With the
//! default identity view, world x/y map straight to the screen and depth is
//! the distance below the eye plane.

use std::collections::HashMap;

use umbra_math::{EulerTransform, Vec3};

use crate::backend::{BufferId, GraphicsBackend};
use crate::error::{BackendError, BackendResult};
use crate::state::{AttributeStream, BlendFactor, Capability, CompareFunction, Face, StencilOp};

/// Orthographic camera looking down -Z of its view space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoCamera {
    /// View-space x/y at the centre of the viewport
    pub center: [f32; 2],
    /// Half of the visible view-space width
    pub half_width: f32,
    /// Height of the eye plane; depth is `eye_z - z`
    pub eye_z: f32,
    /// World to view transform
    pub view: EulerTransform,
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            half_width: 20.0,
            eye_z: 100.0,
            view: EulerTransform::IDENTITY,
        }
    }
}

impl OrthoCamera {
    /// Camera for a y-up world: orbit about Y, then tilt the top toward the
    /// viewer by `tilt` radians
    pub fn orbiting(half_width: f32, eye_z: f32, orbit: f32, tilt: f32) -> Self {
        Self {
            center: [0.0, 0.0],
            half_width,
            eye_z,
            view: EulerTransform::new(Vec3::ZERO, Vec3::new(tilt, orbit, 0.0)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct StencilOps {
    on_fail: StencilOp,
    on_depth_fail: StencilOp,
    on_pass: StencilOp,
}

impl Default for StencilOps {
    fn default() -> Self {
        Self {
            on_fail: StencilOp::Keep,
            on_depth_fail: StencilOp::Keep,
            on_pass: StencilOp::Keep,
        }
    }
}

#[derive(Clone, Debug)]
struct PipelineState {
    depth_test: bool,
    depth_func: CompareFunction,
    depth_write: bool,
    stencil_test: bool,
    stencil_func: CompareFunction,
    stencil_ref: u8,
    stencil_mask: u8,
    front_ops: StencilOps,
    back_ops: StencilOps,
    color_mask: [bool; 4],
    blend: bool,
    blend_src: BlendFactor,
    blend_dst: BlendFactor,
    cull: bool,
    cull_face: Face,
    model: EulerTransform,
    position: Option<(AttributeStream, BufferId)>,
    color: Option<BufferId>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            depth_test: false,
            depth_func: CompareFunction::Less,
            depth_write: true,
            stencil_test: false,
            stencil_func: CompareFunction::Always,
            stencil_ref: 0,
            stencil_mask: 0xFF,
            front_ops: StencilOps::default(),
            back_ops: StencilOps::default(),
            color_mask: [true; 4],
            blend: false,
            blend_src: BlendFactor::One,
            blend_dst: BlendFactor::Zero,
            cull: false,
            cull_face: Face::Back,
            model: EulerTransform::IDENTITY,
            position: None,
            color: None,
        }
    }
}

#[derive(Clone, Debug)]
enum BufferData {
    Vertex(Vec<f32>),
    Index(Vec<u32>),
}

/// A vertex after projection: pixel coordinates, depth, colour
#[derive(Clone, Copy, Debug)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    color: [f32; 4],
}

/// Edge function, see "A Parallel Algorithm for Polygon Rasterization".
///
/// Evaluated with the endpoints in a canonical order so that the two
/// triangles sharing an edge get exactly opposite values.
#[inline]
fn edge_function(a: &ScreenVertex, b: &ScreenVertex, px: f32, py: f32) -> f32 {
    let raw = |a: &ScreenVertex, b: &ScreenVertex| (px - a.x) * (b.y - a.y) - (py - a.y) * (b.x - a.x);
    if (a.x, a.y) <= (b.x, b.y) { raw(a, b) } else { -raw(b, a) }
}

/// Tie-break for pixel centres exactly on an edge: of the two directions an
/// edge can be walked in, exactly one owns the boundary.
#[inline]
fn owns_boundary(a: &ScreenVertex, b: &ScreenVertex) -> bool {
    let dy = b.y - a.y;
    let dx = b.x - a.x;
    dy > 0.0 || (dy == 0.0 && dx < 0.0)
}

/// CPU rasteriser implementing [`GraphicsBackend`]
#[derive(Debug)]
pub struct SoftwareBackend {
    width: usize,
    height: usize,
    camera: OrthoCamera,
    color: Vec<[f32; 4]>,
    depth: Vec<f32>,
    stencil: Vec<u8>,
    buffers: HashMap<BufferId, BufferData>,
    next_buffer: u64,
    state: PipelineState,
    triangles_drawn: usize,
}

impl SoftwareBackend {
    pub fn new(width: usize, height: usize, camera: OrthoCamera) -> Self {
        let pixels = width * height;
        Self {
            width,
            height,
            camera,
            color: vec![[0.0, 0.0, 0.0, 1.0]; pixels],
            depth: vec![f32::INFINITY; pixels],
            stencil: vec![0; pixels],
            buffers: HashMap::new(),
            next_buffer: 0,
            state: PipelineState::default(),
            triangles_drawn: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn camera(&self) -> &OrthoCamera {
        &self.camera
    }

    /// Reset every buffer
    pub fn clear(&mut self, color: [f32; 4], depth: f32, stencil: u8) {
        self.color.fill(color);
        self.depth.fill(depth);
        self.stencil.fill(stencil);
    }

    /// Triangles that survived culling since creation
    pub fn triangles_drawn(&self) -> usize {
        self.triangles_drawn
    }

    /// Number of buffers uploaded and not yet released
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn set_camera(&mut self, camera: OrthoCamera) {
        self.camera = camera;
    }

    /// Pixel containing a view-space x/y
    pub fn world_to_pixel(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        let (px, py) = self.project_xy(x, y);
        if px < 0.0 || py < 0.0 {
            return None;
        }
        let (px, py) = (px as usize, py as usize);
        (px < self.width && py < self.height).then_some((px, py))
    }

    pub fn stencil_at(&self, x: usize, y: usize) -> u8 {
        self.stencil[y * self.width + x]
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }

    pub fn color_at(&self, x: usize, y: usize) -> [f32; 4] {
        self.color[y * self.width + x]
    }

    /// Colour buffer as tightly packed RGBA8, rows top to bottom
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|c| c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
            .collect()
    }

    fn half_height(&self) -> f32 {
        self.camera.half_width * self.height as f32 / self.width as f32
    }

    fn project_xy(&self, x: f32, y: f32) -> (f32, f32) {
        let nx = (x - self.camera.center[0]) / self.camera.half_width;
        let ny = (y - self.camera.center[1]) / self.half_height();
        self.ndc_to_pixel(nx, ny)
    }

    fn ndc_to_pixel(&self, nx: f32, ny: f32) -> (f32, f32) {
        (
            (nx * 0.5 + 0.5) * self.width as f32,
            (1.0 - (ny * 0.5 + 0.5)) * self.height as f32,
        )
    }

    fn vertex_buffer(&self, buffer: BufferId) -> BackendResult<&[f32]> {
        match self.buffers.get(&buffer) {
            Some(BufferData::Vertex(data)) => Ok(data),
            _ => Err(BackendError::UnknownBuffer(buffer)),
        }
    }

    fn fetch_vertex(&self, stream: AttributeStream, positions: &[f32], colors: Option<&[f32]>, index: u32) -> BackendResult<ScreenVertex> {
        let i = index as usize;
        let vertices = positions.len() / 3;
        if i >= vertices {
            return Err(BackendError::IndexOutOfRange { index, vertices });
        }
        let p = Vec3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

        let (x, y, depth) = match stream {
            AttributeStream::ScreenPosition => {
                let (x, y) = self.ndc_to_pixel(p.x, p.y);
                (x, y, p.z)
            }
            _ => {
                let world = self.state.model.transform_point(p);
                let view = self.camera.view.transform_point(world);
                let (x, y) = self.project_xy(view.x, view.y);
                (x, y, self.camera.eye_z - view.z)
            }
        };

        let color = match colors {
            Some(data) if data.len() >= (i + 1) * 4 => {
                [data[i * 4], data[i * 4 + 1], data[i * 4 + 2], data[i * 4 + 3]]
            }
            _ => [1.0; 4],
        };

        Ok(ScreenVertex { x, y, depth, color })
    }

    fn rasterize(&mut self, v0: ScreenVertex, v1: ScreenVertex, v2: ScreenVertex) {
        // y grows downward in pixel space, so a positive pixel-space area
        // here is a clockwise triangle on screen
        let signed = (v1.x - v0.x) * (v2.y - v0.y) - (v1.y - v0.y) * (v2.x - v0.x);
        if signed == 0.0 || !signed.is_finite() {
            return;
        }
        let front_facing = signed < 0.0;
        if self.state.cull && self.state.cull_face.includes(front_facing) {
            return;
        }
        self.triangles_drawn += 1;

        // Orient so every inside point has non-negative edge values
        let (a, b, c) = if edge_function(&v0, &v1, v2.x, v2.y) > 0.0 { (v0, v1, v2) } else { (v0, v2, v1) };
        let area = edge_function(&a, &b, c.x, c.y);
        if area <= 0.0 {
            return;
        }

        let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as usize;
        let max_x = (a.x.max(b.x).max(c.x).ceil().max(0.0) as usize).min(self.width);
        let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as usize;
        let max_y = (a.y.max(b.y).max(c.y).ceil().max(0.0) as usize).min(self.height);

        let edges = [(b, c), (c, a), (a, b)];
        let ops = if front_facing { self.state.front_ops } else { self.state.back_ops };

        for y in min_y..max_y {
            for x in min_x..max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let mut weights = [0.0f32; 3];
                let mut inside = true;
                for (slot, (from, to)) in edges.iter().enumerate() {
                    let w = edge_function(from, to, px, py);
                    if w < 0.0 || (w == 0.0 && !owns_boundary(from, to)) {
                        inside = false;
                        break;
                    }
                    weights[slot] = w / area;
                }
                if !inside {
                    continue;
                }

                let depth = a.depth * weights[0] + b.depth * weights[1] + c.depth * weights[2];
                let color = [0, 1, 2, 3].map(|k| a.color[k] * weights[0] + b.color[k] * weights[1] + c.color[k] * weights[2]);
                self.shade_fragment(y * self.width + x, depth, color, ops);
            }
        }
    }

    fn shade_fragment(&mut self, offset: usize, depth: f32, color: [f32; 4], ops: StencilOps) {
        let state = &self.state;

        if state.stencil_test {
            let stored = self.stencil[offset];
            let passed = state
                .stencil_func
                .compare(state.stencil_ref & state.stencil_mask, stored & state.stencil_mask);
            if !passed {
                self.stencil[offset] = ops.on_fail.apply(stored, state.stencil_ref);
                return;
            }
        }

        if state.depth_test && !state.depth_func.compare(depth, self.depth[offset]) {
            if state.stencil_test {
                self.stencil[offset] = ops.on_depth_fail.apply(self.stencil[offset], state.stencil_ref);
            }
            return;
        }

        if state.stencil_test {
            self.stencil[offset] = ops.on_pass.apply(self.stencil[offset], state.stencil_ref);
        }
        if state.depth_test && state.depth_write {
            self.depth[offset] = depth;
        }

        let dst = self.color[offset];
        let out = if state.blend {
            let fs = state.blend_src.weight(color, dst);
            let fd = state.blend_dst.weight(color, dst);
            [0, 1, 2, 3].map(|k| (color[k] * fs[k] + dst[k] * fd[k]).clamp(0.0, 1.0))
        } else {
            color
        };
        for k in 0..4 {
            if state.color_mask[k] {
                self.color[offset][k] = out[k];
            }
        }
    }
}

impl GraphicsBackend for SoftwareBackend {
    fn upload_vertex_buffer(&mut self, data: &[f32]) -> BackendResult<BufferId> {
        if data.iter().any(|v| !v.is_finite()) {
            return Err(BackendError::UploadFailed("vertex data is not finite".into()));
        }
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(id, BufferData::Vertex(data.to_vec()));
        Ok(id)
    }

    fn upload_index_buffer(&mut self, indices: &[u32]) -> BackendResult<BufferId> {
        self.next_buffer += 1;
        let id = BufferId(self.next_buffer);
        self.buffers.insert(id, BufferData::Index(indices.to_vec()));
        Ok(id)
    }

    fn release_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
    }

    fn bind_attribute(&mut self, stream: AttributeStream, buffer: BufferId) {
        match stream {
            AttributeStream::Color => self.state.color = Some(buffer),
            _ => self.state.position = Some((stream, buffer)),
        }
    }

    fn unbind_attribute(&mut self, stream: AttributeStream) {
        match stream {
            AttributeStream::Color => self.state.color = None,
            _ => {
                if self.state.position.is_some_and(|(bound, _)| bound == stream) {
                    self.state.position = None;
                }
            }
        }
    }

    fn set_model_transform(&mut self, transform: &EulerTransform) {
        self.state.model = *transform;
    }

    fn set_stencil_func(&mut self, func: CompareFunction, reference: u8, mask: u8) {
        self.state.stencil_func = func;
        self.state.stencil_ref = reference;
        self.state.stencil_mask = mask;
    }

    fn set_stencil_op(&mut self, face: Face, on_fail: StencilOp, on_depth_fail: StencilOp, on_pass: StencilOp) {
        let ops = StencilOps { on_fail, on_depth_fail, on_pass };
        if face.includes(true) {
            self.state.front_ops = ops;
        }
        if face.includes(false) {
            self.state.back_ops = ops;
        }
    }

    fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.state.color_mask = [r, g, b, a];
    }

    fn set_depth_mask(&mut self, write: bool) {
        self.state.depth_write = write;
    }

    fn set_depth_func(&mut self, func: CompareFunction) {
        self.state.depth_func = func;
    }

    fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.blend_src = src;
        self.state.blend_dst = dst;
    }

    fn set_cull_face(&mut self, face: Face) {
        self.state.cull_face = face;
    }

    fn enable(&mut self, capability: Capability) {
        self.set_capability(capability, true);
    }

    fn disable(&mut self, capability: Capability) {
        self.set_capability(capability, false);
    }

    fn draw_indexed_triangles(&mut self, indices: BufferId) -> BackendResult<()> {
        let index_data = match self.buffers.get(&indices) {
            Some(BufferData::Index(data)) => data.clone(),
            Some(BufferData::Vertex(_)) | None => return Err(BackendError::UnknownBuffer(indices)),
        };
        let (stream, position_buffer) = self
            .state
            .position
            .ok_or(BackendError::MissingAttribute(AttributeStream::ObjectPosition.name()))?;
        let positions = self.vertex_buffer(position_buffer)?.to_vec();
        let colors = match self.state.color {
            Some(buffer) => Some(self.vertex_buffer(buffer)?.to_vec()),
            None => None,
        };

        let mut vertices = Vec::with_capacity(index_data.len());
        for &index in &index_data {
            vertices.push(self.fetch_vertex(stream, &positions, colors.as_deref(), index)?);
        }
        for tri in vertices.chunks_exact(3) {
            self.rasterize(tri[0], tri[1], tri[2]);
        }
        Ok(())
    }
}

impl SoftwareBackend {
    fn set_capability(&mut self, capability: Capability, on: bool) {
        match capability {
            Capability::DepthTest => self.state.depth_test = on,
            Capability::StencilTest => self.state.stencil_test = on,
            Capability::CullFace => self.state.cull = on,
            Capability::Blend => self.state.blend = on,
        }
    }
}
