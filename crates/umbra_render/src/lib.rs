//! # umbra_render - Stencil Shadow Volumes
//!
//! Backend-agnostic shadow rendering for point lights with:
//! - Per-caster shadow volume generation from a mesh silhouette
//! - Depth-pass stencil counting of enclosing volumes
//! - A stepped full-screen darkening overlay
//! - A small fixed-function backend trait with recording and CPU
//!   reference implementations
//!
//! ## Architecture
//!
//! 1. **Generator**: moves the light into mesh space, classifies faces,
//!    extracts the silhouette and extrudes the volume
//! 2. **Compositor**: issues the mark and overlay passes
//! 3. **Backend**: receives uploads, state changes and draws
//!
//! ## Example
//!
//! ```ignore
//! use umbra_render::prelude::*;
//!
//! let config = ShadowConfig::default();
//! let compositor = StencilCompositor::new(&config);
//! let mut generator = ShadowVolumeGenerator::new(mesh, &config);
//!
//! backend.clear(BACKGROUND, f32::INFINITY, compositor.stencil_clear_value());
//! // draw the lit scene, then per caster:
//! let volume = generator.generate(light, &transform)?;
//! compositor.mark_volume(&mut backend, &volume, &transform)?;
//! // once all casters are marked:
//! compositor.draw_overlay(&mut backend)?;
//! ```

pub mod error;
pub mod state;
pub mod backend;
pub mod recording;
pub mod software;
pub mod shadow;
pub mod stencil;

pub use error::{BackendError, BackendResult, ShadowError, ShadowResult};
pub use state::{AttributeStream, BlendFactor, Capability, CompareFunction, Face, StencilOp};
pub use backend::{BufferId, GraphicsBackend};
pub use recording::{BackendCall, RecordingBackend};
pub use software::{OrthoCamera, SoftwareBackend};
pub use shadow::{
    GeneratorState, MarkStrategy, ShadowConfig, ShadowVolume, ShadowVolumeGenerator, Visibility, VolumeStats,
};
pub use stencil::StencilCompositor;

pub mod prelude {
    pub use crate::backend::{BufferId, GraphicsBackend};
    pub use crate::error::{BackendError, ShadowError, ShadowResult};
    pub use crate::shadow::{MarkStrategy, ShadowConfig, ShadowVolume, ShadowVolumeGenerator};
    pub use crate::software::{OrthoCamera, SoftwareBackend};
    pub use crate::stencil::StencilCompositor;
}
