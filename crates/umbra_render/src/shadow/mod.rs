//! Stencil Shadow Volumes
//!
//! Backend-agnostic generation of shadow volume geometry for point lights.
//!
//! # Architecture
//!
//! - **Config**: extrusion, stencil and overlay settings
//! - **Visibility**: per-triangle light-facing bitset
//! - **Silhouette**: edge toggling over the visible set
//! - **Volume**: side quads plus near and far caps
//! - **Generator**: the per-frame state machine tying the steps together
//!
//! # Usage
//!
//! ```ignore
//! use umbra_render::shadow::*;
//!
//! let mut generator = ShadowVolumeGenerator::new(mesh.clone(), &ShadowConfig::default());
//! let volume = generator.generate(light_world, &caster_transform)?;
//! compositor.mark_volume(&mut backend, &volume, &caster_transform)?;
//! ```

pub mod config;
pub mod visibility;
pub mod silhouette;
pub mod volume;
pub mod generator;

pub use config::{MarkStrategy, ShadowConfig, MAX_OVERLAY_PASSES};
pub use visibility::Visibility;
pub use silhouette::SilhouetteBuilder;
pub use volume::{ShadowVolume, VolumeStats};
pub use generator::{GeneratorState, ShadowVolumeGenerator};
