//! # umbra_scene - Animated Shadow Scene
//!
//! Drives the stencil shadow pipeline over a small animated world:
//! - Shapes and placements described by a serde [`SceneConfig`]
//! - An orbiting point light with a marker cube
//! - One lazily created shadow generator per casting instance
//! - Per-frame [`FrameStats`] for the host to log or display
//!
//! ## Example
//!
//! ```ignore
//! use umbra_scene::prelude::*;
//!
//! let mut scene = Scene::demo(&ShadowConfig::default())?;
//! scene.update(16.0);
//! backend.set_camera(scene.camera());
//! backend.clear(BACKGROUND, f32::INFINITY, scene.stencil_clear_value());
//! let stats = scene.render(&mut backend)?;
//! ```

pub mod error;
pub mod light;
pub mod context;
pub mod config;
pub mod scene;

pub use error::{SceneError, SceneResult};
pub use light::{OrbitingLight, LIGHT_SPEED};
pub use context::RenderContext;
pub use config::{CameraConfig, InstanceConfig, SceneConfig, ShapeConfig};
pub use scene::{FrameStats, Scene, SceneShape, ShapeInstance, LIGHT_MARKER_SIZE};

pub mod prelude {
    pub use crate::config::SceneConfig;
    pub use crate::error::{SceneError, SceneResult};
    pub use crate::scene::{FrameStats, Scene};
    pub use umbra_render::{OrthoCamera, ShadowConfig, SoftwareBackend};
}
