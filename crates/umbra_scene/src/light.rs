//! Animated point light

use serde::{Deserialize, Serialize};
use umbra_math::Vec3;

/// Light angle gained per elapsed millisecond
pub const LIGHT_SPEED: f32 = 0.001;

/// Point light sweeping a Lissajous-like path above the scene
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OrbitingLight {
    angle: f32,
    #[serde(skip)]
    position: Option<Vec3>,
}

impl OrbitingLight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given path angle
    pub fn with_angle(angle: f32) -> Self {
        Self { angle, position: None }
    }

    /// Position on the path at `angle`
    pub fn position_at(angle: f32) -> Vec3 {
        Vec3::new(
            angle.sin() * 6.0,
            18.0 + (angle * 0.5).cos() * 4.0,
            (angle * 0.8).cos() * 9.0,
        )
    }

    /// Advance along the path
    pub fn update(&mut self, elapsed_ms: f32) {
        self.angle += LIGHT_SPEED * elapsed_ms;
        self.position = Some(Self::position_at(self.angle));
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// World position, or `None` until the first update
    pub fn position(&self) -> Option<Vec3> {
        self.position
    }
}
