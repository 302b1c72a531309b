//! Scene description
//!
//! Shapes and their placements in a serde-friendly form. The default value
//! is the demo layout: a floor, a spinning bar, blocks, small boxes, a
//! pyramid and a star under an orbiting light.

use serde::{Deserialize, Serialize};
use umbra_math::Vec3;
use umbra_mesh::{CuboidShape, PyramidShape, ShapeKind, StarShape};

/// One shape definition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShapeConfig {
    #[serde(flatten)]
    pub kind: ShapeKind,
    #[serde(default = "default_true")]
    pub casts_shadow: bool,
    #[serde(default = "default_color")]
    pub color: [f32; 4],
}

/// One placement of a shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceConfig {
    /// Index into [`SceneConfig::shapes`]
    pub shape: usize,
    #[serde(default)]
    pub location: [f32; 3],
    /// X/Y/Z rotation in radians
    #[serde(default)]
    pub angle: [f32; 3],
    /// Rotation gained per elapsed millisecond
    #[serde(default)]
    pub spin: [f32; 3],
}

/// Orthographic view onto the scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub half_width: f32,
    pub eye_distance: f32,
    /// Downward tilt in degrees
    pub tilt_degrees: f32,
    /// Orbit speed in degrees per elapsed millisecond
    pub orbit_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            half_width: 24.0,
            eye_distance: 60.0,
            tilt_degrees: 20.0,
            orbit_speed: 0.05,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub shapes: Vec<ShapeConfig>,
    pub instances: Vec<InstanceConfig>,
    pub camera: CameraConfig,
    /// Draw a small marker at the light position
    pub show_light: bool,
    /// Ambient and diffuse light intensity
    pub ambient: f32,
    pub diffuse: f32,
}

fn default_true() -> bool {
    true
}

fn default_color() -> [f32; 4] {
    [0.8, 0.8, 0.8, 1.0]
}

fn shape(kind: ShapeKind, casts_shadow: bool, color: [f32; 4]) -> ShapeConfig {
    ShapeConfig { kind, casts_shadow, color }
}

fn instance(shape: usize, location: [f32; 3], angle: [f32; 3]) -> InstanceConfig {
    InstanceConfig { shape, location, angle, spin: [0.0; 3] }
}

impl Default for SceneConfig {
    fn default() -> Self {
        let shapes = vec![
            shape(ShapeKind::Cuboid(CuboidShape::new(16.0, 0.1, 16.0)), false, [0.0, 0.67, 0.0, 1.0]),
            shape(ShapeKind::Cuboid(CuboidShape::new(10.0, 1.0, 1.0)), true, [1.0, 0.0, 0.0, 1.0]),
            shape(ShapeKind::Cuboid(CuboidShape::new(8.0, 2.0, 2.0)), true, [0.0, 0.0, 1.0, 1.0]),
            shape(ShapeKind::Cuboid(CuboidShape::new(1.5, 2.5, 1.0)), true, [0.0, 0.67, 0.67, 1.0]),
            shape(ShapeKind::Pyramid(PyramidShape::new(2.0, 2.0, 2.0)), true, [0.0, 1.0, 0.0, 1.0]),
            shape(ShapeKind::Star(StarShape::new(2.0, 2.0, 0.5)), true, [1.0, 0.87, 0.0, 1.0]),
        ];

        let mut bar = instance(1, [-4.0, 5.0, 0.0], [0.0; 3]);
        bar.spin = [0.0, 0.0006, 0.0005];

        let instances = vec![
            instance(0, [0.0, -8.0, 0.0], [0.0; 3]),
            bar,
            instance(2, [-8.0, -6.0, 8.0], [0.0; 3]),
            instance(2, [8.0, -6.0, -8.0], [0.0, 1.55, 0.0]),
            instance(3, [4.0, 0.0, 9.0], [0.3, 0.6, 0.1]),
            instance(3, [-11.0, 2.0, -5.0], [0.8, 0.2, 0.5]),
            instance(4, [0.0, -6.0, 0.0], [0.0; 3]),
            instance(5, [6.0, -5.9, 2.0], [0.0; 3]),
        ];

        Self {
            shapes,
            instances,
            camera: CameraConfig::default(),
            show_light: true,
            ambient: 0.5,
            diffuse: 0.5,
        }
    }
}

impl SceneConfig {
    /// Scene with no shapes
    pub fn empty() -> Self {
        Self {
            shapes: Vec::new(),
            instances: Vec::new(),
            ..Default::default()
        }
    }

    pub fn caster_count(&self) -> usize {
        self.instances
            .iter()
            .filter(|i| self.shapes.get(i.shape).is_some_and(|s| s.casts_shadow))
            .count()
    }
}

impl InstanceConfig {
    pub fn location(&self) -> Vec3 {
        Vec3::from_array(self.location)
    }

    pub fn angle(&self) -> Vec3 {
        Vec3::from_array(self.angle)
    }

    pub fn spin(&self) -> Vec3 {
        Vec3::from_array(self.spin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_layout() {
        let config = SceneConfig::default();
        assert_eq!(config.shapes.len(), 6);
        assert_eq!(config.instances.len(), 8);
        assert!(!config.shapes[0].casts_shadow);
        assert_eq!(config.caster_count(), 7);
        assert_eq!(config.instances[1].spin, [0.0, 0.0006, 0.0005]);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let json = r#"{
            "shapes": [{ "kind": "pyramid", "sx": 1.0, "sy": 2.0, "sz": 1.0 }],
            "instances": [{ "shape": 0, "location": [0.0, 1.0, 0.0] }]
        }"#;
        let config: SceneConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.shapes.len(), 1);
        assert!(config.shapes[0].casts_shadow);
        assert_eq!(config.instances[0].angle, [0.0; 3]);
        assert_eq!(config.camera, CameraConfig::default());
        assert!(config.show_light);
    }

    #[test]
    fn test_round_trip() {
        let config = SceneConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
