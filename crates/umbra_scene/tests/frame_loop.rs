//! Whole-frame behaviour against the recording and CPU backends

use umbra_math::Vec3;
use umbra_render::{BackendCall, Capability, RecordingBackend, ShadowConfig, SoftwareBackend};
use umbra_scene::{Scene, SceneConfig, SceneError};

const BACKGROUND: [f32; 4] = [0.1, 0.1, 0.15, 1.0];

fn demo() -> Scene {
    let mut scene = Scene::demo(&ShadowConfig::default()).unwrap();
    scene.update(16.0);
    scene
}

#[test]
fn test_every_caster_marks() {
    let mut scene = demo();
    let mut backend = RecordingBackend::new();
    let stats = scene.render(&mut backend).unwrap();

    assert_eq!(stats.casters, SceneConfig::default().caster_count());
    assert_eq!(stats.skipped_casters, 0);
    assert!(stats.volume_triangles > 0);
    assert!(stats.silhouette_edges > 0);
    assert_eq!(backend.calls().last(), Some(&BackendCall::Enable(Capability::DepthTest)));
}

#[test]
fn test_mesh_buffers_cached_across_frames() {
    let mut scene = demo();
    let mut backend = RecordingBackend::new();
    scene.render(&mut backend).unwrap();
    let cached = backend.live_buffers();
    // Six shapes plus the light marker, positions and indices each
    assert_eq!(cached, 14);

    scene.update(16.0);
    scene.render(&mut backend).unwrap();
    assert_eq!(backend.live_buffers(), cached);

    scene.release_buffers(&mut backend);
    assert_eq!(backend.live_buffers(), 0);
}

#[test]
fn test_invalid_caster_transform_is_skipped() {
    let mut scene = demo();
    scene.instance_mut(1).unwrap().transform.translation = Vec3::new(f32::NAN, 0.0, 0.0);

    let mut backend = RecordingBackend::new();
    let stats = scene.render(&mut backend).unwrap();
    assert_eq!(stats.skipped_casters, 1);
    assert_eq!(stats.casters, SceneConfig::default().caster_count() - 1);
}

#[test]
fn test_failed_volume_upload_skips_one_caster() {
    let mut scene = demo();
    let mut backend = RecordingBackend::new();
    scene.render(&mut backend).unwrap();

    // Second frame: one colour upload per instance plus the marker, then
    // the first caster's volume positions
    let first_volume_upload = backend.upload_attempts() + scene.instances().len() + 1;
    backend.fail_upload(first_volume_upload);
    let stats = scene.render(&mut backend).unwrap();

    assert_eq!(stats.skipped_casters, 1);
    assert_eq!(stats.casters, SceneConfig::default().caster_count() - 1);
    assert_eq!(backend.live_buffers(), 14);
}

#[test]
fn test_second_software_frame_marks_every_caster() {
    let mut scene = demo();
    let mut backend = SoftwareBackend::new(64, 64, scene.camera());
    for _ in 0..2 {
        backend.clear(BACKGROUND, f32::INFINITY, scene.stencil_clear_value());
        let stats = scene.render(&mut backend).unwrap();
        assert_eq!(stats.skipped_casters, 0);
        assert_eq!(stats.casters, SceneConfig::default().caster_count());
        scene.update(16.0);
        backend.set_camera(scene.camera());
    }
}

#[test]
fn test_failed_overlay_upload_fails_frame() {
    let mut scene = demo();
    let mut backend = RecordingBackend::new();
    scene.render(&mut backend).unwrap();
    let uploads_per_frame = {
        let before = backend.upload_attempts();
        scene.render(&mut backend).unwrap();
        backend.upload_attempts() - before
    };

    // The last upload of a frame is the final overlay colour buffer
    backend.fail_upload(backend.upload_attempts() + uploads_per_frame - 1);
    let result = scene.render(&mut backend);
    assert!(matches!(result, Err(SceneError::Shadow(_))));
    assert_eq!(backend.calls().last(), Some(&BackendCall::Enable(Capability::DepthTest)));
}

#[test]
fn test_software_frame_darkens_floor() {
    let mut scene = demo();
    let mut backend = SoftwareBackend::new(96, 96, scene.camera());
    backend.clear(BACKGROUND, f32::INFINITY, scene.stencil_clear_value());
    let stats = scene.render(&mut backend).unwrap();
    assert_eq!(stats.skipped_casters, 0);
    assert_eq!(stats.casters, SceneConfig::default().caster_count());
    assert_eq!(backend.live_buffers(), 14);

    let base = scene.stencil_clear_value();
    let mut shadowed = 0;
    for y in 0..backend.height() {
        for x in 0..backend.width() {
            if backend.stencil_at(x, y) > base {
                shadowed += 1;
            }
        }
    }
    assert!(shadowed > 0);
    assert_eq!(backend.to_rgba8().len(), 96 * 96 * 4);
}
