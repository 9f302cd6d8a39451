// Host-side tests for the pure camera controller.
// The crate is a binary, so the module is included directly.

#![allow(dead_code)]
mod camera {
    include!("../src/camera.rs");
}

use camera::*;
use std::time::{Duration, Instant};

const DT: f32 = 1.0 / 60.0;
const EPS: f32 = 1e-3;

#[test]
fn latitude_always_clamped_after_tick() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    // drag hard toward the pole
    cam.pointer_down(0.0, 0.0, t0);
    cam.pointer_move(0.0, 10_000.0);
    assert!(cam.lat() <= LAT_LIMIT);
    cam.pointer_up(t0 + Duration::from_secs(1));

    for _ in 0..10 {
        cam.tick(DT);
        assert!((-LAT_LIMIT..=LAT_LIMIT).contains(&cam.lat()));
    }

    let mut cam = CameraController::new();
    cam.pointer_down(0.0, 0.0, t0);
    cam.pointer_move(0.0, -10_000.0);
    cam.tick(DT);
    assert!(cam.lat() >= -LAT_LIMIT);
}

#[test]
fn short_still_gesture_is_a_tap() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    cam.pointer_down(100.0, 100.0, t0);
    cam.pointer_move(102.0, 101.0); // < 10 px travelled
    let tapped = cam.pointer_up(t0 + Duration::from_millis(50));

    assert!(tapped);
    assert!(!cam.is_dragging());
}

#[test]
fn slow_gesture_is_not_a_tap() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    cam.pointer_down(100.0, 100.0, t0);
    assert!(!cam.pointer_up(t0 + Duration::from_millis(400)));
}

#[test]
fn far_gesture_is_not_a_tap() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    cam.pointer_down(100.0, 100.0, t0);
    cam.pointer_move(150.0, 100.0);
    assert!(!cam.pointer_up(t0 + Duration::from_millis(50)));
}

#[test]
fn drag_applies_sensitivity_from_the_baseline() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();
    let s = ViewMode::Spherical.drag_sensitivity();

    cam.pointer_down(200.0, 300.0, t0);
    cam.pointer_move(240.0, 280.0); // dx = +40, dy = -20
    let tapped = cam.pointer_up(t0 + Duration::from_millis(500));

    assert!(!tapped);
    // dragging right turns the view left
    assert!((cam.lon() - (-40.0 * s)).abs() < EPS, "lon {}", cam.lon());
    assert!((cam.lat() - (-20.0 * s)).abs() < EPS, "lat {}", cam.lat());
}

#[test]
fn drag_moves_are_relative_to_the_press_not_the_last_move() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();
    let s = ViewMode::Spherical.drag_sensitivity();

    cam.pointer_down(0.0, 0.0, t0);
    cam.pointer_move(10.0, 0.0);
    cam.pointer_move(30.0, 0.0);
    cam.pointer_move(20.0, 0.0);

    assert!((cam.lon() - (-20.0 * s)).abs() < EPS);
}

#[test]
fn tiny_planet_converges_on_fov_and_latitude() {
    let mut cam = CameraController::new();
    cam.set_view_mode(ViewMode::TinyPlanet);

    let mut prev_fov = cam.fov();
    for _ in 0..100 {
        cam.tick(DT);
        assert!(cam.fov() >= prev_fov, "fov must approach 140 monotonically");
        prev_fov = cam.fov();
    }

    assert!((cam.fov() - 140.0).abs() < 0.5, "fov {}", cam.fov());
    assert!((cam.lat() - (-85.0)).abs() < 1.0, "lat {}", cam.lat());
}

#[test]
fn returning_to_spherical_resets_latitude_immediately() {
    let mut cam = CameraController::new();
    cam.set_view_mode(ViewMode::TinyPlanet);
    for _ in 0..50 {
        cam.tick(DT);
    }
    assert!(cam.lat() < -50.0);
    let fov_before = cam.fov();

    cam.set_view_mode(ViewMode::Spherical);
    assert_eq!(cam.lat(), 0.0, "latitude snaps, no easing");

    // FOV still eases back down toward 75
    cam.tick(DT);
    assert!(cam.fov() < fov_before);
    assert!(cam.fov() > 75.0);
}

#[test]
fn idle_auto_rotation_advances_longitude() {
    let mut cam = CameraController::new();
    let rate = ViewMode::Spherical.rotate_rate();

    let mut prev = cam.lon();
    for _ in 0..20 {
        cam.tick(DT);
        assert!(cam.lon() > prev, "longitude strictly increases when idle");
        assert!((cam.lon() - prev - rate).abs() < 1e-4);
        prev = cam.lon();
    }
}

#[test]
fn tiny_planet_rotates_faster_than_spherical() {
    assert!(ViewMode::TinyPlanet.rotate_rate() > ViewMode::Spherical.rotate_rate());
    assert!(ViewMode::TinyPlanet.drag_sensitivity() > ViewMode::Spherical.drag_sensitivity());
}

#[test]
fn no_rotation_while_dragging() {
    let mut cam = CameraController::new();
    cam.pointer_down(0.0, 0.0, Instant::now());
    let lon = cam.lon();
    cam.tick(DT);
    assert_eq!(cam.lon(), lon);
}

#[test]
fn look_target_stays_on_the_sphere() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    for i in 0..50 {
        cam.tick(DT);
        let len = cam.look_target().length();
        assert!((len - SPHERE_RADIUS).abs() < 0.1, "tick {i}: |target| = {len}");
    }

    // and at a dragged extreme
    cam.pointer_down(0.0, 0.0, t0);
    cam.pointer_move(500.0, -700.0);
    let len = cam.look_target().length();
    assert!((len - SPHERE_RADIUS).abs() < 0.1);
}

#[test]
fn pointer_leave_closes_the_drag_without_a_tap() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    cam.pointer_down(0.0, 0.0, t0);
    cam.pointer_move(2.0, 2.0);
    cam.pointer_leave();

    assert!(!cam.is_dragging());
    // the session is gone, a stray release reports nothing
    assert!(!cam.pointer_up(t0 + Duration::from_millis(10)));
}

#[test]
fn non_finite_pointer_input_is_ignored() {
    let mut cam = CameraController::new();
    let t0 = Instant::now();

    cam.pointer_down(f32::NAN, 0.0, t0);
    assert!(!cam.is_dragging());

    cam.pointer_down(0.0, 0.0, t0);
    let (lon, lat) = (cam.lon(), cam.lat());
    cam.pointer_move(f32::NAN, 10.0);
    cam.pointer_move(10.0, f32::INFINITY);
    assert_eq!(cam.lon(), lon);
    assert_eq!(cam.lat(), lat);

    assert!(cam.lon().is_finite());
    cam.tick(f32::NAN);
    assert!(cam.lon().is_finite() && cam.lat().is_finite());
}

#[test]
fn move_without_a_session_is_a_no_op() {
    let mut cam = CameraController::new();
    let (lon, lat) = (cam.lon(), cam.lat());
    cam.pointer_move(400.0, 400.0);
    assert_eq!((cam.lon(), cam.lat()), (lon, lat));
}

#[test]
fn stalled_frame_cannot_teleport_the_view() {
    let mut cam = CameraController::new();
    let rate = ViewMode::Spherical.rotate_rate();

    cam.tick(10.0); // a 10 s hitch
    assert!(cam.lon() <= rate * 3.0 + EPS);
}
