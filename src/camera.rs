// camera.rs — pointer-drag / auto-rotate camera state and view modes
//
// Pure state machine: no wgpu/winit types in here so the whole thing can be
// exercised host-side (see tests/camera_tests.rs).

use glam::Vec3;
use std::time::{Duration, Instant};

/// Radius of the panorama sphere; `look_target` always lands on it.
pub const SPHERE_RADIUS: f32 = 500.0;

/// Latitude is clamped short of the poles so the look-at up vector never
/// degenerates.
pub const LAT_LIMIT: f32 = 85.0;

/// Exponential easing factor applied once per tick to FOV (and, in tiny-planet
/// mode, latitude).
pub const LERP_FACTOR: f32 = 0.05;

const TAP_MAX_DURATION: Duration = Duration::from_millis(300);
const TAP_MAX_DISTANCE: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Spherical,
    TinyPlanet,
}

impl ViewMode {
    pub fn target_fov(self) -> f32 {
        match self {
            ViewMode::Spherical => 75.0,
            ViewMode::TinyPlanet => 140.0,
        }
    }

    pub fn target_lat(self) -> f32 {
        match self {
            ViewMode::Spherical => 0.0,
            ViewMode::TinyPlanet => -LAT_LIMIT,
        }
    }

    /// Degrees of camera rotation per pixel of drag.
    pub fn drag_sensitivity(self) -> f32 {
        match self {
            ViewMode::Spherical => 0.15,
            ViewMode::TinyPlanet => 0.3,
        }
    }

    /// Idle auto-rotation, degrees per 60 Hz frame.
    pub fn rotate_rate(self) -> f32 {
        match self {
            ViewMode::Spherical => 0.05,
            ViewMode::TinyPlanet => 0.1,
        }
    }
}

// Open drag session. Created on pointer-down, consumed on pointer-up/leave.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    start_x: f32,
    start_y: f32,
    last_x: f32,
    last_y: f32,
    base_lon: f32,
    base_lat: f32,
    started: Instant,
    travelled: f32,
}

/// Owns the viewing orientation (degrees of longitude/latitude), the eased
/// field of view and the current drag session, and turns them into a look-at
/// target each frame.
///
/// Longitude sign convention: dragging right moves the view left, i.e.
/// `lon = (start_x - x) * sensitivity + baseline`, matching the usual
/// grab-the-world feel.
pub struct CameraController {
    lon: f32,
    lat: f32,
    fov: f32,
    mode: ViewMode,
    drag: Option<DragSession>,
}

impl CameraController {
    pub fn new() -> Self {
        Self {
            lon: 0.0,
            lat: 0.0,
            fov: ViewMode::Spherical.target_fov(),
            mode: ViewMode::Spherical,
            drag: None,
        }
    }

    pub fn lon(&self) -> f32 {
        self.lon
    }

    pub fn lat(&self) -> f32 {
        self.lat
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn view_mode(&self) -> ViewMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Opens a drag session. Non-finite coordinates are rejected.
    pub fn pointer_down(&mut self, x: f32, y: f32, now: Instant) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.drag = Some(DragSession {
            start_x: x,
            start_y: y,
            last_x: x,
            last_y: y,
            base_lon: self.lon,
            base_lat: self.lat,
            started: now,
            travelled: 0.0,
        });
    }

    /// Updates orientation from the drag baseline. No-op while no session is
    /// open or when the event carries garbage coordinates.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        let Some(drag) = self.drag.as_mut() else {
            return;
        };

        let step = ((x - drag.last_x).powi(2) + (y - drag.last_y).powi(2)).sqrt();
        drag.travelled += step;
        drag.last_x = x;
        drag.last_y = y;

        let s = self.mode.drag_sensitivity();
        let new_lon = (drag.start_x - x) * s + drag.base_lon;
        let new_lat = (y - drag.start_y) * s + drag.base_lat;
        if new_lon.is_finite() && new_lat.is_finite() {
            self.lon = new_lon;
            self.lat = new_lat.clamp(-LAT_LIMIT, LAT_LIMIT);
        }
    }

    /// Closes the drag session. Returns `true` when the gesture was a tap
    /// (short and nearly stationary) — the caller toggles the HUD on taps.
    pub fn pointer_up(&mut self, now: Instant) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        now.duration_since(drag.started) < TAP_MAX_DURATION && drag.travelled < TAP_MAX_DISTANCE
    }

    /// The pointer left the surface: abandon the drag like a pointer-up, but
    /// never report a tap.
    pub fn pointer_leave(&mut self) {
        self.drag = None;
    }

    /// Switches projection targets. Back to spherical snaps latitude to 0
    /// immediately; the eased return reads as sluggish.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
        if mode == ViewMode::Spherical {
            self.lat = 0.0;
        }
    }

    pub fn toggle_view_mode(&mut self) {
        match self.mode {
            ViewMode::Spherical => self.set_view_mode(ViewMode::TinyPlanet),
            ViewMode::TinyPlanet => self.set_view_mode(ViewMode::Spherical),
        }
    }

    /// Per-frame update. `dt` is seconds since the previous frame; rotation is
    /// normalized to 60 Hz frames and capped so a stall can't spin the view.
    pub fn tick(&mut self, dt: f32) {
        let frames = if dt.is_finite() {
            (dt * 60.0).clamp(0.0, 3.0)
        } else {
            1.0
        };

        if self.drag.is_none() {
            self.lon += self.mode.rotate_rate() * frames;
        }

        self.fov += (self.mode.target_fov() - self.fov) * LERP_FACTOR;

        if self.mode == ViewMode::TinyPlanet && self.drag.is_none() {
            self.lat += (self.mode.target_lat() - self.lat) * LERP_FACTOR;
        }

        self.lat = self.lat.clamp(-LAT_LIMIT, LAT_LIMIT);
    }

    /// Point on the panorama sphere the camera looks at, derived from the
    /// current orientation: `phi = 90° - lat`, `theta = lon`.
    pub fn look_target(&self) -> Vec3 {
        let phi = (90.0 - self.lat).to_radians();
        let theta = self.lon.to_radians();
        Vec3::new(
            SPHERE_RADIUS * phi.sin() * theta.cos(),
            SPHERE_RADIUS * phi.cos(),
            SPHERE_RADIUS * phi.sin() * theta.sin(),
        )
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}
